//! Trava por fingerprint para cálculos em andamento.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Conjunto de travas, uma por fingerprint com cálculo em andamento.
#[derive(Default)]
pub(crate) struct InFlight {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl InFlight {
    /// Espera até ser o único cálculo ativo para `key`.
    pub(crate) async fn acquire(&self, key: &str) -> FlightGuard<'_> {
        // Declarado antes da espera: se o future for cancelado, a espera
        // (e sua referência à trava) cai primeiro e `waiting` limpa o mapa.
        let mut waiting = Waiting {
            flights: self,
            key: key.to_string(),
            armed: true,
        };

        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(locks.entry(key.to_string()).or_default())
        };

        let guard = lock.lock_owned().await;
        waiting.armed = false;

        FlightGuard {
            flights: self,
            key: key.to_string(),
            _guard: guard,
        }
    }

    /// Remove a trava de `key` se só restarem `held` referências a ela.
    fn release(&self, key: &str, held: usize) {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());

        let idle = locks
            .get(key)
            .is_some_and(|lock| Arc::strong_count(lock) <= held);
        if idle {
            locks.remove(key);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.locks.lock().map(|l| l.len()).unwrap_or(0)
    }
}

/// Libera a trava ao sair de escopo (inclusive em cancelamento).
pub(crate) struct FlightGuard<'a> {
    flights: &'a InFlight,
    key: String,
    _guard: OwnedMutexGuard<()>,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        // 2 referências = o mapa + este guard; ninguém mais esperando
        self.flights.release(&self.key, 2);
    }
}

/// Espera em andamento por uma trava; limpa o mapa se for cancelada.
struct Waiting<'a> {
    flights: &'a InFlight,
    key: String,
    armed: bool,
}

impl Drop for Waiting<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.flights.release(&self.key, 1);
        }
    }
}
