//! Histórico de avaliações finalizadas.
//!
//! Registro independente do cache: as entradas são gravadas explicitamente
//! pelo cliente, identificadas por um ID fornecido por ele (upsert por ID),
//! e nunca derivadas de acertos de cache.

mod log;

pub use log::HistoryLog;
