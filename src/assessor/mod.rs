//! Orquestrador de avaliações (cache-aside).
//!
//! Para cada requisição: valida, calcula o fingerprint, consulta o
//! [`ResultStore`](crate::cache::ResultStore) e só chama o provedor em caso
//! de miss (ou `force_refresh`). Falhas de armazenamento viram "seguir sem
//! cache"; falhas do provedor viram um documento degradado.

mod engine;
mod flight;

pub use engine::Assessor;
