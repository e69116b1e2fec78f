//! Cache persistente de avaliações endereçado por conteúdo.
//!
//! O fingerprint de uma requisição (SHA-256 dos campos normalizados) é a
//! chave primária do [`ResultStore`], garantindo que a mesma requisição
//! reaproveite o resultado já calculado.

mod fingerprint;
mod store;

pub use fingerprint::{fingerprint, fingerprint_request};
pub use store::ResultStore;

pub(crate) use store::{parse_timestamp, timestamp};
