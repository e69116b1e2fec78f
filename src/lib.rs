//! # secradar
//!
//! Cache persistente e orquestração para avaliações de segurança de
//! produtos e fornecedores de software.
//!
//! Cada requisição é reduzida a um fingerprint determinístico; resultados
//! já calculados são servidos do cache (com contagem de acessos) e só os
//! misses chegam ao provedor de avaliação.
//!
//! ## Módulos
//!
//! - [`assessor`] - Orquestrador cache-aside
//! - [`cache`] - Fingerprint e store SQLite de resultados
//! - [`history`] - Histórico de avaliações gravado pelo cliente
//! - [`providers`] - Provedores de avaliação (baseline, CLI externa)
//! - [`cli`] - Interface de linha de comando
//! - [`types`] - Tipos compartilhados

pub mod assessor;
pub mod cache;
#[cfg(feature = "cli")]
pub mod cli;
pub mod history;
pub mod providers;
pub mod types;

pub use types::config::Config;
pub use types::errors::{RadarError, RadarResult};
