//! Tipos compartilhados do secradar.

pub mod config;
pub mod errors;
pub mod requests;
pub mod responses;
