//! Tipos de erro do secradar.

use std::time::Duration;

use thiserror::Error;

/// Tipo de resultado padrão do secradar.
pub type RadarResult<T> = Result<T, RadarError>;

/// Erros possíveis no secradar.
#[derive(Error, Debug)]
pub enum RadarError {
    #[error("Erro de configuração: {0}")]
    Config(String),

    #[error("Erro de IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro ao parsear TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Erro ao serializar TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Erro de JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Erro de armazenamento: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Requisição inválida: {0}")]
    InvalidRequest(String),

    #[error("Provedor de avaliação falhou: {0}")]
    Provider(#[from] ProviderError),

    #[cfg(feature = "cli")]
    #[error("Erro no prompt interativo: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("{0}")]
    Other(String),
}

impl RadarError {
    /// Cria um erro genérico.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    /// Cria um erro de configuração.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Cria um erro de requisição inválida.
    pub fn invalid_request<S: Into<String>>(msg: S) -> Self {
        Self::InvalidRequest(msg.into())
    }
}

/// Falhas classificadas do provedor que calcula a avaliação.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("provedor indisponível: {0}")]
    Unavailable(String),

    #[error("resposta malformada: {0}")]
    MalformedResponse(String),

    #[error("timeout após {0:?}")]
    Timeout(Duration),
}
