//! Tipos de requisição do secradar.

use serde::{Deserialize, Serialize};

/// Requisição de avaliação de um produto/fornecedor.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssessmentRequest {
    /// Nome do produto (obrigatório).
    pub product_name: String,

    /// Nome do fornecedor.
    #[serde(default)]
    pub company_name: Option<String>,

    /// Hash do binário (SHA-1 no formato original).
    #[serde(default)]
    pub sha1: Option<String>,

    /// URL do produto ou do fornecedor.
    #[serde(default)]
    pub url: Option<String>,
}

impl AssessmentRequest {
    /// Cria uma nova requisição de avaliação.
    pub fn new(product_name: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
            ..Self::default()
        }
    }

    /// Define o fornecedor.
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company_name = Some(company.into());
        self
    }

    /// Define o hash do binário.
    pub fn with_sha1(mut self, sha1: impl Into<String>) -> Self {
        self.sha1 = Some(sha1.into());
        self
    }

    /// Define a URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Campos de indexação gravados junto com o resultado.
    pub fn index_fields(&self) -> IndexFields {
        IndexFields {
            product_name: self.product_name.clone(),
            company_name: self.company_name.clone(),
            sha1: self.sha1.clone(),
            url: self.url.clone(),
        }
    }
}

/// Campos duplicados na linha do cache para busca e listagem.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexFields {
    pub product_name: String,
    pub company_name: Option<String>,
    pub sha1: Option<String>,
    pub url: Option<String>,
}
