//! Tipos de resposta do secradar.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Campo sentinela presente apenas em avaliações degradadas.
pub const ERROR_FIELD: &str = "error";

/// Campo injetado ao servir um resultado do cache.
pub const CACHE_METADATA_FIELD: &str = "_cache_metadata";

/// Resultado de uma chamada ao orquestrador.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessOutcome {
    /// Documento da avaliação (opaco).
    pub result: Value,

    /// Fingerprint da requisição.
    pub cache_key: String,

    /// De onde veio o documento.
    pub source: OutcomeSource,

    /// Metadados do cache, presentes apenas em acertos.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<CacheMetadata>,
}

impl AssessOutcome {
    /// Verifica se o documento carrega o marcador de erro.
    pub fn is_degraded(&self) -> bool {
        self.source == OutcomeSource::Degraded
    }
}

/// Origem de um [`AssessOutcome`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeSource {
    /// Servido do cache.
    Cached,
    /// Calculado agora e (tentativamente) gravado no cache.
    Computed,
    /// O cálculo falhou; documento com marcador de erro.
    Degraded,
}

impl std::fmt::Display for OutcomeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutcomeSource::Cached => write!(f, "cached"),
            OutcomeSource::Computed => write!(f, "computed"),
            OutcomeSource::Degraded => write!(f, "degraded"),
        }
    }
}

/// Metadados devolvidos junto com um acerto de cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheMetadata {
    pub cached_at: DateTime<Utc>,
    /// Contador já incluindo a leitura corrente.
    pub access_count: u64,
}

/// Entrada lida do cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedAssessment {
    pub payload: Value,
    pub metadata: CacheMetadata,
}

impl CachedAssessment {
    /// Devolve o documento com `_cache_metadata` embutido.
    ///
    /// Documentos que não são objetos JSON são devolvidos sem alteração.
    pub fn into_annotated(self) -> Value {
        let mut payload = self.payload;
        if let Value::Object(map) = &mut payload {
            map.insert(
                CACHE_METADATA_FIELD.to_string(),
                json!({
                    "cached_at": self.metadata.cached_at,
                    "access_count": self.metadata.access_count,
                }),
            );
        }
        payload
    }
}

/// Resumo de uma entrada do cache (sem o documento).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheSummary {
    pub cache_key: String,
    pub product_name: String,
    pub company_name: Option<String>,
    pub sha1: Option<String>,
    pub url: Option<String>,
    pub cached_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub access_count: u64,
}

/// Estatísticas agregadas do cache.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: u64,
    /// Soma dos contadores; `0` quando não há entradas.
    pub total_accesses: u64,
    pub oldest_entry: Option<DateTime<Utc>>,
    pub newest_entry: Option<DateTime<Utc>>,
}

/// Registro do histórico de avaliações.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub product_name: String,
    pub trust_score: i64,
    pub risk_level: String,
    pub assessment_data: Value,
    pub timestamp: DateTime<Utc>,
}

/// Nível de risco derivado de um trust score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Classifica um score 0-100.
    pub fn from_score(score: i64) -> Self {
        match score {
            s if s >= 70 => RiskLevel::Low,
            s if s >= 40 => RiskLevel::Medium,
            _ => RiskLevel::High,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::High => write!(f, "High"),
        }
    }
}

/// Monta o documento devolvido quando o provedor falha.
///
/// Mantém o formato de uma avaliação normal (trust score conservador)
/// e adiciona o campo [`ERROR_FIELD`] com a descrição da falha.
pub fn degraded_assessment(
    product_name: &str,
    cache_key: &str,
    error: &str,
    default_score: u8,
) -> Value {
    json!({
        "product_name": product_name,
        "error": error,
        "trust_score": {
            "score": default_score,
            "confidence": "Low",
            "rationale": format!("Assessment could not be completed: {}", error),
            "risk_factors": ["Assessment unavailable"],
            "positive_factors": [],
        },
        "assessment_timestamp": Utc::now(),
        "cache_key": cache_key,
    })
}

/// Extrai o trust score de um documento de avaliação, se houver.
///
/// Aceita tanto `trust_score.score` quanto `summary.trust_score`.
pub fn trust_score_of(document: &Value) -> Option<i64> {
    document
        .pointer("/trust_score/score")
        .or_else(|| document.pointer("/summary/trust_score"))
        .and_then(Value::as_i64)
}
