//! Motor de avaliação com cache-aside.

use std::sync::Arc;

use crate::cache::{fingerprint_request, ResultStore};
use crate::providers::{self, AssessmentProvider};
use crate::types::config::Config;
use crate::types::requests::AssessmentRequest;
use crate::types::responses::{degraded_assessment, AssessOutcome, CachedAssessment, OutcomeSource};
use crate::{RadarError, RadarResult};

use super::flight::InFlight;

/// Orquestrador de avaliações.
///
/// Responsável por:
/// - Validar a requisição e derivar o fingerprint
/// - Servir acertos do [`ResultStore`]
/// - Chamar o provedor uma única vez por miss e gravar o resultado
pub struct Assessor {
    store: Arc<ResultStore>,
    provider: Arc<dyn AssessmentProvider>,
    default_score: u8,
    in_flight: Option<InFlight>,
}

impl Assessor {
    /// Cria um novo orquestrador.
    ///
    /// Sem single-flight: chamadas concorrentes com o mesmo fingerprint e
    /// cache vazio calculam cada uma, e a última gravação vence.
    pub fn new(store: Arc<ResultStore>, provider: Arc<dyn AssessmentProvider>) -> Self {
        Self {
            store,
            provider,
            default_score: 50,
            in_flight: None,
        }
    }

    /// Cria o orquestrador a partir da configuração.
    pub fn from_config(store: Arc<ResultStore>, config: &Config) -> Self {
        let provider: Arc<dyn AssessmentProvider> =
            Arc::from(providers::from_config(&config.provider));

        Self::new(store, provider)
            .with_default_score(config.provider.default_trust_score)
            .with_single_flight(config.cache.single_flight)
    }

    /// Serializa cálculos concorrentes do mesmo fingerprint.
    ///
    /// Quem espera reconsulta o cache depois que o cálculo em andamento
    /// termina, trocando latência por um único cálculo por chave.
    #[must_use]
    pub fn with_single_flight(mut self, enabled: bool) -> Self {
        self.in_flight = enabled.then(InFlight::default);
        self
    }

    /// Define o score usado em documentos degradados.
    #[must_use]
    pub fn with_default_score(mut self, score: u8) -> Self {
        self.default_score = score.min(100);
        self
    }

    /// Store usado pelo orquestrador.
    pub fn store(&self) -> &Arc<ResultStore> {
        &self.store
    }

    /// Nome do provedor configurado.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Avalia uma requisição, usando o cache quando possível.
    ///
    /// Só falha com [`RadarError::InvalidRequest`]; falhas do provedor
    /// voltam como documento degradado (com o campo `error`).
    pub async fn assess(
        &self,
        request: &AssessmentRequest,
        force_refresh: bool,
    ) -> RadarResult<AssessOutcome> {
        if request.product_name.trim().is_empty() {
            return Err(RadarError::invalid_request("product_name é obrigatório"));
        }

        let cache_key = fingerprint_request(request);

        if !force_refresh {
            if let Some(hit) = self.lookup(&cache_key) {
                return Ok(cached_outcome(hit, cache_key));
            }
        }

        let _flight = match &self.in_flight {
            Some(flights) => {
                let guard = flights.acquire(&cache_key).await;
                if !force_refresh {
                    if let Some(hit) = self.lookup(&cache_key) {
                        tracing::debug!(cache_key = %cache_key, "Served by concurrent compute");
                        return Ok(cached_outcome(hit, cache_key));
                    }
                }
                Some(guard)
            }
            None => None,
        };

        Ok(self.compute(request, cache_key).await)
    }

    fn lookup(&self, cache_key: &str) -> Option<CachedAssessment> {
        match self.store.get(cache_key) {
            Ok(Some(hit)) => {
                tracing::debug!(
                    cache_key = %cache_key,
                    access_count = hit.metadata.access_count,
                    "Cache hit"
                );
                Some(hit)
            }
            Ok(None) => {
                tracing::debug!(cache_key = %cache_key, "Cache miss");
                None
            }
            Err(e) => {
                tracing::warn!(cache_key = %cache_key, error = %e, "Cache lookup failed, proceeding without cache");
                None
            }
        }
    }

    async fn compute(&self, request: &AssessmentRequest, cache_key: String) -> AssessOutcome {
        tracing::info!(
            cache_key = %cache_key,
            product = %request.product_name,
            provider = %self.provider.name(),
            "Computing assessment"
        );

        match self.provider.assess(request, &cache_key).await {
            Ok(result) => {
                if let Err(e) = self.store.put(&cache_key, &result, &request.index_fields()) {
                    tracing::warn!(cache_key = %cache_key, error = %e, "Failed to cache assessment");
                }

                AssessOutcome {
                    result,
                    cache_key,
                    source: OutcomeSource::Computed,
                    metadata: None,
                }
            }
            Err(e) => {
                tracing::warn!(
                    cache_key = %cache_key,
                    provider = %self.provider.name(),
                    error = %e,
                    "Assessment provider failed, returning degraded result"
                );

                let result = degraded_assessment(
                    &request.product_name,
                    &cache_key,
                    &e.to_string(),
                    self.default_score,
                );

                AssessOutcome {
                    result,
                    cache_key,
                    source: OutcomeSource::Degraded,
                    metadata: None,
                }
            }
        }
    }
}

fn cached_outcome(hit: CachedAssessment, cache_key: String) -> AssessOutcome {
    AssessOutcome {
        result: hit.payload,
        cache_key,
        source: OutcomeSource::Cached,
        metadata: Some(hit.metadata),
    }
}
