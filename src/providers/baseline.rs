//! Provedor offline com avaliação conservadora.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};

use crate::types::config::ProviderConfig;
use crate::types::errors::ProviderError;
use crate::types::requests::AssessmentRequest;

use super::category::classify;
use super::AssessmentProvider;

const NO_EVIDENCE: &str = "Insufficient public evidence";

/// Provedor que não consulta nenhuma fonte externa.
///
/// Produz um documento com o formato completo de uma avaliação, mas com
/// CVEs e compliance desconhecidos e um trust score conservador.
#[derive(Debug, Clone)]
pub struct BaselineProvider {
    default_score: u8,
}

impl BaselineProvider {
    /// Cria um provedor com o score padrão informado.
    pub fn new(default_score: u8) -> Self {
        Self {
            default_score: default_score.min(100),
        }
    }

    /// Cria a partir da configuração.
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::new(config.default_trust_score)
    }
}

impl Default for BaselineProvider {
    fn default() -> Self {
        Self::new(50)
    }
}

#[async_trait]
impl AssessmentProvider for BaselineProvider {
    fn name(&self) -> &str {
        "baseline"
    }

    async fn assess(
        &self,
        request: &AssessmentRequest,
        cache_key: &str,
    ) -> Result<Value, ProviderError> {
        let product = request.product_name.trim();

        Ok(json!({
            "product_name": product,
            "vendor": {
                "name": request.company_name.as_deref().unwrap_or("Unknown"),
                "website": request.url,
                "country": null,
                "founded": null,
                "reputation_summary": format!("{} for comprehensive assessment", NO_EVIDENCE),
            },
            "category": classify(product),
            "description": format!("{} - Security assessment pending full research", product),
            "usage_description": "Usage information requires web research and documentation analysis",
            "cve_trends": {
                "total_cves": 0,
                "critical_count": 0,
                "high_count": 0,
                "medium_count": 0,
                "low_count": 0,
                "recent_cves": [],
                "trend_summary": format!("{} - no CVE data available", NO_EVIDENCE),
            },
            "incidents": [],
            "compliance": {
                "soc2_compliant": null,
                "iso_certified": null,
                "gdpr_compliant": null,
                "data_processing_location": null,
                "encryption_at_rest": null,
                "encryption_in_transit": null,
                "data_retention_policy": null,
                "notes": format!("{} for compliance assessment", NO_EVIDENCE),
            },
            "deployment_model": "Unknown",
            "admin_controls": "Requires product documentation review",
            "trust_score": {
                "score": self.default_score,
                "confidence": "Low",
                "rationale": format!("{} for comprehensive trust assessment. This is a baseline score.", NO_EVIDENCE),
                "risk_factors": ["Limited public security documentation"],
                "positive_factors": [],
            },
            "alternatives": [],
            "citations": [{
                "source_type": "Vendor Stated",
                "title": "Assessment Note",
                "url": null,
                "description": "Baseline assessment without CVE databases, vendor security pages or compliance documentation.",
            }],
            "assessment_timestamp": Utc::now(),
            "cache_key": cache_key,
        }))
    }
}

/// Calcula um trust score (0-100) a partir dos sinais coletados.
///
/// Base 50; CVEs e CVEs críticos descontam até 20 pontos cada, incidentes
/// conhecidos descontam 15 e compliance ajusta em 30% da distância para 50.
pub fn calculate_trust_score(
    cve_count: u32,
    critical_cves: u32,
    has_incidents: bool,
    compliance_score: u8,
) -> u8 {
    let mut score = 50.0_f64;

    if cve_count > 0 {
        score -= f64::from((cve_count.saturating_mul(2)).min(20));
        score -= f64::from((critical_cves.saturating_mul(5)).min(20));
    }

    if has_incidents {
        score -= 15.0;
    }

    score += (f64::from(compliance_score) - 50.0) * 0.3;

    score.trunc().clamp(0.0, 100.0) as u8
}
