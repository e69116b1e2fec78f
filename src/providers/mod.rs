//! Provedores que calculam a avaliação de segurança.
//!
//! O orquestrador só conhece o trait [`AssessmentProvider`]; a escolha do
//! provedor, o prompt e a classificação por categoria ficam aqui.
//!
//! - [`BaselineProvider`]: avaliação conservadora, sem chamadas externas
//! - [`CommandProvider`]: envia o prompt para uma CLI de modelo generativo

mod baseline;
mod category;
mod command;
mod prompt;

pub use baseline::{calculate_trust_score, BaselineProvider};
pub use category::{classify, SoftwareCategory};
pub use command::CommandProvider;
pub use prompt::{build_prompt, extract_json};

use async_trait::async_trait;
use serde_json::Value;

use crate::types::config::{ProviderConfig, ProviderKind};
use crate::types::errors::ProviderError;
use crate::types::requests::AssessmentRequest;

/// Colaborador que produz o documento de avaliação.
///
/// É o único passo lento e sujeito a falhas do fluxo de avaliação; o
/// limite de tempo é responsabilidade da implementação.
#[async_trait]
pub trait AssessmentProvider: Send + Sync {
    /// Nome do provedor (para logs).
    fn name(&self) -> &str;

    /// Calcula a avaliação para a requisição.
    async fn assess(
        &self,
        request: &AssessmentRequest,
        cache_key: &str,
    ) -> Result<Value, ProviderError>;
}

/// Cria o provedor descrito na configuração.
pub fn from_config(config: &ProviderConfig) -> Box<dyn AssessmentProvider> {
    match config.kind {
        ProviderKind::Baseline => Box::new(BaselineProvider::from_config(config)),
        ProviderKind::Command => Box::new(CommandProvider::from_config(config)),
    }
}
