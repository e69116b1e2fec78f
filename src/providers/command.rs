//! Provedor que chama uma CLI de modelo generativo.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tokio::process::Command;

use crate::types::config::ProviderConfig;
use crate::types::errors::ProviderError;
use crate::types::requests::AssessmentRequest;

use super::prompt::{build_prompt, extract_json};
use super::AssessmentProvider;

/// Executa `command [args...] <prompt>` e lê o JSON da saída padrão.
pub struct CommandProvider {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandProvider {
    /// Cria um novo provedor para o comando informado.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            timeout: Duration::from_secs(120),
        }
    }

    /// Cria a partir da configuração.
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Define os argumentos passados antes do prompt.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Define o timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl AssessmentProvider for CommandProvider {
    fn name(&self) -> &str {
        &self.command
    }

    async fn assess(
        &self,
        request: &AssessmentRequest,
        cache_key: &str,
    ) -> Result<Value, ProviderError> {
        if self.command.trim().is_empty() {
            return Err(ProviderError::Unavailable(
                "nenhum comando configurado".to_string(),
            ));
        }

        let prompt = build_prompt(request);

        // kill_on_drop: um timeout ou cancelamento não deixa o processo órfão
        let result = tokio::time::timeout(
            self.timeout,
            Command::new(&self.command)
                .args(&self.args)
                .arg(&prompt)
                .kill_on_drop(true)
                .output(),
        )
        .await;

        match result {
            Ok(Ok(output)) => {
                if output.status.success() {
                    let stdout = String::from_utf8_lossy(&output.stdout);
                    let mut document = extract_json(&stdout)?;
                    if let Value::Object(map) = &mut document {
                        map.insert("cache_key".to_string(), Value::from(cache_key));
                    }
                    Ok(document)
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    Err(ProviderError::Unavailable(format!(
                        "{} saiu com {}: {}",
                        self.command,
                        output.status,
                        stderr.trim()
                    )))
                }
            }
            Ok(Err(e)) => {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Err(ProviderError::Unavailable(format!(
                        "comando '{}' não encontrado",
                        self.command
                    )))
                } else {
                    Err(ProviderError::Unavailable(e.to_string()))
                }
            }
            Err(_) => Err(ProviderError::Timeout(self.timeout)),
        }
    }
}
