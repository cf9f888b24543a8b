use std::sync::Arc;

use prospectus_common::{ProspectusError, Result};
use serde::{Deserialize, Serialize};

use crate::client::LlmClient;
use crate::deepseek::DeepSeekClient;
use crate::invoker::{CapabilityInvoker, LlmInvoker, SemaphoredInvoker};
use crate::retry::{RetryConfig, RetryingClient};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_requests: usize,
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_max_concurrent() -> usize {
    2
}

impl LlmConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ProspectusError::Config(e.to_string()))
    }

    /// Resolve the API key from config or the `DEEPSEEK_API_KEY`
    /// environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }
        std::env::var("DEEPSEEK_API_KEY").ok()
    }
}

/// Compose the full invoker stack: DeepSeek client, retry wrapper,
/// concurrency limit.
pub fn build_invoker(config: &LlmConfig) -> Result<Arc<dyn CapabilityInvoker>> {
    let api_key = config
        .resolve_api_key()
        .ok_or_else(|| ProspectusError::Config("DeepSeek requires an API key".to_string()))?;

    let base = DeepSeekClient::new(config.api_url.clone(), config.model.clone(), api_key);
    let retrying: Arc<dyn LlmClient> = Arc::new(RetryingClient::new(base, config.retry.clone()));

    let mut invoker = LlmInvoker::new(retrying);
    if let Some(t) = config.temperature {
        invoker = invoker.with_temperature(t);
    }
    if let Some(m) = config.max_tokens {
        invoker = invoker.with_max_tokens(m);
    }

    Ok(Arc::new(SemaphoredInvoker::new(
        Arc::new(invoker),
        config.max_concurrent_requests,
    )))
}
