//! The Capability Invoker consumed by the graph executor.

use std::sync::Arc;

use async_trait::async_trait;
use prospectus_common::{Capability, ProspectusError, Result};
use tracing::debug;

use crate::client::{LlmClient, LlmRequest};

/// Executes one unit of work given an instruction and a declared
/// capability set, returning text.
///
/// Implementations may be slow, stateful, or nondeterministic; the
/// orchestrator treats every call as blocking-but-isolated.
#[async_trait]
pub trait CapabilityInvoker: Send + Sync {
    async fn invoke(&self, instruction: &str, capabilities: &[Capability]) -> Result<String>;
}

/// [`CapabilityInvoker`] backed by an [`LlmClient`].
///
/// The declared capability identifiers are passed through into the
/// request verbatim; tool semantics stay on the invoker side of the
/// boundary.
pub struct LlmInvoker {
    client: Arc<dyn LlmClient>,
    system_prompt: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl LlmInvoker {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            system_prompt: None,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    fn render_system(&self, capabilities: &[Capability]) -> Option<String> {
        if capabilities.is_empty() {
            return self.system_prompt.clone();
        }
        let tool_line = format!(
            "Available tools: {}.",
            capabilities
                .iter()
                .map(|c| c.id())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Some(match &self.system_prompt {
            Some(base) => format!("{base}\n\n{tool_line}"),
            None => tool_line,
        })
    }
}

#[async_trait]
impl CapabilityInvoker for LlmInvoker {
    async fn invoke(&self, instruction: &str, capabilities: &[Capability]) -> Result<String> {
        debug!(
            model = %self.client.model_name(),
            capability_count = capabilities.len(),
            "Invoking LLM"
        );

        let mut request = LlmRequest::single_turn(self.render_system(capabilities), instruction);
        request.temperature = self.temperature;
        request.max_tokens = self.max_tokens;

        let response = self.client.complete(request).await?;

        if response.content.trim().is_empty() {
            return Err(ProspectusError::Invocation(format!(
                "Model {} returned empty output",
                self.client.model_name()
            )));
        }

        Ok(response.content)
    }
}

/// Bounds concurrent invocations with a semaphore.
///
/// The graph executor dispatches every ready node at once; when the
/// provider enforces concurrency limits, wrap the invoker in this.
pub struct SemaphoredInvoker {
    inner: Arc<dyn CapabilityInvoker>,
    semaphore: Arc<tokio::sync::Semaphore>,
}

impl SemaphoredInvoker {
    pub fn new(inner: Arc<dyn CapabilityInvoker>, max_concurrent: usize) -> Self {
        Self {
            inner,
            semaphore: Arc::new(tokio::sync::Semaphore::new(max_concurrent)),
        }
    }
}

#[async_trait]
impl CapabilityInvoker for SemaphoredInvoker {
    async fn invoke(&self, instruction: &str, capabilities: &[Capability]) -> Result<String> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| ProspectusError::Invocation(format!("Semaphore acquire failed: {e}")))?;
        self.inner.invoke(instruction, capabilities).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{LlmResponse, Role};

    struct CannedClient {
        reply: String,
    }

    #[async_trait]
    impl LlmClient for CannedClient {
        async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
            assert_eq!(request.messages[0].role, Role::User);
            Ok(LlmResponse {
                content: self.reply.clone(),
                model: "canned".to_string(),
                usage: None,
                finish_reason: None,
            })
        }
        fn model_name(&self) -> &str {
            "canned"
        }
    }

    #[tokio::test]
    async fn invoke_returns_model_output() {
        let invoker = LlmInvoker::new(Arc::new(CannedClient {
            reply: "findings".to_string(),
        }));
        let out = invoker.invoke("Collect data", &[]).await.unwrap();
        assert_eq!(out, "findings");
    }

    #[tokio::test]
    async fn invoke_rejects_empty_output() {
        let invoker = LlmInvoker::new(Arc::new(CannedClient {
            reply: "   ".to_string(),
        }));
        let err = invoker.invoke("Collect data", &[]).await.unwrap_err();
        assert!(matches!(err, ProspectusError::Invocation(_)));
    }

    #[test]
    fn system_line_lists_declared_capabilities() {
        let invoker = LlmInvoker::new(Arc::new(CannedClient {
            reply: "x".to_string(),
        }))
        .with_system_prompt("You are a researcher.");

        let rendered = invoker
            .render_system(&[Capability::WebSearch, Capability::MemoryRecall])
            .unwrap();
        assert!(rendered.starts_with("You are a researcher."));
        assert!(rendered.contains("web-search"));
        assert!(rendered.contains("memory-recall"));
    }

    #[test]
    fn no_tool_line_when_capability_set_empty() {
        let invoker = LlmInvoker::new(Arc::new(CannedClient {
            reply: "x".to_string(),
        }));
        assert!(invoker.render_system(&[]).is_none());
    }
}
