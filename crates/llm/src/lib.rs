//! Capability Invoker for Prospectus: the LLM client stack.
//!
//! The graph executor consumes the [`CapabilityInvoker`] trait only; this
//! crate supplies the production implementation — a DeepSeek
//! (OpenAI-compatible) client, an opt-in retry wrapper, and a semaphore
//! that bounds concurrent invocations.

pub mod client;
pub mod config;
pub mod deepseek;
pub mod invoker;
pub mod retry;

pub use client::{ChatMessage, LlmClient, LlmRequest, LlmResponse, Role, TokenUsage};
pub use config::{build_invoker, LlmConfig};
pub use deepseek::DeepSeekClient;
pub use invoker::{CapabilityInvoker, LlmInvoker, SemaphoredInvoker};
pub use retry::{RetryConfig, RetryingClient};
