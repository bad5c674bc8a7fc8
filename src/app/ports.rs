use crate::error::Result;
use async_trait::async_trait;

/// Text-in/text-out generative model. Responses are untrusted free-form text.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String>;
}
