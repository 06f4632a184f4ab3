use async_trait::async_trait;

use super::connection::ApiConnectionError;

/// One system + user exchange sent to the text-generation backend.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationPrompt {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Produces free text for a prompt. The reply is expected to contain a JSON
/// object somewhere in it; see [`super::json_reply`].
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &GenerationPrompt) -> Result<String, ApiConnectionError>;
}
