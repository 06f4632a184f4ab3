use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use super::endpoints::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ResponseFormat,
    DEFAULT_OPENAI_MODEL, DEFAULT_OPENROUTER_MODEL, OPENAI_CHAT_URL, OPENROUTER_CHAT_URL,
};
use super::generator::{GenerationPrompt, TextGenerator};

#[derive(Debug, Error)]
pub enum ApiConnectionError {
    #[error("API key not found in environment: {0}")]
    MissingApiKey(String),
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("API error {status}: {error_body}")]
    ApiError {
        status: reqwest::StatusCode,
        error_body: String,
    },
    #[error("API returned no usable content")]
    EmptyResponse,
    #[error("Invalid response content: {0}")]
    InvalidContent(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    OpenRouter,
}

impl ProviderKind {
    pub fn default_api_key_env_var(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::OpenRouter => "OPENROUTER_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => DEFAULT_OPENAI_MODEL,
            ProviderKind::OpenRouter => DEFAULT_OPENROUTER_MODEL,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::OpenAi => write!(f, "openai"),
            ProviderKind::OpenRouter => write!(f, "openrouter"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "openrouter" => Ok(ProviderKind::OpenRouter),
            other => Err(format!("unsupported provider '{}'", other)),
        }
    }
}

/// OpenAI-compatible chat-completions backend.
///
/// `api_key` holds the *name* of the environment variable carrying the key; it is
/// resolved on every call so a missing key surfaces as
/// [`ApiConnectionError::MissingApiKey`] instead of failing at startup.
#[derive(Clone, Debug)]
pub enum Provider {
    OpenAi {
        api_key: String,
        model: String,
        client: Client,
    },
    OpenRouter {
        api_key: String,
        model: String,
        client: Client,
    },
}

impl Provider {
    pub fn new(
        kind: ProviderKind,
        api_key_env_var_name: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, ApiConnectionError> {
        let client = Client::builder().timeout(timeout).build()?;
        let api_key = api_key_env_var_name.to_string();
        let model = model.to_string();
        Ok(match kind {
            ProviderKind::OpenAi => Provider::OpenAi {
                api_key,
                model,
                client,
            },
            ProviderKind::OpenRouter => Provider::OpenRouter {
                api_key,
                model,
                client,
            },
        })
    }

    pub fn openai(api_key_env_var_name: &str) -> Result<Self, ApiConnectionError> {
        Self::new(
            ProviderKind::OpenAi,
            api_key_env_var_name,
            DEFAULT_OPENAI_MODEL,
            Duration::from_secs(120),
        )
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            Provider::OpenAi { .. } => ProviderKind::OpenAi,
            Provider::OpenRouter { .. } => ProviderKind::OpenRouter,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Provider::OpenAi { model, .. } | Provider::OpenRouter { model, .. } => model,
        }
    }

    pub async fn call_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ApiConnectionError> {
        let (api_key_env_var_name, client, url) = match self {
            Provider::OpenAi {
                api_key, client, ..
            } => (api_key, client, OPENAI_CHAT_URL),
            Provider::OpenRouter {
                api_key, client, ..
            } => (api_key, client, OPENROUTER_CHAT_URL),
        };

        let actual_api_key = env::var(api_key_env_var_name)
            .map_err(|_| ApiConnectionError::MissingApiKey(api_key_env_var_name.clone()))?;

        let mut builder = client
            .post(url)
            .bearer_auth(actual_api_key)
            .header("Content-Type", "application/json");

        if let Provider::OpenRouter { .. } = self {
            let site_url =
                env::var("SITE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
            let app_name = env::var("APP_NAME").unwrap_or_else(|_| "MealOptim".to_string());
            builder = builder.header("HTTP-Referer", site_url).header("X-Title", app_name);
        }

        debug!(model = %request.model, messages = request.messages.len(), "sending chat completion");
        let response = builder.json(&request).send().await?;

        if response.status().is_success() {
            let chat_response = response.json::<ChatCompletionResponse>().await?;
            Ok(chat_response)
        } else {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            Err(ApiConnectionError::ApiError { status, error_body })
        }
    }
}

#[async_trait]
impl TextGenerator for Provider {
    async fn generate(&self, prompt: &GenerationPrompt) -> Result<String, ApiConnectionError> {
        let request = ChatCompletionRequest {
            model: self.model().to_string(),
            messages: vec![
                ChatMessage::system(prompt.system.clone()),
                ChatMessage::user(prompt.user.clone()),
            ],
            response_format: Some(ResponseFormat::json_object()),
            temperature: Some(prompt.temperature),
            max_tokens: Some(prompt.max_tokens),
        };

        let response = self.call_chat_completion(request).await?;
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ApiConnectionError::EmptyResponse)?;
        debug!(chars = content.len(), "received completion");
        Ok(content)
    }
}
