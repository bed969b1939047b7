//! Chat completion client for OpenAI-compatible endpoints.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::infrastructure::config::LlmSettings;
use crate::infrastructure::ports::{ChatMessage, LlmError, LlmPort, LlmRequest, LlmResponse};

/// Client for any endpoint speaking the OpenAI chat completion protocol.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_url: String,
    model: String,
    api_key: Option<String>,
    use_proxy: bool,
}

impl OpenAiClient {
    pub fn new(settings: &LlmSettings) -> Self {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key: settings.api_key.clone(),
            use_proxy: settings.use_proxy,
        }
    }

    /// Bearer credential to send, if any. A trusted proxy authenticates on
    /// our behalf, so nothing is sent in that case.
    fn bearer(&self) -> Option<&str> {
        if self.use_proxy {
            None
        } else {
            self.api_key.as_deref()
        }
    }
}

#[async_trait]
impl LlmPort for OpenAiClient {
    fn check_configured(&self) -> Result<(), LlmError> {
        if !self.use_proxy && self.api_key.is_none() {
            return Err(LlmError::configuration(
                "API key is missing and no trusted proxy is configured",
            ));
        }
        Ok(())
    }

    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        self.check_configured()?;

        let api_request = OpenAIChatRequest {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let mut builder = self.client.post(&self.api_url).json(&api_request);
        if let Some(key) = self.bearer() {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(LlmError::network)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::status(status.as_u16(), error_text));
        }

        let api_response: OpenAIChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::content(format!("malformed response body: {}", e)))?;

        convert_response(api_response)
    }
}

fn convert_response(response: OpenAIChatResponse) -> Result<LlmResponse, LlmError> {
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(MessageContent::into_text)
        .unwrap_or_default();

    if content.trim().is_empty() {
        return Err(LlmError::content("no text in LLM response"));
    }

    Ok(LlmResponse { content })
}

// =============================================================================
// OpenAI API types
// =============================================================================

#[derive(Debug, Serialize)]
struct OpenAIChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChatResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    #[serde(default)]
    message: OpenAIMessage,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAIMessage {
    #[serde(default)]
    content: Option<MessageContent>,
}

/// `message.content` is either a plain string or a list of content parts.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContentPart {
    Text(String),
    Structured {
        #[serde(default)]
        text: Option<String>,
    },
    Other(serde_json::Value),
}

impl MessageContent {
    fn into_text(self) -> String {
        match self {
            MessageContent::Text(text) => text,
            MessageContent::Parts(parts) => parts
                .into_iter()
                .filter_map(|part| match part {
                    ContentPart::Text(text) => Some(text),
                    ContentPart::Structured { text } => text,
                    ContentPart::Other(_) => None,
                })
                .collect(),
        }
    }
}
