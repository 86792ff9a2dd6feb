/// LLM Gateway — the single point of entry for all model-server calls.
///
/// ARCHITECTURAL RULE: No other module may call the model server directly.
/// All completions MUST go through this module.
///
/// The server speaks the Ollama HTTP API: `/api/tags` for installed models,
/// `/api/generate` for one-shot completions, `/api/chat` as the fallback when
/// a deployment only exposes the chat endpoint. The chat path carries
/// conversational priors, so the fallback always sends a system message
/// declaring a fresh, isolated agent.
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

pub mod coerce;

const TAGS_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_TRANSIENT_RETRIES: u32 = 1;
const FRESH_CONTEXT_SYSTEM: &str = "You are a fresh, isolated extraction agent. \
    This is a new, independent task with no previous context. \
    Ignore any previous conversations.";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("model server unavailable: {0}")]
    UnavailableServer(String),

    #[error("model server call timed out after {0:?}")]
    Timeout(Duration),

    #[error("model server returned HTTP {0}")]
    HttpStatus(u16),

    #[error("malformed model response: {0}")]
    MalformedResponse(String),
}

/// Per-call completion options. Each extractor owns its deadline; the gateway
/// never extends one.
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub top_p: f32,
    /// Response-length cap forwarded to the chat fallback (`num_predict`).
    pub max_tokens: Option<u32>,
    pub deadline: Duration,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            top_p: 0.9,
            max_tokens: None,
            deadline: Duration::from_secs(90),
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: ModelOptions,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: ModelOptions,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ModelOptions {
    temperature: f32,
    top_p: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    message: Option<ChatContent>,
}

#[derive(Debug, Deserialize)]
struct ChatContent {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    #[serde(default)]
    name: String,
}

/// Selects a model from the tag listing: the configured preferred model if
/// installed, else any model whose name contains "llama3", else the first
/// installed model.
fn pick_model(preferred: &str, installed: &[String]) -> Option<String> {
    let preferred_lower = preferred.to_lowercase();
    if let Some(hit) = installed
        .iter()
        .find(|name| name.to_lowercase().contains(&preferred_lower))
    {
        return Some(hit.clone());
    }
    if let Some(hit) = installed
        .iter()
        .find(|name| name.to_lowercase().contains("llama3"))
    {
        return Some(hit.clone());
    }
    installed.first().cloned()
}

/// The single LLM client shared by all extractors.
///
/// Holds no per-call state except the discovered model name, which is
/// resolved once on first use and read-only thereafter.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    host: String,
    preferred_model: String,
    resolved_model: std::sync::Arc<OnceCell<String>>,
}

impl LlmClient {
    pub fn new(host: String, preferred_model: String) -> Self {
        Self {
            client: Client::builder()
                .build()
                .expect("Failed to build HTTP client"),
            host,
            preferred_model,
            resolved_model: std::sync::Arc::new(OnceCell::new()),
        }
    }

    /// Resolves the model to use, polling `/api/tags` on first call and
    /// caching the result for the life of the process.
    pub async fn model(&self) -> Result<&str, LlmError> {
        self.resolved_model
            .get_or_try_init(|| async {
                let url = format!("{}/api/tags", self.host);
                let response = self
                    .client
                    .get(&url)
                    .timeout(TAGS_TIMEOUT)
                    .send()
                    .await
                    .map_err(|e| LlmError::UnavailableServer(e.to_string()))?;
                if !response.status().is_success() {
                    return Err(LlmError::HttpStatus(response.status().as_u16()));
                }
                let tags: TagsResponse = response
                    .json()
                    .await
                    .map_err(|e| LlmError::MalformedResponse(e.to_string()))?;
                let installed: Vec<String> = tags.models.into_iter().map(|m| m.name).collect();
                let model = pick_model(&self.preferred_model, &installed).ok_or_else(|| {
                    LlmError::UnavailableServer("no models installed on the model server".into())
                })?;
                if !model.to_lowercase().contains(&self.preferred_model.to_lowercase()) {
                    warn!(model = %model, "preferred model not installed, using fallback");
                }
                Ok(model)
            })
            .await
            .map(String::as_str)
    }

    /// One-shot completion. Tries `/api/generate` first; on 404 falls back to
    /// `/api/chat` with a fresh-context system message. Transient I/O errors
    /// (timeout, connection reset) are retried once; other 4xx are not.
    pub async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, LlmError> {
        let model = self.model().await?.to_string();

        let mut last_error = None;
        for attempt in 0..=MAX_TRANSIENT_RETRIES {
            if attempt > 0 {
                warn!(attempt, "retrying model server call after transient error");
            }
            match self.try_generate(&model, prompt, options).await {
                Ok(text) => return Ok(text),
                // 404 means this deployment has no generate endpoint; move to chat.
                Err(LlmError::HttpStatus(404)) => {
                    debug!("/api/generate returned 404, falling back to /api/chat");
                    return self.try_chat(&model, prompt, options).await;
                }
                Err(e @ (LlmError::Timeout(_) | LlmError::UnavailableServer(_))) => {
                    last_error = Some(e);
                    continue;
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_error.unwrap_or_else(|| LlmError::UnavailableServer("exhausted retries".into())))
    }

    async fn try_generate(
        &self,
        model: &str,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, LlmError> {
        let body = GenerateRequest {
            model,
            prompt,
            stream: false,
            options: ModelOptions {
                temperature: options.temperature,
                top_p: options.top_p,
                num_predict: options.max_tokens,
            },
        };
        let url = format!("{}/api/generate", self.host);
        let response = self.post(&url, &body, options.deadline).await?;
        Self::extract_text(response)
    }

    async fn try_chat(
        &self,
        model: &str,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, LlmError> {
        let body = ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: FRESH_CONTEXT_SYSTEM,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            stream: false,
            options: ModelOptions {
                temperature: options.temperature,
                top_p: options.top_p,
                num_predict: options.max_tokens.or(Some(500)),
            },
        };
        let url = format!("{}/api/chat", self.host);
        let response = self.post(&url, &body, options.deadline).await?;
        Self::extract_text(response)
    }

    async fn post<B: Serialize>(
        &self,
        url: &str,
        body: &B,
        deadline: Duration,
    ) -> Result<GenerateResponse, LlmError> {
        let response = self
            .client
            .post(url)
            .timeout(deadline)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(deadline)
                } else {
                    LlmError::UnavailableServer(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LlmError::HttpStatus(status.as_u16()));
        }

        response
            .json::<GenerateResponse>()
            .await
            .map_err(|e| LlmError::MalformedResponse(e.to_string()))
    }

    /// Pulls the completion text out of either endpoint's response shape.
    fn extract_text(response: GenerateResponse) -> Result<String, LlmError> {
        if let Some(text) = response.response {
            if !text.is_empty() {
                return Ok(text);
            }
        }
        if let Some(message) = response.message {
            if !message.content.is_empty() {
                return Ok(message.content);
            }
        }
        Err(LlmError::MalformedResponse(
            "response carried no completion text".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_model_prefers_configured_model() {
        let installed = vec!["mistral:7b".to_string(), "llama3.1:8b".to_string()];
        assert_eq!(
            pick_model("llama3.1", &installed),
            Some("llama3.1:8b".to_string())
        );
    }

    #[test]
    fn test_pick_model_falls_back_to_llama3_family() {
        let installed = vec!["mistral:7b".to_string(), "llama3:latest".to_string()];
        assert_eq!(
            pick_model("llama3.1", &installed),
            Some("llama3:latest".to_string())
        );
    }

    #[test]
    fn test_pick_model_falls_back_to_first_installed() {
        let installed = vec!["mistral:7b".to_string(), "phi3:mini".to_string()];
        assert_eq!(
            pick_model("llama3.1", &installed),
            Some("mistral:7b".to_string())
        );
    }

    #[test]
    fn test_pick_model_empty_listing() {
        assert_eq!(pick_model("llama3.1", &[]), None);
    }

    #[test]
    fn test_extract_text_prefers_generate_shape() {
        let response = GenerateResponse {
            response: Some("{\"name\": null}".to_string()),
            message: None,
        };
        assert_eq!(LlmClient::extract_text(response).unwrap(), "{\"name\": null}");
    }

    #[test]
    fn test_extract_text_reads_chat_shape() {
        let response = GenerateResponse {
            response: None,
            message: Some(ChatContent {
                content: "hello".to_string(),
            }),
        };
        assert_eq!(LlmClient::extract_text(response).unwrap(), "hello");
    }

    #[test]
    fn test_extract_text_rejects_empty_payload() {
        let response = GenerateResponse {
            response: Some(String::new()),
            message: None,
        };
        assert!(matches!(
            LlmClient::extract_text(response),
            Err(LlmError::MalformedResponse(_))
        ));
    }
}
