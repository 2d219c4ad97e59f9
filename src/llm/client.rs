use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

/// One completion call against the text-generation service
#[derive(Debug, Clone)]
pub struct CompletionParams<'a> {
    pub api_key: &'a str,
    pub system_prompt: &'a str,
    pub user_prompt: &'a str,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Ask the service for a single machine-parseable JSON object
    pub structured: bool,
}

/// Failure classes of the text-generation service. Credential failures need
/// new credentials; throttled calls may be retried by the caller with
/// backoff; everything else is generic.
#[derive(Debug)]
pub enum LlmError {
    Credential(String),
    Throttled(String),
    Empty,
    Other(String),
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmError::Credential(msg) => write!(f, "credential error: {}", msg),
            LlmError::Throttled(msg) => write!(f, "rate limited: {}", msg),
            LlmError::Empty => write!(f, "empty response from text-generation service"),
            LlmError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for LlmError {}

/// Classify a failure by its message content. The service reports auth and
/// rate-limit problems with recognizable signatures in the body.
pub(crate) fn classify_failure(message: String) -> LlmError {
    let lower = message.to_lowercase();

    const CREDENTIAL_SIGNATURES: &[&str] = &[
        "api key",
        "api_key",
        "unauthorized",
        "authentication",
        "invalid key",
        "401",
        "403",
    ];
    const THROTTLE_SIGNATURES: &[&str] = &[
        "rate limit",
        "rate_limit",
        "too many requests",
        "429",
        "quota",
    ];

    if CREDENTIAL_SIGNATURES.iter().any(|s| lower.contains(s)) {
        LlmError::Credential(message)
    } else if THROTTLE_SIGNATURES.iter().any(|s| lower.contains(s)) {
        LlmError::Throttled(message)
    } else {
        LlmError::Other(message)
    }
}

/// Seam for the text-generation service so the pipeline can be exercised
/// against a stub in tests.
#[async_trait]
pub trait TextGeneration: Send + Sync {
    async fn complete(&self, params: CompletionParams<'_>) -> Result<String, LlmError>;
}

/// Client for an OpenAI-compatible chat-completions API
pub struct LlmClient {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl LlmClient {
    pub fn new(base_url: String, model: String) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            client,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl TextGeneration for LlmClient {
    async fn complete(&self, params: CompletionParams<'_>) -> Result<String, LlmError> {
        let mut body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": params.system_prompt },
                { "role": "user", "content": params.user_prompt },
            ],
            "temperature": params.temperature,
            "max_tokens": params.max_tokens,
        });
        if params.structured {
            body["response_format"] = json!({ "type": "json_object" });
        }

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", params.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| classify_failure(format!("request failed: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => LlmError::Credential(format!("{}: {}", status, body)),
                429 => LlmError::Throttled(format!("{}: {}", status, body)),
                _ => classify_failure(format!("{}: {}", status, body)),
            });
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Other(format!("malformed completion response: {}", e)))?;

        match parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
        {
            Some(content) if !content.trim().is_empty() => Ok(content),
            _ => Err(LlmError::Empty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_signatures() {
        assert!(matches!(
            classify_failure("Incorrect API key provided".to_string()),
            LlmError::Credential(_)
        ));
        assert!(matches!(
            classify_failure("401 Unauthorized".to_string()),
            LlmError::Credential(_)
        ));
        assert!(matches!(
            classify_failure("authentication failed".to_string()),
            LlmError::Credential(_)
        ));
    }

    #[test]
    fn test_throttle_signatures() {
        assert!(matches!(
            classify_failure("Rate limit reached for requests".to_string()),
            LlmError::Throttled(_)
        ));
        assert!(matches!(
            classify_failure("429 Too Many Requests".to_string()),
            LlmError::Throttled(_)
        ));
        assert!(matches!(
            classify_failure("You exceeded your current quota".to_string()),
            LlmError::Throttled(_)
        ));
    }

    #[test]
    fn test_everything_else_is_generic() {
        assert!(matches!(
            classify_failure("connection reset by peer".to_string()),
            LlmError::Other(_)
        ));
        assert!(matches!(
            classify_failure("500 Internal Server Error".to_string()),
            LlmError::Other(_)
        ));
    }

    #[test]
    fn test_empty_response_parses_to_none_content() {
        let parsed: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant"}}]}"#).unwrap();
        assert!(parsed.choices[0].message.content.is_none());

        let parsed: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(parsed.choices.is_empty());
    }
}
