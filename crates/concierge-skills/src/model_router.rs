//! Model Router: answers unmatched chat messages with a mock text or an OpenAI-compatible chat completion.

use concierge_core::{CoreConfig, FallbackError, FallbackResponder};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const RESPONDER_NAME: &str = "ModelRouter";
/// Bearer key for live mode.
pub const ENV_LLM_API_KEY: &str = "OPENAI_API_KEY";

/// How unmatched messages are answered: mock (simulated generation), live (external API) or off.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LlmMode {
    #[default]
    Mock,
    Live,
    Off,
}

impl LlmMode {
    /// Parses the `llm_mode` setting; unknown values mean mock.
    pub fn from_setting(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "live" => LlmMode::Live,
            "off" | "none" | "disabled" => LlmMode::Off,
            _ => LlmMode::Mock,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LlmMode::Mock => "mock",
            LlmMode::Live => "live",
            LlmMode::Off => "off",
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Routes a message to a mock generator or a live chat-completion endpoint.
pub struct ModelRouter {
    mode: LlmMode,
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    model: String,
    system_prompt: String,
}

impl ModelRouter {
    /// Builds a router from the `llm_*` settings; the API key comes from [`ENV_LLM_API_KEY`].
    pub fn from_config(config: &CoreConfig) -> Result<Self, FallbackError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.llm_timeout_secs))
            .build()
            .map_err(|e| FallbackError::Transport(Box::new(e)))?;
        let api_key = std::env::var(ENV_LLM_API_KEY)
            .ok()
            .filter(|k| !k.trim().is_empty());
        Ok(Self {
            mode: LlmMode::from_setting(&config.llm_mode),
            client,
            api_url: config.llm_api_url.clone(),
            api_key,
            model: config.llm_model.clone(),
            system_prompt: config.llm_system_prompt.clone(),
        })
    }

    pub fn with_mode(mut self, mode: LlmMode) -> Self {
        self.mode = mode;
        self
    }

    /// Overrides the key read from the environment.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn mode(&self) -> LlmMode {
        self.mode
    }

    /// False in off mode; callers then skip escalation entirely.
    pub fn is_enabled(&self) -> bool {
        self.mode != LlmMode::Off
    }

    /// Mock LLM: a deterministic reply quoting the start of the message.
    fn mock_generate(&self, message: &str) -> String {
        let preview = message
            .chars()
            .take(80)
            .chain(if message.chars().count() > 80 { "…" } else { "" }.chars())
            .collect::<String>();
        format!(
            "[Mock 응답] '{}'에 대해 정확한 답변을 찾지 못했어요. 상품명이나 궁금한 내용을 조금 더 구체적으로 알려주시면 다시 안내해 드릴게요.",
            preview.trim()
        )
    }

    async fn live_generate(&self, message: &str) -> Result<String, FallbackError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| FallbackError::NotConfigured(format!("{} is not set", ENV_LLM_API_KEY)))?;
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &self.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: message,
                },
            ],
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(key)
            .json(&body)
            .send()
            .await
            .map_err(|e| FallbackError::Transport(Box::new(e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!(
                target: "concierge::fallback",
                status = status.as_u16(),
                detail = %detail.chars().take(200).collect::<String>(),
                "Chat completion rejected"
            );
            return Err(FallbackError::Status(status.as_u16()));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| FallbackError::Transport(Box::new(e)))?;
        completion_text(parsed)
    }
}

/// Content of the first choice, trimmed; blank counts as missing.
fn completion_text(response: ChatResponse) -> Result<String, FallbackError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or(FallbackError::EmptyCompletion)
}

#[async_trait::async_trait]
impl FallbackResponder for ModelRouter {
    fn name(&self) -> &str {
        RESPONDER_NAME
    }

    async fn respond(&self, message: &str) -> Result<String, FallbackError> {
        tracing::debug!(target: "concierge::fallback", mode = self.mode.as_str(), "Generating fallback answer");
        match self.mode {
            LlmMode::Mock => Ok(self.mock_generate(message)),
            LlmMode::Live => self.live_generate(message).await,
            LlmMode::Off => Err(FallbackError::NotConfigured("fallback is off".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(mode: &str) -> CoreConfig {
        CoreConfig {
            app_name: "test".into(),
            port: 0,
            knowledge_path: String::new(),
            static_dir: String::new(),
            frontend_enabled: false,
            llm_mode: mode.into(),
            // Nothing listens on port 9 locally.
            llm_api_url: "http://127.0.0.1:9/v1/chat/completions".into(),
            llm_model: "gpt-3.5-turbo".into(),
            llm_system_prompt: "answer briefly".into(),
            llm_timeout_secs: 2,
            session_ttl_secs: 60,
            thresholds: Default::default(),
        }
    }

    #[test]
    fn mode_parsing() {
        assert_eq!(LlmMode::from_setting("live"), LlmMode::Live);
        assert_eq!(LlmMode::from_setting(" OFF "), LlmMode::Off);
        assert_eq!(LlmMode::from_setting("mock"), LlmMode::Mock);
        assert_eq!(LlmMode::from_setting("whatever"), LlmMode::Mock);
    }

    #[tokio::test]
    async fn mock_is_deterministic_and_quotes_message() {
        let router = ModelRouter::from_config(&config("mock")).unwrap();
        let a = router.respond("환불 규정이 궁금해요").await.unwrap();
        let b = router.respond("환불 규정이 궁금해요").await.unwrap();
        assert_eq!(a, b);
        assert!(a.contains("'환불 규정이 궁금해요'"));
    }

    #[tokio::test]
    async fn mock_preview_is_capped() {
        let router = ModelRouter::from_config(&config("mock")).unwrap();
        let text = router.respond(&"가".repeat(200)).await.unwrap();
        assert!(text.contains(&format!("{}…", "가".repeat(80))));
        assert!(!text.contains(&"가".repeat(81)));
    }

    #[tokio::test]
    async fn off_mode_refuses() {
        let router = ModelRouter::from_config(&config("off")).unwrap();
        assert!(!router.is_enabled());
        let err = router.respond("hi").await.unwrap_err();
        assert!(matches!(err, FallbackError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn live_mode_without_key_is_not_configured() {
        let mut router = ModelRouter::from_config(&config("live")).unwrap();
        router.api_key = None;
        let err = router.respond("hi").await.unwrap_err();
        assert!(matches!(err, FallbackError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn live_mode_unreachable_endpoint_is_transport_error() {
        let router = ModelRouter::from_config(&config("live"))
            .unwrap()
            .with_api_key("sk-test");
        let err = router.respond("hi").await.unwrap_err();
        assert!(matches!(err, FallbackError::Transport(_)));
    }

    #[test]
    fn completion_text_takes_first_choice() {
        let parsed: ChatResponse = serde_json::from_value(serde_json::json!({
            "choices": [
                { "message": { "role": "assistant", "content": "  첫 번째 답변 " } },
                { "message": { "role": "assistant", "content": "두 번째" } }
            ]
        }))
        .unwrap();
        assert_eq!(completion_text(parsed).unwrap(), "첫 번째 답변");
    }

    #[test]
    fn blank_or_missing_completion_is_an_error() {
        let empty: ChatResponse = serde_json::from_value(serde_json::json!({ "choices": [] })).unwrap();
        assert!(matches!(completion_text(empty), Err(FallbackError::EmptyCompletion)));

        let blank: ChatResponse = serde_json::from_value(serde_json::json!({
            "choices": [{ "message": { "content": "   " } }]
        }))
        .unwrap();
        assert!(matches!(completion_text(blank), Err(FallbackError::EmptyCompletion)));

        let null: ChatResponse = serde_json::from_value(serde_json::json!({
            "choices": [{ "message": { "content": null } }]
        }))
        .unwrap();
        assert!(matches!(completion_text(null), Err(FallbackError::EmptyCompletion)));
    }
}
