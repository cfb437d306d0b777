//! OpenAI-compatible chat completion client for inquiry drafts.

use std::time::Duration;

use nihontowatch_core::inquiry::{parse_draft_response, DraftParseError, EmailDraft, InquiryPrompt};
use serde::Deserialize;
use serde_json::json;

use crate::config::LlmConfig;

/// Generation is slow; allow well beyond a typical request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(45);

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("LLM endpoint is not configured")]
    NotConfigured,

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("LLM endpoint returned HTTP {0}")]
    HttpStatus(u16),

    #[error("LLM response had no message content")]
    EmptyResponse,

    #[error(transparent)]
    Draft(#[from] DraftParseError),
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

pub struct LlmClient {
    client: reqwest::Client,
    config: LlmConfig,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_url.is_some() && self.config.api_key.is_some()
    }

    /// Run the prompt and parse the reply into a validated draft.
    pub async fn draft_email(&self, prompt: &InquiryPrompt) -> Result<EmailDraft, LlmError> {
        let (Some(url), Some(key)) = (&self.config.api_url, &self.config.api_key) else {
            return Err(LlmError::NotConfigured);
        };

        let body = json!({
            "model": self.config.model,
            "temperature": 0.3,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": prompt.system },
                { "role": "user", "content": prompt.user },
            ],
        });

        let response = self
            .client
            .post(url)
            .bearer_auth(key)
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(LlmError::HttpStatus(response.status().as_u16()));
        }

        let completion: ChatCompletion = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)?;

        Ok(parse_draft_response(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_client_refuses() {
        let client = LlmClient::new(LlmConfig::default()).unwrap();
        assert!(!client.is_configured());
        let prompt = InquiryPrompt {
            system: "s".into(),
            user: "u".into(),
        };
        assert!(matches!(
            client.draft_email(&prompt).await,
            Err(LlmError::NotConfigured)
        ));
    }

    #[test]
    fn completion_shape_parses() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"{}"}}]}"#;
        let parsed: ChatCompletion = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("{}"));
    }
}
