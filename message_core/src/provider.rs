//! Optional provider-generated text backend.
//!
//! The historical product carried several competing generation endpoints;
//! here they collapse into one pipeline with a strategy switch. The provider
//! path may fail (network, quota); the template composer is the guaranteed
//! fallback, because text generation must not fail once a credit has been
//! consumed.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::compose::{compose, Locale, PersonalizationProfile};
use crate::intent::{classify, Intent};
use crate::lines;
use crate::seed::content_seed;
use crate::text::{clean, strip_internal_leak};

/// Which backend produces the message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageStrategy {
    #[default]
    Template,
    Provider,
}

/// External generative-text collaborator.
#[async_trait]
pub trait TextProvider: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// OpenAI-style chat completion client.
pub struct OpenAiTextProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u16,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

impl OpenAiTextProvider {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: "https://api.openai.com".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl TextProvider for OpenAiTextProvider {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let req = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "You write short, intimate spoken messages. Plain text only.",
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: 200,
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await?
            .error_for_status()?
            .json::<ChatResponse>()
            .await?;

        response
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow!("provider returned no content"))
    }
}

/// Unified message generation entry point.
pub struct Composer {
    strategy: MessageStrategy,
    provider: Option<Arc<dyn TextProvider>>,
}

impl Composer {
    pub fn template() -> Self {
        Self {
            strategy: MessageStrategy::Template,
            provider: None,
        }
    }

    pub fn with_provider(provider: Arc<dyn TextProvider>) -> Self {
        Self {
            strategy: MessageStrategy::Provider,
            provider: Some(provider),
        }
    }

    pub fn strategy(&self) -> MessageStrategy {
        self.strategy
    }

    /// Generate the message text. Infallible from the caller's perspective:
    /// provider errors fall back to the template composer, and the template
    /// composer falls back to a fixed sentence.
    pub async fn generate(&self, identifier: &str, profile: &PersonalizationProfile) -> GeneratedMessage {
        let sanitized = profile.sanitized();
        let intent = classify(&sanitized.theme, &sanitized.subtheme);
        let seed = content_seed(identifier, sanitized.locale, Utc::now());

        if self.strategy == MessageStrategy::Provider {
            if let Some(provider) = &self.provider {
                let prompt = build_prompt(&sanitized.locale, profile, intent);
                match provider.generate(&prompt).await {
                    Ok(raw) => {
                        let text = clean(&strip_internal_leak(&raw));
                        if !text.is_empty() {
                            return GeneratedMessage { text, intent };
                        }
                        warn!("text provider returned empty output, using template");
                    }
                    Err(e) => {
                        warn!("text provider failed ({e}), using template");
                    }
                }
            }
        }

        let text = compose(profile, intent, &seed).unwrap_or_else(|_| {
            lines::fallback_sentence(sanitized.locale, &sanitized.first_name)
        });
        GeneratedMessage { text, intent }
    }
}

/// Ephemeral text artifact; persistence is a collaborator concern.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedMessage {
    pub text: String,
    pub intent: Intent,
}

fn build_prompt(locale: &Locale, profile: &PersonalizationProfile, intent: Intent) -> String {
    let p = profile.sanitized();
    let mut prompt = match locale {
        Locale::Fr => format!(
            "Écris un court message parlé (4 phrases max) pour {}, sur le thème {}.",
            p.first_name,
            intent.name()
        ),
        Locale::En => format!(
            "Write a short spoken message (4 sentences max) for {}, on the theme of {}.",
            p.first_name,
            intent.name()
        ),
    };
    if !p.place.is_empty() {
        prompt.push_str(&format!(" Place: {}.", p.place));
    }
    if !p.memory.is_empty() {
        prompt.push_str(&format!(" Memory: {}.", p.memory));
    }
    prompt
}
