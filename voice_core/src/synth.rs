//! Speech synthesis providers.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::VoiceError;

pub const SYNTH_MODEL: &str = "gpt-4o-mini-tts";

/// Upstream speech engine. Implementations return raw MP3 bytes.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, speaker: &str, text: &str) -> Result<Vec<u8>, VoiceError>;
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    response_format: &'a str,
    speed: f32,
}

/// OpenAI `audio/speech` client.
pub struct OpenAiSpeech {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiSpeech {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            base_url: "https://api.openai.com".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSpeech {
    async fn synthesize(&self, speaker: &str, text: &str) -> Result<Vec<u8>, VoiceError> {
        let body = SpeechRequest {
            model: SYNTH_MODEL,
            voice: speaker,
            input: text,
            response_format: "mp3",
            // Slightly slower than realtime reads more naturally.
            speed: 0.95,
        };

        let res = self
            .client
            .post(format!("{}/v1/audio/speech", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| VoiceError::UpstreamUnavailable(format!("speech request failed: {e}")))?;

        if !res.status().is_success() {
            let status = res.status();
            let detail = res.text().await.unwrap_or_default();
            return Err(VoiceError::UpstreamUnavailable(format!(
                "speech API returned {status}: {detail}"
            )));
        }

        let bytes = res
            .bytes()
            .await
            .map_err(|e| VoiceError::UpstreamUnavailable(format!("speech body read failed: {e}")))?;
        Ok(bytes.to_vec())
    }
}
