//! Synthesis gateway: the one entry point for turning a message into audio.
//!
//! Pipeline: resolve profile, shape text, pick speaker, derive the content
//! cache key, then either serve the cached object or synthesize and upload.
//! The cache key covers everything that changes the audible result, so a
//! cache hit is always safe to serve.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use message_core::{Gender, Locale};

use crate::error::{StorageError, VoiceError};
use crate::profile::{pick_profile, PlaybackPreset, SynthesisMeta, VoiceProfile};
use crate::shape::shape;
use crate::speaker::{pick_speaker, stable_key};
use crate::store::ObjectStore;
use crate::synth::{SpeechSynthesizer, SYNTH_MODEL};

/// Bump to invalidate every cached object at once.
pub const CACHE_VERSION: &str = "v2";

const DEFAULT_SYNTH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Serialize)]
pub struct SynthesisOutcome {
    pub url: String,
    pub voice_profile: VoiceProfile,
    #[serde(flatten)]
    pub preset: PlaybackPreset,
    pub cached: bool,
}

pub struct SynthesisGateway {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    store: Arc<dyn ObjectStore>,
    synth_timeout: Duration,
}

impl SynthesisGateway {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            synthesizer,
            store,
            synth_timeout: DEFAULT_SYNTH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.synth_timeout = timeout;
        self
    }

    pub async fn synthesize(
        &self,
        text: &str,
        locale: Locale,
        gender: Gender,
        meta: &SynthesisMeta,
    ) -> Result<SynthesisOutcome, VoiceError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(VoiceError::InvalidInput("text must not be empty".to_string()));
        }

        let profile = pick_profile(meta);
        let shaped = shape(text, locale, profile);

        let theme = meta.theme.as_deref().unwrap_or("");
        let subtheme = meta.subtheme.as_deref().unwrap_or("");
        let key = stable_key(locale, gender, profile, theme, subtheme);
        let speaker = pick_speaker(profile, gender, &key)?;

        let cache_key = content_key(speaker, locale, profile, &shaped);
        let path = object_path(locale, profile, &cache_key);
        let url = self.store.public_url(&path);

        match self.store.get(&path).await {
            Ok(_) => {
                debug!(%path, %speaker, "serving cached audio");
                return Ok(SynthesisOutcome {
                    url,
                    voice_profile: profile,
                    preset: profile.preset(),
                    cached: true,
                });
            }
            Err(StorageError::NotFound) => {}
            Err(e) => return Err(VoiceError::Storage(e.into())),
        }

        info!(profile = profile.id(), %speaker, chars = shaped.chars().count(), "synthesizing audio");
        let bytes = tokio::time::timeout(
            self.synth_timeout,
            self.synthesizer.synthesize(speaker, &shaped),
        )
        .await
        .map_err(|_| VoiceError::UpstreamUnavailable("speech synthesis timed out".to_string()))??;

        match self.store.put(&path, bytes).await {
            Ok(()) => {}
            // A concurrent request uploaded the same content first.
            Err(StorageError::AlreadyExists) => {
                warn!(%path, "lost upload race, serving existing object");
            }
            Err(e) => return Err(VoiceError::Storage(e.into())),
        }

        Ok(SynthesisOutcome {
            url,
            voice_profile: profile,
            preset: profile.preset(),
            cached: false,
        })
    }
}

fn content_key(speaker: &str, locale: Locale, profile: VoiceProfile, shaped: &str) -> String {
    let material = format!(
        "{CACHE_VERSION}|{SYNTH_MODEL}|{speaker}|{}|{}|{shaped}",
        locale.code(),
        profile.id()
    );
    hex::encode(Sha256::digest(material.as_bytes()))
}

fn object_path(locale: Locale, profile: VoiceProfile, cache_key: &str) -> String {
    format!("{}/{}/{cache_key}.mp3", locale.code(), profile.id())
}
