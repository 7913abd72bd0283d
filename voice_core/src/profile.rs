//! Voice profile resolution.
//!
//! The profile is never persisted: it is recomputed from personalization
//! metadata on every synthesis call, so the mapping rules below are the
//! single source of truth for how a jewel "sounds".

use serde::{Deserialize, Serialize};

use message_core::text::normalize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceProfile {
    IntimateWhisper,
    MeditativeBreath,
    CarnalPresence,
    AncientRitual,
    ComplicitVoice,
    DistantEcho,
}

impl VoiceProfile {
    /// Stable id used in cache keys and storage paths.
    pub fn id(&self) -> &'static str {
        match self {
            VoiceProfile::IntimateWhisper => "intimate_whisper",
            VoiceProfile::MeditativeBreath => "meditative_breath",
            VoiceProfile::CarnalPresence => "carnal_presence",
            VoiceProfile::AncientRitual => "ancient_ritual",
            VoiceProfile::ComplicitVoice => "complicit_voice",
            VoiceProfile::DistantEcho => "distant_echo",
        }
    }

    /// Playback preset applied client-side: the core never plays audio.
    pub fn preset(&self) -> PlaybackPreset {
        match self {
            // Slightly slow, intimate.
            VoiceProfile::IntimateWhisper => PlaybackPreset::new(0.90, 350, 550),
            // Very slow, meditative.
            VoiceProfile::MeditativeBreath => PlaybackPreset::new(0.85, 500, 800),
            // Near-normal, natural.
            VoiceProfile::CarnalPresence => PlaybackPreset::new(0.98, 250, 450),
            // Slow, solemn.
            VoiceProfile::AncientRitual => PlaybackPreset::new(0.88, 450, 900),
            // Normal, conversational.
            VoiceProfile::ComplicitVoice => PlaybackPreset::new(1.0, 220, 420),
            // Very slow, long fades.
            VoiceProfile::DistantEcho => PlaybackPreset::new(0.84, 700, 1200),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackPreset {
    pub playback_rate: f32,
    pub fade_in_ms: u32,
    pub fade_out_ms: u32,
}

impl PlaybackPreset {
    const fn new(playback_rate: f32, fade_in_ms: u32, fade_out_ms: u32) -> Self {
        Self {
            playback_rate,
            fade_in_ms,
            fade_out_ms,
        }
    }
}

/// Optional personalization hints sent along with a synthesis request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SynthesisMeta {
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub subtheme: Option<String>,
    #[serde(default)]
    pub is_gift: Option<bool>,
    #[serde(default)]
    pub is_memorial: Option<bool>,
    #[serde(default)]
    pub is_nature: Option<bool>,
    #[serde(default)]
    pub is_joyful_memory: Option<bool>,
}

impl SynthesisMeta {
    pub(crate) fn signals(&self) -> String {
        format!(
            "{} {}",
            normalize(self.theme.as_deref().unwrap_or("")),
            normalize(self.subtheme.as_deref().unwrap_or(""))
        )
    }
}

/// Resolve the voice profile from metadata. First matching rule wins; the
/// order encodes priority (grief over gift, ritual over nature, ...).
pub fn pick_profile(meta: &SynthesisMeta) -> VoiceProfile {
    let signals = meta.signals();
    let has = |words: &[&str]| words.iter().any(|w| signals.contains(w));

    if meta.is_memorial.unwrap_or(false)
        || has(&["deuil", "absence", "adieu", "perte", "manque", "grief", "loss"])
    {
        return VoiceProfile::DistantEcho;
    }
    if has(&[
        "heritage", "memoire", "transmission", "ancetre", "famille", "legacy", "ancestry",
    ]) {
        return VoiceProfile::AncientRitual;
    }
    if meta.is_nature.unwrap_or(false)
        || has(&[
            "nature", "foret", "arbre", "silence", "calme", "paix", "apaisement", "forest",
        ])
    {
        return VoiceProfile::MeditativeBreath;
    }
    if has(&["desir", "passion", "sensuel", "peau", "charnel", "desire", "sensual"]) {
        return VoiceProfile::CarnalPresence;
    }
    if meta.is_joyful_memory.unwrap_or(false)
        || has(&["joie", "rire", "amitie", "complice", "fratrie", "joy", "laughter", "friendship"])
    {
        return VoiceProfile::ComplicitVoice;
    }
    if meta.is_gift.unwrap_or(false) || has(&["cadeau", "offert", "gift"]) {
        return VoiceProfile::IntimateWhisper;
    }

    VoiceProfile::IntimateWhisper
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(theme: &str, subtheme: &str) -> SynthesisMeta {
        SynthesisMeta {
            theme: Some(theme.to_string()),
            subtheme: Some(subtheme.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_grief_theme_resolves_distant_echo() {
        let profile = pick_profile(&meta("Deuil", ""));
        assert_eq!(profile, VoiceProfile::DistantEcho);
        let preset = profile.preset();
        assert_eq!(preset.playback_rate, 0.84);
        assert!(preset.fade_in_ms >= 700);
        assert!(preset.fade_out_ms >= 1200);
    }

    #[test]
    fn test_memorial_flag_wins_over_gift() {
        let m = SynthesisMeta {
            is_memorial: Some(true),
            is_gift: Some(true),
            ..Default::default()
        };
        assert_eq!(pick_profile(&m), VoiceProfile::DistantEcho);
    }

    #[test]
    fn test_heritage_keywords() {
        assert_eq!(pick_profile(&meta("Héritage", "")), VoiceProfile::AncientRitual);
        assert_eq!(pick_profile(&meta("", "transmission")), VoiceProfile::AncientRitual);
    }

    #[test]
    fn test_nature_and_calm() {
        assert_eq!(pick_profile(&meta("la forêt", "")), VoiceProfile::MeditativeBreath);
        let m = SynthesisMeta {
            is_nature: Some(true),
            ..Default::default()
        };
        assert_eq!(pick_profile(&m), VoiceProfile::MeditativeBreath);
    }

    #[test]
    fn test_default_is_intimate_whisper() {
        assert_eq!(pick_profile(&SynthesisMeta::default()), VoiceProfile::IntimateWhisper);
        assert_eq!(pick_profile(&meta("inconnu", "rien")), VoiceProfile::IntimateWhisper);
    }

    #[test]
    fn test_joyful_memory_flag() {
        let m = SynthesisMeta {
            is_joyful_memory: Some(true),
            ..Default::default()
        };
        assert_eq!(pick_profile(&m), VoiceProfile::ComplicitVoice);
    }
}
