//! Deterministic speaker assignment.
//!
//! Speaker pools are keyed by profile and gender. Selection hashes a stable
//! key that carries no time component, so the same jewel always speaks with
//! the same voice even across days.

use message_core::select::stable_index;
use message_core::{Gender, Locale};

use crate::error::VoiceError;
use crate::profile::VoiceProfile;

/// Build the stable selection key for a synthesis request. Unlike the
/// content seed this has no time bucket on purpose.
pub fn stable_key(
    locale: Locale,
    gender: Gender,
    profile: VoiceProfile,
    theme: &str,
    subtheme: &str,
) -> String {
    format!(
        "{}|{}|{}|{theme}|{subtheme}",
        locale.code(),
        gender.code(),
        profile.id()
    )
}

fn pool(profile: VoiceProfile, gender: Gender) -> &'static [&'static str] {
    match (profile, gender) {
        (VoiceProfile::IntimateWhisper, Gender::Masculine) => &["onyx", "echo"],
        (VoiceProfile::IntimateWhisper, Gender::Feminine) => &["shimmer", "nova"],

        (VoiceProfile::MeditativeBreath, Gender::Masculine) => &["echo", "onyx"],
        (VoiceProfile::MeditativeBreath, Gender::Feminine) => &["shimmer", "nova"],

        (VoiceProfile::CarnalPresence, Gender::Masculine) => &["onyx"],
        (VoiceProfile::CarnalPresence, Gender::Feminine) => &["nova"],

        (VoiceProfile::AncientRitual, Gender::Masculine) => &["onyx", "echo"],
        (VoiceProfile::AncientRitual, Gender::Feminine) => &["nova"],

        (VoiceProfile::ComplicitVoice, Gender::Masculine) => &["echo", "onyx"],
        (VoiceProfile::ComplicitVoice, Gender::Feminine) => &["nova", "shimmer"],

        (VoiceProfile::DistantEcho, Gender::Masculine) => &["echo", "onyx"],
        (VoiceProfile::DistantEcho, Gender::Feminine) => &["shimmer"],

        (_, Gender::Neutral) => &["alloy"],
    }
}

/// Pick the synthesis speaker for a profile, gender and stable key.
pub fn pick_speaker(
    profile: VoiceProfile,
    gender: Gender,
    key: &str,
) -> Result<&'static str, VoiceError> {
    let candidates = pool(profile, gender);
    let idx = stable_index(key, candidates.len())
        .map_err(|e| VoiceError::InvalidInput(e.to_string()))?;
    Ok(candidates[idx])
}
