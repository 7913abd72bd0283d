//! Template-based message composition.

use serde::{Deserialize, Serialize};

use crate::error::MessageError;
use crate::intent::Intent;
use crate::lines;
use crate::select::select;
use crate::text::{clamp, clean, strip_internal_leak};

/// Supported locales. Anything that does not start with "en" resolves to the
/// primary locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Fr,
    En,
}

impl Locale {
    pub fn parse(v: &str) -> Self {
        if v.trim().to_lowercase().starts_with("en") {
            Locale::En
        } else {
            Locale::Fr
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Locale::Fr => "fr",
            Locale::En => "en",
        }
    }
}

/// Requested voice gender. Free-form input containing "masc" maps to
/// masculine, "fem" to feminine, everything else stays neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Masculine,
    Feminine,
    #[default]
    Neutral,
}

impl Gender {
    pub fn parse(v: &str) -> Self {
        let x = v.to_lowercase();
        if x.contains("masc") || x.contains("male") && !x.contains("female") {
            Gender::Masculine
        } else if x.contains("fem") {
            Gender::Feminine
        } else {
            Gender::Neutral
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Gender::Masculine => "masculine",
            Gender::Feminine => "feminine",
            Gender::Neutral => "neutral",
        }
    }
}

/// Personalization as entered by the buyer. One profile per jewelry
/// identifier, immutable after setup; most-recent wins if several exist.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PersonalizationProfile {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub place: Option<String>,
    #[serde(default)]
    pub memory: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub subtheme: Option<String>,
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
}

/// Bounded, sanitized view of the profile used for composition.
#[derive(Debug, Clone)]
pub struct Sanitized {
    pub first_name: String,
    pub place: String,
    pub memory: String,
    pub theme: String,
    pub subtheme: String,
    pub gender: Gender,
    pub locale: Locale,
}

impl PersonalizationProfile {
    pub fn sanitized(&self) -> Sanitized {
        let locale = Locale::parse(self.locale.as_deref().unwrap_or(""));
        let gender = Gender::parse(self.voice.as_deref().unwrap_or(""));

        let field = |v: &Option<String>, max: usize| -> String {
            strip_internal_leak(&clamp(&clean(v.as_deref().unwrap_or("")), max))
        };

        let default_name = match locale {
            Locale::Fr => "toi",
            Locale::En => "you",
        };
        let mut first_name = field(&self.first_name, 60);
        if first_name.is_empty() {
            first_name = default_name.to_string();
        }

        Sanitized {
            first_name,
            place: field(&self.place, 120),
            memory: field(&self.memory, 180),
            theme: field(&self.theme, 80),
            subtheme: field(&self.subtheme, 80),
            gender,
            locale,
        }
    }
}

/// Assemble the final message: opening, optional place/memory lines, one
/// intent core line, closing. Each line is picked independently through the
/// deterministic selector with its own seed suffix, so the same seed always
/// reproduces the same message.
pub fn compose(
    profile: &PersonalizationProfile,
    intent: Intent,
    seed: &str,
) -> Result<String, MessageError> {
    let p = profile.sanitized();
    let locale = p.locale;

    let mut parts: Vec<String> = Vec::with_capacity(5);

    let opening = select(&format!("{seed}::opening"), lines::openings(locale))?;
    parts.push(opening.replace("{name}", &p.first_name));

    if !p.place.is_empty() {
        let line = select(&format!("{seed}::place"), lines::place_lines(locale))?;
        parts.push(line.replace("{place}", &p.place));
    }

    if !p.memory.is_empty() {
        let line = select(&format!("{seed}::memory"), lines::memory_lines(locale))?;
        parts.push(line.replace("{memory}", &p.memory));
    } else {
        let line = select(&format!("{seed}::nomemory"), lines::no_memory_lines(locale))?;
        parts.push(line.to_string());
    }

    let core_seed = format!("{seed}::{}", intent.name());
    parts.push(select(&core_seed, lines::core_lines(locale, intent))?.to_string());

    let closing = select(&format!("{seed}::closing"), lines::closings(locale, p.gender))?;
    parts.push(closing.to_string());

    // Last guard against structural tokens sneaking back in through a field.
    let text = clean(&strip_internal_leak(&parts.join(" ")));
    debug_assert!(text.starts_with(&p.first_name));
    Ok(text)
}
