//! Text-generation core: deterministic selection, intent classification and
//! message composition for the personalized-message pipeline.

mod error;
mod lines;

pub mod compose;
pub mod intent;
pub mod provider;
pub mod seed;
pub mod select;
pub mod text;

pub use compose::{compose, Gender, Locale, PersonalizationProfile, Sanitized};
pub use error::MessageError;
pub use intent::{classify, Intent};
pub use provider::{Composer, GeneratedMessage, MessageStrategy, OpenAiTextProvider, TextProvider};
pub use seed::content_seed;
pub use select::{select, stable_index};
