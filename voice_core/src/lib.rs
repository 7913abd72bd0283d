//! Audio core: voice profile resolution, text shaping, deterministic speaker
//! assignment and cached speech synthesis.

mod error;
mod shape;
mod speaker;

pub mod gateway;
pub mod profile;
pub mod store;
pub mod synth;

pub use error::{StorageError, VoiceError};
pub use gateway::{SynthesisGateway, SynthesisOutcome, CACHE_VERSION};
pub use profile::{pick_profile, PlaybackPreset, SynthesisMeta, VoiceProfile};
pub use shape::shape;
pub use speaker::{pick_speaker, stable_key};
pub use store::{HttpObjectStore, MemoryStore, ObjectStore};
pub use synth::{OpenAiSpeech, SpeechSynthesizer, SYNTH_MODEL};
