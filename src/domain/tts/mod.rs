pub mod cache_key;
pub mod dto;
pub mod error;
pub mod filename;
pub mod language;
pub mod model;
pub mod service;
pub mod settings;

pub use cache_key::CacheKey;
pub use error::{SynthesisError, TtsServiceError, ValidationError};
pub use model::{BatchItemResult, GeneratedAudio, GenerationResult, SynthesisRequest};
pub use service::{TtsService, TtsServiceApi};
pub use settings::{GenerationSettings, SpeedPolicy};
