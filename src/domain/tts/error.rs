use crate::error::AppError;
use std::time::Duration;

/// Request rejected before any I/O happens.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("no text provided")]
    EmptyText,
    #[error("text too long: {actual} characters, maximum is {max}")]
    TextTooLong { actual: usize, max: usize },
    #[error("speed {speed} is outside the allowed range {min}-{max}")]
    SpeedOutOfRange { speed: f32, min: f32, max: f32 },
    #[error("batch too large: {actual} texts, maximum is {max}")]
    BatchTooLarge { actual: usize, max: usize },
    #[error("invalid domain variant: {0:?}")]
    InvalidDomainVariant(String),
}

/// The provider rejected the request or could not be reached.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SynthesisError {
    #[error("provider error: {0}")]
    Provider(String),
    #[error("provider error: synthesis timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TtsServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
}

impl From<TtsServiceError> for AppError {
    fn from(err: TtsServiceError) -> Self {
        match err {
            TtsServiceError::Validation(ValidationError::TextTooLong { .. }) => {
                AppError::PayloadTooLarge(err.to_string())
            }
            TtsServiceError::Validation(e) => AppError::BadRequest(e.to_string()),
            TtsServiceError::Synthesis(SynthesisError::Timeout(_)) => {
                AppError::GatewayTimeout(err.to_string())
            }
            TtsServiceError::Synthesis(e) => AppError::ExternalService(e.to_string()),
        }
    }
}
