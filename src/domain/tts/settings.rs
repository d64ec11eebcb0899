use super::error::ValidationError;
use super::model::SynthesisRequest;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::time::Duration;

/// Regional top-level domain such as `com`, `pt` or `com.br`.
static DOMAIN_VARIANT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]{2,3}(\.[a-z]{2,3})?$").expect("valid regex"));

/// What to do with a speed outside `[min_speed, max_speed]`.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SpeedPolicy {
    Reject,
    Clamp,
}

/// Limits and tuning knobs of the generation pipeline.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub max_text_length: usize,
    pub max_batch_size: usize,
    pub min_speed: f32,
    pub max_speed: f32,
    pub default_speed: f32,
    pub speed_policy: SpeedPolicy,
    pub default_language: String,
    pub batch_concurrency: usize,
    pub synthesis_timeout: Duration,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_text_length: 10_000,
            max_batch_size: 10,
            min_speed: 0.5,
            max_speed: 2.0,
            default_speed: 1.0,
            speed_policy: SpeedPolicy::Reject,
            default_language: "en-us".to_string(),
            batch_concurrency: 4,
            synthesis_timeout: Duration::from_secs(30),
        }
    }
}

impl GenerationSettings {
    /// Check text, speed and domain variant, applying the speed policy.
    ///
    /// Length is counted in characters. Whitespace-only text is empty.
    /// The domain variant comes back lowercased, and a blank one becomes `None`.
    pub fn validate(&self, mut request: SynthesisRequest) -> Result<SynthesisRequest, ValidationError> {
        if request.text.trim().is_empty() {
            return Err(ValidationError::EmptyText);
        }

        let length = request.text.chars().count();
        if length > self.max_text_length {
            return Err(ValidationError::TextTooLong {
                actual: length,
                max: self.max_text_length,
            });
        }

        request.speed = self.check_speed(request.speed)?;
        request.domain_variant = check_domain_variant(request.domain_variant)?;
        Ok(request)
    }

    pub fn validate_batch_size(&self, size: usize) -> Result<(), ValidationError> {
        if size > self.max_batch_size {
            return Err(ValidationError::BatchTooLarge {
                actual: size,
                max: self.max_batch_size,
            });
        }
        Ok(())
    }

    fn check_speed(&self, speed: f32) -> Result<f32, ValidationError> {
        let out_of_range = ValidationError::SpeedOutOfRange {
            speed,
            min: self.min_speed,
            max: self.max_speed,
        };

        if !speed.is_finite() {
            return Err(out_of_range);
        }
        if (self.min_speed..=self.max_speed).contains(&speed) {
            return Ok(speed);
        }

        match self.speed_policy {
            SpeedPolicy::Reject => Err(out_of_range),
            SpeedPolicy::Clamp => Ok(speed.clamp(self.min_speed, self.max_speed)),
        }
    }
}

fn check_domain_variant(variant: Option<String>) -> Result<Option<String>, ValidationError> {
    let Some(variant) = variant else {
        return Ok(None);
    };

    let normalized = variant.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return Ok(None);
    }
    if !DOMAIN_VARIANT.is_match(&normalized) {
        return Err(ValidationError::InvalidDomainVariant(variant));
    }
    Ok(Some(normalized))
}
