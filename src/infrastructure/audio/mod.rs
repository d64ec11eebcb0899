//! Tempo adjustment of encoded MP3 audio.

pub mod codec;
pub mod stretch;

use mp3lame_encoder::Bitrate;

#[derive(Debug, thiserror::Error)]
pub enum AdjustmentError {
    #[error("failed to decode audio: {0}")]
    Decode(String),

    #[error("failed to encode audio: {0}")]
    Encode(String),

    #[error("failed to resample audio: {0}")]
    Resample(String),

    #[error("audio too short to adjust ({frames} frames)")]
    TooShort { frames: usize },

    #[error("audio contains no samples")]
    EmptyAudio,

    #[error("invalid speed factor {0}")]
    InvalidSpeed(f32),
}

/// Changes the playback speed of encoded audio.
///
/// Implementations are CPU bound and synchronous; callers run them on a
/// blocking thread.
pub trait SpeedAdjuster: Send + Sync {
    fn adjust(&self, audio: &[u8], speed: f32) -> Result<Vec<u8>, AdjustmentError>;
}

/// Decodes MP3, speeds it up with chunked crossfading (pitch preserving) or
/// slows it down by resampling, and re-encodes.
pub struct Mp3SpeedAdjuster {
    chunk_ms: u64,
    crossfade_ms: u64,
    bitrate: Bitrate,
}

impl Mp3SpeedAdjuster {
    pub fn new() -> Self {
        Self {
            chunk_ms: 150,
            crossfade_ms: 25,
            bitrate: Bitrate::Kbps64,
        }
    }
}

impl Default for Mp3SpeedAdjuster {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeedAdjuster for Mp3SpeedAdjuster {
    fn adjust(&self, audio: &[u8], speed: f32) -> Result<Vec<u8>, AdjustmentError> {
        if !(speed > 0.0 && speed.is_finite()) {
            return Err(AdjustmentError::InvalidSpeed(speed));
        }
        if speed == 1.0 {
            return Ok(audio.to_vec());
        }

        let pcm = codec::decode_mp3(audio)?;
        let adjusted = if speed > 1.0 {
            stretch::speed_up(&pcm, speed, self.chunk_ms, self.crossfade_ms)?
        } else {
            stretch::slow_down(&pcm, speed)?
        };

        tracing::debug!(
            speed = speed,
            sample_rate = pcm.sample_rate,
            original_secs = pcm.duration_secs(),
            adjusted_secs = adjusted.duration_secs(),
            "Audio speed adjusted"
        );

        codec::encode_mp3(&adjusted, self.bitrate)
    }
}
