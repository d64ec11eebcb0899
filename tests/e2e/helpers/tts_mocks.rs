use async_trait::async_trait;
use mp3lame_encoder::Bitrate;
use std::sync::atomic::{AtomicUsize, Ordering};
use voicify::domain::tts::SynthesisError;
use voicify::infrastructure::audio::codec::{encode_mp3, PcmAudio};
use voicify::infrastructure::repositories::TtsRepository;

const SAMPLE_RATE: u32 = 24_000;

/// In-process stand-in for a TTS provider.
///
/// Returns a real MP3 tone lasting 0.1s per character (minimum 1s) and fails
/// for any text containing "fail".
#[derive(Default)]
pub struct MockTtsRepository {
    calls: AtomicUsize,
}

impl MockTtsRepository {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TtsRepository for MockTtsRepository {
    async fn synthesize(
        &self,
        text: &str,
        _language_code: &str,
        _domain_variant: Option<&str>,
    ) -> Result<Vec<u8>, SynthesisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if text.contains("fail") {
            return Err(SynthesisError::Provider("mock provider rejected text".to_string()));
        }

        let seconds = (text.chars().count() as f32 * 0.1).max(1.0);
        mock_audio_bytes(seconds).map_err(|e| SynthesisError::Provider(e.to_string()))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

pub fn mock_audio_bytes(seconds: f32) -> anyhow::Result<Vec<u8>> {
    let frames = (seconds * SAMPLE_RATE as f32) as usize;
    let samples = (0..frames)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            (t * 220.0 * std::f32::consts::TAU).sin() * 0.4
        })
        .collect();
    let pcm = PcmAudio {
        channels: vec![samples],
        sample_rate: SAMPLE_RATE,
    };
    Ok(encode_mp3(&pcm, Bitrate::Kbps64)?)
}
