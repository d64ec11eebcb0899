use super::AdjustmentError;
use mp3lame_encoder::{max_required_buffer_size, Bitrate, Builder, DualPcm, FlushNoGap, MonoPcm, Quality};
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// LAME needs this much room to flush its last frames.
const FLUSH_RESERVE: usize = 7200;

/// Planar PCM: one `Vec` of samples per channel, all the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmAudio {
    pub channels: Vec<Vec<f32>>,
    pub sample_rate: u32,
}

impl PcmAudio {
    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }
}

/// Decode an MP3 stream into planar f32 samples.
pub fn decode_mp3(audio: &[u8]) -> Result<PcmAudio, AdjustmentError> {
    let source = MediaSourceStream::new(Box::new(Cursor::new(audio.to_vec())), Default::default());

    let mut hint = Hint::new();
    hint.with_extension("mp3");

    let probed = symphonia::default::get_probe()
        .format(&hint, source, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| AdjustmentError::Decode(e.to_string()))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AdjustmentError::Decode("no audio track found".to_string()))?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AdjustmentError::Decode(format!("unsupported codec: {}", e)))?;

    let mut channels: Vec<Vec<f32>> = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(AdjustmentError::Decode(e.to_string())),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                tracing::debug!(error = e, "Skipping corrupt MP3 frame");
                continue;
            }
            Err(e) => return Err(AdjustmentError::Decode(e.to_string())),
        };

        let spec = *decoded.spec();
        let channel_count = spec.channels.count();
        if channel_count == 0 {
            continue;
        }
        sample_rate.get_or_insert(spec.rate);
        if channels.is_empty() {
            channels = vec![Vec::new(); channel_count];
        }

        let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buffer.copy_interleaved_ref(decoded);
        for frame in buffer.samples().chunks(channel_count) {
            for (channel, sample) in channels.iter_mut().zip(frame) {
                channel.push(*sample);
            }
        }
    }

    let pcm = PcmAudio {
        channels,
        sample_rate: sample_rate
            .ok_or_else(|| AdjustmentError::Decode("unknown sample rate".to_string()))?,
    };
    if pcm.frames() == 0 {
        return Err(AdjustmentError::EmptyAudio);
    }
    Ok(pcm)
}

/// Encode planar PCM (mono or stereo) as MP3.
pub fn encode_mp3(pcm: &PcmAudio, bitrate: Bitrate) -> Result<Vec<u8>, AdjustmentError> {
    let mut builder =
        Builder::new().ok_or_else(|| AdjustmentError::Encode("cannot create LAME encoder".to_string()))?;
    builder
        .set_num_channels(pcm.channels.len() as u8)
        .map_err(encode_error)?;
    builder.set_sample_rate(pcm.sample_rate).map_err(encode_error)?;
    builder.set_brate(bitrate).map_err(encode_error)?;
    builder.set_quality(Quality::Good).map_err(encode_error)?;
    let mut encoder = builder.build().map_err(encode_error)?;

    let samples: Vec<Vec<i16>> = pcm
        .channels
        .iter()
        .map(|channel| channel.iter().map(|sample| to_i16(*sample)).collect())
        .collect();

    let mut output: Vec<u8> = Vec::with_capacity(max_required_buffer_size(pcm.frames()) + FLUSH_RESERVE);
    match samples.as_slice() {
        [mono] => encoder.encode_to_vec(MonoPcm(mono), &mut output),
        [left, right] => encoder.encode_to_vec(DualPcm { left, right }, &mut output),
        other => {
            return Err(AdjustmentError::Encode(format!(
                "unsupported channel count {}",
                other.len()
            )))
        }
    }
    .map_err(encode_error)?;

    encoder
        .flush_to_vec::<FlushNoGap>(&mut output)
        .map_err(encode_error)?;

    Ok(output)
}

fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

fn encode_error<E: std::fmt::Debug>(err: E) -> AdjustmentError {
    AdjustmentError::Encode(format!("{:?}", err))
}
