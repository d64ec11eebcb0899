use super::codec::PcmAudio;
use super::AdjustmentError;
use rubato::{
    calculate_cutoff, Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType,
    WindowFunction,
};

/// Shorten audio by cutting a slice out of every chunk and crossfading the
/// seams. Pitch is preserved.
///
/// `chunk_ms` is the length of audio kept per chunk and `crossfade_ms` the
/// length of each seam, both before conversion to frames.
pub fn speed_up(
    pcm: &PcmAudio,
    speed: f32,
    chunk_ms: u64,
    crossfade_ms: u64,
) -> Result<PcmAudio, AdjustmentError> {
    let atk = 1.0 / f64::from(speed);

    // Above 2x more has to go than stays, so the removal length is fixed
    // and the kept length shrinks instead.
    let (keep_ms, remove_ms) = if speed < 2.0 {
        (chunk_ms, (chunk_ms as f64 * (1.0 - atk) / atk) as u64)
    } else {
        ((atk * chunk_ms as f64 / (1.0 - atk)) as u64, chunk_ms)
    };
    let crossfade_ms = crossfade_ms.min(remove_ms.saturating_sub(1));

    let to_frames = |ms: u64| (ms * u64::from(pcm.sample_rate) / 1000) as usize;
    let chunk_frames = to_frames(keep_ms + remove_ms);
    let crossfade = to_frames(crossfade_ms);
    let remove = to_frames(remove_ms - crossfade_ms);

    let frames = pcm.frames();
    if chunk_frames == 0 || frames.div_ceil(chunk_frames) < 2 {
        return Err(AdjustmentError::TooShort { frames });
    }

    let channels = pcm
        .channels
        .iter()
        .map(|samples| {
            let chunks: Vec<&[f32]> = samples.chunks(chunk_frames).collect();
            let mut output = Vec::with_capacity(frames);
            if let Some((last, body)) = chunks.split_last() {
                for chunk in body {
                    let kept = &chunk[..chunk.len().saturating_sub(remove)];
                    append_with_crossfade(&mut output, kept, crossfade);
                }
                output.extend_from_slice(last);
            }
            output
        })
        .collect();

    Ok(PcmAudio {
        channels,
        sample_rate: pcm.sample_rate,
    })
}

/// Lengthen audio by resampling it to `1 / speed` times as many frames while
/// keeping the nominal sample rate. Pitch drops with the speed.
pub fn slow_down(pcm: &PcmAudio, speed: f32) -> Result<PcmAudio, AdjustmentError> {
    let frames = pcm.frames();
    if frames == 0 {
        return Err(AdjustmentError::EmptyAudio);
    }

    let sinc_len = 256;
    let window = WindowFunction::BlackmanHarris2;
    let params = SincInterpolationParameters {
        sinc_len,
        f_cutoff: calculate_cutoff(sinc_len, window),
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window,
    };

    // Trailing silence pushes the last real frames out of the filter
    let padded: Vec<Vec<f32>> = pcm
        .channels
        .iter()
        .map(|samples| {
            let mut samples = samples.clone();
            samples.resize(frames + sinc_len, 0.0);
            samples
        })
        .collect();

    let mut resampler = SincFixedIn::<f32>::new(
        1.0 / f64::from(speed),
        2.0,
        params,
        frames + sinc_len,
        pcm.channels.len(),
    )
    .map_err(|e| AdjustmentError::Resample(e.to_string()))?;

    let delay = resampler.output_delay();
    let target = (frames as f64 / f64::from(speed)).round() as usize;
    let channels = resampler
        .process(&padded, None)
        .map_err(|e| AdjustmentError::Resample(e.to_string()))?
        .into_iter()
        .map(|samples| {
            let mut samples: Vec<f32> = samples.into_iter().skip(delay).take(target).collect();
            samples.resize(target, 0.0);
            samples
        })
        .collect();

    Ok(PcmAudio {
        channels,
        sample_rate: pcm.sample_rate,
    })
}

fn append_with_crossfade(output: &mut Vec<f32>, next: &[f32], crossfade: usize) {
    let fade = crossfade.min(output.len()).min(next.len());
    let start = output.len() - fade;
    for i in 0..fade {
        let t = (i + 1) as f32 / (fade + 1) as f32;
        output[start + i] = output[start + i] * (1.0 - t) + next[i] * t;
    }
    output.extend_from_slice(&next[fade..]);
}
