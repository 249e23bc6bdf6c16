//! WAV encoding/decoding and sample-rate conversion

use std::io::Cursor;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use rubato::{Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
    #[error("Resample error: {0}")]
    Resample(String),
    #[error("Audio has no channels")]
    NoChannels,
}

/// Decoded mono audio
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Decode WAV bytes (PCM 8-32 bit or IEEE float) and mix down to mono
pub fn decode_wav(bytes: &[u8]) -> Result<DecodedAudio, CodecError> {
    let reader = WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(CodecError::NoChannels);
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.into_samples::<f32>().collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()?
        }
    };

    Ok(DecodedAudio {
        samples: to_mono(&interleaved, spec.channels as usize),
        sample_rate: spec.sample_rate,
    })
}

/// Encode mono samples as 16-bit PCM WAV
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, CodecError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(44 + samples.len() * 2));
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for sample in samples {
            let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer.write_sample(value)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

/// Average interleaved channels into one
pub fn to_mono(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

fn sinc_params() -> SincInterpolationParameters {
    SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    }
}

/// One-shot conversion of a whole buffer. The filter delay is trimmed from
/// the front and the tail is flushed, so the output lines up with the input.
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, CodecError> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let ratio = to_rate as f64 / from_rate as f64;
    let expected = (samples.len() as f64 * ratio).round() as usize;
    let mut resampler = SincFixedIn::<f32>::new(
        ratio,
        2.0,
        sinc_params(),
        samples.len(),
        1,
    )
    .map_err(|e| CodecError::Resample(e.to_string()))?;

    let delay = resampler.output_delay();

    let mut output: Vec<f32> = resampler
        .process(&[samples], None)
        .map_err(|e| CodecError::Resample(e.to_string()))?
        .into_iter()
        .flatten()
        .collect();

    while output.len() < delay + expected {
        let tail: Vec<f32> = resampler
            .process_partial(None::<&[&[f32]]>, None)
            .map_err(|e| CodecError::Resample(e.to_string()))?
            .into_iter()
            .flatten()
            .collect();
        if tail.is_empty() {
            break;
        }
        output.extend(tail);
    }

    output.drain(..delay.min(output.len()));
    output.truncate(expected);
    Ok(output)
}

/// Chunked conversion for a live stream whose chunk sizes vary
pub struct StreamResampler {
    inner: Option<SincFixedIn<f32>>,
    pending: Vec<f32>,
}

impl StreamResampler {
    pub const CHUNK: usize = 1024;

    pub fn new(from_rate: u32, to_rate: u32) -> Result<Self, CodecError> {
        let inner = if from_rate == to_rate {
            None
        } else {
            let resampler = SincFixedIn::<f32>::new(
                to_rate as f64 / from_rate as f64,
                2.0,
                sinc_params(),
                Self::CHUNK,
                1,
            )
            .map_err(|e| CodecError::Resample(e.to_string()))?;
            Some(resampler)
        };
        Ok(Self { inner, pending: Vec::new() })
    }

    /// Feed mono samples; returns whatever full chunks could be converted
    pub fn process(&mut self, mono: &[f32]) -> Result<Vec<f32>, CodecError> {
        let Some(resampler) = self.inner.as_mut() else {
            return Ok(mono.to_vec());
        };

        self.pending.extend_from_slice(mono);
        let mut out = Vec::new();
        loop {
            let needed = resampler.input_frames_next();
            if self.pending.len() < needed {
                break;
            }
            let chunk: Vec<f32> = self.pending.drain(..needed).collect();
            let converted = resampler
                .process(&[chunk], None)
                .map_err(|e| CodecError::Resample(e.to_string()))?;
            out.extend(converted.into_iter().flatten());
        }
        Ok(out)
    }
}
