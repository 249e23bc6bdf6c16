//! Microphone capture

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, SampleFormat, StreamConfig};
use crossbeam_channel::Sender;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum MicrophoneError {
    #[error("No microphone found")]
    NoDevices,
    #[error("Microphone not found: {0}")]
    DeviceNotFound(String),
    #[error("Failed to query microphone config: {0}")]
    ConfigError(String),
    #[error("Failed to open microphone stream: {0}")]
    StreamError(String),
}

/// Native format of an open microphone stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MicFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

/// Open microphone; capture stops when dropped
pub struct MicStream {
    muted: Arc<AtomicBool>,
    format: MicFormat,
    _stream: cpal::Stream,
}

impl MicStream {
    pub fn format(&self) -> MicFormat {
        self.format
    }

    /// Stop forwarding chunks without closing the device
    pub fn mute(&self) {
        self.muted.store(true, Ordering::SeqCst);
    }
}

impl Drop for MicStream {
    fn drop(&mut self) {
        self.muted.store(true, Ordering::SeqCst);
    }
}

pub struct Microphone;

impl Microphone {
    /// Names usable as `input_device` in the config
    pub fn names() -> Result<Vec<String>, MicrophoneError> {
        let host = cpal::default_host();
        let names: Vec<String> = host
            .input_devices()
            .map_err(|e| MicrophoneError::ConfigError(e.to_string()))?
            .filter_map(|device| device.name().ok())
            .collect();

        if names.is_empty() {
            return Err(MicrophoneError::NoDevices);
        }
        Ok(names)
    }

    /// `"default"` picks the host's default input
    fn find(device_name: &str) -> Result<Device, MicrophoneError> {
        let host = cpal::default_host();

        if device_name == "default" {
            return host.default_input_device().ok_or(MicrophoneError::NoDevices);
        }

        let mut devices = host
            .input_devices()
            .map_err(|e| MicrophoneError::ConfigError(e.to_string()))?;
        devices
            .find(|device| device.name().is_ok_and(|name| name == device_name))
            .ok_or_else(|| MicrophoneError::DeviceNotFound(device_name.to_string()))
    }

    /// Open the microphone and forward interleaved f32 chunks to `chunks`
    pub fn open(device_name: &str, chunks: Sender<Vec<f32>>) -> Result<MicStream, MicrophoneError> {
        let device = Self::find(device_name)?;
        let config = device
            .default_input_config()
            .map_err(|e| MicrophoneError::ConfigError(e.to_string()))?;

        let format = MicFormat {
            sample_rate: config.sample_rate().0,
            channels: config.channels(),
        };
        let muted = Arc::new(AtomicBool::new(false));
        let stream_config: StreamConfig = config.clone().into();

        let stream = match config.sample_format() {
            SampleFormat::F32 => Self::build::<f32>(&device, &stream_config, chunks, muted.clone()),
            SampleFormat::I16 => Self::build::<i16>(&device, &stream_config, chunks, muted.clone()),
            SampleFormat::U16 => Self::build::<u16>(&device, &stream_config, chunks, muted.clone()),
            SampleFormat::I32 => Self::build::<i32>(&device, &stream_config, chunks, muted.clone()),
            other => {
                return Err(MicrophoneError::ConfigError(format!("Unsupported sample format: {:?}", other)));
            }
        }?;

        stream.play().map_err(|e| MicrophoneError::StreamError(e.to_string()))?;

        info!(
            device = %device.name().unwrap_or_default(),
            sample_rate = format.sample_rate,
            channels = format.channels,
            "Microphone opened"
        );

        Ok(MicStream { muted, format, _stream: stream })
    }

    fn build<T>(
        device: &Device,
        config: &StreamConfig,
        chunks: Sender<Vec<f32>>,
        muted: Arc<AtomicBool>,
    ) -> Result<cpal::Stream, MicrophoneError>
    where
        T: cpal::Sample + cpal::SizedSample + Send + 'static,
        f32: FromSample<T>,
    {
        device
            .build_input_stream(
                config,
                move |data: &[T], _: &cpal::InputCallbackInfo| {
                    if muted.load(Ordering::Relaxed) {
                        return;
                    }
                    let chunk: Vec<f32> = data.iter().map(|s| f32::from_sample_(*s)).collect();
                    let _ = chunks.try_send(chunk);
                },
                |err| error!("Microphone stream error: {}", err),
                None,
            )
            .map_err(|e| MicrophoneError::StreamError(e.to_string()))
    }
}
