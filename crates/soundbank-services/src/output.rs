//! Real-time output stream

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::StreamConfig;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("No audio output devices found")]
    NoDevices,
    #[error("Failed to get default output config: {0}")]
    ConfigError(String),
    #[error("Failed to build output stream: {0}")]
    StreamError(String),
}

/// Output stream that pulls interleaved f32 frames from a callback
pub struct OutputStream {
    silenced: Arc<AtomicBool>,
    sample_rate: u32,
    _stream: cpal::Stream,
}

impl OutputStream {
    /// Open the default output device. The callback receives the buffer to
    /// fill and the device channel count.
    pub fn start<F>(render: F) -> Result<Self, OutputError>
    where
        F: FnMut(&mut [f32], u16) + Send + 'static,
    {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(OutputError::NoDevices)?;

        let supported = device
            .default_output_config()
            .map_err(|e| OutputError::ConfigError(e.to_string()))?;
        let sample_rate = supported.sample_rate().0;
        let channels = supported.channels();

        let silenced = Arc::new(AtomicBool::new(false));
        let silenced_cb = silenced.clone();
        let render = Arc::new(Mutex::new(render));
        let config: StreamConfig = supported.into();

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if silenced_cb.load(Ordering::SeqCst) {
                        data.fill(0.0);
                        return;
                    }
                    let Ok(mut render) = render.lock() else {
                        data.fill(0.0);
                        return;
                    };
                    render(data, channels);
                },
                move |err| error!("Output stream error: {}", err),
                None,
            )
            .map_err(|e| OutputError::StreamError(e.to_string()))?;

        stream.play().map_err(|e| OutputError::StreamError(e.to_string()))?;

        info!(
            device = %device.name().unwrap_or_default(),
            sample_rate,
            channels,
            "Output stream started"
        );

        Ok(Self { silenced, sample_rate, _stream: stream })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn stop(&self) {
        self.silenced.store(true, Ordering::SeqCst);
    }
}

impl Drop for OutputStream {
    fn drop(&mut self) {
        self.silenced.store(true, Ordering::SeqCst);
    }
}
