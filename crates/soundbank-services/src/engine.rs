//! Mixing engine: one voice per slot, microphone routing, capture and scope tap

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use crossbeam_channel::{bounded, Receiver};
use soundbank_core::{
    pending_clip, Analyser, BankError, Clip, MicRouting, PendingClip, Player, Recorder, ANALYSER_SIZE,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::codec::{self, CodecError, StreamResampler};
use crate::microphone::{MicFormat, MicStream, Microphone, MicrophoneError};
use crate::output::{OutputError, OutputStream};

/// Rate used until an output device reports its own
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Output error: {0}")]
    Output(#[from] OutputError),
    #[error("Microphone error: {0}")]
    Microphone(#[from] MicrophoneError),
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("Failed to spawn worker: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("Engine already running")]
    AlreadyRunning,
    #[error("Microphone already open")]
    MicrophoneOpen,
}

impl From<EngineError> for BankError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Codec(inner) => BankError::Decode(inner.to_string()),
            other => BankError::Device(other.to_string()),
        }
    }
}

/// Playback state of one slot
#[derive(Default)]
struct Voice {
    samples: Arc<Vec<f32>>,
    position: usize,
    playing: bool,
    looping: bool,
}

impl Voice {
    fn next_sample(&mut self) -> f32 {
        if !self.playing {
            return 0.0;
        }
        let Some(sample) = self.samples.get(self.position).copied() else {
            self.playing = false;
            self.position = 0;
            return 0.0;
        };
        self.position += 1;
        if self.position >= self.samples.len() {
            self.position = 0;
            self.playing = self.looping;
        }
        sample
    }
}

/// State shared between the UI handles and the audio threads
pub struct EngineState {
    sample_rate: AtomicU32,
    voices: Mutex<Vec<Voice>>,
    monitor_enabled: AtomicBool,
    mic_open: AtomicBool,
    /// Set while an output stream is pulling `render`
    output_live: AtomicBool,
    capturing: AtomicBool,
    capture: Mutex<Vec<f32>>,
    /// Microphone samples at the output rate, waiting to be mixed
    mic_queue: Mutex<VecDeque<f32>>,
    /// Most recent output samples for the analyser
    scope: Mutex<VecDeque<f32>>,
}

impl EngineState {
    pub fn new(voices: usize, sample_rate: u32) -> Self {
        Self {
            sample_rate: AtomicU32::new(sample_rate),
            voices: Mutex::new((0..voices).map(|_| Voice::default()).collect()),
            monitor_enabled: AtomicBool::new(false),
            mic_open: AtomicBool::new(false),
            output_live: AtomicBool::new(false),
            capturing: AtomicBool::new(false),
            capture: Mutex::new(Vec::new()),
            mic_queue: Mutex::new(VecDeque::new()),
            scope: Mutex::new(VecDeque::with_capacity(ANALYSER_SIZE * 2)),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate.load(Ordering::SeqCst)
    }

    pub fn is_monitoring(&self) -> bool {
        self.monitor_enabled.load(Ordering::SeqCst)
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    /// Queue microphone samples for the output mix; anything older than a
    /// quarter second is dropped. Without an output stream the samples go
    /// straight into the capture.
    pub fn push_mic(&self, samples: &[f32]) {
        if !self.output_live.load(Ordering::SeqCst) {
            if self.is_capturing() {
                if let Ok(mut capture) = self.capture.lock() {
                    capture.extend_from_slice(samples);
                }
            }
            return;
        }

        let Ok(mut queue) = self.mic_queue.lock() else { return };
        queue.extend(samples);
        let limit = (self.sample_rate() / 4).max(1) as usize;
        let excess = queue.len().saturating_sub(limit);
        queue.drain(..excess);
    }

    /// Fill one interleaved output buffer (called from the audio thread).
    /// Output is slot playback plus the microphone when monitoring; the
    /// capture gets playback plus microphone regardless.
    pub fn render(&self, buffer: &mut [f32], channels: u16) {
        let channels = channels.max(1) as usize;
        let monitoring = self.monitor_enabled.load(Ordering::SeqCst);
        let capturing = self.capturing.load(Ordering::SeqCst);

        let Ok(mut voices) = self.voices.lock() else {
            buffer.fill(0.0);
            return;
        };
        let mut mic_queue = self.mic_queue.lock().ok();
        let mut capture = if capturing { self.capture.lock().ok() } else { None };

        let mut mixed = Vec::with_capacity(buffer.len() / channels);
        for frame in buffer.chunks_mut(channels) {
            let playback: f32 = voices.iter_mut().map(Voice::next_sample).sum();
            let mic = mic_queue.as_mut().and_then(|q| q.pop_front()).unwrap_or(0.0);

            if let Some(capture) = capture.as_mut() {
                capture.push(playback + mic);
            }

            let out = if monitoring { playback + mic } else { playback };
            frame.fill(out);
            mixed.push(out);
        }

        drop(capture);
        drop(mic_queue);
        drop(voices);

        if let Ok(mut scope) = self.scope.lock() {
            scope.extend(mixed);
            let excess = scope.len().saturating_sub(ANALYSER_SIZE);
            scope.drain(..excess);
        }
    }

    fn with_voice<R>(&self, index: usize, f: impl FnOnce(&mut Voice) -> R) -> Result<R, BankError> {
        let mut voices = self
            .voices
            .lock()
            .map_err(|_| BankError::Device("voice table poisoned".into()))?;
        let voice = voices
            .get_mut(index)
            .ok_or_else(|| BankError::Device(format!("no voice {index}")))?;
        Ok(f(voice))
    }
}

/// Player handle for one slot's voice
pub struct SlotPlayer {
    state: Arc<EngineState>,
    voice: usize,
}

impl Player for SlotPlayer {
    fn load(&mut self, bytes: &[u8]) -> soundbank_core::Result<()> {
        let decoded = codec::decode_wav(bytes).map_err(EngineError::from)?;
        let samples = codec::resample(&decoded.samples, decoded.sample_rate, self.state.sample_rate())
            .map_err(EngineError::from)?;
        debug!(voice = self.voice, frames = samples.len(), "Voice loaded");

        self.state.with_voice(self.voice, |voice| {
            voice.samples = Arc::new(samples);
            voice.position = 0;
            voice.playing = false;
        })
    }

    fn start(&mut self) -> soundbank_core::Result<()> {
        self.state.with_voice(self.voice, |voice| {
            voice.position = 0;
            voice.playing = !voice.samples.is_empty();
        })
    }

    fn stop(&mut self) {
        let _ = self.state.with_voice(self.voice, |voice| {
            voice.playing = false;
            voice.position = 0;
        });
    }

    fn is_playing(&self) -> bool {
        self.state.with_voice(self.voice, |voice| voice.playing).unwrap_or(false)
    }

    fn set_looping(&mut self, looping: bool) {
        let _ = self.state.with_voice(self.voice, |voice| voice.looping = looping);
    }

    fn is_loaded(&self) -> bool {
        self.state
            .with_voice(self.voice, |voice| !voice.samples.is_empty())
            .unwrap_or(false)
    }
}

/// Capture of the mixed microphone and playback signal
pub struct EngineRecorder {
    state: Arc<EngineState>,
}

impl Recorder for EngineRecorder {
    fn start(&mut self) -> soundbank_core::Result<()> {
        if self.state.is_capturing() {
            return Err(BankError::Device("capture already running".into()));
        }
        if let Ok(mut capture) = self.state.capture.lock() {
            capture.clear();
        }
        self.state.capturing.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) -> soundbank_core::Result<PendingClip> {
        if !self.state.capturing.swap(false, Ordering::SeqCst) {
            return Err(BankError::NotRecording);
        }

        let samples = self
            .state
            .capture
            .lock()
            .map(|mut buf| std::mem::take(&mut *buf))
            .unwrap_or_default();
        let sample_rate = self.state.sample_rate();
        let (tx, pending) = pending_clip();

        thread::Builder::new()
            .name("clip-encoder".into())
            .spawn(move || {
                let frames = samples.len();
                let result = codec::encode_wav(&samples, sample_rate)
                    .map(|bytes| Clip::new(bytes, "wav"))
                    .map_err(|e| BankError::Export(e.to_string()));
                info!(frames, sample_rate, "Clip encoded");
                tx.deliver(result);
            })
            .map_err(|e| BankError::Device(e.to_string()))?;

        Ok(pending)
    }
}

/// Switch for routing the microphone to the output
pub struct MonitorRoute {
    state: Arc<EngineState>,
}

impl MicRouting for MonitorRoute {
    fn connect_monitor(&mut self) -> soundbank_core::Result<()> {
        if !self.state.mic_open.load(Ordering::SeqCst) {
            warn!("Monitoring enabled without an open microphone");
        }
        self.state.monitor_enabled.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn disconnect_monitor(&mut self) -> soundbank_core::Result<()> {
        self.state.monitor_enabled.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_monitoring(&self) -> bool {
        self.state.is_monitoring()
    }
}

/// Analyser over the output signal
pub struct ScopeTap {
    state: Arc<EngineState>,
}

impl Analyser for ScopeTap {
    fn sample(&self) -> Vec<f32> {
        let mut values = vec![0.0; ANALYSER_SIZE];
        if let Ok(scope) = self.state.scope.lock() {
            let offset = ANALYSER_SIZE - scope.len().min(ANALYSER_SIZE);
            for (slot, value) in values[offset..].iter_mut().zip(scope.iter()) {
                *slot = *value;
            }
        }
        values
    }
}

/// Owns the audio device streams and hands out per-concern handles
pub struct AudioEngine {
    state: Arc<EngineState>,
    output: Option<OutputStream>,
    mic: Option<MicStream>,
}

impl AudioEngine {
    pub fn new(voices: usize) -> Self {
        Self {
            state: Arc::new(EngineState::new(voices, DEFAULT_SAMPLE_RATE)),
            output: None,
            mic: None,
        }
    }

    pub fn state(&self) -> Arc<EngineState> {
        self.state.clone()
    }

    pub fn sample_rate(&self) -> u32 {
        self.state.sample_rate()
    }

    /// Start the output stream
    pub fn start(&mut self) -> Result<(), EngineError> {
        if self.output.is_some() {
            return Err(EngineError::AlreadyRunning);
        }

        let state = self.state.clone();
        let stream = OutputStream::start(move |buffer, channels| state.render(buffer, channels))?;
        self.state.sample_rate.store(stream.sample_rate(), Ordering::SeqCst);
        self.output = Some(stream);
        self.state.output_live.store(true, Ordering::SeqCst);

        info!(sample_rate = self.sample_rate(), "Audio engine started");
        Ok(())
    }

    /// Open the microphone and feed it into the mix
    pub fn open_microphone(&mut self, device_name: &str) -> Result<MicFormat, EngineError> {
        if self.mic.is_some() {
            return Err(EngineError::MicrophoneOpen);
        }

        let (chunk_tx, chunk_rx) = bounded::<Vec<f32>>(64);
        let stream = Microphone::open(device_name, chunk_tx)?;
        let format = stream.format();
        let resampler = StreamResampler::new(format.sample_rate, self.sample_rate())?;

        let state = self.state.clone();
        thread::Builder::new()
            .name("mic-feed".into())
            .spawn(move || Self::feed_loop(chunk_rx, state, format.channels, resampler))?;

        self.mic = Some(stream);
        self.state.mic_open.store(true, Ordering::SeqCst);
        Ok(format)
    }

    fn feed_loop(rx: Receiver<Vec<f32>>, state: Arc<EngineState>, channels: u16, mut resampler: StreamResampler) {
        while let Ok(chunk) = rx.recv() {
            let mono = codec::to_mono(&chunk, channels as usize);
            match resampler.process(&mono) {
                Ok(converted) => state.push_mic(&converted),
                Err(e) => warn!("Dropping microphone chunk: {}", e),
            }
        }
        debug!("Microphone feed ended");
    }

    /// Close both streams
    pub fn stop(&mut self) {
        if let Some(mic) = self.mic.take() {
            mic.mute();
        }
        self.state.mic_open.store(false, Ordering::SeqCst);
        self.state.output_live.store(false, Ordering::SeqCst);
        if let Some(output) = self.output.take() {
            output.stop();
            info!("Audio engine stopped");
        }
    }

    pub fn player(&self, voice: usize) -> SlotPlayer {
        SlotPlayer { state: self.state.clone(), voice }
    }

    pub fn recorder(&self) -> EngineRecorder {
        EngineRecorder { state: self.state.clone() }
    }

    pub fn monitor_route(&self) -> MonitorRoute {
        MonitorRoute { state: self.state.clone() }
    }

    pub fn scope(&self) -> ScopeTap {
        ScopeTap { state: self.state.clone() }
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        self.stop();
    }
}
