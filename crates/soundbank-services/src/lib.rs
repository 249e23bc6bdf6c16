//! soundbank-services: Audio devices, mixing engine, codec and exports

pub mod codec;
pub mod downloads;
pub mod engine;
pub mod microphone;
pub mod output;

pub use codec::{CodecError, DecodedAudio, StreamResampler};
pub use downloads::{DownloadError, DownloadFolder};
pub use engine::{
    AudioEngine, EngineError, EngineRecorder, EngineState, MonitorRoute, ScopeTap, SlotPlayer,
    DEFAULT_SAMPLE_RATE,
};
pub use microphone::{MicFormat, MicStream, Microphone, MicrophoneError};
pub use output::{OutputError, OutputStream};
