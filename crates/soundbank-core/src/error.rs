//! Error types for soundbank

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BankError {
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Audio device error: {0}")]
    Device(String),
    #[error("Export failed: {0}")]
    Export(String),
    #[error("Recorder is in use by slot {owner}")]
    RecorderBusy { owner: usize },
    #[error("Not recording")]
    NotRecording,
}

pub type Result<T> = std::result::Result<T, BankError>;
