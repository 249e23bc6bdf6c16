//! Clip exports written into a folder on disk

use std::fs;
use std::path::{Path, PathBuf};

use soundbank_core::{BankError, Clip, Downloader};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Invalid file name: {0}")]
    InvalidName(String),
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl From<DownloadError> for BankError {
    fn from(e: DownloadError) -> Self {
        BankError::Export(e.to_string())
    }
}

/// Writes each download into one directory, never overwriting
pub struct DownloadFolder {
    dir: PathBuf,
}

impl DownloadFolder {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The user's downloads folder, or the working directory
    pub fn default_location() -> PathBuf {
        dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Write `bytes` as `file_name`, adding " (n)" before the extension on collision
    pub fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, DownloadError> {
        let name = Path::new(file_name);
        if name.file_name() != Some(name.as_os_str()) {
            return Err(DownloadError::InvalidName(file_name.to_string()));
        }
        let stem = name
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| DownloadError::InvalidName(file_name.to_string()))?;
        let extension = name.extension().and_then(|e| e.to_str());

        fs::create_dir_all(&self.dir).map_err(|source| DownloadError::Write {
            path: self.dir.clone(),
            source,
        })?;

        let mut path = self.dir.join(file_name);
        let mut copy = 1;
        while path.exists() {
            let candidate = match extension {
                Some(ext) => format!("{stem} ({copy}).{ext}"),
                None => format!("{stem} ({copy})"),
            };
            path = self.dir.join(candidate);
            copy += 1;
        }

        fs::write(&path, bytes).map_err(|source| DownloadError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

impl Downloader for DownloadFolder {
    fn download(&self, file_name: &str, clip: &Clip) -> soundbank_core::Result<()> {
        let path = self.save(file_name, clip.bytes())?;
        info!(path = %path.display(), bytes = clip.len(), "Clip exported");
        Ok(())
    }
}
