//! Contracts for the audio platform the bank drives

use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};

use crate::error::{BankError, Result};

/// Encoded bytes of a finished recording
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    bytes: Arc<[u8]>,
    extension: String,
}

impl Clip {
    pub fn new(bytes: impl Into<Arc<[u8]>>, extension: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            extension: extension.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// File extension without the dot, e.g. `wav`
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Sending half of a [`PendingClip`], held by the recorder while it flushes
pub struct ClipSender {
    tx: Sender<Result<Clip>>,
}

impl ClipSender {
    pub fn deliver(self, result: Result<Clip>) {
        let _ = self.tx.send(result);
    }
}

/// A clip the recorder has been asked to stop and hand over
pub struct PendingClip {
    rx: Receiver<Result<Clip>>,
}

/// Create a pending clip and the sender that completes it
pub fn pending_clip() -> (ClipSender, PendingClip) {
    let (tx, rx) = bounded(1);
    (ClipSender { tx }, PendingClip { rx })
}

impl PendingClip {
    /// Non-blocking check; `None` while the recorder is still flushing
    pub fn try_take(&self) -> Option<Result<Clip>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(BankError::Device(
                "recorder dropped the clip before delivering it".into(),
            ))),
        }
    }

    /// Block until the recorder delivers
    pub fn wait(self) -> Result<Clip> {
        self.rx.recv().unwrap_or_else(|_| {
            Err(BankError::Device(
                "recorder dropped the clip before delivering it".into(),
            ))
        })
    }
}

/// Per-slot audio player
pub trait Player {
    /// Decode encoded audio bytes and make them the playable source
    fn load(&mut self, bytes: &[u8]) -> Result<()>;
    /// Start from the beginning
    fn start(&mut self) -> Result<()>;
    fn stop(&mut self);
    fn is_playing(&self) -> bool;
    fn set_looping(&mut self, looping: bool);
    fn is_loaded(&self) -> bool;
}

/// The single capture device
pub trait Recorder {
    fn start(&mut self) -> Result<()>;
    /// Stop capturing; the clip arrives through the returned handle
    fn stop(&mut self) -> Result<PendingClip>;
}

/// Mic-to-output routing (self-monitoring)
pub trait MicRouting {
    fn connect_monitor(&mut self) -> Result<()>;
    fn disconnect_monitor(&mut self) -> Result<()>;
    fn is_monitoring(&self) -> bool;
}

/// Waveform tap on the output
pub trait Analyser {
    /// Latest amplitudes, fixed length
    fn sample(&self) -> Vec<f32>;
}

/// Writes a clip somewhere the user can pick it up
pub trait Downloader {
    fn download(&self, file_name: &str, clip: &Clip) -> Result<()>;
}

/// User-facing notices
pub trait Notifier {
    fn notify(&self, message: &str);
}

/// Lets the user choose an audio file; `None` when cancelled
pub trait FilePicker {
    fn pick_audio(&self) -> Option<Vec<u8>>;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;

    /// Observable state of a [`FakePlayer`]
    #[derive(Default)]
    pub struct PlayerProbe {
        pub loaded: Cell<bool>,
        pub playing: Cell<bool>,
        pub looping: Cell<bool>,
        pub starts: Cell<usize>,
        pub stops: Cell<usize>,
        pub last_load: RefCell<Vec<u8>>,
    }

    /// Player that accepts anything except bytes starting with `b"bad"`
    pub struct FakePlayer {
        pub probe: Rc<PlayerProbe>,
    }

    impl FakePlayer {
        pub fn new() -> (Self, Rc<PlayerProbe>) {
            let probe = Rc::new(PlayerProbe::default());
            (Self { probe: probe.clone() }, probe)
        }
    }

    impl Player for FakePlayer {
        fn load(&mut self, bytes: &[u8]) -> Result<()> {
            if bytes.starts_with(b"bad") {
                return Err(BankError::Decode("unsupported".into()));
            }
            *self.probe.last_load.borrow_mut() = bytes.to_vec();
            self.probe.loaded.set(true);
            Ok(())
        }

        fn start(&mut self) -> Result<()> {
            self.probe.starts.set(self.probe.starts.get() + 1);
            self.probe.playing.set(true);
            Ok(())
        }

        fn stop(&mut self) {
            self.probe.stops.set(self.probe.stops.get() + 1);
            self.probe.playing.set(false);
        }

        fn is_playing(&self) -> bool {
            self.probe.playing.get()
        }

        fn set_looping(&mut self, looping: bool) {
            self.probe.looping.set(looping);
        }

        fn is_loaded(&self) -> bool {
            self.probe.loaded.get()
        }
    }

    /// Recorder whose clips are `take-N` byte strings
    #[derive(Default)]
    pub struct FakeRecorder {
        pub capturing: bool,
        pub takes: usize,
        /// Hold the clip back until [`FakeRecorder::flush`]
        pub deferred: bool,
        pub pending: Option<ClipSender>,
    }

    impl FakeRecorder {
        pub fn flush(&mut self) {
            if let Some(tx) = self.pending.take() {
                tx.deliver(Ok(Clip::new(format!("take-{}", self.takes).into_bytes(), "wav")));
            }
        }
    }

    impl Recorder for FakeRecorder {
        fn start(&mut self) -> Result<()> {
            if self.capturing {
                return Err(BankError::Device("already capturing".into()));
            }
            self.capturing = true;
            Ok(())
        }

        fn stop(&mut self) -> Result<PendingClip> {
            if !self.capturing {
                return Err(BankError::NotRecording);
            }
            self.capturing = false;
            self.takes += 1;
            let (tx, pending) = pending_clip();
            if self.deferred {
                self.pending = Some(tx);
            } else {
                tx.deliver(Ok(Clip::new(format!("take-{}", self.takes).into_bytes(), "wav")));
            }
            Ok(pending)
        }
    }

    /// Recorder that hands each stop's sender to the test, which decides
    /// what gets delivered and when
    #[derive(Default)]
    pub struct HandoffRecorder {
        pub capturing: bool,
        pub senders: Rc<RefCell<Vec<ClipSender>>>,
    }

    impl HandoffRecorder {
        pub fn new() -> (Self, Rc<RefCell<Vec<ClipSender>>>) {
            let recorder = Self::default();
            let senders = recorder.senders.clone();
            (recorder, senders)
        }
    }

    impl Recorder for HandoffRecorder {
        fn start(&mut self) -> Result<()> {
            if self.capturing {
                return Err(BankError::Device("already capturing".into()));
            }
            self.capturing = true;
            Ok(())
        }

        fn stop(&mut self) -> Result<PendingClip> {
            if !self.capturing {
                return Err(BankError::NotRecording);
            }
            self.capturing = false;
            let (tx, pending) = pending_clip();
            self.senders.borrow_mut().push(tx);
            Ok(pending)
        }
    }

    #[derive(Default)]
    pub struct FakeMic {
        pub connected: bool,
        pub connects: usize,
        pub disconnects: usize,
    }

    impl MicRouting for FakeMic {
        fn connect_monitor(&mut self) -> Result<()> {
            self.connected = true;
            self.connects += 1;
            Ok(())
        }

        fn disconnect_monitor(&mut self) -> Result<()> {
            self.connected = false;
            self.disconnects += 1;
            Ok(())
        }

        fn is_monitoring(&self) -> bool {
            self.connected
        }
    }

    #[derive(Default)]
    pub struct FakeDownloader {
        pub files: RefCell<Vec<(String, Vec<u8>)>>,
    }

    impl Downloader for FakeDownloader {
        fn download(&self, file_name: &str, clip: &Clip) -> Result<()> {
            self.files
                .borrow_mut()
                .push((file_name.to_string(), clip.bytes().to_vec()));
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct FakeNotifier {
        pub messages: RefCell<Vec<String>>,
    }

    impl Notifier for FakeNotifier {
        fn notify(&self, message: &str) {
            self.messages.borrow_mut().push(message.to_string());
        }
    }

    #[derive(Default)]
    pub struct FakePicker {
        pub file: Option<Vec<u8>>,
    }

    impl FilePicker for FakePicker {
        fn pick_audio(&self) -> Option<Vec<u8>> {
            self.file.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_clip_arrives_after_delivery() {
        let (tx, pending) = pending_clip();
        assert!(pending.try_take().is_none());
        tx.deliver(Ok(Clip::new(vec![1u8, 2, 3], "wav")));
        let clip = pending.try_take().and_then(|r| r.ok());
        assert_eq!(clip.map(|c| c.len()), Some(3));
    }

    #[test]
    fn test_dropped_sender_reports_device_error() {
        let (tx, pending) = pending_clip();
        drop(tx);
        assert!(matches!(pending.wait(), Err(BankError::Device(_))));
    }
}
