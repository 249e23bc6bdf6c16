//! Native dialogs behind the notifier and picker contracts

use soundbank_core::{FilePicker, Notifier};
use tracing::warn;

pub(super) struct DialogNotifier;

impl Notifier for DialogNotifier {
    fn notify(&self, message: &str) {
        rfd::MessageDialog::new()
            .set_title("Sound Bank")
            .set_description(message)
            .set_level(rfd::MessageLevel::Info)
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
    }
}

pub(super) struct AudioFilePicker;

impl FilePicker for AudioFilePicker {
    fn pick_audio(&self) -> Option<Vec<u8>> {
        let path = rfd::FileDialog::new()
            .set_title("Load audio")
            .add_filter("Audio", &["wav", "wave"])
            .pick_file()?;
        match std::fs::read(&path) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(path = %path.display(), "Failed to read audio file: {}", e);
                None
            }
        }
    }
}
