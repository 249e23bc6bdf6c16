//! Main application state

mod config;
mod dialogs;

use std::time::Instant;

use eframe::CreationContext;
use egui::{Context, DroppedFile, PointerButton, Pos2, Sense, Vec2};
use soundbank_core::{
    Analyser, Platform, Player, Point, Screen, ScreenLayout, SharedRecorder, Theme,
};
use soundbank_services::{
    AudioEngine, DownloadFolder, EngineError, Microphone, MicrophoneError, MonitorRoute, ScopeTap,
};
use tracing::{debug, info, trace, warn};

pub(crate) use config::{load_config, AppConfig};
use dialogs::{AudioFilePicker, DialogNotifier};

use crate::panels::CanvasPainter;

pub(crate) struct SoundBankApp {
    /// Keeps the device streams open for the app's lifetime
    _engine: AudioEngine,
    screen: Screen,
    recorder: SharedRecorder,
    monitor_route: MonitorRoute,
    scope: ScopeTap,
    downloads: DownloadFolder,
    notifier: DialogNotifier,
    picker: AudioFilePicker,
}

impl SoundBankApp {
    pub(crate) fn new(_cc: &CreationContext<'_>, config: AppConfig) -> Self {
        let slots = config.bank.slots.max(1);
        let mut engine = AudioEngine::new(slots);

        // Missing devices leave the app usable for loading and exporting
        if let Err(e) = engine.start() {
            warn!("Audio output unavailable: {}", e);
        }
        match engine.open_microphone(&config.audio.input_device) {
            Ok(format) => info!(
                device = %config.audio.input_device,
                sample_rate = format.sample_rate,
                channels = format.channels,
                "Microphone open"
            ),
            Err(EngineError::Microphone(MicrophoneError::DeviceNotFound(name))) => {
                let available = Microphone::names().unwrap_or_default();
                warn!(device = %name, ?available, "Configured microphone not found");
            }
            Err(e) => warn!("Microphone unavailable: {}", e),
        }

        let players: Vec<Box<dyn Player>> = (0..slots)
            .map(|i| Box::new(engine.player(i)) as Box<dyn Player>)
            .collect();
        let screen = Screen::new(
            ScreenLayout::for_slots(slots),
            Theme::default(),
            players,
            config.export.stagger(),
        );
        let recorder = SharedRecorder::new(Box::new(engine.recorder()), config.bank.recording_policy);

        let directory = config
            .export
            .directory
            .clone()
            .unwrap_or_else(DownloadFolder::default_location);
        info!(slots, directory = %directory.display(), "Sound bank ready");

        Self {
            monitor_route: engine.monitor_route(),
            scope: engine.scope(),
            _engine: engine,
            screen,
            recorder,
            downloads: DownloadFolder::new(directory),
            notifier: DialogNotifier,
            picker: AudioFilePicker,
        }
    }

    fn press(&mut self, point: Point, now: Instant) {
        let mut platform = Platform {
            recorder: &mut self.recorder,
            mic: &mut self.monitor_route,
            downloader: &self.downloads,
            notifier: &self.notifier,
            picker: &self.picker,
            now,
        };
        match self.screen.press(point, &mut platform) {
            Some(Ok(())) => {}
            Some(Err(e)) => warn!("Action failed: {}", e),
            None => trace!(x = point.x, y = point.y, "Press hit nothing"),
        }
    }

    fn drop_file(&mut self, file: &DroppedFile, x: Option<f32>) {
        let name = dropped_name(file);
        let Some(x) = x.filter(|x| self.screen.bank().column_at(*x).is_some()) else {
            warn!(file = %name, "Dropped file is not over a slot column");
            return;
        };
        let bytes = match (&file.bytes, &file.path) {
            (Some(bytes), _) => bytes.to_vec(),
            (None, Some(path)) => match std::fs::read(path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(path = %path.display(), "Failed to read dropped file: {}", e);
                    return;
                }
            },
            (None, None) => {
                warn!(file = %name, "Dropped file has no contents");
                return;
            }
        };
        debug!(file = %name, x, bytes = bytes.len(), "File dropped");
        if let Err(e) = self.screen.drop_file(x, &bytes) {
            warn!(file = %name, "Dropped file not loaded: {}", e);
        }
    }
}

fn dropped_name(file: &DroppedFile) -> String {
    match &file.path {
        Some(path) => path.display().to_string(),
        None => file.name.clone(),
    }
}

/// Canvas x of a drop. OS drops can arrive without a hover position, so the
/// last known pointer position is used instead.
fn drop_x(hover: Option<Pos2>, latest: Option<Pos2>, origin: Pos2) -> Option<f32> {
    hover.or(latest).map(|pos| pos.x - origin.x)
}

impl eframe::App for SoundBankApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.screen.tick(now, &self.downloads);

        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        let (hover, latest) = ctx.input(|i| (i.pointer.hover_pos(), i.pointer.latest_pos()));

        egui::CentralPanel::default()
            .frame(egui::Frame::default())
            .show(ctx, |ui| {
                let layout = *self.screen.layout();
                let (response, painter) =
                    ui.allocate_painter(Vec2::new(layout.width, layout.height), Sense::click());
                let origin = response.rect.min;

                let presses: Vec<Point> = ctx.input(|i| {
                    i.events
                        .iter()
                        .filter_map(|e| match e {
                            egui::Event::PointerButton {
                                pos,
                                button: PointerButton::Primary,
                                pressed: true,
                                ..
                            } => Some(Point::new(pos.x - origin.x, pos.y - origin.y)),
                            _ => None,
                        })
                        .collect()
                });
                for point in presses {
                    self.press(point, now);
                }

                let x = drop_x(hover, latest, origin);
                for file in &dropped {
                    self.drop_file(file, x);
                }

                let samples = self.scope.sample();
                let mut surface = CanvasPainter::new(&painter, origin);
                self.screen.render(&mut surface, &samples);
            });

        ctx.request_repaint();
    }
}
