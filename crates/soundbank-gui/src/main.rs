//! soundbank-gui: multi-track sound recorder

mod app;
mod panels;

use app::SoundBankApp;
use eframe::NativeOptions;
use soundbank_core::ScreenLayout;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> eframe::Result<()> {
    // Initialize logging
    let mut filter = EnvFilter::from_default_env();
    for directive in [
        "soundbank_core=debug",
        "soundbank_services=debug",
        "soundbank_gui=debug",
        "wgpu=warn",
        "eframe=warn",
    ] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();

    tracing::info!("Starting Sound Bank");

    let config = app::load_config();
    let layout = ScreenLayout::for_slots(config.bank.slots.max(1));

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([layout.width, layout.height])
            .with_resizable(false)
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Sound Bank",
        options,
        Box::new(|cc| Ok(Box::new(SoundBankApp::new(cc, config)))),
    )
}
