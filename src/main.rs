// main.rs - staywake Entry Point
//
// Wires settings, the tray controller and the message pump together. The
// interesting code lives in the library; this stays thin on purpose.

use anyhow::Result;

fn main() -> Result<()> {
    env_logger::init();
    run()
}

#[cfg(windows)]
fn run() -> Result<()> {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use log::{info, warn};
    use staywake::settings;
    use staywake::tray::{controller, window};

    let stored = settings::load();
    info!("Starting staywake (mode: {:?})", stored.mode);

    // Set when hosted by a parent application, which then owns exiting
    let started_embedded = std::env::args().any(|arg| arg == "--embedded");

    let exit_signal = Arc::new(AtomicBool::new(false));
    let on_change = Box::new(|snapshot: &settings::TraySettings| {
        if let Err(e) = settings::save(snapshot) {
            warn!("Failed to persist settings: {e:#}");
        }
    });

    controller::init(stored, started_embedded, exit_signal.clone(), on_change)?;
    window::run_message_loop();

    if exit_signal.load(Ordering::SeqCst) {
        info!("Exit requested from the tray menu, shutting down");
    }
    Ok(())
}

#[cfg(not(windows))]
fn run() -> Result<()> {
    log::error!("The staywake tray requires Windows; nothing to do on this platform");
    Ok(())
}
