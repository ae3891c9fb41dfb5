//! Elementum - an elemental powers layer with a console harness
//!
//! This is the main entry point for the Elementum server harness.

use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use elementum_core::TICKS_PER_SECOND;

mod commands;
mod runtime;
mod settings;

use commands::{Command, Permission};
use runtime::PluginRuntime;
use settings::ServerSettings;

fn main() -> Result<()> {
    // Settings come first so the configured verbosity applies from the start
    let settings = ServerSettings::load();
    let level = settings
        .logging
        .level
        .parse::<Level>()
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");

    info!("Starting Elementum...");

    let mut runtime = PluginRuntime::new(&settings)?;

    // Stdin is blocking, so a reader thread feeds lines over a channel and
    // the tick loop drains it between ticks
    let (tx, rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut line = String::new();
        loop {
            line.clear();
            match stdin.read_line(&mut line) {
                Ok(0) => break, // EOF
                Ok(_) => {
                    if tx.send(line.trim().to_string()).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });

    info!(
        "Elementum running at {} ticks/s - type 'help' for commands",
        TICKS_PER_SECOND
    );

    let tick_duration = Duration::from_millis(1000 / TICKS_PER_SECOND);
    'running: loop {
        let tick_start = Instant::now();

        while let Ok(line) = rx.try_recv() {
            if line.is_empty() {
                continue;
            }
            match Command::parse(&line) {
                Ok(Command::Exit) => break 'running,
                Ok(cmd) => {
                    // The console is the operator, so everything is permitted
                    for out in runtime.execute(cmd, Permission::Admin) {
                        println!("{out}");
                    }
                }
                Err(usage) => println!("{usage}"),
            }
        }

        for out in runtime.tick() {
            println!("{out}");
        }

        if let Some(remaining) = tick_duration.checked_sub(tick_start.elapsed()) {
            thread::sleep(remaining);
        }
    }

    info!("Shutting down...");
    runtime.shutdown();
    settings.save()?;
    Ok(())
}
