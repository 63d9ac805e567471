//! # Cockpit Face Entry Point
//!
//! Runs the watch face against a simulated host: it reports a surface, display properties and
//! visibility, then feeds once-a-minute ticks while ambient. Frames are either printed as ASCII
//! art (`--stdout`) or only logged.
//!
//! ## Flags
//! - `--stdout`: print each frame as ASCII art (defaults to a single frame)
//! - `--frames N`: stop after N frames
//! - `--config PATH`: read configuration from PATH instead of face-config.toml
//! - `--mode NAME`: interactive, muted, ambient, low-bit or burn-in
//! - `--demo`: show the fixed demo snapshot instead of live time

use anyhow::Context;
use cockpit_face::config::Config;
use cockpit_face::face::{HostEvent, SysfsBattery, SystemClock, WatchFace};
use cockpit_face::preview::draw_ascii;
use cockpit_face::raster::Raster;
use cockpit_face::runtime::{self, FramePresenter};
use cockpit_face::style::Mode;
use std::env;
use std::time::Duration;
use tokio::sync::mpsc;

/// Characters per line of ASCII output
const PREVIEW_COLUMNS: u32 = 80;
/// Host tick cadence while ambient
const AMBIENT_TICK: Duration = Duration::from_secs(60);

/// Prints frames as ASCII art.
struct StdoutPresenter;

impl FramePresenter for StdoutPresenter {
    fn present(&mut self, frame: &Raster) -> anyhow::Result<()> {
        draw_ascii(frame, PREVIEW_COLUMNS);
        println!();
        Ok(())
    }
}

/// Headless presenter: frames are composed and counted, nothing is shown.
struct LogPresenter {
    frames: u64,
}

impl FramePresenter for LogPresenter {
    fn present(&mut self, frame: &Raster) -> anyhow::Result<()> {
        self.frames += 1;
        log::debug!(
            "Frame {} composed ({}x{})",
            self.frames,
            frame.width(),
            frame.height()
        );
        Ok(())
    }
}

/// Value following `flag`, if present.
fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

/// Host notifications that bring a face up in `mode`.
fn startup_events(config: &Config, mode: Mode) -> Vec<HostEvent> {
    let flags = mode.flags();
    vec![
        HostEvent::Created {
            width: config.display.width,
            height: config.display.height,
        },
        HostEvent::PropertiesChanged {
            low_bit: flags.low_bit,
            burn_in: flags.burn_in,
        },
        HostEvent::InterruptionFilterChanged {
            muted: flags.muted,
        },
        HostEvent::AmbientModeChanged(flags.ambient),
        HostEvent::VisibilityChanged(true),
    ]
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let development_mode = args.iter().any(|a| a == "--stdout");

    let mut config = match arg_value(&args, "--config") {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };
    if args.iter().any(|a| a == "--demo") {
        config.demo.enabled = true;
    }
    let mode = arg_value(&args, "--mode").map_or(Mode::Interactive, Mode::from_name);
    let max_frames = match arg_value(&args, "--frames") {
        Some(n) => Some(
            n.parse::<u64>()
                .with_context(|| format!("--frames expects a number, got {:?}", n))?,
        ),
        None if development_mode => Some(1),
        None => None,
    };

    log::info!(
        "Starting {:?} face in {:?} mode on {}x{}",
        config.face.design,
        mode,
        config.display.width,
        config.display.height
    );

    let mut face = WatchFace::new(
        &config,
        Box::new(SystemClock::new()),
        Box::new(SysfsBattery::new(config.battery.capacity_path.clone())),
    );

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("build tokio runtime")?;

    let stats = rt.block_on(async {
        let (tx, mut rx) = mpsc::channel(16);
        let events = startup_events(&config, mode);
        let ambient = mode.is_ambient();

        // Simulated host
        tokio::spawn(async move {
            for event in events {
                if tx.send(event).await.is_err() {
                    return;
                }
            }
            if !ambient {
                // Keep the channel open; the face drives itself while interactive
                tx.closed().await;
                return;
            }
            let mut ticks = tokio::time::interval(AMBIENT_TICK);
            ticks.tick().await;
            loop {
                ticks.tick().await;
                if tx.send(HostEvent::TimeTick).await.is_err() {
                    return;
                }
            }
        });

        if development_mode {
            runtime::run(&mut face, &mut rx, &mut StdoutPresenter, max_frames).await
        } else {
            let mut presenter = LogPresenter { frames: 0 };
            runtime::run(&mut face, &mut rx, &mut presenter, max_frames).await
        }
    })?;

    log::info!(
        "Presented {} frames ({} skipped)",
        stats.frames,
        stats.failed_frames
    );
    Ok(())
}
