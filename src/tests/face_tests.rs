//! # End-to-End Face Tests
//!
//! These tests drive a complete [`WatchFace`] the way a host would and inspect the composed
//! frames. Positions are derived from the dial geometry of a 400×400 surface (radius 200,
//! center at 200,200) so the expected pixels follow from the hand angles alone.

use std::io::Write;

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use tempfile::NamedTempFile;

use crate::composer::{battery_rotation, hand_angles};
use crate::config::{Config, FaceKind, HexColor};
use crate::face::{FixedBattery, FixedClock, HostEvent, WatchFace};
use crate::geometry::Vec2;
use crate::raster::Raster;
use crate::scheduler::SchedulerState;
use crate::{BatteryReading, ClockTime};

fn face_at(config: &Config, time: ClockTime, epoch_ms: u64, battery: BatteryReading) -> WatchFace {
    let mut face = WatchFace::new(
        config,
        Box::new(FixedClock { time, epoch_ms }),
        Box::new(FixedBattery(battery)),
    );
    face.handle_event(HostEvent::Created {
        width: 400,
        height: 400,
    });
    face
}

/// Pixel `distance` px from `pivot` along dial angle `degrees`.
fn pixel_along(frame: &Raster, pivot: Vec2, degrees: f32, distance: f32) -> Option<Rgb888> {
    let p = pivot.polar(distance, degrees);
    frame.pixel(p.x.floor() as u32, p.y.floor() as u32)
}

/// The reference snapshot (10:10:32.500, 69 %) yields the documented rotations.
#[test]
fn reference_snapshot_angles() {
    let angles = hand_angles(&ClockTime::new(10, 10, 32, 500));
    assert!(
        (angles.hours - 305.27).abs() < 0.01,
        "hour hand at {} degrees",
        angles.hours
    );
    let battery = battery_rotation(BatteryReading::Percent(69.0));
    assert!((battery - 34.2).abs() < 1e-3, "battery hand at {}", battery);
}

/// Demo mode renders the reference snapshot with every hand where its angle says.
#[test]
fn demo_frame_places_hands_at_reference_angles() {
    let mut config = Config::default();
    config.demo.enabled = true;
    let mut face = face_at(
        &config,
        ClockTime::new(3, 0, 0, 0),
        0,
        BatteryReading::Unavailable,
    );
    let background = config.palette.background.color();
    let frame = face.render().unwrap();
    let center = Vec2::new(200.0, 200.0);

    let angles = hand_angles(&ClockTime::new(10, 10, 32, 500));
    assert_ne!(pixel_along(frame, center, angles.hours, 60.0), Some(background));
    assert_ne!(pixel_along(frame, center, angles.minutes, 100.0), Some(background));

    // The battery hand pivots on its own dial at (200, 288)
    let battery_pivot = Vec2::new(200.0, 288.0);
    assert_ne!(
        pixel_along(frame, battery_pivot, 34.2, 40.0),
        Some(background)
    );

    // Live time (3 o'clock) is not what is shown
    assert_eq!(pixel_along(frame, center, 90.0, 60.0), Some(background));
}

/// A face configured from a TOML file uses that file's design and palette.
#[test]
fn config_file_drives_rendering() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r##"
[face]
design = "avionics"

[palette]
background = "#000080"
"##
    )
    .unwrap();

    let config = Config::load_from_path(file.path());
    assert_eq!(config.face.design, FaceKind::Avionics);
    assert_eq!(config.palette.background, HexColor::rgb(0, 0, 128));

    let mut face = face_at(
        &config,
        ClockTime::new(3, 0, 0, 0),
        0,
        BatteryReading::Percent(50.0),
    );
    let frame = face.render().unwrap();
    assert_eq!(frame.pixel(0, 0), Some(Rgb888::new(0, 0, 128)));
    // Avionics has no battery dial, so nothing points up from its pivot
    assert_eq!(
        pixel_along(frame, Vec2::new(200.0, 288.0), 0.0, 45.0),
        Some(Rgb888::new(0, 0, 128))
    );
}

/// Becoming ambient before the first fire cancels it; ticks resume only when interactive again.
#[test]
fn ambient_transition_cancels_cadence() {
    let config = Config::default();
    let mut face = face_at(
        &config,
        ClockTime::new(1, 0, 0, 0),
        130,
        BatteryReading::Unavailable,
    );

    let visible = face.handle_event(HostEvent::VisibilityChanged(true));
    let first = visible.arm.expect("interactive face must arm a timer");
    assert_eq!(first.delay_ms, 70);

    let ambient = face.handle_event(HostEvent::AmbientModeChanged(true));
    assert_eq!(ambient.cancel, Some(first.token));
    assert_eq!(face.scheduler().state(), SchedulerState::Idle);

    // The cancelled timer firing late changes nothing
    let stale = face.on_timer(first.token);
    assert!(!stale.redraw);
    assert!(stale.arm.is_none());

    let resumed = face.handle_event(HostEvent::AmbientModeChanged(false));
    assert!(resumed.arm.is_some());
}

/// Repeated frames at one size rasterize each background layer exactly once.
#[test]
fn background_is_built_once_per_size_and_layer() {
    let config = Config::default();
    let mut face = face_at(
        &config,
        ClockTime::new(7, 45, 12, 0),
        0,
        BatteryReading::Percent(12.0),
    );
    for _ in 0..3 {
        face.render().unwrap();
    }
    assert_eq!(face.composer().cache().rebuild_count(), 1);

    face.handle_event(HostEvent::AmbientModeChanged(true));
    face.render().unwrap();
    face.render().unwrap();
    assert_eq!(face.composer().cache().rebuild_count(), 2);
}

/// Muting dims the hands but leaves the background untouched.
#[test]
fn muted_frame_dims_hands() {
    let config = Config::default();
    let mut face = face_at(
        &config,
        ClockTime::new(3, 0, 0, 0),
        0,
        BatteryReading::Unavailable,
    );
    let center = Vec2::new(200.0, 200.0);

    let loud = face.render().unwrap().clone();
    face.handle_event(HostEvent::InterruptionFilterChanged { muted: true });
    let quiet = face.render().unwrap().clone();

    let on_hand = |frame: &Raster| pixel_along(frame, center, 90.0, 50.0);
    assert_ne!(on_hand(&loud), on_hand(&quiet));
    assert_eq!(loud.pixel(0, 0), quiet.pixel(0, 0));
}

/// Ambient frames carry no anti-aliasing artifacts in burn-in protection mode.
#[test]
fn burn_in_frame_is_pure_black_and_white() {
    let config = Config::default();
    let mut face = face_at(
        &config,
        ClockTime::new(8, 20, 40, 0),
        0,
        BatteryReading::Percent(140.0),
    );
    face.handle_event(HostEvent::AmbientModeChanged(true));
    face.handle_event(HostEvent::PropertiesChanged {
        low_bit: false,
        burn_in: true,
    });
    let frame = face.render().unwrap();
    assert!(frame
        .pixels()
        .all(|p| p == Rgb888::BLACK || p == Rgb888::WHITE));
}
