//! # Watch Face
//!
//! [`WatchFace`] is the host-facing object. Host lifecycle callbacks arrive as [`HostEvent`]
//! messages; the face folds them into display flags, forwards the timing-relevant ones to the
//! [`RedrawScheduler`] and returns the resulting [`Outcome`] for the caller to act on.
//!
//! Time and battery are read through the [`TimeSource`] and [`BatterySource`] traits. The battery
//! is sampled on lifecycle events and before every scheduled redraw, never inside the composer,
//! so a frame only reads snapshots.

use crate::composer::{FrameComposer, FrameError};
use crate::config::{Config, DemoConfig};
use crate::raster::Raster;
use crate::scheduler::{Outcome, RedrawScheduler, SchedulerEvent, TimerToken};
use crate::style::{DisplayFlags, Mode};
use crate::text::NumeralFont;
use crate::{BatteryReading, ClockTime};
use chrono::{FixedOffset, Local, Offset, Utc};
use std::fs;
use std::path::PathBuf;

/// Notifications delivered by the host, serialized onto one queue.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HostEvent {
    Created { width: i32, height: i32 },
    SurfaceChanged { width: i32, height: i32 },
    VisibilityChanged(bool),
    AmbientModeChanged(bool),
    PropertiesChanged { low_bit: bool, burn_in: bool },
    InterruptionFilterChanged { muted: bool },
    Tap { x: i32, y: i32 },
    /// Once-a-minute tick the host sends while ambient
    TimeTick,
    TimeZoneChanged,
    Destroy,
}

/// Wall-clock collaborator.
pub trait TimeSource {
    fn now(&self) -> ClockTime;

    /// Milliseconds since the Unix epoch, used to phase-align redraws.
    fn epoch_millis(&self) -> u64;

    /// Re-read the local time zone.
    fn refresh_zone(&mut self) {}
}

/// Battery collaborator.
pub trait BatterySource {
    fn battery_level(&mut self) -> BatteryReading;
}

/// System clock in a fixed offset that is refreshed on demand.
#[derive(Debug, Clone)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            offset: Local::now().offset().fix(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemClock {
    fn now(&self) -> ClockTime {
        ClockTime::from_timelike(&Utc::now().with_timezone(&self.offset))
    }

    fn epoch_millis(&self) -> u64 {
        Utc::now().timestamp_millis().max(0) as u64
    }

    fn refresh_zone(&mut self) {
        let offset = Local::now().offset().fix();
        if offset != self.offset {
            log::info!("Time zone offset changed from {} to {}", self.offset, offset);
            self.offset = offset;
        }
    }
}

/// A clock that always reads the same instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedClock {
    pub time: ClockTime,
    pub epoch_ms: u64,
}

impl TimeSource for FixedClock {
    fn now(&self) -> ClockTime {
        self.time
    }

    fn epoch_millis(&self) -> u64 {
        self.epoch_ms
    }
}

/// Battery level from a sysfs `capacity` file (a 0..=100 integer).
#[derive(Debug, Clone)]
pub struct SysfsBattery {
    path: PathBuf,
}

impl SysfsBattery {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl BatterySource for SysfsBattery {
    fn battery_level(&mut self) -> BatteryReading {
        match fs::read_to_string(&self.path) {
            Ok(text) => match text.trim().parse::<i32>() {
                Ok(level) => BatteryReading::from_level(level, 100),
                Err(e) => {
                    log::debug!("Unparseable battery level {:?}: {}", text.trim(), e);
                    BatteryReading::Unavailable
                }
            },
            Err(e) => {
                log::debug!("Battery unavailable at {}: {}", self.path.display(), e);
                BatteryReading::Unavailable
            }
        }
    }
}

/// A battery that always reports the same reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedBattery(pub BatteryReading);

impl BatterySource for FixedBattery {
    fn battery_level(&mut self) -> BatteryReading {
        self.0
    }
}

/// Snapshot shown while demo mode is on: 10:10:32.500 at 69%.
pub const DEMO_TIME: ClockTime = ClockTime {
    hour12: 10,
    minute: 10,
    second: 32,
    millisecond: 500,
};
pub const DEMO_BATTERY: BatteryReading = BatteryReading::Percent(69.0);

/// One running watch face.
pub struct WatchFace {
    composer: FrameComposer,
    scheduler: RedrawScheduler,
    clock: Box<dyn TimeSource>,
    battery: Box<dyn BatterySource>,
    flags: DisplayFlags,
    battery_snapshot: BatteryReading,
    surface: Option<(i32, i32)>,
    demo: DemoConfig,
    destroyed: bool,
}

impl WatchFace {
    pub fn new(
        config: &Config,
        clock: Box<dyn TimeSource>,
        battery: Box<dyn BatterySource>,
    ) -> Self {
        let composer = FrameComposer::new(
            config.design(),
            config.palette.clone(),
            NumeralFont::new(config.font.weight),
        );
        Self {
            composer,
            scheduler: RedrawScheduler::new(config.schedule.interactive_period_ms),
            clock,
            battery,
            flags: DisplayFlags::default(),
            battery_snapshot: BatteryReading::Unavailable,
            surface: None,
            demo: config.demo.clone(),
            destroyed: false,
        }
    }

    pub fn mode(&self) -> Mode {
        Mode::from_flags(self.flags)
    }

    pub fn flags(&self) -> DisplayFlags {
        self.flags
    }

    pub fn is_demo(&self) -> bool {
        self.demo.enabled
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn scheduler(&self) -> &RedrawScheduler {
        &self.scheduler
    }

    pub fn composer(&self) -> &FrameComposer {
        &self.composer
    }

    /// Apply a host notification.
    pub fn handle_event(&mut self, event: HostEvent) -> Outcome {
        let now_ms = self.clock.epoch_millis();
        log::debug!("Host event {:?}", event);
        match event {
            HostEvent::Created { width, height } => {
                log::info!("Face created on {}x{} surface", width, height);
                self.resize(width, height);
                self.sample_battery();
                self.scheduler.handle(SchedulerEvent::Invalidate, now_ms)
            }
            HostEvent::SurfaceChanged { width, height } => {
                self.resize(width, height);
                self.scheduler.handle(SchedulerEvent::Invalidate, now_ms)
            }
            HostEvent::VisibilityChanged(true) => {
                self.clock.refresh_zone();
                self.sample_battery();
                self.scheduler.handle(SchedulerEvent::BecameVisible, now_ms)
            }
            HostEvent::VisibilityChanged(false) => {
                self.scheduler.handle(SchedulerEvent::BecameHidden, now_ms)
            }
            HostEvent::AmbientModeChanged(ambient) => {
                self.flags.ambient = ambient;
                self.scheduler
                    .handle(SchedulerEvent::AmbientChanged(ambient), now_ms)
            }
            HostEvent::PropertiesChanged { low_bit, burn_in } => {
                self.flags.low_bit = low_bit;
                self.flags.burn_in = burn_in;
                self.scheduler.handle(SchedulerEvent::Invalidate, now_ms)
            }
            HostEvent::InterruptionFilterChanged { muted } => {
                if self.flags.muted == muted {
                    return Outcome::default();
                }
                self.flags.muted = muted;
                self.scheduler.handle(SchedulerEvent::Invalidate, now_ms)
            }
            HostEvent::Tap { x, y } => {
                self.tap(x, y);
                self.scheduler.handle(SchedulerEvent::Invalidate, now_ms)
            }
            HostEvent::TimeTick => {
                self.sample_battery();
                self.scheduler.handle(SchedulerEvent::Invalidate, now_ms)
            }
            HostEvent::TimeZoneChanged => {
                self.clock.refresh_zone();
                self.scheduler.handle(SchedulerEvent::Invalidate, now_ms)
            }
            HostEvent::Destroy => {
                log::info!("Face destroyed");
                self.destroyed = true;
                let outcome = self.scheduler.handle(SchedulerEvent::Stop, now_ms);
                Outcome {
                    redraw: false,
                    ..outcome
                }
            }
        }
    }

    /// Deliver an armed wake-up. A tick that leads to a redraw refreshes the battery first.
    pub fn on_timer(&mut self, token: TimerToken) -> Outcome {
        let now_ms = self.clock.epoch_millis();
        let outcome = self.scheduler.handle(SchedulerEvent::Tick(token), now_ms);
        if outcome.redraw {
            self.sample_battery();
        }
        outcome
    }

    /// Compose a frame for the current time, battery snapshot and mode.
    pub fn render(&mut self) -> Result<&Raster, FrameError> {
        let mode = self.mode();
        let (time, battery) = if self.demo.enabled {
            (DEMO_TIME, DEMO_BATTERY)
        } else {
            (self.clock.now(), self.battery_snapshot)
        };
        self.composer.render_frame(&time, battery, mode)
    }

    fn resize(&mut self, width: i32, height: i32) {
        self.surface = Some((width, height));
        self.composer.resize(width, height);
    }

    fn sample_battery(&mut self) {
        self.battery_snapshot = self.battery.battery_level();
    }

    /// Top-left quadrant turns the demo snapshot on, bottom-right turns it off.
    fn tap(&mut self, x: i32, y: i32) {
        if !self.demo.tap_toggle {
            return;
        }
        let Some((width, height)) = self.surface else {
            return;
        };
        let (mid_x, mid_y) = (width / 2, height / 2);
        if x < mid_x && y < mid_y && !self.demo.enabled {
            log::info!("Demo snapshot enabled");
            self.demo.enabled = true;
        } else if x >= mid_x && y >= mid_y && self.demo.enabled {
            log::info!("Demo snapshot disabled");
            self.demo.enabled = false;
        }
    }
}
