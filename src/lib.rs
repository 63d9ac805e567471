//! # Cockpit Face Core Library
//!
//! This library renders an analog watch face (hour, minute, second and battery hands, tick marks
//! and numerals) into an in-memory raster, and decides when a new frame is needed.
//!
//! ## Design Philosophy
//!
//! ### Static layout is paid for once
//! Everything that only depends on the display size (tick segments, numeral positions, the
//! battery dial, hand outlines) is computed once per resize. Ticks and numerals are rasterized
//! into two cached layers, one for interactive and one for ambient display, so a frame is a
//! layer copy plus a handful of rotated hand fills.
//!
//! ### Rotation happens at draw time
//! Hand paths are always built pointing at 12 o'clock. The composer rotates them with a
//! tiny-skia transform from [`geometry::rotate_about`] while filling, so a path never has an
//! angle baked in and never goes stale within one display size.
//!
//! ### One engine, many faces
//! Face variants differ only in hand proportions, palette and whether a battery dial is present.
//! They are expressed as [`config::FaceDesign`] presets that drive the same engine.
//!
//! ## Data Flow
//! 1. **Scheduler**: [`scheduler::RedrawScheduler`] decides a redraw is due
//! 2. **Snapshot**: the face reads a [`ClockTime`] and a fresh [`BatteryReading`]
//! 3. **Style**: [`style::resolve_style`] maps the current [`style::Mode`] to paints
//! 4. **Compose**: [`composer::FrameComposer`] copies the cached background and draws hands
//!
//! ## Core Types
//! - [`DisplayMetrics`]: surface dimensions and the derived dial center and radius
//! - [`ClockTime`]: a wall-clock snapshot on a 12-hour dial
//! - [`BatteryReading`]: a charge level, possibly unavailable or off-scale

use chrono::Timelike;

// Module declarations
pub mod background;
pub mod composer;
pub mod config;
pub mod face;
pub mod geometry;
pub mod layout;
pub mod preview;
pub mod raster;
pub mod runtime;
pub mod scheduler;
pub mod style;
pub mod text;

#[cfg(test)]
mod tests;

/// Surface dimensions and the dial geometry derived from them.
///
/// Built once per surface-size change and immutable until the next one. The dial is the largest
/// circle centered on the surface, so on a rectangular display `radius` follows the shorter side.
///
/// # Example
/// ```
/// use cockpit_face::DisplayMetrics;
///
/// let metrics = DisplayMetrics::new(400, 300).unwrap();
/// assert_eq!(metrics.radius, 150.0);
/// assert_eq!(metrics.center_x, 200.0);
///
/// // Degenerate surfaces have no metrics at all
/// assert!(DisplayMetrics::new(0, 300).is_none());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayMetrics {
    pub width: u32,
    pub height: u32,
    /// Half of the shorter side
    pub radius: f32,
    /// The shorter side
    pub diameter: f32,
    pub center_x: f32,
    pub center_y: f32,
}

impl DisplayMetrics {
    /// Derive metrics for a surface, or `None` when either side is zero or negative.
    pub fn new(width: i32, height: i32) -> Option<Self> {
        if width <= 0 || height <= 0 {
            return None;
        }
        let (w, h) = (width as f32, height as f32);
        Some(Self {
            width: width as u32,
            height: height as u32,
            radius: w.min(h) / 2.0,
            diameter: w.min(h),
            center_x: w / 2.0,
            center_y: h / 2.0,
        })
    }

    /// Exact cache key for layers built from these metrics.
    pub fn size_key(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Wall-clock snapshot on a 12-hour dial.
///
/// `hour12` is 0..=11 (midnight and noon are both 0), matching how an analog dial reads time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockTime {
    pub hour12: u32,
    pub minute: u32,
    pub second: u32,
    pub millisecond: u32,
}

impl ClockTime {
    pub fn new(hour: u32, minute: u32, second: u32, millisecond: u32) -> Self {
        Self {
            hour12: hour % 12,
            minute: minute.min(59),
            second: second.min(59),
            millisecond: millisecond.min(999),
        }
    }

    /// Snapshot any chrono time value. Leap-second nanoseconds are folded into 999 ms.
    pub fn from_timelike<T: Timelike>(t: &T) -> Self {
        Self::new(t.hour(), t.minute(), t.second(), t.nanosecond() / 1_000_000)
    }
}

/// Battery charge as reported by the host.
///
/// Readings are never errors: anything outside `[0, 100]`, including
/// [`BatteryReading::Unavailable`], is drawn off-scale past the dial's end stops.
///
/// # Example
/// ```
/// use cockpit_face::BatteryReading;
///
/// assert_eq!(BatteryReading::from_level(69, 100).dial_percentage(), 69.0);
/// assert_eq!(BatteryReading::Unavailable.dial_percentage(), -25.0);
/// assert_eq!(BatteryReading::Percent(140.0).dial_percentage(), 125.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum BatteryReading {
    Percent(f32),
    #[default]
    Unavailable,
}

impl BatteryReading {
    /// Off-scale position used for readings below the dial (and unavailable ones).
    pub const BELOW_SCALE: f32 = -25.0;
    /// Off-scale position used for readings above the dial.
    pub const ABOVE_SCALE: f32 = 125.0;

    /// Convert a raw `level / scale` pair. A non-positive scale or negative level means the
    /// platform could not report a value.
    pub fn from_level(level: i32, scale: i32) -> Self {
        if scale <= 0 || level < 0 {
            return BatteryReading::Unavailable;
        }
        BatteryReading::Percent(level as f32 * 100.0 / scale as f32)
    }

    /// Percentage to place the hand at, with off-scale readings pinned past the end stops.
    pub fn dial_percentage(&self) -> f32 {
        match *self {
            BatteryReading::Percent(p) if p.is_nan() => Self::BELOW_SCALE,
            BatteryReading::Percent(p) if p < 0.0 => Self::BELOW_SCALE,
            BatteryReading::Percent(p) if p > 100.0 => Self::ABOVE_SCALE,
            BatteryReading::Percent(p) => p,
            BatteryReading::Unavailable => Self::BELOW_SCALE,
        }
    }
}
