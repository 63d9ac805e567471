//! # Frame Composer
//!
//! Produces one frame per redraw:
//!
//! 1. Copy the cached background layer for the current mode
//! 2. Draw the battery hand on its own dial, if the design has one
//! 3. Draw hour, minute and second hands about the dial center, each rotation composed on top of
//!    the previous one
//!
//! Hands are filled and stroked with tiny-skia onto a transparent scratch layer, which is then
//! composited over the frame at the hand's alpha. A hand is painted in up to four passes: drop
//! shadow, body, accent (the outer part of the hand, clipped with a mask) and, in ambient modes,
//! an outline.

use crate::background::BackgroundCache;
use crate::config::{FaceDesign, HandSpec, Palette};
use crate::geometry::{build_hand_path, rotate_about, HandPath, Vec2};
use crate::layout::battery_angle;
use crate::raster::{try_pixmap, Raster, RasterError};
use crate::style::{resolve_style, HandPaint, HandShadow, Mode};
use crate::text::NumeralFont;
use crate::{BatteryReading, ClockTime, DisplayMetrics};
use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use thiserror::Error;
use tiny_skia::{Color, FillRule, LineJoin, Mask, Paint, Path, Pixmap, Stroke, Transform};

/// Reasons a frame could not be produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// No valid surface size has been reported yet
    #[error("no drawable surface")]
    NoSurface,

    #[error("raster allocation failed: {0}")]
    Raster(#[from] RasterError),
}

/// Hand angles in degrees, clockwise from 12 o'clock, each in `[0, 360)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandAngles {
    pub hours: f32,
    pub minutes: f32,
    pub seconds: f32,
}

/// Angles for `time` with sub-unit carry, so every hand sweeps instead of jumping.
pub fn hand_angles(time: &ClockTime) -> HandAngles {
    let seconds = time.second as f64 + time.millisecond as f64 / 1000.0;
    let minutes = time.minute as f64 + seconds / 60.0;
    let hours = time.hour12 as f64 + minutes / 60.0;
    // Narrowing to f32 can round a value just below 360 up to 360
    let turn = |degrees: f64| {
        let a = degrees as f32;
        if a >= 360.0 {
            a - 360.0
        } else {
            a
        }
    };
    HandAngles {
        hours: turn(hours * 30.0),
        minutes: turn(minutes * 6.0),
        seconds: turn(seconds * 6.0),
    }
}

/// Battery hand rotation from pointing straight up. Off-scale readings rest past the end stops.
pub fn battery_rotation(reading: BatteryReading) -> f32 {
    battery_angle(reading.dial_percentage())
}

/// Hand paths built for one display size.
struct HandSet {
    key: (u32, u32),
    hour: HandPath,
    minute: HandPath,
    second: HandPath,
    battery: Option<HandPath>,
}

impl HandSet {
    fn build(metrics: &DisplayMetrics, design: &FaceDesign) -> Self {
        let center = Vec2::new(metrics.center_x, metrics.center_y);
        let hand = |pivot: Vec2, dial_radius: f32, spec: &HandSpec| {
            build_hand_path(
                pivot,
                dial_radius * spec.length_fraction,
                metrics.diameter * spec.width_fraction,
            )
        };
        let battery = design.battery_dial.map(|dial| {
            let h = metrics.height as f32;
            let pivot = Vec2::new(metrics.center_x, h * dial.center_y_fraction);
            hand(pivot, h * dial.radius_fraction, &design.battery)
        });

        Self {
            key: metrics.size_key(),
            hour: hand(center, metrics.radius, &design.hour),
            minute: hand(center, metrics.radius, &design.minute),
            second: hand(center, metrics.radius, &design.second),
            battery,
        }
    }
}

/// Composes frames for one face design.
pub struct FrameComposer {
    design: FaceDesign,
    palette: Palette,
    metrics: Option<DisplayMetrics>,
    hands: Option<HandSet>,
    canvas: Option<HandCanvas>,
    cache: BackgroundCache,
    frame: Option<Raster>,
}

impl FrameComposer {
    pub fn new(design: FaceDesign, palette: Palette, font: NumeralFont) -> Self {
        let cache = BackgroundCache::new(design.clone(), palette.clone(), font);
        Self {
            design,
            palette,
            metrics: None,
            hands: None,
            canvas: None,
            cache,
            frame: None,
        }
    }

    pub fn metrics(&self) -> Option<DisplayMetrics> {
        self.metrics
    }

    pub fn cache(&self) -> &BackgroundCache {
        &self.cache
    }

    /// Adopt a new surface size. Degenerate sizes leave the composer without a surface.
    pub fn resize(&mut self, width: i32, height: i32) {
        let metrics = DisplayMetrics::new(width, height);
        if metrics.map(|m| m.size_key()) == self.metrics.map(|m| m.size_key()) {
            return;
        }
        match metrics {
            Some(m) => log::info!("Surface resized to {}x{}", m.width, m.height),
            None => log::warn!("Ignoring degenerate surface {}x{}", width, height),
        }
        self.metrics = metrics;
        self.hands = None;
        self.canvas = None;
        self.frame = None;
        self.cache.invalidate();
    }

    /// Compose a frame for `time` and `battery` in `mode`.
    pub fn render_frame(
        &mut self,
        time: &ClockTime,
        battery: BatteryReading,
        mode: Mode,
    ) -> Result<&Raster, FrameError> {
        let metrics = self.metrics.ok_or(FrameError::NoSurface)?;
        let key = metrics.size_key();
        let style = resolve_style(mode, &self.palette, &self.design);

        if self.hands.as_ref().map(|h| h.key) != Some(key) {
            log::debug!("Building hand paths for {}x{}", key.0, key.1);
            self.hands = Some(HandSet::build(&metrics, &self.design));
        }
        let Some(hands) = self.hands.as_ref() else {
            return Err(FrameError::NoSurface);
        };

        let canvas = match self.canvas.take() {
            Some(canvas) if canvas.key == key => canvas,
            _ => HandCanvas::new(key.0, key.1)?,
        };
        let canvas = self.canvas.insert(canvas);
        canvas.shadow = style.shadow;
        canvas.anti_alias = style.anti_alias;

        let layer = self.cache.get_layer(&metrics, style.layer)?;
        let frame = match self.frame.take() {
            Some(mut frame) => {
                if !frame.copy_from(layer) {
                    frame = layer.clone();
                }
                frame
            }
            None => layer.clone(),
        };
        let frame = self.frame.insert(frame);

        if let Some(path) = &hands.battery {
            let rotation = rotate_about(path.pivot(), battery_rotation(battery));
            canvas.draw(frame, path, rotation, &style.battery, self.design.battery.accent_start);
        }

        let angles = hand_angles(time);
        let center = Vec2::new(metrics.center_x, metrics.center_y);
        let hour = rotate_about(center, angles.hours);
        canvas.draw(frame, &hands.hour, hour, &style.hour, self.design.hour.accent_start);

        let minute = hour.pre_concat(rotate_about(center, angles.minutes - angles.hours));
        canvas.draw(frame, &hands.minute, minute, &style.minute, self.design.minute.accent_start);

        if let Some(paint) = &style.second {
            let second = minute.pre_concat(rotate_about(center, angles.seconds - angles.minutes));
            canvas.draw(frame, &hands.second, second, paint, self.design.second.accent_start);
        }

        Ok(frame)
    }
}

/// Frame-sized scratch surfaces for painting one hand at a time.
struct HandCanvas {
    key: (u32, u32),
    layer: Pixmap,
    accent_clip: Mask,
    shadow: Option<HandShadow>,
    anti_alias: bool,
}

impl HandCanvas {
    fn new(width: u32, height: u32) -> Result<Self, RasterError> {
        let layer = try_pixmap(width, height)?;
        let accent_clip =
            Mask::new(width, height).ok_or(RasterError::Allocation { width, height })?;
        Ok(Self {
            key: (width, height),
            layer,
            accent_clip,
            shadow: None,
            anti_alias: true,
        })
    }

    fn draw(
        &mut self,
        frame: &mut Raster,
        path: &HandPath,
        transform: Transform,
        paint: &HandPaint,
        accent_start: f32,
    ) {
        let Some(outline) = path.outline() else {
            return;
        };
        let aa = self.anti_alias;
        let opacity = paint.alpha as f32 / u8::MAX as f32;

        if let Some(shadow) = self.shadow {
            self.layer.fill(Color::TRANSPARENT);
            let dropped = Transform::from_translate(0.0, shadow.offset_y).pre_concat(transform);
            let fill = solid(shadow.color, aa);
            self.layer
                .fill_path(outline, &fill, FillRule::Winding, dropped, None);
            stroke(&mut self.layer, outline, &fill, paint.stroke_width, dropped, None);
            frame.composite(&self.layer, opacity * shadow.alpha as f32 / u8::MAX as f32);
        }

        self.layer.fill(Color::TRANSPARENT);
        let body = solid(paint.body, aa);
        self.layer
            .fill_path(outline, &body, FillRule::Winding, transform, None);
        stroke(&mut self.layer, outline, &body, paint.stroke_width - 1.0, transform, None);

        if let Some(region) = path.accent_region(accent_start, paint.stroke_width) {
            self.accent_clip.data_mut().fill(0);
            self.accent_clip
                .fill_path(&region, FillRule::Winding, aa, transform);
            let accent = solid(paint.accent, aa);
            let clip = Some(&self.accent_clip);
            self.layer
                .fill_path(outline, &accent, FillRule::Winding, transform, clip);
            stroke(&mut self.layer, outline, &accent, paint.stroke_width, transform, clip);
        }

        if let Some(color) = paint.outline {
            stroke(&mut self.layer, outline, &solid(color, aa), paint.stroke_width, transform, None);
        }

        frame.composite(&self.layer, opacity);
    }
}

fn solid(color: Rgb888, anti_alias: bool) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r(), color.g(), color.b(), u8::MAX);
    paint.anti_alias = anti_alias;
    paint
}

/// Stroke `path` with round joins. Widths of zero or less draw nothing.
fn stroke(
    layer: &mut Pixmap,
    path: &Path,
    paint: &Paint<'_>,
    width: f32,
    transform: Transform,
    clip: Option<&Mask>,
) {
    if !(width > 0.0) {
        return;
    }
    let stroke = Stroke {
        width,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };
    layer.stroke_path(path, paint, &stroke, transform, clip);
}
