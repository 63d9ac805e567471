//! # Radial Layout
//!
//! Pure trigonometry placing static dial furniture around a circle:
//!
//! - 60 clock ticks, every fifth one an hour tick
//! - 12 hour numerals, plus a 24-hour numeral beside each quarter hour
//! - an optional battery dial: 11 ticks over a 180° arc, with 0/50/100 shown as labels
//!
//! Everything here depends only on the display size, so the result is built once per resize and
//! rasterized by the background cache.
//!
//! ## Angles
//! Dial angles are measured clockwise from 12 o'clock, matching [`Vec2::polar`].

use crate::config::FaceDesign;
use crate::geometry::{Bounds, Vec2};
use crate::text::TextMeasure;
use crate::DisplayMetrics;

/// Circle that furniture is laid out on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dial {
    pub center: Vec2,
    pub radius: f32,
}

impl Dial {
    pub fn from_metrics(metrics: &DisplayMetrics) -> Self {
        Self {
            center: Vec2::new(metrics.center_x, metrics.center_y),
            radius: metrics.radius,
        }
    }

    fn is_degenerate(&self) -> bool {
        !(self.radius > 0.0 && self.radius.is_finite())
    }
}

pub const TICK_COUNT: usize = 60;
const TICK_STEP_DEGREES: f32 = 360.0 / TICK_COUNT as f32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickKind {
    Hour,
    Minute,
}

/// One radial tick line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickSegment {
    pub index: usize,
    pub kind: TickKind,
    pub outer: Vec2,
    pub inner: Vec2,
}

pub fn is_hour_tick(index: usize) -> bool {
    index % 5 == 0
}

/// Build the 60 clock ticks. Radii are fractions of the dial radius.
///
/// A degenerate dial yields no ticks.
pub fn build_ticks(dial: Dial, outer: f32, hour_inner: f32, minute_inner: f32) -> Vec<TickSegment> {
    if dial.is_degenerate() {
        return Vec::new();
    }

    let mut ticks = Vec::with_capacity(TICK_COUNT);
    let mut angle = 0.0f32;
    for index in 0..TICK_COUNT {
        let (kind, inner) = if is_hour_tick(index) {
            (TickKind::Hour, hour_inner)
        } else {
            (TickKind::Minute, minute_inner)
        };
        ticks.push(TickSegment {
            index,
            kind,
            outer: dial.center.polar(dial.radius * outer, angle),
            inner: dial.center.polar(dial.radius * inner, angle),
        });
        angle += TICK_STEP_DEGREES;
    }
    ticks
}

/// A piece of text placed by its glyph-box center.
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub text: String,
    pub center: Vec2,
    pub width: f32,
    pub height: f32,
    /// Requested pixel height used to measure and draw the text
    pub size_px: f32,
}

impl Label {
    fn measured(text: String, center: Vec2, size_px: f32, measure: &impl TextMeasure) -> Self {
        let (width, height) = measure.measure(&text, size_px);
        Self {
            text,
            center,
            width,
            height,
            size_px,
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_center(self.center, self.width, self.height)
    }
}

/// Where a 24-hour numeral sits relative to its primary numeral.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SecondaryOffset {
    /// Below the primary (12 o'clock)
    Below,
    /// Toward the dial center, horizontally (3 and 9 o'clock)
    Inward,
    /// Above the primary (6 o'clock)
    Above,
}

impl SecondaryOffset {
    /// Positional lookup for the quarter hours; other hours carry no secondary numeral.
    pub fn for_hour(hour: u32) -> Option<Self> {
        if hour % 3 != 0 {
            return None;
        }
        Some(match hour {
            3 | 9 => SecondaryOffset::Inward,
            6 => SecondaryOffset::Above,
            _ => SecondaryOffset::Below,
        })
    }
}

/// Primary numeral for one hour and its optional 24-hour companion.
#[derive(Clone, Debug, PartialEq)]
pub struct NumeralPlacement {
    pub hour: u32,
    pub primary: Label,
    pub secondary: Option<Label>,
}

/// Text sizes and spacing for hour numerals, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NumeralSizes {
    pub primary_px: f32,
    pub secondary_px: f32,
    /// Gap between a primary numeral and its 24-hour companion
    pub gap_px: f32,
}

/// Place numerals 1..=12. `text_radius` is a fraction of the dial radius.
///
/// Each primary glyph is pulled inward by half its box along the radial direction, so the text's
/// outer edge rather than its anchor rests on the text circle.
pub fn build_numerals(
    dial: Dial,
    text_radius: f32,
    sizes: NumeralSizes,
    measure: &impl TextMeasure,
) -> Vec<NumeralPlacement> {
    if dial.is_degenerate() {
        return Vec::new();
    }
    let r = dial.radius * text_radius;

    (1..=12u32)
        .map(|hour| {
            let (s, c) = ((hour % 12) as f32 * 30.0).to_radians().sin_cos();
            let text = hour.to_string();
            let (w, h) = measure.measure(&text, sizes.primary_px);
            let center = Vec2::new(
                dial.center.x + s * r - s * w / 2.0,
                dial.center.y - c * r + c * h / 2.0,
            );
            let primary = Label::measured(text, center, sizes.primary_px, measure);

            let secondary = SecondaryOffset::for_hour(hour).map(|offset| {
                let text = (hour + 12).to_string();
                let (w2, h2) = measure.measure(&text, sizes.secondary_px);
                let gap = sizes.gap_px;
                let center = match offset {
                    SecondaryOffset::Below => center.offset(0.0, h / 2.0 + gap + h2 / 2.0),
                    SecondaryOffset::Above => center.offset(0.0, -(h / 2.0 + gap + h2 / 2.0)),
                    SecondaryOffset::Inward => center.offset(-s * (w / 2.0 + gap + w2 / 2.0), 0.0),
                };
                Label::measured(text, center, sizes.secondary_px, measure)
            });

            NumeralPlacement {
                hour,
                primary,
                secondary,
            }
        })
        .collect()
}

pub const BATTERY_TICK_COUNT: u32 = 11;
const BATTERY_START_DEGREES: f32 = -90.0;
const BATTERY_SWEEP_DEGREES: f32 = 180.0;
/// Inner end of a battery tick, as a fraction of the battery dial radius
const BATTERY_TICK_INNER: f32 = 0.89;

#[derive(Clone, Debug, PartialEq)]
pub enum BatteryMarkKind {
    Line { outer: Vec2, inner: Vec2 },
    Label(Label),
}

/// One graduation of the battery arc.
#[derive(Clone, Debug, PartialEq)]
pub struct BatteryMark {
    /// Percentage this mark stands for
    pub value: u32,
    pub angle: f32,
    pub kind: BatteryMarkKind,
}

/// Battery dial furniture.
#[derive(Clone, Debug, PartialEq)]
pub struct BatteryDial {
    pub dial: Dial,
    pub marks: Vec<BatteryMark>,
    pub caption: Label,
}

pub const BATTERY_CAPTION: &str = "BATTERY";

/// Angle of a battery percentage on the arc: 0 → -90°, 50 → 0°, 100 → +90°.
pub fn battery_angle(percentage: f32) -> f32 {
    BATTERY_START_DEGREES + BATTERY_SWEEP_DEGREES * percentage / 100.0
}

/// Build the battery arc. Ticks at 0, 50 and 100 are replaced by upright labels.
pub fn build_battery_dial(dial: Dial, text_px: f32, measure: &impl TextMeasure) -> Option<BatteryDial> {
    if dial.is_degenerate() {
        return None;
    }
    let step = 100 / (BATTERY_TICK_COUNT - 1);
    let label_radius = dial.radius * (1.0 + BATTERY_TICK_INNER) / 2.0;

    let marks = (0..BATTERY_TICK_COUNT)
        .map(|i| {
            let value = i * step;
            let angle = battery_angle(value as f32);
            let kind = if value % 50 == 0 {
                BatteryMarkKind::Label(Label::measured(
                    value.to_string(),
                    dial.center.polar(label_radius, angle),
                    text_px,
                    measure,
                ))
            } else {
                BatteryMarkKind::Line {
                    outer: dial.center.polar(dial.radius, angle),
                    inner: dial.center.polar(dial.radius * BATTERY_TICK_INNER, angle),
                }
            };
            BatteryMark { value, angle, kind }
        })
        .collect();

    let (_, caption_h) = measure.measure(BATTERY_CAPTION, text_px);
    let caption = Label::measured(
        BATTERY_CAPTION.to_string(),
        dial.center.offset(0.0, -dial.radius / 3.0 + caption_h / 2.0),
        text_px,
        measure,
    );

    Some(BatteryDial {
        dial,
        marks,
        caption,
    })
}

/// All static furniture for one display size.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceLayout {
    pub dial: Dial,
    pub ticks: Vec<TickSegment>,
    pub numerals: Vec<NumeralPlacement>,
    pub battery: Option<BatteryDial>,
}

impl FaceLayout {
    pub fn build(metrics: &DisplayMetrics, design: &FaceDesign, measure: &impl TextMeasure) -> Self {
        let dial = Dial::from_metrics(metrics);
        let percent = |p: f32| metrics.diameter * p / 100.0;

        let ticks = build_ticks(
            dial,
            design.tick_outer,
            design.hour_tick_inner,
            design.minute_tick_inner,
        );
        let numerals = build_numerals(
            dial,
            design.text_radius,
            NumeralSizes {
                primary_px: percent(design.hour_text_percent),
                secondary_px: percent(design.hour24_text_percent),
                gap_px: percent(design.hour24_offset_percent),
            },
            measure,
        );
        let battery = design.battery_dial.and_then(|spec| {
            let h = metrics.height as f32;
            let battery_dial = Dial {
                center: Vec2::new(metrics.center_x, h * spec.center_y_fraction),
                radius: h * spec.radius_fraction,
            };
            build_battery_dial(battery_dial, percent(design.battery_text_percent), measure)
        });

        Self {
            dial,
            ticks,
            numerals,
            battery,
        }
    }
}
