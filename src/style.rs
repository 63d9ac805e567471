//! # Display Modes and Paint Resolution
//!
//! The host reports display state as independent flags (ambient, low-bit, burn-in protection,
//! mute). [`Mode`] collapses them into the five cases that actually look different, and
//! [`resolve_style`] turns a mode into an immutable [`FaceStyle`]. Nothing here mutates shared
//! paint state; the composer asks for a fresh style every frame.

use crate::config::{FaceDesign, HandColors, Palette};
use embedded_graphics::pixelcolor::{Rgb888, RgbColor};

/// Raw display flags as delivered by host notifications.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DisplayFlags {
    pub ambient: bool,
    pub low_bit: bool,
    pub burn_in: bool,
    pub muted: bool,
}

/// Distinct rendering modes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    #[default]
    Interactive,
    /// Interactive with notifications silenced: hands are dimmed
    Muted,
    Ambient,
    AmbientLowBit,
    AmbientBurnIn,
}

/// Which cached background layer a mode draws on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerVariant {
    Full,
    Ambient,
}

impl Mode {
    pub fn from_flags(flags: DisplayFlags) -> Self {
        match (flags.ambient, flags.low_bit, flags.burn_in, flags.muted) {
            (true, true, _, _) => Mode::AmbientLowBit,
            (true, false, true, _) => Mode::AmbientBurnIn,
            (true, false, false, _) => Mode::Ambient,
            (false, _, _, true) => Mode::Muted,
            (false, _, _, false) => Mode::Interactive,
        }
    }

    /// Parse a mode name; unknown names fall back to [`Mode::Interactive`].
    pub fn from_name(name: &str) -> Self {
        let key = name
            .trim()
            .to_ascii_lowercase()
            .replace(|c: char| c == '-' || c == '_', "");
        match key.as_str() {
            "interactive" => Mode::Interactive,
            "muted" | "mute" => Mode::Muted,
            "ambient" => Mode::Ambient,
            "ambientlowbit" | "lowbit" => Mode::AmbientLowBit,
            "ambientburnin" | "burnin" => Mode::AmbientBurnIn,
            other => {
                log::warn!("Unknown mode {:?}, using interactive", other);
                Mode::Interactive
            }
        }
    }

    /// Flags that produce this mode, for hosts that are driven by name.
    pub fn flags(self) -> DisplayFlags {
        let mut flags = DisplayFlags::default();
        match self {
            Mode::Interactive => {}
            Mode::Muted => flags.muted = true,
            Mode::Ambient => flags.ambient = true,
            Mode::AmbientLowBit => {
                flags.ambient = true;
                flags.low_bit = true;
            }
            Mode::AmbientBurnIn => {
                flags.ambient = true;
                flags.burn_in = true;
            }
        }
        flags
    }

    pub fn is_ambient(self) -> bool {
        matches!(
            self,
            Mode::Ambient | Mode::AmbientLowBit | Mode::AmbientBurnIn
        )
    }

    pub fn layer(self) -> LayerVariant {
        if self.is_ambient() {
            LayerVariant::Ambient
        } else {
            LayerVariant::Full
        }
    }
}

/// Paint for one hand.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandPaint {
    /// Fill of the whole hand, stroked at `stroke_width - 1`
    pub body: Rgb888,
    /// Fill of the section beyond the accent boundary, stroked at `stroke_width`
    pub accent: Rgb888,
    /// Outline drawn around the body in ambient modes
    pub outline: Option<Rgb888>,
    pub stroke_width: f32,
    pub alpha: u8,
}

/// Drop shadow cast by the hands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandShadow {
    pub color: Rgb888,
    pub offset_y: f32,
    pub alpha: u8,
}

/// Fully resolved paints for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceStyle {
    pub mode: Mode,
    pub layer: LayerVariant,
    pub background: Rgb888,
    pub anti_alias: bool,
    pub shadow: Option<HandShadow>,
    pub hour: HandPaint,
    pub minute: HandPaint,
    /// `None` when the second hand is suppressed
    pub second: Option<HandPaint>,
    pub battery: HandPaint,
}

const MUTED_ALPHA: u8 = 100;
const MUTED_SECOND_ALPHA: u8 = 80;
const SHADOW_ALPHA: u8 = 110;

/// Map a mode to its paints. Pure: equal inputs always give equal output.
pub fn resolve_style(mode: Mode, palette: &Palette, design: &FaceDesign) -> FaceStyle {
    let design_paint = |colors: &HandColors, stroke: f32, alpha: u8| HandPaint {
        body: colors.body.color(),
        accent: colors.accent.color(),
        outline: None,
        stroke_width: stroke,
        alpha,
    };
    let ambient_paint = |stroke: f32| HandPaint {
        body: Rgb888::BLACK,
        accent: Rgb888::WHITE,
        outline: Some(Rgb888::WHITE),
        stroke_width: stroke,
        alpha: u8::MAX,
    };

    match mode {
        Mode::Interactive | Mode::Muted => {
            let muted = mode == Mode::Muted;
            let alpha = if muted { MUTED_ALPHA } else { u8::MAX };
            let second_alpha = if muted { MUTED_SECOND_ALPHA } else { u8::MAX };
            FaceStyle {
                mode,
                layer: LayerVariant::Full,
                background: palette.background.color(),
                anti_alias: true,
                shadow: Some(HandShadow {
                    color: palette.shadow.color(),
                    offset_y: design.hand_shadow_offset,
                    alpha: SHADOW_ALPHA,
                }),
                hour: design_paint(&palette.hour_hand, design.hour.stroke_width, alpha),
                minute: design_paint(&palette.minute_hand, design.minute.stroke_width, alpha),
                second: Some(design_paint(
                    &palette.second_hand,
                    design.second.stroke_width,
                    second_alpha,
                )),
                battery: design_paint(&palette.battery_hand, design.battery.stroke_width, alpha),
            }
        }
        Mode::Ambient | Mode::AmbientLowBit | Mode::AmbientBurnIn => FaceStyle {
            mode,
            layer: LayerVariant::Ambient,
            background: Rgb888::BLACK,
            anti_alias: mode == Mode::Ambient,
            shadow: None,
            hour: ambient_paint(design.hour.stroke_width),
            minute: ambient_paint(design.minute.stroke_width),
            second: None,
            battery: ambient_paint(design.battery.stroke_width),
        },
    }
}
