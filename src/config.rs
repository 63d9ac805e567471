//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the face-config.toml file.
//! It covers the palette, the face design preset, font weight, the interactive redraw cadence
//! and the simulated host (surface size, battery source, demo snapshot).
//!
//! Face variants are not separate code paths: a [`FaceKind`] selects a [`FaceDesign`] table of
//! proportions that drives the single rendering engine.

use embedded_graphics::pixelcolor::Rgb888;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "face-config.toml";

/// Errors raised while reading or writing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config IO: {0}")]
    Io(#[from] io::Error),

    #[error("config parse: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config serialize: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid color {0:?}, expected #rrggbb")]
    InvalidColor(String),
}

/// Application configuration loaded from face-config.toml
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Config {
    pub face: FaceConfig,
    pub palette: Palette,
    pub font: FontConfig,
    pub schedule: ScheduleConfig,
    pub display: DisplayConfig,
    pub battery: BatteryConfig,
    pub demo: DemoConfig,
}

/// Which face design preset to render
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FaceConfig {
    pub design: FaceKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FaceKind {
    /// Two-tone hands with a battery dial in the lower half
    #[default]
    Cockpit,
    /// Slim single-tone hands, no battery dial
    Avionics,
}

/// Numeral font
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FontConfig {
    pub weight: FontWeight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

/// Redraw cadence
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Interactive update period in milliseconds (200 ms = 5 Hz)
    pub interactive_period_ms: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interactive_period_ms: 200,
        }
    }
}

/// Simulated host surface
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: i32,
    pub height: i32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 400,
        }
    }
}

/// Battery level source
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BatteryConfig {
    /// sysfs file holding the charge percentage
    pub capacity_path: PathBuf,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            capacity_path: PathBuf::from("/sys/class/power_supply/BAT0/capacity"),
        }
    }
}

/// Fixed demo snapshot (10:10:32.500, 69 % battery)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Start with the demo snapshot instead of live time
    pub enabled: bool,
    /// Tap top-left to enter demo mode, bottom-right to leave it
    pub tap_toggle: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            tap_toggle: true,
        }
    }
}

/// Color written as `#rrggbb` in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(pub Rgb888);

impl HexColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        HexColor(Rgb888::new(r, g, b))
    }

    pub fn color(self) -> Rgb888 {
        self.0
    }
}

impl TryFrom<String> for HexColor {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let digits = value
            .strip_prefix('#')
            .filter(|d| d.len() == 6 && d.is_ascii())
            .ok_or_else(|| ConfigError::InvalidColor(value.clone()))?;
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| ConfigError::InvalidColor(value.clone()))
        };
        Ok(HexColor::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        use embedded_graphics::pixelcolor::RgbColor;
        let c = color.0;
        format!("#{:02x}{:02x}{:02x}", c.r(), c.g(), c.b())
    }
}

/// Two-tone hand colors: `body` near the pivot, `accent` toward the tip
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct HandColors {
    pub body: HexColor,
    pub accent: HexColor,
}

/// Named color palette, loaded once at startup
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Palette {
    pub background: HexColor,
    pub shadow: HexColor,
    pub text: HexColor,
    pub hour_tick: HexColor,
    pub minute_tick: HexColor,
    pub battery_tick: HexColor,
    pub hour_hand: HandColors,
    pub minute_hand: HandColors,
    pub second_hand: HandColors,
    pub battery_hand: HandColors,
}

impl Default for Palette {
    fn default() -> Self {
        let steel = HexColor::rgb(0x3c, 0x41, 0x48);
        Palette {
            background: HexColor::rgb(0x1a, 0x1d, 0x21),
            shadow: HexColor::rgb(0x05, 0x05, 0x05),
            text: HexColor::rgb(0xe8, 0xe8, 0xe8),
            hour_tick: HexColor::rgb(0xff, 0xff, 0xff),
            minute_tick: HexColor::rgb(0xb0, 0xb0, 0xb0),
            battery_tick: HexColor::rgb(0xf2, 0xb6, 0x32),
            hour_hand: HandColors {
                body: steel,
                accent: HexColor::rgb(0xf5, 0xf5, 0xf5),
            },
            minute_hand: HandColors {
                body: steel,
                accent: HexColor::rgb(0xf5, 0xf5, 0xf5),
            },
            second_hand: HandColors {
                body: HexColor::rgb(0x8a, 0x1c, 0x1c),
                accent: HexColor::rgb(0xff, 0x5a, 0x36),
            },
            battery_hand: HandColors {
                body: steel,
                accent: HexColor::rgb(0xf2, 0xb6, 0x32),
            },
        }
    }
}

/// Proportions of one hand kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandSpec {
    /// Length as a fraction of the dial radius it pivots on
    pub length_fraction: f32,
    /// Width as a fraction of the display diameter
    pub width_fraction: f32,
    /// Accent outline width in pixels; the body uses one pixel less
    pub stroke_width: f32,
    /// Fraction of the length, from the pivot, where the accent section starts
    pub accent_start: f32,
}

/// Battery sub-dial placement, relative to the surface height
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryDialSpec {
    pub center_y_fraction: f32,
    pub radius_fraction: f32,
}

/// Layout constants for one face variant
#[derive(Debug, Clone, PartialEq)]
pub struct FaceDesign {
    pub kind: FaceKind,
    pub tick_outer: f32,
    pub hour_tick_inner: f32,
    pub minute_tick_inner: f32,
    pub hour_tick_stroke: u32,
    pub minute_tick_stroke: u32,
    pub battery_tick_stroke: u32,
    /// Radius (fraction of dial radius) the numerals are pushed against
    pub text_radius: f32,
    /// Text sizes as a percentage of the display diameter
    pub hour_text_percent: f32,
    pub hour24_text_percent: f32,
    pub hour24_offset_percent: f32,
    pub battery_text_percent: f32,
    /// Number of 1 px drop-shadow passes baked into the full background layer
    pub layer_shadow_passes: u32,
    /// Vertical offset of the hand drop shadow in pixels
    pub hand_shadow_offset: f32,
    pub hour: HandSpec,
    pub minute: HandSpec,
    pub second: HandSpec,
    pub battery: HandSpec,
    pub battery_dial: Option<BatteryDialSpec>,
}

impl FaceDesign {
    pub fn for_kind(kind: FaceKind) -> Self {
        match kind {
            FaceKind::Cockpit => Self::cockpit(),
            FaceKind::Avionics => Self::avionics(),
        }
    }

    pub fn cockpit() -> Self {
        let tick_outer = 0.97;
        let hour_tick_inner = 0.89;
        let minute_tick_inner = 0.92;
        FaceDesign {
            kind: FaceKind::Cockpit,
            tick_outer,
            hour_tick_inner,
            minute_tick_inner,
            hour_tick_stroke: 3,
            minute_tick_stroke: 3,
            battery_tick_stroke: 3,
            text_radius: 0.84,
            hour_text_percent: 12.0,
            hour24_text_percent: 4.5,
            hour24_offset_percent: 2.0,
            battery_text_percent: 4.5,
            layer_shadow_passes: 2,
            hand_shadow_offset: 3.0,
            hour: HandSpec {
                length_fraction: 0.5,
                width_fraction: 0.04,
                stroke_width: 2.0,
                accent_start: 1.0 / 3.0,
            },
            minute: HandSpec {
                length_fraction: (tick_outer + minute_tick_inner) / 2.0,
                width_fraction: 0.04,
                stroke_width: 2.0,
                accent_start: 0.25,
            },
            second: HandSpec {
                length_fraction: tick_outer,
                width_fraction: 0.015,
                stroke_width: 2.0,
                accent_start: 0.25,
            },
            battery: HandSpec {
                length_fraction: (1.0 + hour_tick_inner) / 2.0,
                width_fraction: 0.02,
                stroke_width: 2.0,
                accent_start: 1.0 / 3.0,
            },
            battery_dial: Some(BatteryDialSpec {
                center_y_fraction: 0.72,
                radius_fraction: 0.16,
            }),
        }
    }

    pub fn avionics() -> Self {
        FaceDesign {
            kind: FaceKind::Avionics,
            hour24_text_percent: 4.0,
            layer_shadow_passes: 1,
            hand_shadow_offset: 1.0,
            hour: HandSpec {
                length_fraction: 0.5,
                width_fraction: 0.035,
                stroke_width: 5.0,
                accent_start: 1.0,
            },
            minute: HandSpec {
                length_fraction: 0.75,
                width_fraction: 0.025,
                stroke_width: 3.0,
                accent_start: 1.0,
            },
            second: HandSpec {
                length_fraction: 0.875,
                width_fraction: 0.015,
                stroke_width: 2.0,
                accent_start: 1.0,
            },
            battery_dial: None,
            ..Self::cockpit()
        }
    }
}

impl Config {
    /// Load configuration from face-config.toml
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        match Self::try_load_from_path(&path) {
            Ok(config) => {
                log::info!(
                    "Loaded {:?} face configuration from {}",
                    config.face.design,
                    path.as_ref().display()
                );
                config
            }
            Err(ConfigError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No config file found, using default configuration");
                Self::default()
            }
            Err(e) => {
                log::warn!("Invalid config file: {}", e);
                log::warn!("Using default configuration");
                Self::default()
            }
        }
    }

    /// Strict load: any read or parse problem is returned to the caller
    pub fn try_load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str::<Config>(&contents)?)
    }

    /// Save current configuration as pretty TOML
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, contents)?;
        log::info!("Configuration saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Save current configuration to face-config.toml
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to_path(CONFIG_FILE)
    }

    /// Layout table for the configured face variant
    pub fn design(&self) -> FaceDesign {
        FaceDesign::for_kind(self.face.design)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.face.design, FaceKind::Cockpit);
        assert_eq!(config.schedule.interactive_period_ms, 200);
        assert_eq!(config.display.width, 400);
        assert_eq!(config.display.height, 400);
        assert!(!config.demo.enabled);
        assert!(config.demo.tap_toggle);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let config = Config::load_from_path("/nonexistent/path");
        // Should fallback to default
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r##"
[face]
design = "avionics"

[palette]
background = "#102030"
"##
        )
        .unwrap();

        let config = Config::try_load_from_path(file.path()).unwrap();
        assert_eq!(config.face.design, FaceKind::Avionics);
        assert_eq!(config.palette.background, HexColor::rgb(0x10, 0x20, 0x30));
        assert_eq!(config.palette.text, Palette::default().text);
        assert_eq!(config.schedule.interactive_period_ms, 200);
    }

    #[test]
    fn test_invalid_color_falls_back_to_default() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[palette]\nbackground = \"teal\"").unwrap();

        assert!(matches!(
            Config::try_load_from_path(file.path()),
            Err(ConfigError::Parse(_))
        ));
        assert_eq!(Config::load_from_path(file.path()), Config::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let mut config = Config::default();
        config.font.weight = FontWeight::Bold;
        config.schedule.interactive_period_ms = 1000;

        config.save_to_path(&path).unwrap();
        let loaded = Config::try_load_from_path(&path).unwrap();
        assert_eq!(loaded.font.weight, FontWeight::Bold);
        assert_eq!(loaded.schedule.interactive_period_ms, 1000);
    }

    #[test]
    fn test_hex_color_parsing() {
        assert_eq!(
            HexColor::try_from("#ff8000".to_string()).unwrap(),
            HexColor::rgb(0xff, 0x80, 0x00)
        );
        assert!(HexColor::try_from("ff8000".to_string()).is_err());
        assert!(HexColor::try_from("#ff80".to_string()).is_err());
        assert!(HexColor::try_from("#gg8000".to_string()).is_err());
        assert_eq!(String::from(HexColor::rgb(1, 2, 255)), "#0102ff");
    }

    #[test]
    fn test_design_presets() {
        let cockpit = FaceDesign::for_kind(FaceKind::Cockpit);
        assert!(cockpit.battery_dial.is_some());
        assert!((cockpit.minute.length_fraction - 0.945).abs() < 1e-6);
        assert!((cockpit.battery.length_fraction - 0.945).abs() < 1e-6);

        let avionics = FaceDesign::for_kind(FaceKind::Avionics);
        assert!(avionics.battery_dial.is_none());
        assert_eq!(avionics.tick_outer, cockpit.tick_outer);
        assert_eq!(avionics.second.length_fraction, 0.875);
    }
}
