//! # Background Cache
//!
//! Ticks and numerals never move, so they are rasterized once per display size into two layers:
//!
//! - **Full**: palette background, tick and numeral colors, with a baked 1 px drop shadow
//! - **Ambient**: black background, white furniture, no shadow
//!
//! The cache holds one entry keyed by exact `(width, height)`. A request for any other size drops
//! the entry and rebuilds synchronously; each layer is rasterized lazily, the first time a frame
//! needs it.

use crate::config::{FaceDesign, Palette};
use crate::geometry::Vec2;
use crate::layout::{BatteryMarkKind, FaceLayout, Label, TickKind};
use crate::raster::{Raster, RasterError};
use crate::style::LayerVariant;
use crate::text::NumeralFont;
use crate::DisplayMetrics;
use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle};

struct CacheEntry {
    key: (u32, u32),
    layout: FaceLayout,
    full: Option<Raster>,
    ambient: Option<Raster>,
}

/// Colors for one rasterization pass over the furniture.
#[derive(Clone, Copy)]
struct PassColors {
    hour_tick: Rgb888,
    minute_tick: Rgb888,
    battery_tick: Rgb888,
    text: Rgb888,
}

/// Memoized background layers for the current display size.
pub struct BackgroundCache {
    design: FaceDesign,
    palette: Palette,
    font: NumeralFont,
    entry: Option<CacheEntry>,
    rebuilds: u64,
}

impl BackgroundCache {
    pub fn new(design: FaceDesign, palette: Palette, font: NumeralFont) -> Self {
        Self {
            design,
            palette,
            font,
            entry: None,
            rebuilds: 0,
        }
    }

    /// Number of layers rasterized so far.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    /// Layout of the cached entry, if one exists.
    pub fn layout(&self) -> Option<&FaceLayout> {
        self.entry.as_ref().map(|e| &e.layout)
    }

    /// Drop every cached layer.
    pub fn invalidate(&mut self) {
        if self.entry.take().is_some() {
            log::debug!("Background cache invalidated");
        }
    }

    /// Return the layer for `variant` at `metrics`' size, building it on a miss.
    pub fn get_layer(
        &mut self,
        metrics: &DisplayMetrics,
        variant: LayerVariant,
    ) -> Result<&Raster, RasterError> {
        let key = metrics.size_key();
        if self.entry.as_ref().map(|e| e.key) != Some(key) {
            log::debug!("Laying out face for {}x{}", key.0, key.1);
            self.entry = Some(CacheEntry {
                key,
                layout: FaceLayout::build(metrics, &self.design, &self.font),
                full: None,
                ambient: None,
            });
        }

        let design = &self.design;
        let palette = &self.palette;
        let font = &self.font;
        let rebuilds = &mut self.rebuilds;
        let Some(entry) = self.entry.as_mut() else {
            return Err(RasterError::Degenerate {
                width: key.0,
                height: key.1,
            });
        };

        let slot = match variant {
            LayerVariant::Full => &mut entry.full,
            LayerVariant::Ambient => &mut entry.ambient,
        };
        if slot.is_none() {
            let raster = match variant {
                LayerVariant::Full => render_full(&entry.layout, key, design, palette, font)?,
                LayerVariant::Ambient => render_ambient(&entry.layout, key, design, font)?,
            };
            *rebuilds += 1;
            log::debug!("Rasterized {:?} background layer ({} total)", variant, rebuilds);
            *slot = Some(raster);
        }
        // The slot was filled above
        slot.as_ref().ok_or(RasterError::Degenerate {
            width: key.0,
            height: key.1,
        })
    }
}

fn render_full(
    layout: &FaceLayout,
    (width, height): (u32, u32),
    design: &FaceDesign,
    palette: &Palette,
    font: &NumeralFont,
) -> Result<Raster, RasterError> {
    let mut raster = Raster::new(width, height, palette.background.color())?;

    let shadow = palette.shadow.color();
    let shadow_pass = PassColors {
        hour_tick: Rgb888::BLACK,
        minute_tick: Rgb888::BLACK,
        battery_tick: shadow,
        text: shadow,
    };
    for dy in 1..=design.layer_shadow_passes {
        draw_furniture(&mut raster, layout, design, font, shadow_pass, dy as f32);
    }

    let true_pass = PassColors {
        hour_tick: palette.hour_tick.color(),
        minute_tick: palette.minute_tick.color(),
        battery_tick: palette.battery_tick.color(),
        text: palette.text.color(),
    };
    draw_furniture(&mut raster, layout, design, font, true_pass, 0.0);
    Ok(raster)
}

fn render_ambient(
    layout: &FaceLayout,
    (width, height): (u32, u32),
    design: &FaceDesign,
    font: &NumeralFont,
) -> Result<Raster, RasterError> {
    let mut raster = Raster::new(width, height, Rgb888::BLACK)?;
    let white = PassColors {
        hour_tick: Rgb888::WHITE,
        minute_tick: Rgb888::WHITE,
        battery_tick: Rgb888::WHITE,
        text: Rgb888::WHITE,
    };
    draw_furniture(&mut raster, layout, design, font, white, 0.0);
    Ok(raster)
}

fn draw_furniture(
    raster: &mut Raster,
    layout: &FaceLayout,
    design: &FaceDesign,
    font: &NumeralFont,
    colors: PassColors,
    dy: f32,
) {
    for tick in &layout.ticks {
        let (color, stroke) = match tick.kind {
            TickKind::Hour => (colors.hour_tick, design.hour_tick_stroke),
            TickKind::Minute => (colors.minute_tick, design.minute_tick_stroke),
        };
        draw_line(raster, tick.outer, tick.inner, dy, color, stroke);
    }

    for numeral in &layout.numerals {
        draw_label(raster, font, &numeral.primary, dy, colors.text);
        if let Some(secondary) = &numeral.secondary {
            draw_label(raster, font, secondary, dy, colors.text);
        }
    }

    if let Some(battery) = &layout.battery {
        for mark in &battery.marks {
            match &mark.kind {
                BatteryMarkKind::Line { outer, inner } => draw_line(
                    raster,
                    *outer,
                    *inner,
                    dy,
                    colors.battery_tick,
                    design.battery_tick_stroke,
                ),
                BatteryMarkKind::Label(label) => draw_label(raster, font, label, dy, colors.text),
            }
        }
        draw_label(raster, font, &battery.caption, dy, colors.text);
    }
}

fn to_point(p: Vec2, dy: f32) -> Point {
    Point::new(p.x.round() as i32, (p.y + dy).round() as i32)
}

fn draw_line(raster: &mut Raster, from: Vec2, to: Vec2, dy: f32, color: Rgb888, stroke: u32) {
    let _ = Line::new(to_point(from, dy), to_point(to, dy))
        .into_styled(PrimitiveStyle::with_stroke(color, stroke))
        .draw(raster);
}

fn draw_label(raster: &mut Raster, font: &NumeralFont, label: &Label, dy: f32, color: Rgb888) {
    let center = label.center.offset(0.0, dy);
    let _ = font.draw_centered(raster, &label.text, center, label.size_px, color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FontWeight, HexColor};

    fn cache() -> BackgroundCache {
        BackgroundCache::new(
            FaceDesign::cockpit(),
            Palette::default(),
            NumeralFont::new(FontWeight::Regular),
        )
    }

    #[test]
    fn test_repeated_requests_do_not_rebuild() {
        let mut cache = cache();
        let metrics = DisplayMetrics::new(200, 200).unwrap();
        let first = cache.get_layer(&metrics, LayerVariant::Full).unwrap().clone();
        let second = cache.get_layer(&metrics, LayerVariant::Full).unwrap().clone();
        assert_eq!(first, second);
        assert_eq!(cache.rebuild_count(), 1);
    }

    #[test]
    fn test_layers_are_built_lazily_and_independently() {
        let mut cache = cache();
        let metrics = DisplayMetrics::new(120, 120).unwrap();
        cache.get_layer(&metrics, LayerVariant::Ambient).unwrap();
        assert_eq!(cache.rebuild_count(), 1);
        cache.get_layer(&metrics, LayerVariant::Full).unwrap();
        cache.get_layer(&metrics, LayerVariant::Ambient).unwrap();
        assert_eq!(cache.rebuild_count(), 2);
    }

    #[test]
    fn test_size_change_forces_rebuild() {
        let mut cache = cache();
        let small = DisplayMetrics::new(100, 100).unwrap();
        let large = DisplayMetrics::new(160, 120).unwrap();
        cache.get_layer(&small, LayerVariant::Full).unwrap();
        let layer = cache.get_layer(&large, LayerVariant::Full).unwrap();
        assert_eq!((layer.width(), layer.height()), (160, 120));
        assert_eq!(cache.rebuild_count(), 2);
        assert_eq!(cache.layout().unwrap().dial.radius, 60.0);
    }

    #[test]
    fn test_invalidate_drops_layers() {
        let mut cache = cache();
        let metrics = DisplayMetrics::new(100, 100).unwrap();
        cache.get_layer(&metrics, LayerVariant::Full).unwrap();
        cache.invalidate();
        assert!(cache.layout().is_none());
        cache.get_layer(&metrics, LayerVariant::Full).unwrap();
        assert_eq!(cache.rebuild_count(), 2);
    }

    #[test]
    fn test_ambient_layer_is_monochrome() {
        let mut cache = cache();
        let metrics = DisplayMetrics::new(200, 200).unwrap();
        let layer = cache.get_layer(&metrics, LayerVariant::Ambient).unwrap();
        assert!(layer
            .pixels()
            .all(|p| p == Rgb888::BLACK || p == Rgb888::WHITE));
        assert!(layer.pixels().any(|p| p == Rgb888::WHITE));
    }

    #[test]
    fn test_full_layer_draws_ticks_and_shadow() {
        let mut palette = Palette::default();
        palette.hour_tick = HexColor::rgb(255, 0, 0);
        let mut cache = BackgroundCache::new(
            FaceDesign::cockpit(),
            palette.clone(),
            NumeralFont::new(FontWeight::Regular),
        );
        let metrics = DisplayMetrics::new(200, 200).unwrap();
        let layer = cache.get_layer(&metrics, LayerVariant::Full).unwrap();

        // Corner lies outside the dial
        assert_eq!(layer.pixel(0, 0), Some(palette.background.color()));
        // 12 o'clock hour tick runs from y = 3 to y = 11 on the vertical center line
        assert_eq!(layer.pixel(100, 7), Some(Rgb888::new(255, 0, 0)));
        // Its drop shadow shows just below the inner end
        assert_eq!(layer.pixel(100, 12), Some(Rgb888::BLACK));
    }
}
