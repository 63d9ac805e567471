//! # Numeral Text
//!
//! Dial numerals are drawn with the embedded-graphics ASCII mono fonts. Mono fonts only come in a
//! handful of fixed sizes, so a requested pixel height is met by picking the closest base font and
//! scaling it by an integer factor through [`ScaledTarget`].
//!
//! Layout code only needs text extents, so it depends on the [`TextMeasure`] trait rather than on
//! a concrete font. Tests substitute a fixed-metrics measurer.

use crate::config::FontWeight;
use crate::geometry::Vec2;
use embedded_graphics::mono_font::{ascii, MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::{Baseline, Text};

/// Measures the rendered extent of a string at a requested pixel height.
pub trait TextMeasure {
    /// Width and height of `text` in pixels when drawn at `size_px`.
    fn measure(&self, text: &str, size_px: f32) -> (f32, f32);
}

/// Base fonts are scaled up once a request exceeds this height.
const LARGEST_BASE_HEIGHT: f32 = 20.0;

const REGULAR: [&MonoFont<'static>; 8] = [
    &ascii::FONT_4X6,
    &ascii::FONT_5X8,
    &ascii::FONT_6X10,
    &ascii::FONT_6X13,
    &ascii::FONT_7X14,
    &ascii::FONT_9X15,
    &ascii::FONT_9X18,
    &ascii::FONT_10X20,
];

const BOLD: [&MonoFont<'static>; 7] = [
    &ascii::FONT_4X6,
    &ascii::FONT_5X8,
    &ascii::FONT_6X10,
    &ascii::FONT_6X13_BOLD,
    &ascii::FONT_7X14_BOLD,
    &ascii::FONT_9X15_BOLD,
    &ascii::FONT_9X18_BOLD,
];

/// A mono font family that can be drawn at any pixel height.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NumeralFont {
    weight: FontWeight,
}

impl NumeralFont {
    pub fn new(weight: FontWeight) -> Self {
        Self { weight }
    }

    pub fn weight(&self) -> FontWeight {
        self.weight
    }

    /// Base font and integer scale used for `size_px`.
    pub fn select(&self, size_px: f32) -> (&'static MonoFont<'static>, u32) {
        let family: &[&'static MonoFont<'static>] = match self.weight {
            FontWeight::Regular => &REGULAR,
            FontWeight::Bold => &BOLD,
        };
        let size_px = if size_px.is_finite() { size_px } else { 0.0 };
        let scale = (size_px / LARGEST_BASE_HEIGHT).round().max(1.0) as u32;
        let per_scale = size_px / scale as f32;

        // Families are sorted by height; take the tallest that fits, else the smallest.
        let font = family
            .iter()
            .rev()
            .find(|f| f.character_size.height as f32 <= per_scale)
            .or_else(|| family.first())
            .copied()
            .unwrap_or(&ascii::FONT_6X10);
        (font, scale)
    }

    /// Draw `text` with its glyph box centered on `center`.
    pub fn draw_centered<D>(
        &self,
        target: &mut D,
        text: &str,
        center: Vec2,
        size_px: f32,
        color: Rgb888,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let (w, h) = self.measure(text, size_px);
        let top_left = Point::new(
            (center.x - w / 2.0).round() as i32,
            (center.y - h / 2.0).round() as i32,
        );
        self.draw(target, text, top_left, size_px, color)
    }

    /// Draw `text` with its top-left corner at `top_left`.
    pub fn draw<D>(
        &self,
        target: &mut D,
        text: &str,
        top_left: Point,
        size_px: f32,
        color: Rgb888,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let (font, scale) = self.select(size_px);
        let style = MonoTextStyle::new(font, color);
        let mut scaled = ScaledTarget::new(target, top_left, scale);
        Text::with_baseline(text, Point::zero(), style, Baseline::Top).draw(&mut scaled)?;
        Ok(())
    }
}

impl TextMeasure for NumeralFont {
    fn measure(&self, text: &str, size_px: f32) -> (f32, f32) {
        let (font, scale) = self.select(size_px);
        let n = text.chars().count() as u32;
        if n == 0 {
            return (0.0, 0.0);
        }
        let width = n * font.character_size.width + (n - 1) * font.character_spacing;
        (
            (width * scale) as f32,
            (font.character_size.height * scale) as f32,
        )
    }
}

/// Draw target adapter that magnifies every pixel into a `scale`×`scale` block at `origin`.
pub struct ScaledTarget<'a, D> {
    inner: &'a mut D,
    origin: Point,
    scale: u32,
}

impl<'a, D> ScaledTarget<'a, D>
where
    D: DrawTarget,
{
    pub fn new(inner: &'a mut D, origin: Point, scale: u32) -> Self {
        Self {
            inner,
            origin,
            scale: scale.max(1),
        }
    }
}

impl<D> Dimensions for ScaledTarget<'_, D>
where
    D: DrawTarget,
{
    fn bounding_box(&self) -> Rectangle {
        let inner = self.inner.bounding_box();
        let size = Size::new(
            inner.size.width / self.scale,
            inner.size.height / self.scale,
        );
        Rectangle::new(Point::zero(), size)
    }
}

impl<D> DrawTarget for ScaledTarget<'_, D>
where
    D: DrawTarget,
{
    type Color = D::Color;
    type Error = D::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let block = Size::new_equal(self.scale);
        let scale = self.scale as i32;
        for Pixel(p, color) in pixels {
            let corner = self.origin + Point::new(p.x * scale, p.y * scale);
            self.inner
                .fill_solid(&Rectangle::new(corner, block), color)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::mock_display::MockDisplay;
    use embedded_graphics::pixelcolor::RgbColor;

    #[test]
    fn test_small_sizes_use_unscaled_fonts() {
        let font = NumeralFont::new(FontWeight::Regular);
        let (base, scale) = font.select(18.0);
        assert_eq!(scale, 1);
        assert_eq!(base.character_size, Size::new(9, 18));
    }

    #[test]
    fn test_large_sizes_scale_the_base_font() {
        let font = NumeralFont::new(FontWeight::Regular);
        let (base, scale) = font.select(48.0);
        assert_eq!(scale, 2);
        assert_eq!(base.character_size, Size::new(10, 20));
        assert_eq!(font.measure("10", 48.0), (40.0, 40.0));
    }

    #[test]
    fn test_tiny_requests_fall_back_to_smallest_font() {
        let font = NumeralFont::new(FontWeight::Bold);
        let (base, scale) = font.select(2.0);
        assert_eq!(scale, 1);
        assert_eq!(base.character_size, Size::new(4, 6));
        let (_, scale) = font.select(f32::NAN);
        assert_eq!(scale, 1);
    }

    #[test]
    fn test_bold_weight_keeps_small_sizes_legible() {
        let font = NumeralFont::new(FontWeight::Bold);
        let (base, scale) = font.select(16.0);
        assert_eq!(scale, 1);
        assert_eq!(base.character_size, Size::new(9, 15));
        // No bold 10x20 exists, so large bold text scales the 9x18 face
        let (base, scale) = font.select(40.0);
        assert_eq!(scale, 2);
        assert_eq!(base.character_size, Size::new(9, 18));
    }

    #[test]
    fn test_measure_counts_characters() {
        let font = NumeralFont::new(FontWeight::Regular);
        let (w1, h1) = font.measure("3", 10.0);
        let (w2, h2) = font.measure("15", 10.0);
        assert_eq!((w1, h1), (6.0, 10.0));
        assert_eq!(w2, 12.0);
        assert_eq!(h2, h1);
        assert_eq!(font.measure("", 10.0), (0.0, 0.0));
    }

    #[test]
    fn test_scaled_target_draws_blocks() {
        let mut display: MockDisplay<Rgb888> = MockDisplay::new();
        {
            let mut scaled = ScaledTarget::new(&mut display, Point::new(2, 3), 3);
            scaled
                .draw_iter([Pixel(Point::new(1, 0), Rgb888::RED)])
                .unwrap();
        }
        for x in 5..8 {
            for y in 3..6 {
                assert_eq!(display.get_pixel(Point::new(x, y)), Some(Rgb888::RED));
            }
        }
        assert_eq!(display.get_pixel(Point::new(4, 3)), None);
        assert_eq!(display.get_pixel(Point::new(8, 3)), None);
    }

    #[test]
    fn test_draw_centered_stays_inside_measured_box() {
        let mut display: MockDisplay<Rgb888> = MockDisplay::new();
        let font = NumeralFont::new(FontWeight::Regular);
        font.draw_centered(&mut display, "12", Vec2::new(30.0, 30.0), 20.0, Rgb888::WHITE)
            .unwrap();
        let drawn = display.affected_area();
        assert!(drawn.size.width > 0);
        assert!(drawn.top_left.x >= 20 && drawn.top_left.y >= 20);
        let bottom_right = drawn.bottom_right().unwrap();
        assert!(bottom_right.x < 40 && bottom_right.y < 40);
    }
}
