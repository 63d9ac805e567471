//! # Raster Layers
//!
//! In-memory pixel buffer used for cached background layers and composed frames. Pixels live in a
//! [`tiny_skia::Pixmap`], so vector shapes (the hands) are filled and stroked by tiny-skia, while
//! the [`DrawTarget`] impl lets ticks and numerals be drawn with ordinary embedded-graphics
//! primitives. Every pixel of a raster is opaque; translucent work is done on a separate
//! transparent pixmap and composited with [`Raster::composite`].

use core::convert::Infallible;
use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use embedded_graphics::prelude::*;
use thiserror::Error;
use tiny_skia::{Color, IntSize, Pixmap, PixmapPaint, Transform};

/// Errors raised while allocating a raster.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RasterError {
    /// Zero-sized surfaces cannot hold a layer
    #[error("degenerate raster size {width}x{height}")]
    Degenerate { width: u32, height: u32 },

    /// The pixel buffer could not be reserved
    #[error("cannot allocate {width}x{height} raster")]
    Allocation { width: u32, height: u32 },
}

const BYTES_PER_PIXEL: usize = 4;

/// Allocate a fully transparent pixmap, reporting failure instead of aborting.
pub fn try_pixmap(width: u32, height: u32) -> Result<Pixmap, RasterError> {
    if width == 0 || height == 0 {
        return Err(RasterError::Degenerate { width, height });
    }
    let too_big = RasterError::Allocation { width, height };
    let len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
        .ok_or_else(|| too_big.clone())?;
    let mut data = Vec::new();
    data.try_reserve_exact(len).map_err(|_| too_big.clone())?;
    data.resize(len, 0);
    let size = IntSize::from_wh(width, height).ok_or_else(|| too_big.clone())?;
    Pixmap::from_vec(data, size).ok_or(too_big)
}

/// Opaque RGB pixel buffer.
#[derive(Clone)]
pub struct Raster {
    pixmap: Pixmap,
}

impl core::fmt::Debug for Raster {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish_non_exhaustive()
    }
}

impl PartialEq for Raster {
    fn eq(&self, other: &Self) -> bool {
        self.width() == other.width()
            && self.height() == other.height()
            && self.pixmap.data() == other.pixmap.data()
    }
}

impl Eq for Raster {}

impl Raster {
    /// Allocate a raster filled with `fill`.
    pub fn new(width: u32, height: u32, fill: Rgb888) -> Result<Self, RasterError> {
        let mut raster = Self {
            pixmap: try_pixmap(width, height)?,
        };
        raster.fill(fill);
        Ok(raster)
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = Rgb888> + '_ {
        self.pixmap.pixels().iter().map(|p| {
            let c = p.demultiply();
            Rgb888::new(c.red(), c.green(), c.blue())
        })
    }

    pub fn fill(&mut self, color: Rgb888) {
        self.pixmap
            .fill(Color::from_rgba8(color.r(), color.g(), color.b(), u8::MAX));
    }

    /// Overwrite this raster with `other`. Both must have the same size.
    pub fn copy_from(&mut self, other: &Raster) -> bool {
        if self.width() != other.width() || self.height() != other.height() {
            return false;
        }
        self.pixmap.data_mut().copy_from_slice(other.pixmap.data());
        true
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb888> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some(Rgb888::new(c.red(), c.green(), c.blue()))
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgb888) {
        if x < 0 || y < 0 || x as u32 >= self.width() || y as u32 >= self.height() {
            return;
        }
        let i = (y as usize * self.width() as usize + x as usize) * BYTES_PER_PIXEL;
        self.pixmap.data_mut()[i..i + BYTES_PER_PIXEL]
            .copy_from_slice(&[color.r(), color.g(), color.b(), u8::MAX]);
    }

    /// Draw a same-sized transparent `layer` over this raster at `opacity` (0..=1).
    pub fn composite(&mut self, layer: &Pixmap, opacity: f32) -> bool {
        if layer.width() != self.width() || layer.height() != self.height() {
            return false;
        }
        let paint = PixmapPaint {
            opacity: opacity.clamp(0.0, 1.0),
            ..PixmapPaint::default()
        };
        self.pixmap
            .draw_pixmap(0, 0, layer.as_ref(), &paint, Transform::identity(), None);
        true
    }
}

impl OriginDimensions for Raster {
    fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }
}

impl DrawTarget for Raster {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            self.set_pixel(coord.x, coord.y, color);
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill(color);
        Ok(())
    }
}
