//! ASCII preview of a composed frame, for development without a display.

use crate::raster::Raster;
use embedded_graphics::pixelcolor::RgbColor;

/// Dark to bright.
const RAMP: &[u8] = b" .:-=+*#%@";

/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: u32 = 2;

/// Downsample `raster` to `columns` characters per line, one luminance glyph per cell.
pub fn to_ascii(raster: &Raster, columns: u32) -> String {
    let columns = columns.clamp(1, raster.width());
    let cell_w = raster.width().div_ceil(columns);
    let cell_h = cell_w * CELL_ASPECT;
    let rows = raster.height().div_ceil(cell_h);

    let mut out = String::with_capacity(((columns + 1) * rows) as usize);
    for row in 0..rows {
        for col in 0..columns {
            let (mut sum, mut count) = (0u32, 0u32);
            for y in row * cell_h..((row + 1) * cell_h).min(raster.height()) {
                for x in col * cell_w..((col + 1) * cell_w).min(raster.width()) {
                    if let Some(p) = raster.pixel(x, y) {
                        sum += luminance(p.r(), p.g(), p.b());
                        count += 1;
                    }
                }
            }
            let level = if count == 0 { 0 } else { sum / count };
            let index = level as usize * (RAMP.len() - 1) / 255;
            out.push(RAMP[index] as char);
        }
        // Trailing blanks carry no information
        while out.ends_with(' ') {
            out.pop();
        }
        out.push('\n');
    }
    out
}

/// Rec. 601 luma, 0..=255.
fn luminance(r: u8, g: u8, b: u8) -> u32 {
    (299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000
}

/// Print a frame to stdout.
pub fn draw_ascii(raster: &Raster, columns: u32) {
    print!("{}", to_ascii(raster, columns));
}
