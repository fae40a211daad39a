//! Conversion of planar bitmaps into common image formats

mod bmp;

use image::{Rgb, RgbImage};
use tracing::warn;

use crate::{bitmap::BitMap, planar::read_pixel, Error};
pub use bmp::{export_bmp, padded_row_len, save_bmp, PIXEL_DATA_OFFSET};

/// Widens a 4-bit channel to 8 bits
#[must_use]
pub const fn expand_nibble(value: u8) -> u8 {
    let value = value & 0x0F;
    value | (value << 4)
}

/// Splits a 12-bit `0x0RGB` color into 8-bit channels
#[must_use]
pub const fn color_to_rgb(color: u16) -> [u8; 3] {
    [
        expand_nibble((color >> 8) as u8),
        expand_nibble((color >> 4) as u8),
        expand_nibble(color as u8),
    ]
}

/// A 12-bit `0x0RGB` color as a BMP color table entry
#[must_use]
pub const fn color_to_bgr0(color: u16) -> [u8; 4] {
    let [r, g, b] = color_to_rgb(color);
    [b, g, r, 0]
}

/// Number of colors needed to cover every index of `bitmap`, if `palette` has that many
fn check_palette(bitmap: &BitMap, palette: &[u16]) -> Result<usize, Error> {
    let required = 1usize << bitmap.depth();
    if palette.len() < required {
        warn!("palette of {} colors is too short", palette.len());
        return Err(Error::PaletteTooShort {
            required,
            provided: palette.len(),
        });
    }
    Ok(required)
}

/// Resolves every pixel of `bitmap` through `palette`
///
/// # Errors
///
/// [`Error::PaletteTooShort`] if `palette` has fewer than `2^depth` colors
pub fn to_rgb_image(bitmap: &BitMap, palette: &[u16]) -> Result<RgbImage, Error> {
    check_palette(bitmap, palette)?;
    let image = RgbImage::from_fn(
        u32::from(bitmap.width()),
        u32::from(bitmap.rows()),
        |x, y| {
            // both fit in u16 since they are below the bitmap dimensions
            let index = read_pixel(bitmap, x as u16, y as u16).unwrap_or_default();
            Rgb(color_to_rgb(palette[usize::from(index)]))
        },
    );
    Ok(image)
}
