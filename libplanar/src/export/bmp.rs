use std::{io::Write, path::Path};

use tracing::{debug, info};

use super::{check_palette, color_to_bgr0};
use crate::{
    bitmap::BitMap,
    codec::create,
    planar::{read16, CHUNK},
    Error,
};

const FILE_HEADER_LEN: u32 = 14;
const INFO_HEADER_LEN: u32 = 40;
const COLOR_TABLE_LEN: u32 = 256 * 4;
/// Offset of the pixel data from the start of the file
pub const PIXEL_DATA_OFFSET: u32 = FILE_HEADER_LEN + INFO_HEADER_LEN + COLOR_TABLE_LEN;
// px/m
const RESOLUTION: u32 = 100;

/// On-disk length of a row of `width` 8-bit indexes
#[must_use]
pub const fn padded_row_len(width: u32) -> u32 {
    (width + 3) & !3
}

/// Writes `bitmap` as an uncompressed, 8-bit indexed, bottom-up BMP image.
///
/// Every 12-bit `0x0RGB` color in `palette` is widened to 8 bits per channel by
/// repeating its nibble. Only the first `2^depth` colors are used, the rest of the
/// 256 entry color table is zero. Extra half-bright palettes are not supported.
///
/// The width field holds the width of a single plane, also for interleaved bitmaps
/// whose stride spans every plane.
///
/// # Errors
///
/// [`Error::PaletteTooShort`] if `palette` has fewer than `2^depth` colors, otherwise
/// errors if `w` cannot be written to
pub fn export_bmp(bitmap: &BitMap, palette: &[u16], mut w: impl Write) -> Result<(), Error> {
    let colors = check_palette(bitmap, palette)?;
    let width = bitmap.width();
    let row_len = padded_row_len(u32::from(width));
    let image_size = row_len * u32::from(bitmap.rows());
    debug!("BMP {width}x{} with {colors} colors, {image_size} bytes of pixels", bitmap.rows());

    // file header
    w.write_all(b"BM")?;
    w.write_all(&(PIXEL_DATA_OFFSET + image_size).to_le_bytes())?;
    w.write_all(&0u32.to_le_bytes())?;
    w.write_all(&PIXEL_DATA_OFFSET.to_le_bytes())?;

    // info header
    w.write_all(&INFO_HEADER_LEN.to_le_bytes())?;
    w.write_all(&i32::from(width).to_le_bytes())?;
    w.write_all(&i32::from(bitmap.rows()).to_le_bytes())?;
    w.write_all(&1u16.to_le_bytes())?; // color planes
    w.write_all(&8u16.to_le_bytes())?; // bpp
    w.write_all(&0u32.to_le_bytes())?; // no compression
    w.write_all(&image_size.to_le_bytes())?;
    w.write_all(&RESOLUTION.to_le_bytes())?;
    w.write_all(&RESOLUTION.to_le_bytes())?;
    w.write_all(&0u32.to_le_bytes())?; // palette length, 0 means all 256
    w.write_all(&0u32.to_le_bytes())?; // important colors, 0 means all

    // color table
    for &color in &palette[..colors] {
        w.write_all(&color_to_bgr0(color))?;
    }
    for _ in colors..256 {
        w.write_all(&[0; 4])?;
    }

    // pixel data, last row first
    let mut row = Vec::with_capacity(row_len as usize);
    for y in (0..bitmap.rows()).rev() {
        row.clear();
        for x in (0..width).step_by(usize::from(CHUNK)) {
            let indexes = read16(bitmap, x, y);
            let count = usize::from((width - x).min(CHUNK));
            row.extend_from_slice(&indexes[..count]);
        }
        row.resize(row_len as usize, 0);
        w.write_all(&row)?;
    }
    w.flush()?;
    Ok(())
}

/// Writes `bitmap` as a BMP image at `path`, see [`export_bmp`]
///
/// # Errors
///
/// Errors if the file cannot be created or written to, see also [`export_bmp`]
pub fn save_bmp(bitmap: &BitMap, palette: &[u16], path: impl AsRef<Path>) -> Result<(), Error> {
    let path = path.as_ref();
    // validate before touching the file system
    check_palette(bitmap, palette)?;
    info!("exporting {}", path.display());
    export_bmp(bitmap, palette, create(path)?)
}
