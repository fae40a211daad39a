//! Conversion between planar bits and color indexes.
//!
//! Pixel `x` of a plane row is bit `7 - (x & 7)` of byte `x >> 3`. The bit of plane
//! `p` contributes `1 << p` to the color index.

use crate::bitmap::BitMap;

/// Number of pixels returned by [`read16`]
pub const CHUNK: u16 = 16;

/// Color indexes of the 16 pixels starting at (`x`, `y`).
///
/// Pixels outside of the bitmap read as index 0.
#[must_use]
pub fn read16(bitmap: &BitMap, x: u16, y: u16) -> [u8; 16] {
    let mut indexes = [0u8; 16];
    for plane in 0..bitmap.depth() {
        let Some(row) = bitmap.row(plane, y) else {
            continue;
        };
        for (i, index) in indexes.iter_mut().enumerate() {
            let px = usize::from(x) + i;
            let Some(byte) = row.get(px >> 3) else {
                break;
            };
            let bit = (byte >> (7 - (px & 7))) & 1;
            *index |= bit << plane;
        }
    }
    indexes
}

/// Color index of the pixel at (`x`, `y`), or [`None`] if it is outside of the bitmap
#[must_use]
pub fn read_pixel(bitmap: &BitMap, x: u16, y: u16) -> Option<u8> {
    if x >= bitmap.width() || y >= bitmap.rows() {
        return None;
    }
    let column = x >> 3;
    let shift = 7 - (x & 7);
    let mut index = 0;
    for plane in 0..bitmap.depth() {
        let byte = bitmap.bytes(plane, y, column, 1)?[0];
        index |= ((byte >> shift) & 1) << plane;
    }
    Some(index)
}

/// Sets the pixel at (`x`, `y`) to color `index`.
///
/// Bits of `index` above the bitmap depth are dropped, pixels outside of the bitmap
/// are ignored.
pub fn write_pixel(bitmap: &mut BitMap, x: u16, y: u16, index: u8) {
    if x >= bitmap.width() || y >= bitmap.rows() {
        return;
    }
    let column = x >> 3;
    let mask = 0x80u8 >> (x & 7);
    for plane in 0..bitmap.depth() {
        let Some(byte) = bitmap.bytes_mut(plane, y, column, 1) else {
            return;
        };
        if index & (1 << plane) == 0 {
            byte[0] &= !mask;
        } else {
            byte[0] |= mask;
        }
    }
}
