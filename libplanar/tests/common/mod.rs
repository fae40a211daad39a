#![allow(dead_code)]

use libplanar::{bitmap::blit::Blitter, codec, BitMap};

/// Fills every plane row with bytes derived from its plane, row and column
pub fn fill_pattern(bitmap: &mut BitMap) {
    for plane in 0..bitmap.depth() {
        for row in 0..bitmap.rows() {
            let bytes = bitmap.row_mut(plane, row).expect("row exists");
            for (column, byte) in bytes.iter_mut().enumerate() {
                *byte = plane
                    .wrapping_mul(61)
                    .wrapping_add((row as u8).wrapping_mul(17))
                    .wrapping_add(column as u8 ^ 0x5a);
            }
        }
    }
}

/// Fills every plane row with `byte`
pub fn fill(bitmap: &mut BitMap, byte: u8) {
    for plane in 0..bitmap.depth() {
        for row in 0..bitmap.rows() {
            bitmap.row_mut(plane, row).expect("row exists").fill(byte);
        }
    }
}

/// Copy of every owned buffer
pub fn snapshot(bitmap: &BitMap) -> Vec<Vec<u8>> {
    bitmap.buffers().iter().map(|b| b.bytes().to_vec()).collect()
}

pub fn encoded(bitmap: &BitMap) -> Vec<u8> {
    let mut bytes = Vec::new();
    codec::encode(bitmap, &mut bytes).expect("writing to a vec can't fail");
    bytes
}

/// [`Blitter`] recording the calls it receives
#[derive(Debug, Default)]
pub struct RecordingBlitter {
    pub events: Vec<&'static str>,
}

impl Blitter for RecordingBlitter {
    fn clear(&mut self, buffer: &mut [u8]) {
        buffer.fill(0);
        self.events.push("clear");
    }

    fn wait_idle(&mut self) {
        self.events.push("wait");
    }
}

pub fn u16_at(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

pub fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}
