#![allow(clippy::module_name_repetitions)]

pub mod address;
/// Blit engine collaborator
pub mod blit;
/// Plane memory collaborator
pub mod memory;
mod store;

use std::{fmt::Display, ops::Range};

use bon::Builder;
use strum::{Display as StrumDisplay, IntoStaticStr};

use memory::Buffer;
pub use store::BitMapStore;

/// Largest plane count a [`BitMap`] can hold
pub const MAX_DEPTH: u8 = 8;

/// Flag bit requesting interleaved planes, shared with the `.bm` header flags
pub const FLAG_INTERLEAVED: u8 = 1 << 0;
/// Flag bit requesting cleared planes
pub const FLAG_CLEAR: u8 = 1 << 1;

/// How the planes of a [`BitMap`] are arranged in memory
#[derive(Debug, Eq, PartialEq, Copy, Clone, StrumDisplay, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Layout {
    /// Every plane lives in its own buffer
    Separate,
    /// All planes share one buffer, one row of every plane after the other
    Interleaved,
}

impl Layout {
    /// Layout described by `.bm` header flags
    #[must_use]
    pub const fn from_flags(flags: u8) -> Self {
        if flags & FLAG_INTERLEAVED == 0 {
            Self::Separate
        } else {
            Self::Interleaved
        }
    }
}

/// Options for [`BitMapStore::create`]
#[derive(Builder, Default, Debug, Eq, PartialEq, Copy, Clone)]
pub struct CreateOptions {
    /// Place all planes in a single buffer
    #[builder(default)]
    pub interleaved: bool,
    /// Clear the planes through the blitter before returning
    #[builder(default)]
    pub clear: bool,
}

impl CreateOptions {
    /// The options as flag bits
    #[must_use]
    pub const fn flags(&self) -> u8 {
        let mut flags = 0;
        if self.interleaved {
            flags |= FLAG_INTERLEAVED;
        }
        if self.clear {
            flags |= FLAG_CLEAR;
        }
        flags
    }
}

#[derive(Debug, Eq, PartialEq, Copy, Clone)]
struct Plane {
    /// index into the owned buffers
    buffer: usize,
    /// distance of the plane start from the buffer start
    offset: usize,
}

/// A planar bitmap: `depth` one-bit planes of `rows` rows each
#[derive(Debug, PartialEq, Eq)]
pub struct BitMap {
    stride: u16,
    rows: u16,
    depth: u8,
    flags: u8,
    buffers: Vec<Buffer>,
    planes: Vec<Plane>,
}

impl BitMap {
    /// Bitmap whose planes all live in `buffer`, `row_bytes` apart
    pub(crate) fn interleaved(row_bytes: u16, rows: u16, depth: u8, flags: u8, buffer: Buffer) -> Self {
        let planes = (0..depth)
            .map(|plane| Plane {
                buffer: 0,
                offset: usize::from(plane) * usize::from(row_bytes),
            })
            .collect();
        Self {
            stride: row_bytes * u16::from(depth),
            rows,
            depth,
            flags,
            buffers: vec![buffer],
            planes,
        }
    }

    /// Bitmap with one buffer per plane
    pub(crate) fn separate(row_bytes: u16, rows: u16, flags: u8, buffers: Vec<Buffer>) -> Self {
        debug_assert!(!buffers.is_empty() && buffers.len() <= usize::from(MAX_DEPTH));
        let planes = (0..buffers.len())
            .map(|buffer| Plane { buffer, offset: 0 })
            .collect::<Vec<_>>();
        Self {
            stride: row_bytes,
            rows,
            depth: u8::try_from(planes.len()).unwrap_or(MAX_DEPTH),
            flags,
            buffers,
            planes,
        }
    }

    /// Bytes per row as stored, including every plane for interleaved bitmaps
    #[must_use]
    pub const fn stride(&self) -> u16 {
        self.stride
    }

    /// Height in pixels
    #[must_use]
    pub const fn rows(&self) -> u16 {
        self.rows
    }

    /// Number of planes
    #[must_use]
    pub const fn depth(&self) -> u8 {
        self.depth
    }

    /// Flags the bitmap was created with
    #[must_use]
    pub const fn flags(&self) -> u8 {
        self.flags
    }

    /// Base address of `plane`
    #[must_use]
    pub fn plane_address(&self, plane: u8) -> Option<usize> {
        let plane = self.planes.get(usize::from(plane))?;
        Some(self.buffers[plane.buffer].address() + plane.offset)
    }

    fn leading_addresses(&self) -> Vec<usize> {
        (0..self.depth.min(2))
            .filter_map(|plane| self.plane_address(plane))
            .collect()
    }

    /// Returns `true` if the planes share one buffer, see [`address::is_interleaved`]
    #[must_use]
    pub fn is_interleaved(&self) -> bool {
        address::is_interleaved(self.depth, self.stride, &self.leading_addresses())
    }

    /// Layout detected from the plane addresses
    #[must_use]
    pub fn layout(&self) -> Layout {
        address::layout(self.depth, self.stride, &self.leading_addresses())
    }

    /// Bytes per row of a single plane
    #[must_use]
    pub fn row_bytes(&self) -> u16 {
        address::row_bytes(self.depth, self.stride, &self.leading_addresses())
    }

    /// Width in pixels
    #[must_use]
    pub fn width(&self) -> u16 {
        // the width is checked on creation to fit
        self.row_bytes() << 3
    }

    /// Index of the owned buffer holding `plane` and the byte range of `len` bytes
    /// starting at `column` of `row`
    fn span(&self, plane: u8, row: u16, column: u16, len: u16) -> Option<(usize, Range<usize>)> {
        if plane >= self.depth || row >= self.rows {
            return None;
        }
        let row_bytes = self.row_bytes();
        if u32::from(column) + u32::from(len) > u32::from(row_bytes) {
            return None;
        }
        let layout = self.layout();
        let start = address::byte_offset(layout, self.stride, self.depth, plane, row, column);
        let buffer = self.planes[usize::from(plane)].buffer;
        Some((buffer, start..start + usize::from(len)))
    }

    /// `len` bytes of `plane` starting at byte `column` of `row`
    #[must_use]
    pub fn bytes(&self, plane: u8, row: u16, column: u16, len: u16) -> Option<&[u8]> {
        let (buffer, range) = self.span(plane, row, column, len)?;
        self.buffers[buffer].bytes().get(range)
    }

    /// `len` bytes of `plane` starting at byte `column` of `row`, mutably
    pub fn bytes_mut(&mut self, plane: u8, row: u16, column: u16, len: u16) -> Option<&mut [u8]> {
        let (buffer, range) = self.span(plane, row, column, len)?;
        self.buffers[buffer].bytes_mut().get_mut(range)
    }

    /// An entire row of `plane`
    #[must_use]
    pub fn row(&self, plane: u8, row: u16) -> Option<&[u8]> {
        self.bytes(plane, row, 0, self.row_bytes())
    }

    /// An entire row of `plane`, mutably
    pub fn row_mut(&mut self, plane: u8, row: u16) -> Option<&mut [u8]> {
        let row_bytes = self.row_bytes();
        self.bytes_mut(plane, row, 0, row_bytes)
    }

    /// The owned buffers: the shared one for interleaved bitmaps, one per plane otherwise
    #[must_use]
    pub fn buffers(&self) -> &[Buffer] {
        &self.buffers
    }

    pub(crate) fn buffers_mut(&mut self) -> &mut [Buffer] {
        &mut self.buffers
    }

    pub(crate) fn into_buffers(self) -> Vec<Buffer> {
        self.buffers
    }

    /// Diagnostic summary of the bitmap
    #[must_use]
    pub fn dump(&self) -> BitMapDump {
        BitMapDump {
            stride: self.stride,
            rows: self.rows,
            depth: self.depth,
            flags: self.flags,
            plane_addresses: (0..self.depth)
                .filter_map(|plane| self.plane_address(plane))
                .collect(),
        }
    }
}

/// Diagnostic record returned by [`BitMap::dump`]
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BitMapDump {
    /// bytes per row as stored
    pub stride: u16,
    /// height in pixels
    pub rows: u16,
    /// number of planes
    pub depth: u8,
    /// creation flags
    pub flags: u8,
    /// base address of every plane
    pub plane_addresses: Vec<usize>,
}

impl Display for BitMapDump {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "BytesPerRow: {}, Rows: {}, Flags: {}, Depth: {}",
            self.stride, self.rows, self.flags, self.depth
        )?;
        for (plane, address) in self.plane_addresses.iter().enumerate() {
            writeln!(f, "Bitplane {plane} addr: {address:#x}")?;
        }
        Ok(())
    }
}
