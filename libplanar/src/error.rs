use std::path::PathBuf;

use thiserror::Error;

use crate::bitmap::Layout;

#[derive(Error, Debug)]
#[non_exhaustive]
/// Possible `libplanar` errors
pub enum Error {
    /// Returned if the allocator could not supply a plane buffer.
    /// Buffers acquired before the failure have already been released
    #[error("unable to allocate {size} bytes of plane memory")]
    AllocationFailure {
        /// size of the failing request
        size: usize,
    },
    /// Returned if a bitmap is requested with a plane count outside of 1..=8
    #[error("invalid depth {0}, bitmaps hold between 1 and 8 planes")]
    InvalidDepth(u8),
    /// Returned if a width rounds up to more pixels than a `.bm` header can describe
    #[error("invalid width {0}, rounded width must not exceed {max}", max = u16::MAX - 7)]
    InvalidWidth(u16),
    /// Returned if a `.bm` header carries a version other than 0
    #[error("unknown file version: {0}")]
    UnsupportedVersion(u8),
    /// Returned if the interleaved flag of a `.bm` file disagrees with the
    /// layout of the bitmap it is loaded into
    #[error("interleaved flag conflict. source: {source_layout}, destination: {destination_layout}")]
    LayoutMismatch {
        /// layout declared by the file
        source_layout: Layout,
        /// layout detected on the destination bitmap
        destination_layout: Layout,
    },
    /// Returned if a `.bm` file has more planes than the bitmap it is loaded into
    #[error("source has greater depth than destination: {source_depth} > {destination_depth}")]
    DepthExceeded {
        /// depth of the file
        source_depth: u8,
        /// depth of the destination bitmap
        destination_depth: u8,
    },
    /// Returned if a `.bm` file does not fit on the destination at the requested position
    #[error("source doesn't fit on destination: {width}x{height} @{x},{y} > {destination_width}x{destination_height}")]
    OutOfBounds {
        /// source width in pixels
        width: u16,
        /// source height in pixels
        height: u16,
        /// requested x position
        x: u16,
        /// requested y position
        y: u16,
        /// destination width in pixels
        destination_width: u16,
        /// destination height in pixels
        destination_height: u16,
    },
    /// Returned if a `.bm` file ends before all plane data has been read
    #[error("plane data is truncated, expected {expected} bytes")]
    Truncated {
        /// number of payload bytes the header announces
        expected: usize,
    },
    /// Returned if an export palette holds fewer than `2^depth` colors
    #[error("palette has {provided} colors, bitmap depth requires {required}")]
    PaletteTooShort {
        /// colors needed to cover every index
        required: usize,
        /// colors supplied
        provided: usize,
    },
    /// Returned if the file to read does not exist
    #[error("file does not exist: {}", .0.display())]
    FileNotFound(PathBuf),
    /// Any other i/o failure
    #[error("i/o error")]
    Io(#[from] std::io::Error),
}
