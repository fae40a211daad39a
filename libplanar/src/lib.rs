//! # libplanar
//!
//!
//! This library provides datatypes and i/o functionality for planar bitmaps, the image layout
//! used by bit-plane display hardware. A planar bitmap of depth `n` stores `n` one-bit planes;
//! the bits of a pixel across all planes form its color index.
//!
//! Planes come in two physical layouts:
//! - **separate**: every plane is its own buffer
//! - **interleaved**: all planes share one buffer, with one row of every plane following the other
//!
//! The layout is not stored on a [`BitMap`]. It is recovered from the plane base addresses, see
//! [`bitmap::address`].
//!
//! ### Usage
//!
//! #### Reading and writing `.bm` files
//!
//! `.bm` is a compact format holding a 9-byte header followed by the raw plane data.
//!
//! ```rust
//! use libplanar::{codec, BitMapStore, CreateOptions};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut store = BitMapStore::new();
//!     let options = CreateOptions::builder().interleaved(true).clear(true).build();
//!     let mut bitmap = store.create(32, 16, 4, options)?;
//!     libplanar::planar::write_pixel(&mut bitmap, 3, 5, 9);
//!
//!     let mut bytes = Vec::new();
//!     codec::encode(&bitmap, &mut bytes)?;
//!
//!     let decoded = store.decode(bytes.as_slice())?;
//!     assert!(decoded.is_interleaved());
//!     assert_eq!(libplanar::planar::read_pixel(&decoded, 3, 5), Some(9));
//!
//!     store.destroy(decoded);
//!     store.destroy(bitmap);
//!     Ok(())
//! }
//! ```
//!
//! #### Overlaying a `.bm` file onto part of a bitmap
//!
//! [`codec::decode_into`] loads a file onto an existing bitmap at a given position. The file
//! must have the same layout and no more planes than the bitmap, and must fit on it.
//!
//! ```rust
//! use libplanar::{codec, BitMapStore, CreateOptions, Error};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut store = BitMapStore::new();
//!     let mut tile = store.create(8, 8, 2, CreateOptions::default())?;
//!     tile.row_mut(0, 0).expect("row 0 exists").fill(0xff);
//!     let mut bytes = Vec::new();
//!     codec::encode(&tile, &mut bytes)?;
//!
//!     let mut screen = store.create(64, 64, 3, CreateOptions::default())?;
//!     codec::decode_into(&mut screen, bytes.as_slice(), 16, 8)?;
//!     assert_eq!(screen.row(0, 8).expect("row 8 exists")[2], 0xff);
//!
//!     let overflow = codec::decode_into(&mut screen, bytes.as_slice(), 60, 8);
//!     assert!(matches!(overflow, Err(Error::OutOfBounds { .. })));
//!     Ok(())
//! }
//! ```
//!
//! #### Exporting to BMP
//!
//! Palettes hold 12-bit `0x0RGB` colors, one per color index.
//!
//! ```rust
//! use libplanar::{export, BitMapStore, CreateOptions};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut store = BitMapStore::new();
//!     let bitmap = store.create(20, 10, 1, CreateOptions::default())?;
//!     let mut bmp = Vec::new();
//!     export::export_bmp(&bitmap, &[0x000, 0xfff], &mut bmp)?;
//!     assert_eq!(&bmp[..2], b"BM");
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]

/// Module containing the bitmap type, its memory collaborators and layout arithmetic
pub mod bitmap;
/// Module containing the `.bm` reader and writer
pub mod codec;
mod error;
pub mod export;
pub mod planar;

pub use bitmap::{BitMap, BitMapStore, CreateOptions, Layout};
pub use error::Error;
