//! Reading and writing the `.bm` planar bitmap format.
//!
//! A `.bm` file is a [`BmHeader`] followed by the raw plane data. Interleaved files
//! store, for every row, one row of each plane in plane order. Separate files store
//! all rows of plane 0, then all rows of plane 1, and so on. Plane rows are
//! `ceil(width / 8)` bytes long.

pub(crate) mod header;

use std::{
    fs::File,
    io::{BufReader, BufWriter, ErrorKind, Read, Write},
    path::Path,
};

use itertools::iproduct;
use tracing::{debug, error, info};

use crate::{
    bitmap::{
        blit::Blitter, memory::Allocator, BitMap, BitMapStore, CreateOptions, Layout,
        FLAG_INTERLEAVED,
    },
    Error,
};
pub use header::{BmHeader, HEADER_LEN, VERSION};

fn read_payload(r: &mut impl Read, buf: &mut [u8], expected: usize) -> Result<(), Error> {
    r.read_exact(buf).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => Error::Truncated { expected },
        _ => Error::Io(e),
    })
}

pub(crate) fn open(path: &Path) -> Result<BufReader<File>, Error> {
    match File::open(path) {
        Ok(f) => Ok(BufReader::new(f)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            error!("file does not exist: {}", path.display());
            Err(Error::FileNotFound(path.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn create(path: &Path) -> Result<BufWriter<File>, Error> {
    let f = File::options()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    Ok(BufWriter::new(f))
}

impl<A: Allocator, B: Blitter> BitMapStore<A, B> {
    /// Reads a `.bm` file into a newly created [`BitMap`]
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedVersion`] if the header version isn't 0
    /// - [`Error::InvalidDepth`], [`Error::InvalidWidth`], [`Error::AllocationFailure`] if
    ///   the bitmap cannot be created, see [`BitMapStore::create`]
    /// - [`Error::Truncated`] if the plane data ends early. The bitmap is destroyed
    pub fn decode(&mut self, mut r: impl Read) -> Result<BitMap, Error> {
        let header = BmHeader::from_reader(&mut r)?;
        header.check_version().inspect_err(|e| error!("{e}"))?;
        debug!(
            "Dimensions: {}x{}@{}BPP, version: {}, flags: {}",
            header.width, header.height, header.depth, header.version, header.flags
        );

        let options = CreateOptions::builder()
            .interleaved(header.is_interleaved())
            .build();
        let mut bitmap = self.create(header.width, header.height, header.depth, options)?;

        // the shared buffer of an interleaved bitmap holds the file layout as is,
        // separate buffers are stored one after the other in plane order
        let expected = header.payload_len();
        let read = bitmap
            .buffers_mut()
            .iter_mut()
            .try_for_each(|buffer| read_payload(&mut r, buffer.bytes_mut(), expected));
        if let Err(e) = read {
            error!("{e}");
            self.destroy(bitmap);
            return Err(e);
        }
        Ok(bitmap)
    }

    /// Reads the `.bm` file at `path` into a newly created [`BitMap`]
    ///
    /// # Errors
    ///
    /// [`Error::FileNotFound`] if `path` doesn't exist, otherwise see [`Self::decode`]
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<BitMap, Error> {
        let path = path.as_ref();
        info!("loading {}", path.display());
        self.decode(open(path)?)
    }
}

/// Reads a `.bm` file onto `target`, placing its top left pixel at (`x`, `y`).
///
/// Only the bytes covered by the source are written. Since plane rows are copied
/// byte-wise, `x` is rounded down to a multiple of 8.
///
/// # Errors
///
/// Nothing is written to `target` if any of these occur:
/// - [`Error::UnsupportedVersion`] if the header version isn't 0
/// - [`Error::LayoutMismatch`] if the file layout differs from the layout of `target`
/// - [`Error::DepthExceeded`] if the file has more planes than `target`
/// - [`Error::OutOfBounds`] if the source doesn't fit on `target` at (`x`, `y`)
/// - [`Error::Truncated`] if the plane data ends early
/// - [`Error::AllocationFailure`] if the plane data cannot be buffered
pub fn decode_into(target: &mut BitMap, mut r: impl Read, x: u16, y: u16) -> Result<(), Error> {
    let header = BmHeader::from_reader(&mut r)?;
    let check = check_fits(&header, target, x, y);
    if let Err(e) = check {
        error!("{e}");
        return Err(e);
    }

    let expected = header.payload_len();
    let mut payload = Vec::new();
    if payload.try_reserve_exact(expected).is_err() {
        error!("cannot allocate {expected} bytes of plane data");
        return Err(Error::AllocationFailure { size: expected });
    }
    payload.resize(expected, 0);
    read_payload(&mut r, &mut payload, expected).inspect_err(|e| error!("{e}"))?;

    let row_bytes = header.row_bytes();
    if row_bytes == 0 {
        return Ok(());
    }
    let column = x >> 3;
    let order: Vec<(u8, u16)> = match header.layout() {
        Layout::Interleaved => iproduct!(0..header.height, 0..header.depth)
            .map(|(row, plane)| (plane, row))
            .collect(),
        Layout::Separate => iproduct!(0..header.depth, 0..header.height).collect(),
    };
    // every destination span must exist before the first byte is written
    let covered = order
        .iter()
        .all(|&(plane, row)| target.bytes(plane, y + row, column, row_bytes).is_some());
    if !covered {
        let e = out_of_bounds(&header, target_size(target), x, y);
        error!("{e}");
        return Err(e);
    }
    for ((plane, row), src) in order
        .into_iter()
        .zip(payload.chunks_exact(usize::from(row_bytes)))
    {
        if let Some(dst) = target.bytes_mut(plane, y + row, column, row_bytes) {
            dst.copy_from_slice(src);
        }
    }
    debug!(
        "loaded {}x{}@{}BPP onto bitmap at {x},{y}",
        header.width, header.height, header.depth
    );
    Ok(())
}

/// Reads the `.bm` file at `path` onto `target`, see [`decode_into`]
///
/// # Errors
///
/// [`Error::FileNotFound`] if `path` doesn't exist, otherwise see [`decode_into`]
pub fn load_into(target: &mut BitMap, path: impl AsRef<Path>, x: u16, y: u16) -> Result<(), Error> {
    let path = path.as_ref();
    info!("loading {} onto bitmap at {x},{y}", path.display());
    decode_into(target, open(path)?, x, y)
}

fn target_size(target: &BitMap) -> (u16, u16) {
    (target.width(), target.rows())
}

fn out_of_bounds(header: &BmHeader, (width, height): (u16, u16), x: u16, y: u16) -> Error {
    Error::OutOfBounds {
        width: header.width,
        height: header.height,
        x,
        y,
        destination_width: width,
        destination_height: height,
    }
}

fn check_fits(header: &BmHeader, target: &BitMap, x: u16, y: u16) -> Result<(), Error> {
    header.check_version()?;
    let destination_layout = target.layout();
    if header.layout() != destination_layout {
        return Err(Error::LayoutMismatch {
            source_layout: header.layout(),
            destination_layout,
        });
    }
    if header.depth > target.depth() {
        return Err(Error::DepthExceeded {
            source_depth: header.depth,
            destination_depth: target.depth(),
        });
    }
    let (width, height) = target_size(target);
    if u32::from(x) + u32::from(header.width) > u32::from(width)
        || u32::from(y) + u32::from(header.height) > u32::from(height)
    {
        return Err(out_of_bounds(header, (width, height), x, y));
    }
    Ok(())
}

/// Header describing `bitmap`
#[must_use]
pub fn header_of(bitmap: &BitMap) -> BmHeader {
    BmHeader::builder()
        .width(bitmap.width())
        .height(bitmap.rows())
        .depth(bitmap.depth())
        .flags(if bitmap.is_interleaved() { FLAG_INTERLEAVED } else { 0 })
        .build()
}

/// Writes `bitmap` as a `.bm` file
///
/// # Errors
///
/// Errors if `w` cannot be written to
pub fn encode(bitmap: &BitMap, mut w: impl Write) -> Result<(), Error> {
    header_of(bitmap).write(&mut w)?;
    for buffer in bitmap.buffers() {
        w.write_all(buffer.bytes())?;
    }
    w.flush()?;
    Ok(())
}

/// Writes `bitmap` as a `.bm` file at `path`, replacing any existing file
///
/// # Errors
///
/// Errors if the file cannot be created or written to
pub fn save(bitmap: &BitMap, path: impl AsRef<Path>) -> Result<(), Error> {
    let path = path.as_ref();
    info!("saving {}", path.display());
    encode(bitmap, create(path)?)
}
