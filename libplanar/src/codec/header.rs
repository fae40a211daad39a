use std::io::{ErrorKind, Read, Write};

use bon::Builder;

use crate::{
    bitmap::{Layout, FLAG_INTERLEAVED},
    Error,
};

/// Size of the `.bm` header in bytes
pub const HEADER_LEN: usize = 9;

/// The only `.bm` version there is
pub const VERSION: u8 = 0;

/// Header of a `.bm` file.
///
/// ```"not rust"
/// offset  size  field
/// 0       2     width in pixels (little-endian)
/// 2       2     height in pixels (little-endian)
/// 4       1     plane count
/// 5       1     version, always 0
/// 6       1     flags, bit 0 set for interleaved planes
/// 7       2     unused
/// ```
#[derive(Builder, Default, Debug, Eq, PartialEq, Copy, Clone)]
#[non_exhaustive]
pub struct BmHeader {
    /// Width in pixels
    pub width: u16,
    /// Height in pixels
    pub height: u16,
    /// Plane count
    pub depth: u8,
    /// Format version
    #[builder(default = VERSION)]
    pub version: u8,
    /// Format flags
    #[builder(default)]
    pub flags: u8,
}

impl BmHeader {
    /// Reads a header, skipping the unused bytes
    ///
    /// # Errors
    ///
    /// [`Error::Truncated`] if fewer than [`HEADER_LEN`] bytes are available, [`Error::Io`]
    /// on other read failures. The version is not checked
    pub fn from_reader(r: &mut impl Read) -> Result<Self, Error> {
        let mut buf = [0u8; HEADER_LEN];
        r.read_exact(&mut buf).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => Error::Truncated {
                expected: HEADER_LEN,
            },
            _ => Error::Io(e),
        })?;
        Ok(Self {
            width: u16::from_le_bytes([buf[0], buf[1]]),
            height: u16::from_le_bytes([buf[2], buf[3]]),
            depth: buf[4],
            version: buf[5],
            flags: buf[6],
        })
    }

    /// Serializes the header, writing zeros for the unused bytes
    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let [w0, w1] = self.width.to_le_bytes();
        let [h0, h1] = self.height.to_le_bytes();
        [w0, w1, h0, h1, self.depth, self.version, self.flags, 0, 0]
    }

    /// Writes the serialized header
    ///
    /// # Errors
    ///
    /// Errors if `w` cannot be written to
    pub fn write(&self, w: &mut impl Write) -> Result<(), Error> {
        w.write_all(&self.to_bytes())?;
        Ok(())
    }

    /// Fails with [`Error::UnsupportedVersion`] unless the version is [`VERSION`]
    ///
    /// # Errors
    ///
    /// See above
    pub fn check_version(&self) -> Result<(), Error> {
        if self.version == VERSION {
            Ok(())
        } else {
            Err(Error::UnsupportedVersion(self.version))
        }
    }

    /// Returns `true` if the planes are stored interleaved
    #[must_use]
    pub const fn is_interleaved(&self) -> bool {
        self.flags & FLAG_INTERLEAVED != 0
    }

    /// Layout declared by the flags
    #[must_use]
    pub const fn layout(&self) -> Layout {
        Layout::from_flags(self.flags)
    }

    /// Bytes per row of a single plane
    #[must_use]
    pub const fn row_bytes(&self) -> u16 {
        self.width.div_ceil(8)
    }

    /// Size of the plane data following the header
    #[must_use]
    pub const fn payload_len(&self) -> usize {
        self.row_bytes() as usize * self.height as usize * self.depth as usize
    }
}
