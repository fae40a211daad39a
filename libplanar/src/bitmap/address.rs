//! Plane addressing arithmetic.
//!
//! Layout is never stored on a bitmap. It is recovered from the distance between the
//! base addresses of the first two planes: interleaved planes sit exactly one plane
//! row apart inside a single buffer, so `(addr[1] - addr[0]) * depth == stride`.

use super::Layout;

/// Returns `true` if the plane base addresses describe interleaved planes
#[must_use]
pub fn is_interleaved(depth: u8, stride: u16, plane_addresses: &[usize]) -> bool {
    if depth <= 1 {
        return false;
    }
    let (Some(&first), Some(&second)) = (plane_addresses.first(), plane_addresses.get(1)) else {
        return false;
    };
    // planes allocated separately may lie below the first one
    second
        .checked_sub(first)
        .and_then(|distance| distance.checked_mul(usize::from(depth)))
        .is_some_and(|span| span == usize::from(stride))
}

/// Layout described by the plane base addresses
#[must_use]
pub fn layout(depth: u8, stride: u16, plane_addresses: &[usize]) -> Layout {
    if is_interleaved(depth, stride, plane_addresses) {
        Layout::Interleaved
    } else {
        Layout::Separate
    }
}

/// Bytes per row of a single plane
#[must_use]
pub fn row_bytes(depth: u8, stride: u16, plane_addresses: &[usize]) -> u16 {
    if is_interleaved(depth, stride, plane_addresses) {
        // the check above guarantees that the distance is a fraction of the stride
        stride / u16::from(depth)
    } else {
        stride
    }
}

/// Offset of byte `column` of `row` of `plane`.
///
/// For [`Layout::Separate`] the offset is relative to the plane's own buffer, for
/// [`Layout::Interleaved`] it is relative to the single shared buffer.
#[must_use]
pub const fn byte_offset(
    layout: Layout,
    stride: u16,
    depth: u8,
    plane: u8,
    row: u16,
    column: u16,
) -> usize {
    match layout {
        Layout::Separate => row as usize * stride as usize + column as usize,
        Layout::Interleaved => {
            let row_bytes = stride as usize / depth as usize;
            (row as usize * depth as usize + plane as usize) * row_bytes + column as usize
        }
    }
}
