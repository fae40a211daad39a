use tracing::{error, trace};

use crate::Error;

/// A block of plane memory handed out by an [`Allocator`]
#[derive(Debug, PartialEq, Eq)]
pub struct Buffer {
    address: usize,
    data: Vec<u8>,
}

impl Buffer {
    /// Creates a [`Buffer`] of `data` located at `address`
    #[must_use]
    pub const fn new(address: usize, data: Vec<u8>) -> Self {
        Self { address, data }
    }

    /// Base address of the buffer
    #[must_use]
    pub const fn address(&self) -> usize {
        self.address
    }

    /// Size of the buffer in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the buffer holds no bytes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The buffer contents
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// The buffer contents, mutably
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

/// Source of plane memory
pub trait Allocator {
    /// Returns a zero-filled buffer of `size` bytes, or [`None`] if memory is exhausted
    fn allocate_zeroed(&mut self, size: usize) -> Option<Buffer>;

    /// Gives `buffer` back to the allocator
    fn release(&mut self, buffer: Buffer);
}

const ALIGNMENT: usize = 8;
const BASE_ADDRESS: usize = 0x1_0000;

/// [`Allocator`] backed by the heap.
///
/// Buffers receive increasing virtual base addresses that are never reused, so two
/// separately allocated buffers are never adjacent.
#[derive(Debug)]
pub struct HeapAllocator {
    next_address: usize,
    budget: Option<usize>,
    in_use: usize,
}

impl Default for HeapAllocator {
    fn default() -> Self {
        Self {
            next_address: BASE_ADDRESS,
            budget: None,
            in_use: 0,
        }
    }
}

impl HeapAllocator {
    /// Creates an unbounded [`HeapAllocator`]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a [`HeapAllocator`] that fails once more than `budget` bytes are in use
    #[must_use]
    pub fn with_budget(budget: usize) -> Self {
        Self {
            budget: Some(budget),
            ..Self::default()
        }
    }

    /// Bytes currently handed out
    #[must_use]
    pub const fn in_use(&self) -> usize {
        self.in_use
    }
}

impl Allocator for HeapAllocator {
    fn allocate_zeroed(&mut self, size: usize) -> Option<Buffer> {
        let in_use = self.in_use.checked_add(size)?;
        if self.budget.is_some_and(|budget| in_use > budget) {
            return None;
        }
        let address = self.next_address;
        // a zero sized buffer still occupies an address of its own
        let footprint = size.max(1).checked_next_multiple_of(ALIGNMENT)?;
        let next_address = address.checked_add(footprint)?.checked_add(ALIGNMENT)?;
        let mut data = Vec::new();
        if let Err(e) = data.try_reserve_exact(size) {
            error!("cannot allocate {size} bytes: {e}");
            return None;
        }
        data.resize(size, 0);
        self.next_address = next_address;
        self.in_use = in_use;
        trace!("allocated {size} bytes at {address:#x}");
        Some(Buffer::new(address, data))
    }

    fn release(&mut self, buffer: Buffer) {
        trace!("released {} bytes at {:#x}", buffer.len(), buffer.address());
        self.in_use = self.in_use.saturating_sub(buffer.len());
    }
}

/// Set of plane buffers that is either acquired completely or not at all
#[derive(Debug)]
pub(crate) struct PlaneBuffers(Vec<Buffer>);

impl PlaneBuffers {
    /// Acquires `count` buffers of `size` bytes each, starting from the last one.
    ///
    /// The returned buffers are ordered first to last. If any request fails, every
    /// buffer acquired so far goes back to `allocator` before the error is returned.
    pub(crate) fn acquire(
        allocator: &mut impl Allocator,
        count: u8,
        size: usize,
    ) -> Result<Self, Error> {
        let mut acquired = Vec::with_capacity(usize::from(count));
        for plane in (0..count).rev() {
            let Some(buffer) = allocator.allocate_zeroed(size) else {
                error!("can't alloc bitplane {}/{count}", count - plane);
                for buffer in acquired {
                    allocator.release(buffer);
                }
                return Err(Error::AllocationFailure { size });
            };
            acquired.push(buffer);
        }
        acquired.reverse();
        Ok(Self(acquired))
    }

    pub(crate) fn into_inner(self) -> Vec<Buffer> {
        self.0
    }
}
