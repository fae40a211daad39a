use tracing::{debug, error, trace};

use super::{
    blit::{Blitter, CpuBlitter},
    memory::{Allocator, HeapAllocator, PlaneBuffers},
    BitMap, BitMapDump, CreateOptions, MAX_DEPTH,
};
use crate::Error;

/// Creates and destroys [`BitMap`]s using an [`Allocator`] for plane memory and a
/// [`Blitter`] to clear it
#[derive(Debug, Default)]
pub struct BitMapStore<A = HeapAllocator, B = CpuBlitter> {
    allocator: A,
    blitter: B,
}

impl BitMapStore {
    /// Creates a [`BitMapStore`] backed by the heap
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<A: Allocator, B: Blitter> BitMapStore<A, B> {
    /// Creates a [`BitMapStore`] from its collaborators
    pub const fn with_parts(allocator: A, blitter: B) -> Self {
        Self { allocator, blitter }
    }

    /// The plane memory allocator
    pub const fn allocator(&self) -> &A {
        &self.allocator
    }

    /// The blitter
    pub const fn blitter(&self) -> &B {
        &self.blitter
    }

    /// Creates a [`BitMap`] of `width` x `height` pixels with `depth` planes.
    ///
    /// `width` is rounded up to a multiple of 8. When [`CreateOptions::clear`] is set,
    /// this returns only after the blitter has finished clearing every plane.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidDepth`] if `depth` is not within 1..=8
    /// - [`Error::InvalidWidth`] if the rounded width doesn't fit in 16 bits
    /// - [`Error::AllocationFailure`] if plane memory is exhausted. No memory is held
    ///   on to in that case
    pub fn create(
        &mut self,
        width: u16,
        height: u16,
        depth: u8,
        options: CreateOptions,
    ) -> Result<BitMap, Error> {
        debug!("create(width: {width}, height: {height}, depth: {depth}, flags: {})", options.flags());
        if depth == 0 || depth > MAX_DEPTH {
            return Err(Error::InvalidDepth(depth));
        }
        let row_bytes = width.div_ceil(8);
        if row_bytes.checked_mul(8).is_none() {
            return Err(Error::InvalidWidth(width));
        }
        let plane_size = usize::from(row_bytes) * usize::from(height);

        let mut bitmap = if options.interleaved {
            let size = plane_size * usize::from(depth);
            let Some(buffer) = self.allocator.allocate_zeroed(size) else {
                error!("can't alloc interleaved bitplanes");
                return Err(Error::AllocationFailure { size });
            };
            BitMap::interleaved(row_bytes, height, depth, options.flags(), buffer)
        } else {
            let buffers = PlaneBuffers::acquire(&mut self.allocator, depth, plane_size)?;
            BitMap::separate(row_bytes, height, options.flags(), buffers.into_inner())
        };

        if options.clear {
            for buffer in bitmap.buffers_mut() {
                self.blitter.clear(buffer.bytes_mut());
            }
            self.blitter.wait_idle();
        }
        trace!("created bitmap:\n{}", bitmap.dump());
        Ok(bitmap)
    }

    /// Releases the plane memory of `bitmap`
    pub fn destroy(&mut self, bitmap: BitMap) {
        debug!("destroy(layout: {}, depth: {})", bitmap.layout(), bitmap.depth());
        self.blitter.wait_idle();
        for buffer in bitmap.into_buffers() {
            self.allocator.release(buffer);
        }
    }

    /// Logs and returns the [`BitMapDump`] of `bitmap`
    #[allow(clippy::unused_self)]
    pub fn dump(&self, bitmap: &BitMap) -> BitMapDump {
        let dump = bitmap.dump();
        debug!("bitmap dump:\n{dump}");
        dump
    }
}
