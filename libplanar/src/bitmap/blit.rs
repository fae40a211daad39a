use tracing::trace;

/// Engine used to clear plane memory.
///
/// Clears may complete asynchronously; callers that need the memory cleared must
/// call [`Blitter::wait_idle`] before touching it.
pub trait Blitter {
    /// Starts clearing `buffer`
    fn clear(&mut self, buffer: &mut [u8]);

    /// Blocks until every started operation has completed
    fn wait_idle(&mut self);
}

/// [`Blitter`] that clears on the cpu, completing every operation immediately
#[derive(Debug, Default)]
pub struct CpuBlitter {
    cleared: usize,
}

impl CpuBlitter {
    /// Creates a [`CpuBlitter`]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of clear operations performed so far
    #[must_use]
    pub const fn cleared(&self) -> usize {
        self.cleared
    }
}

impl Blitter for CpuBlitter {
    fn clear(&mut self, buffer: &mut [u8]) {
        buffer.fill(0);
        self.cleared += 1;
    }

    fn wait_idle(&mut self) {
        trace!("blitter idle after {} clears", self.cleared);
    }
}
