/// Per-frame reference counts, indexed relative to the first managed frame.
///
/// A count of `0` means the frame is on the free list.
pub(crate) struct FrameTable<const N: usize> {
    counts: [u16; N],
}

impl<const N: usize> FrameTable<N> {
    pub(crate) const fn new() -> Self {
        Self { counts: [0; N] }
    }

    #[inline]
    pub(crate) const fn get(&self, index: u32) -> u16 {
        self.counts[index as usize]
    }

    #[inline]
    pub(crate) const fn set(&mut self, index: u32, count: u16) {
        self.counts[index as usize] = count;
    }

    /// Number of frames among the first `len` with a non-zero count.
    pub(crate) fn referenced(&self, len: usize) -> usize {
        self.counts[..len].iter().filter(|&&c| c != 0).count()
    }
}
