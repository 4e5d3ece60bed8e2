use crate::{PageSize, PhysicalAddress, PhysicalPage};
use core::fmt;
use core::marker::PhantomData;

/// Half-open physical address range `[start, end)`.
///
/// Neither bound has to be aligned. [`PhysicalRange::frames`] yields only the
/// pages that lie completely inside the range.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct PhysicalRange {
    start: PhysicalAddress,
    end: PhysicalAddress,
}

impl PhysicalRange {
    #[inline]
    #[must_use]
    pub const fn new(start: PhysicalAddress, end: PhysicalAddress) -> Self {
        Self { start, end }
    }

    #[inline]
    #[must_use]
    pub const fn start(&self) -> PhysicalAddress {
        self.start
    }

    #[inline]
    #[must_use]
    pub const fn end(&self) -> PhysicalAddress {
        self.end
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end.as_u64() <= self.start.as_u64()
    }

    #[inline]
    #[must_use]
    pub const fn contains(&self, addr: PhysicalAddress) -> bool {
        addr.as_u64() >= self.start.as_u64() && addr.as_u64() < self.end.as_u64()
    }

    /// Number of whole `S` pages inside the range.
    #[inline]
    #[must_use]
    pub const fn frame_count<S: PageSize>(&self) -> u64 {
        let first = self.start.align_up::<S>().as_u64();
        let last = self.end.align_down::<S>().as_u64();
        if last > first {
            (last - first) >> S::SHIFT
        } else {
            0
        }
    }

    /// Iterate over every whole `S` page inside the range, lowest address first.
    #[inline]
    #[must_use]
    pub const fn frames<S: PageSize>(&self) -> PhysicalFrames<S> {
        PhysicalFrames {
            next: self.start.align_up::<S>().as_u64(),
            end: self.end.as_u64(),
            _size: PhantomData,
        }
    }
}

impl fmt::Debug for PhysicalRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysicalRange({}..{})", self.start, self.end)
    }
}

/// Iterator over the whole pages of a [`PhysicalRange`].
pub struct PhysicalFrames<S: PageSize> {
    next: u64,
    end: u64,
    _size: PhantomData<S>,
}

impl<S: PageSize> Iterator for PhysicalFrames<S> {
    type Item = PhysicalPage<S>;

    fn next(&mut self) -> Option<Self::Item> {
        let limit = self.next.checked_add(S::SIZE)?;
        if limit > self.end {
            return None;
        }
        let page = PhysicalPage::containing(PhysicalAddress::new(self.next));
        self.next = limit;
        Some(page)
    }
}
