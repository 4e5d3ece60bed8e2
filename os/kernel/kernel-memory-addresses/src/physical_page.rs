use crate::{PageSize, PhysicalAddress};
use core::fmt;
use core::marker::PhantomData;

/// Physical page base for size `S`.
///
/// A `PhysicalPage<S>` is the **page-aligned base** of a physical page of
/// `S::SIZE` bytes. The frame allocator hands these out; callers that need a
/// raw address use [`PhysicalPage::base`].
///
/// ### Invariants
/// - The low `S::SHIFT` bits of the base are always zero.
///
/// ### Examples
/// ```rust
/// # use kernel_memory_addresses::*;
/// let pp = PhysicalPage::<Size4K>::containing(PhysicalAddress::new(0x8765_4321));
/// assert_eq!(pp.base().as_u64(), 0x8765_4000);
/// assert_eq!(pp.number(), 0x87654);
/// ```
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PhysicalPage<S: PageSize> {
    base: u64,
    _size: PhantomData<S>,
}

impl<S: PageSize> PhysicalPage<S> {
    /// Page that contains `addr` (aligns down).
    #[inline]
    #[must_use]
    pub const fn containing(addr: PhysicalAddress) -> Self {
        Self {
            base: addr.as_u64() & !S::MASK,
            _size: PhantomData,
        }
    }

    /// Page starting exactly at `addr`, or `None` if `addr` is not aligned.
    #[inline]
    #[must_use]
    pub const fn from_aligned(addr: PhysicalAddress) -> Option<Self> {
        if addr.is_aligned::<S>() {
            Some(Self::containing(addr))
        } else {
            None
        }
    }

    /// Page with the given page frame number.
    #[inline]
    #[must_use]
    pub const fn from_number(pfn: u64) -> Self {
        Self {
            base: pfn << S::SHIFT,
            _size: PhantomData,
        }
    }

    #[inline]
    #[must_use]
    pub const fn base(self) -> PhysicalAddress {
        PhysicalAddress::new(self.base)
    }

    /// Page frame number (`base >> S::SHIFT`).
    #[inline]
    #[must_use]
    pub const fn number(self) -> u64 {
        self.base >> S::SHIFT
    }

    /// The page directly after this one, if it does not overflow the address space.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self.base.checked_add(S::SIZE) {
            Some(base) => Some(Self {
                base,
                _size: PhantomData,
            }),
            None => None,
        }
    }
}

impl<S> fmt::Display for PhysicalPage<S>
where
    S: PageSize,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}/{}", self.base, S::as_str())
    }
}

impl<S: PageSize> fmt::Debug for PhysicalPage<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysicalPage<{}>({:#018X})", S::as_str(), self.base)
    }
}
