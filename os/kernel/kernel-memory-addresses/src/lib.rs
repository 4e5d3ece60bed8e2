//! # Physical Memory Address Types
//!
//! Strongly typed wrappers for the physical addresses handed around by the
//! frame allocator, the virtual memory layer and the drivers.
//!
//! ## Overview
//!
//! | Type | Description |
//! |------|-------------|
//! | [`PhysicalAddress`] | A raw 64-bit physical address (RAM or MMIO), not necessarily aligned. |
//! | [`PhysicalPage<S>`] | The page-aligned base of a physical page of size `S`. |
//! | [`PhysicalRange`] | A half-open physical range `[start, end)`, e.g. the RAM handed to the allocator. |
//!
//! The page size is carried at the type level through the sealed [`PageSize`]
//! trait. The kernel manages memory in [`Size4K`] frames only.
//!
//! ## Typical Usage
//!
//! ```rust
//! # use kernel_memory_addresses::*;
//! let pa = PhysicalAddress::new(0x8020_1042);
//! assert!(!pa.is_aligned::<Size4K>());
//!
//! let page = pa.page::<Size4K>();
//! assert_eq!(page.base().as_u64(), 0x8020_1000);
//!
//! let range = PhysicalRange::new(PhysicalAddress::new(0x8020_0800), PhysicalAddress::new(0x8020_4000));
//! // The first partial frame is skipped.
//! assert_eq!(range.frames::<Size4K>().count(), 3);
//! ```
//!
//! ## Design Notes
//!
//! - The types are `#[repr(transparent)]` over `u64` and implement `Copy`,
//!   `Eq`, `Ord` and `Hash`.
//! - Alignment helpers are `const fn`.
//! - There is no virtual address type; the allocator only
//!   ever deals in physical frames.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(clippy::inline_always)]

mod page_size;
mod physical_address;
mod physical_page;
mod physical_range;

pub use page_size::{PageSize, Size4K};
pub use physical_address::PhysicalAddress;
pub use physical_page::PhysicalPage;
pub use physical_range::{PhysicalFrames, PhysicalRange};
