use kernel_frames::{
    ACQUIRE_FILL, FrameAllocator, FrameAllocatorConfig, FrameError, FramePoison, FrameStats,
    InitError, NoPoison, RELEASE_FILL, Watermarks,
};
use kernel_memory_addresses::{PhysicalAddress, PhysicalPage, PhysicalRange, Size4K};
use std::collections::HashMap;
use std::sync::Mutex;

const BASE: u64 = 0x8000_0000;
const FRAME: u64 = 4096;

fn range(frames: u64) -> PhysicalRange {
    PhysicalRange::new(
        PhysicalAddress::new(BASE),
        PhysicalAddress::new(BASE + frames * FRAME),
    )
}

fn config() -> FrameAllocatorConfig {
    FrameAllocatorConfig {
        watermarks: Watermarks::new(4, 2),
        poison_frames: false,
    }
}

fn allocator<const N: usize>(frames: u64) -> FrameAllocator<NoPoison, N> {
    let alloc = FrameAllocator::new(config(), NoPoison);
    alloc.initialize(range(frames)).unwrap();
    alloc
}

fn assert_balanced<P: FramePoison, const N: usize>(alloc: &FrameAllocator<P, N>) {
    let stats = alloc.stats();
    assert_eq!(stats.free + alloc.referenced_frames(), stats.total);
}

#[test]
fn initialize_counts_whole_frames() {
    let alloc = FrameAllocator::<_, 16>::new(config(), NoPoison);
    assert!(!alloc.is_ready());
    let stats = alloc.initialize(range(10)).unwrap();
    assert_eq!(stats, FrameStats { total: 10, free: 10 });
    assert!(alloc.is_ready());
    assert_eq!(alloc.pressure_percent(), 0);
    assert_balanced(&alloc);
}

#[test]
fn initialize_runs_once() {
    let alloc = allocator::<16>(10);
    assert_eq!(
        alloc.initialize(range(4)),
        Err(InitError::AlreadyInitialized)
    );
    assert_eq!(alloc.stats().total, 10);
}

#[test]
fn oversized_range_is_rejected() {
    let alloc = FrameAllocator::<_, 8>::new(config(), NoPoison);
    assert_eq!(
        alloc.initialize(range(9)),
        Err(InitError::CapacityExceeded {
            frames: 9,
            capacity: 8
        })
    );
    assert!(alloc.managed_range().is_none());
    assert_eq!(alloc.acquire(), Err(FrameError::Exhausted));
}

#[test]
fn acquire_hands_out_each_frame_once() {
    let alloc = allocator::<8>(8);
    let mut seen = Vec::new();
    while let Ok(frame) = alloc.acquire() {
        assert_eq!(alloc.ref_count(frame.base()), 1);
        assert!(!seen.contains(&frame));
        seen.push(frame);
    }
    assert_eq!(seen.len(), 8);
    assert_eq!(alloc.stats(), FrameStats { total: 8, free: 0 });
    assert_eq!(alloc.pressure_percent(), 100);
    assert_eq!(alloc.acquire(), Err(FrameError::Exhausted));
    assert_balanced(&alloc);
}

#[test]
fn released_frame_is_reused_first() {
    let alloc = allocator::<8>(8);
    let a = alloc.acquire().unwrap();
    let b = alloc.acquire().unwrap();
    alloc.release(a);
    assert_eq!(alloc.acquire().unwrap(), a);
    alloc.release(b);
    assert_balanced(&alloc);
}

#[test]
fn shared_frame_survives_until_last_release() {
    let alloc = allocator::<8>(8);
    let frame = alloc.acquire().unwrap();
    let free_after_acquire = alloc.stats().free;

    assert_eq!(alloc.add_ref(frame.base()), Ok(2));
    assert_eq!(alloc.add_ref(frame.base()), Ok(3));

    alloc.release(frame);
    alloc.release(frame);
    assert_eq!(alloc.ref_count(frame.base()), 1);
    assert_eq!(alloc.stats().free, free_after_acquire);

    alloc.release(frame);
    assert_eq!(alloc.ref_count(frame.base()), 0);
    assert_eq!(alloc.stats().free, free_after_acquire + 1);
    assert_balanced(&alloc);
}

#[test]
fn add_ref_counts_the_containing_frame() {
    let alloc = allocator::<8>(8);
    let frame = alloc.acquire().unwrap();
    let inside = PhysicalAddress::new(frame.base().as_u64() + 0x123);
    assert_eq!(alloc.add_ref(inside), Ok(2));
    assert_eq!(alloc.ref_count(frame.base()), 2);
    assert_eq!(alloc.ref_count(inside), 2);
}

#[test]
fn add_ref_rejects_free_and_unmanaged_frames() {
    let alloc = allocator::<8>(8);
    let free_frame = PhysicalAddress::new(BASE);
    assert_eq!(
        alloc.add_ref(free_frame),
        Err(FrameError::NotAllocated(PhysicalPage::containing(free_frame)))
    );

    let outside = PhysicalAddress::new(BASE + 8 * FRAME);
    assert_eq!(alloc.add_ref(outside), Err(FrameError::OutOfRange(outside)));
    assert_eq!(alloc.ref_count(outside), 0);
    assert_eq!(alloc.ref_count(PhysicalAddress::zero()), 0);
    assert_eq!(alloc.ref_count(PhysicalAddress::new(u64::MAX)), 0);
}

#[test]
fn add_ref_refuses_to_wrap() {
    let alloc = allocator::<4>(4);
    let frame = alloc.acquire().unwrap();
    for expected in 2..=u16::MAX {
        assert_eq!(alloc.add_ref(frame.base()), Ok(expected));
    }
    assert_eq!(
        alloc.add_ref(frame.base()),
        Err(FrameError::RefCountOverflow(frame))
    );
    assert_eq!(alloc.ref_count(frame.base()), u16::MAX);
}

#[test]
fn pressure_tracks_frames_in_use() {
    let alloc = allocator::<16>(3);
    let mut last = alloc.pressure_percent();
    let mut held = Vec::new();
    for expected in [33, 66, 100] {
        held.push(alloc.acquire().unwrap());
        let now = alloc.pressure_percent();
        assert_eq!(now, expected);
        assert!(now >= last);
        last = now;
    }
    for frame in held {
        alloc.release(frame);
        let now = alloc.pressure_percent();
        assert!(now <= last);
        last = now;
    }
    assert_eq!(last, 0);
}

#[test]
fn empty_allocator_reports_no_pressure() {
    let alloc = FrameAllocator::<_, 4>::new(config(), NoPoison);
    assert_eq!(alloc.pressure_percent(), 0);
    alloc.initialize(range(0)).unwrap();
    assert_eq!(alloc.stats(), FrameStats::default());
    assert_eq!(alloc.pressure_percent(), 0);
}

#[test]
#[should_panic(expected = "double free")]
fn double_free_is_fatal() {
    let alloc = allocator::<8>(8);
    let frame = alloc.acquire().unwrap();
    alloc.release(frame);
    alloc.release(frame);
}

#[test]
#[should_panic(expected = "double free")]
fn releasing_a_never_acquired_frame_is_fatal() {
    let alloc = allocator::<8>(8);
    alloc.release(PhysicalAddress::new(BASE + FRAME));
}

#[test]
#[should_panic(expected = "misaligned")]
fn misaligned_release_is_fatal() {
    let alloc = allocator::<8>(8);
    let frame = alloc.acquire().unwrap();
    alloc.release(PhysicalAddress::new(frame.base().as_u64() + 8));
}

#[test]
#[should_panic(expected = "outside the managed range")]
fn out_of_range_release_is_fatal() {
    let alloc = allocator::<8>(8);
    alloc.release(PhysicalAddress::new(BASE + 8 * FRAME));
}

#[derive(Default)]
struct RecordingPoison {
    fills: Mutex<HashMap<u64, u8>>,
}

impl RecordingPoison {
    fn last_fill(&self, frame: PhysicalPage<Size4K>) -> Option<u8> {
        self.fills.lock().unwrap().get(&frame.base().as_u64()).copied()
    }
}

impl FramePoison for RecordingPoison {
    fn fill(&self, frame: PhysicalPage<Size4K>, byte: u8) {
        self.fills.lock().unwrap().insert(frame.base().as_u64(), byte);
    }
}

#[test]
fn poisoning_marks_acquired_and_released_frames() {
    let alloc = FrameAllocator::<_, 8>::new(
        FrameAllocatorConfig {
            poison_frames: true,
            ..config()
        },
        RecordingPoison::default(),
    );
    alloc.initialize(range(4)).unwrap();
    for frame in range(4).frames::<Size4K>() {
        assert_eq!(alloc.poison().last_fill(frame), Some(RELEASE_FILL));
    }

    let frame = alloc.acquire().unwrap();
    assert_eq!(alloc.poison().last_fill(frame), Some(ACQUIRE_FILL));

    // Dropping a shared reference leaves the contents alone.
    alloc.add_ref(frame.base()).unwrap();
    alloc.release(frame);
    assert_eq!(alloc.poison().last_fill(frame), Some(ACQUIRE_FILL));

    alloc.release(frame);
    assert_eq!(alloc.poison().last_fill(frame), Some(RELEASE_FILL));
}

#[test]
fn poisoning_can_be_switched_off() {
    let alloc = FrameAllocator::<_, 8>::new(config(), RecordingPoison::default());
    assert!(!alloc.poisoning());
    alloc.initialize(range(2)).unwrap();
    let frame = alloc.acquire().unwrap();
    assert_eq!(alloc.poison().last_fill(frame), None);

    assert!(!alloc.set_poisoning(true));
    alloc.release(frame);
    assert_eq!(alloc.poison().last_fill(frame), Some(RELEASE_FILL));
    assert!(alloc.set_poisoning(false));
}

#[test]
fn default_config_uses_kernel_watermarks() {
    let config = FrameAllocatorConfig::default();
    assert_eq!(config.watermarks.low, 64);
    assert_eq!(config.watermarks.critical, 32);
    assert_eq!(config.poison_frames, cfg!(debug_assertions));
}
