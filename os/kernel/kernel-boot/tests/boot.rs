use kernel_boot::{KERNEL_VERSION, Kernel};
use kernel_drivers::{BlockDriver, DriverRegistry, InterruptControllerDriver, Status, builtin_set};
use kernel_frames::{FrameAllocator, FrameAllocatorConfig, NoPoison, Watermarks};
use kernel_memory_addresses::{PhysicalAddress, PhysicalRange};
use log::{LevelFilter, Log, Metadata, Record};
use std::cell::RefCell;
use std::sync::Once;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

thread_local! {
    static CAPTURED: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

struct Capture;

impl Log for Capture {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        CAPTURED.with(|c| c.borrow_mut().push(record.args().to_string()));
    }

    fn flush(&self) {}
}

static CAPTURE: Capture = Capture;
static INSTALL: Once = Once::new();

fn take_logs() -> Vec<String> {
    INSTALL.call_once(|| {
        log::set_logger(&CAPTURE).unwrap();
        log::set_max_level(LevelFilter::Trace);
    });
    CAPTURED.with(|c| c.borrow_mut().drain(..).collect())
}

fn frames() -> FrameAllocator<NoPoison, 64> {
    FrameAllocator::new(
        FrameAllocatorConfig {
            watermarks: Watermarks::new(8, 4),
            poison_frames: false,
        },
        NoPoison,
    )
}

fn ram(frames: u64) -> PhysicalRange {
    PhysicalRange::new(
        PhysicalAddress::new(0x8000_0000),
        PhysicalAddress::new(0x8000_0000 + frames * 4096),
    )
}

fn position(logs: &[String], prefix: &str) -> usize {
    logs.iter()
        .position(|l| l.starts_with(prefix))
        .unwrap_or_else(|| panic!("no log line starting with {prefix:?} in {logs:#?}"))
}

#[test]
fn primary_init_runs_in_order() {
    static PLIC: InterruptControllerDriver = InterruptControllerDriver::new(|| {}, |_| {});
    static DISK: BlockDriver = BlockDriver::new(|| Status::OK);
    static BUILTINS: [kernel_drivers::DriverEntry; 2] = builtin_set(&PLIC, &DISK);

    let alloc = frames();
    let registry = DriverRegistry::new();
    let kernel = Kernel::new(&alloc, &registry, &BUILTINS);
    take_logs();

    assert!(!kernel.is_started());
    let report = kernel.primary_init(ram(16), 0x1234);
    assert!(kernel.is_started());
    assert_eq!(report.frames.total, 16);
    assert_eq!(report.frames.free, 16);
    assert!(report.builtins_registered);
    assert_eq!(report.drivers_initialized, 2);
    assert!(registry.snapshot().records().iter().all(|d| d.inited));

    let logs = take_logs();
    assert_eq!(
        logs[0],
        format!("bootstrap sequence engaged version={KERNEL_VERSION} boot_cycle=0x1234")
    );
    let order = [
        position(&logs, "memory: kinit"),
        position(&logs, "kmem ready: total=16 free=16 pages"),
        position(&logs, "memory: pressure=0%"),
        position(&logs, "drivers: registering builtins"),
        position(&logs, "driver: init name=plic class=0 status=0"),
        position(&logs, "driver: init name=virtio-blk class=1 status=0"),
        position(&logs, "driver: unit-init name=plic unit=0"),
        position(&logs, "primary unit is live"),
    ];
    assert!(order.is_sorted(), "out of order: {logs:#?}");
}

#[test]
fn secondaries_wait_for_the_primary() {
    static GLOBAL: AtomicUsize = AtomicUsize::new(0);
    static UNITS: AtomicU32 = AtomicU32::new(0);
    static SEEN_BEFORE_GLOBAL: AtomicU32 = AtomicU32::new(0);
    static PLIC: InterruptControllerDriver = InterruptControllerDriver::new(
        || {
            GLOBAL.fetch_add(1, Ordering::SeqCst);
        },
        |unit| {
            if GLOBAL.load(Ordering::SeqCst) == 0 {
                SEEN_BEFORE_GLOBAL.fetch_or(1 << unit, Ordering::SeqCst);
            }
            UNITS.fetch_or(1 << unit, Ordering::SeqCst);
        },
    );
    static DISK: BlockDriver = BlockDriver::new(|| Status::OK);
    static BUILTINS: [kernel_drivers::DriverEntry; 2] = builtin_set(&PLIC, &DISK);

    let alloc = frames();
    let registry = DriverRegistry::new();
    let kernel = Kernel::new(&alloc, &registry, &BUILTINS);

    thread::scope(|s| {
        for unit in 1..4 {
            let kernel = &kernel;
            s.spawn(move || kernel.secondary_init(unit));
        }

        thread::sleep(Duration::from_millis(20));
        assert_eq!(UNITS.load(Ordering::SeqCst), 0, "a secondary ran early");
        assert!(!kernel.is_started());

        kernel.primary_init(ram(8), 0);
    });

    assert_eq!(GLOBAL.load(Ordering::SeqCst), 1);
    assert_eq!(UNITS.load(Ordering::SeqCst), 0b1111);
    assert_eq!(SEEN_BEFORE_GLOBAL.load(Ordering::SeqCst), 0);
}

#[test]
fn secondary_after_boot_does_not_wait() {
    static UNITS: AtomicU32 = AtomicU32::new(0);
    static PLIC: InterruptControllerDriver = InterruptControllerDriver::new(|| {}, |unit| {
        UNITS.fetch_or(1 << unit, Ordering::SeqCst);
    });
    static DISK: BlockDriver = BlockDriver::new(|| Status::OK);
    static BUILTINS: [kernel_drivers::DriverEntry; 2] = builtin_set(&PLIC, &DISK);

    let alloc = frames();
    let registry = DriverRegistry::new();
    let kernel = Kernel::new(&alloc, &registry, &BUILTINS);
    kernel.primary_init(ram(4), 0);
    take_logs();

    kernel.secondary_init(5);
    assert_eq!(UNITS.load(Ordering::SeqCst), 0b10_0001);
    assert_eq!(
        take_logs(),
        [
            "unit 5 starting",
            "driver: unit-init name=plic unit=5",
            "unit 5 entered scheduler",
        ]
    );
}

#[test]
#[should_panic(expected = "kinit: ")]
fn memory_that_does_not_fit_is_fatal() {
    let alloc = frames();
    let registry = DriverRegistry::new();
    let kernel = Kernel::new(&alloc, &registry, &[]);
    kernel.primary_init(ram(65), 0);
}

#[test]
#[should_panic(expected = "already initialized")]
fn booting_twice_is_fatal() {
    let alloc = frames();
    let registry = DriverRegistry::new();
    let kernel = Kernel::new(&alloc, &registry, &[]);
    kernel.primary_init(ram(4), 0);
    kernel.primary_init(ram(4), 0);
}

#[test]
fn empty_builtin_set_still_starts() {
    let alloc = frames();
    let registry = DriverRegistry::new();
    let kernel = Kernel::new(&alloc, &registry, &[]);

    let report = kernel.primary_init(ram(4), 0);
    assert_eq!(report.drivers_initialized, 0);
    assert!(registry.is_empty());
    assert!(kernel.is_started());
    assert_eq!(kernel.frames().stats().total, 4);
    kernel.secondary_init(1);
}

#[test]
fn boot_manages_ram_above_the_image() {
    use kernel_info::memory::{FRAME_SIZE, PHYS_TOP};

    let alloc: FrameAllocator<NoPoison> =
        FrameAllocator::new(FrameAllocatorConfig::DEFAULT, NoPoison);
    let registry = DriverRegistry::new();
    let kernel = Kernel::new(&alloc, &registry, &[]);

    // Image ends mid-frame; the partial frame is not handed out.
    let kernel_end = PhysicalAddress::new(PHYS_TOP - 100 * FRAME_SIZE - 12);
    let report = kernel.primary_init_after_image(kernel_end, 0);
    assert_eq!(report.frames.total, 100);
    assert_eq!(
        alloc.managed_range(),
        Some(PhysicalRange::new(
            PhysicalAddress::new(PHYS_TOP - 100 * FRAME_SIZE),
            PhysicalAddress::new(PHYS_TOP)
        ))
    );
}

#[test]
#[should_panic(expected = "exceeds MAX_UNITS")]
fn unit_ids_are_bounded() {
    let alloc = frames();
    let registry = DriverRegistry::new();
    let kernel = Kernel::new(&alloc, &registry, &[]);
    kernel.primary_init(ram(1), 0);
    kernel.secondary_init(64);
}
