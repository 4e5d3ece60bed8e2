use crate::{DriverClass, DriverMetrics, DriverOps};
use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};
use kernel_info::limits::MAX_DRIVERS;
use kernel_sync::SpinLock;

/// A driver as handed to [`DriverRegistry::register_builtins`].
#[derive(Copy, Clone)]
pub struct DriverEntry {
    pub name: &'static str,
    pub class: DriverClass,
    pub ops: &'static dyn DriverOps,
}

impl fmt::Debug for DriverEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverEntry")
            .field("name", &self.name)
            .field("class", &self.class)
            .finish_non_exhaustive()
    }
}

#[derive(Copy, Clone)]
struct Descriptor {
    entry: DriverEntry,
    inited: bool,
}

struct Table {
    slots: [Option<Descriptor>; MAX_DRIVERS],
    len: usize,
}

impl Table {
    fn get(&self, index: usize) -> Option<Descriptor> {
        self.slots[..self.len].get(index).copied().flatten()
    }
}

/// Fixed-capacity table of platform drivers.
///
/// Drivers are registered and initialized during boot by a single writer;
/// afterwards the table is only read. The lock makes each copy out of the
/// table consistent. Driver hooks always run with the lock released.
pub struct DriverRegistry {
    table: SpinLock<Table>,
    builtins_registered: AtomicBool,
    global_init_done: AtomicBool,
}

impl DriverRegistry {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            table: SpinLock::new(Table {
                slots: [None; MAX_DRIVERS],
                len: 0,
            }),
            builtins_registered: AtomicBool::new(false),
            global_init_done: AtomicBool::new(false),
        }
    }

    /// Append a driver.
    ///
    /// # Panics
    /// When all [`MAX_DRIVERS`] slots are taken. The table size is a build
    /// configuration, so running out is a configuration error.
    pub fn register(&self, name: &'static str, class: DriverClass, ops: &'static dyn DriverOps) {
        let mut table = self.table.lock();
        let len = table.len;
        if len >= MAX_DRIVERS {
            drop(table);
            panic!("driver table overflow registering {name}");
        }
        table.slots[len] = Some(Descriptor {
            entry: DriverEntry { name, class, ops },
            inited: false,
        });
        table.len = len + 1;
    }

    /// Register the built-in driver set.
    ///
    /// Only the first call registers anything; it returns `true`.
    pub fn register_builtins(&self, set: &[DriverEntry]) -> bool {
        if self.builtins_registered.swap(true, Ordering::AcqRel) {
            return false;
        }
        for entry in set {
            self.register(entry.name, entry.class, entry.ops);
        }
        true
    }

    /// Run every driver's one-time init hook and mark the driver initialized.
    ///
    /// Only the first call does anything. Returns how many drivers were
    /// marked initialized.
    pub fn global_init(&self) -> usize {
        if self.global_init_done.swap(true, Ordering::AcqRel) {
            return 0;
        }

        let mut inited = 0;
        for index in 0..MAX_DRIVERS {
            // Copy the slot out so the hook runs without the lock held.
            let Some(driver) = self.table.lock().get(index) else {
                break;
            };
            if !driver.inited {
                let entry = driver.entry;
                if let Some(status) = entry.ops.init() {
                    log::info!(
                        "driver: init name={} class={} status={status}",
                        entry.name,
                        entry.class.code()
                    );
                }
                self.table.with_lock(|t| {
                    if let Some(slot) = t.slots[index].as_mut() {
                        slot.inited = true;
                    }
                });
                inited += 1;
            }
        }
        inited
    }

    /// Run every driver's per-unit hook for `unit`. Returns how many hooks ran.
    pub fn per_unit_init(&self, unit: u32) -> usize {
        let mut ran = 0;
        for index in 0..MAX_DRIVERS {
            let Some(driver) = self.table.lock().get(index) else {
                break;
            };
            if driver.entry.ops.per_unit_init(unit).is_some() {
                log::info!("driver: unit-init name={} unit={unit}", driver.entry.name);
                ran += 1;
            }
        }
        ran
    }

    /// Copy the table out, together with each driver's current metrics.
    #[must_use]
    pub fn snapshot(&self) -> RegistrySnapshot {
        let (slots, len) = self.table.with_lock(|t| (t.slots, t.len));

        let mut snapshot = RegistrySnapshot::EMPTY;
        for (record, descriptor) in snapshot.records.iter_mut().zip(slots.iter().take(len)) {
            let Some(descriptor) = descriptor else {
                break;
            };
            *record = DriverSnapshot {
                name: descriptor.entry.name,
                class: descriptor.entry.class,
                inited: descriptor.inited,
                metrics: descriptor.entry.ops.metrics(),
            };
            snapshot.count += 1;
        }
        snapshot
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.table.lock().len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// One driver as seen by [`DriverRegistry::snapshot`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DriverSnapshot {
    pub name: &'static str,
    pub class: DriverClass,
    pub inited: bool,
    pub metrics: DriverMetrics,
}

impl DriverSnapshot {
    const EMPTY: Self = Self {
        name: "",
        class: DriverClass::Other,
        inited: false,
        metrics: DriverMetrics::ZERO,
    };
}

/// By-value copy of the registry. Later registry changes don't affect it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RegistrySnapshot {
    count: usize,
    records: [DriverSnapshot; MAX_DRIVERS],
}

impl RegistrySnapshot {
    const EMPTY: Self = Self {
        count: 0,
        records: [DriverSnapshot::EMPTY; MAX_DRIVERS],
    };

    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[must_use]
    pub fn records(&self) -> &[DriverSnapshot] {
        &self.records[..self.count]
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<&DriverSnapshot> {
        self.records().iter().find(|r| r.name == name)
    }
}
