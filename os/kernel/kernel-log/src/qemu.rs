//! QEMU `-debugcon` sink.
//!
//! QEMU captures every byte written to I/O port `0x402` and forwards it to
//! the host (`-debugcon stdio`, `-debugcon file:debug.log`). On real hardware
//! the port is normally unused and the writes are dropped.

use core::fmt::{self, Write};

/// The port number for QEMU's debug port.
const QEMU_DEBUG_PORT: u16 = 0x402;

/// Write to QEMU's port.
#[allow(clippy::inline_always)]
#[inline(always)]
unsafe fn outb(port: u16, val: u8) {
    unsafe {
        core::arch::asm!(
        "out dx, al",
        in("dx") port,
        in("al") val,
        options(nomem, nostack, preserves_flags)
        );
    }
}

/// [`LogSink`](crate::LogSink) writing byte by byte to the QEMU debug port.
///
/// Requires CPL0 (or an I/O permission bitmap granting the port).
#[derive(Debug, Default, Copy, Clone)]
pub struct QemuDebugSink;

impl Write for QemuDebugSink {
    #[inline]
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for b in s.bytes() {
            unsafe { outb(QEMU_DEBUG_PORT, b) }
        }
        Ok(())
    }
}
