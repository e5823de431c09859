//! One-time initialization.
//!
//! The routing table is const-constructed, so init only has to read the
//! configuration and run the startup self-checks that the pointer-recovery
//! scheme depends on. A failed check is not fatal: the allocator falls back
//! to the tagged system-allocator path for everything, which is always
//! correct, just slower.

#[cfg(feature = "log")]
use log::debug;

use crate::config;
use crate::platform;
use crate::pool::FIRST_SLOT_OFFSET;
use crate::size_class::SMALL_THRESHOLD;
use core::sync::atomic::{AtomicU8, Ordering};

const UNINIT: u8 = 0;
const INITIALIZING: u8 = 1;
const READY: u8 = 2;
const DISABLED: u8 = 3;

static STATE: AtomicU8 = AtomicU8::new(UNINIT);

/// Run init exactly once; later calls are a single atomic load. Safe to call
/// from any thread; concurrent callers wait until the winner finishes.
pub fn ensure_initialized() {
    if STATE.load(Ordering::Acquire) != UNINIT {
        return;
    }
    initialize();
}

#[cold]
#[inline(never)]
fn initialize() {
    match STATE.compare_exchange(UNINIT, INITIALIZING, Ordering::AcqRel, Ordering::Acquire) {
        Ok(_) => {}
        Err(_) => {
            while STATE.load(Ordering::Acquire) == INITIALIZING {
                core::hint::spin_loop();
            }
            return;
        }
    }

    unsafe {
        config::read_config();
    }

    if config::pools_disabled() || !platform_supports_pools() {
        debug!("pagepool: pool path disabled, forwarding everything to the system heap");
        STATE.store(DISABLED, Ordering::Release);
        return;
    }

    debug!(
        "pagepool: ready, page size {} bytes",
        platform::page_size()
    );
    STATE.store(READY, Ordering::Release);
}

/// Startup self-check for the pointer-recovery scheme: pointer masking needs
/// a power-of-two page that fits the header plus at least one slot of the
/// largest class.
fn platform_supports_pools() -> bool {
    let page = platform::page_size();
    page.is_power_of_two() && page >= FIRST_SLOT_OFFSET + SMALL_THRESHOLD
}

/// Whether requests may be served from pools. False before init and in the
/// disabled fallback.
#[inline]
pub fn pools_enabled() -> bool {
    STATE.load(Ordering::Acquire) == READY
}
