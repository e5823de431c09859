//! Environment configuration, read once at init before any allocation.

use core::sync::atomic::{AtomicBool, Ordering};

static POOLS_DISABLED: AtomicBool = AtomicBool::new(false);

/// Read configuration from the environment.
///
/// # Safety
/// `libc::getenv` is not thread-safe against concurrent `setenv`; call only
/// from the one-time init path.
pub unsafe fn read_config() {
    if getenv_present(b"PAGEPOOL_DISABLE\0") {
        POOLS_DISABLED.store(true, Ordering::Relaxed);
    }
}

/// Kill switch: when set, every request takes the tagged system-allocator
/// path and no pool pages are ever mapped.
pub fn pools_disabled() -> bool {
    POOLS_DISABLED.load(Ordering::Relaxed)
}

unsafe fn getenv_present(key: &[u8]) -> bool {
    !libc::getenv(key.as_ptr() as *const libc::c_char).is_null()
}
