//! The public allocation façade.

use crate::dispatcher;
use crate::init;
use crate::large;
use crate::platform;
use crate::pool;
use crate::size_class;
use crate::{AllocError, AllocResult};
use core::ptr::NonNull;

/// Allocate `size` bytes aligned to `align`.
///
/// Sizes up to the small threshold come from a pool of the matching class;
/// larger or over-aligned requests are forwarded to the system allocator.
/// A zero `size` is served from the minimum slot class, so every call yields
/// a distinct pointer.
///
/// # Errors
/// [`AllocError::InvalidParam`] when `align` is zero or not a power of two,
/// or when `size` is so large that the tag prefix would wrap it;
/// [`AllocError::NoMemory`] when the system is out of memory.
pub fn allocate(size: usize, align: usize) -> AllocResult<NonNull<u8>> {
    if align == 0 || !align.is_power_of_two() {
        return Err(AllocError::InvalidParam);
    }
    // Worst-case tag prefix for this alignment; a size this close to
    // usize::MAX cannot be served by any path.
    if size.checked_add(large::TAG_SIZE.max(align)).is_none() {
        return Err(AllocError::InvalidParam);
    }
    init::ensure_initialized();
    let ptr = unsafe { dispatcher::global().allocate(size, align) };
    NonNull::new(ptr).ok_or(AllocError::NoMemory)
}

/// Like [`allocate`], but reports every failure as `None`.
pub fn try_allocate(size: usize, align: usize) -> Option<NonNull<u8>> {
    allocate(size, align).ok()
}

/// Release an allocation. Null is a no-op. Infallible.
///
/// # Safety
/// A non-null `ptr` must have been returned by this allocator and not freed
/// since. Passing any other pointer is undefined behavior.
pub unsafe fn deallocate(ptr: *mut u8) {
    if ptr.is_null() {
        return;
    }
    dispatcher::global().deallocate(ptr);
}

/// The system page size backing the pools.
pub fn page_size() -> usize {
    platform::page_size()
}

/// Number of slots per pool in the class that would serve a `size`-byte
/// request, or `None` when such a request bypasses the pools.
pub fn pool_capacity(size: usize) -> Option<usize> {
    size_class::normalize(size, 1).map(pool::capacity_for)
}

/// Number of live pool pages in the class serving `size`-byte requests, or
/// `None` when such a request bypasses the pools.
pub fn pool_count(size: usize) -> Option<usize> {
    let slot_size = size_class::normalize(size, 1)?;
    Some(dispatcher::global().class_pool_count(size_class::class_index(slot_size)))
}

/// Whether the class serving `size`-byte requests currently holds a
/// fast-path pool hint.
pub fn has_cached_pool(size: usize) -> Option<bool> {
    let slot_size = size_class::normalize(size, 1)?;
    Some(dispatcher::global().class_has_cached_pool(size_class::class_index(slot_size)))
}

/// Slot size of the pool that owns `ptr`, or `None` for a system-allocated
/// pointer.
///
/// # Safety
/// `ptr` must be a live pointer returned by this allocator.
pub unsafe fn owning_size_class(ptr: *mut u8) -> Option<usize> {
    if ptr.is_null() || large::is_tagged(ptr) {
        return None;
    }
    let header = pool::header_of(ptr);
    debug_assert!((*header).has_valid_tag());
    Some((*header).slot_size())
}
