//! The system services the allocator consumes: page-aligned page mappings,
//! the page-size query, and the malloc/free pair backing the large path.

#[cfg(target_os = "linux")]
pub mod linux;
#[cfg(target_os = "linux")]
pub use linux as sys;

#[cfg(target_os = "macos")]
pub mod macos;
#[cfg(target_os = "macos")]
pub use macos as sys;

use core::ptr;
use core::sync::atomic::{AtomicUsize, Ordering};

static PAGE_SIZE: AtomicUsize = AtomicUsize::new(0);

/// The system page size, queried once and cached.
#[inline]
pub fn page_size() -> usize {
    let cached = PAGE_SIZE.load(Ordering::Relaxed);
    if cached != 0 {
        return cached;
    }
    let size = sys::query_page_size();
    PAGE_SIZE.store(size, Ordering::Relaxed);
    size
}

/// Mask that truncates any address to its page base.
#[inline]
pub fn page_mask() -> usize {
    !(page_size() - 1)
}

/// Map one page of anonymous read-write memory. The mapping is page-aligned
/// by construction. Returns null on failure.
#[inline]
pub unsafe fn map_page() -> *mut u8 {
    sys::map_anonymous(page_size())
}

/// Return a page previously obtained from [`map_page`].
///
/// # Safety
/// `page` must have been returned by `map_page` and must not be referenced
/// afterwards.
#[inline]
pub unsafe fn unmap_page(page: *mut u8) {
    sys::unmap(page, page_size());
}

/// System heap allocation for the large path.
///
/// # Safety
/// Plain `malloc`; the caller owns the result.
#[inline]
pub unsafe fn heap_alloc(size: usize) -> *mut u8 {
    libc::malloc(size) as *mut u8
}

/// System heap allocation with alignment stricter than `malloc` guarantees.
///
/// # Safety
/// `align` must be a power of two and at least the pointer size. The result
/// is released with [`heap_free`].
pub unsafe fn heap_alloc_aligned(align: usize, size: usize) -> *mut u8 {
    let mut out: *mut libc::c_void = ptr::null_mut();
    if libc::posix_memalign(&mut out, align, size) != 0 {
        return ptr::null_mut();
    }
    out as *mut u8
}

/// Release memory obtained from [`heap_alloc`] or [`heap_alloc_aligned`].
///
/// # Safety
/// `ptr` must be a base pointer returned by one of the heap allocation
/// functions above.
#[inline]
pub unsafe fn heap_free(ptr: *mut u8) {
    libc::free(ptr as *mut libc::c_void);
}
