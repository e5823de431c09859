//! The global dispatcher: one [`SizedPoolSet`] per size class, plus the
//! routing logic that sends each request to the right place and recognizes,
//! at deallocation time, where a pointer came from.

use crate::init;
use crate::large;
use crate::pool;
use crate::pool_set::SizedPoolSet;
use crate::size_class::{self, NUM_SIZE_CLASSES};

/// Process-wide routing table. Const-constructed, so the table itself needs
/// no locking; each class serializes on its own lock.
pub struct GlobalDispatcher {
    classes: [SizedPoolSet; NUM_SIZE_CLASSES],
}

static DISPATCHER: GlobalDispatcher = GlobalDispatcher::new();

/// The process-wide dispatcher instance.
#[inline]
pub fn global() -> &'static GlobalDispatcher {
    &DISPATCHER
}

impl GlobalDispatcher {
    #[allow(clippy::new_without_default)]
    pub const fn new() -> Self {
        const CLASS: SizedPoolSet = SizedPoolSet::new();
        GlobalDispatcher {
            classes: [CLASS; NUM_SIZE_CLASSES],
        }
    }

    /// Route an allocation request. Returns null on exhaustion.
    ///
    /// # Safety
    /// `align` must be a power of two. [`init::ensure_initialized`] must have
    /// run.
    pub unsafe fn allocate(&self, size: usize, align: usize) -> *mut u8 {
        if init::pools_enabled() {
            if let Some(slot_size) = size_class::normalize(size, align) {
                let index = size_class::class_index(slot_size);
                return self.classes[index].allocate(slot_size);
            }
        }
        large::allocate(size, align)
    }

    /// Route a deallocation by inspecting the pointer.
    ///
    /// # Safety
    /// `ptr` must have been returned by [`Self::allocate`] and not freed
    /// since. Anything else is undefined behavior.
    pub unsafe fn deallocate(&self, ptr: *mut u8) {
        if large::is_tagged(ptr) {
            large::deallocate(ptr);
            return;
        }
        let header = pool::header_of(ptr);
        debug_assert!(
            (*header).has_valid_tag(),
            "pointer {:p} does not belong to any pool page",
            ptr
        );
        let index = size_class::class_index((*header).slot_size());
        self.classes[index].deallocate(ptr);
    }

    /// Live pools in the class at `index` (full ones included).
    pub fn class_pool_count(&self, index: usize) -> usize {
        self.classes[index].pool_count()
    }

    /// Whether the class at `index` currently holds a fast-path hint.
    pub fn class_has_cached_pool(&self, index: usize) -> bool {
        self.classes[index].has_cached_pool()
    }
}
