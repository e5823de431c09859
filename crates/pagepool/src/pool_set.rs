//! One [`SizedPoolSet`] per size class: the illusion of an unbounded supply
//! of slots of one fixed size, built from pools created lazily and released
//! the moment they empty.

#[cfg(feature = "log")]
use log::trace;

use crate::pool::{self, PoolHeader};
use crate::sync::Mutex;
use core::ptr;

/// State guarded by the per-class lock.
///
/// `head` is an address-ordered intrusive list (linked through
/// `PoolHeader::next`) of every pool with at least one free slot, so the list
/// head is always the minimum-address candidate. `cached` is the most
/// recently used non-full pool; it is always either null or a member of the
/// list, and is only read or written under the lock.
struct PoolSetInner {
    head: *mut PoolHeader,
    cached: *mut PoolHeader,
    /// Live pools of this class, full ones included.
    pools: usize,
}

unsafe impl Send for PoolSetInner {}

/// All pools of one slot-size class.
pub struct SizedPoolSet {
    inner: Mutex<PoolSetInner>,
}

impl SizedPoolSet {
    #[allow(clippy::new_without_default)]
    pub const fn new() -> Self {
        SizedPoolSet {
            inner: Mutex::new(PoolSetInner {
                head: ptr::null_mut(),
                cached: ptr::null_mut(),
                pools: 0,
            }),
        }
    }

    /// Hand out one slot, creating a pool if none has room.
    /// Returns null only when the system refuses a new page.
    ///
    /// # Safety
    /// `slot_size` must be the normalized slot size of this class and the
    /// same value on every call.
    pub unsafe fn allocate(&self, slot_size: usize) -> *mut u8 {
        let mut inner = self.inner.lock();

        let mut target = if !inner.cached.is_null() {
            inner.cached
        } else {
            inner.head
        };

        if target.is_null() {
            // The page acquisition happens outside the lock; other threads
            // may allocate (or create their own pool) meanwhile.
            drop(inner);
            let fresh = pool::create(slot_size);
            if fresh.is_null() {
                return ptr::null_mut();
            }
            trace!(
                "pagepool: mapped pool page {:p} for {}-byte slots",
                fresh,
                slot_size
            );
            inner = self.inner.lock();
            Self::insert_sorted(&mut inner, fresh);
            inner.pools += 1;
            target = fresh;
        }

        // Every pool reachable from the list or the hint has a free slot.
        let slot = (*target).allocate();
        debug_assert!(!slot.is_null());

        if (*target).is_full() {
            Self::unlink(&mut inner, target);
            inner.cached = inner.head;
        } else {
            inner.cached = target;
        }
        slot
    }

    /// Return a slot to its pool; release the page when it empties.
    ///
    /// # Safety
    /// `ptr` must have been produced by [`allocate`] on this set and not
    /// already returned.
    pub unsafe fn deallocate(&self, ptr: *mut u8) {
        let header = pool::header_of(ptr);
        let mut inner = self.inner.lock();

        if (*header).occupied() == 1 {
            // Last live slot: the pool empties, give the page back.
            (*header).deallocate(ptr);
            Self::unlink(&mut inner, header);
            inner.pools -= 1;
            inner.cached = inner.head;
            drop(inner);
            trace!("pagepool: released empty pool page {:p}", header);
            pool::destroy(header);
            return;
        }

        let was_full = (*header).is_full();
        (*header).deallocate(ptr);
        if was_full {
            Self::insert_sorted(&mut inner, header);
        }
        inner.cached = header;
    }

    /// Number of live pools of this class (full ones included).
    pub fn pool_count(&self) -> usize {
        self.inner.lock().pools
    }

    /// Whether the fast-path hint currently points at a pool.
    pub fn has_cached_pool(&self) -> bool {
        !self.inner.lock().cached.is_null()
    }

    /// Splice `pool` into the non-full list, keeping it address-ordered.
    unsafe fn insert_sorted(inner: &mut PoolSetInner, pool: *mut PoolHeader) {
        let mut cursor: *mut *mut PoolHeader = &mut inner.head;
        while !(*cursor).is_null() && *cursor < pool {
            cursor = &mut (**cursor).next;
        }
        (*pool).next = *cursor;
        *cursor = pool;
    }

    /// Remove `pool` from the non-full list if present. A pool that filled up
    /// with capacity 1 was never in the list, so absence is tolerated.
    unsafe fn unlink(inner: &mut PoolSetInner, pool: *mut PoolHeader) {
        let mut cursor: *mut *mut PoolHeader = &mut inner.head;
        while !(*cursor).is_null() {
            if *cursor == pool {
                *cursor = (*pool).next;
                (*pool).next = ptr::null_mut();
                return;
            }
            cursor = &mut (**cursor).next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::size_class;

    #[test]
    fn pools_appear_on_demand_and_vanish_when_drained() {
        let set = SizedPoolSet::new();
        let slot_size = 40;
        unsafe {
            let capacity = pool::capacity_for(slot_size);
            let mut slots = Vec::with_capacity(capacity + 1);
            for _ in 0..capacity + 1 {
                let p = set.allocate(slot_size);
                assert!(!p.is_null());
                slots.push(p);
            }
            // The spill allocation forced a second page.
            assert_eq!(set.pool_count(), 2);

            for p in slots.drain(..) {
                set.deallocate(p);
            }
            assert_eq!(set.pool_count(), 0);
            assert!(!set.has_cached_pool());
        }
    }

    #[test]
    fn refilled_pool_rejoins_the_candidates() {
        let set = SizedPoolSet::new();
        let slot_size = size_class::SMALL_THRESHOLD;
        unsafe {
            let capacity = pool::capacity_for(slot_size);
            let mut slots: Vec<*mut u8> = (0..capacity).map(|_| set.allocate(slot_size)).collect();
            assert!(slots.iter().all(|p| !p.is_null()));

            // Full pool left the candidate list; freeing one slot brings it
            // back and the freed slot is the next handed out.
            let freed = slots.pop().unwrap();
            set.deallocate(freed);
            let again = set.allocate(slot_size);
            assert_eq!(again, freed);
            slots.push(again);

            for p in slots {
                set.deallocate(p);
            }
            assert_eq!(set.pool_count(), 0);
        }
    }
}
