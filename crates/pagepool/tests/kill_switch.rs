//! The PAGEPOOL_DISABLE kill switch reroutes everything to the tagged
//! system-allocator path. This lives in its own binary because the switch is
//! latched once per process at first use.

use pagepool::large::{MALLOC_SENTINEL, TAG_SIZE};

#[test]
fn disabled_allocator_forwards_everything_to_the_system_heap() {
    // Set before the first allocator call in this process; init latches it.
    std::env::set_var("PAGEPOOL_DISABLE", "1");

    for size in [0usize, 8, 24, 128, 129, 4096] {
        let p = pagepool::allocate(size, 8).unwrap().as_ptr();
        unsafe {
            let mut mark = [0u8; 8];
            core::ptr::copy_nonoverlapping(p.sub(TAG_SIZE), mark.as_mut_ptr(), 8);
            assert_eq!(mark, MALLOC_SENTINEL, "size {} was not forwarded", size);
            assert_eq!(pagepool::owning_size_class(p), None);
            pagepool::deallocate(p);
        }
    }

    // No pool page was ever mapped.
    assert_eq!(pagepool::pool_count(8), Some(0));
    assert_eq!(pagepool::pool_count(128), Some(0));
}
