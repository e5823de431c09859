//! Install the allocator as `#[global_allocator]` and drive it through
//! ordinary Rust collections. Lives in its own binary so every heap
//! operation in the process goes through the pool dispatcher.

use pagepool::PagePool;

#[global_allocator]
static GLOBAL: PagePool = PagePool;

#[test]
fn collections_allocate_and_free() {
    let b = Box::new(42u64);
    assert_eq!(*b, 42);
    drop(b);

    let mut v: Vec<u32> = Vec::new();
    for i in 0..1000 {
        v.push(i);
    }
    assert_eq!(v.len(), 1000);
    assert_eq!(v[999], 999);
    drop(v);

    let s = String::from("hello, pagepool global allocator!");
    assert_eq!(s, "hello, pagepool global allocator!");
    drop(s);
}

#[test]
fn zero_sized_elements_cost_nothing() {
    let mut v: Vec<()> = Vec::new();
    for _ in 0..100 {
        v.push(());
    }
    assert_eq!(v.len(), 100);

    let empty: Vec<u8> = Vec::new();
    assert_eq!(empty.len(), 0);
}

#[test]
fn vec_growth_reallocates_without_losing_data() {
    let mut v: Vec<u8> = Vec::with_capacity(16);
    for i in 0u8..200 {
        v.push(i);
    }
    for i in 0u8..200 {
        assert_eq!(v[i as usize], i);
    }
}

#[test]
fn over_aligned_layouts_keep_their_alignment() {
    use std::alloc::{alloc, alloc_zeroed, dealloc, realloc, Layout};

    unsafe {
        let layout = Layout::from_size_align(64, 128).unwrap();
        let ptr = alloc(layout);
        assert!(!ptr.is_null());
        assert_eq!(ptr as usize % 128, 0, "not 128-byte aligned: {:p}", ptr);
        core::ptr::write(ptr, 0xAB);

        let new_ptr = realloc(ptr, layout, 256);
        assert!(!new_ptr.is_null());
        assert_eq!(new_ptr as usize % 128, 0, "realloc lost alignment");
        assert_eq!(core::ptr::read(new_ptr), 0xAB, "realloc lost data");
        dealloc(new_ptr, Layout::from_size_align(256, 128).unwrap());

        let layout = Layout::from_size_align(512, 128).unwrap();
        let zeroed = alloc_zeroed(layout);
        assert!(!zeroed.is_null());
        let slice = core::slice::from_raw_parts(zeroed, 512);
        assert!(slice.iter().all(|&b| b == 0));
        dealloc(zeroed, layout);
    }
}

#[test]
fn small_and_large_collections_interleave() {
    let mut boxes: Vec<Box<[u8; 24]>> = Vec::new();
    let mut buffers: Vec<Vec<u8>> = Vec::new();
    for i in 0..50 {
        boxes.push(Box::new([i as u8; 24]));
        buffers.push(vec![i as u8; 1024]);
    }
    for (i, (b, buf)) in boxes.iter().zip(&buffers).enumerate() {
        assert!(b.iter().all(|&x| x == i as u8));
        assert!(buf.iter().all(|&x| x == i as u8));
    }
}
