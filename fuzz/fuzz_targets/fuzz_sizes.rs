#![no_main]

use libfuzzer_sys::fuzz_target;

// Exercises size and alignment boundaries: interprets the input as a series
// of (size, alignment_shift) pairs, allocates, writes the full extent,
// verifies alignment and the routing introspection, and frees.

fuzz_target!(|data: &[u8]| {
    let mut i = 0;
    while i + 4 <= data.len() {
        let raw_size = u16::from_le_bytes([data[i], data[i + 1]]) as usize;
        let align_shift = (data[i + 2] % 13) as u32; // alignments 1 .. 4096
        i += 4;

        let size = raw_size % (64 * 1024);
        let align = 1usize << align_shift;

        let ptr = match pagepool::try_allocate(size, align) {
            Some(p) => p.as_ptr(),
            None => continue, // OOM is fine
        };

        assert_eq!(
            ptr as usize % align,
            0,
            "allocate({}, {}) returned unaligned pointer {:p}",
            size,
            align,
            ptr
        );

        // The whole requested extent must be writable.
        unsafe {
            std::ptr::write_bytes(ptr, 0xBB, size);
        }
        for j in (0..size).step_by(997) {
            assert_eq!(unsafe { *ptr.add(j) }, 0xBB);
        }

        // Routing introspection must agree with the request shape.
        let class = unsafe { pagepool::owning_size_class(ptr) };
        if size > pagepool::size_class::SMALL_THRESHOLD || align > 16 {
            assert_eq!(class, None, "large request was pooled");
        } else {
            let slot = class.expect("small request missed the pools");
            assert!(slot >= size && slot % align == 0);
        }

        unsafe { pagepool::deallocate(ptr) };
    }
});
