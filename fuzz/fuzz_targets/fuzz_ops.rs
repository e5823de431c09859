#![no_main]

use libfuzzer_sys::fuzz_target;

/// Interprets the input as a sequence of allocator operations.
///
/// Each operation is encoded as:
///   byte 0: opcode (0 = allocate, 1 = deallocate)
///   byte 1-2: size (little-endian u16)
///   byte 3: slot index (which tracked pointer to operate on)
///
/// Up to 64 live pointers are tracked; every survivor is freed at the end so
/// a run leaves no pool page behind.
const MAX_SLOTS: usize = 64;

fuzz_target!(|data: &[u8]| {
    let mut slots: [*mut u8; MAX_SLOTS] = [std::ptr::null_mut(); MAX_SLOTS];

    let mut i = 0;
    while i + 4 <= data.len() {
        let opcode = data[i] & 0x01;
        let size = u16::from_le_bytes([data[i + 1], data[i + 2]]) as usize;
        let slot = (data[i + 3] as usize) % MAX_SLOTS;
        i += 4;

        match opcode {
            0 => {
                if !slots[slot].is_null() {
                    unsafe { pagepool::deallocate(slots[slot]) };
                }
                match pagepool::try_allocate(size, 8) {
                    Some(p) => {
                        slots[slot] = p.as_ptr();
                        if size > 0 {
                            unsafe {
                                std::ptr::write_bytes(p.as_ptr(), 0xAA, size.min(256));
                            }
                        }
                    }
                    None => {
                        slots[slot] = std::ptr::null_mut();
                    }
                }
            }
            _ => {
                if !slots[slot].is_null() {
                    unsafe { pagepool::deallocate(slots[slot]) };
                    slots[slot] = std::ptr::null_mut();
                }
            }
        }
    }

    for p in slots.into_iter().filter(|p| !p.is_null()) {
        unsafe { pagepool::deallocate(p) };
    }
});
