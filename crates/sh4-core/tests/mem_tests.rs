// Paged memory: mirroring, unmapped defaults, handler dispatch.

use std::cell::RefCell;
use std::rc::Rc;

use sh4_core::sh4mem::{MapMode, Memory};

#[test]
fn mapped_read_write_all_widths() {
    let mut backing = vec![0u8; 0x2000];
    let mut mem = Memory::new();
    mem.map_memory(backing.as_mut_ptr(), 0x1000_0000, 0x1000_1FFF, MapMode::READ_WRITE);

    mem.write8(0x1000_0000, 0xAB);
    mem.write16(0x1000_0010, 0x1234);
    mem.write32(0x1000_0020, 0xDEAD_BEEF);
    mem.write64(0x1000_0030, 0x0102_0304_0506_0708);

    assert_eq!(mem.read8(0x1000_0000), 0xAB);
    assert_eq!(mem.read16(0x1000_0010), 0x1234);
    assert_eq!(mem.read32(0x1000_0020), 0xDEAD_BEEF);
    assert_eq!(mem.read64(0x1000_0030), 0x0102_0304_0506_0708);

    // Native byte order in the backing store.
    assert_eq!(backing[0x20], 0xEF);
    assert_eq!(backing[0x23], 0xDE);
}

#[test]
fn mirrored_ranges_share_backing() {
    let mut backing = vec![0u8; 0x1000];
    let mut mem = Memory::new();
    // The same physical page decoded at eight different bases.
    for i in 0..8u32 {
        let base = 0x2000_0000u32.wrapping_mul(i);
        mem.map_memory(backing.as_mut_ptr(), base, base + 0xFFF, MapMode::READ_WRITE);
    }

    mem.write32(0x0000_0040, 0xCAFE_F00D);
    for i in 0..8u32 {
        let base = 0x2000_0000u32.wrapping_mul(i);
        assert_eq!(
            mem.read32(base + 0x40),
            0xCAFE_F00D,
            "mirror {i} sees the write"
        );
    }

    mem.write32(0xE000_0044, 0x1111_2222);
    assert_eq!(mem.read32(0x0000_0044), 0x1111_2222);
}

#[test]
fn unmapped_access_is_harmless() {
    let mut mem = Memory::new();
    assert_eq!(mem.read8(0x4000_0000), 0);
    assert_eq!(mem.read16(0x4000_0000), 0);
    assert_eq!(mem.read32(0x4000_0000), 0);
    assert_eq!(mem.read64(0x4000_0000), 0);
    // Writes are dropped, not faults.
    mem.write32(0x4000_0000, 0xFFFF_FFFF);
    assert_eq!(mem.read32(0x4000_0000), 0);
}

#[test]
fn handler_backed_page_without_handler_reads_zero() {
    let mut mem = Memory::new();
    mem.map_read32_handler(5, 0xFC00_0000, 0xFC00_FFFF);
    mem.map_write32_handler(5, 0xFC00_0000, 0xFC00_FFFF);
    // Probing before the device model is wired up must keep running.
    assert_eq!(mem.read32(0xFC00_0010), 0);
    mem.write32(0xFC00_0010, 1);
}

#[test]
fn read_handler_dispatch() {
    let mut mem = Memory::new();
    mem.map_read32_handler(1, 0xFF00_0000, 0xFF00_FFFF);
    mem.set_read32_handler(1, Box::new(|addr| addr ^ 0xFFFF_FFFF));

    assert_eq!(mem.read32(0xFF00_0028), 0xFF00_0028 ^ 0xFFFF_FFFF);
    // Other widths on the same pages stay unmapped.
    assert_eq!(mem.read8(0xFF00_0028), 0);
}

#[test]
fn write_handler_side_effects() {
    let mut mem = Memory::new();
    let writes: Rc<RefCell<Vec<(u32, u32)>>> = Rc::new(RefCell::new(Vec::new()));

    mem.map_write32_handler(2, 0xA050_0000, 0xA050_0FFF);
    let log = writes.clone();
    mem.set_write32_handler(
        2,
        Box::new(move |addr, value| log.borrow_mut().push((addr, value))),
    );

    mem.write32(0xA050_0004, 7);
    mem.write32(0xA050_0008, 9);
    assert_eq!(&*writes.borrow(), &[(0xA050_0004, 7), (0xA050_0008, 9)]);
}

#[test]
fn handler_overrides_only_requested_direction() {
    let mut backing = vec![0u8; 0x1000];
    let mut mem = Memory::new();
    mem.map_memory(backing.as_mut_ptr(), 0x0800_0000, 0x0800_0FFF, MapMode::READ_WRITE);
    mem.map_read32_handler(3, 0x0800_0000, 0x0800_0FFF);
    mem.set_read32_handler(3, Box::new(|_| 0x5555_5555));

    // Reads go through the handler, writes still hit the backing memory.
    mem.write32(0x0800_0000, 0x1234_5678);
    assert_eq!(mem.read32(0x0800_0000), 0x5555_5555);
    assert_eq!(backing[0], 0x78);
    assert_eq!(mem.read8(0x0800_0000), 0x78);
}

#[test]
fn read_only_mapping_drops_writes() {
    let mut backing = vec![0u8; 0x1000];
    backing[0] = 0x42;
    let mut mem = Memory::new();
    mem.map_memory(backing.as_mut_ptr(), 0, 0xFFF, MapMode::READ);

    assert_eq!(mem.read8(0), 0x42);
    mem.write8(0, 0x99);
    assert_eq!(mem.read8(0), 0x42, "write to a read-only page is a no-op");
}

#[test]
fn unmap_restores_default_behavior() {
    let mut backing = vec![0u8; 0x1000];
    let mut mem = Memory::new();
    mem.map_memory(backing.as_mut_ptr(), 0, 0xFFF, MapMode::READ_WRITE);
    mem.write32(0, 0xABCD_EF01);
    assert_eq!(mem.read32(0), 0xABCD_EF01);

    mem.unmap_memory(0, 0xFFF);
    assert_eq!(mem.read32(0), 0);
    mem.write32(0, 0x5555_5555);
    assert_eq!(backing[0], 0x01, "unmapped write no longer reaches backing");
}
