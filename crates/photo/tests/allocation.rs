//! Loader allocation behavior, observed through a counting global allocator.
//!
//! Counting is armed per thread so tests running in parallel do not see each
//! other's allocations.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::io::Cursor;

use scroll_core::logging::LogConfig;
use scroll_photo::{read_obj_image_from, read_photo_from, AssetHeader, AssetKind, PhotoError};

struct CountingAllocator;

thread_local! {
    static ARMED: Cell<bool> = const { Cell::new(false) };
    static LARGEST: Cell<usize> = const { Cell::new(0) };
    static NET: Cell<isize> = const { Cell::new(0) };
}

fn record(delta: isize, size: usize) {
    let _ = ARMED.try_with(|armed| {
        if armed.get() {
            let _ = NET.try_with(|net| net.set(net.get() + delta));
            if delta > 0 {
                let _ = LARGEST.try_with(|largest| largest.set(largest.get().max(size)));
            }
        }
    });
}

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc(layout);
        if !ptr.is_null() {
            record(layout.size() as isize, layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        record(-(layout.size() as isize), 0);
        System.dealloc(ptr, layout)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = System.realloc(ptr, layout, new_size);
        if !new_ptr.is_null() {
            record(new_size as isize - layout.size() as isize, new_size);
        }
        new_ptr
    }
}

#[global_allocator]
static ALLOCATOR: CountingAllocator = CountingAllocator;

struct Usage {
    largest: usize,
    net: isize,
}

/// Run `f` with counting armed and report what it allocated.
fn measure<T>(f: impl FnOnce() -> T) -> (T, Usage) {
    // Initialise the logging singleton outside the measured region.
    let _ = LogConfig::global();
    LARGEST.with(|c| c.set(0));
    NET.with(|c| c.set(0));
    ARMED.with(|c| c.set(true));
    let value = f();
    ARMED.with(|c| c.set(false));
    let usage = Usage {
        largest: LARGEST.with(Cell::get),
        net: NET.with(Cell::get),
    };
    (value, usage)
}

fn stream(width: u16, height: u16, payload: usize) -> Cursor<Vec<u8>> {
    let mut bytes = AssetHeader::new(width, height).to_bytes().to_vec();
    bytes.resize(AssetHeader::SIZE + payload, 0);
    Cursor::new(bytes)
}

#[test]
fn test_oversized_photo_allocates_nothing() {
    let mut reader = stream(2000, 10, 2000 * 10 * 2);
    let (result, usage) = measure(|| read_photo_from(&mut reader).map(|_| ()));

    match result {
        Err(PhotoError::Validation {
            kind: AssetKind::Photo,
            width: 2000,
            ..
        }) => {}
        other => panic!("expected Validation error, got {:?}", other),
    }
    assert_eq!(usage.largest, 0, "a pixel buffer was allocated");
    assert_eq!(usage.net, 0, "memory leaked on the error path");
}

#[test]
fn test_oversized_object_allocates_nothing() {
    let mut reader = stream(100, 101, 100 * 101);
    let (result, usage) = measure(|| read_obj_image_from(&mut reader).map(|_| ()));

    assert!(matches!(
        result,
        Err(PhotoError::Validation {
            kind: AssetKind::Object,
            height: 101,
            ..
        })
    ));
    assert_eq!(usage.largest, 0);
    assert_eq!(usage.net, 0);
}

#[test]
fn test_truncated_photo_releases_everything() {
    // Header is valid but only half the pixels are present.
    let mut reader = stream(100, 100, 100 * 100);
    let (short_read, usage) =
        measure(|| matches!(read_photo_from(&mut reader), Err(PhotoError::Io(_))));

    assert!(short_read);
    assert!(usage.largest >= 100 * 100 * 2, "pixel buffer was never reserved");
    assert_eq!(usage.net, 0, "memory leaked on the error path");
}

#[test]
fn test_valid_photo_keeps_only_indices_and_palette() {
    let mut reader = stream(64, 32, 64 * 32 * 2);
    let (photo, usage) = measure(|| read_photo_from(&mut reader).unwrap());

    assert_eq!(photo.pixels().len(), 64 * 32);
    // The 5:6:5 staging buffer and the histogram are gone; what remains is
    // one index per pixel plus 192 three-byte palette entries.
    assert_eq!(usage.net, (64 * 32 + 192 * 3) as isize);
    drop(photo);
}
