//! Net-allocation sampling for the memory-delta measurement.
//!
//! Managed runtimes sample heap size around a forced garbage collection; the
//! Rust rendition is a counting wrapper over the system allocator. The binary
//! installs [`TrackingAllocator`] as the `#[global_allocator]`, and the
//! runner reads [`net_allocated_bytes`] immediately before a query is issued
//! and immediately after the last field access.
//!
//! The absolute byte counts are environment-dependent and noisy; only the
//! relative ordering between strategies is meaningful. When the allocator is
//! not installed (library consumers, most tests) the counters stay at zero
//! and every delta reads as zero.

use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicU64, Ordering};

static ALLOCATED: AtomicU64 = AtomicU64::new(0);
static DEALLOCATED: AtomicU64 = AtomicU64::new(0);

/// A `GlobalAlloc` that delegates to [`System`] while keeping running totals
/// of bytes allocated and freed.
pub struct TrackingAllocator;

unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            ALLOCATED.fetch_add(layout.size() as u64, Ordering::Relaxed);
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc_zeroed(layout) };
        if !ptr.is_null() {
            ALLOCATED.fetch_add(layout.size() as u64, Ordering::Relaxed);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) };
        DEALLOCATED.fetch_add(layout.size() as u64, Ordering::Relaxed);
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = unsafe { System.realloc(ptr, layout, new_size) };
        if !new_ptr.is_null() {
            DEALLOCATED.fetch_add(layout.size() as u64, Ordering::Relaxed);
            ALLOCATED.fetch_add(new_size as u64, Ordering::Relaxed);
        }
        new_ptr
    }
}

/// Bytes currently allocated minus bytes freed since process start.
///
/// Signed: sampling points can land so that frees outnumber allocations
/// between them.
pub fn net_allocated_bytes() -> i64 {
    let allocated = ALLOCATED.load(Ordering::Relaxed);
    let deallocated = DEALLOCATED.load(Ordering::Relaxed);
    allocated as i64 - deallocated as i64
}
