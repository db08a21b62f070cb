//! The process-wide allocator over the program break.
//!
//! Every entry point takes the same lock, so the block list, the cursor and
//! the break are only ever touched by one caller at a time.

use std::{
  ffi::CStr,
  io::{self, Write},
  ptr::NonNull,
  sync::{Mutex, MutexGuard, PoisonError},
};

use crate::{
  allocator::FreeListAllocator, error::AllocError, policy::FitPolicy, region::SbrkRegion,
  report::HeapStats,
};

static HEAP: Mutex<FreeListAllocator<SbrkRegion>> = Mutex::new(FreeListAllocator::new(SbrkRegion));

fn heap() -> MutexGuard<'static, FreeListAllocator<SbrkRegion>> {
  HEAP.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn allocate(size: usize) -> Result<Option<NonNull<u8>>, AllocError> {
  heap().allocate(size)
}

/// # Safety
///
/// `ptr` must come from this module and not have been reset away.
pub unsafe fn release(ptr: Option<NonNull<u8>>) {
  unsafe { heap().release(ptr) }
}

pub fn allocate_zeroed(
  count: usize,
  element_size: usize,
) -> Result<Option<NonNull<u8>>, AllocError> {
  heap().allocate_zeroed(count, element_size)
}

/// # Safety
///
/// Same contract as [`release`].
pub unsafe fn resize(
  ptr: Option<NonNull<u8>>,
  new_size: usize,
) -> Result<Option<NonNull<u8>>, AllocError> {
  unsafe { heap().resize(ptr, new_size) }
}

pub fn duplicate_string(text: &CStr) -> Result<NonNull<u8>, AllocError> {
  heap().duplicate_string(text)
}

pub fn set_chunk_size(size: usize) -> usize {
  heap().set_chunk_size(size)
}

pub fn set_fit_policy(policy: FitPolicy) {
  heap().set_fit_policy(policy)
}

pub fn set_verbose(verbose: bool) {
  heap().set_verbose(verbose)
}

pub fn set_log_target(target: Option<Box<dyn Write + Send>>) {
  heap().set_log_target(target)
}

pub fn reset() {
  heap().reset()
}

pub fn stats() -> HeapStats {
  heap().stats()
}

pub fn dump_report(base: *const u8) -> io::Result<()> {
  heap().dump_report(base)
}

/// Start of the managed region, or null before the first allocation.
pub fn low_water_mark() -> *const u8 {
  heap().region().low_water_mark()
}
