//! C entry points over the process-wide allocator, shaped after the
//! `malloc` family. Failures return null and leave `errno` set.

use std::{
  ffi::{CStr, c_char, c_int, c_void},
  ptr::{self, NonNull},
};

use log::warn;

use crate::{error::AllocError, global, policy::FitPolicy};

fn set_errno(code: c_int) {
  #[cfg(any(target_os = "linux", target_os = "android"))]
  unsafe {
    *libc::__errno_location() = code;
  }
  #[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd"))]
  unsafe {
    *libc::__error() = code;
  }
}

fn into_raw(result: Result<Option<NonNull<u8>>, AllocError>) -> *mut c_void {
  match result {
    Ok(Some(data)) => data.as_ptr() as *mut c_void,
    Ok(None) => ptr::null_mut(),
    Err(err) => {
      set_errno(err.errno());
      ptr::null_mut()
    }
  }
}

#[unsafe(no_mangle)]
pub extern "C" fn brk_malloc(size: usize) -> *mut c_void {
  into_raw(global::allocate(size))
}

/// # Safety
///
/// `ptr` must be null or come from one of the `brk_*` allocation functions.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn brk_free(ptr: *mut c_void) {
  unsafe { global::release(NonNull::new(ptr as *mut u8)) }
}

#[unsafe(no_mangle)]
pub extern "C" fn brk_calloc(
  count: usize,
  element_size: usize,
) -> *mut c_void {
  into_raw(global::allocate_zeroed(count, element_size))
}

/// # Safety
///
/// Same contract as [`brk_free`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn brk_realloc(
  ptr: *mut c_void,
  size: usize,
) -> *mut c_void {
  into_raw(unsafe { global::resize(NonNull::new(ptr as *mut u8), size) })
}

/// # Safety
///
/// `text` must be null or point to a nul terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn brk_strdup(text: *const c_char) -> *mut c_char {
  if text.is_null() {
    return ptr::null_mut();
  }

  let text = unsafe { CStr::from_ptr(text) };
  into_raw(global::duplicate_string(text).map(Some)) as *mut c_char
}

#[unsafe(no_mangle)]
pub extern "C" fn brk_set_min(size: usize) -> usize {
  global::set_chunk_size(size)
}

/// Unknown values fall back to first fit.
#[unsafe(no_mangle)]
pub extern "C" fn brk_set_algorithm(algorithm: c_int) {
  let policy = FitPolicy::try_from(algorithm).unwrap_or_else(|raw| {
    warn!("fit algorithm {raw} not recognized, using first fit");
    FitPolicy::FirstFit
  });
  global::set_fit_policy(policy);
}

#[unsafe(no_mangle)]
pub extern "C" fn brk_set_verbose(verbose: u8) {
  global::set_verbose(verbose != 0);
}

#[unsafe(no_mangle)]
pub extern "C" fn brk_reset() {
  global::reset();
}

/// Prints the heap map to the log target, addresses relative to `base`.
#[unsafe(no_mangle)]
pub extern "C" fn brk_dump(base: *const c_void) {
  if let Err(err) = global::dump_report(base as *const u8) {
    warn!("heap map not written: {err}");
  }
}
