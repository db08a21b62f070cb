use std::io;

use thiserror::Error;

/// Failures surfaced by the allocation entry points.
///
/// Zero sized requests and absent pointers are not errors; they are answered
/// with `Ok(None)` or ignored.
#[derive(Debug, Error)]
pub enum AllocError {
  /// The host refused to grow the managed region. Every existing allocation
  /// is still valid.
  #[error("out of memory while reserving room for {requested} bytes: {source}")]
  OutOfMemory {
    requested: usize,
    #[source]
    source: io::Error,
  },

  /// `count * element_size` does not fit in a `usize`.
  #[error("zeroed allocation of {count} elements of {element_size} bytes overflows")]
  Overflow { count: usize, element_size: usize },

  /// Something other than this allocator moved the region boundary since
  /// the last growth, so the new span would not follow the last block.
  #[error("region boundary moved by a foreign party: expected {expected:#x}, found {found:#x}")]
  Discontiguous { expected: usize, found: usize },
}

impl AllocError {
  pub(crate) fn out_of_memory(requested: usize) -> Self {
    AllocError::OutOfMemory {
      requested,
      source: io::Error::from(io::ErrorKind::OutOfMemory),
    }
  }

  /// The `errno` value the C entry points report for this error.
  pub fn errno(&self) -> i32 {
    match self {
      AllocError::OutOfMemory { source, .. } => source.raw_os_error().unwrap_or(libc::ENOMEM),
      AllocError::Overflow { .. } | AllocError::Discontiguous { .. } => libc::ENOMEM,
    }
  }
}
