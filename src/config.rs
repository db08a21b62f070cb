use crate::{
  align::{ALIGNMENT, checked_align},
  block::HEADER_SIZE,
  policy::FitPolicy,
};

/// Growth unit used until `set_chunk_size` says otherwise.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Absolute lower bound for the growth unit.
pub const MIN_CHUNK_SIZE: usize = 128;

/// The smallest chunk size the allocator accepts.
pub const fn chunk_size_floor() -> usize {
  let twice_header = HEADER_SIZE + HEADER_SIZE;
  if twice_header > MIN_CHUNK_SIZE {
    twice_header
  } else {
    MIN_CHUNK_SIZE
  }
}

/// Raises silly small values to the floor and keeps the result a multiple
/// of the data alignment. `0` is left alone; callers treat it as a query.
pub fn clamp_chunk_size(size: usize) -> usize {
  if size == 0 {
    return 0;
  }

  let size = size.max(chunk_size_floor());
  checked_align(size, ALIGNMENT).unwrap_or(size & !(ALIGNMENT - 1))
}

/// Per instance tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocatorConfig {
  /// Every growth of the region is a multiple of this many bytes.
  pub chunk_size: usize,
  pub fit_policy: FitPolicy,
  /// Write human readable diagnostics to the log target.
  pub verbose: bool,
}

impl AllocatorConfig {
  pub const fn new() -> Self {
    Self {
      chunk_size: DEFAULT_CHUNK_SIZE,
      fit_policy: FitPolicy::NextFit,
      verbose: false,
    }
  }

  pub fn with_chunk_size(
    mut self,
    chunk_size: usize,
  ) -> Self {
    if chunk_size != 0 {
      self.chunk_size = clamp_chunk_size(chunk_size);
    }
    self
  }

  pub fn with_fit_policy(
    mut self,
    fit_policy: FitPolicy,
  ) -> Self {
    self.fit_policy = fit_policy;
    self
  }

  pub fn with_verbose(
    mut self,
    verbose: bool,
  ) -> Self {
    self.verbose = verbose;
    self
  }
}

impl Default for AllocatorConfig {
  fn default() -> Self {
    Self::new()
  }
}
