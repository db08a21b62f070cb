use std::{
  alloc::{self, Layout},
  io,
  ptr::{self, NonNull},
};

use libc::{c_void, intptr_t, sbrk};
use log::{debug, warn};

use crate::{align::ALIGNMENT, block::HEADER_SIZE, error::AllocError};

/// The host primitive that hands out memory at the top of a contiguous
/// region, one increment at a time.
pub trait RegionGrower {
  /// Current top of the region.
  fn current_break(&mut self) -> *mut u8;

  /// Moves the top up by `increment` bytes and returns the previous top,
  /// which is where the new span starts.
  ///
  /// # Safety
  ///
  /// The caller takes ownership of the returned span.
  unsafe fn grow(
    &mut self,
    increment: usize,
  ) -> io::Result<*mut u8>;

  /// Moves the top down by `decrement` bytes.
  ///
  /// # Safety
  ///
  /// Nothing may be referencing the span being given back.
  unsafe fn shrink(
    &mut self,
    decrement: usize,
  ) -> io::Result<()>;
}

/// Grows the process data segment through `sbrk(2)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SbrkRegion;

impl RegionGrower for SbrkRegion {
  fn current_break(&mut self) -> *mut u8 {
    unsafe { sbrk(0) as *mut u8 }
  }

  unsafe fn grow(
    &mut self,
    increment: usize,
  ) -> io::Result<*mut u8> {
    let increment =
      intptr_t::try_from(increment).map_err(|_| io::Error::from(io::ErrorKind::OutOfMemory))?;

    let address = unsafe { sbrk(increment) };

    if address == usize::MAX as *mut c_void {
      return Err(io::Error::last_os_error());
    }

    Ok(address as *mut u8)
  }

  unsafe fn shrink(
    &mut self,
    decrement: usize,
  ) -> io::Result<()> {
    let decrement =
      intptr_t::try_from(decrement).map_err(|_| io::Error::from(io::ErrorKind::InvalidInput))?;

    if unsafe { sbrk(-decrement) } == usize::MAX as *mut c_void {
      return Err(io::Error::last_os_error());
    }

    Ok(())
  }
}

/// A fixed span of ordinary heap memory with its own private break.
///
/// Useful where the program break is off limits, and to run several
/// independent allocators side by side.
pub struct BufferRegion {
  base: NonNull<u8>,
  len: usize,
  brk: usize,
}

// Safety: the buffer is owned exclusively by this value.
unsafe impl Send for BufferRegion {}

impl BufferRegion {
  pub fn new(capacity: usize) -> Self {
    let layout = Self::layout(capacity);
    let base = unsafe { alloc::alloc_zeroed(layout) };

    let Some(base) = NonNull::new(base) else {
      alloc::handle_alloc_error(layout);
    };

    Self {
      base,
      len: capacity,
      brk: 0,
    }
  }

  pub fn capacity(&self) -> usize {
    self.len
  }

  /// Bytes handed out so far.
  pub fn used(&self) -> usize {
    self.brk
  }

  fn layout(capacity: usize) -> Layout {
    Layout::from_size_align(capacity.max(ALIGNMENT), ALIGNMENT)
      .unwrap_or_else(|_| Layout::new::<[u8; ALIGNMENT]>())
  }
}

impl Drop for BufferRegion {
  fn drop(&mut self) {
    unsafe { alloc::dealloc(self.base.as_ptr(), Self::layout(self.len)) };
  }
}

impl RegionGrower for BufferRegion {
  fn current_break(&mut self) -> *mut u8 {
    unsafe { self.base.as_ptr().add(self.brk) }
  }

  unsafe fn grow(
    &mut self,
    increment: usize,
  ) -> io::Result<*mut u8> {
    match self.brk.checked_add(increment) {
      Some(top) if top <= self.len => {
        let address = self.current_break();
        self.brk = top;
        Ok(address)
      }
      _ => Err(io::Error::from(io::ErrorKind::OutOfMemory)),
    }
  }

  unsafe fn shrink(
    &mut self,
    decrement: usize,
  ) -> io::Result<()> {
    self.brk = self
      .brk
      .checked_sub(decrement)
      .ok_or_else(|| io::Error::from(io::ErrorKind::InvalidInput))?;
    Ok(())
  }
}

/// Tracks the span of memory the allocator has obtained from a
/// [`RegionGrower`].
///
/// ```text
///   low_water_mark                                   high_water_mark
///   │                                                              │
///   ▼                                                              ▼
///   ┌─────┬────────────┬────────────────┬───────────┬──────────────┐
///   │ pad │ chunk      │ chunk          │ chunk     │ chunk        │
///   └─────┴────────────┴────────────────┴───────────┴──────────────┘
/// ```
pub struct Region<G> {
  grower: G,
  low_water_mark: *mut u8,
  high_water_mark: *mut u8,
}

impl<G: RegionGrower> Region<G> {
  pub const fn new(grower: G) -> Self {
    Self {
      grower,
      low_water_mark: ptr::null_mut(),
      high_water_mark: ptr::null_mut(),
    }
  }

  pub fn low_water_mark(&self) -> *mut u8 {
    self.low_water_mark
  }

  pub fn high_water_mark(&self) -> *mut u8 {
    self.high_water_mark
  }

  pub fn grower(&self) -> &G {
    &self.grower
  }

  /// Bytes between the two water marks.
  pub fn len(&self) -> usize {
    self.high_water_mark as usize - self.low_water_mark as usize
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Records the current boundary as the low water mark, once.
  pub fn mark(&mut self) {
    if self.low_water_mark.is_null() {
      self.low_water_mark = self.grower.current_break();
      self.high_water_mark = self.low_water_mark;
    }
  }

  /// Number of bytes to grow by so that `requested` bytes plus a header
  /// fit, as a whole number of `chunk_size` chunks.
  pub fn chunk_bytes(
    requested: usize,
    chunk_size: usize,
  ) -> Result<usize, AllocError> {
    requested
      .checked_add(HEADER_SIZE)
      .map(|needed| needed.div_ceil(chunk_size))
      .and_then(|chunks| chunks.checked_mul(chunk_size))
      .ok_or_else(|| AllocError::out_of_memory(requested))
  }

  /// Grows the region by `bytes` and returns the aligned start of the new
  /// span. The first growth also pays for aligning the region start.
  ///
  /// On failure the water marks are left untouched.
  ///
  /// # Safety
  ///
  /// The returned span is uninitialised.
  pub unsafe fn extend(
    &mut self,
    bytes: usize,
  ) -> Result<*mut u8, AllocError> {
    self.mark();

    let pad = self.high_water_mark.align_offset(ALIGNMENT);
    let increment = bytes
      .checked_add(pad)
      .ok_or_else(|| AllocError::out_of_memory(bytes))?;

    let base = unsafe { self.grower.grow(increment) }.map_err(|source| {
      AllocError::OutOfMemory {
        requested: bytes,
        source,
      }
    })?;

    if base != self.high_water_mark {
      if !self.is_empty() {
        warn!(
          "region boundary moved from {:p} to {:p} behind our back",
          self.high_water_mark, base
        );

        if self.grower.current_break() == unsafe { base.add(increment) } {
          let _ = unsafe { self.grower.shrink(increment) };
        }

        return Err(AllocError::Discontiguous {
          expected: self.high_water_mark as usize,
          found: base as usize,
        });
      }

      // Nothing of ours lives in the region yet, so follow the boundary.
      self.low_water_mark = base;
    }

    let start = unsafe { base.add(base.align_offset(ALIGNMENT)) };
    let top = unsafe { base.add(increment) };

    if (top as usize) < start as usize + bytes {
      // The boundary moved to a different alignment than the one we
      // padded for; give the span back rather than hand out a short one.
      let _ = unsafe { self.grower.shrink(increment) };
      return Err(AllocError::out_of_memory(bytes));
    }

    self.high_water_mark = top;

    debug!(
      "region grown by {} bytes, now {:p}..{:p}",
      increment, self.low_water_mark, self.high_water_mark
    );

    Ok(start)
  }

  /// Gives the whole region back and forgets both water marks. The
  /// boundary is only lowered when it still sits where we left it.
  ///
  /// # Safety
  ///
  /// No pointer into the region may be used afterwards.
  pub unsafe fn release(&mut self) -> io::Result<()> {
    if self.low_water_mark.is_null() {
      return Ok(());
    }

    let len = self.len();
    let result = if len == 0 {
      Ok(())
    } else if self.grower.current_break() == self.high_water_mark {
      unsafe { self.grower.shrink(len) }
    } else {
      Err(io::Error::other("region boundary moved, leaving it in place"))
    };

    self.low_water_mark = ptr::null_mut();
    self.high_water_mark = ptr::null_mut();

    result
  }
}
