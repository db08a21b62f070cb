use std::{
  ffi::CStr,
  io::{self, Write},
  ptr::{self, NonNull},
};

use log::{debug, trace, warn};

use crate::{
  block::{Block, HEADER_SIZE},
  config::{AllocatorConfig, clamp_chunk_size},
  diag::Diagnostics,
  error::AllocError,
  list::{BlockList, Violation},
  policy::FitPolicy,
  region::{Region, RegionGrower},
  report::{HeapMap, HeapStats},
};

/// A free-list allocator over one contiguous region.
///
/// ```text
///   low_water_mark                                       high_water_mark
///   ▼                                                                  ▼
///   ┌────┬──────┬────┬──────────┬────┬──────┬────┬─────────────────────┐
///   │ H  │ used │ H  │ free     │ H  │ used │ H  │ used      ░░excess░░│
///   └────┴──────┴────┴──────────┴────┴──────┴────┴─────────────────────┘
///                    ▲
///                    cursor (next-fit resumes here)
/// ```
///
/// Requests are served from a block that fits (a free block is reused in
/// place, an in-use block with enough excess is split), otherwise the region
/// grows by whole chunks. Released blocks are merged with free neighbours.
pub struct FreeListAllocator<G> {
  region: Region<G>,
  list: BlockList,
  config: AllocatorConfig,
  diagnostics: Diagnostics,
}

// Safety: the allocator exclusively owns every block in its region.
unsafe impl<G: Send> Send for FreeListAllocator<G> {}

impl<G: RegionGrower> FreeListAllocator<G> {
  pub const fn new(grower: G) -> Self {
    Self {
      region: Region::new(grower),
      list: BlockList::new(),
      config: AllocatorConfig::new(),
      diagnostics: Diagnostics::new(),
    }
  }

  pub fn with_config(
    grower: G,
    config: AllocatorConfig,
  ) -> Self {
    let mut allocator = Self::new(grower);
    allocator.set_chunk_size(config.chunk_size);
    allocator.config.fit_policy = config.fit_policy;
    allocator.set_verbose(config.verbose);
    allocator
  }

  pub fn config(&self) -> AllocatorConfig {
    self.config
  }

  pub fn region(&self) -> &Region<G> {
    &self.region
  }

  /// Returns a pointer to at least `size` usable bytes, or `None` for a zero
  /// sized request.
  pub fn allocate(
    &mut self,
    size: usize,
  ) -> Result<Option<NonNull<u8>>, AllocError> {
    trace!("allocate entry: size = {size}");
    self
      .diagnostics
      .emit(format_args!(">> allocate entry: size = {size}"));

    if size == 0 {
      return Ok(None);
    }

    self.region.mark();
    let data = self.allocate_block(size)?;

    trace!("allocate exit: {:p}", data);
    self
      .diagnostics
      .emit(format_args!("<< allocate exit: size = {size}"));

    Ok(Some(data))
  }

  fn allocate_block(
    &mut self,
    size: usize,
  ) -> Result<NonNull<u8>, AllocError> {
    unsafe {
      let candidate = if self.list.is_empty() {
        ptr::null_mut()
      } else {
        self.config.fit_policy.select(&self.list, size)
      };

      let block = if candidate.is_null() {
        self.grow(size)?
      } else if (*candidate).is_free() {
        debug!(
          "reusing free block {:p} (capacity {}) for {size} bytes",
          candidate,
          (*candidate).capacity
        );
        (*candidate).size = size;
        candidate
      } else {
        let block = self.list.split_after(candidate, size);
        debug!(
          "split {:p} for {size} bytes, new block {:p} keeps {} bytes",
          candidate,
          block,
          (*block).capacity
        );
        block
      };

      self.list.set_cursor(block);
      Ok(Block::data(block))
    }
  }

  /// Extends the region by enough chunks for `size` bytes and appends the
  /// new span as one block.
  unsafe fn grow(
    &mut self,
    size: usize,
  ) -> Result<*mut Block, AllocError> {
    let bytes = Region::<G>::chunk_bytes(size, self.config.chunk_size)?;

    unsafe {
      let start = self.region.extend(bytes)?;
      let block = Block::write(start, bytes - HEADER_SIZE, size);
      self.list.append(block);
      debug_assert_eq!(self.list.tail(), block);
      Ok(block)
    }
  }

  /// Gives a block back. `None` is ignored, and so is a block that is
  /// already free.
  ///
  /// # Safety
  ///
  /// `ptr` must have been returned by this allocator and the region must not
  /// have been reset since.
  pub unsafe fn release(
    &mut self,
    ptr: Option<NonNull<u8>>,
  ) {
    let Some(data) = ptr else {
      return;
    };

    trace!("release entry: {:p}", data);

    unsafe {
      let block = Block::from_data(data);

      if (*block).is_free() {
        let offset = (data.as_ptr() as usize).wrapping_sub(self.region.low_water_mark() as usize);
        warn!("double release of {:p}", data);
        self
          .diagnostics
          .emit(format_args!("Block is already free: ptr = {offset:#09x}"));
        return;
      }

      (*block).size = 0;
      self.list.set_cursor(block);
      self.coalesce(block);
    }

    self
      .diagnostics
      .emit(format_args!("<< release exit: ptr = {:p}", data));
  }

  /// Merges the free `block` with every free block around it.
  unsafe fn coalesce(
    &mut self,
    mut block: *mut Block,
  ) {
    unsafe {
      while !(*block).next.is_null() && (*(*block).next).is_free() {
        debug!("merging {:p} into {:p}", (*block).next, block);
        self.list.absorb_next(block);
      }

      while !(*block).prev.is_null() && (*(*block).prev).is_free() {
        let prev = (*block).prev;
        debug!("merging {:p} into {:p}", block, prev);
        self.list.absorb_next(prev);
        block = prev;
      }

      self.list.set_cursor(block);
    }
  }

  /// Allocates room for `count` elements of `element_size` bytes, all zero.
  pub fn allocate_zeroed(
    &mut self,
    count: usize,
    element_size: usize,
  ) -> Result<Option<NonNull<u8>>, AllocError> {
    let total = count
      .checked_mul(element_size)
      .ok_or(AllocError::Overflow {
        count,
        element_size,
      })?;

    let data = self.allocate(total)?;

    if let Some(data) = data {
      unsafe { ptr::write_bytes(data.as_ptr(), 0, total) };
    }

    Ok(data)
  }

  /// Changes the size of an allocation, moving it only when its block is
  /// too small. On failure the original allocation is left untouched.
  ///
  /// # Safety
  ///
  /// Same contract as [`FreeListAllocator::release`].
  pub unsafe fn resize(
    &mut self,
    ptr: Option<NonNull<u8>>,
    new_size: usize,
  ) -> Result<Option<NonNull<u8>>, AllocError> {
    let Some(data) = ptr else {
      return self.allocate(new_size);
    };

    if new_size == 0 {
      unsafe { self.release(Some(data)) };
      return Ok(None);
    }

    unsafe {
      let block = Block::from_data(data);

      if (*block).capacity >= new_size {
        (*block).size = new_size;
        return Ok(Some(data));
      }

      let old_size = (*block).size;
      let moved = self.allocate_block(new_size)?;

      ptr::copy(data.as_ptr(), moved.as_ptr(), old_size.min(new_size));
      self.release(Some(data));

      debug!("moved {:p} to {:p} to hold {new_size} bytes", data, moved);

      Ok(Some(moved))
    }
  }

  /// Copies `text` (terminator included) into a fresh allocation.
  pub fn duplicate_string(
    &mut self,
    text: &CStr,
  ) -> Result<NonNull<u8>, AllocError> {
    let bytes = text.to_bytes_with_nul();

    self.region.mark();
    let data = self.allocate_block(bytes.len())?;
    unsafe { ptr::copy_nonoverlapping(bytes.as_ptr(), data.as_ptr(), bytes.len()) };

    Ok(data)
  }

  /// Sets the growth unit and returns the one in effect. `0` only queries.
  pub fn set_chunk_size(
    &mut self,
    size: usize,
  ) -> usize {
    if size != 0 {
      self.config.chunk_size = clamp_chunk_size(size);
    }
    self.config.chunk_size
  }

  pub fn set_fit_policy(
    &mut self,
    policy: FitPolicy,
  ) {
    self.config.fit_policy = policy;
    self
      .diagnostics
      .emit(format_args!("** {policy} selected"));
  }

  pub fn set_verbose(
    &mut self,
    verbose: bool,
  ) {
    self.config.verbose = verbose;
    self.diagnostics.set_verbose(verbose);
  }

  /// Redirects diagnostics and heap maps. `None` means stderr.
  pub fn set_log_target(
    &mut self,
    target: Option<Box<dyn Write + Send>>,
  ) {
    self.diagnostics.set_target(target);
  }

  /// Returns the whole region to the host and forgets every block. Every
  /// pointer handed out before is dangling afterwards.
  pub fn reset(&mut self) {
    if self.region.low_water_mark().is_null() {
      return;
    }

    self
      .diagnostics
      .emit(format_args!("*** Resetting all brkalloc space ***"));
    debug!("resetting {} bytes", self.region.len());

    if let Err(err) = unsafe { self.region.release() } {
      warn!("region not returned to the host: {err}");
    }

    self.list.clear();
  }

  pub fn stats(&self) -> HeapStats {
    unsafe { HeapStats::collect(&self.list, self.region.len()) }
  }

  /// Walks the block list and checks every structural invariant.
  pub fn verify(&self) -> Result<HeapStats, Violation> {
    unsafe { self.list.verify(self.region.high_water_mark()) }?;
    Ok(self.stats())
  }

  fn heap_map(&self) -> HeapMap<'_> {
    HeapMap {
      list: &self.list,
      low_water_mark: self.region.low_water_mark(),
      high_water_mark: self.region.high_water_mark(),
      fit_policy: self.config.fit_policy,
    }
  }

  /// Writes the heap map to `out`, with addresses relative to `base`.
  pub fn dump(
    &self,
    out: &mut dyn Write,
    base: *const u8,
  ) -> io::Result<()> {
    unsafe { self.heap_map().write_to(out, base) }
  }

  /// Writes the heap map to the log target.
  pub fn dump_report(
    &mut self,
    base: *const u8,
  ) -> io::Result<()> {
    let map = HeapMap {
      list: &self.list,
      low_water_mark: self.region.low_water_mark(),
      high_water_mark: self.region.high_water_mark(),
      fit_policy: self.config.fit_policy,
    };
    unsafe { map.write_to(self.diagnostics.writer(), base) }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{diag::tests::SharedBuffer, region::BufferRegion};

  fn heap() -> FreeListAllocator<BufferRegion> {
    FreeListAllocator::new(BufferRegion::new(1 << 20))
  }

  fn alloc(
    heap: &mut FreeListAllocator<BufferRegion>,
    size: usize,
  ) -> NonNull<u8> {
    let data = heap.allocate(size).unwrap().unwrap();
    heap.verify().unwrap();
    data
  }

  fn free(
    heap: &mut FreeListAllocator<BufferRegion>,
    data: NonNull<u8>,
  ) {
    unsafe { heap.release(Some(data)) };
    heap.verify().unwrap();
  }

  fn header(data: NonNull<u8>) -> &'static Block {
    unsafe { &*Block::from_data(data) }
  }

  fn fill(
    data: NonNull<u8>,
    len: usize,
    byte: u8,
  ) {
    unsafe { ptr::write_bytes(data.as_ptr(), byte, len) };
  }

  fn bytes<'a>(
    data: NonNull<u8>,
    len: usize,
  ) -> &'a [u8] {
    unsafe { std::slice::from_raw_parts(data.as_ptr(), len) }
  }

  #[test]
  fn test_zero_size_allocates_nothing() {
    let mut heap = heap();

    assert!(heap.allocate(0).unwrap().is_none());
    assert!(heap.region().low_water_mark().is_null());
    assert!(heap.list.is_empty());
    assert_eq!(heap.region().grower().used(), 0);
  }

  #[test]
  fn test_first_allocation_grows_one_chunk() {
    let mut heap = heap();

    let data = alloc(&mut heap, 100);

    assert_eq!(heap.region().len(), 4096);
    assert_eq!(header(data).capacity, 4096 - HEADER_SIZE);
    assert_eq!(header(data).size, 100);
    assert_eq!(heap.list.head(), heap.list.tail());
    assert_eq!(heap.list.cursor(), heap.list.head());
    assert_eq!(data.as_ptr() as usize % crate::align::ALIGNMENT, 0);
  }

  #[test]
  fn test_split_from_in_use_excess() {
    let mut heap = heap();

    let a = alloc(&mut heap, 10);
    let b = alloc(&mut heap, 20);

    assert_eq!(heap.region().len(), 4096);
    assert_eq!(header(a).capacity, 16);
    assert_eq!(b.as_ptr() as usize, a.as_ptr() as usize + 16 + HEADER_SIZE);
    assert_eq!(header(b).capacity, 4096 - 2 * HEADER_SIZE - 16);
    assert_eq!(heap.list.cursor(), unsafe { Block::from_data(b) });
  }

  #[test]
  fn test_allocate_release_reuse_collapse() {
    let mut heap = heap();

    let a = alloc(&mut heap, 10);
    let b = alloc(&mut heap, 20);
    let c = alloc(&mut heap, 30);
    let region = heap.region().len();

    free(&mut heap, b);
    let again = alloc(&mut heap, 20);

    assert_eq!(again, b);
    assert_eq!(heap.region().len(), region);

    free(&mut heap, a);
    free(&mut heap, c);
    free(&mut heap, again);

    let stats = heap.verify().unwrap();
    assert_eq!(stats.blocks(), 1);
    assert_eq!(stats.free_blocks, 1);
    assert_eq!(stats.capacity_bytes, region - HEADER_SIZE);
    assert_eq!(heap.list.cursor(), heap.list.head());
  }

  #[test]
  fn test_adjacent_frees_merge_in_any_order() {
    let orders = [
      [0, 1, 2],
      [0, 2, 1],
      [1, 0, 2],
      [1, 2, 0],
      [2, 0, 1],
      [2, 1, 0],
    ];

    for order in orders {
      let mut heap = heap();
      let blocks = [
        alloc(&mut heap, 16),
        alloc(&mut heap, 16),
        alloc(&mut heap, 16),
      ];
      let guard = alloc(&mut heap, 16);

      for index in order {
        free(&mut heap, blocks[index]);
      }

      let stats = heap.stats();
      assert_eq!(stats.free_blocks, 1, "order {order:?}");
      assert_eq!(stats.used_blocks, 1, "order {order:?}");
      assert_eq!(header(blocks[0]).capacity, 3 * 16 + 2 * HEADER_SIZE);
      assert!(header(guard).size == 16);
    }
  }

  #[test]
  fn test_release_none_and_double_release() {
    let buffer = SharedBuffer::default();
    let mut heap = heap();
    heap.set_log_target(Some(Box::new(buffer.clone())));

    unsafe { heap.release(None) };

    let a = alloc(&mut heap, 40);
    let b = alloc(&mut heap, 40);
    free(&mut heap, a);

    let before = heap.stats();
    let b_header = (header(b).capacity, header(b).size);

    heap.set_verbose(true);
    free(&mut heap, a);

    assert_eq!(heap.stats(), before);
    assert_eq!((header(b).capacity, header(b).size), b_header);
    assert!(buffer.contents().contains("Block is already free: ptr = "));
  }

  #[test]
  fn test_miss_grows_by_whole_chunks() {
    let mut heap = heap();
    assert_eq!(heap.set_chunk_size(128), 128);

    let a = alloc(&mut heap, 200);
    assert_eq!(heap.region().len(), 256);
    assert_eq!(header(a).capacity, 256 - HEADER_SIZE);

    let b = alloc(&mut heap, 200);
    assert_eq!(heap.region().len(), 512);
    assert_eq!(b.as_ptr() as usize, a.as_ptr() as usize + 256);
    assert_eq!(heap.list.tail(), unsafe { Block::from_data(b) });
  }

  #[test]
  fn test_out_of_memory_keeps_existing_blocks() {
    let mut heap = FreeListAllocator::new(BufferRegion::new(4096));

    let a = alloc(&mut heap, 100);
    fill(a, 100, 0x5a);
    let before = heap.stats();

    let err = heap.allocate(5000).unwrap_err();
    assert!(matches!(err, AllocError::OutOfMemory { requested: 8192, .. }));

    let err = heap.allocate(4000).unwrap_err();
    assert!(matches!(err, AllocError::OutOfMemory { .. }));

    assert_eq!(heap.verify().unwrap(), before);
    assert!(bytes(a, 100).iter().all(|&b| b == 0x5a));
  }

  #[test]
  fn test_allocate_zeroed_clears_reused_memory() {
    let mut heap = heap();

    let a = alloc(&mut heap, 64);
    fill(a, 64, 0xff);
    free(&mut heap, a);

    let zeroed = heap.allocate_zeroed(8, 8).unwrap().unwrap();

    assert_eq!(zeroed, a);
    assert!(bytes(zeroed, 64).iter().all(|&b| b == 0));
  }

  #[test]
  fn test_allocate_zeroed_edge_cases() {
    let mut heap = heap();

    assert!(heap.allocate_zeroed(0, 8).unwrap().is_none());
    assert!(heap.allocate_zeroed(8, 0).unwrap().is_none());

    let err = heap.allocate_zeroed(usize::MAX, 2).unwrap_err();
    assert!(matches!(
      err,
      AllocError::Overflow {
        count: usize::MAX,
        element_size: 2
      }
    ));
    assert!(heap.list.is_empty());
  }

  #[test]
  fn test_resize_aliases() {
    let mut heap = heap();

    unsafe {
      let data = heap.resize(None, 24).unwrap().unwrap();
      assert_eq!(header(data).size, 24);

      assert!(heap.resize(Some(data), 0).unwrap().is_none());
      assert!(header(data).is_free());
      heap.verify().unwrap();
    }
  }

  #[test]
  fn test_resize_within_capacity_keeps_pointer() {
    let mut heap = heap();
    let data = alloc(&mut heap, 100);

    unsafe {
      assert_eq!(heap.resize(Some(data), 2000).unwrap(), Some(data));
      assert_eq!(header(data).size, 2000);

      assert_eq!(heap.resize(Some(data), 8).unwrap(), Some(data));
      assert_eq!(header(data).size, 8);
    }

    heap.verify().unwrap();
  }

  #[test]
  fn test_resize_moves_and_preserves_prefix() {
    let mut heap = heap();
    let a = alloc(&mut heap, 10);
    let _b = alloc(&mut heap, 10);

    for (i, byte) in unsafe { std::slice::from_raw_parts_mut(a.as_ptr(), 10) }
      .iter_mut()
      .enumerate()
    {
      *byte = i as u8 + 1;
    }

    let moved = unsafe { heap.resize(Some(a), 100) }.unwrap().unwrap();

    assert_ne!(moved, a);
    assert_eq!(bytes(moved, 10), &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
    assert!(header(a).is_free());
    assert_eq!(header(moved).size, 100);
    heap.verify().unwrap();
  }

  #[test]
  fn test_failed_resize_keeps_original() {
    let mut heap = FreeListAllocator::new(BufferRegion::new(4096));
    let a = alloc(&mut heap, 100);
    fill(a, 100, 0x42);

    let err = unsafe { heap.resize(Some(a), 8000) }.unwrap_err();

    assert!(matches!(err, AllocError::OutOfMemory { .. }));
    assert_eq!(header(a).size, 100);
    assert!(bytes(a, 100).iter().all(|&b| b == 0x42));
    assert_eq!(heap.verify().unwrap().used_blocks, 1);
  }

  #[test]
  fn test_duplicate_string() {
    let mut heap = heap();

    let copy = heap.duplicate_string(c"next fit").unwrap();

    assert_eq!(bytes(copy, 9), b"next fit\0");
    assert_eq!(header(copy).size, 9);

    let empty = heap.duplicate_string(c"").unwrap();
    assert_eq!(bytes(empty, 1), b"\0");
    heap.verify().unwrap();
  }

  #[test]
  fn test_reset_starts_over() {
    let mut heap = heap();

    let first = alloc(&mut heap, 50);
    let first_capacity = header(first).capacity;
    let first_stats = heap.stats();
    alloc(&mut heap, 5000);

    heap.reset();

    assert!(heap.list.is_empty());
    assert!(heap.region().low_water_mark().is_null());
    assert_eq!(heap.region().grower().used(), 0);
    heap.verify().unwrap();

    let again = alloc(&mut heap, 50);
    assert_eq!(again, first);
    assert_eq!(header(again).capacity, first_capacity);
    assert_eq!(heap.stats(), first_stats);
  }

  #[test]
  fn test_reset_on_untouched_heap() {
    let mut heap = heap();
    heap.reset();
    heap.reset();
    assert!(heap.verify().is_ok());
  }

  #[test]
  fn test_chunk_size_setter() {
    let mut heap = heap();

    assert_eq!(heap.set_chunk_size(0), 4096);
    assert_eq!(heap.set_chunk_size(1), 128);
    assert_eq!(heap.set_chunk_size(0), 128);
    assert_eq!(heap.set_chunk_size(10_000), 10_000);
  }

  #[test]
  fn test_first_fit_and_next_fit_differ() {
    let mut heap = heap();
    heap.set_chunk_size(128);

    // One full chunk per block, so nothing can be split off.
    let a = alloc(&mut heap, 96);
    let _b = alloc(&mut heap, 96);
    let c = alloc(&mut heap, 96);
    let _d = alloc(&mut heap, 96);
    free(&mut heap, a);
    free(&mut heap, c);

    // The cursor sits on c, the last block released.
    assert_eq!(alloc(&mut heap, 8), c);
    free(&mut heap, c);

    heap.set_fit_policy(FitPolicy::FirstFit);
    assert_eq!(alloc(&mut heap, 8), a);
    assert_eq!(heap.region().len(), 4 * 128);
  }

  #[test]
  fn test_best_and_worst_fit() {
    let mut heap = heap();
    heap.set_chunk_size(128);

    let small = alloc(&mut heap, 96);
    let _s = alloc(&mut heap, 96);
    let large = alloc(&mut heap, 300);
    let _l = alloc(&mut heap, 96);
    free(&mut heap, small);
    free(&mut heap, large);

    heap.set_fit_policy(FitPolicy::BestFit);
    let picked = alloc(&mut heap, 50);
    assert_eq!(picked, small);
    free(&mut heap, picked);

    heap.set_fit_policy(FitPolicy::WorstFit);
    assert_eq!(alloc(&mut heap, 50), large);
  }

  #[test]
  fn test_random_workload_keeps_invariants() {
    let mut heap = FreeListAllocator::new(BufferRegion::new(1 << 22));
    let mut live: Vec<(NonNull<u8>, usize, u8)> = Vec::new();
    let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = || {
      seed ^= seed << 13;
      seed ^= seed >> 7;
      seed ^= seed << 17;
      seed
    };

    for step in 0..2000 {
      let roll = next();
      let pattern = (step % 251) as u8;

      if roll % 3 == 0 && !live.is_empty() {
        let (data, len, byte) = live.swap_remove((next() as usize) % live.len());
        assert!(bytes(data, len).iter().all(|&b| b == byte));
        free(&mut heap, data);
      } else if roll % 7 == 1 && !live.is_empty() {
        let index = (next() as usize) % live.len();
        let (data, len, byte) = live[index];
        let new_len = 1 + (next() as usize) % 400;
        let moved = unsafe { heap.resize(Some(data), new_len) }.unwrap().unwrap();
        heap.verify().unwrap();
        assert!(bytes(moved, len.min(new_len)).iter().all(|&b| b == byte));
        fill(moved, new_len, byte);
        live[index] = (moved, new_len, byte);
      } else {
        let len = 1 + (next() as usize) % 300;
        let data = alloc(&mut heap, len);
        fill(data, len, pattern);
        live.push((data, len, pattern));
      }
    }

    for (data, len, byte) in live.drain(..) {
      assert!(bytes(data, len).iter().all(|&b| b == byte));
      free(&mut heap, data);
    }

    let stats = heap.verify().unwrap();
    assert_eq!(stats.used_blocks, 0);
    assert_eq!(stats.free_blocks, 1);
    assert_eq!(stats.block_bytes, stats.region_bytes);
  }

  #[test]
  fn test_dump_report_goes_to_log_target() {
    let buffer = SharedBuffer::default();
    let mut heap = heap();
    heap.set_log_target(Some(Box::new(buffer.clone())));

    let a = alloc(&mut heap, 10);
    alloc(&mut heap, 10);
    free(&mut heap, a);

    let base = heap.region().low_water_mark();
    heap.dump_report(base).unwrap();

    let text = buffer.contents();
    assert!(text.starts_with("Heap map"));
    assert!(text.contains("Used blocks:    1  Free blocks:    1"));
    assert!(text.contains("Total bytes: 4096"));
  }

  #[test]
  fn test_with_config() {
    let config = AllocatorConfig::new()
      .with_chunk_size(1000)
      .with_fit_policy(FitPolicy::BestFit);
    let heap = FreeListAllocator::with_config(BufferRegion::new(4096), config);

    assert_eq!(heap.config().chunk_size, 1008);
    assert_eq!(heap.config().fit_policy, FitPolicy::BestFit);
  }
}
