use std::io::{self, Write};

use crate::{
  block::{Block, HEADER_SIZE},
  list::BlockList,
  policy::FitPolicy,
};

/// Aggregate view of the block list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeapStats {
  pub used_blocks: usize,
  pub free_blocks: usize,
  /// Bytes claimed by callers.
  pub user_bytes: usize,
  /// Bytes owned by blocks, headers excluded.
  pub capacity_bytes: usize,
  /// Bytes owned by blocks, headers included.
  pub block_bytes: usize,
  /// Bytes between the water marks.
  pub region_bytes: usize,
}

impl HeapStats {
  /// # Safety
  ///
  /// Every block reachable from `list` must be live.
  pub(crate) unsafe fn collect(
    list: &BlockList,
    region_bytes: usize,
  ) -> Self {
    let mut stats = HeapStats {
      region_bytes,
      ..Default::default()
    };

    for block in unsafe { list.iter() } {
      let header = unsafe { &*block };

      if header.is_free() {
        stats.free_blocks += 1;
      } else {
        stats.used_blocks += 1;
      }
      stats.user_bytes += header.size;
      stats.capacity_bytes += header.capacity;
      stats.block_bytes += header.capacity + HEADER_SIZE;
    }

    stats
  }

  pub fn blocks(&self) -> usize {
    self.used_blocks + self.free_blocks
  }

  pub fn excess_bytes(&self) -> usize {
    self.capacity_bytes - self.user_bytes
  }
}

/// Everything the heap map needs to know about an allocator.
pub struct HeapMap<'a> {
  pub list: &'a BlockList,
  pub low_water_mark: *const u8,
  pub high_water_mark: *const u8,
  pub fit_policy: FitPolicy,
}

fn offset(
  address: *const u8,
  base: *const u8,
) -> usize {
  if address.is_null() {
    0
  } else {
    (address as usize).wrapping_sub(base as usize)
  }
}

impl HeapMap<'_> {
  /// Writes one row per block with addresses shown relative to `base`,
  /// then the totals.
  ///
  /// # Safety
  ///
  /// Every block reachable from the list must be live.
  pub unsafe fn write_to(
    &self,
    out: &mut dyn Write,
    base: *const u8,
  ) -> io::Result<()> {
    writeln!(out, "Heap map")?;
    writeln!(
      out,
      "  {:<8}\t{:<10}\t{:<10}\t{:<10}\t{:<10}\t{:<9}\t{:<9}\t{:<9}\t{:<9}\t{:<9}",
      "blk no", "block add", "next add", "prev add", "data add", "blk size", "capacity", "size", "excess", "status",
    )?;

    for (index, block) in unsafe { self.list.iter() }.enumerate() {
      let header = unsafe { &*block };
      let data = unsafe { Block::data(block) }.as_ptr();

      write!(
        out,
        "  {index}\t\t{:#09x}\t{:#09x}\t{:#09x}\t{:#09x}\t{:9}\t{:9}\t{:9}\t{:9}\t{}\t{}",
        offset(block as *const u8, base),
        offset(header.next as *const u8, base),
        offset(header.prev as *const u8, base),
        offset(data, base),
        header.capacity + HEADER_SIZE,
        header.capacity,
        header.size,
        header.capacity - header.size,
        if header.is_free() { "free  " } else { "in use" },
        if header.is_free() { '*' } else { ' ' },
      )?;

      if self.fit_policy == FitPolicy::NextFit {
        let marker = if block == self.list.cursor() { " <" } else { "  " };
        write!(out, "{marker}")?;
      }
      writeln!(out)?;
    }

    let region_bytes = offset(self.high_water_mark, self.low_water_mark as *const u8);
    let stats = unsafe { HeapStats::collect(self.list, region_bytes) };

    writeln!(
      out,
      "  {:<16}\t\t\t\t\t\t\t\t{:9}\t{:9}\t{:9}\t{:9}",
      "Total bytes used", stats.block_bytes, stats.capacity_bytes, stats.user_bytes, stats.excess_bytes(),
    )?;
    writeln!(
      out,
      "  Used blocks: {:4}  Free blocks: {:4}  Min heap: {:#09x}    Max heap: {:#09x}   Total bytes: {}   Block size: {} bytes",
      stats.used_blocks,
      stats.free_blocks,
      offset(self.low_water_mark, base),
      offset(self.high_water_mark, base),
      stats.region_bytes,
      HEADER_SIZE,
    )?;

    Ok(())
  }
}
