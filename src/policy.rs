use std::{cmp::Reverse, fmt};

use crate::{block::Block, list::BlockList};

/// How the allocator picks the block that satisfies a request.
///
/// Every policy accepts the same candidates (see [`Block::fits`]); they
/// differ only in which candidate wins.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FitPolicy {
  /// Earliest candidate in address order.
  FirstFit = 0,
  /// Candidate with the least excess, earliest on ties.
  BestFit = 1,
  /// Candidate with the most excess, earliest on ties.
  WorstFit = 2,
  /// First candidate found walking from the cursor, wrapping around once.
  #[default]
  NextFit = 3,
}

impl FitPolicy {
  /// Picks a block able to host `requested` bytes, or null.
  ///
  /// # Safety
  ///
  /// Every block reachable from `list` must be live.
  pub(crate) unsafe fn select(
    self,
    list: &BlockList,
    requested: usize,
  ) -> *mut Block {
    let fits = |block: &*mut Block| unsafe { (**block).fits(requested) };
    let excess = |block: &*mut Block| unsafe { (**block).excess() };

    let found = unsafe {
      match self {
        FitPolicy::FirstFit => list.iter().find(fits),
        FitPolicy::BestFit => list.iter().filter(fits).min_by_key(excess),
        FitPolicy::WorstFit => list
          .iter()
          .filter(fits)
          .min_by_key(|block| Reverse(excess(block))),
        FitPolicy::NextFit => list.circuit().find(fits),
      }
    };

    found.unwrap_or(std::ptr::null_mut())
  }
}

impl TryFrom<i32> for FitPolicy {
  type Error = i32;

  fn try_from(value: i32) -> Result<Self, Self::Error> {
    match value {
      0 => Ok(FitPolicy::FirstFit),
      1 => Ok(FitPolicy::BestFit),
      2 => Ok(FitPolicy::WorstFit),
      3 => Ok(FitPolicy::NextFit),
      other => Err(other),
    }
  }
}

impl fmt::Display for FitPolicy {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    let name = match self {
      FitPolicy::FirstFit => "First fit",
      FitPolicy::BestFit => "Best fit",
      FitPolicy::WorstFit => "Worst fit",
      FitPolicy::NextFit => "Next fit",
    };
    f.write_str(name)
  }
}
