use std::ptr;

use thiserror::Error;

use crate::{
  align::ALIGNMENT,
  block::{Block, HEADER_SIZE},
};

/// A broken block list invariant, as found by [`BlockList::verify`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Violation {
  #[error("block {index}: prev link does not point at the previous block")]
  BrokenLink { index: usize },
  #[error("block {index}: next header does not start where this block ends")]
  Gap { index: usize },
  #[error("block {index}: size {size} exceeds capacity {capacity}")]
  Overcommitted {
    index: usize,
    size: usize,
    capacity: usize,
  },
  #[error("block {index}: capacity {capacity} is not a multiple of the alignment")]
  Misaligned { index: usize, capacity: usize },
  #[error("blocks {index} and {} are both free", .index + 1)]
  AdjacentFree { index: usize },
  #[error("tail does not point at the last block")]
  TailMismatch,
  #[error("last block ends at {found:#x}, region ends at {expected:#x}")]
  RegionEnd { expected: usize, found: usize },
  #[error("cursor does not point into the list")]
  LostCursor,
}

/// Address ordered, doubly linked chain of the headers spanning the
/// managed region, plus the next-fit cursor.
pub struct BlockList {
  head: *mut Block,
  tail: *mut Block,
  cursor: *mut Block,
}

impl BlockList {
  pub const fn new() -> Self {
    Self {
      head: ptr::null_mut(),
      tail: ptr::null_mut(),
      cursor: ptr::null_mut(),
    }
  }

  #[cfg(test)]
  pub fn head(&self) -> *mut Block {
    self.head
  }

  pub fn tail(&self) -> *mut Block {
    self.tail
  }

  pub fn cursor(&self) -> *mut Block {
    self.cursor
  }

  pub fn is_empty(&self) -> bool {
    self.head.is_null()
  }

  /// # Safety
  ///
  /// `block` must be part of this list.
  pub unsafe fn set_cursor(
    &mut self,
    block: *mut Block,
  ) {
    self.cursor = block;
  }

  /// Forgets every block without touching memory.
  pub fn clear(&mut self) {
    *self = Self::new();
  }

  /// Links `block` after the current tail.
  ///
  /// # Safety
  ///
  /// `block` must be a fresh header placed right where the tail ends (or
  /// anywhere, when the list is empty).
  pub unsafe fn append(
    &mut self,
    block: *mut Block,
  ) {
    unsafe {
      (*block).prev = self.tail;
      (*block).next = ptr::null_mut();

      if self.tail.is_null() {
        self.head = block;
      } else {
        debug_assert_eq!(Block::end(self.tail), block as *mut u8);
        (*self.tail).next = block;
      }
    }

    self.tail = block;
  }

  /// Carves a new in-use block of `size` bytes out of the excess of
  /// `source` and links it right after it. `source` keeps only what its
  /// own data needs.
  ///
  /// # Safety
  ///
  /// `source` must be an in-use block of the list and `(*source).fits(size)`
  /// must hold.
  pub unsafe fn split_after(
    &mut self,
    source: *mut Block,
    size: usize,
  ) -> *mut Block {
    unsafe {
      debug_assert!(!(*source).is_free() && (*source).fits(size));

      let committed = (*source).committed();
      let address = Block::data(source).as_ptr().add(committed);
      let block = Block::write(address, (*source).excess() - HEADER_SIZE, size);

      let next = (*source).next;
      (*block).prev = source;
      (*block).next = next;

      if next.is_null() {
        self.tail = block;
      } else {
        (*next).prev = block;
      }

      (*source).next = block;
      (*source).capacity = committed;

      block
    }
  }

  /// Folds the successor of `block` (header included) into `block` and
  /// unlinks it.
  ///
  /// # Safety
  ///
  /// `block` must be in the list and have a successor.
  pub unsafe fn absorb_next(
    &mut self,
    block: *mut Block,
  ) {
    unsafe {
      let absorbed = (*block).next;
      debug_assert!(!absorbed.is_null());

      (*block).capacity += (*absorbed).capacity + HEADER_SIZE;
      (*block).next = (*absorbed).next;

      if (*absorbed).next.is_null() {
        self.tail = block;
      } else {
        (*(*absorbed).next).prev = block;
      }

      if self.cursor == absorbed {
        self.cursor = block;
      }
    }
  }

  /// Walks the list in address order.
  ///
  /// # Safety
  ///
  /// The list must not be mutated while the iterator is alive.
  pub unsafe fn iter(&self) -> Blocks {
    Blocks {
      current: self.head,
    }
  }

  /// Walks every block once, starting at the cursor (or the head when
  /// there is none) and wrapping from the tail to the head.
  ///
  /// # Safety
  ///
  /// The list must not be mutated while the iterator is alive.
  pub unsafe fn circuit(&self) -> Circuit {
    let start = if self.cursor.is_null() {
      self.head
    } else {
      self.cursor
    };

    Circuit {
      head: self.head,
      start,
      current: start,
    }
  }

  /// Checks every structural invariant, with `top` being the end of the
  /// managed region.
  ///
  /// # Safety
  ///
  /// Every block reachable from the head must be live.
  pub unsafe fn verify(
    &self,
    top: *mut u8,
  ) -> Result<(), Violation> {
    if self.head.is_null() {
      if !self.tail.is_null() {
        return Err(Violation::TailMismatch);
      }
      if !self.cursor.is_null() {
        return Err(Violation::LostCursor);
      }
      return Ok(());
    }

    let mut previous: *mut Block = ptr::null_mut();
    let mut cursor_seen = self.cursor.is_null();

    for (index, block) in unsafe { self.iter() }.enumerate() {
      let header = unsafe { &*block };

      if header.prev != previous {
        return Err(Violation::BrokenLink { index });
      }
      if header.size > header.capacity {
        return Err(Violation::Overcommitted {
          index,
          size: header.size,
          capacity: header.capacity,
        });
      }
      if header.capacity % ALIGNMENT != 0 {
        return Err(Violation::Misaligned {
          index,
          capacity: header.capacity,
        });
      }
      if !header.next.is_null() {
        if unsafe { Block::end(block) } != header.next as *mut u8 {
          return Err(Violation::Gap { index });
        }
        if header.is_free() && unsafe { (*header.next).is_free() } {
          return Err(Violation::AdjacentFree { index });
        }
      }

      cursor_seen |= block == self.cursor;
      previous = block;
    }

    if previous != self.tail {
      return Err(Violation::TailMismatch);
    }

    let end = unsafe { Block::end(self.tail) };
    if end != top {
      return Err(Violation::RegionEnd {
        expected: top as usize,
        found: end as usize,
      });
    }

    if !cursor_seen {
      return Err(Violation::LostCursor);
    }

    Ok(())
  }
}

impl Default for BlockList {
  fn default() -> Self {
    Self::new()
  }
}

pub struct Blocks {
  current: *mut Block,
}

impl Iterator for Blocks {
  type Item = *mut Block;

  fn next(&mut self) -> Option<Self::Item> {
    if self.current.is_null() {
      return None;
    }

    let block = self.current;
    self.current = unsafe { (*block).next };
    Some(block)
  }
}

pub struct Circuit {
  head: *mut Block,
  start: *mut Block,
  current: *mut Block,
}

impl Iterator for Circuit {
  type Item = *mut Block;

  fn next(&mut self) -> Option<Self::Item> {
    if self.current.is_null() {
      return None;
    }

    let block = self.current;
    let next = unsafe { (*block).next };
    let next = if next.is_null() { self.head } else { next };

    self.current = if next == self.start {
      ptr::null_mut()
    } else {
      next
    };

    Some(block)
  }
}
