use std::{
  mem,
  ptr::{self, NonNull},
};

use crate::{align::ALIGNMENT, align_to};

/// Bytes taken by one header in the managed region.
pub const HEADER_SIZE: usize = mem::size_of::<Block>();

/// Header written in place in front of every span of the managed region.
///
/// ```text
///   ┌──────────────────────────┬──────────────────────────────────────┐
///   │ capacity | size          │ data                                 │
///   │ prev     | next          │ ◄──────────── capacity ────────────► │
///   └──────────────────────────┴──────────────────────────────────────┘
///   ▲                          ▲
///   header                     pointer returned to the caller
/// ```
///
/// `size == 0` marks the block as free.
#[repr(C, align(16))]
pub struct Block {
  pub capacity: usize,
  pub size: usize,
  pub prev: *mut Block,
  pub next: *mut Block,
}

const _: () = assert!(HEADER_SIZE % ALIGNMENT == 0);

impl Block {
  pub fn new(
    capacity: usize,
    size: usize,
    prev: *mut Block,
    next: *mut Block,
  ) -> Self {
    Self {
      capacity,
      size,
      prev,
      next,
    }
  }

  /// Writes a fresh header at `address` and returns it.
  ///
  /// # Safety
  ///
  /// `address` must be `ALIGNMENT` aligned and writable for
  /// `HEADER_SIZE + capacity` bytes.
  pub unsafe fn write(
    address: *mut u8,
    capacity: usize,
    size: usize,
  ) -> *mut Block {
    debug_assert_eq!(address as usize % ALIGNMENT, 0);

    let block = address as *mut Block;
    unsafe {
      block.write(Block::new(
        capacity,
        size,
        ptr::null_mut(),
        ptr::null_mut(),
      ))
    };
    block
  }

  /// Recovers the header that owns `data`.
  ///
  /// No validation happens here: the header is assumed to sit exactly
  /// `HEADER_SIZE` bytes below the pointer.
  ///
  /// # Safety
  ///
  /// `data` must have been returned by [`Block::data`] on a block that is
  /// still part of the managed region.
  pub unsafe fn from_data(data: NonNull<u8>) -> *mut Block {
    unsafe { data.as_ptr().sub(HEADER_SIZE) as *mut Block }
  }

  /// Start of the data span owned by `block`.
  ///
  /// # Safety
  ///
  /// `block` must point to a live header.
  pub unsafe fn data(block: *mut Block) -> NonNull<u8> {
    unsafe { NonNull::new_unchecked((block as *mut u8).add(HEADER_SIZE)) }
  }

  /// First byte past the data span, which is where the following header
  /// starts when the list is contiguous.
  ///
  /// # Safety
  ///
  /// `block` must point to a live header.
  pub unsafe fn end(block: *mut Block) -> *mut u8 {
    unsafe { Block::data(block).as_ptr().add((*block).capacity) }
  }

  pub fn is_free(&self) -> bool {
    self.size == 0
  }

  /// Bytes of `capacity` committed to the caller's data, rounded so that a
  /// header carved after them stays aligned.
  pub fn committed(&self) -> usize {
    align_to!(self.size, ALIGNMENT)
  }

  /// Capacity owned by this block that neither its caller nor a previous
  /// split has claimed.
  pub fn excess(&self) -> usize {
    self.capacity - self.committed()
  }

  /// Whether this block can host a request of `requested` bytes: a free
  /// block is reused whole, an in-use block must spare room for the
  /// request plus the header of the block split off it.
  pub fn fits(
    &self,
    requested: usize,
  ) -> bool {
    if self.is_free() {
      return self.capacity >= requested;
    }

    requested
      .checked_add(HEADER_SIZE)
      .is_some_and(|needed| self.excess() >= needed)
  }
}
