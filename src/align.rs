/// Alignment of every header and every data pointer handed out by the
/// allocator. Matches `max_align_t` on the common 64 bit targets.
pub const ALIGNMENT: usize = 16;

/// Calculates the machine word alignment for the given size.
///
/// # Examples
///
/// ```rust
/// use brkalloc::align;
///
/// match std::mem::size_of::<usize>() {
///     8 => assert_eq!(align!(13), 16), // 64 bit machine.
///     4 => assert_eq!(align!(11), 12), // 32 bit machine.
///     _ => {},
/// };
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    $crate::align_to!($value, ::core::mem::size_of::<usize>())
  };
}

/// Rounds `value` up to the next multiple of `alignment`, which must be a
/// power of two.
///
/// ```rust
/// use brkalloc::align_to;
///
/// assert_eq!(align_to!(1, 16), 16);
/// assert_eq!(align_to!(32, 16), 32);
/// assert_eq!(align_to!(33, 16), 48);
/// ```
#[macro_export]
macro_rules! align_to {
  ($value:expr, $alignment:expr) => {
    ($value + $alignment - 1) & !($alignment - 1)
  };
}

/// Like [`align_to!`] but returns `None` instead of wrapping around.
pub fn checked_align(
  value: usize,
  alignment: usize,
) -> Option<usize> {
  debug_assert!(alignment.is_power_of_two());
  value
    .checked_add(alignment - 1)
    .map(|v| v & !(alignment - 1))
}
