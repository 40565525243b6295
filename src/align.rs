/// Rounds `value` up to the next multiple of `align`, which must be a power of two.
///
/// # Examples
///
/// ```rust
/// use segalloc::align_to;
///
/// assert_eq!(align_to!(1, 4096), 4096);
/// assert_eq!(align_to!(4096, 4096), 4096);
/// assert_eq!(align_to!(4097, 4096), 8192);
/// ```
#[macro_export]
macro_rules! align_to {
  ($value:expr, $align:expr) => {
    (($value) + ($align) - 1) & !(($align) - 1)
  };
}

/// Rounds `value` down to a multiple of `align`, which must be a power of two.
///
/// # Examples
///
/// ```rust
/// use segalloc::align_down;
///
/// assert_eq!(align_down!(0x7f00_1234, 0x1000), 0x7f00_1000);
/// assert_eq!(align_down!(0x7f00_1000, 0x1000), 0x7f00_1000);
/// ```
#[macro_export]
macro_rules! align_down {
  ($value:expr, $align:expr) => {
    ($value) & !(($align) - 1)
  };
}

/// Like [`align_to!`] but returns `None` instead of wrapping past `usize::MAX`.
pub const fn checked_align_to(
  value: usize,
  align: usize,
) -> Option<usize> {
  match value.checked_add(align - 1) {
    Some(bumped) => Some(align_down!(bumped, align)),
    None => None,
  }
}
