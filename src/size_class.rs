//! Power-of-two size classes from 16 to 2048 bytes.
//!
//! ```text
//!   index │  0   1   2    3    4    5     6     7
//!   size  │ 16  32  64  128  256  512  1024  2048
//! ```

use crate::config::{MAX_SIZE, MIN_SHIFT, MIN_SIZE, NUM_CLASSES, PAGE_SIZE};

/// One of the eight block widths. Stored as its registry index, so a value
/// outside the class set cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SizeClass(u8);

/// Result of classifying a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
  Small(SizeClass),
  /// Larger than [`MAX_SIZE`]: mapped directly, never tracked.
  Oversized,
}

impl SizeClass {
  pub const SMALLEST: SizeClass = SizeClass(0);
  pub const LARGEST: SizeClass = SizeClass(NUM_CLASSES as u8 - 1);

  /// Every class in ascending order.
  pub fn all() -> impl Iterator<Item = SizeClass> {
    (0..NUM_CLASSES as u8).map(SizeClass)
  }

  pub const fn from_index(
    index: usize,
  ) -> Option<SizeClass> {
    if index < NUM_CLASSES {
      Some(SizeClass(index as u8))
    } else {
      None
    }
  }

  /// Exact membership test: `Some` only for 16, 32, ..., 2048.
  pub const fn from_size(
    size: usize,
  ) -> Option<SizeClass> {
    if size < MIN_SIZE || size > MAX_SIZE || !size.is_power_of_two() {
      return None;
    }
    Some(SizeClass((size.trailing_zeros() - MIN_SHIFT) as u8))
  }

  /// Registry slot, `log2(size) - 4`.
  #[inline]
  pub const fn index(
    self,
  ) -> usize {
    self.0 as usize
  }

  #[inline]
  pub const fn size(
    self,
  ) -> usize {
    MIN_SIZE << self.0
  }

  /// Blocks threaded into one carved page. The first block's worth of
  /// space holds the page header.
  pub const fn blocks_per_page(
    self,
  ) -> usize {
    PAGE_SIZE / self.size() - 1
  }
}

/// Rounds `requested` up to the smallest class that fits it.
///
/// Zero is served from the smallest class.
pub const fn classify(
  requested: usize,
) -> Class {
  if requested > MAX_SIZE {
    return Class::Oversized;
  }
  if requested <= MIN_SIZE {
    return Class::Small(SizeClass::SMALLEST);
  }
  let rounded = requested.next_power_of_two();
  Class::Small(SizeClass((rounded.trailing_zeros() - MIN_SHIFT) as u8))
}

/// Like [`classify`], for malloc shims that receive the size as a signed
/// integer (`ssize_t`, `int`) and may see it go negative through an
/// underflow. Anything at or below zero gets the minimum allocation unit
/// instead of being mistaken for an oversized request.
pub const fn classify_signed(
  requested: isize,
) -> Class {
  if requested <= 0 {
    Class::Small(SizeClass::SMALLEST)
  } else {
    classify(requested as usize)
  }
}
