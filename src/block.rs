use std::ptr;

/// View of a free block while it sits on a free list. The link overwrites
/// the block's first word; nothing else in the block is touched.
#[repr(C)]
pub struct FreeBlock {
  pub next: *mut FreeBlock,
}

impl FreeBlock {
  /// Reinterprets `addr` as a list node and sets its link.
  ///
  /// # Safety
  ///
  /// `addr` must be writable for one pointer and aligned for it.
  #[inline]
  pub unsafe fn init(
    addr: *mut u8,
    next: *mut FreeBlock,
  ) -> *mut FreeBlock {
    let block = addr.cast::<FreeBlock>();
    unsafe { ptr::write(block, FreeBlock { next }) };
    block
  }
}
