//! Page header codec.
//!
//! ```text
//!   page base (PAGE_SIZE aligned)
//!   ┌──────────────┬─────────┬─────────┬─────┬─────────┐
//!   │ tag │ size   │ block 1 │ block 2 │ ... │ block n │
//!   └──────────────┴─────────┴─────────┴─────┴─────────┘
//!   ◄─ one block ─►
//! ```
//!
//! Any pointer into a carved page is masked down to the page base to find the
//! header. Whatever sits at that address is untrusted until [`PageHeader::read`]
//! has checked the tag and the recorded size.

use std::{mem, ptr};

use crate::{
  config::{MAGIC, MIN_SIZE, PAGE_SIZE},
  error::InvalidPointer,
  size_class::SizeClass,
};

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct PageHeader {
  pub tag: u32,
  pub block_size: usize,
}

const _: () = assert!(mem::size_of::<PageHeader>() <= MIN_SIZE);

/// Base address of the page containing `addr`.
#[inline]
pub const fn page_base(
  addr: usize,
) -> usize {
  crate::align_down!(addr, PAGE_SIZE)
}

impl PageHeader {
  /// Stamps a header at the start of a freshly mapped page.
  ///
  /// # Safety
  ///
  /// `page` must be page-aligned and writable for `PAGE_SIZE` bytes.
  pub unsafe fn write(
    page: *mut u8,
    class: SizeClass,
  ) {
    let header = PageHeader {
      tag: MAGIC,
      block_size: class.size(),
    };
    unsafe { ptr::write(page.cast::<PageHeader>(), header) };
  }

  /// Recovers the size class of the block containing `addr`.
  ///
  /// Returns `None` when the page does not carry a valid header.
  ///
  /// # Safety
  ///
  /// The page containing `addr` must be mapped and readable.
  pub unsafe fn read(
    addr: usize,
  ) -> Option<SizeClass> {
    let header = page_base(addr) as *const PageHeader;
    // Foreign pages may hold anything at this offset.
    let tag = unsafe { ptr::read_volatile(ptr::addr_of!((*header).tag)) };
    if tag != MAGIC {
      return None;
    }
    let block_size = unsafe { ptr::read_volatile(ptr::addr_of!((*header).block_size)) };
    SizeClass::from_size(block_size)
  }

  /// Maps any pointer into a live block back to that block's start and class.
  ///
  /// Pointers into the header itself are rejected.
  ///
  /// # Safety
  ///
  /// The page containing `addr` must be mapped and readable.
  pub unsafe fn locate(
    addr: usize,
  ) -> Result<(SizeClass, usize), InvalidPointer> {
    let class = unsafe { PageHeader::read(addr) }.ok_or(InvalidPointer { addr })?;
    let block = crate::align_down!(addr, class.size());
    if block == page_base(addr) {
      return Err(InvalidPointer { addr });
    }
    Ok((class, block))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[repr(C, align(4096))]
  struct Page([u8; PAGE_SIZE]);

  impl Page {
    fn zeroed() -> Box<Page> {
      Box::new(Page([0; PAGE_SIZE]))
    }
  }

  #[test]
  fn test_page_base() {
    assert_eq!(page_base(0x1000), 0x1000);
    assert_eq!(page_base(0x1fff), 0x1000);
    assert_eq!(page_base(0x2010), 0x2000);
  }

  #[test]
  fn test_write_then_read_from_interior() {
    let mut page = Page::zeroed();
    let base = page.0.as_mut_ptr();
    let class = SizeClass::from_size(256).unwrap();

    unsafe {
      PageHeader::write(base, class);

      for offset in [0, 256, 1000, PAGE_SIZE - 1] {
        assert_eq!(PageHeader::read(base as usize + offset), Some(class));
      }
    }
  }

  #[test]
  fn test_zeroed_page_has_no_header() {
    let page = Page::zeroed();
    unsafe {
      assert_eq!(PageHeader::read(page.0.as_ptr() as usize + 64), None);
    }
  }

  #[test]
  fn test_tag_with_bogus_size_is_rejected() {
    let mut page = Page::zeroed();
    let header = page.0.as_mut_ptr().cast::<PageHeader>();

    unsafe {
      ptr::write(header, PageHeader { tag: MAGIC, block_size: 48 });
      assert_eq!(PageHeader::read(header as usize + 100), None);

      ptr::write(header, PageHeader { tag: MAGIC, block_size: 64 });
      assert_eq!(PageHeader::read(header as usize + 100), SizeClass::from_size(64));
    }
  }

  #[test]
  fn test_locate_rounds_to_block_start() {
    let mut page = Page::zeroed();
    let base = page.0.as_mut_ptr() as usize;
    let class = SizeClass::from_size(128).unwrap();

    unsafe {
      PageHeader::write(base as *mut u8, class);

      assert_eq!(PageHeader::locate(base + 128), Ok((class, base + 128)));
      assert_eq!(PageHeader::locate(base + 300), Ok((class, base + 256)));
      assert_eq!(PageHeader::locate(base + 8), Err(InvalidPointer { addr: base + 8 }));
    }
  }
}
