use crate::{
  block::FreeBlock,
  config::PAGE_SIZE,
  error::MapError,
  header::PageHeader,
  os::PageSource,
  size_class::SizeClass,
};

/// Maps one page and threads it into a chain of `class`-wide free blocks.
///
/// ```text
///   offset 0      size        2*size            PAGE_SIZE - size
///   ┌────────────┬───────────┬───────────┬─────┬───────────┐
///   │ header     │ next ─────┼─► next ───┼─ ─ ─┼─► null    │
///   └────────────┴───────────┴───────────┴─────┴───────────┘
///                ▲
///                └── returned head
/// ```
///
/// The page is never unmapped.
pub fn carve_page<S: PageSource + ?Sized>(
  source: &S,
  class: SizeClass,
) -> Result<*mut FreeBlock, MapError> {
  let page = source.map(PAGE_SIZE)?.as_ptr();
  let size = class.size();

  unsafe {
    PageHeader::write(page, class);

    let mut next = std::ptr::null_mut();
    let mut offset = PAGE_SIZE - size;
    while offset >= size {
      next = FreeBlock::init(page.add(offset), next);
      offset -= size;
    }
    Ok(next)
  }
}
