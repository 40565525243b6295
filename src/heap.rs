use std::ptr::NonNull;

use crate::{
  align::checked_align_to,
  config::{MMAP_FAILED_MSG, PAGE_SIZE},
  diag,
  error::{InvalidPointer, MapError},
  free_list::Registry,
  header::PageHeader,
  os::{Mmap, PageSource},
  size_class::{Class, classify},
};

/// Counters for the events that grow the heap.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HeapStats {
  pub pages_carved: usize,
  pub oversized_regions: usize,
  pub oversized_bytes: usize,
}

/// Single-threaded segregated free-list heap.
///
/// Owns its eight free lists outright; every operation goes through `&mut
/// self`, so sharing one across threads needs [`GlobalHeap`] instead.
///
/// [`GlobalHeap`]: crate::GlobalHeap
pub struct Heap<S: PageSource = Mmap> {
  registry: Registry,
  source: S,
  stats: HeapStats,
}

impl Heap<Mmap> {
  pub const fn new() -> Self {
    Self::with_source(Mmap)
  }
}

impl Default for Heap<Mmap> {
  fn default() -> Self {
    Self::new()
  }
}

impl<S: PageSource> Heap<S> {
  pub const fn with_source(
    source: S,
  ) -> Self {
    Self {
      registry: Registry::new(),
      source,
      stats: HeapStats {
        pages_carved: 0,
        oversized_regions: 0,
        oversized_bytes: 0,
      },
    }
  }

  pub fn stats(
    &self,
  ) -> HeapStats {
    self.stats
  }

  pub fn source(
    &self,
  ) -> &S {
    &self.source
  }

  /// Allocates at least `size` bytes, terminating the process if the
  /// operating system runs out of pages.
  pub fn allocate(
    &mut self,
    size: usize,
  ) -> NonNull<u8> {
    match self.try_allocate(size) {
      Ok(ptr) => ptr,
      Err(_) => diag::fatal(MMAP_FAILED_MSG),
    }
  }

  /// Allocates at least `size` bytes.
  ///
  /// Requests up to 2048 bytes get one whole size-class block. Larger
  /// requests get a page-rounded mapping of their own that can never be
  /// freed or queried.
  pub fn try_allocate(
    &mut self,
    size: usize,
  ) -> Result<NonNull<u8>, MapError> {
    match classify(size) {
      Class::Oversized => {
        let len = checked_align_to(size, PAGE_SIZE).ok_or(MapError::TooLarge { requested: size })?;
        let region = self.source.map(len)?;
        self.stats.oversized_regions += 1;
        self.stats.oversized_bytes += len;
        Ok(region)
      }
      Class::Small(class) => {
        let (block, carved) = self.registry.list_mut(class).pop_or_carve(class, &self.source)?;
        if carved {
          self.stats.pages_carved += 1;
        }
        Ok(block)
      }
    }
  }

  /// Returns the block containing `ptr` to its free list.
  ///
  /// Null is accepted and ignored. A pointer whose page carries no valid
  /// header is rejected without touching any list; this includes every
  /// oversized region.
  ///
  /// # Safety
  ///
  /// `ptr` must be null or point into mapped memory. If it came from this
  /// heap, its block must be live and is given up by the caller.
  pub unsafe fn free(
    &mut self,
    ptr: *mut u8,
  ) -> Result<(), InvalidPointer> {
    if ptr.is_null() {
      return Ok(());
    }

    let (class, block) = unsafe { PageHeader::locate(ptr as usize) }?;
    let block = NonNull::new(block as *mut u8).ok_or(InvalidPointer { addr: ptr as usize })?;
    unsafe { self.registry.list_mut(class).push(block) };
    Ok(())
  }

  /// Width of the block containing `ptr`, i.e. its whole size class, not
  /// the size that was asked for. Null yields zero.
  ///
  /// # Safety
  ///
  /// `ptr` must be null or point into mapped memory.
  pub unsafe fn usable_size(
    &self,
    ptr: *const u8,
  ) -> Result<usize, InvalidPointer> {
    if ptr.is_null() {
      return Ok(0);
    }

    let (class, _) = unsafe { PageHeader::locate(ptr as usize) }?;
    Ok(class.size())
  }
}
