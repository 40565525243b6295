//! Thread-safe front end.
//!
//! Same lists, same pages, same headers as [`Heap`](crate::Heap), but each
//! size class sits behind its own spin lock so threads working in different
//! classes never contend. A page is carved while its class lock is held, so
//! no thread ever sees a half-installed chain.
//!
//! The locks are spin locks because a parking mutex may allocate its wait
//! queue under contention, and that allocation would land back here.

use std::{
  alloc::{GlobalAlloc, Layout},
  ptr::{self, NonNull},
  sync::atomic::{AtomicUsize, Ordering},
};

use spin::Mutex;

use crate::{
  align::checked_align_to,
  config::{MMAP_FAILED_MSG, NUM_CLASSES, PAGE_SIZE},
  diag,
  error::{InvalidPointer, MapError},
  free_list::FreeList,
  header::PageHeader,
  heap::HeapStats,
  os::{Mmap, PageSource},
  size_class::{Class, classify},
};

/// A heap that can be shared between threads and installed with
/// `#[global_allocator]`.
///
/// ```rust,ignore
/// use segalloc::GlobalHeap;
///
/// #[global_allocator]
/// static HEAP: GlobalHeap = GlobalHeap::new();
/// ```
pub struct GlobalHeap<S: PageSource = Mmap> {
  lists: [Mutex<FreeList>; NUM_CLASSES],
  source: S,
  pages_carved: AtomicUsize,
  oversized_regions: AtomicUsize,
  oversized_bytes: AtomicUsize,
}

impl GlobalHeap<Mmap> {
  pub const fn new() -> Self {
    Self::with_source(Mmap)
  }
}

impl Default for GlobalHeap<Mmap> {
  fn default() -> Self {
    Self::new()
  }
}

impl<S: PageSource> GlobalHeap<S> {
  pub const fn with_source(
    source: S,
  ) -> Self {
    Self {
      lists: [const { Mutex::new(FreeList::new()) }; NUM_CLASSES],
      source,
      pages_carved: AtomicUsize::new(0),
      oversized_regions: AtomicUsize::new(0),
      oversized_bytes: AtomicUsize::new(0),
    }
  }

  pub fn stats(
    &self,
  ) -> HeapStats {
    HeapStats {
      pages_carved: self.pages_carved.load(Ordering::Relaxed),
      oversized_regions: self.oversized_regions.load(Ordering::Relaxed),
      oversized_bytes: self.oversized_bytes.load(Ordering::Relaxed),
    }
  }

  /// See [`Heap::allocate`](crate::Heap::allocate).
  pub fn allocate(
    &self,
    size: usize,
  ) -> NonNull<u8> {
    match self.try_allocate(size) {
      Ok(ptr) => ptr,
      Err(_) => diag::fatal(MMAP_FAILED_MSG),
    }
  }

  pub fn try_allocate(
    &self,
    size: usize,
  ) -> Result<NonNull<u8>, MapError> {
    match classify(size) {
      Class::Oversized => {
        let len = checked_align_to(size, PAGE_SIZE).ok_or(MapError::TooLarge { requested: size })?;
        let region = self.source.map(len)?;
        self.oversized_regions.fetch_add(1, Ordering::Relaxed);
        self.oversized_bytes.fetch_add(len, Ordering::Relaxed);
        Ok(region)
      }
      Class::Small(class) => {
        let (block, carved) = self.lists[class.index()].lock().pop_or_carve(class, &self.source)?;
        if carved {
          self.pages_carved.fetch_add(1, Ordering::Relaxed);
        }
        Ok(block)
      }
    }
  }

  /// See [`Heap::free`](crate::Heap::free).
  ///
  /// # Safety
  ///
  /// Same contract as [`Heap::free`](crate::Heap::free).
  pub unsafe fn free(
    &self,
    ptr: *mut u8,
  ) -> Result<(), InvalidPointer> {
    if ptr.is_null() {
      return Ok(());
    }

    // Headers are immutable once written, so they can be read unlocked.
    let (class, block) = unsafe { PageHeader::locate(ptr as usize) }?;
    let block = NonNull::new(block as *mut u8).ok_or(InvalidPointer { addr: ptr as usize })?;
    unsafe { self.lists[class.index()].lock().push(block) };
    Ok(())
  }

  /// See [`Heap::usable_size`](crate::Heap::usable_size).
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

/// Blocks of class `c` sit at multiples of `c` inside a page-aligned page,
/// so asking for `max(size, align)` bytes honours any alignment up to the
/// largest class. Oversized regions are page-aligned.
fn effective_size(
  layout: Layout,
) -> usize {
  layout.size().max(layout.align())
}

unsafe impl<S: PageSource + Sync> GlobalAlloc for GlobalHeap<S> {
  unsafe fn alloc(
    &self,
    layout: Layout,
  ) -> *mut u8 {
    if layout.align() > PAGE_SIZE {
      return ptr::null_mut();
    }

    match self.try_allocate(effective_size(layout)) {
      Ok(ptr) => ptr.as_ptr(),
      Err(_) => ptr::null_mut(),
    }
  }

  unsafe fn dealloc(
    &self,
    ptr: *mut u8,
    layout: Layout,
  ) {
    // Oversized regions have no header to consult and are never reclaimed.
    if classify(effective_size(layout)) == Class::Oversized {
      return;
    }

    let _ = unsafe { self.free(ptr) };
  }
}
