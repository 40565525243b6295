//! Intrusive LIFO free lists, one per size class.
//!
//! This and [`carver`](crate::carver) are the only places that treat a block
//! as a [`FreeBlock`] node. Everything outside sees plain `NonNull<u8>`.

use std::ptr::{self, NonNull};

use crate::{
  block::FreeBlock,
  carver::carve_page,
  config::NUM_CLASSES,
  error::MapError,
  os::PageSource,
  size_class::SizeClass,
};

pub struct FreeList {
  head: *mut FreeBlock,
}

// The list only holds addresses inside pages that are never unmapped.
unsafe impl Send for FreeList {}

impl FreeList {
  pub const fn new() -> Self {
    Self {
      head: ptr::null_mut(),
    }
  }

  #[inline]
  pub fn is_empty(
    &self,
  ) -> bool {
    self.head.is_null()
  }

  /// Detaches the head block, or `None` when the list is empty.
  #[inline]
  pub fn pop(
    &mut self,
  ) -> Option<NonNull<u8>> {
    let block = NonNull::new(self.head)?;
    self.head = unsafe { (*block.as_ptr()).next };
    Some(block.cast())
  }

  /// Makes `block` the new head. Its first word is overwritten.
  ///
  /// # Safety
  ///
  /// `block` must be a block of this list's class that is not currently on
  /// any list, and the caller must give up all access to it.
  #[inline]
  pub unsafe fn push(
    &mut self,
    block: NonNull<u8>,
  ) {
    self.head = unsafe { FreeBlock::init(block.as_ptr(), self.head) };
  }

  /// Installs a freshly carved chain. Only valid on an empty list.
  fn install(
    &mut self,
    chain: *mut FreeBlock,
  ) {
    debug_assert!(self.is_empty());
    self.head = chain;
  }

  /// Pops a block, carving a new page first if the list has run dry.
  ///
  /// Returns the block and whether a page was carved.
  pub fn pop_or_carve<S: PageSource + ?Sized>(
    &mut self,
    class: SizeClass,
    source: &S,
  ) -> Result<(NonNull<u8>, bool), MapError> {
    let carved = if self.is_empty() {
      self.install(carve_page(source, class)?);
      true
    } else {
      false
    };

    match self.pop() {
      Some(block) => Ok((block, carved)),
      // A carved page always holds at least one block.
      None => unreachable!("carved page for {} bytes produced no blocks", class.size()),
    }
  }
}

impl Default for FreeList {
  fn default() -> Self {
    Self::new()
  }
}

/// All eight lists. Owned by a single heap and reached through `&mut`.
pub struct Registry {
  lists: [FreeList; NUM_CLASSES],
}

impl Registry {
  pub const fn new() -> Self {
    Self {
      lists: [const { FreeList::new() }; NUM_CLASSES],
    }
  }

  #[inline]
  pub fn list_mut(
    &mut self,
    class: SizeClass,
  ) -> &mut FreeList {
    &mut self.lists[class.index()]
  }
}

impl Default for Registry {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::os::testing::CountingSource;

  #[repr(C, align(16))]
  struct Slot([u8; 16]);

  #[test]
  fn test_empty_list_pops_nothing() {
    let mut list = FreeList::new();
    assert!(list.is_empty());
    assert_eq!(list.pop(), None);
  }

  #[test]
  fn test_push_pop_is_lifo() {
    let mut slots = [Slot([0; 16]), Slot([0; 16]), Slot([0; 16])];
    let ptrs: Vec<NonNull<u8>> = slots
      .iter_mut()
      .map(|slot| NonNull::new(slot.0.as_mut_ptr()).unwrap())
      .collect();

    let mut list = FreeList::new();
    unsafe {
      for &ptr in &ptrs {
        list.push(ptr);
      }
    }

    assert_eq!(list.pop(), Some(ptrs[2]));
    assert_eq!(list.pop(), Some(ptrs[1]));
    assert_eq!(list.pop(), Some(ptrs[0]));
    assert!(list.is_empty());
  }

  #[test]
  fn test_pop_or_carve_only_carves_when_empty() {
    let source = CountingSource::default();
    let class = SizeClass::LARGEST;
    let mut list = FreeList::new();

    let (first, carved) = list.pop_or_carve(class, &source).unwrap();
    assert!(carved);
    assert!(list.is_empty());

    unsafe { list.push(first) };
    let (again, carved) = list.pop_or_carve(class, &source).unwrap();
    assert!(!carved);
    assert_eq!(again, first);
    assert_eq!(source.maps.get(), 1);
  }

  #[test]
  fn test_registry_lists_are_independent() {
    let source = CountingSource::default();
    let mut registry = Registry::new();
    let small = SizeClass::SMALLEST;

    let (block, _) = registry.list_mut(small).pop_or_carve(small, &source).unwrap();
    assert!(!registry.list_mut(small).is_empty());

    for class in SizeClass::all().filter(|&c| c != small) {
      assert!(registry.list_mut(class).is_empty());
    }

    unsafe { registry.list_mut(small).push(block) };
    assert_eq!(registry.list_mut(small).pop(), Some(block));
  }
}
