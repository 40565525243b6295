use thiserror::Error;

/// The operating system refused to hand out memory.
///
/// The heap has no other memory source, so outside of [`Heap::try_allocate`]
/// this is always turned into process termination.
///
/// [`Heap::try_allocate`]: crate::Heap::try_allocate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MapError {
  #[error("mmap of {len} bytes failed (errno {errno})")]
  Failed { len: usize, errno: i32 },
  #[error("request of {requested} bytes cannot be rounded to whole pages")]
  TooLarge { requested: usize },
}

/// A pointer whose page does not start with a valid header.
///
/// Covers stack and static addresses, memory from other allocators and every
/// oversized region, since those are mapped without a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{addr:#x} was not allocated by this heap")]
pub struct InvalidPointer {
  pub addr: usize,
}
