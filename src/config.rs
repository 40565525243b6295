//! Process-wide constants. None of these can be overridden at runtime.

/// Granularity of every mapping requested from the operating system.
pub const PAGE_SIZE: usize = 0x1000;

/// Sentinel written at the start of every carved page.
pub const MAGIC: u32 = 0xA991E;

/// Smallest block handed out, also the width used for zero-byte requests.
pub const MIN_SIZE: usize = 16;

/// Largest block served from a free list. Anything bigger is mapped directly.
pub const MAX_SIZE: usize = 2048;

/// Number of size classes between `MIN_SIZE` and `MAX_SIZE` inclusive.
pub const NUM_CLASSES: usize = 8;

/// `log2(MIN_SIZE)`, subtracted from `log2(size)` to get a class index.
pub const MIN_SHIFT: u32 = MIN_SIZE.trailing_zeros();

/// Returned by `xxmalloc_usable_size` for pointers this heap never produced.
pub const INVALID_SIZE: usize = usize::MAX;

/// Exit status used when the heap gives up.
pub const FATAL_EXIT_CODE: i32 = 2;

pub const MMAP_FAILED_MSG: &[u8] = b"mmap failed! Giving up.\n";
pub const INVALID_FREE_MSG: &[u8] = b"pointer not allocated using custom malloc\n";
pub const LOGGING_FAILED_MSG: &[u8] = b"logging failed\n";

const _: () = assert!(MIN_SIZE << (NUM_CLASSES - 1) == MAX_SIZE);
const _: () = assert!(MAX_SIZE < PAGE_SIZE);
