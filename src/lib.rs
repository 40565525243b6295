//! # segalloc - A Segregated Free-List Allocator
//!
//! This crate provides a drop-in heap allocator built from eight fixed size
//! classes, page-sized chunks mapped straight from the kernel with `mmap`, and
//! a tag at the start of every page that lets a bare pointer be mapped back to
//! its size class.
//!
//! ## Overview
//!
//! ```text
//!   Segregated Free Lists:
//!
//!   class   head
//!   ┌──────┬──────┐    ┌─────┐    ┌─────┐    ┌─────┐
//!   │   16 │  ●───┼───►│     ├───►│     ├───►│     ├───► null
//!   ├──────┼──────┤    └─────┘    └─────┘    └─────┘
//!   │   32 │  ●───┼───► ...
//!   ├──────┼──────┤
//!   │  ... │      │
//!   ├──────┼──────┤    ┌───────────┐
//!   │ 2048 │  ●───┼───►│           ├───► null
//!   └──────┴──────┘    └───────────┘
//!
//!   Allocation pops the head of one list: O(1).
//!   Free pushes onto the head of the same list: O(1).
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   segalloc
//!   ├── align       - Alignment macros (align_to!, align_down!)
//!   ├── config      - Page size, magic tag, class bounds
//!   ├── size_class  - Request size -> size class
//!   ├── header      - Page header codec, pointer -> size class
//!   ├── carver      - Page -> chain of free blocks
//!   ├── free_list   - Intrusive per-class LIFO lists
//!   ├── heap        - Single-threaded Heap
//!   ├── global      - Thread-safe GlobalHeap, GlobalAlloc
//!   ├── abi         - xxmalloc / xxfree / xxmalloc_usable_size
//!   ├── diag        - Allocation-free stderr diagnostics
//!   └── os          - PageSource trait, mmap
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use segalloc::Heap;
//!
//! let mut heap = Heap::new();
//!
//! let ptr = heap.allocate(100);
//! unsafe {
//!     ptr.as_ptr().write_bytes(0xAB, 100);
//!     assert_eq!(heap.usable_size(ptr.as_ptr()), Ok(128));
//!
//!     heap.free(ptr.as_ptr()).unwrap();
//! }
//!
//! // The block just freed is the next one handed out in its class.
//! assert_eq!(heap.allocate(70), ptr);
//! ```
//!
//! ## How It Works
//!
//! When a class runs dry, one page is mapped and carved into blocks of that
//! class. The first block's worth of space holds the page header:
//!
//! ```text
//!   Carved 4 KiB page, 512-byte class:
//!
//!   0x...000 ┌─────────────────────┐ ◄── header: tag 0xA991E, size 512
//!            ├─────────────────────┤ ◄── block 1 (head of the chain)
//!            ├─────────────────────┤ ◄── block 2
//!            │        ...          │
//!            ├─────────────────────┤ ◄── block 7 (next = null)
//!   0x...fff └─────────────────────┘
//! ```
//!
//! `free` and `usable_size` mask the pointer down to the page boundary and
//! check the tag there. A mismatch means the pointer is foreign and nothing is
//! touched.
//!
//! Requests above 2048 bytes are rounded up to whole pages and mapped on their
//! own, with no header:
//!
//! ```text
//!   ┌────────────────────────────────────────────────┐
//!   │     user data (page multiple, never freed)     │
//!   └────────────────────────────────────────────────┘
//! ```
//!
//! ## Features
//!
//! - **O(1) everything**: allocate, free and usable-size never walk a list
//! - **No side tables**: the size class lives in the page itself
//! - **Never reentrant**: no allocator path formats, buffers or allocates
//! - **Thread-safe front end**: [`GlobalHeap`] locks each class separately
//!
//! ## Limitations
//!
//! - **No coalescing**: a freed block only ever returns to its own class
//! - **Pages are never returned**: resident memory only grows
//! - **Oversized leaks**: allocations above 2048 bytes can't be freed or queried
//! - **Unix-only**: requires `libc` and `mmap`
//!
//! ## Safety
//!
//! Freeing and querying read the page a pointer lives in, so both are
//! `unsafe`: the pointer must at least point into mapped memory.

pub mod align;
mod block;
mod carver;
pub mod config;
pub mod diag;
mod error;
mod free_list;
mod global;
mod header;
mod heap;
pub mod os;
mod size_class;

pub mod abi;

pub use error::{InvalidPointer, MapError};
pub use global::GlobalHeap;
pub use header::{PageHeader, page_base};
pub use heap::{Heap, HeapStats};
pub use os::{Mmap, PageSource};
pub use size_class::{Class, SizeClass, classify, classify_signed};
