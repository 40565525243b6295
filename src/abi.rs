//! C entry points.
//!
//! A malloc shim interposes `malloc`, `free` and `malloc_usable_size` on top
//! of these. All of them share one process-wide [`GlobalHeap`].

use std::ffi::{CStr, c_char, c_void};

use crate::{
  config::{INVALID_FREE_MSG, INVALID_SIZE},
  diag,
  global::GlobalHeap,
};

static HEAP: GlobalHeap = GlobalHeap::new();

/// The heap behind the C entry points.
pub fn process_heap() -> &'static GlobalHeap {
  &HEAP
}

/// Allocates at least `size` bytes. Never returns null: if the operating
/// system refuses a mapping, the process exits with status 2.
#[unsafe(no_mangle)]
pub extern "C" fn xxmalloc(
  size: usize,
) -> *mut c_void {
  HEAP.allocate(size).as_ptr().cast()
}

/// Frees the block containing `ptr`. Null is ignored. Pointers this heap did
/// not hand out, oversized regions included, are reported on a best-effort
/// basis and left alone; this never terminates the process.
///
/// # Safety
///
/// `ptr` must be null or point into mapped memory, and must not be used
/// again if it was freed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn xxfree(
  ptr: *mut c_void,
) {
  if unsafe { HEAP.free(ptr.cast()) }.is_err() {
    diag::try_emit(INVALID_FREE_MSG);
  }
}

/// Size-class width of the block containing `ptr`, `0` for null and
/// [`INVALID_SIZE`] for pointers this heap did not hand out.
///
/// # Safety
///
/// `ptr` must be null or point into mapped memory.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn xxmalloc_usable_size(
  ptr: *mut c_void,
) -> usize {
  unsafe { HEAP.usable_size(ptr.cast_const().cast()) }.unwrap_or(INVALID_SIZE)
}

/// Writes a NUL-terminated message to stderr without allocating.
///
/// # Safety
///
/// `message` must be null or point to a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn xxlog_message(
  message: *const c_char,
) {
  if message.is_null() {
    return;
  }
  diag::emit(unsafe { CStr::from_ptr(message) }.to_bytes());
}

#[cfg(test)]
mod tests {
  use std::ptr;

  use libc::STDERR_FILENO;

  use super::*;
  use crate::os::testing::exit_code_of;

  #[test]
  fn test_malloc_usable_size_free_cycle() {
    let p = xxmalloc(100);
    assert!(!p.is_null());

    unsafe {
      assert_eq!(xxmalloc_usable_size(p), 128);
      xxfree(p);
    }
  }

  #[test]
  fn test_null_handling() {
    unsafe {
      assert_eq!(xxmalloc_usable_size(ptr::null_mut()), 0);
      xxfree(ptr::null_mut());
      xxlog_message(ptr::null());
    }
  }

  #[test]
  fn test_unknown_pointer_reports_invalid_size() {
    let mut local = 0u64;
    let p = ptr::addr_of_mut!(local).cast::<c_void>();

    unsafe {
      assert_eq!(xxmalloc_usable_size(p), INVALID_SIZE);
      xxfree(p);
    }
    assert_eq!(local, 0);
  }

  #[test]
  fn test_oversized_is_unqueryable() {
    let p = xxmalloc(3000);
    unsafe {
      ptr::write_bytes(p.cast::<u8>(), 0x11, 3000);
      assert_eq!(xxmalloc_usable_size(p), INVALID_SIZE);
    }
    assert!(process_heap().stats().oversized_regions >= 1);
  }

  #[test]
  fn test_log_message() {
    unsafe { xxlog_message(c"segalloc abi log test\n".as_ptr()) };
  }

  #[test]
  fn test_invalid_free_survives_closed_stderr() {
    let code = exit_code_of(|| {
      let mut local = 0u64;
      unsafe {
        libc::close(STDERR_FILENO);
        xxfree(ptr::addr_of_mut!(local).cast::<c_void>());

        let big = xxmalloc(3000);
        xxfree(big);
      }
    });
    assert_eq!(code, 0);
  }
}
