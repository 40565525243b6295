//! Where pages come from.

use std::ptr::{self, NonNull};

use libc::{MAP_ANONYMOUS, MAP_FAILED, MAP_PRIVATE, PROT_READ, PROT_WRITE, c_void};

use crate::error::MapError;

/// A source of zero-filled, page-aligned memory that is never given back.
pub trait PageSource {
  /// Maps `len` bytes. `len` is always a non-zero multiple of `PAGE_SIZE`.
  fn map(
    &self,
    len: usize,
  ) -> Result<NonNull<u8>, MapError>;
}

/// Anonymous private mappings straight from the kernel.
#[derive(Debug, Default, Clone, Copy)]
pub struct Mmap;

impl PageSource for Mmap {
  fn map(
    &self,
    len: usize,
  ) -> Result<NonNull<u8>, MapError> {
    let addr = unsafe {
      libc::mmap(
        ptr::null_mut::<c_void>(),
        len,
        PROT_READ | PROT_WRITE,
        MAP_ANONYMOUS | MAP_PRIVATE,
        -1,
        0,
      )
    };

    if addr == MAP_FAILED {
      return Err(MapError::Failed {
        len,
        errno: errno(),
      });
    }

    NonNull::new(addr.cast::<u8>()).ok_or(MapError::Failed { len, errno: 0 })
  }
}

#[cfg(target_os = "linux")]
fn errno() -> i32 {
  unsafe { *libc::__errno_location() }
}

#[cfg(not(target_os = "linux"))]
fn errno() -> i32 {
  0
}

#[cfg(test)]
pub(crate) mod testing {
  use std::{alloc, cell::Cell};

  use super::*;
  use crate::config::PAGE_SIZE;

  /// Counts mappings and can be told to fail. Backed by the system allocator
  /// and leaked, like the real thing.
  #[derive(Default)]
  pub struct CountingSource {
    pub maps: Cell<usize>,
    pub bytes: Cell<usize>,
    pub fail: Cell<bool>,
  }

  impl PageSource for CountingSource {
    fn map(
      &self,
      len: usize,
    ) -> Result<NonNull<u8>, MapError> {
      if self.fail.get() {
        return Err(MapError::Failed { len, errno: libc::ENOMEM });
      }
      self.maps.set(self.maps.get() + 1);
      self.bytes.set(self.bytes.get() + len);

      let layout = alloc::Layout::from_size_align(len, PAGE_SIZE).unwrap();
      NonNull::new(unsafe { alloc::alloc_zeroed(layout) }).ok_or(MapError::Failed { len, errno: 0 })
    }
  }

  /// Runs `body` in a forked child and returns the child's exit status.
  /// A body that returns normally exits with 0.
  pub fn exit_code_of<F: FnOnce()>(
    body: F,
  ) -> i32 {
    unsafe {
      let pid = libc::fork();
      assert!(pid >= 0, "fork failed");

      if pid == 0 {
        body();
        libc::_exit(0);
      }

      let mut status = 0;
      assert_eq!(libc::waitpid(pid, &mut status, 0), pid);
      assert!(libc::WIFEXITED(status), "child did not exit normally: {:#x}", status);
      libc::WEXITSTATUS(status)
    }
  }
}
