//! Diagnostics that never touch the heap.
//!
//! Everything here goes straight to `write(2)` on stderr. No formatting,
//! no buffering, no `std::io`, since any of those may allocate and re-enter
//! the allocator that is trying to report a problem.

use libc::{STDERR_FILENO, c_void};

use crate::config::{FATAL_EXIT_CODE, LOGGING_FAILED_MSG};

/// Writes `message` to stderr.
///
/// If the write fails or comes up short, a fixed fallback message is
/// written and the process exits.
pub fn emit(
  message: &[u8],
) {
  if write_stderr(message) {
    return;
  }
  write_stderr(LOGGING_FAILED_MSG);
  exit(FATAL_EXIT_CODE);
}

/// Writes `message` to stderr once and ignores the outcome.
///
/// For reports on recoverable paths, where a broken stderr must not take
/// the process down.
pub fn try_emit(
  message: &[u8],
) {
  write_stderr(message);
}

/// Emits `message` and terminates the process.
pub fn fatal(
  message: &[u8],
) -> ! {
  emit(message);
  exit(FATAL_EXIT_CODE)
}

fn write_stderr(
  message: &[u8],
) -> bool {
  let written =
    unsafe { libc::write(STDERR_FILENO, message.as_ptr().cast::<c_void>(), message.len()) };
  written >= 0 && written as usize == message.len()
}

fn exit(
  code: i32,
) -> ! {
  // `_exit` skips atexit handlers, which are free to allocate.
  unsafe { libc::_exit(code) }
}
