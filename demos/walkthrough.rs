use std::io::Read;

use segalloc::{Heap, page_base};

/// Waits until the user presses ENTER.
/// Useful when you want to inspect the mappings with tools like `pmap`,
/// `/proc/<pid>/maps` or `gdb` while the heap grows.
fn block_until_enter_pressed() {
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

fn print_alloc(
  heap: &Heap,
  requested: usize,
  addr: *mut u8,
) {
  let usable = unsafe { heap.usable_size(addr) };
  println!(
    "Requested {} bytes, address = {:?}, page = {:#x}, usable = {:?}",
    requested,
    addr,
    page_base(addr as usize),
    usable,
  );
}

fn main() {
  // The demo itself runs on the system allocator; `heap` is only driven
  // explicitly below.
  let mut heap = Heap::new();

  println!("PID = {}", std::process::id());
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 1) Allocate 24 bytes. The 32-byte class is empty, so one page is
  //    mapped and carved into 127 blocks.
  // --------------------------------------------------------------------
  let first = heap.allocate(24).as_ptr();
  println!("\n[1] Allocate 24 bytes");
  print_alloc(&heap, 24, first);
  println!("[1] Stats: {:?}", heap.stats());

  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 2) Allocate 20 more bytes from the same class. No new page is needed:
  //    the block right after the first one is handed out.
  // --------------------------------------------------------------------
  let second = heap.allocate(20).as_ptr();
  println!("\n[2] Allocate 20 bytes");
  print_alloc(&heap, 20, second);
  println!("[2] Distance from first block = {} bytes", second as usize - first as usize);

  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 3) Free the first block and allocate again. Lists are LIFO, so the
  //    freed block comes straight back.
  // --------------------------------------------------------------------
  unsafe { heap.free(first).expect("first block came from this heap") };
  let third = heap.allocate(30).as_ptr();
  println!("\n[3] Free first block, allocate 30 bytes");
  print_alloc(&heap, 30, third);
  println!(
    "[3] third == first? {}",
    if third == first {
      "Yes, it reused the freed block"
    } else {
      "No, it allocated somewhere else"
    }
  );

  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 4) Try to free a stack address. The page it lives on has no header,
  //    so the heap refuses it and nothing changes.
  // --------------------------------------------------------------------
  let mut local = [0u8; 16];
  let result = unsafe { heap.free(local.as_mut_ptr()) };
  println!("\n[4] Free a stack address: {:?}", result);

  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 5) Allocate 64 KiB. That is above the largest class, so it gets its
  //    own mapping, without a header, that can never be freed.
  // --------------------------------------------------------------------
  let big = heap.allocate(64 * 1024).as_ptr();
  println!("\n[5] Allocate 64 KiB");
  print_alloc(&heap, 64 * 1024, big);
  println!("[5] Stats: {:?}", heap.stats());

  block_until_enter_pressed();

  println!("\n[6] End of example. Pages are only released when the process exits.");
}
