use std::{io::Read, ptr};

use brkalloc::{FitPolicy, global};
use libc::sbrk;

/// Waits until the user presses ENTER.
/// Useful when you want to inspect memory state with tools like `pmap`,
/// `gdb`, or just visually track how the program break moves.
fn block_until_enter_pressed() {
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

/// Prints the current program break using `sbrk(0)`.
unsafe fn print_program_break(label: &str) {
  println!(
    "[{}] PID = {}, program break (sbrk(0)) = {:?}",
    label,
    std::process::id(),
    unsafe { sbrk(0) },
  );
}

fn print_heap_map() {
  let base = global::low_water_mark();
  if let Err(err) = global::dump_report(base) {
    eprintln!("heap map failed: {err}");
  }
}

fn main() {
  global::set_log_target(Some(Box::new(std::io::stdout())));
  global::set_fit_policy(FitPolicy::NextFit);

  unsafe {
    print_program_break("start");
    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 1) Three small allocations share the first chunk: the first one grows
    //    the region, the next two are split off its excess.
    // --------------------------------------------------------------------
    let a = global::allocate(10).unwrap().unwrap();
    let b = global::allocate(20).unwrap().unwrap();
    let c = global::allocate(30).unwrap().unwrap();
    ptr::write_bytes(b.as_ptr(), 0xAB, 20);
    println!("\n[1] a = {:?}, b = {:?}, c = {:?}", a, b, c);
    print_program_break("after three allocations");
    print_heap_map();

    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 2) Release b. The cursor moves onto it, so the next request of the
    //    same size lands in the same spot without growing the region.
    // --------------------------------------------------------------------
    global::release(Some(b));
    let again = global::allocate(20).unwrap().unwrap();
    println!(
      "\n[2] again == b? {}",
      if again == b { "Yes, the freed block was reused" } else { "No" }
    );
    print_heap_map();

    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 3) Grow a block past its capacity. The contents move to a new block
    //    and the old one is released.
    // --------------------------------------------------------------------
    let grown = global::resize(Some(a), 6000).unwrap().unwrap();
    println!("\n[3] a moved from {:?} to {:?}", a, grown);
    print_program_break("after resize");
    print_heap_map();

    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 4) Release everything: all blocks coalesce into one free block.
    // --------------------------------------------------------------------
    global::release(Some(again));
    global::release(Some(c));
    global::release(Some(grown));
    println!("\n[4] everything released");
    print_heap_map();

    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 5) Reset gives the whole region back.
    // --------------------------------------------------------------------
    global::reset();
    print_program_break("after reset");
  }
}
