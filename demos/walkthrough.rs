use std::io::Read;

use arenalloc::{Arena, HeapDump, Payload};
use libc::sbrk;

/// Waits until the user presses ENTER when running with `--step`.
fn block_until_enter_pressed(step: bool) {
  if !step {
    return;
  }
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

/// Prints the current program break using `sbrk(0)`.
/// The arena lives inside this process image, so the break should never move
/// because of it.
fn print_program_break(label: &str) {
  println!(
    "[{}] PID = {}, program break (sbrk(0)) = {:?}",
    label,
    std::process::id(),
    unsafe { sbrk(0) },
  );
}

fn print_alloc(
  label: &str,
  requested: usize,
  arena: &Arena,
  payload: Payload,
) {
  println!(
    "{label} requested {} bytes, payload offset = {}, usable = {}",
    requested,
    payload.offset(),
    arena.usable_size(payload)
  );
}

fn print_dump(dump: &HeapDump) {
  println!("{dump}");
}

fn main() {
  let step = std::env::args().any(|arg| arg == "--step");

  let mut arena: Arena = Arena::new();

  print_program_break("start");
  arena.init();
  println!("\n[0] Fresh arena, capacity = {} bytes", arena.capacity());
  print_dump(&arena.dump());
  block_until_enter_pressed(step);

  // --------------------------------------------------------------------
  // 1) Allocate a u32 and write to it.
  // --------------------------------------------------------------------
  let first = match arena.allocate(4) {
    Ok(payload) => payload,
    Err(err) => {
      eprintln!("[1] {err}");
      return;
    }
  };
  print_alloc("[1]", 4, &arena, first);
  arena.bytes_mut(first)[..4].copy_from_slice(&0xDEADBEEFu32.to_ne_bytes());
  println!("[1] Wrote 0xDEADBEEF into the first block");
  block_until_enter_pressed(step);

  // --------------------------------------------------------------------
  // 2) Allocate 12 bytes. The request is rounded up to the alignment unit.
  // --------------------------------------------------------------------
  let second = match arena.allocate(12) {
    Ok(payload) => payload,
    Err(err) => {
      eprintln!("[2] {err}");
      return;
    }
  };
  print_alloc("[2]", 12, &arena, second);
  arena.bytes_mut(second).fill(0xAB);
  print_dump(&arena.dump());
  block_until_enter_pressed(step);

  // --------------------------------------------------------------------
  // 3) Release the first block and ask for something smaller.
  //    First fit hands the freed block straight back.
  // --------------------------------------------------------------------
  arena.release(first);
  println!("\n[3] Released the first block at offset {}", first.offset());
  let third = match arena.allocate(2) {
    Ok(payload) => payload,
    Err(err) => {
      eprintln!("[3] {err}");
      return;
    }
  };
  print_alloc("[3]", 2, &arena, third);
  println!(
    "[3] third == first? {}",
    if third == first {
      "Yes, it reused the freed block"
    } else {
      "No, it allocated somewhere else"
    }
  );
  block_until_enter_pressed(step);

  // --------------------------------------------------------------------
  // 4) Release everything. Neighbouring free blocks coalesce back into one.
  // --------------------------------------------------------------------
  arena.release(third);
  arena.release(second);
  println!("\n[4] Released all blocks");
  print_dump(&arena.dump());
  block_until_enter_pressed(step);

  // --------------------------------------------------------------------
  // 5) Zero-byte and oversized requests fail without touching the chain.
  // --------------------------------------------------------------------
  for size in [0, arena.capacity()] {
    match arena.allocate(size) {
      Ok(payload) => print_alloc("[5]", size, &arena, payload),
      Err(err) => println!("[5] allocate({size}) failed: {err}"),
    }
  }
  print_program_break("end");

  println!("\n[6] End of walkthrough.");
}
