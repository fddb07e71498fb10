use std::io::Read;

use balloc::BestFitAllocator;

/// Waits until the user presses ENTER.
/// Useful when you want to compare consecutive heap dumps at your own pace,
/// or inspect the mapping with tools like `pmap` while the process is parked.
fn block_until_enter_pressed() {
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

fn main() {
  // Run with RUST_LOG=debug to also see the allocator's own trace of every
  // placement, split, free, and merge decision.
  env_logger::init();

  // The heap under demonstration. It owns one fixed mmap'd region; every
  // allocation and free below happens inside that region.
  let mut heap = BestFitAllocator::new();

  heap.init(4096).expect("could not initialize the heap");

  println!("[0] Initialized a {}-byte heap (PID = {})", heap.capacity(), std::process::id());

  // One free block spanning the whole capacity, then the end of the heap.
  heap.dump();
  block_until_enter_pressed();

  unsafe {
    // --------------------------------------------------------------------
    // 1) Allocate 100 bytes.
    //    Header overhead is added and the total is rounded up to the 8-byte
    //    quantum, so the block itself occupies 112 bytes. It is split off
    //    the front of the single free block.
    // --------------------------------------------------------------------
    let first = heap.alloc(100).expect("alloc(100) failed").as_ptr();
    println!("\n[1] alloc(100) -> {first:?}");
    heap.dump();

    // Write something into the allocated memory to show it's usable.
    first.write(0xEF);
    println!("[1] Value written through first = 0x{:X}", first.read());

    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 2) Allocate 50 more bytes. Same story: the free remainder is split
    //    again, and the new block lands right after the first one.
    // --------------------------------------------------------------------
    let second = heap.alloc(50).expect("alloc(50) failed").as_ptr();
    println!("\n[2] alloc(50) -> {second:?}");
    println!(
      "[2] Distance from first = {} bytes (first's block size)",
      second as usize - first as usize
    );
    heap.dump();

    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 3) Free the first allocation.
    //
    //    Note what the dump shows afterwards: the hole is NOT merged with
    //    anything. The second allocation separates it from the trailing
    //    free space, and merging is deferred anyway.
    // --------------------------------------------------------------------
    heap.free(first).expect("free(first) failed");
    println!("\n[3] free(first)");
    heap.dump();

    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 4) Best fit in action: ask for 100 bytes again.
    //    Both the 112-byte hole and the large trailing free block qualify;
    //    the smaller hole wins, so the pointer comes back identical.
    // --------------------------------------------------------------------
    let third = heap.alloc(100).expect("alloc(100) failed").as_ptr();
    println!("\n[4] alloc(100) -> {third:?}");
    println!(
      "[4] third == first? {}",
      if third == first {
        "Yes, the freed block was reused"
      } else {
        "No, it was placed somewhere else"
      }
    );

    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 5) Free both blocks, leaving two adjacent holes plus the trailing
    //    free space -- three free blocks in a row, still unmerged.
    // --------------------------------------------------------------------
    heap.free(third).expect("free(third) failed");
    heap.free(second).expect("free(second) failed");
    println!("\n[5] free(third); free(second)");
    heap.dump();

    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 6) Double free is caught and rejected; the heap is untouched.
    // --------------------------------------------------------------------
    let result = heap.free(second);
    println!("\n[6] free(second) again -> {result:?}");

    block_until_enter_pressed();
  }

  // --------------------------------------------------------------------
  // 7) Coalesce. The whole run of adjacent free blocks collapses back
  //    into a single block spanning the full capacity.
  // --------------------------------------------------------------------
  let merges = heap.coalesce();
  println!("\n[7] coalesce() performed {merges} merges");
  heap.dump();

  println!("\n[8] End of demo. Dropping the heap unmaps the region.");
}
