//! # balloc - A Best-Fit Memory Allocator Library
//!
//! This crate provides a **best-fit heap allocator** with deferred coalescing
//! that manages a single fixed-size memory region obtained from the OS via
//! `mmap`.
//!
//! ## Overview
//!
//! The heap is one contiguous region tiled by blocks, each carrying 8 bytes of
//! in-band metadata. Free blocks additionally duplicate their size in a footer
//! so they can be recognized from either end:
//!
//! ```text
//!   Heap Layout:
//!
//!   ┌───┬─────────┬───┬─────────┬───┬──────────────┬───┐
//!   │ H │ payload │ H │ payload │ H │ free ...   F │ S │
//!   └───┴─────────┴───┴─────────┴───┴──────────────┴───┘
//!     ▲                           ▲                  ▲
//!     │                           │                  │
//!   header: 8 bytes of        free block: its     sentinel header:
//!   size + status flags       footer F repeats    size 0, marks the
//!                             the pure size       end of the heap
//!
//!   Every block size is a multiple of 8; payload addresses are a multiple
//!   of 8 away from the heap start.
//! ```
//!
//! Allocation scans the block list once, left to right, and places the
//! request in the *smallest* free block that fits (best fit), splitting off
//! the surplus as a new free block. Freeing validates the pointer and marks
//! the block free without touching its neighbors; merging adjacent free
//! blocks is deferred to an explicit [`coalesce`](BestFitAllocator::coalesce)
//! pass, so callers pay that cost when they choose to (typically when an
//! allocation is about to fail).
//!
//! ## Crate Structure
//!
//! ```text
//!   balloc
//!   ├── align      - The 8-byte quantum and the align! rounding macro
//!   ├── block      - In-band block metadata (header, footer, sentinel)
//!   ├── region     - Memory region provider (mmap/munmap)
//!   ├── best_fit   - BestFitAllocator: alloc / free / coalesce engine
//!   └── error      - AllocError
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use balloc::BestFitAllocator;
//!
//! fn main() {
//!     let mut heap = BestFitAllocator::new();
//!     heap.init(4096).unwrap();
//!
//!     unsafe {
//!         let ptr = heap.alloc(100).unwrap().as_ptr();
//!
//!         // Use the memory
//!         ptr.write(42);
//!
//!         // Release it; merging happens when we ask for it
//!         heap.free(ptr).unwrap();
//!         heap.coalesce();
//!     }
//! }
//! ```
//!
//! ## Limitations
//!
//! - **Single-threaded only**: no synchronization primitives; the allocator
//!   is neither `Send` nor `Sync`
//! - **Fixed capacity**: the region is mapped once and never grows
//! - **Unix-only**: requires `libc` and `mmap` (POSIX systems)
//!
//! ## Safety
//!
//! Handing out raw pointers into a self-managed region is inherently unsafe;
//! `alloc` and `free` require `unsafe` blocks. Everything else (`init`,
//! `coalesce`, diagnostics) is safe to call.

pub mod align;
mod best_fit;
mod block;
mod error;
mod region;

pub use best_fit::{BestFitAllocator, BlockInfo, Blocks};
pub use error::AllocError;
