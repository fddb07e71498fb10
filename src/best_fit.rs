use std::ptr::NonNull;

use log::debug;

use crate::align;
use crate::align::QUANTUM;
use crate::block::{self, BlockHeader, HEADER_SIZE};
use crate::error::AllocError;
use crate::region::Region;

/// A best-fit heap allocator over one fixed-size memory region.
///
/// The region is mapped once by [`init`](Self::init) and tiled by blocks
/// carrying in-band metadata (see [`crate::block`]). [`alloc`](Self::alloc)
/// places requests with a best-fit policy, splitting oversized blocks;
/// [`free`](Self::free) validates and releases them without merging;
/// [`coalesce`](Self::coalesce) batches the merging of adjacent free blocks
/// into an explicit, caller-invoked pass.
pub struct BestFitAllocator {
  region: Option<Region>,
  capacity: usize,
}

impl BestFitAllocator {
  pub fn new() -> Self {
    Self {
      region: None,
      capacity: 0,
    }
  }

  /// Maps the backing region and installs the initial heap layout: one free
  /// block spanning the whole usable capacity, followed by the sentinel.
  ///
  /// `size` is rounded up to the next page-size multiple; the usable capacity
  /// is that minus the fixed sentinel overhead. Each instance can be
  /// initialized exactly once; a second call fails with
  /// [`AllocError::AlreadyInitialized`] and leaves the heap untouched.
  pub fn init(
    &mut self,
    size: usize,
  ) -> Result<(), AllocError> {
    if self.region.is_some() {
      return Err(AllocError::AlreadyInitialized);
    }

    if size == 0 {
      return Err(AllocError::InvalidArgument);
    }

    let page = Region::page_size();

    let padded = match size.checked_add(page - 1) {
      Some(value) => value / page * page,
      None => return Err(AllocError::InvalidArgument),
    };

    // Sizes live in 32-bit in-band words.
    if padded > u32::MAX as usize {
      return Err(AllocError::InvalidArgument);
    }

    let region = Region::map(padded).map_err(|error| {
      debug!("mapping {padded} bytes failed: {error}");
      AllocError::AllocationFailed
    })?;

    let capacity = padded - HEADER_SIZE;
    let base = region.as_ptr();

    unsafe {
      // The first block has no real predecessor; it is treated as having an
      // allocated one so it never looks like a merge candidate.
      block::store(base, 0, BlockHeader::new(capacity, false, true));
      block::write_footer(base, 0, capacity);
      block::store(base, capacity, BlockHeader::sentinel());
    }

    debug!("mapped {padded} bytes at {base:p}, {capacity} usable");

    self.capacity = capacity;
    self.region = Some(region);

    Ok(())
  }

  /// Allocates `size` bytes and returns the payload address.
  ///
  /// The chosen block is the smallest free block that fits the request
  /// (header included, rounded up to the quantum); among equally small
  /// candidates the leftmost wins. A block larger than the request is split,
  /// leaving the surplus as a new free block.
  ///
  /// Fails with [`AllocError::InvalidArgument`] when `size` is zero or
  /// exceeds the heap capacity, and with [`AllocError::OutOfMemory`] when no
  /// free block fits; the heap is left unchanged in both cases. Freeing
  /// adjacent blocks and calling [`coalesce`](Self::coalesce) may make a
  /// failed request satisfiable.
  ///
  /// # Safety
  ///
  /// The returned pointer is only valid for `size` bytes and only until it is
  /// freed or the allocator is dropped.
  pub unsafe fn alloc(
    &mut self,
    size: usize,
  ) -> Result<NonNull<u8>, AllocError> {
    let (base, capacity) = self.arena()?;

    if size == 0 || size > capacity {
      return Err(AllocError::InvalidArgument);
    }

    let block_size = align!(HEADER_SIZE + size);

    let Some((offset, candidate)) = self.find_best_fit(base, block_size) else {
      debug!("alloc({size}) found no free block of {block_size} bytes");
      return Err(AllocError::OutOfMemory);
    };

    unsafe {
      if candidate.size == block_size {
        block::store(
          base,
          offset,
          BlockHeader::new(block_size, true, candidate.prev_allocated),
        );

        let successor = offset + block_size;
        let next = block::load(base, successor);

        if !next.is_sentinel() {
          block::store(base, successor, BlockHeader::new(next.size, next.allocated, true));
        }

        debug!("alloc({size}) exact fit: {block_size} bytes at offset {offset}");
      } else {
        let remainder = candidate.size - block_size;

        block::store(
          base,
          offset,
          BlockHeader::new(block_size, true, candidate.prev_allocated),
        );

        let split = offset + block_size;

        block::store(base, split, BlockHeader::new(remainder, false, true));
        block::write_footer(base, split, remainder);

        debug!("alloc({size}) split fit: {block_size} bytes at offset {offset}, {remainder} left free");
      }

      Ok(NonNull::new_unchecked(base.add(offset + HEADER_SIZE)))
    }
  }

  /// Releases a previously allocated block. No merging happens here; adjacent
  /// free blocks stay separate until [`coalesce`](Self::coalesce) runs.
  ///
  /// Fails with [`AllocError::InvalidPointer`] when `ptr` is null, misaligned,
  /// out of range, not the payload address of a live block, or already free;
  /// the heap is left unchanged.
  ///
  /// # Safety
  ///
  /// `ptr` must no longer be read or written after this call succeeds.
  pub unsafe fn free(
    &mut self,
    ptr: *mut u8,
  ) -> Result<(), AllocError> {
    let (base, capacity) = self.arena()?;

    if ptr.is_null() {
      return Err(AllocError::InvalidPointer);
    }

    let payload_offset = (ptr as usize).wrapping_sub(base as usize);

    if payload_offset % QUANTUM != 0 {
      return Err(AllocError::InvalidPointer);
    }

    let offset = payload_offset.wrapping_sub(HEADER_SIZE);

    if offset >= capacity {
      return Err(AllocError::InvalidPointer);
    }

    let header = unsafe { block::load(base, offset) };

    // Reject metadata that cannot describe a live block before trusting any
    // offset derived from it.
    if header.size == 0 || header.size % QUANTUM != 0 || header.size > capacity - offset {
      return Err(AllocError::InvalidPointer);
    }

    if header.is_free() {
      return Err(AllocError::InvalidPointer);
    }

    unsafe {
      block::store(
        base,
        offset,
        BlockHeader::new(header.size, false, header.prev_allocated),
      );
      block::write_footer(base, offset, header.size);

      let successor = offset + header.size;
      let next = block::load(base, successor);

      if !next.is_sentinel() {
        block::store(base, successor, BlockHeader::new(next.size, next.allocated, false));
      }
    }

    debug!("freed {} bytes at offset {offset}", header.size);

    Ok(())
  }

  /// Merges every run of adjacent free blocks into a single free block and
  /// returns the number of pairwise merges performed.
  ///
  /// One forward pass: whenever a block and its successor are both free they
  /// are merged and the grown block is examined again against its new
  /// successor, so an arbitrarily long run collapses within the same pass.
  /// Returns 0 on an uninitialized instance.
  pub fn coalesce(&mut self) -> usize {
    let Ok((base, _)) = self.arena() else {
      return 0;
    };

    let mut merges = 0;
    let mut offset = 0;

    unsafe {
      loop {
        let header = block::load(base, offset);

        if header.is_sentinel() {
          break;
        }

        let successor = offset + header.size;
        let next = block::load(base, successor);

        if next.is_sentinel() {
          break;
        }

        if header.is_free() && next.is_free() {
          debug_assert_eq!(next.size, block::read_footer(base, successor, next.size));

          let merged = header.size + next.size;

          block::store(
            base,
            offset,
            BlockHeader::new(merged, false, header.prev_allocated),
          );
          block::write_footer(base, offset, merged);

          merges += 1;

          debug!("merged blocks at offsets {offset} and {successor} into {merged} bytes");
        } else {
          offset = successor;
        }
      }
    }

    merges
  }

  /// Usable heap capacity in bytes, 0 before [`init`](Self::init).
  pub fn capacity(&self) -> usize {
    self.capacity
  }

  /// Read-only traversal of the current block list, first block to last.
  /// Empty on an uninitialized instance.
  pub fn blocks(&self) -> Blocks<'_> {
    Blocks {
      allocator: self,
      offset: 0,
      index: 1,
    }
  }

  /// Prints the block list and the used/free totals to stdout.
  pub fn dump(&self) {
    let mut used = 0;
    let mut free = 0;

    println!("********************************* Block List *********************************");
    println!("No.\tStatus\tPrev\tBegin\t\tEnd\t\tSize");
    println!("------------------------------------------------------------------------------");

    for info in self.blocks() {
      if info.allocated {
        used += info.size;
      } else {
        free += info.size;
      }

      println!(
        "{}\t{}\t{}\t{:p}\t{:p}\t{:>6}",
        info.index,
        if info.allocated { "alloc" } else { "FREE " },
        if info.prev_allocated { "alloc" } else { "FREE " },
        info.start,
        info.end,
        info.size,
      );
    }

    println!("------------------------------------------------------------------------------");
    println!("Total used size = {used}");
    println!("Total free size = {free}");
    println!("Total size      = {}", used + free);
  }

  fn arena(&self) -> Result<(*mut u8, usize), AllocError> {
    match &self.region {
      Some(region) => Ok((region.as_ptr(), self.capacity)),
      None => Err(AllocError::Uninitialized),
    }
  }

  /// Scans the block list once, left to right, keeping the smallest free
  /// block that fits. Earlier candidates win ties, and the scan ends at an
  /// exact-size match since no smaller fit can exist.
  fn find_best_fit(
    &self,
    base: *mut u8,
    block_size: usize,
  ) -> Option<(usize, BlockHeader)> {
    let mut best: Option<(usize, BlockHeader)> = None;
    let mut offset = 0;

    loop {
      let header = unsafe { block::load(base, offset) };

      if header.is_sentinel() {
        break;
      }

      if header.is_free() && header.size >= block_size {
        let smaller = match &best {
          Some((_, current)) => header.size < current.size,
          None => true,
        };

        if smaller {
          let exact = header.size == block_size;

          best = Some((offset, header));

          if exact {
            break;
          }
        }
      }

      offset += header.size;
    }

    best
  }
}

/// Snapshot of one block, as reported by [`BestFitAllocator::blocks`].
#[derive(Clone, Copy, Debug)]
pub struct BlockInfo {
  /// Serial number of the block, counted from 1 at the arena start.
  pub index: usize,
  /// Address of the first byte of the block (its header).
  pub start: *const u8,
  /// Address of the last byte of the block.
  pub end: *const u8,
  pub size: usize,
  pub allocated: bool,
  pub prev_allocated: bool,
}

/// Iterator over the block list. Does not mutate the heap.
pub struct Blocks<'a> {
  allocator: &'a BestFitAllocator,
  offset: usize,
  index: usize,
}

impl Iterator for Blocks<'_> {
  type Item = BlockInfo;

  fn next(&mut self) -> Option<BlockInfo> {
    let region = self.allocator.region.as_ref()?;
    let base = region.as_ptr();

    let header = unsafe { block::load(base, self.offset) };

    if header.is_sentinel() {
      return None;
    }

    let info = BlockInfo {
      index: self.index,
      start: unsafe { base.add(self.offset) },
      end: unsafe { base.add(self.offset + header.size - 1) },
      size: header.size,
      allocated: header.allocated,
      prev_allocated: header.prev_allocated,
    };

    self.index += 1;
    self.offset += header.size;

    Some(info)
  }
}
