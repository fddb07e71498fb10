use std::{error, fmt};

/// Failure conditions reported by the allocator.
///
/// Every operation reports errors synchronously through its return value and
/// leaves the heap exactly as it was before the call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllocError {
  /// Size is zero or exceeds the total heap capacity.
  InvalidArgument,
  /// The instance has already been initialized once.
  AlreadyInitialized,
  /// The instance has never been initialized.
  Uninitialized,
  /// The OS could not supply the backing memory region.
  AllocationFailed,
  /// No free block satisfies the request.
  OutOfMemory,
  /// Null, misaligned, out-of-range, or already-free pointer.
  InvalidPointer,
}

impl fmt::Display for AllocError {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    let message = match self {
      AllocError::InvalidArgument => "requested size is not positive or exceeds heap capacity",
      AllocError::AlreadyInitialized => "heap has already been initialized",
      AllocError::Uninitialized => "heap has not been initialized",
      AllocError::AllocationFailed => "could not map a memory region from the OS",
      AllocError::OutOfMemory => "no free block satisfies the request",
      AllocError::InvalidPointer => "pointer is null, misaligned, out of range, or already free",
    };

    f.write_str(message)
  }
}

impl error::Error for AllocError {}
