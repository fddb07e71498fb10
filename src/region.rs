use std::{io, ptr};

use libc::{MAP_ANONYMOUS, MAP_FAILED, MAP_PRIVATE, PROT_READ, PROT_WRITE, _SC_PAGESIZE, c_void};

/// A private anonymous memory mapping obtained from the OS.
///
/// The kernel hands these out zero-filled and page-aligned. The mapping is
/// returned to the OS when the region is dropped.
pub struct Region {
  ptr: *mut u8,
  len: usize,
}

impl Region {
  /// Maps `len` bytes of zero-initialized memory.
  pub fn map(len: usize) -> io::Result<Self> {
    let ptr = unsafe {
      libc::mmap(
        ptr::null_mut(),
        len,
        PROT_READ | PROT_WRITE,
        MAP_PRIVATE | MAP_ANONYMOUS,
        -1,
        0,
      )
    };

    if ptr == MAP_FAILED {
      return Err(io::Error::last_os_error());
    }

    Ok(Self {
      ptr: ptr as *mut u8,
      len,
    })
  }

  /// The size of one memory page on this platform.
  pub fn page_size() -> usize {
    unsafe { libc::sysconf(_SC_PAGESIZE) as usize }
  }

  pub fn as_ptr(&self) -> *mut u8 {
    self.ptr
  }

  pub fn len(&self) -> usize {
    self.len
  }
}

impl Drop for Region {
  fn drop(&mut self) {
    unsafe {
      libc::munmap(self.ptr as *mut c_void, self.len);
    }
  }
}
