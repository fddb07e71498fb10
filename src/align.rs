/// The alignment quantum. Every block size the allocator works with is a
/// multiple of this, and every payload address it hands out is a multiple of
/// this away from the arena start.
pub const QUANTUM: usize = 8;

/// Rounds the given size up to the next multiple of the 8-byte [`QUANTUM`].
///
/// # Examples
///
/// ```rust
/// use balloc::align;
///
/// assert_eq!(align!(1), 8);
/// assert_eq!(align!(13), 16);
/// assert_eq!(align!(24), 24);
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    ($value + $crate::align::QUANTUM - 1) & !($crate::align::QUANTUM - 1)
  };
}
