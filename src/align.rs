/// Alignment unit of the arena. Every block size and every header offset is
/// a multiple of it.
pub const ALIGN: usize = 8;

/// Rounds the given size up to the next multiple of [`ALIGN`].
///
/// Overflows for values within `ALIGN - 1` of `usize::MAX`; use
/// [`align_up`] when the input comes from a caller.
///
/// # Examples
///
/// ```rust
/// use arenalloc::align;
///
/// assert_eq!(align!(13), 16);
/// assert_eq!(align!(16), 16);
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    ($value + $crate::align::ALIGN - 1) & !($crate::align::ALIGN - 1)
  };
}

/// Checked form of [`align!`]. Returns `None` when rounding would overflow.
pub const fn align_up(value: usize) -> Option<usize> {
  match value.checked_add(ALIGN - 1) {
    Some(padded) => Some(padded & !(ALIGN - 1)),
    None => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_align() {
    let mut alignments = Vec::new();

    for i in 0..10 {
      let sizes = (ALIGN * i + 1)..=(ALIGN * (i + 1));

      let expected_alignment = ALIGN * (i + 1);

      alignments.push((sizes, expected_alignment));
    }

    for (sizes, expected) in alignments {
      for size in sizes {
        assert_eq!(expected, align!(size));
        assert_eq!(Some(expected), align_up(size));
      }
    }
  }

  #[test]
  fn test_align_zero_stays_zero() {
    assert_eq!(align!(0usize), 0);
    assert_eq!(align_up(0), Some(0));
  }

  #[test]
  fn test_align_up_overflow() {
    assert_eq!(align_up(usize::MAX), None);
    assert_eq!(align_up(usize::MAX - ALIGN + 2), None);
    assert_eq!(align_up(usize::MAX - ALIGN + 1), Some(usize::MAX - ALIGN + 1));
  }
}
