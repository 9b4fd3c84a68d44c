use std::mem;

const WORD: usize = mem::size_of::<usize>();

/// Bytes occupied by a block header inside the arena.
pub const HEADER_SIZE: usize = 3 * WORD;

/// Encoded `next` word of the last block in the chain.
const NO_NEXT: usize = usize::MAX;

/// Header describing one block of the arena.
///
/// The header is stored in the arena itself, directly in front of the
/// payload it describes, as three native-endian words: `size`, `is_free`
/// and `next`. `next` is the byte offset of the following header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
  pub size: usize,
  pub is_free: bool,
  pub next: Option<usize>,
}

impl Block {
  pub fn new(
    size: usize,
    is_free: bool,
    next: Option<usize>,
  ) -> Self {
    Self { size, is_free, next }
  }

  /// Decodes the header stored at `at`.
  pub(crate) fn read(
    heap: &[u8],
    at: usize,
  ) -> Self {
    let next = read_word(heap, at + 2 * WORD);

    Self {
      size: read_word(heap, at),
      is_free: read_word(heap, at + WORD) != 0,
      next: (next != NO_NEXT).then_some(next),
    }
  }

  /// Encodes this header at `at`.
  pub(crate) fn write(
    &self,
    heap: &mut [u8],
    at: usize,
  ) {
    write_word(heap, at, self.size);
    write_word(heap, at + WORD, self.is_free as usize);
    write_word(heap, at + 2 * WORD, self.next.unwrap_or(NO_NEXT));
  }

}

/// Translates a header offset to the offset of its payload.
pub const fn payload_of(header: usize) -> usize {
  header + HEADER_SIZE
}

/// Translates a payload offset back to its header offset.
pub const fn header_of(payload: usize) -> Option<usize> {
  payload.checked_sub(HEADER_SIZE)
}

fn read_word(
  heap: &[u8],
  at: usize,
) -> usize {
  let mut word = [0u8; WORD];
  word.copy_from_slice(&heap[at..at + WORD]);
  usize::from_ne_bytes(word)
}

fn write_word(
  heap: &mut [u8],
  at: usize,
  value: usize,
) {
  heap[at..at + WORD].copy_from_slice(&value.to_ne_bytes());
}
