use std::fmt;

use tracing::{debug, trace};

use crate::{
  align::{self, ALIGN},
  block::{self, Block, HEADER_SIZE},
  config::{ArenaConfig, CoalesceMode},
  dump::{BlockInfo, HeapDump},
  error::AllocError,
};

/// Arena size used when no capacity is given.
pub const DEFAULT_CAPACITY: usize = 64 * 1024;

/// Handle to an allocated payload.
///
/// Holds the byte offset of the payload inside the arena that produced it.
/// Handles are only meaningful to that arena, and only until released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Payload(usize);

impl Payload {
  /// Offset of the first payload byte from the start of the arena.
  pub fn offset(self) -> usize {
    self.0
  }
}

/// First-fit allocator over a fixed, inline byte region of `CAPACITY` bytes.
///
/// Not synchronized. Wrap it in a lock to share it between threads.
pub struct Arena<const CAPACITY: usize = DEFAULT_CAPACITY> {
  heap: [u8; CAPACITY],
  initialized: bool,
  config: ArenaConfig,
}

impl<const CAPACITY: usize> Arena<CAPACITY> {
  pub const fn new() -> Self {
    Self::with_config(ArenaConfig::new())
  }

  pub const fn with_config(config: ArenaConfig) -> Self {
    const {
      assert!(CAPACITY % ALIGN == 0, "arena capacity must be a multiple of ALIGN");
      assert!(
        CAPACITY > HEADER_SIZE + ALIGN,
        "arena capacity must fit a header and one aligned payload"
      );
    }

    Self {
      heap: [0; CAPACITY],
      initialized: false,
      config,
    }
  }

  pub const fn capacity(&self) -> usize {
    CAPACITY
  }

  pub fn config(&self) -> &ArenaConfig {
    &self.config
  }

  pub fn is_initialized(&self) -> bool {
    self.initialized
  }

  /// Lays out a single free block spanning the whole arena.
  ///
  /// Only the first call has an effect; [`Arena::allocate`] calls it lazily.
  pub fn init(&mut self) {
    if self.initialized {
      return;
    }

    Block::new(CAPACITY - HEADER_SIZE, true, None).write(&mut self.heap, 0);
    self.initialized = true;

    debug!(capacity = CAPACITY, usable = CAPACITY - HEADER_SIZE, "arena initialized");
  }

  /// Iterates `(header offset, header)` pairs in address order.
  pub fn blocks(&self) -> Blocks<'_> {
    Blocks {
      heap: &self.heap,
      cursor: self.initialized.then_some(0),
    }
  }

  fn find_free_block(
    &self,
    size: usize,
  ) -> Option<usize> {
    self
      .blocks()
      .find(|(_, block)| block.is_free && block.size >= size)
      .map(|(at, _)| at)
  }

  fn largest_free(&self) -> usize {
    self
      .blocks()
      .filter(|(_, block)| block.is_free)
      .map(|(_, block)| block.size)
      .max()
      .unwrap_or(0)
  }

  /// Allocates at least `size` bytes from the first free block that fits.
  ///
  /// The request is rounded up to [`ALIGN`]. On failure the chain is left
  /// untouched.
  pub fn allocate(
    &mut self,
    size: usize,
  ) -> Result<Payload, AllocError> {
    if size == 0 {
      debug!("rejected zero-byte allocation");
      return Err(AllocError::InvalidRequest);
    }

    self.init();

    let found = align::align_up(size)
      .and_then(|request| Some((request, self.find_free_block(request)?)));

    let Some((request, at)) = found else {
      let largest_free = self.largest_free();
      debug!(requested = size, largest_free, "allocation failed: out of memory");

      return Err(AllocError::OutOfMemory {
        requested: size,
        largest_free,
      });
    };

    self.split_block(at, request);

    let mut block = Block::read(&self.heap, at);
    block.is_free = false;
    block.write(&mut self.heap, at);

    debug!(
      requested = size,
      rounded = request,
      header = at,
      usable = block.size,
      "allocated block"
    );

    Ok(Payload(block::payload_of(at)))
  }

  /// Carves `size` bytes off the front of the free block at `at`, leaving
  /// the rest as a new free block. Keeps the block whole when the rest
  /// would not exceed the configured threshold.
  fn split_block(
    &mut self,
    at: usize,
    size: usize,
  ) {
    let mut block = Block::read(&self.heap, at);
    let remainder = block.size - size;

    if remainder <= self.config.min_split_remainder {
      return;
    }

    let split_at = block::payload_of(at) + size;
    Block::new(remainder - HEADER_SIZE, true, block.next).write(&mut self.heap, split_at);

    block.size = size;
    block.next = Some(split_at);
    block.write(&mut self.heap, at);

    trace!(header = at, split_at, free = remainder - HEADER_SIZE, "split block");
  }

  /// Returns a block to the arena and merges it with free neighbours.
  ///
  /// `None` is ignored. The handle must come from this arena and must not
  /// have been released already; debug builds panic otherwise, release
  /// builds leave the chain in an unspecified state.
  pub fn release<P: Into<Option<Payload>>>(
    &mut self,
    payload: P,
  ) {
    let Some(payload) = payload.into() else {
      return;
    };

    debug_assert!(
      self.is_allocated(payload),
      "released handle {payload:?} is not a live allocation"
    );

    let Some(at) = block::header_of(payload.0) else {
      return;
    };

    let mut block = Block::read(&self.heap, at);
    block.is_free = true;
    block.write(&mut self.heap, at);

    debug!(header = at, size = block.size, "released block");

    match self.config.coalesce {
      CoalesceMode::FullPass => self.coalesce(),
      CoalesceMode::Neighbors => self.coalesce_around(at),
    }
  }

  /// Whether `payload` names a block that is currently allocated.
  pub fn is_allocated(
    &self,
    payload: Payload,
  ) -> bool {
    self
      .blocks()
      .any(|(at, block)| !block.is_free && block::payload_of(at) == payload.0)
  }

  fn coalesce(&mut self) {
    let mut cursor = self.initialized.then_some(0);

    while let Some(at) = cursor {
      if self.merge_next(at) {
        continue;
      }
      cursor = Block::read(&self.heap, at).next;
    }
  }

  fn coalesce_around(
    &mut self,
    at: usize,
  ) {
    self.merge_next(at);

    let previous = self
      .blocks()
      .find(|(_, block)| block.next == Some(at))
      .map(|(header, _)| header);

    if let Some(previous) = previous {
      self.merge_next(previous);
    }
  }

  /// Absorbs the successor of the block at `at` when both are free.
  fn merge_next(
    &mut self,
    at: usize,
  ) -> bool {
    let mut block = Block::read(&self.heap, at);
    let Some(next_at) = block.next else {
      return false;
    };
    let next = Block::read(&self.heap, next_at);

    if !(block.is_free && next.is_free) {
      return false;
    }

    block.size += HEADER_SIZE + next.size;
    block.next = next.next;
    block.write(&mut self.heap, at);

    trace!(header = at, absorbed = next_at, size = block.size, "merged free blocks");

    true
  }

  /// Usable bytes behind `payload`. May exceed the requested size when the
  /// block was handed out without splitting.
  pub fn usable_size(
    &self,
    payload: Payload,
  ) -> usize {
    Block::read(&self.heap, payload.0 - HEADER_SIZE).size
  }

  pub fn bytes(
    &self,
    payload: Payload,
  ) -> &[u8] {
    let size = self.usable_size(payload);
    &self.heap[payload.0..payload.0 + size]
  }

  pub fn bytes_mut(
    &mut self,
    payload: Payload,
  ) -> &mut [u8] {
    let size = self.usable_size(payload);
    &mut self.heap[payload.0..payload.0 + size]
  }

  /// Snapshot of the chain for display. Does not initialize the arena.
  pub fn dump(&self) -> HeapDump {
    HeapDump::new(
      self
        .blocks()
        .enumerate()
        .map(|(index, (header, block))| BlockInfo {
          index,
          header,
          size: block.size,
          is_free: block.is_free,
          next: block.next,
        })
        .collect(),
    )
  }
}

impl<const CAPACITY: usize> Default for Arena<CAPACITY> {
  fn default() -> Self {
    Self::new()
  }
}

impl<const CAPACITY: usize> fmt::Debug for Arena<CAPACITY> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_struct("Arena")
      .field("capacity", &CAPACITY)
      .field("initialized", &self.initialized)
      .field("config", &self.config)
      .field("blocks", &self.blocks().count())
      .finish()
  }
}

/// Iterator over the block chain of an [`Arena`].
pub struct Blocks<'a> {
  heap: &'a [u8],
  cursor: Option<usize>,
}

impl Iterator for Blocks<'_> {
  type Item = (usize, Block);

  fn next(&mut self) -> Option<Self::Item> {
    let at = self.cursor?;
    let block = Block::read(self.heap, at);
    self.cursor = block.next;

    Some((at, block))
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use super::*;

  const H: usize = HEADER_SIZE;

  #[test]
  fn test_alloc() {
    let mut arena: Arena<1024> = Arena::new();

    let first = arena.allocate(8).unwrap();
    arena.bytes_mut(first).copy_from_slice(&3u64.to_ne_bytes());
    assert_eq!(arena.bytes(first), &3u64.to_ne_bytes());

    let size: usize = 6;
    let second = arena.allocate(size * 2).unwrap();
    for i in 0..size {
      arena.bytes_mut(second)[i * 2..i * 2 + 2].copy_from_slice(&((i + 1) as u16).to_ne_bytes());
    }

    assert_eq!(arena.bytes(first), &3u64.to_ne_bytes());
    for i in 0..size {
      let word = &arena.bytes(second)[i * 2..i * 2 + 2];
      assert_eq!(((i + 1) as u16).to_ne_bytes(), word);
    }

    arena.release(first);

    let third = arena.allocate(4).unwrap();
    assert_eq!(first, third);

    arena.release(third);

    let fourth = arena.allocate(16).unwrap();
    arena.bytes_mut(fourth).copy_from_slice(&25u128.to_ne_bytes());

    assert!(fourth > second);
    assert_eq!(arena.bytes(fourth), &25u128.to_ne_bytes());
  }

  #[test]
  fn test_lazy_init() {
    let mut arena: Arena<1024> = Arena::new();
    assert!(!arena.is_initialized());
    assert!(arena.dump().is_empty());

    let payload = arena.allocate(1).unwrap();
    assert!(arena.is_initialized());
    assert_eq!(payload.offset(), H);
    assert_eq!(arena.usable_size(payload), ALIGN);
  }

  #[test]
  fn test_zero_size_does_not_initialize() {
    let mut arena: Arena<1024> = Arena::new();
    assert_eq!(arena.allocate(0), Err(AllocError::InvalidRequest));
    assert!(!arena.is_initialized());
  }

  #[test]
  fn test_exact_fill_then_out_of_memory() {
    let mut arena: Arena<1024> = Arena::new();

    let all = arena.allocate(1024 - H).unwrap();
    assert_eq!(arena.dump().len(), 1);
    assert_eq!(
      arena.allocate(1),
      Err(AllocError::OutOfMemory {
        requested: 1,
        largest_free: 0,
      })
    );

    arena.release(all);
    assert_eq!(arena.dump().free_bytes(), 1024 - H);
  }

  #[test]
  fn test_request_rounding_overflow_is_out_of_memory() {
    let mut arena: Arena<1024> = Arena::new();
    assert_eq!(
      arena.allocate(usize::MAX),
      Err(AllocError::OutOfMemory {
        requested: usize::MAX,
        largest_free: 1024 - H,
      })
    );
  }

  #[test]
  fn test_small_remainder_is_not_split() {
    let mut arena: Arena<1024> = Arena::new();

    // Remainder of exactly HEADER_SIZE + ALIGN stays attached.
    let whole = arena.allocate(1024 - H - (H + ALIGN)).unwrap();
    assert_eq!(arena.usable_size(whole), 1024 - H);
    assert_eq!(arena.dump().len(), 1);
    arena.release(whole);

    let front = arena.allocate(1024 - H - (H + 2 * ALIGN)).unwrap();
    assert_eq!(arena.usable_size(front), 1024 - H - (H + 2 * ALIGN));

    let dump = arena.dump();
    assert_eq!(dump.len(), 2);
    assert_eq!(dump.blocks()[1].size, 2 * ALIGN);
    assert!(dump.blocks()[1].is_free);
  }

  #[test]
  fn test_custom_split_threshold() {
    let config = ArenaConfig::new().with_min_split_remainder(512);
    let mut arena: Arena<1024> = Arena::with_config(config);

    let large = arena.allocate(600).unwrap();
    assert_eq!(arena.usable_size(large), 1024 - H);
    arena.release(large);

    let small = arena.allocate(16).unwrap();
    assert_eq!(arena.usable_size(small), 16);
    assert_eq!(arena.dump().len(), 2);
  }

  #[test]
  fn test_release_none_is_noop() {
    let mut arena: Arena<1024> = Arena::new();
    arena.allocate(32).unwrap();

    let before = arena.dump();
    arena.release(None::<Payload>);
    assert_eq!(arena.dump(), before);
  }

  #[test]
  fn test_release_merges_both_neighbours() {
    for mode in [CoalesceMode::FullPass, CoalesceMode::Neighbors] {
      let mut arena: Arena<1024> = Arena::with_config(ArenaConfig::new().with_coalesce(mode));

      let a = arena.allocate(16).unwrap();
      let b = arena.allocate(16).unwrap();
      let c = arena.allocate(16).unwrap();
      let _d = arena.allocate(16).unwrap();

      arena.release(a);
      arena.release(c);
      assert_eq!(arena.dump().len(), 5);

      arena.release(b);
      let dump = arena.dump();
      assert_eq!(dump.len(), 3, "{mode:?}");
      assert_eq!(dump.blocks()[0].header, 0);
      assert_eq!(dump.blocks()[0].size, 3 * 16 + 2 * H);
      assert!(dump.blocks()[0].is_free);
      assert!(!dump.blocks()[1].is_free);
    }
  }

  #[test]
  fn test_is_allocated() {
    let mut arena: Arena<1024> = Arena::new();
    let a = arena.allocate(16).unwrap();
    assert!(arena.is_allocated(a));

    arena.release(a);
    assert!(!arena.is_allocated(a));
  }

  #[test]
  #[cfg(debug_assertions)]
  #[should_panic(expected = "is not a live allocation")]
  fn test_double_release_panics_in_debug() {
    let mut arena: Arena<1024> = Arena::new();
    let a = arena.allocate(16).unwrap();
    arena.allocate(16).unwrap();

    arena.release(a);
    arena.release(a);
  }

  #[test]
  fn test_static_arena_behind_lock() {
    static HEAP: Mutex<Arena<1024>> = Mutex::new(Arena::new());

    let mut heap = HEAP.lock().unwrap();
    let payload = heap.allocate(64).unwrap();
    heap.bytes_mut(payload).fill(0xAB);
    assert!(heap.bytes(payload).iter().all(|&b| b == 0xAB));
    heap.release(payload);
    assert_eq!(heap.dump().len(), 1);
  }

  #[test]
  fn test_debug_skips_heap_bytes() {
    let mut arena: Arena<1024> = Arena::new();
    arena.allocate(8).unwrap();

    let rendered = format!("{arena:?}");
    assert!(rendered.contains("capacity: 1024"));
    assert!(rendered.contains("blocks: 2"));
  }
}
