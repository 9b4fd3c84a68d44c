//! Read-only snapshots of the block chain.

use std::fmt;

use crate::block;

/// One block as seen by [`Arena::dump`](crate::Arena::dump).
///
/// Addresses are byte offsets from the start of the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
  /// Position of the block in the chain.
  pub index: usize,
  /// Offset of the block header.
  pub header: usize,
  /// Usable payload bytes.
  pub size: usize,
  pub is_free: bool,
  /// Offset of the next header, `None` for the last block.
  pub next: Option<usize>,
}

impl BlockInfo {
  /// Offset of the first payload byte.
  pub fn payload(&self) -> usize {
    block::payload_of(self.header)
  }

  /// Offset one past the last payload byte.
  pub fn end(&self) -> usize {
    self.payload() + self.size
  }
}

/// Snapshot of every block in chain order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeapDump {
  blocks: Vec<BlockInfo>,
}

impl HeapDump {
  pub(crate) fn new(blocks: Vec<BlockInfo>) -> Self {
    Self { blocks }
  }

  pub fn blocks(&self) -> &[BlockInfo] {
    &self.blocks
  }

  pub fn iter(&self) -> std::slice::Iter<'_, BlockInfo> {
    self.blocks.iter()
  }

  pub fn len(&self) -> usize {
    self.blocks.len()
  }

  pub fn is_empty(&self) -> bool {
    self.blocks.is_empty()
  }

  /// Sum of the payload sizes of all free blocks.
  pub fn free_bytes(&self) -> usize {
    self.iter().filter(|b| b.is_free).map(|b| b.size).sum()
  }

  /// Sum of the payload sizes of all allocated blocks.
  pub fn used_bytes(&self) -> usize {
    self.iter().filter(|b| !b.is_free).map(|b| b.size).sum()
  }

  /// Payload size of the largest free block, 0 when none is free.
  pub fn largest_free(&self) -> usize {
    self
      .iter()
      .filter(|b| b.is_free)
      .map(|b| b.size)
      .max()
      .unwrap_or(0)
  }
}

impl<'a> IntoIterator for &'a HeapDump {
  type Item = &'a BlockInfo;
  type IntoIter = std::slice::Iter<'a, BlockInfo>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

impl fmt::Display for HeapDump {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    writeln!(f, "{:>5} {:>8} {:>8} {:>5} {:>8}", "index", "header", "size", "state", "next")?;

    for block in self {
      let state = if block.is_free { "free" } else { "used" };
      let next = match block.next {
        Some(next) => next.to_string(),
        None => "-".to_string(),
      };

      writeln!(
        f,
        "{:>5} {:>8} {:>8} {:>5} {:>8}",
        block.index, block.header, block.size, state, next
      )?;
    }

    write!(
      f,
      "{} blocks, {} bytes used, {} bytes free (largest {})",
      self.len(),
      self.used_bytes(),
      self.free_bytes(),
      self.largest_free()
    )
  }
}
