//! Arena policy knobs.

use crate::{align::ALIGN, block::HEADER_SIZE};

/// How free neighbours are merged after a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoalesceMode {
  /// Walk the whole chain and merge every run of adjacent free blocks.
  #[default]
  FullPass,
  /// Merge the released block with its successor and predecessor only.
  ///
  /// Produces the same chain as [`CoalesceMode::FullPass`], since no other
  /// adjacent free pair can exist before the release.
  Neighbors,
}

/// Policy configuration for an [`Arena`](crate::Arena).
///
/// Validated at construction; immutable once handed to the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaConfig {
  /// A free block is split only when the bytes left over after carving out
  /// the request (header of the new block included) exceed this value.
  ///
  /// Default: `HEADER_SIZE + ALIGN`. Never below `HEADER_SIZE`.
  pub min_split_remainder: usize,

  /// Coalescing strategy run on every release.
  pub coalesce: CoalesceMode,
}

impl ArenaConfig {
  /// Default split threshold: one header plus one alignment unit.
  pub const DEFAULT_MIN_SPLIT_REMAINDER: usize = HEADER_SIZE + ALIGN;

  pub const fn new() -> Self {
    Self {
      min_split_remainder: Self::DEFAULT_MIN_SPLIT_REMAINDER,
      coalesce: CoalesceMode::FullPass,
    }
  }

  /// Sets the split threshold, clamped so a split remainder always has room
  /// for its header.
  pub const fn with_min_split_remainder(
    mut self,
    bytes: usize,
  ) -> Self {
    self.min_split_remainder = if bytes < HEADER_SIZE { HEADER_SIZE } else { bytes };
    self
  }

  pub const fn with_coalesce(
    mut self,
    coalesce: CoalesceMode,
  ) -> Self {
    self.coalesce = coalesce;
    self
  }
}

impl Default for ArenaConfig {
  fn default() -> Self {
    Self::new()
  }
}
