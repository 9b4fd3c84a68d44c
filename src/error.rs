//! Allocation failures.

use thiserror::Error;

/// Errors reported by [`Arena::allocate`](crate::Arena::allocate).
///
/// Neither variant modifies the block chain.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
  /// A zero-byte allocation was requested.
  #[error("invalid request: cannot allocate zero bytes")]
  InvalidRequest,

  /// No free block is large enough for the request.
  #[error("out of memory: requested {requested} bytes, largest free block is {largest_free} bytes")]
  OutOfMemory {
    /// Bytes asked for by the caller, before rounding.
    requested: usize,
    /// Payload size of the largest free block at the time of the request.
    largest_free: usize,
  },
}
