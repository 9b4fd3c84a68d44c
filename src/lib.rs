//! # arenalloc - A First-Fit Arena Allocator
//!
//! This crate provides a small **first-fit allocator** that carves a single,
//! fixed-size byte region into blocks. It never asks the operating system for
//! memory: the whole heap is an inline array owned by the [`Arena`] value.
//!
//! ## Overview
//!
//! ```text
//!   Arena Layout:
//!
//!   offset 0                                                     CAPACITY
//!   ┌────────┬──────────┬────────┬────────┬────────┬──────────────────────┐
//!   │ header │ payload  │ header │payload │ header │    free payload      │
//!   │ used   │   A      │ free   │  (B)   │ used   │                      │
//!   └────────┴──────────┴────────┴────────┴────────┴──────────────────────┘
//!       │                   ▲ │               ▲ │                 ▲
//!       └── next ───────────┘ └── next ───────┘ └── next ─────────┘
//!
//!   Blocks partition the arena with no gaps: each payload is followed
//!   directly by the next header, the last payload ends at CAPACITY.
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   arenalloc
//!   ├── align      - Alignment unit and macros (ALIGN, align!, align_up)
//!   ├── block      - In-arena block header codec (internal)
//!   ├── arena      - Arena: init, allocate, release, dump
//!   ├── config     - Split threshold and coalescing policy
//!   ├── dump       - Read-only chain snapshots for display
//!   └── error      - AllocError
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use arenalloc::Arena;
//!
//! let mut arena: Arena<1024> = Arena::new();
//!
//! // Allocate room for a u64
//! let payload = arena.allocate(8).unwrap();
//!
//! // Use the memory
//! arena.bytes_mut(payload).copy_from_slice(&42u64.to_ne_bytes());
//! assert_eq!(arena.bytes(payload), &42u64.to_ne_bytes());
//!
//! // Give it back
//! arena.release(payload);
//! assert_eq!(arena.dump().len(), 1);
//! ```
//!
//! ## How It Works
//!
//! Each block starts with a header stored in the arena itself:
//!
//! ```text
//!   Single Block:
//!   ┌───────────────────────┬────────────────────────────────┐
//!   │    Block Header       │         Payload                │
//!   │  ┌─────────────────┐  │                                │
//!   │  │ size: N         │  │  ┌──────────────────────────┐  │
//!   │  │ free: 0 / 1     │  │  │                          │  │
//!   │  │ next: offset    │  │  │     N bytes usable       │  │
//!   │  └─────────────────┘  │  │                          │  │
//!   │   3 machine words     │  └──────────────────────────┘  │
//!   └───────────────────────┴────────────────────────────────┘
//!                           ▲
//!                           └── Payload handle returned to the caller
//! ```
//!
//! - **Allocate** rounds the request up to [`ALIGN`], takes the first free
//!   block that is large enough and splits off the tail as a new free block
//!   when the tail is big enough to be worth keeping.
//! - **Release** marks the block free and merges adjacent free blocks, so no
//!   two neighbours are ever both free afterwards.
//!
//! ```text
//!   Split:                          Coalesce:
//!   ┌──┬──────────────────┐         ┌──┬────┬──┬────┬──┬────┐
//!   │H │      free        │         │H │free│H │free│H │used│
//!   └──┴──────────────────┘         └──┴────┴──┴────┴──┴────┘
//!            │                                 │
//!            ▼                                 ▼
//!   ┌──┬────┬──┬──────────┐         ┌──┬───────────┬──┬────┐
//!   │H │used│H │   free   │         │H │   free    │H │used│
//!   └──┴────┴──┴──────────┘         └──┴───────────┴──┴────┘
//! ```
//!
//! ## Limitations
//!
//! - **Single-threaded**: no internal synchronization, lock it yourself
//! - **Fixed size**: the arena never grows
//! - **First fit only**: no size classes, fragmentation can fail requests
//!   that would fit in the total free space
//! - **Fixed alignment**: payloads are aligned to [`ALIGN`] within the arena

pub mod align;
mod arena;
mod block;
pub mod config;
mod dump;
mod error;

pub use align::ALIGN;
pub use arena::{Arena, Blocks, DEFAULT_CAPACITY, Payload};
pub use block::{Block, HEADER_SIZE};
pub use config::{ArenaConfig, CoalesceMode};
pub use dump::{BlockInfo, HeapDump};
pub use error::AllocError;
