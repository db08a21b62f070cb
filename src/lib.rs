//! # brkalloc - A Next-Fit Free-List Allocator
//!
//! This crate provides a general purpose heap allocator (`malloc`, `free`,
//! `calloc`, `realloc`, `strdup`) that manages one contiguous region grown
//! from the program break with `sbrk(2)`.
//!
//! ## Overview
//!
//! Every span of the region starts with a header. Headers are packed back to
//! back, so the region is always fully described by the block list:
//!
//! ```text
//!   Managed region:
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │  ┌───┬──────┬───┬────────────┬───┬──────┬───┬──────────────────────┐ │
//!   │  │ H │  A   │ H │  (free)    │ H │  C   │ H │  D          excess   │ │
//!   │  └───┴──────┴───┴────────────┴───┴──────┴───┴──────────────────────┘ │
//!   │  ▲                ▲                                                ▲ │
//!   │  │                │                                                │ │
//!   │  low water mark   cursor                             high water mark │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **Next fit**: the search resumes at the block touched last and wraps
//!   around once. First, best and worst fit are available too.
//! - **Lazy splitting**: an in-use block keeps the capacity it does not need
//!   until a later request carves a new block out of it.
//! - **Coalescing**: a released block is merged with every free neighbour, so
//!   no two adjacent blocks are ever free.
//! - **Chunked growth**: the region grows by whole chunks (4096 bytes unless
//!   configured otherwise) when no block fits.
//!
//! ## Crate Structure
//!
//! ```text
//!   brkalloc
//!   ├── align      - Alignment macros (align!, align_to!)
//!   ├── block      - In-place block header
//!   ├── region     - Region growth (sbrk, fixed buffers) and water marks
//!   ├── list       - Address ordered block list and invariant checks
//!   ├── policy     - Fit policies
//!   ├── allocator  - FreeListAllocator
//!   ├── config     - Chunk size and policy defaults
//!   ├── diag       - Verbose diagnostics
//!   ├── report     - Heap map and statistics
//!   ├── global     - Process-wide allocator over the program break
//!   └── ffi        - C entry points
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use brkalloc::{BufferRegion, FreeListAllocator};
//!
//! let mut heap = FreeListAllocator::new(BufferRegion::new(1 << 16));
//!
//! let data = heap.allocate(64).unwrap().expect("non-zero request");
//! unsafe {
//!     data.as_ptr().write_bytes(0xAB, 64);
//!     heap.release(Some(data));
//! }
//!
//! assert_eq!(heap.stats().free_blocks, 1);
//! ```
//!
//! ## Limitations
//!
//! - **Single-threaded instances**: a [`FreeListAllocator`] is `Send` but not
//!   `Sync`; the [`global`] allocator serializes callers behind one lock.
//! - **No pointer validation**: releasing a pointer this allocator did not
//!   hand out is undefined behaviour.
//! - **Unix-only**: [`SbrkRegion`] requires `libc` and `sbrk`.

pub mod align;
mod allocator;
mod block;
mod config;
mod diag;
mod error;
pub mod ffi;
pub mod global;
mod list;
mod policy;
mod region;
mod report;

pub use allocator::FreeListAllocator;
pub use block::HEADER_SIZE;
pub use config::{AllocatorConfig, DEFAULT_CHUNK_SIZE, MIN_CHUNK_SIZE};
pub use error::AllocError;
pub use list::Violation;
pub use policy::FitPolicy;
pub use region::{BufferRegion, Region, RegionGrower, SbrkRegion};
pub use report::HeapStats;
