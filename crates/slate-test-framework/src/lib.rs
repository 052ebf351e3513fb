//! # SLATE Test Framework
//!
//! Deterministic stand-ins for the pieces of a real system the layout
//! engine talks to, so that layout code can be unit tested without the
//! vendor address library.
//!
//! ## Contents
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  slate-test-framework                    │
//! │  ┌────────────────────────┐  ┌────────────────────────┐  │
//! │  │       FakeOracle       │  │        fixtures        │  │
//! │  │ (all oracle traits,    │  │ (one GpuInfo per       │  │
//! │  │  call recording,       │  │  generation, tile      │  │
//! │  │  failure injection)    │  │  register tables)      │  │
//! │  └────────────────────────┘  └────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The fake oracle does not reproduce real address math. It returns
//! geometry that is internally consistent (pitches cover widths, sizes
//! cover pitches, alignments are powers of two) and stable across runs.

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![warn(clippy::all)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

// =============================================================================
// MODULE EXPORTS
// =============================================================================

pub mod fake;
pub mod fixtures;

// Re-exports for convenience
pub use fake::{CallKind, FakeOracle, OracleCall};
