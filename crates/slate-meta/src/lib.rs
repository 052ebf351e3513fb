//! # SLATE Metadata Codec
//!
//! Translation between a computed surface descriptor and the two encodings
//! that travel with shared buffers.
//!
//! ```text
//!                   ┌──────────────────────┐
//!   tiling_flags ◄──┤  compute_bo_metadata │◄──┐
//!   (kernel, u64) ──►  apply_bo_metadata   ├──►│
//!                   └──────────────────────┘   │  SurfaceDescriptor
//!                   ┌──────────────────────┐   │
//!   UMD blob     ◄──┤ compute_umd_metadata │◄──┤
//!   (64 dwords)  ──►  apply_umd_metadata   ├──►│
//!                   └──────────────────────┘
//! ```
//!
//! The tiling flags are read before the layout is computed and steer it.
//! The UMD blob is read after and only recovers the DCC placement.

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

pub mod tiling;
pub mod umd;

// Re-exports for convenience
pub use tiling::{TilingField, apply_bo_metadata, compute_bo_metadata};
pub use umd::{ImageDescriptor, UmdMetadata, apply_umd_metadata, compute_umd_metadata};
