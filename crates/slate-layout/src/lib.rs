//! # SLATE Layout Engine
//!
//! Computes the memory layout of a GPU image: the main surface, every
//! auxiliary surface (FMASK, CMASK, DCC, HTILE, HiZ/HiS) and where each of
//! them sits inside one allocation.
//!
//! ## Pipeline
//!
//! ```text
//! ┌───────────────┐    ┌────────────────────┐    ┌─────────────────┐
//! │ SurfaceConfig │───►│  compute_surface   │───►│ SurfaceDescriptor│
//! │  + flags      │    │  (validate, pick   │    │ (offsets, sizes, │
//! └───────────────┘    │   strategy, place) │    │  per-level data) │
//!                      └─────────┬──────────┘    └─────────────────┘
//!                                │
//!          ┌─────────────────────┼─────────────────────┐
//!          ▼                     ▼                     ▼
//!   ┌─────────────┐      ┌───────────────┐     ┌──────────────┐
//!   │ Gfx6Strategy│      │UnifiedStrategy│     │ Gfx12Strategy│
//!   │  (GFX6-8)   │      │  (GFX9-11)    │     │   (GFX12)    │
//!   └─────────────┘      └───────────────┘     └──────────────┘
//! ```
//!
//! Every strategy talks to the address library through [`slate_addr`];
//! the engine itself never computes a tile address.
//!
//! ## Beyond Layout
//!
//! - [`modifiers`]: which format modifiers a device can use, in preference order
//! - [`planes`]: per-plane offsets and strides, coordinate queries
//! - [`pitch`]: importing buffers with a foreign offset and pitch
//! - [`print`]: human-readable dump of a descriptor

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![warn(clippy::all)]

#[cfg(any(feature = "alloc", test))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

// =============================================================================
// MODULE EXPORTS
// =============================================================================

pub mod assembler;
pub mod gfx12;
pub mod gfx9;
pub mod legacy;
pub mod modifiers;
pub mod pitch;
pub mod planes;
pub mod print;
pub mod strategy;

// Re-exports for convenience
pub use assembler::compute_surface;
pub use modifiers::{FormatShape, ModifierList, enumerate_modifiers, is_modifier_supported};
pub use pitch::{get_pitch_align, override_offset_stride};
pub use planes::{address_from_coordinate, compute_nbc_view, plane_count, plane_offset, plane_size, plane_stride};
pub use print::print_info;
pub use strategy::{GenerationStrategy, LayoutContext};
