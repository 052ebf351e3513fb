//! # SLATE Core
//!
//! Foundational types of the SLATE surface layout engine.
//!
//! This crate holds everything a layout computation reads or writes that is
//! not itself an algorithm: the GPU capability description, the logical
//! image configuration, the surface descriptor produced by a computation,
//! and the tiling vocabulary (tile modes, swizzle modes, modifiers) shared
//! by every generation.
//!
//! ## Design Principles
//!
//! 1. **Plain Values**: Inputs are `Copy` value types, outputs are owned
//! 2. **Tagged Layouts**: Generation-specific state lives in a sum type
//! 3. **Bounded Storage**: Per-level arrays have a fixed capacity, no allocator
//! 4. **Explicit Counters**: Shared surface-index counters are injected
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        slate-core                           │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │   Inputs    │  │   Output    │  │     Vocabulary      │  │
//! │  │ (GpuInfo,   │  │ (Surface-   │  │ (SwizzleMode,       │  │
//! │  │  Config)    │  │  Descriptor)│  │  Modifier, Format)  │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::new_without_default)]

#[cfg(any(feature = "alloc", test))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

// =============================================================================
// MODULE EXPORTS
// =============================================================================

pub mod config;
pub mod error;
pub mod flags;
pub mod format;
pub mod math;
pub mod modifier;
pub mod surface;
pub mod swizzle;
pub mod sync;
pub mod types;

// Re-exports for convenience
pub use config::{Extent3d, SurfaceConfig};
pub use error::{ConfigError, Error, OracleError, Result};
pub use flags::{SurfaceFlags, SurfaceMode};
pub use modifier::{Modifier, ModifierField};
pub use surface::{AuxSurface, MAX_LEVELS, SurfaceDescriptor, SurfaceLayout};
pub use swizzle::{MicroTileMode, ResourceType, SwizzleMode, TileMode};
pub use sync::{AtomicSurfaceIndex, SurfaceIndexCounter, SwizzleCounters};
pub use types::{ChipFamily, GfxLevel, GpuInfo, ModifierOptions, TilingGeneration, VcnVersion};
