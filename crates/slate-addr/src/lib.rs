//! # SLATE Address Oracle
//!
//! Interface to the external address library that performs the bit-level
//! address math of each GPU generation.
//!
//! The layout engine never computes tile addresses itself. It prepares a
//! normalized input record per generation, hands it to an oracle, and
//! interprets the returned geometry. This crate defines those records, the
//! traits an oracle implements, and [`AddrLib`], the owned handle through
//! which strategies reach the oracle.
//!
//! ## Oracle Hierarchy
//!
//! ```text
//! AddressOracle
//!    │
//!    ├── LegacyOracle   (GFX6-8: tile modes, banks, pipes)
//!    │
//!    ├── Gfx9Oracle     (GFX9-11: swizzle modes, DCC/CMASK/HTILE/FMASK)
//!    │
//!    └── Gfx12Oracle    (GFX12: swizzle modes, HiZ/HiS via surface info)
//! ```
//!
//! ## Reentrancy
//!
//! The GFX9 metadata paths of the address library are not reentrant.
//! [`AddrLib::serialized`] wraps exactly those calls in a lock on that
//! generation and is a plain call everywhere else.

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

pub mod gfx12;
pub mod gfx9;
pub mod legacy;

// Re-exports for convenience
pub use gfx12::Gfx12Oracle;
pub use gfx9::{Gfx9Oracle, NbcView};
pub use legacy::LegacyOracle;

use slate_core::{GfxLevel, GpuInfo};
use spin::Mutex;

// =============================================================================
// ORACLE TRAIT
// =============================================================================

/// Core address oracle trait
///
/// An oracle able to serve every generation. Implemented automatically for
/// any type implementing the three per-generation traits.
pub trait AddressOracle: LegacyOracle + Gfx9Oracle + Gfx12Oracle + Sync {}

impl<T> AddressOracle for T where T: LegacyOracle + Gfx9Oracle + Gfx12Oracle + Sync {}

// =============================================================================
// ADDRLIB HANDLE
// =============================================================================

/// Owned address library handle
///
/// Created once per device; dropping it releases the oracle.
pub struct AddrLib<O> {
    oracle: O,
    gfx_level: GfxLevel,
    meta_lock: Mutex<()>,
}

impl<O> AddrLib<O> {
    /// Wrap an oracle for the device described by `info`
    pub fn new(info: &GpuInfo, oracle: O) -> Self {
        log::debug!(
            "addrlib: {:?} {:?}, serialized metadata: {}",
            info.gfx_level,
            info.family,
            info.gfx_level == GfxLevel::Gfx9
        );

        Self {
            oracle,
            gfx_level: info.gfx_level,
            meta_lock: Mutex::new(()),
        }
    }

    /// The wrapped oracle
    #[inline]
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Generation the handle was created for
    #[inline]
    pub fn gfx_level(&self) -> GfxLevel {
        self.gfx_level
    }

    /// Whether metadata calls take the lock
    #[inline]
    pub fn is_serialized(&self) -> bool {
        self.gfx_level == GfxLevel::Gfx9
    }

    /// Run a non-reentrant metadata call
    ///
    /// On GFX9 the lock is held for the duration of `f` only.
    pub fn serialized<R>(&self, f: impl FnOnce(&O) -> R) -> R {
        if self.is_serialized() {
            let _guard = self.meta_lock.lock();
            f(&self.oracle)
        } else {
            f(&self.oracle)
        }
    }

    /// Release the handle, returning the oracle
    pub fn into_inner(self) -> O {
        self.oracle
    }
}

impl<O> core::fmt::Debug for AddrLib<O> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AddrLib")
            .field("gfx_level", &self.gfx_level)
            .field("serialized", &self.is_serialized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slate_core::ChipFamily;

    #[test]
    fn test_gfx9_metadata_calls_hold_the_lock() {
        let lib = AddrLib::new(&GpuInfo::new(GfxLevel::Gfx9, ChipFamily::Vega10), 7u32);
        let held = lib.serialized(|o| {
            assert_eq!(*o, 7);
            lib.meta_lock.is_locked()
        });
        assert!(held);
        assert!(!lib.meta_lock.is_locked());
    }

    #[test]
    fn test_other_generations_do_not_lock() {
        for (gfx, family) in [
            (GfxLevel::Gfx8, ChipFamily::Polaris10),
            (GfxLevel::Gfx10_3, ChipFamily::Navi21),
            (GfxLevel::Gfx12, ChipFamily::Navi48),
        ] {
            let lib = AddrLib::new(&GpuInfo::new(gfx, family), ());
            assert!(!lib.is_serialized());
            assert!(!lib.serialized(|_| lib.meta_lock.is_locked()));
        }
    }

    #[test]
    fn test_into_inner_returns_oracle() {
        let lib = AddrLib::new(&GpuInfo::new(GfxLevel::Gfx11, ChipFamily::Navi31), 42u64);
        assert_eq!(lib.gfx_level(), GfxLevel::Gfx11);
        assert_eq!(lib.into_inner(), 42);
    }
}
