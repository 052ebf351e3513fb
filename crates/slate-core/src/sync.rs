//! # Surface Index Counters
//!
//! Process-wide monotonically increasing counters used to decorrelate the
//! tile swizzle of otherwise identical allocations.

use core::sync::atomic::{AtomicU32, Ordering};

// =============================================================================
// COUNTER TRAIT
// =============================================================================

/// Source of surface indices for tile swizzle diversification
///
/// Implementations must be safe for concurrent callers: every call returns a
/// distinct value in increasing order.
pub trait SurfaceIndexCounter: Sync {
    /// Increment the counter, returning its previous value
    fn fetch_increment(&self) -> u32;

    /// Increment the counter, returning its new value
    #[inline]
    fn increment(&self) -> u32 {
        self.fetch_increment().wrapping_add(1)
    }
}

// =============================================================================
// ATOMIC COUNTER
// =============================================================================

/// Lock-free counter backed by an atomic integer
#[derive(Debug, Default)]
pub struct AtomicSurfaceIndex {
    value: AtomicU32,
}

impl AtomicSurfaceIndex {
    /// Create a counter starting at `initial`
    pub const fn new(initial: u32) -> Self {
        Self {
            value: AtomicU32::new(initial),
        }
    }

    /// Current value
    pub fn get(&self) -> u32 {
        self.value.load(Ordering::Acquire)
    }
}

impl SurfaceIndexCounter for AtomicSurfaceIndex {
    #[inline]
    fn fetch_increment(&self) -> u32 {
        self.value.fetch_add(1, Ordering::AcqRel)
    }
}

// =============================================================================
// COUNTER SET
// =============================================================================

/// The two counters a layout computation may draw from
///
/// Either may be absent, in which case the corresponding swizzle is left at
/// zero.
#[derive(Clone, Copy, Default)]
pub struct SwizzleCounters<'a> {
    /// Counter for color/depth surfaces
    pub surface: Option<&'a dyn SurfaceIndexCounter>,
    /// Counter for FMASK surfaces
    pub fmask: Option<&'a dyn SurfaceIndexCounter>,
}

impl<'a> SwizzleCounters<'a> {
    /// No counters
    pub const NONE: SwizzleCounters<'static> = SwizzleCounters {
        surface: None,
        fmask: None,
    };

    /// Counters for both surface kinds
    pub const fn new(
        surface: &'a dyn SurfaceIndexCounter,
        fmask: &'a dyn SurfaceIndexCounter,
    ) -> Self {
        Self {
            surface: Some(surface),
            fmask: Some(fmask),
        }
    }
}

impl core::fmt::Debug for SwizzleCounters<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SwizzleCounters")
            .field("surface", &self.surface.is_some())
            .field("fmask", &self.fmask.is_some())
            .finish()
    }
}

static_assertions::assert_impl_all!(AtomicSurfaceIndex: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_increment_returns_previous() {
        let c = AtomicSurfaceIndex::new(5);
        assert_eq!(c.fetch_increment(), 5);
        assert_eq!(c.fetch_increment(), 6);
        assert_eq!(c.get(), 7);
    }

    #[test]
    fn test_increment_returns_new() {
        let c = AtomicSurfaceIndex::new(0);
        assert_eq!(c.increment(), 1);
        assert_eq!(c.increment(), 2);
    }

    #[test]
    fn test_concurrent_increments_are_distinct() {
        extern crate std;
        use std::vec::Vec;

        let c = AtomicSurfaceIndex::new(0);
        let mut seen: Vec<u32> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| (0..100).map(|_| c.fetch_increment()).collect::<Vec<_>>()))
                .collect();
            handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
        });
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 400);
        assert_eq!(c.get(), 400);
    }
}
