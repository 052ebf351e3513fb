//! # Generation Strategies
//!
//! The seam between the layout assembler and the per-generation layout
//! policies.
//!
//! ```text
//! compute_surface ──► compute_for
//!                         │
//!                         ├── Gfx6Strategy     (GFX6-8)
//!                         ├── UnifiedStrategy  (GFX9-11)
//!                         └── Gfx12Strategy    (GFX12)
//! ```
//!
//! A strategy fills in the main surface and sizes every auxiliary surface it
//! needs. Placing the auxiliary surfaces inside the allocation is left to
//! the assembler.

use slate_addr::{AddrLib, AddressOracle};
use slate_core::{
    GpuInfo, Modifier, Result, SurfaceConfig, SurfaceDescriptor, SurfaceFlags, SurfaceMode,
    SwizzleCounters, TilingGeneration,
};

use crate::gfx12::Gfx12Strategy;
use crate::gfx9::UnifiedStrategy;
use crate::legacy::Gfx6Strategy;

/// Linear pitch granule in bytes, shared by every chip for multi-GPU interop
pub const LINEAR_PITCH_ALIGNMENT: u32 = 256;

// =============================================================================
// CONTEXT
// =============================================================================

/// Everything a strategy reads besides the image itself
pub struct LayoutContext<'a, O> {
    /// Address library handle
    pub addrlib: &'a AddrLib<O>,
    /// GPU capabilities
    pub info: &'a GpuInfo,
    /// Surface index counters for tile swizzle
    pub counters: SwizzleCounters<'a>,
}

impl<'a, O> LayoutContext<'a, O> {
    /// Create a context
    pub const fn new(addrlib: &'a AddrLib<O>, info: &'a GpuInfo, counters: SwizzleCounters<'a>) -> Self {
        Self {
            addrlib,
            info,
            counters,
        }
    }

    /// The wrapped oracle
    #[inline]
    pub fn oracle(&self) -> &'a O {
        self.addrlib.oracle()
    }
}

impl<O> core::fmt::Debug for LayoutContext<'_, O> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LayoutContext")
            .field("gfx_level", &self.info.gfx_level)
            .field("family", &self.info.family)
            .field("counters", &self.counters)
            .finish()
    }
}

// =============================================================================
// STRATEGY TRAIT
// =============================================================================

/// Layout policy of one tiling generation
pub trait GenerationStrategy<O: AddressOracle> {
    /// Compute the main surface and size the auxiliary surfaces
    ///
    /// On error the descriptor is left in an unspecified state.
    fn compute(
        &self,
        ctx: &LayoutContext<'_, O>,
        config: &SurfaceConfig,
        mode: SurfaceMode,
        surf: &mut SurfaceDescriptor,
    ) -> Result<()>;
}

/// Run the strategy handling `generation`
pub fn compute_for<O: AddressOracle>(
    generation: TilingGeneration,
    ctx: &LayoutContext<'_, O>,
    config: &SurfaceConfig,
    mode: SurfaceMode,
    surf: &mut SurfaceDescriptor,
) -> Result<()> {
    match generation {
        TilingGeneration::Legacy => Gfx6Strategy.compute(ctx, config, mode, surf),
        TilingGeneration::UnifiedV1 | TilingGeneration::UnifiedV2 => {
            UnifiedStrategy.compute(ctx, config, mode, surf)
        },
        TilingGeneration::UnifiedV3 => Gfx12Strategy.compute(ctx, config, mode, surf),
    }
}

// =============================================================================
// SHARED POLICY
// =============================================================================

/// Whether a surface should get a display-compatible layout
///
/// With a modifier the kernel decides scanout compatibility. Otherwise only
/// single-sampled 2D color surfaces of a few format shapes are displayable.
pub fn get_display_flag(config: &SurfaceConfig, surf: &SurfaceDescriptor) -> bool {
    if surf.modifier != Modifier::INVALID {
        return false;
    }

    if config.is_1d
        || config.is_3d
        || config.is_cube
        || surf.flags.is_depth_stencil()
        || !surf.flags.contains(SurfaceFlags::SCANOUT)
        || config.samples > 1
        || surf.blk_w > 2
        || surf.blk_h != 1
    {
        return false;
    }

    // Subsampled 4:2:2
    if surf.blk_w == 2 {
        return true;
    }

    let bpe = surf.bpe;
    let channels = config.num_channels;
    // RGBA8 or RGBA16F, 16-bit RGB(A), C8 palette
    ((4..=8).contains(&bpe) && channels == 4)
        || (bpe == 2 && channels >= 3)
        || (bpe == 1 && channels == 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanout(bpe: u32) -> SurfaceDescriptor {
        SurfaceDescriptor::new(1, 1, bpe, SurfaceFlags::SCANOUT)
    }

    #[test]
    fn test_display_flag_rgba8() {
        let config = SurfaceConfig::new_2d(1920, 1080);
        assert!(get_display_flag(&config, &scanout(4)));
        assert!(!get_display_flag(&config.with_channels(3), &scanout(4)));
        assert!(get_display_flag(&config.with_channels(1), &scanout(1)));
        assert!(get_display_flag(&config.with_channels(3), &scanout(2)));
    }

    #[test]
    fn test_display_flag_rejects_shapes() {
        let config = SurfaceConfig::new_2d(256, 256);
        assert!(!get_display_flag(&config.with_samples(4), &scanout(4)));
        assert!(!get_display_flag(&config.cube(), &scanout(4)));
        assert!(!get_display_flag(&SurfaceConfig::new_3d(64, 64, 4), &scanout(4)));
        assert!(!get_display_flag(&config, &SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::empty())));
    }

    #[test]
    fn test_display_flag_defers_to_modifier() {
        let config = SurfaceConfig::new_2d(256, 256);
        let surf = scanout(4).with_modifier(Modifier::LINEAR);
        assert!(!get_display_flag(&config, &surf));
    }

    #[test]
    fn test_display_flag_subsampled() {
        let config = SurfaceConfig::new_2d(256, 256);
        let surf = SurfaceDescriptor::new(2, 1, 4, SurfaceFlags::SCANOUT);
        assert!(get_display_flag(&config, &surf));
    }
}
