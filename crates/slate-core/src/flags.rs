//! # Surface Flags
//!
//! Semantic flags carried by a surface descriptor and the requested
//! tiling mode.

bitflags::bitflags! {
    /// Semantic surface flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SurfaceFlags: u64 {
        /// Depth buffer
        const ZBUFFER = 1 << 0;
        /// Stencil buffer
        const SBUFFER = 1 << 1;
        /// Scanout (display) capable
        const SCANOUT = 1 << 2;
        /// Partially resident (sparse) texture
        const PRT = 1 << 3;
        /// Keep the swizzle mode already present in the descriptor
        const FORCE_SWIZZLE_MODE = 1 << 4;
        /// Never allocate DCC
        const DISABLE_DCC = 1 << 5;
        /// HTILE readable by the texture unit
        const TC_COMPATIBLE_HTILE = 1 << 6;
        /// Layout was imported from another process
        const IMPORTED = 1 << 7;
        /// Layout may be shared with another process or device
        const SHAREABLE = 1 << 8;
        /// Never allocate HTILE / HiZ / HiS
        const NO_HTILE = 1 << 9;
        /// Never allocate FMASK
        const NO_FMASK = 1 << 10;
        /// Standalone FMASK surface (rejected)
        const FMASK = 1 << 11;
        /// Restrict swizzle blocks to 4 KiB
        const PREFER_4K_ALIGNMENT = 1 << 12;
        /// Restrict swizzle blocks to 64 KiB
        const PREFER_64K_ALIGNMENT = 1 << 13;
        /// Keep the micro tile mode already present in the descriptor
        const FORCE_MICRO_TILE_MODE = 1 << 14;
        /// Never bound as a render target
        const NO_RENDER_TARGET = 1 << 15;
        /// Never sampled
        const NO_TEXTURE = 1 << 16;
        /// Keep the stencil tile configuration independent of depth
        const NO_STENCIL_ADJUST = 1 << 17;
        /// DCC of all layers must be contiguous per level
        const CONTIGUOUS_DCC_LAYERS = 1 << 18;
        /// Variable rate shading image
        const VRS_RATE = 1 << 19;
        /// Video decode reference surface
        const VIDEO_REFERENCE = 1 << 20;
        /// Frequently transferred from the host
        const HOST_TRANSFER = 1 << 21;

        /// Depth or stencil
        const Z_OR_SBUFFER = Self::ZBUFFER.bits() | Self::SBUFFER.bits();
    }
}

impl SurfaceFlags {
    /// Depth or stencil surface
    #[inline]
    pub const fn is_depth_stencil(&self) -> bool {
        self.intersects(Self::Z_OR_SBUFFER)
    }

    /// Stencil without depth
    #[inline]
    pub const fn is_stencil_only(&self) -> bool {
        self.contains(Self::SBUFFER) && !self.contains(Self::ZBUFFER)
    }
}

// =============================================================================
// SURFACE MODE
// =============================================================================

/// Requested tiling mode
///
/// On the unified generations only the distinction between linear and
/// tiled is meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum SurfaceMode {
    /// Linear, pitch aligned
    #[default]
    LinearAligned,
    /// 1D tiled (micro tiles only)
    Tiled1D,
    /// 2D tiled (macro tiles)
    Tiled2D,
}
