//! # Unified Oracle Interface (GFX12)
//!
//! Records of the third unified tiling revision. Metadata lives outside
//! the oracle on this generation, so only surface geometry, swizzle
//! enumeration, pipe/bank XOR and coordinate queries remain.

use arrayvec::ArrayVec;

use slate_core::format::AddrFormat;
use slate_core::surface::MAX_LEVELS;
use slate_core::swizzle::{ResourceType, SwizzleMode};
use slate_core::{Extent3d, Result};

use crate::gfx9::NbcView;

bitflags::bitflags! {
    /// Surface flags understood by the GFX12 oracle
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Gfx12SurfaceFlags: u32 {
        /// Depth plane
        const DEPTH = 1 << 0;
        /// Stencil plane
        const STENCIL = 1 << 1;
        /// Block compressed format
        const BLOCK_COMPRESSED = 1 << 2;
        /// Variable rate shading image
        const VRS_IMAGE = 1 << 3;
        /// Standard sparse layout
        const STANDARD_PRT = 1 << 4;
        /// Hierarchical depth or stencil surface
        const HIZ_HIS = 1 << 5;
    }
}

bitflags::bitflags! {
    /// Swizzle modes the oracle accepts for a surface
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Gfx12ValidModes: u32 {
        /// Linear
        const LINEAR = 1 << 0;
        /// 256 B planar
        const SW_2D_256B = 1 << 1;
        /// 4 KiB planar
        const SW_2D_4KB = 1 << 2;
        /// 64 KiB planar
        const SW_2D_64KB = 1 << 3;
        /// 256 KiB planar
        const SW_2D_256KB = 1 << 4;
        /// 4 KiB volume
        const SW_3D_4KB = 1 << 5;
        /// 64 KiB volume
        const SW_3D_64KB = 1 << 6;
        /// 256 KiB volume
        const SW_3D_256KB = 1 << 7;
    }
}

impl Gfx12ValidModes {
    /// Mask bit of a GFX12 swizzle mode
    #[inline]
    pub const fn of(mode: SwizzleMode) -> Self {
        Self::from_bits_truncate(mode.mask_bit())
    }
}

/// Whole-miptree surface query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Gfx12SurfaceInput {
    /// Swizzle mode
    pub swizzle_mode: SwizzleMode,
    /// Dimensionality
    pub resource_type: ResourceType,
    /// Format code
    pub format: AddrFormat,
    /// Bits per element, zero for block compressed formats
    pub bpp: u32,
    /// Width in texels
    pub width: u32,
    /// Height in texels
    pub height: u32,
    /// Slices
    pub num_slices: u32,
    /// Mip level count
    pub num_mip_levels: u32,
    /// Sample count
    pub num_samples: u32,
    /// Linear pitch override in elements, zero for the oracle's choice
    pub pitch_in_element: u32,
    /// Flags
    pub flags: Gfx12SurfaceFlags,
}

/// Geometry of one mip level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Gfx12MipInfo {
    /// Pitch in elements
    pub pitch: u32,
    /// Height in elements
    pub height: u32,
    /// Depth in slices
    pub depth: u32,
    /// Byte offset (linear layouts)
    pub offset: u64,
    /// Offset of the macro block holding the level
    pub macro_block_offset: u64,
    /// Offset inside the mip tail
    pub mip_tail_offset: u32,
}

/// Whole-miptree surface result
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Gfx12SurfaceOutput {
    /// Pitch of level 0 in elements
    pub pitch: u32,
    /// Height of level 0 in elements
    pub height: u32,
    /// Pitch in pixels before block compression
    pub pixel_pitch: u32,
    /// Size in bytes
    pub surf_size: u64,
    /// Slice size in bytes
    pub slice_size: u64,
    /// Base alignment in bytes
    pub base_align: u32,
    /// Swizzle block extent in elements
    pub block_extent: Extent3d,
    /// The whole chain fits in the mip tail
    pub mip_chain_in_tail: bool,
    /// First level in the mip tail
    pub first_mip_id_in_tail: u32,
    /// Per-level geometry
    pub mip_info: ArrayVec<Gfx12MipInfo, MAX_LEVELS>,
}

/// Swizzle mode enumeration query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Gfx12PossibleModesInput {
    /// Surface flags
    pub flags: Gfx12SurfaceFlags,
    /// Dimensionality
    pub resource_type: ResourceType,
    /// Bits per element
    pub bpp: u32,
    /// Width
    pub width: u32,
    /// Height
    pub height: u32,
    /// Slices
    pub num_slices: u32,
    /// Mip level count
    pub num_mip_levels: u32,
    /// Sample count
    pub num_samples: u32,
    /// Largest acceptable block alignment in bytes
    pub max_align: u32,
}

/// Address-from-coordinate query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Gfx12AddrFromCoordInput {
    /// Texel x in elements
    pub x: u32,
    /// Texel y in elements
    pub y: u32,
    /// Layer or depth slice
    pub slice: u32,
    /// Mip level
    pub mip_id: u32,
    /// Linear pitch of the level in elements, zero when tiled
    pub pitch_in_element: u32,
    /// Unaligned extent in elements
    pub unaligned_dims: Extent3d,
    /// Mip level count
    pub num_mip_levels: u32,
    /// Sample count
    pub num_samples: u32,
    /// Swizzle mode
    pub swizzle_mode: SwizzleMode,
    /// Dimensionality
    pub resource_type: ResourceType,
    /// Bits per element
    pub bpp: u32,
}

/// Non-block-compressed view query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Gfx12NbcViewInput {
    /// Swizzle mode
    pub swizzle_mode: SwizzleMode,
    /// Dimensionality
    pub resource_type: ResourceType,
    /// Compressed format
    pub format: AddrFormat,
    /// Unaligned extent in texels
    pub unaligned_dims: Extent3d,
    /// Mip level count
    pub num_mip_levels: u32,
    /// Pipe/bank XOR
    pub pipe_bank_xor: u32,
    /// Layer
    pub slice: u32,
    /// Mip level
    pub mip_id: u32,
}

/// Address oracle for GFX12
pub trait Gfx12Oracle {
    /// Geometry of a whole mip chain (also HiZ/HiS)
    fn compute_surface_info(&self, input: &Gfx12SurfaceInput) -> Result<Gfx12SurfaceOutput>;

    /// Swizzle modes usable for a surface
    fn get_possible_swizzle_modes(&self, input: &Gfx12PossibleModesInput) -> Result<Gfx12ValidModes>;

    /// Pipe/bank XOR for a surface index
    fn compute_pipe_bank_xor(&self, surf_index: u32, swizzle_mode: SwizzleMode) -> Result<u32>;

    /// Byte address of a texel
    fn addr_from_coord(&self, input: &Gfx12AddrFromCoordInput) -> Result<u64>;

    /// Uncompressed view of one level of a block compressed surface
    fn nbc_view(&self, input: &Gfx12NbcViewInput) -> Result<NbcView>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_mode_bits_follow_mode_numbers() {
        assert_eq!(Gfx12ValidModes::of(SwizzleMode::LINEAR), Gfx12ValidModes::LINEAR);
        assert_eq!(Gfx12ValidModes::of(SwizzleMode::GFX12_64KB_2D), Gfx12ValidModes::SW_2D_64KB);
        assert_eq!(Gfx12ValidModes::of(SwizzleMode::GFX12_256KB_3D), Gfx12ValidModes::SW_3D_256KB);
    }
}
