//! # Unified Oracle Interface (GFX9-11)
//!
//! Input and output records of the swizzle-mode oracle used by the first
//! two unified tiling revisions.

use arrayvec::ArrayVec;

use slate_core::format::AddrFormat;
use slate_core::surface::MAX_LEVELS;
use slate_core::swizzle::{ResourceType, SwizzleMode};
use slate_core::Result;

bitflags::bitflags! {
    /// Surface flags understood by the unified oracle
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Gfx9SurfaceFlags: u32 {
        /// Color target
        const COLOR = 1 << 0;
        /// Depth plane
        const DEPTH = 1 << 1;
        /// Stencil plane
        const STENCIL = 1 << 2;
        /// FMASK surface
        const FMASK = 1 << 3;
        /// Scanout
        const DISPLAY = 1 << 4;
        /// Sampled, or TC-compatible HTILE for depth
        const TEXTURE = 1 << 5;
        /// Trade performance for space
        const OPT4SPACE = 1 << 6;
        /// Sparse texture
        const PRT = 1 << 7;
        /// DCC is not pipe aligned
        const META_PIPE_UNALIGNED = 1 << 8;
        /// DCC is not RB aligned
        const META_RB_UNALIGNED = 1 << 9;
    }
}

bitflags::bitflags! {
    /// Swizzle block sizes the oracle must not pick
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ForbiddenBlocks: u32 {
        /// 256 B blocks
        const MICRO = 1 << 0;
        /// 4 KiB thin blocks
        const MACRO_THIN_4KB = 1 << 1;
        /// 4 KiB thick blocks
        const MACRO_THICK_4KB = 1 << 2;
        /// 64 KiB thin blocks
        const MACRO_THIN_64KB = 1 << 3;
        /// 64 KiB thick blocks
        const MACRO_THICK_64KB = 1 << 4;
        /// Variable-size blocks
        const VAR = 1 << 5;
        /// Linear
        const LINEAR = 1 << 6;
        /// 256 KiB thin blocks (GFX11)
        const GFX11_THIN_256KB = 1 << 7;
        /// 256 KiB thick blocks (GFX11)
        const GFX11_THICK_256KB = 1 << 8;

        /// Both 256 KiB block kinds
        const GFX11_256KB = Self::GFX11_THIN_256KB.bits() | Self::GFX11_THICK_256KB.bits();
    }
}

bitflags::bitflags! {
    /// Micro orderings the oracle should prefer
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PreferredSwizzleSet: u32 {
        /// Depth ordering
        const Z = 1 << 0;
        /// Standard ordering
        const S = 1 << 1;
        /// Display ordering
        const D = 1 << 2;
        /// Rotated or render ordering
        const R = 1 << 3;
    }
}

// =============================================================================
// SURFACE INFO
// =============================================================================

/// Whole-miptree surface query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Gfx9SurfaceInput {
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
    /// Slices (depth, six faces, or layers)
    pub num_slices: u32,
    /// Mip level count
    pub num_mip_levels: u32,
    /// Sample count
    pub num_samples: u32,
    /// Fragment count
    pub num_frags: u32,
    /// Flags
    pub flags: Gfx9SurfaceFlags,
}

/// Geometry of one mip level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Gfx9MipInfo {
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
pub struct Gfx9SurfaceOutput {
    /// Pitch of level 0 in elements
    pub pitch: u32,
    /// Height of level 0 in elements
    pub height: u32,
    /// Pitch in pixels before block compression
    pub pixel_pitch: u32,
    /// Pitch of the whole mip chain
    pub mip_chain_pitch: u32,
    /// Height of the whole mip chain
    pub mip_chain_height: u32,
    /// Size in bytes
    pub surf_size: u64,
    /// Slice size in bytes
    pub slice_size: u64,
    /// Base alignment in bytes
    pub base_align: u32,
    /// Swizzle block width
    pub block_width: u32,
    /// Swizzle block height
    pub block_height: u32,
    /// Swizzle block depth
    pub block_slices: u32,
    /// The hardware epitch field holds the height
    pub epitch_is_height: bool,
    /// The whole chain fits in the mip tail
    pub mip_chain_in_tail: bool,
    /// First level in the mip tail
    pub first_mip_id_in_tail: u32,
    /// Per-level geometry
    pub mip_info: ArrayVec<Gfx9MipInfo, MAX_LEVELS>,
}

/// Preferred swizzle query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PreferredSettingInput {
    /// Surface flags
    pub flags: Gfx9SurfaceFlags,
    /// Dimensionality
    pub resource_type: ResourceType,
    /// Format code
    pub format: AddrFormat,
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
    /// Fragment count
    pub num_frags: u32,
    /// Block sizes to avoid
    pub forbidden: ForbiddenBlocks,
    /// Micro orderings to prefer
    pub preferred: PreferredSwizzleSet,
}

// =============================================================================
// METADATA
// =============================================================================

/// Metadata alignment key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetaKey {
    /// Pipe (L2) aligned
    pub pipe_aligned: bool,
    /// RB aligned
    pub rb_aligned: bool,
}

impl MetaKey {
    /// Aligned to both pipes and RBs
    pub const ALIGNED: Self = Self {
        pipe_aligned: true,
        rb_aligned: true,
    };
}

/// Placement of one level inside a metadata surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetaMipInfo {
    /// Byte offset
    pub offset: u64,
    /// Slice size in bytes
    pub slice_size: u64,
    /// Level lies in the mip tail
    pub in_miptail: bool,
}

/// DCC query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Gfx9DccInput {
    /// Alignment key
    pub key: MetaKey,
    /// Dimensionality
    pub resource_type: ResourceType,
    /// Swizzle mode of the color surface
    pub swizzle_mode: SwizzleMode,
    /// Bits per element
    pub bpp: u32,
    /// Width
    pub width: u32,
    /// Height
    pub height: u32,
    /// Slices
    pub num_slices: u32,
    /// Fragment count
    pub num_frags: u32,
    /// Mip level count
    pub num_mip_levels: u32,
    /// Size of the color surface
    pub data_surface_size: u64,
    /// First level in the mip tail
    pub first_mip_id_in_tail: u32,
}

/// DCC result
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Gfx9DccOutput {
    /// Pitch
    pub pitch: u32,
    /// Height
    pub height: u32,
    /// Compressed block width
    pub compress_blk_width: u32,
    /// Compressed block height
    pub compress_blk_height: u32,
    /// Compressed block depth
    pub compress_blk_depth: u32,
    /// Metadata block width
    pub meta_blk_width: u32,
    /// Metadata block height
    pub meta_blk_height: u32,
    /// Metadata block depth
    pub meta_blk_depth: u32,
    /// Size in bytes
    pub dcc_ram_size: u64,
    /// Slice size in bytes
    pub dcc_ram_slice_size: u64,
    /// Base alignment in bytes
    pub dcc_ram_base_align: u32,
    /// Per-level placement
    pub mip_info: ArrayVec<MetaMipInfo, MAX_LEVELS>,
}

/// CMASK query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Gfx9CmaskInput {
    /// Alignment key
    pub key: MetaKey,
    /// Dimensionality
    pub resource_type: ResourceType,
    /// Swizzle mode of the color or FMASK surface
    pub swizzle_mode: SwizzleMode,
    /// Width
    pub width: u32,
    /// Height
    pub height: u32,
    /// Slices
    pub num_slices: u32,
    /// Mip level count
    pub num_mip_levels: u32,
    /// First level in the mip tail
    pub first_mip_id_in_tail: u32,
}

/// CMASK result
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Gfx9CmaskOutput {
    /// Pitch
    pub pitch: u32,
    /// Height
    pub height: u32,
    /// Size in bytes
    pub cmask_bytes: u64,
    /// Slice size in bytes
    pub slice_size: u64,
    /// Base alignment in bytes
    pub base_align: u32,
    /// Per-level placement
    pub mip_info: ArrayVec<MetaMipInfo, MAX_LEVELS>,
}

/// HTILE query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Gfx9HtileInput {
    /// Alignment key
    pub key: MetaKey,
    /// Flags of the depth surface
    pub depth_flags: Gfx9SurfaceFlags,
    /// Swizzle mode of the depth surface
    pub swizzle_mode: SwizzleMode,
    /// Width
    pub width: u32,
    /// Height
    pub height: u32,
    /// Slices
    pub num_slices: u32,
    /// Mip level count
    pub num_mip_levels: u32,
    /// First level in the mip tail
    pub first_mip_id_in_tail: u32,
}

/// HTILE result
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Gfx9HtileOutput {
    /// Pitch
    pub pitch: u32,
    /// Height
    pub height: u32,
    /// Size in bytes
    pub htile_bytes: u64,
    /// Slice size in bytes
    pub slice_size: u64,
    /// Base alignment in bytes
    pub base_align: u32,
    /// Per-level placement
    pub mip_info: ArrayVec<MetaMipInfo, MAX_LEVELS>,
}

/// FMASK query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Gfx9FmaskInput {
    /// FMASK swizzle mode
    pub swizzle_mode: SwizzleMode,
    /// Width
    pub width: u32,
    /// Height
    pub height: u32,
    /// Slices
    pub num_slices: u32,
    /// Sample count
    pub num_samples: u32,
    /// Fragment count
    pub num_frags: u32,
}

/// FMASK result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Gfx9FmaskOutput {
    /// Pitch
    pub pitch: u32,
    /// Height
    pub height: u32,
    /// Size in bytes
    pub fmask_bytes: u64,
    /// Slice size in bytes
    pub slice_size: u64,
    /// Base alignment in bytes
    pub base_align: u32,
}

/// Pipe/bank XOR query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Gfx9PipeBankXorInput {
    /// Surface index drawn from a counter
    pub surf_index: u32,
    /// Flags of the surface
    pub flags: Gfx9SurfaceFlags,
    /// Swizzle mode
    pub swizzle_mode: SwizzleMode,
    /// Dimensionality
    pub resource_type: ResourceType,
    /// Format code
    pub format: AddrFormat,
    /// Sample count
    pub num_samples: u32,
    /// Fragment count
    pub num_frags: u32,
}

// =============================================================================
// COORDINATES
// =============================================================================

/// Address-from-coordinate query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Gfx9AddrFromCoordInput {
    /// Texel x in elements
    pub x: u32,
    /// Texel y in elements
    pub y: u32,
    /// Layer or depth slice
    pub slice: u32,
    /// Mip level
    pub mip_id: u32,
    /// Width in elements
    pub width: u32,
    /// Height in elements
    pub height: u32,
    /// Slices
    pub num_slices: u32,
    /// Mip level count
    pub num_mip_levels: u32,
    /// Sample count
    pub num_samples: u32,
    /// Fragment count
    pub num_frags: u32,
    /// Swizzle mode
    pub swizzle_mode: SwizzleMode,
    /// Dimensionality
    pub resource_type: ResourceType,
    /// Pipe/bank XOR
    pub pipe_bank_xor: u32,
    /// Bits per element
    pub bpp: u32,
}

/// Non-block-compressed view query (GFX10-11)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Gfx9NbcViewInput {
    /// Swizzle mode
    pub swizzle_mode: SwizzleMode,
    /// Dimensionality
    pub resource_type: ResourceType,
    /// Compressed format
    pub format: AddrFormat,
    /// Width in texels
    pub width: u32,
    /// Height in texels
    pub height: u32,
    /// Slices
    pub num_slices: u32,
    /// Mip level count
    pub num_mip_levels: u32,
    /// Pipe/bank XOR
    pub pipe_bank_xor: u32,
    /// Layer
    pub slice: u32,
    /// Mip level
    pub mip_id: u32,
}

/// Single-level view of one level of a block compressed surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NbcView {
    /// Byte offset of the view
    pub offset: u64,
    /// Pipe/bank XOR of the view
    pub pipe_bank_xor: u32,
    /// Width in elements
    pub width: u32,
    /// Height in elements
    pub height: u32,
    /// Level count of the view
    pub num_levels: u32,
    /// Level of the view that maps the requested level
    pub level: u32,
}

// =============================================================================
// ORACLE TRAIT
// =============================================================================

/// Address oracle for GFX9-11
pub trait Gfx9Oracle {
    /// Geometry of a whole mip chain
    fn compute_surface_info(&self, input: &Gfx9SurfaceInput) -> Result<Gfx9SurfaceOutput>;

    /// Swizzle mode the oracle prefers under the given restrictions
    fn get_preferred_surface_setting(&self, input: &PreferredSettingInput) -> Result<SwizzleMode>;

    /// DCC of a color surface
    fn compute_dcc_info(&self, input: &Gfx9DccInput) -> Result<Gfx9DccOutput>;

    /// CMASK of a color surface
    fn compute_cmask_info(&self, input: &Gfx9CmaskInput) -> Result<Gfx9CmaskOutput>;

    /// HTILE of a depth surface
    fn compute_htile_info(&self, input: &Gfx9HtileInput) -> Result<Gfx9HtileOutput>;

    /// FMASK of a multisampled color surface
    fn compute_fmask_info(&self, input: &Gfx9FmaskInput) -> Result<Gfx9FmaskOutput>;

    /// Pipe/bank XOR for a surface index
    fn compute_pipe_bank_xor(&self, input: &Gfx9PipeBankXorInput) -> Result<u32>;

    /// Whether the display engine can scan out a swizzle mode
    fn is_valid_display_swizzle_mode(&self, swizzle_mode: SwizzleMode, bpp: u32) -> Result<bool>;

    /// Byte address of a texel
    fn addr_from_coord(&self, input: &Gfx9AddrFromCoordInput) -> Result<u64>;

    /// Uncompressed view of one level of a block compressed surface
    fn nbc_view(&self, input: &Gfx9NbcViewInput) -> Result<NbcView>;
}
