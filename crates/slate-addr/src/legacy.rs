//! # Legacy Oracle Interface (GFX6-8)
//!
//! Input and output records of the per-level tile mode oracle.

use slate_core::format::AddrFormat;
use slate_core::swizzle::TileMode;
use slate_core::Result;

// =============================================================================
// TILE INFO
// =============================================================================

/// Macro tile parameters of a 2D tiled level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TileInfo {
    /// Number of banks
    pub banks: u32,
    /// Bank width in tiles
    pub bank_width: u32,
    /// Bank height in tiles
    pub bank_height: u32,
    /// Macro tile aspect ratio
    pub macro_aspect_ratio: u32,
    /// Tile split in bytes
    pub tile_split_bytes: u32,
    /// Pipe configuration, one greater than the GB_TILE_MODE encoding
    pub pipe_config: u32,
}

/// Micro tile ordering requested from the oracle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TileType {
    /// Scanout ordering
    Displayable,
    /// Texture ordering
    #[default]
    NonDisplayable,
    /// Depth ordering
    DepthSampleOrder,
}

bitflags::bitflags! {
    /// Surface flags understood by the legacy oracle
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LegacySurfaceFlags: u32 {
        /// Color target
        const COLOR = 1 << 0;
        /// Depth plane
        const DEPTH = 1 << 1;
        /// Stencil plane
        const STENCIL = 1 << 2;
        /// Cube map
        const CUBE = 1 << 3;
        /// Scanout
        const DISPLAY = 1 << 4;
        /// Pad levels to powers of two
        const POW2_PAD = 1 << 5;
        /// Depth readable by the texture unit
        const TC_COMPATIBLE = 1 << 6;
        /// Sparse texture
        const PRT = 1 << 7;
        /// Degrade the tile mode to save space
        const OPT4SPACE = 1 << 8;
        /// DCC may be allocated
        const DCC_COMPATIBLE = 1 << 9;
        /// No stencil plane shares this tile configuration
        const NO_STENCIL = 1 << 10;
        /// Depth compression
        const COMPRESS_Z = 1 << 11;
        /// Pick a depth tile configuration that has a matching stencil one
        const MATCH_STENCIL_TILE_CFG = 1 << 12;
        /// FMASK surface
        const FMASK = 1 << 13;
    }
}

// =============================================================================
// SURFACE INFO
// =============================================================================

/// Per-level surface query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LegacySurfaceInput {
    /// Requested tile mode
    pub tile_mode: TileMode,
    /// Format code
    pub format: AddrFormat,
    /// Bits per element, zero for block compressed formats
    pub bpp: u32,
    /// Sample count
    pub num_samples: u32,
    /// Fragment count
    pub num_frags: u32,
    /// Level width in texels
    pub width: u32,
    /// Level height in texels
    pub height: u32,
    /// Slice count of this level
    pub num_slices: u32,
    /// Level index
    pub mip_level: u32,
    /// Pitch of level 0 in texels, zero for level 0 itself
    pub base_pitch: u32,
    /// Micro tile ordering
    pub tile_type: TileType,
    /// Flags
    pub flags: LegacySurfaceFlags,
    /// Forced tile mode table index, -1 to let the oracle choose
    pub tile_index: i32,
    /// Forced macro tile parameters
    pub tile_info: Option<TileInfo>,
}

/// Per-level surface result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LegacySurfaceOutput {
    /// Pitch in elements
    pub pitch: u32,
    /// Height in elements
    pub height: u32,
    /// Slice count
    pub depth: u32,
    /// Level size in bytes
    pub surf_size: u64,
    /// Slice size in bytes
    pub slice_size: u64,
    /// Base alignment in bytes
    pub base_align: u32,
    /// Pitch alignment in elements
    pub pitch_align: u32,
    /// Height alignment in elements
    pub height_align: u32,
    /// Depth alignment in slices
    pub depth_align: u32,
    /// Tile mode actually used
    pub tile_mode: TileMode,
    /// Tile mode table index actually used
    pub tile_index: i32,
    /// Macro tile mode table index
    pub macro_mode_index: i32,
    /// Macro tile parameters actually used
    pub tile_info: TileInfo,
    /// Depth is readable by the texture unit
    pub tc_compatible: bool,
    /// Stencil tile index matching this depth configuration
    pub stencil_tile_idx: i32,
}

// =============================================================================
// METADATA
// =============================================================================

/// Per-level DCC query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LegacyDccInput {
    /// Bits per element
    pub bpp: u32,
    /// Fragment count
    pub num_samples: u32,
    /// Size of the color data covered
    pub color_surf_size: u64,
    /// Tile mode of the level
    pub tile_mode: TileMode,
    /// Macro tile parameters of the level
    pub tile_info: TileInfo,
    /// Tile mode table index
    pub tile_index: i32,
    /// Macro tile mode table index
    pub macro_mode_index: i32,
}

/// Per-level DCC result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LegacyDccOutput {
    /// DCC size in bytes
    pub dcc_ram_size: u64,
    /// DCC base alignment in bytes
    pub dcc_ram_base_align: u32,
    /// DCC size is aligned, the level is contiguous
    pub dcc_ram_size_aligned: bool,
    /// Bytes covered by a fast clear
    pub dcc_fast_clear_size: u64,
    /// The next level may be compressed
    pub sub_lvl_compressible: bool,
}

/// HTILE query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LegacyHtileInput {
    /// Depth is readable by the texture unit
    pub tc_compatible: bool,
    /// Pitch of the depth level in elements
    pub pitch: u32,
    /// Height of the depth level in elements
    pub height: u32,
    /// Slice count
    pub num_slices: u32,
    /// HTILE block width in pixels
    pub block_width: u32,
    /// HTILE block height in pixels
    pub block_height: u32,
    /// Macro tile parameters of the depth level
    pub tile_info: TileInfo,
    /// Tile mode table index
    pub tile_index: i32,
    /// Macro tile mode table index
    pub macro_mode_index: i32,
}

/// HTILE result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LegacyHtileOutput {
    /// HTILE size in bytes
    pub htile_bytes: u64,
    /// Slice size in bytes
    pub slice_size: u64,
    /// Base alignment in bytes
    pub base_align: u32,
    /// Pitch
    pub pitch: u32,
}

/// FMASK query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LegacyFmaskInput {
    /// Tile mode of the color surface
    pub tile_mode: TileMode,
    /// Pitch of the color surface
    pub pitch: u32,
    /// Height of the image
    pub height: u32,
    /// Slice count
    pub num_slices: u32,
    /// Sample count
    pub num_samples: u32,
    /// Fragment count
    pub num_frags: u32,
}

/// FMASK result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LegacyFmaskOutput {
    /// Pitch in pixels
    pub pitch: u32,
    /// Height in pixels
    pub height: u32,
    /// Size in bytes
    pub fmask_bytes: u64,
    /// Slice size in bytes
    pub slice_size: u64,
    /// Base alignment in bytes
    pub base_align: u32,
    /// Tile mode table index
    pub tile_index: i32,
    /// Macro tile mode table index
    pub macro_mode_index: i32,
    /// Macro tile parameters
    pub tile_info: TileInfo,
}

/// Tile swizzle query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BaseSwizzleInput {
    /// Surface index drawn from a counter
    pub surf_index: u32,
    /// Tile mode table index
    pub tile_index: i32,
    /// Macro tile mode table index
    pub macro_mode_index: i32,
    /// Macro tile parameters
    pub tile_info: TileInfo,
    /// Tile mode
    pub tile_mode: TileMode,
}

// =============================================================================
// ORACLE TRAIT
// =============================================================================

/// Address oracle for the legacy generations
pub trait LegacyOracle {
    /// Geometry of one mip level
    fn compute_surface_info(&self, input: &LegacySurfaceInput) -> Result<LegacySurfaceOutput>;

    /// DCC of one mip level
    fn compute_dcc_info(&self, input: &LegacyDccInput) -> Result<LegacyDccOutput>;

    /// HTILE of a depth surface
    fn compute_htile_info(&self, input: &LegacyHtileInput) -> Result<LegacyHtileOutput>;

    /// FMASK of a multisampled color surface
    fn compute_fmask_info(&self, input: &LegacyFmaskInput) -> Result<LegacyFmaskOutput>;

    /// Tile swizzle for a 2D tiled surface
    fn compute_base_swizzle(&self, input: &BaseSwizzleInput) -> Result<u32>;

    /// Macro tile mode table index for a tile mode table index
    fn get_macro_mode_index(&self, tile_index: u32, bpp: u32, num_frags: u32) -> Result<u32>;
}
