//! # Swizzle and Tile Modes
//!
//! Tiling vocabulary of every generation: legacy tile modes, unified swizzle
//! modes (both the GFX9-11 and the GFX12 numbering), micro tile modes and
//! resource dimensionality.

use crate::config::Extent3d;
use crate::types::GfxLevel;

// =============================================================================
// RESOURCE TYPE
// =============================================================================

/// Resource dimensionality as seen by the oracle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ResourceType {
    /// 1D texture
    Tex1D = 0,
    /// 2D texture (also cube and arrays)
    #[default]
    Tex2D = 1,
    /// 3D texture
    Tex3D = 2,
}

// =============================================================================
// MICRO TILE MODE
// =============================================================================

/// Element ordering inside a micro tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum MicroTileMode {
    /// Displayable ordering
    #[default]
    Display = 0,
    /// Standard (thin) ordering
    Standard = 1,
    /// Depth ordering
    Depth = 2,
    /// Rotated ordering
    Render = 3,
}

impl MicroTileMode {
    /// Decode a two- or three-bit register field
    pub const fn from_bits(bits: u32) -> Self {
        match bits & 3 {
            0 => MicroTileMode::Display,
            1 => MicroTileMode::Standard,
            2 => MicroTileMode::Depth,
            _ => MicroTileMode::Render,
        }
    }
}

// =============================================================================
// LEGACY TILE MODE
// =============================================================================

/// Legacy (GFX6-8) tile mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum TileMode {
    #[default]
    LinearGeneral = 0,
    LinearAligned = 1,
    Tiled1DThin1 = 2,
    Tiled1DThick = 3,
    Tiled2DThin1 = 4,
    Tiled2DThin2 = 5,
    Tiled2DThin4 = 6,
    Tiled2DThick = 7,
    Tiled2BThin1 = 8,
    Tiled2BThin2 = 9,
    Tiled2BThin4 = 10,
    Tiled2BThick = 11,
    Tiled3DThin1 = 12,
    Tiled3DThick = 13,
    Tiled3BThin1 = 14,
    Tiled3BThick = 15,
    Tiled2DXThick = 16,
    Tiled3DXThick = 17,
    PowerSave = 18,
    PrtTiledThin1 = 19,
    Prt2DTiledThin1 = 20,
    Prt3DTiledThin1 = 21,
    PrtTiledThick = 22,
    Prt2DTiledThick = 23,
    Prt3DTiledThick = 24,
}

impl TileMode {
    /// Thick (volume friendly) tiling
    pub const fn is_thick(&self) -> bool {
        matches!(
            self,
            TileMode::Tiled1DThick
                | TileMode::Tiled2DThick
                | TileMode::Tiled2BThick
                | TileMode::Tiled3DThick
                | TileMode::Tiled3BThick
                | TileMode::Tiled2DXThick
                | TileMode::Tiled3DXThick
                | TileMode::PrtTiledThick
                | TileMode::Prt2DTiledThick
                | TileMode::Prt3DTiledThick
                | TileMode::Tiled3DThin1
                | TileMode::Prt3DTiledThin1
        )
    }

    /// Macro-tiled (2D and up)
    #[inline]
    pub fn is_macro_tiled(&self) -> bool {
        *self >= TileMode::Tiled2DThin1
    }
}

// =============================================================================
// SWIZZLE MODE
// =============================================================================

/// Unified swizzle mode
///
/// GFX9-11 and GFX12 use different numberings over the same storage; the
/// `SW_*` constants belong to the former, the `GFX12_*` constants to the
/// latter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct SwizzleMode(u8);

impl SwizzleMode {
    /// Linear
    pub const LINEAR: Self = Self(0);

    /// 256 B standard
    pub const SW_256B_S: Self = Self(1);
    /// 256 B display
    pub const SW_256B_D: Self = Self(2);
    /// 256 B rotated
    pub const SW_256B_R: Self = Self(3);
    /// 4 KiB depth
    pub const SW_4KB_Z: Self = Self(4);
    /// 4 KiB standard
    pub const SW_4KB_S: Self = Self(5);
    /// 4 KiB display
    pub const SW_4KB_D: Self = Self(6);
    /// 4 KiB rotated
    pub const SW_4KB_R: Self = Self(7);
    /// 64 KiB depth
    pub const SW_64KB_Z: Self = Self(8);
    /// 64 KiB standard
    pub const SW_64KB_S: Self = Self(9);
    /// 64 KiB display
    pub const SW_64KB_D: Self = Self(10);
    /// 64 KiB rotated
    pub const SW_64KB_R: Self = Self(11);
    /// Variable block depth; 256 KiB depth on GFX11
    pub const SW_VAR_Z: Self = Self(12);
    /// 256 KiB depth (GFX11 name of the variable depth mode)
    pub const SW_256KB_Z: Self = Self(12);
    /// Variable block standard
    pub const SW_VAR_S: Self = Self(13);
    /// Variable block display
    pub const SW_VAR_D: Self = Self(14);
    /// Variable block rotated
    pub const SW_VAR_R: Self = Self(15);
    /// 64 KiB depth, tiled XOR
    pub const SW_64KB_Z_T: Self = Self(16);
    /// 64 KiB standard, tiled XOR
    pub const SW_64KB_S_T: Self = Self(17);
    /// 64 KiB display, tiled XOR
    pub const SW_64KB_D_T: Self = Self(18);
    /// 64 KiB rotated, tiled XOR
    pub const SW_64KB_R_T: Self = Self(19);
    /// 4 KiB depth, XOR
    pub const SW_4KB_Z_X: Self = Self(20);
    /// 4 KiB standard, XOR
    pub const SW_4KB_S_X: Self = Self(21);
    /// 4 KiB display, XOR
    pub const SW_4KB_D_X: Self = Self(22);
    /// 4 KiB rotated, XOR
    pub const SW_4KB_R_X: Self = Self(23);
    /// 64 KiB depth, XOR
    pub const SW_64KB_Z_X: Self = Self(24);
    /// 64 KiB standard, XOR
    pub const SW_64KB_S_X: Self = Self(25);
    /// 64 KiB display, XOR
    pub const SW_64KB_D_X: Self = Self(26);
    /// 64 KiB rotated, XOR
    pub const SW_64KB_R_X: Self = Self(27);
    /// 256 KiB depth, XOR (GFX11)
    pub const SW_256KB_Z_X: Self = Self(28);
    /// 256 KiB standard, XOR (GFX11)
    pub const SW_256KB_S_X: Self = Self(29);
    /// 256 KiB display, XOR (GFX11)
    pub const SW_256KB_D_X: Self = Self(30);
    /// 256 KiB rotated, XOR (GFX11)
    pub const SW_256KB_R_X: Self = Self(31);

    /// GFX12 256 B planar
    pub const GFX12_256B_2D: Self = Self(1);
    /// GFX12 4 KiB planar
    pub const GFX12_4KB_2D: Self = Self(2);
    /// GFX12 64 KiB planar
    pub const GFX12_64KB_2D: Self = Self(3);
    /// GFX12 256 KiB planar
    pub const GFX12_256KB_2D: Self = Self(4);
    /// GFX12 4 KiB volume
    pub const GFX12_4KB_3D: Self = Self(5);
    /// GFX12 64 KiB volume
    pub const GFX12_64KB_3D: Self = Self(6);
    /// GFX12 256 KiB volume
    pub const GFX12_256KB_3D: Self = Self(7);

    /// Wrap a raw mode number
    #[inline]
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    /// Raw mode number
    #[inline]
    pub const fn raw(&self) -> u8 {
        self.0
    }

    /// Bit for this mode in a mode mask
    #[inline]
    pub const fn mask_bit(&self) -> u32 {
        1 << self.0
    }

    /// Linear
    #[inline]
    pub const fn is_linear(&self) -> bool {
        self.0 == 0
    }

    /// Same block size with the micro ordering bits cleared (GFX9-11)
    #[inline]
    pub const fn family_base(&self) -> Self {
        Self(self.0 & !3)
    }

    /// Micro tile ordering of a GFX9-11 mode
    pub const fn micro_tile_mode(&self) -> MicroTileMode {
        match self.0 {
            0 | 2 | 6 | 10 | 14 | 18 | 22 | 26 | 30 => MicroTileMode::Display,
            1 | 5 | 9 | 13 | 17 | 21 | 25 | 29 => MicroTileMode::Standard,
            3 | 7 | 11 | 15 | 19 | 23 | 27 | 31 => MicroTileMode::Render,
            _ => MicroTileMode::Depth,
        }
    }

    /// log2 of the swizzle block size in bytes (GFX9-11), 0 for linear
    pub const fn block_size_log2(&self) -> u32 {
        if self.0 == 0 {
            return 0;
        }
        match (self.0 & !3) + 3 {
            3 => 8,
            7 | 23 => 12,
            11 | 19 | 27 => 16,
            31 => 18,
            _ => 0,
        }
    }

    /// log2 of the swizzle block size in bytes (GFX12), 0 for linear
    pub const fn gfx12_block_size_log2(&self) -> u32 {
        match self.0 {
            1 => 8,
            2 | 5 => 12,
            3 | 6 => 16,
            4 | 7 => 18,
            _ => 0,
        }
    }

    /// Volume (3D) block on GFX12
    #[inline]
    pub const fn is_gfx12_3d(&self) -> bool {
        self.0 >= 5
    }

    /// Block size log2 for a given generation numbering
    pub fn block_size_log2_for(&self, gfx: GfxLevel) -> u32 {
        if gfx >= GfxLevel::Gfx12 {
            self.gfx12_block_size_log2()
        } else {
            self.block_size_log2()
        }
    }
}

// =============================================================================
// GFX12 BLOCK GEOMETRY
// =============================================================================

/// Linear "block" width in elements per log2(bytes per element)
pub const GFX12_LINEAR_BLOCK: [u32; 5] = [256, 128, 64, 32, 16];

/// 4 KiB volume block per log2(bytes per element)
pub const GFX12_BLOCK3D_4K: [[u32; 3]; 5] =
    [[16, 16, 16], [8, 16, 16], [8, 16, 8], [8, 8, 8], [4, 8, 8]];

/// 64 KiB volume block per log2(bytes per element)
pub const GFX12_BLOCK3D_64K: [[u32; 3]; 5] =
    [[64, 32, 32], [32, 32, 32], [32, 32, 16], [32, 16, 16], [16, 16, 16]];

/// 256 KiB volume block per log2(bytes per element)
pub const GFX12_BLOCK3D_256K: [[u32; 3]; 5] =
    [[64, 64, 64], [32, 64, 64], [32, 64, 32], [32, 32, 32], [16, 32, 32]];

/// 256 B planar block per log2(samples), log2(bytes per element)
pub const GFX12_BLOCK2D_256B: [[[u32; 2]; 5]; 4] = [
    [[16, 16], [16, 8], [8, 8], [8, 4], [4, 4]],
    [[16, 8], [8, 8], [8, 4], [4, 4], [4, 2]],
    [[8, 8], [8, 4], [4, 4], [4, 2], [2, 2]],
    [[8, 4], [4, 4], [4, 2], [2, 2], [2, 1]],
];

/// 4 KiB planar block per log2(samples), log2(bytes per element)
pub const GFX12_BLOCK2D_4K: [[[u32; 2]; 5]; 4] = [
    [[64, 64], [64, 32], [32, 32], [32, 16], [16, 16]],
    [[64, 32], [32, 32], [32, 16], [16, 16], [16, 8]],
    [[32, 32], [32, 16], [16, 16], [16, 8], [8, 8]],
    [[32, 16], [16, 16], [16, 8], [8, 8], [8, 4]],
];

/// 64 KiB planar block per log2(samples), log2(bytes per element)
pub const GFX12_BLOCK2D_64K: [[[u32; 2]; 5]; 4] = [
    [[256, 256], [256, 128], [128, 128], [128, 64], [64, 64]],
    [[256, 128], [128, 128], [128, 64], [64, 64], [64, 32]],
    [[128, 128], [128, 64], [64, 64], [64, 32], [32, 32]],
    [[128, 64], [64, 64], [64, 32], [32, 32], [32, 16]],
];

/// 256 KiB planar block per log2(samples), log2(bytes per element)
pub const GFX12_BLOCK2D_256K: [[[u32; 2]; 5]; 4] = [
    [[512, 512], [512, 256], [256, 256], [256, 128], [128, 128]],
    [[512, 256], [256, 256], [256, 128], [128, 128], [128, 64]],
    [[256, 256], [256, 128], [128, 128], [128, 64], [64, 64]],
    [[256, 128], [128, 128], [128, 64], [64, 64], [64, 32]],
];

/// Block extent of a GFX12 swizzle mode in elements
///
/// Linear reports its pitch granule with unit height.
pub fn gfx12_block_extent(mode: SwizzleMode, log_bpp: usize, log_samples: usize) -> Extent3d {
    let planar = |t: [u32; 2]| Extent3d::new(t[0], t[1], 1);
    let volume = |t: [u32; 3]| Extent3d::new(t[0], t[1], t[2]);
    match mode.raw() {
        1 => planar(GFX12_BLOCK2D_256B[log_samples][log_bpp]),
        2 => planar(GFX12_BLOCK2D_4K[log_samples][log_bpp]),
        3 => planar(GFX12_BLOCK2D_64K[log_samples][log_bpp]),
        4 => planar(GFX12_BLOCK2D_256K[log_samples][log_bpp]),
        5 => volume(GFX12_BLOCK3D_4K[log_bpp]),
        6 => volume(GFX12_BLOCK3D_64K[log_bpp]),
        7 => volume(GFX12_BLOCK3D_256K[log_bpp]),
        _ => Extent3d::new(GFX12_LINEAR_BLOCK[log_bpp], 1, 1),
    }
}

static_assertions::const_assert_eq!(core::mem::size_of::<SwizzleMode>(), 1);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_micro_tile_mode_families() {
        assert_eq!(SwizzleMode::SW_64KB_S_X.micro_tile_mode(), MicroTileMode::Standard);
        assert_eq!(SwizzleMode::SW_64KB_D_X.micro_tile_mode(), MicroTileMode::Display);
        assert_eq!(SwizzleMode::SW_64KB_R_X.micro_tile_mode(), MicroTileMode::Render);
        assert_eq!(SwizzleMode::SW_64KB_Z_X.micro_tile_mode(), MicroTileMode::Depth);
        assert_eq!(SwizzleMode::LINEAR.micro_tile_mode(), MicroTileMode::Display);
    }

    #[test]
    fn test_block_sizes() {
        assert_eq!(SwizzleMode::SW_256B_D.block_size_log2(), 8);
        assert_eq!(SwizzleMode::SW_4KB_S_X.block_size_log2(), 12);
        assert_eq!(SwizzleMode::SW_64KB_R_T.block_size_log2(), 16);
        assert_eq!(SwizzleMode::SW_256KB_R_X.block_size_log2(), 18);
        assert_eq!(SwizzleMode::GFX12_64KB_3D.gfx12_block_size_log2(), 16);
        assert_eq!(SwizzleMode::GFX12_256B_2D.gfx12_block_size_log2(), 8);
    }

    #[test]
    fn test_gfx12_block_extent_matches_block_size() {
        // Planar and volume blocks hold exactly their byte budget
        for log_bpp in 0..5usize {
            for raw in 1..8u8 {
                let mode = SwizzleMode::from_raw(raw);
                let e = gfx12_block_extent(mode, log_bpp, 0);
                let bytes = (e.width * e.height * e.depth) << log_bpp;
                assert_eq!(bytes, 1 << mode.gfx12_block_size_log2());
            }
        }
    }

    #[test]
    fn test_thick_tile_modes() {
        assert!(TileMode::Tiled3DThin1.is_thick());
        assert!(TileMode::Tiled1DThick.is_thick());
        assert!(!TileMode::Tiled2DThin1.is_thick());
        assert!(TileMode::Tiled2DThin1.is_macro_tiled());
        assert!(!TileMode::Tiled1DThin1.is_macro_tiled());
    }
}
