//! # Kernel Tiling Flags
//!
//! The 64-bit `tiling_flags` word the kernel stores with every buffer
//! object. Three incompatible layouts exist:
//!
//! ```text
//! GFX6-8   ARRAY_MODE | PIPE_CONFIG | TILE_SPLIT | MICRO_TILE_MODE | BANK_W/H | MTILEA | NUM_BANKS
//! GFX9-11  SWIZZLE_MODE | DCC_OFFSET_256B | DCC_PITCH_MAX | DCC_IND_64B/128B | DCC_MAX_BLOCK | .. | SCANOUT
//! GFX12    SWIZZLE_MODE | DCC_MAX_BLOCK | DCC_NUMBER_TYPE | DCC_DATA_FORMAT | DCC_WRITE_DISABLE | .. | SCANOUT
//! ```
//!
//! Bit positions follow the kernel UAPI and must never change.

use log::warn;

use slate_core::math::log2;
use slate_core::{GfxLevel, GpuInfo, SurfaceDescriptor, SurfaceFlags, SurfaceMode, SwizzleMode};

// =============================================================================
// FIELDS
// =============================================================================

/// A bit field of the tiling flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilingField {
    shift: u32,
    mask: u64,
}

impl TilingField {
    const fn new(shift: u32, mask: u64) -> Self {
        Self { shift, mask }
    }

    // GFX6-8
    /// Array (tile) mode
    pub const ARRAY_MODE: Self = Self::new(0, 0xF);
    /// Pipe configuration
    pub const PIPE_CONFIG: Self = Self::new(4, 0x1F);
    /// Tile split code
    pub const TILE_SPLIT: Self = Self::new(9, 0x7);
    /// Micro tile mode, 0 is displayable
    pub const MICRO_TILE_MODE: Self = Self::new(12, 0x7);
    /// log2 of the bank width
    pub const BANK_WIDTH: Self = Self::new(15, 0x3);
    /// log2 of the bank height
    pub const BANK_HEIGHT: Self = Self::new(17, 0x3);
    /// log2 of the macro tile aspect
    pub const MACRO_TILE_ASPECT: Self = Self::new(19, 0x3);
    /// log2 of the bank count, minus one
    pub const NUM_BANKS: Self = Self::new(21, 0x3);

    // GFX9-11
    /// Swizzle mode
    pub const SWIZZLE_MODE: Self = Self::new(0, 0x1F);
    /// Offset of the displayable DCC in 256 B units
    pub const DCC_OFFSET_256B: Self = Self::new(5, 0xFF_FFFF);
    /// Pitch of the displayable DCC minus one
    pub const DCC_PITCH_MAX: Self = Self::new(29, 0x3FFF);
    /// DCC independent 64 B blocks
    pub const DCC_INDEPENDENT_64B: Self = Self::new(43, 0x1);
    /// DCC independent 128 B blocks
    pub const DCC_INDEPENDENT_128B: Self = Self::new(44, 0x1);
    /// DCC max compressed block size
    pub const DCC_MAX_COMPRESSED_BLOCK_SIZE: Self = Self::new(45, 0x3);
    /// The buffer is scanned out
    pub const SCANOUT: Self = Self::new(63, 0x1);

    // GFX12
    /// Swizzle mode
    pub const GFX12_SWIZZLE_MODE: Self = Self::new(0, 0x7);
    /// DCC max compressed block size
    pub const GFX12_DCC_MAX_COMPRESSED_BLOCK: Self = Self::new(3, 0x3);
    /// DCC number type
    pub const GFX12_DCC_NUMBER_TYPE: Self = Self::new(5, 0x7);
    /// DCC data format
    pub const GFX12_DCC_DATA_FORMAT: Self = Self::new(8, 0x3F);
    /// DCC write compression disabled
    pub const GFX12_DCC_WRITE_COMPRESS_DISABLE: Self = Self::new(14, 0x1);
    /// The buffer is scanned out
    pub const GFX12_SCANOUT: Self = Self::new(63, 0x1);

    /// Read the field out of `flags`
    #[inline]
    pub const fn get(&self, flags: u64) -> u64 {
        (flags >> self.shift) & self.mask
    }

    /// Encode `value` at the field position, truncated to the field width
    #[inline]
    pub const fn set(&self, value: u64) -> u64 {
        (value & self.mask) << self.shift
    }
}

// ARRAY_MODE values
const ARRAY_LINEAR_ALIGNED: u64 = 1;
const ARRAY_1D_TILED_THIN1: u64 = 2;
const ARRAY_2D_TILED_THIN1: u64 = 4;

// MICRO_TILE_MODE values
const MICRO_DISPLAY: u64 = 0;
const MICRO_THIN: u64 = 1;

/// Tile split in bytes for a TILE_SPLIT code
fn tile_split_bytes(code: u64) -> u32 {
    match code {
        0 => 64,
        1 => 128,
        2 => 256,
        3 => 512,
        4 => 1024,
        5 => 2048,
        6 => 4096,
        _ => {
            warn!("unknown tile split code {}, assuming 1024", code);
            1024
        }
    }
}

/// TILE_SPLIT code for a tile split in bytes
fn tile_split_code(bytes: u32) -> u64 {
    match bytes {
        64 => 0,
        128 => 1,
        256 => 2,
        512 => 3,
        2048 => 5,
        4096 => 6,
        _ => 4,
    }
}

// =============================================================================
// IMPORT / EXPORT
// =============================================================================

/// Load the layout fields the kernel stores in `tiling_flags` into `surf`
///
/// Call before computing the surface. Returns the tiling mode the flags
/// imply, or `None` on GFX12, where the caller's mode stands.
pub fn apply_bo_metadata(gfx: GfxLevel, surf: &mut SurfaceDescriptor, tiling_flags: u64) -> Option<SurfaceMode> {
    let get = |field: TilingField| field.get(tiling_flags);

    let (scanout, mode) = if gfx >= GfxLevel::Gfx12 {
        let layout = surf.ensure_unified();
        layout.swizzle_mode = SwizzleMode::from_raw(get(TilingField::GFX12_SWIZZLE_MODE) as u8);
        layout.color.dcc.max_compressed_block_size = get(TilingField::GFX12_DCC_MAX_COMPRESSED_BLOCK) as u8;
        layout.color.dcc_data_format = get(TilingField::GFX12_DCC_DATA_FORMAT) as u8;
        layout.color.dcc_number_type = get(TilingField::GFX12_DCC_NUMBER_TYPE) as u8;
        layout.color.dcc_write_compress_disable = get(TilingField::GFX12_DCC_WRITE_COMPRESS_DISABLE) != 0;
        (get(TilingField::GFX12_SCANOUT) != 0, None)
    } else if gfx >= GfxLevel::Gfx9 {
        let layout = surf.ensure_unified();
        layout.swizzle_mode = SwizzleMode::from_raw(get(TilingField::SWIZZLE_MODE) as u8);
        layout.color.dcc.independent_64b = get(TilingField::DCC_INDEPENDENT_64B) != 0;
        layout.color.dcc.independent_128b = get(TilingField::DCC_INDEPENDENT_128B) != 0;
        layout.color.dcc.max_compressed_block_size = get(TilingField::DCC_MAX_COMPRESSED_BLOCK_SIZE) as u8;
        layout.color.display_dcc.pitch_max = get(TilingField::DCC_PITCH_MAX) as u32;

        let mode = if layout.swizzle_mode.is_linear() {
            SurfaceMode::LinearAligned
        } else {
            SurfaceMode::Tiled2D
        };
        (get(TilingField::SCANOUT) != 0, Some(mode))
    } else {
        let layout = surf.ensure_legacy();
        layout.pipe_config = get(TilingField::PIPE_CONFIG) as u32;
        layout.bankw = 1 << get(TilingField::BANK_WIDTH);
        layout.bankh = 1 << get(TilingField::BANK_HEIGHT);
        layout.tile_split = tile_split_bytes(get(TilingField::TILE_SPLIT));
        layout.mtilea = 1 << get(TilingField::MACRO_TILE_ASPECT);
        layout.num_banks = 2 << get(TilingField::NUM_BANKS);

        let mode = match get(TilingField::ARRAY_MODE) {
            ARRAY_2D_TILED_THIN1 => SurfaceMode::Tiled2D,
            ARRAY_1D_TILED_THIN1 => SurfaceMode::Tiled1D,
            _ => SurfaceMode::LinearAligned,
        };
        (get(TilingField::MICRO_TILE_MODE) == MICRO_DISPLAY, Some(mode))
    };

    surf.flags.set(SurfaceFlags::SCANOUT, scanout);
    mode
}

/// Encode the layout fields of a computed `surf` as kernel tiling flags
pub fn compute_bo_metadata(info: &GpuInfo, surf: &SurfaceDescriptor) -> u64 {
    let scanout = surf.flags.contains(SurfaceFlags::SCANOUT) as u64;

    if let Some(layout) = surf.unified().filter(|_| info.gfx_level >= GfxLevel::Gfx12) {
        let color = &layout.color;
        return TilingField::GFX12_SWIZZLE_MODE.set(layout.swizzle_mode.raw() as u64)
            | TilingField::GFX12_DCC_MAX_COMPRESSED_BLOCK.set(color.dcc.max_compressed_block_size as u64)
            | TilingField::GFX12_DCC_NUMBER_TYPE.set(color.dcc_number_type as u64)
            | TilingField::GFX12_DCC_DATA_FORMAT.set(color.dcc_data_format as u64)
            | TilingField::GFX12_DCC_WRITE_COMPRESS_DISABLE.set(color.dcc_write_compress_disable as u64)
            | TilingField::GFX12_SCANOUT.set(scanout);
    }

    if let Some(layout) = surf.unified().filter(|_| info.gfx_level >= GfxLevel::Gfx9) {
        let dcc_offset = if surf.meta.offset == 0 {
            0
        } else if surf.display_dcc_offset != 0 {
            surf.display_dcc_offset
        } else {
            surf.meta.offset
        };
        debug_assert!(dcc_offset == 0 || ((dcc_offset >> 8) != 0 && (dcc_offset >> 8) < (1 << 24)));

        let dcc = &layout.color.dcc;
        return TilingField::SWIZZLE_MODE.set(layout.swizzle_mode.raw() as u64)
            | TilingField::DCC_OFFSET_256B.set(dcc_offset >> 8)
            | TilingField::DCC_PITCH_MAX.set(layout.color.display_dcc.pitch_max as u64)
            | TilingField::DCC_INDEPENDENT_64B.set(dcc.independent_64b as u64)
            | TilingField::DCC_INDEPENDENT_128B.set(dcc.independent_128b as u64)
            | TilingField::DCC_MAX_COMPRESSED_BLOCK_SIZE.set(dcc.max_compressed_block_size as u64)
            | TilingField::SCANOUT.set(scanout);
    }

    let Some(layout) = surf.legacy() else {
        return 0;
    };

    let array_mode = match layout.levels.first().map(|l| l.mode) {
        Some(SurfaceMode::Tiled2D) => ARRAY_2D_TILED_THIN1,
        Some(SurfaceMode::Tiled1D) => ARRAY_1D_TILED_THIN1,
        _ => ARRAY_LINEAR_ALIGNED,
    };

    let mut flags = TilingField::ARRAY_MODE.set(array_mode)
        | TilingField::PIPE_CONFIG.set(layout.pipe_config as u64)
        | TilingField::BANK_WIDTH.set(log2(layout.bankw) as u64)
        | TilingField::BANK_HEIGHT.set(log2(layout.bankh) as u64)
        | TilingField::MACRO_TILE_ASPECT.set(log2(layout.mtilea) as u64)
        | TilingField::NUM_BANKS.set(log2(layout.num_banks).saturating_sub(1) as u64);
    if layout.tile_split != 0 {
        flags |= TilingField::TILE_SPLIT.set(tile_split_code(layout.tile_split));
    }

    let micro = if scanout != 0 { MICRO_DISPLAY } else { MICRO_THIN };
    flags | TilingField::MICRO_TILE_MODE.set(micro)
}

#[cfg(test)]
mod tests {
    use super::*;
    use slate_core::surface::LegacyLevel;
    use slate_test_framework::fixtures;

    fn blank() -> SurfaceDescriptor {
        SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::empty())
    }

    #[test]
    fn test_field_positions() {
        assert_eq!(TilingField::DCC_OFFSET_256B.set(1), 1 << 5);
        assert_eq!(TilingField::DCC_PITCH_MAX.set(1), 1 << 29);
        assert_eq!(TilingField::DCC_MAX_COMPRESSED_BLOCK_SIZE.set(3), 3 << 45);
        assert_eq!(TilingField::SCANOUT.set(1), 1 << 63);
        assert_eq!(TilingField::GFX12_DCC_DATA_FORMAT.set(0xFF), 0x3F << 8);
        assert_eq!(TilingField::NUM_BANKS.get(3 << 21), 3);
    }

    #[test]
    fn test_gfx9_import() {
        let flags = TilingField::SWIZZLE_MODE.set(SwizzleMode::SW_64KB_R_X.raw() as u64)
            | TilingField::DCC_INDEPENDENT_64B.set(1)
            | TilingField::DCC_MAX_COMPRESSED_BLOCK_SIZE.set(1)
            | TilingField::DCC_PITCH_MAX.set(255)
            | TilingField::SCANOUT.set(1);

        let mut surf = blank();
        let mode = apply_bo_metadata(GfxLevel::Gfx10_3, &mut surf, flags);
        assert_eq!(mode, Some(SurfaceMode::Tiled2D));
        assert!(surf.flags.contains(SurfaceFlags::SCANOUT));

        let layout = surf.unified().unwrap();
        assert_eq!(layout.swizzle_mode, SwizzleMode::SW_64KB_R_X);
        assert!(layout.color.dcc.independent_64b);
        assert!(!layout.color.dcc.independent_128b);
        assert_eq!(layout.color.dcc.max_compressed_block_size, 1);
        assert_eq!(layout.color.display_dcc.pitch_max, 255);
    }

    #[test]
    fn test_gfx9_linear_import_clears_scanout() {
        let mut surf = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::SCANOUT);
        let mode = apply_bo_metadata(GfxLevel::Gfx9, &mut surf, 0);
        assert_eq!(mode, Some(SurfaceMode::LinearAligned));
        assert!(!surf.flags.contains(SurfaceFlags::SCANOUT));
    }

    #[test]
    fn test_gfx9_round_trip() {
        let info = fixtures::gfx10_3();
        let flags = TilingField::SWIZZLE_MODE.set(27)
            | TilingField::DCC_PITCH_MAX.set(0x3FFF)
            | TilingField::DCC_INDEPENDENT_64B.set(1)
            | TilingField::DCC_INDEPENDENT_128B.set(1)
            | TilingField::DCC_MAX_COMPRESSED_BLOCK_SIZE.set(2)
            | TilingField::SCANOUT.set(1);

        let mut surf = blank();
        apply_bo_metadata(info.gfx_level, &mut surf, flags);
        assert_eq!(compute_bo_metadata(&info, &surf), flags);
    }

    #[test]
    fn test_gfx9_export_dcc_offset() {
        let info = fixtures::gfx9();
        let mut surf = blank();
        surf.meta.offset = 0x20000;
        assert_eq!(TilingField::DCC_OFFSET_256B.get(compute_bo_metadata(&info, &surf)), 0x200);

        // The display copy is what the display engine reads
        surf.display_dcc_offset = 0x10000;
        assert_eq!(TilingField::DCC_OFFSET_256B.get(compute_bo_metadata(&info, &surf)), 0x100);
    }

    #[test]
    fn test_gfx12_round_trip() {
        let info = fixtures::gfx12();
        let flags = TilingField::GFX12_SWIZZLE_MODE.set(SwizzleMode::GFX12_256KB_2D.raw() as u64)
            | TilingField::GFX12_DCC_MAX_COMPRESSED_BLOCK.set(2)
            | TilingField::GFX12_DCC_NUMBER_TYPE.set(5)
            | TilingField::GFX12_DCC_DATA_FORMAT.set(0x2A)
            | TilingField::GFX12_DCC_WRITE_COMPRESS_DISABLE.set(1)
            | TilingField::GFX12_SCANOUT.set(1);

        let mut surf = blank();
        assert_eq!(apply_bo_metadata(info.gfx_level, &mut surf, flags), None);

        let color = surf.unified().unwrap().color;
        assert_eq!(color.dcc_number_type, 5);
        assert_eq!(color.dcc_data_format, 0x2A);
        assert!(color.dcc_write_compress_disable);
        assert_eq!(compute_bo_metadata(&info, &surf), flags);
    }

    #[test]
    fn test_legacy_round_trip() {
        let info = fixtures::gfx8();
        let flags = TilingField::ARRAY_MODE.set(ARRAY_2D_TILED_THIN1)
            | TilingField::PIPE_CONFIG.set(12)
            | TilingField::TILE_SPLIT.set(2)
            | TilingField::MICRO_TILE_MODE.set(MICRO_THIN)
            | TilingField::BANK_WIDTH.set(1)
            | TilingField::BANK_HEIGHT.set(2)
            | TilingField::MACRO_TILE_ASPECT.set(3)
            | TilingField::NUM_BANKS.set(2);

        let mut surf = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::SCANOUT);
        let mode = apply_bo_metadata(info.gfx_level, &mut surf, flags);
        assert_eq!(mode, Some(SurfaceMode::Tiled2D));
        assert!(!surf.flags.contains(SurfaceFlags::SCANOUT));

        let layout = surf.legacy_mut().unwrap();
        assert_eq!(layout.bankw, 2);
        assert_eq!(layout.bankh, 4);
        assert_eq!(layout.mtilea, 8);
        assert_eq!(layout.num_banks, 8);
        assert_eq!(layout.tile_split, 256);
        assert_eq!(layout.pipe_config, 12);

        // The array mode comes from the computed level 0
        layout.levels.push(LegacyLevel {
            mode: SurfaceMode::Tiled2D,
            ..LegacyLevel::default()
        });
        assert_eq!(compute_bo_metadata(&info, &surf), flags);
    }

    #[test]
    fn test_legacy_modes_and_scanout() {
        let mut surf = blank();
        let flags = TilingField::ARRAY_MODE.set(ARRAY_1D_TILED_THIN1) | TilingField::MICRO_TILE_MODE.set(MICRO_DISPLAY);
        assert_eq!(apply_bo_metadata(GfxLevel::Gfx6, &mut surf, flags), Some(SurfaceMode::Tiled1D));
        assert!(surf.flags.contains(SurfaceFlags::SCANOUT));

        let flags = TilingField::ARRAY_MODE.set(ARRAY_LINEAR_ALIGNED) | TilingField::MICRO_TILE_MODE.set(MICRO_THIN);
        assert_eq!(apply_bo_metadata(GfxLevel::Gfx7, &mut surf, flags), Some(SurfaceMode::LinearAligned));
        assert!(!surf.flags.contains(SurfaceFlags::SCANOUT));
    }

    #[test]
    fn test_unknown_tile_split_defaults() {
        let mut surf = blank();
        apply_bo_metadata(GfxLevel::Gfx8, &mut surf, TilingField::TILE_SPLIT.set(7));
        assert_eq!(surf.legacy().unwrap().tile_split, 1024);
    }
}
