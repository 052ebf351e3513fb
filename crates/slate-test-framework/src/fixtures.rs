//! # GPU Fixtures
//!
//! One representative [`GpuInfo`] per generation, with register tables and
//! GB_ADDR_CONFIG values shaped like the real parts.

use slate_core::{ChipFamily, GfxLevel, GpuInfo, VcnVersion};

// =============================================================================
// REGISTER TABLES
// =============================================================================

// GB_TILE_MODE fields
const MICRO_SHIFT_GFX6: u32 = 0;
const MICRO_SHIFT_GFX7: u32 = 22;
const PIPE_CONFIG_SHIFT: u32 = 6;
const NUM_BANKS_SHIFT: u32 = 20;

// GB_MACROTILE_MODE fields
const MACRO_BANK_HEIGHT_SHIFT: u32 = 2;
const MACRO_NUM_BANKS_SHIFT: u32 = 6;

/// P8_32x32_16x16
const PIPE_CONFIG_P8: u32 = 12;

/// Micro tile mode of a table slot
///
/// Slots 0-7 hold depth configurations, 8-12 linear and displayable ones,
/// the rest thin and thick texture configurations.
const fn slot_micro_mode(index: usize) -> u32 {
    match index {
        0..=7 => 2,
        8..=12 => 0,
        _ => 1,
    }
}

/// GB_TILE_MODE table of a legacy generation
pub const fn tile_mode_table(gfx: GfxLevel) -> [u32; 32] {
    let mut table = [0u32; 32];
    let mut i = 0;
    while i < table.len() {
        table[i] = match gfx {
            GfxLevel::Gfx6 => {
                (slot_micro_mode(i) << MICRO_SHIFT_GFX6)
                    | (PIPE_CONFIG_P8 << PIPE_CONFIG_SHIFT)
                    | (2 << NUM_BANKS_SHIFT)
            }
            _ => (slot_micro_mode(i) << MICRO_SHIFT_GFX7) | (PIPE_CONFIG_P8 << PIPE_CONFIG_SHIFT),
        };
        i += 1;
    }
    table
}

/// GB_MACROTILE_MODE table: 8 banks, bank height 2
pub const fn macrotile_mode_table() -> [u32; 16] {
    [(2 << MACRO_NUM_BANKS_SHIFT) | (1 << MACRO_BANK_HEIGHT_SHIFT); 16]
}

/// Pack GB_ADDR_CONFIG from its log2 fields
pub const fn gb_addr_config(pipes: u32, banks: u32, shader_engines: u32, rb_per_se: u32, pkrs: u32) -> u32 {
    (pipes & 0x7) | ((pkrs & 0x7) << 8) | ((banks & 0x7) << 12) | ((shader_engines & 0x3) << 19) | ((rb_per_se & 0x3) << 26)
}

// =============================================================================
// LEGACY
// =============================================================================

/// Tahiti
pub const fn gfx6() -> GpuInfo {
    let mut info = GpuInfo::new(GfxLevel::Gfx6, ChipFamily::Tahiti)
        .with_tile_tables(tile_mode_table(GfxLevel::Gfx6), [0; 16]);
    info.num_tile_pipes = 8;
    info.max_render_backends = 8;
    info
}

/// Hawaii
pub const fn gfx7() -> GpuInfo {
    let mut info = GpuInfo::new(GfxLevel::Gfx7, ChipFamily::Hawaii)
        .with_tile_tables(tile_mode_table(GfxLevel::Gfx7), macrotile_mode_table());
    info.num_tile_pipes = 16;
    info.max_render_backends = 16;
    info
}

/// Polaris 10
pub const fn gfx8() -> GpuInfo {
    let mut info = GpuInfo::new(GfxLevel::Gfx8, ChipFamily::Polaris10)
        .with_tile_tables(tile_mode_table(GfxLevel::Gfx8), macrotile_mode_table());
    info.num_tile_pipes = 8;
    info.max_render_backends = 8;
    info
}

/// Stoney, a two-pipe APU
pub const fn stoney() -> GpuInfo {
    let mut info = GpuInfo::new(GfxLevel::Gfx8, ChipFamily::Stoney)
        .with_tile_tables(tile_mode_table(GfxLevel::Gfx8), macrotile_mode_table())
        .without_dedicated_vram();
    info.num_tile_pipes = 2;
    info.max_render_backends = 1;
    info
}

// =============================================================================
// UNIFIED
// =============================================================================

/// Vega 10
pub const fn gfx9() -> GpuInfo {
    let mut info = GpuInfo::new(GfxLevel::Gfx9, ChipFamily::Vega10)
        .with_gb_addr_config(gb_addr_config(4, 4, 2, 2, 0));
    info.max_render_backends = 16;
    info
}

/// Raven, an APU whose display reads unaligned DCC
pub const fn raven() -> GpuInfo {
    let mut info = GpuInfo::new(GfxLevel::Gfx9, ChipFamily::Raven)
        .with_gb_addr_config(gb_addr_config(2, 3, 0, 1, 0))
        .with_vcn(VcnVersion::new(1, 0, 0))
        .without_dedicated_vram();
    info.max_render_backends = 2;
    info.use_display_dcc_unaligned = true;
    info
}

/// Navi 10
pub const fn gfx10() -> GpuInfo {
    let mut info = GpuInfo::new(GfxLevel::Gfx10, ChipFamily::Navi10)
        .with_gb_addr_config(gb_addr_config(4, 0, 0, 0, 0))
        .with_vcn(VcnVersion::V2_0_0);
    info.max_render_backends = 16;
    info.use_display_dcc_with_retile_blit = true;
    info
}

/// Navi 21
pub const fn gfx10_3() -> GpuInfo {
    let mut info = GpuInfo::new(GfxLevel::Gfx10_3, ChipFamily::Navi21)
        .with_gb_addr_config(gb_addr_config(4, 0, 0, 0, 3))
        .with_vcn(VcnVersion::new(3, 0, 0));
    info.max_render_backends = 16;
    info.has_dcc_constant_encode = true;
    info.use_display_dcc_with_retile_blit = true;
    info
}

/// Navi 31, 32 pipes
pub const fn gfx11() -> GpuInfo {
    let mut info = GpuInfo::new(GfxLevel::Gfx11, ChipFamily::Navi31)
        .with_gb_addr_config(gb_addr_config(5, 0, 0, 0, 4))
        .with_vcn(VcnVersion::new(4, 0, 0));
    info.max_render_backends = 24;
    info.has_dcc_constant_encode = true;
    info.use_display_dcc_with_retile_blit = true;
    info
}

/// First GFX11.5 APU
pub const fn gfx11_5() -> GpuInfo {
    let mut info = GpuInfo::new(GfxLevel::Gfx11_5, ChipFamily::Gfx1150)
        .with_gb_addr_config(gb_addr_config(3, 0, 0, 0, 2))
        .with_vcn(VcnVersion::new(4, 0, 5))
        .without_dedicated_vram();
    info.max_render_backends = 8;
    info.has_dcc_constant_encode = true;
    info.use_display_dcc_with_retile_blit = true;
    info
}

/// Navi 48
pub const fn gfx12() -> GpuInfo {
    let mut info = GpuInfo::new(GfxLevel::Gfx12, ChipFamily::Navi48)
        .with_gb_addr_config(gb_addr_config(4, 0, 0, 0, 3))
        .with_vcn(VcnVersion::new(5, 0, 0));
    info.max_render_backends = 16;
    info.has_dcc_constant_encode = true;
    info.gfx12_supports_display_dcc = true;
    info
}

/// Representative GPU of a generation
pub const fn for_level(gfx: GfxLevel) -> GpuInfo {
    match gfx {
        GfxLevel::Gfx6 => gfx6(),
        GfxLevel::Gfx7 => gfx7(),
        GfxLevel::Gfx8 => gfx8(),
        GfxLevel::Gfx9 => gfx9(),
        GfxLevel::Gfx10 => gfx10(),
        GfxLevel::Gfx10_3 => gfx10_3(),
        GfxLevel::Gfx11 => gfx11(),
        GfxLevel::Gfx11_5 => gfx11_5(),
        GfxLevel::Gfx12 => gfx12(),
    }
}

/// One representative GPU per generation, oldest first
pub const fn all() -> [GpuInfo; 9] {
    [
        gfx6(),
        gfx7(),
        gfx8(),
        gfx9(),
        gfx10(),
        gfx10_3(),
        gfx11(),
        gfx11_5(),
        gfx12(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_match_their_level() {
        for info in all() {
            assert_eq!(for_level(info.gfx_level), info);
        }
    }

    #[test]
    fn test_tile_table_micro_modes() {
        let gfx6 = tile_mode_table(GfxLevel::Gfx6);
        assert_eq!(gfx6[0] & 3, 2);
        assert_eq!(gfx6[8] & 3, 0);
        assert_eq!(gfx6[14] & 3, 1);

        let gfx7 = tile_mode_table(GfxLevel::Gfx7);
        assert_eq!((gfx7[0] >> 22) & 7, 2);
        assert_eq!((gfx7[14] >> 22) & 7, 1);
    }

    #[test]
    fn test_addr_config_fields() {
        let cfg = gfx9().gb_addr_config;
        assert_eq!(cfg & 7, 4);
        assert_eq!((cfg >> 12) & 7, 4);
        assert_eq!((cfg >> 19) & 3, 2);
        assert_eq!((cfg >> 26) & 3, 2);
        assert_eq!((gfx11().gb_addr_config >> 8) & 7, 4);
    }
}
