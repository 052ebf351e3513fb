//! # Modifier Catalog
//!
//! Which DRM format modifiers a GPU can allocate and scan out, best first.
//!
//! Window systems pick the first modifier every party supports, so the order
//! of [`enumerate_modifiers`] is part of the contract:
//!
//! ```text
//! DCC (render optimal) ─► DCC (displayable) ─► tiled ─► portable tiled ─► LINEAR
//! ```

use arrayvec::ArrayVec;
use log::trace;

use slate_core::modifier::{dcc_block, tile, tile_version};
use slate_core::{GfxLevel, GpuInfo, Modifier, ModifierField, ModifierOptions, SurfaceDescriptor, VcnVersion};

/// Upper bound on the modifiers a single GPU advertises
pub const MAX_MODIFIERS: usize = 16;

/// A bounded list of modifiers
pub type ModifierList = ArrayVec<Modifier, MAX_MODIFIERS>;

/// Largest extent any display pipe combination scans out
const MAX_SCANOUT_EXTENT: u32 = 16384;

/// Largest extent DCN reads without independent 64 B blocks
const MAX_DCC_128B_EXTENT: u32 = 2560;

/// DRM minor version whose VCN handles 256 B DCC blocks
const VIDEO_DCC_256B_DRM_MINOR: u32 = 63;

// =============================================================================
// FORMAT SHAPE
// =============================================================================

/// The properties of a pixel format the catalog looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormatShape {
    /// Bits per element (per block for compressed formats)
    pub block_bits: u32,
    /// Number of memory planes
    pub num_planes: u32,
    /// Block compressed
    pub compressed: bool,
    /// Depth and/or stencil
    pub depth_stencil: bool,
    /// Subsampled 4:2:2 packed in one plane
    pub subsampled_422: bool,
}

impl FormatShape {
    /// Single-plane color format
    pub const fn color(block_bits: u32) -> Self {
        Self {
            block_bits,
            num_planes: 1,
            compressed: false,
            depth_stencil: false,
            subsampled_422: false,
        }
    }

    /// Block-compressed format
    pub const fn compressed(block_bits: u32) -> Self {
        Self {
            compressed: true,
            ..Self::color(block_bits)
        }
    }

    /// Depth/stencil format
    pub const fn depth_stencil(block_bits: u32) -> Self {
        Self {
            depth_stencil: true,
            ..Self::color(block_bits)
        }
    }

    /// Packed 4:2:2 format
    pub const fn subsampled(block_bits: u32) -> Self {
        Self {
            subsampled_422: true,
            ..Self::color(block_bits)
        }
    }

    /// Same format spread over `planes` planes
    pub const fn with_planes(mut self, planes: u32) -> Self {
        self.num_planes = planes;
        self
    }
}

// =============================================================================
// GB_ADDR_CONFIG
// =============================================================================

const fn num_pipes_log2(cfg: u32) -> u64 {
    (cfg & 0x7) as u64
}

const fn num_pkrs_log2(cfg: u32) -> u64 {
    ((cfg >> 8) & 0x7) as u64
}

const fn num_banks_log2(cfg: u32) -> u64 {
    ((cfg >> 12) & 0x7) as u64
}

const fn num_shader_engines_log2(cfg: u32) -> u64 {
    ((cfg >> 19) & 0x3) as u64
}

const fn num_rb_per_se_log2(cfg: u32) -> u64 {
    ((cfg >> 26) & 0x3) as u64
}

// =============================================================================
// SUPPORT QUERIES
// =============================================================================

/// Swizzle modes a generation accepts in a modifier, as a bit per mode
const fn allowed_swizzles(gfx: GfxLevel, dcc: bool) -> u32 {
    match gfx {
        GfxLevel::Gfx9 if dcc => 0x0600_0000,
        GfxLevel::Gfx9 => 0x0666_0660,
        GfxLevel::Gfx10 | GfxLevel::Gfx10_3 if dcc => 0x0800_0000,
        GfxLevel::Gfx10 | GfxLevel::Gfx10_3 => 0x0E66_0660,
        GfxLevel::Gfx11 | GfxLevel::Gfx11_5 if dcc => 0x8800_0000,
        GfxLevel::Gfx11 | GfxLevel::Gfx11_5 => 0xCC44_0440,
        // 2D modes only
        GfxLevel::Gfx12 => 0x1E,
        _ => 0,
    }
}

/// Whether `modifier` can be used for images of `format`
pub fn is_modifier_supported(
    info: &GpuInfo,
    options: &ModifierOptions,
    format: &FormatShape,
    modifier: Modifier,
) -> bool {
    if format.compressed
        || format.depth_stencil
        || (format.block_bits > 64 && modifier != Modifier::LINEAR)
    {
        return false;
    }

    if info.gfx_level < GfxLevel::Gfx9 {
        return false;
    }

    if modifier == Modifier::LINEAR {
        return true;
    }

    // Tiling doesn't work with packed 4:2:2
    if format.subsampled_422 {
        return false;
    }

    let dcc = modifier.has_dcc();
    let Some(mode) = modifier.swizzle_mode(info.gfx_level) else {
        return false;
    };
    if mode.mask_bit() & allowed_swizzles(info.gfx_level, dcc) == 0 {
        return false;
    }

    if dcc {
        if info.gfx_level < GfxLevel::Gfx12 && format.num_planes > 1 {
            return false;
        }
        if !info.has_graphics || !options.dcc {
            return false;
        }

        // Retile shaders only handle 32 bpp
        if modifier.has_dcc_retile()
            && (format.block_bits != 32 || !info.use_display_dcc_with_retile_blit || !options.dcc_retile)
        {
            return false;
        }
    }

    true
}

/// Largest image extent a modifier keeps its compression valid for
///
/// Above it, callers fall back to a less compressed modifier.
pub fn max_extent(info: &GpuInfo, modifier: Modifier) -> (u32, u32) {
    if info.gfx_level < GfxLevel::Gfx12
        && info.gfx_level >= GfxLevel::Gfx10
        && modifier.has_dcc()
        && !modifier.dcc_independent_64b()
    {
        // 4K scanout needs independent 64 B blocks
        return (MAX_DCC_128B_EXTENT, MAX_DCC_128B_EXTENT);
    }
    (MAX_SCANOUT_EXTENT, MAX_SCANOUT_EXTENT)
}

/// Whether the video engine can decode into or encode from `modifier`
pub fn supports_video(info: &GpuInfo, modifier: Modifier) -> bool {
    if modifier.has_dcc() {
        if info.gfx_level < GfxLevel::Gfx12 {
            return false;
        }
        if info.drm_minor < VIDEO_DCC_256B_DRM_MINOR && modifier.dcc_max_compressed_block() == dcc_block::B256 {
            return false;
        }
    }

    if modifier != Modifier::LINEAR {
        // UVD/VCE and VCN 1.0 are linear only
        if info.vcn_ip_version < VcnVersion::V2_0_0 {
            return false;
        }
        if info.vcn_ip_version < VcnVersion::V2_2_0 && modifier.get(ModifierField::TILE) != tile::GFX9_64K_S {
            return false;
        }
    }

    true
}

/// Whether shader image stores can write a computed surface compressed
pub fn surface_supports_dcc_image_stores(gfx: GfxLevel, surf: &SurfaceDescriptor) -> bool {
    if gfx < GfxLevel::Gfx10 {
        return false;
    }
    if gfx >= GfxLevel::Gfx12 {
        return true;
    }

    let Some(layout) = surf.unified() else {
        return false;
    };
    let dcc = layout.color.dcc;
    let max = dcc.max_compressed_block_size as u64;

    // The compressor infers the independent block flags from the max size
    (!dcc.independent_64b && dcc.independent_128b && max == dcc_block::B128)
        || (gfx >= GfxLevel::Gfx10_3 && dcc.independent_64b && dcc.independent_128b && max == dcc_block::B64)
        || (gfx >= GfxLevel::Gfx11_5 && !dcc.independent_64b && dcc.independent_128b && max == dcc_block::B256)
}

// =============================================================================
// ENUMERATION
// =============================================================================

struct Collector<'a> {
    info: &'a GpuInfo,
    options: &'a ModifierOptions,
    format: &'a FormatShape,
    capacity: usize,
    list: ModifierList,
    total: usize,
}

impl Collector<'_> {
    fn add(&mut self, modifier: Modifier) {
        if !is_modifier_supported(self.info, self.options, self.format, modifier) {
            return;
        }
        if self.list.len() < self.capacity {
            self.list.push(modifier);
        }
        self.total += 1;
    }
}

fn amd(version: u64, tile: u64) -> Modifier {
    Modifier::AMD
        .with(ModifierField::TILE_VERSION, version)
        .with(ModifierField::TILE, tile)
}

fn gfx9_modifiers(c: &mut Collector<'_>) {
    let info = c.info;
    let cfg = info.gb_addr_config;
    let pipe_xor_bits = (num_pipes_log2(cfg) + num_shader_engines_log2(cfg)).min(8);
    let bank_xor_bits = num_banks_log2(cfg).min(8 - pipe_xor_bits);
    let pipes = num_pipes_log2(cfg);
    let rb = num_rb_per_se_log2(cfg) + num_shader_engines_log2(cfg);

    let common_dcc = |m: Modifier| {
        m.with_flag(ModifierField::DCC, true)
            .with_flag(ModifierField::DCC_INDEPENDENT_64B, true)
            .with(ModifierField::DCC_MAX_COMPRESSED_BLOCK, dcc_block::B64)
            .with_flag(ModifierField::DCC_CONSTANT_ENCODE, info.has_dcc_constant_encode)
            .with(ModifierField::PIPE_XOR_BITS, pipe_xor_bits)
            .with(ModifierField::BANK_XOR_BITS, bank_xor_bits)
    };
    let aligned = |m: Modifier| m.with(ModifierField::PIPE, pipes).with(ModifierField::RB, rb);
    let xor = |m: Modifier| {
        m.with(ModifierField::PIPE_XOR_BITS, pipe_xor_bits)
            .with(ModifierField::BANK_XOR_BITS, bank_xor_bits)
    };

    let d_x = amd(tile_version::GFX9, tile::GFX9_64K_D_X);
    let s_x = amd(tile_version::GFX9, tile::GFX9_64K_S_X);

    c.add(aligned(common_dcc(d_x.with_flag(ModifierField::DCC_PIPE_ALIGN, true))));
    c.add(aligned(common_dcc(s_x.with_flag(ModifierField::DCC_PIPE_ALIGN, true))));

    if c.format.block_bits == 32 {
        if info.max_render_backends == 1 {
            c.add(common_dcc(s_x));
        }
        c.add(aligned(common_dcc(s_x.with_flag(ModifierField::DCC_RETILE, true))));
    }

    c.add(xor(d_x));
    c.add(xor(s_x));
    c.add(amd(tile_version::GFX9, tile::GFX9_64K_D));
    c.add(amd(tile_version::GFX9, tile::GFX9_64K_S));
    c.add(Modifier::LINEAR);
}

fn gfx10_modifiers(c: &mut Collector<'_>) {
    let rbplus = c.info.gfx_level >= GfxLevel::Gfx10_3;
    let cfg = c.info.gb_addr_config;
    let pipe_xor_bits = num_pipes_log2(cfg);
    let pkrs = if rbplus { num_pkrs_log2(cfg) } else { 0 };
    let version = if rbplus {
        tile_version::GFX10_RBPLUS
    } else {
        tile_version::GFX10
    };

    let r_x = amd(version, tile::GFX9_64K_R_X)
        .with(ModifierField::PIPE_XOR_BITS, pipe_xor_bits)
        .with(ModifierField::PACKERS, pkrs);
    let common_dcc = r_x
        .with_flag(ModifierField::DCC, true)
        .with_flag(ModifierField::DCC_CONSTANT_ENCODE, true);
    let dcc_128b = common_dcc
        .with_flag(ModifierField::DCC_INDEPENDENT_128B, true)
        .with(ModifierField::DCC_MAX_COMPRESSED_BLOCK, dcc_block::B128);

    c.add(dcc_128b.with_flag(ModifierField::DCC_PIPE_ALIGN, true));

    if rbplus {
        c.add(dcc_128b.with_flag(ModifierField::DCC_RETILE, true));
        c.add(
            common_dcc
                .with_flag(ModifierField::DCC_RETILE, true)
                .with_flag(ModifierField::DCC_INDEPENDENT_64B, true)
                .with_flag(ModifierField::DCC_INDEPENDENT_128B, true)
                .with(ModifierField::DCC_MAX_COMPRESSED_BLOCK, dcc_block::B64),
        );
    }

    c.add(r_x);

    if c.format.block_bits != 32 {
        c.add(amd(tile_version::GFX9, tile::GFX9_64K_D));
    }
    c.add(amd(tile_version::GFX9, tile::GFX9_64K_S));
    c.add(Modifier::LINEAR);
}

fn gfx11_modifiers(c: &mut Collector<'_>) {
    let info = c.info;
    let cfg = info.gb_addr_config;
    let pipe_xor_bits = num_pipes_log2(cfg);
    let pkrs = num_pkrs_log2(cfg);
    let num_pipes = 1u32 << pipe_xor_bits;

    // Best R_X swizzle first
    let order = if num_pipes > 16 {
        [tile::GFX11_256K_R_X, tile::GFX9_64K_R_X]
    } else {
        [tile::GFX9_64K_R_X, tile::GFX11_256K_R_X]
    };

    for swizzle in order {
        // DAL can't scan out 256K on APUs
        if !info.has_dedicated_vram && swizzle == tile::GFX11_256K_R_X {
            continue;
        }

        let r_x = amd(tile_version::GFX11, swizzle)
            .with(ModifierField::PIPE_XOR_BITS, pipe_xor_bits)
            .with(ModifierField::PACKERS, pkrs);
        // Constant encode is implied on GFX11
        let dcc = |independent_64b: bool, max: u64| {
            r_x.with_flag(ModifierField::DCC, true)
                .with_flag(ModifierField::DCC_INDEPENDENT_64B, independent_64b)
                .with_flag(ModifierField::DCC_INDEPENDENT_128B, true)
                .with(ModifierField::DCC_MAX_COMPRESSED_BLOCK, max)
        };
        let best = dcc(false, dcc_block::B128);
        let display_4k = dcc(true, dcc_block::B64);

        if info.gfx_level == GfxLevel::Gfx11_5 {
            c.add(dcc(false, dcc_block::B256).with_flag(ModifierField::DCC_PIPE_ALIGN, true));
        }
        c.add(best.with_flag(ModifierField::DCC_PIPE_ALIGN, true));
        c.add(best.with_flag(ModifierField::DCC_RETILE, true));
        c.add(display_4k.with_flag(ModifierField::DCC_RETILE, true));
        c.add(r_x);
    }

    // Portable across GFX11 chips
    c.add(amd(tile_version::GFX11, tile::GFX9_64K_D));
    c.add(Modifier::LINEAR);
}

fn gfx12_modifiers(c: &mut Collector<'_>) {
    let dcc = |m: Modifier, max: u64| {
        m.with_flag(ModifierField::DCC, true)
            .with(ModifierField::DCC_MAX_COMPRESSED_BLOCK, max)
    };
    let mode_256k = amd(tile_version::GFX12, tile::GFX12_256K_2D);
    let mode_64k = amd(tile_version::GFX12, tile::GFX12_64K_2D);
    let mode_4k = amd(tile_version::GFX12, tile::GFX12_4K_2D);
    let mode_256b = amd(tile_version::GFX12, tile::GFX12_256B_2D);

    c.add(dcc(mode_64k, dcc_block::B256));
    c.add(dcc(mode_64k, dcc_block::B128));
    c.add(dcc(mode_256k, dcc_block::B256));
    c.add(dcc(mode_4k, dcc_block::B256));
    c.add(dcc(mode_256b, dcc_block::B256));
    c.add(mode_64k);
    // Same layout as above, spelled for GFX11 interop
    c.add(amd(tile_version::GFX11, tile::GFX9_64K_D));
    c.add(mode_256b);
    c.add(Modifier::LINEAR);
}

/// Supported modifiers for `format`, best first
///
/// At most `capacity` modifiers are returned. The flag is `false` when the
/// full list did not fit.
pub fn enumerate_modifiers(
    info: &GpuInfo,
    options: &ModifierOptions,
    format: &FormatShape,
    capacity: usize,
) -> (ModifierList, bool) {
    let mut c = Collector {
        info,
        options,
        format,
        capacity: capacity.min(MAX_MODIFIERS),
        list: ModifierList::new(),
        total: 0,
    };

    match info.gfx_level {
        GfxLevel::Gfx9 => gfx9_modifiers(&mut c),
        GfxLevel::Gfx10 | GfxLevel::Gfx10_3 => gfx10_modifiers(&mut c),
        GfxLevel::Gfx11 | GfxLevel::Gfx11_5 => gfx11_modifiers(&mut c),
        GfxLevel::Gfx12 => gfx12_modifiers(&mut c),
        _ => {}
    }

    trace!(
        "modifiers: {:?} {} of {} listed",
        info.gfx_level,
        c.list.len(),
        c.total
    );
    let complete = c.total <= capacity;
    (c.list, complete)
}
