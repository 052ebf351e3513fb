//! # Unified Strategy (GFX9-11)
//!
//! One swizzle mode per surface, picked by the oracle from a set of allowed
//! block sizes. The whole mip chain is a single oracle query; DCC, HTILE,
//! FMASK and CMASK each get one more.
//!
//! ```text
//! SurfaceConfig ──► Gfx9SurfaceInput ──► swizzle choice
//!                                            │
//!              ┌──────────── color ──────────┼────────── depth ─────┐
//!              ▼                             ▼                      ▼
//!      pipe/bank XOR, DCC,            stencil plane              HTILE
//!      display DCC, FMASK, CMASK
//! ```
//!
//! The DCC and CMASK queries are not reentrant on GFX9 and go through
//! [`AddrLib::serialized`](slate_addr::AddrLib::serialized).

use log::{debug, trace};

use slate_addr::gfx9::{
    ForbiddenBlocks, Gfx9CmaskInput, Gfx9DccInput, Gfx9FmaskInput, Gfx9HtileInput,
    Gfx9PipeBankXorInput, Gfx9SurfaceFlags, Gfx9SurfaceInput, MetaKey, MetaMipInfo,
    PreferredSettingInput, PreferredSwizzleSet,
};
use slate_addr::{AddressOracle, Gfx9Oracle};
use slate_core::format::{AddrFormat, classify_for};
use slate_core::math::{align_u32, align_u64, log2, next_pow2};
use slate_core::modifier::{dcc_block, tile_version};
use slate_core::surface::{DccSettings, DisplayDcc, MetaLevel, UnifiedLayout, UnifiedLevel};
use slate_core::{
    ChipFamily, Error, GfxLevel, GpuInfo, MicroTileMode, Modifier, ModifierField, ResourceType,
    Result, SurfaceConfig, SurfaceDescriptor, SurfaceFlags, SurfaceIndexCounter, SurfaceLayout,
    SurfaceMode, SwizzleMode,
};

use crate::strategy::{GenerationStrategy, LINEAR_PITCH_ALIGNMENT, LayoutContext, get_display_flag};

/// Display engines with DAL older than this DRM minor need 64 B blocks
const DCN_MIN_DRM_MINOR: u32 = 44;

/// Largest extent the display engine reads with 128 B independent blocks
pub const DCN_MAX_128B_EXTENT: u32 = 2560;

// =============================================================================
// DCC SUPPORT QUERIES
// =============================================================================

/// Whether the color block can compress a swizzle mode
///
/// # Panics
///
/// Panics outside GFX9-11.
pub fn is_dcc_supported_by_cb(info: &GpuInfo, sw: SwizzleMode) -> bool {
    match info.gfx_level {
        GfxLevel::Gfx9 => !sw.is_linear(),
        GfxLevel::Gfx10 | GfxLevel::Gfx10_3 => {
            sw == SwizzleMode::SW_64KB_Z_X || sw == SwizzleMode::SW_64KB_R_X
        }
        GfxLevel::Gfx11 | GfxLevel::Gfx11_5 => matches!(
            sw,
            SwizzleMode::SW_64KB_Z_X
                | SwizzleMode::SW_64KB_R_X
                | SwizzleMode::SW_256KB_Z_X
                | SwizzleMode::SW_256KB_R_X
        ),
        gfx => panic!("no unified DCC on {:?}", gfx),
    }
}

fn l2_supports(info: &GpuInfo, dcc: &DccSettings) -> bool {
    debug_assert!(info.gfx_level < GfxLevel::Gfx12);

    let max = dcc.max_compressed_block_size as u64;
    let single_indep = dcc.independent_64b != dcc.independent_128b;
    let valid_64b = dcc.independent_64b && max == dcc_block::B64;
    let valid_128b = dcc.independent_128b
        && (max == dcc_block::B128
            || (info.gfx_level >= GfxLevel::Gfx11_5 && max == dcc_block::B256));

    if info.gfx_level <= GfxLevel::Gfx9 {
        return single_indep && valid_64b;
    }

    match info.family {
        ChipFamily::Navi10 | ChipFamily::Gfx1013 => single_indep && valid_128b,
        // INDEPENDENT_*_BLOCKS must match; 64 B rules out image stores
        ChipFamily::Navi12 | ChipFamily::Navi14 => single_indep && (valid_64b || valid_128b),
        _ => (single_indep && (valid_64b || valid_128b)) || valid_64b,
    }
}

/// Whether the L2 cache handles the DCC settings of a surface
pub fn is_dcc_supported_by_l2(info: &GpuInfo, surf: &SurfaceDescriptor) -> bool {
    let dcc = surf.unified().map(|u| u.color.dcc).unwrap_or_default();
    l2_supports(info, &dcc)
}

/// Whether the display engine needs independent 64 B blocks at this size
pub fn dcn_requires_independent_64b_blocks(info: &GpuInfo, config: &SurfaceConfig) -> bool {
    debug_assert!(info.gfx_level >= GfxLevel::Gfx10);

    // Older DAL mishandles 128 B blocks
    if info.drm_minor < DCN_MIN_DRM_MINOR {
        return true;
    }

    config.width > DCN_MAX_128B_EXTENT || config.height > DCN_MAX_128B_EXTENT
}

fn dcn_supports(
    info: &GpuInfo,
    config: &SurfaceConfig,
    bpe: u32,
    dcc: &DccSettings,
    rb_aligned: bool,
    pipe_aligned: bool,
) -> bool {
    if !info.use_display_dcc_unaligned && !info.use_display_dcc_with_retile_blit {
        return false;
    }

    // 16 and 64 bpp are not supported
    if bpe != 4 {
        return false;
    }

    if info.use_display_dcc_unaligned && (rb_aligned || pipe_aligned) {
        return false;
    }

    let valid_64b = dcc.independent_64b && dcc.max_compressed_block_size as u64 == dcc_block::B64;
    match info.gfx_level {
        // Always set up with 64 B blocks
        GfxLevel::Gfx9 => true,
        GfxLevel::Gfx10 | GfxLevel::Gfx10_3 | GfxLevel::Gfx11 | GfxLevel::Gfx11_5 => {
            // Navi1x display needs INDEPENDENT_128B_BLOCKS = 0
            if info.gfx_level == GfxLevel::Gfx10 && dcc.independent_128b {
                return false;
            }
            !dcn_requires_independent_64b_blocks(info, config) || valid_64b
        }
        _ => false,
    }
}

/// Whether the display engine can read the DCC of a surface
pub fn is_dcc_supported_by_dcn(
    info: &GpuInfo,
    config: &SurfaceConfig,
    surf: &SurfaceDescriptor,
    rb_aligned: bool,
    pipe_aligned: bool,
) -> bool {
    let dcc = surf.unified().map(|u| u.color.dcc).unwrap_or_default();
    dcn_supports(info, config, surf.bpe, &dcc, rb_aligned, pipe_aligned)
}

/// Copy the DCC settings a modifier carries
fn fill_dcc_params(modifier: Modifier, dcc: &mut DccSettings, flags: &mut Gfx9SurfaceFlags) {
    debug_assert!(modifier.has_dcc());
    debug_assert!(modifier.tile_version() < tile_version::GFX12);

    let pipe_unaligned =
        !modifier.has_dcc_retile() && modifier.get(ModifierField::DCC_PIPE_ALIGN) == 0;
    // Keep RB alignment on non-displayable DCC of single-RB chips
    let rb_unaligned = modifier.tile_version() == tile_version::GFX9
        && modifier.get(ModifierField::RB) == 0
        && pipe_unaligned;

    flags.set(Gfx9SurfaceFlags::META_PIPE_UNALIGNED, pipe_unaligned);
    flags.set(Gfx9SurfaceFlags::META_RB_UNALIGNED, rb_unaligned);

    dcc.independent_64b = modifier.dcc_independent_64b();
    dcc.independent_128b = modifier.dcc_independent_128b();
    dcc.max_compressed_block_size = modifier.dcc_max_compressed_block() as u8;
}

/// Preferred DCC settings for the L2 cache
fn set_default_dcc(gfx: GfxLevel, dcc: &mut DccSettings) {
    let (i64b, i128b, max) = if gfx >= GfxLevel::Gfx11_5 {
        (false, true, dcc_block::B256)
    } else if gfx >= GfxLevel::Gfx10 {
        (false, true, dcc_block::B128)
    } else {
        (true, false, dcc_block::B64)
    };
    dcc.independent_64b = i64b;
    dcc.independent_128b = i128b;
    dcc.max_compressed_block_size = max as u8;
}

/// Adjust the DCC settings of a displayable surface for the display engine
fn set_display_dcc(info: &GpuInfo, config: &SurfaceConfig, dcc: &mut DccSettings) {
    // Navi12/14 L2 takes 64 B blocks, without image stores
    if matches!(info.family, ChipFamily::Navi12 | ChipFamily::Navi14) {
        dcc.independent_64b = true;
        dcc.independent_128b = false;
        dcc.max_compressed_block_size = dcc_block::B64 as u8;
    }

    // Later chips only do this when the size demands it. Older GFX10.3
    // parts always do, for interop between driver versions.
    if (info.gfx_level >= GfxLevel::Gfx10_3 && info.family <= ChipFamily::Rembrandt)
        || (info.family > ChipFamily::Rembrandt && dcn_requires_independent_64b_blocks(info, config))
    {
        dcc.independent_64b = true;
        dcc.independent_128b = true;
        dcc.max_compressed_block_size = dcc_block::B64 as u8;
    }
}

// =============================================================================
// SWIZZLE CHOICE
// =============================================================================

/// Ask the oracle for a swizzle mode within the allowed block sizes
fn preferred_swizzle_mode<O: AddressOracle>(
    ctx: &LayoutContext<'_, O>,
    surf: &SurfaceDescriptor,
    input: &Gfx9SurfaceInput,
    is_fmask: bool,
) -> Result<SwizzleMode> {
    let info = ctx.info;
    let gfx11 = info.gfx_level >= GfxLevel::Gfx11;

    // 256 B modes are never used
    let mut forbidden = ForbiddenBlocks::MICRO;
    let mut preferred = PreferredSwizzleSet::empty();

    if gfx11 {
        // 256 KiB blocks don't work with DAL on APUs
        if !info.has_dedicated_vram {
            forbidden |= ForbiddenBlocks::GFX11_256KB;
        }
    } else {
        forbidden |= ForbiddenBlocks::VAR;
    }

    let mut flags = input.flags;
    if is_fmask {
        flags.remove(Gfx9SurfaceFlags::DISPLAY | Gfx9SurfaceFlags::COLOR);
        flags.insert(Gfx9SurfaceFlags::FMASK);
    }

    // Sparse images always use 64 KiB blocks
    if surf.flags.contains(SurfaceFlags::PRT) {
        forbidden |= ForbiddenBlocks::MACRO_THIN_4KB
            | ForbiddenBlocks::MACRO_THICK_4KB
            | ForbiddenBlocks::LINEAR;
        if gfx11 {
            forbidden |= ForbiddenBlocks::GFX11_256KB;
        }
    } else if surf.flags.contains(SurfaceFlags::PREFER_4K_ALIGNMENT) {
        forbidden |= ForbiddenBlocks::MACRO_THIN_64KB | ForbiddenBlocks::MACRO_THICK_64KB;
    }

    if gfx11
        && surf
            .flags
            .intersects(SurfaceFlags::PREFER_64K_ALIGNMENT | SurfaceFlags::PREFER_4K_ALIGNMENT)
    {
        forbidden |= ForbiddenBlocks::GFX11_256KB;
    }

    if surf.flags.contains(SurfaceFlags::FORCE_MICRO_TILE_MODE) {
        forbidden |= ForbiddenBlocks::LINEAR;
        preferred |= match surf.micro_tile_mode {
            MicroTileMode::Display => PreferredSwizzleSet::D,
            MicroTileMode::Standard => PreferredSwizzleSet::S,
            MicroTileMode::Depth => PreferredSwizzleSet::Z,
            MicroTileMode::Render => PreferredSwizzleSet::R,
        };
    }

    // Volumes sample fastest with S modes
    if info.gfx_level >= GfxLevel::Gfx10
        && input.resource_type == ResourceType::Tex3D
        && input.num_slices > 1
    {
        preferred |= PreferredSwizzleSet::S;
    }

    // Surface to memory copies can't handle 256 KiB blocks
    if gfx11 && surf.flags.contains(SurfaceFlags::HOST_TRANSFER) {
        forbidden |= ForbiddenBlocks::GFX11_256KB;
    }

    let setting = PreferredSettingInput {
        flags,
        resource_type: input.resource_type,
        format: input.format,
        bpp: input.bpp,
        width: input.width,
        height: input.height,
        num_slices: input.num_slices,
        num_mip_levels: input.num_mip_levels,
        num_samples: input.num_samples,
        num_frags: input.num_frags,
        forbidden,
        preferred,
    };

    trace!(
        "unified preferred: fmask={} forbidden {:?} preferred {:?}",
        is_fmask, forbidden, preferred
    );
    Gfx9Oracle::get_preferred_surface_setting(ctx.oracle(), &setting)
}

/// Copy per-level metadata placement, stopping at the mip tail
///
/// Returns the number of levels the metadata covers.
fn record_meta_levels(
    layout: &mut UnifiedLayout,
    mip_info: &[MetaMipInfo],
    num_levels: u32,
    tail_inclusive: bool,
) -> u32 {
    layout.meta_levels.clear();
    for (i, mip) in mip_info.iter().take(num_levels as usize).enumerate() {
        layout.meta_levels.push(MetaLevel {
            offset: mip.offset,
            size: mip.slice_size,
        });

        // Mip levels sharing a cache line corrupt each other
        if mip.in_miptail {
            return if tail_inclusive { i as u32 + 1 } else { i as u32 };
        }
    }
    num_levels
}

// =============================================================================
// MIP TREE
// =============================================================================

/// Compute one plane (color/depth, or stencil) and its metadata
fn compute_miptree<O: AddressOracle>(
    ctx: &LayoutContext<'_, O>,
    config: &SurfaceConfig,
    surf: &mut SurfaceDescriptor,
    layout: &mut UnifiedLayout,
    compressed: bool,
    input: &Gfx9SurfaceInput,
) -> Result<()> {
    let info = ctx.info;

    trace!(
        "unified surface: {}x{}x{} levels {} {:?} flags {:?}",
        input.width, input.height, input.num_slices, input.num_mip_levels, input.swizzle_mode, input.flags
    );
    let out = Gfx9Oracle::compute_surface_info(ctx.oracle(), input)?;
    let num_levels = input.num_mip_levels as usize;

    if input.flags.contains(Gfx9SurfaceFlags::PRT) {
        surf.prt_tile_width = out.block_width;
        surf.prt_tile_height = out.block_height;
        surf.prt_tile_depth = out.block_slices;
        surf.first_mip_tail_level = out.first_mip_id_in_tail;

        layout.prt_levels.clear();
        for mip in out.mip_info.iter().take(num_levels) {
            layout.prt_levels.push(UnifiedLevel {
                offset: mip.macro_block_offset + mip.mip_tail_offset as u64,
                pitch: if info.gfx_level >= GfxLevel::Gfx10 {
                    mip.pitch
                } else {
                    out.mip_chain_pitch
                },
            });
        }
    }

    // Never set for depth and stencil
    surf.thick_tiling = out.block_slices > 1;

    let epitch = if out.epitch_is_height {
        out.mip_chain_height.saturating_sub(1)
    } else {
        out.mip_chain_pitch.saturating_sub(1)
    };

    if input.flags.contains(Gfx9SurfaceFlags::STENCIL) {
        layout.zs.stencil_swizzle_mode = input.swizzle_mode;
        layout.zs.stencil_epitch = epitch;
        surf.surf_alignment_log2 = surf.surf_alignment_log2.max(log2(out.base_align));
        layout.zs.stencil_offset = align_u64(surf.surf_size, out.base_align as u64);
        surf.surf_size = layout.zs.stencil_offset + out.surf_size;
        return Ok(());
    }

    layout.swizzle_mode = input.swizzle_mode;
    layout.epitch = epitch;

    // CMASK fast clear reads these even without FMASK; FMASK only has Z modes
    if !input.flags.contains(Gfx9SurfaceFlags::DEPTH) {
        layout.color.fmask_swizzle_mode = input.swizzle_mode.family_base();
        layout.color.fmask_epitch = epitch;
    }

    layout.surf_slice_size = out.slice_size;
    layout.surf_pitch = out.pitch;
    layout.surf_height = out.height;
    surf.surf_size = out.surf_size;
    surf.surf_alignment_log2 = log2(out.base_align);

    let linear = input.swizzle_mode.is_linear();
    let linear_alignment = next_pow2(LINEAR_PITCH_ALIGNMENT / surf.bpe);

    layout.levels.clear();
    if !compressed && surf.blk_w > 1 && out.pitch == out.pixel_pitch && linear && num_levels == 1 {
        // Descriptors take the pitch in elements, not pixels
        layout.surf_pitch = align_u32(layout.surf_pitch / surf.blk_w, linear_alignment);
        layout.epitch = layout.surf_pitch - 1;
        layout.surf_slice_size = layout.surf_pitch as u64 * out.height as u64 * surf.bpe as u64;
        surf.surf_size = layout.surf_slice_size * input.num_slices as u64;

        for mip in out.mip_info.iter().take(num_levels) {
            layout.levels.push(UnifiedLevel {
                offset: mip.offset,
                pitch: align_u32(mip.pitch / surf.blk_w, linear_alignment),
            });
        }
        layout.base_mip_width = layout.surf_pitch;
    } else if linear {
        for mip in out.mip_info.iter().take(num_levels) {
            layout.levels.push(UnifiedLevel {
                offset: mip.offset,
                pitch: mip.pitch,
            });
        }
        layout.base_mip_width = layout.surf_pitch;
    } else {
        layout.base_mip_width = out.mip_info.first().map_or(out.pitch, |m| m.pitch);
    }
    layout.base_mip_height = out.mip_info.first().map_or(out.height, |m| m.height);

    if input.flags.contains(Gfx9SurfaceFlags::DEPTH) {
        debug_assert!(!linear);
        if surf.flags.contains(SurfaceFlags::NO_HTILE) {
            return Ok(());
        }
        return compute_htile(ctx, surf, layout, input, out.first_mip_id_in_tail);
    }

    // Every _X and _T mode takes a pipe/bank XOR
    let wants_swizzle = input.swizzle_mode >= SwizzleMode::SW_64KB_Z_T
        && !out.mip_chain_in_tail
        && !surf.flags.contains(SurfaceFlags::SHAREABLE)
        && !input.flags.contains(Gfx9SurfaceFlags::DISPLAY);

    if let Some(counter) = ctx.counters.surface.filter(|_| wants_swizzle) {
        let xin = Gfx9PipeBankXorInput {
            surf_index: counter.fetch_increment(),
            flags: input.flags,
            swizzle_mode: input.swizzle_mode,
            resource_type: input.resource_type,
            format: input.format,
            num_samples: input.num_samples,
            num_frags: input.num_frags,
        };

        trace!("unified pipe/bank xor: surface index {}", xin.surf_index);
        let xor = Gfx9Oracle::compute_pipe_bank_xor(ctx.oracle(), &xin)?;
        debug_assert!(xor <= u16::MAX as u32);
        surf.tile_swizzle = xor as u16;

        // GFX11 shifts by 10 bits, descriptors by 8
        if info.gfx_level >= GfxLevel::Gfx11 {
            surf.tile_swizzle <<= 2;
        }
    }

    let rb_aligned = !input.flags.contains(Gfx9SurfaceFlags::META_RB_UNALIGNED);
    let pipe_aligned = !input.flags.contains(Gfx9SurfaceFlags::META_PIPE_UNALIGNED);

    let use_dcc = if surf.modifier.is_set() {
        surf.modifier.has_dcc()
    } else {
        info.has_graphics
            && !surf.flags.contains(SurfaceFlags::DISABLE_DCC)
            && !compressed
            && !config.is_3d
            && is_dcc_supported_by_cb(info, input.swizzle_mode)
            && (!input.flags.contains(Gfx9SurfaceFlags::DISPLAY)
                || dcn_supports(info, config, surf.bpe, &layout.color.dcc, rb_aligned, pipe_aligned))
    };

    if use_dcc {
        compute_dcc(ctx, surf, layout, input, out.surf_size, out.first_mip_id_in_tail)?;
    }

    // FMASK is gone on GFX11
    if info.gfx_level <= GfxLevel::Gfx10_3
        && info.has_graphics
        && input.num_samples > 1
        && !surf.flags.contains(SurfaceFlags::NO_FMASK)
    {
        compute_fmask(ctx, surf, layout, input)?;
    }

    // CMASK, only alongside FMASK on GFX10
    let meta_unaligned = !rb_aligned || !pipe_aligned;
    if info.gfx_level <= GfxLevel::Gfx10_3
        && info.has_graphics
        && !linear
        && input.resource_type == ResourceType::Tex2D
        && ((info.gfx_level <= GfxLevel::Gfx9 && input.num_samples == 1 && !meta_unaligned)
            || (surf.fmask.size != 0 && input.num_samples >= 2))
    {
        let cin = Gfx9CmaskInput {
            key: MetaKey::ALIGNED,
            resource_type: input.resource_type,
            swizzle_mode: if input.num_samples > 1 {
                layout.color.fmask_swizzle_mode
            } else {
                input.swizzle_mode
            },
            width: input.width,
            height: input.height,
            num_slices: input.num_slices,
            num_mip_levels: input.num_mip_levels,
            first_mip_id_in_tail: out.first_mip_id_in_tail,
        };

        trace!("unified cmask: {:?}", cin.swizzle_mode);
        let cout = ctx
            .addrlib
            .serialized(|o| Gfx9Oracle::compute_cmask_info(o, &cin))?;

        surf.cmask.size = cout.cmask_bytes;
        surf.cmask.alignment_log2 = log2(cout.base_align);
        surf.cmask.slice_size = cout.slice_size;
        layout.color.cmask_pitch = cout.pitch;
        layout.color.cmask_height = cout.height;
        layout.color.cmask_level0 = cout
            .mip_info
            .first()
            .map(|m| MetaLevel {
                offset: m.offset,
                size: m.slice_size,
            })
            .unwrap_or_default();
    }

    Ok(())
}

fn compute_htile<O: AddressOracle>(
    ctx: &LayoutContext<'_, O>,
    surf: &mut SurfaceDescriptor,
    layout: &mut UnifiedLayout,
    input: &Gfx9SurfaceInput,
    first_mip_id_in_tail: u32,
) -> Result<()> {
    debug_assert!(!input.flags.intersects(
        Gfx9SurfaceFlags::META_PIPE_UNALIGNED | Gfx9SurfaceFlags::META_RB_UNALIGNED
    ));

    let hin = Gfx9HtileInput {
        key: MetaKey::ALIGNED,
        depth_flags: input.flags,
        swizzle_mode: input.swizzle_mode,
        width: input.width,
        height: input.height,
        num_slices: input.num_slices,
        num_mip_levels: input.num_mip_levels,
        first_mip_id_in_tail,
    };

    trace!("unified htile: {:?}", hin.swizzle_mode);
    let hout = Gfx9Oracle::compute_htile_info(ctx.oracle(), &hin)?;

    surf.meta.size = hout.htile_bytes;
    surf.meta.slice_size = hout.slice_size;
    surf.meta.alignment_log2 = log2(hout.base_align);
    surf.meta_pitch = hout.pitch;

    // Only the first level of the mip tail is compressed
    surf.num_meta_levels = record_meta_levels(layout, &hout.mip_info, input.num_mip_levels, true);
    if surf.num_meta_levels == 0 {
        surf.meta.size = 0;
    }
    Ok(())
}

fn compute_dcc<O: AddressOracle>(
    ctx: &LayoutContext<'_, O>,
    surf: &mut SurfaceDescriptor,
    layout: &mut UnifiedLayout,
    input: &Gfx9SurfaceInput,
    data_surface_size: u64,
    first_mip_id_in_tail: u32,
) -> Result<()> {
    let info = ctx.info;
    let mut din = Gfx9DccInput {
        key: MetaKey {
            pipe_aligned: !input.flags.contains(Gfx9SurfaceFlags::META_PIPE_UNALIGNED),
            rb_aligned: !input.flags.contains(Gfx9SurfaceFlags::META_RB_UNALIGNED),
        },
        resource_type: input.resource_type,
        swizzle_mode: input.swizzle_mode,
        bpp: input.bpp,
        width: input.width,
        height: input.height,
        num_slices: input.num_slices,
        num_frags: input.num_frags,
        num_mip_levels: input.num_mip_levels,
        data_surface_size,
        first_mip_id_in_tail,
    };

    trace!("unified dcc: key {:?}", din.key);
    let dout = ctx
        .addrlib
        .serialized(|o| Gfx9Oracle::compute_dcc_info(o, &din))?;

    let color = &mut layout.color;
    color.dcc.rb_aligned = din.key.rb_aligned;
    color.dcc.pipe_aligned = din.key.pipe_aligned;
    color.dcc_block_width = dout.compress_blk_width;
    color.dcc_block_height = dout.compress_blk_height;
    color.dcc_block_depth = dout.compress_blk_depth;
    color.dcc_pitch_max = dout.pitch.saturating_sub(1);
    color.dcc_height = dout.height;
    surf.meta.size = dout.dcc_ram_size;
    surf.meta.slice_size = dout.dcc_ram_slice_size;
    surf.meta.alignment_log2 = log2(dout.dcc_ram_base_align);

    // Levels in the mip tail are left uncompressed. GFX10 still compresses
    // the first of them.
    let tail_inclusive = info.gfx_level >= GfxLevel::Gfx10;
    surf.num_meta_levels =
        record_meta_levels(layout, &dout.mip_info, input.num_mip_levels, tail_inclusive);
    if surf.num_meta_levels == 0 {
        surf.meta.size = 0;
    }

    let color = &mut layout.color;
    color.display_dcc = DisplayDcc {
        size: surf.meta.size,
        alignment_log2: surf.meta.alignment_log2,
        pitch_max: color.dcc_pitch_max,
        height: color.dcc_height,
    };

    let wants_display_copy = (input.flags.contains(Gfx9SurfaceFlags::DISPLAY)
        && info.use_display_dcc_with_retile_blit)
        || surf.modifier.has_dcc_retile();

    if wants_display_copy && surf.num_meta_levels != 0 {
        // The display reads unaligned DCC of a single-level, single-layer image
        din.key = MetaKey::default();
        debug_assert!(din.num_slices == 1);
        debug_assert!(din.num_mip_levels == 1);
        debug_assert!(din.num_frags == 1);

        trace!("unified display dcc");
        let dout = ctx
            .addrlib
            .serialized(|o| Gfx9Oracle::compute_dcc_info(o, &din))?;

        color.display_dcc = DisplayDcc {
            size: dout.dcc_ram_size,
            alignment_log2: log2(dout.dcc_ram_base_align),
            pitch_max: dout.pitch.saturating_sub(1),
            height: dout.height,
        };
        debug_assert!(color.display_dcc.size <= surf.meta.size);
        color.dcc.display_equation_valid = true;
    }

    Ok(())
}

fn compute_fmask<O: AddressOracle>(
    ctx: &LayoutContext<'_, O>,
    surf: &mut SurfaceDescriptor,
    layout: &mut UnifiedLayout,
    input: &Gfx9SurfaceInput,
) -> Result<()> {
    let fmask_mode = preferred_swizzle_mode(ctx, surf, input, true)?;
    let fin = Gfx9FmaskInput {
        swizzle_mode: fmask_mode,
        width: input.width,
        height: input.height,
        num_slices: input.num_slices,
        num_samples: input.num_samples,
        num_frags: input.num_frags,
    };

    trace!("unified fmask: {:?}", fmask_mode);
    let fout = Gfx9Oracle::compute_fmask_info(ctx.oracle(), &fin)?;

    layout.color.fmask_swizzle_mode = fmask_mode;
    layout.color.fmask_epitch = fout.pitch.saturating_sub(1);
    surf.fmask.size = fout.fmask_bytes;
    surf.fmask.alignment_log2 = log2(fout.base_align);
    surf.fmask.slice_size = fout.slice_size;

    let wants_swizzle =
        fmask_mode >= SwizzleMode::SW_64KB_Z_T && !surf.flags.contains(SurfaceFlags::SHAREABLE);
    if let Some(counter) = ctx.counters.fmask.filter(|_| wants_swizzle) {
        // This counter starts from 1
        let xin = Gfx9PipeBankXorInput {
            surf_index: counter.increment(),
            flags: input.flags,
            swizzle_mode: fmask_mode,
            resource_type: input.resource_type,
            format: input.format,
            num_samples: input.num_samples,
            num_frags: input.num_frags,
        };

        trace!("unified fmask pipe/bank xor: surface index {}", xin.surf_index);
        let xor = Gfx9Oracle::compute_pipe_bank_xor(ctx.oracle(), &xin)?;
        debug_assert!(xor <= u16::MAX as u32);
        surf.fmask_tile_swizzle = xor as u16;
    }

    Ok(())
}

// =============================================================================
// STRATEGY
// =============================================================================

/// GFX9-11 layout strategy
#[derive(Debug, Clone, Copy, Default)]
pub struct UnifiedStrategy;

impl UnifiedStrategy {
    fn surface_input(info: &GpuInfo, config: &SurfaceConfig, surf: &SurfaceDescriptor) -> Gfx9SurfaceInput {
        let compressed = surf.is_compressed();
        let zs = surf.flags.is_depth_stencil();

        let mut flags = Gfx9SurfaceFlags::empty();
        flags.set(
            Gfx9SurfaceFlags::COLOR,
            !zs && !surf.flags.contains(SurfaceFlags::NO_RENDER_TARGET),
        );
        flags.set(Gfx9SurfaceFlags::DEPTH, surf.flags.contains(SurfaceFlags::ZBUFFER));
        flags.set(Gfx9SurfaceFlags::DISPLAY, get_display_flag(config, surf));
        // For depth this means TC-compatible HTILE
        flags.set(
            Gfx9SurfaceFlags::TEXTURE,
            (!zs && !surf.flags.contains(SurfaceFlags::NO_TEXTURE))
                || surf.flags.contains(SurfaceFlags::TC_COMPATIBLE_HTILE),
        );
        flags.insert(Gfx9SurfaceFlags::OPT4SPACE);
        // MSAA sparse images don't use the PRT path on GFX10+
        flags.set(
            Gfx9SurfaceFlags::PRT,
            surf.flags.contains(SurfaceFlags::PRT)
                && (config.samples <= 1 || info.gfx_level < GfxLevel::Gfx10)
                && !zs,
        );

        let num_samples = config.num_samples();

        // GFX9 has no 1D depth, so every 1D texture is 2D there
        let resource_type = if config.is_3d {
            ResourceType::Tex3D
        } else if info.gfx_level != GfxLevel::Gfx9 && config.is_1d {
            ResourceType::Tex1D
        } else {
            ResourceType::Tex2D
        };

        let num_slices = if config.is_3d {
            config.depth
        } else if config.is_cube {
            6
        } else {
            config.array_size
        };

        Gfx9SurfaceInput {
            swizzle_mode: SwizzleMode::LINEAR,
            resource_type,
            format: classify_for(info.gfx_level, surf.blk_w, surf.blk_h, surf.bpe, surf.flags),
            bpp: if compressed { 0 } else { surf.bpe * 8 },
            width: config.width,
            height: config.height,
            num_slices,
            num_mip_levels: config.levels,
            num_samples,
            num_frags: if zs { num_samples } else { config.num_storage_samples() },
            flags,
        }
    }
}

impl<O: AddressOracle> GenerationStrategy<O> for UnifiedStrategy {
    fn compute(
        &self,
        ctx: &LayoutContext<'_, O>,
        config: &SurfaceConfig,
        mode: SurfaceMode,
        surf: &mut SurfaceDescriptor,
    ) -> Result<()> {
        let info = ctx.info;
        let compressed = surf.is_compressed();
        let zs = surf.flags.is_depth_stencil();

        // Imported swizzle and DCC settings are kept
        let mut layout = core::mem::take(surf.ensure_unified());
        layout.levels.clear();
        layout.prt_levels.clear();
        layout.meta_levels.clear();

        let mut input = Self::surface_input(info, config, surf);

        if surf.modifier.has_dcc() {
            fill_dcc_params(surf.modifier, &mut layout.color.dcc, &mut input.flags);
        } else if !input.flags.contains(Gfx9SurfaceFlags::DEPTH) {
            if !surf.flags.contains(SurfaceFlags::IMPORTED) {
                set_default_dcc(info.gfx_level, &mut layout.color.dcc);
            }

            if input.flags.contains(Gfx9SurfaceFlags::DISPLAY) {
                // The display reads DCC with RB_ALIGNED=0 and PIPE_ALIGNED=0,
                // CB wants RB_ALIGNED=1 except on single-RB chips
                if info.use_display_dcc_unaligned {
                    input
                        .flags
                        .insert(Gfx9SurfaceFlags::META_PIPE_UNALIGNED | Gfx9SurfaceFlags::META_RB_UNALIGNED);
                }

                if !surf.flags.contains(SurfaceFlags::IMPORTED)
                    && (info.use_display_dcc_unaligned || info.use_display_dcc_with_retile_blit)
                {
                    set_display_dcc(info, config, &mut layout.color.dcc);
                }
            }
        }

        input.swizzle_mode = if surf.modifier.is_set() {
            debug_assert!(!compressed);
            debug_assert!(!surf.modifier.has_dcc() || !surf.flags.contains(SurfaceFlags::DISABLE_DCC));
            surf.modifier
                .swizzle_mode(info.gfx_level)
                .ok_or(Error::UnsupportedModifier)?
        } else if mode == SurfaceMode::LinearAligned && config.samples <= 1 && !zs {
            SwizzleMode::LINEAR
        } else if surf.flags.contains(SurfaceFlags::IMPORTED)
            || (info.gfx_level >= GfxLevel::Gfx10 && surf.flags.contains(SurfaceFlags::FORCE_SWIZZLE_MODE))
        {
            layout.swizzle_mode
        } else if info.gfx_level >= GfxLevel::Gfx11 && surf.flags.contains(SurfaceFlags::VRS_RATE) {
            // The only mode VRS rate images allow
            SwizzleMode::SW_64KB_R_X
        } else if surf.flags.contains(SurfaceFlags::VIDEO_REFERENCE) {
            // VCN only reads 256B_D
            SwizzleMode::SW_256B_D
        } else {
            preferred_swizzle_mode(ctx, surf, &input, false)?
        };
        debug!("unified: requested {:?}, swizzle mode {:?}", mode, input.swizzle_mode);

        layout.resource_type = input.resource_type;
        surf.has_stencil = surf.flags.contains(SurfaceFlags::SBUFFER);
        surf.num_meta_levels = 0;
        surf.surf_size = 0;
        surf.fmask.size = 0;
        surf.meta.size = 0;
        surf.meta.slice_size = 0;
        surf.cmask.size = 0;
        layout.surf_offset = 0;
        layout.zs.stencil_offset = 0;

        let only_stencil = surf.flags.is_stencil_only();

        if !only_stencil {
            compute_miptree(ctx, config, surf, &mut layout, compressed, &input)?;
        }

        if surf.flags.contains(SurfaceFlags::SBUFFER) {
            input.flags.insert(Gfx9SurfaceFlags::STENCIL);
            input.bpp = 8;
            input.format = AddrFormat::R8;

            if input.flags.contains(Gfx9SurfaceFlags::DEPTH) {
                input.flags.remove(Gfx9SurfaceFlags::DEPTH);
            } else {
                input.swizzle_mode = preferred_swizzle_mode(ctx, surf, &input, false)?;
            }

            compute_miptree(ctx, config, surf, &mut layout, compressed, &input)?;
        }

        surf.is_linear = if only_stencil {
            layout.zs.stencil_swizzle_mode.is_linear()
        } else {
            layout.swizzle_mode.is_linear()
        };

        // Scanout compatibility of surfaces allocated without SCANOUT
        let mut displayable = false;
        if !config.is_3d && !config.is_cube {
            displayable = Gfx9Oracle::is_valid_display_swizzle_mode(
                ctx.oracle(),
                layout.swizzle_mode,
                surf.bpe * 8,
            )?;

            // The display needs DCC it can read
            let dcc = &layout.color.dcc;
            if !zs
                && surf.num_meta_levels != 0
                && (!dcn_supports(info, config, surf.bpe, dcc, dcc.rb_aligned, dcc.pipe_aligned)
                    || (info.use_display_dcc_with_retile_blit && !dcc.display_equation_valid))
            {
                displayable = false;
            }
        }
        surf.is_displayable = displayable;

        if input.flags.contains(Gfx9SurfaceFlags::DISPLAY) && !displayable {
            debug!("unified: scanout requested but the layout is not displayable");
        }

        if surf.meta.size == 0 {
            surf.flags.remove(SurfaceFlags::TC_COMPATIBLE_HTILE);
        }

        if surf.modifier.is_set() {
            debug_assert_eq!(surf.num_meta_levels != 0, surf.modifier.has_dcc());
        }

        surf.micro_tile_mode = layout.swizzle_mode.micro_tile_mode();

        // Rotated tiling breaks with CMASK and RB+ together
        if surf.micro_tile_mode == MicroTileMode::Render && info.gfx_level < GfxLevel::Gfx10 {
            debug!("unified: rotated micro tile mode is unsupported on {:?}", info.gfx_level);
            return Err(Error::UnsupportedMicroTileMode);
        }

        debug!(
            "unified: size {} align 2^{} meta {} levels {} fmask {} cmask {} swizzle {}",
            surf.surf_size,
            surf.surf_alignment_log2,
            surf.meta.size,
            surf.num_meta_levels,
            surf.fmask.size,
            surf.cmask.size,
            surf.tile_swizzle
        );

        surf.layout = SurfaceLayout::Unified(layout);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slate_addr::AddrLib;
    use slate_core::{AtomicSurfaceIndex, SwizzleCounters};
    use slate_test_framework::fixtures;
    use slate_test_framework::{CallKind, FakeOracle, OracleCall};

    fn run_with(
        info: &GpuInfo,
        oracle: FakeOracle,
        config: &SurfaceConfig,
        mode: SurfaceMode,
        surf: &mut SurfaceDescriptor,
    ) -> (Result<()>, FakeOracle) {
        let lib = AddrLib::new(info, oracle);
        let ctx = LayoutContext::new(&lib, info, SwizzleCounters::NONE);
        let r = UnifiedStrategy.compute(&ctx, config, mode, surf);
        (r, lib.into_inner())
    }

    fn run(info: &GpuInfo, config: &SurfaceConfig, mode: SurfaceMode, surf: &mut SurfaceDescriptor) -> FakeOracle {
        let (r, oracle) = run_with(info, FakeOracle::new(info.gfx_level), config, mode, surf);
        assert_eq!(r, Ok(()));
        oracle
    }

    #[test]
    fn test_linear_single_texel() {
        let info = fixtures::gfx9();
        let config = SurfaceConfig::new_2d(1, 1);
        let mut surf = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::empty());
        let oracle = run(&info, &config, SurfaceMode::LinearAligned, &mut surf);

        let layout = surf.unified().unwrap();
        assert_eq!(layout.swizzle_mode, SwizzleMode::LINEAR);
        assert!(surf.is_linear);
        assert_eq!(layout.levels.len(), 1);
        assert_eq!(surf.meta.size, 0);
        assert_eq!(surf.fmask.size, 0);
        assert_eq!(surf.cmask.size, 0);
        assert_eq!(oracle.count(CallKind::PreferredSetting), 0);
    }

    #[test]
    fn test_msaa_fmask_independent_of_dcc() {
        let info = fixtures::gfx9();
        let config = SurfaceConfig::new_2d(256, 256).with_samples(4);

        let mut with_dcc = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::empty());
        run(&info, &config, SurfaceMode::Tiled2D, &mut with_dcc);
        let mut without_dcc = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::DISABLE_DCC);
        run(&info, &config, SurfaceMode::Tiled2D, &mut without_dcc);

        assert!(with_dcc.fmask.size > 0);
        assert!(with_dcc.meta.size > 0);
        assert_eq!(without_dcc.meta.size, 0);
        assert_eq!(with_dcc.fmask.size, without_dcc.fmask.size);
        // CMASK follows FMASK
        assert!(with_dcc.cmask.size > 0);
    }

    #[test]
    fn test_fmask_uses_z_mode() {
        let info = fixtures::gfx10_3();
        let config = SurfaceConfig::new_2d(128, 128).with_samples(8);
        let mut surf = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::empty());
        let oracle = run(&info, &config, SurfaceMode::Tiled2D, &mut surf);

        let fmask_query = oracle.calls().into_iter().find_map(|c| match c {
            OracleCall::PreferredSetting(s) if s.flags.contains(Gfx9SurfaceFlags::FMASK) => Some(s),
            _ => None,
        });
        let fmask_query = fmask_query.unwrap();
        assert!(!fmask_query.flags.contains(Gfx9SurfaceFlags::COLOR));
        assert_eq!(
            surf.unified().unwrap().color.fmask_swizzle_mode,
            SwizzleMode::SW_64KB_Z_X
        );
    }

    #[test]
    fn test_no_fmask_on_gfx11() {
        let info = fixtures::gfx11();
        let config = SurfaceConfig::new_2d(128, 128).with_samples(4);
        let mut surf = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::empty());
        let oracle = run(&info, &config, SurfaceMode::Tiled2D, &mut surf);

        assert_eq!(surf.fmask.size, 0);
        assert_eq!(surf.cmask.size, 0);
        assert_eq!(oracle.count(CallKind::Gfx9Fmask), 0);
    }

    #[test]
    fn test_depth_gets_htile() {
        let info = fixtures::gfx10();
        let config = SurfaceConfig::new_2d(512, 512).with_levels(3);
        let mut surf = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::ZBUFFER | SurfaceFlags::TC_COMPATIBLE_HTILE);
        let oracle = run(&info, &config, SurfaceMode::Tiled2D, &mut surf);

        assert_eq!(oracle.count(CallKind::Gfx9Htile), 1);
        assert_eq!(oracle.count(CallKind::Gfx9Dcc), 0);
        assert!(surf.meta.size > 0);
        assert_eq!(surf.num_meta_levels, 3);
        assert_eq!(surf.unified().unwrap().meta_levels.len(), 3);
        assert!(surf.flags.contains(SurfaceFlags::TC_COMPATIBLE_HTILE));
        assert_eq!(surf.micro_tile_mode, MicroTileMode::Depth);
    }

    #[test]
    fn test_no_htile_clears_tc_compatible() {
        let info = fixtures::gfx10();
        let config = SurfaceConfig::new_2d(64, 64);
        let flags = SurfaceFlags::ZBUFFER | SurfaceFlags::TC_COMPATIBLE_HTILE | SurfaceFlags::NO_HTILE;
        let mut surf = SurfaceDescriptor::new(1, 1, 4, flags);
        run(&info, &config, SurfaceMode::Tiled2D, &mut surf);

        assert_eq!(surf.meta.size, 0);
        assert!(!surf.flags.contains(SurfaceFlags::TC_COMPATIBLE_HTILE));
    }

    #[test]
    fn test_depth_stencil_planes() {
        let info = fixtures::gfx10_3();
        let config = SurfaceConfig::new_2d(100, 100);
        let mut surf = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::ZBUFFER | SurfaceFlags::SBUFFER);
        let oracle = run(&info, &config, SurfaceMode::Tiled2D, &mut surf);

        let layout = surf.unified().unwrap();
        assert!(surf.has_stencil);
        assert!(layout.zs.stencil_offset > 0);
        assert_eq!(layout.zs.stencil_offset % (1 << 16), 0);
        assert!(surf.surf_size > layout.zs.stencil_offset);
        // Stencil reuses the depth swizzle mode
        assert_eq!(layout.zs.stencil_swizzle_mode, layout.swizzle_mode);
        assert_eq!(oracle.count(CallKind::Gfx9Surface), 2);
    }

    #[test]
    fn test_display_dcc_with_retile() {
        let info = fixtures::gfx10_3();
        let config = SurfaceConfig::new_2d(256, 256);
        let mut surf = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::SCANOUT);
        let oracle = run(&info, &config, SurfaceMode::Tiled2D, &mut surf);

        let color = surf.unified().unwrap().color;
        assert_eq!(oracle.count(CallKind::Gfx9Dcc), 2);
        assert!(color.dcc.display_equation_valid);
        assert!(color.dcc.independent_64b && color.dcc.independent_128b);
        assert_eq!(color.dcc.max_compressed_block_size as u64, dcc_block::B64);
        assert!(color.display_dcc.size > 0);
        assert!(color.display_dcc.size <= surf.meta.size);
        assert!(surf.is_displayable);
        // Displayable surfaces take no pipe/bank XOR
        assert_eq!(surf.tile_swizzle, 0);
    }

    #[test]
    fn test_tile_swizzle_shift_on_gfx11() {
        let info = fixtures::gfx11();
        let config = SurfaceConfig::new_2d(256, 256);
        let counter = AtomicSurfaceIndex::new(5);
        let fmask_counter = AtomicSurfaceIndex::new(0);
        let lib = AddrLib::new(&info, FakeOracle::new(GfxLevel::Gfx11));
        let ctx = LayoutContext::new(&lib, &info, SwizzleCounters::new(&counter, &fmask_counter));

        let mut surf = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::empty());
        UnifiedStrategy
            .compute(&ctx, &config, SurfaceMode::Tiled2D, &mut surf)
            .unwrap();

        // FakeOracle answers surf_index % 8 + 1
        assert_eq!(surf.tile_swizzle, 6 << 2);
        assert_eq!(counter.get(), 6);
    }

    #[test]
    fn test_forbidden_blocks() {
        let info = fixtures::gfx11_5();
        let config = SurfaceConfig::new_2d(256, 256);

        let mut prt = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::PRT);
        let oracle = run(&info, &config, SurfaceMode::Tiled2D, &mut prt);
        match oracle.last(CallKind::PreferredSetting) {
            Some(OracleCall::PreferredSetting(s)) => {
                assert!(s.forbidden.contains(ForbiddenBlocks::LINEAR | ForbiddenBlocks::MACRO_THIN_4KB));
                // APU
                assert!(s.forbidden.contains(ForbiddenBlocks::GFX11_256KB));
                assert!(!s.forbidden.contains(ForbiddenBlocks::VAR));
            }
            other => panic!("unexpected {:?}", other),
        }

        let mut small = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::PREFER_4K_ALIGNMENT);
        run(&info, &config, SurfaceMode::Tiled2D, &mut small);
        assert_eq!(small.unified().unwrap().swizzle_mode.block_size_log2(), 12);
        assert_eq!(small.surf_alignment_log2, 12);
    }

    #[test]
    fn test_special_swizzle_modes() {
        let info = fixtures::gfx11();
        let config = SurfaceConfig::new_2d(64, 64);

        let mut vrs = SurfaceDescriptor::new(1, 1, 1, SurfaceFlags::VRS_RATE);
        let oracle = run(&info, &config, SurfaceMode::Tiled2D, &mut vrs);
        assert_eq!(vrs.unified().unwrap().swizzle_mode, SwizzleMode::SW_64KB_R_X);
        assert_eq!(oracle.count(CallKind::PreferredSetting), 0);

        let mut video = SurfaceDescriptor::new(1, 1, 1, SurfaceFlags::VIDEO_REFERENCE);
        run(&info, &config, SurfaceMode::Tiled2D, &mut video);
        assert_eq!(video.unified().unwrap().swizzle_mode, SwizzleMode::SW_256B_D);
    }

    #[test]
    fn test_modifier_forces_swizzle_and_dcc() {
        let info = fixtures::gfx10_3();
        let modifier = Modifier::AMD
            .with(ModifierField::TILE_VERSION, tile_version::GFX10_RBPLUS)
            .with(ModifierField::TILE, SwizzleMode::SW_64KB_R_X.raw() as u64)
            .with_flag(ModifierField::DCC, true)
            .with_flag(ModifierField::DCC_PIPE_ALIGN, true)
            .with_flag(ModifierField::DCC_INDEPENDENT_128B, true)
            .with(ModifierField::DCC_MAX_COMPRESSED_BLOCK, dcc_block::B128);
        let config = SurfaceConfig::new_2d(512, 512);
        let mut surf = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::SCANOUT).with_modifier(modifier);
        run(&info, &config, SurfaceMode::Tiled2D, &mut surf);

        let layout = surf.unified().unwrap();
        assert_eq!(layout.swizzle_mode, SwizzleMode::SW_64KB_R_X);
        assert!(surf.num_meta_levels > 0);
        assert!(!layout.color.dcc.independent_64b);
        assert!(layout.color.dcc.independent_128b);
        assert!(layout.color.dcc.pipe_aligned);
        // No retile requested
        assert!(!layout.color.dcc.display_equation_valid);
    }

    #[test]
    fn test_rotated_rejected_on_gfx9() {
        let info = fixtures::gfx9();
        let config = SurfaceConfig::new_2d(64, 64);
        let mut surf = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::empty());
        let oracle = FakeOracle::new(GfxLevel::Gfx9).with_preferred_swizzle(SwizzleMode::SW_64KB_R_X);
        let (r, _) = run_with(&info, oracle, &config, SurfaceMode::Tiled2D, &mut surf);
        assert_eq!(r, Err(Error::UnsupportedMicroTileMode));
    }

    #[test]
    fn test_dcc_failure_propagates() {
        let info = fixtures::gfx9();
        let config = SurfaceConfig::new_2d(64, 64);
        let mut surf = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::empty());
        let oracle = FakeOracle::new(GfxLevel::Gfx9).failing_on(CallKind::Gfx9Dcc);
        let (r, _) = run_with(&info, oracle, &config, SurfaceMode::Tiled2D, &mut surf);
        assert!(matches!(r, Err(Error::Oracle(_))));
    }

    #[test]
    fn test_dcc_supported_by_cb() {
        let gfx9 = fixtures::gfx9();
        assert!(is_dcc_supported_by_cb(&gfx9, SwizzleMode::SW_64KB_S_X));
        assert!(!is_dcc_supported_by_cb(&gfx9, SwizzleMode::LINEAR));

        let gfx10 = fixtures::gfx10();
        assert!(is_dcc_supported_by_cb(&gfx10, SwizzleMode::SW_64KB_R_X));
        assert!(!is_dcc_supported_by_cb(&gfx10, SwizzleMode::SW_64KB_S_X));

        let gfx11 = fixtures::gfx11();
        assert!(is_dcc_supported_by_cb(&gfx11, SwizzleMode::SW_256KB_Z_X));
        assert!(!is_dcc_supported_by_cb(&gfx10, SwizzleMode::SW_256KB_Z_X));
    }

    #[test]
    fn test_dcc_supported_by_l2() {
        let b64 = DccSettings {
            independent_64b: true,
            max_compressed_block_size: dcc_block::B64 as u8,
            ..DccSettings::default()
        };
        let b128 = DccSettings {
            independent_128b: true,
            max_compressed_block_size: dcc_block::B128 as u8,
            ..DccSettings::default()
        };
        let both = DccSettings {
            independent_64b: true,
            independent_128b: true,
            max_compressed_block_size: dcc_block::B64 as u8,
            ..DccSettings::default()
        };

        assert!(l2_supports(&fixtures::gfx9(), &b64));
        assert!(!l2_supports(&fixtures::gfx9(), &b128));
        // Navi10 only takes 128 B blocks
        assert!(l2_supports(&fixtures::gfx10(), &b128));
        assert!(!l2_supports(&fixtures::gfx10(), &b64));
        assert!(l2_supports(&fixtures::gfx10_3(), &both));
        assert!(l2_supports(&fixtures::gfx10_3(), &b64));
    }

    #[test]
    fn test_dcn_requires_64b_blocks() {
        let info = fixtures::gfx10_3();
        assert!(!dcn_requires_independent_64b_blocks(&info, &SurfaceConfig::new_2d(2560, 1440)));
        assert!(dcn_requires_independent_64b_blocks(&info, &SurfaceConfig::new_2d(3840, 2160)));

        let old = info.with_drm_minor(43);
        assert!(dcn_requires_independent_64b_blocks(&old, &SurfaceConfig::new_2d(64, 64)));
    }

    #[test]
    fn test_dcn_rejects_aligned_dcc_on_unaligned_display() {
        let raven = fixtures::raven();
        let config = SurfaceConfig::new_2d(256, 256);
        let dcc = DccSettings::default();
        assert!(dcn_supports(&raven, &config, 4, &dcc, false, false));
        assert!(!dcn_supports(&raven, &config, 4, &dcc, true, false));
        assert!(!dcn_supports(&raven, &config, 2, &dcc, false, false));
    }
}
