//! # GFX12 Strategy
//!
//! The third unified revision. Metadata no longer has a layout of its own:
//! DCC is a per-surface enable and the only auxiliary surfaces are the
//! hierarchical depth (HiZ) and stencil (HiS) planes.
//!
//! The swizzle mode is chosen here rather than by the oracle. The oracle
//! lists the legal modes and each candidate block size is scored by how much
//! memory it wastes compared to an unpadded image.

use log::{debug, trace};

use slate_addr::Gfx12Oracle;
use slate_addr::gfx12::{Gfx12PossibleModesInput, Gfx12SurfaceFlags, Gfx12SurfaceInput, Gfx12ValidModes};
use slate_addr::AddressOracle;
use slate_core::config::estimate_size;
use slate_core::format::{AddrFormat, classify_for};
use slate_core::math::{align_u32, align_u64, log2};
use slate_core::modifier::dcc_block;
use slate_core::surface::{HiSurface, UnifiedLayout, UnifiedLevel};
use slate_core::swizzle::{
    GFX12_BLOCK2D_256B, GFX12_BLOCK2D_256K, GFX12_BLOCK2D_4K, GFX12_BLOCK2D_64K,
    GFX12_BLOCK3D_256K, GFX12_BLOCK3D_4K, GFX12_BLOCK3D_64K, GFX12_LINEAR_BLOCK,
};
use slate_core::{
    Error, Extent3d, GfxLevel, OracleError, ResourceType, Result, SurfaceConfig,
    SurfaceDescriptor, SurfaceFlags, SurfaceIndexCounter, SurfaceLayout, SurfaceMode, SwizzleMode,
};

use crate::strategy::{GenerationStrategy, LINEAR_PITCH_ALIGNMENT, LayoutContext, get_display_flag};

// Tolerated overallocation in percent of the unpadded size
/// 256 KiB planar blocks
pub const MAX_2D_OVERALLOC_256KB: u64 = 110;
/// 64 KiB planar blocks
pub const MAX_2D_OVERALLOC_64KB: u64 = 130;
/// 4 KiB planar blocks
pub const MAX_2D_OVERALLOC_4KB: u64 = 200;
/// 256 B planar blocks, relative to linear instead of the ideal size
pub const MAX_2D_OVERALLOC_256B: u64 = 300;
/// 256 KiB volume blocks
pub const MAX_3D_OVERALLOC_256KB: u64 = 110;
/// 64 KiB volume blocks
pub const MAX_3D_OVERALLOC_64KB: u64 = 120;
/// 4 KiB volume blocks
pub const MAX_3D_OVERALLOC_4KB: u64 = 200;

/// Linear pitch granule of the unpacked 4:2:2 path, in bytes
const SUBSAMPLED_LINEAR_ALIGNMENT: u32 = 128;

/// DRM minor version whose display handles 256 B DCC blocks
const DISPLAY_DCC_256B_DRM_MINOR: u32 = 63;

/// First chip revision with a usable HiS
const HIS_MIN_CHIP_REV: u32 = 2;

#[inline]
fn within(size: u64, reference: u64, percent: u64) -> bool {
    size * 100 <= reference * percent
}

// =============================================================================
// SWIZZLE SCORING
// =============================================================================

/// Pick the cheapest fast swizzle mode among those the oracle allows
///
/// `surf` is `None` for HiZ/HiS planes, which have no element shape of their
/// own.
pub fn select_swizzle_mode<O: AddressOracle>(
    ctx: &LayoutContext<'_, O>,
    config: &SurfaceConfig,
    surf: Option<&SurfaceDescriptor>,
    input: &Gfx12SurfaceInput,
    flags: SurfaceFlags,
) -> Result<SwizzleMode> {
    let bpp = if input.bpp != 0 {
        input.bpp
    } else {
        surf.map_or(8, |s| s.bpe * 8)
    };

    let max_align = if flags.contains(SurfaceFlags::PREFER_4K_ALIGNMENT) {
        4 * 1024
    } else if flags.contains(SurfaceFlags::PREFER_64K_ALIGNMENT) {
        64 * 1024
    } else if ctx.info.has_dedicated_vram {
        256 * 1024
    } else {
        64 * 1024
    };

    let query = Gfx12PossibleModesInput {
        flags: input.flags,
        resource_type: input.resource_type,
        bpp,
        width: input.width,
        height: input.height,
        num_slices: input.num_slices,
        num_mip_levels: input.num_mip_levels,
        num_samples: input.num_samples,
        max_align,
    };
    trace!("gfx12 possible modes: {:?}", query);
    let mut modes = Gfx12Oracle::get_possible_swizzle_modes(ctx.oracle(), &query)?;

    // The oracle mishandles linear 4x4 block compressed layouts
    if surf.is_some_and(|s| s.blk_w == 4) {
        modes.remove(Gfx12ValidModes::LINEAR);
    }

    if modes.is_empty() {
        debug!("gfx12: no legal swizzle mode for {:?}", query);
        return Err(OracleError::NOT_SUPPORTED.into());
    }

    let log_bpp = (log2(bpp / 8) as usize).min(4);
    let log_samples = (log2(input.num_samples.max(1)) as usize).min(3);
    let (blk_w, blk_h) = surf.map_or((1, 1), |s| (s.blk_w, s.blk_h));
    let estimate = |tile: Extent3d| estimate_size(config, (blk_w, blk_h), bpp, input.width, input.height, tile);
    let ideal = estimate(Extent3d::new(1, 1, 1));
    let volume = |t: [u32; 3]| Extent3d::new(t[0], t[1], t[2]);
    let planar = |t: [u32; 2]| Extent3d::new(t[0], t[1], 1);

    if input.resource_type == ResourceType::Tex3D {
        let size_4k = estimate(volume(GFX12_BLOCK3D_4K[log_bpp]));
        let size_64k = estimate(volume(GFX12_BLOCK3D_64K[log_bpp]));
        let size_256k = estimate(volume(GFX12_BLOCK3D_256K[log_bpp]));

        if modes.contains(Gfx12ValidModes::SW_3D_256KB)
            && (within(size_256k, ideal, MAX_3D_OVERALLOC_256KB)
                || !modes.contains(Gfx12ValidModes::SW_3D_64KB))
        {
            return Ok(SwizzleMode::GFX12_256KB_3D);
        }

        if modes.contains(Gfx12ValidModes::SW_3D_64KB)
            && (within(size_64k, ideal, MAX_3D_OVERALLOC_64KB)
                || !modes.contains(Gfx12ValidModes::SW_3D_4KB))
        {
            return Ok(SwizzleMode::GFX12_64KB_3D);
        }

        // Thick images stay thick
        if modes.contains(Gfx12ValidModes::SW_3D_4KB)
            && (within(size_4k, ideal, MAX_3D_OVERALLOC_4KB)
                || input.num_slices >= GFX12_BLOCK3D_4K[log_bpp][2] * 3)
        {
            return Ok(SwizzleMode::GFX12_4KB_3D);
        }

        // A planar mode saves memory
    }

    // Linear pitch is 128 B aligned but slices are sized as if 256 B
    let size_linear = estimate(Extent3d::new(GFX12_LINEAR_BLOCK[log_bpp], 1, 1));
    let size_256b = estimate(planar(GFX12_BLOCK2D_256B[log_samples][log_bpp]));
    let size_4k = estimate(planar(GFX12_BLOCK2D_4K[log_samples][log_bpp]));
    let size_64k = estimate(planar(GFX12_BLOCK2D_64K[log_samples][log_bpp]));
    let size_256k = estimate(planar(GFX12_BLOCK2D_256K[log_samples][log_bpp]));

    trace!(
        "gfx12 scoring: ideal {} linear {} 256B {} 4K {} 64K {} 256K {}",
        ideal, size_linear, size_256b, size_4k, size_64k, size_256k
    );

    if modes.contains(Gfx12ValidModes::SW_2D_256KB)
        && (within(size_256k, ideal, MAX_2D_OVERALLOC_256KB)
            || !modes.contains(Gfx12ValidModes::SW_2D_64KB))
    {
        return Ok(SwizzleMode::GFX12_256KB_2D);
    }

    if modes.contains(Gfx12ValidModes::SW_2D_64KB)
        && (within(size_64k, ideal, MAX_2D_OVERALLOC_64KB)
            || !modes.contains(Gfx12ValidModes::SW_2D_4KB))
    {
        return Ok(SwizzleMode::GFX12_64KB_2D);
    }

    let small = Gfx12ValidModes::SW_2D_256B | Gfx12ValidModes::LINEAR;
    if modes.contains(Gfx12ValidModes::SW_2D_4KB)
        && (within(size_4k, ideal, MAX_2D_OVERALLOC_4KB) || !modes.intersects(small))
    {
        return Ok(SwizzleMode::GFX12_4KB_2D);
    }

    let has_256b = modes.contains(Gfx12ValidModes::SW_2D_256B);
    let has_linear = modes.contains(Gfx12ValidModes::LINEAR);
    Ok(match (has_256b, has_linear) {
        (true, true) if within(size_256b, size_linear, MAX_2D_OVERALLOC_256B) => SwizzleMode::GFX12_256B_2D,
        (true, true) => SwizzleMode::LINEAR,
        (true, false) => SwizzleMode::GFX12_256B_2D,
        _ => SwizzleMode::LINEAR,
    })
}

// =============================================================================
// HIZ / HIS
// =============================================================================

/// Size a HiZ (depth input) or HiS (stencil input) plane
///
/// Returns `None` when the plane is disabled.
fn compute_hiz_his<O: AddressOracle>(
    ctx: &LayoutContext<'_, O>,
    config: &SurfaceConfig,
    surf: &SurfaceDescriptor,
    plane: &Gfx12SurfaceInput,
) -> Result<Option<HiSurface>> {
    let depth = plane.flags.contains(Gfx12SurfaceFlags::DEPTH);
    debug_assert!(depth != plane.flags.contains(Gfx12SurfaceFlags::STENCIL));

    // First silicon has broken HiZ/HiS
    if surf.flags.contains(SurfaceFlags::NO_HTILE)
        || (ctx.info.gfx_level == GfxLevel::Gfx12 && ctx.info.chip_rev == 0)
    {
        return Ok(None);
    }

    let mut input = *plane;
    input.flags.remove(Gfx12SurfaceFlags::DEPTH | Gfx12SurfaceFlags::STENCIL);
    input.flags.insert(Gfx12SurfaceFlags::HIZ_HIS);
    (input.format, input.bpp) = if depth {
        (AddrFormat::R32, 32)
    } else {
        (AddrFormat::R16, 16)
    };
    input.pitch_in_element = 0;

    // One element per 8x8 pixel tile
    input.width = align_u32(plane.width.div_ceil(8), 2);
    input.height = align_u32(plane.height.div_ceil(8), 2);
    input.swizzle_mode = select_swizzle_mode(ctx, config, None, &input, surf.flags)?;

    trace!(
        "gfx12 {}: {}x{} tiles {:?}",
        if depth { "hiz" } else { "his" },
        input.width, input.height, input.swizzle_mode
    );
    let out = Gfx12Oracle::compute_surface_info(ctx.oracle(), &input)?;

    Ok(Some(HiSurface {
        offset: 0,
        size: out.surf_size,
        width_in_tiles: input.width,
        height_in_tiles: input.height,
        swizzle_mode: input.swizzle_mode,
        alignment_log2: log2(out.base_align),
    }))
}

// =============================================================================
// MIP TREE
// =============================================================================

fn compute_miptree<O: AddressOracle>(
    ctx: &LayoutContext<'_, O>,
    config: &SurfaceConfig,
    surf: &mut SurfaceDescriptor,
    layout: &mut UnifiedLayout,
    input: &Gfx12SurfaceInput,
) -> Result<()> {
    let info = ctx.info;
    let mode = input.swizzle_mode;

    trace!(
        "gfx12 surface: {}x{}x{} levels {} {:?} flags {:?}",
        input.width, input.height, input.num_slices, input.num_mip_levels, mode, input.flags
    );
    let out = Gfx12Oracle::compute_surface_info(ctx.oracle(), input)?;
    let num_levels = input.num_mip_levels as usize;

    // Single-level planar images get the pitch of one block row, not 64K
    let mut pitch = out.pitch;
    let planar = mode >= SwizzleMode::GFX12_256B_2D && mode <= SwizzleMode::GFX12_256KB_2D;
    if planar && input.num_mip_levels == 1 {
        let align_bits = mode.gfx12_block_size_log2() - log2(surf.bpe);
        let w_align = 1 << (align_bits / 2 + align_bits % 2);
        pitch = align_u32(input.width, w_align);
    }

    if input.flags.contains(Gfx12SurfaceFlags::STENCIL) {
        layout.zs.stencil_swizzle_mode = mode;
        layout.zs.stencil_offset = align_u64(surf.surf_size, out.base_align as u64);
        surf.surf_alignment_log2 = surf.surf_alignment_log2.max(log2(out.base_align));
        surf.surf_size = layout.zs.stencil_offset + out.surf_size;

        if info.chip_rev >= HIS_MIN_CHIP_REV {
            if let Some(his) = compute_hiz_his(ctx, config, surf, input)? {
                layout.zs.his = his;
            }
        }
        return Ok(());
    }

    layout.surf_slice_size = out.slice_size;
    layout.surf_pitch = pitch;
    layout.surf_height = out.height;
    surf.surf_size = out.surf_size;
    surf.surf_alignment_log2 = log2(out.base_align);

    if surf.flags.contains(SurfaceFlags::PRT) {
        surf.prt_tile_width = out.block_extent.width;
        surf.prt_tile_height = out.block_extent.height;
        surf.prt_tile_depth = out.block_extent.depth;
        surf.first_mip_tail_level = out.first_mip_id_in_tail;

        layout.prt_levels.clear();
        for mip in out.mip_info.iter().take(num_levels) {
            layout.prt_levels.push(UnifiedLevel {
                offset: mip.macro_block_offset + mip.mip_tail_offset as u64,
                pitch: mip.pitch,
            });
        }
    }

    layout.levels.clear();
    if surf.blk_w == 2 && out.pitch == out.pixel_pitch && layout.swizzle_mode.is_linear() {
        // Pitch in elements, each element holding two pixels
        let alignment = SUBSAMPLED_LINEAR_ALIGNMENT / surf.bpe;
        layout.surf_pitch = align_u32(layout.surf_pitch / surf.blk_w, alignment);
        layout.surf_slice_size = layout.surf_slice_size.max(
            layout.surf_pitch as u64 * out.height as u64 * surf.bpe as u64 * surf.blk_w as u64,
        );
        surf.surf_size = layout.surf_slice_size * input.num_slices as u64;

        for mip in out.mip_info.iter().take(num_levels) {
            layout.levels.push(UnifiedLevel {
                offset: mip.offset,
                pitch: align_u32(mip.pitch / surf.blk_w, alignment),
            });
        }
        layout.base_mip_width = layout.surf_pitch;
    } else if mode.is_linear() {
        for mip in out.mip_info.iter().take(num_levels) {
            layout.levels.push(UnifiedLevel {
                offset: mip.offset,
                pitch: mip.pitch,
            });
        }
        layout.base_mip_width = layout.surf_pitch;
    } else {
        layout.base_mip_width = out.mip_info.first().map_or(pitch, |m| m.pitch);
    }
    layout.base_mip_height = out.mip_info.first().map_or(out.height, |m| m.height);

    if input.flags.contains(Gfx12SurfaceFlags::DEPTH) {
        debug_assert!(!mode.is_linear());
        if let Some(hiz) = compute_hiz_his(ctx, config, surf, input)? {
            layout.zs.hiz = hiz;
        }
        return Ok(());
    }

    // Every mode of 4 KiB and up takes a pipe/bank XOR
    let wants_swizzle = !surf.modifier.is_set()
        && mode >= SwizzleMode::GFX12_4KB_2D
        && !out.mip_chain_in_tail
        && !surf.flags.contains(SurfaceFlags::SHAREABLE)
        && !get_display_flag(config, surf);

    if let Some(counter) = ctx.counters.surface.filter(|_| wants_swizzle) {
        let surf_index = counter.fetch_increment();
        trace!("gfx12 pipe/bank xor: surface index {}", surf_index);
        let xor = Gfx12Oracle::compute_pipe_bank_xor(ctx.oracle(), surf_index, mode)?;
        debug_assert!(xor <= 0x3FF);
        surf.tile_swizzle = xor as u16;
    }

    Ok(())
}

// =============================================================================
// STRATEGY
// =============================================================================

/// GFX12 layout strategy
#[derive(Debug, Clone, Copy, Default)]
pub struct Gfx12Strategy;

impl<O: AddressOracle> GenerationStrategy<O> for Gfx12Strategy {
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
        let stencil_only = surf.flags.is_stencil_only();

        let mut layout = core::mem::take(surf.ensure_unified());
        layout.levels.clear();
        layout.prt_levels.clear();
        layout.meta_levels.clear();
        layout.uses_custom_pitch = false;

        let (format, bpp) = if stencil_only {
            (AddrFormat::R8, 8)
        } else {
            (
                classify_for(info.gfx_level, surf.blk_w, surf.blk_h, surf.bpe, surf.flags),
                if compressed { 0 } else { surf.bpe * 8 },
            )
        };

        let mut flags = Gfx12SurfaceFlags::empty();
        flags.set(Gfx12SurfaceFlags::DEPTH, surf.flags.contains(SurfaceFlags::ZBUFFER));
        flags.set(Gfx12SurfaceFlags::STENCIL, stencil_only);
        flags.set(Gfx12SurfaceFlags::BLOCK_COMPRESSED, compressed);
        flags.set(Gfx12SurfaceFlags::VRS_IMAGE, surf.flags.contains(SurfaceFlags::VRS_RATE));
        flags.set(Gfx12SurfaceFlags::STANDARD_PRT, surf.flags.contains(SurfaceFlags::PRT));

        let resource_type = if config.is_3d {
            ResourceType::Tex3D
        } else if config.is_1d {
            ResourceType::Tex1D
        } else {
            ResourceType::Tex2D
        };

        let mut input = Gfx12SurfaceInput {
            swizzle_mode: SwizzleMode::LINEAR,
            resource_type,
            format,
            bpp,
            width: config.width,
            height: config.height,
            num_slices: config.num_layers(),
            num_mip_levels: config.levels,
            num_samples: config.num_samples(),
            pitch_in_element: 0,
            flags,
        };

        input.swizzle_mode = if surf.modifier.is_set() {
            debug_assert!(!compressed);
            debug_assert!(!surf.modifier.has_dcc() || !surf.flags.contains(SurfaceFlags::DISABLE_DCC));
            surf.modifier
                .swizzle_mode(info.gfx_level)
                .ok_or(Error::UnsupportedModifier)?
        } else if surf
            .flags
            .intersects(SurfaceFlags::IMPORTED | SurfaceFlags::FORCE_SWIZZLE_MODE)
        {
            layout.swizzle_mode
        } else if surf.flags.contains(SurfaceFlags::PRT) {
            if config.is_3d {
                SwizzleMode::GFX12_64KB_3D
            } else {
                SwizzleMode::GFX12_64KB_2D
            }
        } else if mode == SurfaceMode::LinearAligned {
            debug_assert!(config.samples <= 1 && !zs);
            SwizzleMode::LINEAR
        } else if config.is_1d && !zs {
            SwizzleMode::LINEAR
        } else if surf.flags.contains(SurfaceFlags::VIDEO_REFERENCE) {
            SwizzleMode::GFX12_256B_2D
        } else if format.is_astc() {
            if config.is_3d {
                SwizzleMode::GFX12_4KB_3D
            } else {
                SwizzleMode::GFX12_4KB_2D
            }
        } else {
            select_swizzle_mode(ctx, config, Some(&*surf), &input, surf.flags)?
        };
        debug!("gfx12: requested {:?}, swizzle mode {:?}", mode, input.swizzle_mode);

        // 256 B linear pitch for multi-GPU interop of plain 2D color images
        if !config.is_1d
            && !config.is_3d
            && !config.is_cube
            && !config.is_array
            && config.levels == 1
            && config.samples <= 1
            && surf.blk_w == 1
            && surf.blk_h == 1
            && !zs
            && surf.bpe.is_power_of_two()
            && input.swizzle_mode.is_linear()
        {
            input.pitch_in_element = align_u32(config.width, LINEAR_PITCH_ALIGNMENT / surf.bpe);
            layout.uses_custom_pitch = true;
        }

        layout.swizzle_mode = input.swizzle_mode;
        layout.resource_type = input.resource_type;

        // Z/S and MSAA color are always compressed by default
        layout.gfx12_enable_dcc = surf.modifier.has_dcc()
            || (!surf.modifier.is_set()
                && !surf.flags.contains(SurfaceFlags::DISABLE_DCC)
                && (zs
                    || config.samples > 1
                    || ((info.gfx12_supports_display_dcc || !surf.flags.contains(SurfaceFlags::SCANOUT))
                        && !layout.swizzle_mode.is_linear())));

        surf.has_stencil = surf.flags.contains(SurfaceFlags::SBUFFER);
        surf.is_linear = layout.swizzle_mode.is_linear();
        surf.is_displayable = !zs
            && layout.resource_type != ResourceType::Tex3D
            && (info.gfx12_supports_display_dcc || !layout.gfx12_enable_dcc);
        surf.thick_tiling = layout.swizzle_mode.is_gfx12_3d();
        surf.surf_size = 0;
        surf.num_meta_levels = 0;
        surf.meta.size = 0;
        surf.fmask.size = 0;
        surf.cmask.size = 0;
        layout.zs.stencil_offset = 0;

        if zs {
            layout.zs.hiz = HiSurface::default();
            layout.zs.his = HiSurface::default();
        }

        if layout.gfx12_enable_dcc {
            if surf.modifier.is_set() {
                layout.color.dcc.max_compressed_block_size = surf.modifier.dcc_max_compressed_block() as u8;
            } else if !zs && !surf.flags.contains(SurfaceFlags::IMPORTED) {
                // Older kernels can't scan out 256 B blocks
                let max = if info.drm_minor < DISPLAY_DCC_256B_DRM_MINOR
                    && surf.flags.contains(SurfaceFlags::SCANOUT)
                {
                    dcc_block::B128
                } else {
                    dcc_block::B256
                };
                layout.color.dcc.max_compressed_block_size = max as u8;
            }
        }

        if !stencil_only {
            compute_miptree(ctx, config, surf, &mut layout, &input)?;
        }

        if surf.flags.contains(SurfaceFlags::SBUFFER) {
            if !stencil_only {
                input.flags.remove(Gfx12SurfaceFlags::DEPTH);
                input.flags.insert(Gfx12SurfaceFlags::STENCIL);
                input.bpp = 8;
                input.format = AddrFormat::R8;
            }
            compute_miptree(ctx, config, surf, &mut layout, &input)?;
        }

        debug!(
            "gfx12: size {} align 2^{} dcc {} hiz {} his {} swizzle {}",
            surf.surf_size,
            surf.surf_alignment_log2,
            layout.gfx12_enable_dcc,
            layout.zs.hiz.size,
            layout.zs.his.size,
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
    use slate_core::{AtomicSurfaceIndex, GpuInfo, Modifier, ModifierField, SwizzleCounters};
    use slate_core::modifier::{tile, tile_version};
    use slate_test_framework::fixtures;
    use slate_test_framework::{CallKind, FakeOracle};

    fn run_with(
        info: &GpuInfo,
        oracle: FakeOracle,
        config: &SurfaceConfig,
        mode: SurfaceMode,
        surf: &mut SurfaceDescriptor,
    ) -> (Result<()>, FakeOracle) {
        let lib = AddrLib::new(info, oracle);
        let ctx = LayoutContext::new(&lib, info, SwizzleCounters::NONE);
        let r = Gfx12Strategy.compute(&ctx, config, mode, surf);
        (r, lib.into_inner())
    }

    fn tiled(info: &GpuInfo, config: &SurfaceConfig, surf: &mut SurfaceDescriptor) -> FakeOracle {
        let (r, oracle) = run_with(info, FakeOracle::new(GfxLevel::Gfx12), config, SurfaceMode::Tiled2D, surf);
        assert_eq!(r, Ok(()));
        oracle
    }

    fn color(bpe: u32) -> SurfaceDescriptor {
        SurfaceDescriptor::new(1, 1, bpe, SurfaceFlags::empty())
    }

    fn swizzle_of(surf: &SurfaceDescriptor) -> SwizzleMode {
        surf.unified().unwrap().swizzle_mode
    }

    #[test]
    fn test_large_image_takes_256k_blocks() {
        let mut surf = color(4);
        tiled(&fixtures::gfx12(), &SurfaceConfig::new_2d(256, 256), &mut surf);
        assert_eq!(swizzle_of(&surf), SwizzleMode::GFX12_256KB_2D);
        assert_eq!(surf.unified().unwrap().surf_pitch, 256);
        assert!(surf.unified().unwrap().gfx12_enable_dcc);
        assert_eq!(
            surf.unified().unwrap().color.dcc.max_compressed_block_size as u64,
            dcc_block::B256
        );
    }

    #[test]
    fn test_small_image_avoids_overallocation() {
        let info = fixtures::gfx12();

        let mut surf = color(4);
        tiled(&info, &SurfaceConfig::new_2d(64, 64), &mut surf);
        assert_eq!(swizzle_of(&surf), SwizzleMode::GFX12_4KB_2D);

        // 256 B blocks waste less than 3x of linear
        let mut tiny = color(4);
        tiled(&info, &SurfaceConfig::new_2d(4, 4), &mut tiny);
        assert_eq!(swizzle_of(&tiny), SwizzleMode::GFX12_256B_2D);
    }

    #[test]
    fn test_alignment_preference_caps_block_size() {
        let info = fixtures::gfx12();
        let mut surf = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::PREFER_64K_ALIGNMENT);
        let oracle = tiled(&info, &SurfaceConfig::new_2d(256, 256), &mut surf);
        assert_eq!(swizzle_of(&surf), SwizzleMode::GFX12_64KB_2D);
        assert_eq!(surf.surf_alignment_log2, 16);
        assert_eq!(oracle.count(CallKind::PossibleModes), 1);

        // APUs never get 256 KiB blocks
        let apu = info.without_dedicated_vram();
        let mut surf = color(4);
        tiled(&apu, &SurfaceConfig::new_2d(256, 256), &mut surf);
        assert_eq!(swizzle_of(&surf), SwizzleMode::GFX12_64KB_2D);
    }

    #[test]
    fn test_volume_takes_thick_blocks() {
        let mut surf = color(4);
        tiled(&fixtures::gfx12(), &SurfaceConfig::new_3d(64, 64, 64), &mut surf);
        assert_eq!(swizzle_of(&surf), SwizzleMode::GFX12_256KB_3D);
        assert!(surf.thick_tiling);
        assert!(!surf.is_displayable);
    }

    #[test]
    fn test_linear_interop_pitch() {
        let info = fixtures::gfx12();
        let mut surf = color(4);
        let (r, oracle) = run_with(
            &info,
            FakeOracle::new(GfxLevel::Gfx12),
            &SurfaceConfig::new_2d(100, 16),
            SurfaceMode::LinearAligned,
            &mut surf,
        );
        assert_eq!(r, Ok(()));

        let layout = surf.unified().unwrap();
        assert!(surf.is_linear);
        assert!(layout.uses_custom_pitch);
        assert_eq!(layout.surf_pitch, 128);
        assert_eq!(layout.levels.len(), 1);
        // Linear color is never compressed
        assert!(!layout.gfx12_enable_dcc);
        assert_eq!(oracle.count(CallKind::PossibleModes), 0);
    }

    #[test]
    fn test_depth_stencil_hiz_his() {
        let info = fixtures::gfx12().with_chip_rev(2);
        let mut surf = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::ZBUFFER | SurfaceFlags::SBUFFER);
        let oracle = tiled(&info, &SurfaceConfig::new_2d(256, 256), &mut surf);

        let zs = surf.unified().unwrap().zs;
        assert!(zs.hiz.size > 0);
        assert!(zs.his.size > 0);
        assert_eq!(zs.hiz.width_in_tiles, 32);
        assert_eq!(zs.hiz.height_in_tiles, 32);
        assert_eq!(zs.hiz.swizzle_mode, SwizzleMode::GFX12_4KB_2D);
        assert_eq!(zs.hiz.alignment_log2, 12);
        assert!(zs.stencil_offset > 0);
        assert!(surf.surf_size > zs.stencil_offset);
        // Depth and stencil planes plus HiZ and HiS
        assert_eq!(oracle.count(CallKind::Gfx12Surface), 4);
        assert!(surf.unified().unwrap().gfx12_enable_dcc);
    }

    #[test]
    fn test_first_silicon_has_no_hiz() {
        let info = fixtures::gfx12();
        assert_eq!(info.chip_rev, 0);
        let mut surf = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::ZBUFFER);
        tiled(&info, &SurfaceConfig::new_2d(256, 256), &mut surf);
        assert_eq!(surf.unified().unwrap().zs.hiz.size, 0);

        let rev1 = info.with_chip_rev(1);
        let mut surf = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::ZBUFFER | SurfaceFlags::NO_HTILE);
        tiled(&rev1, &SurfaceConfig::new_2d(256, 256), &mut surf);
        assert_eq!(surf.unified().unwrap().zs.hiz.size, 0);
    }

    #[test]
    fn test_stencil_only() {
        let info = fixtures::gfx12().with_chip_rev(2);
        let mut surf = SurfaceDescriptor::new(1, 1, 1, SurfaceFlags::SBUFFER);
        let oracle = tiled(&info, &SurfaceConfig::new_2d(128, 128), &mut surf);

        let layout = surf.unified().unwrap();
        assert_eq!(layout.zs.stencil_offset, 0);
        assert!(layout.zs.his.size > 0);
        assert_eq!(layout.zs.hiz.size, 0);
        assert!(surf.surf_size > 0);
        match oracle.calls().first() {
            Some(slate_test_framework::OracleCall::PossibleModes(q)) => {
                assert!(q.flags.contains(Gfx12SurfaceFlags::STENCIL));
                assert_eq!(q.bpp, 8);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_tile_swizzle_from_counter() {
        let info = fixtures::gfx12();
        let counter = AtomicSurfaceIndex::new(2);
        let fmask_counter = AtomicSurfaceIndex::new(0);
        let lib = AddrLib::new(&info, FakeOracle::new(GfxLevel::Gfx12));
        let ctx = LayoutContext::new(&lib, &info, SwizzleCounters::new(&counter, &fmask_counter));

        let mut surf = color(4);
        Gfx12Strategy
            .compute(&ctx, &SurfaceConfig::new_2d(256, 256), SurfaceMode::Tiled2D, &mut surf)
            .unwrap();
        assert_eq!(surf.tile_swizzle, 3);
        assert_eq!(counter.get(), 3);

        let mut shared = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::SHAREABLE);
        Gfx12Strategy
            .compute(&ctx, &SurfaceConfig::new_2d(256, 256), SurfaceMode::Tiled2D, &mut shared)
            .unwrap();
        assert_eq!(shared.tile_swizzle, 0);
        assert_eq!(counter.get(), 3);
    }

    #[test]
    fn test_scanout_without_display_dcc() {
        let mut info = fixtures::gfx12();
        info.gfx12_supports_display_dcc = false;
        let mut surf = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::SCANOUT);
        tiled(&info, &SurfaceConfig::new_2d(256, 256), &mut surf);
        assert!(!surf.unified().unwrap().gfx12_enable_dcc);
        assert!(surf.is_displayable);

        // MSAA is compressed regardless
        let mut msaa = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::SCANOUT);
        tiled(&info, &SurfaceConfig::new_2d(256, 256).with_samples(4), &mut msaa);
        assert!(msaa.unified().unwrap().gfx12_enable_dcc);
        assert!(!msaa.is_displayable);
    }

    #[test]
    fn test_old_kernel_limits_scanout_dcc_block() {
        let info = fixtures::gfx12().with_drm_minor(62);
        let mut surf = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::SCANOUT);
        tiled(&info, &SurfaceConfig::new_2d(256, 256), &mut surf);
        assert_eq!(
            surf.unified().unwrap().color.dcc.max_compressed_block_size as u64,
            dcc_block::B128
        );
    }

    #[test]
    fn test_modifier_translation() {
        let info = fixtures::gfx12();
        let gfx11_d = Modifier::AMD
            .with(ModifierField::TILE_VERSION, tile_version::GFX11)
            .with(ModifierField::TILE, tile::GFX9_64K_D);
        let mut surf = color(4).with_modifier(gfx11_d);
        tiled(&info, &SurfaceConfig::new_2d(256, 256), &mut surf);
        assert_eq!(swizzle_of(&surf), SwizzleMode::GFX12_64KB_2D);
        assert!(!surf.unified().unwrap().gfx12_enable_dcc);
        // Modifiers never take a tile swizzle
        assert_eq!(surf.tile_swizzle, 0);

        let gfx11_r = gfx11_d.with(ModifierField::TILE, tile::GFX9_64K_R_X);
        let mut surf = color(4).with_modifier(gfx11_r);
        let (r, _) = run_with(
            &info,
            FakeOracle::new(GfxLevel::Gfx12),
            &SurfaceConfig::new_2d(256, 256),
            SurfaceMode::Tiled2D,
            &mut surf,
        );
        assert_eq!(r, Err(Error::UnsupportedModifier));
    }

    #[test]
    fn test_astc_and_video_modes() {
        let info = fixtures::gfx12();
        let mut astc = SurfaceDescriptor::new(8, 8, 16, SurfaceFlags::empty());
        let oracle = tiled(&info, &SurfaceConfig::new_2d(256, 256), &mut astc);
        assert_eq!(swizzle_of(&astc), SwizzleMode::GFX12_4KB_2D);
        assert_eq!(oracle.count(CallKind::PossibleModes), 0);

        let mut video = SurfaceDescriptor::new(1, 1, 1, SurfaceFlags::VIDEO_REFERENCE);
        tiled(&info, &SurfaceConfig::new_2d(256, 256), &mut video);
        assert_eq!(swizzle_of(&video), SwizzleMode::GFX12_256B_2D);
    }

    #[test]
    fn test_oracle_failure_propagates() {
        let info = fixtures::gfx12();
        let mut surf = color(4);
        let oracle = FakeOracle::new(GfxLevel::Gfx12).failing_on(CallKind::Gfx12Surface);
        let (r, _) = run_with(&info, oracle, &SurfaceConfig::new_2d(64, 64), SurfaceMode::Tiled2D, &mut surf);
        assert_eq!(r, Err(Error::Oracle(OracleError::ERROR)));
    }

    #[test]
    fn test_no_legal_mode_is_an_error() {
        let info = fixtures::gfx12();
        let mut surf = color(4);
        let oracle = FakeOracle::new(GfxLevel::Gfx12).with_gfx12_modes(Gfx12ValidModes::empty());
        let (r, _) = run_with(&info, oracle, &SurfaceConfig::new_2d(64, 64), SurfaceMode::Tiled2D, &mut surf);
        assert_eq!(r, Err(Error::Oracle(OracleError::NOT_SUPPORTED)));
    }
}
