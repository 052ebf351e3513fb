//! # Legacy Strategy (GFX6-8)
//!
//! Per-level tile modes with bank and pipe parameters. Every mip level is a
//! separate oracle query; level 0 fixes the pitch that later levels inherit
//! and the macro tile parameters shared by the whole surface.
//!
//! Depth/stencil surfaces take two passes over the levels, one per plane,
//! because the stencil plane is an 8-bit surface sharing the depth tile
//! configuration where possible.

use log::{debug, trace};

use slate_addr::legacy::{
    BaseSwizzleInput, LegacyDccInput, LegacyDccOutput, LegacyFmaskInput, LegacyHtileInput,
    LegacySurfaceFlags, LegacySurfaceInput, LegacySurfaceOutput, TileInfo, TileType,
};
use slate_addr::{AddressOracle, LegacyOracle};
use slate_core::format::{AddrFormat, classify_for};
use slate_core::math::{align_u32, align_u64, log2, log2_u64, minify};
use slate_core::surface::{LegacyLayout, LegacyLevel};
use slate_core::{
    ChipFamily, Error, Extent3d, GfxLevel, MicroTileMode, OracleError, Result, SurfaceConfig,
    SurfaceDescriptor, SurfaceFlags, SurfaceIndexCounter, SurfaceLayout, SurfaceMode, TileMode,
};

use crate::strategy::{GenerationStrategy, LINEAR_PITCH_ALIGNMENT, LayoutContext, get_display_flag};

/// Memory overhead tolerated by the 3D tile mode choice, as a multiple of
/// the untiled size
pub const THICK_OVERHEAD_FACTOR: u64 = 3;

/// HTILE covers 8x8 pixel blocks
const HTILE_BLOCK_SIZE: u32 = 8;

/// Bytes of HTILE per block
const HTILE_ELEMENT_SIZE: u64 = 4;

// =============================================================================
// REGISTER FIELDS
// =============================================================================

// GB_TILE_MODE (GFX6)
const fn si_bank_width(reg: u32) -> u32 {
    (reg >> 14) & 0x3
}
const fn si_bank_height(reg: u32) -> u32 {
    (reg >> 16) & 0x3
}
const fn si_macro_tile_aspect(reg: u32) -> u32 {
    (reg >> 18) & 0x3
}
const fn si_num_banks(reg: u32) -> u32 {
    (reg >> 20) & 0x3
}

// GB_MACROTILE_MODE (GFX7-8)
const fn cik_bank_width(reg: u32) -> u32 {
    reg & 0x3
}
const fn cik_bank_height(reg: u32) -> u32 {
    (reg >> 2) & 0x3
}
const fn cik_macro_tile_aspect(reg: u32) -> u32 {
    (reg >> 4) & 0x3
}
const fn cik_num_banks(reg: u32) -> u32 {
    (reg >> 6) & 0x3
}

/// Micro tile mode of the level 0 tile configuration
fn micro_tile_mode(info: &slate_core::GpuInfo, tiling_index: u8) -> MicroTileMode {
    let reg = info.si_tile_mode_array[tiling_index as usize % info.si_tile_mode_array.len()];
    if info.gfx_level >= GfxLevel::Gfx7 {
        MicroTileMode::from_bits((reg >> 22) & 0x7)
    } else {
        MicroTileMode::from_bits(reg & 0x3)
    }
}

/// Macro tile mode table index matching a tile split
fn cik_macro_tile_index(tile_split: u32, bpe: u32) -> i32 {
    let mut tileb = (8 * 8 * bpe).min(tile_split);
    let mut index = 0;
    while tileb > 64 {
        tileb >>= 1;
        index += 1;
    }
    debug_assert!(index < 16);
    index
}

const fn surface_mode_of(tile_mode: TileMode) -> SurfaceMode {
    match tile_mode {
        TileMode::LinearGeneral | TileMode::LinearAligned => SurfaceMode::LinearAligned,
        TileMode::Tiled1DThin1 | TileMode::Tiled1DThick | TileMode::PrtTiledThin1 => {
            SurfaceMode::Tiled1D
        }
        _ => SurfaceMode::Tiled2D,
    }
}

// =============================================================================
// 3D TILE MODE CHOICE
// =============================================================================

struct ThickCandidate {
    tile_mode: TileMode,
    gfx6_index: u32,
    gfx7_index: u32,
    micro_depth: u32,
    needs_gfx7: bool,
}

/// Volume tile modes, best performing first
const THICK_CANDIDATES: [ThickCandidate; 8] = [
    ThickCandidate { tile_mode: TileMode::Tiled3DXThick, gfx6_index: 0, gfx7_index: 26, micro_depth: 8, needs_gfx7: true },
    ThickCandidate { tile_mode: TileMode::Tiled2DXThick, gfx6_index: 19, gfx7_index: 25, micro_depth: 8, needs_gfx7: false },
    ThickCandidate { tile_mode: TileMode::Tiled3DThick, gfx6_index: 0, gfx7_index: 21, micro_depth: 4, needs_gfx7: true },
    ThickCandidate { tile_mode: TileMode::Tiled2DThick, gfx6_index: 20, gfx7_index: 20, micro_depth: 4, needs_gfx7: false },
    ThickCandidate { tile_mode: TileMode::Tiled3DThin1, gfx6_index: 0, gfx7_index: 15, micro_depth: 1, needs_gfx7: true },
    ThickCandidate { tile_mode: TileMode::Tiled2DThin1, gfx6_index: 14, gfx7_index: 14, micro_depth: 1, needs_gfx7: false },
    ThickCandidate { tile_mode: TileMode::Tiled1DThick, gfx6_index: 18, gfx7_index: 19, micro_depth: 4, needs_gfx7: false },
    ThickCandidate { tile_mode: TileMode::Tiled1DThin1, gfx6_index: 13, gfx7_index: 13, micro_depth: 1, needs_gfx7: false },
];

/// Alignment footprint of a candidate in elements
fn candidate_alignment<O: AddressOracle>(
    ctx: &LayoutContext<'_, O>,
    candidate: &ThickCandidate,
    bpe: u32,
) -> Result<Extent3d> {
    if candidate.tile_mode <= TileMode::Tiled1DThick {
        return Ok(Extent3d::new(8, 8, candidate.micro_depth));
    }

    let info = ctx.info;
    let (bank_width, bank_height, num_banks, aspect) = if info.gfx_level >= GfxLevel::Gfx7 {
        let index = LegacyOracle::get_macro_mode_index(ctx.oracle(), candidate.gfx7_index, bpe * 8, 1)?;
        let reg = *info
            .cik_macrotile_mode_array
            .get(index as usize)
            .ok_or(Error::Oracle(OracleError::INVALID_PARAMS))?;
        (
            1 << cik_bank_width(reg),
            1 << cik_bank_height(reg),
            2 << cik_num_banks(reg),
            1 << cik_macro_tile_aspect(reg),
        )
    } else {
        let reg = info.si_tile_mode_array[candidate.gfx6_index as usize];
        (
            1 << si_bank_width(reg),
            1 << si_bank_height(reg),
            2 << si_num_banks(reg),
            1 << si_macro_tile_aspect(reg),
        )
    };

    Ok(Extent3d::new(
        8 * bank_width * info.num_tile_pipes * aspect,
        8 * bank_height * num_banks / aspect,
        candidate.micro_depth,
    ))
}

/// Pick the best volume tile mode that does not overallocate too much
fn select_thick_tile_mode<O: AddressOracle>(
    ctx: &LayoutContext<'_, O>,
    config: &SurfaceConfig,
    surf: &SurfaceDescriptor,
) -> Result<TileMode> {
    let block = (surf.blk_w, surf.blk_h);
    let bpp = surf.bpe * 8;
    let ideal = slate_core::config::estimate_size(
        config,
        block,
        bpp,
        config.width,
        config.height,
        Extent3d::new(1, 1, 1),
    );

    for candidate in &THICK_CANDIDATES {
        if candidate.needs_gfx7 && ctx.info.gfx_level < GfxLevel::Gfx7 {
            continue;
        }

        let align = candidate_alignment(ctx, candidate, surf.bpe)?;
        let size = slate_core::config::estimate_size(config, block, bpp, config.width, config.height, align);
        if size <= ideal * THICK_OVERHEAD_FACTOR {
            return Ok(candidate.tile_mode);
        }
    }

    Ok(TileMode::Tiled1DThin1)
}

// =============================================================================
// LEVEL PASS STATE
// =============================================================================

/// Oracle records carried from one level to the next
struct LevelPass {
    input: LegacySurfaceInput,
    output: LegacySurfaceOutput,
    dcc_input: LegacyDccInput,
    dcc_output: LegacyDccOutput,
    /// Macro mode index to report when the tile info is forced
    forced_macro_index: Option<i32>,
}

impl LevelPass {
    /// Compute one level of one plane
    #[allow(clippy::too_many_arguments)]
    fn compute_level<O: AddressOracle>(
        &mut self,
        ctx: &LayoutContext<'_, O>,
        config: &SurfaceConfig,
        surf: &mut SurfaceDescriptor,
        layout: &mut LegacyLayout,
        is_stencil: bool,
        level: u32,
        compressed: bool,
    ) -> Result<()> {
        let input = &mut self.input;
        input.mip_level = level;
        input.width = minify(config.width, level);
        input.height = minify(config.height, level);

        // Linear surfaces stay compatible with every chip
        if config.levels == 1
            && input.tile_mode == TileMode::LinearAligned
            && input.bpp != 0
            && input.bpp.is_power_of_two()
        {
            input.width = align_u32(input.width, LINEAR_PITCH_ALIGNMENT / surf.bpe);
        }

        // 12-byte elements: 16 pixels is the first multiple of 64 bytes
        if input.bpp == 96 {
            debug_assert!(config.levels == 1);
            debug_assert!(input.tile_mode == TileMode::LinearAligned);
            input.width = align_u32(input.width, 16);
        }

        input.num_slices = if config.is_3d {
            minify(config.depth, level)
        } else if config.is_cube {
            6
        } else {
            config.array_size
        };

        if level > 0 {
            let base = if is_stencil { &layout.stencil_levels } else { &layout.levels };
            input.base_pitch = base.first().map_or(0, |l| l.nblk_x);
            if compressed {
                input.base_pitch *= surf.blk_w;
            }
        }

        trace!(
            "legacy surface: level {} {}x{}x{} {:?} stencil={}",
            level, input.width, input.height, input.num_slices, input.tile_mode, is_stencil
        );
        let mut out = LegacyOracle::compute_surface_info(ctx.oracle(), input)?;
        if let Some(index) = self.forced_macro_index {
            out.macro_mode_index = index;
        }

        let mut lvl = LegacyLevel {
            offset_256b: align_u64(surf.surf_size, out.base_align as u64) / 256,
            slice_size_dw: out.slice_size / 4,
            nblk_x: out.pitch,
            nblk_y: out.height,
            mode: surface_mode_of(out.tile_mode),
            tiling_index: out.tile_index as u8,
            ..LegacyLevel::default()
        };

        if input.flags.contains(LegacySurfaceFlags::PRT) {
            if level == 0 {
                surf.prt_tile_width = out.pitch_align;
                surf.prt_tile_height = out.height_align;
                surf.prt_tile_depth = out.depth_align;
            }
            // Not in the mip tail yet
            if lvl.nblk_x >= surf.prt_tile_width && lvl.nblk_y >= surf.prt_tile_height {
                surf.first_mip_tail_level = level + 1;
            }
        }

        surf.surf_size = lvl.offset() + out.surf_size;

        // The previous level decides whether this one may be compressed
        if input.flags.contains(LegacySurfaceFlags::DCC_COMPATIBLE)
            && (level == 0 || self.dcc_output.sub_lvl_compressible)
        {
            let prev_level_clearable = level == 0 || self.dcc_output.dcc_ram_size_aligned;

            self.dcc_input.color_surf_size = out.surf_size;
            self.dcc_input.tile_mode = out.tile_mode;
            self.dcc_input.tile_info = out.tile_info;
            self.dcc_input.tile_index = out.tile_index;
            self.dcc_input.macro_mode_index = out.macro_mode_index;

            trace!("legacy dcc: level {} color size {}", level, out.surf_size);
            self.dcc_output = LegacyOracle::compute_dcc_info(ctx.oracle(), &self.dcc_input)?;
            let dcc = self.dcc_output;

            lvl.dcc_offset = surf.meta.size;
            surf.num_meta_levels = level + 1;
            surf.meta.size = lvl.dcc_offset + dcc.dcc_ram_size;
            surf.meta.alignment_log2 = surf.meta.alignment_log2.max(log2(dcc.dcc_ram_base_align));

            // Non-contiguous DCC cannot be fast cleared, except on the last
            // level which has nothing to interleave with
            lvl.dcc_fast_clear_size = if dcc.dcc_ram_size_aligned
                || (prev_level_clearable && level == config.levels - 1)
            {
                dcc.dcc_fast_clear_size
            } else {
                0
            };

            // DCC is linear, every slice has the same size
            surf.meta.slice_size = dcc.dcc_ram_size / config.array_size as u64;

            if config.array_size > 1 {
                self.dcc_input.color_surf_size = out.slice_size;

                trace!("legacy dcc: level {} slice size {}", level, out.slice_size);
                self.dcc_output = LegacyOracle::compute_dcc_info(ctx.oracle(), &self.dcc_input)?;

                // Unaligned DCC interleaves slices
                lvl.dcc_slice_fast_clear_size = if self.dcc_output.dcc_ram_size_aligned {
                    self.dcc_output.dcc_fast_clear_size
                } else {
                    0
                };

                if surf.flags.contains(SurfaceFlags::CONTIGUOUS_DCC_LAYERS)
                    && surf.meta.slice_size != lvl.dcc_slice_fast_clear_size
                {
                    surf.meta.size = 0;
                    surf.num_meta_levels = 0;
                    self.dcc_output.sub_lvl_compressible = false;
                }
            } else {
                lvl.dcc_slice_fast_clear_size = lvl.dcc_fast_clear_size;
            }
        }

        let mode_has_htile = lvl.mode == SurfaceMode::Tiled2D
            || (lvl.mode == SurfaceMode::Tiled1D
                && !surf.flags.contains(SurfaceFlags::TC_COMPATIBLE_HTILE));

        if !is_stencil
            && input.flags.contains(LegacySurfaceFlags::DEPTH)
            && mode_has_htile
            && level == 0
            && !surf.flags.contains(SurfaceFlags::NO_HTILE)
        {
            let htile_input = LegacyHtileInput {
                tc_compatible: out.tc_compatible,
                pitch: out.pitch,
                height: out.height,
                num_slices: out.depth,
                block_width: HTILE_BLOCK_SIZE,
                block_height: HTILE_BLOCK_SIZE,
                tile_info: out.tile_info,
                tile_index: out.tile_index,
                macro_mode_index: out.macro_mode_index,
            };

            trace!("legacy htile: {}x{}x{}", out.pitch, out.height, out.depth);
            let htile = LegacyOracle::compute_htile_info(ctx.oracle(), &htile_input)?;
            surf.meta.size = htile.htile_bytes;
            surf.meta.slice_size = htile.slice_size;
            surf.meta.alignment_log2 = log2(htile.base_align);
            surf.meta_pitch = htile.pitch;
            surf.num_meta_levels = level + 1;
        }

        let levels = if is_stencil { &mut layout.stencil_levels } else { &mut layout.levels };
        levels.push(lvl);

        self.output = out;
        Ok(())
    }
}

// =============================================================================
// SURFACE SETTINGS
// =============================================================================

/// Copy the surface-wide settings of level 0 and compute the tile swizzle
fn surface_settings<O: AddressOracle>(
    ctx: &LayoutContext<'_, O>,
    config: &SurfaceConfig,
    out: &LegacySurfaceOutput,
    surf: &mut SurfaceDescriptor,
    layout: &mut LegacyLayout,
) -> Result<()> {
    let info = ctx.info;

    surf.surf_alignment_log2 = log2(out.base_align);
    layout.pipe_config = out.tile_info.pipe_config.saturating_sub(1);
    surf.micro_tile_mode = micro_tile_mode(info, layout.levels.first().map_or(0, |l| l.tiling_index));

    if out.tile_mode >= TileMode::Tiled2DThin1 {
        layout.bankw = out.tile_info.bank_width;
        layout.bankh = out.tile_info.bank_height;
        layout.mtilea = out.tile_info.macro_aspect_ratio;
        layout.tile_split = out.tile_info.tile_split_bytes;
        layout.num_banks = out.tile_info.banks;
        layout.macro_tile_index = out.macro_mode_index.max(0) as u32;
    } else {
        layout.macro_tile_index = 0;
    }

    // Tile swizzle with mipmaps is broken on GFX6
    let level0_2d = layout.levels.first().is_some_and(|l| l.mode == SurfaceMode::Tiled2D);
    let wants_swizzle = (info.gfx_level >= GfxLevel::Gfx7 || config.levels == 1)
        && level0_2d
        && !surf.flags.intersects(SurfaceFlags::Z_OR_SBUFFER | SurfaceFlags::SHAREABLE)
        && !get_display_flag(config, surf);

    if let Some(counter) = ctx.counters.surface.filter(|_| wants_swizzle) {
        let input = BaseSwizzleInput {
            surf_index: counter.fetch_increment(),
            tile_index: out.tile_index,
            macro_mode_index: out.macro_mode_index,
            tile_info: out.tile_info,
            tile_mode: out.tile_mode,
        };

        trace!("legacy base swizzle: surface index {}", input.surf_index);
        let swizzle = LegacyOracle::compute_base_swizzle(ctx.oracle(), &input)?;
        debug_assert!(swizzle <= u16::MAX as u32);
        surf.tile_swizzle = swizzle as u16;
    }

    Ok(())
}

// =============================================================================
// CMASK
// =============================================================================

/// CMASK of a single-sampled or FMASK-backed color surface
fn compute_cmask(info: &slate_core::GpuInfo, config: &SurfaceConfig, surf: &mut SurfaceDescriptor, layout: &mut LegacyLayout) {
    if surf.flags.is_depth_stencil() || surf.is_linear || (config.samples >= 2 && surf.fmask.size == 0) {
        return;
    }

    debug_assert!(info.gfx_level <= GfxLevel::Gfx8);

    let num_pipes = info.num_tile_pipes;
    let (cl_width, cl_height) = match num_pipes {
        2 => (32, 16),
        4 => (32, 32),
        8 => (64, 32),
        16 => (64, 64),
        _ => {
            debug_assert!(false, "unexpected pipe count {}", num_pipes);
            return;
        }
    };

    let base_align = num_pipes * info.pipe_interleave_bytes;
    let Some(level0) = layout.levels.first() else {
        return;
    };

    let width = align_u32(level0.nblk_x, cl_width * 8);
    let height = align_u32(level0.nblk_y, cl_height * 8);
    let slice_elements = (width * height) / (8 * 8);

    // One nibble per element
    let slice_bytes = slice_elements / 2;

    layout.cmask_slice_tile_max = ((width * height) / (128 * 128)).saturating_sub(1);

    surf.cmask.alignment_log2 = log2(base_align.max(256));
    surf.cmask.slice_size = align_u64(slice_bytes as u64, base_align as u64);
    surf.cmask.size = surf.cmask.slice_size * config.num_layers() as u64;
}

// =============================================================================
// STRATEGY
// =============================================================================

/// GFX6-8 layout strategy
#[derive(Debug, Clone, Copy, Default)]
pub struct Gfx6Strategy;

impl Gfx6Strategy {
    /// Oracle tile mode for a requested surface mode
    fn requested_tile_mode<O: AddressOracle>(
        ctx: &LayoutContext<'_, O>,
        config: &SurfaceConfig,
        surf: &SurfaceDescriptor,
        mode: SurfaceMode,
    ) -> Result<TileMode> {
        let prt = surf.flags.contains(SurfaceFlags::PRT);
        let tile_mode = match mode {
            SurfaceMode::LinearAligned => TileMode::LinearAligned,
            SurfaceMode::Tiled1D if prt => TileMode::PrtTiledThin1,
            SurfaceMode::Tiled1D if config.is_3d => TileMode::Tiled1DThick,
            SurfaceMode::Tiled1D => TileMode::Tiled1DThin1,
            SurfaceMode::Tiled2D if prt && config.is_3d && surf.bpe < 8 => TileMode::Prt2DTiledThick,
            SurfaceMode::Tiled2D if prt => TileMode::Prt2DTiledThin1,
            SurfaceMode::Tiled2D if config.is_3d => select_thick_tile_mode(ctx, config, surf)?,
            SurfaceMode::Tiled2D => TileMode::Tiled2DThin1,
        };
        Ok(tile_mode)
    }
}

impl<O: AddressOracle> GenerationStrategy<O> for Gfx6Strategy {
    fn compute(
        &self,
        ctx: &LayoutContext<'_, O>,
        config: &SurfaceConfig,
        mut mode: SurfaceMode,
        surf: &mut SurfaceDescriptor,
    ) -> Result<()> {
        let info = ctx.info;
        let compressed = surf.is_compressed();
        let zs = surf.flags.is_depth_stencil();

        // MSAA requires 2D tiling
        if config.samples > 1 {
            mode = SurfaceMode::Tiled2D;
        }
        // DB can't use linear layouts
        if zs && mode < SurfaceMode::Tiled1D {
            mode = SurfaceMode::Tiled1D;
        }

        let tile_mode = Self::requested_tile_mode(ctx, config, surf, mode)?;
        debug!("legacy: requested {:?}, tile mode {:?}", mode, tile_mode);

        let bpp = if compressed { 0 } else { surf.bpe * 8 };
        let num_samples = config.num_samples();
        let num_frags = if zs { 0 } else { config.num_storage_samples() };

        let mut flags = LegacySurfaceFlags::empty();
        flags.set(LegacySurfaceFlags::COLOR, !zs);
        flags.set(LegacySurfaceFlags::DEPTH, surf.flags.contains(SurfaceFlags::ZBUFFER));
        flags.set(LegacySurfaceFlags::CUBE, config.is_cube);
        flags.set(LegacySurfaceFlags::DISPLAY, get_display_flag(config, surf));
        flags.set(LegacySurfaceFlags::POW2_PAD, config.levels > 1);
        flags.set(
            LegacySurfaceFlags::TC_COMPATIBLE,
            surf.flags.contains(SurfaceFlags::TC_COMPATIBLE_HTILE),
        );
        flags.set(LegacySurfaceFlags::PRT, surf.flags.contains(SurfaceFlags::PRT));

        // TC-compatible HTILE needs 2D tiling, so never degrade it
        flags.set(
            LegacySurfaceFlags::OPT4SPACE,
            !flags.contains(LegacySurfaceFlags::TC_COMPATIBLE)
                && !config.is_3d
                && config.samples <= 1
                && !surf.flags.contains(SurfaceFlags::FORCE_SWIZZLE_MODE),
        );

        // Compute-only chips have no DCC; mipmapped arrays are slow with it
        flags.set(
            LegacySurfaceFlags::DCC_COMPATIBLE,
            info.gfx_level >= GfxLevel::Gfx8
                && info.has_graphics
                && !zs
                && !surf.flags.contains(SurfaceFlags::DISABLE_DCC)
                && !compressed
                && ((config.array_size == 1 && config.depth == 1) || config.levels == 1),
        );
        flags.set(
            LegacySurfaceFlags::NO_STENCIL,
            !surf.flags.contains(SurfaceFlags::SBUFFER)
                || surf.flags.contains(SurfaceFlags::NO_RENDER_TARGET),
        );
        flags.set(LegacySurfaceFlags::COMPRESS_Z, zs);

        // The DB shares pitch and tile mode between depth and stencil on
        // GFX7-8. Degrade depth where needed so a matching stencil
        // configuration exists.
        let mut stencil_tile_idx = -1;
        if flags.contains(LegacySurfaceFlags::DEPTH)
            && !flags.contains(LegacySurfaceFlags::NO_STENCIL)
            && (config.levels > 1 || info.family == ChipFamily::Stoney)
        {
            flags.insert(LegacySurfaceFlags::MATCH_STENCIL_TILE_CFG);

            // Keep the depth mip tail compatible with texturing
            if config.levels > 1 && !surf.flags.contains(SurfaceFlags::NO_STENCIL_ADJUST) {
                flags.insert(LegacySurfaceFlags::NO_STENCIL);
            }
        }

        let mut input = LegacySurfaceInput {
            tile_mode,
            format: classify_for(info.gfx_level, surf.blk_w, surf.blk_h, surf.bpe, surf.flags),
            bpp,
            num_samples,
            num_frags,
            tile_type: if surf.flags.contains(SurfaceFlags::SCANOUT) {
                TileType::Displayable
            } else if zs {
                TileType::DepthSampleOrder
            } else {
                TileType::NonDisplayable
            },
            flags,
            tile_index: -1,
            ..LegacySurfaceInput::default()
        };

        // Macro tile parameters already present (imported surfaces) are kept
        let prior = surf.legacy().cloned().unwrap_or_default();
        let mut layout = LegacyLayout {
            bankw: prior.bankw,
            bankh: prior.bankh,
            mtilea: prior.mtilea,
            tile_split: prior.tile_split,
            stencil_tile_split: prior.stencil_tile_split,
            num_banks: prior.num_banks,
            pipe_config: prior.pipe_config,
            macro_tile_index: prior.macro_tile_index,
            ..LegacyLayout::default()
        };

        let mut forced_macro_index = None;
        if !zs
            && tile_mode >= TileMode::Tiled2DThin1
            && prior.bankw != 0
            && prior.bankh != 0
            && prior.mtilea != 0
            && prior.tile_split != 0
        {
            debug_assert!(tile_mode == TileMode::Tiled2DThin1);

            input.tile_info = Some(TileInfo {
                banks: prior.num_banks,
                bank_width: prior.bankw,
                bank_height: prior.bankh,
                macro_aspect_ratio: prior.mtilea,
                tile_split_bytes: prior.tile_split,
                pipe_config: prior.pipe_config + 1,
            });
            input.flags.remove(LegacySurfaceFlags::OPT4SPACE);

            // The oracle leaves the tile index unset when tile info is forced
            input.tile_index = if info.gfx_level == GfxLevel::Gfx6 {
                match (input.tile_type, surf.bpe) {
                    (TileType::Displayable, 2) => 11,
                    (TileType::Displayable, _) => 12,
                    (_, 1) => 14,
                    (_, 2) => 15,
                    (_, 4) => 16,
                    _ => 17,
                }
            } else {
                forced_macro_index = Some(cik_macro_tile_index(prior.tile_split, surf.bpe));
                if input.tile_type == TileType::Displayable { 10 } else { 14 }
            };
        }

        surf.has_stencil = surf.flags.contains(SurfaceFlags::SBUFFER);
        surf.num_meta_levels = 0;
        surf.surf_size = 0;
        surf.meta.size = 0;
        surf.meta.slice_size = 0;
        surf.meta.alignment_log2 = 0;

        let mut pass = LevelPass {
            input,
            output: LegacySurfaceOutput::default(),
            dcc_input: LegacyDccInput {
                bpp,
                num_samples: if zs { num_samples } else { num_frags },
                ..LegacyDccInput::default()
            },
            dcc_output: LegacyDccOutput::default(),
            forced_macro_index,
        };

        let only_stencil = surf.flags.is_stencil_only();

        if !only_stencil {
            for level in 0..config.levels {
                pass.compute_level(ctx, config, surf, &mut layout, false, level, compressed)?;
                if level > 0 {
                    continue;
                }

                if !pass.output.tc_compatible {
                    pass.input.flags.remove(LegacySurfaceFlags::TC_COMPATIBLE);
                    surf.flags.remove(SurfaceFlags::TC_COMPATIBLE_HTILE);
                }

                if pass.input.flags.contains(LegacySurfaceFlags::MATCH_STENCIL_TILE_CFG) {
                    pass.input.flags.remove(LegacySurfaceFlags::MATCH_STENCIL_TILE_CFG);
                    pass.input.tile_index = pass.output.tile_index;
                    stencil_tile_idx = pass.output.stencil_tile_idx;
                    debug_assert!(stencil_tile_idx >= 0);
                }

                let out = pass.output;
                surface_settings(ctx, config, &out, surf, &mut layout)?;
            }
        }

        if surf.flags.contains(SurfaceFlags::SBUFFER) {
            pass.input.tile_index = stencil_tile_idx;
            pass.input.bpp = 8;
            pass.input.format = AddrFormat::R8;
            pass.input.flags.remove(LegacySurfaceFlags::DEPTH | LegacySurfaceFlags::TC_COMPATIBLE);
            pass.input.flags.insert(LegacySurfaceFlags::STENCIL);
            if let Some(tile_info) = pass.input.tile_info.as_mut() {
                tile_info.tile_split_bytes = layout.stencil_tile_split;
            }

            for level in 0..config.levels {
                pass.compute_level(ctx, config, surf, &mut layout, true, level, compressed)?;

                let stencil_pitch = layout.stencil_levels[level as usize].nblk_x;
                if only_stencil {
                    layout.levels.push(LegacyLevel {
                        nblk_x: stencil_pitch,
                        ..LegacyLevel::default()
                    });
                } else if stencil_pitch != layout.levels[level as usize].nblk_x {
                    // DB addresses stencil with the depth pitch
                    layout.stencil_adjusted = true;
                }

                if level == 0 {
                    let out = pass.output;
                    if only_stencil {
                        surface_settings(ctx, config, &out, surf, &mut layout)?;
                    }
                    if out.tile_mode >= TileMode::Tiled2DThin1 {
                        layout.stencil_tile_split = out.tile_info.tile_split_bytes;
                    }
                }
            }
        }

        if config.samples >= 2
            && pass.input.flags.contains(LegacySurfaceFlags::COLOR)
            && info.has_graphics
            && !surf.flags.contains(SurfaceFlags::NO_FMASK)
        {
            compute_fmask(ctx, config, &pass, surf, &mut layout)?;
        }

        // Levels that are never compressed still read DCC when the base
        // level uses it; the size was found by trial
        if !zs && surf.meta.size != 0 && config.levels > 1 {
            let align = (1u64 << surf.meta.alignment_log2) * 4;
            surf.meta.size = align_u64(surf.surf_size >> 8, align);
        }

        // TC-compatible HTILE is read for every level, even those the DB skips
        if surf.flags.intersects(SurfaceFlags::Z_OR_SBUFFER | SurfaceFlags::TC_COMPATIBLE_HTILE)
            && surf.meta.size != 0
            && config.levels > 1
        {
            let total_pixels = surf.surf_size / surf.bpe as u64;
            let blocks = total_pixels / (HTILE_BLOCK_SIZE * HTILE_BLOCK_SIZE) as u64;
            surf.meta.size = align_u64(blocks * HTILE_ELEMENT_SIZE, 1 << surf.meta.alignment_log2);
        } else if zs && surf.meta.size == 0 {
            surf.flags.remove(SurfaceFlags::TC_COMPATIBLE_HTILE);
        }

        let level0 = if only_stencil { layout.stencil_levels.first() } else { layout.levels.first() };
        surf.is_linear = level0.is_some_and(|l| l.mode == SurfaceMode::LinearAligned);
        surf.is_displayable = surf.is_linear
            || matches!(surf.micro_tile_mode, MicroTileMode::Display | MicroTileMode::Render);
        surf.thick_tiling = pass.output.tile_mode.is_thick();

        // Rotated micro tiling breaks with CMASK and RB+ together
        if surf.micro_tile_mode == MicroTileMode::Render {
            debug!("legacy: rotated micro tile mode is unsupported");
            return Err(Error::UnsupportedMicroTileMode);
        }

        compute_cmask(info, config, surf, &mut layout);

        debug!(
            "legacy: size {} align 2^{} meta {} fmask {} cmask {} swizzle {}",
            surf.surf_size,
            surf.surf_alignment_log2,
            surf.meta.size,
            surf.fmask.size,
            surf.cmask.size,
            surf.tile_swizzle
        );

        surf.layout = SurfaceLayout::Legacy(layout);
        Ok(())
    }
}

/// FMASK of a multisampled color surface and its tile swizzle
fn compute_fmask<O: AddressOracle>(
    ctx: &LayoutContext<'_, O>,
    config: &SurfaceConfig,
    pass: &LevelPass,
    surf: &mut SurfaceDescriptor,
    layout: &mut LegacyLayout,
) -> Result<()> {
    let input = LegacyFmaskInput {
        tile_mode: pass.output.tile_mode,
        pitch: pass.output.pitch,
        height: config.height,
        num_slices: pass.input.num_slices,
        num_samples: pass.input.num_samples,
        num_frags: pass.input.num_frags,
    };

    trace!("legacy fmask: {} samples, {} frags", input.num_samples, input.num_frags);
    let out = LegacyOracle::compute_fmask_info(ctx.oracle(), &input)?;

    surf.fmask.size = out.fmask_bytes;
    surf.fmask.alignment_log2 = log2_u64(out.base_align as u64);
    surf.fmask.slice_size = out.slice_size;
    surf.fmask_tile_swizzle = 0;

    layout.fmask.slice_tile_max = ((out.pitch * out.height) / 64).saturating_sub(1);
    layout.fmask.tiling_index = out.tile_index as u8;
    layout.fmask.bankh = out.tile_info.bank_height;
    layout.fmask.pitch_in_pixels = out.pitch;

    let shareable = surf.flags.contains(SurfaceFlags::SHAREABLE);
    if let Some(counter) = ctx.counters.fmask.filter(|_| !shareable) {
        // This counter starts from 1
        let swizzle_input = BaseSwizzleInput {
            surf_index: counter.increment(),
            tile_index: out.tile_index,
            macro_mode_index: out.macro_mode_index,
            tile_info: out.tile_info,
            tile_mode: input.tile_mode,
        };

        trace!("legacy fmask swizzle: surface index {}", swizzle_input.surf_index);
        let swizzle = LegacyOracle::compute_base_swizzle(ctx.oracle(), &swizzle_input)?;
        debug_assert!(swizzle <= u16::MAX as u32);
        surf.fmask_tile_swizzle = swizzle as u16;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use slate_addr::AddrLib;
    use slate_core::{AtomicSurfaceIndex, SwizzleCounters};
    use slate_test_framework::fixtures;
    use slate_test_framework::{CallKind, FakeOracle, OracleCall};

    fn run(
        info: &slate_core::GpuInfo,
        oracle: FakeOracle,
        config: &SurfaceConfig,
        mode: SurfaceMode,
        surf: &mut SurfaceDescriptor,
    ) -> (Result<()>, FakeOracle) {
        let lib = AddrLib::new(info, oracle);
        let ctx = LayoutContext::new(&lib, info, SwizzleCounters::NONE);
        let r = Gfx6Strategy.compute(&ctx, config, mode, surf);
        (r, lib.into_inner())
    }

    #[test]
    fn test_color_2d_single_level() {
        let info = fixtures::gfx8();
        let config = SurfaceConfig::new_2d(256, 256);
        let mut surf = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::empty());
        let (r, oracle) = run(&info, FakeOracle::new(GfxLevel::Gfx8), &config, SurfaceMode::Tiled2D, &mut surf);

        assert!(r.is_ok());
        let layout = surf.legacy().unwrap();
        assert_eq!(layout.levels.len(), 1);
        assert_eq!(layout.levels[0].mode, SurfaceMode::Tiled2D);
        assert_eq!(layout.levels[0].nblk_x, 256);
        assert_eq!(surf.surf_size, 256 * 256 * 4);
        assert!(!surf.is_linear);
        // DCC is computed for color on GFX8
        assert_eq!(oracle.count(CallKind::LegacyDcc), 1);
        assert!(surf.meta.size > 0);
        assert!(surf.cmask.size > 0);
    }

    #[test]
    fn test_depth_never_linear() {
        let info = fixtures::gfx7();
        let config = SurfaceConfig::new_2d(64, 64);
        let mut surf = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::ZBUFFER);
        let (r, oracle) =
            run(&info, FakeOracle::new(GfxLevel::Gfx7), &config, SurfaceMode::LinearAligned, &mut surf);

        assert!(r.is_ok());
        match oracle.last(CallKind::LegacySurface) {
            Some(OracleCall::LegacySurface(input)) => assert_eq!(input.tile_mode, TileMode::Tiled1DThin1),
            other => panic!("unexpected {:?}", other),
        }
        // HTILE on the depth level, no DCC
        assert_eq!(oracle.count(CallKind::LegacyHtile), 1);
        assert_eq!(oracle.count(CallKind::LegacyDcc), 0);
        assert_eq!(surf.cmask.size, 0);
    }

    #[test]
    fn test_linear_interop_pitch() {
        let info = fixtures::gfx6();
        let config = SurfaceConfig::new_2d(100, 10);
        let mut surf = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::empty());
        let (r, oracle) =
            run(&info, FakeOracle::new(GfxLevel::Gfx6), &config, SurfaceMode::LinearAligned, &mut surf);

        assert!(r.is_ok());
        match oracle.last(CallKind::LegacySurface) {
            // 256 bytes / 4 bytes per element
            Some(OracleCall::LegacySurface(input)) => assert_eq!(input.width, 128),
            other => panic!("unexpected {:?}", other),
        }
        assert!(surf.is_linear);
        assert!(surf.is_displayable);
        assert_eq!(surf.cmask.size, 0);
    }

    #[test]
    fn test_msaa_forces_2d_and_fmask() {
        let info = fixtures::gfx8();
        let config = SurfaceConfig::new_2d(128, 128).with_samples(4);
        let mut surf = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::empty());
        let (r, oracle) =
            run(&info, FakeOracle::new(GfxLevel::Gfx8), &config, SurfaceMode::LinearAligned, &mut surf);

        assert!(r.is_ok());
        assert_eq!(oracle.count(CallKind::LegacyFmask), 1);
        assert!(surf.fmask.size > 0);
        assert!(surf.cmask.size > 0);
        assert_eq!(surf.legacy().unwrap().levels[0].mode, SurfaceMode::Tiled2D);
    }

    #[test]
    fn test_depth_stencil_mipmapped_sets_no_stencil() {
        let info = fixtures::gfx8();
        let config = SurfaceConfig::new_2d(100, 100).with_levels(2);
        let mut surf = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::ZBUFFER | SurfaceFlags::SBUFFER);
        let (r, oracle) = run(&info, FakeOracle::new(GfxLevel::Gfx8), &config, SurfaceMode::Tiled2D, &mut surf);

        assert!(r.is_ok());
        let first = oracle.calls().into_iter().find(|c| c.kind() == CallKind::LegacySurface);
        match first {
            Some(OracleCall::LegacySurface(input)) => {
                assert!(input.flags.contains(LegacySurfaceFlags::MATCH_STENCIL_TILE_CFG));
                assert!(input.flags.contains(LegacySurfaceFlags::NO_STENCIL));
            }
            other => panic!("unexpected {:?}", other),
        }

        let layout = surf.legacy().unwrap();
        assert_eq!(layout.levels.len(), 2);
        assert_eq!(layout.stencil_levels.len(), 2);
        // 32-bit depth pitch 112, 8-bit stencil pitch 128
        assert_ne!(layout.levels[0].nblk_x, layout.stencil_levels[0].nblk_x);
        assert!(layout.stencil_adjusted);
        assert!(surf.has_stencil);
    }

    #[test]
    fn test_depth_stencil_matching_pitch_not_adjusted() {
        let info = fixtures::gfx8();
        let config = SurfaceConfig::new_2d(128, 128).with_levels(2);
        let mut surf = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::ZBUFFER | SurfaceFlags::SBUFFER);
        let (r, _) = run(&info, FakeOracle::new(GfxLevel::Gfx8), &config, SurfaceMode::Tiled2D, &mut surf);

        assert!(r.is_ok());
        let layout = surf.legacy().unwrap();
        assert_eq!(layout.levels[0].nblk_x, layout.stencil_levels[0].nblk_x);
        assert!(!layout.stencil_adjusted);
    }

    #[test]
    fn test_stencil_reuses_matched_tile_index() {
        let info = fixtures::gfx8();
        let config = SurfaceConfig::new_2d(64, 64).with_levels(2);
        let mut surf = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::ZBUFFER | SurfaceFlags::SBUFFER);
        let (r, oracle) = run(&info, FakeOracle::new(GfxLevel::Gfx8), &config, SurfaceMode::Tiled2D, &mut surf);

        assert!(r.is_ok());
        let stencil = oracle.calls().into_iter().find_map(|c| match c {
            OracleCall::LegacySurface(input) if input.flags.contains(LegacySurfaceFlags::STENCIL) => Some(input),
            _ => None,
        });
        let stencil = stencil.unwrap();
        assert_eq!(stencil.bpp, 8);
        assert_eq!(stencil.format, AddrFormat::R8);
        assert!(stencil.tile_index >= 0);
    }

    #[test]
    fn test_oracle_failure_propagates() {
        let info = fixtures::gfx8();
        let config = SurfaceConfig::new_2d(64, 64);
        let mut surf = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::empty());
        let oracle = FakeOracle::new(GfxLevel::Gfx8).failing_on(CallKind::LegacyDcc);
        let (r, _) = run(&info, oracle, &config, SurfaceMode::Tiled2D, &mut surf);
        assert_eq!(r, Err(Error::Oracle(OracleError::ERROR)));
    }

    #[test]
    fn test_tile_swizzle_draws_from_counter() {
        let info = fixtures::gfx8();
        let config = SurfaceConfig::new_2d(256, 256);
        let counter = AtomicSurfaceIndex::new(3);
        let fmask_counter = AtomicSurfaceIndex::new(0);
        let lib = AddrLib::new(&info, FakeOracle::new(GfxLevel::Gfx8));
        let ctx = LayoutContext::new(&lib, &info, SwizzleCounters::new(&counter, &fmask_counter));

        let mut surf = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::empty());
        Gfx6Strategy
            .compute(&ctx, &config, SurfaceMode::Tiled2D, &mut surf)
            .unwrap();
        assert_eq!(counter.get(), 4);
        // FakeOracle answers surf_index % 7 + 1
        assert_eq!(surf.tile_swizzle, 4);

        // Shareable surfaces keep a zero swizzle
        let mut shared = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::SHAREABLE);
        Gfx6Strategy
            .compute(&ctx, &config, SurfaceMode::Tiled2D, &mut shared)
            .unwrap();
        assert_eq!(shared.tile_swizzle, 0);
        assert_eq!(counter.get(), 4);
    }

    #[test]
    fn test_volume_picks_thick_mode() {
        let info = fixtures::gfx7();
        let config = SurfaceConfig::new_3d(64, 64, 64);
        let mut surf = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::empty());
        let (r, _) = run(&info, FakeOracle::new(GfxLevel::Gfx7), &config, SurfaceMode::Tiled2D, &mut surf);

        assert!(r.is_ok());
        assert!(surf.thick_tiling);
    }

    #[test]
    fn test_cik_macro_tile_index() {
        assert_eq!(cik_macro_tile_index(1024, 4), 2);
        assert_eq!(cik_macro_tile_index(64, 16), 0);
        assert_eq!(cik_macro_tile_index(4096, 16), 4);
    }
}
