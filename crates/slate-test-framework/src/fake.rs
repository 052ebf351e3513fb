//! # Fake Address Oracle
//!
//! A deterministic oracle implementing every generation's trait.
//!
//! Geometry follows a few simple rules instead of real hardware math:
//! pitches are aligned to a per-element-size granule, tiled heights to 8
//! rows, swizzle blocks are square-ish power-of-two footprints of the
//! block byte size, and metadata sizes scale with the pixel count. No level
//! ever lands in a mip tail.
//!
//! Every call is recorded so tests can check what the layout code prepared,
//! and a single call kind can be made to fail.

use arrayvec::ArrayVec;
use spin::Mutex;

use slate_addr::gfx12::{
    Gfx12AddrFromCoordInput, Gfx12MipInfo, Gfx12NbcViewInput, Gfx12PossibleModesInput,
    Gfx12SurfaceFlags, Gfx12SurfaceInput, Gfx12SurfaceOutput, Gfx12ValidModes,
};
use slate_addr::gfx9::{
    Gfx9AddrFromCoordInput, Gfx9CmaskInput, Gfx9CmaskOutput, Gfx9DccInput, Gfx9DccOutput,
    Gfx9FmaskInput, Gfx9FmaskOutput, Gfx9HtileInput, Gfx9HtileOutput, Gfx9MipInfo,
    Gfx9NbcViewInput, Gfx9PipeBankXorInput, Gfx9SurfaceFlags, Gfx9SurfaceInput, Gfx9SurfaceOutput,
    MetaMipInfo, PreferredSettingInput, PreferredSwizzleSet,
};
use slate_addr::legacy::{
    BaseSwizzleInput, LegacyDccInput, LegacyDccOutput, LegacyFmaskInput, LegacyFmaskOutput,
    LegacyHtileInput, LegacyHtileOutput, LegacySurfaceFlags, LegacySurfaceInput,
    LegacySurfaceOutput, TileInfo,
};
use slate_addr::{Gfx12Oracle, Gfx9Oracle, LegacyOracle, NbcView};
use slate_core::format::AddrFormat;
use slate_core::math::{align_u32, align_u64, log2, minify};
use slate_core::surface::MAX_LEVELS;
use slate_core::swizzle::{MicroTileMode, ResourceType, SwizzleMode, TileMode, gfx12_block_extent};
use slate_core::{Extent3d, GfxLevel, OracleError, Result};

/// Calls kept by the recorder; later calls are still served
pub const MAX_RECORDED_CALLS: usize = 128;

/// Macro tile parameters returned when the caller forces none
pub const DEFAULT_TILE_INFO: TileInfo = TileInfo {
    banks: 8,
    bank_width: 1,
    bank_height: 1,
    macro_aspect_ratio: 1,
    tile_split_bytes: 1024,
    pipe_config: 1,
};

// =============================================================================
// CALL RECORDING
// =============================================================================

/// Oracle entry point, used to count calls and inject failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum CallKind {
    LegacySurface,
    LegacyDcc,
    LegacyHtile,
    LegacyFmask,
    BaseSwizzle,
    MacroModeIndex,
    Gfx9Surface,
    PreferredSetting,
    Gfx9Dcc,
    Gfx9Cmask,
    Gfx9Htile,
    Gfx9Fmask,
    Gfx9PipeBankXor,
    DisplaySwizzle,
    Gfx9AddrFromCoord,
    Gfx9NbcView,
    Gfx12Surface,
    PossibleModes,
    Gfx12PipeBankXor,
    Gfx12AddrFromCoord,
    Gfx12NbcView,
}

/// A recorded oracle call with its input
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum OracleCall {
    LegacySurface(LegacySurfaceInput),
    LegacyDcc(LegacyDccInput),
    LegacyHtile(LegacyHtileInput),
    LegacyFmask(LegacyFmaskInput),
    BaseSwizzle(BaseSwizzleInput),
    MacroModeIndex { tile_index: u32, bpp: u32, num_frags: u32 },
    Gfx9Surface(Gfx9SurfaceInput),
    PreferredSetting(PreferredSettingInput),
    Gfx9Dcc(Gfx9DccInput),
    Gfx9Cmask(Gfx9CmaskInput),
    Gfx9Htile(Gfx9HtileInput),
    Gfx9Fmask(Gfx9FmaskInput),
    Gfx9PipeBankXor(Gfx9PipeBankXorInput),
    DisplaySwizzle { swizzle_mode: SwizzleMode, bpp: u32 },
    Gfx9AddrFromCoord(Gfx9AddrFromCoordInput),
    Gfx9NbcView(Gfx9NbcViewInput),
    Gfx12Surface(Gfx12SurfaceInput),
    PossibleModes(Gfx12PossibleModesInput),
    Gfx12PipeBankXor { surf_index: u32, swizzle_mode: SwizzleMode },
    Gfx12AddrFromCoord(Gfx12AddrFromCoordInput),
    Gfx12NbcView(Gfx12NbcViewInput),
}

impl OracleCall {
    /// Entry point of the call
    pub const fn kind(&self) -> CallKind {
        match self {
            OracleCall::LegacySurface(_) => CallKind::LegacySurface,
            OracleCall::LegacyDcc(_) => CallKind::LegacyDcc,
            OracleCall::LegacyHtile(_) => CallKind::LegacyHtile,
            OracleCall::LegacyFmask(_) => CallKind::LegacyFmask,
            OracleCall::BaseSwizzle(_) => CallKind::BaseSwizzle,
            OracleCall::MacroModeIndex { .. } => CallKind::MacroModeIndex,
            OracleCall::Gfx9Surface(_) => CallKind::Gfx9Surface,
            OracleCall::PreferredSetting(_) => CallKind::PreferredSetting,
            OracleCall::Gfx9Dcc(_) => CallKind::Gfx9Dcc,
            OracleCall::Gfx9Cmask(_) => CallKind::Gfx9Cmask,
            OracleCall::Gfx9Htile(_) => CallKind::Gfx9Htile,
            OracleCall::Gfx9Fmask(_) => CallKind::Gfx9Fmask,
            OracleCall::Gfx9PipeBankXor(_) => CallKind::Gfx9PipeBankXor,
            OracleCall::DisplaySwizzle { .. } => CallKind::DisplaySwizzle,
            OracleCall::Gfx9AddrFromCoord(_) => CallKind::Gfx9AddrFromCoord,
            OracleCall::Gfx9NbcView(_) => CallKind::Gfx9NbcView,
            OracleCall::Gfx12Surface(_) => CallKind::Gfx12Surface,
            OracleCall::PossibleModes(_) => CallKind::PossibleModes,
            OracleCall::Gfx12PipeBankXor { .. } => CallKind::Gfx12PipeBankXor,
            OracleCall::Gfx12AddrFromCoord(_) => CallKind::Gfx12AddrFromCoord,
            OracleCall::Gfx12NbcView(_) => CallKind::Gfx12NbcView,
        }
    }
}

// =============================================================================
// FAKE ORACLE
// =============================================================================

/// Deterministic oracle for unit tests
pub struct FakeOracle {
    gfx_level: GfxLevel,
    calls: Mutex<ArrayVec<OracleCall, MAX_RECORDED_CALLS>>,
    failing: Option<CallKind>,
    preferred: Option<SwizzleMode>,
    gfx12_modes: Option<Gfx12ValidModes>,
    display_capable: bool,
}

impl FakeOracle {
    /// Create an oracle answering like a device of generation `gfx_level`
    pub const fn new(gfx_level: GfxLevel) -> Self {
        Self {
            gfx_level,
            calls: Mutex::new(ArrayVec::new_const()),
            failing: None,
            preferred: None,
            gfx12_modes: None,
            display_capable: true,
        }
    }

    /// Fail every call of one kind with [`OracleError::ERROR`]
    pub fn failing_on(mut self, kind: CallKind) -> Self {
        self.failing = Some(kind);
        self
    }

    /// Answer every preferred-setting query with `mode`
    pub fn with_preferred_swizzle(mut self, mode: SwizzleMode) -> Self {
        self.preferred = Some(mode);
        self
    }

    /// Answer every possible-modes query with `modes`
    pub fn with_gfx12_modes(mut self, modes: Gfx12ValidModes) -> Self {
        self.gfx12_modes = Some(modes);
        self
    }

    /// Report every swizzle mode as unusable for scanout
    pub fn without_display_support(mut self) -> Self {
        self.display_capable = false;
        self
    }

    /// Recorded calls, oldest first
    pub fn calls(&self) -> ArrayVec<OracleCall, MAX_RECORDED_CALLS> {
        self.calls.lock().clone()
    }

    /// Number of recorded calls of one kind
    pub fn count(&self, kind: CallKind) -> usize {
        self.calls.lock().iter().filter(|c| c.kind() == kind).count()
    }

    /// Most recent call of one kind
    pub fn last(&self, kind: CallKind) -> Option<OracleCall> {
        self.calls.lock().iter().rev().find(|c| c.kind() == kind).cloned()
    }

    /// Forget recorded calls
    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, call: OracleCall) -> Result<()> {
        let kind = call.kind();
        let _ = self.calls.lock().try_push(call);

        if self.failing == Some(kind) {
            return Err(OracleError::ERROR.into());
        }
        Ok(())
    }
}

impl core::fmt::Debug for FakeOracle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FakeOracle")
            .field("gfx_level", &self.gfx_level)
            .field("recorded", &self.calls.lock().len())
            .field("failing", &self.failing)
            .finish()
    }
}

// =============================================================================
// SHAPE HELPERS
// =============================================================================

/// Block footprint and bytes per element of a format code
fn format_shape(format: AddrFormat, bpp: u32) -> (u32, u32, u32) {
    match format {
        AddrFormat::Bc1 => (4, 4, 8),
        AddrFormat::Bc3 => (4, 4, 16),
        AddrFormat::Astc5x4 => (5, 4, 16),
        AddrFormat::Astc5x5 => (5, 5, 16),
        AddrFormat::Astc6x5 => (6, 5, 16),
        AddrFormat::Astc6x6 => (6, 6, 16),
        AddrFormat::Astc8x5 => (8, 5, 16),
        AddrFormat::Astc8x6 => (8, 6, 16),
        AddrFormat::Astc8x8 => (8, 8, 16),
        AddrFormat::Astc10x5 => (10, 5, 16),
        AddrFormat::Astc10x6 => (10, 6, 16),
        AddrFormat::Astc10x8 => (10, 8, 16),
        AddrFormat::Astc10x10 => (10, 10, 16),
        AddrFormat::Astc12x10 => (12, 10, 16),
        AddrFormat::Astc12x12 => (12, 12, 16),
        _ => (1, 1, (bpp / 8).max(1)),
    }
}

fn default_tile_index(mode: TileMode, flags: LegacySurfaceFlags) -> i32 {
    let depth = flags.intersects(LegacySurfaceFlags::DEPTH | LegacySurfaceFlags::STENCIL);
    match mode {
        TileMode::LinearGeneral | TileMode::LinearAligned => 8,
        TileMode::Tiled1DThin1 | TileMode::PrtTiledThin1 if depth => 4,
        TileMode::Tiled1DThin1 | TileMode::PrtTiledThin1 => 13,
        m if m.is_thick() => 20,
        _ if depth => 0,
        _ => 14,
    }
}

fn fmask_bytes_per_pixel(num_samples: u32) -> u32 {
    match num_samples {
        0..=4 => 1,
        8 => 4,
        _ => 8,
    }
}

/// Swizzle block of a GFX9-11 mode in elements
fn unified_block(mode: SwizzleMode, resource_type: ResourceType, bytes: u32, samples: u32) -> Extent3d {
    if mode.is_linear() {
        return Extent3d::new(256 >> log2(bytes), 1, 1);
    }

    let log_elems = mode
        .block_size_log2()
        .saturating_sub(log2(bytes) + log2(samples.max(1)));
    let thick = resource_type == ResourceType::Tex3D && mode.micro_tile_mode() != MicroTileMode::Display;

    if thick {
        let d = log_elems / 3;
        let w = (log_elems - d).div_ceil(2);
        Extent3d::new(1 << w, 1 << (log_elems - d - w), 1 << d)
    } else {
        let w = log_elems.div_ceil(2);
        Extent3d::new(1 << w, 1 << (log_elems - w), 1)
    }
}

/// Per-level placement of a metadata surface scaling with pixel count
///
/// `scale` is `(numerator, denominator)` bytes per pixel. Returns the total
/// size aligned to `align`, the level 0 slice size and the level records.
fn meta_chain(
    width: u32,
    height: u32,
    slices: u32,
    levels: u32,
    scale: (u64, u64),
    align: u64,
) -> (u64, u64, ArrayVec<MetaMipInfo, MAX_LEVELS>) {
    let (num, den) = scale;
    let mut mip_info = ArrayVec::new();
    let mut offset = 0u64;
    let mut first_slice = 0u64;

    for level in 0..levels.clamp(1, MAX_LEVELS as u32) {
        let pixels = minify(width, level) as u64 * minify(height, level) as u64;
        let slice_size = align_u64((pixels * num).div_ceil(den), 256);
        if level == 0 {
            first_slice = slice_size;
        }
        mip_info.push(MetaMipInfo {
            offset,
            slice_size,
            in_miptail: false,
        });
        offset += slice_size * slices.max(1) as u64;
    }

    (align_u64(offset, align), first_slice, mip_info)
}

struct Chain<M> {
    levels: ArrayVec<M, MAX_LEVELS>,
    size: u64,
    slice_size: u64,
}

/// Level-major mip chain shared by both unified surface queries
#[allow(clippy::too_many_arguments)]
fn mip_chain<M>(
    width: u32,
    height: u32,
    slices: u32,
    levels: u32,
    is_3d: bool,
    block: Extent3d,
    bytes_per_pixel: u64,
    base_align: u64,
    make: impl Fn(u32, u32, u32, u64) -> M,
) -> Chain<M> {
    let mut chain = Chain {
        levels: ArrayVec::new(),
        size: 0,
        slice_size: 0,
    };
    let mut offset = 0u64;

    for level in 0..levels.clamp(1, MAX_LEVELS as u32) {
        let pitch = align_u32(minify(width, level), block.width);
        let rows = align_u32(minify(height, level), block.height);
        let depth = if is_3d {
            align_u32(minify(slices, level), block.depth)
        } else {
            align_u32(slices.max(1), block.depth)
        };
        let plane = pitch as u64 * rows as u64 * bytes_per_pixel;
        if level == 0 {
            chain.slice_size = plane;
        }

        offset = align_u64(offset, base_align);
        chain.levels.push(make(pitch, rows, depth, offset));
        offset += plane * depth as u64;
    }

    chain.size = align_u64(offset, base_align);
    chain
}

// =============================================================================
// LEGACY
// =============================================================================

impl LegacyOracle for FakeOracle {
    fn compute_surface_info(&self, input: &LegacySurfaceInput) -> Result<LegacySurfaceOutput> {
        self.record(OracleCall::LegacySurface(*input))?;

        let (blk_w, blk_h, bytes) = format_shape(input.format, input.bpp);
        let tiled = input.tile_mode >= TileMode::Tiled1DThin1;
        let pitch_align = (512 / (bytes * 8)).max(8);
        let height_align = if tiled { 8 } else { 1 };
        let depth_align = if input.tile_mode.is_thick() { 4 } else { 1 };

        let pitch = align_u32(input.width.div_ceil(blk_w), pitch_align);
        let height = align_u32(input.height.div_ceil(blk_h), height_align);
        let depth = align_u32(input.num_slices.max(1), depth_align);
        let slice_size =
            pitch as u64 * height as u64 * bytes as u64 * input.num_samples.max(1) as u64;

        let tile_index = if input.tile_index >= 0 {
            input.tile_index
        } else {
            default_tile_index(input.tile_mode, input.flags)
        };
        let macro_tiled = input.tile_mode.is_macro_tiled();
        let match_stencil = input
            .flags
            .contains(LegacySurfaceFlags::MATCH_STENCIL_TILE_CFG);

        Ok(LegacySurfaceOutput {
            pitch,
            height,
            depth,
            surf_size: slice_size * depth as u64,
            slice_size,
            base_align: if macro_tiled { 4096 } else { 256 },
            pitch_align,
            height_align,
            depth_align,
            tile_mode: input.tile_mode,
            tile_index,
            macro_mode_index: if macro_tiled { tile_index % 16 } else { -1 },
            tile_info: input.tile_info.unwrap_or(DEFAULT_TILE_INFO),
            tc_compatible: input.flags.contains(LegacySurfaceFlags::TC_COMPATIBLE),
            stencil_tile_idx: if match_stencil { tile_index } else { -1 },
        })
    }

    fn compute_dcc_info(&self, input: &LegacyDccInput) -> Result<LegacyDccOutput> {
        self.record(OracleCall::LegacyDcc(*input))?;

        // One byte per 256-byte block, whole 64 KiB units are contiguous
        let blocks = input.color_surf_size >> 8;
        let aligned = blocks % 256 == 0;

        Ok(LegacyDccOutput {
            dcc_ram_size: align_u64(blocks, 256),
            dcc_ram_base_align: 256,
            dcc_ram_size_aligned: aligned,
            dcc_fast_clear_size: blocks,
            sub_lvl_compressible: aligned,
        })
    }

    fn compute_htile_info(&self, input: &LegacyHtileInput) -> Result<LegacyHtileOutput> {
        self.record(OracleCall::LegacyHtile(*input))?;

        let tiles = (input.pitch / input.block_width.max(1)).max(1) as u64
            * (input.height / input.block_height.max(1)).max(1) as u64;
        let slice_size = align_u64(tiles * 4, 2048);

        Ok(LegacyHtileOutput {
            htile_bytes: slice_size * input.num_slices.max(1) as u64,
            slice_size,
            base_align: 2048,
            pitch: input.pitch,
        })
    }

    fn compute_fmask_info(&self, input: &LegacyFmaskInput) -> Result<LegacyFmaskOutput> {
        self.record(OracleCall::LegacyFmask(*input))?;

        let pitch = align_u32(input.pitch.max(1), 8);
        let height = align_u32(input.height.max(1), 8);
        let slice_size =
            pitch as u64 * height as u64 * fmask_bytes_per_pixel(input.num_samples) as u64;

        Ok(LegacyFmaskOutput {
            pitch,
            height,
            fmask_bytes: slice_size * input.num_slices.max(1) as u64,
            slice_size,
            base_align: 4096,
            tile_index: 14,
            macro_mode_index: 0,
            tile_info: DEFAULT_TILE_INFO,
        })
    }

    fn compute_base_swizzle(&self, input: &BaseSwizzleInput) -> Result<u32> {
        self.record(OracleCall::BaseSwizzle(*input))?;
        Ok(input.surf_index % 7 + 1)
    }

    fn get_macro_mode_index(&self, tile_index: u32, bpp: u32, num_frags: u32) -> Result<u32> {
        self.record(OracleCall::MacroModeIndex {
            tile_index,
            bpp,
            num_frags,
        })?;
        Ok((tile_index + log2(bpp.max(8) / 8)) % 16)
    }
}

// =============================================================================
// GFX9-11
// =============================================================================

impl Gfx9Oracle for FakeOracle {
    fn compute_surface_info(&self, input: &Gfx9SurfaceInput) -> Result<Gfx9SurfaceOutput> {
        self.record(OracleCall::Gfx9Surface(*input))?;

        let (blk_w, blk_h, bytes) = format_shape(input.format, input.bpp);
        let samples = input.num_samples.max(1);
        let block = unified_block(input.swizzle_mode, input.resource_type, bytes, samples);
        let base_align = 1u64 << input.swizzle_mode.block_size_log2().max(8);
        let height = if input.resource_type == ResourceType::Tex1D {
            1
        } else {
            input.height.div_ceil(blk_h)
        };

        let chain = mip_chain(
            input.width.div_ceil(blk_w),
            height,
            input.num_slices,
            input.num_mip_levels,
            input.resource_type == ResourceType::Tex3D,
            block,
            bytes as u64 * samples as u64,
            base_align,
            |pitch, height, depth, offset| Gfx9MipInfo {
                pitch,
                height,
                depth,
                offset,
                macro_block_offset: offset,
                mip_tail_offset: 0,
            },
        );
        let first = chain.levels.first().copied().unwrap_or_default();

        Ok(Gfx9SurfaceOutput {
            pitch: first.pitch,
            height: first.height,
            pixel_pitch: first.pitch * blk_w,
            mip_chain_pitch: first.pitch,
            mip_chain_height: first.height,
            surf_size: chain.size,
            slice_size: chain.slice_size,
            base_align: base_align as u32,
            block_width: block.width,
            block_height: block.height,
            block_slices: block.depth,
            epitch_is_height: false,
            mip_chain_in_tail: false,
            first_mip_id_in_tail: input.num_mip_levels.max(1),
            mip_info: chain.levels,
        })
    }

    fn get_preferred_surface_setting(&self, input: &PreferredSettingInput) -> Result<SwizzleMode> {
        self.record(OracleCall::PreferredSetting(*input))?;

        if let Some(mode) = self.preferred {
            return Ok(mode);
        }

        let small = input
            .forbidden
            .contains(slate_addr::gfx9::ForbiddenBlocks::MACRO_THIN_64KB);
        let pick = |large: SwizzleMode, small_mode: SwizzleMode| if small { small_mode } else { large };
        let unified_v2 = self.gfx_level >= GfxLevel::Gfx10;

        let mode = if input
            .flags
            .intersects(Gfx9SurfaceFlags::DEPTH | Gfx9SurfaceFlags::STENCIL | Gfx9SurfaceFlags::FMASK)
            || input.preferred.contains(PreferredSwizzleSet::Z)
        {
            pick(SwizzleMode::SW_64KB_Z_X, SwizzleMode::SW_4KB_Z_X)
        } else if input.preferred.contains(PreferredSwizzleSet::S) {
            pick(SwizzleMode::SW_64KB_S_X, SwizzleMode::SW_4KB_S_X)
        } else if input.preferred.contains(PreferredSwizzleSet::D) {
            pick(SwizzleMode::SW_64KB_D_X, SwizzleMode::SW_4KB_D_X)
        } else if input.preferred.contains(PreferredSwizzleSet::R) || unified_v2 {
            pick(SwizzleMode::SW_64KB_R_X, SwizzleMode::SW_4KB_R_X)
        } else if input.flags.contains(Gfx9SurfaceFlags::DISPLAY) {
            pick(SwizzleMode::SW_64KB_D_X, SwizzleMode::SW_4KB_D_X)
        } else {
            pick(SwizzleMode::SW_64KB_S_X, SwizzleMode::SW_4KB_S_X)
        };
        Ok(mode)
    }

    fn compute_dcc_info(&self, input: &Gfx9DccInput) -> Result<Gfx9DccOutput> {
        self.record(OracleCall::Gfx9Dcc(*input))?;

        let bytes = (input.bpp / 8).max(1) as u64 * input.num_frags.max(1) as u64;
        let align = if input.key.pipe_aligned || input.key.rb_aligned {
            4096
        } else {
            256
        };
        let (size, slice_size, mip_info) = meta_chain(
            input.width,
            input.height,
            input.num_slices,
            input.num_mip_levels,
            (bytes, 256),
            align,
        );

        Ok(Gfx9DccOutput {
            pitch: align_u32(input.width, 256),
            height: align_u32(input.height, 256),
            compress_blk_width: 8,
            compress_blk_height: 8,
            compress_blk_depth: 1,
            meta_blk_width: 256,
            meta_blk_height: 256,
            meta_blk_depth: if input.resource_type == ResourceType::Tex3D { 4 } else { 1 },
            dcc_ram_size: size,
            dcc_ram_slice_size: slice_size,
            dcc_ram_base_align: align as u32,
            mip_info,
        })
    }

    fn compute_cmask_info(&self, input: &Gfx9CmaskInput) -> Result<Gfx9CmaskOutput> {
        self.record(OracleCall::Gfx9Cmask(*input))?;

        // Four bits per 8x8 tile
        let (size, slice_size, mip_info) = meta_chain(
            input.width,
            input.height,
            input.num_slices,
            input.num_mip_levels,
            (1, 128),
            4096,
        );

        Ok(Gfx9CmaskOutput {
            pitch: align_u32(input.width, 64),
            height: align_u32(input.height, 64),
            cmask_bytes: size,
            slice_size,
            base_align: 4096,
            mip_info,
        })
    }

    fn compute_htile_info(&self, input: &Gfx9HtileInput) -> Result<Gfx9HtileOutput> {
        self.record(OracleCall::Gfx9Htile(*input))?;

        // Four bytes per 8x8 tile
        let (size, slice_size, mip_info) = meta_chain(
            input.width,
            input.height,
            input.num_slices,
            input.num_mip_levels,
            (1, 16),
            4096,
        );

        Ok(Gfx9HtileOutput {
            pitch: align_u32(input.width, 64),
            height: align_u32(input.height, 64),
            htile_bytes: size,
            slice_size,
            base_align: 4096,
            mip_info,
        })
    }

    fn compute_fmask_info(&self, input: &Gfx9FmaskInput) -> Result<Gfx9FmaskOutput> {
        self.record(OracleCall::Gfx9Fmask(*input))?;

        let bytes = fmask_bytes_per_pixel(input.num_samples);
        let block = unified_block(input.swizzle_mode, ResourceType::Tex2D, bytes, 1);
        let pitch = align_u32(input.width, block.width);
        let height = align_u32(input.height, block.height);
        let slice_size = pitch as u64 * height as u64 * bytes as u64;

        Ok(Gfx9FmaskOutput {
            pitch,
            height,
            fmask_bytes: slice_size * input.num_slices.max(1) as u64,
            slice_size,
            base_align: 1 << input.swizzle_mode.block_size_log2().max(8),
        })
    }

    fn compute_pipe_bank_xor(&self, input: &Gfx9PipeBankXorInput) -> Result<u32> {
        self.record(OracleCall::Gfx9PipeBankXor(*input))?;
        Ok(input.surf_index % 8 + 1)
    }

    fn is_valid_display_swizzle_mode(&self, swizzle_mode: SwizzleMode, bpp: u32) -> Result<bool> {
        self.record(OracleCall::DisplaySwizzle { swizzle_mode, bpp })?;
        Ok(self.display_capable
            && (swizzle_mode.is_linear()
                || matches!(
                    swizzle_mode.micro_tile_mode(),
                    MicroTileMode::Display | MicroTileMode::Render
                )))
    }

    fn addr_from_coord(&self, input: &Gfx9AddrFromCoordInput) -> Result<u64> {
        self.record(OracleCall::Gfx9AddrFromCoord(*input))?;

        let bytes = (input.bpp / 8).max(1) as u64;
        let pitch = align_u32(minify(input.width, input.mip_id), 8) as u64;
        let rows = align_u32(minify(input.height, input.mip_id), 8) as u64;
        let texel = (input.slice as u64 * rows + input.y as u64) * pitch + input.x as u64;

        Ok(input.mip_id as u64 * 65536 + texel * bytes + ((input.pipe_bank_xor as u64) << 8))
    }

    fn nbc_view(&self, input: &Gfx9NbcViewInput) -> Result<NbcView> {
        self.record(OracleCall::Gfx9NbcView(*input))?;

        let (blk_w, blk_h, _) = format_shape(input.format, 0);
        Ok(NbcView {
            offset: input.mip_id as u64 * 65536 + input.slice as u64 * 4096,
            pipe_bank_xor: input.pipe_bank_xor,
            width: minify(input.width, input.mip_id).div_ceil(blk_w),
            height: minify(input.height, input.mip_id).div_ceil(blk_h),
            num_levels: 1,
            level: 0,
        })
    }
}

// =============================================================================
// GFX12
// =============================================================================

impl Gfx12Oracle for FakeOracle {
    fn compute_surface_info(&self, input: &Gfx12SurfaceInput) -> Result<Gfx12SurfaceOutput> {
        self.record(OracleCall::Gfx12Surface(*input))?;

        let (blk_w, blk_h, bytes) = format_shape(input.format, input.bpp);
        let samples = input.num_samples.max(1);
        let mode = input.swizzle_mode;
        let mut block = if mode.is_linear() {
            Extent3d::new(256 >> log2(bytes), 1, 1)
        } else {
            gfx12_block_extent(mode, log2(bytes).min(4) as usize, log2(samples).min(3) as usize)
        };
        if mode.is_linear() && input.pitch_in_element != 0 {
            block.width = 1;
        }
        let base_align = 1u64 << mode.gfx12_block_size_log2().max(8);
        let width = input.width.div_ceil(blk_w).max(input.pitch_in_element);
        let height = if input.resource_type == ResourceType::Tex1D {
            1
        } else {
            input.height.div_ceil(blk_h)
        };

        let chain = mip_chain(
            width,
            height,
            input.num_slices,
            input.num_mip_levels,
            input.resource_type == ResourceType::Tex3D,
            block,
            bytes as u64 * samples as u64,
            base_align,
            |pitch, height, depth, offset| Gfx12MipInfo {
                pitch,
                height,
                depth,
                offset,
                macro_block_offset: offset,
                mip_tail_offset: 0,
            },
        );
        let first = chain.levels.first().copied().unwrap_or_default();

        Ok(Gfx12SurfaceOutput {
            pitch: first.pitch,
            height: first.height,
            pixel_pitch: first.pitch * blk_w,
            surf_size: chain.size,
            slice_size: chain.slice_size,
            base_align: base_align as u32,
            block_extent: block,
            mip_chain_in_tail: false,
            first_mip_id_in_tail: input.num_mip_levels.max(1),
            mip_info: chain.levels,
        })
    }

    fn get_possible_swizzle_modes(&self, input: &Gfx12PossibleModesInput) -> Result<Gfx12ValidModes> {
        self.record(OracleCall::PossibleModes(*input))?;

        if let Some(modes) = self.gfx12_modes {
            return Ok(modes);
        }

        let mut modes = Gfx12ValidModes::SW_2D_256B
            | Gfx12ValidModes::SW_2D_4KB
            | Gfx12ValidModes::SW_2D_64KB
            | Gfx12ValidModes::SW_2D_256KB;
        let zs = Gfx12SurfaceFlags::DEPTH | Gfx12SurfaceFlags::STENCIL | Gfx12SurfaceFlags::HIZ_HIS;
        if !input.flags.intersects(zs) {
            modes |= Gfx12ValidModes::LINEAR;
            if input.resource_type == ResourceType::Tex3D {
                modes |= Gfx12ValidModes::SW_3D_4KB
                    | Gfx12ValidModes::SW_3D_64KB
                    | Gfx12ValidModes::SW_3D_256KB;
            }
        }

        if input.max_align != 0 {
            for raw in 1..8u8 {
                let mode = SwizzleMode::from_raw(raw);
                if (1u64 << mode.gfx12_block_size_log2()) > input.max_align as u64 {
                    modes.remove(Gfx12ValidModes::of(mode));
                }
            }
        }
        Ok(modes)
    }

    fn compute_pipe_bank_xor(&self, surf_index: u32, swizzle_mode: SwizzleMode) -> Result<u32> {
        self.record(OracleCall::Gfx12PipeBankXor {
            surf_index,
            swizzle_mode,
        })?;

        // Linear and 256 B blocks have no bits to XOR
        if swizzle_mode.gfx12_block_size_log2() <= 8 {
            Ok(0)
        } else {
            Ok(surf_index % 8 + 1)
        }
    }

    fn addr_from_coord(&self, input: &Gfx12AddrFromCoordInput) -> Result<u64> {
        self.record(OracleCall::Gfx12AddrFromCoord(*input))?;

        let bytes = (input.bpp / 8).max(1) as u64;
        let pitch = if input.pitch_in_element != 0 {
            input.pitch_in_element as u64
        } else {
            align_u32(minify(input.unaligned_dims.width, input.mip_id), 8) as u64
        };
        let rows = align_u32(minify(input.unaligned_dims.height, input.mip_id), 8) as u64;
        let texel = (input.slice as u64 * rows + input.y as u64) * pitch + input.x as u64;

        Ok(input.mip_id as u64 * 65536 + texel * bytes)
    }

    fn nbc_view(&self, input: &Gfx12NbcViewInput) -> Result<NbcView> {
        self.record(OracleCall::Gfx12NbcView(*input))?;

        let (blk_w, blk_h, _) = format_shape(input.format, 0);
        Ok(NbcView {
            offset: input.mip_id as u64 * 65536 + input.slice as u64 * 4096,
            pipe_bank_xor: input.pipe_bank_xor,
            width: minify(input.unaligned_dims.width, input.mip_id).div_ceil(blk_w),
            height: minify(input.unaligned_dims.height, input.mip_id).div_ceil(blk_h),
            num_levels: 1,
            level: 0,
        })
    }
}

static_assertions::assert_impl_all!(FakeOracle: Send, Sync);
