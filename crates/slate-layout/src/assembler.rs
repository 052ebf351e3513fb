//! # Layout Assembler
//!
//! Entry point of the layout engine. Validates the image shape, runs the
//! strategy of the GPU's tiling generation and then packs the auxiliary
//! surfaces behind the main one:
//!
//! ```text
//! ┌────────────┬───────┬───────┬─────────────┬──────────┐
//! │  surface   │ FMASK │ CMASK │ display DCC │ DCC/HTILE│
//! └────────────┴───────┴───────┴─────────────┴──────────┘
//! ```
//!
//! GFX12 has no FMASK, CMASK or separate metadata surface. Depth/stencil
//! images there get HiZ and HiS appended instead.

use log::debug;

use slate_addr::AddressOracle;
use slate_core::math::align_u64;
use slate_core::{
    GfxLevel, Result, SurfaceConfig, SurfaceDescriptor, SurfaceFlags, SurfaceMode, TilingGeneration,
};

use crate::strategy::{LayoutContext, compute_for, get_display_flag};

/// Append one sub-allocation, returning its offset
fn place(total: &mut u64, alignment_log2: &mut u32, size: u64, align_log2: u32) -> u64 {
    let offset = align_u64(*total, 1u64 << align_log2);
    *total = offset + size;
    *alignment_log2 = (*alignment_log2).max(align_log2);
    offset
}

/// Compute the full layout of a surface
///
/// On success every size, offset and alignment in `surf` is final. On error
/// the descriptor must be discarded.
pub fn compute_surface<O: AddressOracle>(
    ctx: &LayoutContext<'_, O>,
    config: &SurfaceConfig,
    mut mode: SurfaceMode,
    surf: &mut SurfaceDescriptor,
) -> Result<()> {
    let info = ctx.info;

    debug!(
        "compute_surface: {:?} {}x{}x{} layers {} levels {} samples {} bpe {} flags {:?}",
        info.gfx_level,
        config.width,
        config.height,
        config.depth,
        config.array_size,
        config.levels,
        config.samples,
        surf.bpe,
        surf.flags
    );

    config.validate(surf.flags)?;

    // Images are emulated with buffers on compute-only parts
    if !info.has_image_opcodes && !surf.flags.contains(SurfaceFlags::VIDEO_REFERENCE) {
        mode = SurfaceMode::LinearAligned;
    }

    // A zero offset means the sub-allocation is absent
    surf.meta.offset = 0;
    surf.fmask.offset = 0;
    surf.cmask.offset = 0;
    surf.display_dcc_offset = 0;

    let generation = info.gfx_level.tiling();
    if let Err(e) = compute_for(generation, ctx, config, mode, surf) {
        debug!("compute_surface: {:?} layout failed: {:?}", generation, e);
        return Err(e);
    }

    surf.total_size = surf.surf_size;
    surf.alignment_log2 = surf.surf_alignment_log2;

    if generation == TilingGeneration::UnifiedV3 {
        place_hiz_his(surf);
    } else {
        place_color_aux(info.gfx_level, config, surf);
    }

    debug!(
        "compute_surface: total {} align 2^{} fmask @{} cmask @{} display dcc @{} meta @{}",
        surf.total_size,
        surf.alignment_log2,
        surf.fmask.offset,
        surf.cmask.offset,
        surf.display_dcc_offset,
        surf.meta.offset
    );
    Ok(())
}

fn place_hiz_his(surf: &mut SurfaceDescriptor) {
    if !surf.flags.is_depth_stencil() {
        return;
    }

    let mut total = surf.total_size;
    let mut surf_alignment_log2 = surf.surf_alignment_log2;
    if let Some(layout) = surf.unified_mut() {
        for hi in [&mut layout.zs.hiz, &mut layout.zs.his] {
            if hi.size != 0 {
                hi.offset = place(&mut total, &mut surf_alignment_log2, hi.size, hi.alignment_log2);
            }
        }
    }

    surf.total_size = total;
    surf.surf_alignment_log2 = surf_alignment_log2;
    surf.alignment_log2 = surf.alignment_log2.max(surf_alignment_log2);
}

fn place_color_aux(gfx: GfxLevel, config: &SurfaceConfig, surf: &mut SurfaceDescriptor) {
    let mut total = surf.total_size;
    let mut alignment_log2 = surf.alignment_log2;

    if surf.fmask.size != 0 {
        debug_assert!(config.samples >= 2);
        surf.fmask.offset = place(&mut total, &mut alignment_log2, surf.fmask.size, surf.fmask.alignment_log2);
    }

    // Single-sample CMASK lives in a separate buffer
    if surf.cmask.size != 0 && config.samples >= 2 {
        surf.cmask.offset = place(&mut total, &mut alignment_log2, surf.cmask.size, surf.cmask.alignment_log2);
    }

    if surf.is_displayable {
        surf.flags.insert(SurfaceFlags::SCANOUT);
    }

    // Legacy display surfaces have their DCC sized but never allocated
    if surf.meta.size != 0 && (gfx >= GfxLevel::Gfx9 || !get_display_flag(config, surf)) {
        let display = surf
            .unified()
            .filter(|_| gfx >= GfxLevel::Gfx9 && !surf.flags.is_depth_stencil())
            .map(|l| l.color)
            .filter(|c| c.dcc.display_equation_valid);

        // Displayable DCC goes right after the image
        if let Some(color) = display {
            surf.display_dcc_offset = place(
                &mut total,
                &mut alignment_log2,
                color.display_dcc.size,
                color.display_dcc.alignment_log2,
            );
        }

        surf.meta.offset = place(&mut total, &mut alignment_log2, surf.meta.size, surf.meta.alignment_log2);
    }

    surf.total_size = total;
    surf.alignment_log2 = alignment_log2;
}
