//! Human-readable dump of a computed layout.

use core::fmt::{self, Write};

use slate_core::surface::{HiSurface, LegacyLayout, UnifiedLayout};
use slate_core::{GfxLevel, GpuInfo, SurfaceDescriptor, SurfaceFlags, SurfaceLayout};

/// Write one line per allocated component of `surf`
pub fn print_info(out: &mut impl Write, info: &GpuInfo, surf: &SurfaceDescriptor) -> fmt::Result {
    match (&surf.layout, info.gfx_level >= GfxLevel::Gfx9) {
        (SurfaceLayout::Unified(layout), true) => print_unified(out, info, surf, layout),
        (SurfaceLayout::Legacy(layout), false) => print_legacy(out, surf, layout),
        _ => writeln!(out, "    Surf: layout does not match {:?}", info.gfx_level),
    }
}

fn print_unified(out: &mut impl Write, info: &GpuInfo, surf: &SurfaceDescriptor, layout: &UnifiedLayout) -> fmt::Result {
    writeln!(
        out,
        "    Surf: size={}, slice_size={}, alignment={}, swmode={}, tile_swizzle={}, epitch={}, pitch={}, \
         blk_w={}, blk_h={}, bpe={}, flags={:#x}",
        surf.surf_size,
        layout.surf_slice_size,
        1u64 << surf.surf_alignment_log2,
        layout.swizzle_mode.raw(),
        surf.tile_swizzle,
        layout.epitch,
        layout.surf_pitch,
        surf.blk_w,
        surf.blk_h,
        surf.bpe,
        surf.flags.bits()
    )?;

    if surf.fmask.offset != 0 {
        writeln!(
            out,
            "    FMask: offset={}, size={}, alignment={}, swmode={}, epitch={}",
            surf.fmask.offset,
            surf.fmask.size,
            surf.fmask.alignment(),
            layout.color.fmask_swizzle_mode.raw(),
            layout.color.fmask_epitch
        )?;
    }

    if surf.cmask.offset != 0 {
        writeln!(
            out,
            "    CMask: offset={}, size={}, alignment={}",
            surf.cmask.offset,
            surf.cmask.size,
            surf.cmask.alignment()
        )?;
    }

    let zs = surf.flags.intersects(SurfaceFlags::Z_OR_SBUFFER);
    if surf.meta.offset != 0 {
        if zs {
            writeln!(
                out,
                "    HTile: offset={}, size={}, alignment={}",
                surf.meta.offset,
                surf.meta.size,
                surf.meta.alignment()
            )?;
        } else {
            writeln!(
                out,
                "    DCC: offset={}, size={}, alignment={}, pitch_max={}, num_dcc_levels={}",
                surf.meta.offset,
                surf.meta.size,
                surf.meta.alignment(),
                layout.color.display_dcc.pitch_max,
                surf.num_meta_levels
            )?;
        }
    }

    if surf.has_stencil {
        writeln!(
            out,
            "    Stencil: offset={}, swmode={}, epitch={}",
            layout.zs.stencil_offset,
            layout.zs.stencil_swizzle_mode.raw(),
            layout.zs.stencil_epitch
        )?;
    }

    if info.gfx_level >= GfxLevel::Gfx12 {
        print_hi_surface(out, "HiZ", &layout.zs.hiz)?;
        print_hi_surface(out, "HiS", &layout.zs.his)?;
    }
    Ok(())
}

fn print_hi_surface(out: &mut impl Write, name: &str, hi: &HiSurface) -> fmt::Result {
    if hi.size == 0 {
        return Ok(());
    }
    writeln!(
        out,
        "    {}: offset={}, size={}, swmode={}, width_in_tiles={}, height_in_tiles={}",
        name,
        hi.offset,
        hi.size,
        hi.swizzle_mode.raw(),
        hi.width_in_tiles,
        hi.height_in_tiles
    )
}

fn print_legacy(out: &mut impl Write, surf: &SurfaceDescriptor, layout: &LegacyLayout) -> fmt::Result {
    let alignment = 1u64 << surf.surf_alignment_log2;
    writeln!(
        out,
        "    Surf: size={}, alignment={}, blk_w={}, blk_h={}, bpe={}, flags={:#x}",
        surf.surf_size,
        alignment,
        surf.blk_w,
        surf.blk_h,
        surf.bpe,
        surf.flags.bits()
    )?;
    writeln!(
        out,
        "    Layout: size={}, alignment={}, bankw={}, bankh={}, nbanks={}, mtilea={}, tilesplit={}, \
         pipeconfig={}, scanout={}",
        surf.surf_size,
        alignment,
        layout.bankw,
        layout.bankh,
        layout.num_banks,
        layout.mtilea,
        layout.tile_split,
        layout.pipe_config,
        surf.flags.contains(SurfaceFlags::SCANOUT) as u32
    )?;

    if surf.fmask.offset != 0 {
        writeln!(
            out,
            "    FMask: offset={}, size={}, alignment={}, pitch_in_pixels={}, bankh={}, slice_tile_max={}, \
             tile_mode_index={}",
            surf.fmask.offset,
            surf.fmask.size,
            surf.fmask.alignment(),
            layout.fmask.pitch_in_pixels,
            layout.fmask.bankh,
            layout.fmask.slice_tile_max,
            layout.fmask.tiling_index
        )?;
    }

    if surf.cmask.offset != 0 {
        writeln!(
            out,
            "    CMask: offset={}, size={}, alignment={}, slice_tile_max={}",
            surf.cmask.offset,
            surf.cmask.size,
            surf.cmask.alignment(),
            layout.cmask_slice_tile_max
        )?;
    }

    if surf.meta.offset != 0 {
        let name = if surf.flags.intersects(SurfaceFlags::Z_OR_SBUFFER) { "HTile" } else { "DCC" };
        writeln!(
            out,
            "    {}: offset={}, size={}, alignment={}",
            name,
            surf.meta.offset,
            surf.meta.size,
            surf.meta.alignment()
        )?;
    }

    if surf.has_stencil {
        writeln!(out, "    StencilLayout: tilesplit={}", layout.stencil_tile_split)?;
    }
    Ok(())
}
