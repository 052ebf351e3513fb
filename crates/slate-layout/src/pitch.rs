//! # Pitch and Offset Overrides
//!
//! Importing a buffer allocated elsewhere means trusting its pitch and
//! offset. These helpers check a foreign pitch against the hardware pitch
//! alignment and rebase a computed descriptor on it.

use log::debug;

use slate_core::math::log2;
use slate_core::surface::LegacyLayout;
use slate_core::{GfxLevel, GpuInfo, ResourceType, SurfaceDescriptor, SurfaceMode, SwizzleMode};

/// Pipe count of a GFX6-8 `PIPE_CONFIG` register value
///
/// # Panics
///
/// Panics on values the hardware does not define.
pub const fn pipe_config_to_num_pipes(pipe_config: u32) -> u32 {
    match pipe_config {
        0 => 2,
        4..=7 => 4,
        8..=14 => 8,
        16 | 17 => 16,
        _ => panic!("invalid pipe config"),
    }
}

/// Width of a 256 B block in elements on GFX9, by log2 of the element size
const GFX9_BLOCK_256B_WIDTH: [u32; 5] = [16, 16, 8, 8, 4];

/// Alignment a row pitch must have, in elements
///
/// Volume textures get an alignment no pitch can satisfy, so their pitch
/// is never overridden.
///
/// # Panics
///
/// Panics when the descriptor carries a swizzle or tiling mode that has no
/// pitch rule.
pub fn get_pitch_align(info: &GpuInfo, surf: &SurfaceDescriptor) -> u32 {
    let gfx = info.gfx_level;

    if surf.is_linear {
        return if gfx >= GfxLevel::Gfx12 {
            128 / surf.bpe
        } else if gfx >= GfxLevel::Gfx9 {
            256 / surf.bpe
        } else {
            (64 / surf.bpe).max(8)
        };
    }

    if let Some(layout) = surf.unified() {
        if layout.resource_type == ResourceType::Tex3D {
            return 1 << 31;
        }
        let bpe_log2 = log2(surf.bpe);

        if gfx >= GfxLevel::Gfx12 {
            let block_log2 = match layout.swizzle_mode {
                SwizzleMode::GFX12_256B_2D
                | SwizzleMode::GFX12_4KB_2D
                | SwizzleMode::GFX12_64KB_2D
                | SwizzleMode::GFX12_256KB_2D => layout.swizzle_mode.gfx12_block_size_log2(),
                mode => panic!("no pitch rule for {:?}", mode),
            };
            return 1 << ((block_log2 >> 1) - (bpe_log2 >> 1));
        }

        let block_log2 = layout.swizzle_mode.block_size_log2();
        assert!(block_log2 != 0, "no pitch rule for {:?}", layout.swizzle_mode);

        return if gfx >= GfxLevel::Gfx10 {
            1 << ((block_log2 - bpe_log2 + 1) / 2)
        } else {
            GFX9_BLOCK_256B_WIDTH[bpe_log2 as usize] << ((block_log2 - 8) / 2)
        };
    }

    let Some(legacy) = surf.legacy() else {
        unreachable!("descriptor without a layout");
    };
    let levels = if surf.flags.is_stencil_only() {
        &legacy.stencil_levels
    } else {
        &legacy.levels
    };
    // Display additionally wants 32 pixels, which is not checked here
    match levels.first().map(|l| l.mode) {
        Some(SurfaceMode::Tiled1D) => 8,
        Some(SurfaceMode::Tiled2D) => 8 * legacy.bankw * legacy.mtilea * pipe_config_to_num_pipes(legacy.pipe_config),
        mode => panic!("no pitch rule for {:?}", mode),
    }
}

fn rebase_legacy(legacy: &mut LegacyLayout, bpe: u32, offset: u64, pitch: u32, require_equal_pitch: bool) -> bool {
    if pitch != 0 {
        let Some(level0) = legacy.levels.first_mut() else {
            return false;
        };
        if level0.nblk_x != pitch && require_equal_pitch {
            return false;
        }
        level0.nblk_x = pitch;
        level0.slice_size_dw = pitch as u64 * level0.nblk_y as u64 * bpe as u64 / 4;
    }

    for level in legacy.levels.iter_mut() {
        level.offset_256b += offset / 256;
    }
    true
}

/// Move a computed descriptor to `offset` and optionally a foreign `pitch`
///
/// A zero pitch keeps the computed one. Returns `false` without touching
/// `surf` when the pitch or offset cannot be honored: a misaligned pitch,
/// a pitch change on a layout that cannot take one (metadata, mips,
/// layers, tiled GFX9+ layouts, any GFX10 layout), or a misaligned offset.
pub fn override_offset_stride(
    info: &GpuInfo,
    surf: &mut SurfaceDescriptor,
    num_layers: u32,
    num_levels: u32,
    offset: u64,
    pitch: u32,
) -> bool {
    let gfx = info.gfx_level;

    if (get_pitch_align(info, surf) - 1) & pitch != 0 {
        debug!("pitch {} not aligned for import", pitch);
        return false;
    }

    let require_equal_pitch = surf.surf_size != surf.total_size
        || num_layers != 1
        || num_levels != 1
        || (gfx >= GfxLevel::Gfx9 && !surf.is_linear)
        || gfx == GfxLevel::Gfx10;

    let mut next = surf.clone();

    let bpe = surf.bpe as u64;
    let has_stencil = surf.has_stencil;
    if let Some(layout) = next.unified_mut() {
        let mut resized = None;
        if pitch != 0 && pitch != layout.surf_pitch {
            if require_equal_pitch || layout.surf_slice_size == 0 {
                return false;
            }
            let slices = surf.surf_size / layout.surf_slice_size;

            layout.uses_custom_pitch = true;
            layout.surf_pitch = pitch;
            layout.epitch = pitch - 1;
            if let Some(level0) = layout.levels.first_mut() {
                level0.pitch = pitch;
            }
            layout.surf_slice_size = pitch as u64 * layout.surf_height as u64 * bpe;
            resized = Some(layout.surf_slice_size * slices);
        }

        layout.surf_offset = offset;
        if has_stencil {
            layout.zs.stencil_offset += offset;
        }

        if let Some(size) = resized {
            next.surf_size = size;
            next.total_size = size;
        }
    } else if let Some(legacy) = next.legacy_mut() {
        if !rebase_legacy(legacy, surf.bpe, offset, pitch, require_equal_pitch) {
            return false;
        }
    }

    if offset & ((1u64 << next.alignment_log2) - 1) != 0 || offset >= u64::MAX - next.total_size {
        debug!("offset {:#x} not aligned for import", offset);
        return false;
    }

    for aux in [&mut next.meta.offset, &mut next.fmask.offset, &mut next.cmask.offset, &mut next.display_dcc_offset] {
        if *aux != 0 {
            *aux += offset;
        }
    }

    debug!("imported at {:#x}, pitch {}", offset, pitch);
    *surf = next;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use slate_core::surface::{LegacyLevel, UnifiedLevel};
    use slate_core::{SurfaceFlags, SurfaceLayout};
    use slate_test_framework::fixtures;

    fn unified(bpe: u32, mode: SwizzleMode) -> SurfaceDescriptor {
        let mut surf = SurfaceDescriptor::new(1, 1, bpe, SurfaceFlags::empty());
        surf.ensure_unified().swizzle_mode = mode;
        surf.is_linear = mode.is_linear();
        surf
    }

    /// Single-level linear 2D surface: 128 x 64 texels, 4 bytes each
    fn linear_128x64() -> SurfaceDescriptor {
        let mut surf = unified(4, SwizzleMode::LINEAR);
        let layout = surf.ensure_unified();
        layout.surf_pitch = 128;
        layout.epitch = 127;
        layout.surf_height = 64;
        layout.surf_slice_size = 128 * 64 * 4;
        layout.levels.push(UnifiedLevel { offset: 0, pitch: 128 });
        surf.surf_size = 128 * 64 * 4;
        surf.total_size = surf.surf_size;
        surf.surf_alignment_log2 = 8;
        surf.alignment_log2 = 8;
        surf
    }

    fn legacy(mode: SurfaceMode, bankw: u32, mtilea: u32, pipe_config: u32) -> SurfaceDescriptor {
        let mut layout = LegacyLayout::default();
        layout.bankw = bankw;
        layout.mtilea = mtilea;
        layout.pipe_config = pipe_config;
        layout.levels.push(LegacyLevel {
            offset_256b: 0,
            slice_size_dw: 64 * 32,
            nblk_x: 64,
            nblk_y: 32,
            mode,
            ..LegacyLevel::default()
        });
        let mut surf = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::empty());
        surf.layout = SurfaceLayout::Legacy(layout);
        surf.surf_size = 64 * 32 * 4;
        surf.total_size = surf.surf_size;
        surf.alignment_log2 = 8;
        surf
    }

    #[test]
    fn test_pipe_config_to_num_pipes() {
        assert_eq!(pipe_config_to_num_pipes(0), 2);
        assert_eq!(pipe_config_to_num_pipes(5), 4);
        assert_eq!(pipe_config_to_num_pipes(12), 8);
        assert_eq!(pipe_config_to_num_pipes(17), 16);
    }

    #[test]
    #[should_panic]
    fn test_pipe_config_unknown() {
        pipe_config_to_num_pipes(3);
    }

    #[test]
    fn test_linear_pitch_align() {
        assert_eq!(get_pitch_align(&fixtures::gfx12(), &unified(4, SwizzleMode::LINEAR)), 32);
        assert_eq!(get_pitch_align(&fixtures::gfx9(), &unified(4, SwizzleMode::LINEAR)), 64);

        let mut surf = legacy(SurfaceMode::LinearAligned, 1, 1, 0);
        surf.is_linear = true;
        assert_eq!(get_pitch_align(&fixtures::gfx8(), &surf), 16);
        surf.bpe = 16;
        assert_eq!(get_pitch_align(&fixtures::gfx8(), &surf), 8);
    }

    #[test]
    fn test_swizzled_pitch_align() {
        let s64k = SwizzleMode::SW_64KB_S_X;
        assert_eq!(get_pitch_align(&fixtures::gfx9(), &unified(4, s64k)), 128);
        assert_eq!(get_pitch_align(&fixtures::gfx10(), &unified(4, s64k)), 128);
        assert_eq!(get_pitch_align(&fixtures::gfx9(), &unified(1, s64k)), 256);
        assert_eq!(get_pitch_align(&fixtures::gfx10_3(), &unified(1, s64k)), 256);
        assert_eq!(get_pitch_align(&fixtures::gfx11(), &unified(4, SwizzleMode::SW_4KB_D_X)), 32);

        assert_eq!(get_pitch_align(&fixtures::gfx12(), &unified(4, SwizzleMode::GFX12_256KB_2D)), 256);
        assert_eq!(get_pitch_align(&fixtures::gfx12(), &unified(8, SwizzleMode::GFX12_256B_2D)), 8);
    }

    #[test]
    fn test_volume_pitch_align_is_unreachable() {
        let mut surf = unified(4, SwizzleMode::SW_64KB_R_X);
        surf.ensure_unified().resource_type = ResourceType::Tex3D;
        assert_eq!(get_pitch_align(&fixtures::gfx10(), &surf), 1 << 31);
    }

    #[test]
    fn test_legacy_pitch_align() {
        assert_eq!(get_pitch_align(&fixtures::gfx8(), &legacy(SurfaceMode::Tiled1D, 1, 1, 0)), 8);
        // P8_32x32_16x16
        assert_eq!(get_pitch_align(&fixtures::gfx8(), &legacy(SurfaceMode::Tiled2D, 2, 4, 12)), 512);
    }

    #[test]
    fn test_override_linear_pitch() {
        let info = fixtures::gfx9();
        let mut surf = linear_128x64();
        assert!(override_offset_stride(&info, &mut surf, 1, 1, 4096, 192));

        let layout = surf.unified().unwrap();
        assert!(layout.uses_custom_pitch);
        assert_eq!(layout.surf_pitch, 192);
        assert_eq!(layout.epitch, 191);
        assert_eq!(layout.levels[0].pitch, 192);
        assert_eq!(layout.surf_slice_size, 192 * 64 * 4);
        assert_eq!(layout.surf_offset, 4096);
        assert_eq!(surf.surf_size, 192 * 64 * 4);
        assert_eq!(surf.total_size, surf.surf_size);
    }

    #[test]
    fn test_override_rejects_misaligned_pitch() {
        let info = fixtures::gfx9();
        let mut surf = linear_128x64();
        let before = surf.clone();
        assert!(!override_offset_stride(&info, &mut surf, 1, 1, 0, 100));
        assert_eq!(surf, before);
    }

    #[test]
    fn test_override_rejects_pitch_change() {
        // GFX10 never takes a different pitch
        let mut surf = linear_128x64();
        assert!(!override_offset_stride(&fixtures::gfx10(), &mut surf, 1, 1, 0, 192));

        // Layers and mips pin the pitch
        let mut surf = linear_128x64();
        assert!(!override_offset_stride(&fixtures::gfx9(), &mut surf, 2, 1, 0, 192));
        assert!(!override_offset_stride(&fixtures::gfx9(), &mut surf, 1, 3, 0, 192));

        // Equal pitch is always fine
        assert!(override_offset_stride(&fixtures::gfx10(), &mut surf, 4, 1, 0, 128));
        assert!(!surf.unified().unwrap().uses_custom_pitch);
    }

    #[test]
    fn test_override_rejects_misaligned_offset() {
        let info = fixtures::gfx9();
        let mut surf = linear_128x64();
        let before = surf.clone();
        assert!(!override_offset_stride(&info, &mut surf, 1, 1, 100, 0));
        assert_eq!(surf, before);
    }

    #[test]
    fn test_override_shifts_aux_offsets() {
        let info = fixtures::gfx10_3();
        let mut surf = unified(4, SwizzleMode::SW_64KB_R_X);
        surf.ensure_unified().surf_pitch = 256;
        surf.surf_size = 65536;
        surf.meta.offset = 65536;
        surf.meta.size = 4096;
        surf.total_size = 69632;
        surf.alignment_log2 = 16;

        assert!(override_offset_stride(&info, &mut surf, 1, 1, 1 << 20, 0));
        assert_eq!(surf.unified().unwrap().surf_offset, 1 << 20);
        assert_eq!(surf.meta.offset, 65536 + (1 << 20));
        assert_eq!(surf.cmask.offset, 0);
        assert_eq!(surf.display_dcc_offset, 0);
    }

    #[test]
    fn test_override_shifts_stencil() {
        let info = fixtures::gfx11();
        let mut surf = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::ZBUFFER | SurfaceFlags::SBUFFER);
        let layout = surf.ensure_unified();
        layout.swizzle_mode = SwizzleMode::SW_64KB_Z_X;
        layout.zs.stencil_offset = 32768;
        surf.has_stencil = true;
        surf.surf_size = 65536;
        surf.total_size = 65536;
        surf.alignment_log2 = 16;

        assert!(override_offset_stride(&info, &mut surf, 1, 1, 65536, 0));
        assert_eq!(surf.unified().unwrap().zs.stencil_offset, 32768 + 65536);
    }

    #[test]
    fn test_override_legacy() {
        let info = fixtures::gfx8();
        let mut surf = legacy(SurfaceMode::Tiled1D, 1, 1, 0);
        assert!(override_offset_stride(&info, &mut surf, 1, 1, 1024, 72));

        let level0 = surf.legacy().unwrap().levels[0];
        assert_eq!(level0.nblk_x, 72);
        assert_eq!(level0.slice_size_dw, 72 * 32);
        assert_eq!(level0.offset(), 1024);
    }

    #[test]
    fn test_override_legacy_pinned_pitch() {
        let info = fixtures::gfx8();
        let mut surf = legacy(SurfaceMode::Tiled1D, 1, 1, 0);
        surf.total_size += 4096;
        let before = surf.clone();
        assert!(!override_offset_stride(&info, &mut surf, 1, 1, 0, 72));
        assert_eq!(surf, before);
    }
}
