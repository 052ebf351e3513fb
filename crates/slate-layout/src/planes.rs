//! # Plane and Coordinate Accessors
//!
//! Projections of a computed descriptor onto the memory planes a modifier
//! exports, and the coordinate queries that go straight to the oracle.
//!
//! ```text
//! plane 0: main surface
//! plane 1: displayable DCC if present, else DCC
//! plane 2: DCC (only when plane 1 is the displayable copy)
//! ```

use log::trace;

use slate_addr::gfx12::{Gfx12AddrFromCoordInput, Gfx12NbcViewInput};
use slate_addr::gfx9::{Gfx9AddrFromCoordInput, Gfx9NbcViewInput};
use slate_addr::{AddrLib, AddressOracle, Gfx12Oracle, Gfx9Oracle, NbcView};
use slate_core::format::AddrFormat;
use slate_core::surface::UnifiedLayout;
use slate_core::{Error, Extent3d, GfxLevel, Modifier, Result, SurfaceConfig, SurfaceDescriptor};

// =============================================================================
// PLANES
// =============================================================================

/// Number of memory planes the descriptor exports
///
/// Surfaces without a modifier always export one plane.
pub fn plane_count(surf: &SurfaceDescriptor) -> u32 {
    if surf.modifier == Modifier::INVALID {
        1
    } else if surf.display_dcc_offset != 0 {
        3
    } else if surf.meta.offset != 0 {
        2
    } else {
        1
    }
}

fn unified_plane(surf: &SurfaceDescriptor, plane: u32) -> Result<&UnifiedLayout> {
    surf.unified().ok_or(Error::InvalidPlane(plane))
}

/// Byte offset of a plane, for `layer` of plane 0
pub fn plane_offset(gfx: GfxLevel, surf: &SurfaceDescriptor, plane: u32, layer: u32) -> Result<u64> {
    debug_assert!(plane == 0 || layer == 0);
    match plane {
        0 if gfx >= GfxLevel::Gfx9 => {
            let layout = unified_plane(surf, plane)?;
            Ok(layout.surf_offset + layer as u64 * layout.surf_slice_size)
        }
        0 => {
            let level0 = surf
                .legacy()
                .and_then(|l| l.levels.first())
                .ok_or(Error::InvalidPlane(plane))?;
            Ok(level0.offset() + layer as u64 * level0.slice_size_dw * 4)
        }
        1 if surf.display_dcc_offset != 0 => Ok(surf.display_dcc_offset),
        1 | 2 => Ok(surf.meta.offset),
        _ => Err(Error::InvalidPlane(plane)),
    }
}

/// Row stride of a plane in bytes, for `level` of plane 0
pub fn plane_stride(gfx: GfxLevel, surf: &SurfaceDescriptor, plane: u32, level: u32) -> Result<u64> {
    let bpe = surf.bpe as u64;
    match plane {
        0 if gfx >= GfxLevel::Gfx9 => {
            let layout = unified_plane(surf, plane)?;
            let pitch = if surf.is_linear {
                layout
                    .levels
                    .get(level as usize)
                    .map(|l| l.pitch)
                    .ok_or(Error::TooManyLevels(level))?
            } else {
                layout.surf_pitch
            };
            Ok(pitch as u64 * bpe)
        }
        0 => {
            let legacy = surf.legacy().ok_or(Error::InvalidPlane(plane))?;
            let lvl = legacy.levels.get(level as usize).ok_or(Error::TooManyLevels(level))?;
            Ok(lvl.nblk_x as u64 * bpe)
        }
        1 => {
            let color = unified_plane(surf, plane)?.color;
            let pitch_max = if surf.display_dcc_offset != 0 {
                color.display_dcc.pitch_max
            } else {
                color.dcc_pitch_max
            };
            Ok(pitch_max as u64 + 1)
        }
        2 => Ok(unified_plane(surf, plane)?.color.dcc_pitch_max as u64 + 1),
        _ => Err(Error::InvalidPlane(plane)),
    }
}

/// Size of a plane in bytes
pub fn plane_size(surf: &SurfaceDescriptor, plane: u32) -> Result<u64> {
    match plane {
        0 => Ok(surf.surf_size),
        1 if surf.display_dcc_offset != 0 => Ok(unified_plane(surf, plane)?.color.display_dcc.size),
        1 | 2 => Ok(surf.meta.size),
        _ => Err(Error::InvalidPlane(plane)),
    }
}

// =============================================================================
// COORDINATES
// =============================================================================

/// Byte address of an element relative to the surface start
///
/// # Panics
///
/// Legacy generations have no coordinate query.
#[allow(clippy::too_many_arguments)]
pub fn address_from_coordinate<O: AddressOracle>(
    addrlib: &AddrLib<O>,
    surf: &SurfaceDescriptor,
    config: &SurfaceConfig,
    level: u32,
    x: u32,
    y: u32,
    layer: u32,
) -> Result<u64> {
    let gfx = addrlib.gfx_level();
    assert!(gfx >= GfxLevel::Gfx9, "no coordinate queries on {:?}", gfx);
    let layout = surf.unified().ok_or(Error::UnsupportedGeneration)?;

    let width = config.width.div_ceil(surf.blk_w);
    let height = config.height.div_ceil(surf.blk_h);
    let num_slices = config.num_layers();
    trace!("addr from coord: ({}, {}) layer {} level {}", x, y, layer, level);

    if gfx >= GfxLevel::Gfx12 {
        let input = Gfx12AddrFromCoordInput {
            x,
            y,
            slice: layer,
            mip_id: level,
            pitch_in_element: layout.levels.get(level as usize).map_or(0, |l| l.pitch),
            unaligned_dims: Extent3d::new(width, height, num_slices),
            num_mip_levels: config.levels,
            num_samples: config.num_samples(),
            swizzle_mode: layout.swizzle_mode,
            resource_type: layout.resource_type,
            bpp: surf.bpe * 8,
        };
        Gfx12Oracle::addr_from_coord(addrlib.oracle(), &input)
    } else {
        let input = Gfx9AddrFromCoordInput {
            x,
            y,
            slice: layer,
            mip_id: level,
            width,
            height,
            num_slices,
            num_mip_levels: config.levels,
            num_samples: config.num_samples(),
            num_frags: config.num_samples(),
            swizzle_mode: layout.swizzle_mode,
            resource_type: layout.resource_type,
            pipe_bank_xor: surf.tile_swizzle as u32,
            bpp: surf.bpe * 8,
        };
        Gfx9Oracle::addr_from_coord(addrlib.oracle(), &input)
    }
}

/// Single-level uncompressed view of one level of a BC1/BC3 image
///
/// # Panics
///
/// Only GFX10 and later support such views, and only for 8 and 16 byte
/// blocks.
pub fn compute_nbc_view<O: AddressOracle>(
    addrlib: &AddrLib<O>,
    surf: &SurfaceDescriptor,
    config: &SurfaceConfig,
    level: u32,
    layer: u32,
) -> Result<NbcView> {
    let gfx = addrlib.gfx_level();
    assert!(gfx >= GfxLevel::Gfx10, "no compressed views on {:?}", gfx);
    let format = match surf.bpe {
        8 => AddrFormat::Bc1,
        16 => AddrFormat::Bc3,
        bpe => panic!("no compressed view of {} byte blocks", bpe),
    };
    let layout = surf.unified().ok_or(Error::UnsupportedGeneration)?;
    trace!("nbc view: {:?} layer {} level {}", format, layer, level);

    if gfx >= GfxLevel::Gfx12 {
        let input = Gfx12NbcViewInput {
            swizzle_mode: layout.swizzle_mode,
            resource_type: layout.resource_type,
            format,
            unaligned_dims: Extent3d::new(config.width, config.height, 1),
            num_mip_levels: config.levels,
            pipe_bank_xor: surf.tile_swizzle as u32,
            slice: layer,
            mip_id: level,
        };
        Gfx12Oracle::nbc_view(addrlib.oracle(), &input)
    } else {
        let input = Gfx9NbcViewInput {
            swizzle_mode: layout.swizzle_mode,
            resource_type: layout.resource_type,
            format,
            width: config.width,
            height: config.height,
            num_slices: config.array_size,
            num_mip_levels: config.levels,
            pipe_bank_xor: surf.tile_swizzle as u32,
            slice: layer,
            mip_id: level,
        };
        Gfx9Oracle::nbc_view(addrlib.oracle(), &input)
    }
}
