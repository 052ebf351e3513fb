//! # UMD Metadata
//!
//! The opaque blob a user-mode driver attaches to an exported buffer so that
//! an importer on the same device can rebuild the image descriptor and find
//! the DCC surface.
//!
//! ## Layout
//!
//! ```text
//! [0]        version | flags << 16
//! [1]        vendor id << 16 | PCI device id
//! [2..10]    image descriptor, base address cleared
//! GFX6-8:    [10..10+levels]  level offsets in 256 B units
//! GFX9+ with tool data:
//!            [10..12] modifier, [12] plane count, then offset/stride pairs
//!            or [10] plane 0 stride without a modifier
//! [last]     spoofed generation, when the family is overridden
//! ```
//!
//! Versions 1 and 2 share a layout. Version 3 adds the optional trailers.

use bytemuck::{Pod, Zeroable};
use log::{debug, warn};

use slate_core::math::log2;
use slate_core::{Error, GfxLevel, GpuInfo, Result, SurfaceDescriptor, SurfaceFlags};
use slate_layout::planes::{plane_count, plane_offset, plane_stride};

/// Capacity of the blob in dwords
pub const UMD_METADATA_DWORDS: usize = 64;

/// The eight dwords of a hardware image descriptor
pub type ImageDescriptor = [u32; 8];

const ATI_VENDOR_ID: u32 = 0x1002;

/// Header plus descriptor
const MIN_METADATA_BYTES: u32 = 10 * 4;

// Version flag bits, stored above bit 16 of word 0
const FLAG_EXTRA_MD_BIT: u32 = 0;
const FLAG_FAMILY_OVERRIDDEN_BIT: u32 = 1;

// Image descriptor fields
const WORD1_BASE_ADDRESS_HI_MASK: u32 = 0xFF;
const WORD3_LAST_LEVEL_SHIFT: u32 = 16;
const WORD3_LAST_LEVEL_MASK: u32 = 0xF;
const WORD3_LAST_LEVEL_GFX12_SHIFT: u32 = 17;
const WORD3_LAST_LEVEL_GFX12_MASK: u32 = 0x1F;
const WORD3_TYPE_SHIFT: u32 = 28;
const WORD5_META_PIPE_ALIGNED_BIT: u32 = 18;
const WORD5_META_RB_ALIGNED_BIT: u32 = 19;
const WORD5_META_DATA_ADDRESS_SHIFT: u32 = 24;
const WORD6_META_PIPE_ALIGNED_BIT: u32 = 18;
const WORD6_COMPRESSION_EN_BIT: u32 = 21;
const WORD6_META_DATA_ADDRESS_LO_SHIFT: u32 = 24;

const IMG_TYPE_2D_MSAA: u32 = 14;
const IMG_TYPE_2D_MSAA_ARRAY: u32 = 15;

#[inline]
const fn bit(word: u32, bit: u32) -> bool {
    (word >> bit) & 1 != 0
}

/// Kernel-facing numbering of a generation, written into the spoof trailer
const fn gfx_level_code(gfx: GfxLevel) -> u32 {
    match gfx {
        GfxLevel::Gfx6 => 8,
        GfxLevel::Gfx7 => 9,
        GfxLevel::Gfx8 => 10,
        GfxLevel::Gfx9 => 11,
        GfxLevel::Gfx10 => 12,
        GfxLevel::Gfx10_3 => 13,
        GfxLevel::Gfx11 => 14,
        GfxLevel::Gfx11_5 => 15,
        GfxLevel::Gfx12 => 16,
    }
}

/// Vendor and device signature of the blob
#[inline]
pub const fn umd_signature(info: &GpuInfo) -> u32 {
    (ATI_VENDOR_ID << 16) | info.pci_id
}

// =============================================================================
// BLOB
// =============================================================================

/// A UMD metadata blob and its used size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct UmdMetadata {
    words: [u32; UMD_METADATA_DWORDS],
    size: u32,
}

static_assertions::assert_eq_size!(UmdMetadata, [u32; UMD_METADATA_DWORDS + 1]);

impl UmdMetadata {
    /// Empty blob
    pub fn new() -> Self {
        Self::zeroed()
    }

    /// Blob received from another process
    ///
    /// Bytes beyond the capacity are dropped.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut md = Self::new();
        let n = bytes.len().min(UMD_METADATA_DWORDS * 4);
        bytemuck::cast_slice_mut::<u32, u8>(md.words.as_mut_slice())[..n].copy_from_slice(&bytes[..n]);
        md.size = n as u32;
        md
    }

    /// Used size in bytes
    #[inline]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Used dwords
    pub fn words(&self) -> &[u32] {
        &self.words[..(self.size as usize / 4)]
    }

    /// Used bytes, in host byte order
    pub fn as_bytes(&self) -> &[u8] {
        &bytemuck::cast_slice::<u32, u8>(self.words.as_slice())[..self.size as usize]
    }

    fn word(&self, index: usize) -> u32 {
        self.words[index]
    }

    fn push(&mut self, value: u32) -> Result<()> {
        let index = self.size as usize / 4;
        let slot = self.words.get_mut(index).ok_or(Error::MetadataOverflow)?;
        *slot = value;
        self.size += 4;
        Ok(())
    }
}

impl Default for UmdMetadata {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// IMPORT
// =============================================================================

/// Recover the DCC placement of an imported image from its metadata
///
/// Call after computing the surface. Surfaces with a modifier carry their
/// layout in the modifier and are left alone. Metadata from another device
/// or driver, a truncated blob, or a non-zero plane offset disables DCC and
/// still succeeds. A blob whose level or sample count disagrees with the
/// caller fails with [`Error::MetadataMismatch`].
pub fn apply_umd_metadata(
    info: &GpuInfo,
    surf: &mut SurfaceDescriptor,
    num_storage_samples: u32,
    num_levels: u32,
    metadata: &UmdMetadata,
) -> Result<()> {
    let gfx = info.gfx_level;

    if surf.modifier.is_set() {
        return Ok(());
    }

    let offset = if gfx >= GfxLevel::Gfx9 {
        surf.unified().map_or(0, |l| l.surf_offset)
    } else {
        surf.legacy().and_then(|l| l.levels.first()).map_or(0, |l| l.offset())
    };

    if offset != 0
        || metadata.size() < MIN_METADATA_BYTES
        || metadata.word(0) == 0
        || metadata.word(1) != umd_signature(info)
    {
        warn!(
            "ignoring foreign UMD metadata (offset {:#x}, {} bytes, signature {:#010x}), DCC disabled",
            offset,
            metadata.size(),
            metadata.word(1)
        );
        surf.zero_dcc_fields();
        return Ok(());
    }

    let desc = &metadata.words[2..10];
    let last_level = if gfx >= GfxLevel::Gfx12 {
        (desc[3] >> WORD3_LAST_LEVEL_GFX12_SHIFT) & WORD3_LAST_LEVEL_GFX12_MASK
    } else {
        (desc[3] >> WORD3_LAST_LEVEL_SHIFT) & WORD3_LAST_LEVEL_MASK
    };
    let image_type = desc[3] >> WORD3_TYPE_SHIFT;

    if matches!(image_type, IMG_TYPE_2D_MSAA | IMG_TYPE_2D_MSAA_ARRAY) {
        let log_samples = log2(num_storage_samples.max(1));
        if last_level != log_samples {
            debug!("MSAA import: metadata has log2(samples) = {}, caller set {}", last_level, log_samples);
            return Err(Error::MetadataMismatch);
        }
    } else if last_level + 1 != num_levels {
        debug!(
            "mipmapped import: metadata has last level {}, caller set {}",
            last_level,
            num_levels.saturating_sub(1)
        );
        return Err(Error::MetadataMismatch);
    }

    let compressed = gfx >= GfxLevel::Gfx8 && gfx < GfxLevel::Gfx12 && bit(desc[6], WORD6_COMPRESSION_EN_BIT);
    if !compressed {
        // The importer always sets a DCC offset
        surf.zero_dcc_fields();
        return Ok(());
    }

    match gfx {
        GfxLevel::Gfx8 => {
            surf.meta.offset = (desc[7] as u64) << 8;
        }
        GfxLevel::Gfx9 => {
            surf.meta.offset = ((desc[7] as u64) << 8) | (((desc[5] >> WORD5_META_DATA_ADDRESS_SHIFT) as u64) << 40);
            let is_displayable = surf.is_displayable;
            let dcc = &mut surf.ensure_unified().color.dcc;
            dcc.pipe_aligned = bit(desc[5], WORD5_META_PIPE_ALIGNED_BIT);
            dcc.rb_aligned = bit(desc[5], WORD5_META_RB_ALIGNED_BIT);
            // Unaligned DCC is only ever displayable
            debug_assert!(dcc.pipe_aligned || dcc.rb_aligned || is_displayable);
        }
        _ => {
            surf.meta.offset =
                (((desc[6] >> WORD6_META_DATA_ADDRESS_LO_SHIFT) as u64) << 8) | ((desc[7] as u64) << 16);
            surf.ensure_unified().color.dcc.pipe_aligned = bit(desc[6], WORD6_META_PIPE_ALIGNED_BIT);
        }
    }

    surf.num_meta_levels = last_level + 1;
    surf.flags.remove(SurfaceFlags::DISABLE_DCC);
    Ok(())
}

// =============================================================================
// EXPORT
// =============================================================================

/// Build the metadata blob for exporting `surf`
///
/// `desc` is the image descriptor of the whole resource. Its base address is
/// cleared and the DCC offset relative to the buffer is written into it
/// before it is copied into the blob. `include_tool_md` appends the modifier
/// and plane table (or the plain stride) for debugging tools.
pub fn compute_umd_metadata(
    info: &GpuInfo,
    surf: &SurfaceDescriptor,
    num_levels: u32,
    desc: &mut ImageDescriptor,
    include_tool_md: bool,
) -> Result<UmdMetadata> {
    let gfx = info.gfx_level;
    let meta_offset = surf.meta.offset;

    desc[0] = 0;
    desc[1] &= !WORD1_BASE_ADDRESS_HI_MASK;

    match gfx {
        GfxLevel::Gfx6 | GfxLevel::Gfx7 | GfxLevel::Gfx12 => {}
        GfxLevel::Gfx8 => {
            desc[7] = (meta_offset >> 8) as u32;
        }
        GfxLevel::Gfx9 => {
            desc[7] = (meta_offset >> 8) as u32;
            desc[5] &= !(0xFF << WORD5_META_DATA_ADDRESS_SHIFT);
            desc[5] |= (((meta_offset >> 40) as u32) & 0xFF) << WORD5_META_DATA_ADDRESS_SHIFT;
        }
        GfxLevel::Gfx10 | GfxLevel::Gfx10_3 | GfxLevel::Gfx11 | GfxLevel::Gfx11_5 => {
            desc[6] &= !(0xFF << WORD6_META_DATA_ADDRESS_LO_SHIFT);
            desc[6] |= (((meta_offset >> 8) as u32) & 0xFF) << WORD6_META_DATA_ADDRESS_LO_SHIFT;
            desc[7] = (meta_offset >> 16) as u32;
        }
    }

    let mut md = UmdMetadata::new();

    let mut version = if include_tool_md || info.family_overridden { 3 } else { 1 };
    if include_tool_md {
        version |= 1 << (16 + FLAG_EXTRA_MD_BIT);
    }
    if info.family_overridden {
        version |= 1 << (16 + FLAG_FAMILY_OVERRIDDEN_BIT);
    }
    md.push(version)?;

    // Tiling modes are ambiguous without a PCI id
    md.push(umd_signature(info))?;
    for word in desc.iter() {
        md.push(*word)?;
    }

    if gfx <= GfxLevel::Gfx8 {
        let levels = surf.legacy().map(|l| l.levels.as_slice()).unwrap_or_default();
        for level in 0..num_levels {
            let lvl = levels.get(level as usize).ok_or(Error::TooManyLevels(level))?;
            md.push(lvl.offset_256b as u32)?;
        }
    } else if include_tool_md {
        if surf.modifier.is_set() {
            md.push(surf.modifier.raw() as u32)?;
            md.push((surf.modifier.raw() >> 32) as u32)?;

            let planes = plane_count(surf);
            md.push(planes)?;
            for plane in 0..planes {
                md.push(plane_offset(gfx, surf, plane, 0)? as u32)?;
                md.push(plane_stride(gfx, surf, plane, 0)? as u32)?;
            }
        } else {
            md.push(plane_stride(gfx, surf, 0, 0)? as u32)?;
        }
    }

    if info.family_overridden {
        // The trailer must not take the last slot
        if md.size() as usize / 4 >= UMD_METADATA_DWORDS - 1 {
            return Err(Error::MetadataOverflow);
        }
        md.push(gfx_level_code(gfx))?;
    }

    debug!("UMD metadata: version {:#x}, {} bytes", version, md.size());
    Ok(md)
}

#[cfg(test)]
mod tests {
    use super::*;
    use slate_core::surface::{LegacyLayout, LegacyLevel};
    use slate_core::{Modifier, ModifierField, SurfaceLayout, SwizzleMode};
    use slate_test_framework::fixtures;

    const PCI_ID: u32 = 0x73BF;

    fn device(info: GpuInfo) -> GpuInfo {
        info.with_pci_id(PCI_ID)
    }

    /// Color surface with DCC at 64 KiB and displayable DCC cleared
    fn with_dcc() -> SurfaceDescriptor {
        let mut surf = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::empty());
        let layout = surf.ensure_unified();
        layout.swizzle_mode = SwizzleMode::SW_64KB_R_X;
        layout.surf_pitch = 256;
        surf.surf_size = 65536;
        surf.meta.offset = 65536;
        surf.meta.size = 4096;
        surf.total_size = 69632;
        surf.num_meta_levels = 1;
        surf
    }

    fn header(info: &GpuInfo, desc: ImageDescriptor) -> UmdMetadata {
        let mut md = UmdMetadata::new();
        md.push(1).unwrap();
        md.push(umd_signature(info)).unwrap();
        for word in desc {
            md.push(word).unwrap();
        }
        md
    }

    fn desc_with_levels(last_level: u32) -> ImageDescriptor {
        let mut desc = [0u32; 8];
        desc[3] = last_level << WORD3_LAST_LEVEL_SHIFT;
        desc
    }

    #[test]
    fn test_signature() {
        assert_eq!(umd_signature(&device(fixtures::gfx10_3())), 0x1002_73BF);
    }

    #[test]
    fn test_foreign_signature_disables_dcc() {
        let info = device(fixtures::gfx10_3());
        let other = fixtures::gfx10_3().with_pci_id(0x1234);
        let md = header(&other, desc_with_levels(0));

        let mut surf = with_dcc();
        assert_eq!(apply_umd_metadata(&info, &mut surf, 1, 1, &md), Ok(()));
        assert_eq!(surf.meta.offset, 0);
        assert_eq!(surf.display_dcc_offset, 0);
        assert_eq!(surf.total_size, surf.surf_size);
    }

    #[test]
    fn test_short_or_unversioned_blob_disables_dcc() {
        let info = device(fixtures::gfx10_3());

        let mut short = UmdMetadata::new();
        short.push(1).unwrap();
        short.push(umd_signature(&info)).unwrap();
        let mut surf = with_dcc();
        assert_eq!(apply_umd_metadata(&info, &mut surf, 1, 1, &short), Ok(()));
        assert_eq!(surf.meta.offset, 0);

        let mut unversioned = header(&info, desc_with_levels(0));
        unversioned.words[0] = 0;
        let mut surf = with_dcc();
        assert_eq!(apply_umd_metadata(&info, &mut surf, 1, 1, &unversioned), Ok(()));
        assert_eq!(surf.meta.offset, 0);
    }

    #[test]
    fn test_non_zero_plane_offset_disables_dcc() {
        let info = device(fixtures::gfx10_3());
        let md = header(&info, desc_with_levels(0));
        let mut surf = with_dcc();
        surf.unified_mut().unwrap().surf_offset = 4096;
        assert_eq!(apply_umd_metadata(&info, &mut surf, 1, 1, &md), Ok(()));
        assert_eq!(surf.meta.offset, 0);
    }

    #[test]
    fn test_modifier_surfaces_ignore_metadata() {
        let info = device(fixtures::gfx10_3());
        let mut surf = with_dcc().with_modifier(Modifier::AMD.with_flag(ModifierField::DCC, true));
        let before = surf.clone();
        assert_eq!(apply_umd_metadata(&info, &mut surf, 1, 1, &UmdMetadata::new()), Ok(()));
        assert_eq!(surf, before);
    }

    #[test]
    fn test_level_mismatch_fails() {
        let info = device(fixtures::gfx10_3());
        let md = header(&info, desc_with_levels(3));
        let mut surf = with_dcc();
        assert_eq!(apply_umd_metadata(&info, &mut surf, 1, 1, &md), Err(Error::MetadataMismatch));
        assert_eq!(apply_umd_metadata(&info, &mut surf, 1, 4, &md), Ok(()));
    }

    #[test]
    fn test_msaa_sample_check() {
        let info = device(fixtures::gfx9());
        let mut desc = desc_with_levels(2);
        desc[3] |= IMG_TYPE_2D_MSAA << WORD3_TYPE_SHIFT;
        let md = header(&info, desc);

        let mut surf = with_dcc();
        assert_eq!(apply_umd_metadata(&info, &mut surf, 4, 1, &md), Ok(()));
        assert_eq!(apply_umd_metadata(&info, &mut surf, 8, 1, &md), Err(Error::MetadataMismatch));
    }

    #[test]
    fn test_gfx12_last_level_field() {
        let info = device(fixtures::gfx12());
        let mut desc = [0u32; 8];
        desc[3] = 9 << WORD3_LAST_LEVEL_GFX12_SHIFT;
        let md = header(&info, desc);

        let mut surf = with_dcc();
        assert_eq!(apply_umd_metadata(&info, &mut surf, 1, 10, &md), Ok(()));
        // No metadata address on GFX12
        assert_eq!(surf.meta.offset, 0);
    }

    #[test]
    fn test_uncompressed_descriptor_disables_dcc() {
        let info = device(fixtures::gfx10());
        let md = header(&info, desc_with_levels(0));
        let mut surf = with_dcc();
        assert_eq!(apply_umd_metadata(&info, &mut surf, 1, 1, &md), Ok(()));
        assert_eq!(surf.meta.offset, 0);
    }

    #[test]
    fn test_gfx10_dcc_import() {
        let info = device(fixtures::gfx10_3());
        let mut desc = desc_with_levels(0);
        desc[6] = (1 << WORD6_COMPRESSION_EN_BIT) | (1 << WORD6_META_PIPE_ALIGNED_BIT) | (0x12 << 24);
        desc[7] = 0x34;
        let md = header(&info, desc);

        let mut surf = with_dcc();
        surf.flags |= SurfaceFlags::DISABLE_DCC;
        assert_eq!(apply_umd_metadata(&info, &mut surf, 1, 1, &md), Ok(()));
        assert_eq!(surf.meta.offset, 0x34_1200);
        assert_eq!(surf.num_meta_levels, 1);
        assert!(surf.unified().unwrap().color.dcc.pipe_aligned);
        assert!(!surf.flags.contains(SurfaceFlags::DISABLE_DCC));
    }

    #[test]
    fn test_gfx9_dcc_import() {
        let info = device(fixtures::gfx9());
        let mut desc = desc_with_levels(1);
        desc[5] = (1 << WORD5_META_RB_ALIGNED_BIT) | (0x01 << WORD5_META_DATA_ADDRESS_SHIFT);
        desc[6] = 1 << WORD6_COMPRESSION_EN_BIT;
        desc[7] = 0x100;
        let md = header(&info, desc);

        let mut surf = with_dcc();
        assert_eq!(apply_umd_metadata(&info, &mut surf, 1, 2, &md), Ok(()));
        assert_eq!(surf.meta.offset, (1 << 40) | 0x1_0000);
        assert_eq!(surf.num_meta_levels, 2);
        let dcc = surf.unified().unwrap().color.dcc;
        assert!(dcc.rb_aligned);
        assert!(!dcc.pipe_aligned);
    }

    #[test]
    fn test_gfx8_dcc_import() {
        let info = device(fixtures::gfx8());
        let mut desc = desc_with_levels(0);
        desc[6] = 1 << WORD6_COMPRESSION_EN_BIT;
        desc[7] = 0x200;
        let md = header(&info, desc);

        let mut layout = LegacyLayout::default();
        layout.levels.push(LegacyLevel::default());
        let mut surf = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::empty());
        surf.layout = SurfaceLayout::Legacy(layout);

        assert_eq!(apply_umd_metadata(&info, &mut surf, 1, 1, &md), Ok(()));
        assert_eq!(surf.meta.offset, 0x2_0000);
    }

    #[test]
    fn test_export_import_round_trip() {
        let info = device(fixtures::gfx10_3());
        let exported = {
            let mut s = with_dcc();
            s.meta.offset = 0x34_1200;
            s
        };
        let mut desc = desc_with_levels(0);
        desc[0] = 0xDEAD_BEEF;
        desc[1] = 0x1234_56FF;
        desc[6] = 1 << WORD6_COMPRESSION_EN_BIT;

        let md = compute_umd_metadata(&info, &exported, 1, &mut desc, false).unwrap();
        assert_eq!(desc[0], 0);
        assert_eq!(desc[1], 0x1234_5600);
        assert_eq!(md.size(), 40);
        assert_eq!(md.words()[0], 1);

        // Through bytes, as another process sees it
        let received = UmdMetadata::from_bytes(md.as_bytes());
        assert_eq!(received, md);

        let mut imported = with_dcc();
        assert_eq!(apply_umd_metadata(&info, &mut imported, 1, 1, &received), Ok(()));
        assert_eq!(imported.meta.offset, 0x34_1200);
    }

    #[test]
    fn test_gfx9_export_high_address() {
        let info = device(fixtures::gfx9());
        let mut surf = with_dcc();
        surf.meta.offset = (0x3 << 40) | 0x4_5600;
        let mut desc = [0xFFFF_FFFF; 8];

        compute_umd_metadata(&info, &surf, 1, &mut desc, false).unwrap();
        assert_eq!(desc[7], 0x456);
        assert_eq!(desc[5] >> WORD5_META_DATA_ADDRESS_SHIFT, 0x3);
        assert_eq!(desc[5] & 0x00FF_FFFF, 0x00FF_FFFF);
    }

    #[test]
    fn test_legacy_export_level_offsets() {
        let info = device(fixtures::gfx7());
        let mut layout = LegacyLayout::default();
        for offset_256b in [0, 64, 80] {
            layout.levels.push(LegacyLevel {
                offset_256b,
                ..LegacyLevel::default()
            });
        }
        let mut surf = SurfaceDescriptor::new(1, 1, 4, SurfaceFlags::empty());
        surf.layout = SurfaceLayout::Legacy(layout);

        let md = compute_umd_metadata(&info, &surf, 3, &mut [0; 8], false).unwrap();
        assert_eq!(md.size(), 13 * 4);
        assert_eq!(&md.words()[10..], &[0, 64, 80]);

        assert_eq!(
            compute_umd_metadata(&info, &surf, 4, &mut [0; 8], false),
            Err(Error::TooManyLevels(3))
        );
    }

    #[test]
    fn test_tool_metadata_with_modifier() {
        let info = device(fixtures::gfx10_3());
        let modifier = Modifier::AMD.with_flag(ModifierField::DCC, true);
        let mut surf = with_dcc().with_modifier(modifier);
        surf.unified_mut().unwrap().color.dcc_pitch_max = 63;

        let md = compute_umd_metadata(&info, &surf, 1, &mut [0; 8], true).unwrap();
        let words = md.words();
        assert_eq!(words[0], 3 | (1 << 16));
        assert_eq!(words[10], modifier.raw() as u32);
        assert_eq!(words[11], (modifier.raw() >> 32) as u32);
        assert_eq!(words[12], 2);
        // Main plane, then DCC
        assert_eq!(&words[13..17], &[0, 1024, 65536, 64]);
        assert_eq!(md.size(), 17 * 4);
    }

    #[test]
    fn test_tool_metadata_without_modifier() {
        let info = device(fixtures::gfx11());
        let md = compute_umd_metadata(&info, &with_dcc(), 1, &mut [0; 8], true).unwrap();
        assert_eq!(md.size(), 11 * 4);
        assert_eq!(md.words()[10], 1024);
    }

    #[test]
    fn test_family_override_trailer() {
        let mut info = device(fixtures::gfx11());
        info.family_overridden = true;
        let md = compute_umd_metadata(&info, &with_dcc(), 1, &mut [0; 8], false).unwrap();

        assert_eq!(md.words()[0], 3 | (1 << 17));
        assert_eq!(md.size(), 11 * 4);
        assert_eq!(md.words()[10], 14);
    }

    #[test]
    fn test_from_bytes_truncates() {
        let bytes = [0xAB; 300];
        let md = UmdMetadata::from_bytes(&bytes);
        assert_eq!(md.size(), 256);
        assert_eq!(md.words()[63], 0xABAB_ABAB);
    }

    #[test]
    fn test_push_overflow() {
        let mut md = UmdMetadata::new();
        for i in 0..UMD_METADATA_DWORDS as u32 {
            md.push(i).unwrap();
        }
        assert_eq!(md.push(0), Err(Error::MetadataOverflow));
    }
}
