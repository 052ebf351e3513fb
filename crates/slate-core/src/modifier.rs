//! # Layout Modifiers
//!
//! Opaque 64-bit tags describing a concrete tiling and compression
//! configuration, exchanged between processes and devices. The bit layout is
//! the kernel's `AMD_FMT_MOD` encoding and must not change.

use core::fmt;

use crate::swizzle::SwizzleMode;
use crate::types::GfxLevel;

// =============================================================================
// FIELDS
// =============================================================================

/// A bit field inside a modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModifierField {
    shift: u32,
    mask: u64,
}

impl ModifierField {
    const fn new(shift: u32, mask: u64) -> Self {
        Self { shift, mask }
    }

    /// Tiling algorithm version
    pub const TILE_VERSION: Self = Self::new(0, 0xFF);
    /// Swizzle mode
    pub const TILE: Self = Self::new(8, 0x1F);
    /// DCC present
    pub const DCC: Self = Self::new(13, 0x1);
    /// DCC must be retiled for display
    pub const DCC_RETILE: Self = Self::new(14, 0x1);
    /// DCC is pipe aligned
    pub const DCC_PIPE_ALIGN: Self = Self::new(15, 0x1);
    /// DCC independent 64 B blocks
    pub const DCC_INDEPENDENT_64B: Self = Self::new(16, 0x1);
    /// DCC independent 128 B blocks
    pub const DCC_INDEPENDENT_128B: Self = Self::new(17, 0x1);
    /// DCC max compressed block size
    pub const DCC_MAX_COMPRESSED_BLOCK: Self = Self::new(18, 0x3);
    /// DCC constant encoding
    pub const DCC_CONSTANT_ENCODE: Self = Self::new(20, 0x1);
    /// Pipe XOR bits
    pub const PIPE_XOR_BITS: Self = Self::new(21, 0x7);
    /// Bank XOR bits
    pub const BANK_XOR_BITS: Self = Self::new(24, 0x7);
    /// Packer count (log2)
    pub const PACKERS: Self = Self::new(27, 0x7);
    /// Render backends (log2)
    pub const RB: Self = Self::new(30, 0x7);
    /// Pipes (log2)
    pub const PIPE: Self = Self::new(33, 0x7);
}

// =============================================================================
// FIELD VALUES
// =============================================================================

/// Tiling algorithm versions
pub mod tile_version {
    /// GFX9
    pub const GFX9: u64 = 1;
    /// GFX10
    pub const GFX10: u64 = 2;
    /// GFX10.3 (RB+)
    pub const GFX10_RBPLUS: u64 = 3;
    /// GFX11
    pub const GFX11: u64 = 4;
    /// GFX12
    pub const GFX12: u64 = 5;
}

/// Swizzle values in the TILE field
pub mod tile {
    /// 64 KiB standard
    pub const GFX9_64K_S: u64 = 9;
    /// 64 KiB display
    pub const GFX9_64K_D: u64 = 10;
    /// 64 KiB standard, XOR
    pub const GFX9_64K_S_X: u64 = 25;
    /// 64 KiB display, XOR
    pub const GFX9_64K_D_X: u64 = 26;
    /// 64 KiB rotated, XOR
    pub const GFX9_64K_R_X: u64 = 27;
    /// 256 KiB rotated, XOR
    pub const GFX11_256K_R_X: u64 = 31;
    /// GFX12 256 B planar
    pub const GFX12_256B_2D: u64 = 1;
    /// GFX12 4 KiB planar
    pub const GFX12_4K_2D: u64 = 2;
    /// GFX12 64 KiB planar
    pub const GFX12_64K_2D: u64 = 3;
    /// GFX12 256 KiB planar
    pub const GFX12_256K_2D: u64 = 4;
}

/// DCC max compressed block size values
pub mod dcc_block {
    /// 64 B
    pub const B64: u64 = 0;
    /// 128 B
    pub const B128: u64 = 1;
    /// 256 B
    pub const B256: u64 = 2;
}

// =============================================================================
// MODIFIER
// =============================================================================

/// A layout modifier
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Modifier(u64);

impl Modifier {
    /// Linear layout
    pub const LINEAR: Self = Self(0);
    /// No modifier
    pub const INVALID: Self = Self(0x00ff_ffff_ffff_ffff);
    /// Base value of every AMD modifier
    pub const AMD: Self = Self(2 << 56);

    /// Wrap a raw modifier
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw modifier
    #[inline]
    pub const fn raw(&self) -> u64 {
        self.0
    }

    /// Vendor is AMD
    #[inline]
    pub const fn is_amd(&self) -> bool {
        (self.0 >> 56) == 2
    }

    /// A modifier is set (anything but [`Modifier::INVALID`])
    #[inline]
    pub const fn is_set(&self) -> bool {
        self.0 != Self::INVALID.0
    }

    /// Read a field
    #[inline]
    pub const fn get(&self, field: ModifierField) -> u64 {
        (self.0 >> field.shift) & field.mask
    }

    /// Return a copy with a field replaced
    #[inline]
    pub const fn with(self, field: ModifierField, value: u64) -> Self {
        let cleared = self.0 & !(field.mask << field.shift);
        Self(cleared | ((value & field.mask) << field.shift))
    }

    /// Return a copy with a boolean field set or cleared
    #[inline]
    pub const fn with_flag(self, field: ModifierField, value: bool) -> Self {
        self.with(field, value as u64)
    }

    /// Tiling algorithm version
    #[inline]
    pub const fn tile_version(&self) -> u64 {
        self.get(ModifierField::TILE_VERSION)
    }

    /// Carries DCC
    #[inline]
    pub const fn has_dcc(&self) -> bool {
        self.is_amd() && self.get(ModifierField::DCC) != 0
    }

    /// DCC needs a retile blit for display
    #[inline]
    pub const fn has_dcc_retile(&self) -> bool {
        self.is_amd() && self.get(ModifierField::DCC_RETILE) != 0
    }

    /// DCC independent 64 B blocks
    #[inline]
    pub const fn dcc_independent_64b(&self) -> bool {
        self.get(ModifierField::DCC_INDEPENDENT_64B) != 0
    }

    /// DCC independent 128 B blocks
    #[inline]
    pub const fn dcc_independent_128b(&self) -> bool {
        self.get(ModifierField::DCC_INDEPENDENT_128B) != 0
    }

    /// DCC max compressed block size
    #[inline]
    pub const fn dcc_max_compressed_block(&self) -> u64 {
        self.get(ModifierField::DCC_MAX_COMPRESSED_BLOCK)
    }

    /// Swizzle mode this modifier forces
    ///
    /// On GFX12 a GFX11-version modifier is translated; only the 64 KiB
    /// display mode has a GFX12 counterpart, other modes yield `None`.
    pub fn swizzle_mode(&self, gfx: GfxLevel) -> Option<SwizzleMode> {
        if *self == Self::LINEAR {
            return Some(SwizzleMode::LINEAR);
        }

        let tile_field = self.get(ModifierField::TILE);
        if gfx >= GfxLevel::Gfx12 && self.tile_version() == tile_version::GFX11 {
            return (tile_field == tile::GFX9_64K_D).then_some(SwizzleMode::GFX12_64KB_2D);
        }

        Some(SwizzleMode::from_raw(tile_field as u8))
    }

    /// Whether DCC image stores work with this modifier
    pub const fn supports_dcc_image_stores(&self, gfx: GfxLevel) -> bool {
        if !self.has_dcc() {
            return false;
        }
        if matches!(gfx, GfxLevel::Gfx12) {
            return true;
        }

        let i64b = self.dcc_independent_64b();
        let i128b = self.dcc_independent_128b();
        let max = self.dcc_max_compressed_block();
        let is_gfx11_5 = matches!(gfx, GfxLevel::Gfx11_5);

        (!i64b && i128b && max == dcc_block::B128)
            || (self.tile_version() >= tile_version::GFX10_RBPLUS
                && i64b
                && i128b
                && max == dcc_block::B64)
            || (is_gfx11_5
                && self.tile_version() >= tile_version::GFX11
                && !i64b
                && i128b
                && max == dcc_block::B256)
    }
}

impl Default for Modifier {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Debug for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Modifier({:#018x})", self.0)
    }
}

static_assertions::const_assert_eq!(core::mem::size_of::<Modifier>(), 8);
static_assertions::assert_impl_all!(Modifier: Send, Sync, Copy);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_set_get() {
        let m = Modifier::AMD
            .with(ModifierField::TILE_VERSION, tile_version::GFX10)
            .with(ModifierField::TILE, tile::GFX9_64K_R_X)
            .with_flag(ModifierField::DCC, true)
            .with(ModifierField::PIPE_XOR_BITS, 4);
        assert!(m.is_amd());
        assert!(m.has_dcc());
        assert!(!m.has_dcc_retile());
        assert_eq!(m.get(ModifierField::TILE), 27);
        assert_eq!(m.get(ModifierField::PIPE_XOR_BITS), 4);
        assert_eq!(m.tile_version(), 2);
    }

    #[test]
    fn test_with_masks_value() {
        let m = Modifier::AMD.with(ModifierField::RB, 0xF);
        assert_eq!(m.get(ModifierField::RB), 0x7);
    }

    #[test]
    fn test_linear_is_not_amd() {
        assert!(!Modifier::LINEAR.is_amd());
        assert!(!Modifier::LINEAR.has_dcc());
        assert!(!Modifier::INVALID.is_set());
        assert_eq!(Modifier::default(), Modifier::INVALID);
    }

    #[test]
    fn test_gfx12_translates_gfx11_64k_d() {
        let m = Modifier::AMD
            .with(ModifierField::TILE_VERSION, tile_version::GFX11)
            .with(ModifierField::TILE, tile::GFX9_64K_D);
        assert_eq!(m.swizzle_mode(GfxLevel::Gfx12), Some(SwizzleMode::GFX12_64KB_2D));
        assert_eq!(m.swizzle_mode(GfxLevel::Gfx11), Some(SwizzleMode::SW_64KB_D));

        let r_x = m.with(ModifierField::TILE, tile::GFX9_64K_R_X);
        assert_eq!(r_x.swizzle_mode(GfxLevel::Gfx12), None);
    }

    #[test]
    fn test_dcc_image_store_combinations() {
        let base = Modifier::AMD
            .with(ModifierField::TILE_VERSION, tile_version::GFX10)
            .with_flag(ModifierField::DCC, true);
        let m128 = base
            .with_flag(ModifierField::DCC_INDEPENDENT_128B, true)
            .with(ModifierField::DCC_MAX_COMPRESSED_BLOCK, dcc_block::B128);
        assert!(m128.supports_dcc_image_stores(GfxLevel::Gfx10));

        let m64 = base
            .with_flag(ModifierField::DCC_INDEPENDENT_64B, true)
            .with_flag(ModifierField::DCC_INDEPENDENT_128B, true)
            .with(ModifierField::DCC_MAX_COMPRESSED_BLOCK, dcc_block::B64);
        assert!(!m64.supports_dcc_image_stores(GfxLevel::Gfx10));
        let m64_rbplus = m64.with(ModifierField::TILE_VERSION, tile_version::GFX10_RBPLUS);
        assert!(m64_rbplus.supports_dcc_image_stores(GfxLevel::Gfx10_3));

        assert!(!Modifier::LINEAR.supports_dcc_image_stores(GfxLevel::Gfx12));
    }
}
