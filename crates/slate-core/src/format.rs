//! # Format Classifier
//!
//! Maps an element shape (block footprint, bytes per element) to the format
//! code the address oracle understands. The oracle only needs shape
//! information, so unrelated formats of the same shape share a code.

use crate::flags::SurfaceFlags;
use crate::types::GfxLevel;

// =============================================================================
// ORACLE FORMAT CODES
// =============================================================================

/// Format codes consumed by the address oracle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[allow(missing_docs)]
pub enum AddrFormat {
    #[default]
    Invalid,
    R8,
    R16,
    R32,
    R32G32,
    R32G32B32,
    R32G32B32A32,
    Bc1,
    Bc3,
    Astc5x4,
    Astc5x5,
    Astc6x5,
    Astc6x6,
    Astc8x5,
    Astc8x6,
    Astc8x8,
    Astc10x5,
    Astc10x6,
    Astc10x8,
    Astc10x10,
    Astc12x10,
    Astc12x12,
}

impl AddrFormat {
    /// ASTC block-compressed format
    pub const fn is_astc(&self) -> bool {
        matches!(
            self,
            AddrFormat::Astc5x4
                | AddrFormat::Astc5x5
                | AddrFormat::Astc6x5
                | AddrFormat::Astc6x6
                | AddrFormat::Astc8x5
                | AddrFormat::Astc8x6
                | AddrFormat::Astc8x8
                | AddrFormat::Astc10x5
                | AddrFormat::Astc10x6
                | AddrFormat::Astc10x8
                | AddrFormat::Astc10x10
                | AddrFormat::Astc12x10
                | AddrFormat::Astc12x12
        )
    }
}

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// Whether an element footprint is block compressed
#[inline]
pub const fn is_compressed(blk_w: u32, blk_h: u32) -> bool {
    blk_w > 1 || blk_h > 1
}

/// Classify an element shape
///
/// # Panics
///
/// Panics on a bytes-per-element value that no supported 1x1 or 4x4
/// format has. That combination means the caller's format tables are
/// inconsistent.
pub fn classify(blk_w: u32, blk_h: u32, bpe: u32, flags: SurfaceFlags) -> AddrFormat {
    if blk_w != 1 || blk_h != 1 {
        return match (blk_w, blk_h) {
            (4, 4) => match bpe {
                8 => AddrFormat::Bc1,
                // BC3 and ASTC 4x4 share a shape
                16 => AddrFormat::Bc3,
                _ => panic!("invalid compressed bpe {}", bpe),
            },
            (5, 4) => AddrFormat::Astc5x4,
            (5, 5) => AddrFormat::Astc5x5,
            (6, 5) => AddrFormat::Astc6x5,
            (6, 6) => AddrFormat::Astc6x6,
            (8, 5) => AddrFormat::Astc8x5,
            (8, 6) => AddrFormat::Astc8x6,
            (8, 8) => AddrFormat::Astc8x8,
            (10, 5) => AddrFormat::Astc10x5,
            (10, 6) => AddrFormat::Astc10x6,
            (10, 8) => AddrFormat::Astc10x8,
            (10, 10) => AddrFormat::Astc10x10,
            (12, 10) => AddrFormat::Astc12x10,
            (12, 12) => AddrFormat::Astc12x12,
            _ => AddrFormat::Invalid,
        };
    }

    match bpe {
        1 => {
            debug_assert!(!flags.contains(SurfaceFlags::ZBUFFER));
            AddrFormat::R8
        }
        2 => AddrFormat::R16,
        4 => AddrFormat::R32,
        8 => {
            debug_assert!(!flags.is_depth_stencil());
            AddrFormat::R32G32
        }
        12 => {
            debug_assert!(!flags.is_depth_stencil());
            AddrFormat::R32G32B32
        }
        16 => {
            debug_assert!(!flags.is_depth_stencil());
            AddrFormat::R32G32B32A32
        }
        _ => panic!("invalid bpe {}", bpe),
    }
}

/// Classify for a specific generation
///
/// The legacy oracle mishandles the 96-bit triple format; since only the
/// shape matters it is passed as [`AddrFormat::Invalid`] there.
pub fn classify_for(gfx: GfxLevel, blk_w: u32, blk_h: u32, bpe: u32, flags: SurfaceFlags) -> AddrFormat {
    match classify(blk_w, blk_h, bpe, flags) {
        AddrFormat::R32G32B32 if gfx <= GfxLevel::Gfx8 => AddrFormat::Invalid,
        f => f,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_scalar() {
        let f = SurfaceFlags::empty();
        assert_eq!(classify(1, 1, 1, f), AddrFormat::R8);
        assert_eq!(classify(1, 1, 4, f), AddrFormat::R32);
        assert_eq!(classify(1, 1, 12, f), AddrFormat::R32G32B32);
        assert_eq!(classify(1, 1, 16, f), AddrFormat::R32G32B32A32);
    }

    #[test]
    fn test_classify_block_compressed() {
        let f = SurfaceFlags::empty();
        assert_eq!(classify(4, 4, 8, f), AddrFormat::Bc1);
        assert_eq!(classify(4, 4, 16, f), AddrFormat::Bc3);
        assert_eq!(classify(10, 8, 16, f), AddrFormat::Astc10x8);
        assert!(classify(12, 12, 16, f).is_astc());
        assert_eq!(classify(3, 3, 16, f), AddrFormat::Invalid);
    }

    #[test]
    fn test_triple_format_remapped_on_legacy() {
        let f = SurfaceFlags::empty();
        assert_eq!(classify_for(GfxLevel::Gfx8, 1, 1, 12, f), AddrFormat::Invalid);
        assert_eq!(classify_for(GfxLevel::Gfx9, 1, 1, 12, f), AddrFormat::R32G32B32);
    }

    #[test]
    #[should_panic]
    fn test_invalid_bpe_panics() {
        classify(1, 1, 3, SurfaceFlags::empty());
    }
}
