//! # Surface Configuration
//!
//! The caller-owned logical image shape and its validation.

use crate::error::{ConfigError, Result};
use crate::flags::SurfaceFlags;
use crate::math::{align_npot, align_u32, minify, next_pow2};

// =============================================================================
// EXTENT
// =============================================================================

/// A three-dimensional extent in elements or texels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent3d {
    /// Width
    pub width: u32,
    /// Height
    pub height: u32,
    /// Depth or slice count
    pub depth: u32,
}

impl Extent3d {
    /// Create an extent
    #[inline]
    pub const fn new(width: u32, height: u32, depth: u32) -> Self {
        Self { width, height, depth }
    }
}

// =============================================================================
// SURFACE CONFIG
// =============================================================================

/// Logical image shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceConfig {
    /// Width in texels
    pub width: u32,
    /// Height in texels
    pub height: u32,
    /// Depth in texels (3D images)
    pub depth: u32,
    /// Array layer count
    pub array_size: u32,
    /// Mip level count
    pub levels: u32,
    /// Visual sample count (0 and 1 both mean single-sampled)
    pub samples: u32,
    /// Stored fragment count, distinct from `samples` for compressed MSAA
    pub storage_samples: u32,
    /// Channel count of the pixel format
    pub num_channels: u32,
    /// 1D image
    pub is_1d: bool,
    /// 3D image
    pub is_3d: bool,
    /// Cube map
    pub is_cube: bool,
    /// Arrayed image
    pub is_array: bool,
}

impl SurfaceConfig {
    /// Single-sampled, single-level 2D image
    pub const fn new_2d(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            depth: 1,
            array_size: 1,
            levels: 1,
            samples: 1,
            storage_samples: 1,
            num_channels: 4,
            is_1d: false,
            is_3d: false,
            is_cube: false,
            is_array: false,
        }
    }

    /// Single-level 3D image
    pub const fn new_3d(width: u32, height: u32, depth: u32) -> Self {
        let mut config = Self::new_2d(width, height);
        config.depth = depth;
        config.is_3d = true;
        config
    }

    /// Set the mip level count
    pub const fn with_levels(mut self, levels: u32) -> Self {
        self.levels = levels;
        self
    }

    /// Set both visual and storage sample counts
    pub const fn with_samples(mut self, samples: u32) -> Self {
        self.samples = samples;
        self.storage_samples = samples;
        self
    }

    /// Set the array layer count
    pub const fn with_layers(mut self, layers: u32) -> Self {
        self.array_size = layers;
        self.is_array = layers > 1;
        self
    }

    /// Make this a cube map
    pub const fn cube(mut self) -> Self {
        self.is_cube = true;
        self.array_size = 6;
        self
    }

    /// Set the channel count
    pub const fn with_channels(mut self, channels: u32) -> Self {
        self.num_channels = channels;
        self
    }

    /// Sample count clamped to at least one
    #[inline]
    pub const fn num_samples(&self) -> u32 {
        if self.samples == 0 { 1 } else { self.samples }
    }

    /// Storage sample count clamped to at least one
    #[inline]
    pub const fn num_storage_samples(&self) -> u32 {
        if self.storage_samples == 0 { 1 } else { self.storage_samples }
    }

    /// Slices addressed per level: depth for 3D, six for cubes, else layers
    #[inline]
    pub const fn num_layers(&self) -> u32 {
        if self.is_3d {
            self.depth
        } else if self.is_cube {
            6
        } else {
            self.array_size
        }
    }

    /// Check the configuration against the rules every generation shares
    pub fn validate(&self, flags: SurfaceFlags) -> Result<()> {
        if flags.contains(SurfaceFlags::FMASK) {
            return Err(ConfigError::FmaskRequested.into());
        }

        if self.width == 0
            || self.height == 0
            || self.depth == 0
            || self.array_size == 0
            || self.levels == 0
        {
            return Err(ConfigError::ZeroExtent.into());
        }

        match self.samples {
            0 | 1 | 2 | 4 | 8 => {}
            16 if !flags.is_depth_stencil() => {}
            n => return Err(ConfigError::UnsupportedSampleCount(n).into()),
        }

        if !flags.is_depth_stencil() && !matches!(self.storage_samples, 0 | 1 | 2 | 4 | 8) {
            return Err(ConfigError::UnsupportedStorageSamples(self.storage_samples).into());
        }

        if self.is_3d && self.array_size > 1 {
            return Err(ConfigError::ArrayedVolume.into());
        }
        if self.is_cube && self.depth > 1 {
            return Err(ConfigError::DeepCube.into());
        }

        Ok(())
    }
}

// =============================================================================
// SIZE ESTIMATE
// =============================================================================

/// Rough memory footprint of a mip chain laid out in `tile`-sized blocks
///
/// `block` is the element footprint in texels and `bpp` the bits per
/// element. The mip-tail is approximated: the walk stops at the first level
/// smaller than half a tile once tiles are at least 4 KiB.
pub fn estimate_size(
    config: &SurfaceConfig,
    block: (u32, u32),
    bpp: u32,
    width: u32,
    height: u32,
    tile: Extent3d,
) -> u64 {
    debug_assert!(bpp != 0);
    let (blk_w, blk_h) = block;
    let samples = config.num_samples();
    let bpe = bpp / 8;
    let mut w = align_npot(width as u64, (tile.width * blk_w) as u64) as u32;
    let mut h = align_npot(height as u64, (tile.height * blk_h) as u64) as u32;
    let mut d = align_u32(config.num_layers(), tile.depth);
    let tile_bytes = (tile.width * tile.height * tile.depth * samples * bpe) as u64;

    if config.levels > 1 && tile.height > 1 {
        w = next_pow2(w);
        h = next_pow2(h);
    }

    let mut size = 0u64;
    for _ in 0..config.levels {
        let level_size = w.div_ceil(blk_w) as u64
            * h.div_ceil(blk_h) as u64
            * d as u64
            * samples as u64
            * bpe as u64;
        size += level_size;

        if tile_bytes >= 4096 && level_size <= tile_bytes / 2 {
            return size;
        }

        w = minify(w, 1);
        h = minify(h, 1);
        if config.is_3d {
            d = minify(d, 1);
        }
    }

    size
}

static_assertions::assert_impl_all!(SurfaceConfig: Send, Sync, Copy);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_validate_ok() {
        assert!(SurfaceConfig::new_2d(64, 64).validate(SurfaceFlags::empty()).is_ok());
        assert!(
            SurfaceConfig::new_2d(64, 64)
                .with_samples(16)
                .validate(SurfaceFlags::empty())
                .is_ok()
        );
    }

    #[test]
    fn test_validate_zero_extent() {
        let mut c = SurfaceConfig::new_2d(64, 64);
        c.levels = 0;
        assert_eq!(
            c.validate(SurfaceFlags::empty()),
            Err(Error::InvalidConfig(ConfigError::ZeroExtent))
        );
    }

    #[test]
    fn test_validate_samples() {
        let c = SurfaceConfig::new_2d(64, 64).with_samples(16);
        assert_eq!(
            c.validate(SurfaceFlags::ZBUFFER),
            Err(Error::InvalidConfig(ConfigError::UnsupportedSampleCount(16)))
        );

        let c = SurfaceConfig::new_2d(64, 64).with_samples(3);
        assert!(c.validate(SurfaceFlags::empty()).is_err());

        let mut c = SurfaceConfig::new_2d(64, 64).with_samples(8);
        c.storage_samples = 16;
        assert_eq!(
            c.validate(SurfaceFlags::empty()),
            Err(Error::InvalidConfig(ConfigError::UnsupportedStorageSamples(16)))
        );
        // Storage samples are not checked for depth
        assert!(c.validate(SurfaceFlags::ZBUFFER).is_ok());
    }

    #[test]
    fn test_validate_shape_conflicts() {
        let mut c = SurfaceConfig::new_3d(16, 16, 4);
        c.array_size = 2;
        assert_eq!(
            c.validate(SurfaceFlags::empty()),
            Err(Error::InvalidConfig(ConfigError::ArrayedVolume))
        );

        let mut c = SurfaceConfig::new_2d(16, 16).cube();
        c.depth = 2;
        assert_eq!(
            c.validate(SurfaceFlags::empty()),
            Err(Error::InvalidConfig(ConfigError::DeepCube))
        );

        assert_eq!(
            SurfaceConfig::new_2d(16, 16).validate(SurfaceFlags::FMASK),
            Err(Error::InvalidConfig(ConfigError::FmaskRequested))
        );
    }

    #[test]
    fn test_estimate_single_level() {
        let c = SurfaceConfig::new_2d(100, 100);
        // 128x128 after 64x64 tile alignment, 4 bytes per element
        let size = estimate_size(&c, (1, 1), 32, 100, 100, Extent3d::new(64, 64, 1));
        assert_eq!(size, 128 * 128 * 4);
    }

    #[test]
    fn test_estimate_stops_in_mip_tail() {
        let c = SurfaceConfig::new_2d(256, 256).with_levels(9);
        let tile = Extent3d::new(64, 64, 1);
        // Tile is 16 KiB; levels 256, 128, 64, 32 (4 KiB <= 8 KiB stops)
        let size = estimate_size(&c, (1, 1), 32, 256, 256, tile);
        assert_eq!(size, (256 * 256 + 128 * 128 + 64 * 64 + 32 * 32) * 4);
    }
}
