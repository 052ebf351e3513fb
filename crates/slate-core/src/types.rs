//! # Core Types
//!
//! GPU generations, chip families and the capability description every
//! layout computation is parameterized by.

// =============================================================================
// GENERATION
// =============================================================================

/// Graphics IP generation
///
/// Ordered: later generations compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GfxLevel {
    /// Southern Islands
    Gfx6,
    /// Sea Islands
    Gfx7,
    /// Volcanic Islands
    Gfx8,
    /// Vega, first unified-tiling generation
    Gfx9,
    /// Navi 1x
    Gfx10,
    /// Navi 2x (RB+)
    Gfx10_3,
    /// Navi 3x
    Gfx11,
    /// Strix-class APUs
    Gfx11_5,
    /// Navi 4x, third unified-tiling generation
    Gfx12,
}

impl GfxLevel {
    /// Which layout strategy family handles this generation
    pub const fn tiling(&self) -> TilingGeneration {
        match self {
            GfxLevel::Gfx6 | GfxLevel::Gfx7 | GfxLevel::Gfx8 => TilingGeneration::Legacy,
            GfxLevel::Gfx9 => TilingGeneration::UnifiedV1,
            GfxLevel::Gfx10 | GfxLevel::Gfx10_3 | GfxLevel::Gfx11 | GfxLevel::Gfx11_5 => {
                TilingGeneration::UnifiedV2
            }
            GfxLevel::Gfx12 => TilingGeneration::UnifiedV3,
        }
    }

    /// Whether this generation uses the unified (swizzle mode) layout
    #[inline]
    pub const fn is_unified(&self) -> bool {
        !matches!(self.tiling(), TilingGeneration::Legacy)
    }

    /// Numeric tag written into exported metadata when the family is spoofed
    pub const fn metadata_tag(&self) -> u32 {
        match self {
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
}

/// Tiling scheme family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TilingGeneration {
    /// Per-level tile modes and bank/pipe parameters (GFX6-8)
    Legacy,
    /// Swizzle modes, first revision (GFX9)
    UnifiedV1,
    /// Swizzle modes, second revision (GFX10-11)
    UnifiedV2,
    /// Swizzle modes, third revision (GFX12)
    UnifiedV3,
}

// =============================================================================
// CHIP FAMILY
// =============================================================================

/// Chip family
///
/// Ordered by release, so range checks such as "up to Rembrandt" are
/// plain comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum ChipFamily {
    Unknown,
    // GFX6
    Tahiti,
    Pitcairn,
    Verde,
    Oland,
    Hainan,
    // GFX7
    Bonaire,
    Kaveri,
    Kabini,
    Hawaii,
    // GFX8
    Tonga,
    Iceland,
    Carrizo,
    Fiji,
    Stoney,
    Polaris10,
    Polaris11,
    Polaris12,
    VegaM,
    // GFX9
    Vega10,
    Vega12,
    Vega20,
    Raven,
    Raven2,
    Renoir,
    // GFX10
    Navi10,
    Navi12,
    Navi14,
    Gfx1013,
    // GFX10.3
    Navi21,
    Navi22,
    Navi23,
    VanGogh,
    Navi24,
    Rembrandt,
    RaphaelMendocino,
    // GFX11
    Navi31,
    Navi32,
    Navi33,
    Phoenix,
    Phoenix2,
    // GFX11.5
    Gfx1150,
    Gfx1151,
    Gfx1152,
    Gfx1153,
    // GFX12
    Navi44,
    Navi48,
}

// =============================================================================
// VIDEO IP VERSION
// =============================================================================

/// Video codec IP version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct VcnVersion {
    /// Major version
    pub major: u8,
    /// Minor version
    pub minor: u8,
    /// Revision
    pub rev: u8,
}

impl VcnVersion {
    /// No VCN block (UVD/VCE hardware)
    pub const NONE: Self = Self::new(0, 0, 0);
    /// VCN 2.0.0
    pub const V2_0_0: Self = Self::new(2, 0, 0);
    /// VCN 2.2.0
    pub const V2_2_0: Self = Self::new(2, 2, 0);

    /// Create a version
    #[inline]
    pub const fn new(major: u8, minor: u8, rev: u8) -> Self {
        Self { major, minor, rev }
    }
}

// =============================================================================
// GPU CAPABILITIES
// =============================================================================

/// Description of the GPU a layout is computed for
///
/// Only the fields the layout engine reads are carried. Construct with
/// [`GpuInfo::new`] and refine with the `with_*` setters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpuInfo {
    /// Graphics generation
    pub gfx_level: GfxLevel,
    /// Chip family
    pub family: ChipFamily,
    /// Chip revision (hardware errata gate)
    pub chip_rev: u32,
    /// External chip revision
    pub chip_external_rev: u32,
    /// Kernel DRM interface minor version
    pub drm_minor: u32,
    /// PCI device id
    pub pci_id: u32,
    /// The GPU has a graphics queue
    pub has_graphics: bool,
    /// The GPU supports image opcodes (tiled images)
    pub has_image_opcodes: bool,
    /// Discrete GPU with its own VRAM
    pub has_dedicated_vram: bool,
    /// DCC constant encoding is available
    pub has_dcc_constant_encode: bool,
    /// Display engine consumes DCC without RB/pipe alignment
    pub use_display_dcc_unaligned: bool,
    /// Displayable DCC is produced by a retile blit
    pub use_display_dcc_with_retile_blit: bool,
    /// GFX12 display engine can scan out DCC
    pub gfx12_supports_display_dcc: bool,
    /// The reported family was overridden by the user
    pub family_overridden: bool,
    /// GB_ADDR_CONFIG register value
    pub gb_addr_config: u32,
    /// Tile pipe count (legacy generations)
    pub num_tile_pipes: u32,
    /// Pipe interleave in bytes (legacy generations)
    pub pipe_interleave_bytes: u32,
    /// Render backend count
    pub max_render_backends: u32,
    /// Video codec IP version
    pub vcn_ip_version: VcnVersion,
    /// GB_TILE_MODE register table (legacy generations)
    pub si_tile_mode_array: [u32; 32],
    /// GB_MACROTILE_MODE register table (GFX7-8)
    pub cik_macrotile_mode_array: [u32; 16],
}

impl GpuInfo {
    /// Create a capability description with defaults for a discrete GPU
    pub const fn new(gfx_level: GfxLevel, family: ChipFamily) -> Self {
        Self {
            gfx_level,
            family,
            chip_rev: 0,
            chip_external_rev: 0,
            drm_minor: 63,
            pci_id: 0,
            has_graphics: true,
            has_image_opcodes: true,
            has_dedicated_vram: true,
            has_dcc_constant_encode: false,
            use_display_dcc_unaligned: false,
            use_display_dcc_with_retile_blit: false,
            gfx12_supports_display_dcc: false,
            family_overridden: false,
            gb_addr_config: 0,
            num_tile_pipes: 2,
            pipe_interleave_bytes: 256,
            max_render_backends: 1,
            vcn_ip_version: VcnVersion::NONE,
            si_tile_mode_array: [0; 32],
            cik_macrotile_mode_array: [0; 16],
        }
    }

    /// Set the chip revision
    pub const fn with_chip_rev(mut self, rev: u32) -> Self {
        self.chip_rev = rev;
        self
    }

    /// Set the DRM minor version
    pub const fn with_drm_minor(mut self, minor: u32) -> Self {
        self.drm_minor = minor;
        self
    }

    /// Set the PCI device id
    pub const fn with_pci_id(mut self, pci_id: u32) -> Self {
        self.pci_id = pci_id;
        self
    }

    /// Set GB_ADDR_CONFIG
    pub const fn with_gb_addr_config(mut self, value: u32) -> Self {
        self.gb_addr_config = value;
        self
    }

    /// Mark the GPU as an APU without dedicated VRAM
    pub const fn without_dedicated_vram(mut self) -> Self {
        self.has_dedicated_vram = false;
        self
    }

    /// Mark the GPU as compute-only
    pub const fn without_graphics(mut self) -> Self {
        self.has_graphics = false;
        self
    }

    /// Set the legacy tile register tables
    pub const fn with_tile_tables(mut self, tile_modes: [u32; 32], macrotile_modes: [u32; 16]) -> Self {
        self.si_tile_mode_array = tile_modes;
        self.cik_macrotile_mode_array = macrotile_modes;
        self
    }

    /// Set the video IP version
    pub const fn with_vcn(mut self, version: VcnVersion) -> Self {
        self.vcn_ip_version = version;
        self
    }
}

// =============================================================================
// MODIFIER OPTIONS
// =============================================================================

/// Caller policy for modifier enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModifierOptions {
    /// Allow compressed (DCC) modifiers
    pub dcc: bool,
    /// Allow DCC modifiers that need a retile blit for display
    pub dcc_retile: bool,
}

static_assertions::assert_impl_all!(GpuInfo: Send, Sync, Copy);
