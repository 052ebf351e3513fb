//! # SLATE Error Handling
//!
//! Error types shared by every crate of the layout engine.
//!
//! Error handling in SLATE follows these principles:
//! - Recoverable failures are typed and returned, never logged-and-ignored
//! - Oracle failures are propagated verbatim with their return code
//! - Contract violations by the caller are assertions, not errors
//! - Errors are `no_std` compatible and `Copy`

use core::fmt;

// =============================================================================
// RESULT TYPE
// =============================================================================

/// SLATE Result type alias
pub type Result<T> = core::result::Result<T, Error>;

// =============================================================================
// ERROR ENUM
// =============================================================================

/// SLATE unified error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// The surface configuration failed validation
    InvalidConfig(ConfigError),
    /// More mip levels were requested than a descriptor can hold
    TooManyLevels(u32),

    // =========================================================================
    // Oracle Errors
    // =========================================================================
    /// The address oracle rejected its input
    Oracle(OracleError),

    // =========================================================================
    // Generation Errors
    // =========================================================================
    /// The operation does not exist on this GPU generation
    UnsupportedGeneration,
    /// The layout modifier cannot be used with this surface
    UnsupportedModifier,
    /// The oracle picked a micro tile mode the hardware cannot sample
    UnsupportedMicroTileMode,

    // =========================================================================
    // Metadata Errors
    // =========================================================================
    /// Imported metadata disagrees with the caller's image parameters
    MetadataMismatch,
    /// The destination metadata buffer is too small
    MetadataOverflow,

    // =========================================================================
    // Plane Errors
    // =========================================================================
    /// Plane index out of range for this descriptor
    InvalidPlane(u32),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfig(e) => write!(f, "Invalid surface configuration: {}", e),
            Error::TooManyLevels(n) => write!(f, "Too many mip levels: {}", n),
            Error::Oracle(e) => write!(f, "Address oracle failure: {}", e),
            Error::UnsupportedGeneration => write!(f, "Operation not supported on this generation"),
            Error::UnsupportedModifier => write!(f, "Layout modifier not supported"),
            Error::UnsupportedMicroTileMode => write!(f, "Unsupported micro tile mode"),
            Error::MetadataMismatch => write!(f, "Metadata does not match image parameters"),
            Error::MetadataOverflow => write!(f, "Metadata buffer too small"),
            Error::InvalidPlane(p) => write!(f, "Invalid plane index {}", p),
        }
    }
}

// =============================================================================
// CONFIGURATION ERRORS
// =============================================================================

/// Which configuration rule was violated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A width, height, depth, layer count or level count is zero
    ZeroExtent,
    /// Sample count outside {0, 1, 2, 4, 8, 16}, or 16 on depth/stencil
    UnsupportedSampleCount(u32),
    /// Storage sample count outside {0, 1, 2, 4, 8}
    UnsupportedStorageSamples(u32),
    /// 3D images cannot have array layers
    ArrayedVolume,
    /// Cube images cannot have depth
    DeepCube,
    /// FMASK is allocated with its color surface, never on its own
    FmaskRequested,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroExtent => write!(f, "zero extent"),
            ConfigError::UnsupportedSampleCount(n) => write!(f, "unsupported sample count {}", n),
            ConfigError::UnsupportedStorageSamples(n) => {
                write!(f, "unsupported storage sample count {}", n)
            }
            ConfigError::ArrayedVolume => write!(f, "3D image with array layers"),
            ConfigError::DeepCube => write!(f, "cube image with depth"),
            ConfigError::FmaskRequested => write!(f, "standalone FMASK surface"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::InvalidConfig(e)
    }
}

// =============================================================================
// ORACLE ERRORS
// =============================================================================

/// Return code reported by the address oracle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OracleError {
    code: u32,
}

impl OracleError {
    /// Generic failure
    pub const ERROR: Self = Self::new(1);
    /// The oracle does not support the requested operation
    pub const NOT_SUPPORTED: Self = Self::new(2);
    /// The oracle was handed an invalid parameter
    pub const INVALID_PARAMS: Self = Self::new(3);

    /// Wrap a raw oracle return code
    #[inline]
    pub const fn new(code: u32) -> Self {
        Self { code }
    }

    /// Raw oracle return code
    #[inline]
    pub const fn code(&self) -> u32 {
        self.code
    }
}

impl fmt::Display for OracleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "code {}", self.code)
    }
}

impl From<OracleError> for Error {
    fn from(e: OracleError) -> Self {
        Error::Oracle(e)
    }
}

static_assertions::assert_impl_all!(Error: Send, Sync, Copy);

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_config_error_converts() {
        let e: Error = ConfigError::DeepCube.into();
        assert_eq!(e, Error::InvalidConfig(ConfigError::DeepCube));
    }

    #[test]
    fn test_display_carries_oracle_code() {
        let e: Error = OracleError::new(7).into();
        assert_eq!(e.to_string(), "Address oracle failure: code 7");
    }
}
