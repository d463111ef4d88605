//! Configuration for output stores.

use serde::{Deserialize, Serialize};

/// Chunk compression settings for the generation arrays.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// Compression codec.
    pub compression: ZarrCompression,

    /// Compression level (1-9).
    pub compression_level: u8,

    /// Enable byte shuffle filter for better compression.
    pub shuffle: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            compression: ZarrCompression::BloscZstd,
            compression_level: 3,
            shuffle: true,
        }
    }
}

impl StoreConfig {
    /// Uncompressed chunks.
    pub fn uncompressed() -> Self {
        Self {
            compression: ZarrCompression::None,
            ..Self::default()
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.compression != ZarrCompression::None
            && (self.compression_level == 0 || self.compression_level > 9)
        {
            return Err("compression_level must be 1-9".to_string());
        }
        Ok(())
    }
}

/// Compression codec for chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ZarrCompression {
    /// No compression.
    None,
    /// Blosc with LZ4.
    BloscLz4,
    /// Blosc with Zstd.
    #[default]
    BloscZstd,
}

impl ZarrCompression {
    /// Parse from string (case-insensitive), defaulting to Blosc/Zstd.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "none" => Self::None,
            "blosc_lz4" | "lz4" => Self::BloscLz4,
            _ => Self::BloscZstd,
        }
    }

    /// Get the codec name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::BloscLz4 => "blosc_lz4",
            Self::BloscZstd => "blosc_zstd",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compression() {
        assert_eq!(ZarrCompression::parse("NONE"), ZarrCompression::None);
        assert_eq!(ZarrCompression::parse("lz4"), ZarrCompression::BloscLz4);
        assert_eq!(ZarrCompression::parse("whatever"), ZarrCompression::BloscZstd);
        assert_eq!(ZarrCompression::BloscLz4.as_str(), "blosc_lz4");
    }

    #[test]
    fn test_validate_level() {
        assert!(StoreConfig::default().validate().is_ok());
        let bad = StoreConfig {
            compression_level: 0,
            ..StoreConfig::default()
        };
        assert!(bad.validate().is_err());
        let none = StoreConfig {
            compression_level: 0,
            ..StoreConfig::uncompressed()
        };
        assert!(none.validate().is_ok());
    }
}
