//! Layer file format detection

use std::fmt;

use crate::{Error, NormalizedPath, Result};

/// Structured file formats a layer file may be written in.
///
/// Detected from the file extension:
/// - `.toml` -> TOML
/// - `.json` -> JSON
/// - `.yaml`, `.yml` -> YAML
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    Toml,
    Json,
    Yaml,
}

impl FileFormat {
    /// Detect the format of `path` from its extension.
    pub fn detect(path: &NormalizedPath) -> Result<Self> {
        let extension = path.extension().unwrap_or("");
        match extension.to_lowercase().as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(Error::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
