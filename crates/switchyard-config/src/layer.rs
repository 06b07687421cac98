//! The five configuration tiers and their priority order

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::Error;

/// One tier of the configuration hierarchy.
///
/// Declaration order is priority order: earlier variants win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigLayer {
    /// `SWITCHYARD_*` process environment variables
    #[serde(rename = "env")]
    Environment,
    /// `.switchyard.toml` found by searching upward from the working directory
    Project,
    /// Host-local file that is never synced between machines
    Machine,
    /// The primary persisted store
    User,
    /// Compiled-in fallback values
    Default,
}

impl ConfigLayer {
    /// Every layer, highest priority first.
    pub const ALL: [ConfigLayer; 5] = [
        Self::Environment,
        Self::Project,
        Self::Machine,
        Self::User,
        Self::Default,
    ];

    /// The layers backed by a file on disk, highest priority first.
    pub const FILES: [ConfigLayer; 3] = [Self::Project, Self::Machine, Self::User];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Environment => "env",
            Self::Project => "project",
            Self::Machine => "machine",
            Self::User => "user",
            Self::Default => "default",
        }
    }

    /// Whether `Set` may target this layer.
    pub fn is_writable(&self) -> bool {
        matches!(self, Self::Project | Self::Machine | Self::User)
    }
}

impl fmt::Display for ConfigLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigLayer {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "env" | "environment" => Ok(Self::Environment),
            "project" => Ok(Self::Project),
            "machine" => Ok(Self::Machine),
            "user" => Ok(Self::User),
            "default" => Ok(Self::Default),
            _ => Err(Error::UnknownLayer {
                name: s.to_string(),
            }),
        }
    }
}
