//! Normalized path handling for layer files

use std::path::{Path, PathBuf};

/// A path normalized to use forward slashes internally.
///
/// Layer origins are reported to callers as strings, so every path the store
/// touches goes through this type to keep diagnostics identical across
/// platforms. Conversion back to a native path happens only at I/O boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy();
        Self {
            inner: path_str.replace('\\', "/"),
        }
    }

    /// Canonicalize an existing path, falling back to the path as given.
    ///
    /// Uses `dunce` so Windows paths do not pick up the `\\?\` prefix.
    pub fn canonical(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match dunce::canonicalize(path) {
            Ok(resolved) => Self::new(resolved),
            Err(_) => Self::new(path),
        }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Join this path with a segment.
    pub fn join(&self, segment: &str) -> Self {
        let segment = segment.replace('\\', "/");
        let joined = if self.inner.ends_with('/') {
            format!("{}{}", self.inner, segment)
        } else {
            format!("{}/{}", self.inner, segment)
        };
        Self { inner: joined }
    }

    /// Get the parent directory.
    pub fn parent(&self) -> Option<Self> {
        let trimmed = self.inner.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(0) if trimmed.len() > 1 => Some(Self {
                inner: "/".to_string(),
            }),
            Some(idx) if idx > 0 => {
                let head = &trimmed[..idx];
                // `C:` alone is a drive-relative path; keep the root slash
                let inner = if head.ends_with(':') {
                    format!("{head}/")
                } else {
                    head.to_string()
                };
                Some(Self { inner })
            }
            _ => None,
        }
    }

    /// Iterate over this path and each of its ancestors, nearest first.
    pub fn ancestors(&self) -> Ancestors {
        Ancestors {
            next: Some(self.clone()),
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        let trimmed = self.inner.trim_end_matches('/');
        trimmed.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Get the extension if present.
    ///
    /// Dotfiles without a second dot (`.switchyard`) have no extension.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 { None } else { Some(&name[idx + 1..]) }
        })
    }

    /// Check if this path exists on the filesystem.
    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.to_native().is_dir()
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        self.to_native().is_file()
    }
}

/// Iterator returned by [`NormalizedPath::ancestors`].
#[derive(Debug)]
pub struct Ancestors {
    next: Option<NormalizedPath>,
}

impl Iterator for Ancestors {
    type Item = NormalizedPath;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.parent();
        Some(current)
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}
