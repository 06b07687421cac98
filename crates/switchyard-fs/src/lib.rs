//! Filesystem primitives for switchyard
//!
//! Normalized paths, format detection for layer files, and atomic locked writes.

pub mod error;
pub mod format;
pub mod io;
pub mod path;

pub use error::{Error, Result};
pub use format::FileFormat;
pub use path::NormalizedPath;
