//! Discoverable font catalog.
//!
//! A catalog is built by scanning a directory tree for TrueType/OpenType
//! files. Each face is keyed by its file stem (`Roboto-Bold.ttf` becomes
//! `Roboto-Bold`), which carries both family and style. Faces are parsed
//! lazily when selected.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ab_glyph::FontArc;
use tracing::debug;

use crate::error::{Error, Result};

/// Name-to-path index of every font file found under a root directory.
#[derive(Debug, Clone, Default)]
pub struct FontCatalog {
    entries: BTreeMap<String, PathBuf>,
}

impl FontCatalog {
    /// Scan `root` recursively for `.ttf` and `.otf` files.
    ///
    /// When two files share a stem, the one visited last wins.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if `root` cannot be read.
    pub fn scan(root: &Path) -> Result<Self> {
        let mut catalog = Self::default();
        let mut pending = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            for entry in std::fs::read_dir(&dir)? {
                let path = entry?.path();
                if path.is_dir() {
                    pending.push(path);
                } else if is_font_file(&path) {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        catalog.entries.insert(stem.to_string(), path.clone());
                    }
                }
            }
        }

        debug!(root = %root.display(), fonts = catalog.len(), "font catalog scanned");
        Ok(catalog)
    }

    /// Register a single font file under an explicit name.
    pub fn insert(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.entries.insert(name.into(), path.into());
    }

    /// Font names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// First font name in sorted order (the default selection).
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.names().next()
    }

    /// Path of a named font.
    #[must_use]
    pub fn path(&self, name: &str) -> Option<&Path> {
        self.entries.get(name).map(PathBuf::as_path)
    }

    /// Number of fonts in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read and parse a named font.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownFont`] for a name not in the catalog, or any
    /// error from [`load_font`].
    pub fn load(&self, name: &str) -> Result<FontArc> {
        let path = self
            .path(name)
            .ok_or_else(|| Error::UnknownFont(name.to_string()))?;
        load_font(path)
    }
}

/// Read and parse a font file.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read and [`Error::FontLoad`] if
/// the bytes are not a usable font.
pub fn load_font(path: &Path) -> Result<FontArc> {
    let bytes = std::fs::read(path)?;
    FontArc::try_from_vec(bytes).map_err(|e| Error::FontLoad(format!("{}: {e}", path.display())))
}

fn is_font_file(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(ext.to_lowercase().as_str(), "ttf" | "otf"),
        None => false,
    }
}
