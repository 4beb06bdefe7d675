//! Media resources used by `shape` and `play`.

use crate::error::{Result, TurtleError};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Broad media category, decided by file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
}

impl MediaKind {
    /// Classifies a file extension, case-insensitively.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" | "bmp" => Some(MediaKind::Image),
            "mp4" | "webm" | "ogv" | "mov" => Some(MediaKind::Video),
            "mp3" | "wav" | "ogg" | "m4a" | "flac" => Some(MediaKind::Audio),
            _ => None,
        }
    }
}

/// A loaded media file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resource {
    /// Key the resource was requested under.
    pub name: String,
    pub kind: MediaKind,
    /// Lowercase extension without the dot.
    pub ext: String,
    pub buffer: Vec<u8>,
}

/// Classifies `path` by extension without touching the disk.
pub fn classify(path: &Path) -> Result<(MediaKind, String)> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match MediaKind::from_extension(&ext) {
        Some(kind) => Ok((kind, ext)),
        None => Err(TurtleError::UnsupportedExtension {
            path: path.to_path_buf(),
            ext,
        }),
    }
}

/// Source of media bytes.
pub trait ResourceLoader: Send + Sync {
    fn load(&self, name: &str) -> Result<Resource>;
}

/// Loads resources from the filesystem, optionally relative to a root.
#[derive(Clone, Debug, Default)]
pub struct FsLoader {
    root: Option<PathBuf>,
}

impl FsLoader {
    /// Loader reading paths as given, relative to the working directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader resolving every name against `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, name: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(name),
            None => PathBuf::from(name),
        }
    }
}

impl ResourceLoader for FsLoader {
    fn load(&self, name: &str) -> Result<Resource> {
        let path = self.resolve(name);
        // Reject unknown extensions before doing any I/O.
        let (kind, ext) = classify(&path)?;
        let buffer = std::fs::read(&path).map_err(|source| TurtleError::ResourceUnavailable {
            path: path.clone(),
            source,
        })?;
        info!("Loaded {:?} resource {} ({} bytes)", kind, path.display(), buffer.len());
        Ok(Resource {
            name: name.to_string(),
            kind,
            ext,
            buffer,
        })
    }
}
