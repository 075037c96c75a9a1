//! Cache naming for resized images.
//!
//! Resized files are stored under a sharded cache directory. The file name
//! carries a short key derived from everything that influences the output,
//! so a changed parameter or a touched source simply produces a new name:
//!
//! ```text
//! <cache_dir>/<last key char>/<source stem>-<key>.<ext>
//! assets/images/7/photo-3e1a9cf7.jpg
//! ```
//!
//! ## Cache keys
//!
//! The key is the first 8 hex characters of a SHA-256 digest over the
//! target dimensions, source path, resize mode, zoom, important part and the
//! source modification time. The last key character picks one of 16 shard
//! directories.
//!
//! Keys use the source mtime, not its content. A cache hit only identifies
//! the source; its pixels are never decoded.
//!
//! ## Custom targets
//!
//! A request may also name a target path to copy the result to. A target is
//! considered fresh when it is at least as new as the source
//! ([`is_fresh`]).

use crate::imaging::ResizeRequest;
use sha2::{Digest, Sha256};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

/// Number of hex characters kept from the digest.
const KEY_LENGTH: usize = 8;

/// Short cache key for a resize of `source` with the given request.
pub fn cache_key(source: &Path, request: &ResizeRequest, source_mtime: u64) -> String {
    let part = request.effective_important_part();
    let input = format!(
        "-w{}-h{}-{}-{}-{}-{}-{}-{}-{}-{}",
        request.width().unwrap_or(0),
        request.height().unwrap_or(0),
        source.display(),
        request.mode,
        request.zoom.percent(),
        part.x,
        part.y,
        part.width,
        part.height,
        source_mtime,
    );
    let digest = format!("{:x}", Sha256::digest(input.as_bytes()));
    digest[..KEY_LENGTH].to_string()
}

/// Sharded location of a cached resize inside `cache_dir`.
pub fn cache_path(cache_dir: &Path, source: &Path, key: &str, extension: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let shard = key.chars().last().map(String::from).unwrap_or_default();
    cache_dir
        .join(shard)
        .join(format!("{stem}-{key}.{extension}"))
}

/// Modification time of `path` in whole seconds since the epoch.
pub fn mtime(path: &Path) -> io::Result<u64> {
    let modified = std::fs::metadata(path)?.modified()?;
    Ok(modified
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0))
}

/// True if `target` exists and is not older than the source.
pub fn is_fresh(target: &Path, source_mtime: u64) -> bool {
    mtime(target).is_ok_and(|t| t >= source_mtime)
}

/// Copy `from` to `to`, creating parent directories as needed.
pub fn copy_to(from: &Path, to: &Path) -> io::Result<()> {
    if let Some(parent) = to.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(from, to)?;
    Ok(())
}

/// Summary of outcomes for a batch run.
#[derive(Debug, Default)]
pub struct CacheStats {
    pub hits: u32,
    pub unchanged: u32,
    pub intercepted: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn unchanged(&mut self) {
        self.unchanged += 1;
    }

    pub fn intercepted(&mut self) {
        self.intercepted += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.unchanged + self.intercepted + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} cached, {} encoded", self.hits, self.misses)?;
        if self.unchanged > 0 {
            write!(f, ", {} unchanged", self.unchanged)?;
        }
        if self.intercepted > 0 {
            write!(f, ", {} intercepted", self.intercepted)?;
        }
        write!(f, " ({} total)", self.total())
    }
}
