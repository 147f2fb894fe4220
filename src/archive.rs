//! Post-sweep archival (feature `compression`)
//!
//! Results directories accumulate one summary file plus any checkpoint
//! snapshots; after a sweep completes they are compressed in place to
//! reclaim space. Archival is a post-processing convenience and is never
//! invoked mid-sweep, so the durability guarantee of the summary store is
//! unaffected.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{Error, Result};

/// Compression algorithm for archived result files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// LZ4 - fast compression (default)
    #[default]
    Lz4,
    /// ZSTD - better ratio, slower
    Zstd,
}

impl Compression {
    /// Get algorithm name as string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Lz4 => "lz4",
            Self::Zstd => "zstd",
        }
    }

    /// File extension appended to archived files
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Lz4 => "lz4",
            Self::Zstd => "zst",
        }
    }

    /// Compress data using this algorithm
    ///
    /// # Errors
    /// Returns error if compression fails (e.g. ZSTD internal error)
    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.is_empty() {
            return Ok(Vec::new());
        }
        match self {
            Self::Lz4 => Ok(lz4_flex::compress_prepend_size(data)),
            Self::Zstd => zstd::encode_all(data, 3)
                .map_err(|e| Error::Persistence(format!("ZSTD compression failed: {e}"))),
        }
    }

    /// Decompress data using this algorithm
    ///
    /// # Errors
    /// Returns error if decompression fails (e.g. corrupted data)
    pub fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.is_empty() {
            return Ok(Vec::new());
        }
        match self {
            Self::Lz4 => lz4_flex::decompress_size_prepended(data)
                .map_err(|e| Error::Persistence(format!("LZ4 decompression failed: {e}"))),
            Self::Zstd => zstd::decode_all(data)
                .map_err(|e| Error::Persistence(format!("ZSTD decompression failed: {e}"))),
        }
    }
}

/// Compress every regular file in a results directory in place.
///
/// Each file `name` becomes `name.lz4` / `name.zst`; the original is
/// removed only after its archive is fully written. Files that already
/// carry a compressed extension are left alone, as are subdirectories.
/// Returns the archive paths in directory order, sorted by name.
///
/// # Errors
///
/// Returns an error if the directory cannot be read or a file cannot be
/// compressed or replaced.
pub fn archive_results(dir: impl AsRef<Path>, compression: Compression) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut archived = Vec::new();

    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .collect();
    entries.sort();

    for path in entries {
        if !path.is_file() {
            continue;
        }
        if matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("lz4" | "zst")
        ) {
            continue;
        }

        let data = fs::read(&path)?;
        let compressed = compression.compress(&data)?;

        let mut target = path.clone().into_os_string();
        target.push(".");
        target.push(compression.extension());
        let target = PathBuf::from(target);

        fs::write(&target, compressed)?;
        fs::remove_file(&path)?;
        debug!(
            source = %path.display(),
            archive = %target.display(),
            algorithm = compression.as_str(),
            "archived result file"
        );
        archived.push(target);
    }

    Ok(archived)
}
