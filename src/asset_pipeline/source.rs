use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{LoadError, LoadResult};

const CHUNK_SIZE: usize = 64 * 1024;

/// Where asset bytes come from. Called on the loader thread.
pub trait AssetSource: Send + Sync {
    /// Fetches `url`, reporting `(loaded, total)` byte counts as it goes.
    /// `total` is zero when the size is unknown.
    fn fetch(&self, url: &str, progress: &mut dyn FnMut(u64, u64)) -> LoadResult<Vec<u8>>;

    /// Directory relative references inside the asset resolve against.
    fn base_dir(&self, url: &str) -> Option<PathBuf> {
        local_path(url).and_then(|path| path.parent().map(Path::to_path_buf))
    }
}

/// Local paths and `file://` URLs are read from disk; `http(s)://` URLs are
/// downloaded when the `http` feature is enabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultSource;

impl AssetSource for DefaultSource {
    fn fetch(&self, url: &str, progress: &mut dyn FnMut(u64, u64)) -> LoadResult<Vec<u8>> {
        if is_remote(url) {
            return fetch_remote(url, progress);
        }

        let Some(path) = local_path(url) else {
            return Err(LoadError::UnsupportedScheme(url.to_string()));
        };

        let io_error = |source| LoadError::Io {
            url: url.to_string(),
            source,
        };

        let file = std::fs::File::open(&path).map_err(io_error)?;
        let total = file.metadata().map(|metadata| metadata.len()).unwrap_or(0);

        read_with_progress(file, total, progress).map_err(io_error)
    }
}

pub fn is_remote(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Filesystem path for `url`, or `None` for URLs with a non-file scheme.
pub fn local_path(url: &str) -> Option<PathBuf> {
    if let Some(path) = url.strip_prefix("file://") {
        return Some(PathBuf::from(path));
    }

    match url.split_once("://") {
        Some(_) => None,
        None => Some(PathBuf::from(url)),
    }
}

pub fn read_with_progress(
    mut reader: impl Read,
    total: u64,
    progress: &mut dyn FnMut(u64, u64),
) -> std::io::Result<Vec<u8>> {
    let mut data = Vec::with_capacity(total.min(256 * 1024 * 1024) as usize);
    let mut chunk = vec![0u8; CHUNK_SIZE];

    loop {
        let read = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        data.extend_from_slice(&chunk[..read]);
        progress(data.len() as u64, total);
    }

    Ok(data)
}

#[cfg(feature = "http")]
fn fetch_remote(url: &str, progress: &mut dyn FnMut(u64, u64)) -> LoadResult<Vec<u8>> {
    let mut response = ureq::get(url).call().map_err(|e| LoadError::Http {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    let total = response.body().content_length().unwrap_or(0);
    let reader = response.body_mut().as_reader();

    read_with_progress(reader, total, progress).map_err(|source| LoadError::Io {
        url: url.to_string(),
        source,
    })
}

#[cfg(not(feature = "http"))]
fn fetch_remote(url: &str, _progress: &mut dyn FnMut(u64, u64)) -> LoadResult<Vec<u8>> {
    Err(LoadError::UnsupportedScheme(url.to_string()))
}
