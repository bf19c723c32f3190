use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::warn;

/// Storage key for the liked-movie set, as the browser app kept it.
pub const CACHE_KEY: &str = "likedMovies";

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("failed to write liked-movies cache {0}: {1}")]
    Write(PathBuf, std::io::Error),
    #[error("failed to encode liked-movies cache: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Durable local mirror of the liked-movie IDs: one file holding a JSON
/// array, readable synchronously so hydration works offline.
#[derive(Debug, Clone)]
pub struct LikedCache {
    path: PathBuf,
}

impl LikedCache {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(format!("{CACHE_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cached set. A missing file is an empty set; a corrupt
    /// file is logged and treated as empty rather than failing startup.
    pub fn load(&self) -> Vec<String> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!("failed to read {}: {}", self.path.display(), e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(ids) => ids,
            Err(e) => {
                warn!("corrupt liked-movies cache {}: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    /// Replace the cached set with `ids`. Written to a temp file first
    /// and renamed into place so readers never see a partial write.
    pub fn store(&self, ids: &[String]) -> Result<(), CacheError> {
        let json = serde_json::to_vec(ids)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| CacheError::Write(self.path.clone(), e))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        let mut file =
            fs::File::create(&tmp).map_err(|e| CacheError::Write(tmp.clone(), e))?;
        file.write_all(&json)
            .map_err(|e| CacheError::Write(tmp.clone(), e))?;
        fs::rename(&tmp, &self.path).map_err(|e| CacheError::Write(self.path.clone(), e))?;

        Ok(())
    }
}
