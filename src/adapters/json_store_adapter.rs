//! File-backed stores: the ticker cache JSON document and the rotation
//! cursor text file.
//!
//! Neither store locks its file; concurrent invocations sharing a file can
//! interleave reads and writes (documented limitation).

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;

use crate::domain::cache::TickerCache;
use crate::domain::error::EngineError;
use crate::ports::store_port::{RotationStatePort, TickerStorePort};

/// The whole cache as one JSON object on disk.
pub struct JsonCacheFile {
    path: PathBuf,
}

impl JsonCacheFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        JsonCacheFile {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl TickerStorePort for JsonCacheFile {
    fn load(&self) -> Result<TickerCache, EngineError> {
        if !self.path.exists() {
            return Ok(TickerCache::new());
        }
        let text = fs::read_to_string(&self.path)?;
        if text.trim().is_empty() {
            return Ok(TickerCache::new());
        }
        serde_json::from_str(&text).map_err(|err| EngineError::Store {
            reason: format!("unreadable cache {}: {err}", self.path.display()),
        })
    }

    fn save(&self, cache: &TickerCache) -> Result<(), EngineError> {
        let text = serde_json::to_string(cache).map_err(|err| EngineError::Store {
            reason: err.to_string(),
        })?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

/// Rotation cursor: one integer in a plain text file.
pub struct RotationStateFile {
    path: PathBuf,
}

impl RotationStateFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        RotationStateFile {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl RotationStatePort for RotationStateFile {
    fn load(&self) -> Option<usize> {
        let text = fs::read_to_string(&self.path).ok()?;
        match text.trim().parse() {
            Ok(ordinal) => Some(ordinal),
            Err(_) => {
                warn!(
                    "corrupt rotation state in {}, starting over",
                    self.path.display()
                );
                None
            }
        }
    }

    fn store(&self, ordinal: usize) -> Result<(), EngineError> {
        fs::write(&self.path, ordinal.to_string())?;
        Ok(())
    }
}
