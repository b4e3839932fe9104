/*!
 * Persistent IP cache
 *
 * A single plain-text file holding the last confirmed device IP. The cache
 * is only ever written after an explicit reachability or connection
 * success, never speculatively. There is no history and no expiry; a newer
 * confirmed IP simply overwrites the previous one.
 *
 * Concurrent toolchain invocations can race on this file; that is a known
 * limitation, not a guarantee.
 */

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;

/// File-backed cache for the last known-good device IP
#[derive(Debug, Clone)]
pub struct IpCache {
    path: PathBuf,
}

impl IpCache {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cached IP. A missing, empty, or whitespace-only file is a
    /// cache miss, not an error.
    pub fn load(&self) -> Option<String> {
        let contents = fs::read_to_string(&self.path).ok()?;
        let ip = contents.trim();
        if ip.is_empty() {
            None
        } else {
            Some(ip.to_string())
        }
    }

    /// Persist a confirmed IP, creating parent directories as needed.
    pub fn store(&self, ip: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, format!("{}\n", ip.trim()))?;
        debug!(ip, path = %self.path.display(), "cached device IP");
        Ok(())
    }
}
