/*!
 * Remote file operations
 *
 * Toolkit-independent command handlers behind the file browser: listing,
 * classification, transfer, deletion, and preview staging all live here so
 * the GUI layer only renders state and forwards user intent.
 */

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::adb::Transport;
use crate::error::{PinError, Result};
use crate::recorder::extract_thumbnail;

/// Directory/file classification, recomputed on every listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One remote listing entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    pub name: String,
    pub path: String,
    pub kind: EntryKind,
}

impl RemoteEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// What kind of preview a file supports, judged by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKind {
    Image,
    Video,
    None,
}

/// Errors local to preview staging
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("no preview for this file type")]
    Unsupported,

    #[error("failed to fetch remote file: {0}")]
    Fetch(String),

    #[error("thumbnail extraction failed: {0}")]
    Thumbnail(String),
}

/// Remote filesystem operations over a bridge transport
pub struct RemoteFs<T: Transport> {
    transport: T,
}

impl<T: Transport> RemoteFs<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// List entries under a remote directory with file/directory
    /// classification. Nothing is cached; every call re-queries the device.
    pub fn list(&self, dir: &str) -> Result<Vec<RemoteEntry>> {
        let out = self
            .transport
            .shell(&format!("ls -1 {}", shell_quote(dir)))?;
        if !out.success() {
            return Err(PinError::Transfer(format!(
                "ls {} failed: {}",
                dir, out.stdout
            )));
        }

        let mut entries = Vec::new();
        for name in out.stdout.lines().map(str::trim).filter(|n| !n.is_empty()) {
            let path = join_remote(dir, name);
            let kind = if self.is_dir(&path)? {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            entries.push(RemoteEntry {
                name: name.to_string(),
                path,
                kind,
            });
        }
        Ok(entries)
    }

    /// Whether a remote path is a directory
    pub fn is_dir(&self, path: &str) -> Result<bool> {
        let out = self.transport.shell(&format!(
            "test -d {} && echo DIR || echo FILE",
            shell_quote(path)
        ))?;
        Ok(out.stdout.contains("DIR"))
    }

    /// Download a remote file to a local path
    pub fn download(&self, remote: &str, local: &Path) -> Result<()> {
        debug!(remote, local = %local.display(), "download");
        self.transport.pull(remote, local)
    }

    /// Upload a local file into a remote directory
    pub fn upload(&self, local: &Path, remote_dir: &str) -> Result<()> {
        debug!(local = %local.display(), remote_dir, "upload");
        let dest = if remote_dir.ends_with('/') {
            remote_dir.to_string()
        } else {
            format!("{}/", remote_dir)
        };
        self.transport.push(local, &dest)
    }

    /// Delete a remote path. Nothing is removed unless `confirmed` is
    /// true; returns whether a deletion actually happened.
    pub fn delete(&self, path: &str, confirmed: bool) -> Result<bool> {
        if !confirmed {
            debug!(path, "delete not confirmed, skipping");
            return Ok(false);
        }
        let out = self
            .transport
            .shell(&format!("rm -rf {}", shell_quote(path)))?;
        if !out.success() {
            warn!(path, "rm reported failure: {}", out.stdout);
            return Err(PinError::Transfer(format!(
                "rm {} failed: {}",
                path, out.stdout
            )));
        }
        Ok(true)
    }

    /// Stage a local preview for a remote file: images are pulled as-is,
    /// videos are pulled and reduced to a single-frame thumbnail.
    pub fn fetch_preview(
        &self,
        entry: &RemoteEntry,
        ffmpeg_path: &str,
        temp_dir: &Path,
    ) -> std::result::Result<PathBuf, PreviewError> {
        match preview_kind(&entry.name) {
            PreviewKind::Image => {
                let local = temp_dir.join(&entry.name);
                self.download(&entry.path, &local)
                    .map_err(|e| PreviewError::Fetch(e.to_string()))?;
                Ok(local)
            }
            PreviewKind::Video => {
                let local_video = temp_dir.join("preview_video.mp4");
                let local_jpg = temp_dir.join("preview_video.jpg");
                self.download(&entry.path, &local_video)
                    .map_err(|e| PreviewError::Fetch(e.to_string()))?;
                extract_thumbnail(ffmpeg_path, &local_video, &local_jpg)
                    .map_err(|e| PreviewError::Thumbnail(e.to_string()))?;
                Ok(local_jpg)
            }
            PreviewKind::None => Err(PreviewError::Unsupported),
        }
    }
}

/// Judge preview support from the file extension
pub fn preview_kind(name: &str) -> PreviewKind {
    let lower = name.to_ascii_lowercase();
    if [".mp4", ".mov", ".m4v"].iter().any(|ext| lower.ends_with(ext)) {
        PreviewKind::Video
    } else if [".jpg", ".jpeg", ".png", ".bmp", ".gif"]
        .iter()
        .any(|ext| lower.ends_with(ext))
    {
        PreviewKind::Image
    } else {
        PreviewKind::None
    }
}

/// Join a remote directory and entry name without doubling separators
pub fn join_remote(dir: &str, name: &str) -> String {
    format!("{}/{}", dir.trim_end_matches('/'), name)
}

/// Parent of a remote path, stopping at the root
pub fn parent_remote(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => trimmed[..idx].to_string(),
    }
}

/// Single-quote a path for the device shell
fn shell_quote(path: &str) -> String {
    format!("'{}'", path.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_remote_no_double_slash() {
        assert_eq!(join_remote("/", "media"), "/media");
        assert_eq!(join_remote("/media/", "clips"), "/media/clips");
        assert_eq!(join_remote("/media", "clips"), "/media/clips");
    }

    #[test]
    fn test_parent_remote() {
        assert_eq!(parent_remote("/media/clips"), "/media");
        assert_eq!(parent_remote("/media"), "/");
        assert_eq!(parent_remote("/"), "/");
    }

    #[test]
    fn test_preview_kind() {
        assert_eq!(preview_kind("clip.MP4"), PreviewKind::Video);
        assert_eq!(preview_kind("photo.jpeg"), PreviewKind::Image);
        assert_eq!(preview_kind("notes.txt"), PreviewKind::None);
    }

    #[test]
    fn test_shell_quote_escapes_single_quotes() {
        assert_eq!(shell_quote("/media/it's"), r"'/media/it'\''s'");
    }
}
