//! src/fs/local.rs
//! ============================================================================
//! # Local Host: Capability Implementations over the OS Filesystem
//!
//! Adapts the capability traits onto `tokio::fs`. The gateway stands in for
//! the host permission prompt on a headless host: it probes a configured
//! root directory for readability and grants a capability scoped to it.
//! Interactive hosts supply their own [`PermissionGateway`].

use async_trait::async_trait;
use compact_str::CompactString;
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use tokio::fs as TokioFs;

use crate::config::Config;
use crate::error::AppError;
use crate::fs::capability::{
    DirectoryHandle, EntryHandle, EntryStream, FileHandle, PermissionGateway, RawEntry,
};

/// Gateway granting read access to one configured directory.
#[derive(Debug, Clone)]
pub struct LocalGateway {
    root: PathBuf,
}

impl LocalGateway {
    #[must_use]
    pub const fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Builds a gateway from the configured default root, if any.
    #[must_use]
    pub fn from_config(config: &Config) -> Option<Self> {
        config.default_root.clone().map(Self::new)
    }
}

#[async_trait]
impl PermissionGateway for LocalGateway {
    async fn request_root(&self) -> Result<Arc<dyn DirectoryHandle>, AppError> {
        // Readability probe; the closest local analogue of the host prompt.
        match TokioFs::read_dir(&self.root).await {
            Ok(_) => {
                info!("Granting read access to {}", self.root.display());
                Ok(Arc::new(LocalDirHandle::new(&self.root)) as Arc<dyn DirectoryHandle>)
            }

            Err(e) => Err(AppError::PermissionDenied(format!(
                "{}: {e}",
                self.root.display()
            ))),
        }
    }
}

/// Directory capability backed by a local path.
#[derive(Debug)]
pub struct LocalDirHandle {
    name: CompactString,
    path: PathBuf,
}

impl LocalDirHandle {
    fn new(path: &Path) -> Self {
        Self {
            name: base_name(path),
            path: path.to_path_buf(),
        }
    }
}

#[async_trait]
impl DirectoryHandle for LocalDirHandle {
    fn name(&self) -> &str {
        &self.name
    }

    async fn begin_enumerate(&self) -> io::Result<Box<dyn EntryStream>> {
        let read_dir: TokioFs::ReadDir = TokioFs::read_dir(&self.path).await?;

        Ok(Box::new(LocalEntryStream { read_dir }))
    }
}

struct LocalEntryStream {
    read_dir: TokioFs::ReadDir,
}

#[async_trait]
impl EntryStream for LocalEntryStream {
    async fn next_entry(&mut self) -> io::Result<Option<RawEntry>> {
        let Some(entry) = self.read_dir.next_entry().await? else {
            return Ok(None);
        };

        let path: PathBuf = entry.path();
        let name: CompactString = base_name(&path);

        let handle: EntryHandle = if entry.file_type().await?.is_dir() {
            EntryHandle::Directory(Arc::new(LocalDirHandle::new(&path)))
        } else {
            EntryHandle::File(Arc::new(LocalFileHandle::new(&path)))
        };

        Ok(Some(RawEntry { name, handle }))
    }
}

/// File capability backed by a local path.
#[derive(Debug)]
pub struct LocalFileHandle {
    name: CompactString,
    path: PathBuf,
    media_type: Option<&'static str>,
}

impl LocalFileHandle {
    fn new(path: &Path) -> Self {
        let media_type: Option<&'static str> = path
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_lowercase)
            .and_then(|ext: String| media_type_for_extension(&ext));

        Self {
            name: base_name(path),
            path: path.to_path_buf(),
            media_type,
        }
    }
}

#[async_trait]
impl FileHandle for LocalFileHandle {
    fn name(&self) -> &str {
        &self.name
    }

    fn media_type(&self) -> Option<&str> {
        self.media_type
    }

    async fn read(&self) -> io::Result<Vec<u8>> {
        TokioFs::read(&self.path).await
    }
}

fn base_name(path: &Path) -> CompactString {
    CompactString::new(path.file_name().and_then(OsStr::to_str).unwrap_or(""))
}

// Declared media types for extensions the local host recognizes. Anything
// else is reported as unknown, mirroring a browser host's behavior for
// uncommon extensions.
fn media_type_for_extension(ext: &str) -> Option<&'static str> {
    match ext {
        "json" => Some("application/json"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "svg" => Some("image/svg+xml"),
        "txt" | "md" => Some("text/plain"),
        "pdf" => Some("application/pdf"),
        _ => None,
    }
}
