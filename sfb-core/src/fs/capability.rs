//! src/fs/capability.rs
//! ============================================================================
//! # Capability Traits: The Host Filesystem Boundary
//!
//! The browser core never touches paths or file descriptors directly. The
//! host grants opaque capabilities (a directory capability can be
//! enumerated, a file capability can be read) and the core borrows them
//! without ever closing or mutating the underlying host objects.
//!
//! [`PermissionGateway`] is the entry point: it runs the host permission
//! flow and yields the root directory capability the whole tree hangs off.

use async_trait::async_trait;
use compact_str::CompactString;
use std::{fmt, io, sync::Arc};

use crate::error::AppError;

/// Kind of a filesystem entry as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directory => write!(f, "directory"),
            Self::File => write!(f, "file"),
        }
    }
}

/// Host permission system.
///
/// `request_root` may display a native prompt. A decline resolves to
/// [`AppError::UserAborted`], which callers treat as silence, not failure;
/// any other rejection resolves to [`AppError::PermissionDenied`].
#[async_trait]
pub trait PermissionGateway: Send + Sync {
    async fn request_root(&self) -> Result<Arc<dyn DirectoryHandle>, AppError>;
}

/// Read-only directory capability.
#[async_trait]
pub trait DirectoryHandle: fmt::Debug + Send + Sync {
    /// Entry name as reported by the host.
    fn name(&self) -> &str;

    /// Opens the host's asynchronous entry stream for this directory.
    async fn begin_enumerate(&self) -> io::Result<Box<dyn EntryStream>>;
}

/// One pass over a directory's immediate children.
///
/// The stream may fail mid-sequence; entries yielded before the failure are
/// valid and stay usable.
#[async_trait]
pub trait EntryStream: Send {
    /// Next entry, or `None` once the host sequence is exhausted.
    async fn next_entry(&mut self) -> io::Result<Option<RawEntry>>;
}

/// Read-only file capability.
#[async_trait]
pub trait FileHandle: fmt::Debug + Send + Sync {
    /// Entry name as reported by the host.
    fn name(&self) -> &str;

    /// Declared media type, if the host knows one.
    fn media_type(&self) -> Option<&str>;

    /// Reads the full file content.
    async fn read(&self) -> io::Result<Vec<u8>>;
}

/// Opaque borrowed capability attached to one tree node.
#[derive(Clone)]
pub enum EntryHandle {
    Directory(Arc<dyn DirectoryHandle>),
    File(Arc<dyn FileHandle>),
}

impl EntryHandle {
    #[must_use]
    pub fn kind(&self) -> EntryKind {
        match self {
            Self::Directory(_) => EntryKind::Directory,
            Self::File(_) => EntryKind::File,
        }
    }

    #[must_use]
    pub fn as_directory(&self) -> Option<&Arc<dyn DirectoryHandle>> {
        match self {
            Self::Directory(dir) => Some(dir),
            Self::File(_) => None,
        }
    }

    #[must_use]
    pub fn as_file(&self) -> Option<&Arc<dyn FileHandle>> {
        match self {
            Self::File(file) => Some(file),
            Self::Directory(_) => None,
        }
    }
}

impl fmt::Debug for EntryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directory(dir) => f.debug_tuple("Directory").field(&dir.name()).finish(),
            Self::File(file) => f.debug_tuple("File").field(&file.name()).finish(),
        }
    }
}

/// One entry as yielded by a host enumeration stream.
#[derive(Debug, Clone)]
pub struct RawEntry {
    pub name: CompactString,
    pub handle: EntryHandle,
}

impl RawEntry {
    #[must_use]
    pub fn kind(&self) -> EntryKind {
        self.handle.kind()
    }

    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind() == EntryKind::Directory
    }
}
