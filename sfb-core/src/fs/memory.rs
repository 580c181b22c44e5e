//! src/fs/memory.rs
//! ============================================================================
//! # In-Memory Host: Scripted Capability Implementations
//!
//! Deterministic implementations of the capability traits backed by plain
//! data. Fixture trees are built entry by entry, enumeration can be made to
//! fail mid-stream, and every capability counts how often it was exercised,
//! which is what the contract tests assert against.

use async_trait::async_trait;
use compact_str::CompactString;
use std::collections::VecDeque;
use std::io;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use crate::error::AppError;
use crate::fs::capability::{
    DirectoryHandle, EntryHandle, EntryStream, FileHandle, PermissionGateway, RawEntry,
};

/// Scripted directory capability.
///
/// Entries are yielded in insertion order (deliberately unsorted so tests
/// can observe the loader's canonical sort).
#[derive(Debug)]
pub struct MemoryDir {
    name: CompactString,
    entries: Vec<RawEntry>,
    fail_after: Option<usize>,
    enumerations: AtomicUsize,
}

impl MemoryDir {
    pub fn new(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
            fail_after: None,
            enumerations: AtomicUsize::new(0),
        }
    }

    /// Appends a subdirectory entry.
    #[must_use]
    pub fn dir(mut self, child: Arc<MemoryDir>) -> Self {
        self.entries.push(RawEntry {
            name: child.name.clone(),
            handle: EntryHandle::Directory(child),
        });
        self
    }

    /// Appends a file entry.
    #[must_use]
    pub fn file(mut self, child: Arc<MemoryFile>) -> Self {
        self.entries.push(RawEntry {
            name: child.name.clone(),
            handle: EntryHandle::File(child),
        });
        self
    }

    /// Makes every enumeration of this directory fail once `n` entries have
    /// been yielded. Expects `n` to be at most the entry count.
    #[must_use]
    pub const fn fail_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    /// Number of times an entry stream was opened on this directory.
    pub fn enumerate_calls(&self) -> usize {
        self.enumerations.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl DirectoryHandle for MemoryDir {
    fn name(&self) -> &str {
        &self.name
    }

    async fn begin_enumerate(&self) -> io::Result<Box<dyn EntryStream>> {
        self.enumerations.fetch_add(1, Ordering::Relaxed);

        Ok(Box::new(MemoryEntryStream {
            remaining: self.entries.iter().cloned().collect(),
            yielded: 0,
            fail_after: self.fail_after,
        }))
    }
}

struct MemoryEntryStream {
    remaining: VecDeque<RawEntry>,
    yielded: usize,
    fail_after: Option<usize>,
}

#[async_trait]
impl EntryStream for MemoryEntryStream {
    async fn next_entry(&mut self) -> io::Result<Option<RawEntry>> {
        if let Some(limit) = self.fail_after
            && self.yielded == limit
        {
            return Err(io::Error::other("scripted enumeration failure"));
        }

        match self.remaining.pop_front() {
            Some(entry) => {
                self.yielded += 1;
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }
}

/// Scripted file capability.
#[derive(Debug)]
pub struct MemoryFile {
    name: CompactString,
    media_type: Option<CompactString>,
    content: Vec<u8>,
    fail_reads: bool,
    reads: AtomicUsize,
}

impl MemoryFile {
    pub fn new(
        name: impl Into<CompactString>,
        content: &[u8],
        media_type: Option<&str>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.map(CompactString::new),
            content: content.to_vec(),
            fail_reads: false,
            reads: AtomicUsize::new(0),
        }
    }

    /// Makes every read of this file fail.
    #[must_use]
    pub const fn failing(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    /// Number of completed or attempted reads.
    pub fn read_calls(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl FileHandle for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }

    async fn read(&self) -> io::Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::Relaxed);

        if self.fail_reads {
            return Err(io::Error::other("scripted read failure"));
        }

        Ok(self.content.clone())
    }
}

/// Scripted permission gateway.
pub struct MemoryGateway {
    script: GatewayScript,
}

/// What the scripted host answers when asked for a root directory.
pub enum GatewayScript {
    Grant(Arc<MemoryDir>),
    Abort,
    Deny(String),
}

impl MemoryGateway {
    #[must_use]
    pub const fn new(script: GatewayScript) -> Self {
        Self { script }
    }

    #[must_use]
    pub const fn granting(root: Arc<MemoryDir>) -> Self {
        Self::new(GatewayScript::Grant(root))
    }

    #[must_use]
    pub const fn aborting() -> Self {
        Self::new(GatewayScript::Abort)
    }
}

#[async_trait]
impl PermissionGateway for MemoryGateway {
    async fn request_root(&self) -> Result<Arc<dyn DirectoryHandle>, AppError> {
        match &self.script {
            GatewayScript::Grant(root) => Ok(Arc::clone(root) as Arc<dyn DirectoryHandle>),
            GatewayScript::Abort => Err(AppError::UserAborted),
            GatewayScript::Deny(reason) => Err(AppError::PermissionDenied(reason.clone())),
        }
    }
}
