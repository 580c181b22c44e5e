//! src/model/node.rs
//! ============================================================================
//! # Node: One Entry in the In-Memory Tree
//!
//! Nodes are owned exclusively by the tree engine and addressed by stable
//! ids; the borrowed host capability rides along but is never used as an
//! identity.

use compact_str::CompactString;

use crate::fs::capability::{EntryHandle, EntryKind};

/// Stable node identifier.
///
/// Assigned monotonically and never reused, even across root replacement,
/// so a completion handler can always tell a node of a discarded tree from
/// any node of its successor.
pub type NodeId = u64;

/// Lifecycle of a directory node's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Children never requested.
    #[default]
    Unloaded,

    /// Exactly one enumeration is in flight.
    Loading,

    /// Enumeration finished; `children` is complete (possibly empty).
    Loaded,

    /// Enumeration failed; `children` holds the unsorted partial prefix.
    Failed,
}

impl LoadState {
    /// Terminal states never re-enter `Loading` on the same node.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Loaded | Self::Failed)
    }
}

/// One filesystem entry in the tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,

    /// Entry name as reported by the host.
    pub name: CompactString,

    /// Opaque borrowed host capability; never closed or mutated here.
    pub handle: EntryHandle,

    /// `None` only for the root.
    pub parent: Option<NodeId>,

    /// Child ids in canonical order. Meaningful for directories only.
    pub children: Vec<NodeId>,

    pub load: LoadState,

    /// Directories only; the root starts expanded, everything else
    /// collapsed.
    pub is_expanded: bool,
}

impl Node {
    #[must_use]
    pub fn kind(&self) -> EntryKind {
        self.handle.kind()
    }

    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind() == EntryKind::Directory
    }

    #[must_use]
    pub fn is_file(&self) -> bool {
        self.kind() == EntryKind::File
    }
}
