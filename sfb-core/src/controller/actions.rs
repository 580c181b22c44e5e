//! src/controller/actions.rs
//! ============================================================================
//! # Actions: The Browser's Command Surface
//!
//! Every operation the host or presentation layer can request, plus the
//! completion messages background tasks send back. The event loop is the
//! only consumer.

use compact_str::CompactString;
use std::sync::Arc;

use crate::error::AppError;
use crate::fs::capability::DirectoryHandle;
use crate::model::node::NodeId;
use crate::model::tree_state::LoadOutcome;

/// A high-level command or task completion processed by the event loop.
#[derive(Debug)]
pub enum Action {
    /// Ask the permission gateway for a new root directory. Any current
    /// tree is discarded once the gateway grants one.
    SelectRoot,

    /// Gateway outcome for a pending `SelectRoot`.
    RootResolved(Result<Arc<dyn DirectoryHandle>, AppError>),

    /// Expand or collapse a directory node.
    Toggle(NodeId),

    /// A background enumeration finished (successfully or not).
    ChildrenLoaded { id: NodeId, outcome: LoadOutcome },

    /// Open the given file node in the host editor.
    Activate(NodeId),

    /// A background activation finished.
    ActivateFinished {
        name: CompactString,
        result: Result<(), AppError>,
    },

    /// The user dismissed the current error message.
    DismissError,

    /// Stop the event loop.
    Quit,
}
