//! src/model/tree_state.rs
//! ============================================================================
//! # `TreeState`: The Lazy Tree Engine
//!
//! Owns every node of the browser tree, keyed by stable [`NodeId`] for O(1)
//! lookup. The engine is a synchronous state machine: the event loop calls
//! [`TreeState::toggle`] / [`TreeState::finish_load`] and performs the
//! actual enumeration between the two, so per-node there is never more than
//! one load in flight (the `Loading` marker is both the guard and the
//! staleness check for completions that arrive after the tree was
//! discarded).
//!
//! Every state-visible mutation publishes a fresh immutable [`TreeSnapshot`]
//! through an `arc-swap` slot. The snapshot is the change signal for the
//! presentation layer; unchanged nodes are shared between snapshots via
//! `Arc`.

use arc_swap::ArcSwap;
use compact_str::CompactString;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::error::AppError;
use crate::fs::capability::{DirectoryHandle, EntryHandle, RawEntry};
use crate::model::node::{LoadState, Node, NodeId};

/// An enumeration the caller must now run against the host.
#[derive(Debug)]
pub struct PendingLoad {
    pub id: NodeId,
    pub dir: Arc<dyn DirectoryHandle>,
}

/// Result of one enumeration attempt, delivered back to the engine.
///
/// `entries` holds whatever the loader appended: the complete sorted child
/// list when `error` is `None`, the unsorted partial prefix otherwise.
#[derive(Debug)]
pub struct LoadOutcome {
    pub entries: Vec<RawEntry>,
    pub error: Option<AppError>,
}

/// Immutable published view of the tree.
#[derive(Debug, Clone)]
pub struct TreeSnapshot {
    generation: u64,
    root: Option<NodeId>,
    nodes: HashMap<NodeId, Arc<Node>>,
}

impl TreeSnapshot {
    fn empty() -> Self {
        Self {
            generation: 0,
            root: None,
            nodes: HashMap::new(),
        }
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub const fn root_id(&self) -> Option<NodeId> {
        self.root
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Arc<Node>> {
        self.nodes.get(&id)
    }

    #[must_use]
    pub fn root_node(&self) -> Option<&Arc<Node>> {
        self.root.and_then(|id: NodeId| self.nodes.get(&id))
    }

    /// Children of `id` in canonical order.
    pub fn children_of(&self, id: NodeId) -> impl Iterator<Item = &Arc<Node>> {
        self.nodes
            .get(&id)
            .into_iter()
            .flat_map(|node: &Arc<Node>| node.children.iter())
            .filter_map(|child: &NodeId| self.nodes.get(child))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// The tree engine. Single-owner: only the event loop mutates it.
pub struct TreeState {
    nodes: HashMap<NodeId, Arc<Node>>,
    root: Option<NodeId>,
    next_id: NodeId,
    generation: u64,
    published: Arc<ArcSwap<TreeSnapshot>>,
}

impl TreeState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            root: None,
            next_id: 0,
            generation: 0,
            published: Arc::new(ArcSwap::from_pointee(TreeSnapshot::empty())),
        }
    }

    /// Handle the presentation layer holds to observe snapshot publication.
    #[must_use]
    pub fn watch(&self) -> Arc<ArcSwap<TreeSnapshot>> {
        Arc::clone(&self.published)
    }

    /// The most recently published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<TreeSnapshot> {
        self.published.load_full()
    }

    #[must_use]
    pub const fn root_id(&self) -> Option<NodeId> {
        self.root
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Arc<Node>> {
        self.nodes.get(&id)
    }

    /// Discards the whole tree and installs a fresh root for `dir`.
    ///
    /// The root is synthetic-expanded and starts loading immediately; the
    /// returned [`PendingLoad`] must be run by the caller. The id allocator
    /// is not reset, so completions for the discarded tree can never alias
    /// a node of the new one.
    pub fn select_root(
        &mut self,
        name: impl Into<CompactString>,
        dir: Arc<dyn DirectoryHandle>,
    ) -> PendingLoad {
        self.nodes.clear();

        let id: NodeId = self.alloc_id();
        let node = Node {
            id,
            name: name.into(),
            handle: EntryHandle::Directory(Arc::clone(&dir)),
            parent: None,
            children: Vec::new(),
            load: LoadState::Loading,
            is_expanded: true,
        };

        debug!("New root \"{}\" as node {}", node.name, id);

        self.nodes.insert(id, Arc::new(node));
        self.root = Some(id);
        self.publish();

        PendingLoad { id, dir }
    }

    /// Flips the expansion state of a directory node.
    ///
    /// No-op for unknown ids and file nodes. Returns a [`PendingLoad`]
    /// exactly when the node just became expanded with children still
    /// unloaded; a toggle while a load is in flight only flips the flag,
    /// and collapse always retains already-loaded children.
    pub fn toggle(&mut self, id: NodeId) -> Option<PendingLoad> {
        let Some(slot) = self.nodes.get_mut(&id) else {
            debug!("Toggle on unknown node {}, ignoring", id);
            return None;
        };

        if !slot.is_dir() {
            return None;
        }

        let node: &mut Node = Arc::make_mut(slot);
        node.is_expanded = !node.is_expanded;

        let pending: Option<PendingLoad> =
            if node.is_expanded && node.load == LoadState::Unloaded {
                node.load = LoadState::Loading;

                node.handle.as_directory().map(|dir| PendingLoad {
                    id,
                    dir: Arc::clone(dir),
                })
            } else {
                None
            };

        trace!(
            "Toggled node {} -> expanded={}, load={:?}",
            id, node.is_expanded, node.load
        );

        self.publish();
        pending
    }

    /// Applies a finished enumeration to its node.
    ///
    /// Ignored unless the node still exists and is still `Loading`; a
    /// completion whose tree was replaced mid-flight lands nowhere. A
    /// meanwhile-collapsed node still receives its children. Returns whether
    /// the outcome was applied.
    pub fn finish_load(&mut self, id: NodeId, outcome: LoadOutcome) -> bool {
        let Some(slot) = self.nodes.get(&id) else {
            debug!("Load completion for vanished node {}, dropping", id);
            return false;
        };

        if slot.load != LoadState::Loading {
            debug!(
                "Load completion for node {} in state {:?}, dropping",
                id, slot.load
            );
            return false;
        }

        let failed: bool = outcome.error.is_some();
        let mut child_ids: Vec<NodeId> = Vec::with_capacity(outcome.entries.len());

        for entry in outcome.entries {
            let child_id: NodeId = self.alloc_id();

            self.nodes.insert(
                child_id,
                Arc::new(Node {
                    id: child_id,
                    name: entry.name,
                    handle: entry.handle,
                    parent: Some(id),
                    children: Vec::new(),
                    load: LoadState::Unloaded,
                    is_expanded: false,
                }),
            );

            child_ids.push(child_id);
        }

        // The borrow of `slot` ended above; re-fetch mutably.
        let node: &mut Node = Arc::make_mut(
            self.nodes
                .get_mut(&id)
                .expect("node existed at guard check"),
        );

        node.children = child_ids;
        node.load = if failed {
            LoadState::Failed
        } else {
            LoadState::Loaded
        };

        debug!(
            "Node {} ({}) finished loading: {} children, state {:?}",
            id,
            node.name,
            node.children.len(),
            node.load
        );

        self.publish();
        true
    }

    fn alloc_id(&mut self) -> NodeId {
        let id: NodeId = self.next_id;
        self.next_id += 1;
        id
    }

    // Publish a fresh snapshot as the change signal; node Arcs are shared
    // with the previous snapshot, only the map and generation are new.
    fn publish(&mut self) {
        self.generation += 1;

        let snapshot = TreeSnapshot {
            generation: self.generation,
            root: self.root,
            nodes: self.nodes.clone(),
        };

        self.published.store(Arc::new(snapshot));
    }
}

impl Default for TreeState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::memory::{MemoryDir, MemoryFile};

    fn dir_entry(name: &str) -> RawEntry {
        RawEntry {
            name: CompactString::new(name),
            handle: EntryHandle::Directory(Arc::new(MemoryDir::new(name))),
        }
    }

    fn file_entry(name: &str) -> RawEntry {
        RawEntry {
            name: CompactString::new(name),
            handle: EntryHandle::File(Arc::new(MemoryFile::new(name, b"", None))),
        }
    }

    fn loaded_root(tree: &mut TreeState, entries: Vec<RawEntry>) -> NodeId {
        let pending = tree.select_root("root", Arc::new(MemoryDir::new("root")));
        let applied = tree.finish_load(
            pending.id,
            LoadOutcome {
                entries,
                error: None,
            },
        );
        assert!(applied);
        pending.id
    }

    fn child_id_by_name(tree: &TreeState, parent: NodeId, name: &str) -> NodeId {
        tree.get(parent)
            .unwrap()
            .children
            .iter()
            .copied()
            .find(|id| tree.get(*id).unwrap().name == name)
            .unwrap()
    }

    #[test]
    fn test_select_root_starts_expanded_and_loading() {
        let mut tree = TreeState::new();
        let pending = tree.select_root("root", Arc::new(MemoryDir::new("root")));

        let root = tree.get(pending.id).unwrap();
        assert!(root.is_expanded);
        assert_eq!(root.load, LoadState::Loading);
        assert_eq!(tree.root_id(), Some(pending.id));
    }

    #[test]
    fn test_toggle_unknown_node_is_noop() {
        let mut tree = TreeState::new();
        let before = tree.snapshot().generation();

        assert!(tree.toggle(42).is_none());
        assert_eq!(tree.snapshot().generation(), before);
    }

    #[test]
    fn test_toggle_file_node_is_noop() {
        let mut tree = TreeState::new();
        let root = loaded_root(&mut tree, vec![file_entry("a.txt")]);
        let file = child_id_by_name(&tree, root, "a.txt");

        assert!(tree.get(file).unwrap().is_file());
        assert!(tree.toggle(file).is_none());
        assert!(!tree.get(file).unwrap().is_expanded);
    }

    #[test]
    fn test_expand_unloaded_directory_requests_one_load() {
        let mut tree = TreeState::new();
        let root = loaded_root(&mut tree, vec![dir_entry("docs")]);
        let docs = child_id_by_name(&tree, root, "docs");

        let pending = tree.toggle(docs);
        assert!(pending.is_some());
        assert_eq!(tree.get(docs).unwrap().load, LoadState::Loading);
        assert!(tree.get(docs).unwrap().is_expanded);
    }

    #[test]
    fn test_second_toggle_while_loading_does_not_start_second_load() {
        let mut tree = TreeState::new();
        let root = loaded_root(&mut tree, vec![dir_entry("docs")]);
        let docs = child_id_by_name(&tree, root, "docs");

        assert!(tree.toggle(docs).is_some());

        // Collapse and re-expand while the first load is still in flight.
        assert!(tree.toggle(docs).is_none());
        assert!(tree.toggle(docs).is_none());
        assert_eq!(tree.get(docs).unwrap().load, LoadState::Loading);
        assert!(tree.get(docs).unwrap().is_expanded);
    }

    #[test]
    fn test_collapse_retains_children_and_reexpand_is_free() {
        let mut tree = TreeState::new();
        let root = loaded_root(&mut tree, vec![dir_entry("docs")]);
        let docs = child_id_by_name(&tree, root, "docs");

        let pending = tree.toggle(docs).unwrap();
        tree.finish_load(
            pending.id,
            LoadOutcome {
                entries: vec![file_entry("readme.md")],
                error: None,
            },
        );

        // Collapse, then expand again: children survive, no new load.
        assert!(tree.toggle(docs).is_none());
        assert_eq!(tree.get(docs).unwrap().children.len(), 1);

        assert!(tree.toggle(docs).is_none());
        assert_eq!(tree.get(docs).unwrap().load, LoadState::Loaded);
        assert_eq!(tree.get(docs).unwrap().children.len(), 1);
    }

    #[test]
    fn test_collapsed_node_still_receives_in_flight_load() {
        let mut tree = TreeState::new();
        let root = loaded_root(&mut tree, vec![dir_entry("docs")]);
        let docs = child_id_by_name(&tree, root, "docs");

        let pending = tree.toggle(docs).unwrap();
        assert!(tree.toggle(docs).is_none()); // collapse mid-flight

        let applied = tree.finish_load(
            pending.id,
            LoadOutcome {
                entries: vec![file_entry("readme.md")],
                error: None,
            },
        );

        assert!(applied);
        let docs_node = tree.get(docs).unwrap();
        assert!(!docs_node.is_expanded);
        assert_eq!(docs_node.load, LoadState::Loaded);
        assert_eq!(docs_node.children.len(), 1);
    }

    #[test]
    fn test_stale_completion_after_root_replacement_is_dropped() {
        let mut tree = TreeState::new();
        let first = tree.select_root("first", Arc::new(MemoryDir::new("first")));
        let second = tree.select_root("second", Arc::new(MemoryDir::new("second")));

        // Ids are never reused, so the stale completion finds nothing.
        assert_ne!(first.id, second.id);
        let applied = tree.finish_load(
            first.id,
            LoadOutcome {
                entries: vec![file_entry("ghost.txt")],
                error: None,
            },
        );

        assert!(!applied);
        assert_eq!(tree.snapshot().len(), 1);
    }

    #[test]
    fn test_failed_load_keeps_partial_children_and_is_terminal() {
        let mut tree = TreeState::new();
        let root = loaded_root(&mut tree, vec![dir_entry("flaky")]);
        let flaky = child_id_by_name(&tree, root, "flaky");

        let pending = tree.toggle(flaky).unwrap();
        let applied = tree.finish_load(
            pending.id,
            LoadOutcome {
                // Unsorted partial prefix, exactly as the loader left it.
                entries: vec![file_entry("zeta.txt"), file_entry("alpha.txt")],
                error: Some(AppError::enumerate_failed(
                    "flaky",
                    std::io::Error::other("boom"),
                )),
            },
        );
        assert!(applied);

        let node = tree.get(flaky).unwrap();
        assert_eq!(node.load, LoadState::Failed);
        assert!(node.load.is_terminal());
        let names: Vec<&str> = node
            .children
            .iter()
            .map(|id| tree.get(*id).unwrap().name.as_str())
            .collect();
        assert_eq!(names, vec!["zeta.txt", "alpha.txt"]);

        // Terminal: collapse + re-expand never re-enters Loading.
        assert!(tree.toggle(flaky).is_none());
        assert!(tree.toggle(flaky).is_none());
        assert_eq!(tree.get(flaky).unwrap().load, LoadState::Failed);
    }

    #[test]
    fn test_duplicate_completion_is_dropped() {
        let mut tree = TreeState::new();
        let root = loaded_root(&mut tree, vec![dir_entry("docs")]);
        let docs = child_id_by_name(&tree, root, "docs");

        let pending = tree.toggle(docs).unwrap();
        assert!(tree.finish_load(
            pending.id,
            LoadOutcome {
                entries: vec![],
                error: None,
            },
        ));

        // A second completion for the same attempt finds a terminal node.
        assert!(!tree.finish_load(
            pending.id,
            LoadOutcome {
                entries: vec![file_entry("late.txt")],
                error: None,
            },
        ));
        assert!(tree.get(docs).unwrap().children.is_empty());
    }

    #[test]
    fn test_every_mutation_publishes_a_new_snapshot() {
        let mut tree = TreeState::new();
        let watch = tree.watch();

        let g0 = watch.load().generation();
        let pending = tree.select_root("root", Arc::new(MemoryDir::new("root")));
        let g1 = watch.load().generation();
        assert!(g1 > g0);

        tree.finish_load(
            pending.id,
            LoadOutcome {
                entries: vec![dir_entry("docs")],
                error: None,
            },
        );
        let g2 = watch.load().generation();
        assert!(g2 > g1);

        let docs = child_id_by_name(&tree, pending.id, "docs");
        tree.toggle(docs);
        assert!(watch.load().generation() > g2);
    }

    #[test]
    fn test_snapshot_children_iterate_in_canonical_order() {
        let mut tree = TreeState::new();
        let root = loaded_root(
            &mut tree,
            vec![dir_entry("A"), file_entry("a.txt"), file_entry("b.txt")],
        );

        let snapshot = tree.snapshot();
        let names: Vec<&str> = snapshot
            .children_of(root)
            .map(|n| n.name.as_str())
            .collect();

        assert_eq!(names, vec!["A", "a.txt", "b.txt"]);
    }
}
