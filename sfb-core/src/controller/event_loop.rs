//! src/controller/event_loop.rs
//! ============================================================================
//! # Event Loop: Cooperative Single-Owner Scheduling
//!
//! The event loop is the sole owner of [`AppState`]. Commands and task
//! completions arrive on one unbounded action channel and are dispatched
//! synchronously, so every tree mutation is serialized without a lock.
//! Anything that touches the host (the permission prompt, enumerations,
//! file activation) runs as a spawned task that reports back as an action.
//!
//! There is no cancellation: a load whose directory was collapsed (or whose
//! tree was discarded) still completes; the engine decides at completion
//! time whether the result still has a home.

use compact_str::CompactString;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

use arc_swap::ArcSwap;

use crate::config::Config;
use crate::controller::actions::Action;
use crate::error::AppError;
use crate::fs::capability::{DirectoryHandle, PermissionGateway};
use crate::fs::dir_loader;
use crate::model::app_state::AppState;
use crate::model::node::NodeId;
use crate::model::tree_state::{LoadOutcome, PendingLoad, TreeSnapshot};
use crate::scene::activator;
use crate::scene::data::{SceneParser, SceneSink};

pub struct EventLoop {
    state: AppState,
    gateway: Arc<dyn PermissionGateway>,
    parser: Arc<dyn SceneParser>,
    sink: Arc<dyn SceneSink>,
    action_rx: UnboundedReceiver<Action>,
    action_tx: UnboundedSender<Action>,
}

impl EventLoop {
    pub fn new(
        config: Config,
        gateway: Arc<dyn PermissionGateway>,
        parser: Arc<dyn SceneParser>,
        sink: Arc<dyn SceneSink>,
    ) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        Self {
            state: AppState::new(config),
            gateway,
            parser,
            sink,
            action_rx,
            action_tx,
        }
    }

    /// Sender the host and presentation layer use to submit commands.
    #[must_use]
    pub fn handle(&self) -> UnboundedSender<Action> {
        self.action_tx.clone()
    }

    /// Snapshot-publication handle for the presentation layer.
    #[must_use]
    pub fn watch_tree(&self) -> Arc<ArcSwap<TreeSnapshot>> {
        self.state.tree.watch()
    }

    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Waits for the next queued action.
    pub async fn next_action(&mut self) -> Option<Action> {
        self.action_rx.recv().await
    }

    /// Runs until the channel closes or a `Quit` arrives.
    pub async fn run(mut self) {
        info!("Browser event loop started");

        while let Some(action) = self.next_action().await {
            if matches!(action, Action::Quit) {
                break;
            }

            self.dispatch_action(action);
        }

        info!("Browser event loop stopped");
    }

    /// Applies one action to the state. Never awaits: host work is spawned,
    /// and its completion comes back through the channel.
    pub fn dispatch_action(&mut self, action: Action) {
        match action {
            Action::SelectRoot => self.handle_select_root(),

            Action::RootResolved(result) => self.handle_root_resolved(result),

            Action::Toggle(id) => self.handle_toggle(id),

            Action::ChildrenLoaded { id, outcome } => self.handle_children_loaded(id, outcome),

            Action::Activate(id) => self.handle_activate(id),

            Action::ActivateFinished { name, result } => {
                self.handle_activate_finished(&name, result);
            }

            Action::DismissError => self.state.status.clear_error(),

            Action::Quit => {
                debug!("Quit handled in run()");
            }
        }
    }

    fn handle_select_root(&mut self) {
        debug!("Requesting a root directory from the host");
        self.state.status.set_busy(true);

        let gateway: Arc<dyn PermissionGateway> = Arc::clone(&self.gateway);
        let tx: UnboundedSender<Action> = self.action_tx.clone();

        tokio::spawn(async move {
            let result = gateway.request_root().await;

            let _ = tx.send(Action::RootResolved(result));
        });
    }

    fn handle_root_resolved(&mut self, result: Result<Arc<dyn DirectoryHandle>, AppError>) {
        match result {
            Ok(dir) => {
                let name = CompactString::new(dir.name());
                info!("Root directory \"{}\" granted", name);

                // Busy stays set until the root listing lands.
                let pending: PendingLoad = self.state.tree.select_root(name, dir);
                self.spawn_load(pending);
            }

            Err(err) if err.is_user_abort() => {
                debug!("Root selection aborted by the user");
                self.state.status.set_busy(false);
            }

            Err(err) => {
                self.state.report(&err);
                self.state.status.set_busy(false);
            }
        }
    }

    fn handle_toggle(&mut self, id: NodeId) {
        if let Some(pending) = self.state.tree.toggle(id) {
            self.spawn_load(pending);
        }
    }

    fn handle_children_loaded(&mut self, id: NodeId, outcome: LoadOutcome) {
        let error: Option<AppError> = outcome.error.clone();
        let applied: bool = self.state.tree.finish_load(id, outcome);

        if !applied {
            // Stale completion; neither the tree nor the status slot moves.
            return;
        }

        if let Some(err) = error {
            self.state.report(&err);
        }

        if self.state.tree.root_id() == Some(id) {
            self.state.status.set_busy(false);
        }
    }

    fn handle_activate(&mut self, id: NodeId) {
        let (name, file) = {
            let Some(node) = self.state.tree.get(id) else {
                debug!("Activate on unknown node {}, ignoring", id);
                return;
            };

            let Some(file) = node.handle.as_file() else {
                // Directories are toggled, not activated.
                return;
            };

            (node.name.clone(), Arc::clone(file))
        };

        if let Err(err) =
            activator::validate(&self.state.config.accept, &name, file.media_type())
        {
            self.state.report(&err);
            return;
        }

        self.state.status.set_busy(true);

        activator::spawn_activation(
            name,
            file,
            Arc::clone(&self.parser),
            Arc::clone(&self.sink),
            self.action_tx.clone(),
        );
    }

    fn handle_activate_finished(&mut self, name: &str, result: Result<(), AppError>) {
        self.state.status.set_busy(false);

        match result {
            Ok(()) => debug!("Activation of \"{}\" complete", name),
            Err(err) => self.state.report(&err),
        }
    }

    fn spawn_load(&self, pending: PendingLoad) {
        let show_hidden: bool = self.state.config.show_hidden;
        let tx: UnboundedSender<Action> = self.action_tx.clone();

        tokio::spawn(async move {
            let mut entries = Vec::new();
            let error: Option<AppError> =
                dir_loader::enumerate(pending.dir.as_ref(), show_hidden, &mut entries)
                    .await
                    .err();

            let _ = tx.send(Action::ChildrenLoaded {
                id: pending.id,
                outcome: LoadOutcome { entries, error },
            });
        });
    }
}
