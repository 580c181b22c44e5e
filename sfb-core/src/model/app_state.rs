//! src/model/app_state.rs
//! ============================================================================
//! # `AppState`: Aggregate State Owned by the Event Loop

use crate::config::Config;
use crate::error::AppError;
use crate::model::status::StatusState;
use crate::model::tree_state::TreeState;

/// Everything mutable in the browser core. Owned exclusively by the event
/// loop; background tasks only ever see snapshots and channel endpoints.
pub struct AppState {
    pub config: Config,
    pub tree: TreeState,
    pub status: StatusState,
}

impl AppState {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            tree: TreeState::new(),
            status: StatusState::new(),
        }
    }

    /// Routes a failure into the status slot. `UserAborted` stays silent.
    pub fn report(&mut self, err: &AppError) {
        if !err.is_user_abort() {
            self.status.set_error(err.to_string());
        }
    }
}
