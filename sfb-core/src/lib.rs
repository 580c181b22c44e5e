pub mod error;

pub mod config;

pub mod fs {
    pub mod capability;
    pub use capability::{
        DirectoryHandle, EntryHandle, EntryKind, EntryStream, FileHandle, PermissionGateway,
        RawEntry,
    };

    pub mod dir_loader;

    pub mod local;
    pub use local::LocalGateway;

    pub mod memory;
}

pub mod model {
    pub mod node;
    pub use node::{LoadState, Node, NodeId};

    pub mod tree_state;
    pub use tree_state::{LoadOutcome, PendingLoad, TreeSnapshot, TreeState};

    pub mod status;
    pub use status::StatusState;

    pub mod app_state;
}

pub mod controller {
    pub mod actions;
    pub use actions::Action;

    pub mod event_loop;
    pub use event_loop::EventLoop;
}

pub mod scene {
    pub mod data;
    pub use data::{JsonSceneParser, SceneData, SceneParser, SceneSink};

    pub mod activator;
}

pub mod logging;
pub use logging::Logger;

pub use error::AppError;

pub use config::Config;

pub use model::{app_state::AppState, tree_state::TreeState};
