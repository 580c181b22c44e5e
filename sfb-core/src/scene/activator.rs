//! src/scene/activator.rs
//! ============================================================================
//! # File Activator
//!
//! Validates a picked file node against the accepted scene types and, on a
//! match, runs the read → parse → hand-off pipeline as a background task.
//! `update_scene` fires exactly once, only when both the read and the parse
//! succeed; a type mismatch never touches the host at all.

use compact_str::CompactString;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

use crate::config::AcceptConfig;
use crate::controller::actions::Action;
use crate::error::AppError;
use crate::fs::capability::FileHandle;
use crate::scene::data::{SceneData, SceneParser, SceneSink};

/// Checks an entry against the accepted scene types before any host read.
pub fn validate(
    accept: &AcceptConfig,
    name: &str,
    media_type: Option<&str>,
) -> Result<(), AppError> {
    if accept.matches(name, media_type) {
        Ok(())
    } else {
        debug!(
            "Rejecting \"{}\" (media type {:?}): not an accepted scene type",
            name, media_type
        );
        Err(AppError::unsupported(name))
    }
}

/// Spawns the activation pipeline for an already-validated file capability.
///
/// Completion is reported back to the event loop as
/// [`Action::ActivateFinished`].
pub fn spawn_activation(
    name: CompactString,
    file: Arc<dyn FileHandle>,
    parser: Arc<dyn SceneParser>,
    sink: Arc<dyn SceneSink>,
    action_tx: UnboundedSender<Action>,
) {
    tokio::spawn(async move {
        let result: Result<(), AppError> = activate(&name, file, parser, sink).await;

        let _ = action_tx.send(Action::ActivateFinished { name, result });
    });
}

async fn activate(
    name: &str,
    file: Arc<dyn FileHandle>,
    parser: Arc<dyn SceneParser>,
    sink: Arc<dyn SceneSink>,
) -> Result<(), AppError> {
    debug!("Reading \"{}\" for activation", name);

    let raw: Vec<u8> = file
        .read()
        .await
        .map_err(|e: std::io::Error| AppError::read_failed(name, e))?;

    let scene: SceneData = parser.parse(&raw)?;

    sink.update_scene(scene);
    info!("Scene \"{}\" handed to the host editor", name);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::memory::MemoryFile;
    use crate::scene::data::JsonSceneParser;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;

    #[derive(Default)]
    struct RecordingSink {
        scenes: Mutex<Vec<SceneData>>,
    }

    impl RecordingSink {
        fn calls(&self) -> usize {
            self.scenes.lock().unwrap().len()
        }
    }

    impl SceneSink for RecordingSink {
        fn update_scene(&self, scene: SceneData) {
            self.scenes.lock().unwrap().push(scene);
        }
    }

    struct CountingParser {
        inner: JsonSceneParser,
        calls: AtomicUsize,
    }

    impl CountingParser {
        fn new() -> Self {
            Self {
                inner: JsonSceneParser,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl SceneParser for CountingParser {
        fn parse(&self, raw: &[u8]) -> Result<SceneData, AppError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            self.inner.parse(raw)
        }
    }

    async fn run_activation(
        file: Arc<MemoryFile>,
    ) -> (Result<(), AppError>, Arc<CountingParser>, Arc<RecordingSink>) {
        let parser = Arc::new(CountingParser::new());
        let sink = Arc::new(RecordingSink::default());
        let (tx, mut rx) = mpsc::unbounded_channel();

        let name = CompactString::new(file.name());
        spawn_activation(
            name,
            file,
            Arc::clone(&parser) as Arc<dyn SceneParser>,
            Arc::clone(&sink) as Arc<dyn SceneSink>,
            tx,
        );

        let action = rx.recv().await.expect("activation reports completion");
        let Action::ActivateFinished { result, .. } = action else {
            panic!("unexpected action: {action:?}");
        };

        (result, parser, sink)
    }

    #[test]
    fn test_validate_accepts_scene_extension_and_json_media_type() {
        let accept = AcceptConfig::default();

        assert!(validate(&accept, "scene.excalidraw", None).is_ok());
        assert!(validate(&accept, "data.bin", Some("application/json")).is_ok());
    }

    #[test]
    fn test_validate_rejects_other_types() {
        let accept = AcceptConfig::default();
        let err = validate(&accept, "photo.png", Some("image/png")).unwrap_err();

        assert!(matches!(err, AppError::UnsupportedFileType(_)));
    }

    #[tokio::test]
    async fn test_activation_parses_once_and_updates_scene_once() {
        let file = Arc::new(MemoryFile::new(
            "scene.excalidraw",
            br#"{"elements":[]}"#,
            None,
        ));

        let (result, parser, sink) = run_activation(Arc::clone(&file)).await;

        assert!(result.is_ok());
        assert_eq!(file.read_calls(), 1);
        assert_eq!(parser.calls.load(Ordering::Relaxed), 1);
        assert_eq!(sink.calls(), 1);
    }

    #[tokio::test]
    async fn test_read_failure_reports_io_and_never_updates_scene() {
        let file = Arc::new(MemoryFile::new("scene.excalidraw", b"", None).failing());

        let (result, parser, sink) = run_activation(file).await;

        assert!(matches!(result, Err(AppError::Io { .. })));
        assert_eq!(parser.calls.load(Ordering::Relaxed), 0);
        assert_eq!(sink.calls(), 0);
    }

    #[tokio::test]
    async fn test_parse_failure_never_updates_scene() {
        let file = Arc::new(MemoryFile::new("scene.excalidraw", b"not json at all", None));

        let (result, _parser, sink) = run_activation(file).await;

        assert!(matches!(result, Err(AppError::SceneParse(_))));
        assert_eq!(sink.calls(), 0);
    }
}
