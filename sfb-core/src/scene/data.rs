//! src/scene/data.rs
//! ============================================================================
//! # Scene Boundary Types
//!
//! The browser core hands a picked file's content to the host editor and
//! nothing more. `SceneParser` and `SceneSink` are the two collaborator
//! seams: the parser turns raw bytes into an opaque [`SceneData`], the sink
//! is the host's fire-and-forget scene-update entry point.

use crate::error::AppError;

/// Parsed scene payload. Opaque to the browser core; only the host editor
/// interprets it.
#[derive(Debug, Clone)]
pub struct SceneData(serde_json::Value);

impl SceneData {
    #[must_use]
    pub const fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    #[must_use]
    pub fn into_value(self) -> serde_json::Value {
        self.0
    }
}

/// Scene deserializer collaborator.
pub trait SceneParser: Send + Sync {
    fn parse(&self, raw: &[u8]) -> Result<SceneData, AppError>;
}

/// Host scene consumer. Side-effecting, fire-and-forget.
pub trait SceneSink: Send + Sync {
    fn update_scene(&self, scene: SceneData);
}

/// Default parser: accepts any well-formed JSON document.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSceneParser;

impl SceneParser for JsonSceneParser {
    fn parse(&self, raw: &[u8]) -> Result<SceneData, AppError> {
        let value: serde_json::Value = serde_json::from_slice(raw)?;
        Ok(SceneData::new(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_parser_accepts_scene_document() {
        let parser = JsonSceneParser;
        let scene = parser
            .parse(br#"{"type":"excalidraw","elements":[]}"#)
            .unwrap();

        assert_eq!(scene.as_value()["type"], "excalidraw");
    }

    #[test]
    fn test_json_parser_rejects_garbage() {
        let parser = JsonSceneParser;
        let err = parser.parse(b"\x89PNG\r\n").unwrap_err();

        assert!(matches!(err, AppError::SceneParse(_)));
    }
}
