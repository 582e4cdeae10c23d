//! Interface to the external image-to-schematic recognition service.
//!
//! The topology core never calls this; it exists for the surrounding shell,
//! which uploads a photographed or hand-drawn sketch and folds the service's
//! answer back into the scene (see `Session::merge_recognized`). The service
//! is an external collaborator: everything crossing the boundary is the same
//! plain scene records the rest of the crate uses.

use async_trait::async_trait;
use serde::Deserialize;

use crate::schema::{ComponentMap, Scene, Wire};

/// Scene fragment returned by a recognizer: detected components and the
/// line segments joining them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecognizedScene {
    #[serde(default)]
    pub components: ComponentMap,
    #[serde(default)]
    pub lines: Vec<Wire>,
}

/// Errors crossing the recognizer boundary.
#[derive(Debug, thiserror::Error)]
pub enum RecognizeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Malformed recognizer response: {0}")]
    Decode(String),
}

/// Common interface for sketch recognizers.
#[async_trait]
pub trait SketchRecognizer: Send + Sync {
    /// Short provider name for logs and UI.
    fn name(&self) -> &str;

    /// Whether the provider is reachable and configured.
    async fn is_available(&self) -> bool;

    /// Recognize components and wires in an image, given the already-placed
    /// scene for context.
    async fn recognize(
        &self,
        image: Vec<u8>,
        file_name: &str,
        scene: &Scene,
    ) -> Result<RecognizedScene, RecognizeError>;
}

/// Default port of the companion recognition backend.
pub const DEFAULT_RECOGNIZER_URL: &str = "http://127.0.0.1:8000";

/// HTTP recognizer speaking the companion backend's `/process` contract:
/// multipart upload with the image under `file` and the current component
/// map as JSON under `json_data`.
pub struct HttpRecognizer {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRecognizer {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpRecognizer {
    fn default() -> Self {
        Self::new(DEFAULT_RECOGNIZER_URL)
    }
}

#[async_trait]
impl SketchRecognizer for HttpRecognizer {
    fn name(&self) -> &str {
        "http"
    }

    async fn is_available(&self) -> bool {
        match self.client.get(&self.base_url).send().await {
            Ok(response) => response.status().is_success(),
            Err(error) => {
                tracing::warn!("Recognizer at {} unreachable: {}", self.base_url, error);
                false
            }
        }
    }

    async fn recognize(
        &self,
        image: Vec<u8>,
        file_name: &str,
        scene: &Scene,
    ) -> Result<RecognizedScene, RecognizeError> {
        let json_data = serde_json::to_string(&scene.components)
            .map_err(|e| RecognizeError::Decode(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(image).file_name(file_name.to_string()),
            )
            .text("json_data", json_data);

        tracing::debug!("Sending sketch to recognizer at {}", self.base_url);
        let response = self
            .client
            .post(format!("{}/process", self.base_url))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;

        let mut recognized: RecognizedScene = response.json().await?;
        // The service is not trusted to return consistent derived data.
        for wire in &mut recognized.lines {
            wire.midpoint = Wire::grid_midpoint(wire.start, wire.end);
        }
        Ok(recognized)
    }
}
