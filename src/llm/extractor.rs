//! Vision-model backed [`Predictor`].

use crate::error::{FloorplanError, Result};
use crate::evaluate::Predictor;
use crate::label::FloorplanLabel;
use crate::llm::{LlmClient, Prompts};
use crate::scoring::Prediction;
use std::path::Path;
use tracing::{debug, warn};

/// Extracts a [`FloorplanLabel`] from a floorplan image with one vision call.
pub struct VisionExtractor {
    client: LlmClient,
    instruction: String,
}

impl VisionExtractor {
    /// Create an extractor with the default instruction.
    pub fn new(client: LlmClient) -> Self {
        Self::with_instruction(client, Prompts::extract_instruction())
    }

    /// Create an extractor with a custom (e.g. optimized) instruction.
    pub fn with_instruction(client: LlmClient, instruction: impl Into<String>) -> Self {
        Self {
            client,
            instruction: instruction.into(),
        }
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// Run extraction on one image file, requiring a well-formed label.
    pub async fn extract(&self, image: &Path) -> Result<FloorplanLabel> {
        match self.extract_prediction(image).await? {
            Prediction::Label(label) => Ok(label),
            Prediction::Wrapped(wrapped) => Ok(wrapped.extracted_data),
            Prediction::Unrecognized(kind) => Err(FloorplanError::LlmParse(format!(
                "Response is not a floorplan label: {}",
                kind
            ))),
        }
    }

    /// Run extraction on one image file, keeping whatever the model replied.
    ///
    /// Only I/O and API failures are errors; a reply that is not a label comes
    /// back as [`Prediction::Unrecognized`].
    pub async fn extract_prediction(&self, image: &Path) -> Result<Prediction> {
        if !image.exists() {
            return Err(FloorplanError::ImageNotFound(image.to_path_buf()));
        }
        let bytes = tokio::fs::read(image)
            .await
            .map_err(|e| FloorplanError::io(image, e))?;

        let response = self
            .client
            .complete_with_image(
                Some(Prompts::system_floorplan_analyst()),
                &Prompts::extraction_prompt(&self.instruction),
                &bytes,
                mime_type(image),
            )
            .await?;

        debug!(image = %image.display(), "received extraction response");
        Ok(Self::parse_response(&response))
    }

    /// Classify a model reply: a bare label, an `extracted_data` wrapper, or
    /// anything else.
    fn parse_response(response: &str) -> Prediction {
        let json_str = Self::extract_json(response);
        match serde_json::from_str(&json_str) {
            Ok(value) => Prediction::from_value(value),
            Err(e) => {
                let snippet: String = response.chars().take(200).collect();
                warn!(error = %e, "extraction response is not JSON");
                Prediction::Unrecognized(format!("non-JSON reply \"{}\"", snippet))
            }
        }
    }

    /// Extract JSON from potentially markdown-wrapped response.
    fn extract_json(response: &str) -> String {
        let response = response.trim();

        if response.starts_with("```") {
            if let Some(end) = response.rfind("```") {
                let start = response.find('\n').map(|n| n + 1).unwrap_or(3);
                if end > start {
                    return response[start..end].trim().to_string();
                }
            }
        }

        if let Some(start) = response.find('{') {
            if let Some(end) = response.rfind('}') {
                if end > start {
                    return response[start..=end].to_string();
                }
            }
        }

        response.to_string()
    }
}

impl Predictor for VisionExtractor {
    async fn predict(&self, image: &Path) -> Result<Prediction> {
        self.extract_prediction(image).await
    }
}

/// MIME type from the file extension; floorplans default to PNG.
fn mime_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/png",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABEL_JSON: &str = r#"{"rooms": [{"type": "bedroom"}, {"type": "bathroom", "area_sqft": 40}], "total_rooms": 2, "has_garage": false, "num_bathrooms": 1, "num_bedrooms": 1}"#;

    fn parse_label(response: &str) -> FloorplanLabel {
        VisionExtractor::parse_response(response)
            .label()
            .cloned()
            .expect("response should hold a label")
    }

    #[test]
    fn test_parse_bare_label() {
        let label = parse_label(LABEL_JSON);
        assert_eq!(label.total_rooms, 2);
        assert_eq!(label.rooms[1].area_sqft, Some(40.0));
    }

    #[test]
    fn test_parse_fenced_and_wrapped_label() {
        let response = format!("```json\n{{\"extracted_data\": {}}}\n```", LABEL_JSON);
        let prediction = VisionExtractor::parse_response(&response);
        assert!(matches!(prediction, Prediction::Wrapped(_)));
        assert_eq!(parse_label(&response).num_bedrooms, 1);
    }

    #[test]
    fn test_parse_label_with_leading_prose() {
        let response = format!("Here is the inventory:\n{}\nDone.", LABEL_JSON);
        let label = parse_label(&response);
        assert_eq!(label.room_types(), vec!["bedroom", "bathroom"]);
    }

    #[test]
    fn test_parse_keeps_out_of_range_counts() {
        let response = r#"{"rooms": [{"type": "bedroom"}], "total_rooms": 1.0, "has_garage": false, "num_bathrooms": -1, "num_bedrooms": 1}"#;
        let label = parse_label(response);
        assert_eq!(label.total_rooms, 1);
        assert_eq!(label.num_bathrooms, -1);
    }

    #[test]
    fn test_parse_non_label_is_unrecognized() {
        let prediction = VisionExtractor::parse_response(r#"{"rooms": "many"}"#);
        assert_eq!(
            prediction,
            Prediction::Unrecognized("object {rooms}".to_string())
        );

        match VisionExtractor::parse_response("no json here") {
            Prediction::Unrecognized(kind) => assert!(kind.contains("no json here")),
            other => panic!("unexpected prediction: {other:?}"),
        }
    }

    #[test]
    fn test_mime_type() {
        assert_eq!(mime_type(Path::new("F1_original.png")), "image/png");
        assert_eq!(mime_type(Path::new("plan.JPG")), "image/jpeg");
        assert_eq!(mime_type(Path::new("plan")), "image/png");
    }
}
