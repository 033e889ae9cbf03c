//! Persistence layer for optimized prompt artifacts.
//!
//! Supports both JSON (human-readable) and bincode (efficient binary) formats,
//! plus reading the `state.json` that prompt optimizers write out.

use crate::error::{FloorplanError, Result};
use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Optimizer state file inside a saved extractor directory.
pub const STATE_FILENAME: &str = "state.json";

/// An extraction instruction together with where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct PromptArtifact {
    /// Task instruction given to the vision model.
    pub instruction: String,

    /// Model the instruction was tuned for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Validation score reached with this instruction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    /// Split the score was measured on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split: Option<String>,
}

impl PromptArtifact {
    pub fn new(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            model: None,
            score: None,
            split: None,
        }
    }
}

/// Save format for prompt artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    /// JSON format (human-readable, larger).
    Json,
    /// Bincode format (binary, compact).
    Bincode,
}

impl SaveFormat {
    /// Determine format from file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => SaveFormat::Json,
            Some("bin") | Some("bincode") => SaveFormat::Bincode,
            _ => SaveFormat::Json,
        }
    }
}

/// Save a prompt artifact, choosing the format from the extension.
pub fn save_artifact(artifact: &PromptArtifact, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| FloorplanError::io(parent, e))?;
        }
    }

    let data = match SaveFormat::from_path(path) {
        SaveFormat::Json => serde_json::to_string_pretty(artifact)
            .map_err(|e| FloorplanError::Serialization(e.to_string()))?
            .into_bytes(),
        SaveFormat::Bincode => {
            let config = bincode::config::standard();
            bincode::encode_to_vec(artifact, config)
                .map_err(|e| FloorplanError::Serialization(e.to_string()))?
        }
    };

    fs::write(path, &data).map_err(|e| FloorplanError::io(path, e))?;

    Ok(())
}

/// Load a prompt artifact from a file.
pub fn load_artifact(path: &Path) -> Result<PromptArtifact> {
    if !path.exists() {
        return Err(FloorplanError::ArtifactNotFound(path.to_path_buf()));
    }

    let data = fs::read(path).map_err(|e| FloorplanError::io(path, e))?;

    let artifact = match SaveFormat::from_path(path) {
        SaveFormat::Json => serde_json::from_slice(&data)
            .map_err(|e| FloorplanError::Serialization(e.to_string()))?,
        SaveFormat::Bincode => {
            let config = bincode::config::standard();
            let (artifact, _): (PromptArtifact, usize) = bincode::decode_from_slice(&data, config)
                .map_err(|e| FloorplanError::Serialization(e.to_string()))?;
            artifact
        }
    };

    Ok(artifact)
}

#[derive(Debug, Deserialize)]
struct OptimizerState {
    extractor: Option<ExtractorState>,
}

#[derive(Debug, Deserialize)]
struct ExtractorState {
    predict: Option<PredictState>,
}

#[derive(Debug, Deserialize)]
struct PredictState {
    #[serde(default)]
    instruction: String,
}

/// Read the optimized instruction from a saved extractor directory.
///
/// Returns `Ok(None)` when the state file has no (or an empty) instruction.
pub fn load_instruction(dir: &Path) -> Result<Option<String>> {
    let path = dir.join(STATE_FILENAME);
    if !path.exists() {
        return Err(FloorplanError::ArtifactNotFound(path));
    }

    let content = fs::read_to_string(&path).map_err(|e| FloorplanError::io(&path, e))?;
    let state: OptimizerState = serde_json::from_str(&content)
        .map_err(|e| FloorplanError::Serialization(e.to_string()))?;

    Ok(state
        .extractor
        .and_then(|e| e.predict)
        .map(|p| p.instruction)
        .filter(|i| !i.trim().is_empty()))
}

/// Resolve an instruction from either an artifact file or an optimizer directory.
pub fn resolve_instruction(path: &Path) -> Result<Option<String>> {
    if path.is_dir() {
        load_instruction(path)
    } else {
        load_artifact(path).map(|a| Some(a.instruction))
    }
}
