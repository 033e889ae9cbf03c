//! Extraction quality metric.
//!
//! A prediction is scored against the gold label on four equally weighted
//! components, each worth 0.25:
//!
//! | component       | award                                           |
//! |-----------------|-------------------------------------------------|
//! | room count      | exact match of `total_rooms`                    |
//! | bedroom count   | exact match of `num_bedrooms`                   |
//! | bathroom count  | exact match of `num_bathrooms`                  |
//! | type coverage   | recall of gold room types among predicted types |
//!
//! In diagnostic mode the score comes with feedback naming every mismatch,
//! which prompt optimizers feed back into their search.

use crate::label::FloorplanLabel;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Weight of each score component.
pub const COMPONENT_WEIGHT: f64 = 0.25;

/// Feedback when no component reported a mismatch.
pub const GOOD_EXTRACTION: &str = "Good extraction";

/// Score for one prediction, with optional feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Score in [0, 1].
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

/// Wrapper shape some predictors return around the label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionOutput {
    pub extracted_data: FloorplanLabel,
}

/// A predicted value as handed to the scorer.
#[derive(Debug, Clone, PartialEq)]
pub enum Prediction {
    /// The label itself.
    Label(FloorplanLabel),
    /// A wrapper exposing the label as `extracted_data`.
    Wrapped(ExtractionOutput),
    /// Anything else; holds a short description of what was received.
    Unrecognized(String),
}

impl Prediction {
    /// Classify raw model output.
    pub fn from_value(value: Value) -> Self {
        let kind = value_kind(&value);
        if value.get("extracted_data").is_some() {
            return match serde_json::from_value::<ExtractionOutput>(value) {
                Ok(wrapped) => Prediction::Wrapped(wrapped),
                Err(_) => Prediction::Unrecognized(kind),
            };
        }
        match serde_json::from_value::<FloorplanLabel>(value) {
            Ok(label) => Prediction::Label(label),
            Err(_) => Prediction::Unrecognized(kind),
        }
    }

    /// The label carried by this prediction, if any.
    pub fn label(&self) -> Option<&FloorplanLabel> {
        match self {
            Prediction::Label(label) => Some(label),
            Prediction::Wrapped(wrapped) => Some(&wrapped.extracted_data),
            Prediction::Unrecognized(_) => None,
        }
    }
}

impl From<FloorplanLabel> for Prediction {
    fn from(label: FloorplanLabel) -> Self {
        Prediction::Label(label)
    }
}

fn value_kind(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "bool".to_string(),
        Value::Number(_) => "number".to_string(),
        Value::String(_) => "string".to_string(),
        Value::Array(_) => "array".to_string(),
        Value::Object(map) => {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            format!("object {{{}}}", keys.join(", "))
        }
    }
}

/// Score any prediction shape. Never fails: unrecognized shapes score zero.
pub fn score_prediction(
    gold: &FloorplanLabel,
    prediction: &Prediction,
    with_feedback: bool,
) -> ScoreResult {
    match prediction.label() {
        Some(pred) => score(gold, pred, with_feedback),
        None => {
            let kind = match prediction {
                Prediction::Unrecognized(kind) => kind.as_str(),
                _ => "unknown",
            };
            ScoreResult {
                score: 0.0,
                feedback: with_feedback.then(|| format!("Invalid prediction type: {}", kind)),
            }
        }
    }
}

/// Score a predicted label against the gold label.
///
/// The prediction is taken at face value; its aggregate fields are compared
/// even when they disagree with its own room list.
pub fn score(gold: &FloorplanLabel, pred: &FloorplanLabel, with_feedback: bool) -> ScoreResult {
    let mut total = 0.0;
    let mut feedback = Vec::new();

    let counts = [
        ("Room", gold.total_rooms, pred.total_rooms),
        ("Bedroom", gold.num_bedrooms, pred.num_bedrooms),
        ("Bathroom", gold.num_bathrooms, pred.num_bathrooms),
    ];
    for (what, expected, got) in counts {
        if expected == got {
            total += COMPONENT_WEIGHT;
        } else {
            feedback.push(format!(
                "{} count mismatch: expected {}, got {}",
                what, expected, got
            ));
        }
    }

    let gold_types = type_set(gold);
    let pred_types = type_set(pred);
    if gold_types.is_empty() {
        total += COMPONENT_WEIGHT;
    } else {
        let overlap = gold_types.intersection(&pred_types).count() as f64 / gold_types.len() as f64;
        total += COMPONENT_WEIGHT * overlap;
        if overlap < 1.0 {
            let missing: Vec<&str> = gold_types
                .difference(&pred_types)
                .map(String::as_str)
                .collect();
            feedback.push(format!("Missing room types: {}", missing.join(", ")));
        }
    }

    ScoreResult {
        score: total,
        feedback: with_feedback.then(|| {
            if feedback.is_empty() {
                GOOD_EXTRACTION.to_string()
            } else {
                feedback.join("\n")
            }
        }),
    }
}

fn type_set(label: &FloorplanLabel) -> BTreeSet<String> {
    label
        .rooms
        .iter()
        .map(|r| r.room_type.to_lowercase())
        .collect()
}
