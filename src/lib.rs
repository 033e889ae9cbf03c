//! Floorplan Extractor - structured room inventories from floorplan images.
//!
//! A vision-capable LLM reads a floorplan raster and reports its rooms. This
//! crate supplies everything around that call that needs to be exact:
//! ground truth derived from CubiCasa5K SVG annotations, and a scoring metric
//! that compares a predicted inventory with the gold one and explains every
//! mismatch, so prompts can be tuned against it.
//!
//! # Quick Start
//!
//! ```no_run
//! use floorplan_extractor::{
//!     config::Config,
//!     dataset::DatasetLoader,
//!     evaluate::Evaluator,
//!     llm::{LlmClient, VisionExtractor},
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     config.validate()?;
//!
//!     let extractor = VisionExtractor::new(LlmClient::new(config.llm.clone()));
//!     let evaluator = Evaluator::new(DatasetLoader::new(config.dataset.clone()));
//!
//!     let report = evaluator.evaluate(&extractor, "test").await?;
//!     report.print_summary();
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **Vocabulary**: maps annotation class tokens to canonical room types
//! - **AnnotationParser**: SVG annotation -> gold `FloorplanLabel`
//! - **DatasetLoader**: split manifest -> `(image, gold label)` samples
//! - **scoring**: four-component metric with diagnostic feedback
//! - **Evaluator**: runs a `Predictor` over a split and averages scores
//! - **VisionExtractor**: the LLM-backed `Predictor`

pub mod annotation;
pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluate;
pub mod label;
pub mod llm;
pub mod persistence;
pub mod scoring;
pub mod vocabulary;

// Re-export commonly used types
pub use annotation::AnnotationParser;
pub use config::Config;
pub use dataset::{DatasetLoader, Split};
pub use error::{FloorplanError, Result};
pub use evaluate::{EvaluationReport, Evaluator, Predictor};
pub use label::{FloorplanLabel, Room, Sample};
pub use llm::{LlmClient, VisionExtractor};
pub use persistence::{load_artifact, save_artifact, PromptArtifact};
pub use scoring::{score, score_prediction, Prediction, ScoreResult};
pub use vocabulary::{RoomType, Vocabulary};
