//! Split-level evaluation of a predictor.

use crate::dataset::{DatasetLoader, Split};
use crate::error::{FloorplanError, Result};
use crate::scoring::{score_prediction, Prediction, ScoreResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::future::Future;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Anything that can turn a floorplan image into a prediction.
///
/// A reply that is not a label is still a prediction
/// ([`Prediction::Unrecognized`]) and scores zero. `Err` is reserved for
/// failures to obtain a reply at all.
pub trait Predictor {
    fn predict(&self, image: &Path) -> impl Future<Output = Result<Prediction>> + Send;
}

/// Aggregate results of evaluating one split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub split: Split,
    pub num_examples: usize,
    pub avg_score: f64,
    /// Per-sample results, in manifest order.
    pub results: Vec<ScoreResult>,
    /// Wall-clock time of the run (seconds).
    #[serde(default)]
    pub total_time_secs: f64,
}

impl EvaluationReport {
    /// Save the report as pretty-printed JSON.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| FloorplanError::Serialization(e.to_string()))?;
        fs::write(path, content).map_err(|e| FloorplanError::io(path, e))
    }

    /// Number of samples that scored a perfect 1.0.
    pub fn perfect_count(&self) -> usize {
        self.results.iter().filter(|r| r.score >= 1.0).count()
    }

    /// Print summary to stdout.
    pub fn print_summary(&self) {
        println!("\n========== Evaluation Results ==========");
        println!("Split:         {}", self.split);
        println!("Examples:      {}", self.num_examples);
        println!("Average score: {:.2}%", self.avg_score * 100.0);
        println!("Perfect:       {}", self.perfect_count());
        println!("Total time:    {:.1}s", self.total_time_secs);
        println!("========================================\n");
    }
}

/// Runs a predictor over a split and averages the scores.
pub struct Evaluator {
    loader: DatasetLoader,
}

impl Evaluator {
    pub fn new(loader: DatasetLoader) -> Self {
        Self { loader }
    }

    /// Evaluate on every usable sample of a split.
    pub async fn evaluate<P: Predictor>(&self, predictor: &P, split: &str) -> Result<EvaluationReport> {
        self.evaluate_limited(predictor, split, None).await
    }

    /// Evaluate on at most `limit` samples of a split.
    ///
    /// # Errors
    ///
    /// Fails on configuration errors, when the split has no usable samples,
    /// and on the first predictor failure (the run is aborted). Malformed
    /// predictions do not fail the run; they score zero.
    pub async fn evaluate_limited<P: Predictor>(
        &self,
        predictor: &P,
        split: &str,
        limit: Option<usize>,
    ) -> Result<EvaluationReport> {
        let start = Instant::now();
        let split: Split = split.parse()?;
        let samples = self.loader.load(split, limit)?;

        if samples.is_empty() {
            return Err(FloorplanError::EmptySplit(split.to_string()));
        }

        let mut total_score = 0.0;
        let mut results = Vec::with_capacity(samples.len());

        for (idx, sample) in samples.iter().enumerate() {
            let pred = predictor
                .predict(&sample.image_path)
                .await
                .map_err(|e| FloorplanError::Prediction {
                    dir: sample.dir.clone(),
                    source: Box::new(e),
                })?;

            if let Prediction::Unrecognized(kind) = &pred {
                warn!(dir = %sample.dir.display(), kind = %kind, "unrecognized prediction");
            }
            let result = score_prediction(&sample.gold_label, &pred, true);
            debug!(
                "[{}/{}] {} -> {:.3}",
                idx + 1,
                samples.len(),
                sample.dir.display(),
                result.score
            );
            total_score += result.score;
            results.push(result);
        }

        let num_examples = samples.len();
        let avg_score = total_score / num_examples as f64;
        info!(split = %split, num_examples, avg_score, "evaluation finished");

        Ok(EvaluationReport {
            split,
            num_examples,
            avg_score,
            results,
            total_time_secs: start.elapsed().as_secs_f64(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatasetConfig;
    use crate::dataset::tests::{write_manifest, write_sample, BEDROOM_SVG};
    use crate::label::{FloorplanLabel, Room};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Returns a fixed label for every image.
    struct FixedPredictor {
        label: FloorplanLabel,
        calls: AtomicUsize,
    }

    impl FixedPredictor {
        fn new(types: &[&str]) -> Self {
            Self {
                label: FloorplanLabel::from_rooms(types.iter().map(|t| Room::new(*t)).collect()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Predictor for FixedPredictor {
        async fn predict(&self, _image: &Path) -> Result<Prediction> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.label.clone().into())
        }
    }

    /// Fails on images under a given directory name.
    struct FailingPredictor {
        fail_on: &'static str,
    }

    impl Predictor for FailingPredictor {
        async fn predict(&self, image: &Path) -> Result<Prediction> {
            if image.to_string_lossy().contains(self.fail_on) {
                return Err(FloorplanError::LlmApi("rate limited".to_string()));
            }
            Ok(FloorplanLabel::from_rooms(Vec::new()).into())
        }
    }

    /// Replies with prose instead of a label for images under one directory.
    struct GarbledPredictor {
        garble_on: &'static str,
        label: FloorplanLabel,
    }

    impl Predictor for GarbledPredictor {
        async fn predict(&self, image: &Path) -> Result<Prediction> {
            if image.to_string_lossy().contains(self.garble_on) {
                return Ok(Prediction::from_value(serde_json::json!("I see a house")));
            }
            Ok(self.label.clone().into())
        }
    }

    fn evaluator(root: &Path) -> Evaluator {
        Evaluator::new(DatasetLoader::new(DatasetConfig::with_root(root)))
    }

    #[test]
    fn test_average_over_split() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let kitchen_only = r#"<svg><g class="Space Kitchen"/></svg>"#;

        write_sample(root, "a", true, Some(BEDROOM_SVG));
        write_sample(root, "b", true, Some(kitchen_only));
        write_sample(root, "c", true, None);
        write_manifest(root, "test", &["a", "b", "c"]);

        let predictor = FixedPredictor::new(&["bedroom", "bathroom", "kitchen"]);
        let report = tokio_test::block_on(evaluator(root).evaluate(&predictor, "test")).unwrap();

        assert_eq!(report.split, Split::Test);
        assert_eq!(report.num_examples, 2);
        assert_eq!(predictor.calls.load(Ordering::SeqCst), 2);
        assert_eq!(report.results.len(), 2);

        // a: perfect. b: every count differs, kitchen covered -> 0.25.
        assert!((report.results[0].score - 1.0).abs() < 1e-9);
        assert!((report.results[1].score - 0.25).abs() < 1e-9);
        assert!((report.avg_score - 0.625).abs() < 1e-9);
        assert_eq!(report.perfect_count(), 1);
        assert!(report.results.iter().all(|r| r.feedback.is_some()));
    }

    #[test]
    fn test_empty_split_is_an_error() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write_sample(root, "a", true, None);
        write_manifest(root, "val", &["a"]);

        let predictor = FixedPredictor::new(&[]);
        let err = tokio_test::block_on(evaluator(root).evaluate(&predictor, "val")).unwrap_err();

        assert!(matches!(err, FloorplanError::EmptySplit(_)));
        assert!(err.is_configuration());
        assert_eq!(predictor.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_invalid_split_is_an_error() {
        let dir = TempDir::new().unwrap();
        let predictor = FixedPredictor::new(&[]);
        let err = tokio_test::block_on(evaluator(dir.path()).evaluate(&predictor, "dev")).unwrap_err();
        assert!(matches!(err, FloorplanError::InvalidSplit(_)));
    }

    #[test]
    fn test_predictor_failure_aborts_run() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write_sample(root, "ok", true, Some(BEDROOM_SVG));
        write_sample(root, "broken", true, Some(BEDROOM_SVG));
        write_manifest(root, "train", &["ok", "broken"]);

        let predictor = FailingPredictor { fail_on: "broken" };
        let err = tokio_test::block_on(evaluator(root).evaluate(&predictor, "train")).unwrap_err();

        match err {
            FloorplanError::Prediction { dir, source } => {
                assert_eq!(dir, root.join("broken"));
                assert!(matches!(*source, FloorplanError::LlmApi(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_prediction_scores_zero_and_run_completes() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        for name in ["first", "garbled", "last"] {
            write_sample(root, name, true, Some(BEDROOM_SVG));
        }
        write_manifest(root, "val", &["first", "garbled", "last"]);

        let predictor = GarbledPredictor {
            garble_on: "garbled",
            label: FloorplanLabel::from_rooms(
                ["bedroom", "bathroom", "kitchen"].map(Room::new).to_vec(),
            ),
        };
        let report = tokio_test::block_on(evaluator(root).evaluate(&predictor, "val")).unwrap();

        assert_eq!(report.num_examples, 3);
        assert!((report.results[0].score - 1.0).abs() < 1e-9);
        assert_eq!(report.results[1].score, 0.0);
        assert_eq!(
            report.results[1].feedback.as_deref(),
            Some("Invalid prediction type: string")
        );
        assert!((report.results[2].score - 1.0).abs() < 1e-9);
        assert!((report.avg_score - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_limit_and_report_json() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        for name in ["1", "2", "3"] {
            write_sample(root, name, true, Some(BEDROOM_SVG));
        }
        write_manifest(root, "train", &["1", "2", "3"]);

        let predictor = FixedPredictor::new(&["bedroom"]);
        let report = tokio_test::block_on(
            evaluator(root).evaluate_limited(&predictor, "train", Some(2)),
        )
        .unwrap();
        assert_eq!(report.num_examples, 2);

        let path = root.join("report.json");
        report.save_json(&path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"split\": \"train\""));
        assert!(content.contains("\"avg_score\""));
    }
}
