//! CubiCasa5K split loading.
//!
//! Each split has a manifest (`<root>/<split>.txt`) listing one sample
//! directory per line, e.g. `/high_quality_architectural/6044/`. A sample
//! directory holds the floorplan image and its SVG annotation. Samples with
//! missing files or unparseable annotations are skipped, never fatal.

use crate::annotation::AnnotationParser;
use crate::config::DatasetConfig;
use crate::error::{FloorplanError, Result};
use crate::label::Sample;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// A named dataset partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Val,
    Test,
}

impl Split {
    pub const ALL: [Split; 3] = [Split::Train, Split::Val, Split::Test];

    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
            Split::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Split {
    type Err = FloorplanError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "train" => Ok(Split::Train),
            "val" => Ok(Split::Val),
            "test" => Ok(Split::Test),
            other => Err(FloorplanError::InvalidSplit(other.to_string())),
        }
    }
}

/// Loads labeled samples for a split.
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    config: DatasetConfig,
    parser: AnnotationParser,
}

impl DatasetLoader {
    /// Create a loader with the default CubiCasa5K vocabulary.
    pub fn new(config: DatasetConfig) -> Self {
        Self::with_parser(config, AnnotationParser::default())
    }

    /// Create a loader with a custom annotation parser.
    pub fn with_parser(config: DatasetConfig, parser: AnnotationParser) -> Self {
        Self { config, parser }
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    /// Path of the manifest file for a split.
    pub fn manifest_path(&self, split: Split) -> PathBuf {
        self.config.root.join(format!("{}.txt", split))
    }

    /// Load a split by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not `train`, `val` or `test`, or if the
    /// split's manifest does not exist.
    pub fn load_split(&self, split: &str, limit: Option<usize>) -> Result<Vec<Sample>> {
        self.load(split.parse()?, limit)
    }

    /// Load up to `limit` usable samples of a split, in manifest order.
    ///
    /// A limit of zero means no limit.
    pub fn load(&self, split: Split, limit: Option<usize>) -> Result<Vec<Sample>> {
        let limit = limit.filter(|&n| n > 0);
        let manifest_path = self.manifest_path(split);
        if !manifest_path.exists() {
            return Err(FloorplanError::ManifestNotFound(manifest_path));
        }

        let manifest = fs::read_to_string(&manifest_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::InvalidData => FloorplanError::Config(format!(
                "split manifest '{}' is not valid UTF-8",
                manifest_path.display()
            )),
            _ => FloorplanError::io(&manifest_path, e),
        })?;

        let mut samples = Vec::new();
        let mut listed = 0usize;

        for rel_path in manifest.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if limit.is_some_and(|n| samples.len() >= n) {
                break;
            }
            listed += 1;

            let dir = self.config.root.join(rel_path.trim_matches('/'));
            if let Some(sample) = self.load_sample(dir) {
                samples.push(sample);
            }
        }

        info!(
            split = %split,
            loaded = samples.len(),
            skipped = listed - samples.len(),
            "loaded split"
        );

        Ok(samples)
    }

    /// Load one sample directory, or `None` if it is unusable.
    fn load_sample(&self, dir: PathBuf) -> Option<Sample> {
        let image_path = dir.join(&self.config.image_file);
        let annotation_path = dir.join(&self.config.annotation_file);

        if !image_path.exists() || !annotation_path.exists() {
            debug!(dir = %dir.display(), "skipping sample with missing files");
            return None;
        }

        match self.parser.parse_file(&annotation_path) {
            Ok(gold_label) => Some(Sample {
                dir,
                image_path,
                gold_label,
            }),
            Err(e) => {
                warn!("Could not load {}: {}", dir.display(), e);
                None
            }
        }
    }
}
