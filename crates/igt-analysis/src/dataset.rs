//! Process-wide subject dataset with a once-only load guard.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use igt_core::model::subject::Subject;
use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing::{Level, event};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse dataset {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
        path: PathBuf,
    },
    #[error("subject {index}: {field} has {found} entries but only {width} trials are recorded")]
    Shape {
        index: usize,
        field: &'static str,
        found: usize,
        width: usize,
    },
}

/// Immutable collection of recorded subjects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    subjects: Vec<Subject>,
}

impl Dataset {
    pub fn new(subjects: Vec<Subject>) -> Self {
        Self { subjects }
    }

    /// Checks array shapes and forces losses non-positive.
    pub fn from_raw(mut subjects: Vec<Subject>) -> Result<Self, DatasetError> {
        for (index, subject) in subjects.iter_mut().enumerate() {
            let width = subject.width();
            for (field, found) in [("gains", subject.gains.len()), ("losses", subject.losses.len())] {
                if found > width {
                    return Err(DatasetError::Shape {
                        index,
                        field,
                        found,
                        width,
                    });
                }
            }
            subject.normalize_losses();
        }
        Ok(Self { subjects })
    }

    pub fn get(&self, index: usize) -> Option<&Subject> {
        self.subjects.get(index)
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}

/// Anything able to produce a dataset on first use.
pub trait DatasetSource: Send + Sync {
    fn describe(&self) -> String;

    fn load(&self) -> Result<Dataset, DatasetError>;
}

/// JSON array of subjects, as written by the dataset export tooling.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl DatasetSource for JsonFileSource {
    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }

    fn load(&self) -> Result<Dataset, DatasetError> {
        let file = File::open(&self.path).map_err(|source| DatasetError::Read {
            source,
            path: self.path.clone(),
        })?;
        let subjects: Vec<Subject> =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| DatasetError::Parse {
                source,
                path: self.path.clone(),
            })?;
        Dataset::from_raw(subjects)
    }
}

/// Seeded synthetic subjects paid from the canonical schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntheticSource {
    pub seed: u64,
    pub subjects: usize,
    pub trials: usize,
    pub width: usize,
}

impl DatasetSource for SyntheticSource {
    fn describe(&self) -> String {
        format!(
            "synthetic:seed={},subjects={},trials={}",
            self.seed, self.subjects, self.trials
        )
    }

    fn load(&self) -> Result<Dataset, DatasetError> {
        let subjects = (0..self.subjects)
            .map(|i| {
                let seed = self.seed.wrapping_add(i as u64);
                Subject::synthetic_with_seed(seed, format!("synthetic_{seed}"), self.trials, self.width)
            })
            .collect();
        Ok(Dataset::new(subjects))
    }
}

/// Lazily loaded dataset shared by every comparison.
///
/// `get` loads at most once even when called concurrently; later callers
/// block until the first load finishes. `teardown` drops the cached data so
/// the next `get` loads again.
pub struct DatasetStore {
    source: Box<dyn DatasetSource>,
    cell: OnceCell<Dataset>,
}

impl DatasetStore {
    pub fn new(source: impl DatasetSource + 'static) -> Self {
        Self::from_boxed(Box::new(source))
    }

    pub fn from_boxed(source: Box<dyn DatasetSource>) -> Self {
        Self {
            source,
            cell: OnceCell::new(),
        }
    }

    pub fn get(&self) -> Result<&Dataset, DatasetError> {
        self.cell.get_or_try_init(|| {
            let dataset = self.source.load()?;
            event!(
                target: "igt_analysis::dataset",
                Level::INFO,
                source = %self.source.describe(),
                subjects = dataset.len() as u32,
                "dataset loaded"
            );
            Ok(dataset)
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn teardown(&mut self) {
        if self.cell.take().is_some() {
            event!(
                target: "igt_analysis::dataset",
                Level::INFO,
                source = %self.source.describe(),
                "dataset released"
            );
        }
    }

    pub fn source(&self) -> &dyn DatasetSource {
        self.source.as_ref()
    }
}
