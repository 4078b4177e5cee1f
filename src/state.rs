use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::data::loader::load_file;
use crate::data::model::CrimeDataset;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// State shared by every request handler.
///
/// The dataset is loaded once before the server starts and only ever read
/// afterwards; clones share the same allocation.
#[derive(Debug, Clone)]
pub struct AppState {
    pub dataset: Arc<CrimeDataset>,
    /// Where the dataset came from, for logs and the health endpoint.
    pub source: PathBuf,
}

impl AppState {
    /// Load the dataset.  Fails if the file is missing or unreadable.
    pub fn load(path: &Path) -> Result<Self> {
        let dataset = load_file(path)?;
        Ok(Self {
            dataset: Arc::new(dataset),
            source: path.to_path_buf(),
        })
    }

    /// Wrap an already built dataset.
    pub fn from_dataset(dataset: CrimeDataset) -> Self {
        Self {
            dataset: Arc::new(dataset),
            source: PathBuf::new(),
        }
    }
}
