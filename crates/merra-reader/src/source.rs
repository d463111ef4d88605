//! Year-keyed access to archives.

use std::collections::HashMap;
use std::sync::Arc;

use crate::dataset::{MemoryDataset, ResourceDataset};
use crate::error::{ReaderError, ReaderResult};

/// Opens the archive holding one year of hourly data.
pub trait DatasetSource {
    fn open_year(&self, year: i32) -> ReaderResult<Arc<dyn ResourceDataset>>;
}

/// Substitute `{year}` in a path template.
pub fn year_path(template: &str, year: i32) -> String {
    template.replace("{year}", &year.to_string())
}

/// Archives held in memory, one per year.
#[derive(Default, Clone)]
pub struct MemoryDatasetSource {
    years: HashMap<i32, Arc<MemoryDataset>>,
}

impl MemoryDatasetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_year(mut self, year: i32, dataset: MemoryDataset) -> Self {
        self.years.insert(year, Arc::new(dataset));
        self
    }
}

impl DatasetSource for MemoryDatasetSource {
    fn open_year(&self, year: i32) -> ReaderResult<Arc<dyn ResourceDataset>> {
        let dataset = self.years.get(&year).ok_or_else(|| {
            ReaderError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no archive for year {}", year),
            ))
        })?;
        Ok(dataset.clone() as Arc<dyn ResourceDataset>)
    }
}
