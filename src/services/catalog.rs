use parking_lot::RwLock;
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::BreedTable;

/// Load the breed feature table from a CSV file
///
/// Never fails: a missing file is a warning and an unreadable one an error
/// in the logs, and both produce an empty table so every breed resolves to
/// the zero vector.
pub fn load_breed_table(path: &Path, feature_names: Vec<String>) -> BreedTable {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!(
                "Breed table {} not found, breed feature matching is limited",
                path.display()
            );
            return BreedTable::empty(feature_names);
        }
        Err(e) => {
            tracing::error!("Failed to open breed table {}: {}", path.display(), e);
            return BreedTable::empty(feature_names);
        }
    };

    match BreedTable::from_csv_reader(BufReader::new(file), feature_names.clone()) {
        Ok(table) => {
            tracing::info!("Loaded {} breeds from {}", table.len(), path.display());
            table
        }
        Err(e) => {
            tracing::error!("Failed to read breed table {}: {}", path.display(), e);
            BreedTable::empty(feature_names)
        }
    }
}

/// Holder for the current breed table
///
/// Searches take an `Arc` snapshot. A reload builds a complete new table
/// before swapping it in, so no search sees a partially loaded table.
#[derive(Debug)]
pub struct BreedCatalog {
    source: Option<PathBuf>,
    feature_names: Vec<String>,
    table: RwLock<Arc<BreedTable>>,
}

impl BreedCatalog {
    pub fn new(table: BreedTable) -> Self {
        Self {
            source: None,
            feature_names: table.feature_names().to_vec(),
            table: RwLock::new(Arc::new(table)),
        }
    }

    /// Catalog backed by a CSV file, loaded immediately
    pub fn from_source(path: impl Into<PathBuf>, feature_names: Vec<String>) -> Self {
        let path = path.into();
        let table = load_breed_table(&path, feature_names.clone());
        Self {
            source: Some(path),
            feature_names,
            table: RwLock::new(Arc::new(table)),
        }
    }

    pub fn snapshot(&self) -> Arc<BreedTable> {
        self.table.read().clone()
    }

    /// Swap in a fully built table and return it
    pub fn replace(&self, table: BreedTable) -> Arc<BreedTable> {
        let table = Arc::new(table);
        *self.table.write() = Arc::clone(&table);
        table
    }

    /// Re-read the source file and swap the result in
    ///
    /// Without a source the current table is kept.
    pub fn reload(&self) -> Arc<BreedTable> {
        let Some(path) = &self.source else {
            return self.snapshot();
        };

        self.replace(load_breed_table(path, self.feature_names.clone()))
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}
