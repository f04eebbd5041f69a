use parking_lot::RwLock;
use serde_json::Value;
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::AnimalRecord;

/// Errors that can occur when reading or persisting records
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Record file must hold a JSON array")]
    NotAnArray,
}

/// In-memory list of registered animals, optionally mirrored to a JSON file
///
/// Registration takes the write lock for the whole append-and-persist step,
/// so a ranking pass working on [`RecordStore::snapshot`] never sees a
/// half-applied registration.
#[derive(Debug, Default)]
pub struct RecordStore {
    path: Option<PathBuf>,
    records: RwLock<Vec<AnimalRecord>>,
}

impl RecordStore {
    /// Store that keeps records in memory only
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a store backed by `path`
    ///
    /// A missing file gives an empty store. An unreadable or malformed file
    /// is logged and also gives an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let records = if path.exists() {
            match read_records(&path) {
                Ok(records) => {
                    tracing::info!("Loaded {} records from {}", records.len(), path.display());
                    records
                }
                Err(e) => {
                    tracing::error!("Failed to load records from {}: {}", path.display(), e);
                    Vec::new()
                }
            }
        } else {
            tracing::info!("No record file at {}, starting empty", path.display());
            Vec::new()
        };

        Self {
            path: Some(path),
            records: RwLock::new(records),
        }
    }

    /// Append a record and persist the full list
    ///
    /// When persisting fails the record is not kept in memory either.
    pub fn register(&self, record: AnimalRecord) -> Result<AnimalRecord, StoreError> {
        let mut records = self.records.write();
        records.push(record.clone());

        if let Some(path) = &self.path {
            if let Err(e) = write_records(path, &records) {
                records.pop();
                tracing::error!("Failed to persist records to {}: {}", path.display(), e);
                return Err(e);
            }
        }

        tracing::debug!("Registered {} ({:?}), {} records total", record.name, record.breed, records.len());
        Ok(record)
    }

    /// Copy of every record in registration order
    pub fn snapshot(&self) -> Vec<AnimalRecord> {
        self.records.read().clone()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Read a JSON array of records.
///
/// Entries that are not valid records are logged and skipped.
pub fn read_records(path: &Path) -> Result<Vec<AnimalRecord>, StoreError> {
    let file = fs::File::open(path)?;
    let value: Value = serde_json::from_reader(BufReader::new(file))?;
    let Value::Array(entries) = value else {
        return Err(StoreError::NotAnArray);
    };

    let records = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value::<AnimalRecord>(entry) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping record #{} in {}: {}", index, path.display(), e);
                None
            }
        })
        .collect();

    Ok(records)
}

/// Write records as pretty JSON via a temporary file and rename
pub fn write_records(path: &Path, records: &[AnimalRecord]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("json.tmp");
    {
        let mut writer = BufWriter::new(fs::File::create(&tmp_path)?);
        serde_json::to_writer_pretty(&mut writer, records)?;
        writer.flush()?;
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, Size};

    #[test]
    fn test_register_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db").join("animals.json");

        let store = RecordStore::open(&path);
        assert!(store.is_empty());

        let record = AnimalRecord::new("Bella", "Beagle", 3.0, Gender::Female, Size::Small);
        store.register(record.clone()).unwrap();

        let reopened = RecordStore::open(&path);
        assert_eq!(reopened.snapshot(), vec![record]);
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("animals.json");
        fs::write(&path, r#"[{"name": "Max", "breed": "Pug", "age": "4"}, 12, {"name": "Coco"}]"#).unwrap();

        let store = RecordStore::open(&path);
        let names: Vec<String> = store.snapshot().into_iter().map(|r| r.name).collect();

        assert_eq!(names, vec!["Max", "Coco"]);
    }

    #[test]
    fn test_bad_metadata_does_not_drop_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("animals.json");
        fs::write(
            &path,
            r#"[{"id": "abc", "name": "Max", "breed": "Pug", "age": 4, "image": false},
                {"name": "Coco", "registeredAt": 17}]"#,
        )
        .unwrap();

        let records = RecordStore::open(&path).snapshot();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Max");
        assert_eq!(records[0].image, None);
        assert!(records[0].resolve().is_ok());
        assert_eq!(records[1].registered_at, None);
    }

    #[test]
    fn test_corrupt_file_gives_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("animals.json");
        fs::write(&path, "{ not json").unwrap();

        let store = RecordStore::open(&path);
        assert!(store.is_empty());
        assert!(matches!(read_records(&path), Err(StoreError::Serialization(_))));
    }

    #[test]
    fn test_failed_persist_keeps_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes the rename fail
        let path = dir.path().join("animals.json");
        fs::create_dir(&path).unwrap();

        let store = RecordStore::open(&path);
        let result = store.register(AnimalRecord::new("Rex", "Pug", 2.0, Gender::Male, Size::Small));

        assert!(result.is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_in_memory_store() {
        let store = RecordStore::in_memory();
        store
            .register(AnimalRecord::new("Luna", "Husky", 6.0, Gender::Female, Size::Large))
            .unwrap();

        assert_eq!(store.len(), 1);
        assert!(store.path().is_none());
    }
}
