use std::collections::HashMap;
use std::io::Read;
use thiserror::Error;

/// Column holding the breed name in a feature table
pub const BREED_COLUMN: &str = "Breed";

/// Feature columns used when none are configured
pub const DEFAULT_FEATURE_COLUMNS: [&str; 5] = [
    "Skull_Index",
    "Body_Ratio",
    "Intelligence_Rank",
    "Aggression_Score",
    "Maintenance_Score",
];

/// Errors that can occur while reading a breed feature table
#[derive(Debug, Error)]
pub enum BreedTableError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("missing breed column '{0}'")]
    MissingBreedColumn(String),
}

/// Canonical lookup key for a breed name.
///
/// Case, surrounding whitespace, inner spaces, underscores and hyphens are
/// ignored, so "Golden Retriever", "golden_retriever" and " GOLDEN-retriever"
/// share one key.
pub fn canonical_breed_key(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

pub fn default_feature_names() -> Vec<String> {
    DEFAULT_FEATURE_COLUMNS.iter().map(|name| name.to_string()).collect()
}

/// One row of a tabular breed source before normalization
#[derive(Debug, Clone, PartialEq)]
pub struct BreedRow {
    pub breed: String,
    /// Raw values in feature order; `None` for absent or unparseable cells
    pub features: Vec<Option<f64>>,
}

/// Maps canonical breed keys to fixed-size feature vectors.
///
/// Read-only once built. Unknown breeds resolve to the all-zero vector.
#[derive(Debug, Clone, Default)]
pub struct BreedTable {
    feature_names: Vec<String>,
    vectors: HashMap<String, Vec<f64>>,
    display_names: Vec<String>,
    zero: Vec<f64>,
}

impl BreedTable {
    pub fn empty(feature_names: Vec<String>) -> Self {
        let zero = vec![0.0; feature_names.len()];
        Self {
            feature_names,
            vectors: HashMap::new(),
            display_names: Vec::new(),
            zero,
        }
    }

    /// Build a table from ready-to-use vectors.
    ///
    /// The first entry wins when several names share a canonical key.
    /// Vectors are padded with zeros or cut to the feature count.
    pub fn from_vectors<I, S>(feature_names: Vec<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: AsRef<str>,
    {
        let mut table = Self::empty(feature_names);
        let width = table.feature_names.len();

        for (name, mut vector) in entries {
            let display = name.as_ref().trim();
            let key = canonical_breed_key(display);
            if key.is_empty() || table.vectors.contains_key(&key) {
                continue;
            }
            vector.resize(width, 0.0);
            for value in vector.iter_mut().filter(|value| !value.is_finite()) {
                *value = 0.0;
            }
            table.vectors.insert(key, vector);
            table.display_names.push(display.to_string());
        }

        table.display_names.sort();
        table
    }

    /// Build a table from raw rows, min-max normalizing every feature column.
    ///
    /// Each column is rescaled to `[0, 1]` over all rows. A column with no
    /// spread, or no values at all, becomes 0. Absent cells become 0.
    pub fn from_rows(feature_names: Vec<String>, rows: Vec<BreedRow>) -> Self {
        let width = feature_names.len();
        let bounds: Vec<Option<(f64, f64)>> = (0..width)
            .map(|column| {
                rows.iter()
                    .filter_map(|row| row.features.get(column).copied().flatten())
                    .fold(None, |acc: Option<(f64, f64)>, value| match acc {
                        None => Some((value, value)),
                        Some((min, max)) => Some((min.min(value), max.max(value))),
                    })
            })
            .collect();

        let entries = rows.into_iter().map(|row| {
            let vector = (0..width)
                .map(|column| {
                    match (row.features.get(column).copied().flatten(), bounds[column]) {
                        (Some(value), Some((min, max))) if max > min => (value - min) / (max - min),
                        _ => 0.0,
                    }
                })
                .collect();
            (row.breed, vector)
        });

        Self::from_vectors(feature_names, entries)
    }

    /// Read a CSV feature table with a `Breed` column and named feature columns.
    ///
    /// Feature columns absent from the header are treated as all-zero.
    /// Rows without a breed name are ignored.
    pub fn from_csv_reader<R: Read>(reader: R, feature_names: Vec<String>) -> Result<Self, BreedTableError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let position = |column: &str| {
            headers
                .iter()
                .position(|header| header.eq_ignore_ascii_case(column))
        };

        let breed_index = position(BREED_COLUMN)
            .ok_or_else(|| BreedTableError::MissingBreedColumn(BREED_COLUMN.to_string()))?;
        let feature_indices: Vec<Option<usize>> = feature_names
            .iter()
            .map(|name| position(name))
            .collect();

        for (name, index) in feature_names.iter().zip(&feature_indices) {
            if index.is_none() {
                tracing::warn!("Breed table has no '{}' column, using 0 for every breed", name);
            }
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let breed = match record.get(breed_index) {
                Some(breed) if !breed.is_empty() => breed.to_string(),
                _ => continue,
            };
            let features = feature_indices
                .iter()
                .map(|index| {
                    index
                        .and_then(|i| record.get(i))
                        .and_then(|cell| cell.parse::<f64>().ok())
                        .filter(|value| value.is_finite())
                })
                .collect();
            rows.push(BreedRow { breed, features });
        }

        Ok(Self::from_rows(feature_names, rows))
    }

    /// Feature vector for a breed name, or the zero vector when unknown
    pub fn lookup(&self, breed_name: &str) -> &[f64] {
        self.lookup_key(&canonical_breed_key(breed_name))
    }

    /// Feature vector for an already canonical key
    pub fn lookup_key(&self, key: &str) -> &[f64] {
        self.vectors.get(key).map_or(&self.zero, Vec::as_slice)
    }

    pub fn contains(&self, breed_name: &str) -> bool {
        self.vectors.contains_key(&canonical_breed_key(breed_name))
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Sorted display names, one per canonical breed
    pub fn breed_names(&self) -> &[String] {
        &self.display_names
    }

    /// Breed names containing `query`, ignoring case
    pub fn search(&self, query: &str) -> Vec<String> {
        let needle = query.trim().to_lowercase();
        self.display_names
            .iter()
            .filter(|name| needle.is_empty() || name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Breed,Skull_Index,Body_Ratio,Intelligence_Rank,Aggression_Score,Maintenance_Score
Beagle,50,1.0,10,2,4
Golden Retriever,60,1.5,30,1,
Poodle,40,0.5,20,3,8
beagle,99,9,9,9,9
";

    #[test]
    fn test_canonical_key() {
        assert_eq!(canonical_breed_key("  Golden Retriever "), "goldenretriever");
        assert_eq!(canonical_breed_key("golden_retriever"), "goldenretriever");
        assert_eq!(canonical_breed_key("GOLDEN-retriever"), "goldenretriever");
    }

    #[test]
    fn test_csv_is_min_max_normalized() {
        let table = BreedTable::from_csv_reader(SAMPLE.as_bytes(), default_feature_names()).unwrap();

        assert_eq!(table.len(), 3);
        let beagle = table.lookup("BEAGLE");
        // Skull index spans 40..99 across all rows
        assert!((beagle[0] - 10.0 / 59.0).abs() < 1e-9);
        // Empty maintenance cell for the retriever becomes 0
        assert_eq!(table.lookup("golden_retriever")[4], 0.0);
    }

    #[test]
    fn test_first_row_wins_per_breed() {
        let table = BreedTable::from_vectors(
            vec!["x".to_string()],
            vec![("Beagle", vec![0.2]), ("beagle", vec![0.9])],
        );

        assert_eq!(table.lookup("beagle"), &[0.2]);
        assert_eq!(table.breed_names(), &["Beagle".to_string()]);
    }

    #[test]
    fn test_unknown_breed_is_zero_vector() {
        let table = BreedTable::from_csv_reader(SAMPLE.as_bytes(), default_feature_names()).unwrap();

        assert_eq!(table.lookup("dingo"), &[0.0; 5]);
        assert!(!table.contains("dingo"));
    }

    #[test]
    fn test_missing_feature_column_defaults_to_zero() {
        let csv = "Breed,Skull_Index\nBeagle,1\nPoodle,3\n";
        let table = BreedTable::from_csv_reader(csv.as_bytes(), default_feature_names()).unwrap();

        assert_eq!(table.lookup("poodle"), &[1.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_missing_breed_column_is_an_error() {
        let csv = "Name,Skull_Index\nBeagle,1\n";
        let result = BreedTable::from_csv_reader(csv.as_bytes(), default_feature_names());

        assert!(matches!(result, Err(BreedTableError::MissingBreedColumn(_))));
    }

    #[test]
    fn test_search_breeds() {
        let table = BreedTable::from_csv_reader(SAMPLE.as_bytes(), default_feature_names()).unwrap();

        assert_eq!(table.search("RETR"), vec!["Golden Retriever".to_string()]);
        assert_eq!(table.search("").len(), 3);
        assert_eq!(table.breed_names(), &["Beagle", "Golden Retriever", "Poodle"]);
    }
}
