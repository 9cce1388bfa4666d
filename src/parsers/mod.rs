//! Data source traits and implementations for ledger feeds

mod payload;
mod script;

pub use payload::JsonPayloadSource;
pub use script::ScriptSource;

use crate::types::{Origin, RawRecord, Result, SubtrackError};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Origin-tagged record arrays loaded from one or more documents
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    arrays: BTreeMap<Origin, Vec<RawRecord>>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach one origin's array. Elements that are not objects still count
    /// as (empty) records.
    pub fn insert_array(&mut self, origin: Origin, value: Value) -> Result<()> {
        let items = match value {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            other => {
                return Err(SubtrackError::Source(format!(
                    "{} must be an array, found {}",
                    origin.key(),
                    json_kind(&other)
                )))
            }
        };
        self.arrays
            .entry(origin)
            .or_default()
            .extend(items.into_iter().map(|v| RawRecord::from_value(origin, v)));
        Ok(())
    }

    /// Concatenate another set, per origin
    pub fn extend(&mut self, other: RecordSet) {
        for (origin, records) in other.arrays {
            self.arrays.entry(origin).or_default().extend(records);
        }
    }

    /// Whether the documents contained the origin at all (even if empty)
    pub fn has_origin(&self, origin: Origin) -> bool {
        self.arrays.contains_key(&origin)
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    pub fn count(&self, origin: Origin) -> usize {
        self.arrays.get(&origin).map_or(0, Vec::len)
    }

    pub fn len(&self) -> usize {
        self.arrays.values().map(Vec::len).sum()
    }

    /// All records, origins concatenated in fixed order
    pub fn records(&self) -> impl Iterator<Item = &RawRecord> {
        self.arrays.values().flatten()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Trait for loading ledger feeds from one kind of document
pub trait RecordSource: Send + Sync {
    /// Source name (e.g., "json-payload")
    fn name(&self) -> &str;

    /// Glob pattern for finding documents in a data directory (e.g., "*.json")
    fn file_pattern(&self) -> &str;

    /// Parse a single document into origin arrays
    fn parse_file(&self, path: &Path) -> Result<RecordSet>;

    /// Whether a single file path belongs to this source
    fn accepts(&self, path: &Path) -> bool {
        let ext = self.file_pattern().rsplit('.').next().unwrap_or_default();
        path.extension().and_then(|e| e.to_str()) == Some(ext)
    }

    /// Collect all files matching the glob pattern under `dir`
    fn collect_files(&self, dir: &Path) -> Vec<PathBuf> {
        let pattern = dir.join(self.file_pattern());
        glob::glob(&pattern.to_string_lossy())
            .map(|paths| paths.filter_map(|e| e.ok()).collect())
            .unwrap_or_default()
    }
}

/// Registry of available sources
pub struct SourceRegistry {
    sources: Vec<Box<dyn RecordSource>>,
}

impl SourceRegistry {
    /// Create a new registry with default sources
    pub fn new() -> Self {
        Self {
            sources: vec![Box::new(JsonPayloadSource::new()), Box::new(ScriptSource::new())],
        }
    }

    /// Get all registered sources
    pub fn sources(&self) -> &[Box<dyn RecordSource>] {
        &self.sources
    }

    /// Find a source by name
    pub fn get(&self, name: &str) -> Option<&dyn RecordSource> {
        self.sources
            .iter()
            .find(|s| s.name() == name)
            .map(|s| s.as_ref())
    }

    /// Load a data file, or every matching document in a data directory.
    ///
    /// Any failure is fatal: a run must never aggregate a silently empty
    /// or partial input.
    pub fn load(&self, path: &Path) -> Result<RecordSet> {
        if !path.exists() {
            return Err(SubtrackError::Source(format!(
                "data path not found: {}",
                path.display()
            )));
        }

        let mut files: Vec<(PathBuf, &dyn RecordSource)> = if path.is_dir() {
            self.sources
                .iter()
                .flat_map(|s| {
                    s.collect_files(path)
                        .into_iter()
                        .map(move |f| (f, s.as_ref()))
                })
                .collect()
        } else {
            let source = self
                .sources
                .iter()
                .find(|s| s.accepts(path))
                .ok_or_else(|| {
                    SubtrackError::Source(format!(
                        "unsupported data file (expected .json or .js): {}",
                        path.display()
                    ))
                })?;
            vec![(path.to_path_buf(), source.as_ref())]
        };

        if files.is_empty() {
            return Err(SubtrackError::Source(format!(
                "no data files found in {}",
                path.display()
            )));
        }
        files.sort_by(|a, b| a.0.cmp(&b.0));

        let mut set = RecordSet::new();
        for (file, source) in files {
            let parsed = source.parse_file(&file)?;
            if parsed.is_empty() {
                return Err(SubtrackError::Source(format!(
                    "{} contains none of {}",
                    file.display(),
                    Origin::all()
                        .iter()
                        .map(|o| o.key())
                        .collect::<Vec<_>>()
                        .join(", ")
                )));
            }
            tracing::info!(
                file = %file.display(),
                source = source.name(),
                inj = parsed.count(Origin::Inj),
                usdt45 = parsed.count(Origin::Usdt45),
                usdt_finance = parsed.count(Origin::UsdtFinance),
                "loaded data file"
            );
            set.extend(parsed);
        }

        Ok(set)
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    fn fixtures() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
    }

    // ========== RecordSet ==========

    #[test]
    fn test_record_set_concatenates_in_origin_order() {
        let mut set = RecordSet::new();
        set.insert_array(Origin::UsdtFinance, json!([{"用户": "c"}]))
            .unwrap();
        set.insert_array(Origin::Inj, json!([{"用户": "a"}, {"用户": "b"}]))
            .unwrap();

        let origins: Vec<Origin> = set.records().map(|r| r.origin).collect();
        assert_eq!(origins, vec![Origin::Inj, Origin::Inj, Origin::UsdtFinance]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_record_set_null_array_is_empty_origin() {
        let mut set = RecordSet::new();
        set.insert_array(Origin::Usdt45, Value::Null).unwrap();
        assert!(set.has_origin(Origin::Usdt45));
        assert_eq!(set.count(Origin::Usdt45), 0);
    }

    #[test]
    fn test_record_set_rejects_non_array() {
        let mut set = RecordSet::new();
        let err = set.insert_array(Origin::Inj, json!({"a": 1})).unwrap_err();
        assert!(err.to_string().contains("injData must be an array"));
    }

    #[test]
    fn test_record_set_extend() {
        let mut a = RecordSet::new();
        a.insert_array(Origin::Inj, json!([{}])).unwrap();
        let mut b = RecordSet::new();
        b.insert_array(Origin::Inj, json!([{}, {}])).unwrap();
        a.extend(b);
        assert_eq!(a.count(Origin::Inj), 3);
    }

    // ========== Registry ==========

    #[test]
    fn test_registry_default_sources() {
        let registry = SourceRegistry::new();
        assert_eq!(registry.sources().len(), 2);
        assert!(registry.get("json-payload").is_some());
        assert!(registry.get("script").is_some());
        assert!(registry.get("unknown-source").is_none());
    }

    #[test]
    fn test_load_missing_path_is_fatal() {
        let registry = SourceRegistry::new();
        let err = registry
            .load(Path::new("tests/fixtures/nonexistent.json"))
            .unwrap_err();
        assert!(matches!(err, SubtrackError::Source(_)));
    }

    #[test]
    fn test_load_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        fs::write(&path, "a,b\n").unwrap();
        let err = SourceRegistry::new().load(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported data file"));
    }

    #[test]
    fn test_load_empty_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = SourceRegistry::new().load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("no data files"));
    }

    #[test]
    fn test_load_document_without_origins_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.json");
        fs::write(&path, r#"{"refunds": []}"#).unwrap();
        let err = SourceRegistry::new().load(&path).unwrap_err();
        assert!(err.to_string().contains("contains none of"));
    }

    #[test]
    fn test_load_fixture_payload() {
        let set = SourceRegistry::new()
            .load(&fixtures().join("payload.json"))
            .unwrap();
        assert_eq!(set.count(Origin::Inj), 2);
        assert_eq!(set.count(Origin::Usdt45), 2);
        // usdtFinanceData contributes zero records
        assert!(set.has_origin(Origin::UsdtFinance));
        assert_eq!(set.count(Origin::UsdtFinance), 0);
    }

    #[test]
    fn test_load_fixture_script() {
        let set = SourceRegistry::new()
            .load(&fixtures().join("data.js"))
            .unwrap();
        assert_eq!(set.count(Origin::Inj), 3);
        assert_eq!(set.count(Origin::Usdt45), 2);
        assert_eq!(set.count(Origin::UsdtFinance), 2);
    }

    #[test]
    fn test_load_directory_concatenates_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.json"),
            r#"{"injData": [{"用户": "1"}]}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("b.js"),
            "window.injData = [{\"用户\": \"2\"}];\n",
        )
        .unwrap();

        let set = SourceRegistry::new().load(dir.path()).unwrap();
        let users: Vec<&Value> = set.records().filter_map(|r| r.get("用户")).collect();
        assert_eq!(users, vec![&json!("1"), &json!("2")]);
    }

    #[test]
    fn test_load_directory_fails_on_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("good.json"), r#"{"injData": []}"#).unwrap();
        fs::write(dir.path().join("bad.json"), "{ not json").unwrap();
        assert!(SourceRegistry::new().load(dir.path()).is_err());
    }
}
