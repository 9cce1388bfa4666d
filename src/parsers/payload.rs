//! JSON payload parser: `{"injData": [...], "usdt45Data": [...], ...}`

use crate::types::{Origin, Result, SubtrackError};
use serde_json::Value;
use std::fs;
use std::path::Path;

use super::{RecordSet, RecordSource};

/// Parser for JSON documents holding the origin arrays as top-level keys
#[derive(Debug, Default)]
pub struct JsonPayloadSource;

impl JsonPayloadSource {
    pub fn new() -> Self {
        Self
    }

    /// Parse an in-memory payload; the buffer is used as simd-json scratch space
    pub fn parse_bytes(&self, bytes: &mut [u8]) -> Result<RecordSet> {
        let document: Value =
            simd_json::from_slice(bytes).map_err(|e| SubtrackError::Source(e.to_string()))?;

        let mut object = match document {
            Value::Object(object) => object,
            _ => {
                return Err(SubtrackError::Source(
                    "payload must be a JSON object".into(),
                ))
            }
        };

        let mut set = RecordSet::new();
        for origin in Origin::all() {
            if let Some(array) = object.remove(origin.key()) {
                set.insert_array(*origin, array)?;
            }
        }
        Ok(set)
    }
}

impl RecordSource for JsonPayloadSource {
    fn name(&self) -> &str {
        "json-payload"
    }

    fn file_pattern(&self) -> &str {
        "*.json"
    }

    fn parse_file(&self, path: &Path) -> Result<RecordSet> {
        let mut bytes = fs::read(path).map_err(|e| {
            SubtrackError::Source(format!("cannot read {}: {}", path.display(), e))
        })?;
        self.parse_bytes(&mut bytes).map_err(|e| match e {
            SubtrackError::Source(msg) => {
                SubtrackError::Source(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixture_path() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join("payload.json")
    }

    #[test]
    fn test_parse_payload_fixture() {
        let set = JsonPayloadSource::new().parse_file(&fixture_path()).unwrap();
        assert_eq!(set.len(), 4);
        let first = set.records().next().unwrap();
        assert_eq!(first.origin, Origin::Inj);
        assert_eq!(first.get("产品名称").and_then(Value::as_str), Some("INJ质押30天"));
    }

    #[test]
    fn test_parse_bytes_partial_origins() {
        let mut bytes = br#"{"usdt45Data": [{"phone": "1"}], "ignored": 5}"#.to_vec();
        let set = JsonPayloadSource::new().parse_bytes(&mut bytes).unwrap();
        assert!(!set.has_origin(Origin::Inj));
        assert_eq!(set.count(Origin::Usdt45), 1);
    }

    #[test]
    fn test_parse_bytes_not_object() {
        let mut bytes = b"[1, 2, 3]".to_vec();
        let err = JsonPayloadSource::new().parse_bytes(&mut bytes).unwrap_err();
        assert!(err.to_string().contains("must be a JSON object"));
    }

    #[test]
    fn test_parse_bytes_malformed() {
        let mut bytes = b"{\"injData\": [".to_vec();
        assert!(JsonPayloadSource::new().parse_bytes(&mut bytes).is_err());
    }

    #[test]
    fn test_parse_nonexistent_file() {
        let result = JsonPayloadSource::new().parse_file(Path::new("/nonexistent/file.json"));
        assert!(matches!(result, Err(SubtrackError::Source(_))));
    }

    #[test]
    fn test_accepts_by_extension() {
        let source = JsonPayloadSource::new();
        assert!(source.accepts(Path::new("data/export.json")));
        assert!(!source.accepts(Path::new("data/data.js")));
    }
}
