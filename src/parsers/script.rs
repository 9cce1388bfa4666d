//! `data.js` parser
//!
//! Feeds are often exported as a browser script that assigns each origin
//! array to a global:
//!
//! ```text
//! window.injData = [ {...}, ... ];
//! var usdt45Data = [ ... ];
//! ```
//!
//! The script is never executed. Each assignment's right-hand side is read as
//! a JSON value, so literals must be JSON compatible (double-quoted keys and
//! strings, no trailing commas).

use crate::types::{Origin, Result, SubtrackError};
use regex::Regex;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use super::{RecordSet, RecordSource};

fn assignment_re() -> &'static Regex {
    static ASSIGNMENT_RE: OnceLock<Regex> = OnceLock::new();
    ASSIGNMENT_RE.get_or_init(|| {
        Regex::new(
            r"(?:\bwindow\s*\.\s*|\b(?:var|let|const)\s+)(injData|usdt45Data|usdtFinanceData)\s*=\s*",
        )
        .expect("valid assignment regex")
    })
}

/// True when `pos` follows a `//` on the same line. Text before `from` is
/// already parsed literal data and is not scanned.
fn in_line_comment(content: &str, from: usize, pos: usize) -> bool {
    let line_start = content[..pos].rfind('\n').map_or(0, |i| i + 1);
    content[line_start.max(from)..pos].contains("//")
}

/// Parser for script files assigning origin arrays
#[derive(Debug, Default)]
pub struct ScriptSource;

impl ScriptSource {
    pub fn new() -> Self {
        Self
    }

    /// Extract all origin assignments from script text.
    /// A later assignment to the same origin replaces the earlier one.
    pub fn parse_str(&self, content: &str) -> Result<RecordSet> {
        let mut assigned: Vec<(Origin, Value)> = Vec::new();
        // End of the last parsed literal; matches inside it are string data
        let mut consumed = 0;

        for caps in assignment_re().captures_iter(content) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if whole.start() < consumed || in_line_comment(content, consumed, whole.start()) {
                continue;
            }
            let Some(origin) = Origin::from_key(name.as_str()) else {
                continue;
            };

            let rest = &content[whole.end()..];
            let mut stream = serde_json::Deserializer::from_str(rest).into_iter::<Value>();
            let value = stream
                .next()
                .ok_or_else(|| {
                    SubtrackError::Source(format!("{} has no value", origin.key()))
                })?
                .map_err(|e| {
                    SubtrackError::Source(format!(
                        "{} is not a JSON-compatible literal: {}",
                        origin.key(),
                        e
                    ))
                })?;
            consumed = whole.end() + stream.byte_offset();

            assigned.retain(|(o, _)| *o != origin);
            assigned.push((origin, value));
        }

        let mut set = RecordSet::new();
        for (origin, value) in assigned {
            set.insert_array(origin, value)?;
        }
        Ok(set)
    }
}

impl RecordSource for ScriptSource {
    fn name(&self) -> &str {
        "script"
    }

    fn file_pattern(&self) -> &str {
        "*.js"
    }

    fn parse_file(&self, path: &Path) -> Result<RecordSet> {
        let content = fs::read_to_string(path).map_err(|e| {
            SubtrackError::Source(format!("cannot read {}: {}", path.display(), e))
        })?;
        self.parse_str(&content).map_err(|e| match e {
            SubtrackError::Source(msg) => {
                SubtrackError::Source(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }
}
