//! Frontmatter parsing for agent and command sources.
//!
//! A source document is a YAML header fenced by `---` lines followed by a
//! markdown body:
//!
//! ```markdown
//! ---
//! description: Reviews pull requests
//! mode: subagent
//! tools:
//!   write: false
//!   read: true
//! ---
//! You are a careful reviewer.
//! ```
//!
//! The opening fence must be the very first line. The header ends at the first
//! `---` line after it, and everything following that line is the body,
//! byte-for-byte.

use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::{Mapping, Value};

use crate::error::ForgeError;

static FRONTMATTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\A---\n(.*?)\n---\n(.*)\z").unwrap());

/// A parsed source document: ordered header mapping plus untouched body.
#[derive(Debug, Clone)]
pub struct Document {
    pub config: Mapping,
    pub body: String,
}

impl Document {
    /// Split `raw` into header and body. `file` only labels the error.
    pub fn parse(raw: &str, file: &str) -> Result<Self, ForgeError> {
        let fail = |reason: String| ForgeError::Frontmatter {
            file: file.to_owned(),
            reason,
        };

        if !raw.starts_with("---\n") {
            return Err(fail("missing opening '---' line".to_owned()));
        }
        let caps = FRONTMATTER_RE
            .captures(raw)
            .ok_or_else(|| fail("missing closing '---' line".to_owned()))?;

        let header = &caps[1];
        let body = caps[2].to_owned();

        let value: Value = serde_yaml::from_str(header).map_err(|e| fail(e.to_string()))?;
        let config = match value {
            Value::Mapping(map) => map,
            Value::Null => return Err(fail("frontmatter is empty".to_owned())),
            other => {
                return Err(fail(format!(
                    "frontmatter must be a mapping, found {}",
                    value_kind(&other)
                )));
            }
        };

        Ok(Self { config, body })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.config.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.config.contains_key(key)
    }

    /// The `tools` entry, when it is a mapping.
    pub fn tools(&self) -> Option<&Mapping> {
        self.get("tools").and_then(Value::as_mapping)
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
