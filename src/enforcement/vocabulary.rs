use serde_yaml::{Mapping, Value};
use tracing::warn;

/// Source capability name and its Claude Code display name.
const BUILTIN_TOOLS: &[(&str, &str)] = &[
    ("write", "Write"),
    ("edit", "Edit"),
    ("read", "Read"),
    ("bash", "Bash"),
    ("grep", "Grep"),
    ("glob", "Glob"),
    ("webfetch", "WebFetch"),
    ("list", "List"),
    ("task", "Task"),
];

/// The fixed set of capability names a `tools:` mapping may use.
#[derive(Debug, Clone, Copy)]
pub struct ToolVocabulary {
    entries: &'static [(&'static str, &'static str)],
}

impl Default for ToolVocabulary {
    fn default() -> Self {
        Self {
            entries: BUILTIN_TOOLS,
        }
    }
}

/// Result of sorting a `tools:` mapping against the vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolScan {
    pub known: Vec<Capability>,
    pub unknown: Vec<String>,
}

/// A recognised capability from a `tools:` mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capability {
    pub name: &'static str,
    pub display: &'static str,
    pub enabled: bool,
}

impl ToolVocabulary {
    pub fn display_name(&self, name: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, display)| *display)
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.display_name(name).is_some()
    }

    /// Split `tools` into known capabilities (mapping order) and the labels
    /// of unknown keys. Logs nothing.
    pub fn classify(&self, tools: &Mapping) -> ToolScan {
        let mut scan = ToolScan {
            known: Vec::with_capacity(tools.len()),
            unknown: Vec::new(),
        };

        for (key, value) in tools {
            let entry = key.as_str().and_then(|name| {
                self.entries
                    .iter()
                    .find(|(candidate, _)| *candidate == name)
                    .copied()
            });
            match entry {
                Some((name, display)) => scan.known.push(Capability {
                    name,
                    display,
                    enabled: is_truthy(value),
                }),
                None => scan.unknown.push(key_label(key)),
            }
        }
        scan
    }

    /// Known capabilities of `tools` in mapping order. Unknown keys are
    /// reported once per call and left out.
    pub fn capabilities(&self, tools: &Mapping, file: &str) -> Vec<Capability> {
        let scan = self.classify(tools);
        if !scan.unknown.is_empty() {
            warn!(
                file,
                unknown = %scan.unknown.join(", "),
                valid = %self.valid_names(),
                "unknown tools found"
            );
        }
        scan.known
    }

    /// Comma-joined display names of every enabled capability.
    ///
    /// `None` when `tools` is absent, empty, or enables nothing, so callers can
    /// leave the `tools:` line out entirely.
    pub fn to_display_list(&self, tools: Option<&Mapping>, file: &str) -> Option<String> {
        let tools = tools.filter(|t| !t.is_empty())?;
        let enabled: Vec<&str> = self
            .capabilities(tools, file)
            .into_iter()
            .filter(|c| c.enabled)
            .map(|c| c.display)
            .collect();

        if enabled.is_empty() {
            None
        } else {
            Some(enabled.join(", "))
        }
    }

    fn valid_names(&self) -> String {
        self.entries
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Loose truthiness for capability flags: `true`, non-zero numbers and
/// non-empty strings or collections enable a tool.
///
/// serde_yaml reads YAML 1.2, so `no`, `off` and friends arrive as strings.
/// Authors write them as booleans, so the YAML 1.1 spellings count as such.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => yaml11_bool(s).unwrap_or(!s.is_empty()),
        Value::Sequence(seq) => !seq.is_empty(),
        Value::Mapping(map) => !map.is_empty(),
        Value::Tagged(tagged) => is_truthy(&tagged.value),
    }
}

fn yaml11_bool(word: &str) -> Option<bool> {
    match word {
        "y" | "Y" | "yes" | "Yes" | "YES" | "on" | "On" | "ON" | "true" | "True" | "TRUE" => {
            Some(true)
        }
        "n" | "N" | "no" | "No" | "NO" | "off" | "Off" | "OFF" | "false" | "False" | "FALSE" => {
            Some(false)
        }
        _ => None,
    }
}

fn key_label(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_owned())
            .unwrap_or_else(|_| "<unprintable>".to_owned()),
    }
}
