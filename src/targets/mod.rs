pub mod claude;
pub mod opencode;

use std::fmt::Display;

use serde_yaml::{Mapping, Value};
use tracing::warn;

use crate::enforcement::vocabulary::ToolVocabulary;
use crate::frontmatter::Document;

/// Kind of source document. Each kind has its own input directory and its
/// own output directory per target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Agent,
    Command,
}

impl Kind {
    pub const ALL: [Kind; 2] = [Kind::Agent, Kind::Command];

    /// Input directory name under the project root.
    pub fn source_dir(self) -> &'static str {
        match self {
            Kind::Agent => "agent",
            Kind::Command => "command",
        }
    }
}

/// Extension point for output platforms. The only `dyn Trait` boundary in
/// the crate.
pub trait Target: Send + Sync {
    fn name(&self) -> &str;

    /// Output directory for `kind`, relative to the build directory.
    fn output_dir(&self, kind: Kind) -> &'static str;

    fn render_agent(&self, doc: &Document, file: &str) -> String;

    fn render_command(&self, doc: &Document, file: &str) -> String;

    fn render(&self, kind: Kind, doc: &Document, file: &str) -> String {
        match kind {
            Kind::Agent => self.render_agent(doc, file),
            Kind::Command => self.render_command(doc, file),
        }
    }
}

/// Line-oriented frontmatter writer shared by the targets.
///
/// Output is always `---\n<lines>\n---\n<body>`, with exactly one newline
/// after the closing fence.
#[derive(Debug, Default)]
pub(crate) struct Header {
    lines: Vec<String>,
}

impl Header {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn line(&mut self, key: &str, value: impl Display) {
        self.lines.push(format!("{key}: {value}"));
    }

    /// Write `key` with any YAML value: scalars inline, collections as an
    /// indented block.
    pub(crate) fn value(&mut self, key: &str, value: &Value) {
        match value {
            Value::Sequence(seq) if seq.is_empty() => self.line(key, "[]"),
            Value::Mapping(map) if map.is_empty() => self.line(key, "{}"),
            Value::Sequence(_) | Value::Mapping(_) => {
                match serde_yaml::to_string(value) {
                    Ok(block) => {
                        self.lines.push(format!("{key}:"));
                        self.lines
                            .extend(block.lines().map(|line| format!("  {line}")));
                    }
                    Err(e) => warn!(key, error = %e, "cannot serialise field, dropped"),
                }
            }
            scalar => self.line(key, render_scalar(scalar)),
        }
    }

    /// Nested `tools:` block listing each known capability as a lowercase
    /// boolean. Omitted when no known capability remains.
    pub(crate) fn tools_block(
        &mut self,
        vocabulary: &ToolVocabulary,
        tools: &Mapping,
        file: &str,
    ) {
        let capabilities = vocabulary.capabilities(tools, file);
        if capabilities.is_empty() {
            return;
        }
        self.lines.push("tools:".to_owned());
        for cap in capabilities {
            self.lines.push(format!("  {}: {}", cap.name, cap.enabled));
        }
    }

    pub(crate) fn finish(self, body: &str) -> String {
        let mut out = String::from("---\n");
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str("---\n");
        out.push_str(body);
        out
    }
}

/// Render a scalar the way an author would write it by hand.
///
/// Strings go out verbatim unless they are empty or span lines, in which case
/// they are written as double-quoted scalars.
pub(crate) fn render_scalar(value: &Value) -> String {
    match value {
        Value::Null => "null".to_owned(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) if s.is_empty() || s.contains(['\n', '\r']) => {
            serde_json::Value::from(s.as_str()).to_string()
        }
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_owned())
            .unwrap_or_default(),
    }
}

/// Header key as text. Non-string keys are rendered like scalars.
pub(crate) fn key_text(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => render_scalar(other),
    }
}
