//! Claude Code output.
//!
//! Agents get a `name` derived from the file name, a comma-separated `tools`
//! list and `model: inherit`. Commands get an `allowed-tools` list derived
//! from the shell invocations in their body, restricted to the safe-command
//! allowlist, plus an `argument-hint` when the body takes arguments.

use std::path::Path;

use tracing::debug;

use super::{key_text, render_scalar, Header, Kind, Target};
use crate::enforcement::{self, allowlist::SafeCommandAllowlist, vocabulary::ToolVocabulary};
use crate::frontmatter::Document;
use crate::scanner;

const AGENT_FIELDS: &[&str] = &["description", "tools"];
const DEFAULT_ARGUMENT_HINT: &str = "[args]";

pub struct ClaudeCode {
    vocabulary: ToolVocabulary,
    allowlist: SafeCommandAllowlist,
}

impl ClaudeCode {
    pub fn new(vocabulary: ToolVocabulary, allowlist: SafeCommandAllowlist) -> Self {
        Self {
            vocabulary,
            allowlist,
        }
    }
}

impl Target for ClaudeCode {
    fn name(&self) -> &str {
        "claude"
    }

    fn output_dir(&self, kind: Kind) -> &'static str {
        match kind {
            Kind::Agent => "claude/agents",
            Kind::Command => "claude/commands",
        }
    }

    fn render_agent(&self, doc: &Document, file: &str) -> String {
        let mut header = Header::new();
        header.line("name", file_stem(file));

        if let Some(description) = doc.get("description") {
            header.line("description", render_scalar(description));
        }
        if let Some(tools) = self.vocabulary.to_display_list(doc.tools(), file) {
            header.line("tools", tools);
        }
        header.line("model", "inherit");

        for key in doc.config.keys().map(key_text) {
            if !AGENT_FIELDS.contains(&key.as_str()) {
                debug!(file, key = %key, "field not supported by claude agents, dropped");
            }
        }

        header.finish(&doc.body)
    }

    fn render_command(&self, doc: &Document, file: &str) -> String {
        let mut header = Header::new();

        if let Some(description) = doc.get("description") {
            header.line("description", render_scalar(description));
        }

        let permissions: Vec<String> = enforcement::grants_for(&doc.body, &self.allowlist, file)
            .iter()
            .map(|grant| grant.permission())
            .collect();
        if !permissions.is_empty() {
            header.line("allowed-tools", permissions.join(", "));
        }

        if scanner::uses_arguments(&doc.body) && !doc.contains_key("argument-hint") {
            header.line("argument-hint", DEFAULT_ARGUMENT_HINT);
        }

        header.finish(&doc.body)
    }
}

fn file_stem(file: &str) -> &str {
    Path::new(file)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file)
}
