//! OpenCode output: the source format, re-serialised.

use serde_yaml::Value;
use tracing::debug;

use super::{key_text, Header, Kind, Target};
use crate::enforcement::vocabulary::ToolVocabulary;
use crate::frontmatter::Document;

/// Agent keys written first, in this order.
const AGENT_FIELDS: &[&str] = &["description", "mode", "temperature"];

pub struct OpenCode {
    vocabulary: ToolVocabulary,
}

impl OpenCode {
    pub fn new(vocabulary: ToolVocabulary) -> Self {
        Self { vocabulary }
    }
}

impl Target for OpenCode {
    fn name(&self) -> &str {
        "opencode"
    }

    fn output_dir(&self, kind: Kind) -> &'static str {
        match kind {
            Kind::Agent => "opencode/agent",
            Kind::Command => "opencode/command",
        }
    }

    fn render_agent(&self, doc: &Document, file: &str) -> String {
        let mut header = Header::new();

        for field in AGENT_FIELDS {
            if let Some(value) = doc.get(field) {
                header.value(field, value);
            }
        }

        match doc.get("tools") {
            Some(Value::Mapping(tools)) => header.tools_block(&self.vocabulary, tools, file),
            Some(_) => debug!(file, "ignoring non-mapping tools entry"),
            None => {}
        }

        // Anything else the author wrote passes through untouched.
        for (key, value) in &doc.config {
            let key = key_text(key);
            if key == "tools" || AGENT_FIELDS.contains(&key.as_str()) {
                continue;
            }
            debug!(file, key = %key, "passing through agent field");
            header.value(&key, value);
        }

        header.finish(&doc.body)
    }

    fn render_command(&self, doc: &Document, file: &str) -> String {
        let mut header = Header::new();

        for (key, value) in &doc.config {
            let key = key_text(key);
            match value {
                Value::Mapping(tools) if key == "tools" => {
                    header.tools_block(&self.vocabulary, tools, file);
                }
                _ => header.value(&key, value),
            }
        }

        header.finish(&doc.body)
    }
}
