//! Command-body scanning.
//!
//! Command bodies embed shell invocations as `` !`git status` ``. The scanner
//! pulls those out so the enforcement layer can decide which base commands
//! become permissions, and detects argument placeholders (`$ARGUMENTS`, `$1`).

use std::sync::LazyLock;

use regex::Regex;

static SHELL_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!`([^`]+)`").unwrap());

static POSITIONAL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\d+").unwrap());

const ARGUMENTS_TOKEN: &str = "$ARGUMENTS";

/// A shell invocation found inside a `` !`...` `` marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractedCommand<'a> {
    pub raw: &'a str,
}

impl<'a> ExtractedCommand<'a> {
    /// First whitespace-delimited token, the unit of allowlist comparison.
    pub fn base_command(&self) -> Option<&'a str> {
        self.raw.split_whitespace().next()
    }
}

/// Every shell-invocation marker in `body`, in order of appearance.
pub fn extract_commands(body: &str) -> Vec<ExtractedCommand<'_>> {
    SHELL_MARKER_RE
        .captures_iter(body)
        .filter_map(|caps| caps.get(1))
        .map(|m| ExtractedCommand { raw: m.as_str() })
        .collect()
}

/// Whether the body references `$ARGUMENTS` or a positional `$N` parameter.
pub fn uses_arguments(body: &str) -> bool {
    body.contains(ARGUMENTS_TOKEN) || POSITIONAL_RE.is_match(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_markers_in_order() {
        let body = "Status: !`git status`\nDiff: !`git diff HEAD`\nFiles: !`ls -la`";
        let raw: Vec<_> = extract_commands(body).iter().map(|c| c.raw).collect();
        assert_eq!(raw, ["git status", "git diff HEAD", "ls -la"]);
    }

    #[test]
    fn base_command_is_first_token() {
        let body = "!`  npm run build -- --watch`";
        let cmds = extract_commands(body);
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].base_command(), Some("npm"));
    }

    #[test]
    fn blank_marker_has_no_base_command() {
        let cmds = extract_commands("!`   `");
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].base_command(), None);
    }

    #[test]
    fn plain_code_spans_are_ignored() {
        assert!(extract_commands("Run `git status` yourself.").is_empty());
        assert!(extract_commands("Empty marker !`` here").is_empty());
    }

    #[test]
    fn multiline_marker() {
        let cmds = extract_commands("!`echo one\ntwo`");
        assert_eq!(cmds[0].base_command(), Some("echo"));
    }

    #[test]
    fn detects_arguments_token() {
        assert!(uses_arguments("Fix issue $ARGUMENTS now"));
    }

    #[test]
    fn detects_positional_parameters() {
        assert!(uses_arguments("Compare $1 with $22"));
        assert!(!uses_arguments("Costs $ to run, see $HOME"));
        assert!(!uses_arguments("No placeholders here"));
    }
}
