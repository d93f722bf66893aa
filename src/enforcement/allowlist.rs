use std::collections::BTreeSet;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ForgeError;

const MAX_POLICY_FILE_SIZE: u64 = 64 * 1024; // 64 KiB

/// Base commands a command body may grant itself by default.
pub const DEFAULT_SAFE_COMMANDS: &[&str] = &[
    "git", "npm", "npx", "python", "python3", "make", "ls", "cat", "echo", "grep", "find", "sed",
    "awk", "curl", "wget", "node", "deno", "pnpm", "yarn", "bun", "docker", "kubectl",
    "terraform", "cd", "pwd", "mkdir", "rm", "cp", "mv", "chmod", "test",
];

/// Characters that would let an entry smuggle extra syntax into a
/// `Bash(<cmd>:*)` permission.
const FORBIDDEN_CHARS: &[char] = &['`', ':', '(', ')', '*', ','];

// --- TOML deserialization structs (private, map 1:1 to TOML schema) ---

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PolicyFile {
    #[serde(default)]
    commands: CommandsConfig,
}

#[derive(Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CommandsConfig {
    /// Replaces the built-in list when present.
    allow: Option<Vec<String>>,
    #[serde(default)]
    extend: Vec<String>,
}

/// Immutable set of shell base commands that may become `Bash(<cmd>:*)`
/// permissions. Built once at startup and shared by reference.
#[derive(Clone, PartialEq, Eq)]
pub struct SafeCommandAllowlist {
    commands: BTreeSet<String>,
}

impl std::fmt::Debug for SafeCommandAllowlist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SafeCommandAllowlist")
            .field("command_count", &self.commands.len())
            .finish()
    }
}

impl Default for SafeCommandAllowlist {
    fn default() -> Self {
        Self {
            commands: DEFAULT_SAFE_COMMANDS.iter().map(|c| (*c).to_owned()).collect(),
        }
    }
}

impl FromStr for SafeCommandAllowlist {
    type Err = ForgeError;

    /// Parse and validate an allowlist policy from a TOML string.
    fn from_str(content: &str) -> Result<Self, ForgeError> {
        let file: PolicyFile =
            toml::from_str(content).map_err(|e| ForgeError::PolicyLoad(e.to_string()))?;

        let base: Vec<String> = match file.commands.allow {
            Some(allow) => allow,
            None => DEFAULT_SAFE_COMMANDS.iter().map(|c| (*c).to_owned()).collect(),
        };

        let commands = base
            .into_iter()
            .chain(file.commands.extend)
            .map(validate_command)
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(Self { commands })
    }
}

impl SafeCommandAllowlist {
    /// Load a policy from a TOML file. Checks file size before reading.
    pub fn load(path: &Path) -> Result<Self, ForgeError> {
        let metadata = std::fs::metadata(path)
            .map_err(|e| ForgeError::PolicyLoad(format!("cannot read {}: {e}", path.display())))?;

        if metadata.len() > MAX_POLICY_FILE_SIZE {
            return Err(ForgeError::PolicyLoad(format!(
                "policy file exceeds {MAX_POLICY_FILE_SIZE} byte limit"
            )));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ForgeError::PolicyLoad(format!("cannot read {}: {e}", path.display())))?;

        content.parse()
    }

    pub fn contains(&self, command: &str) -> bool {
        self.commands.contains(command)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(String::as_str)
    }
}

fn validate_command(command: String) -> Result<String, ForgeError> {
    if command.is_empty() {
        return Err(ForgeError::PolicyValidation(
            "command entries must not be empty".to_owned(),
        ));
    }
    if command.chars().any(char::is_whitespace) {
        return Err(ForgeError::PolicyValidation(format!(
            "command '{command}' must be a single base command without whitespace"
        )));
    }
    if let Some(bad) = command.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(ForgeError::PolicyValidation(format!(
            "command '{command}' contains forbidden character '{bad}'"
        )));
    }
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_allowlist() {
        let allow = SafeCommandAllowlist::default();
        assert_eq!(allow.len(), DEFAULT_SAFE_COMMANDS.len());
        assert!(allow.contains("git"));
        assert!(allow.contains("rm"));
        assert!(!allow.contains("sudo"));
        assert!(!allow.contains("reboot"));
    }

    #[test]
    fn empty_policy_keeps_defaults() {
        let allow = SafeCommandAllowlist::from_str("").expect("empty policy should parse");
        assert_eq!(allow, SafeCommandAllowlist::default());
    }

    #[test]
    fn allow_replaces_defaults() {
        let allow = SafeCommandAllowlist::from_str(
            r#"
[commands]
allow = ["git", "cargo"]
"#,
        )
        .expect("should parse");
        assert_eq!(allow.iter().collect::<Vec<_>>(), ["cargo", "git"]);
        assert!(!allow.contains("rm"));
    }

    #[test]
    fn extend_adds_to_defaults() {
        let allow = SafeCommandAllowlist::from_str(
            r#"
[commands]
extend = ["just"]
"#,
        )
        .expect("should parse");
        assert!(allow.contains("just"));
        assert!(allow.contains("git"));
        assert_eq!(allow.len(), DEFAULT_SAFE_COMMANDS.len() + 1);
    }

    #[test]
    fn empty_allow_list_is_valid() {
        let allow = SafeCommandAllowlist::from_str("[commands]\nallow = []\n").unwrap();
        assert!(allow.is_empty());
    }

    #[test]
    fn unknown_toml_field() {
        let toml = r#"
[commands]
allow = ["git"]
deny = ["rm"]
"#;
        let err = SafeCommandAllowlist::from_str(toml).unwrap_err();
        assert!(matches!(err, ForgeError::PolicyLoad(_)));
    }

    #[test]
    fn unknown_top_level_table() {
        let err = SafeCommandAllowlist::from_str("[tools]\nbash = true\n").unwrap_err();
        assert!(matches!(err, ForgeError::PolicyLoad(_)));
    }

    #[test]
    fn whitespace_entry_rejected() {
        let err = SafeCommandAllowlist::from_str("[commands]\nallow = [\"git push\"]\n").unwrap_err();
        assert!(matches!(err, ForgeError::PolicyValidation(_)));
    }

    #[test]
    fn empty_entry_rejected() {
        let err = SafeCommandAllowlist::from_str("[commands]\nextend = [\"\"]\n").unwrap_err();
        assert!(matches!(err, ForgeError::PolicyValidation(_)));
    }

    #[test]
    fn permission_syntax_rejected() {
        let err = SafeCommandAllowlist::from_str("[commands]\nextend = [\"git:*)\"]\n").unwrap_err();
        assert!(matches!(err, ForgeError::PolicyValidation(_)));
    }

    #[test]
    fn load_rejects_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.toml");
        let padding = "#".repeat((MAX_POLICY_FILE_SIZE + 1) as usize);
        std::fs::write(&path, padding).unwrap();
        let err = SafeCommandAllowlist::load(&path).unwrap_err();
        assert!(matches!(err, ForgeError::PolicyLoad(_)));
    }

    #[test]
    fn load_missing_file() {
        let err = SafeCommandAllowlist::load(Path::new("/nonexistent/policy.toml")).unwrap_err();
        assert!(matches!(err, ForgeError::PolicyLoad(_)));
    }
}
