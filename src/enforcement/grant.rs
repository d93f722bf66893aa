/// Unforgeable permission grant. Proof that the enforcement layer checked a
/// base command against the safe-command allowlist and accepted it.
///
/// Construction is double-locked:
/// 1. `Seal` is a private type, so no struct literal outside this file.
/// 2. `new()` is `pub(super)`, so only `enforcement/` can mint grants.
///
/// No `Clone`, `Copy`, `Default`, or `From`.
///
/// ```compile_fail
/// use agentforge::enforcement::grant::BashGrant;
///
/// let _grant = BashGrant::new("sudo".to_owned());
/// ```
#[derive(Debug, PartialEq, Eq)]
pub struct BashGrant {
    command: String,
    _seal: Seal,
}

#[derive(Debug, PartialEq, Eq)]
struct Seal;

impl BashGrant {
    pub(super) fn new(command: String) -> Self {
        Self {
            command,
            _seal: Seal,
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// The Claude Code `allowed-tools` entry, e.g. `Bash(git:*)`.
    pub fn permission(&self) -> String {
        format!("Bash({}:*)", self.command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grant_renders_permission() {
        let grant = BashGrant::new("git".to_owned());
        assert_eq!(grant.command(), "git");
        assert_eq!(grant.permission(), "Bash(git:*)");
    }

    #[test]
    fn grant_is_consumed() {
        let grant = BashGrant::new("ls".to_owned());
        let permission = consume(grant);
        assert_eq!(permission, "Bash(ls:*)");
        // `grant` has been moved; using it again would not compile.
    }

    fn consume(grant: BashGrant) -> String {
        grant.permission()
    }
}
