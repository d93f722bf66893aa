pub mod allowlist;
pub mod grant;
pub mod vocabulary;

use std::collections::BTreeMap;

use tracing::warn;

use allowlist::SafeCommandAllowlist;
use grant::BashGrant;
use crate::scanner::{self, ExtractedCommand};

/// Result of checking one extracted command against the allowlist.
#[derive(Debug)]
pub enum Decision {
    Allow(BashGrant),
    Reject,
}

/// Evaluate an extracted shell invocation against the allowlist.
///
/// Only the base command is compared. Blank invocations are rejected.
pub fn evaluate(command: &ExtractedCommand<'_>, allowlist: &SafeCommandAllowlist) -> Decision {
    match command.base_command() {
        Some(base) if allowlist.contains(base) => Decision::Allow(BashGrant::new(base.to_owned())),
        _ => Decision::Reject,
    }
}

/// Outcome of checking every shell invocation in a command body.
#[derive(Debug, Default)]
pub struct CommandScan {
    /// One grant per distinct allowed base command, sorted by permission text.
    pub grants: Vec<BashGrant>,
    /// Rejected base commands, in order of appearance.
    pub rejected: Vec<String>,
    /// Invocations with no command in them, e.g. `` !`  ` ``.
    pub blank: usize,
}

/// Check every shell invocation in `body` against the allowlist. Logs nothing.
pub fn scan_body(body: &str, allowlist: &SafeCommandAllowlist) -> CommandScan {
    let mut grants: BTreeMap<String, BashGrant> = BTreeMap::new();
    let mut scan = CommandScan::default();

    for command in scanner::extract_commands(body) {
        match evaluate(&command, allowlist) {
            Decision::Allow(grant) => {
                grants.entry(grant.permission()).or_insert(grant);
            }
            Decision::Reject => match command.base_command() {
                Some(base) => scan.rejected.push(base.to_owned()),
                None => scan.blank += 1,
            },
        }
    }

    scan.grants = grants.into_values().collect();
    scan
}

/// Grants for a command body. Every rejected base command is logged with
/// the file name and dropped.
pub fn grants_for(body: &str, allowlist: &SafeCommandAllowlist, file: &str) -> Vec<BashGrant> {
    let scan = scan_body(body, allowlist);
    for command in &scan.rejected {
        warn!(file, command = %command, "skipping potentially unsafe command");
    }
    if scan.blank > 0 {
        warn!(file, count = scan.blank, "skipping empty shell invocation");
    }
    scan.grants
}
