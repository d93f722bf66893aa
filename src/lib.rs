//! Build OpenCode and Claude Code agent and command files from a single
//! markdown source tree.

pub mod build;
pub mod enforcement;
pub mod error;
pub mod frontmatter;
pub mod scanner;
pub mod targets;

#[cfg(test)]
mod test_log;

pub use build::{BuildReport, Forge, Layout, Mode};
pub use error::ForgeError;
