//! Batch build over the `agent/` and `command/` source directories.
//!
//! Every source file is parsed once and rendered by each target. A bad file
//! is logged and counted and the batch moves on; only a failure to create an
//! output directory stops the run.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::enforcement::allowlist::SafeCommandAllowlist;
use crate::enforcement::vocabulary::ToolVocabulary;
use crate::error::ForgeError;
use crate::frontmatter::Document;
use crate::targets::claude::ClaudeCode;
use crate::targets::opencode::OpenCode;
use crate::targets::{Kind, Target};

const SKIPPED_COMMAND_FILES: &[&str] = &["README.md"];

const FRONTMATTER_HINT: &str =
    "check that frontmatter starts and ends with a '---' line and that the YAML is valid";

/// Where sources are read from and outputs written to.
#[derive(Debug, Clone)]
pub struct Layout {
    pub root: PathBuf,
    pub out: PathBuf,
}

impl Layout {
    /// `out` defaults to `<root>/build`.
    pub fn new(root: impl Into<PathBuf>, out: Option<PathBuf>) -> Self {
        let root = root.into();
        let out = out.unwrap_or_else(|| root.join("build"));
        Self { root, out }
    }

    pub fn source_dir(&self, kind: Kind) -> PathBuf {
        self.root.join(kind.source_dir())
    }

    pub fn output_dir(&self, target: &dyn Target, kind: Kind) -> PathBuf {
        self.out.join(target.output_dir(kind))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Render and write every output file.
    #[default]
    Write,
    /// Render and compare against what is on disk; write nothing.
    Check,
}

/// Outcome of one batch run.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Source files rendered for every target.
    pub built: Vec<PathBuf>,
    /// Source files skipped because of a recoverable error.
    pub failed: Vec<(PathBuf, String)>,
    /// Output files that are missing or differ from the rendered content.
    /// Only filled in `Mode::Check`.
    pub stale: Vec<PathBuf>,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.stale.is_empty()
    }
}

/// The set of targets every document is rendered for.
pub struct Forge {
    targets: Vec<Box<dyn Target>>,
}

impl std::fmt::Debug for Forge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Forge")
            .field(
                "targets",
                &self.targets.iter().map(|t| t.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Forge {
    pub fn new(vocabulary: ToolVocabulary, allowlist: SafeCommandAllowlist) -> Self {
        Self {
            targets: vec![
                Box::new(OpenCode::new(vocabulary)) as Box<dyn Target>,
                Box::new(ClaudeCode::new(vocabulary, allowlist)),
            ],
        }
    }

    pub fn targets(&self) -> impl Iterator<Item = &dyn Target> {
        self.targets.iter().map(|t| t.as_ref())
    }

    /// Build (or check) every agent and command under `layout.root`.
    pub fn run(&self, layout: &Layout, mode: Mode) -> Result<BuildReport, ForgeError> {
        if mode == Mode::Write {
            self.create_output_dirs(layout)?;
        }

        let mut report = BuildReport::default();
        for kind in Kind::ALL {
            info!(kind = kind.source_dir(), "building");
            for source in list_sources(&layout.source_dir(kind), kind, &mut report) {
                match self.build_file(layout, kind, &source, mode, &mut report) {
                    Ok(()) => report.built.push(source),
                    Err(e) if e.is_recoverable() => {
                        if matches!(e, ForgeError::Frontmatter { .. }) {
                            error!(error = %e, hint = FRONTMATTER_HINT, "skipping file");
                        } else {
                            error!(error = %e, "skipping file");
                        }
                        report.failed.push((source, e.to_string()));
                    }
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(report)
    }

    fn create_output_dirs(&self, layout: &Layout) -> Result<(), ForgeError> {
        for target in self.targets() {
            for kind in Kind::ALL {
                let path = layout.output_dir(target, kind);
                fs::create_dir_all(&path).map_err(|source| ForgeError::OutputDir { path, source })?;
            }
        }
        Ok(())
    }

    fn build_file(
        &self,
        layout: &Layout,
        kind: Kind,
        source: &Path,
        mode: Mode,
        report: &mut BuildReport,
    ) -> Result<(), ForgeError> {
        let file = file_name(source);
        let raw = fs::read_to_string(source).map_err(|e| ForgeError::Read {
            path: source.to_path_buf(),
            source: e,
        })?;
        let doc = Document::parse(&raw, &file)?;

        // Render for every target before touching disk: a parse or render
        // problem writes nothing. A failed write can still leave earlier
        // targets updated and later ones stale.
        let rendered: Vec<(PathBuf, String)> = self
            .targets()
            .map(|target| {
                (
                    layout.output_dir(target, kind).join(&file),
                    target.render(kind, &doc, &file),
                )
            })
            .collect();

        for (path, content) in rendered {
            match mode {
                Mode::Write => fs::write(&path, content).map_err(|source| ForgeError::Write {
                    path: path.clone(),
                    source,
                })?,
                Mode::Check => {
                    if fs::read_to_string(&path).ok().as_deref() != Some(content.as_str()) {
                        warn!(path = %path.display(), "output is out of date");
                        report.stale.push(path);
                    }
                }
            }
        }

        info!(file = %file, "built");
        Ok(())
    }
}

/// Markdown files directly inside `dir`, sorted by path.
fn list_sources(dir: &Path, kind: Kind, report: &mut BuildReport) -> Vec<PathBuf> {
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "source directory not found, nothing to build");
        return Vec::new();
    }

    let pattern = format!("{}/*.md", glob::Pattern::escape(&dir.to_string_lossy()));

    let paths = match glob::glob(&pattern) {
        Ok(paths) => paths,
        Err(e) => {
            error!(dir = %dir.display(), error = %e, "invalid source pattern");
            return Vec::new();
        }
    };

    let mut sources = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) if !path.is_file() => {}
            Ok(path) => {
                if kind == Kind::Command && SKIPPED_COMMAND_FILES.contains(&file_name(&path).as_str()) {
                    continue;
                }
                sources.push(path);
            }
            Err(e) => {
                let path = e.path().to_path_buf();
                error!(path = %path.display(), error = %e, "could not read source entry");
                report.failed.push((path, e.to_string()));
            }
        }
    }
    sources.sort();
    sources
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forge() -> Forge {
        Forge::new(ToolVocabulary::default(), SafeCommandAllowlist::default())
    }

    #[test]
    fn default_out_dir() {
        let layout = Layout::new("/project", None);
        assert_eq!(layout.out, PathBuf::from("/project/build"));
        assert_eq!(layout.source_dir(Kind::Agent), PathBuf::from("/project/agent"));
    }

    #[test]
    fn output_dirs_per_target() {
        let layout = Layout::new("/p", Some(PathBuf::from("/out")));
        let dirs: Vec<_> = forge()
            .targets()
            .flat_map(|t| Kind::ALL.map(|k| layout.output_dir(t, k)))
            .collect();
        assert_eq!(
            dirs,
            [
                PathBuf::from("/out/opencode/agent"),
                PathBuf::from("/out/opencode/command"),
                PathBuf::from("/out/claude/agents"),
                PathBuf::from("/out/claude/commands"),
            ]
        );
    }

    #[test]
    fn missing_source_dirs_build_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let report = forge().run(&Layout::new(dir.path(), None), Mode::Write).unwrap();
        assert!(report.built.is_empty());
        assert!(report.is_clean());
        assert!(dir.path().join("build/claude/commands").is_dir());
    }

    #[test]
    fn list_sources_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.md", "a.md", "README.md", "notes.txt"] {
            fs::write(dir.path().join(name), "x").unwrap();
        }
        fs::create_dir(dir.path().join("nested.md")).unwrap();

        let mut report = BuildReport::default();
        let names: Vec<_> = list_sources(dir.path(), Kind::Command, &mut report)
            .iter()
            .map(|p| file_name(p))
            .collect();
        assert_eq!(names, ["a.md", "b.md"]);

        let names: Vec<_> = list_sources(dir.path(), Kind::Agent, &mut report)
            .iter()
            .map(|p| file_name(p))
            .collect();
        assert_eq!(names, ["README.md", "a.md", "b.md"]);
    }

    #[test]
    fn write_failure_skips_file_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("agent")).unwrap();
        fs::write(root.join("agent/a.md"), "---\ndescription: A\n---\nbody\n").unwrap();
        fs::write(root.join("agent/b.md"), "---\ndescription: B\n---\nbody\n").unwrap();
        // A directory where the claude output file should go.
        fs::create_dir_all(root.join("build/claude/agents/a.md")).unwrap();

        let report = forge().run(&Layout::new(root, None), Mode::Write).unwrap();

        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].0.ends_with("agent/a.md"));
        assert!(report.failed[0].1.contains("could not write"));
        assert_eq!(report.built.len(), 1);
        assert!(root.join("build/claude/agents/b.md").is_file());
        // Targets written before the failing one keep their new output.
        assert!(root.join("build/opencode/agent/a.md").is_file());
    }

    #[test]
    fn output_dir_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("build");
        fs::write(&blocker, "not a directory").unwrap();
        let err = forge()
            .run(&Layout::new(dir.path(), None), Mode::Write)
            .unwrap_err();
        assert!(matches!(err, ForgeError::OutputDir { .. }));
        assert!(!err.is_recoverable());
    }
}
