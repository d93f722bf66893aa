use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use agentforge::enforcement::allowlist::SafeCommandAllowlist;
use agentforge::enforcement::vocabulary::ToolVocabulary;
use agentforge::{BuildReport, Forge, Layout, Mode};

#[derive(Parser, Debug)]
#[command(
    name = "agentforge",
    about = "Build OpenCode and Claude Code agent/command files from one markdown source",
    version,
    long_about = None,
)]
struct Cli {
    /// Project root containing `agent/` and `command/`
    #[arg(long, short = 'r', value_name = "DIR")]
    root: Option<PathBuf>,

    /// Output directory (default: <root>/build)
    #[arg(long, short = 'o', value_name = "DIR")]
    out: Option<PathBuf>,

    /// TOML policy overriding the safe-command allowlist
    #[arg(long, short = 'p', value_name = "FILE")]
    policy: Option<PathBuf>,

    /// Render everything and report stale outputs without writing
    #[arg(long)]
    check: bool,

    /// Exit with an error when any source file fails to build
    #[arg(long)]
    strict: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir().context("cannot determine working directory")?,
    };
    let allowlist = match &cli.policy {
        Some(path) => SafeCommandAllowlist::load(path)?,
        None => SafeCommandAllowlist::default(),
    };
    info!(commands = allowlist.len(), "safe-command allowlist loaded");

    let layout = Layout::new(root, cli.out);
    let mode = if cli.check { Mode::Check } else { Mode::Write };
    let report = Forge::new(ToolVocabulary::default(), allowlist).run(&layout, mode)?;

    print_summary(&report, &layout, mode);

    let failed = cli.strict && !report.failed.is_empty();
    let stale = mode == Mode::Check && !report.stale.is_empty();
    Ok(if failed || stale {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn print_summary(report: &BuildReport, layout: &Layout, mode: Mode) {
    match mode {
        Mode::Write => {
            println!("Built {} file(s)", report.built.len());
            println!("  OpenCode files: {}", layout.out.join("opencode").display());
            println!("  Claude Code files: {}", layout.out.join("claude").display());
        }
        Mode::Check => {
            println!("Checked {} file(s)", report.built.len());
            for path in &report.stale {
                println!("  stale: {}", path.display());
            }
        }
    }
    for (path, reason) in &report.failed {
        println!("  failed: {} ({reason})", path.display());
    }
}
