use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use codec::Limits;
use tracing::info;
use vtrn_tools::{
    attach_file, detach_file, format_report_pretty, inspect_turn, normalize_turn, TurnReport,
};

#[derive(Parser)]
#[command(
    name = "vtrn-tools",
    version,
    about = "turn file inspection and maintenance tools"
)]
struct Cli {
    /// Reject turns with more commands than this.
    #[arg(long, global = true)]
    max_commands: Option<usize>,
    /// Reject attachments larger than this many bytes.
    #[arg(long, global = true)]
    max_attachment_bytes: Option<usize>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Summarize one turn file, or every `*.trn` file in a directory.
    Inspect {
        /// Path to a turn file or directory.
        turn_path: PathBuf,
        /// Output format.
        #[arg(long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
    },
    /// Rebuild a turn in canonical form.
    Normalize {
        turn_file: PathBuf,
        /// Output path; defaults to rewriting the input.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Keep the submission order instead of sorting.
        #[arg(long)]
        no_sort: bool,
    },
    /// Add a file to the turn's Taccom container.
    Attach {
        turn_file: PathBuf,
        attachment: PathBuf,
        /// Stored name; defaults to the attachment's file name.
        #[arg(long)]
        name: Option<String>,
    },
    /// Remove an attachment by slot.
    Detach { turn_file: PathBuf, slot: usize },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Json,
    Pretty,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();
    let mut limits = Limits::default();
    if let Some(max) = cli.max_commands {
        limits.max_commands = max;
    }
    if let Some(max) = cli.max_attachment_bytes {
        limits.max_attachment_bytes = max;
    }

    match cli.command {
        Command::Inspect { turn_path, format } => {
            if turn_path.is_dir() {
                for path in collect_turn_files(&turn_path)? {
                    println!("== {} ==", path.display());
                    print_report(&inspect_path(&path, &limits)?, format)?;
                }
            } else {
                print_report(&inspect_path(&turn_path, &limits)?, format)?;
            }
        }
        Command::Normalize {
            turn_file,
            output,
            no_sort,
        } => {
            let bytes = read_turn(&turn_file)?;
            let rebuilt = normalize_turn(&bytes, &limits, !no_sort)
                .with_context(|| format!("normalize {}", turn_file.display()))?;
            let output = output.unwrap_or(turn_file);
            write_turn(&output, &rebuilt)?;
            info!(path = %output.display(), bytes = rebuilt.len(), "wrote normalized turn");
        }
        Command::Attach {
            turn_file,
            attachment,
            name,
        } => {
            let bytes = read_turn(&turn_file)?;
            let data = fs::read(&attachment)
                .with_context(|| format!("read attachment {}", attachment.display()))?;
            let name = match name {
                Some(name) => name,
                None => attachment
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .context("attachment path has no file name")?,
            };
            let (rebuilt, slot) = attach_file(&bytes, &name, &data, &limits)
                .with_context(|| format!("attach {name}"))?;
            write_turn(&turn_file, &rebuilt)?;
            println!("attached {name} in slot {slot}");
        }
        Command::Detach { turn_file, slot } => {
            let bytes = read_turn(&turn_file)?;
            let rebuilt = detach_file(&bytes, slot, &limits)
                .with_context(|| format!("detach slot {slot}"))?;
            write_turn(&turn_file, &rebuilt)?;
        }
    }
    Ok(())
}

fn read_turn(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("read turn {}", path.display()))
}

fn write_turn(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).with_context(|| format!("write turn {}", path.display()))
}

fn inspect_path(path: &Path, limits: &Limits) -> Result<TurnReport> {
    let bytes = read_turn(path)?;
    inspect_turn(&bytes, limits).with_context(|| format!("parse turn {}", path.display()))
}

fn collect_turn_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let path = entry?.path();
        let is_turn = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("trn"));
        if path.is_file() && is_turn {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn print_report(report: &TurnReport, format: Format) -> Result<()> {
    match format {
        Format::Json => {
            let json = serde_json::to_string_pretty(report).context("serialize json")?;
            println!("{json}");
        }
        Format::Pretty => print!("{}", format_report_pretty(report)),
    }
    Ok(())
}
