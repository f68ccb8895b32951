//! fullstate - Dump the contents of an Alertmanager cluster full-state snapshot
//!
//! This tool decodes a persisted full-state file and prints the notification
//! log entries and silences it holds, one JSON object per line.

use anyhow::{bail, Context, Result};
use clap::Parser;
use fullstate_core::{Decoder, DecoderConfig, Report};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, Level};
use tracing_subscriber::EnvFilter;

/// Dump the contents of an Alertmanager cluster full-state snapshot
#[derive(Parser, Debug)]
#[command(name = "fullstate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path of the full-state file to decode
    #[arg(short, long)]
    file: PathBuf,

    /// File for the decoded output (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite the output file if it already exists
    #[arg(long)]
    force: bool,

    /// Log a summary of sections and records after decoding
    #[arg(long)]
    summary: bool,

    /// Key prefix of notification log parts
    #[arg(long, default_value = fullstate_core::schema::NOTIFICATION_LOG_PREFIX)]
    nflog_prefix: String,

    /// Key prefix of silence parts
    #[arg(long, default_value = fullstate_core::schema::SILENCE_PREFIX)]
    silence_prefix: String,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = log_level(cli.verbose, cli.summary);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    run(&cli)
}

/// Maximum log level for the verbosity count.
///
/// `--summary` is logged at info, so it raises the default level to INFO.
fn log_level(verbose: u8, summary: bool) -> Level {
    match verbose {
        0 if !summary => Level::WARN,
        0 | 1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn summary_line(report: &Report) -> String {
    let stats = report.stats();
    format!(
        "Summary: {} parts, {} alerts, {} silences, {} unknown",
        stats.section_count, stats.alert_count, stats.silence_count, stats.unknown_count
    )
}

fn run(cli: &Cli) -> Result<()> {
    let report = decode_snapshot(cli)?;

    if cli.summary {
        info!("{}", summary_line(&report));
    }

    match &cli.output {
        Some(path) => write_output(path, &report, cli.force)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(report.render().as_bytes())
                .context("Failed to write to stdout")?;
            stdout.flush().context("Failed to flush stdout")?;
        }
    }

    Ok(())
}

/// Read and decode the input file
fn decode_snapshot(cli: &Cli) -> Result<Report> {
    let file = &cli.file;
    if !file.is_file() {
        bail!("Input file does not exist: {}", file.display());
    }

    let data =
        fs::read(file).with_context(|| format!("Failed to read input file: {}", file.display()))?;
    debug!("Read {} bytes from {}", data.len(), file.display());

    let config = DecoderConfig::new()
        .notification_prefix(cli.nflog_prefix.as_str())
        .silence_prefix(cli.silence_prefix.as_str());

    Decoder::with_config(config)
        .decode(&data)
        .with_context(|| format!("Failed to decode full state: {}", file.display()))
}

/// Write the report to a file
fn write_output(output_path: &Path, report: &Report, force: bool) -> Result<()> {
    if output_path.exists() && !force {
        bail!(
            "File already exists: {} (use --force to overwrite)",
            output_path.display()
        );
    }

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    report.write_file(output_path)?;

    info!("Wrote {}", output_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // FullStateDesc { state { parts { key: "other" data: 0x01 } } }
    const UNKNOWN_PART_SNAPSHOT: &[u8] = &[
        0x0A, 0x0C, 0x0A, 0x0A, 0x0A, 0x05, b'o', b't', b'h', b'e', b'r', 0x12, 0x01, 0x01,
    ];

    fn cli_for(file: &Path, output: Option<PathBuf>, force: bool) -> Cli {
        let mut args = vec![
            "fullstate".to_string(),
            "--file".to_string(),
            file.display().to_string(),
        ];
        if let Some(output) = output {
            args.push("--output".to_string());
            args.push(output.display().to_string());
        }
        if force {
            args.push("--force".to_string());
        }
        Cli::parse_from(args)
    }

    #[test]
    fn test_writes_report_to_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("fullstate");
        let output = dir.path().join("out/report.txt");
        fs::write(&input, UNKNOWN_PART_SNAPSHOT).unwrap();

        run(&cli_for(&input, Some(output.clone()), false)).unwrap();

        let written = fs::read_to_string(&output).unwrap();
        assert_eq!(written, "----\nUnknown part type: other\n");
    }

    #[test]
    fn test_refuses_to_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("fullstate");
        let output = dir.path().join("report.txt");
        fs::write(&input, UNKNOWN_PART_SNAPSHOT).unwrap();
        fs::write(&output, "keep me").unwrap();

        assert!(run(&cli_for(&input, Some(output.clone()), false)).is_err());
        assert_eq!(fs::read_to_string(&output).unwrap(), "keep me");

        run(&cli_for(&input, Some(output.clone()), true)).unwrap();
        assert_ne!(fs::read_to_string(&output).unwrap(), "keep me");
    }

    #[test]
    fn test_missing_input_file() {
        let dir = TempDir::new().unwrap();
        let err = run(&cli_for(&dir.path().join("nope"), None, false)).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_corrupt_input_reports_context() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("fullstate");
        fs::write(&input, [0x0A, 0x7F]).unwrap();

        let err = run(&cli_for(&input, None, false)).unwrap_err();
        assert!(err.to_string().contains("Failed to decode full state"));
        assert!(err
            .downcast_ref::<fullstate_core::Error>()
            .is_some_and(|e| e.is_corrupt_data()));
    }

    #[test]
    fn test_summary_raises_default_level() {
        assert_eq!(log_level(0, false), Level::WARN);
        assert_eq!(log_level(0, true), Level::INFO);
        assert_eq!(log_level(1, false), Level::INFO);
        assert_eq!(log_level(2, true), Level::DEBUG);
        assert_eq!(log_level(5, false), Level::TRACE);

        // The summary record must pass the filter the CLI installs
        assert!(Level::INFO <= log_level(0, true));
    }

    #[test]
    fn test_summary_run() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("fullstate");
        let output = dir.path().join("report.txt");
        fs::write(&input, UNKNOWN_PART_SNAPSHOT).unwrap();

        let cli = Cli::parse_from([
            "fullstate",
            "--summary",
            "--file",
            input.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
        ]);
        assert!(cli.summary);
        run(&cli).unwrap();

        let report = decode_snapshot(&cli).unwrap();
        assert_eq!(
            summary_line(&report),
            "Summary: 1 parts, 0 alerts, 0 silences, 1 unknown"
        );
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
