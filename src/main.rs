//! CPU-direct USB checker - CLI entry point.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;

use cpudirect::config::{Config, example_config};
use cpudirect::model::{ClassTable, PciAddress};
use cpudirect::output::{self, OutputFormat, Palette, TextOptions, UnknownFormat};
use cpudirect::pci::{ControllerResolver, Lspci};
use cpudirect::scan::{ScanError, ScanOptions, Scanner};
use cpudirect::sysfs::Sysfs;

#[derive(Parser)]
#[command(name = "cpudirect")]
#[command(about = "Check whether USB input and audio devices are wired to a CPU-direct controller")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Output in JSON format
    #[arg(long)]
    json: bool,

    /// Output in CSV format
    #[arg(long)]
    csv: bool,

    /// Output as a table
    #[arg(long)]
    table: bool,

    /// Output format: text, json, csv or table
    #[arg(short, long)]
    format: Option<String>,

    /// Show only devices with BEST status
    #[arg(long)]
    only_best: bool,

    /// Show all device classes (not just input, audio and video)
    #[arg(long)]
    show_all: bool,

    /// Write json, csv or table output to a file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Show ports, addresses and debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    /// Show a summary of device counts
    #[arg(long)]
    summary: bool,

    /// Only show devices of this class (hid, audio, video, ...); repeatable
    #[arg(short, long = "device-class", value_name = "NAME")]
    device_class: Vec<String>,

    /// Only show devices on controllers matching this text
    #[arg(short, long, value_name = "TEXT")]
    controller: Option<String>,

    /// Treat the controller at this PCI address as CPU-direct; repeatable
    #[arg(long = "force-cpu", value_name = "PCI_ADDR")]
    force_cpu: Vec<String>,

    /// Config file path (default: auto-detect)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print an example config file
    InitConfig,
}

/// Bad command-line input, reported before scanning.
#[derive(Debug, Error)]
enum UsageError {
    #[error(transparent)]
    UnknownFormat(#[from] UnknownFormat),
    #[error("Conflicting output formats: {0} and {1}")]
    ConflictingFormats(OutputFormat, OutputFormat),
    #[error("Unknown device class '{0}'. Known classes: {1}")]
    UnknownClass(String, String),
    #[error("Invalid PCI address '{0}' (expected e.g. 0000:00:14.0)")]
    PciAddress(String),
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match &cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            generate(*shell, &mut cmd, "cpudirect", &mut std::io::stdout());
            return Ok(ExitCode::SUCCESS);
        }
        Some(Commands::InitConfig) => {
            print!("{}", example_config());
            return Ok(ExitCode::SUCCESS);
        }
        None => {}
    }

    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("cannot load config {}", path.display()))?,
        None => Config::load().context("cannot load config")?,
    };

    let format = match select_format(&cli, &config) {
        Ok(format) => format,
        Err(e) => {
            eprintln!("Error: {e}");
            return Ok(ExitCode::FAILURE);
        }
    };
    let palette = Palette::new(config.settings.color && !cli.no_color && !format.is_plain());

    let classes = config.class_table()?;
    let options = match scan_options(&cli, &config, &classes) {
        Ok(options) => options,
        Err(e) => {
            eprint!("{}", output::render_error(OutputFormat::Text, &e.to_string(), &palette));
            return Ok(ExitCode::FAILURE);
        }
    };

    let mut force_cpu = config.force_cpu()?;
    for addr in &cli.force_cpu {
        match PciAddress::parse(&addr.to_lowercase()) {
            Some(parsed) => force_cpu.push(parsed),
            None => {
                let e = UsageError::PciAddress(addr.clone());
                eprint!("{}", output::render_error(OutputFormat::Text, &e.to_string(), &palette));
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    let resolver = ControllerResolver::new(Lspci::new(config.settings.pci_tool.clone()))
        .with_force_cpu(force_cpu)
        .with_labels(config.controllers.clone());
    let mut scanner = Scanner::new(Sysfs::new(), resolver);

    let report = match scanner.scan(&options) {
        Ok(report) => report,
        Err(e @ ScanError::MissingPciTool(_)) => {
            let rendered = output::render_error(format, &e.to_string(), &palette);
            match format {
                OutputFormat::Json | OutputFormat::Csv => print!("{rendered}"),
                OutputFormat::Text | OutputFormat::Table => eprint!("{rendered}"),
            }
            return Ok(ExitCode::FAILURE);
        }
    };

    let text_options = TextOptions {
        quiet: cli.quiet,
        summary: cli.summary,
        verbose: cli.verbose,
    };
    let rendered = output::render(&report, format, &palette, &text_options);

    match output_file(cli.output.as_deref(), format) {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("cannot write {}", path.display()))?;
            if !cli.quiet {
                eprintln!("Output written to {}", path.display());
            }
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// `-v` shows debug messages from this crate, `-q` only errors.
/// `RUST_LOG` overrides both.
fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else if quiet {
        log::LevelFilter::Error
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .filter_module("cpudirect", level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

/// Pick the output format from the flags, falling back to the config.
///
/// Several format flags may be given as long as they agree.
fn select_format(cli: &Cli, config: &Config) -> Result<OutputFormat, UsageError> {
    let mut requested = Vec::new();
    if cli.json {
        requested.push(OutputFormat::Json);
    }
    if cli.csv {
        requested.push(OutputFormat::Csv);
    }
    if cli.table {
        requested.push(OutputFormat::Table);
    }
    if let Some(name) = &cli.format {
        requested.push(name.parse()?);
    }

    match requested.as_slice() {
        [] => Ok(config.settings.format.parse()?),
        [first, rest @ ..] => match rest.iter().find(|f| *f != first) {
            Some(other) => Err(UsageError::ConflictingFormats(*first, *other)),
            None => Ok(*first),
        },
    }
}

/// File to write the report to; text always goes to stdout.
fn output_file(output: Option<&Path>, format: OutputFormat) -> Option<&Path> {
    match format {
        OutputFormat::Json | OutputFormat::Csv | OutputFormat::Table => output,
        OutputFormat::Text => None,
    }
}

fn class_codes(table: &ClassTable, names: &[String]) -> Result<Vec<u8>, UsageError> {
    names
        .iter()
        .map(|name| {
            table.code(name).ok_or_else(|| {
                UsageError::UnknownClass(name.clone(), table.names().collect::<Vec<_>>().join(", "))
            })
        })
        .collect()
}

fn scan_options(
    cli: &Cli,
    config: &Config,
    classes: &ClassTable,
) -> Result<ScanOptions, UsageError> {
    Ok(ScanOptions {
        allowed_classes: class_codes(classes, &config.settings.default_classes)?,
        show_all: cli.show_all || config.settings.show_all,
        class_filter: class_codes(classes, &cli.device_class)?,
        controller_filter: cli.controller.clone(),
        only_best: cli.only_best,
    })
}
