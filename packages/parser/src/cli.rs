//! Command-line interface for the parser.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser as ClapParser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::config::ParserConfig;
use crate::error::{ParserError, Result};
use crate::markers::describe_heuristics;
use crate::output::{output_path, render, summarize_devices, write_result, OutputFormat};
use crate::parser::Parser;
use crate::types::{DiagnosticCode, ParseResult, RawAct, Severity};

/// Atlas Parser - Turn raw Brazilian legal-act text into a device tree.
#[derive(ClapParser)]
#[command(name = "atlas-parser")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse one act record and print or save the device tree.
    Parse {
        /// JSON act record (or a plain text file with --text)
        input: PathBuf,

        /// Treat INPUT as raw act text instead of a JSON record
        #[arg(long, requires = "urn")]
        text: bool,

        /// Act identifier for --text input (e.g., br;go;goiania;lei;2023-03-10;1)
        #[arg(long)]
        urn: Option<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Print a device summary instead of the document
        #[arg(long)]
        summary: bool,

        /// Maximum siblings per level in the summary
        #[arg(long, requires = "summary")]
        limit: Option<usize>,

        /// YAML file with parser tunables
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Parse every JSON act record in a directory.
    Batch {
        /// Directory with JSON act records
        dir: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// YAML file with parser tunables
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the marker patterns and splitting rules.
    Heuristics,
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            input,
            text,
            urn,
            output,
            format,
            summary,
            limit,
            config,
        } => {
            let act = read_act(&input, text.then_some(urn).flatten())?;
            let options = ParseOptions {
                output,
                format,
                summary,
                limit,
            };
            parse_command(&act, load_config(config.as_deref())?, &options)
        }
        Commands::Batch {
            dir,
            output,
            format,
            config,
        } => batch_command(&dir, &output, format, load_config(config.as_deref())?),
        Commands::Heuristics => {
            println!("{}", describe_heuristics());
            Ok(())
        }
    }
}

struct ParseOptions {
    output: Option<PathBuf>,
    format: OutputFormat,
    summary: bool,
    limit: Option<usize>,
}

/// Config file if given, else defaults overridden by the environment.
fn load_config(path: Option<&Path>) -> Result<ParserConfig> {
    match path {
        Some(path) => ParserConfig::from_yaml_file(path),
        None => ParserConfig::from_env(),
    }
}

/// Read an act: a JSON record, or raw text paired with `urn`.
fn read_act(input: &Path, text_urn: Option<String>) -> Result<RawAct> {
    let content = fs::read_to_string(input)?;
    let act = match text_urn {
        Some(urn) => RawAct::new(urn, content),
        None => serde_json::from_str(&content)?,
    };
    act.validate()?;
    Ok(act)
}

/// Execute the parse command.
fn parse_command(act: &RawAct, config: ParserConfig, options: &ParseOptions) -> Result<()> {
    let result = Parser::new(config).parse(act)?;

    if options.summary {
        for line in summarize_devices(&result, options.limit) {
            println!("{line}");
        }
        println!();
        print_figures(&result);
        return Ok(());
    }

    match &options.output {
        Some(path) => {
            write_result(&result, path, options.format)?;
            print_figures(&result);
            println!();
            println!("{} {}", style("Saved to:").green().bold(), path.display());
        }
        None => print!("{}", render(&result, options.format)?),
    }
    Ok(())
}

fn print_figures(result: &ParseResult) {
    println!("  URN: {}", style(&result.source.urn).cyan());
    println!("  Devices: {}", result.device_count());
    println!("  Annexes: {}", result.annexes.len());
    println!("  Confidence: {}", confidence_style(result.confidence));

    let warnings = result
        .diagnostics
        .iter()
        .filter(|d| d.severity >= Severity::Warning)
        .count();
    if warnings > 0 {
        println!("  Warnings: {}", style(warnings).yellow().bold());
    }
    if result
        .diagnostics_with(DiagnosticCode::NoStructuralMarkers)
        .next()
        .is_some()
    {
        println!("  {}", style("No structural markers found").yellow());
    }
}

fn confidence_style(confidence: f64) -> console::StyledObject<String> {
    let text = format!("{confidence:.2}");
    if confidence >= crate::config::DEFAULT_REVIEW_THRESHOLD {
        style(text).green()
    } else {
        style(text).yellow()
    }
}

/// Execute the batch command.
fn batch_command(dir: &Path, output: &Path, format: OutputFormat, config: ParserConfig) -> Result<()> {
    if !dir.is_dir() {
        return Err(ParserError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Input directory does not exist: {}", dir.display()),
        )));
    }
    fs::create_dir_all(output)?;

    let mut records: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    records.sort();

    println!(
        "{} {} records from {}",
        style("Parsing").bold(),
        style(records.len()).cyan(),
        dir.display()
    );
    println!();

    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} {pos}")
            .expect("valid template"),
    );
    pb.set_message("Parsing records...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let parser = Parser::new(config);
    let failures: Vec<(PathBuf, ParserError)> = records
        .par_iter()
        .filter_map(|record| {
            let outcome = parse_record(&parser, record, output, format);
            pb.inc(1);
            outcome.err().map(|e| (record.clone(), e))
        })
        .collect();

    pb.finish_and_clear();

    let failed = failures.len();
    let ok = records.len() - failed;
    for (record, error) in &failures {
        match error.diagnostic() {
            Some(diag) => {
                tracing::error!(record = %record.display(), diagnostic = %diag, "record failed");
                println!("  {} {}: {diag}", style("failed").red(), record.display());
            }
            None => {
                tracing::warn!(record = %record.display(), error = %error, "record failed");
                println!("  {} {}: {error}", style("failed").red(), record.display());
            }
        }
    }
    if failed > 0 {
        println!();
    }
    println!(
        "{} {} ok, {} failed",
        style("Done:").green().bold(),
        style(ok).green(),
        if failed > 0 {
            style(failed).red().bold()
        } else {
            style(failed).dim()
        }
    );
    println!("{} {}", style("Saved to:").green().bold(), output.display());

    Ok(())
}

fn parse_record(parser: &Parser, record: &Path, output: &Path, format: OutputFormat) -> Result<()> {
    let act = read_act(record, None)?;
    let result = parser.parse(&act)?;
    write_result(&result, &output_path(output, &act.urn, format), format)
}
