//! Sheet Excavator CLI - rule-driven spreadsheet extraction

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use sheet_excavator::loader::open_workbook;
use sheet_excavator::{outcomes_to_json, ExtractOptions, Extractor, RuleSet};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "excavate")]
#[command(
    author,
    version,
    about = "Extract values, row patterns and tables from batches of spreadsheets"
)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a rule set to every file and write one JSON document per file
    Extract {
        /// JSON rule set
        #[arg(short, long)]
        rules: PathBuf,

        /// Input workbooks (xlsx, xlsm, xls, csv)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Worker threads (default: available parallelism)
        #[arg(short, long)]
        concurrency: Option<usize>,

        /// Output JSON file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,

        /// Print progress lines on stderr
        #[arg(long)]
        progress: bool,
    },

    /// List the sheets of a workbook with their used ranges
    Sheets {
        /// Input spreadsheet file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Extract {
            rules,
            files,
            concurrency,
            output,
            pretty,
            progress,
        } => run_extract(&rules, &files, concurrency, output.as_deref(), pretty, progress),
        Commands::Sheets { input } => list_sheets(&input),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_rules(path: &Path) -> Result<RuleSet> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rules '{}'", path.display()))?;
    text.parse::<RuleSet>()
        .with_context(|| format!("Invalid rules in '{}'", path.display()))
}

fn run_extract(
    rules: &Path,
    files: &[PathBuf],
    concurrency: Option<usize>,
    output: Option<&Path>,
    pretty: bool,
    progress: bool,
) -> Result<()> {
    let rules = load_rules(rules)?;
    let options = match concurrency {
        Some(concurrency) => ExtractOptions { concurrency },
        None => ExtractOptions::default(),
    };
    let extractor = Extractor::with_options(rules, options);

    let outcomes = if progress {
        extractor.run_with_progress(files, |message: &str| eprintln!("{}", message))
    } else {
        extractor.run(files)
    };

    let failed = outcomes.iter().filter(|o| o.is_failed()).count();
    if failed > 0 {
        log::warn!("{} of {} files could not be read", failed, outcomes.len());
    }

    let json = outcomes_to_json(&outcomes);
    let mut text = if pretty {
        serde_json::to_string_pretty(&json)?
    } else {
        serde_json::to_string(&json)?
    };
    text.push('\n');

    if let Some(output_path) = output {
        std::fs::write(output_path, &text)
            .with_context(|| format!("Failed to write '{}'", output_path.display()))?;
        eprintln!("Wrote {} documents to '{}'", outcomes.len(), output_path.display());
    } else {
        io::stdout()
            .write_all(text.as_bytes())
            .context("Failed to write to stdout")?;
    }

    Ok(())
}

fn list_sheets(input: &Path) -> Result<()> {
    let workbook =
        open_workbook(input).with_context(|| format!("Failed to open '{}'", input.display()))?;

    for (i, sheet) in workbook.worksheets().enumerate() {
        match sheet.used_range() {
            Some(range) => println!(
                "{}\t{}\t{} ({} rows x {} columns)",
                i,
                sheet.name(),
                range,
                range.row_count(),
                range.col_count()
            ),
            None => println!("{}\t{}\tempty", i, sheet.name()),
        }
    }

    Ok(())
}
