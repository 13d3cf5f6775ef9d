//! tensordiff CLI - compare the tensors of two SafeTensors files

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use tensordiff::{compare_maps, load_tensors, CompareConfig, TensorMap, VERSION};

/// Check that two SafeTensors files hold the same tensors
#[derive(Parser, Debug)]
#[command(name = "tensordiff")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// First SafeTensors file
    file1: PathBuf,

    /// Second SafeTensors file
    file2: PathBuf,

    /// Relative tolerance
    #[arg(long)]
    rtol: Option<f64>,

    /// Absolute tolerance
    #[arg(long)]
    atol: Option<f64>,

    /// List at most this many unique tensor names per file (0 = all)
    #[arg(long)]
    max_listed: Option<usize>,

    /// YAML file with comparison settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn compare_config(&self) -> Result<CompareConfig> {
        let mut config = match &self.config {
            Some(path) => CompareConfig::from_yaml(path)?,
            None => CompareConfig::default(),
        };

        if let Some(rtol) = self.rtol {
            config.rtol = rtol;
        }
        if let Some(atol) = self.atol {
            config.atol = atol;
        }
        if let Some(max_listed) = self.max_listed {
            config.max_listed = max_listed;
        }

        config.validate()?;
        Ok(config)
    }
}

fn print_usage() {
    println!("Usage: tensordiff <file1.safetensors> <file2.safetensors>");
    println!("\nExample:");
    println!("  tensordiff checkpoints/model.safetensors converted/model.safetensors");
}

fn setup_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        Level::DEBUG
    } else if quiet {
        Level::WARN
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(io::stderr)
        .compact()
        .finish();
    // Only fails if a subscriber is already installed
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn create_progress_bar(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.tick();
    pb
}

fn load_with_progress(out: &mut impl Write, file_no: usize, path: &Path) -> Result<TensorMap> {
    writeln!(out, "Loading tensors from file {}...", file_no)?;
    let pb = create_progress_bar(&format!("Decoding {}", path.display()));
    let tensors = load_tensors(path);
    pb.finish_and_clear();

    let tensors = tensors.with_context(|| format!("Failed to load tensors from {}", path.display()))?;
    writeln!(out, "  Loaded {} tensors", tensors.len())?;
    Ok(tensors)
}

fn run(cli: &Cli) -> Result<bool> {
    let config = cli.compare_config()?;
    debug!("Comparison settings: {:?}", config);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out, "Comparing tensors:")?;
    writeln!(out, "  File 1: {}", cli.file1.display())?;
    writeln!(out, "  File 2: {}", cli.file2.display())?;
    writeln!(out)?;

    let tensors1 = load_with_progress(&mut out, 1, &cli.file1)?;
    let tensors2 = load_with_progress(&mut out, 2, &cli.file2)?;
    writeln!(out)?;

    let report = compare_maps(&tensors1, &tensors2, &config);
    report.write_to(&mut out)?;
    out.flush()?;

    Ok(report.passed())
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
            ErrorKind::MissingRequiredArgument | ErrorKind::UnknownArgument => {
                print_usage();
                return ExitCode::FAILURE;
            }
            _ => {
                let _ = err.print();
                return ExitCode::FAILURE;
            }
        },
    };

    setup_logging(cli.verbose, cli.quiet);
    debug!("tensordiff v{}", VERSION);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            println!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
