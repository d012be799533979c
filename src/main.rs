use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rolcheck_models::{behavioral_adapter, Fault};
use rolcheck_verify::{
    rotate_left, shift_width_for, summarize, word_mask, HarnessConfig, Parameters, Report,
    StimulusMode, Verifier, WriterReporter,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// rolcheck - differential verification of rotate-left circuits
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the verifier against the behavioral rotators
    Run(RunArgs),

    /// Print the golden rotation of a single value
    Golden {
        /// Data word (decimal or 0x-prefixed hex)
        data: String,

        /// Shift amount
        shamt: u64,

        /// Data width in bits
        #[arg(short, long, default_value = "16")]
        width: i64,
    },

    /// Validate a configuration file
    CheckConfig {
        /// Configuration file
        config: PathBuf,
    },
}

#[derive(clap::Args)]
struct RunArgs {
    /// Configuration file (rolcheck.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Data width in bits
    #[arg(short, long)]
    width: Option<i64>,

    /// Number of samples (defaults to 2^width)
    #[arg(short = 'n', long, allow_negative_numbers = true)]
    iterations: Option<i64>,

    /// Seed for reproducible stimulus
    #[arg(short, long)]
    seed: Option<u64>,

    /// Check the devices' error flags
    #[arg(long)]
    error_flags: bool,

    /// Enumerate every (data, shamt) pair instead of sampling
    #[arg(long, conflicts_with = "iterations")]
    exhaustive: bool,

    /// Inject a fault into the behavioral device (repeatable)
    #[arg(short, long = "fault", value_name = "FAULT")]
    faults: Vec<Fault>,

    /// Write the per-iteration trace to a file instead of stdout
    #[arg(short, long)]
    trace: Option<PathBuf>,

    /// Suppress the per-iteration trace
    #[arg(short, long, conflicts_with = "trace")]
    quiet: bool,

    /// Print the final report as JSON (the trace is suppressed unless written to a file)
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Run(args) => {
            let report = run_verification(&args).await?;
            if !report.is_success() {
                std::process::exit(1);
            }
        }

        Commands::Golden { data, shamt, width } => {
            print_golden(&data, shamt, width)?;
        }

        Commands::CheckConfig { config } => {
            check_config(&config)?;
        }
    }

    Ok(())
}

/// Merge the config file (if any) with command-line overrides
fn load_config(args: &RunArgs) -> Result<HarnessConfig> {
    let mut config = match &args.config {
        Some(path) => HarnessConfig::from_path(path)
            .with_context(|| format!("Failed to load config {:?}", path))?,
        None => HarnessConfig::default(),
    };

    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(iterations) = args.iterations {
        config.iterations = Some(iterations);
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if args.error_flags {
        config.error_flags = true;
    }
    if args.exhaustive {
        config.mode = StimulusMode::Exhaustive;
    }

    Ok(config)
}

async fn run_verification(args: &RunArgs) -> Result<Report> {
    let config = load_config(args)?;
    let verify = config.validate().context("Invalid configuration")?;
    let width = verify.params.width;

    for fault in &args.faults {
        warn!("Injecting fault: {}", fault);
    }

    let mut adapter = behavioral_adapter(
        width,
        &config.signals,
        verify.error_flags,
        config.settle_time_ns,
        &args.faults,
    )
    .context("Invalid fault")?;

    let verifier = Verifier::new(verify);

    // Stop cleanly at the next iteration boundary on Ctrl-C
    let stop = verifier.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current iteration");
            stop.stop();
        }
    });

    // The JSON report owns stdout unless the trace goes to a file.
    let report = match (&args.trace, args.quiet || args.json) {
        (Some(path), _) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create trace file {:?}", path))?;
            let mut reporter = WriterReporter::new(BufWriter::new(file));
            let report = verifier.run(&mut adapter, &mut reporter).await;
            reporter
                .finish()
                .with_context(|| format!("Failed to write trace file {:?}", path))?;
            info!("Trace written to {:?}", path);
            report
        }
        (None, true) => {
            let mut reporter = WriterReporter::new(io::sink());
            verifier.run(&mut adapter, &mut reporter).await
        }
        (None, false) => {
            let mut reporter = WriterReporter::new(io::stdout().lock());
            let report = verifier.run(&mut adapter, &mut reporter).await;
            reporter.finish().context("Failed to write trace")?;
            report
        }
    };

    let mut stdout = io::stdout().lock();
    if args.json {
        serde_json::to_writer_pretty(&mut stdout, &report)?;
        writeln!(stdout)?;
    } else {
        write!(stdout, "{}", summarize(&report))?;
    }
    stdout.flush()?;

    Ok(report)
}

fn parse_word(text: &str) -> Result<u64> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => text.parse::<u64>(),
    };
    parsed.with_context(|| format!("Invalid data word '{}'", text))
}

fn print_golden(data: &str, shamt: u64, width: i64) -> Result<()> {
    let params = Parameters::new(width, Some(0))?;
    let value = parse_word(data)?;

    if value & !word_mask(params.width) != 0 {
        bail!("Data word {:#x} does not fit in {} bits", value, params.width);
    }
    if shamt >= params.shamt_space() {
        warn!(
            "Shift amount {} exceeds the {}-bit shift port of a {}-bit rotator",
            shamt,
            shift_width_for(params.width),
            params.width
        );
    }

    println!("{:#x}", rotate_left(value, shamt, params.width));
    Ok(())
}

fn check_config(path: &Path) -> Result<()> {
    let config = HarnessConfig::from_path(path)
        .with_context(|| format!("Failed to load config {:?}", path))?;
    let verify = config.validate().context("Invalid configuration")?;

    println!(
        "{}: width={} shift_width={} iterations={} mode={:?} error_flags={}",
        path.display(),
        verify.params.width,
        verify.params.shift_width,
        verify.params.iterations,
        verify.mode,
        verify.error_flags
    );
    Ok(())
}
