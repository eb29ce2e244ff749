use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use cadastre_graph::config::{FileConfig, OutputFormat};
use cadastre_graph::domain::{ParcelError, SortKey, sort_parcels};
use cadastre_graph::graph::GraphBuilder;
use cadastre_graph::importer::ParcelLoader;
use cadastre_graph::report::Reporter;

/// Find neighbouring land parcels in a cadastral table
///
/// Examples:
///   # Build the graph for a semicolon-separated export
///   cadastre-graph parcels.csv
///
///   # List parcels by area before the graph
///   cadastre-graph parcels.csv --list --sort-by area
///
///   # Machine-readable summary
///   cadastre-graph parcels.csv --format json
///
///   # Large file: use all cores and a looser tolerance
///   cadastre-graph parcels.csv --parallel --epsilon 1e-6
///
///   # Use a config file
///   cadastre-graph --config my-settings.toml
#[derive(Parser, Debug)]
#[command(name = "cadastre-graph")]
#[command(version, about, long_about = None)]
struct Args {
    /// Parcel table (optional if the config file names one)
    input: Option<PathBuf>,

    /// Path to config file (optional, auto-searches cadastre-graph.toml if not provided)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Field separator
    #[arg(short = 'd', long)]
    delimiter: Option<char>,

    /// Distance below which two boundaries count as touching
    #[arg(short = 'e', long)]
    epsilon: Option<f64>,

    /// Test every pair without the bounding-box shortcut
    #[arg(long)]
    no_prefilter: bool,

    /// Scan parcel pairs on all cores
    #[arg(short = 'p', long)]
    parallel: bool,

    /// Attribute to order the parcel listing by
    #[arg(long)]
    sort_by: Option<SortKey>,

    /// Output format for the graph
    #[arg(short = 'f', long)]
    format: Option<OutputFormat>,

    /// Print the loaded parcels before the graph (text output only)
    #[arg(short = 'l', long)]
    list: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let total_start = Instant::now();

    let file_config = if let Some(ref config_path) = args.config {
        if config_path.exists() {
            let contents = std::fs::read_to_string(config_path)
                .context(format!("Failed to read config file: {:?}", config_path))?;
            toml::from_str(&contents).context("Failed to parse config file")?
        } else {
            bail!("Config file not found: {:?}", config_path);
        }
    } else {
        FileConfig::load().unwrap_or_default()
    };

    let Some(input) = args.input.clone().or(file_config.input.clone()) else {
        bail!("No input file given (pass a path or set `input` in the config file)");
    };
    let delimiter = args.delimiter.unwrap_or(file_config.delimiter);
    let epsilon = args.epsilon.unwrap_or(file_config.epsilon);
    let bbox_prefilter = !args.no_prefilter && file_config.bbox_prefilter;
    let parallel = args.parallel || file_config.parallel;
    let sort_by = args.sort_by.unwrap_or(file_config.sort_by);
    let format = args.format.unwrap_or(file_config.format);
    let verbose = args.verbose || file_config.verbose;

    if !epsilon.is_finite() || epsilon < 0.0 {
        bail!("Epsilon must be a non-negative number, got {}", epsilon);
    }

    // Keep stdout clean for machine-readable output
    let chatty = format == OutputFormat::Text;

    if verbose && chatty {
        println!("cadastre-graph - Parcel Adjacency Builder");
        println!("=========================================");
        println!();
        println!("Configuration:");
        println!("  Input: {}", input.display());
        println!("  Delimiter: {:?}", delimiter);
        println!("  Epsilon: {}", epsilon);
        println!("  Bounding-box prefilter: {}", bbox_prefilter);
        println!("  Parallel: {}", parallel);
        println!();
    }

    let spinner = create_spinner("Loading parcels...");
    let reporter = ConsoleReporter::new(spinner.clone(), verbose);
    let outcome = ParcelLoader::new()
        .with_delimiter(delimiter)
        .with_reporter(&reporter)
        .load_path(&input)
        .context(format!("Failed to load parcels from {}", input.display()))?;
    spinner.finish_with_message(format!(
        "Loaded {} parcels ({} rows skipped)",
        outcome.parcels.len(),
        outcome.skipped_count()
    ));

    if args.list && chatty {
        let mut listing = outcome.parcels.clone();
        sort_parcels(&mut listing, sort_by);
        println!();
        for parcel in &listing {
            println!("{}", parcel);
        }
        println!();
    }

    let bar = create_progress_bar();
    let reporter = ConsoleReporter::new(bar.clone(), verbose);
    let scan_start = Instant::now();
    let graph = GraphBuilder::new()
        .epsilon(epsilon)
        .bbox_prefilter(bbox_prefilter)
        .parallel(parallel)
        .with_reporter(&reporter)
        .build(outcome.parcels)
        .context("Failed to build adjacency graph")?;
    bar.finish_with_message(format!(
        "Found {} adjacencies among {} parcels in {:.2}s",
        graph.edge_count(),
        graph.vertex_count(),
        scan_start.elapsed().as_secs_f32()
    ));

    match format {
        OutputFormat::Text => {
            println!();
            print!("{}", graph);
            println!();
            println!(
                "Total time: {:.2}s",
                total_start.elapsed().as_secs_f32()
            );
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&graph.summary())
                .context("Failed to serialize graph summary")?;
            println!("{}", json);
        }
    }

    Ok(())
}

/// Routes load and scan events to a progress indicator
struct ConsoleReporter {
    bar: ProgressBar,
    verbose: bool,
}

impl ConsoleReporter {
    fn new(bar: ProgressBar, verbose: bool) -> Self {
        Self { bar, verbose }
    }
}

impl Reporter for ConsoleReporter {
    fn row_skipped(&self, line: usize, error: &ParcelError) {
        if self.verbose {
            self.bar.println(format!("  Skipped line {}: {}", line, error));
        }
    }

    fn scan_started(&self, parcels: usize, pairs: u64) {
        self.bar.set_length(pairs);
        self.bar
            .set_message(format!("Testing {} parcels for shared borders...", parcels));
    }

    fn scan_progress(&self, pairs: u64) {
        self.bar.inc(pairs);
    }

    fn edge_found(&self, left_id: i64, right_id: i64) {
        if self.verbose {
            self.bar.println(format!("  {} <-> {}", left_id, right_id));
        }
    }
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn create_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg} [{bar:30.cyan/blue}] {pos}/{len} pairs")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}
