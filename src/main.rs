use clap::{Parser, Subcommand};
use comfy_table::Table;
use comfy_table::presets::UTF8_FULL;
use configuration::Settings;
use core_types::LoadStrategy;
use indicatif::{ProgressBar, ProgressStyle};
use runner::StrategyRunner;
use runner::mem::TrackingAllocator;
use seeder::SeedParams;
use store::{MemoryStore, Provider};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Counts every heap allocation in the process so strategy runs can report
/// memory deltas. Must live in the binary: a library cannot install a global
/// allocator for its consumers.
#[global_allocator]
static ALLOCATOR: TrackingAllocator = TrackingAllocator;

/// The main entry point for the querybench harness.
fn main() {
    // Initialize structured logging; RUST_LOG overrides the default level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Execute the appropriate command
    match cli.command {
        Commands::Run(args) => {
            if let Err(e) = handle_run(args) {
                eprintln!("Error: {e:#}");
                std::process::exit(1);
            }
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A benchmark harness that measures what each relationship load strategy
/// costs for the same logical query.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the dataset and benchmark the three load strategies.
    Run(RunArgs),
}

#[derive(Parser)]
struct RunArgs {
    /// Override the number of seeded customers (default: 100).
    #[arg(long)]
    customers: Option<u32>,

    /// Override the number of seeded orders (default: 1000).
    #[arg(long)]
    orders: Option<u32>,

    /// Override how many orders each strategy fetches (default: 10).
    #[arg(long)]
    page_size: Option<usize>,

    /// Override the deterministic generator seed (default: 42).
    #[arg(long)]
    seed: Option<u64>,

    /// Emit the ranked report as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

// ==============================================================================
// Run Command Logic
// ==============================================================================

/// Handles the orchestration of a full benchmark run: seed, measure each
/// strategy in order, compare, render.
fn handle_run(args: RunArgs) -> anyhow::Result<()> {
    let settings = apply_overrides(configuration::load_config()?, &args);
    settings.validate()?;

    let run_id = Uuid::new_v4();
    tracing::info!(
        %run_id,
        customers = settings.dataset.customers,
        orders = settings.dataset.orders,
        page_size = settings.benchmark.page_size,
        seed = settings.benchmark.seed,
        "starting benchmark run"
    );

    let store = MemoryStore::new();

    // Set up the seeding spinner. It is finished before any measurement
    // starts, so its allocations never land inside a sampling window.
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message("Seeding dataset...");
    let summary = seeder::seed(
        &store,
        &SeedParams {
            customers: settings.dataset.customers,
            orders: settings.dataset.orders,
            seed: settings.benchmark.seed,
        },
    )?;
    spinner.finish_with_message(format!(
        "Seeded {} customers, {} orders.",
        summary.customers, summary.orders
    ));

    // Run the strategies strictly one after another. Concurrent runs would
    // corrupt the allocation sampling.
    let runner = StrategyRunner::new(&store);
    let mut measurements = Vec::with_capacity(LoadStrategy::ALL.len());
    for strategy in LoadStrategy::ALL {
        tracing::info!(%strategy, "running strategy");
        let measurement = runner.run(strategy, settings.benchmark.page_size)?;
        tracing::info!(
            %strategy,
            queries = measurement.query_count,
            elapsed_ms = measurement.elapsed_millis,
            tracked = measurement.tracked_entity_count,
            "strategy finished"
        );
        measurements.push(measurement);
    }

    let report = comparator::compare(&measurements)?;
    if let Some(winner) = comparator::best(&report) {
        tracing::info!(strategy = %winner.measurement.strategy, "cheapest strategy");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, &store, settings.benchmark.page_size)?;
    }

    Ok(())
}

/// Command-line flags win over the configuration file and the built-in
/// defaults.
fn apply_overrides(mut settings: Settings, args: &RunArgs) -> Settings {
    if let Some(customers) = args.customers {
        settings.dataset.customers = customers;
    }
    if let Some(orders) = args.orders {
        settings.dataset.orders = orders;
    }
    if let Some(page_size) = args.page_size {
        settings.benchmark.page_size = page_size;
    }
    if let Some(seed) = args.seed {
        settings.benchmark.seed = seed;
    }
    settings
}

/// Renders the ranked report as a terminal table, cheapest strategy first.
fn print_report(
    report: &comparator::Report,
    store: &MemoryStore,
    page_size: usize,
) -> anyhow::Result<()> {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Strategy",
        "Queries",
        "Elapsed (ms)",
        "Memory (KB)",
        "Tracked entities",
        "vs. best",
    ]);

    for entry in &report.entries {
        let m = &entry.measurement;
        table.add_row(vec![
            m.strategy.label().to_string(),
            m.query_count.to_string(),
            format!("{:.3}", m.elapsed_millis),
            format!("{:.2}", m.memory_delta_bytes as f64 / 1024.0),
            m.tracked_entity_count.to_string(),
            format!("{:.2}x", entry.memory_ratio),
        ]);
    }

    println!("{table}");

    if report.baseline_substituted {
        println!(
            "Note: every strategy reported a zero memory delta; ratios use a 1-byte baseline."
        );
    }

    // The same page arithmetic a paginated listing would show.
    let total_orders = store.order_count()?;
    let total_pages = total_orders.div_ceil(page_size);
    println!("Page 1 of {total_pages} ({total_orders} orders in the store).");

    Ok(())
}
