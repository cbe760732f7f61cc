//! meterstat - Turn meter readings into chart-ready cumulative series

use clap::Parser;
use meterstat::{
    aggregation::{Aggregator, EngineOptions, GridFill},
    cli::Cli,
    data_loader::{JsonFileSource, RecordSource},
    error::Result,
    output::get_formatter,
    timezone::TimezoneConfig,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins unless --verbose asks for informational output
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new("meterstat=info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("meterstat=warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let timeframe = cli.command.into_timeframe()?;
    let configured_baseline = cli.configured_baseline()?;
    let tz_config = TimezoneConfig::from_cli(cli.timezone.as_deref(), cli.utc)?;

    let grid_fill = if cli.sparse {
        GridFill::Sparse
    } else {
        GridFill::Dense
    };
    let aggregator = Aggregator::new(EngineOptions::new(tz_config).with_grid_fill(grid_fill));
    info!(
        "Using timezone: {}",
        aggregator.timezone_config().display_name()
    );

    let source = JsonFileSource::new(&cli.input, cli.metric, tz_config);
    let batch = source.load().await?;
    info!(
        "Loaded {} records from {} ({} skipped)",
        batch.records.len(),
        cli.input.display(),
        batch.skipped
    );

    let request = batch.report_request(timeframe, configured_baseline);
    let report = aggregator.build_report(&batch.records, &request)?;
    info!(
        "Built {} report for {}: baseline from {}",
        timeframe.mode_name(),
        timeframe,
        report.baseline_source
    );

    let color = !cli.json && is_terminal::is_terminal(std::io::stdout());
    let formatter = get_formatter(cli.json, color);
    println!("{}", formatter.format_report(&report, cli.metric));

    Ok(())
}
