use crate::cli::PredictArgs;
use crate::config::PartialPredictConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use apscore::core::models::prediction::AggregateScores;
use apscore::core::models::table::ResultTable;
use apscore::engine::progress::ProgressReporter;
use apscore::workflows;
use tracing::{info, warn};

pub fn run(args: PredictArgs) -> Result<()> {
    let partial_config = PartialPredictConfig::load(&args.artifacts)?;
    info!("Merging configuration from file and CLI arguments...");
    let final_config = partial_config.merge_with_cli(&args)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Scoring compounds from {}...", args.input.display());
    info!("Invoking the core prediction workflow...");
    let result = workflows::predict::run(final_config, &args.input, &args.output, &reporter);
    progress_handler.finish();
    let table = result?;

    print_summary(&table);
    println!("✓ Results written to: {}", args.output.display());
    Ok(())
}

fn print_summary(table: &ResultTable) {
    let [total, ..] = AggregateScores::COLUMNS;
    let scores: Vec<f64> = (0..table.len())
        .filter_map(|row| table.value(row, total))
        .filter(|v| v.is_finite())
        .collect();

    if scores.len() < table.len() {
        warn!(
            "{} compound(s) have an undefined {}.",
            table.len() - scores.len(),
            total
        );
    }
    match scores.iter().copied().reduce(f64::max) {
        Some(best) => println!(
            "Scored {} compound(s); best {} = {:.4}",
            table.len(),
            total,
            best
        ),
        None => println!("Scored {} compound(s).", table.len()),
    }
}
