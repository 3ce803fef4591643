/// cdset group-by filter
///
/// Reads JSON objects from stdin, one per line, groups them by one field and
/// prints `key<TAB>result` lines in ascending key order.
///
/// Configuration comes from the environment:
/// - `CDSET_KEY`: field to group by (required)
/// - `CDSET_VALUE`: field to aggregate (defaults to `CDSET_KEY`)
/// - `CDSET_AGG`: count, sum, mean, min, max or concat (defaults to count)
/// - `RUST_LOG`: log filter (defaults to info)

use cdset::{load_json_lines, Aggregate, Dataset};
use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let key = std::env::var("CDSET_KEY").map_err(|_| "CDSET_KEY must name the field to group by")?;
    let value = std::env::var("CDSET_VALUE").unwrap_or_else(|_| key.clone());
    let aggregate = Aggregate::from_str(
        &std::env::var("CDSET_AGG").unwrap_or_else(|_| "count".to_string()),
    )?;

    let mut dataset = Dataset::new();
    let summary = load_json_lines(&mut dataset, io::stdin().lock())?;
    log::info!(
        "{} rows loaded, {} lines skipped",
        summary.rows_loaded,
        summary.skipped.len()
    );

    let groups = dataset.group_by(&key, &value, |run| aggregate.reduce(run))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (group_key, result) in groups {
        writeln!(out, "{}\t{}", group_key, result)?;
    }
    Ok(())
}
