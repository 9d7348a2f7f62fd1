use anyhow::{Context, Result};
use log::LevelFilter;

use gcode_layer_index::config::Config;
use gcode_layer_index::parser::GcodeParser;
use gcode_layer_index::storage::DirStorage;
use gcode_layer_index::IndexError;

fn main() -> Result<()> {
    let config = Config::from_args_and_env()?;

    let level: LevelFilter = config
        .log_level
        .parse()
        .with_context(|| format!("invalid log level '{}'", config.log_level))?;
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let storage = DirStorage::new(&config.storage_root);
    let mut parser = GcodeParser::new(storage)
        .with_policy(config.on_error)
        .with_explanations(config.explain);

    parser
        .open_file(&config.job_name)
        .with_context(|| format!("cannot open {}", config.job_name))?;

    let outcome = parser.index_file();
    parser.close_file();

    match outcome {
        Ok(report) => {
            print_report(&report, config.json)?;
            Ok(())
        }
        Err(IndexError::Aborted { report, reason }) => {
            // the prefix scanned before the halt is still useful
            print_report(&report, config.json)?;
            Err(anyhow::Error::new(reason).context("scan aborted"))
        }
        Err(e) => Err(e.into()),
    }
}

fn print_report(report: &gcode_layer_index::IndexReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    println!("{} lines scanned, {} layers", report.lines, report.layers.len());
    for entry in report.layers.entries() {
        println!("layer {:>4} @ byte {}", entry.ordinal, entry.offset);
    }
    Ok(())
}
