//! Dump command - list the values a filter name takes in the data.

use std::path::PathBuf;

use colored::Colorize;
use devicecode::query::{Catalog, FilterField};

use crate::cli::DumpFormat;

pub fn run(
    directory: PathBuf,
    value: String,
    format: DumpFormat,
    _verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let field: FilterField = value.parse()?;
    let devices = super::load_devices(&directory, true)?;
    let catalog = Catalog::from_devices(&devices);
    let Some(counts) = catalog.counts(field) else {
        return Ok(());
    };

    match format {
        DumpFormat::List => {
            for value in counts.keys() {
                println!("{}", value);
            }
        }
        DumpFormat::Counter => {
            let mut sorted: Vec<(&String, &usize)> = counts.iter().collect();
            sorted.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
            let width = sorted.first().map(|(_, c)| c.to_string().len()).unwrap_or(1);
            for (value, count) in sorted {
                let count = format!("{:>width$}", count, width = width);
                println!("{}  {}", count.cyan(), value);
            }
        }
        DumpFormat::Json => {
            println!("{}", serde_json::to_string_pretty(counts)?);
        }
    }
    Ok(())
}
