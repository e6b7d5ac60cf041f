//! Build command - turn a dump or table into stored records.

use std::path::PathBuf;

use colored::Colorize;
use devicecode::{DeviceCode, DeviceCodeConfig, DeviceStore, Origin};

/// Arguments of the build command.
pub struct BuildArgs {
    pub input: PathBuf,
    pub origin: Origin,
    pub output: PathBuf,
    pub reference: Option<PathBuf>,
    pub sequential: bool,
    pub skip_helper_pages: bool,
    pub report_stale: bool,
}

pub fn run(args: BuildArgs, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !args.input.exists() {
        return Err(format!("File not found: {}", args.input.display()).into());
    }

    let mut config = DeviceCodeConfig::default()
        .with_parallel(!args.sequential)
        .with_skip_helper_pages(args.skip_helper_pages);
    if let Some(reference) = &args.reference {
        config = config.with_reference(reference);
    }
    let dc = DeviceCode::with_config(config)?;

    println!(
        "{} {} ({})",
        "Building".cyan().bold(),
        args.input.display(),
        args.origin
    );

    let result = dc.process(&args.input, args.origin)?;
    let store = DeviceStore::new(&args.output);

    // Compare before writing, so the stale set reflects the previous build.
    let stale = if args.report_stale {
        store.stale_titles(args.origin, &result.report.devices)?
    } else {
        Vec::new()
    };
    let written = store.save_all(&result.report.devices)?;

    let summary = &result.summary;
    println!();
    println!("{}", "Summary:".yellow().bold());
    println!("  Pages:            {}", summary.pages.to_string().white());
    println!("  Devices:          {}", summary.devices.to_string().green());
    println!("  Non-device pages: {}", summary.non_device_pages);
    println!("  Failed pages:     {}", summary.failed_pages.to_string().red());
    println!(
        "  Quality notes:    {} ({} warnings)",
        summary.notes,
        summary.warnings.to_string().yellow()
    );
    println!();
    println!("{}", "Written:".yellow().bold());
    println!("  Created:   {}", written.created.to_string().green());
    println!("  Updated:   {}", written.updated.to_string().blue());
    println!("  Unchanged: {}", written.unchanged);

    let failures: Vec<_> = result
        .report
        .failures
        .iter()
        .filter(|f| verbose || !f.not_a_device)
        .collect();
    if !failures.is_empty() {
        println!();
        println!("{}", "Failures:".red().bold());
        for failure in failures {
            println!("  {} {}", failure.title.white(), failure.reason.dimmed());
        }
    }

    if args.report_stale {
        println!();
        if stale.is_empty() {
            println!("{}", "No stale records.".green());
        } else {
            println!(
                "{} {}",
                "Stale records:".yellow().bold(),
                stale.len().to_string().white()
            );
            for title in &stale {
                println!("  {}", title);
            }
        }
    }

    println!();
    println!(
        "{} {}",
        "Records written to".green(),
        store.devices_dir(args.origin).display()
    );
    Ok(())
}
