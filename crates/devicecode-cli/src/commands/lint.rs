//! Lint command - list data-quality notes per device.

use std::collections::BTreeMap;
use std::path::PathBuf;

use colored::Colorize;
use devicecode::normalize::{NoteKind, Severity};

pub fn run(
    directory: PathBuf,
    kind: Option<NoteKind>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Notes belong to the stored build, not to overlays.
    let devices = super::load_devices(&directory, false)?;

    let mut totals: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut flagged = 0;
    for device in &devices {
        let notes: Vec<_> = device
            .notes
            .iter()
            .filter(|n| kind.is_none_or(|k| n.kind == k))
            .collect();
        if notes.is_empty() {
            continue;
        }
        flagged += 1;

        println!(
            "{} {}",
            device.origin.label().dimmed(),
            device.title.white().bold()
        );
        for note in notes {
            *totals.entry(note.kind.label()).or_insert(0) += 1;
            let label = match note.severity {
                Severity::Warning => note.kind.label().yellow(),
                Severity::Info => note.kind.label().blue(),
            };
            println!("  {} {}: {}", label, note.field.cyan(), note.message);
            if verbose {
                if let Some(raw) = &note.raw {
                    println!("      {}", raw.dimmed());
                }
            }
        }
    }

    println!();
    if flagged == 0 {
        println!("{}", "No quality notes.".green());
        return Ok(());
    }
    println!(
        "{} {} of {} devices",
        "Notes on".yellow().bold(),
        flagged.to_string().white(),
        devices.len()
    );
    for (label, count) in totals {
        println!("  {:<24} {}", label, count);
    }
    Ok(())
}
