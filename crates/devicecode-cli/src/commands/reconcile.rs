//! Reconcile command - group records that describe the same device.

use std::path::PathBuf;

use colored::Colorize;
use devicecode::reconcile::{squash_all, Confidence, Reconciler};

pub fn run(
    directory: PathBuf,
    json_output: bool,
    squash: Option<PathBuf>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let devices = super::load_devices(&directory, true)?;
    let report = Reconciler::new(&devices).run();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{} {} records",
            "Reconciled".cyan().bold(),
            report.device_count.to_string().white()
        );
        println!();

        println!("{}", "Merge groups:".yellow().bold());
        let count = |c: Confidence| report.groups.iter().filter(|g| g.confidence == c).count();
        println!("  High:   {}", count(Confidence::High).to_string().green());
        println!("  Medium: {}", count(Confidence::Medium).to_string().blue());
        println!("  Low:    {}", count(Confidence::Low).to_string().red());
        println!("  Records merged: {}", report.merged_count());
        println!();

        let counts = report.ambiguity_counts();
        println!("{}", "Ambiguities:".yellow().bold());
        if counts.is_empty() {
            println!("  {}", "none".green());
        }
        for (kind, n) in &counts {
            println!("  {:<22} {}", kind.label(), n.to_string().yellow());
        }

        if verbose {
            println!();
            for group in &report.groups {
                let members: Vec<String> = group.members.iter().map(|m| m.to_string()).collect();
                println!(
                    "{} [{}] {}",
                    group.id.white().bold(),
                    group.confidence.label(),
                    members.join(" = ")
                );
            }
            for ambiguity in &report.ambiguities {
                println!(
                    "{} {}",
                    ambiguity.kind.label().yellow(),
                    ambiguity.note.dimmed()
                );
            }
        }
    }

    if let Some(outdir) = squash {
        std::fs::create_dir_all(&outdir).map_err(|e| {
            format!("Failed to create directory '{}': {}", outdir.display(), e)
        })?;
        let squashed = squash_all(&report, &devices);
        let mut conflicts = 0;
        for result in &squashed {
            conflicts += result.conflicts.len();
            let path = outdir.join(format!("{}.json", result.group));
            std::fs::write(&path, serde_json::to_vec_pretty(result)?)
                .map_err(|e| format!("Failed to write file '{}': {}", path.display(), e))?;
        }
        // Keep stdout clean for --json.
        eprintln!(
            "{} {} squashed records to {} ({} field conflicts)",
            "Wrote".green(),
            squashed.len(),
            outdir.display(),
            conflicts
        );
    }
    Ok(())
}
