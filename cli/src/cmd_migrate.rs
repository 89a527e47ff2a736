//! `clearsign migrate`: rewrite first-version descriptors in place.

use anyhow::{Context, Result};
use clearsign_transform::{BatchMigrator, FileOutcome};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use walkdir::WalkDir;

pub fn run(paths: &[PathBuf], dry_run: bool, as_json: bool) -> Result<ExitCode> {
    let files = collect_descriptors(paths)?;
    if files.is_empty() {
        anyhow::bail!("no descriptor files found");
    }

    let report = BatchMigrator::new(dry_run).run(&files);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for file in &report.files {
            match &file.outcome {
                FileOutcome::Migrated { stats, written } => {
                    let verb = if *written { "migrated" } else { "would migrate" };
                    println!(
                        "  ✓ {} ({verb}: {} keys rewritten, {} fields marked)",
                        file.path.display(),
                        stats.keys_rewritten,
                        stats.fields_marked_always + stats.fields_marked_never
                    );
                    for key in &stats.keys_unresolved {
                        println!("      unresolved key: {key}");
                    }
                }
                FileOutcome::Skipped { schema } => {
                    println!(
                        "  - {} (skipped: schema {})",
                        file.path.display(),
                        schema.as_deref().unwrap_or("missing")
                    );
                }
                FileOutcome::Failed { error } => {
                    eprintln!("  ✗ {}: {error}", file.path.display());
                }
            }
        }
        println!(
            "\n{} migrated, {} skipped, {} failed",
            report.migrated(),
            report.skipped(),
            report.failed()
        );
    }

    Ok(if report.failed() > 0 {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}

/// Expand directories into the `*.json` files beneath them, in a stable order.
fn collect_descriptors(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found = Vec::new();
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry.with_context(|| format!("walking {}", path.display()))?;
                if entry.file_type().is_file() && is_json(entry.path()) {
                    found.push(entry.into_path());
                }
            }
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}
