//! File-level migration over a batch of descriptors.
//!
//! One bad file never aborts the batch: files on another schema version are
//! skipped, files that fail to read or parse are recorded as failures, and the
//! run continues with the next path.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::MigrateError;
use crate::migrate::{migrate_document, MigrationStats};

/// What happened to one file.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Migrated { stats: MigrationStats, written: bool },
    Skipped { schema: Option<String> },
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

/// Outcome of a batch run, with statistics folded across migrated files.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
    pub totals: MigrationStats,
}

impl BatchReport {
    pub fn migrated(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Migrated { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed { .. }))
    }

    pub fn push(&mut self, report: FileReport) {
        if let FileOutcome::Migrated { stats, .. } = &report.outcome {
            self.totals.absorb(stats);
        }
        self.files.push(report);
    }

    fn count(&self, pred: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files.iter().filter(|f| pred(&f.outcome)).count()
    }
}

/// Migrates descriptor files in place (or only reports, in dry-run mode).
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchMigrator {
    pub dry_run: bool,
}

impl BatchMigrator {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Migrate every path in order.
    pub fn run<P: AsRef<Path>>(&self, paths: impl IntoIterator<Item = P>) -> BatchReport {
        let mut report = BatchReport::default();
        for path in paths {
            report.push(self.migrate_file(path.as_ref()));
        }
        tracing::info!(
            migrated = report.migrated(),
            skipped = report.skipped(),
            failed = report.failed(),
            "migration batch finished"
        );
        report
    }

    /// Migrate a single file.
    pub fn migrate_file(&self, path: &Path) -> FileReport {
        let outcome = match self.try_migrate(path) {
            Ok(outcome) => outcome,
            Err(MigrateError::UnexpectedSchema { found }) => {
                tracing::debug!(path = %path.display(), schema = ?found, "skipping descriptor");
                FileOutcome::Skipped { schema: found }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "migration failed");
                FileOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };
        FileReport {
            path: path.to_path_buf(),
            outcome,
        }
    }

    fn try_migrate(&self, path: &Path) -> Result<FileOutcome, MigrateError> {
        let text = std::fs::read_to_string(path)?;
        let migration = migrate_document(&text)?;

        let written = !self.dry_run;
        if written {
            let mut out = serde_json::to_string_pretty(&migration.descriptor)?;
            out.push('\n');
            std::fs::write(path, out)?;
        }
        tracing::info!(
            path = %path.display(),
            keys_rewritten = migration.stats.keys_rewritten,
            unresolved = migration.stats.keys_unresolved.len(),
            written,
            "migrated descriptor"
        );
        Ok(FileOutcome::Migrated {
            stats: migration.stats,
            written,
        })
    }
}
