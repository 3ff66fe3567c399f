//! Batch conversion into a per-directory output subfolder

use crate::convert::{ConvertOptions, convert_file};
use crate::error::Error;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Created next to each input; receives its output
    pub subfolder: String,
    pub overwrite: bool,
    pub convert: ConvertOptions,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            subfolder: "png".to_string(),
            overwrite: true,
            convert: ConvertOptions::default(),
        }
    }
}

#[derive(Debug)]
pub enum BatchOutcome {
    Converted,
    Skipped,
    Failed(Error),
}

#[derive(Debug)]
pub struct BatchEntry {
    pub input: PathBuf,
    pub output: PathBuf,
    pub outcome: BatchOutcome,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.entries.len()
    }

    fn count(&self, pred: impl Fn(&BatchOutcome) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.outcome)).count()
    }

    pub fn succeeded(&self) -> usize {
        self.count(|o| matches!(o, BatchOutcome::Converted))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, BatchOutcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, BatchOutcome::Failed(_)))
    }
}

/// `<input dir>/<subfolder>/<input stem>.<ext>`
pub fn batch_output_path(input: &Path, options: &BatchOptions) -> PathBuf {
    let dir = input.parent().unwrap_or(Path::new(""));
    let stem = input.file_stem().unwrap_or(input.as_os_str()).to_string_lossy();
    dir.join(&options.subfolder)
        .join(format!("{stem}.{}", options.convert.format.extension()))
}

fn is_project(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("lbrn") || e.eq_ignore_ascii_case("lbrn2"))
}

/// Expand directories to the projects below them (sorted), keep explicit
/// files as given, and drop repeated paths keeping the first occurrence.
pub fn collect_inputs<P: AsRef<Path>>(paths: &[P]) -> Vec<PathBuf> {
    let mut inputs = Vec::new();
    for path in paths {
        let path = path.as_ref();
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                match entry {
                    Ok(entry) if entry.file_type().is_file() && is_project(entry.path()) => {
                        inputs.push(entry.into_path());
                    }
                    Ok(_) => {}
                    Err(err) => warn!(error = %err, "skipping unreadable directory entry"),
                }
            }
        } else {
            inputs.push(path.to_path_buf());
        }
    }

    let mut seen = HashSet::new();
    inputs.retain(|p| seen.insert(p.clone()));
    inputs
}

/// Convert every input, continuing past failures
pub fn run_batch<P: AsRef<Path>>(paths: &[P], options: &BatchOptions) -> BatchReport {
    let inputs = collect_inputs(paths);
    let total = inputs.len();
    let mut report = BatchReport::default();

    for (i, input) in inputs.into_iter().enumerate() {
        let output = batch_output_path(&input, options);
        info!("[{}/{}] {}", i + 1, total, input.display());

        let outcome = if !options.overwrite && output.exists() {
            info!(output = %output.display(), "output exists, skipping");
            BatchOutcome::Skipped
        } else {
            match convert_file(&input, Some(&output), &options.convert) {
                Ok(_) => BatchOutcome::Converted,
                Err(err) => {
                    error!(input = %input.display(), "{err}");
                    BatchOutcome::Failed(err)
                }
            }
        };

        report.entries.push(BatchEntry {
            input,
            output,
            outcome,
        });
    }

    info!(
        skipped = report.skipped(),
        failed = report.failed(),
        "{}/{} converted",
        report.succeeded(),
        report.total()
    );
    report
}
