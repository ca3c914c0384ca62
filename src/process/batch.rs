use crate::config::Config;
use crate::error::{MigrateError, Result};
use crate::process::{FileReport, WriteMode, process_file};
use crate::rules::RuleSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Progress notifications emitted while a batch runs.
#[derive(Debug)]
pub enum Progress<'a> {
	/// Discovery finished with this many eligible files.
	Found(usize),
	/// About to process a file.
	Processing(&'a Path),
	/// Finished a file.
	Done(&'a FileReport),
}

/// Aggregate result of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
	/// Files examined.
	pub examined: usize,

	/// Files whose content changed (written, or would be in check mode).
	pub fixed: usize,

	/// One report per examined file, in processing order.
	pub reports: Vec<FileReport>,
}

impl BatchSummary {
	/// Span openings left without a closing line, across all files.
	pub fn unmatched(&self) -> usize {
		self.reports.iter().map(|r| r.unmatched.len()).sum()
	}
}

/// List the files a batch will process.
///
/// Only regular files directly inside `config.directory` with the configured
/// extension are returned, minus the deny-list, sorted by file name.
pub fn discover_files(config: &Config) -> Result<Vec<PathBuf>> {
	let dir = &config.directory;
	if !dir.exists() {
		return Err(MigrateError::DirectoryNotFound { path: dir.clone() });
	}

	let read_err = |source: std::io::Error| MigrateError::DirectoryReadError {
		path: dir.clone(),
		source,
	};

	let mut files = Vec::new();
	for entry in fs::read_dir(dir).map_err(read_err)? {
		let path = entry.map_err(read_err)?.path();
		if !path.is_file() {
			continue;
		}
		if path.extension().and_then(|e| e.to_str()) != Some(config.extension.as_str()) {
			continue;
		}
		let excluded = path
			.file_name()
			.and_then(|n| n.to_str())
			.is_some_and(|name| config.is_excluded(name));
		if excluded {
			continue;
		}
		files.push(path);
	}

	files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
	Ok(files)
}

/// Process every eligible file in `config.directory`, one after another.
///
/// The first I/O error aborts the batch. Files already written stay written.
pub fn run_batch<F>(
	config: &Config,
	rules: &RuleSet,
	mode: WriteMode,
	mut progress: F,
) -> Result<BatchSummary>
where
	F: FnMut(Progress<'_>),
{
	let files = discover_files(config)?;
	info!(
		directory = %config.directory.display(),
		files = files.len(),
		?mode,
		"starting migration batch"
	);
	progress(Progress::Found(files.len()));

	let mut summary = BatchSummary::default();
	for path in &files {
		progress(Progress::Processing(path));
		let report = process_file(path, rules, mode)?;

		for line in &report.unmatched {
			warn!(
				path = %path.display(),
				line,
				"construction opening has no closing line; left unchanged"
			);
		}

		summary.examined += 1;
		if report.outcome.is_change() {
			summary.fixed += 1;
		}
		progress(Progress::Done(&report));
		summary.reports.push(report);
	}

	Ok(summary)
}
