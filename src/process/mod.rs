//! Per-file processing for the migration.
//!
//! This module handles:
//! - Running the rule set over one file's contents
//! - Detecting whether anything changed
//! - Writing changed files back atomically, leaving unchanged files untouched

pub mod batch;

pub use batch::{BatchSummary, Progress, discover_files, run_batch};

use crate::error::{MigrateError, Result};
use crate::rules::{RewriteOutcome, RuleSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Whether changed files are written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
	/// Overwrite files whose content changed.
	#[default]
	Write,
	/// Report what would change without touching disk.
	Check,
}

/// What happened to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
	/// Content changed and was written back.
	Fixed,
	/// Content would change, but the run is in check mode.
	WouldFix,
	/// No rule matched; nothing was written.
	Unchanged,
}

impl ProcessOutcome {
	/// Whether the rules changed the file's content.
	pub fn is_change(&self) -> bool {
		!matches!(self, ProcessOutcome::Unchanged)
	}
}

/// Result of processing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
	/// The file processed.
	pub path: PathBuf,

	/// What happened to it.
	pub outcome: ProcessOutcome,

	/// Total rewrites across all rules.
	pub rewrites: usize,

	/// Span openings (1-based line numbers) left without a closing line.
	pub unmatched: Vec<usize>,
}

/// Apply the rule set to one file's text without touching disk.
pub fn rewrite_source(rules: &RuleSet, text: &str) -> RewriteOutcome {
	rules.apply(text)
}

/// Read `path`, rewrite it, and write it back if the content changed.
///
/// In [`WriteMode::Check`] nothing is written; the report says whether a
/// write would have happened.
pub fn process_file(path: &Path, rules: &RuleSet, mode: WriteMode) -> Result<FileReport> {
	let original = fs::read_to_string(path).map_err(|source| MigrateError::ReadFailed {
		path: path.to_path_buf(),
		source,
	})?;

	let rewritten = rewrite_source(rules, &original);

	let outcome = match (rewritten.changed, mode) {
		(false, _) => ProcessOutcome::Unchanged,
		(true, WriteMode::Check) => ProcessOutcome::WouldFix,
		(true, WriteMode::Write) => {
			write_atomic(path, &rewritten.text)?;
			ProcessOutcome::Fixed
		}
	};

	Ok(FileReport {
		path: path.to_path_buf(),
		outcome,
		rewrites: rewritten.total_rewrites(),
		unmatched: rewritten.unmatched,
	})
}

/// Replace the contents of `path` atomically.
///
/// Symlinks are resolved first so the link stays a link and its target gets
/// the new content. The new content goes to a temp file next to the target,
/// is synced, takes over the target's permissions, and is renamed over it.
/// A target with other hard links is overwritten in place instead, since a
/// rename would split it from its siblings.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
	let write_err = |source: std::io::Error| MigrateError::WriteFailed {
		path: path.to_path_buf(),
		source,
	};

	let target = fs::canonicalize(path).map_err(write_err)?;
	let metadata = fs::metadata(&target).map_err(write_err)?;

	if has_other_links(&metadata) {
		fs::write(&target, content).map_err(write_err)?;
		debug!(path = %path.display(), target = %target.display(), "in-place write completed");
		return Ok(());
	}

	let dir = match target.parent() {
		Some(parent) if !parent.as_os_str().is_empty() => parent,
		_ => Path::new("."),
	};

	let mut temp = NamedTempFile::new_in(dir).map_err(write_err)?;
	temp.write_all(content.as_bytes()).map_err(write_err)?;
	temp.as_file().sync_all().map_err(write_err)?;
	fs::set_permissions(temp.path(), metadata.permissions()).map_err(write_err)?;
	temp.persist(&target).map_err(|e| write_err(e.error))?;

	debug!(path = %path.display(), target = %target.display(), "atomic write completed");
	Ok(())
}

#[cfg(unix)]
fn has_other_links(metadata: &fs::Metadata) -> bool {
	use std::os::unix::fs::MetadataExt;
	metadata.nlink() > 1
}

#[cfg(not(unix))]
fn has_other_links(_metadata: &fs::Metadata) -> bool {
	false
}

#[cfg(test)]
mod tests {
	use super::*;

	const BROKEN: &str = "fn f() -> Option<Vec<StateEvent>> {\n    Some(vec![StateEvent::KeyOn { channel: 0 }))\n}\n";
	const BROKEN_STMT: &str = "fn f() {\n    return Some(vec![StateEvent::KeyOn { channel: 0 }));\n}\n";
	const FIXED_STMT: &str = "fn f() {\n    return Some(vec![StateEvent::KeyOn { channel: 0 }]);\n}\n";

	#[test]
	fn test_rewrite_source_reports_change() {
		let rules = RuleSet::standard().unwrap();
		let outcome = rewrite_source(&rules, BROKEN_STMT);
		assert!(outcome.changed);
		assert_eq!(outcome.text, FIXED_STMT);
	}

	#[test]
	fn test_rewrite_source_unrecognized_shape_untouched() {
		let rules = RuleSet::standard().unwrap();
		let outcome = rewrite_source(&rules, BROKEN);
		assert!(!outcome.changed);
		assert_eq!(outcome.text, BROKEN);
	}

	#[test]
	fn test_process_file_writes_changes() {
		let temp_dir = tempfile::tempdir().unwrap();
		let path = temp_dir.path().join("ym2612.rs");
		fs::write(&path, BROKEN_STMT).unwrap();

		let rules = RuleSet::standard().unwrap();
		let report = process_file(&path, &rules, WriteMode::Write).unwrap();

		assert_eq!(report.outcome, ProcessOutcome::Fixed);
		assert_eq!(report.rewrites, 1);
		assert_eq!(fs::read_to_string(&path).unwrap(), FIXED_STMT);
	}

	#[test]
	fn test_process_file_unchanged_is_not_written() {
		let temp_dir = tempfile::tempdir().unwrap();
		let path = temp_dir.path().join("sn76489.rs");
		fs::write(&path, FIXED_STMT).unwrap();

		let rules = RuleSet::standard().unwrap();
		let report = process_file(&path, &rules, WriteMode::Write).unwrap();

		assert_eq!(report.outcome, ProcessOutcome::Unchanged);
		assert!(!report.outcome.is_change());
		assert_eq!(fs::read_to_string(&path).unwrap(), FIXED_STMT);
		// No temp file left behind either.
		assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
	}

	#[test]
	fn test_process_file_check_mode_does_not_write() {
		let temp_dir = tempfile::tempdir().unwrap();
		let path = temp_dir.path().join("ay8910.rs");
		fs::write(&path, BROKEN_STMT).unwrap();

		let rules = RuleSet::standard().unwrap();
		let report = process_file(&path, &rules, WriteMode::Check).unwrap();

		assert_eq!(report.outcome, ProcessOutcome::WouldFix);
		assert!(report.outcome.is_change());
		assert_eq!(fs::read_to_string(&path).unwrap(), BROKEN_STMT);
	}

	#[test]
	fn test_process_file_reports_unmatched_spans() {
		let temp_dir = tempfile::tempdir().unwrap();
		let path = temp_dir.path().join("pokey.rs");
		fs::write(&path, "fn f() {\n    Some(vec![StateEvent::KeyOn {\n").unwrap();

		let rules = RuleSet::standard().unwrap();
		let report = process_file(&path, &rules, WriteMode::Write).unwrap();

		assert_eq!(report.outcome, ProcessOutcome::Unchanged);
		assert_eq!(report.unmatched, vec![2]);
	}

	#[test]
	fn test_process_missing_file_is_read_error() {
		let rules = RuleSet::standard().unwrap();
		let result = process_file(Path::new("/nonexistent/file.rs"), &rules, WriteMode::Write);
		match result.unwrap_err() {
			MigrateError::ReadFailed { path, .. } => {
				assert_eq!(path, PathBuf::from("/nonexistent/file.rs"));
			}
			other => panic!("Expected ReadFailed error, got {other:?}"),
		}
	}

	#[cfg(unix)]
	#[test]
	fn test_write_atomic_preserves_permissions() {
		use std::os::unix::fs::PermissionsExt;

		let temp_dir = tempfile::tempdir().unwrap();
		let path = temp_dir.path().join("nes_apu.rs");
		fs::write(&path, "old").unwrap();
		fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

		write_atomic(&path, "new").unwrap();

		assert_eq!(fs::read_to_string(&path).unwrap(), "new");
		let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
		assert_eq!(mode, 0o644);
	}

	#[cfg(unix)]
	#[test]
	fn test_process_file_writes_through_symlink() {
		let temp_dir = tempfile::tempdir().unwrap();
		let target = temp_dir.path().join("real_target.txt");
		let link = temp_dir.path().join("ym2612.rs");
		fs::write(&target, BROKEN_STMT).unwrap();
		std::os::unix::fs::symlink(&target, &link).unwrap();

		let rules = RuleSet::standard().unwrap();
		let report = process_file(&link, &rules, WriteMode::Write).unwrap();

		assert_eq!(report.outcome, ProcessOutcome::Fixed);
		assert_eq!(report.path, link);
		assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
		assert_eq!(fs::read_to_string(&target).unwrap(), FIXED_STMT);
		assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 2);
	}

	#[cfg(unix)]
	#[test]
	fn test_write_atomic_keeps_hard_links_together() {
		use std::os::unix::fs::MetadataExt;

		let temp_dir = tempfile::tempdir().unwrap();
		let path = temp_dir.path().join("ym3812.rs");
		let sibling = temp_dir.path().join("ym3812_copy.rs");
		fs::write(&path, BROKEN_STMT).unwrap();
		fs::hard_link(&path, &sibling).unwrap();
		let inode = fs::metadata(&path).unwrap().ino();

		write_atomic(&path, FIXED_STMT).unwrap();

		assert_eq!(fs::metadata(&path).unwrap().ino(), inode);
		assert_eq!(fs::read_to_string(&sibling).unwrap(), FIXED_STMT);
	}
}
