use crate::error::{MigrateError, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Directory holding the chip state sources, relative to the workspace root.
pub const DEFAULT_DIRECTORY: &str = "crates/soundlog/src/chip/state";

/// Extension of the files to migrate.
pub const DEFAULT_EXTENSION: &str = "rs";

/// Files in the state directory that never carried `Option<StateEvent>`.
pub const DEFAULT_EXCLUDE: [&str; 3] = ["chip_state.rs", "storage.rs", "channel.rs"];

/// Name of the optional config file looked up in the current directory.
pub const CONFIG_FILE_NAME: &str = ".event-migrate.toml";

/// Migration settings, from an optional `.event-migrate.toml`.
///
/// Every key is optional; missing keys keep the built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
	/// Directory scanned for source files (not recursive).
	pub directory: PathBuf,

	/// File extension to consider, without the leading dot.
	pub extension: String,

	/// File names skipped regardless of content (exact match).
	pub exclude: Vec<String>,
}

impl Default for Config {
	fn default() -> Self {
		Config {
			directory: PathBuf::from(DEFAULT_DIRECTORY),
			extension: DEFAULT_EXTENSION.to_string(),
			exclude: DEFAULT_EXCLUDE.iter().map(|s| s.to_string()).collect(),
		}
	}
}

impl Config {
	/// Validate values serde cannot check on its own.
	pub fn validate(&self) -> Result<()> {
		if self.directory.as_os_str().is_empty() {
			return Err(MigrateError::InvalidConfig {
				field: "directory".to_string(),
				reason: "must not be empty".to_string(),
			});
		}

		if self.extension.is_empty() || self.extension.starts_with('.') {
			return Err(MigrateError::InvalidConfig {
				field: "extension".to_string(),
				reason: format!("expected a bare extension like \"rs\", got {:?}", self.extension),
			});
		}

		if let Some(name) = self
			.exclude
			.iter()
			.find(|name| name.is_empty() || name.contains(['/', '\\']))
		{
			return Err(MigrateError::InvalidConfig {
				field: "exclude".to_string(),
				reason: format!("entries must be plain file names, got {name:?}"),
			});
		}

		Ok(())
	}

	/// Whether `file_name` is on the deny-list.
	pub fn is_excluded(&self, file_name: &str) -> bool {
		self.exclude.iter().any(|name| name == file_name)
	}
}
