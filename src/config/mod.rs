//! Configuration loading for the migration.
//!
//! This module handles:
//! - TOML config file parsing
//! - Locating the optional `.event-migrate.toml`
//! - Applying command-line overrides on top of the file

pub mod parser;
pub mod types;

pub use parser::{parse_config_file, parse_config_str};
pub use types::{CONFIG_FILE_NAME, Config};

use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Values given on the command line; each one replaces the config value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
	pub directory: Option<PathBuf>,
	pub extension: Option<String>,
	pub exclude: Option<Vec<String>>,
}

/// Load the effective config.
///
/// Precedence, lowest to highest: built-in defaults, then `explicit` if
/// given, else `.event-migrate.toml` in `cwd` if present, then `overrides`.
pub fn load_config(explicit: Option<&Path>, cwd: &Path, overrides: Overrides) -> Result<Config> {
	let mut config = match explicit {
		Some(path) => parse_config_file(path)?,
		None => {
			let candidate = cwd.join(CONFIG_FILE_NAME);
			if candidate.is_file() {
				debug!(path = %candidate.display(), "using config file");
				parse_config_file(&candidate)?
			} else {
				Config::default()
			}
		}
	};

	if let Some(directory) = overrides.directory {
		config.directory = directory;
	}
	if let Some(extension) = overrides.extension {
		config.extension = extension;
	}
	if let Some(exclude) = overrides.exclude {
		config.exclude = exclude;
	}

	config.validate()?;
	Ok(config)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::MigrateError;
	use std::fs;

	#[test]
	fn test_defaults_without_config_file() {
		let temp_dir = tempfile::tempdir().unwrap();
		let config = load_config(None, temp_dir.path(), Overrides::default()).unwrap();
		assert_eq!(config, Config::default());
	}

	#[test]
	fn test_discovers_config_in_cwd() {
		let temp_dir = tempfile::tempdir().unwrap();
		fs::write(
			temp_dir.path().join(CONFIG_FILE_NAME),
			"directory = \"chips\"\n",
		)
		.unwrap();

		let config = load_config(None, temp_dir.path(), Overrides::default()).unwrap();
		assert_eq!(config.directory, PathBuf::from("chips"));
	}

	#[test]
	fn test_explicit_config_wins_over_cwd() {
		let temp_dir = tempfile::tempdir().unwrap();
		fs::write(
			temp_dir.path().join(CONFIG_FILE_NAME),
			"directory = \"from-cwd\"\n",
		)
		.unwrap();
		let explicit = temp_dir.path().join("other.toml");
		fs::write(&explicit, "directory = \"from-explicit\"\n").unwrap();

		let config = load_config(Some(&explicit), temp_dir.path(), Overrides::default()).unwrap();
		assert_eq!(config.directory, PathBuf::from("from-explicit"));
	}

	#[test]
	fn test_overrides_win_over_file() {
		let temp_dir = tempfile::tempdir().unwrap();
		fs::write(
			temp_dir.path().join(CONFIG_FILE_NAME),
			"directory = \"from-file\"\nexclude = [\"a.rs\"]\n",
		)
		.unwrap();

		let overrides = Overrides {
			directory: Some(PathBuf::from("from-cli")),
			extension: None,
			exclude: Some(vec!["b.rs".to_string()]),
		};
		let config = load_config(None, temp_dir.path(), overrides).unwrap();
		assert_eq!(config.directory, PathBuf::from("from-cli"));
		assert_eq!(config.exclude, vec!["b.rs".to_string()]);
		assert_eq!(config.extension, "rs");
	}

	#[test]
	fn test_invalid_override_is_rejected() {
		let temp_dir = tempfile::tempdir().unwrap();
		let overrides = Overrides {
			extension: Some(String::new()),
			..Default::default()
		};
		let result = load_config(None, temp_dir.path(), overrides);
		assert!(matches!(
			result.unwrap_err(),
			MigrateError::InvalidConfig { .. }
		));
	}
}
