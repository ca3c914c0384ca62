use std::path::PathBuf;

/// Library-level structured errors for the migration engine.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
	#[error("Target directory does not exist: {path}")]
	DirectoryNotFound { path: PathBuf },

	#[error("Failed to list directory: {path}")]
	DirectoryReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to read source file: {path}")]
	ReadFailed {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to write source file: {path}")]
	WriteFailed {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to read config file: {path}")]
	ConfigReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse config file: {path}")]
	ConfigParseError {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("Invalid config value for {field}: {reason}")]
	InvalidConfig { field: String, reason: String },

	#[error("Invalid recognition pattern in rule {rule}: {pattern}")]
	InvalidPattern {
		rule: String,
		pattern: String,
		#[source]
		source: regex::Error,
	},
}

/// Result type alias using MigrateError.
pub type Result<T> = std::result::Result<T, MigrateError>;
