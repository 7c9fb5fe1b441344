use std::path::PathBuf;

/// Library-level structured errors for splice.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
#[derive(Debug, thiserror::Error)]
pub enum SpliceError {
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

	#[error("Invalid regex pattern in rule: {pattern}")]
	InvalidRegex {
		pattern: String,
		#[source]
		source: regex::Error,
	},

	#[error("Invalid substitution expression {input:?}: {reason}")]
	InvalidSubstitution { input: String, reason: String },

	#[error("Mutually exclusive options in rule {index} of rule set {ruleset}: {option1} and {option2}")]
	MutuallyExclusive {
		ruleset: String,
		index: usize,
		option1: String,
		option2: String,
	},

	#[error("Rule {index} of rule set {ruleset} has no pattern, literal, or begin/end span")]
	MissingMatcher { ruleset: String, index: usize },

	#[error("Rule {index} of rule set {ruleset} needs both begin and end")]
	IncompleteSpan { ruleset: String, index: usize },

	#[error("Unknown rule set: {name}")]
	UnknownRuleSet { name: String },

	#[error("Failed to read target file: {path}")]
	FileRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to write target file: {path}")]
	FileWrite {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to resolve home directory")]
	HomeDirectoryNotFound,
}

/// Result type alias using SpliceError.
pub type Result<T> = std::result::Result<T, SpliceError>;
