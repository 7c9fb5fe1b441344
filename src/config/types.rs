use crate::error::SpliceError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Top-level configuration from a `.splice.toml` file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
	/// If true, stop directory cascade and jump directly to ~/.splice.toml.
	#[serde(default)]
	pub root: bool,

	/// Environment variable name that, if truthy, skips ~/.splice.toml lookup.
	/// Useful for CI environments.
	#[serde(default)]
	pub root_config_lookup_disable_env_var: Option<String>,

	/// Named rule sets, keyed by identifier.
	#[serde(default)]
	pub rulesets: BTreeMap<String, RuleSet>,

	/// Jobs run by a bare `splice` invocation, in order.
	#[serde(default)]
	pub jobs: Vec<Job>,
}

/// An ordered list of rewrite rules.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSet {
	/// Free-form note shown by `splice config show`.
	#[serde(default)]
	pub description: Option<String>,

	/// Rules, applied strictly in this order.
	#[serde(default)]
	pub rules: Vec<Rule>,
}

/// A single rewrite rule: one match specification plus a replacement.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct Rule {
	/// Free-form note shown by `splice config show`.
	pub description: Option<String>,

	/// Regex to match (mutually exclusive with literal and begin/end).
	pub pattern: Option<String>,

	/// Exact text to match (mutually exclusive with pattern and begin/end).
	pub literal: Option<String>,

	/// Opening anchor of a lazy span. Requires `end`.
	pub begin: Option<String>,

	/// Closing anchor of a lazy span. Requires `begin`.
	pub end: Option<String>,

	/// Replacement text. Empty deletes the match.
	#[serde(default)]
	pub replacement: String,

	/// Expand `$1` / `${name}` capture references in the replacement.
	#[serde(default)]
	pub template: bool,

	/// Let `.` match newlines.
	#[serde(default)]
	pub dot_all: bool,

	/// Let `^` and `$` match at line boundaries.
	#[serde(default)]
	pub multi_line: bool,

	#[serde(default)]
	pub case_insensitive: bool,

	/// Maximum number of replacements. Zero or absent replaces every match.
	#[serde(default)]
	pub count: Option<usize>,
}

/// A rule set bound to one target file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Job {
	/// Target path. Relative paths resolve against the config file's directory.
	pub path: PathBuf,

	/// Identifier of the rule set to apply.
	pub ruleset: String,
}

/// A loaded configuration with its source path for debugging/display.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
	/// The parsed configuration.
	pub config: Config,

	/// The path this config was loaded from.
	pub path: PathBuf,
}

/// Merged configuration from multiple config files in the cascade.
#[derive(Debug, Clone, Default)]
pub struct MergedConfig {
	/// Rule sets by id. The most specific config wins on a clash.
	pub rulesets: BTreeMap<String, RuleSetWithSource>,

	/// Jobs in cascade order, with paths already resolved.
	pub jobs: Vec<Job>,
}

/// A rule set with its source config path for debugging/display.
#[derive(Debug, Clone)]
pub struct RuleSetWithSource {
	pub ruleset: RuleSet,

	/// The config file this rule set came from.
	pub source: PathBuf,
}

impl Rule {
	/// Validate that exactly one match specification is set.
	pub fn validate(&self, ruleset: &str, index: usize) -> Result<(), SpliceError> {
		if self.begin.is_some() != self.end.is_some() {
			return Err(SpliceError::IncompleteSpan {
				ruleset: ruleset.to_string(),
				index,
			});
		}

		let matcher_fields = [
			("pattern", self.pattern.is_some()),
			("literal", self.literal.is_some()),
			("begin/end", self.begin.is_some()),
		];

		let set_fields: Vec<_> = matcher_fields
			.iter()
			.filter(|(_, is_set)| *is_set)
			.map(|(name, _)| *name)
			.collect();

		match set_fields.len() {
			0 => Err(SpliceError::MissingMatcher {
				ruleset: ruleset.to_string(),
				index,
			}),
			1 => Ok(()),
			_ => Err(SpliceError::MutuallyExclusive {
				ruleset: ruleset.to_string(),
				index,
				option1: set_fields[0].to_string(),
				option2: set_fields[1].to_string(),
			}),
		}
	}

	/// Short label for listings: whichever match specification is set.
	pub fn matcher_label(&self) -> String {
		if let Some(ref pattern) = self.pattern {
			format!("pattern: {}", pattern)
		} else if let Some(ref literal) = self.literal {
			format!("literal: {:?}", literal)
		} else {
			format!(
				"span: {:?} .. {:?}",
				self.begin.as_deref().unwrap_or_default(),
				self.end.as_deref().unwrap_or_default()
			)
		}
	}
}

impl Config {
	/// Validate all rules in this config. Rules are numbered from 1.
	pub fn validate(&self) -> Result<(), SpliceError> {
		for (name, ruleset) in &self.rulesets {
			for (i, rule) in ruleset.rules.iter().enumerate() {
				rule.validate(name, i + 1)?;
			}
		}
		Ok(())
	}
}

impl MergedConfig {
	/// Look up a rule set by id.
	pub fn ruleset(&self, name: &str) -> Result<&RuleSet, SpliceError> {
		self.rulesets
			.get(name)
			.map(|rws| &rws.ruleset)
			.ok_or_else(|| SpliceError::UnknownRuleSet {
				name: name.to_string(),
			})
	}

	/// Check that every job names a known rule set.
	pub fn validate_jobs(&self) -> Result<(), SpliceError> {
		for job in &self.jobs {
			self.ruleset(&job.ruleset)?;
		}
		Ok(())
	}
}
