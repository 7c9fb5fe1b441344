use crate::config::parser::parse_config_file;
use crate::config::types::{Job, LoadedConfig, MergedConfig, RuleSetWithSource};
use crate::error::{Result, SpliceError};
use std::path::{Path, PathBuf};

/// File name looked up in each directory of the cascade.
pub const CONFIG_FILE_NAME: &str = ".splice.toml";

/// Discover and load all config files in the cascade.
///
/// The cascade order is:
/// 1. Start from `start_dir` and look for `.splice.toml`
/// 2. If found and `root = true`, skip to user config only
/// 3. Otherwise, continue up the directory tree
/// 4. Finally, check ~/.splice.toml (unless disabled)
///
/// Returns configs in cascade order (most specific first).
pub fn discover_configs(start_dir: &Path) -> Result<Vec<LoadedConfig>> {
	let mut configs = Vec::new();
	let mut current_dir = start_dir.to_path_buf();
	let user_path = user_config_path().ok();

	loop {
		let config_path = current_dir.join(CONFIG_FILE_NAME);

		// The user config is picked up below, not as part of the walk.
		if config_path.exists() && user_path.as_deref() != Some(config_path.as_path()) {
			let config = parse_config_file(&config_path)?;
			let is_root = config.root;

			configs.push(LoadedConfig {
				config,
				path: config_path,
			});

			if is_root {
				break;
			}
		}

		if let Some(parent) = current_dir.parent() {
			current_dir = parent.to_path_buf();
		} else {
			break;
		}
	}

	if let Some(user_config) = load_user_config(&configs)? {
		configs.push(user_config);
	}

	Ok(configs)
}

/// Load the user's ~/.splice.toml if it exists and isn't disabled.
fn load_user_config(existing_configs: &[LoadedConfig]) -> Result<Option<LoadedConfig>> {
	for loaded in existing_configs {
		if let Some(ref env_var) = loaded.config.root_config_lookup_disable_env_var
			&& is_env_truthy(env_var)
		{
			return Ok(None);
		}
	}

	let user_config_path = user_config_path()?;

	if user_config_path.exists() {
		let config = parse_config_file(&user_config_path)?;
		Ok(Some(LoadedConfig {
			config,
			path: user_config_path,
		}))
	} else {
		Ok(None)
	}
}

/// Check if an environment variable is set to a truthy value.
fn is_env_truthy(var_name: &str) -> bool {
	match std::env::var(var_name) {
		Ok(value) => {
			let lower = value.to_lowercase();
			!value.is_empty() && lower != "0" && lower != "false" && lower != "no"
		}
		Err(_) => false,
	}
}

/// Merge multiple configs into a single effective config.
///
/// Rule sets are keyed by id and the first (most specific) definition wins.
/// Jobs are kept in cascade order, with relative paths resolved against the
/// directory of the config that declared them.
pub fn merge_configs(configs: &[LoadedConfig]) -> MergedConfig {
	let mut merged = MergedConfig::default();

	for loaded in configs {
		for (name, ruleset) in &loaded.config.rulesets {
			merged
				.rulesets
				.entry(name.clone())
				.or_insert_with(|| RuleSetWithSource {
					ruleset: ruleset.clone(),
					source: loaded.path.clone(),
				});
		}

		let base_dir = loaded.path.parent().unwrap_or_else(|| Path::new("."));
		for job in &loaded.config.jobs {
			merged.jobs.push(Job {
				path: base_dir.join(&job.path),
				ruleset: job.ruleset.clone(),
			});
		}
	}

	merged
}

/// Convenience function to discover, load, and merge configs from a directory.
pub fn load_merged_config(start_dir: &Path) -> Result<MergedConfig> {
	let configs = discover_configs(start_dir)?;
	Ok(merge_configs(&configs))
}

/// Get the path to the user's config file.
pub fn user_config_path() -> Result<PathBuf> {
	let home_dir = dirs::home_dir().ok_or(SpliceError::HomeDirectoryNotFound)?;
	Ok(home_dir.join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::parser::parse_config_str;

	fn loaded(content: &str, path: &str) -> LoadedConfig {
		let path = PathBuf::from(path);
		LoadedConfig {
			config: parse_config_str(content, &path).unwrap(),
			path,
		}
	}

	#[test]
	fn test_is_env_truthy() {
		// SAFETY: These env var operations are safe in single-threaded test context
		unsafe {
			std::env::remove_var("TEST_SPLICE_ENV_1");
			assert!(!is_env_truthy("TEST_SPLICE_ENV_1"));

			std::env::set_var("TEST_SPLICE_ENV_2", "");
			assert!(!is_env_truthy("TEST_SPLICE_ENV_2"));

			std::env::set_var("TEST_SPLICE_ENV_3", "0");
			assert!(!is_env_truthy("TEST_SPLICE_ENV_3"));

			std::env::set_var("TEST_SPLICE_ENV_4", "FALSE");
			assert!(!is_env_truthy("TEST_SPLICE_ENV_4"));

			std::env::set_var("TEST_SPLICE_ENV_5", "no");
			assert!(!is_env_truthy("TEST_SPLICE_ENV_5"));

			std::env::set_var("TEST_SPLICE_ENV_6", "1");
			assert!(is_env_truthy("TEST_SPLICE_ENV_6"));

			std::env::set_var("TEST_SPLICE_ENV_7", "yes");
			assert!(is_env_truthy("TEST_SPLICE_ENV_7"));

			for i in 1..=7 {
				std::env::remove_var(format!("TEST_SPLICE_ENV_{}", i));
			}
		}
	}

	#[test]
	fn test_user_config_path() {
		let path = user_config_path().unwrap();
		assert!(path.ends_with(".splice.toml"));
	}

	#[test]
	fn test_merge_most_specific_ruleset_wins() {
		let inner = loaded(
			r#"
[[rulesets.tidy.rules]]
literal = "inner"
"#,
			"/work/project/.splice.toml",
		);
		let outer = loaded(
			r#"
[[rulesets.tidy.rules]]
literal = "outer"

[[rulesets.extra.rules]]
literal = "only-outer"
"#,
			"/work/.splice.toml",
		);

		let merged = merge_configs(&[inner, outer]);

		let tidy = &merged.rulesets["tidy"];
		assert_eq!(tidy.source, PathBuf::from("/work/project/.splice.toml"));
		assert_eq!(tidy.ruleset.rules[0].literal.as_deref(), Some("inner"));
		assert!(merged.rulesets.contains_key("extra"));
	}

	#[test]
	fn test_merge_resolves_job_paths_per_config() {
		let inner = loaded(
			r#"
[[jobs]]
path = "src/a.js"
ruleset = "tidy"
"#,
			"/work/project/.splice.toml",
		);
		let outer = loaded(
			r#"
[[jobs]]
path = "/abs/b.js"
ruleset = "tidy"

[[jobs]]
path = "c.js"
ruleset = "tidy"
"#,
			"/work/.splice.toml",
		);

		let merged = merge_configs(&[inner, outer]);
		let paths: Vec<_> = merged.jobs.iter().map(|j| j.path.clone()).collect();

		assert_eq!(
			paths,
			vec![
				PathBuf::from("/work/project/src/a.js"),
				PathBuf::from("/abs/b.js"),
				PathBuf::from("/work/c.js"),
			]
		);
	}

	#[test]
	fn test_validate_jobs_unknown_ruleset() {
		let config = loaded(
			r#"
[[jobs]]
path = "a.js"
ruleset = "missing"
"#,
			"/work/.splice.toml",
		);

		let merged = merge_configs(&[config]);
		match merged.validate_jobs() {
			Err(SpliceError::UnknownRuleSet { name }) => assert_eq!(name, "missing"),
			other => panic!("Expected UnknownRuleSet error, got {other:?}"),
		}
	}

	#[test]
	fn test_discover_stops_at_root() {
		let temp_dir = tempfile::tempdir().unwrap();
		let nested = temp_dir.path().join("a/b");
		std::fs::create_dir_all(&nested).unwrap();

		std::fs::write(
			temp_dir.path().join("a/.splice.toml"),
			"root = true\nroot-config-lookup-disable-env-var = \"SPLICE_TEST_NO_USER\"\n",
		)
		.unwrap();
		std::fs::write(nested.join(".splice.toml"), "").unwrap();

		// SAFETY: the variable name is unique to this test
		unsafe {
			std::env::set_var("SPLICE_TEST_NO_USER", "1");
		}

		let configs = discover_configs(&nested).unwrap();
		let paths: Vec<_> = configs.iter().map(|c| c.path.clone()).collect();

		assert_eq!(
			paths,
			vec![
				nested.join(".splice.toml"),
				temp_dir.path().join("a/.splice.toml"),
			]
		);
	}
}
