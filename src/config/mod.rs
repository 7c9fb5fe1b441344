//! Configuration loading and parsing for splice.
//!
//! This module handles:
//! - TOML rule-set file parsing
//! - Directory cascade discovery
//! - Config merging

pub mod cascade;
pub mod parser;
pub mod types;

pub use cascade::{
	CONFIG_FILE_NAME, discover_configs, load_merged_config, merge_configs, user_config_path,
};
pub use parser::{parse_config_file, parse_config_str};
pub use types::{Config, Job, LoadedConfig, MergedConfig, Rule, RuleSet, RuleSetWithSource};
