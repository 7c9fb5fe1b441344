//! Splice - CLI tool for rewriting source files with ordered regex rule sets.
//!
//! This library provides the core functionality for splice, including:
//! - Rule-set configuration parsing and cascade discovery
//! - Rule compilation and the ordered rewrite fold
//! - Rewrite jobs with atomic write-back
//!
//! # Example
//!
//! ```no_run
//! use splice_cli::config::load_merged_config;
//! use splice_cli::job::{JobOptions, run_job};
//! use splice_cli::rules::compile_ruleset;
//!
//! let cwd = std::env::current_dir().unwrap();
//! let config = load_merged_config(&cwd).unwrap();
//!
//! for job in &config.jobs {
//!     let rules = compile_ruleset(&job.ruleset, config.ruleset(&job.ruleset).unwrap()).unwrap();
//!     let report = run_job(&job.path, &rules, JobOptions::default()).unwrap();
//!     println!("{}: {} -> {} bytes", job.path.display(), report.original_len, report.final_len);
//! }
//! ```

pub mod config;
pub mod error;
pub mod job;
pub mod rules;

pub use error::{Result, SpliceError};
