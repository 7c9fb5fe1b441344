//! Rewrite jobs for splice.
//!
//! This module handles:
//! - Loading a target file as UTF-8 text
//! - Folding a compiled rule list over it
//! - Writing the result back atomically (temp file + rename)
//! - The `--init` config template

pub mod template;

use crate::error::{Result, SpliceError};
use crate::rules::{CompiledRule, apply_rules};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Options for a single rewrite job.
#[derive(Debug, Clone, Copy, Default)]
pub struct JobOptions {
	/// Compute the rewrite but never touch the file.
	pub dry_run: bool,
}

/// Outcome of a rewrite job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
	/// The target file.
	pub path: PathBuf,

	/// Byte length before rewriting.
	pub original_len: usize,

	/// Byte length after rewriting.
	pub final_len: usize,

	/// Replacements made by each rule, in rule order.
	pub matches: Vec<usize>,

	/// Whether the file was written back.
	pub written: bool,
}

impl JobReport {
	/// Total replacements across all rules.
	pub fn total_matches(&self) -> usize {
		self.matches.iter().sum()
	}
}

/// Read the whole file at `path` as UTF-8 text.
pub fn load(path: &Path) -> Result<String> {
	std::fs::read_to_string(path).map_err(|source| SpliceError::FileRead {
		path: path.to_path_buf(),
		source,
	})
}

/// Replace the file at `path` with `text`.
///
/// The text goes to a temporary file in the same directory, which is synced
/// and then renamed over `path`, so readers see either the old or the new
/// content. An existing file keeps its permissions. A symlink is followed:
/// the file it points to is rewritten and the link stays in place.
pub fn save(path: &Path, text: &str) -> Result<()> {
	let write_error = |source: std::io::Error| SpliceError::FileWrite {
		path: path.to_path_buf(),
		source,
	};

	let target = match std::fs::canonicalize(path) {
		Ok(resolved) => resolved,
		Err(err) if err.kind() == std::io::ErrorKind::NotFound => path.to_path_buf(),
		Err(err) => return Err(write_error(err)),
	};

	let directory = match target.parent() {
		Some(parent) if !parent.as_os_str().is_empty() => parent,
		_ => Path::new("."),
	};

	let mut temp_file = tempfile::Builder::new()
		.prefix(".splice-")
		.suffix(".tmp")
		.tempfile_in(directory)
		.map_err(write_error)?;

	temp_file.write_all(text.as_bytes()).map_err(write_error)?;

	if let Ok(metadata) = std::fs::metadata(&target) {
		std::fs::set_permissions(temp_file.path(), metadata.permissions()).map_err(write_error)?;
	}

	temp_file.as_file().sync_all().map_err(write_error)?;
	temp_file.persist(&target).map_err(|err| write_error(err.error))?;

	Ok(())
}

/// Load `path`, apply `rules` in order, and write the result back.
///
/// The file is only written when the text changed and `dry_run` is off.
/// Any error aborts the job and leaves the file as it was.
pub fn run_job(path: &Path, rules: &[CompiledRule], options: JobOptions) -> Result<JobReport> {
	let original = load(path)?;
	let rewrite = apply_rules(&original, rules);

	let written = rewrite.text != original && !options.dry_run;
	if written {
		save(path, &rewrite.text)?;
	}

	tracing::info!(
		path = %path.display(),
		before = original.len(),
		after = rewrite.text.len(),
		written,
		"job finished"
	);

	Ok(JobReport {
		path: path.to_path_buf(),
		original_len: original.len(),
		final_len: rewrite.text.len(),
		matches: rewrite.matches,
		written,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::types::Rule;
	use std::fs;

	fn literal_rule(literal: &str, replacement: &str) -> CompiledRule {
		CompiledRule::from_rule(&Rule {
			literal: Some(literal.to_string()),
			replacement: replacement.to_string(),
			..Default::default()
		})
		.unwrap()
	}

	#[test]
	fn test_run_job_rewrites_in_place() {
		let temp_dir = tempfile::tempdir().unwrap();
		let path = temp_dir.path().join("page.jsx");
		fs::write(&path, "const a = 1;\nconst legacy = 2;\n").unwrap();

		let rules = vec![literal_rule("const legacy = 2;\n", "")];
		let report = run_job(&path, &rules, JobOptions::default()).unwrap();

		assert_eq!(fs::read_to_string(&path).unwrap(), "const a = 1;\n");
		assert_eq!(report.original_len, 31);
		assert_eq!(report.final_len, 13);
		assert_eq!(report.matches, vec![1]);
		assert!(report.written);
	}

	#[test]
	fn test_empty_rule_list_reproduces_file() {
		let temp_dir = tempfile::tempdir().unwrap();
		let path = temp_dir.path().join("notes.txt");
		let content = "héllo\r\nwörld\n\n";
		fs::write(&path, content).unwrap();

		let report = run_job(&path, &[], JobOptions::default()).unwrap();

		assert_eq!(fs::read_to_string(&path).unwrap(), content);
		assert_eq!(report.original_len, report.final_len);
		assert!(!report.written);
	}

	#[test]
	fn test_dry_run_leaves_file_alone() {
		let temp_dir = tempfile::tempdir().unwrap();
		let path = temp_dir.path().join("page.jsx");
		fs::write(&path, "foo foo").unwrap();

		let rules = vec![literal_rule("foo", "bar")];
		let report = run_job(&path, &rules, JobOptions { dry_run: true }).unwrap();

		assert_eq!(fs::read_to_string(&path).unwrap(), "foo foo");
		assert_eq!(report.total_matches(), 2);
		assert!(!report.written);
	}

	#[test]
	fn test_missing_file_is_not_created() {
		let temp_dir = tempfile::tempdir().unwrap();
		let path = temp_dir.path().join("missing.jsx");

		let rules = vec![literal_rule("a", "b")];
		let result = run_job(&path, &rules, JobOptions::default());

		assert!(matches!(result, Err(SpliceError::FileRead { .. })));
		assert!(!path.exists());
		assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
	}

	#[test]
	fn test_save_leaves_no_temp_files() {
		let temp_dir = tempfile::tempdir().unwrap();
		let path = temp_dir.path().join("out.txt");
		fs::write(&path, "old").unwrap();

		save(&path, "new").unwrap();

		assert_eq!(fs::read_to_string(&path).unwrap(), "new");
		let names: Vec<_> = fs::read_dir(temp_dir.path())
			.unwrap()
			.map(|entry| entry.unwrap().file_name())
			.collect();
		assert_eq!(names, vec![std::ffi::OsString::from("out.txt")]);
	}

	#[test]
	fn test_non_utf8_file_is_a_read_error() {
		let temp_dir = tempfile::tempdir().unwrap();
		let path = temp_dir.path().join("binary.dat");
		fs::write(&path, b"\xff\xfe").unwrap();

		let rules = vec![literal_rule("a", "b")];
		let result = run_job(&path, &rules, JobOptions::default());

		assert!(matches!(result, Err(SpliceError::FileRead { .. })));
		assert_eq!(fs::read(&path).unwrap(), b"\xff\xfe");
	}

	#[cfg(unix)]
	#[test]
	fn test_save_follows_symlink() {
		let temp_dir = tempfile::tempdir().unwrap();
		let real = temp_dir.path().join("real.jsx");
		let link = temp_dir.path().join("link.jsx");
		fs::write(&real, "old\n").unwrap();
		std::os::unix::fs::symlink(&real, &link).unwrap();

		let rules = vec![literal_rule("old", "new")];
		let report = run_job(&link, &rules, JobOptions::default()).unwrap();

		assert!(report.written);
		assert_eq!(fs::read_to_string(&real).unwrap(), "new\n");
		assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
		assert_eq!(fs::read_to_string(&link).unwrap(), "new\n");
	}

	#[cfg(unix)]
	#[test]
	fn test_failed_save_keeps_original() {
		use std::os::unix::fs::PermissionsExt;

		let temp_dir = tempfile::tempdir().unwrap();
		let locked = temp_dir.path().join("locked");
		fs::create_dir(&locked).unwrap();
		let path = locked.join("page.jsx");
		fs::write(&path, "old content").unwrap();
		fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

		// Root ignores directory permissions; nothing to check there.
		if fs::write(locked.join("write-check"), "").is_ok() {
			fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
			return;
		}

		let result = save(&path, "new content");
		fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

		assert!(matches!(result, Err(SpliceError::FileWrite { .. })));
		assert_eq!(fs::read_to_string(&path).unwrap(), "old content");
		let names: Vec<_> = fs::read_dir(&locked)
			.unwrap()
			.map(|entry| entry.unwrap().file_name())
			.collect();
		assert_eq!(names, vec![std::ffi::OsString::from("page.jsx")]);
	}

	#[test]
	fn test_save_into_missing_directory_fails() {
		let temp_dir = tempfile::tempdir().unwrap();
		let path = temp_dir.path().join("no/such/dir/out.txt");

		let result = save(&path, "text");
		assert!(matches!(result, Err(SpliceError::FileWrite { .. })));
	}

	#[cfg(unix)]
	#[test]
	fn test_save_keeps_permissions() {
		use std::os::unix::fs::PermissionsExt;

		let temp_dir = tempfile::tempdir().unwrap();
		let path = temp_dir.path().join("script.sh");
		fs::write(&path, "echo old\n").unwrap();
		fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();

		save(&path, "echo new\n").unwrap();

		let mode = fs::metadata(&path).unwrap().permissions().mode();
		assert_eq!(mode & 0o777, 0o755);
	}
}
