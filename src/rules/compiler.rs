use crate::config::types::{Rule, RuleSet};
use crate::error::{Result, SpliceError};
use regex::{NoExpand, Regex, RegexBuilder};

/// A compiled rewrite rule ready to apply.
#[derive(Debug, Clone)]
pub struct CompiledRule {
	/// The compiled match specification.
	pub regex: Regex,

	/// Replacement text.
	pub replacement: String,

	/// Expand capture references in `replacement`.
	pub template: bool,

	/// Maximum number of replacements; 0 replaces every match.
	pub limit: usize,

	/// Human-readable name for logs.
	pub label: String,
}

/// Result of folding a rule list over a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
	/// The final text.
	pub text: String,

	/// Number of replacements made by each rule, in rule order.
	pub matches: Vec<usize>,
}

impl CompiledRule {
	/// Compile a standalone rule, reported as rule 1 of rule set "inline".
	pub fn from_rule(rule: &Rule) -> Result<Self> {
		Self::compile(rule, "inline", 1)
	}

	/// Compile rule `index` (from 1) of rule set `ruleset`.
	///
	/// The rule is validated first, so exactly one match specification is set.
	pub fn compile(rule: &Rule, ruleset: &str, index: usize) -> Result<Self> {
		rule.validate(ruleset, index)?;

		let pattern = if let Some(ref pattern) = rule.pattern {
			pattern.clone()
		} else if let Some(ref literal) = rule.literal {
			regex::escape(literal)
		} else {
			span_pattern(
				rule.begin.as_deref().unwrap_or_default(),
				rule.end.as_deref().unwrap_or_default(),
			)
		};

		let regex = RegexBuilder::new(&pattern)
			.dot_matches_new_line(rule.dot_all)
			.multi_line(rule.multi_line)
			.case_insensitive(rule.case_insensitive)
			.build()
			.map_err(|source| SpliceError::InvalidRegex {
				pattern: pattern.clone(),
				source,
			})?;

		Ok(CompiledRule {
			regex,
			replacement: rule.replacement.clone(),
			template: rule.template,
			limit: rule.count.unwrap_or(0),
			label: rule.description.clone().unwrap_or_else(|| rule.matcher_label()),
		})
	}

	/// Replace matches in `input`. Text without a match comes back unchanged.
	pub fn apply(&self, input: &str) -> String {
		let output = if self.template {
			self.regex.replacen(input, self.limit, self.replacement.as_str())
		} else {
			self.regex.replacen(input, self.limit, NoExpand(self.replacement.as_str()))
		};
		output.into_owned()
	}

	/// Number of replacements `apply` would make on `input`.
	pub fn count_matches(&self, input: &str) -> usize {
		let limit = if self.limit == 0 {
			usize::MAX
		} else {
			self.limit
		};
		self.regex.find_iter(input).take(limit).count()
	}
}

/// Build a regex matching the shortest span from `begin` through `end`.
pub fn span_pattern(begin: &str, end: &str) -> String {
	format!("{}(?s:.*?){}", regex::escape(begin), regex::escape(end))
}

/// Compile every rule of the rule set named `name`, preserving order.
pub fn compile_ruleset(name: &str, ruleset: &RuleSet) -> Result<Vec<CompiledRule>> {
	ruleset
		.rules
		.iter()
		.enumerate()
		.map(|(i, rule)| CompiledRule::compile(rule, name, i + 1))
		.collect()
}

/// Apply a single rule to `text`.
pub fn apply_rule(text: &str, rule: &CompiledRule) -> String {
	rule.apply(text)
}

/// Apply `rules` left to right, each one to the previous rule's output.
pub fn apply_rules(text: &str, rules: &[CompiledRule]) -> Rewrite {
	let mut current = text.to_string();
	let mut matches = Vec::with_capacity(rules.len());

	for rule in rules {
		let count = rule.count_matches(&current);
		tracing::debug!(rule = %rule.label, matches = count, "applying rule");
		if count > 0 {
			current = rule.apply(&current);
		}
		matches.push(count);
	}

	Rewrite {
		text: current,
		matches,
	}
}
