//! Rule compilation and text rewriting for splice.
//!
//! This module handles:
//! - Compiling config rules (regex, literal, begin/end span) into regexes
//! - Applying one rule, or folding an ordered rule list over a text
//! - Ad-hoc sed-like substitutions from the command line

pub mod compiler;
pub mod substitution;

pub use compiler::{CompiledRule, Rewrite, apply_rule, apply_rules, compile_ruleset, span_pattern};
pub use substitution::parse_substitution;
