//! Heuristic repair of model-generated filter formulas
//!
//! Generated text is not guaranteed to be well-formed. The repair pass here is
//! deliberately shallow:
//! 1. markdown code fences are stripped
//! 2. missing `)` and `}` are appended at the end, one per unmatched opener
//! 3. product type codes used as `FIND` needles are lowercased
//!
//! There is no grammar: delimiters inside string literals are counted like any
//! other, and surplus closers are reported but left in place.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

// A fence opener runs to the end of its line (```json, ```text, ...)
static FENCE_OPEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```[^\n]*\n").expect("Invalid regex"));

/// Opening and closing delimiter counts of an expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DelimiterCounts {
    pub open_parens: usize,
    pub close_parens: usize,
    pub open_braces: usize,
    pub close_braces: usize,
}

impl DelimiterCounts {
    pub fn of(expression: &str) -> Self {
        let mut counts = Self::default();
        for c in expression.chars() {
            match c {
                '(' => counts.open_parens += 1,
                ')' => counts.close_parens += 1,
                '{' => counts.open_braces += 1,
                '}' => counts.close_braces += 1,
                _ => {}
            }
        }
        counts
    }

    pub fn missing_parens(&self) -> usize {
        self.open_parens.saturating_sub(self.close_parens)
    }

    pub fn missing_braces(&self) -> usize {
        self.open_braces.saturating_sub(self.close_braces)
    }

    /// More closers than openers of either kind
    pub fn over_closed(&self) -> bool {
        self.close_parens > self.open_parens || self.close_braces > self.open_braces
    }

    pub fn is_balanced(&self) -> bool {
        self.open_parens == self.close_parens && self.open_braces == self.close_braces
    }
}

/// Outcome of a repair pass, with what was changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairedExpression {
    pub expression: String,
    pub fences_stripped: bool,
    pub appended_parens: usize,
    pub appended_braces: usize,
    pub normalized_codes: usize,
    /// Surplus closers were found; they are left as emitted
    pub over_closed: bool,
}

impl RepairedExpression {
    pub fn was_modified(&self) -> bool {
        self.fences_stripped
            || self.appended_parens > 0
            || self.appended_braces > 0
            || self.normalized_codes > 0
    }
}

/// Remove markdown code fences and surrounding whitespace
pub fn strip_code_fences(raw: &str) -> String {
    let without_openers = FENCE_OPEN_RE.replace_all(raw.trim(), "");
    without_openers.replace("```", "").trim().to_string()
}

/// Append the closers needed to balance parentheses, then braces.
///
/// Returns the balanced string and the number of `)` and `}` appended.
pub fn balance_delimiters(expression: &str) -> (String, usize, usize) {
    let counts = DelimiterCounts::of(expression);
    let parens = counts.missing_parens();
    let braces = counts.missing_braces();

    let mut balanced = String::with_capacity(expression.len() + parens + braces);
    balanced.push_str(expression);
    balanced.extend(std::iter::repeat(')').take(parens));
    balanced.extend(std::iter::repeat('}').take(braces));
    (balanced, parens, braces)
}

/// Lowercases product type codes wherever they are the needle of a `FIND` call
#[derive(Debug, Clone)]
pub struct TypeCodeNormalizer {
    pattern: Option<Regex>,
}

impl TypeCodeNormalizer {
    pub fn new(codes: &[&str]) -> Self {
        let alternatives: Vec<String> = codes
            .iter()
            .filter(|c| !c.is_empty())
            .map(|c| regex::escape(c))
            .collect();

        let pattern = if alternatives.is_empty() {
            None
        } else {
            let source = format!(r#"(FIND\(\s*")((?i:{}))("\s*,)"#, alternatives.join("|"));
            Some(Regex::new(&source).expect("type code pattern is built from escaped literals"))
        };

        Self { pattern }
    }

    /// Rewrite codes in place, returning the new string and how many were changed
    pub fn normalize(&self, expression: &str) -> (String, usize) {
        let Some(pattern) = &self.pattern else {
            return (expression.to_string(), 0);
        };

        let mut changed = 0;
        let normalized = pattern.replace_all(expression, |caps: &Captures| {
            let code = &caps[2];
            let lower = code.to_ascii_lowercase();
            if lower != code {
                changed += 1;
            }
            format!("{}{}{}", &caps[1], lower, &caps[3])
        });
        (normalized.into_owned(), changed)
    }
}

/// The full repair pass with a prepared normalizer
pub fn repair_with(raw: &str, normalizer: &TypeCodeNormalizer) -> RepairedExpression {
    let trimmed = raw.trim();
    let stripped = strip_code_fences(trimmed);
    let fences_stripped = stripped != trimmed && trimmed.contains("```");

    let counts = DelimiterCounts::of(&stripped);
    let over_closed = counts.over_closed();
    if over_closed {
        log::warn!(
            "Formula has surplus closing delimiters (parens {}/{}, braces {}/{}); leaving as-is",
            counts.open_parens,
            counts.close_parens,
            counts.open_braces,
            counts.close_braces
        );
    }

    let (balanced, appended_parens, appended_braces) = balance_delimiters(&stripped);
    if appended_parens > 0 || appended_braces > 0 {
        perf_debug!(
            "Appended {} ')' and {} '}}' to unbalanced formula",
            appended_parens,
            appended_braces
        );
    }

    let (expression, normalized_codes) = normalizer.normalize(&balanced);

    RepairedExpression {
        expression,
        fences_stripped,
        appended_parens,
        appended_braces,
        normalized_codes,
        over_closed,
    }
}

/// The full repair pass: fences, delimiter balance, type code casing
pub fn repair_expression(raw: &str, type_codes: &[&str]) -> RepairedExpression {
    repair_with(raw, &TypeCodeNormalizer::new(type_codes))
}
