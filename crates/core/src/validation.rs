//! Field validation framework.
//!
//! Entities implement [`Validate`] by running a [`Validator`] over their fields.
//! The validator never stops at the first failure: every broken rule is
//! collected into a single [`ValidationErrors`], so callers can report all of
//! them at once. Struct-level rules (anything that looks at more than one
//! field) plug in through [`Validator::check`].

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;

/// Which rule a [`Violation`] broke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    Required,
    Length,
    Range,
    Url,
    Duplicate,
    /// A named struct-level rule.
    Custom(&'static str),
}

impl Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViolationKind::Required => f.write_str("required"),
            ViolationKind::Length => f.write_str("length"),
            ViolationKind::Range => f.write_str("range"),
            ViolationKind::Url => f.write_str("url"),
            ViolationKind::Duplicate => f.write_str("unique"),
            ViolationKind::Custom(name) => f.write_str(name),
        }
    }
}

/// A single broken rule on a single field path (e.g. `variants[1].price`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: String,
    pub kind: ViolationKind,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind,
            message: message.into(),
        }
    }
}

impl Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.field, self.kind, self.message)
    }
}

/// Every violation found while validating one value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors(Vec<Violation>);

impl ValidationErrors {
    pub fn violations(&self) -> &[Violation] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether any violation was reported for exactly `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|v| v.field == field)
    }

    /// Whether any violation of the given kind was reported.
    pub fn has_kind(&self, kind: &ViolationKind) -> bool {
        self.0.iter().any(|v| &v.kind == kind)
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (idx, violation) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Values that can check their own field rules.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Collects violations across any number of rules.
#[derive(Debug, Default)]
pub struct Validator {
    violations: Vec<Violation>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, field: &str, kind: ViolationKind, message: String) -> &mut Self {
        self.violations.push(Violation::new(field, kind, message));
        self
    }

    /// Non-blank string.
    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.push(field, ViolationKind::Required, "must not be empty".to_string());
        }
        self
    }

    /// Presence check for values that are not strings (ids, references).
    pub fn present(&mut self, field: &str, present: bool) -> &mut Self {
        if !present {
            self.push(field, ViolationKind::Required, "is required".to_string());
        }
        self
    }

    /// Length in characters, inclusive bounds. `max = None` means unbounded.
    pub fn length(
        &mut self,
        field: &str,
        value: &str,
        min: usize,
        max: Option<usize>,
    ) -> &mut Self {
        let len = value.chars().count();
        let too_long = max.is_some_and(|max| len > max);
        if len < min || too_long {
            let message = match max {
                Some(max) => format!("length must be between {min} and {max}, got {len}"),
                None => format!("length must be at least {min}, got {len}"),
            };
            self.push(field, ViolationKind::Length, message);
        }
        self
    }

    /// Inclusive range. NaN never passes.
    pub fn range<T>(&mut self, field: &str, value: T, min: T, max: T) -> &mut Self
    where
        T: PartialOrd + Display + Copy,
    {
        let below = value.partial_cmp(&min).is_none_or(Ordering::is_lt);
        let above = value.partial_cmp(&max).is_none_or(Ordering::is_gt);
        if below || above {
            self.push(
                field,
                ViolationKind::Range,
                format!("must be between {min} and {max}, got {value}"),
            );
        }
        self
    }

    /// Inclusive lower bound.
    pub fn min<T>(&mut self, field: &str, value: T, min: T) -> &mut Self
    where
        T: PartialOrd + Display + Copy,
    {
        if value.partial_cmp(&min).is_none_or(Ordering::is_lt) {
            self.push(
                field,
                ViolationKind::Range,
                format!("must be at least {min}, got {value}"),
            );
        }
        self
    }

    /// Absolute URL with a scheme and a host.
    pub fn url(&mut self, field: &str, value: &str) -> &mut Self {
        match url::Url::parse(value) {
            Ok(parsed) if parsed.has_host() => {}
            Ok(_) => {
                self.push(field, ViolationKind::Url, "url has no host".to_string());
            }
            Err(err) => {
                self.push(field, ViolationKind::Url, format!("malformed url: {err}"));
            }
        }
        self
    }

    /// Custom struct-level rule: records `message` when `ok` is false.
    pub fn check(
        &mut self,
        field: &str,
        rule: &'static str,
        ok: bool,
        message: impl Into<String>,
    ) -> &mut Self {
        if !ok {
            self.push(field, ViolationKind::Custom(rule), message.into());
        }
        self
    }

    /// Reject the first duplicate key in `items`.
    pub fn unique_by<T, K, F>(&mut self, field: &str, items: &[T], key: F) -> &mut Self
    where
        K: Eq + Hash + Display,
        F: Fn(&T) -> K,
    {
        if let Err(violation) = ensure_unique_by(items, field, key) {
            self.violations.push(violation);
        }
        self
    }

    /// Fold the result of a nested validation in, prefixing its field paths.
    pub fn nested(&mut self, prefix: &str, result: Result<(), ValidationErrors>) -> &mut Self {
        if let Err(errors) = result {
            for violation in errors.0 {
                let field = format!("{prefix}.{}", violation.field);
                self.violations
                    .push(Violation::new(field, violation.kind, violation.message));
            }
        }
        self
    }

    /// Fold another validation result in with its field paths unchanged.
    pub fn merge(&mut self, result: Result<(), ValidationErrors>) -> &mut Self {
        if let Err(errors) = result {
            self.violations.extend(errors.0);
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), ValidationErrors> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(std::mem::take(&mut self.violations)))
        }
    }
}

/// Detect duplicates in a collection by a derived key.
///
/// Stops at the first duplicate and reports its index, e.g. `values[3]`.
pub fn ensure_unique_by<T, K, F>(items: &[T], field: &str, key: F) -> Result<(), Violation>
where
    K: Eq + Hash + Display,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        let k = key(item);
        if seen.contains(&k) {
            return Err(Violation::new(
                format!("{field}[{idx}]"),
                ViolationKind::Duplicate,
                format!("duplicate value `{k}`"),
            ));
        }
        seen.insert(k);
    }
    Ok(())
}
