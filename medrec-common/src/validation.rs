//! Schema validation primitives
//!
//! Input arrives as untyped JSON. A [`FieldReader`] pulls typed values out of a
//! JSON object field by field and records every problem it meets instead of
//! stopping at the first one, so a caller gets the complete list of violations
//! in a single [`ValidationError`].

use serde::Serialize;
use serde_json::{Map, Value};

/// Category of a single constraint violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Required field absent
    Missing,
    /// Field present but explicitly null
    Null,
    /// Wrong JSON primitive type
    WrongType,
    /// Numeric value outside its allowed range
    OutOfRange,
    /// String length outside its allowed bounds
    Length,
    /// Value not in the allowed set
    NotAllowed,
}

/// One violated constraint on one field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub field: String,
    pub kind: ViolationKind,
    pub message: String,
}

impl Violation {
    pub fn new(field: &str, kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            kind,
            message: message.into(),
        }
    }
}

/// Every constraint violation found while building a value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    /// True if some violation matches both field and kind
    pub fn has(&self, field: &str, kind: ViolationKind) -> bool {
        self.violations
            .iter()
            .any(|v| v.field == field && v.kind == kind)
    }
}

impl From<Violation> for ValidationError {
    fn from(violation: Violation) -> Self {
        Self {
            violations: vec![violation],
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} validation error(s)", self.violations.len())?;
        for (i, v) in self.violations.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{}{}: {}", sep, v.field, v.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Violation accumulator
#[derive(Debug, Default)]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: Violation) {
        self.0.push(violation);
    }

    pub fn push_opt(&mut self, violation: Option<Violation>) {
        if let Some(v) = violation {
            self.0.push(v);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `Ok(())` when nothing was recorded
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { violations: self.0 })
        }
    }

    pub fn into_error(self) -> ValidationError {
        ValidationError { violations: self.0 }
    }
}

/// Whether absent fields are violations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Every field read must be present and non-null
    Required,
    /// Absent fields are skipped; present ones must still be non-null
    Partial,
}

/// Typed field extraction over a JSON object, collecting violations
pub struct FieldReader<'a> {
    object: &'a Map<String, Value>,
    presence: Presence,
    violations: Violations,
}

impl<'a> FieldReader<'a> {
    /// Fails immediately only when the input is not a JSON object at all
    pub fn new(input: &'a Value, presence: Presence) -> Result<Self, ValidationError> {
        match input.as_object() {
            Some(object) => Ok(Self {
                object,
                presence,
                violations: Violations::new(),
            }),
            None => Err(Violation::new(
                "body",
                ViolationKind::WrongType,
                format!("expected a JSON object, got {}", json_type_name(input)),
            )
            .into()),
        }
    }

    fn take(&mut self, field: &str) -> Option<&'a Value> {
        match self.object.get(field) {
            None => {
                if self.presence == Presence::Required {
                    self.violations.push(Violation::new(
                        field,
                        ViolationKind::Missing,
                        "field required",
                    ));
                }
                None
            }
            Some(Value::Null) => {
                self.violations.push(Violation::new(
                    field,
                    ViolationKind::Null,
                    "field may not be null",
                ));
                None
            }
            Some(value) => Some(value),
        }
    }

    fn wrong_type(&mut self, field: &str, expected: &str, got: &Value) {
        self.violations.push(Violation::new(
            field,
            ViolationKind::WrongType,
            format!("expected {}, got {}", expected, json_type_name(got)),
        ));
    }

    pub fn string(&mut self, field: &str) -> Option<&'a str> {
        let value = self.take(field)?;
        match value.as_str() {
            Some(s) => Some(s),
            None => {
                self.wrong_type(field, "a string", value);
                None
            }
        }
    }

    /// Integers, or floats with no fractional part
    pub fn integer(&mut self, field: &str) -> Option<i64> {
        let value = self.take(field)?;
        if let Some(i) = value.as_i64() {
            return Some(i);
        }
        match value.as_f64() {
            Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => {
                Some(f as i64)
            }
            _ => {
                self.wrong_type(field, "an integer", value);
                None
            }
        }
    }

    pub fn float(&mut self, field: &str) -> Option<f64> {
        let value = self.take(field)?;
        match value.as_f64() {
            Some(f) if f.is_finite() => Some(f),
            _ => {
                self.wrong_type(field, "a number", value);
                None
            }
        }
    }

    pub fn boolean(&mut self, field: &str) -> Option<bool> {
        let value = self.take(field)?;
        match value.as_bool() {
            Some(b) => Some(b),
            None => {
                self.wrong_type(field, "a boolean", value);
                None
            }
        }
    }

    /// Run `check` on a value that was read successfully; drop it on violation
    pub fn keep<T>(
        &mut self,
        value: Option<T>,
        check: impl FnOnce(&T) -> Option<Violation>,
    ) -> Option<T> {
        let value = value?;
        match check(&value) {
            Some(violation) => {
                self.violations.push(violation);
                None
            }
            None => Some(value),
        }
    }

    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    pub fn finish(self) -> Violations {
        self.violations
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ========================================
// Constraint checks
// ========================================

/// Length in characters within `[min, max]`
pub fn check_length(field: &str, value: &str, min: usize, max: usize) -> Option<Violation> {
    let len = value.chars().count();
    if len < min || len > max {
        Some(Violation::new(
            field,
            ViolationKind::Length,
            format!(
                "length must be between {} and {} characters, got {}",
                min, max, len
            ),
        ))
    } else {
        None
    }
}

/// Integer strictly between `gt` and `lt`
pub fn check_int_between(field: &str, value: i64, gt: i64, lt: i64) -> Option<Violation> {
    if value <= gt || value >= lt {
        Some(Violation::new(
            field,
            ViolationKind::OutOfRange,
            format!("must be greater than {} and less than {}, got {}", gt, lt, value),
        ))
    } else {
        None
    }
}

/// Number strictly greater than `gt`
pub fn check_gt(field: &str, value: f64, gt: f64) -> Option<Violation> {
    if value.is_finite() && value > gt {
        None
    } else {
        Some(Violation::new(
            field,
            ViolationKind::OutOfRange,
            format!("must be greater than {}, got {}", gt, value),
        ))
    }
}

/// Number strictly less than `lt`
pub fn check_lt(field: &str, value: f64, lt: f64) -> Option<Violation> {
    if value < lt {
        None
    } else {
        Some(Violation::new(
            field,
            ViolationKind::OutOfRange,
            format!("must be less than {}, got {}", lt, value),
        ))
    }
}

pub fn check_one_of<S: AsRef<str>>(field: &str, value: &str, allowed: &[S]) -> Option<Violation> {
    if allowed.iter().any(|a| a.as_ref() == value) {
        None
    } else {
        let list: Vec<&str> = allowed.iter().map(|a| a.as_ref()).collect();
        Some(Violation::new(
            field,
            ViolationKind::NotAllowed,
            format!("'{}' is not one of [{}]", value, list.join(", ")),
        ))
    }
}
