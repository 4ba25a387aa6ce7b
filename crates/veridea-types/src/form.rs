//! Per-post detailed review forms.
//!
//! Posts declare the structure of the detailed review they are paying for as
//! a closed tagged union of field kinds with a typed value per variant —
//! not an open dictionary. The admission gate validates a submission's
//! responses against the post's form before any settlement step runs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Result, VerideaError};

/// The kind of a review-form field, with per-kind constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Free text up to `max_len` characters.
    Text { max_len: usize },
    /// A decimal answer, optionally bounded.
    Number {
        min: Option<Decimal>,
        max: Option<Decimal>,
    },
    /// One choice out of a fixed option list.
    Select { options: Vec<String> },
    /// An integer score from 1 to `max`.
    Rating { max: u8 },
    /// Yes / no.
    Boolean,
}

impl FieldKind {
    /// Short tag used in error messages.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Number { .. } => "number",
            Self::Select { .. } => "select",
            Self::Rating { .. } => "rating",
            Self::Boolean => "boolean",
        }
    }
}

/// One field of a post's review form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Stable key responses refer to. Unique within a form.
    pub name: String,
    /// Human-readable label. Not interpreted by the core.
    pub label: String,
    pub required: bool,
    pub kind: FieldKind,
}

/// A typed answer to a single form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Number(Decimal),
    Select(String),
    Rating(u8),
    Boolean(bool),
}

impl FieldValue {
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Number(_) => "number",
            Self::Select(_) => "select",
            Self::Rating(_) => "rating",
            Self::Boolean(_) => "boolean",
        }
    }
}

/// A validator's answer to one field, keyed by the field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldResponse {
    pub field: String,
    pub value: FieldValue,
}

impl FieldSpec {
    /// Check a value against this field's kind and constraints.
    ///
    /// # Errors
    /// Returns [`VerideaError::InvalidResponse`] on kind mismatch or a
    /// violated constraint.
    pub fn accepts(&self, value: &FieldValue) -> Result<()> {
        let mismatch = || VerideaError::InvalidResponse {
            reason: format!(
                "field '{}' expects {}, got {}",
                self.name,
                self.kind.tag(),
                value.tag()
            ),
        };
        match (&self.kind, value) {
            (FieldKind::Text { max_len }, FieldValue::Text(s)) => {
                if s.chars().count() > *max_len {
                    return Err(VerideaError::InvalidResponse {
                        reason: format!("field '{}' exceeds {max_len} characters", self.name),
                    });
                }
                Ok(())
            }
            (FieldKind::Number { min, max }, FieldValue::Number(n)) => {
                if min.is_some_and(|lo| *n < lo) || max.is_some_and(|hi| *n > hi) {
                    return Err(VerideaError::InvalidResponse {
                        reason: format!("field '{}' value {n} out of range", self.name),
                    });
                }
                Ok(())
            }
            (FieldKind::Select { options }, FieldValue::Select(choice)) => {
                if !options.contains(choice) {
                    return Err(VerideaError::InvalidResponse {
                        reason: format!("field '{}': unknown choice '{choice}'", self.name),
                    });
                }
                Ok(())
            }
            (FieldKind::Rating { max }, FieldValue::Rating(score)) => {
                if *score == 0 || score > max {
                    return Err(VerideaError::InvalidResponse {
                        reason: format!(
                            "field '{}': rating {score} outside 1..={max}",
                            self.name
                        ),
                    });
                }
                Ok(())
            }
            (FieldKind::Boolean, FieldValue::Boolean(_)) => Ok(()),
            _ => Err(mismatch()),
        }
    }
}

/// Validate a full response set against a form.
///
/// Every required field must be answered, every response must reference a
/// known field with a matching kind, and no field may be answered twice.
///
/// # Errors
/// Returns [`VerideaError::InvalidResponse`] describing the first violation.
pub fn validate_responses(form: &[FieldSpec], responses: &[FieldResponse]) -> Result<()> {
    let mut answered: Vec<&str> = Vec::with_capacity(responses.len());
    for response in responses {
        let Some(spec) = form.iter().find(|s| s.name == response.field) else {
            return Err(VerideaError::InvalidResponse {
                reason: format!("unknown field '{}'", response.field),
            });
        };
        if answered.contains(&response.field.as_str()) {
            return Err(VerideaError::InvalidResponse {
                reason: format!("field '{}' answered twice", response.field),
            });
        }
        spec.accepts(&response.value)?;
        answered.push(&response.field);
    }
    for spec in form {
        if spec.required && !answered.contains(&spec.name.as_str()) {
            return Err(VerideaError::InvalidResponse {
                reason: format!("required field '{}' not answered", spec.name),
            });
        }
    }
    Ok(())
}
