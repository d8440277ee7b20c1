// database/patch.rs - typed, whitelisted sparse updates
//
// An EntitySchema names which input fields may reach which column and how the
// raw JSON is coerced. Anything not in the schema is dropped before SQL is built.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use sqlx::{postgres::PgArguments, query::Query, types::BigDecimal, Postgres};
use std::str::FromStr;
use thiserror::Error;

use crate::auth::validation::validate_email_format;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PatchError {
    #[error("no updatable fields supplied")]
    Empty,

    #[error("patch input must be a JSON object")]
    NotAnObject,

    #[error("field '{field}' must be {expected}")]
    InvalidValue { field: String, expected: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    /// Text, trimmed, lower-cased and checked for a plausible address
    Email,
    Integer,
    /// NUMERIC column carrying an amount of money
    Money,
    Boolean,
    /// `YYYY-MM-DD`; a full ISO timestamp is truncated to its date part
    Date,
    /// Text restricted to a closed set of values
    OneOf(&'static [&'static str]),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PatchValue {
    /// NULL, remembering the column type so it binds with the right SQL type
    Null(FieldType),
    Text(String),
    Integer(i32),
    Money(BigDecimal),
    Boolean(bool),
    Date(NaiveDate),
}

impl PatchValue {
    pub fn is_null(&self) -> bool {
        matches!(self, PatchValue::Null(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PatchValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i32> {
        match self {
            PatchValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_money(&self) -> Option<&BigDecimal> {
        match self {
            PatchValue::Money(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PatchValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            PatchValue::Date(d) => Some(*d),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Key expected in the request body
    pub input: &'static str,
    /// Database column it writes
    pub column: &'static str,
    pub ty: FieldType,
    pub updatable: bool,
    pub nullable: bool,
}

impl FieldSpec {
    pub const fn new(input: &'static str, column: &'static str, ty: FieldType) -> Self {
        Self {
            input,
            column,
            ty,
            updatable: true,
            nullable: true,
        }
    }

    pub const fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub const fn read_only(mut self) -> Self {
        self.updatable = false;
        self
    }

    /// Coerce a raw JSON value into this field's typed value
    pub fn coerce(&self, value: &Value) -> Result<PatchValue, PatchError> {
        let invalid = |expected: &'static str| PatchError::InvalidValue {
            field: self.input.to_string(),
            expected,
        };

        if value.is_null() {
            return if self.nullable {
                Ok(PatchValue::Null(self.ty))
            } else {
                Err(invalid("non-null"))
            };
        }

        match self.ty {
            FieldType::Text => match value {
                Value::String(s) => Ok(PatchValue::Text(s.trim().to_string())),
                Value::Number(n) => Ok(PatchValue::Text(n.to_string())),
                _ => Err(invalid("a string")),
            },
            FieldType::Email => match value {
                Value::String(s) => {
                    let email = s.trim().to_lowercase();
                    validate_email_format(&email)
                        .map(|_| PatchValue::Text(email))
                        .map_err(|_| invalid("a valid email address"))
                }
                _ => Err(invalid("a valid email address")),
            },
            FieldType::Integer => {
                let parsed = match value {
                    Value::Number(n) => n.as_i64(),
                    Value::String(s) => s.trim().parse::<i64>().ok(),
                    _ => None,
                };
                parsed
                    .and_then(|i| i32::try_from(i).ok())
                    .map(PatchValue::Integer)
                    .ok_or_else(|| invalid("an integer"))
            }
            FieldType::Money => {
                let parsed = match value {
                    Value::Number(n) => BigDecimal::from_str(&n.to_string()).ok(),
                    Value::String(s) => BigDecimal::from_str(s.trim()).ok(),
                    _ => None,
                };
                parsed.map(PatchValue::Money).ok_or_else(|| invalid("a number"))
            }
            FieldType::Boolean => match value {
                Value::Bool(b) => Ok(PatchValue::Boolean(*b)),
                Value::String(s) if s == "true" => Ok(PatchValue::Boolean(true)),
                Value::String(s) if s == "false" => Ok(PatchValue::Boolean(false)),
                _ => Err(invalid("a boolean")),
            },
            FieldType::Date => match value {
                Value::String(s) if s.trim().is_empty() && self.nullable => Ok(PatchValue::Null(self.ty)),
                Value::String(s) => parse_date(s.trim())
                    .map(PatchValue::Date)
                    .ok_or_else(|| invalid("a date (YYYY-MM-DD)")),
                _ => Err(invalid("a date (YYYY-MM-DD)")),
            },
            FieldType::OneOf(allowed) => match value {
                Value::String(s) if allowed.iter().any(|a| *a == s.as_str()) => Ok(PatchValue::Text(s.clone())),
                _ => Err(invalid("one of the allowed values")),
            },
        }
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    // "2025-03-01T10:00:00Z" and "2025-03-01 10:00:00"
    match s.as_bytes().get(10) {
        Some(b'T') | Some(b' ') => NaiveDate::parse_from_str(&s[..10], "%Y-%m-%d").ok(),
        _ => None,
    }
}

/// Whitelist of the fields an entity exposes to sparse updates
#[derive(Debug)]
pub struct EntitySchema {
    pub entity: &'static str,
    pub fields: &'static [FieldSpec],
}

impl EntitySchema {
    pub fn field(&self, input: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.input == input)
    }

    /// Coerce one named input field, or `None` when the body does not carry it
    pub fn coerce_present(&self, input: &Map<String, Value>, name: &str) -> Result<Option<PatchValue>, PatchError> {
        match (self.field(name), input.get(name)) {
            (Some(spec), Some(value)) => spec.coerce(value).map(Some),
            _ => Ok(None),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: &'static str,
    pub value: PatchValue,
}

/// Validated sparse update; never empty
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    assignments: Vec<Assignment>,
}

impl Patch {
    /// Keep only the updatable fields the schema knows about, in schema order
    pub fn from_input(schema: &EntitySchema, input: &Value) -> Result<Self, PatchError> {
        let object = input.as_object().ok_or(PatchError::NotAnObject)?;

        let mut assignments = Vec::new();
        for spec in schema.fields.iter().filter(|f| f.updatable) {
            if let Some(raw) = object.get(spec.input) {
                assignments.push(Assignment {
                    column: spec.column,
                    value: spec.coerce(raw)?,
                });
            }
        }

        if assignments.is_empty() {
            return Err(PatchError::Empty);
        }

        Ok(Self { assignments })
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn get(&self, column: &str) -> Option<&PatchValue> {
        self.assignments.iter().find(|a| a.column == column).map(|a| &a.value)
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// `UPDATE <table> SET a = $1, b = $2, updated_at = NOW() WHERE <key> = $3 RETURNING <key>`
    ///
    /// `table` must already be a quoted, trusted identifier; column names come from the schema.
    pub fn update_sql(&self, table: &str, key_column: &str) -> String {
        let sets: Vec<String> = self
            .assignments
            .iter()
            .enumerate()
            .map(|(i, a)| format!("{} = ${}", a.column, i + 1))
            .collect();

        format!(
            "UPDATE {} SET {}, updated_at = NOW() WHERE {} = ${} RETURNING {}",
            table,
            sets.join(", "),
            key_column,
            self.assignments.len() + 1,
            key_column
        )
    }

    /// Bind every assignment value in order
    pub fn bind<'q>(&self, mut q: Query<'q, Postgres, PgArguments>) -> Query<'q, Postgres, PgArguments> {
        for assignment in &self.assignments {
            q = bind_value(q, &assignment.value);
        }
        q
    }
}

fn bind_value<'q>(q: Query<'q, Postgres, PgArguments>, value: &PatchValue) -> Query<'q, Postgres, PgArguments> {
    match value {
        PatchValue::Null(ty) => match ty {
            FieldType::Text | FieldType::Email | FieldType::OneOf(_) => q.bind(Option::<String>::None),
            FieldType::Integer => q.bind(Option::<i32>::None),
            FieldType::Money => q.bind(Option::<BigDecimal>::None),
            FieldType::Boolean => q.bind(Option::<bool>::None),
            FieldType::Date => q.bind(Option::<NaiveDate>::None),
        },
        PatchValue::Text(s) => q.bind(s.clone()),
        PatchValue::Integer(i) => q.bind(*i),
        PatchValue::Money(m) => q.bind(m.clone()),
        PatchValue::Boolean(b) => q.bind(*b),
        PatchValue::Date(d) => q.bind(*d),
    }
}
