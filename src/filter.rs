//! Composable filter expressions.
//!
//! Callers select records through a closed set of combinators rather
//! than arbitrary predicate code: an expression is either a field
//! comparison (`eq`, `range`) or a boolean composite (`and`, `or`) of
//! further expressions. The HTTP layer accepts the same shape as a
//! JSON-encoded `filter` query parameter:
//!
//! ```json
//! {"and": [
//!     {"eq": {"field": "hero_type", "value": 2}},
//!     {"range": {"field": "age", "min": 18}}
//! ]}
//! ```
//!
//! Field names are resolved through the resource's declared
//! filterable-column registry; an unknown name is rejected, never
//! guessed at.

use sea_orm::{ColumnTrait, Condition};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::ServiceError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FilterExpr {
    /// Exact equality against one column.
    Eq {
        field: String,
        #[schema(value_type = Object)]
        value: serde_json::Value,
    },
    /// Inclusive range over one column; either bound may be omitted,
    /// but not both.
    Range {
        field: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        #[schema(value_type = Option<Object>)]
        min: Option<serde_json::Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        #[schema(value_type = Option<Object>)]
        max: Option<serde_json::Value>,
    },
    /// All sub-expressions must hold.
    And(Vec<FilterExpr>),
    /// At least one sub-expression must hold.
    Or(Vec<FilterExpr>),
}

impl FilterExpr {
    /// Parses a JSON-encoded filter expression, as received on the wire.
    ///
    /// # Errors
    ///
    /// Returns a `Validation` error if the string is not a well-formed
    /// expression.
    pub fn parse(raw: &str) -> Result<Self, ServiceError> {
        serde_json::from_str(raw)
            .map_err(|err| ServiceError::validation(format!("malformed filter: {err}")))
    }

    /// Translates this expression into a Sea-ORM [`Condition`],
    /// resolving field names through `columns`.
    ///
    /// # Errors
    ///
    /// Returns a `Validation` error for unknown field names, non-scalar
    /// comparison values, or a `range` with neither bound.
    pub fn to_condition<C: ColumnTrait>(
        &self,
        columns: &[(&str, C)],
    ) -> Result<Condition, ServiceError> {
        match self {
            Self::Eq { field, value } => {
                let column = lookup_column(columns, field)?;
                Ok(Condition::all().add(column.eq(scalar_value(field, value)?)))
            }
            Self::Range { field, min, max } => {
                let column = lookup_column(columns, field)?;
                if min.is_none() && max.is_none() {
                    return Err(ServiceError::validation(format!(
                        "range filter on '{field}' requires at least one bound"
                    )));
                }
                let mut condition = Condition::all();
                if let Some(lower) = min {
                    condition = condition.add(column.gte(scalar_value(field, lower)?));
                }
                if let Some(upper) = max {
                    condition = condition.add(column.lte(scalar_value(field, upper)?));
                }
                Ok(condition)
            }
            Self::And(parts) => {
                let mut condition = Condition::all();
                for part in parts {
                    condition = condition.add(part.to_condition(columns)?);
                }
                Ok(condition)
            }
            Self::Or(parts) => {
                let mut condition = Condition::any();
                for part in parts {
                    condition = condition.add(part.to_condition(columns)?);
                }
                Ok(condition)
            }
        }
    }
}

fn lookup_column<C: ColumnTrait>(columns: &[(&str, C)], field: &str) -> Result<C, ServiceError> {
    columns
        .iter()
        .find(|(name, _)| *name == field)
        .map(|&(_, column)| column)
        .ok_or_else(|| ServiceError::validation(format!("unknown filter field '{field}'")))
}

/// Converts a JSON scalar into a database value. UUID-shaped strings
/// become UUIDs so key columns compare correctly.
fn scalar_value(field: &str, value: &serde_json::Value) -> Result<sea_orm::Value, ServiceError> {
    match value {
        serde_json::Value::String(s) => Ok(match Uuid::parse_str(s) {
            Ok(uuid) => uuid.into(),
            Err(_) => s.clone().into(),
        }),
        serde_json::Value::Bool(b) => Ok((*b).into()),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i.into())
            } else if let Some(f) = n.as_f64() {
                Ok(f.into())
            } else {
                Err(ServiceError::validation(format!(
                    "unsupported numeric filter value for '{field}'"
                )))
            }
        }
        _ => Err(ServiceError::validation(format!(
            "filter value for '{field}' must be a scalar"
        ))),
    }
}
