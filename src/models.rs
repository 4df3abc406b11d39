use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::errors::ServiceError;
use crate::filter::FilterExpr;

/// Query parameters accepted when listing records.
///
/// # Filtering
/// The `filter` parameter is a JSON-encoded filter expression built
/// from `eq`, `range`, `and`, and `or` combinators:
/// ```json
/// {"eq": {"field": "name", "value": "Eraserhead"}}
/// ```
/// ```json
/// {"and": [
///     {"eq": {"field": "hero_type", "value": 2}},
///     {"range": {"field": "age", "min": 18}}
/// ]}
/// ```
///
/// # Relations
/// The `include` parameter is a comma-separated list of relation names
/// to eager-load, for example `include=agency`.
#[derive(Deserialize, IntoParams, ToSchema, Default)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// JSON-encoded filter expression selecting which records to return.
    #[param(example = json!({"eq": {"field": "name", "value": "Eraserhead"}}))]
    pub filter: Option<String>,
    /// Comma-separated relation names to eager-load.
    #[param(example = "agency")]
    pub include: Option<String>,
}

impl ListParams {
    /// # Errors
    ///
    /// `Validation` if `filter` is present but not a well-formed
    /// expression.
    pub fn filter_expr(&self) -> Result<Option<FilterExpr>, ServiceError> {
        self.filter.as_deref().map(FilterExpr::parse).transpose()
    }

    #[must_use]
    pub fn includes(&self) -> Vec<String> {
        parse_includes(self.include.as_deref())
    }
}

/// Query parameters accepted by single-record endpoints.
#[derive(Deserialize, IntoParams, ToSchema, Default)]
#[into_params(parameter_in = Query)]
pub struct IncludeParams {
    /// Comma-separated relation names to eager-load.
    #[param(example = "agency")]
    pub include: Option<String>,
}

impl IncludeParams {
    #[must_use]
    pub fn includes(&self) -> Vec<String> {
        parse_includes(self.include.as_deref())
    }
}

fn parse_includes(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(ToString::to_string)
            .collect()
    })
    .unwrap_or_default()
}
