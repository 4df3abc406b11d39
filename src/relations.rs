//! Relation references on API models.
//!
//! A relation is materialized only when a request names it in its
//! `include` list; [`Related`] distinguishes "loaded" from "never
//! requested" on the wire without a wrapper object: a loaded relation
//! serializes as its value, an unloaded one as `null`.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Related<T> {
    Loaded(T),
    #[default]
    NotLoaded,
}

impl<T> PartialEq for Related<T>
where
    T: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Related::Loaded(a), Related::Loaded(b)) => a == b,
            (Related::NotLoaded, Related::NotLoaded) => true,
            _ => false,
        }
    }
}

impl<T> Related<T> {
    pub fn loaded(value: T) -> Self {
        Related::Loaded(value)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Related::Loaded(_))
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            Related::Loaded(value) => Some(value),
            Related::NotLoaded => None,
        }
    }

    pub fn set(&mut self, value: T) {
        *self = Related::Loaded(value);
    }

    pub fn map<U, F>(self, f: F) -> Related<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Related::Loaded(value) => Related::Loaded(f(value)),
            Related::NotLoaded => Related::NotLoaded,
        }
    }
}

impl<T> From<T> for Related<T> {
    fn from(value: T) -> Self {
        Related::Loaded(value)
    }
}

impl<T> FromIterator<T> for Related<Vec<T>> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Related::Loaded(iter.into_iter().collect())
    }
}

// Schema generation cannot see through the untagged enum, so relations
// advertise as a nullable reference to the inner schema.
impl<T: ToSchema> ToSchema for Related<T> {
    fn name() -> std::borrow::Cow<'static, str> {
        format!("RelatedOf{}", T::name()).into()
    }
}

// utoipa 5's `#[derive(ToSchema)]` resolves a field's schema through
// `ComposeSchema`; implementing it (rather than `PartialSchema` directly)
// lets `Related<T>` appear as a field. `PartialSchema` is then provided by
// utoipa's blanket `impl<T: ComposeSchema> PartialSchema for T`, so the
// emitted schema is unchanged: a nullable reference to the inner schema.
impl<T: ToSchema> utoipa::__dev::ComposeSchema for Related<T> {
    fn compose(
        _generics: Vec<utoipa::openapi::RefOr<utoipa::openapi::schema::Schema>>,
    ) -> utoipa::openapi::RefOr<utoipa::openapi::schema::Schema> {
        use utoipa::openapi::schema::{AllOfBuilder, Schema};

        utoipa::openapi::RefOr::T(Schema::AllOf(
            AllOfBuilder::new()
                .item(T::schema())
                .build(),
        ))
    }
}
