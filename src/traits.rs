use async_trait::async_trait;
use sea_orm::{DatabaseConnection, IntoActiveModel, entity::prelude::*};
use uuid::Uuid;

use crate::errors::ServiceError;

/// Partial-overwrite mapping from an update payload onto an existing
/// active model.
///
/// The presence rules are the behavioral heart of updates:
/// - a field absent from the payload leaves the column untouched
///   (`NotSet`),
/// - an explicit `null` clears a nullable column (`Set(None)`) and is a
///   `Validation` error for a required one,
/// - a value overwrites (`Set`).
///
/// Update payload structs encode this with one `Option` level for
/// required fields and two (via `serde_with::rust::double_option`) for
/// nullable ones, so "omitted" and "set to null" stay distinguishable
/// after deserialization.
pub trait MergeIntoActiveModel<ActiveModelType> {
    /// # Errors
    ///
    /// Returns a `Validation` error when the payload tries to null out a
    /// required field.
    fn merge_into_activemodel(
        self,
        existing: ActiveModelType,
    ) -> Result<ActiveModelType, ServiceError>;
}

/// Ties a Sea-ORM entity to its API-facing representation and payload
/// shapes. Implementors are the API model itself; the conversions to
/// and from the persistence model are ordinary `From`/`Into` impls
/// declared once per type pair.
///
/// Record services built over this trait assume a single-column
/// `Uuid`-valued primary key, declared on the entity. That declaration
/// is the only key metadata the service consults, and it is validated
/// once at service construction.
#[async_trait]
pub trait RecordResource: Sized + Send + Sync
where
    Self::EntityType: EntityTrait<Column = Self::ColumnType> + Sync,
    Self::ActiveModelType:
        ActiveModelTrait<Entity = Self::EntityType> + ActiveModelBehavior + Send + Sync,
    <Self::EntityType as EntityTrait>::Model: Sync + IntoActiveModel<Self::ActiveModelType>,
    Self: From<<Self::EntityType as EntityTrait>::Model>,
{
    type EntityType: EntityTrait + Sync;
    type ColumnType: ColumnTrait + std::fmt::Debug + Send + Sync;
    type ActiveModelType: ActiveModelTrait<Entity = Self::EntityType>;
    /// Payload accepted on create; its `Into` impl is the
    /// external-to-internal mapping.
    type CreateModel: Into<Self::ActiveModelType> + Send;
    /// Payload accepted on update; merged field-by-field.
    type UpdateModel: Send + Sync + MergeIntoActiveModel<Self::ActiveModelType>;

    const RESOURCE_NAME_SINGULAR: &str;
    const RESOURCE_NAME_PLURAL: &str;

    /// The record's unique key value.
    fn record_id(&self) -> Uuid;

    /// Field-name to column registry that filter expressions resolve
    /// through. Fields not listed here cannot be filtered on.
    #[must_use]
    fn filterable_columns() -> Vec<(&'static str, Self::ColumnType)> {
        vec![]
    }

    /// Names of relations that may be requested via `include`.
    #[must_use]
    fn relation_names() -> &'static [&'static str] {
        &[]
    }

    /// Materializes one named relation onto a batch of already-mapped
    /// records. Invoked once per requested relation name, after the
    /// name has been checked against [`Self::relation_names`].
    async fn load_relation(
        db: &DatabaseConnection,
        records: &mut [Self],
        relation: &str,
    ) -> Result<(), ServiceError> {
        let _ = (db, records);
        Err(ServiceError::validation(format!(
            "unknown relation '{relation}' for {}",
            Self::RESOURCE_NAME_SINGULAR
        )))
    }
}
