//! The generic record service.
//!
//! One implementation of list / fetch-one / add / update / delete,
//! parameterized over a [`RecordResource`]. Each operation is a single
//! unit of work against the connection it was constructed with; the
//! service never spans transactions across operations, retries, or
//! caches query results.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    Iterable, PrimaryKeyToColumn, QueryFilter,
};
use std::fmt;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::filter::FilterExpr;
use crate::traits::{MergeIntoActiveModel, RecordResource};

/// What a single-record operation resolves against: a bare key value,
/// or a filter expression standing in for one.
#[derive(Debug, Clone)]
pub enum Target {
    ById(Uuid),
    Matching(FilterExpr),
}

impl Target {
    fn id_string(&self) -> Option<String> {
        match self {
            Self::ById(id) => Some(id.to_string()),
            Self::Matching(_) => None,
        }
    }
}

impl From<Uuid> for Target {
    fn from(id: Uuid) -> Self {
        Self::ById(id)
    }
}

/// A record service bound to one connection and one resource type.
///
/// Construction resolves the resource's key column from the entity's
/// declared primary-key metadata and keeps it for the service's
/// lifetime; the resolved column is immutable from then on, so clones
/// handed to concurrent requests only ever read it.
pub struct RecordService<R: RecordResource> {
    db: DatabaseConnection,
    key_column: R::ColumnType,
}

impl<R: RecordResource> Clone for RecordService<R> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            key_column: self.key_column,
        }
    }
}

impl<R: RecordResource> fmt::Debug for RecordService<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordService")
            .field("resource", &R::RESOURCE_NAME_SINGULAR)
            .field("key_column", &self.key_column)
            .finish_non_exhaustive()
    }
}

impl<R: RecordResource> RecordService<R> {
    /// Builds a service over an already-connected database handle.
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if the entity declares zero or
    /// more than one primary-key column. This is checked here, once,
    /// so key-dependent operations cannot fail on key metadata at call
    /// time.
    pub fn new(db: DatabaseConnection) -> Result<Self, ServiceError> {
        let key_column = resolve_key_column::<R>()?;
        Ok(Self { db, key_column })
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// All records matching the optional filter, with each named
    /// relation eagerly attached. Enumeration order is whatever the
    /// engine returns; callers must not rely on it.
    ///
    /// # Errors
    ///
    /// `Validation` for unknown filter fields or relation names;
    /// engine failures pass through.
    pub async fn list(
        &self,
        filter: Option<&FilterExpr>,
        relations: &[String],
    ) -> Result<Vec<R>, ServiceError> {
        Self::check_relations(relations)?;
        let mut query = R::EntityType::find();
        if let Some(expr) = filter {
            query = query.filter(expr.to_condition(&R::filterable_columns())?);
        }
        let models = query.all(&self.db).await?;
        let mut records: Vec<R> = models.into_iter().map(R::from).collect();
        self.attach_relations(&mut records, relations).await?;
        Ok(records)
    }

    /// The single record matching `target`, or `NotFound`.
    ///
    /// # Errors
    ///
    /// `NotFound` when zero records match; `Validation` for unknown
    /// filter fields or relation names.
    pub async fn fetch_one(
        &self,
        target: &Target,
        relations: &[String],
    ) -> Result<R, ServiceError> {
        Self::check_relations(relations)?;
        let model = R::EntityType::find()
            .filter(self.target_condition(target)?)
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::not_found(R::RESOURCE_NAME_SINGULAR, target.id_string())
            })?;
        let mut record = R::from(model);
        self.attach_relations(std::slice::from_mut(&mut record), relations)
            .await?;
        Ok(record)
    }

    /// Inserts a new record and returns its persisted form, including
    /// server-assigned fields, with any named relations attached.
    ///
    /// # Errors
    ///
    /// `Validation` for unknown relation names; `Conflict` on
    /// unique-constraint violations; other engine failures pass
    /// through.
    pub async fn add(
        &self,
        create: R::CreateModel,
        relations: &[String],
    ) -> Result<R, ServiceError> {
        Self::check_relations(relations)?;
        let active: R::ActiveModelType = create.into();
        let model = active.insert(&self.db).await?;
        let mut record = R::from(model);
        self.attach_relations(std::slice::from_mut(&mut record), relations)
            .await?;
        Ok(record)
    }

    /// Resolves the target record, merges the payload onto it
    /// field-by-field (absent fields stay untouched), persists, and
    /// returns the updated form.
    ///
    /// # Errors
    ///
    /// `NotFound` when the target matches nothing — typed, never a
    /// panic. `Validation` when the payload nulls a required field or
    /// names an unknown relation.
    pub async fn update(
        &self,
        target: &Target,
        update: R::UpdateModel,
        relations: &[String],
    ) -> Result<R, ServiceError> {
        Self::check_relations(relations)?;
        let model = R::EntityType::find()
            .filter(self.target_condition(target)?)
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::not_found(R::RESOURCE_NAME_SINGULAR, target.id_string())
            })?;
        let existing: R::ActiveModelType = model.into_active_model();
        let merged = update.merge_into_activemodel(existing)?;
        let updated = merged.update(&self.db).await?;
        let mut record = R::from(updated);
        self.attach_relations(std::slice::from_mut(&mut record), relations)
            .await?;
        Ok(record)
    }

    /// Removes the record with the given key. A missing record is a
    /// normal outcome: `Ok(false)`, state unchanged.
    ///
    /// # Errors
    ///
    /// Engine failures pass through; absence is never an error.
    pub async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        let result = R::EntityType::delete_many()
            .filter(self.key_column.eq(id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    fn target_condition(&self, target: &Target) -> Result<Condition, ServiceError> {
        match target {
            // Identity comparison against the resolved key column is the
            // implicit filter for bare ids.
            Target::ById(id) => Ok(Condition::all().add(self.key_column.eq(*id))),
            Target::Matching(expr) => expr.to_condition(&R::filterable_columns()),
        }
    }

    fn check_relations(relations: &[String]) -> Result<(), ServiceError> {
        for name in relations {
            if !R::relation_names().contains(&name.as_str()) {
                return Err(ServiceError::validation(format!(
                    "unknown relation '{name}' for {}",
                    R::RESOURCE_NAME_SINGULAR
                )));
            }
        }
        Ok(())
    }

    async fn attach_relations(
        &self,
        records: &mut [R],
        relations: &[String],
    ) -> Result<(), ServiceError> {
        for name in relations {
            R::load_relation(&self.db, records, name).await?;
        }
        Ok(())
    }
}

fn resolve_key_column<R: RecordResource>() -> Result<R::ColumnType, ServiceError> {
    let mut keys = <R::EntityType as EntityTrait>::PrimaryKey::iter();
    let Some(key) = keys.next() else {
        return Err(ServiceError::configuration(format!(
            "{} declares no primary-key column",
            R::RESOURCE_NAME_SINGULAR
        )));
    };
    if keys.next().is_some() {
        return Err(ServiceError::configuration(format!(
            "{} declares a composite primary key; record services require exactly one key column",
            R::RESOURCE_NAME_SINGULAR
        )));
    }
    Ok(key.into_column())
}
