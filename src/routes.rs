//! Generic axum handlers over a [`RecordService`].
//!
//! One handler per operation, generic over the resource, plus a
//! [`router`] builder wiring them under the resource's plural name:
//!
//! ```text
//! GET    /{plural}          list, optional ?filter= and ?include=
//! POST   /{plural}          create, 201 + Location
//! GET    /{plural}/{id}     fetch one, 404 when missing
//! PUT    /{plural}/{id}     partial update, 404 when missing
//! DELETE /{plural}/{id}     204 whether present or absent
//! ```

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use hyper::HeaderMap;
use hyper::header::{HeaderValue, LOCATION};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::{IncludeParams, ListParams};
use crate::service::{RecordService, Target};
use crate::traits::RecordResource;

pub async fn get_all<R>(
    Query(params): Query<ListParams>,
    State(service): State<RecordService<R>>,
) -> Result<Json<Vec<R>>, ServiceError>
where
    R: RecordResource + Serialize,
{
    let filter = params.filter_expr()?;
    let records = service.list(filter.as_ref(), &params.includes()).await?;
    Ok(Json(records))
}

pub async fn get_one<R>(
    Query(params): Query<IncludeParams>,
    State(service): State<RecordService<R>>,
    Path(id): Path<Uuid>,
) -> Result<Json<R>, ServiceError>
where
    R: RecordResource + Serialize,
{
    let record = service
        .fetch_one(&Target::ById(id), &params.includes())
        .await?;
    Ok(Json(record))
}

pub async fn create_one<R>(
    Query(params): Query<IncludeParams>,
    State(service): State<RecordService<R>>,
    Json(payload): Json<R::CreateModel>,
) -> Result<(StatusCode, HeaderMap, Json<R>), ServiceError>
where
    R: RecordResource + Serialize,
{
    let record = service.add(payload, &params.includes()).await?;

    let mut headers = HeaderMap::new();
    let location = format!("/{}/{}", R::RESOURCE_NAME_PLURAL, record.record_id());
    if let Ok(value) = HeaderValue::try_from(location) {
        headers.insert(LOCATION, value);
    }
    Ok((StatusCode::CREATED, headers, Json(record)))
}

pub async fn update_one<R>(
    Query(params): Query<IncludeParams>,
    State(service): State<RecordService<R>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<R::UpdateModel>,
) -> Result<Json<R>, ServiceError>
where
    R: RecordResource + Serialize,
{
    let record = service
        .update(&Target::ById(id), payload, &params.includes())
        .await?;
    Ok(Json(record))
}

/// Deleting is idempotent: a missing record still answers 204.
pub async fn delete_one<R>(
    State(service): State<RecordService<R>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError>
where
    R: RecordResource,
{
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Builds a router exposing all five operations of one resource,
/// mounted under `/{RESOURCE_NAME_PLURAL}`.
pub fn router<R>(service: RecordService<R>) -> Router
where
    R: RecordResource + Serialize + 'static,
    R::CreateModel: DeserializeOwned,
    R::UpdateModel: DeserializeOwned,
{
    let collection = format!("/{}", R::RESOURCE_NAME_PLURAL);
    let item = format!("/{}/{{id}}", R::RESOURCE_NAME_PLURAL);
    Router::new()
        .route(&collection, get(get_all::<R>).post(create_one::<R>))
        .route(
            &item,
            get(get_one::<R>)
                .put(update_one::<R>)
                .delete(delete_one::<R>),
        )
        .with_state(service)
}
