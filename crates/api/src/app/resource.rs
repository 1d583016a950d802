//! Generic CRUD endpoints.
//!
//! A resource supplies its record type, its store, an optional list filter and
//! an ordering; the handlers here do the rest in a fixed sequence:
//! gate, locate, parse, validate, store.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Extension, Path, Query},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;

use tillpoint_auth::{Action, ResourceKind};
use tillpoint_core::validation::NOT_A_BOOLEAN;
use tillpoint_core::{Draft, Editable, Entity, FieldErrors};
use tillpoint_infra::{list_records, InMemoryRecordStore, RecordStore};

use crate::app::dto::parse_body;
use crate::app::errors::{method_not_allowed, ApiError};
use crate::app::services::AppServices;
use crate::authz;
use crate::context::Identity;

type FieldsOf<R> = <<R as Resource>::Record as Editable>::Fields;
type IdOf<R> = <<R as Resource>::Record as Entity>::Id;

pub type QueryParams = HashMap<String, String>;

pub trait Resource: Send + Sync + 'static {
    type Record: Editable + Serialize + Clone + Send + Sync + 'static;
    type Filter: Default + Send + Sync;

    const KIND: ResourceKind;

    fn store(services: &AppServices) -> &InMemoryRecordStore<Self::Record>;

    fn parse_filter(_params: &QueryParams) -> Result<Self::Filter, FieldErrors> {
        Ok(Self::Filter::default())
    }

    fn matches(_filter: &Self::Filter, _record: &Self::Record) -> bool {
        true
    }

    fn order(a: &Self::Record, b: &Self::Record) -> Ordering;

    /// Report references to records that do not exist.
    fn check_references(
        _services: &AppServices,
        _fields: &FieldsOf<Self>,
        _errors: &mut FieldErrors,
    ) {
    }
}

/// `Invalid pk "<id>" - object does not exist.` when `id` is not in `store`.
pub fn check_exists<V>(
    errors: &mut FieldErrors,
    field: &str,
    store: &InMemoryRecordStore<V>,
    id: &V::Id,
) where
    V: Entity + Clone + Send + Sync + 'static,
{
    if !store.contains(id) {
        errors.add(field, format!("Invalid pk \"{id}\" - object does not exist."));
    }
}

/// Comma-separated ids from query parameter `name`; `None` when absent or empty.
pub fn parse_id_list<I: core::str::FromStr>(
    params: &QueryParams,
    name: &str,
    errors: &mut FieldErrors,
) -> Option<Vec<I>> {
    let raw = params.get(name)?.trim();
    if raw.is_empty() {
        return None;
    }

    let mut ids = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.parse() {
            Ok(id) => ids.push(id),
            Err(_) => errors.add(name, format!("\"{part}\" is not a valid UUID.")),
        }
    }
    Some(ids)
}

fn parse_is_active(params: &QueryParams) -> Result<Option<bool>, FieldErrors> {
    match params.get("is_active").map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(None),
        Some(v) if v.is_empty() => Ok(None),
        Some(v) if matches!(v.as_str(), "true" | "1") => Ok(Some(true)),
        Some(v) if matches!(v.as_str(), "false" | "0") => Ok(Some(false)),
        Some(_) => Err(FieldErrors::single("is_active", NOT_A_BOOLEAN)),
    }
}

/// `is_active` filter shared by every list endpoint.
pub fn active_filter(params: &QueryParams) -> Result<impl Fn(bool) -> bool + use<>, FieldErrors> {
    let wanted = parse_is_active(params)?;
    Ok(move |is_active: bool| wanted.is_none_or(|w| w == is_active))
}

fn parse_id<R: Resource>(raw: &str) -> Result<IdOf<R>, ApiError> {
    raw.parse().map_err(|_| ApiError::NotFound)
}

fn validate<R: Resource>(services: &AppServices, fields: &FieldsOf<R>) -> Result<(), ApiError> {
    let mut errors = <R::Record as Editable>::validate(fields);
    R::check_references(services, fields, &mut errors);
    Ok(errors.into_result()?)
}

pub async fn list<R: Resource>(
    Extension(services): Extension<Arc<AppServices>>,
    identity: Identity,
    Query(params): Query<QueryParams>,
) -> Result<Json<Vec<R::Record>>, ApiError> {
    authz::gate(&identity, R::KIND, Action::List)?;

    let active = active_filter(&params);
    let filter = R::parse_filter(&params);
    let (active, filter) = match (active, filter) {
        (Ok(active), Ok(filter)) => (active, filter),
        (active, filter) => {
            let mut errors = FieldErrors::new();
            if let Err(e) = active {
                errors.merge(e);
            }
            if let Err(e) = filter {
                errors.merge(e);
            }
            return Err(errors.into());
        }
    };

    let records = list_records(
        R::store(&services),
        |r: &R::Record| active(r.is_active()) && R::matches(&filter, r),
        R::order,
    )?;
    Ok(Json(records))
}

pub async fn create<R: Resource>(
    Extension(services): Extension<Arc<AppServices>>,
    identity: Identity,
    body: Bytes,
) -> Result<(StatusCode, Json<R::Record>), ApiError> {
    let principal = authz::gate(&identity, R::KIND, Action::Create)?;

    let draft: <R::Record as Editable>::Draft = parse_body(&body)?;
    let fields = draft.complete()?;
    validate::<R>(&services, &fields)?;

    let id = <IdOf<R> as Default>::default();
    let record = <R::Record as Editable>::create(id, fields, Utc::now())?;
    R::store(&services).insert(record.clone())?;

    tracing::info!(
        resource = %R::KIND,
        id = %record.id(),
        actor = %principal.user_id,
        "record created"
    );
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn retrieve<R: Resource>(
    Extension(services): Extension<Arc<AppServices>>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<R::Record>, ApiError> {
    authz::gate(&identity, R::KIND, Action::Retrieve)?;

    let id = parse_id::<R>(&id)?;
    R::store(&services)
        .get(&id)
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// Full replacement: omitted optional fields fall back to their defaults.
pub async fn update<R: Resource>(
    Extension(services): Extension<Arc<AppServices>>,
    identity: Identity,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<R::Record>, ApiError> {
    let principal = authz::gate(&identity, R::KIND, Action::Update)?;

    let id = parse_id::<R>(&id)?;
    let store = R::store(&services);
    if !store.contains(&id) {
        return Err(ApiError::NotFound);
    }

    let draft: <R::Record as Editable>::Draft = parse_body(&body)?;
    let fields = draft.complete()?;
    validate::<R>(&services, &fields)?;

    let record = store.update(&id, |record: &mut R::Record| {
        record.replace(fields, Utc::now()).map_err(ApiError::from)
    })?;

    tracing::info!(resource = %R::KIND, %id, actor = %principal.user_id, "record replaced");
    Ok(Json(record))
}

/// Partial update: only supplied fields change, then the result is validated whole.
pub async fn partial_update<R: Resource>(
    Extension(services): Extension<Arc<AppServices>>,
    identity: Identity,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<R::Record>, ApiError> {
    let principal = authz::gate(&identity, R::KIND, Action::PartialUpdate)?;

    let id = parse_id::<R>(&id)?;
    let store = R::store(&services);
    if !store.contains(&id) {
        return Err(ApiError::NotFound);
    }

    let draft: <R::Record as Editable>::Draft = parse_body(&body)?;
    let record = store.update(&id, |record: &mut R::Record| {
        let fields = draft.overlay(record.fields());
        validate::<R>(&services, &fields)?;
        record.replace(fields, Utc::now()).map_err(ApiError::from)
    })?;

    tracing::info!(resource = %R::KIND, %id, actor = %principal.user_id, "record updated");
    Ok(Json(record))
}

/// Routes for one resource. There is no delete; every other method gets 405.
pub fn crud_router<R: Resource>() -> Router {
    Router::new()
        .route(
            "/",
            get(list::<R>)
                .post(create::<R>)
                .fallback(method_not_allowed),
        )
        .route(
            "/:id",
            get(retrieve::<R>)
                .put(update::<R>)
                .patch(partial_update::<R>)
                .fallback(method_not_allowed),
        )
}
