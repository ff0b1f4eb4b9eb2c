//! `/people` CRUD endpoints
//!
//! Handlers only translate HTTP to service calls; all validation happens
//! in the record service.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use enrich_common::db::Person;
use serde_json::{json, Map, Value};

use crate::error::{ServiceError, ServiceResult};
use crate::query::params_from_pairs;
use crate::AppState;

type JsonObject = Map<String, Value>;

/// GET /people
///
/// Filters: `name`, `surname`, `patronymic`, `gender`, `nationality`
/// (substring match), `age` | `minAge` | `maxAge`; windowing via `page`
/// and `limit`. Repeated keys keep their first value.
pub async fn list_people(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ServiceResult<Json<Vec<Person>>> {
    let params = params_from_pairs(pairs);
    let people = state.service.list(&params).await?;
    Ok(Json(people))
}

/// GET /people/:id
pub async fn get_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServiceResult<Json<Person>> {
    let id = parse_id(&id)?;
    let person = state.service.get(id).await?;
    Ok(Json(person))
}

/// POST /people
///
/// Returns 201 with `{"id": n}`.
pub async fn create_person(
    State(state): State<AppState>,
    body: Result<Json<JsonObject>, JsonRejection>,
) -> ServiceResult<(StatusCode, Json<Value>)> {
    let Json(payload) = body.map_err(|e| ServiceError::InvalidBody(e.body_text()))?;
    let id = state.service.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// PUT /people/:id
pub async fn update_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<JsonObject>, JsonRejection>,
) -> ServiceResult<Json<Value>> {
    let id = parse_id(&id)?;
    let Json(payload) = body.map_err(|e| ServiceError::InvalidBody(e.body_text()))?;
    state.service.update(id, payload).await?;
    Ok(Json(json!({ "message": "Person updated" })))
}

/// DELETE /people/:id
pub async fn delete_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServiceResult<Json<Value>> {
    let id = parse_id(&id)?;
    state.service.delete(id).await?;
    Ok(Json(json!({ "message": "Person deleted" })))
}

fn parse_id(raw: &str) -> ServiceResult<i64> {
    raw.parse()
        .map_err(|_| ServiceError::InvalidId(raw.to_string()))
}
