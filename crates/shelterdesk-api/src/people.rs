//! Handlers for `/people` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/people` | Optional `?role=admin\|leader\|teacher\|sheltered` |
//! | `POST`  | `/people` | Admin only. Body: [`NewPerson`] |
//! | `GET`   | `/people/{id}` | 404 if not found |
//! | `PATCH` | `/people/{id}` | Admin only. Body: [`PersonUpdate`] |
//! | `POST`  | `/people/{id}/promote` | Admin only. Body: `{"kind":"leader"}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use shelterdesk_core::{
  person::{NewPerson, Person, PersonUpdate, Role},
  profile::ProfileKind,
  store::ShelterStore,
};
use uuid::Uuid;

use crate::{caller::Caller, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub role: Option<Role>,
}

/// `GET /people[?role=<role>]`
pub async fn list<S: ShelterStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Person>>, ApiError> {
  let people = store.list_people(params.role).await.map_err(ApiError::store)?;
  Ok(Json(people))
}

// ─── Register ─────────────────────────────────────────────────────────────────

/// `POST /people`
pub async fn create<S: ShelterStore>(
  State(store): State<Arc<S>>,
  caller: Caller,
  Json(body): Json<NewPerson>,
) -> Result<impl IntoResponse, ApiError> {
  caller.require(&[Role::Admin])?;
  if body.name.trim().is_empty() {
    return Err(ApiError::BadRequest("name must not be empty".into()));
  }
  let person = store.add_person(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(person)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /people/{id}`
pub async fn get_one<S: ShelterStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Person>, ApiError> {
  let person = store
    .get_person(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))?;
  Ok(Json(person))
}

// ─── Complete profile ─────────────────────────────────────────────────────────

/// `PATCH /people/{id}`
pub async fn update<S: ShelterStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  caller: Caller,
  Json(body): Json<PersonUpdate>,
) -> Result<Json<Person>, ApiError> {
  caller.require(&[Role::Admin])?;
  if body.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
    return Err(ApiError::BadRequest("name must not be empty".into()));
  }
  let person = store.update_person(id, body).await.map_err(ApiError::store)?;
  Ok(Json(person))
}

// ─── Promote ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PromoteBody {
  pub kind: ProfileKind,
}

/// `POST /people/{id}/promote` — body: `{"kind":"leader"}`
pub async fn promote<S: ShelterStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  caller: Caller,
  Json(body): Json<PromoteBody>,
) -> Result<impl IntoResponse, ApiError> {
  caller.require(&[Role::Admin])?;
  let profile = store.promote(id, body.kind).await.map_err(ApiError::store)?;
  tracing::info!(
    person_id = %id,
    profile_id = %profile.profile_id,
    kind = ?body.kind,
    "person promoted"
  );
  Ok((StatusCode::CREATED, Json(profile)))
}
