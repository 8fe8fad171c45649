//! Handlers for `/shelters` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/shelters` | Every shelter with its linked profiles |
//! | `POST`   | `/shelters` | Admin only. Body: [`NewShelter`] |
//! | `GET`    | `/shelters/{id}` | 404 if not found |
//! | `PATCH`  | `/shelters/{id}` | Admin only. Body: [`ShelterUpdate`] |
//! | `DELETE` | `/shelters/{id}` | Admin only. Clears every link first |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use shelterdesk_core::{
  person::Role,
  shelter::{NewShelter, ShelterUpdate, ShelterView},
  store::ShelterStore,
};
use uuid::Uuid;

use crate::{caller::Caller, error::ApiError};

/// `GET /shelters`
pub async fn list<S: ShelterStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<ShelterView>>, ApiError> {
  let shelters = store.list_shelters().await.map_err(ApiError::store)?;
  Ok(Json(shelters))
}

/// `POST /shelters`
pub async fn create<S: ShelterStore>(
  State(store): State<Arc<S>>,
  caller: Caller,
  Json(body): Json<NewShelter>,
) -> Result<impl IntoResponse, ApiError> {
  caller.require(&[Role::Admin])?;
  if body.name.trim().is_empty() {
    return Err(ApiError::BadRequest("name must not be empty".into()));
  }
  let shelter = store.add_shelter(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(shelter)))
}

/// `GET /shelters/{id}`
pub async fn get_one<S: ShelterStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ShelterView>, ApiError> {
  let view = store
    .get_shelter(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("shelter {id} not found")))?;
  Ok(Json(view))
}

/// `PATCH /shelters/{id}`
pub async fn update<S: ShelterStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  caller: Caller,
  Json(body): Json<ShelterUpdate>,
) -> Result<Json<ShelterView>, ApiError> {
  caller.require(&[Role::Admin])?;
  if body.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
    return Err(ApiError::BadRequest("name must not be empty".into()));
  }
  let view = store.update_shelter(id, body).await.map_err(ApiError::store)?;
  Ok(Json(view))
}

/// `DELETE /shelters/{id}`
pub async fn delete<S: ShelterStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  caller: Caller,
) -> Result<StatusCode, ApiError> {
  caller.require(&[Role::Admin])?;
  store.delete_shelter(id).await.map_err(ApiError::store)?;
  tracing::info!(shelter_id = %id, by = %caller.username, "shelter deleted");
  Ok(StatusCode::NO_CONTENT)
}
