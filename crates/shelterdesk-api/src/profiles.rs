//! Handlers for `/profiles` endpoints, including the three shelter
//! assignment operations.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/profiles` | Optional `?kind=leader\|teacher&shelter_id=<uuid>` |
//! | `GET`  | `/profiles/{id}` | 404 if not found |
//! | `POST` | `/profiles/{id}/assign-shelter` | Body: `{"shelter_id":…, "force":false}` |
//! | `POST` | `/profiles/{id}/unassign-shelter` | Body: `{"shelter_id":…}` |
//! | `POST` | `/profiles/{id}/move-shelter` | Body: `{"shelter_id":…, "to_profile_id":…}` |
//!
//! The assignment endpoints are admin only and return the updated profile(s)
//! together with the shelter as it now stands.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use serde::Deserialize;
use shelterdesk_core::{
  assignment::{AssignRequest, Linkage, MoveRequest, Reassignment, UnassignRequest},
  person::Role,
  profile::{Profile, ProfileKind},
  store::ShelterStore,
};
use uuid::Uuid;

use crate::{caller::Caller, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub kind:       Option<ProfileKind>,
  pub shelter_id: Option<Uuid>,
}

/// `GET /profiles[?kind=<kind>][&shelter_id=<uuid>]`
pub async fn list<S: ShelterStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Profile>>, ApiError> {
  let profiles = store
    .list_profiles(params.kind, params.shelter_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(profiles))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /profiles/{id}`
pub async fn get_one<S: ShelterStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Profile>, ApiError> {
  let profile = store
    .get_profile(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("profile {id} not found")))?;
  Ok(Json(profile))
}

// ─── Assign ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AssignBody {
  pub shelter_id: Uuid,
  #[serde(default)]
  pub force:      bool,
}

/// `POST /profiles/{id}/assign-shelter`
pub async fn assign<S: ShelterStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  caller: Caller,
  Json(body): Json<AssignBody>,
) -> Result<Json<Linkage>, ApiError> {
  caller.require(&[Role::Admin])?;
  let req = AssignRequest { profile_id: id, shelter_id: body.shelter_id, force: body.force };
  let linkage = store.assign_shelter(req).await.map_err(ApiError::store)?;
  tracing::info!(
    profile_id = %id,
    shelter_id = %body.shelter_id,
    force = body.force,
    by = %caller.username,
    "shelter assigned"
  );
  Ok(Json(linkage))
}

// ─── Unassign ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UnassignBody {
  pub shelter_id: Uuid,
}

/// `POST /profiles/{id}/unassign-shelter`
pub async fn unassign<S: ShelterStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  caller: Caller,
  Json(body): Json<UnassignBody>,
) -> Result<Json<Linkage>, ApiError> {
  caller.require(&[Role::Admin])?;
  let req = UnassignRequest { profile_id: id, shelter_id: body.shelter_id };
  let linkage = store.unassign_shelter(req).await.map_err(ApiError::store)?;
  tracing::info!(
    profile_id = %id,
    shelter_id = %body.shelter_id,
    by = %caller.username,
    "shelter unassigned"
  );
  Ok(Json(linkage))
}

// ─── Move ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MoveBody {
  pub shelter_id:    Uuid,
  pub to_profile_id: Uuid,
}

/// `POST /profiles/{id}/move-shelter` — `{id}` is the source profile.
pub async fn move_shelter<S: ShelterStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  caller: Caller,
  Json(body): Json<MoveBody>,
) -> Result<Json<Reassignment>, ApiError> {
  caller.require(&[Role::Admin])?;
  let req = MoveRequest {
    from_profile_id: id,
    shelter_id:      body.shelter_id,
    to_profile_id:   body.to_profile_id,
  };
  let moved = store.move_shelter(req).await.map_err(ApiError::store)?;
  tracing::info!(
    from_profile_id = %id,
    to_profile_id = %body.to_profile_id,
    shelter_id = %body.shelter_id,
    by = %caller.username,
    "shelter moved"
  );
  Ok(Json(moved))
}
