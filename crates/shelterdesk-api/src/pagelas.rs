//! Handlers for `/pagelas` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/pagelas?person_id=<uuid>` | Oldest reference date first |
//! | `POST` | `/pagelas` | Admin, leader, or teacher. Body: [`NewPagela`] |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use shelterdesk_core::{
  pagela::{NewPagela, Pagela},
  person::Role,
  store::ShelterStore,
};
use uuid::Uuid;

use crate::{caller::Caller, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub person_id: Uuid,
}

/// `GET /pagelas?person_id=<uuid>`
pub async fn list<S: ShelterStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Pagela>>, ApiError> {
  let pagelas = store
    .list_pagelas(params.person_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(pagelas))
}

/// `POST /pagelas`
pub async fn create<S: ShelterStore>(
  State(store): State<Arc<S>>,
  caller: Caller,
  Json(body): Json<NewPagela>,
) -> Result<impl IntoResponse, ApiError> {
  caller.require(&[Role::Admin, Role::Leader, Role::Teacher])?;
  let pagela = store.record_pagela(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(pagela)))
}
