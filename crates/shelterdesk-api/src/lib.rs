//! JSON REST API for shelterdesk.
//!
//! Exposes an axum [`Router`] backed by any [`ShelterStore`]. Authentication,
//! TLS, and transport concerns are the caller's responsibility: the router
//! expects a [`Caller`] in each request's extensions, and every write endpoint
//! answers 401 without one.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", shelterdesk_api::api_router(store.clone()))
//! ```

pub mod caller;
pub mod error;
pub mod pagelas;
pub mod people;
pub mod profiles;
pub mod shelters;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use shelterdesk_core::store::ShelterStore;

pub use caller::Caller;
pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ShelterStore + 'static,
{
  Router::new()
    // People
    .route("/people", get(people::list::<S>).post(people::create::<S>))
    .route("/people/{id}", get(people::get_one::<S>).patch(people::update::<S>))
    .route("/people/{id}/promote", post(people::promote::<S>))
    // Profiles
    .route("/profiles", get(profiles::list::<S>))
    .route("/profiles/{id}", get(profiles::get_one::<S>))
    .route("/profiles/{id}/assign-shelter", post(profiles::assign::<S>))
    .route("/profiles/{id}/unassign-shelter", post(profiles::unassign::<S>))
    .route("/profiles/{id}/move-shelter", post(profiles::move_shelter::<S>))
    // Shelters
    .route("/shelters", get(shelters::list::<S>).post(shelters::create::<S>))
    .route(
      "/shelters/{id}",
      get(shelters::get_one::<S>)
        .patch(shelters::update::<S>)
        .delete(shelters::delete::<S>),
    )
    // Pagelas
    .route("/pagelas", get(pagelas::list::<S>).post(pagelas::create::<S>))
    .with_state(store)
}

// ─── Router tests ─────────────────────────────────────────────────────────────
