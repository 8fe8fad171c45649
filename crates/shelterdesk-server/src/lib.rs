//! HTTP front end for shelterdesk.
//!
//! Mounts the JSON API from `shelterdesk-api` under `/api` behind HTTP Basic
//! authentication, adds request tracing, and serves an unauthenticated
//! `/health` probe.

pub mod auth;
pub mod error;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, middleware, routing::get};
use serde::Deserialize;
use shelterdesk_core::store::ShelterStore;
use tower_http::trace::TraceLayer;

use auth::{Account, AuthConfig, require_auth};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `SHELTERDESK_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  #[serde(default)]
  pub accounts:   Vec<Account>,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state for the authentication layer.
#[derive(Clone)]
pub struct AppState<S: ShelterStore> {
  pub store: Arc<S>,
  pub auth:  Arc<AuthConfig>,
}

impl<S: ShelterStore> AppState<S> {
  pub fn new(store: S, config: &ServerConfig) -> Self {
    Self {
      store: Arc::new(store),
      auth:  Arc::new(AuthConfig { accounts: config.accounts.clone() }),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full server [`Router`].
pub fn router<S>(state: AppState<S>) -> Router
where
  S: ShelterStore + Clone + 'static,
{
  let api = shelterdesk_api::api_router(state.store.clone())
    .layer(middleware::from_fn_with_state(state, require_auth::<S>));

  Router::new()
    .route("/health", get(health))
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str { "ok" }

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use rand_core::OsRng;
  use shelterdesk_core::person::Role;
  use shelterdesk_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  fn account(username: &str, password: &str, role: Role) -> Account {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();
    Account { username: username.to_string(), password_hash: hash, role }
  }

  async fn make_state() -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let config = ServerConfig {
      host:       "127.0.0.1".to_string(),
      port:       8080,
      store_path: PathBuf::from(":memory:"),
      accounts:   vec![
        account("admin", "secret", Role::Admin),
        account("lia", "hunter2", Role::Leader),
      ],
    };
    AppState::new(store, &config)
  }

  fn auth_header(user: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{pass}")))
  }

  async fn oneshot_raw(
    state:  AppState<SqliteStore>,
    method: &str,
    uri:    &str,
    auth:   Option<&str>,
    body:   &str,
  ) -> axum::response::Response {
    let mut builder = Request::builder()
      .method(method)
      .uri(uri)
      .header(header::CONTENT_TYPE, "application/json");
    if let Some(auth) = auth {
      builder = builder.header(header::AUTHORIZATION, auth);
    }
    let req = builder.body(Body::from(body.to_string())).unwrap();
    router(state).oneshot(req).await.unwrap()
  }

  #[tokio::test]
  async fn health_needs_no_credentials() {
    let state = make_state().await;
    let resp = oneshot_raw(state, "GET", "/health", None, "").await;
    assert_eq!(resp.status(), StatusCode::OK);
  }

  #[tokio::test]
  async fn api_without_credentials_is_401_with_challenge() {
    let state = make_state().await;
    let resp = oneshot_raw(state, "GET", "/api/people", None, "").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let challenge = resp.headers().get(header::WWW_AUTHENTICATE).unwrap();
    assert!(challenge.to_str().unwrap().starts_with("Basic"));
  }

  #[tokio::test]
  async fn wrong_password_is_401() {
    let state = make_state().await;
    let auth = auth_header("admin", "nope");
    let resp = oneshot_raw(state, "GET", "/api/people", Some(&auth), "").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn role_guard_applies_to_authenticated_callers() {
    let state = make_state().await;
    let body = r#"{"name":"Ana","role":"sheltered"}"#;

    let auth = auth_header("lia", "hunter2");
    let resp = oneshot_raw(state.clone(), "POST", "/api/people", Some(&auth), body).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let auth = auth_header("admin", "secret");
    let resp = oneshot_raw(state.clone(), "POST", "/api/people", Some(&auth), body).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let auth = auth_header("lia", "hunter2");
    let resp = oneshot_raw(state, "GET", "/api/people", Some(&auth), "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let people: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(people.as_array().unwrap().len(), 1);
  }
}
