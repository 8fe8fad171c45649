//! The authenticated caller of a request and the role guard.
//!
//! The API never authenticates anything itself. Whatever sits in front of the
//! router (the server's Basic-auth middleware, or a test layer) inserts a
//! [`Caller`] into the request extensions; handlers extract it and check it
//! with [`Caller::require`].

use axum::{extract::FromRequestParts, http::request::Parts};
use shelterdesk_core::person::Role;

use crate::error::ApiError;

/// Who is making the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
  pub username: String,
  pub role:     Role,
}

impl Caller {
  pub fn new(username: impl Into<String>, role: Role) -> Self {
    Self { username: username.into(), role }
  }

  /// Succeed if the caller holds one of `allowed`.
  pub fn require(&self, allowed: &[Role]) -> Result<(), ApiError> {
    if allowed.contains(&self.role) {
      return Ok(());
    }
    tracing::warn!(
      username = %self.username,
      role = ?self.role,
      ?allowed,
      "role guard rejected caller"
    );
    Err(ApiError::Forbidden(format!(
      "{} may not perform this operation",
      self.username
    )))
  }
}

impl<S: Send + Sync> FromRequestParts<S> for Caller {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    parts
      .extensions
      .get::<Caller>()
      .cloned()
      .ok_or(ApiError::Unauthorized)
  }
}
