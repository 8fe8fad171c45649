//! HTTP Basic authentication against argon2-hashed accounts.
//!
//! [`require_auth`] runs in front of the API router. On success it attaches a
//! [`Caller`] to the request so handlers can apply their role guard.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::{Request, State},
  http::HeaderMap,
  middleware::Next,
  response::Response,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use serde::Deserialize;
use shelterdesk_api::Caller;
use shelterdesk_core::{person::Role, store::ShelterStore};

use crate::{AppState, error::Error};

/// One login accepted by this server instance.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  pub role:          Role,
}

/// Every account accepted by this server instance.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
  pub accounts: Vec<Account>,
}

impl AuthConfig {
  fn account(&self, username: &str) -> Option<&Account> {
    self.accounts.iter().find(|a| a.username == username)
  }
}

/// Verify Basic credentials from `headers` and return the matching caller.
pub fn verify_auth(headers: &HeaderMap, config: &AuthConfig) -> Result<Caller, Error> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(Error::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| Error::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| Error::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(Error::Unauthorized)?;

  let account = config.account(username).ok_or(Error::Unauthorized)?;

  let parsed_hash = PasswordHash::new(&account.password_hash)
    .map_err(|_| Error::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| Error::Unauthorized)?;

  Ok(Caller::new(account.username.clone(), account.role))
}

/// Middleware: reject unauthenticated requests, otherwise attach the
/// [`Caller`] and continue.
pub async fn require_auth<S>(
  State(state): State<AppState<S>>,
  mut req: Request,
  next: Next,
) -> Result<Response, Error>
where
  S: ShelterStore + Clone + 'static,
{
  let caller = match verify_auth(req.headers(), &state.auth) {
    Ok(caller) => caller,
    Err(e) => {
      tracing::warn!(method = %req.method(), uri = %req.uri(), "authentication failed");
      return Err(e);
    }
  };
  tracing::debug!(username = %caller.username, role = ?caller.role, "authenticated");
  req.extensions_mut().insert(caller);
  Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::{HeaderValue, header};

  fn hash(password: &str) -> String {
    use argon2::{PasswordHasher, password_hash::SaltString};
    use rand_core::OsRng;
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string()
  }

  fn make_auth() -> AuthConfig {
    AuthConfig {
      accounts: vec![
        Account {
          username:      "admin".to_string(),
          password_hash: hash("secret"),
          role:          Role::Admin,
        },
        Account {
          username:      "lia".to_string(),
          password_hash: hash("hunter2"),
          role:          Role::Leader,
        },
      ],
    }
  }

  fn headers(value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    headers
  }

  fn basic(user: &str, pass: &str) -> String {
    let encoded = B64.encode(format!("{user}:{pass}"));
    format!("Basic {encoded}")
  }

  #[test]
  fn correct_credentials_yield_caller() {
    let auth = make_auth();
    let caller = verify_auth(&headers(&basic("lia", "hunter2")), &auth).unwrap();
    assert_eq!(caller, Caller::new("lia", Role::Leader));
  }

  #[test]
  fn wrong_password() {
    let auth = make_auth();
    assert!(matches!(
      verify_auth(&headers(&basic("admin", "wrong")), &auth),
      Err(Error::Unauthorized)
    ));
  }

  #[test]
  fn unknown_user() {
    let auth = make_auth();
    assert!(matches!(
      verify_auth(&headers(&basic("mallory", "secret")), &auth),
      Err(Error::Unauthorized)
    ));
  }

  #[test]
  fn missing_header() {
    let auth = make_auth();
    assert!(matches!(verify_auth(&HeaderMap::new(), &auth), Err(Error::Unauthorized)));
  }

  #[test]
  fn invalid_base64() {
    let auth = make_auth();
    assert!(matches!(
      verify_auth(&headers("Basic !!!not-base64!!!"), &auth),
      Err(Error::Unauthorized)
    ));
  }

  #[test]
  fn bearer_scheme_is_rejected() {
    let auth = make_auth();
    assert!(matches!(verify_auth(&headers("Bearer abc"), &auth), Err(Error::Unauthorized)));
  }
}
