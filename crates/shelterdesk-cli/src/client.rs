//! Async HTTP client wrapping the shelterdesk JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, RequestBuilder};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::json;
use shelterdesk_core::{
  assignment::{AssignRequest, Linkage, MoveRequest, Reassignment, UnassignRequest},
  pagela::{NewPagela, Pagela},
  person::{NewPerson, Person, PersonUpdate, Role},
  profile::{Profile, ProfileKind},
  shelter::{NewShelter, Shelter, ShelterView},
};
use uuid::Uuid;

/// Connection settings for the shelterdesk API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub username: String,
  pub password: String,
}

/// Async HTTP client for the shelterdesk JSON REST API.
///
/// Credentials travel with every request; nothing is cached between calls.
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    if self.config.username.is_empty() {
      req
    } else {
      req.basic_auth(&self.config.username, Some(&self.config.password))
    }
  }

  /// Send `req` and decode a JSON body, turning non-2xx answers into errors
  /// carrying the server's `{"error": …}` message.
  async fn send<T: DeserializeOwned>(&self, req: RequestBuilder, label: &str) -> Result<T> {
    tracing::debug!(request = label, "sending");
    let resp = self
      .auth(req)
      .send()
      .await
      .with_context(|| format!("{label} failed"))?;

    let status = resp.status();
    if !status.is_success() {
      let message = resp
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|v| v["error"].as_str().map(str::to_owned))
        .unwrap_or_default();
      return Err(anyhow!("{label} → {status}: {message}"));
    }
    resp.json().await.with_context(|| format!("deserialising {label}"))
  }

  async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
    let req = self.client.get(self.url(path)).query(query);
    self.send(req, &format!("GET {path}")).await
  }

  async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
    let req = self.client.post(self.url(path)).json(body);
    self.send(req, &format!("POST {path}")).await
  }

  // ── People ────────────────────────────────────────────────────────────────

  /// `GET /api/people[?role=<role>]`
  pub async fn list_people(&self, role: Option<Role>) -> Result<Vec<Person>> {
    let query: Vec<_> = role
      .map(|r| ("role", r.to_string()))
      .into_iter()
      .collect();
    self.get("/people", &query).await
  }

  /// `POST /api/people`
  pub async fn register(&self, person: &NewPerson) -> Result<Person> {
    self.post("/people", person).await
  }

  /// `PATCH /api/people/{id}`
  pub async fn update_person(&self, id: Uuid, update: &PersonUpdate) -> Result<Person> {
    let path = format!("/people/{id}");
    let req = self.client.patch(self.url(&path)).json(update);
    self.send(req, &format!("PATCH {path}")).await
  }

  /// `POST /api/people/{id}/promote`
  pub async fn promote(&self, person_id: Uuid, kind: ProfileKind) -> Result<Profile> {
    self
      .post(&format!("/people/{person_id}/promote"), &json!({ "kind": kind }))
      .await
  }

  // ── Profiles ──────────────────────────────────────────────────────────────

  /// `GET /api/profiles[?kind=<kind>][&shelter_id=<uuid>]`
  pub async fn list_profiles(
    &self,
    kind: Option<ProfileKind>,
    shelter_id: Option<Uuid>,
  ) -> Result<Vec<Profile>> {
    let mut query = Vec::new();
    if let Some(kind) = kind {
      query.push(("kind", kind.to_string()));
    }
    if let Some(id) = shelter_id {
      query.push(("shelter_id", id.to_string()));
    }
    self.get("/profiles", &query).await
  }

  /// `POST /api/profiles/{id}/assign-shelter`
  pub async fn assign(&self, req: AssignRequest) -> Result<Linkage> {
    self
      .post(
        &format!("/profiles/{}/assign-shelter", req.profile_id),
        &json!({ "shelter_id": req.shelter_id, "force": req.force }),
      )
      .await
  }

  /// `POST /api/profiles/{id}/unassign-shelter`
  pub async fn unassign(&self, req: UnassignRequest) -> Result<Linkage> {
    self
      .post(
        &format!("/profiles/{}/unassign-shelter", req.profile_id),
        &json!({ "shelter_id": req.shelter_id }),
      )
      .await
  }

  /// `POST /api/profiles/{from}/move-shelter`
  pub async fn move_shelter(&self, req: MoveRequest) -> Result<Reassignment> {
    self
      .post(
        &format!("/profiles/{}/move-shelter", req.from_profile_id),
        &json!({ "shelter_id": req.shelter_id, "to_profile_id": req.to_profile_id }),
      )
      .await
  }

  // ── Shelters ──────────────────────────────────────────────────────────────

  /// `GET /api/shelters`
  pub async fn list_shelters(&self) -> Result<Vec<ShelterView>> {
    self.get("/shelters", &[]).await
  }

  /// `GET /api/shelters/{id}`
  pub async fn get_shelter(&self, id: Uuid) -> Result<ShelterView> {
    self.get(&format!("/shelters/{id}"), &[]).await
  }

  /// `POST /api/shelters`
  pub async fn create_shelter(&self, shelter: &NewShelter) -> Result<Shelter> {
    self.post("/shelters", shelter).await
  }

  // ── Pagelas ───────────────────────────────────────────────────────────────

  /// `POST /api/pagelas`
  pub async fn record_pagela(&self, pagela: &NewPagela) -> Result<Pagela> {
    self.post("/pagelas", pagela).await
  }

  /// `GET /api/pagelas?person_id=<uuid>`
  pub async fn list_pagelas(&self, person_id: Uuid) -> Result<Vec<Pagela>> {
    self.get("/pagelas", &[("person_id", person_id.to_string())]).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn client(base_url: &str) -> ApiClient {
    ApiClient::new(ApiConfig {
      base_url: base_url.to_string(),
      username: String::new(),
      password: String::new(),
    })
    .unwrap()
  }

  #[test]
  fn url_joins_api_prefix() {
    assert_eq!(client("http://localhost:8080").url("/people"), "http://localhost:8080/api/people");
  }

  #[test]
  fn url_ignores_trailing_slashes() {
    assert_eq!(
      client("https://shelters.example.org//").url("/shelters/1"),
      "https://shelters.example.org/api/shelters/1"
    );
  }
}
