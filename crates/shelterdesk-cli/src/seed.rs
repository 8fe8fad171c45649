//! TOML-driven seeding of a fresh server.
//!
//! ```toml
//! [[people]]
//! key     = "lia"
//! name    = "Lia Souza"
//! role    = "leader"
//! promote = ["leader"]
//!
//! [[shelters]]
//! key  = "s1"
//! name = "Casa Esperança"
//! address = { street = "Rua A", number = "1", district = "Centro",
//!             city = "Recife", state = "PE", postal_code = "50000-000" }
//!
//! [[assignments]]
//! person  = "lia"
//! kind    = "leader"
//! shelter = "s1"
//! ```
//!
//! Keys are local to the file; they name entities so later sections can refer
//! to them before the server has assigned ids. Everything is applied in file
//! order: people (and their promotions), then shelters, then assignments.

use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use shelterdesk_core::{
  assignment::AssignRequest,
  person::NewPerson,
  profile::ProfileKind,
  shelter::NewShelter,
};
use uuid::Uuid;

use crate::client::ApiClient;

#[derive(Debug, Deserialize)]
pub struct SeedFile {
  #[serde(default)]
  pub people:      Vec<SeedPerson>,
  #[serde(default)]
  pub shelters:    Vec<SeedShelter>,
  #[serde(default)]
  pub assignments: Vec<SeedAssignment>,
}

#[derive(Debug, Deserialize)]
pub struct SeedPerson {
  pub key:     String,
  #[serde(flatten)]
  pub person:  NewPerson,
  #[serde(default)]
  pub promote: Vec<ProfileKind>,
}

#[derive(Debug, Deserialize)]
pub struct SeedShelter {
  pub key:     String,
  #[serde(flatten)]
  pub shelter: NewShelter,
}

#[derive(Debug, Deserialize)]
pub struct SeedAssignment {
  pub person:  String,
  pub kind:    ProfileKind,
  pub shelter: String,
  #[serde(default)]
  pub force:   bool,
}

/// What a seed run created.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
  pub people:      usize,
  pub profiles:    usize,
  pub shelters:    usize,
  pub assignments: usize,
}

impl SeedFile {
  pub fn parse(raw: &str) -> Result<Self> {
    toml::from_str(raw).context("parsing seed file")
  }

  /// Check that keys are unique and every assignment refers to a declared
  /// person, a promotion of that person, and a declared shelter.
  pub fn validate(&self) -> Result<()> {
    let mut promotions: HashMap<&str, &[ProfileKind]> = HashMap::new();
    for p in &self.people {
      if promotions.insert(&p.key, &p.promote).is_some() {
        bail!("duplicate person key {:?}", p.key);
      }
    }

    let mut shelters = HashSet::new();
    for s in &self.shelters {
      if !shelters.insert(s.key.as_str()) {
        bail!("duplicate shelter key {:?}", s.key);
      }
    }

    for (i, a) in self.assignments.iter().enumerate() {
      let Some(kinds) = promotions.get(a.person.as_str()) else {
        bail!("assignment {i}: unknown person {:?}", a.person);
      };
      if !kinds.contains(&a.kind) {
        bail!("assignment {i}: person {:?} is not promoted to {:?}", a.person, a.kind);
      }
      if !shelters.contains(a.shelter.as_str()) {
        bail!("assignment {i}: unknown shelter {:?}", a.shelter);
      }
    }
    Ok(())
  }

  /// Validate, then create everything on the server in file order.
  pub async fn apply(&self, client: &ApiClient) -> Result<SeedReport> {
    self.validate()?;
    let mut report = SeedReport::default();

    let mut profiles: HashMap<(&str, ProfileKind), Uuid> = HashMap::new();
    for p in &self.people {
      let person = client
        .register(&p.person)
        .await
        .with_context(|| format!("registering {:?}", p.key))?;
      report.people += 1;
      for &kind in &p.promote {
        let profile = client
          .promote(person.person_id, kind)
          .await
          .with_context(|| format!("promoting {:?} to {kind:?}", p.key))?;
        profiles.insert((p.key.as_str(), kind), profile.profile_id);
        report.profiles += 1;
      }
    }

    let mut shelters: HashMap<&str, Uuid> = HashMap::new();
    for s in &self.shelters {
      let shelter = client
        .create_shelter(&s.shelter)
        .await
        .with_context(|| format!("creating shelter {:?}", s.key))?;
      shelters.insert(&s.key, shelter.shelter_id);
      report.shelters += 1;
    }

    for a in &self.assignments {
      // Both lookups succeed after validate().
      let (Some(&profile_id), Some(&shelter_id)) = (
        profiles.get(&(a.person.as_str(), a.kind)),
        shelters.get(a.shelter.as_str()),
      ) else {
        bail!("unresolved assignment {} → {}", a.person, a.shelter);
      };
      client
        .assign(AssignRequest { profile_id, shelter_id, force: a.force })
        .await
        .with_context(|| format!("assigning {:?} to {:?}", a.person, a.shelter))?;
      report.assignments += 1;
    }

    tracing::info!(?report, "seed applied");
    Ok(report)
  }
}
