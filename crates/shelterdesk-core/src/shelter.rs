//! Shelters and their computed linkage view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A postal address. Every field but `complement` is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
  pub street:      String,
  pub number:      String,
  pub district:    String,
  pub city:        String,
  pub state:       String,
  pub postal_code: String,
  #[serde(default)]
  pub complement:  Option<String>,
}

/// A facility that leader and teacher profiles are linked to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shelter {
  pub shelter_id: Uuid,
  pub name:       String,
  pub address:    Address,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Input to [`crate::store::ShelterStore::add_shelter`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewShelter {
  pub name:    String,
  pub address: Address,
}

/// Partial update; every `Some` field replaces the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShelterUpdate {
  pub name:    Option<String>,
  pub address: Option<Address>,
}

impl ShelterUpdate {
  pub fn apply(self, shelter: &mut Shelter) {
    if let Some(name) = self.name {
      shelter.name = name;
    }
    if let Some(address) = self.address {
      shelter.address = address;
    }
  }
}

/// The computed read model for a shelter. Never stored; always derived from
/// the profile links at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShelterView {
  #[serde(flatten)]
  pub shelter:  Shelter,
  /// Profile ids of every leader currently linked to this shelter.
  pub leaders:  Vec<Uuid>,
  /// Profile ids of every teacher currently linked to this shelter.
  pub teachers: Vec<Uuid>,
}

impl ShelterView {
  /// Total number of linked profiles, leaders and teachers together.
  pub fn linked_count(&self) -> usize { self.leaders.len() + self.teachers.len() }
}
