//! Leader and teacher profiles and their shelter link.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::UnknownName, person::Role};

/// Which role slot a profile fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
  Leader,
  Teacher,
}

impl ProfileKind {
  pub const ALL: [ProfileKind; 2] = [Self::Leader, Self::Teacher];

  /// The person role implied by holding a profile of this kind.
  pub fn role(self) -> Role {
    match self {
      Self::Leader => Role::Leader,
      Self::Teacher => Role::Teacher,
    }
  }

  /// The wire and storage name. Matches the serde representation.
  pub fn as_str(self) -> &'static str { self.role().as_str() }
}

impl fmt::Display for ProfileKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for ProfileKind {
  type Err = UnknownName;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL.into_iter().find(|k| k.as_str() == s).ok_or_else(|| UnknownName {
      what:     "profile kind",
      value:    s.to_owned(),
      expected: "leader, teacher",
    })
  }
}

/// The state of a profile's link to a shelter.
///
/// A profile is linked to at most one shelter at a time; the link is a weak
/// reference and does not own the shelter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "shelter_id", rename_all = "snake_case")]
pub enum ShelterLink {
  Unlinked,
  Linked(Uuid),
}

impl ShelterLink {
  pub fn shelter_id(self) -> Option<Uuid> {
    match self {
      Self::Unlinked => None,
      Self::Linked(id) => Some(id),
    }
  }

  pub fn is_linked_to(self, shelter_id: Uuid) -> bool {
    self == Self::Linked(shelter_id)
  }
}

impl From<Option<Uuid>> for ShelterLink {
  fn from(id: Option<Uuid>) -> Self {
    id.map_or(Self::Unlinked, Self::Linked)
  }
}

/// A role-specific extension of a person that may be linked to one shelter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
  pub profile_id: Uuid,
  pub person_id:  Uuid,
  pub kind:       ProfileKind,
  /// Mutated exclusively through assign, unassign, and move.
  pub shelter_id: Option<Uuid>,
  pub created_at: DateTime<Utc>,
}

impl Profile {
  pub fn link(&self) -> ShelterLink { self.shelter_id.into() }
}
