//! Person — a role-tagged actor in the program.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::UnknownName;

/// The role a person plays. Leaders and teachers additionally own a
/// [`Profile`](crate::profile::Profile) of the matching kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  Leader,
  Teacher,
  Sheltered,
}

impl Role {
  pub const ALL: [Role; 4] = [Self::Admin, Self::Leader, Self::Teacher, Self::Sheltered];

  /// Whether a person with this role may be promoted to a profile.
  pub fn is_promotable(self) -> bool {
    matches!(self, Self::Leader | Self::Teacher)
  }

  /// The wire and storage name. Matches the serde representation.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Admin => "admin",
      Self::Leader => "leader",
      Self::Teacher => "teacher",
      Self::Sheltered => "sheltered",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Role {
  type Err = UnknownName;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL.into_iter().find(|r| r.as_str() == s).ok_or_else(|| UnknownName {
      what:     "role",
      value:    s.to_owned(),
      expected: "admin, leader, teacher, sheltered",
    })
  }
}

/// A registered person. Never hard-deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
  pub person_id:  Uuid,
  pub name:       String,
  pub email:      Option<String>,
  pub phone:      Option<String>,
  pub role:       Role,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Input to [`crate::store::ShelterStore::add_person`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPerson {
  pub name:  String,
  pub email: Option<String>,
  pub phone: Option<String>,
  pub role:  Role,
}

impl NewPerson {
  /// Convenience constructor with no contact fields.
  pub fn new(name: impl Into<String>, role: Role) -> Self {
    Self { name: name.into(), email: None, phone: None, role }
  }
}

/// Profile completion: every `Some` field replaces the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonUpdate {
  pub name:  Option<String>,
  pub email: Option<String>,
  pub phone: Option<String>,
}

impl PersonUpdate {
  pub fn apply(self, person: &mut Person) {
    if let Some(name) = self.name {
      person.name = name;
    }
    if let Some(email) = self.email {
      person.email = Some(email);
    }
    if let Some(phone) = self.phone {
      person.phone = Some(phone);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn role_names_match_serde() {
    for role in Role::ALL {
      assert_eq!(serde_json::to_value(role).unwrap(), role.as_str());
      assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
    }
  }

  #[test]
  fn unknown_role_lists_expected_names() {
    let err = "visitor".parse::<Role>().unwrap_err();
    assert_eq!(err.value, "visitor");
    assert!(err.to_string().contains("sheltered"), "{err}");
  }
}
