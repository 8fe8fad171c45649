//! Pagelas — periodic attendance and assessment records for sheltered people.
//!
//! Pagelas are append-only. A correction is recorded as a new pagela for the
//! same reference date.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagela {
  pub pagela_id:      Uuid,
  /// Always a person with role `sheltered`.
  pub person_id:      Uuid,
  /// Cleared when the shelter is deleted.
  pub shelter_id:     Option<Uuid>,
  /// The calendar day (usually the week's meeting) this record covers.
  pub reference_date: NaiveDate,
  pub present:        bool,
  pub notes:          Option<String>,
  /// Server-assigned.
  pub recorded_at:    DateTime<Utc>,
}

/// Input to [`crate::store::ShelterStore::record_pagela`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPagela {
  pub person_id:      Uuid,
  #[serde(default)]
  pub shelter_id:     Option<Uuid>,
  pub reference_date: NaiveDate,
  pub present:        bool,
  #[serde(default)]
  pub notes:          Option<String>,
}
