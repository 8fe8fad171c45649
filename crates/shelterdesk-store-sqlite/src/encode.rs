//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings, calendar dates as
//! `YYYY-MM-DD`. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use shelterdesk_core::{
  pagela::Pagela,
  person::{Person, Role},
  profile::{Profile, ProfileKind},
  shelter::{Address, Shelter, ShelterView},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

fn decode_opt_uuid(s: Option<String>) -> Result<Option<Uuid>> {
  s.as_deref().map(decode_uuid).transpose()
}

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ────────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Role / ProfileKind ───────────────────────────────────────────────────────

// Stored under the names from `Role::as_str` and `ProfileKind::as_str`.

pub fn decode_role(s: &str) -> Result<Role> {
  s.parse()
    .map_err(|_| Error::UnknownValue { column: "role", value: s.to_owned() })
}

pub fn decode_kind(s: &str) -> Result<ProfileKind> {
  s.parse()
    .map_err(|_| Error::UnknownValue { column: "kind", value: s.to_owned() })
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const PERSON_COLUMNS: &str =
  "person_id, name, email, phone, role, created_at, updated_at";

/// Raw strings read directly from a `people` row.
pub struct RawPerson {
  pub person_id:  String,
  pub name:       String,
  pub email:      Option<String>,
  pub phone:      Option<String>,
  pub role:       String,
  pub created_at: String,
  pub updated_at: String,
}

impl RawPerson {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      person_id:  row.get(0)?,
      name:       row.get(1)?,
      email:      row.get(2)?,
      phone:      row.get(3)?,
      role:       row.get(4)?,
      created_at: row.get(5)?,
      updated_at: row.get(6)?,
    })
  }

  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      person_id:  decode_uuid(&self.person_id)?,
      name:       self.name,
      email:      self.email,
      phone:      self.phone,
      role:       decode_role(&self.role)?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

pub const PROFILE_COLUMNS: &str = "profile_id, person_id, kind, shelter_id, created_at";

/// Raw strings read directly from a `profiles` row.
pub struct RawProfile {
  pub profile_id: String,
  pub person_id:  String,
  pub kind:       String,
  pub shelter_id: Option<String>,
  pub created_at: String,
}

impl RawProfile {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      profile_id: row.get(0)?,
      person_id:  row.get(1)?,
      kind:       row.get(2)?,
      shelter_id: row.get(3)?,
      created_at: row.get(4)?,
    })
  }

  pub fn into_profile(self) -> Result<Profile> {
    Ok(Profile {
      profile_id: decode_uuid(&self.profile_id)?,
      person_id:  decode_uuid(&self.person_id)?,
      kind:       decode_kind(&self.kind)?,
      shelter_id: decode_opt_uuid(self.shelter_id)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub const SHELTER_COLUMNS: &str = "shelter_id, name, street, number, district, city, \
                                   state, postal_code, complement, created_at, updated_at";

/// Raw strings read directly from a `shelters` row.
pub struct RawShelter {
  pub shelter_id:  String,
  pub name:        String,
  pub street:      String,
  pub number:      String,
  pub district:    String,
  pub city:        String,
  pub state:       String,
  pub postal_code: String,
  pub complement:  Option<String>,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawShelter {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      shelter_id:  row.get(0)?,
      name:        row.get(1)?,
      street:      row.get(2)?,
      number:      row.get(3)?,
      district:    row.get(4)?,
      city:        row.get(5)?,
      state:       row.get(6)?,
      postal_code: row.get(7)?,
      complement:  row.get(8)?,
      created_at:  row.get(9)?,
      updated_at:  row.get(10)?,
    })
  }

  pub fn into_shelter(self) -> Result<Shelter> {
    Ok(Shelter {
      shelter_id: decode_uuid(&self.shelter_id)?,
      name:       self.name,
      address:    Address {
        street:      self.street,
        number:      self.number,
        district:    self.district,
        city:        self.city,
        state:       self.state,
        postal_code: self.postal_code,
        complement:  self.complement,
      },
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// A shelter row plus the `(kind, profile_id)` pairs linked to it.
pub struct RawShelterView {
  pub shelter: RawShelter,
  pub links:   Vec<(String, String)>,
}

impl RawShelterView {
  pub fn into_view(self) -> Result<ShelterView> {
    let shelter = self.shelter.into_shelter()?;
    let mut leaders = Vec::new();
    let mut teachers = Vec::new();
    for (kind, profile_id) in self.links {
      let id = decode_uuid(&profile_id)?;
      match decode_kind(&kind)? {
        ProfileKind::Leader => leaders.push(id),
        ProfileKind::Teacher => teachers.push(id),
      }
    }
    Ok(ShelterView { shelter, leaders, teachers })
  }
}

pub const PAGELA_COLUMNS: &str =
  "pagela_id, person_id, shelter_id, reference_date, present, notes, recorded_at";

/// Raw values read directly from a `pagelas` row.
pub struct RawPagela {
  pub pagela_id:      String,
  pub person_id:      String,
  pub shelter_id:     Option<String>,
  pub reference_date: String,
  pub present:        bool,
  pub notes:          Option<String>,
  pub recorded_at:    String,
}

impl RawPagela {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      pagela_id:      row.get(0)?,
      person_id:      row.get(1)?,
      shelter_id:     row.get(2)?,
      reference_date: row.get(3)?,
      present:        row.get(4)?,
      notes:          row.get(5)?,
      recorded_at:    row.get(6)?,
    })
  }

  pub fn into_pagela(self) -> Result<Pagela> {
    Ok(Pagela {
      pagela_id:      decode_uuid(&self.pagela_id)?,
      person_id:      decode_uuid(&self.person_id)?,
      shelter_id:     decode_opt_uuid(self.shelter_id)?,
      reference_date: decode_date(&self.reference_date)?,
      present:        self.present,
      notes:          self.notes,
      recorded_at:    decode_dt(&self.recorded_at)?,
    })
  }
}
