//! [`SqliteStore`] — the SQLite implementation of [`ShelterStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _, Transaction, TransactionBehavior};
use shelterdesk_core::{
  Error as CoreError,
  assignment::{
    self, AssignRequest, Directory, Linkage, MoveRequest, Plan, Reassignment,
    UnassignRequest,
  },
  pagela::{NewPagela, Pagela},
  person::{NewPerson, Person, PersonUpdate, Role},
  profile::{Profile, ProfileKind},
  shelter::{NewShelter, Shelter, ShelterUpdate, ShelterView},
  store::ShelterStore,
};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    PAGELA_COLUMNS, PERSON_COLUMNS, PROFILE_COLUMNS, RawPagela, RawPerson,
    RawProfile, RawShelter, RawShelterView, SHELTER_COLUMNS, encode_date,
    encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A shelterdesk store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, as the tests do.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `f` against the connection on the store thread.
  async fn read<T, F>(&self, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&Connection) -> Result<T> + Send + 'static,
  {
    self.conn.call(move |conn| Ok(f(conn))).await?
  }

  /// Run `f` inside one `BEGIN IMMEDIATE` transaction on the store thread.
  ///
  /// The write lock is taken before `f` reads anything, so concurrent writers
  /// are serialized and never act on the same stale read. Any error from `f`
  /// drops the transaction, which rolls it back.
  async fn write<T, F>(&self, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&Transaction<'_>) -> Result<T> + Send + 'static,
  {
    self.conn.call(move |conn| Ok(run_immediate(conn, f))).await?
  }

  /// Execute raw SQL; tests use it to install failure-injecting triggers.
  #[cfg(test)]
  pub(crate) async fn execute_batch(&self, sql: String) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(&sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

fn run_immediate<T>(
  conn: &mut Connection,
  f: impl FnOnce(&Transaction<'_>) -> Result<T>,
) -> Result<T> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let out = f(&tx)?;
  tx
    .commit()
    .map_err(|e| CoreError::TransactionFailed(e.to_string()))?;
  Ok(out)
}

// ─── Row queries ─────────────────────────────────────────────────────────────

fn query_person(conn: &Connection, id: Uuid) -> Result<Option<Person>> {
  let raw = conn
    .query_row(
      &format!("SELECT {PERSON_COLUMNS} FROM people WHERE person_id = ?1"),
      rusqlite::params![encode_uuid(id)],
      RawPerson::from_row,
    )
    .optional()?;
  raw.map(RawPerson::into_person).transpose()
}

fn query_profile(conn: &Connection, id: Uuid) -> Result<Option<Profile>> {
  let raw = conn
    .query_row(
      &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE profile_id = ?1"),
      rusqlite::params![encode_uuid(id)],
      RawProfile::from_row,
    )
    .optional()?;
  raw.map(RawProfile::into_profile).transpose()
}

fn query_shelter(conn: &Connection, id: Uuid) -> Result<Option<RawShelter>> {
  Ok(
    conn
      .query_row(
        &format!("SELECT {SHELTER_COLUMNS} FROM shelters WHERE shelter_id = ?1"),
        rusqlite::params![encode_uuid(id)],
        RawShelter::from_row,
      )
      .optional()?,
  )
}

fn shelter_exists(conn: &Connection, id: Uuid) -> Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM shelters WHERE shelter_id = ?1",
        rusqlite::params![encode_uuid(id)],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

/// `(kind, profile_id)` for every profile linked to a shelter.
fn shelter_links(conn: &Connection, shelter_id: &str) -> Result<Vec<(String, String)>> {
  let mut stmt = conn.prepare(
    "SELECT kind, profile_id FROM profiles
     WHERE shelter_id = ?1
     ORDER BY created_at, profile_id",
  )?;
  let links = stmt
    .query_map(rusqlite::params![shelter_id], |row| Ok((row.get(0)?, row.get(1)?)))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(links)
}

fn into_view(conn: &Connection, shelter: RawShelter) -> Result<ShelterView> {
  let links = shelter_links(conn, &shelter.shelter_id)?;
  RawShelterView { shelter, links }.into_view()
}

fn query_shelter_view(conn: &Connection, id: Uuid) -> Result<Option<ShelterView>> {
  query_shelter(conn, id)?
    .map(|raw| into_view(conn, raw))
    .transpose()
}

fn require_shelter_view(conn: &Connection, id: Uuid) -> Result<ShelterView> {
  query_shelter_view(conn, id)?.ok_or_else(|| CoreError::ShelterNotFound(id).into())
}

// ─── Assignment plumbing ─────────────────────────────────────────────────────

/// Profile and shelter lookups through an open transaction.
struct TxDirectory<'a>(&'a Connection);

impl Directory for TxDirectory<'_> {
  type Error = Error;

  fn find_profile(&self, profile_id: Uuid) -> Result<Option<Profile>> {
    query_profile(self.0, profile_id)
  }

  fn shelter_exists(&self, shelter_id: Uuid) -> Result<bool> {
    shelter_exists(self.0, shelter_id)
  }
}

/// Write every change in `plan`, in order.
///
/// Each update is a compare-and-set on the link the plan was computed from.
/// Any failure here happens after the preconditions passed, so it is reported
/// as [`CoreError::TransactionFailed`] and the caller's transaction rolls back.
fn apply_plan(conn: &Connection, plan: &Plan) -> Result<()> {
  for change in plan.changes() {
    let updated = conn
      .execute(
        "UPDATE profiles SET shelter_id = ?1
         WHERE profile_id = ?2 AND shelter_id IS ?3",
        rusqlite::params![
          change.to.shelter_id().map(encode_uuid),
          encode_uuid(change.profile_id),
          change.from.shelter_id().map(encode_uuid),
        ],
      )
      .map_err(|e| CoreError::TransactionFailed(e.to_string()))?;

    if updated != 1 {
      return Err(
        CoreError::TransactionFailed(format!(
          "profile {} changed while its link was being updated",
          change.profile_id
        ))
        .into(),
      );
    }
  }
  Ok(())
}

// ─── ShelterStore impl ───────────────────────────────────────────────────────

impl ShelterStore for SqliteStore {
  type Error = Error;

  // ── People ────────────────────────────────────────────────────────────────

  async fn add_person(&self, input: NewPerson) -> Result<Person> {
    let now = Utc::now();
    let person = Person {
      person_id:  Uuid::new_v4(),
      name:       input.name,
      email:      input.email,
      phone:      input.phone,
      role:       input.role,
      created_at: now,
      updated_at: now,
    };

    let row = person.clone();
    self
      .write(move |tx| {
        tx.execute(
          &format!("INSERT INTO people ({PERSON_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
          rusqlite::params![
            encode_uuid(row.person_id),
            row.name,
            row.email,
            row.phone,
            row.role.as_str(),
            encode_dt(row.created_at),
            encode_dt(row.updated_at),
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(person)
  }

  async fn get_person(&self, id: Uuid) -> Result<Option<Person>> {
    self.read(move |conn| query_person(conn, id)).await
  }

  async fn list_people(&self, role: Option<Role>) -> Result<Vec<Person>> {
    let role_str = role.map(Role::as_str);

    self
      .read(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PERSON_COLUMNS} FROM people
           WHERE ?1 IS NULL OR role = ?1
           ORDER BY created_at, person_id"
        ))?;
        let raws = stmt
          .query_map(rusqlite::params![role_str], RawPerson::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        raws.into_iter().map(RawPerson::into_person).collect()
      })
      .await
  }

  async fn update_person(&self, id: Uuid, update: PersonUpdate) -> Result<Person> {
    self
      .write(move |tx| {
        let mut person = query_person(tx, id)?.ok_or(CoreError::PersonNotFound(id))?;
        update.apply(&mut person);
        person.updated_at = Utc::now();

        tx.execute(
          "UPDATE people SET name = ?1, email = ?2, phone = ?3, updated_at = ?4
           WHERE person_id = ?5",
          rusqlite::params![
            person.name,
            person.email,
            person.phone,
            encode_dt(person.updated_at),
            encode_uuid(id),
          ],
        )?;
        Ok(person)
      })
      .await
  }

  async fn promote(&self, person_id: Uuid, kind: ProfileKind) -> Result<Profile> {
    self
      .write(move |tx| {
        let person = query_person(tx, person_id)?.ok_or(CoreError::PersonNotFound(person_id))?;
        if !person.role.is_promotable() {
          return Err(CoreError::InvalidRole { person_id, role: person.role }.into());
        }

        let id_str = encode_uuid(person_id);
        let already = tx
          .query_row(
            "SELECT 1 FROM profiles WHERE person_id = ?1 AND kind = ?2",
            rusqlite::params![id_str, kind.as_str()],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if already {
          return Err(CoreError::AlreadyPromoted { person_id, kind }.into());
        }

        let profile = Profile {
          profile_id: Uuid::new_v4(),
          person_id,
          kind,
          shelter_id: None,
          created_at: Utc::now(),
        };

        tx.execute(
          &format!("INSERT INTO profiles ({PROFILE_COLUMNS}) VALUES (?1, ?2, ?3, NULL, ?4)"),
          rusqlite::params![
            encode_uuid(profile.profile_id),
            id_str,
            kind.as_str(),
            encode_dt(profile.created_at),
          ],
        )?;
        tx.execute(
          "UPDATE people SET role = ?1, updated_at = ?2 WHERE person_id = ?3",
          rusqlite::params![
            kind.role().as_str(),
            encode_dt(profile.created_at),
            id_str
          ],
        )?;

        Ok(profile)
      })
      .await
  }

  // ── Profiles ──────────────────────────────────────────────────────────────

  async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
    self.read(move |conn| query_profile(conn, id)).await
  }

  async fn list_profiles(
    &self,
    kind:       Option<ProfileKind>,
    shelter_id: Option<Uuid>,
  ) -> Result<Vec<Profile>> {
    let kind_str    = kind.map(ProfileKind::as_str);
    let shelter_str = shelter_id.map(encode_uuid);

    self
      .read(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PROFILE_COLUMNS} FROM profiles
           WHERE (?1 IS NULL OR kind = ?1)
             AND (?2 IS NULL OR shelter_id = ?2)
           ORDER BY created_at, profile_id"
        ))?;
        let raws = stmt
          .query_map(rusqlite::params![kind_str, shelter_str], RawProfile::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        raws.into_iter().map(RawProfile::into_profile).collect()
      })
      .await
  }

  // ── Shelters ──────────────────────────────────────────────────────────────

  async fn add_shelter(&self, input: NewShelter) -> Result<Shelter> {
    let now = Utc::now();
    let shelter = Shelter {
      shelter_id: Uuid::new_v4(),
      name:       input.name,
      address:    input.address,
      created_at: now,
      updated_at: now,
    };

    let row = shelter.clone();
    self
      .write(move |tx| {
        let a = row.address;
        tx.execute(
          &format!(
            "INSERT INTO shelters ({SHELTER_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
          ),
          rusqlite::params![
            encode_uuid(row.shelter_id),
            row.name,
            a.street,
            a.number,
            a.district,
            a.city,
            a.state,
            a.postal_code,
            a.complement,
            encode_dt(row.created_at),
            encode_dt(row.updated_at),
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(shelter)
  }

  async fn get_shelter(&self, id: Uuid) -> Result<Option<ShelterView>> {
    self.read(move |conn| query_shelter_view(conn, id)).await
  }

  async fn list_shelters(&self) -> Result<Vec<ShelterView>> {
    self
      .read(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SHELTER_COLUMNS} FROM shelters ORDER BY name, shelter_id"
        ))?;
        let raws = stmt
          .query_map([], RawShelter::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        raws.into_iter().map(|raw| into_view(conn, raw)).collect()
      })
      .await
  }

  async fn update_shelter(&self, id: Uuid, update: ShelterUpdate) -> Result<ShelterView> {
    self
      .write(move |tx| {
        let mut shelter = query_shelter(tx, id)?
          .ok_or(CoreError::ShelterNotFound(id))?
          .into_shelter()?;
        update.apply(&mut shelter);
        shelter.updated_at = Utc::now();

        let a = &shelter.address;
        tx.execute(
          "UPDATE shelters SET
             name = ?1, street = ?2, number = ?3, district = ?4, city = ?5,
             state = ?6, postal_code = ?7, complement = ?8, updated_at = ?9
           WHERE shelter_id = ?10",
          rusqlite::params![
            shelter.name,
            a.street,
            a.number,
            a.district,
            a.city,
            a.state,
            a.postal_code,
            a.complement,
            encode_dt(shelter.updated_at),
            encode_uuid(id),
          ],
        )?;

        require_shelter_view(tx, id)
      })
      .await
  }

  async fn delete_shelter(&self, id: Uuid) -> Result<()> {
    self
      .write(move |tx| {
        if !shelter_exists(tx, id)? {
          return Err(CoreError::ShelterNotFound(id).into());
        }
        let id_str = encode_uuid(id);
        tx.execute(
          "UPDATE profiles SET shelter_id = NULL WHERE shelter_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.execute(
          "UPDATE pagelas SET shelter_id = NULL WHERE shelter_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.execute("DELETE FROM shelters WHERE shelter_id = ?1", rusqlite::params![id_str])?;
        Ok(())
      })
      .await
  }

  // ── Assignment ────────────────────────────────────────────────────────────

  async fn assign_shelter(&self, req: AssignRequest) -> Result<Linkage> {
    self
      .write(move |tx| {
        let planned = assignment::assign(&TxDirectory(tx), req)?;
        apply_plan(tx, &planned.plan)?;
        Ok(Linkage {
          profile: planned.updated(),
          shelter: require_shelter_view(tx, req.shelter_id)?,
        })
      })
      .await
  }

  async fn unassign_shelter(&self, req: UnassignRequest) -> Result<Linkage> {
    self
      .write(move |tx| {
        let planned = assignment::unassign(&TxDirectory(tx), req)?;
        apply_plan(tx, &planned.plan)?;
        Ok(Linkage {
          profile: planned.updated(),
          shelter: require_shelter_view(tx, req.shelter_id)?,
        })
      })
      .await
  }

  async fn move_shelter(&self, req: MoveRequest) -> Result<Reassignment> {
    self
      .write(move |tx| {
        let planned = assignment::reassign(&TxDirectory(tx), req)?;
        apply_plan(tx, &planned.plan)?;
        let (from, to) = planned.updated();
        Ok(Reassignment {
          from,
          to,
          shelter: require_shelter_view(tx, req.shelter_id)?,
        })
      })
      .await
  }

  // ── Pagelas ───────────────────────────────────────────────────────────────

  async fn record_pagela(&self, input: NewPagela) -> Result<Pagela> {
    self
      .write(move |tx| {
        let person = query_person(tx, input.person_id)?
          .ok_or(CoreError::PersonNotFound(input.person_id))?;
        if person.role != Role::Sheltered {
          return Err(
            CoreError::InvalidRole { person_id: person.person_id, role: person.role }.into(),
          );
        }
        if let Some(shelter_id) = input.shelter_id {
          if !shelter_exists(tx, shelter_id)? {
            return Err(CoreError::ShelterNotFound(shelter_id).into());
          }
        }

        let pagela = Pagela {
          pagela_id:      Uuid::new_v4(),
          person_id:      input.person_id,
          shelter_id:     input.shelter_id,
          reference_date: input.reference_date,
          present:        input.present,
          notes:          input.notes,
          recorded_at:    Utc::now(),
        };

        tx.execute(
          &format!("INSERT INTO pagelas ({PAGELA_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
          rusqlite::params![
            encode_uuid(pagela.pagela_id),
            encode_uuid(pagela.person_id),
            pagela.shelter_id.map(encode_uuid),
            encode_date(pagela.reference_date),
            pagela.present,
            pagela.notes,
            encode_dt(pagela.recorded_at),
          ],
        )?;
        Ok(pagela)
      })
      .await
  }

  async fn list_pagelas(&self, person_id: Uuid) -> Result<Vec<Pagela>> {
    self
      .read(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PAGELA_COLUMNS} FROM pagelas
           WHERE person_id = ?1
           ORDER BY reference_date, recorded_at"
        ))?;
        let raws = stmt
          .query_map(rusqlite::params![encode_uuid(person_id)], RawPagela::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        raws.into_iter().map(RawPagela::into_pagela).collect()
      })
      .await
  }
}
