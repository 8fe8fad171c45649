//! The `ShelterStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `shelterdesk-store-sqlite`). Higher layers (`shelterdesk-api`,
//! `shelterdesk-server`) depend on this abstraction, not on any concrete
//! backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  Failure,
  assignment::{AssignRequest, Linkage, MoveRequest, Reassignment, UnassignRequest},
  pagela::{NewPagela, Pagela},
  person::{NewPerson, Person, PersonUpdate, Role},
  profile::{Profile, ProfileKind},
  shelter::{NewShelter, Shelter, ShelterUpdate, ShelterView},
};

/// Abstraction over a shelterdesk storage backend.
///
/// The three assignment operations are each one atomic unit: preconditions
/// are read and the resulting link changes are written under a single
/// transaction, and concurrent assignment operations are serialized.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ShelterStore: Send + Sync {
  type Error: Failure;

  // ── People ────────────────────────────────────────────────────────────

  /// Register a new person.
  fn add_person(
    &self,
    input: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Retrieve a person by UUID. Returns `None` if not found.
  fn get_person(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// List every person, optionally restricted to one role.
  fn list_people(
    &self,
    role: Option<Role>,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  /// Complete or correct a person's contact fields.
  fn update_person(
    &self,
    id: Uuid,
    update: PersonUpdate,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Create the `kind` profile for a person and set the person's role to
  /// match. Fails if the person already holds a profile of that kind or has a
  /// role that cannot be promoted.
  fn promote(
    &self,
    person_id: Uuid,
    kind: ProfileKind,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + '_;

  // ── Profiles ──────────────────────────────────────────────────────────

  fn get_profile(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  /// List profiles, optionally filtered by kind and by linked shelter.
  fn list_profiles(
    &self,
    kind: Option<ProfileKind>,
    shelter_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<Profile>, Self::Error>> + Send + '_;

  // ── Shelters ──────────────────────────────────────────────────────────

  fn add_shelter(
    &self,
    input: NewShelter,
  ) -> impl Future<Output = Result<Shelter, Self::Error>> + Send + '_;

  /// Materialise a [`ShelterView`]. Returns `None` if the shelter does not
  /// exist.
  fn get_shelter(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ShelterView>, Self::Error>> + Send + '_;

  fn list_shelters(
    &self,
  ) -> impl Future<Output = Result<Vec<ShelterView>, Self::Error>> + Send + '_;

  fn update_shelter(
    &self,
    id: Uuid,
    update: ShelterUpdate,
  ) -> impl Future<Output = Result<ShelterView, Self::Error>> + Send + '_;

  /// Delete a shelter, clearing every profile link to it in the same
  /// transaction.
  fn delete_shelter(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Assignment ────────────────────────────────────────────────────────

  /// Link a profile to a shelter. See [`crate::assignment::plan_assign`].
  fn assign_shelter(
    &self,
    req: AssignRequest,
  ) -> impl Future<Output = Result<Linkage, Self::Error>> + Send + '_;

  /// Clear a profile's link to a shelter. See
  /// [`crate::assignment::plan_unassign`].
  fn unassign_shelter(
    &self,
    req: UnassignRequest,
  ) -> impl Future<Output = Result<Linkage, Self::Error>> + Send + '_;

  /// Hand a shelter over between two profiles atomically. See
  /// [`crate::assignment::plan_move`].
  fn move_shelter(
    &self,
    req: MoveRequest,
  ) -> impl Future<Output = Result<Reassignment, Self::Error>> + Send + '_;

  // ── Pagelas ───────────────────────────────────────────────────────────

  /// Append a pagela. The person must exist and be `sheltered`.
  fn record_pagela(
    &self,
    input: NewPagela,
  ) -> impl Future<Output = Result<Pagela, Self::Error>> + Send + '_;

  /// Every pagela for a person, oldest reference date first.
  fn list_pagelas(
    &self,
    person_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Pagela>, Self::Error>> + Send + '_;
}
