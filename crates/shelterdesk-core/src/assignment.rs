//! The shelter assignment protocol.
//!
//! A profile's shelter link is a two-state machine:
//!
//! ```text
//!            assign(S)                unassign(S)
//! Unlinked ───────────► Linked(S) ───────────────► Unlinked
//!                          │
//!                          │ assign(T, force) / move to another profile
//!                          ▼
//!                      Linked(T)
//! ```
//!
//! Operations run in two phases. The *validation* phase looks every entity up
//! through a [`Directory`] and returns the first failing precondition. The
//! *planning* phase turns the current links into a [`Plan`]: the list of
//! [`LinkChange`]s a store must apply as one unit. Nothing here writes; stores
//! call these functions from inside their own transaction so the reads and the
//! writes see the same state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  profile::{Profile, ShelterLink},
  shelter::ShelterView,
};

// ─── Requests ────────────────────────────────────────────────────────────────

/// Link `profile_id` to `shelter_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignRequest {
  pub profile_id: Uuid,
  pub shelter_id: Uuid,
  /// Overwrite an existing link to a different shelter instead of failing
  /// with [`Error::Conflict`].
  #[serde(default)]
  pub force:      bool,
}

/// Clear the link between `profile_id` and `shelter_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnassignRequest {
  pub profile_id: Uuid,
  pub shelter_id: Uuid,
}

/// Hand `shelter_id` over from one profile to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
  pub from_profile_id: Uuid,
  pub shelter_id:      Uuid,
  pub to_profile_id:   Uuid,
}

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// Result of a successful assign or unassign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Linkage {
  pub profile: Profile,
  pub shelter: ShelterView,
}

/// Result of a successful move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reassignment {
  pub from:    Profile,
  pub to:      Profile,
  pub shelter: ShelterView,
}

// ─── Plans ───────────────────────────────────────────────────────────────────

/// One profile's transition from `from` to `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkChange {
  pub profile_id: Uuid,
  pub from:       ShelterLink,
  pub to:         ShelterLink,
}

/// The ordered link changes an operation needs. Empty means no-op.
///
/// Clears always come before sets, so a store applying the plan in order never
/// holds a state where a profile is linked twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
  changes: Vec<LinkChange>,
}

impl Plan {
  fn push(&mut self, profile_id: Uuid, from: ShelterLink, to: ShelterLink) {
    if from != to {
      self.changes.push(LinkChange { profile_id, from, to });
    }
  }

  pub fn changes(&self) -> &[LinkChange] { &self.changes }

  pub fn is_noop(&self) -> bool { self.changes.is_empty() }

  /// Apply every change addressed to `profile` in memory.
  pub fn apply_to(&self, profile: &mut Profile) {
    for change in &self.changes {
      if change.profile_id == profile.profile_id {
        profile.shelter_id = change.to.shelter_id();
      }
    }
  }
}

/// Plan `assign`. Re-assigning the current shelter is a no-op; replacing a
/// different shelter requires `force`.
pub fn plan_assign(profile: &Profile, shelter_id: Uuid, force: bool) -> Result<Plan> {
  let mut plan = Plan::default();
  match profile.link() {
    ShelterLink::Linked(linked) if linked != shelter_id && !force => {
      return Err(Error::Conflict { profile_id: profile.profile_id, linked });
    }
    current => plan.push(profile.profile_id, current, ShelterLink::Linked(shelter_id)),
  }
  Ok(plan)
}

/// Plan `unassign`. The profile must currently be linked to `shelter_id`.
pub fn plan_unassign(profile: &Profile, shelter_id: Uuid) -> Result<Plan> {
  if !profile.link().is_linked_to(shelter_id) {
    return Err(Error::NotLinked { profile_id: profile.profile_id, shelter_id });
  }
  let mut plan = Plan::default();
  plan.push(profile.profile_id, profile.link(), ShelterLink::Unlinked);
  Ok(plan)
}

/// Plan `move`. `from` must hold `shelter_id`; `to` must be of the same kind
/// and either unlinked or already linked to `shelter_id`. The latter, like
/// `from == to`, succeeds without changing anything.
pub fn plan_move(from: &Profile, shelter_id: Uuid, to: &Profile) -> Result<Plan> {
  if from.kind != to.kind {
    return Err(Error::KindMismatch { from: from.kind, to: to.kind });
  }
  if !from.link().is_linked_to(shelter_id) {
    return Err(Error::NotLinked { profile_id: from.profile_id, shelter_id });
  }

  let mut plan = Plan::default();
  if from.profile_id == to.profile_id {
    return Ok(plan);
  }

  match to.link() {
    ShelterLink::Linked(linked) if linked == shelter_id => {}
    ShelterLink::Linked(linked) => {
      return Err(Error::Conflict { profile_id: to.profile_id, linked });
    }
    ShelterLink::Unlinked => {
      plan.push(from.profile_id, from.link(), ShelterLink::Unlinked);
      plan.push(to.profile_id, ShelterLink::Unlinked, ShelterLink::Linked(shelter_id));
    }
  }
  Ok(plan)
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// Read access to profiles and shelters, consulted before any mutation.
///
/// Implementations backed by a database should read through the same
/// transaction that will apply the resulting [`Plan`].
pub trait Directory {
  type Error: From<Error>;

  fn find_profile(&self, profile_id: Uuid) -> Result<Option<Profile>, Self::Error>;

  fn shelter_exists(&self, shelter_id: Uuid) -> Result<bool, Self::Error>;
}

/// Entities as they were read, paired with the plan computed from them.
#[derive(Debug, Clone)]
pub struct Planned<T> {
  pub before: T,
  pub plan:   Plan,
}

impl Planned<Profile> {
  /// The profile as it will be once the plan is applied.
  pub fn updated(&self) -> Profile {
    let mut profile = self.before.clone();
    self.plan.apply_to(&mut profile);
    profile
  }
}

impl Planned<(Profile, Profile)> {
  /// The `(from, to)` profiles as they will be once the plan is applied.
  pub fn updated(&self) -> (Profile, Profile) {
    let (mut from, mut to) = self.before.clone();
    self.plan.apply_to(&mut from);
    self.plan.apply_to(&mut to);
    (from, to)
  }
}

fn require_profile<D: Directory>(dir: &D, profile_id: Uuid) -> Result<Profile, D::Error> {
  dir
    .find_profile(profile_id)?
    .ok_or_else(|| Error::ProfileNotFound(profile_id).into())
}

fn require_shelter<D: Directory>(dir: &D, shelter_id: Uuid) -> Result<(), D::Error> {
  if dir.shelter_exists(shelter_id)? {
    Ok(())
  } else {
    Err(Error::ShelterNotFound(shelter_id).into())
  }
}

/// Validate and plan an assignment. Lookup order: profile, shelter.
pub fn assign<D: Directory>(dir: &D, req: AssignRequest) -> Result<Planned<Profile>, D::Error> {
  let profile = require_profile(dir, req.profile_id)?;
  require_shelter(dir, req.shelter_id)?;
  let plan = plan_assign(&profile, req.shelter_id, req.force)?;
  Ok(Planned { before: profile, plan })
}

/// Validate and plan an unassignment. Lookup order: profile, shelter.
pub fn unassign<D: Directory>(
  dir: &D,
  req: UnassignRequest,
) -> Result<Planned<Profile>, D::Error> {
  let profile = require_profile(dir, req.profile_id)?;
  require_shelter(dir, req.shelter_id)?;
  let plan = plan_unassign(&profile, req.shelter_id)?;
  Ok(Planned { before: profile, plan })
}

/// Validate and plan a move. Lookup order: source profile, shelter,
/// destination profile.
pub fn reassign<D: Directory>(
  dir: &D,
  req: MoveRequest,
) -> Result<Planned<(Profile, Profile)>, D::Error> {
  let from = require_profile(dir, req.from_profile_id)?;
  require_shelter(dir, req.shelter_id)?;
  let to = require_profile(dir, req.to_profile_id)?;
  let plan = plan_move(&from, req.shelter_id, &to)?;
  Ok(Planned { before: (from, to), plan })
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::collections::{HashMap, HashSet};

  use chrono::Utc;

  use super::*;
  use crate::profile::ProfileKind;

  fn profile(kind: ProfileKind, shelter_id: Option<Uuid>) -> Profile {
    Profile {
      profile_id: Uuid::new_v4(),
      person_id: Uuid::new_v4(),
      kind,
      shelter_id,
      created_at: Utc::now(),
    }
  }

  fn leader(shelter_id: Option<Uuid>) -> Profile { profile(ProfileKind::Leader, shelter_id) }

  #[derive(Default)]
  struct MapDirectory {
    profiles: HashMap<Uuid, Profile>,
    shelters: HashSet<Uuid>,
  }

  impl MapDirectory {
    fn with(profiles: &[&Profile], shelters: &[Uuid]) -> Self {
      Self {
        profiles: profiles.iter().map(|p| (p.profile_id, (*p).clone())).collect(),
        shelters: shelters.iter().copied().collect(),
      }
    }
  }

  impl Directory for MapDirectory {
    type Error = Error;

    fn find_profile(&self, profile_id: Uuid) -> Result<Option<Profile>> {
      Ok(self.profiles.get(&profile_id).cloned())
    }

    fn shelter_exists(&self, shelter_id: Uuid) -> Result<bool> {
      Ok(self.shelters.contains(&shelter_id))
    }
  }

  // ── plan_assign ───────────────────────────────────────────────────────────

  #[test]
  fn assign_unlinked_links() {
    let s = Uuid::new_v4();
    let p = leader(None);
    let plan = plan_assign(&p, s, false).unwrap();
    assert_eq!(plan.changes(), &[LinkChange {
      profile_id: p.profile_id,
      from:       ShelterLink::Unlinked,
      to:         ShelterLink::Linked(s),
    }]);
  }

  #[test]
  fn assign_same_shelter_is_noop() {
    let s = Uuid::new_v4();
    let plan = plan_assign(&leader(Some(s)), s, false).unwrap();
    assert!(plan.is_noop());
  }

  #[test]
  fn assign_other_shelter_without_force_conflicts() {
    let (s2, s3) = (Uuid::new_v4(), Uuid::new_v4());
    let p = leader(Some(s3));
    let err = plan_assign(&p, s2, false).unwrap_err();
    assert!(matches!(err, Error::Conflict { linked, .. } if linked == s3));
  }

  #[test]
  fn assign_other_shelter_with_force_overwrites() {
    let (s2, s3) = (Uuid::new_v4(), Uuid::new_v4());
    let mut p = leader(Some(s3));
    let plan = plan_assign(&p, s2, true).unwrap();
    plan.apply_to(&mut p);
    assert_eq!(p.link(), ShelterLink::Linked(s2));
  }

  // ── plan_unassign ─────────────────────────────────────────────────────────

  #[test]
  fn unassign_matching_clears() {
    let s = Uuid::new_v4();
    let mut p = leader(Some(s));
    plan_unassign(&p, s).unwrap().apply_to(&mut p);
    assert_eq!(p.link(), ShelterLink::Unlinked);
  }

  #[test]
  fn unassign_mismatch_is_not_linked() {
    let p = leader(Some(Uuid::new_v4()));
    assert!(matches!(plan_unassign(&p, Uuid::new_v4()), Err(Error::NotLinked { .. })));
    assert!(matches!(plan_unassign(&leader(None), Uuid::new_v4()), Err(Error::NotLinked { .. })));
  }

  // ── plan_move ─────────────────────────────────────────────────────────────

  #[test]
  fn move_clears_source_before_setting_destination() {
    let s = Uuid::new_v4();
    let from = leader(Some(s));
    let to = leader(None);
    let plan = plan_move(&from, s, &to).unwrap();
    let changes = plan.changes();
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0].profile_id, from.profile_id);
    assert_eq!(changes[0].to, ShelterLink::Unlinked);
    assert_eq!(changes[1].profile_id, to.profile_id);
    assert_eq!(changes[1].to, ShelterLink::Linked(s));
  }

  #[test]
  fn move_onto_profile_already_holding_shelter_is_noop() {
    let s = Uuid::new_v4();
    let from = leader(Some(s));
    let to = leader(Some(s));
    assert!(plan_move(&from, s, &to).unwrap().is_noop());
  }

  #[test]
  fn move_to_self_is_noop() {
    let s = Uuid::new_v4();
    let p = leader(Some(s));
    assert!(plan_move(&p, s, &p).unwrap().is_noop());
  }

  #[test]
  fn move_to_profile_linked_elsewhere_conflicts() {
    let (s, other) = (Uuid::new_v4(), Uuid::new_v4());
    let to = leader(Some(other));
    let err = plan_move(&leader(Some(s)), s, &to).unwrap_err();
    assert!(matches!(err, Error::Conflict { profile_id, .. } if profile_id == to.profile_id));
  }

  #[test]
  fn move_across_kinds_is_rejected() {
    let s = Uuid::new_v4();
    let err = plan_move(&leader(Some(s)), s, &profile(ProfileKind::Teacher, None)).unwrap_err();
    assert!(matches!(err, Error::KindMismatch { .. }));
  }

  // ── Validation pipeline ───────────────────────────────────────────────────

  #[test]
  fn missing_profile_reported_before_missing_shelter() {
    let dir = MapDirectory::default();
    let err = assign(&dir, AssignRequest {
      profile_id: Uuid::new_v4(),
      shelter_id: Uuid::new_v4(),
      force:      false,
    })
    .unwrap_err();
    assert!(matches!(err, Error::ProfileNotFound(_)));
  }

  #[test]
  fn missing_shelter_reported_distinctly() {
    let p = leader(None);
    let dir = MapDirectory::with(&[&p], &[]);
    let shelter_id = Uuid::new_v4();
    let err = assign(&dir, AssignRequest { profile_id: p.profile_id, shelter_id, force: false })
      .unwrap_err();
    assert!(matches!(err, Error::ShelterNotFound(id) if id == shelter_id));
  }

  #[test]
  fn reassign_checks_destination_after_shelter() {
    let s = Uuid::new_v4();
    let from = leader(Some(s));
    let dir = MapDirectory::with(&[&from], &[s]);
    let missing = Uuid::new_v4();
    let err = reassign(&dir, MoveRequest {
      from_profile_id: from.profile_id,
      shelter_id:      s,
      to_profile_id:   missing,
    })
    .unwrap_err();
    assert!(matches!(err, Error::ProfileNotFound(id) if id == missing));
  }

  #[test]
  fn planned_updated_reflects_move() {
    let s = Uuid::new_v4();
    let from = leader(Some(s));
    let to = leader(None);
    let dir = MapDirectory::with(&[&from, &to], &[s]);
    let planned = reassign(&dir, MoveRequest {
      from_profile_id: from.profile_id,
      shelter_id:      s,
      to_profile_id:   to.profile_id,
    })
    .unwrap();
    let (from, to) = planned.updated();
    assert_eq!(from.link(), ShelterLink::Unlinked);
    assert_eq!(to.link(), ShelterLink::Linked(s));
  }
}
