//! Error types for `shelterdesk-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::{person::Role, profile::ProfileKind};

#[derive(Debug, Error)]
pub enum Error {
  #[error("person not found: {0}")]
  PersonNotFound(Uuid),

  #[error("profile not found: {0}")]
  ProfileNotFound(Uuid),

  #[error("shelter not found: {0}")]
  ShelterNotFound(Uuid),

  #[error("profile {profile_id} is already linked to shelter {linked}")]
  Conflict { profile_id: Uuid, linked: Uuid },

  #[error("profile {profile_id} is not linked to shelter {shelter_id}")]
  NotLinked { profile_id: Uuid, shelter_id: Uuid },

  #[error("cannot move a {from:?} shelter link onto a {to:?} profile")]
  KindMismatch { from: ProfileKind, to: ProfileKind },

  #[error("person {person_id} already has a {kind:?} profile")]
  AlreadyPromoted { person_id: Uuid, kind: ProfileKind },

  #[error("person {person_id} has role {role:?}, which is not allowed here")]
  InvalidRole { person_id: Uuid, role: Role },

  #[error("transaction failed: {0}")]
  TransactionFailed(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A role or profile kind name that matches no variant.
#[derive(Debug, Error)]
#[error("unknown {what} {value:?} (expected one of: {expected})")]
pub struct UnknownName {
  pub what:     &'static str,
  pub value:    String,
  pub expected: &'static str,
}

// ─── Classification ──────────────────────────────────────────────────────────

/// Coarse class of a failure, used by transports to pick a response status.
///
/// Everything but `Transaction` and `Internal` is the caller's fault and is
/// not worth retrying as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
  NotFound,
  Conflict,
  NotLinked,
  Invalid,
  /// A write or commit failed after every precondition passed. Prior state
  /// was restored; a retry must re-read current state first.
  Transaction,
  Internal,
}

/// An error that can report its [`FailureKind`].
pub trait Failure: std::error::Error + Send + Sync + 'static {
  fn kind(&self) -> FailureKind;
}

impl Failure for Error {
  fn kind(&self) -> FailureKind {
    match self {
      Self::PersonNotFound(_)
      | Self::ProfileNotFound(_)
      | Self::ShelterNotFound(_) => FailureKind::NotFound,
      Self::Conflict { .. } | Self::AlreadyPromoted { .. } => {
        FailureKind::Conflict
      }
      Self::NotLinked { .. } => FailureKind::NotLinked,
      Self::KindMismatch { .. } | Self::InvalidRole { .. } => {
        FailureKind::Invalid
      }
      Self::TransactionFailed(_) => FailureKind::Transaction,
    }
  }
}
