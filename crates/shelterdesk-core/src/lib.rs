//! Core types and trait definitions for shelterdesk.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod assignment;
pub mod error;
pub mod pagela;
pub mod person;
pub mod profile;
pub mod shelter;
pub mod store;

pub use error::{Error, Failure, FailureKind, Result, UnknownName};
