//! Entity management service API
//!
//! Stages talk to the remote service only through the [`EntityService`] trait.
//! [`EntityClient`] implements it over HTTP; tests substitute an in-memory fake.

pub mod client;
pub mod constants;
pub mod models;

pub use client::{EntityClient, EntityService};
pub use models::{AccessToken, EntityKind, EntityTypeRef, MappingIds, UserRolePayload};

#[cfg(test)]
pub(crate) mod fake;
