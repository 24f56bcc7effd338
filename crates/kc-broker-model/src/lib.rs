//! # kc-broker-model
//!
//! User identity model consumed by the identity-broker mappers.
//!
//! This crate provides the persisted user entity ([`UserIdentity`]) with its
//! dedicated profile fields, multi-valued attribute store, and federated
//! identity links. Durable storage itself lives behind an external provider;
//! only the read/write contract is modeled here.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod user;

pub use user::{FederatedIdentity, UserIdentity};
