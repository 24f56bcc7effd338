//! # kc-broker-saml
//!
//! Identity-broker mappers for SAML assertions whose subject NameID carries
//! an X509-style Subject Name (an informal comma-separated `key=value` list,
//! not a validated X.509 Distinguished Name).
//!
//! Two mappers are provided:
//!
//! - [`UsernameX509SubjectNameMapper`] — derives the username to import from
//!   a priority-ordered list of subject fields, falling back to the whole
//!   subject string.
//! - [`UserAttributeX509SubjectNameMapper`] — imports a single subject field
//!   into a user property (email, first name, last name) or a generic user
//!   attribute, reconciling the persisted value on every login.
//!
//! The SAML protocol exchange, signature validation, and user storage belong
//! to external collaborators; this crate only consumes the assertion subject
//! exposed by the per-login [`BrokeredIdentityContext`] and the read/write
//! contract of `kc_broker_model::UserIdentity`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod assertion;
pub mod config;
pub mod context;
pub mod error;
pub mod mapper;
pub mod subject;

pub use assertion::{NameId, Subject};
pub use config::{ConfigProperty, ConfigPropertyType, MapperConfig};
pub use context::BrokeredIdentityContext;
pub use error::{BrokerError, BrokerResult};
pub use mapper::{
    select_username, IdentityProviderMapper, TargetField, UserAttributeX509SubjectNameMapper,
    UsernameX509SubjectNameMapper,
};
pub use subject::X509SubjectName;
