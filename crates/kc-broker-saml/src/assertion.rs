//! Assertion subject types.
//!
//! A trimmed view of the SAML assertion: just the subject and its name
//! identifier, which is all the broker mappers consume. Parsing, validation
//! and signatures live in the protocol layer.

use serde::{Deserialize, Serialize};

/// SAML Name ID.
///
/// The identifier of a subject. For the X509 subject mappers the value is
/// the informal Subject Name string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameId {
    /// The actual identifier value.
    pub value: String,

    /// The format URI of the name identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl NameId {
    /// X509 Subject Name format URI.
    pub const X509_SUBJECT_NAME: &'static str =
        "urn:oasis:names:tc:SAML:1.1:nameid-format:X509SubjectName";

    /// Creates a new name ID with the given value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            format: None,
        }
    }

    /// Creates a name ID in X509 Subject Name format.
    #[must_use]
    pub fn x509_subject(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            format: Some(Self::X509_SUBJECT_NAME.to_string()),
        }
    }
}

/// SAML assertion subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// The name identifier for the subject, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_id: Option<NameId>,
}

impl Subject {
    /// Creates a new subject with a name ID.
    #[must_use]
    pub fn new(name_id: NameId) -> Self {
        Self {
            name_id: Some(name_id),
        }
    }
}
