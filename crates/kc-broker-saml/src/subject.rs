//! X509 Subject Name parsing.
//!
//! The subject string carried in the NameID is an informal comma-separated
//! list of `key=value` entries (e.g. `CN=Jane Doe, EMAIL=jane@corp.example`).
//! It is not validated as an X.509 Distinguished Name; escaping and quoting
//! are out of scope.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{BrokerError, BrokerResult};

/// A parsed X509 Subject Name: field name to field value.
///
/// Built once per assertion and immutable afterwards. Field names are
/// case-sensitive. When the raw subject repeats a key, the rightmost entry
/// wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct X509SubjectName {
    fields: HashMap<String, String>,
}

impl X509SubjectName {
    /// Parses a raw subject string.
    ///
    /// Each comma-separated segment is trimmed and split on its first `=`.
    /// A non-empty segment without `=` yields
    /// [`BrokerError::MalformedSubjectEntry`]; segments that trim to nothing
    /// (trailing or doubled commas) are skipped. An empty subject string
    /// parses to an empty mapping.
    pub fn parse(raw: &str) -> BrokerResult<Self> {
        let mut fields = HashMap::new();
        for segment in raw.split(',') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let (key, value) = segment
                .split_once('=')
                .ok_or_else(|| BrokerError::malformed_entry(segment))?;
            fields.insert(key.to_string(), value.to_string());
        }
        Ok(Self { fields })
    }

    /// Gets a field's value.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Checks whether a field is present.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Number of parsed fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Checks whether no fields were parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
