//! Brokered identity context.
//!
//! Transient per-login-attempt state bridging the assertion and local user
//! creation. Mappers stage values into typed slots during the preprocess
//! phase; the broker's user-creation step consumes them afterwards. The
//! context is dropped at the end of the login flow.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::assertion::Subject;
use crate::error::{BrokerError, BrokerResult};

/// Per-login context for a brokered identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokeredIdentityContext {
    /// Alias of the identity provider the assertion came from.
    pub idp_alias: String,

    /// Subject identifier of the user at the identity provider.
    pub broker_user_id: String,

    /// The assertion subject, as delivered by the SAML layer.
    subject: Option<Subject>,

    username: Option<String>,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    attributes: HashMap<String, Vec<String>>,
}

impl BrokeredIdentityContext {
    /// Creates a new context for one login attempt.
    #[must_use]
    pub fn new(idp_alias: impl Into<String>, broker_user_id: impl Into<String>) -> Self {
        Self {
            idp_alias: idp_alias.into(),
            broker_user_id: broker_user_id.into(),
            subject: None,
            username: None,
            email: None,
            first_name: None,
            last_name: None,
            attributes: HashMap::new(),
        }
    }

    /// Attaches the assertion subject.
    #[must_use]
    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subject = Some(subject);
        self
    }

    /// Returns the raw NameID value of the assertion subject.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::UnsupportedSubject`] when the assertion carries
    /// no subject or the subject has no name identifier.
    pub fn assertion_subject(&self) -> BrokerResult<&str> {
        let subject = self
            .subject
            .as_ref()
            .ok_or_else(|| BrokerError::unsupported_subject("assertion has no subject"))?;
        let name_id = subject
            .name_id
            .as_ref()
            .ok_or_else(|| BrokerError::unsupported_subject("subject has no name identifier"))?;
        Ok(&name_id.value)
    }

    /// The staged username, if any.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// The staged email, if any.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// The staged first name, if any.
    #[must_use]
    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    /// The staged last name, if any.
    #[must_use]
    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    /// The staged generic attributes.
    #[must_use]
    pub fn attributes(&self) -> &HashMap<String, Vec<String>> {
        &self.attributes
    }

    /// Stages the username to import.
    pub fn stage_username(&mut self, value: &str) {
        Self::stage(&mut self.username, value);
    }

    /// Stages the email to import.
    pub fn stage_email(&mut self, value: &str) {
        Self::stage(&mut self.email, value);
    }

    /// Stages the first name to import.
    pub fn stage_first_name(&mut self, value: &str) {
        Self::stage(&mut self.first_name, value);
    }

    /// Stages the last name to import.
    pub fn stage_last_name(&mut self, value: &str) {
        Self::stage(&mut self.last_name, value);
    }

    /// Stages a generic single-valued attribute.
    ///
    /// Blank values are never staged.
    pub fn stage_attribute(&mut self, name: impl Into<String>, value: &str) {
        if value.trim().is_empty() {
            return;
        }
        self.attributes.insert(name.into(), vec![value.to_string()]);
    }

    // Slots only accept non-blank values; a later mapper in the chain may
    // overwrite an earlier one's staging.
    fn stage(slot: &mut Option<String>, value: &str) {
        if !value.trim().is_empty() {
            *slot = Some(value.to_string());
        }
    }
}
