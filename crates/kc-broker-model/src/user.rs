//! User identity domain model.
//!
//! A [`UserIdentity`] is the local side of a brokered login: it carries the
//! dedicated profile fields (email, first name, last name), a generic
//! multi-valued attribute store, and links to the external identities the
//! user has logged in with.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A link to an identity at an external identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederatedIdentity {
    /// Identity provider alias (e.g., "corporate-saml").
    pub identity_provider: String,
    /// Subject identifier of the user at the identity provider.
    pub user_id: String,
    /// Username at the identity provider.
    pub user_name: Option<String>,
}

impl FederatedIdentity {
    /// Creates a new federated identity link.
    #[must_use]
    pub fn new(provider: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            identity_provider: provider.into(),
            user_id: user_id.into(),
            user_name: None,
        }
    }

    /// Sets the username at the identity provider.
    #[must_use]
    pub fn with_user_name(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = Some(user_name.into());
        self
    }
}

/// A persisted user identity.
///
/// Dedicated profile fields are single-valued and optional; everything else
/// lives in the generic attribute store, where every attribute maps to an
/// ordered list of string values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Unique identifier.
    pub id: Uuid,
    /// Realm this user belongs to.
    pub realm_id: Uuid,
    /// Unique username within the realm.
    pub username: String,
    /// Whether the user account is enabled.
    pub enabled: bool,

    /// User's email address.
    pub email: Option<String>,
    /// User's first name.
    pub first_name: Option<String>,
    /// User's last name.
    pub last_name: Option<String>,

    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,

    /// Generic multi-valued attributes.
    pub attributes: HashMap<String, Vec<String>>,

    /// Linked external identities.
    pub federated_identities: Vec<FederatedIdentity>,
}

impl UserIdentity {
    /// Creates a new user with the given username.
    #[must_use]
    pub fn new(realm_id: Uuid, username: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            realm_id,
            username: username.into(),
            enabled: true,
            email: None,
            first_name: None,
            last_name: None,
            created_at: now,
            updated_at: now,
            attributes: HashMap::new(),
            federated_identities: Vec::new(),
        }
    }

    /// Sets the user's email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the user's first name.
    #[must_use]
    pub fn with_first_name(mut self, name: impl Into<String>) -> Self {
        self.first_name = Some(name.into());
        self
    }

    /// Sets the user's last name.
    #[must_use]
    pub fn with_last_name(mut self, name: impl Into<String>) -> Self {
        self.last_name = Some(name.into());
        self
    }

    /// Gets the user's email.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Sets the user's email.
    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = Some(email.into());
        self.touch();
    }

    /// Gets the user's first name.
    #[must_use]
    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    /// Sets the user's first name.
    pub fn set_first_name(&mut self, name: impl Into<String>) {
        self.first_name = Some(name.into());
        self.touch();
    }

    /// Gets the user's last name.
    #[must_use]
    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    /// Sets the user's last name.
    pub fn set_last_name(&mut self, name: impl Into<String>) {
        self.last_name = Some(name.into());
        self.touch();
    }

    /// Gets an attribute's values.
    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<&Vec<String>> {
        self.attributes.get(name)
    }

    /// Gets the first value of an attribute.
    #[must_use]
    pub fn get_first_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// Sets an attribute's values, replacing any existing values.
    pub fn set_attribute(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.attributes.insert(name.into(), values);
        self.touch();
    }

    /// Removes an attribute entirely.
    pub fn remove_attribute(&mut self, name: &str) {
        if self.attributes.remove(name).is_some() {
            self.touch();
        }
    }

    /// Adds a federated identity link.
    pub fn add_federated_identity(&mut self, identity: FederatedIdentity) {
        self.federated_identities.push(identity);
    }

    /// Finds a federated identity link by provider alias.
    #[must_use]
    pub fn get_federated_identity(&self, provider: &str) -> Option<&FederatedIdentity> {
        self.federated_identities
            .iter()
            .find(|fi| fi.identity_provider == provider)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_has_defaults() {
        let realm_id = Uuid::now_v7();
        let user = UserIdentity::new(realm_id, "jdoe");

        assert_eq!(user.username, "jdoe");
        assert_eq!(user.realm_id, realm_id);
        assert!(user.enabled);
        assert!(user.email.is_none());
        assert!(user.attributes.is_empty());
    }

    #[test]
    fn profile_setters_update_fields() {
        let mut user = UserIdentity::new(Uuid::now_v7(), "jdoe");

        user.set_email("jdoe@example.com");
        user.set_first_name("Jane");
        user.set_last_name("Doe");

        assert_eq!(user.email(), Some("jdoe@example.com"));
        assert_eq!(user.first_name(), Some("Jane"));
        assert_eq!(user.last_name(), Some("Doe"));
    }

    #[test]
    fn attributes_set_get_remove() {
        let mut user = UserIdentity::new(Uuid::now_v7(), "jdoe");

        user.set_attribute("department", vec!["Engineering".to_string()]);
        assert_eq!(user.get_first_attribute("department"), Some("Engineering"));

        user.set_attribute("department", vec!["Sales".to_string()]);
        assert_eq!(
            user.get_attribute("department"),
            Some(&vec!["Sales".to_string()])
        );

        user.remove_attribute("department");
        assert_eq!(user.get_attribute("department"), None);

        // Removing an absent attribute is a no-op.
        user.remove_attribute("missing");
    }

    #[test]
    fn federated_identity_lookup() {
        let mut user = UserIdentity::new(Uuid::now_v7(), "jdoe");
        user.add_federated_identity(
            FederatedIdentity::new("corporate-saml", "CN=Jane Doe").with_user_name("jane"),
        );

        let link = user.get_federated_identity("corporate-saml").unwrap();
        assert_eq!(link.user_id, "CN=Jane Doe");
        assert_eq!(link.user_name.as_deref(), Some("jane"));
        assert!(user.get_federated_identity("github").is_none());
    }
}
