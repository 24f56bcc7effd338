//! Identity-provider mappers for X509 Subject Name NameIDs.
//!
//! Mappers run in two phases: `preprocess_federated_identity` stages values
//! into the transient [`BrokeredIdentityContext`] before the local user is
//! created or matched, and `update_brokered_user` reconciles the persisted
//! user on every subsequent login.

use kc_broker_model::UserIdentity;

use crate::config::{ConfigProperty, ConfigPropertyType, MapperConfig};
use crate::context::BrokeredIdentityContext;
use crate::error::BrokerResult;
use crate::subject::X509SubjectName;

/// Provider ID of the SAML identity provider these mappers are compatible with.
pub const SAML_PROVIDER_ID: &str = "saml";

/// Base trait for identity-provider mappers.
pub trait IdentityProviderMapper: Send + Sync {
    /// Returns the mapper type identifier.
    fn mapper_type(&self) -> &'static str;

    /// Returns the display category for the admin console.
    fn display_category(&self) -> &'static str;

    /// Returns the display name for this mapper.
    fn display_type(&self) -> &'static str;

    /// Returns help text describing this mapper.
    fn help_text(&self) -> &'static str;

    /// Returns the identity provider types this mapper applies to.
    fn compatible_providers(&self) -> &'static [&'static str] {
        &[SAML_PROVIDER_ID]
    }

    /// Returns the declared configuration properties of this mapper kind.
    fn config_properties(&self) -> &'static [ConfigProperty];

    /// Stages values into the login context before the user is created or
    /// matched.
    fn preprocess_federated_identity(
        &self,
        context: &mut BrokeredIdentityContext,
        config: &MapperConfig,
    ) -> BrokerResult<()> {
        let _ = (context, config);
        Ok(())
    }

    /// Reconciles the persisted user against the assertion on login.
    fn update_brokered_user(
        &self,
        user: &mut UserIdentity,
        context: &BrokeredIdentityContext,
        config: &MapperConfig,
    ) -> BrokerResult<()> {
        let _ = (user, context, config);
        Ok(())
    }
}

/// Selects a username from a parsed subject.
///
/// Returns the value of the first priority field present in `subject`
/// (case-sensitive match); when none is present the whole raw subject string
/// is the fallback username. Pure, no side effects.
#[must_use]
pub fn select_username(subject: &X509SubjectName, raw: &str, priority: &[&str]) -> String {
    priority
        .iter()
        .find_map(|field| subject.get(field))
        .unwrap_or(raw)
        .to_string()
}

/// Target of an attribute mapping, normalized from the configured
/// `user.attribute` name.
///
/// The three dedicated user properties are matched case-insensitively;
/// anything else targets the generic attribute store under the configured
/// name as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetField {
    /// The user's email property.
    Email,
    /// The user's first name property.
    FirstName,
    /// The user's last name property.
    LastName,
    /// A generic user attribute.
    Generic(String),
}

impl TargetField {
    /// Normalizes a configured attribute name into a dispatch target.
    #[must_use]
    pub fn from_attribute_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("email") {
            Self::Email
        } else if name.eq_ignore_ascii_case("firstName") {
            Self::FirstName
        } else if name.eq_ignore_ascii_case("lastName") {
            Self::LastName
        } else {
            Self::Generic(name.to_string())
        }
    }
}

/// Derives the username to import from the X509 Subject Name.
///
/// Iterates the configured priority fields and uses the first one present in
/// the parsed subject; when none matches, the whole subject string becomes
/// the username.
#[derive(Debug, Clone, Default)]
pub struct UsernameX509SubjectNameMapper;

impl UsernameX509SubjectNameMapper {
    /// Config key for the comma-separated priority field list.
    pub const FIELD: &'static str = "field";

    /// Default priority field list.
    pub const DEFAULT_FIELDS: &'static str = "EMAIL,CN,SERIALNUMBER";

    /// Mapper type identifier.
    pub const PROVIDER_ID: &'static str = "saml-username-x509-subject-idp-mapper";

    const CONFIG_PROPERTIES: &'static [ConfigProperty] = &[ConfigProperty {
        name: Self::FIELD,
        label: "Field",
        help_text: "Comma separated fields of the X509 Subject to use (first found used) \
                    to format the username to import. Typical fields are commonName (CN), \
                    serial number (SERIALNUMBER), email (EMAIL), default to all the \
                    subjectName",
        property_type: ConfigPropertyType::String,
        default_value: Some(Self::DEFAULT_FIELDS),
    }];
}

impl IdentityProviderMapper for UsernameX509SubjectNameMapper {
    fn mapper_type(&self) -> &'static str {
        Self::PROVIDER_ID
    }

    fn display_category(&self) -> &'static str {
        "Preprocessor"
    }

    fn display_type(&self) -> &'static str {
        "Username X509 Subject Name Importer"
    }

    fn help_text(&self) -> &'static str {
        "Select X509 Subject Name relevant field for the username to import"
    }

    fn config_properties(&self) -> &'static [ConfigProperty] {
        Self::CONFIG_PROPERTIES
    }

    fn preprocess_federated_identity(
        &self,
        context: &mut BrokeredIdentityContext,
        config: &MapperConfig,
    ) -> BrokerResult<()> {
        let raw = context.assertion_subject()?.to_string();
        let subject = X509SubjectName::parse(&raw)?;

        let fields = config.get_non_empty(Self::FIELD).unwrap_or(Self::DEFAULT_FIELDS);
        let priority: Vec<&str> = fields.split(',').map(str::trim).collect();

        let username = select_username(&subject, &raw, &priority);
        tracing::debug!(
            username = %username,
            idp = %context.idp_alias,
            "Derived username from X509 subject"
        );
        context.stage_username(&username);
        Ok(())
    }

    // Username derivation only happens while the brokered identity is being
    // built; logins against an existing user leave the username alone.
}

/// Imports one X509 Subject Name field into a user property or attribute.
///
/// The configured target name dispatches to the email, first name or last
/// name property (case-insensitive) or to a generic attribute. Generic
/// attributes are reconciled on every login: removed when the field is no
/// longer sent, added when new, overwritten when changed.
#[derive(Debug, Clone, Default)]
pub struct UserAttributeX509SubjectNameMapper;

impl UserAttributeX509SubjectNameMapper {
    /// Config key for the subject field to look up.
    pub const SUBJECT_FIELD: &'static str = "subject.field";

    /// Config key for the target user property or attribute name.
    pub const USER_ATTRIBUTE: &'static str = "user.attribute";

    /// Mapper type identifier.
    pub const PROVIDER_ID: &'static str = "saml-user-attribute-x509-subject-idp-mapper";

    const CONFIG_PROPERTIES: &'static [ConfigProperty] = &[
        ConfigProperty {
            name: Self::SUBJECT_FIELD,
            label: "Subject Field Name",
            help_text: "Name of the field to search for in X509 Subject Name.",
            property_type: ConfigPropertyType::String,
            default_value: None,
        },
        ConfigProperty {
            name: Self::USER_ATTRIBUTE,
            label: "User Attribute Name",
            help_text: "User attribute name to store the field value. Use email, lastName, \
                        and firstName to map to those predefined user properties.",
            property_type: ConfigPropertyType::String,
            default_value: None,
        },
    ];

    /// Parses the assertion subject and looks up the configured field.
    fn field_value(
        context: &BrokeredIdentityContext,
        config: &MapperConfig,
    ) -> BrokerResult<Option<String>> {
        let raw = context.assertion_subject()?;
        let subject = X509SubjectName::parse(raw)?;
        let field = config.get(Self::SUBJECT_FIELD).unwrap_or_default();
        Ok(subject.get(field).map(str::to_string))
    }
}

impl IdentityProviderMapper for UserAttributeX509SubjectNameMapper {
    fn mapper_type(&self) -> &'static str {
        Self::PROVIDER_ID
    }

    fn display_category(&self) -> &'static str {
        "Attribute Importer"
    }

    fn display_type(&self) -> &'static str {
        "Attribute Importer"
    }

    fn help_text(&self) -> &'static str {
        "Import X509 Subject Name field if it exists in NameID into the specified user \
         property or attribute."
    }

    fn config_properties(&self) -> &'static [ConfigProperty] {
        Self::CONFIG_PROPERTIES
    }

    fn preprocess_federated_identity(
        &self,
        context: &mut BrokeredIdentityContext,
        config: &MapperConfig,
    ) -> BrokerResult<()> {
        let Some(attribute) = config.get_non_empty(Self::USER_ATTRIBUTE) else {
            return Ok(());
        };
        let target = TargetField::from_attribute_name(attribute);

        let Some(value) = Self::field_value(context, config)? else {
            return Ok(());
        };
        if value.is_empty() {
            return Ok(());
        }

        tracing::debug!(
            field = ?target,
            idp = %context.idp_alias,
            "Staging X509 subject field into login context"
        );
        match target {
            TargetField::Email => context.stage_email(&value),
            TargetField::FirstName => context.stage_first_name(&value),
            TargetField::LastName => context.stage_last_name(&value),
            TargetField::Generic(name) => context.stage_attribute(name, &value),
        }
        Ok(())
    }

    fn update_brokered_user(
        &self,
        user: &mut UserIdentity,
        context: &BrokeredIdentityContext,
        config: &MapperConfig,
    ) -> BrokerResult<()> {
        let Some(attribute) = config.get_non_empty(Self::USER_ATTRIBUTE) else {
            return Ok(());
        };
        let new_value = Self::field_value(context, config)?;

        match TargetField::from_attribute_name(attribute) {
            // Dedicated properties keep their last known value; an absent or
            // empty field never clears them.
            TargetField::Email => {
                if let Some(value) = new_value.filter(|v| !v.is_empty()) {
                    user.set_email(value);
                }
            }
            TargetField::FirstName => {
                if let Some(value) = new_value.filter(|v| !v.is_empty()) {
                    user.set_first_name(value);
                }
            }
            TargetField::LastName => {
                if let Some(value) = new_value.filter(|v| !v.is_empty()) {
                    user.set_last_name(value);
                }
            }
            TargetField::Generic(name) => {
                let current = user.get_attribute(&name).cloned();
                match (new_value, current) {
                    (None, _) => {
                        // Field no longer sent by the brokered idp, remove it.
                        tracing::debug!(attribute = %name, "Removing stale brokered attribute");
                        user.remove_attribute(&name);
                    }
                    (Some(value), None) => {
                        // New field sent by the brokered idp, add it.
                        user.set_attribute(name, vec![value]);
                    }
                    (Some(value), Some(current)) => {
                        if current.as_slice() != std::slice::from_ref(&value) {
                            // Field value changed since the last login, update it.
                            user.set_attribute(name, vec![value]);
                        }
                        // Otherwise the attribute is already up to date.
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertion::{NameId, Subject};
    use uuid::Uuid;

    const SUBJECT: &str = "CN=Jane Doe, SERIALNUMBER=42, EMAIL=jane@corp.example";

    fn context(subject: &str) -> BrokeredIdentityContext {
        BrokeredIdentityContext::new("corporate-saml", subject)
            .with_subject(Subject::new(NameId::x509_subject(subject)))
    }

    fn username_config(fields: &str) -> MapperConfig {
        MapperConfig::new(
            "username-mapper",
            UsernameX509SubjectNameMapper::PROVIDER_ID,
            "corporate-saml",
        )
        .with_config(UsernameX509SubjectNameMapper::FIELD, fields)
    }

    fn attribute_config(subject_field: &str, user_attribute: &str) -> MapperConfig {
        MapperConfig::new(
            "attribute-mapper",
            UserAttributeX509SubjectNameMapper::PROVIDER_ID,
            "corporate-saml",
        )
        .with_config(UserAttributeX509SubjectNameMapper::SUBJECT_FIELD, subject_field)
        .with_config(UserAttributeX509SubjectNameMapper::USER_ATTRIBUTE, user_attribute)
    }

    #[test]
    fn select_first_matching_priority_field() {
        let subject = X509SubjectName::parse("CN=A").unwrap();
        assert_eq!(select_username(&subject, "raw", &["EMAIL", "CN"]), "A");
    }

    #[test]
    fn select_falls_back_to_raw_subject() {
        let subject = X509SubjectName::parse("CN=A").unwrap();
        assert_eq!(select_username(&subject, "raw", &["EMAIL"]), "raw");
    }

    #[test]
    fn target_field_dispatch_is_case_insensitive() {
        assert_eq!(TargetField::from_attribute_name("EMAIL"), TargetField::Email);
        assert_eq!(
            TargetField::from_attribute_name("firstname"),
            TargetField::FirstName
        );
        assert_eq!(
            TargetField::from_attribute_name("LastName"),
            TargetField::LastName
        );
        assert_eq!(
            TargetField::from_attribute_name("department"),
            TargetField::Generic("department".to_string())
        );
    }

    #[test]
    fn username_mapper_uses_priority_order() {
        let mapper = UsernameX509SubjectNameMapper;
        let mut ctx = context(SUBJECT);

        mapper
            .preprocess_federated_identity(&mut ctx, &username_config("EMAIL,CN,SERIALNUMBER"))
            .unwrap();
        assert_eq!(ctx.username(), Some("jane@corp.example"));

        let mut ctx = context(SUBJECT);
        mapper
            .preprocess_federated_identity(&mut ctx, &username_config("CN,EMAIL"))
            .unwrap();
        assert_eq!(ctx.username(), Some("Jane Doe"));
    }

    #[test]
    fn username_mapper_defaults_when_field_unset() {
        let mapper = UsernameX509SubjectNameMapper;
        let config = MapperConfig::new(
            "username-mapper",
            UsernameX509SubjectNameMapper::PROVIDER_ID,
            "corporate-saml",
        );
        let mut ctx = context(SUBJECT);

        mapper.preprocess_federated_identity(&mut ctx, &config).unwrap();
        assert_eq!(ctx.username(), Some("jane@corp.example"));
    }

    #[test]
    fn username_mapper_falls_back_to_whole_subject() {
        let mapper = UsernameX509SubjectNameMapper;
        let mut ctx = context("OU=People, O=Corp");

        mapper
            .preprocess_federated_identity(&mut ctx, &username_config("EMAIL,CN"))
            .unwrap();
        assert_eq!(ctx.username(), Some("OU=People, O=Corp"));
    }

    #[test]
    fn username_mapper_surfaces_parse_error() {
        let mapper = UsernameX509SubjectNameMapper;
        let mut ctx = context("NOTANENTRY");

        let err = mapper
            .preprocess_federated_identity(&mut ctx, &username_config("EMAIL"))
            .unwrap_err();
        assert!(err.is_malformed_entry());
        assert!(ctx.username().is_none());
    }

    #[test]
    fn username_mapper_update_is_a_noop() {
        let mapper = UsernameX509SubjectNameMapper;
        let ctx = context(SUBJECT);
        let mut user = UserIdentity::new(Uuid::now_v7(), "existing");

        mapper
            .update_brokered_user(&mut user, &ctx, &username_config("EMAIL"))
            .unwrap();
        assert_eq!(user.username, "existing");
    }

    #[test]
    fn preprocess_routes_each_dedicated_slot() {
        let mapper = UserAttributeX509SubjectNameMapper;
        let mut ctx = context(SUBJECT);

        mapper
            .preprocess_federated_identity(&mut ctx, &attribute_config("EMAIL", "email"))
            .unwrap();
        mapper
            .preprocess_federated_identity(&mut ctx, &attribute_config("CN", "firstName"))
            .unwrap();
        mapper
            .preprocess_federated_identity(&mut ctx, &attribute_config("SERIALNUMBER", "lastName"))
            .unwrap();

        assert_eq!(ctx.email(), Some("jane@corp.example"));
        assert_eq!(ctx.first_name(), Some("Jane Doe"));
        assert_eq!(ctx.last_name(), Some("42"));
    }

    #[test]
    fn preprocess_stages_generic_attribute() {
        let mapper = UserAttributeX509SubjectNameMapper;
        let mut ctx = context(SUBJECT);

        mapper
            .preprocess_federated_identity(&mut ctx, &attribute_config("CN", "common-name"))
            .unwrap();
        assert_eq!(
            ctx.attributes().get("common-name"),
            Some(&vec!["Jane Doe".to_string()])
        );
    }

    #[test]
    fn preprocess_skips_empty_target_and_missing_field() {
        let mapper = UserAttributeX509SubjectNameMapper;

        let mut ctx = context(SUBJECT);
        mapper
            .preprocess_federated_identity(&mut ctx, &attribute_config("EMAIL", ""))
            .unwrap();
        assert!(ctx.email().is_none());

        let mut ctx = context(SUBJECT);
        mapper
            .preprocess_federated_identity(&mut ctx, &attribute_config("OU", "department"))
            .unwrap();
        assert!(ctx.attributes().is_empty());
    }

    #[test]
    fn update_sets_dedicated_fields() {
        let mapper = UserAttributeX509SubjectNameMapper;
        let ctx = context(SUBJECT);
        let mut user = UserIdentity::new(Uuid::now_v7(), "jane");

        mapper
            .update_brokered_user(&mut user, &ctx, &attribute_config("EMAIL", "EMAIL"))
            .unwrap();
        mapper
            .update_brokered_user(&mut user, &ctx, &attribute_config("CN", "firstName"))
            .unwrap();

        assert_eq!(user.email(), Some("jane@corp.example"));
        assert_eq!(user.first_name(), Some("Jane Doe"));
    }

    #[test]
    fn update_never_clears_dedicated_fields() {
        let mapper = UserAttributeX509SubjectNameMapper;
        let ctx = context("CN=Jane Doe");
        let mut user =
            UserIdentity::new(Uuid::now_v7(), "jane").with_email("kept@corp.example");

        // EMAIL is absent from the subject; the stored email must survive.
        mapper
            .update_brokered_user(&mut user, &ctx, &attribute_config("EMAIL", "email"))
            .unwrap();
        assert_eq!(user.email(), Some("kept@corp.example"));
    }

    #[test]
    fn update_adds_new_generic_attribute() {
        let mapper = UserAttributeX509SubjectNameMapper;
        let ctx = context(SUBJECT);
        let mut user = UserIdentity::new(Uuid::now_v7(), "jane");

        mapper
            .update_brokered_user(&mut user, &ctx, &attribute_config("SERIALNUMBER", "serial"))
            .unwrap();
        assert_eq!(user.get_attribute("serial"), Some(&vec!["42".to_string()]));
    }

    #[test]
    fn update_overwrites_changed_generic_attribute() {
        let mapper = UserAttributeX509SubjectNameMapper;
        let ctx = context(SUBJECT);
        let mut user = UserIdentity::new(Uuid::now_v7(), "jane");
        user.set_attribute("serial", vec!["x".to_string()]);

        mapper
            .update_brokered_user(&mut user, &ctx, &attribute_config("SERIALNUMBER", "serial"))
            .unwrap();
        assert_eq!(user.get_attribute("serial"), Some(&vec!["42".to_string()]));
    }

    #[test]
    fn update_removes_generic_attribute_no_longer_sent() {
        let mapper = UserAttributeX509SubjectNameMapper;
        let ctx = context("CN=Jane Doe");
        let mut user = UserIdentity::new(Uuid::now_v7(), "jane");
        user.set_attribute("serial", vec!["x".to_string()]);

        mapper
            .update_brokered_user(&mut user, &ctx, &attribute_config("SERIALNUMBER", "serial"))
            .unwrap();
        assert_eq!(user.get_attribute("serial"), None);
    }

    #[test]
    fn update_is_idempotent_for_generic_attributes() {
        let mapper = UserAttributeX509SubjectNameMapper;
        let ctx = context(SUBJECT);
        let mut user = UserIdentity::new(Uuid::now_v7(), "jane");
        let config = attribute_config("SERIALNUMBER", "serial");

        mapper.update_brokered_user(&mut user, &ctx, &config).unwrap();
        let after_first = user.get_attribute("serial").cloned();
        mapper.update_brokered_user(&mut user, &ctx, &config).unwrap();

        assert_eq!(user.get_attribute("serial").cloned(), after_first);
        assert_eq!(user.get_attribute("serial"), Some(&vec!["42".to_string()]));
    }

    #[test]
    fn update_with_empty_target_is_a_noop() {
        let mapper = UserAttributeX509SubjectNameMapper;
        let ctx = context(SUBJECT);
        let mut user = UserIdentity::new(Uuid::now_v7(), "jane");

        mapper
            .update_brokered_user(&mut user, &ctx, &attribute_config("EMAIL", ""))
            .unwrap();
        assert!(user.email.is_none());
        assert!(user.attributes.is_empty());
    }

    #[test]
    fn mapper_metadata() {
        let username = UsernameX509SubjectNameMapper;
        assert_eq!(username.mapper_type(), "saml-username-x509-subject-idp-mapper");
        assert_eq!(username.display_category(), "Preprocessor");
        assert_eq!(
            username.config_properties()[0].default_value,
            Some("EMAIL,CN,SERIALNUMBER")
        );

        let attribute = UserAttributeX509SubjectNameMapper;
        assert_eq!(
            attribute.mapper_type(),
            "saml-user-attribute-x509-subject-idp-mapper"
        );
        assert_eq!(attribute.compatible_providers(), &[SAML_PROVIDER_ID]);
        assert_eq!(attribute.config_properties().len(), 2);
    }
}
