//! Mapper configuration.
//!
//! Each mapper instance carries a free-form key/value configuration persisted
//! by the admin layer; the recognized keys and their defaults are declared
//! once per mapper kind as an immutable [`ConfigProperty`] schema.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Type of a mapper configuration property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigPropertyType {
    /// Free-form string value.
    #[default]
    String,
    /// Boolean value.
    Boolean,
    /// Comma-separated list value.
    List,
}

/// Declared configuration property of a mapper kind.
///
/// Used by the admin layer to render configuration forms and seed defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigProperty {
    /// Config key.
    pub name: &'static str,
    /// Display label.
    pub label: &'static str,
    /// Help text shown next to the field.
    pub help_text: &'static str,
    /// Value type.
    pub property_type: ConfigPropertyType,
    /// Default value, if any.
    pub default_value: Option<&'static str>,
}

/// Configuration of one identity-provider mapper instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapperConfig {
    /// Mapper ID.
    pub id: Uuid,

    /// Mapper name.
    pub name: String,

    /// Mapper type identifier.
    pub mapper_type: String,

    /// Alias of the identity provider this mapper belongs to.
    pub idp_alias: String,

    /// Mapper-specific configuration.
    pub config: HashMap<String, String>,
}

impl MapperConfig {
    /// Creates a new mapper config.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        mapper_type: impl Into<String>,
        idp_alias: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            mapper_type: mapper_type.into(),
            idp_alias: idp_alias.into(),
            config: HashMap::new(),
        }
    }

    /// Adds a config value.
    #[must_use]
    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Gets a config value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.config.get(key).map(String::as_str)
    }

    /// Gets a config value, treating an empty string as absent.
    #[must_use]
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }
}
