//! Introspection configuration
//!
//! Read from the `[introspect]` section of a TOML file. Every key is
//! optional; omitted keys keep the framework defaults.
//!
//! ```toml
//! [introspect]
//! handled = ["JsonWriteNullProperties", "JsonProperty"]
//! write_null_properties = true
//!
//! [introspect.access]
//! global = "INVOKE_ALL"
//!
//! [introspect.access.types]
//! "com.acme.Widget" = "INVOKE_PUBLIC"
//! "com.acme.internal.*" = "NONE"
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::access::{AccessPolicy, InvokePermission};
use crate::annotation::AnnotationKind;
use crate::classify::KindTable;
use crate::error::{IntrospectError, IntrospectResult};

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    introspect: IntrospectConfig,
}

/// Settings for building annotated members
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntrospectConfig {
    /// Handled annotation kinds; `None` means the framework defaults
    pub handled: Option<Vec<String>>,
    /// Default answer for `will_write_null_properties`
    pub write_null_properties: bool,
    /// Access relaxation policy
    pub access: AccessConfig,
}

impl Default for IntrospectConfig {
    fn default() -> Self {
        Self {
            handled: None,
            write_null_properties: true,
            access: AccessConfig::default(),
        }
    }
}

/// `[introspect.access]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AccessConfig {
    /// Global default permission (pipe-separated names allowed)
    pub global: String,
    /// Per-type permissions in file order; keys may contain `*` / `**`
    /// wildcards and the first matching pattern wins
    pub types: toml::Table,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            global: InvokePermission::INVOKE_ALL.to_string(),
            types: toml::Table::new(),
        }
    }
}

impl IntrospectConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> IntrospectResult<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        tracing::debug!(
            handled = ?file.introspect.handled,
            write_null_properties = file.introspect.write_null_properties,
            "loaded introspection config"
        );
        Ok(file.introspect)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> IntrospectResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| IntrospectError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Build the classification table described by this configuration
    pub fn classifier(&self) -> KindTable {
        match &self.handled {
            Some(kinds) => kinds.iter().map(|k| AnnotationKind::new(k.as_str())).collect(),
            None => KindTable::framework_defaults(),
        }
    }

    /// Build the access policy described by this configuration
    pub fn access_policy(&self) -> IntrospectResult<AccessPolicy> {
        let mut policy = AccessPolicy::new();
        policy.set_global(InvokePermission::parse_combined(&self.access.global)?);
        for (pattern, value) in &self.access.types {
            let value = value.as_str().ok_or_else(|| IntrospectError::InvalidPermission {
                value: value.to_string(),
            })?;
            policy.add_entry(pattern, InvokePermission::parse_combined(value)?);
        }
        Ok(policy)
    }
}
