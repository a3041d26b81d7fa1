//! Access relaxation
//!
//! Before a member can be invoked reflectively regardless of its declared
//! visibility, the host must agree to relax that visibility. The decision is
//! delegated to an [`AccessControl`] implementation.
//!
//! [`AccessPolicy`] resolves invoke permissions per declaring type, most
//! specific first:
//!
//! 1. exact type entries (`com.acme.Widget`)
//! 2. pattern rules in insertion order (`com.acme.*`, `com.acme.**`, `*`)
//! 3. the global default
//!
//! ```toml
//! [introspect.access]
//! global = "INVOKE_ALL"
//!
//! [introspect.access.types]
//! "com.acme.Widget" = "INVOKE_PUBLIC"
//! "com.acme.internal.*" = "NONE"
//! ```

use rustc_hash::FxHashMap;

use crate::error::{IntrospectError, IntrospectResult};
use crate::handle::{method_label, MethodHandle};

/// Collaborator able to relax visibility restrictions on a method
pub trait AccessControl: Send + Sync {
    /// Make `method` invocable regardless of its declared visibility
    fn relax(&self, method: &dyn MethodHandle) -> IntrospectResult<()>;
}

/// Grants every relaxation request
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl AccessControl for AllowAll {
    fn relax(&self, method: &dyn MethodHandle) -> IntrospectResult<()> {
        tracing::trace!(
            declaring = %method.declaring_type(),
            method = method.name(),
            "access relaxed"
        );
        Ok(())
    }
}

/// Invoke permission flags (bitflags)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InvokePermission(u8);

impl InvokePermission {
    /// No reflective invocation allowed
    pub const NONE: Self = Self(0x00);
    /// Invoke public methods
    pub const INVOKE_PUBLIC: Self = Self(0x01);
    /// Invoke non-public methods
    pub const INVOKE_PRIVATE: Self = Self(0x02);
    /// INVOKE_PUBLIC | INVOKE_PRIVATE
    pub const INVOKE_ALL: Self = Self(0x03);

    /// Create from raw bits
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Get raw bits
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Check if permission contains a flag
    pub const fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Union of permissions
    pub const fn union(&self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Parse a single permission name, hex (`0x03`) or decimal value
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "NONE" => Some(Self::NONE),
            "INVOKE_PUBLIC" => Some(Self::INVOKE_PUBLIC),
            "INVOKE_PRIVATE" => Some(Self::INVOKE_PRIVATE),
            "INVOKE_ALL" | "ALL" => Some(Self::INVOKE_ALL),
            _ => {
                if let Some(hex) = s.strip_prefix("0x") {
                    u8::from_str_radix(hex, 16).ok().map(Self::from_bits)
                } else {
                    s.parse::<u8>().ok().map(Self::from_bits)
                }
            }
        }
    }

    /// Parse pipe-separated flags (e.g., "INVOKE_PUBLIC|INVOKE_PRIVATE")
    pub fn parse_combined(s: &str) -> IntrospectResult<Self> {
        let mut result = Self::NONE;
        for part in s.split('|') {
            let perm = Self::parse(part.trim()).ok_or_else(|| IntrospectError::InvalidPermission {
                value: s.to_string(),
            })?;
            result = result.union(perm);
        }
        Ok(result)
    }
}

impl Default for InvokePermission {
    fn default() -> Self {
        Self::INVOKE_ALL
    }
}

impl std::fmt::Display for InvokePermission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::NONE => f.write_str("NONE"),
            Self::INVOKE_PUBLIC => f.write_str("INVOKE_PUBLIC"),
            Self::INVOKE_PRIVATE => f.write_str("INVOKE_PRIVATE"),
            Self::INVOKE_ALL => f.write_str("INVOKE_ALL"),
            _ => write!(f, "0x{:02X}", self.0),
        }
    }
}

/// Type permission pattern (supports wildcards)
#[derive(Debug, Clone)]
pub struct TypeAccessRule {
    /// Pattern (e.g., "com.acme.Widget", "com.acme.*", "com.acme.**", "*")
    pub pattern: String,
    /// Permissions for matching types
    pub permissions: InvokePermission,
}

impl TypeAccessRule {
    /// Check if a fully qualified type name matches this pattern
    pub fn matches(&self, type_name: &str) -> bool {
        if self.pattern == "**" || self.pattern == "*" {
            return true;
        }

        if let Some(prefix) = self.pattern.strip_suffix(".**") {
            type_name
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('.'))
        } else if let Some(prefix) = self.pattern.strip_suffix(".*") {
            type_name
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix('.'))
                .is_some_and(|member| !member.is_empty() && !member.contains('.'))
        } else {
            self.pattern == type_name
        }
    }
}

/// Permission-based access control
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    /// Global default permissions
    global_default: InvokePermission,

    /// Exact type permissions: type name -> permissions
    type_permissions: FxHashMap<String, InvokePermission>,

    /// Pattern rules, first match wins
    type_rules: Vec<TypeAccessRule>,
}

impl AccessPolicy {
    /// Create a policy that allows every invocation
    pub fn new() -> Self {
        Self::default()
    }

    /// Set global default permissions
    pub fn set_global(&mut self, permissions: InvokePermission) {
        self.global_default = permissions;
    }

    /// Get global default permissions
    pub fn global(&self) -> InvokePermission {
        self.global_default
    }

    /// Set permissions for one exact type
    pub fn set_type(&mut self, type_name: &str, permissions: InvokePermission) {
        self.type_permissions.insert(type_name.to_string(), permissions);
    }

    /// Add a type permission rule
    pub fn add_rule(&mut self, rule: TypeAccessRule) {
        self.type_rules.push(rule);
    }

    /// Add a permission entry, as an exact type or a rule if it has wildcards
    pub fn add_entry(&mut self, pattern: &str, permissions: InvokePermission) {
        if pattern.contains('*') {
            self.add_rule(TypeAccessRule {
                pattern: pattern.to_string(),
                permissions,
            });
        } else {
            self.set_type(pattern, permissions);
        }
    }

    /// Resolve permissions for a declaring type
    pub fn resolve(&self, type_name: &str) -> InvokePermission {
        if let Some(perms) = self.type_permissions.get(type_name) {
            return *perms;
        }

        for rule in &self.type_rules {
            if rule.matches(type_name) {
                return rule.permissions;
            }
        }

        self.global_default
    }
}

impl AccessControl for AccessPolicy {
    fn relax(&self, method: &dyn MethodHandle) -> IntrospectResult<()> {
        let declaring = method.declaring_type();
        let is_public = method.modifiers().is_public();
        let required = if is_public {
            InvokePermission::INVOKE_PUBLIC
        } else {
            InvokePermission::INVOKE_PRIVATE
        };

        let granted = self.resolve(declaring.name());
        if !granted.contains(required) {
            let method_name =
                method_label(declaring, method.name(), method.parameter_types().len());
            tracing::warn!(method = %method_name, %granted, %required, "access relaxation denied");
            return Err(IntrospectError::AccessDenied {
                method: method_name,
                reason: format!(
                    "cannot invoke {} methods of {}",
                    if is_public { "public" } else { "non-public" },
                    declaring
                ),
            });
        }

        tracing::trace!(%declaring, method = method.name(), %granted, "access relaxed");
        Ok(())
    }
}
