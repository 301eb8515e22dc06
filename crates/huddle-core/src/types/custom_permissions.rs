//! Per-member permission overrides.

use std::collections::BTreeMap;

use derive_more::{Deref, IntoIterator};
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Permission;
use crate::error::ConfigurationError;

/// Explicit per-member grants or denials that take precedence over role defaults.
///
/// An entry set to `true` widens the member's grant; `false` narrows it. A
/// permission without an entry falls back to the role default.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[derive(Serialize, Deserialize, Deref, IntoIterator)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[into_iterator(owned, ref)]
#[serde(transparent)]
pub struct CustomPermissions(BTreeMap<Permission, bool>);

impl CustomPermissions {
    /// Creates an empty set of overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the override for `permission`, if one is set.
    #[inline]
    pub fn get(&self, permission: Permission) -> Option<bool> {
        self.0.get(&permission).copied()
    }

    /// Sets an explicit override, returning the previous value.
    pub fn set(&mut self, permission: Permission, granted: bool) -> Option<bool> {
        self.0.insert(permission, granted)
    }

    /// Removes an override so the role default applies again.
    pub fn clear(&mut self, permission: Permission) -> Option<bool> {
        self.0.remove(&permission)
    }

    /// Builder-style variant of [`CustomPermissions::set`].
    #[must_use]
    pub fn with(mut self, permission: Permission, granted: bool) -> Self {
        self.set(permission, granted);
        self
    }

    /// Parses overrides from their stored JSON form.
    ///
    /// `null` is treated as no overrides. Any other non-object value, an
    /// unknown permission key, or a non-boolean value is a configuration error.
    pub fn from_json(value: &Value) -> Result<Self, ConfigurationError> {
        let object = match value {
            Value::Null => return Ok(Self::default()),
            Value::Object(object) => object,
            other => return Err(ConfigurationError::InvalidOverrideShape(other.to_string())),
        };

        let mut overrides = BTreeMap::new();
        for (key, value) in object {
            let permission: Permission = key
                .parse()
                .map_err(|_| ConfigurationError::UnknownPermission(key.clone()))?;

            let Value::Bool(granted) = value else {
                return Err(ConfigurationError::InvalidOverrideValue {
                    permission,
                    value: value.to_string(),
                });
            };

            overrides.insert(permission, *granted);
        }

        Ok(Self(overrides))
    }

    /// Returns the stored JSON form of these overrides.
    pub fn to_json(&self) -> Value {
        let object: Map<String, Value> = self
            .0
            .iter()
            .map(|(perm, granted)| (perm.as_str().to_owned(), Value::Bool(*granted)))
            .collect();
        Value::Object(object)
    }
}

impl FromIterator<(Permission, bool)> for CustomPermissions {
    fn from_iter<T: IntoIterator<Item = (Permission, bool)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
