//! Component domain model.
//!
//! # Responsibility
//! - Define the canonical record for one versioned artifact in a repository.
//! - Provide validation used by every write path.
//!
//! # Invariants
//! - `id` is stable and never reused for another component.
//! - `repository`, `format` and `name` are never blank.
//! - `group` and `version` are either absent or non-blank.

use crate::model::entity_id::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Canonical domain record for one stored component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// Stable identity assigned on creation.
    pub id: EntityId,
    /// Name of the repository that owns this component.
    pub repository: String,
    /// Repository format (`maven2`, `npm`, `raw`, ...).
    pub format: String,
    /// Optional namespace, e.g. a Maven group id or npm scope.
    pub group: Option<String>,
    pub name: String,
    pub version: Option<String>,
    /// Format-specific metadata. Persisted as one JSON object.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Component {
    /// Creates a component with a generated stable ID.
    pub fn new(
        repository: impl Into<String>,
        format: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self::with_id(EntityId::generate(), repository, format, name)
    }

    /// Creates a component with a caller-provided ID.
    ///
    /// Used by import paths where identity already exists externally. Does not
    /// validate; write paths call [`Component::validate`].
    pub fn with_id(
        id: EntityId,
        repository: impl Into<String>,
        format: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            repository: repository.into(),
            format: format.into(),
            group: None,
            name: name.into(),
            version: None,
            attributes: BTreeMap::new(),
        }
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Checks field-level invariants before persistence.
    ///
    /// # Errors
    /// - `BlankField` when a required field is empty or whitespace.
    /// - `BlankOptionalField` when `group`/`version` is present but blank.
    /// - `BlankAttributeKey` when an attribute key is empty or whitespace.
    pub fn validate(&self) -> Result<(), ComponentValidationError> {
        for (field, value) in [
            ("repository", self.repository.as_str()),
            ("format", self.format.as_str()),
            ("name", self.name.as_str()),
        ] {
            if value.trim().is_empty() {
                return Err(ComponentValidationError::BlankField(field));
            }
        }

        for (field, value) in [("group", &self.group), ("version", &self.version)] {
            if matches!(value.as_deref(), Some(text) if text.trim().is_empty()) {
                return Err(ComponentValidationError::BlankOptionalField(field));
            }
        }

        if self.attributes.keys().any(|key| key.trim().is_empty()) {
            return Err(ComponentValidationError::BlankAttributeKey);
        }

        Ok(())
    }

    /// Human-readable coordinates, `group:name:version` with absent parts skipped.
    pub fn coordinates(&self) -> String {
        [self.group.as_deref(), Some(self.name.as_str()), self.version.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(":")
    }
}

/// Field-level validation failures for [`Component`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComponentValidationError {
    #[error("component {0} must not be blank")]
    BlankField(&'static str),
    #[error("component {0} must be absent or non-blank")]
    BlankOptionalField(&'static str),
    #[error("component attribute keys must not be blank")]
    BlankAttributeKey,
    #[error("component id {actual} does not match target id {expected}")]
    IdMismatch { expected: EntityId, actual: EntityId },
}

#[cfg(test)]
mod tests {
    use super::{Component, ComponentValidationError};

    #[test]
    fn new_component_is_valid() {
        let component = Component::new("maven-releases", "maven2", "commons-lang3")
            .group("org.apache.commons")
            .version("3.14.0");
        component.validate().expect("valid component");
        assert_eq!(
            component.coordinates(),
            "org.apache.commons:commons-lang3:3.14.0"
        );
    }

    #[test]
    fn rejects_blank_required_fields() {
        let err = Component::new("  ", "raw", "x")
            .validate()
            .expect_err("blank repository must fail");
        assert_eq!(err, ComponentValidationError::BlankField("repository"));

        let err = Component::new("raw-hosted", "raw", "")
            .validate()
            .expect_err("blank name must fail");
        assert_eq!(err, ComponentValidationError::BlankField("name"));
    }

    #[test]
    fn rejects_present_but_blank_version() {
        let err = Component::new("npm-hosted", "npm", "left-pad")
            .version(" ")
            .validate()
            .expect_err("blank version must fail");
        assert_eq!(err, ComponentValidationError::BlankOptionalField("version"));
    }

    #[test]
    fn rejects_blank_attribute_key() {
        let err = Component::new("npm-hosted", "npm", "left-pad")
            .attribute("", "x")
            .validate()
            .expect_err("blank attribute key must fail");
        assert_eq!(err, ComponentValidationError::BlankAttributeKey);
    }

    #[test]
    fn coordinates_skip_absent_parts() {
        let component = Component::new("raw-hosted", "raw", "site.zip");
        assert_eq!(component.coordinates(), "site.zip");
    }
}
