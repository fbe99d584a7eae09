//! Project documents.
//!
//! A project bundles a sampling interval with a taxonomy of contextual tags.
//! Its name doubles as the key of its JSON document on disk.

mod store;

use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use store::ProjectStore;

/// Shortest accepted sampling interval, in seconds.
pub const MIN_INTERVAL_SECS: u32 = 5;

/// Longest accepted sampling interval, in seconds.
pub const MAX_INTERVAL_SECS: u32 = 20;

/// A named category with a fixed, insertion-ordered set of attribute values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyClass {
    /// Display name, also the key of a selection.
    #[serde(rename = "className")]
    pub name: String,
    /// The values a selection for this class may take.
    pub attributes: Vec<String>,
}

impl TaxonomyClass {
    /// Create a class from a name and its attributes.
    #[must_use]
    pub fn new(name: impl Into<String>, attributes: Vec<String>) -> Self {
        Self {
            name: name.into(),
            attributes,
        }
    }

    /// Check whether `attribute` is one of this class's values.
    #[must_use]
    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.attributes.iter().any(|a| a == attribute)
    }
}

impl std::fmt::Display for TaxonomyClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.attributes.join(", "))
    }
}

/// A GPS tracking project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Unique name, used as the document's file name.
    #[serde(rename = "projectName")]
    pub name: String,
    /// Seconds between samples, in `[MIN_INTERVAL_SECS, MAX_INTERVAL_SECS]`.
    #[serde(rename = "gpsFrequency")]
    pub interval_secs: u32,
    /// Ordered taxonomy classes.
    #[serde(default)]
    pub taxonomy: Vec<TaxonomyClass>,
}

impl Project {
    /// Create a project without validating it.
    #[must_use]
    pub fn new(name: impl Into<String>, interval_secs: u32, taxonomy: Vec<TaxonomyClass>) -> Self {
        Self {
            name: name.into(),
            interval_secs,
            taxonomy,
        }
    }

    /// The sampling interval as a `Duration`.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.interval_secs))
    }

    /// Look up a taxonomy class by name.
    #[must_use]
    pub fn class(&self, name: &str) -> Option<&TaxonomyClass> {
        self.taxonomy.iter().find(|c| c.name == name)
    }

    /// Check every rule a persisted project must satisfy.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first rule violated.
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        validate_interval(self.interval_secs)?;
        validate_taxonomy(&self.taxonomy)
    }
}

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // No path separators or control characters: the name becomes a file name.
    PATTERN.get_or_init(|| Regex::new(r"^[^/\\\x00-\x1f]+$").expect("valid name pattern"))
}

/// Validate a project name.
///
/// # Errors
///
/// Returns a validation error if the name is empty or unusable as a file name.
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::validation("project name cannot be empty"));
    }
    if name != name.trim() {
        return Err(Error::validation(
            "project name cannot start or end with whitespace",
        ));
    }
    if name == "." || name == ".." || !name_pattern().is_match(name) {
        return Err(Error::validation(format!(
            "project name '{name}' cannot be used as a file name"
        )));
    }
    Ok(())
}

/// Validate a sampling interval.
///
/// # Errors
///
/// Returns a validation error if the interval is outside the accepted range.
pub fn validate_interval(interval_secs: u32) -> Result<()> {
    if (MIN_INTERVAL_SECS..=MAX_INTERVAL_SECS).contains(&interval_secs) {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "GPS frequency must be between {MIN_INTERVAL_SECS} and {MAX_INTERVAL_SECS} seconds (got {interval_secs})"
        )))
    }
}

/// Validate a taxonomy for persistence.
///
/// # Errors
///
/// Returns a validation error if the taxonomy is empty, a class has no name,
/// a class has no attributes, or two classes share a name.
pub fn validate_taxonomy(taxonomy: &[TaxonomyClass]) -> Result<()> {
    if taxonomy.is_empty() {
        return Err(Error::validation(
            "you must add at least one taxonomy class",
        ));
    }
    for (i, class) in taxonomy.iter().enumerate() {
        if class.name.trim().is_empty() {
            return Err(Error::validation(
                "each taxonomy class must have a valid name",
            ));
        }
        if class.attributes.iter().all(|a| a.trim().is_empty()) {
            return Err(Error::validation(format!(
                "class '{}' must have at least one attribute",
                class.name
            )));
        }
        if taxonomy[..i].iter().any(|c| c.name == class.name) {
            return Err(Error::validation(format!(
                "class '{}' appears more than once",
                class.name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather() -> TaxonomyClass {
        TaxonomyClass::new("Weather", vec!["Sunny".into(), "Cloudy".into()])
    }

    #[test]
    fn test_project_json_layout() {
        let project = Project::new("Survey1", 10, vec![weather()]);
        let value = serde_json::to_value(&project).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "projectName": "Survey1",
                "gpsFrequency": 10,
                "taxonomy": [{"className": "Weather", "attributes": ["Sunny", "Cloudy"]}]
            })
        );
    }

    #[test]
    fn test_project_missing_taxonomy_defaults_to_empty() {
        let project: Project =
            serde_json::from_str(r#"{"projectName": "Bare", "gpsFrequency": 5}"#).unwrap();
        assert!(project.taxonomy.is_empty());
    }

    #[test]
    fn test_interval_boundaries() {
        assert!(validate_interval(4).is_err());
        assert!(validate_interval(5).is_ok());
        assert!(validate_interval(20).is_ok());
        assert!(validate_interval(21).is_err());
        assert!(validate_interval(0).is_err());
    }

    #[test]
    fn test_interval_duration() {
        let project = Project::new("Survey1", 10, vec![weather()]);
        assert_eq!(project.interval(), Duration::from_secs(10));
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Survey1").is_ok());
        assert!(validate_name("Old Delhi route").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(" padded").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("a\\b").is_err());
        assert!(validate_name("..").is_err());
        assert!(validate_name("tab\there").is_err());
    }

    #[test]
    fn test_validate_taxonomy_rules_in_order() {
        let err = validate_taxonomy(&[]).unwrap_err();
        assert!(err.to_string().contains("at least one taxonomy class"));

        let err = validate_taxonomy(&[TaxonomyClass::new(" ", vec!["x".into()])]).unwrap_err();
        assert!(err.to_string().contains("valid name"));

        let err = validate_taxonomy(&[TaxonomyClass::new("Traffic", vec![])]).unwrap_err();
        assert!(err.to_string().contains("'Traffic' must have at least one attribute"));

        let err = validate_taxonomy(&[weather(), weather()]).unwrap_err();
        assert!(err.to_string().contains("more than once"));

        assert!(validate_taxonomy(&[weather()]).is_ok());
    }

    #[test]
    fn test_validate_reports_first_violation() {
        let project = Project::new("", 99, vec![]);
        let err = project.validate().unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn test_class_lookup() {
        let project = Project::new("Survey1", 10, vec![weather()]);
        assert!(project.class("Weather").unwrap().has_attribute("Sunny"));
        assert!(!project.class("Weather").unwrap().has_attribute("Rainy"));
        assert!(project.class("Traffic").is_none());
    }

    #[test]
    fn test_class_display() {
        assert_eq!(weather().to_string(), "Weather: Sunny, Cloudy");
    }
}
