//! Configuration types and management for symshrink-rs.
//!
//! A [`RenameConfig`] is usually read from a YAML file and then overridden
//! by command-line flags. It decides where the mapping lives, which names
//! are never renamed, which extra words the allocator must avoid, and how a
//! multi-unit run is executed and written back.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, SymshrinkError};
use crate::naming::{
    KeywordGuard, PreservationPolicy, DEFAULT_FOREIGN_PREFIXES, DEFAULT_PRESERVED_NAMES,
};

/// Main configuration for a rename run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenameConfig {
    /// Persisted identifier mapping; loaded before and saved after a run
    pub mapping_file: Option<PathBuf>,

    /// Exact qualified names that are never renamed
    pub preserved_names: Vec<String>,

    /// Qualified-name prefixes of foreign namespaces that are never renamed
    pub foreign_prefixes: Vec<String>,

    /// Additional words the allocator must never produce
    pub extra_reserved: Vec<String>,

    /// Persist the macro table next to the identifier mapping
    pub persist_macros: bool,

    /// Worker threads for multi-unit runs (`None` uses the rayon default)
    pub workers: Option<usize>,

    /// Overwrite source files with their rewritten text
    pub write_in_place: bool,

    /// Collect every rewritten unit into a single file
    pub combined_output: Option<PathBuf>,
}

impl Default for RenameConfig {
    fn default() -> Self {
        Self {
            mapping_file: None,
            preserved_names: DEFAULT_PRESERVED_NAMES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            foreign_prefixes: DEFAULT_FOREIGN_PREFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            extra_reserved: Vec::new(),
            persist_macros: false,
            workers: None,
            write_in_place: false,
            combined_output: None,
        }
    }
}

impl RenameConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SymshrinkError::io(format!("Failed to read config file: {}", path.display()), e)
        })?;

        serde_yaml::from_str(&content).map_err(Into::into)
    }

    /// Save configuration to a YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content).map_err(|e| {
            SymshrinkError::io(
                format!("Failed to write config file: {}", path.display()),
                e,
            )
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.workers == Some(0) {
            return Err(SymshrinkError::config_field(
                "workers must be greater than 0",
                "workers",
            ));
        }

        if self.foreign_prefixes.iter().any(|p| p.trim().is_empty()) {
            return Err(SymshrinkError::config_field(
                "foreign prefixes must not be empty",
                "foreign_prefixes",
            ));
        }

        validate_words(&self.preserved_names, "preserved_names")?;
        validate_words(&self.extra_reserved, "extra_reserved")?;

        if let (Some(mapping), Some(combined)) = (&self.mapping_file, &self.combined_output) {
            if mapping == combined {
                return Err(SymshrinkError::config_field(
                    "combined output must not overwrite the mapping file",
                    "combined_output",
                ));
            }
        }

        Ok(())
    }

    /// Reserved-word guard including `extra_reserved`
    pub fn keyword_guard(&self) -> KeywordGuard {
        KeywordGuard::with_extra(self.extra_reserved.iter().cloned())
    }

    /// Preservation policy built from the configured names and prefixes
    pub fn preservation_policy(&self) -> PreservationPolicy {
        PreservationPolicy::new(
            self.preserved_names.iter().cloned(),
            self.foreign_prefixes.iter().cloned(),
        )
    }

    /// Builder: set the mapping file
    pub fn with_mapping_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.mapping_file = Some(path.into());
        self
    }

    /// Builder: add a foreign namespace prefix
    pub fn with_foreign_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.foreign_prefixes.push(prefix.into());
        self
    }

    /// Builder: set the worker count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }
}

fn validate_words(words: &[String], field: &str) -> Result<()> {
    if let Some(bad) = words
        .iter()
        .find(|w| w.is_empty() || w.chars().any(char::is_whitespace))
    {
        return Err(SymshrinkError::config_field(
            format!("{field} entry {bad:?} must be a non-empty word without whitespace"),
            field,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = RenameConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.preserved_names.contains(&"main".to_string()));
        assert_eq!(config.foreign_prefixes, vec!["std::".to_string()]);
        assert!(!config.persist_macros);
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config = RenameConfig::default().with_workers(0);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, SymshrinkError::Config { field: Some(f), .. } if f == "workers"));
    }

    #[test]
    fn test_blank_prefix_rejected() {
        let config = RenameConfig::default().with_foreign_prefix("  ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_whitespace_in_reserved_rejected() {
        let mut config = RenameConfig::default();
        config.extra_reserved.push("two words".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_combined_output_must_differ_from_mapping() {
        let mut config = RenameConfig::default().with_mapping_file("names.json");
        config.combined_output = Some(PathBuf::from("names.json"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_policy_and_guard_follow_config() {
        let mut config = RenameConfig::default().with_foreign_prefix("boost::");
        config.extra_reserved.push("ab".to_string());

        assert!(config.preservation_policy().must_preserve("boost::optional"));
        assert!(config.preservation_policy().must_preserve("std::string"));
        assert!(config.keyword_guard().is_reserved("ab"));
    }

    #[test]
    fn test_yaml_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("symshrink.yml");

        let mut config = RenameConfig::default().with_mapping_file("out/names.json");
        config.persist_macros = true;
        config.to_yaml_file(&path).unwrap();

        let loaded = RenameConfig::from_yaml_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: RenameConfig = serde_yaml::from_str("persist_macros: true\n").unwrap();
        assert!(config.persist_macros);
        assert_eq!(config.foreign_prefixes, vec!["std::".to_string()]);
    }
}
