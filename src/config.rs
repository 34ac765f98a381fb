//! Source configuration.
//!
//! Configuration is loaded from YAML and validated up front. Everything the
//! engine builds from a [`Config`] assumes [`Config::validate`] passed.
//!
//! ```yaml
//! record_count: 1000
//! rate: 20
//! burst:
//!   sleep_time: 100ms
//!   generate_time: 150ms
//! collections:
//!   users:
//!     operations: [create, update, delete]
//!     format:
//!       type: structured
//!       options: { id: int, name: string, joined: time }
//!   blobs:
//!     format:
//!       type: file
//!       path: ./payload.bin
//! ```

pub mod duration;

use record_core::{FieldType, Operation};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Error type for configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error reading the config file
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// One or more validation failures
    #[error("Invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Payload format of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatType {
    Raw,
    Structured,
    File,
}

/// Payload settings of a collection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormatConfig {
    #[serde(rename = "type")]
    pub format_type: FormatType,

    /// Field name to type tag, for `raw` and `structured`
    #[serde(default)]
    pub options: BTreeMap<String, String>,

    /// Payload file, for `file`
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Schema subject attached to `structured` records
    #[serde(default)]
    pub schema_subject: Option<String>,
}

impl FormatConfig {
    fn with_fields(format_type: FormatType, fields: &[(&str, &str)]) -> Self {
        Self {
            format_type,
            options: fields
                .iter()
                .map(|(name, tag)| (name.to_string(), tag.to_string()))
                .collect(),
            path: None,
            schema_subject: None,
        }
    }

    /// JSON-encoded payloads with the given fields.
    pub fn raw(fields: &[(&str, &str)]) -> Self {
        Self::with_fields(FormatType::Raw, fields)
    }

    /// Structured payloads with the given fields.
    pub fn structured(fields: &[(&str, &str)]) -> Self {
        Self::with_fields(FormatType::Structured, fields)
    }

    /// Payloads read once from a file.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            format_type: FormatType::File,
            options: BTreeMap::new(),
            path: Some(path.into()),
            schema_subject: None,
        }
    }

    fn validate(&self, errors: &mut Vec<String>, scope: &str) {
        match self.format_type {
            FormatType::File => {
                if self.path.as_ref().map_or(true, |p| p.as_os_str().is_empty()) {
                    errors.push(format!("{scope}: file path not specified"));
                }
                if !self.options.is_empty() {
                    errors.push(format!("{scope}: field options are not allowed for file format"));
                }
            }
            FormatType::Raw | FormatType::Structured => {
                for (name, tag) in &self.options {
                    if name.trim().is_empty() {
                        errors.push(format!("{scope}: got empty field name"));
                    }
                    if tag.trim().is_empty() {
                        errors.push(format!("{scope}: got empty type for field {name:?}"));
                    } else if !FieldType::is_known_tag(tag) {
                        errors.push(format!(
                            "{scope}: unknown data type {tag:?} for field {name:?}"
                        ));
                    }
                }
                if self.path.is_some() {
                    errors.push(format!("{scope}: path is only allowed for file format"));
                }
            }
        }

        if self.schema_subject.is_some() && self.format_type != FormatType::Structured {
            errors.push(format!(
                "{scope}: schema_subject is only allowed for structured format"
            ));
        }
    }
}

/// A single logical collection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectionConfig {
    /// Operations to generate, picked uniformly at random
    #[serde(default = "default_operations")]
    pub operations: Vec<Operation>,

    pub format: FormatConfig,
}

impl CollectionConfig {
    pub fn new(operations: Vec<Operation>, format: FormatConfig) -> Self {
        Self { operations, format }
    }

    fn validate(&self, errors: &mut Vec<String>, scope: &str) {
        if self.operations.is_empty() {
            errors.push(format!("{scope}: at least one operation is required"));
        }
        self.format.validate(errors, scope);
    }
}

/// Burst settings: alternate between sleeping and generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BurstConfig {
    /// Time spent sleeping between bursts; zero disables bursts
    #[serde(default, deserialize_with = "duration::deserialize")]
    pub sleep_time: Duration,

    /// Time spent generating in each burst
    #[serde(
        default = "default_generate_time",
        deserialize_with = "duration::deserialize"
    )]
    pub generate_time: Duration,
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            sleep_time: Duration::ZERO,
            generate_time: default_generate_time(),
        }
    }
}

impl BurstConfig {
    pub fn is_enabled(&self) -> bool {
        !self.sleep_time.is_zero()
    }
}

/// Full source configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Number of records to produce; zero means no limit
    #[serde(default)]
    pub record_count: u64,

    /// Maximum records per second; zero means no limit
    #[serde(default)]
    pub rate: f64,

    /// Deprecated fixed per-record delay, converted to a rate
    #[serde(default, deserialize_with = "duration::deserialize")]
    pub read_time: Duration,

    /// Seed for reproducible output
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default)]
    pub burst: BurstConfig,

    /// Operations of the default collection
    #[serde(default = "default_operations")]
    pub operations: Vec<Operation>,

    /// Format of the default collection; absent means no default collection
    #[serde(default)]
    pub format: Option<FormatConfig>,

    /// Named collections
    #[serde(default)]
    pub collections: BTreeMap<String, CollectionConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            record_count: 0,
            rate: 0.0,
            read_time: Duration::ZERO,
            seed: None,
            burst: BurstConfig::default(),
            operations: default_operations(),
            format: None,
            collections: BTreeMap::new(),
        }
    }
}

/// Longest accepted duration: `i64::MAX` nanoseconds, about 292 years.
pub const MAX_DURATION: Duration = Duration::from_nanos(i64::MAX as u64);

fn default_operations() -> Vec<Operation> {
    vec![Operation::Create]
}

fn default_generate_time() -> Duration {
    Duration::from_secs(1)
}

impl Config {
    /// Parse a configuration from YAML. Does not validate.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a configuration from a YAML file. Does not validate.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Configuration with a single default collection.
    pub fn single(format: FormatConfig) -> Self {
        Self {
            format: Some(format),
            ..Self::default()
        }
    }

    /// Add a named collection.
    pub fn with_collection(mut self, name: impl Into<String>, collection: CollectionConfig) -> Self {
        self.collections.insert(name.into(), collection);
        self
    }

    /// Check every setting, reporting all problems at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if !self.read_time.is_zero() && self.rate > 0.0 {
            errors.push(
                r#"cannot specify both "read_time" and "rate", "read_time" is deprecated, please only specify "rate""#
                    .to_string(),
            );
        }
        if !self.rate.is_finite() || self.rate < 0.0 {
            errors.push(r#""rate" should be a finite number greater or equal to 0"#.to_string());
        }

        if self.burst.is_enabled() && self.burst.generate_time.is_zero() {
            errors.push(r#""burst.generate_time" should be greater than 0"#.to_string());
        }
        for (key, value) in [
            ("read_time", self.read_time),
            ("burst.sleep_time", self.burst.sleep_time),
            ("burst.generate_time", self.burst.generate_time),
        ] {
            if value > MAX_DURATION {
                errors.push(format!(
                    "{key:?} should be at most {}ns",
                    MAX_DURATION.as_nanos()
                ));
            }
        }

        if self.format.is_none() && self.collections.is_empty() {
            errors.push(
                "invalid configuration, please configure at least one collection using `format` or `collections`"
                    .to_string(),
            );
        }
        if let Some(format) = &self.format {
            CollectionConfig::new(self.operations.clone(), format.clone())
                .validate(&mut errors, "default collection");
        }
        for (name, collection) in &self.collections {
            if name.trim().is_empty() {
                errors.push(
                    "collection names must not be empty, use the top-level `format` for the default collection"
                        .to_string(),
                );
                continue;
            }
            collection.validate(&mut errors, &format!("collection {name:?}"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    /// Effective rate limit in records per second; zero means unlimited.
    pub fn rate_limit(&self) -> f64 {
        if self.rate == 0.0 && !self.read_time.is_zero() {
            return 1.0 / self.read_time.as_secs_f64();
        }
        self.rate
    }

    /// All collections in a stable order: the default collection (empty
    /// name) first, then named collections sorted by name.
    pub fn collection_configs(&self) -> Vec<(String, CollectionConfig)> {
        let mut collections = Vec::with_capacity(self.collections.len() + 1);
        if let Some(format) = &self.format {
            collections.push((
                String::new(),
                CollectionConfig::new(self.operations.clone(), format.clone()),
            ));
        }
        collections.extend(
            self.collections
                .iter()
                .map(|(name, cfg)| (name.clone(), cfg.clone())),
        );
        collections
    }
}
