//! Feature data models and the registry that holds them.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A named buildable unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    /// Input paths, in declaration order. The order is part of the fingerprint.
    pub inputs: Vec<PathBuf>,
    /// Opaque build command, handed to the build action untouched.
    pub command: String,
    pub depends_on: Vec<String>,
}

impl Feature {
    pub fn new(
        name: impl Into<String>,
        inputs: Vec<PathBuf>,
        command: impl Into<String>,
        depends_on: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            inputs,
            command: command.into(),
            depends_on,
        }
    }

    /// The first declared input, used as the build context.
    #[inline]
    pub fn primary_input(&self) -> Option<&Path> {
        self.inputs.first().map(PathBuf::as_path)
    }
}

/// Checks that a feature name can be used as a single cache path component.
pub fn validate_feature_name(name: &str) -> Result<()> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0')
    {
        return Err(Error::InvalidFeatureName(name.to_string()));
    }
    Ok(())
}

/// Mapping from feature name to feature, in declaration order.
///
/// Loaded once per run and not mutated afterwards. References in
/// `depends_on` are checked when a target is resolved, not on insert.
#[derive(Debug, Clone, Default)]
pub struct FeatureRegistry {
    features: IndexMap<String, Feature>,
}

impl FeatureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from a list of features.
    ///
    /// # Errors
    ///
    /// Returns an error if a name is invalid or declared twice.
    pub fn from_features(features: impl IntoIterator<Item = Feature>) -> Result<Self> {
        let mut registry = Self::new();
        for feature in features {
            registry.insert(feature)?;
        }
        Ok(registry)
    }

    /// Adds a feature keyed by its name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or already registered.
    pub fn insert(&mut self, feature: Feature) -> Result<()> {
        validate_feature_name(&feature.name)?;
        if self.features.contains_key(&feature.name) {
            return Err(Error::Config {
                path: PathBuf::new(),
                message: format!("feature '{}' is declared more than once", feature.name),
            });
        }
        self.features.insert(feature.name.clone(), feature);
        Ok(())
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Feature> {
        self.features.get(name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.features.contains_key(name)
    }

    /// Looks up a requested feature, listing the known names on failure.
    pub fn require(&self, name: &str) -> Result<&Feature> {
        self.get(name).ok_or_else(|| Error::UnknownFeature {
            name: name.to_string(),
            available: self.available(),
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.features.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.values()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    fn available(&self) -> String {
        if self.features.is_empty() {
            "(none)".to_string()
        } else {
            self.names().collect::<Vec<_>>().join(", ")
        }
    }
}
