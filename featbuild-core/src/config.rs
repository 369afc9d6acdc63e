//! Builder file parsing (YAML or TOML) into a [`FeatureRegistry`].

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::feature::{Feature, FeatureRegistry};

pub const DEFAULT_CONFIG_FILE: &str = "builder.yaml";
pub const DEFAULT_CACHE_DIR: &str = ".builder-cache";

/// Inputs may be written as a single path or a list of paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputsValue {
    Single(String),
    Many(Vec<String>),
}

impl Default for InputsValue {
    fn default() -> Self {
        InputsValue::Many(Vec::new())
    }
}

impl InputsValue {
    fn into_vec(self) -> Vec<String> {
        match self {
            InputsValue::Single(path) => vec![path],
            InputsValue::Many(paths) => paths,
        }
    }
}

/// One feature entry as written in the builder file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureConfig {
    #[serde(default)]
    pub inputs: InputsValue,
    #[serde(default)]
    pub command: String,
    #[serde(default, alias = "dependsOn")]
    pub depends_on: Vec<String>,
}

/// Top-level builder file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// Cache directory, relative to the builder file.
    pub cache_dir: Option<String>,
    #[serde(default)]
    pub features: IndexMap<String, FeatureConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// Picks the format from the file extension. Unknown extensions are read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Yaml,
        }
    }
}

/// Directory a builder file's relative paths resolve against. A bare file
/// name resolves against `.`, never the empty path.
fn base_dir_of(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// A parsed builder file together with the directory it was read from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub path: PathBuf,
    pub base_dir: PathBuf,
    pub config: BuilderConfig,
}

impl LoadedConfig {
    /// Reads and parses a builder file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = fs::read_to_string(&path).map_err(|e| Error::Config {
            path: path.clone(),
            message: format!("failed to read: {}", e),
        })?;
        let config = BuilderConfig::parse(&content, ConfigFormat::from_path(&path))
            .map_err(|message| Error::Config {
                path: path.clone(),
                message,
            })?;
        let base_dir = base_dir_of(&path);

        Ok(Self {
            path,
            base_dir,
            config,
        })
    }

    /// Builds the feature registry, resolving relative inputs against the
    /// builder file's directory.
    pub fn registry(&self) -> Result<FeatureRegistry> {
        self.config
            .to_registry(&self.base_dir)
            .map_err(|e| match e {
                Error::Config { message, .. } => Error::Config {
                    path: self.path.clone(),
                    message,
                },
                other => other,
            })
    }

    /// Cache directory from the builder file, or the default, relative to the file.
    pub fn cache_dir(&self) -> PathBuf {
        let dir = self
            .config
            .cache_dir
            .as_deref()
            .unwrap_or(DEFAULT_CACHE_DIR);
        self.base_dir.join(dir)
    }
}

impl BuilderConfig {
    pub fn parse(content: &str, format: ConfigFormat) -> std::result::Result<Self, String> {
        match format {
            ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        }
    }

    /// Converts the parsed entries into features. The registry key becomes the name.
    pub fn to_registry(&self, base_dir: &Path) -> Result<FeatureRegistry> {
        let mut registry = FeatureRegistry::new();
        for (name, entry) in &self.features {
            let inputs = entry
                .inputs
                .clone()
                .into_vec()
                .into_iter()
                .map(|input| base_dir.join(input))
                .collect();
            registry.insert(Feature::new(
                name.clone(),
                inputs,
                entry.command.clone(),
                entry.depends_on.clone(),
            ))?;
        }
        Ok(registry)
    }
}
