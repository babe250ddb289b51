use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};

use super::paths::AppPaths;
use super::types::AppConfig;
use super::validation::validate_config;
use crate::core::errors::{RagError, Result};

/// Environment variables read while loading, and the config keys they set.
const ENV_OVERRIDES: [(&str, &str, &str); 3] = [
    ("OLLAMA_BASE_URL", "ollama", "base_url"),
    ("OLLAMA_MODEL", "ollama", "model"),
    ("OLLAMA_MODEL_EMBEDDINGS", "ollama", "embedding_model"),
];

#[derive(Clone)]
pub struct ConfigService {
    paths: Arc<AppPaths>,
    explicit_path: Option<PathBuf>,
}

impl ConfigService {
    pub fn new(paths: Arc<AppPaths>) -> Self {
        Self {
            paths,
            explicit_path: None,
        }
    }

    /// Read from `path` instead of the discovered location.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_path = Some(path.into());
        self
    }

    pub fn paths(&self) -> &AppPaths {
        &self.paths
    }

    pub fn config_path(&self) -> PathBuf {
        if let Some(path) = &self.explicit_path {
            return path.clone();
        }

        if let Ok(path) = env::var("WEBRAG_CONFIG_PATH") {
            return PathBuf::from(path);
        }

        let user_config = self.paths.data_dir.join("config.yml");
        if user_config.exists() {
            return user_config;
        }

        self.paths.project_root.join("config.yml")
    }

    pub fn load_config(&self) -> Result<AppConfig> {
        self.load_config_with_overrides(&Value::Object(Map::new()))
    }

    /// File, then environment, then `overrides`; later layers win.
    pub fn load_config_with_overrides(&self, overrides: &Value) -> Result<AppConfig> {
        let path = self.config_path();
        let file_config = load_yaml_file(&path)?;
        let env_config = env_overrides_from(|key| env::var(key).ok());

        let merged = deep_merge(&deep_merge(&file_config, &env_config), overrides);
        let config = parse_config(merged)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

/// Deserialize a merged document into a validated `AppConfig`.
pub fn parse_config(value: Value) -> Result<AppConfig> {
    let config: AppConfig = serde_json::from_value(value).map_err(RagError::invalid_config)?;
    validate_config(&config)?;
    Ok(config)
}

fn load_yaml_file(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Ok(Value::Object(Map::new()));
    }

    let contents = fs::read_to_string(path).map_err(|err| {
        RagError::InvalidConfig(format!("cannot read {}: {}", path.display(), err))
    })?;
    let value = serde_yaml::from_str::<Value>(&contents).map_err(|err| {
        RagError::InvalidConfig(format!("cannot parse {}: {}", path.display(), err))
    })?;

    match value {
        Value::Object(_) => Ok(value),
        Value::Null => Ok(Value::Object(Map::new())),
        _ => Err(RagError::InvalidConfig(format!(
            "{} must contain a mapping at the top level",
            path.display()
        ))),
    }
}

/// Overrides from the environment; unset or blank variables are skipped.
pub fn env_overrides_from<F>(lookup: F) -> Value
where
    F: Fn(&str) -> Option<String>,
{
    let mut root = Map::new();
    for (var, section, key) in ENV_OVERRIDES {
        let Some(value) = lookup(var).filter(|v| !v.trim().is_empty()) else {
            continue;
        };
        let entry = root
            .entry(section.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(map) = entry {
            map.insert(key.to_string(), Value::String(value));
        }
    }
    Value::Object(root)
}

fn deep_merge(base: &Value, override_value: &Value) -> Value {
    match (base, override_value) {
        (Value::Object(base_map), Value::Object(override_map)) => {
            let mut merged: Map<String, Value> = base_map.clone();
            for (key, value) in override_map {
                let merged_value = match merged.get(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), merged_value);
            }
            Value::Object(merged)
        }
        _ => override_value.clone(),
    }
}
