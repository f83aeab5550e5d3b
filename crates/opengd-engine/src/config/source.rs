use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Error produced while reading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Key lookup by `(section, key, default)`.
///
/// Missing keys yield `default`; sources never fail on lookup.
pub trait ConfigSource {
    fn load_data(&self, section: &str, key: &str, default: &str) -> String;

    /// Returns every string under `section.key` when the value is a list.
    ///
    /// Sources without list support return an empty vector.
    fn load_list(&self, section: &str, key: &str) -> Vec<String> {
        let _ = (section, key);
        Vec::new()
    }
}

/// TOML-backed configuration.
///
/// Layout:
///
/// ```toml
/// [GFX]
/// screen_width = 1280
/// screen_height = 720
/// fullscreen = "False"
/// ```
///
/// Non-string scalars are returned in their TOML text form (`1280`, `true`).
#[derive(Debug, Clone, Default)]
pub struct TomlConfig {
    table: toml::Table,
}

impl TomlConfig {
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        Ok(Self { table: text.parse::<toml::Table>()? })
    }

    /// Reads and parses `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Like [`load`](Self::load), but a missing or broken file yields an
    /// empty config (every lookup returns its default).
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("{e}; using defaults");
                Self::default()
            }
        }
    }

    fn value(&self, section: &str, key: &str) -> Option<&toml::Value> {
        self.table.get(section)?.as_table()?.get(key)
    }
}

impl ConfigSource for TomlConfig {
    fn load_data(&self, section: &str, key: &str, default: &str) -> String {
        match self.value(section, key) {
            Some(toml::Value::String(s)) => s.clone(),
            Some(v @ (toml::Value::Integer(_) | toml::Value::Float(_) | toml::Value::Boolean(_))) => {
                v.to_string()
            }
            Some(other) => {
                log::warn!("config {section}.{key}: unsupported value {other}; using default");
                default.to_string()
            }
            None => default.to_string(),
        }
    }

    fn load_list(&self, section: &str, key: &str) -> Vec<String> {
        match self.value(section, key) {
            Some(toml::Value::Array(items)) => items
                .iter()
                .filter_map(|v| match v.as_str() {
                    Some(s) => Some(s.to_string()),
                    None => {
                        log::warn!("config {section}.{key}: skipping non-string entry {v}");
                        None
                    }
                })
                .collect(),
            Some(other) => {
                log::warn!("config {section}.{key}: expected a list, got {other}");
                Vec::new()
            }
            None => Vec::new(),
        }
    }
}

/// In-memory source keyed by `"section.key"`.
#[derive(Debug, Clone, Default)]
pub struct MapConfig {
    values: HashMap<String, String>,
}

impl MapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, section: &str, key: &str, value: impl Into<String>) -> Self {
        self.values.insert(format!("{section}.{key}"), value.into());
        self
    }
}

impl ConfigSource for MapConfig {
    fn load_data(&self, section: &str, key: &str, default: &str) -> String {
        self.values
            .get(&format!("{section}.{key}"))
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [GFX]
        screen_width = 1024
        screen_height = "600"
        fullscreen = "True"

        [ASSETS]
        textures = ["a.png", "b.png"]
    "#;

    #[test]
    fn string_and_integer_values() {
        let cfg = TomlConfig::parse(SAMPLE).unwrap();
        assert_eq!(cfg.load_data("GFX", "screen_width", "800"), "1024");
        assert_eq!(cfg.load_data("GFX", "screen_height", "800"), "600");
        assert_eq!(cfg.load_data("GFX", "fullscreen", "False"), "True");
    }

    #[test]
    fn missing_key_and_section_use_default() {
        let cfg = TomlConfig::parse(SAMPLE).unwrap();
        assert_eq!(cfg.load_data("GFX", "vsync", "on"), "on");
        assert_eq!(cfg.load_data("AUDIO", "volume", "10"), "10");
    }

    #[test]
    fn lists_keep_order() {
        let cfg = TomlConfig::parse(SAMPLE).unwrap();
        assert_eq!(cfg.load_list("ASSETS", "textures"), vec!["a.png", "b.png"]);
        assert!(cfg.load_list("ASSETS", "sounds").is_empty());
    }

    #[test]
    fn load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[GFX\nbroken").unwrap();
        assert!(matches!(TomlConfig::load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = TomlConfig::load_or_default(dir.path().join("nope.toml"));
        assert_eq!(cfg.load_data("GFX", "screen_width", "800"), "800");
    }
}
