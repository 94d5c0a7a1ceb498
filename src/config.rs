use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::{DEFAULT_OCTAVE, PatternTable, Scale, ScaleError};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tonic: String,
    pub pattern: String,
    pub octave: i32,
    /// Extra interval patterns, keyed by name. Builtins with the same name are replaced.
    pub patterns: BTreeMap<String, Vec<u8>>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tonic: "C".to_string(),
            pattern: "major".to_string(),
            octave: DEFAULT_OCTAVE,
            patterns: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Builtin patterns plus every valid custom one. Invalid entries are logged and skipped.
    pub fn pattern_table(&self) -> PatternTable {
        let mut table = PatternTable::builtin();
        for (name, steps) in &self.patterns {
            if let Err(e) = table.insert(name, steps.clone()) {
                tracing::warn!("ignoring pattern from config: {e}");
            }
        }
        table
    }

    pub fn scale(&self) -> Result<Scale, ScaleError> {
        Scale::with_table(&self.tonic, &self.pattern, &self.pattern_table())
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs_path().map(|p| p.join("config.toml"))
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config").join("tonewrap"))
}

pub fn load_config() -> Config {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => Config::default(),
    }
}

pub fn load_config_from(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }
    match std::fs::read_to_string(path) {
        Ok(content) => match parse_config(&content) {
            Ok(c) => {
                tracing::info!("loaded {}", path.display());
                c
            }
            Err(e) => {
                tracing::warn!("Failed to parse {}: {}", path.display(), e);
                Config::default()
            }
        },
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", path.display(), e);
            Config::default()
        }
    }
}

pub fn parse_config(content: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(content)
}
