use clap::ValueEnum;
use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::SortKey;
use crate::geometry::DEFAULT_EPSILON;
use crate::importer::DEFAULT_DELIMITER;

/// How the CLI prints the built graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn default_delimiter() -> char {
    DEFAULT_DELIMITER
}
fn default_epsilon() -> f64 {
    DEFAULT_EPSILON
}
fn default_bbox_prefilter() -> bool {
    true
}
fn default_parallel() -> bool {
    false
}
fn default_verbose() -> bool {
    false
}

/// Settings read from `cadastre-graph.toml`; command-line flags win
#[derive(Debug, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub input: Option<PathBuf>,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    #[serde(default = "default_bbox_prefilter")]
    pub bbox_prefilter: bool,
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    #[serde(default)]
    pub sort_by: SortKey,
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default = "default_verbose")]
    pub verbose: bool,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            input: None,
            delimiter: default_delimiter(),
            epsilon: default_epsilon(),
            bbox_prefilter: default_bbox_prefilter(),
            parallel: default_parallel(),
            sort_by: SortKey::default(),
            format: OutputFormat::default(),
            verbose: default_verbose(),
        }
    }
}

impl FileConfig {
    /// First config file found in the search path that parses
    pub fn load() -> Option<Self> {
        let config_paths = get_config_paths();

        for path in config_paths {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(&path)
            {
                match toml::from_str(&contents) {
                    Ok(config) => return Some(config),
                    Err(e) => {
                        eprintln!("Warning: Failed to parse config file {:?}: {}", path, e);
                    }
                }
            }
        }
        None
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("cadastre-graph.toml"));
    paths.push(PathBuf::from(".cadastre-graph.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("cadastre-graph").join("config.toml"));
        paths.push(config_dir.join("cadastre-graph.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".cadastre-graph.toml"));
    }

    paths
}
