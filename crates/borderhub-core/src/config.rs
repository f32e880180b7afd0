//! Dashboard configuration, read from `borderhub.yaml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HubError, Result};
use crate::slides::{default_deck, Slide};
use crate::storage;

pub const DEFAULT_CONFIG_FILE: &str = "borderhub.yaml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Directory holding the result CSV files.
    pub data_dir: PathBuf,
    /// Directory holding the slide images.
    pub pictures_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub slides: Vec<Slide>,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            pictures_dir: PathBuf::from("pictures"),
            host: "127.0.0.1".to_string(),
            port: 8501,
            slides: default_deck(),
        }
    }
}

impl HubConfig {
    /// Load from an explicit path (which must exist) or from
    /// `borderhub.yaml` in the working directory (defaults if absent).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) if !p.exists() => Err(HubError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("config file not found: {}", p.display()),
            ))),
            Some(p) => storage::load_yaml(p),
            None => storage::load_yaml(Path::new(DEFAULT_CONFIG_FILE)),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        storage::save_yaml(path, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_falls_back_to_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("hub.yaml");
        std::fs::write(&path, "port: 9000\ndata_dir: results\n").unwrap();
        let cfg = HubConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.data_dir, PathBuf::from("results"));
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.slides.len(), default_deck().len());
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(HubConfig::load(Some(&tmp.path().join("nope.yaml"))).is_err());
    }

    #[test]
    fn save_then_load() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("hub.yaml");
        let cfg = HubConfig {
            slides: vec![Slide::new("x.png", "X", "caption")],
            ..Default::default()
        };
        cfg.save(&path).unwrap();
        let back = HubConfig::load(Some(&path)).unwrap();
        assert_eq!(back.slides, cfg.slides);
    }
}
