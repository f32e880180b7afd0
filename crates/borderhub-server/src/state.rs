//! Shared application state for the Axum server.

use std::path::PathBuf;
use std::sync::Arc;

use borderhub_core::{DatasetCache, HubConfig, Slide};

use crate::session::SessionRegistry;

#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<DatasetCache>,
    pub sessions: SessionRegistry,
    pub deck: Arc<[Slide]>,
    pub pictures_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            cache: Arc::new(DatasetCache::new(config.data_dir.clone())),
            sessions: SessionRegistry::new(),
            deck: config.slides.clone().into(),
            pictures_dir: Arc::new(config.pictures_dir.clone()),
        }
    }
}

/// Configuration for the web server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub data_dir: PathBuf,
    pub pictures_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub slides: Vec<Slide>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        HubConfig::default().into()
    }
}

impl From<HubConfig> for ServerConfig {
    fn from(c: HubConfig) -> Self {
        Self {
            data_dir: c.data_dir,
            pictures_dir: c.pictures_dir,
            host: c.host,
            port: c.port,
            slides: c.slides,
        }
    }
}
