use crate::config::Config;
use crate::error::CatalogError;
use crate::model::AppEntry;

pub trait Source: Send + Sync {
    fn name(&self) -> &str;
    fn scan(&self) -> Result<Vec<AppEntry>, CatalogError>;
}

pub mod desktop;
pub mod macos;

/// The application backends for the running OS.
pub fn platform_sources(config: &Config) -> Vec<Box<dyn Source>> {
    if cfg!(target_os = "macos") {
        vec![Box::new(macos::MacAppsSource::system())]
    } else {
        vec![Box::new(desktop::DesktopSource::from_config(config))]
    }
}
