//! Extension pour intégrer la configuration du renderer dans pmoconfig
//!
//! Ce module fournit le trait `RendererConfigExt`, qui ajoute à
//! `pmoconfig::Config` les réglages lus au démarrage du MediaRenderer.
//! Toutes les clés vivent sous `renderer:`.

use std::time::Duration;

use anyhow::Result;
use pmoconfig::Config;
use serde_yaml::Value;

use crate::renderer::RendererOptions;

const DEFAULT_FRIENDLY_NAME: &str = "PMORenderer";
const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
const DEFAULT_TRACKS_MAX: usize = 1000;
const DEFAULT_INITIAL_VOLUME: u16 = 50;

/// Trait d'extension pour ajouter la configuration du renderer à pmoconfig
///
/// # Exemple
///
/// ```no_run
/// use pmoconfig::Config;
/// use pmomediarenderer::RendererConfigExt;
///
/// let config = Config::load_config("/etc/pmorenderer")?;
/// let options = config.get_renderer_options();
/// println!("{} polls every {:?}", options.friendly_name, options.poll_interval);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub trait RendererConfigExt {
    /// Nom convivial du renderer (défaut: "PMORenderer")
    fn get_renderer_friendly_name(&self) -> String;

    fn set_renderer_friendly_name(&self, name: String) -> Result<()>;

    /// Période du relevé de position (défaut: 500 ms, minimum 50 ms)
    fn get_renderer_poll_interval(&self) -> Duration;

    /// Capacité de la playlist (défaut: 1000)
    fn get_renderer_tracks_max(&self) -> usize;

    /// Volume appliqué quand l'`Output` ne fournit pas le sien (défaut: 50,
    /// borné à 100)
    fn get_renderer_initial_volume(&self) -> u16;

    fn set_renderer_initial_volume(&self, volume: u16) -> Result<()>;

    /// Mode repeat initial de la playlist (défaut: false)
    fn get_renderer_repeat(&self) -> bool;

    /// Rassemble tous les réglages.
    fn get_renderer_options(&self) -> RendererOptions {
        RendererOptions {
            friendly_name: self.get_renderer_friendly_name(),
            poll_interval: self.get_renderer_poll_interval(),
            tracks_max: self.get_renderer_tracks_max(),
            initial_volume: self.get_renderer_initial_volume(),
            repeat: self.get_renderer_repeat(),
        }
    }
}

impl RendererConfigExt for Config {
    fn get_renderer_friendly_name(&self) -> String {
        match self.get_value(&["renderer", "friendly_name"]) {
            Ok(Value::String(s)) if !s.is_empty() => s,
            _ => DEFAULT_FRIENDLY_NAME.to_string(),
        }
    }

    fn set_renderer_friendly_name(&self, name: String) -> Result<()> {
        self.set_value(&["renderer", "friendly_name"], Value::String(name))
    }

    fn get_renderer_poll_interval(&self) -> Duration {
        let ms = self.get_u64(&["renderer", "poll_interval_ms"])
            .unwrap_or(DEFAULT_POLL_INTERVAL_MS)
            .max(50);
        Duration::from_millis(ms)
    }

    fn get_renderer_tracks_max(&self) -> usize {
        self.get_u64(&["renderer", "tracks_max"])
            .filter(|n| *n > 0)
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_TRACKS_MAX)
    }

    fn get_renderer_initial_volume(&self) -> u16 {
        self.get_u64(&["renderer", "initial_volume"])
            .map(|v| v.min(100) as u16)
            .unwrap_or(DEFAULT_INITIAL_VOLUME)
    }

    fn set_renderer_initial_volume(&self, volume: u16) -> Result<()> {
        self.set_u64(&["renderer", "initial_volume"], volume.min(100) as u64)
    }

    fn get_renderer_repeat(&self) -> bool {
        match self.get_value(&["renderer", "repeat"]) {
            Ok(Value::Bool(b)) => b,
            Ok(Value::String(s)) => matches!(s.to_lowercase().as_str(), "1" | "true" | "yes"),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_renderer_options_from_config() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config.yaml"),
            "renderer:\n  friendly_name: Salon\n  poll_interval_ms: 10\n  initial_volume: 250\n  repeat: true\n",
        )
        .unwrap();
        let config = Config::load_config(&dir.path().to_string_lossy()).unwrap();

        let options = config.get_renderer_options();
        assert_eq!(options.friendly_name, "Salon");
        assert_eq!(options.poll_interval, Duration::from_millis(50));
        assert_eq!(options.tracks_max, DEFAULT_TRACKS_MAX);
        assert_eq!(options.initial_volume, 100);
        assert!(options.repeat);
    }

    #[test]
    fn test_setters() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_config(&dir.path().to_string_lossy()).unwrap();

        config.set_renderer_friendly_name("Cuisine".to_string()).unwrap();
        config.set_renderer_initial_volume(30).unwrap();

        assert_eq!(config.get_renderer_friendly_name(), "Cuisine");
        assert_eq!(config.get_renderer_initial_volume(), 30);
        assert_eq!(config.get_renderer_poll_interval(), Duration::from_millis(500));
    }
}
