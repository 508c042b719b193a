//! # pmoconfig
//!
//! Fichier de configuration YAML de PMORenderer.
//!
//! La configuration effective est construite en trois couches :
//!
//! 1. les valeurs par défaut embarquées (`pmorenderer.yaml`) ;
//! 2. le fichier `config.yaml` du répertoire de configuration ;
//! 3. les variables d'environnement `PMORENDERER_CONFIG__SECTION__CLE`.
//!
//! Les clés sont insensibles à la casse. Toute modification est réécrite
//! immédiatement sur disque. Les clés propres au renderer sont lues par
//! `pmomediarenderer::RendererConfigExt`.
//!
//! ```no_run
//! use pmoconfig::Config;
//!
//! let config = Config::load_config("")?;
//! config.set_log_min_level("DEBUG".to_string())?;
//! assert_eq!(config.get_log_min_level()?, "DEBUG");
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow, bail};
use parking_lot::Mutex;
use serde_yaml::{Mapping, Number, Value};
use tracing::{info, warn};
use uuid::Uuid;

const EMBEDDED_DEFAULTS: &str = include_str!("pmorenderer.yaml");

const ENV_CONFIG_DIR: &str = "PMORENDERER_CONFIG";
const ENV_PREFIX: &str = "PMORENDERER_CONFIG__";
const CONFIG_DIR_NAME: &str = ".pmorenderer";
const CONFIG_FILE_NAME: &str = "config.yaml";

const LOG_MIN_LEVEL: &[&str] = &["host", "logger", "min_level"];
const LOG_ENABLE_CONSOLE: &[&str] = &["host", "logger", "enable_console"];

/// Configuration chargée, protégée par un verrou et persistée à chaque
/// écriture.
///
/// Il n'y a pas d'instance globale : le binaire charge la configuration
/// au démarrage et la passe à ceux qui en ont besoin.
#[derive(Debug)]
pub struct Config {
    dir: PathBuf,
    file: PathBuf,
    tree: Mutex<Value>,
}

impl Clone for Config {
    fn clone(&self) -> Self {
        let tree = self.tree.lock().clone();
        Self {
            dir: self.dir.clone(),
            file: self.file.clone(),
            tree: Mutex::new(tree),
        }
    }
}

impl Config {
    /// Choisit puis prépare le répertoire de configuration.
    ///
    /// Ordre de recherche : `directory` s'il n'est pas vide, la variable
    /// `PMORENDERER_CONFIG`, `./.pmorenderer`, puis `~/.pmorenderer`.
    /// À défaut, `./.pmorenderer` est créé.
    ///
    /// # Errors
    ///
    /// Le répertoire ne peut pas être créé, n'en est pas un, ou n'est pas
    /// accessible en écriture.
    pub fn config_dir(directory: &str) -> Result<String> {
        let dir = locate_dir(directory);
        prepare_dir(&dir).with_context(|| format!("invalid config directory {}", dir.display()))?;
        Ok(dir.to_string_lossy().into_owned())
    }

    /// Charge la configuration depuis `directory` (voir [`Config::config_dir`]).
    ///
    /// Le résultat de la fusion est réécrit dans `config.yaml`, ce qui
    /// fait apparaître dans le fichier les clés ajoutées depuis.
    ///
    /// # Errors
    ///
    /// Répertoire inutilisable, `config.yaml` illisible ou impossible à écrire.
    pub fn load_config(directory: &str) -> Result<Self> {
        let dir = PathBuf::from(Self::config_dir(directory)?);
        let file = dir.join(CONFIG_FILE_NAME);
        info!("📂 Config directory: {}", dir.display());

        let mut tree = default_tree()?;
        if file.exists() {
            let raw = fs::read_to_string(&file)
                .with_context(|| format!("cannot read {}", file.display()))?;
            let user: Value = serde_yaml::from_str(&raw)
                .with_context(|| format!("cannot parse {}", file.display()))?;
            overlay(&mut tree, lowercase_keys(user));
            info!("📄 Loaded {}", file.display());
        } else {
            info!("📄 No {} yet, starting from defaults", file.display());
        }
        apply_env_overrides(&mut tree, env::vars());

        let config = Config {
            dir,
            file,
            tree: Mutex::new(tree),
        };
        config.save()?;
        Ok(config)
    }

    pub fn config_dir_path(&self) -> PathBuf {
        self.dir.clone()
    }

    pub fn config_file_path(&self) -> PathBuf {
        self.file.clone()
    }

    /// Réécrit `config.yaml`.
    pub fn save(&self) -> Result<()> {
        let text = serde_yaml::to_string(&*self.tree.lock())?;
        fs::write(&self.file, text).with_context(|| format!("cannot write {}", self.file.display()))
    }

    /// Remplace la valeur à `path` (créant les sections manquantes) puis
    /// sauvegarde.
    ///
    /// # Arguments
    ///
    /// * `path` - suite de clés, par exemple `&["renderer", "tracks_max"]`
    /// * `value` - nouvelle valeur YAML
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        store(&mut self.tree.lock(), path, value)?;
        self.save()
    }

    /// Valeur à `path`.
    ///
    /// # Errors
    ///
    /// Une des clés du chemin est absente.
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        lookup(&self.tree.lock(), path)
    }

    /// Entier positif à `path`, qu'il soit écrit comme nombre ou comme texte.
    pub fn get_u64(&self, path: &[&str]) -> Option<u64> {
        match self.get_value(path).ok()? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn set_u64(&self, path: &[&str], value: u64) -> Result<()> {
        self.set_value(path, Value::Number(Number::from(value)))
    }

    /// UDN du périphérique `devtype`/`name`, sans préfixe `uuid:`.
    ///
    /// Un UDN est tiré au hasard et enregistré au premier appel, de sorte
    /// que le renderer garde la même identité d'un lancement à l'autre.
    pub fn get_device_udn(&self, devtype: &str, name: &str) -> Result<String> {
        let path = ["devices", devtype, name, "udn"];
        if let Ok(Value::String(udn)) = self.get_value(&path) {
            return Ok(bare_udn(&udn));
        }
        let udn = Uuid::new_v4().to_string();
        self.set_value(&path, Value::String(udn.clone()))?;
        Ok(udn)
    }

    pub fn set_device_udn(&self, devtype: &str, name: &str, udn: String) -> Result<()> {
        self.set_value(&["devices", devtype, name, "udn"], Value::String(bare_udn(&udn)))
    }

    /// Sortie console des logs (activée par défaut).
    pub fn get_log_enable_console(&self) -> Result<bool> {
        Ok(!matches!(self.get_value(LOG_ENABLE_CONSOLE), Ok(Value::Bool(false))))
    }

    pub fn set_log_enable_console(&self, enabled: bool) -> Result<()> {
        self.set_value(LOG_ENABLE_CONSOLE, Value::Bool(enabled))
    }

    /// Niveau minimal des logs, `INFO` par défaut.
    pub fn get_log_min_level(&self) -> Result<String> {
        Ok(match self.get_value(LOG_MIN_LEVEL) {
            Ok(Value::String(level)) => level,
            _ => "INFO".to_string(),
        })
    }

    pub fn set_log_min_level(&self, level: String) -> Result<()> {
        self.set_value(LOG_MIN_LEVEL, Value::String(level))
    }
}

fn locate_dir(directory: &str) -> PathBuf {
    if !directory.is_empty() {
        return PathBuf::from(directory);
    }
    if let Ok(from_env) = env::var(ENV_CONFIG_DIR) {
        info!("🔧 Config directory taken from {}", ENV_CONFIG_DIR);
        return PathBuf::from(from_env);
    }
    let local = PathBuf::from(CONFIG_DIR_NAME);
    let home = dirs::home_dir().map(|h| h.join(CONFIG_DIR_NAME));
    [Some(local.clone()), home]
        .into_iter()
        .flatten()
        .find(|candidate| candidate.is_dir())
        .unwrap_or(local)
}

fn prepare_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    if !dir.is_dir() {
        bail!("not a directory");
    }
    let probe = dir.join(".pmorenderer-probe");
    fs::write(&probe, b"")?;
    fs::remove_file(&probe)?;
    Ok(())
}

fn bare_udn(udn: &str) -> String {
    let udn = udn.trim();
    udn.strip_prefix("uuid:").unwrap_or(udn).to_string()
}

fn default_tree() -> Result<Value> {
    let tree: Value = serde_yaml::from_str(EMBEDDED_DEFAULTS)?;
    Ok(lowercase_keys(tree))
}

fn key(name: &str) -> Value {
    Value::String(name.to_lowercase())
}

fn lookup(tree: &Value, path: &[&str]) -> Result<Value> {
    let mut node = tree;
    for (depth, name) in path.iter().enumerate() {
        node = node
            .as_mapping()
            .and_then(|map| map.get(&key(name)))
            .ok_or_else(|| anyhow!("no config entry {}", path[..=depth].join(".")))?;
    }
    Ok(node.clone())
}

fn store(tree: &mut Value, path: &[&str], value: Value) -> Result<()> {
    let Some((last, parents)) = path.split_last() else {
        *tree = value;
        return Ok(());
    };
    let mut node = tree;
    for name in parents {
        let map = node
            .as_mapping_mut()
            .ok_or_else(|| anyhow!("{} is not a section", name))?;
        node = map.entry(key(name)).or_insert_with(|| Value::Mapping(Mapping::new()));
    }
    node.as_mapping_mut()
        .ok_or_else(|| anyhow!("cannot set {} under a scalar", path.join(".")))?
        .insert(key(last), value);
    Ok(())
}

/// `PMORENDERER_CONFIG__RENDERER__TRACKS_MAX=7` écrit `renderer.tracks_max`.
/// La valeur est lue comme du YAML, à défaut comme du texte.
fn apply_env_overrides(tree: &mut Value, vars: impl IntoIterator<Item = (String, String)>) {
    for (name, raw) in vars {
        let Some(rest) = name.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        let path: Vec<&str> = rest.split("__").collect();
        let value = serde_yaml::from_str(&raw).unwrap_or(Value::String(raw.clone()));
        if let Err(e) = store(tree, &path, value) {
            warn!("⚠️ Ignoring {}: {}", name, e);
        }
    }
}

fn lowercase_keys(value: Value) -> Value {
    match value {
        Value::Mapping(map) => Value::Mapping(
            map.into_iter()
                .map(|(k, v)| {
                    let k = match k {
                        Value::String(s) => Value::String(s.to_lowercase()),
                        other => other,
                    };
                    (k, lowercase_keys(v))
                })
                .collect(),
        ),
        Value::Sequence(items) => Value::Sequence(items.into_iter().map(lowercase_keys).collect()),
        other => other,
    }
}

/// Superpose `upper` à `base` : les sections sont fusionnées clé par clé,
/// tout le reste est remplacé.
fn overlay(base: &mut Value, upper: Value) {
    match (base, upper) {
        (Value::Mapping(base_map), Value::Mapping(upper_map)) => {
            for (k, v) in upper_map {
                match base_map.get_mut(&k) {
                    Some(slot) => overlay(slot, v),
                    None => {
                        base_map.insert(k, v);
                    }
                }
            }
        }
        (slot, v) => *slot = v,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn load(dir: &TempDir) -> Config {
        Config::load_config(&dir.path().to_string_lossy()).unwrap()
    }

    #[test]
    fn test_defaults_without_file() {
        let dir = TempDir::new().unwrap();
        let config = load(&dir);

        assert_eq!(config.get_log_min_level().unwrap(), "INFO");
        assert!(config.get_log_enable_console().unwrap());
        assert_eq!(config.get_u64(&["renderer", "tracks_max"]), Some(1000));
        // La configuration fusionnée est écrite sur disque.
        assert!(dir.path().join(CONFIG_FILE_NAME).exists());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "Renderer:\n  Tracks_Max: 12\n",
        )
        .unwrap();

        let config = load(&dir);
        assert_eq!(config.get_u64(&["renderer", "tracks_max"]), Some(12));
        assert_eq!(config.get_u64(&["RENDERER", "poll_interval_ms"]), Some(500));
    }

    #[test]
    fn test_set_value_is_saved() {
        let dir = TempDir::new().unwrap();
        let config = load(&dir);
        config.set_log_min_level("DEBUG".to_string()).unwrap();

        let reloaded = load(&dir);
        assert_eq!(reloaded.get_log_min_level().unwrap(), "DEBUG");
    }

    #[test]
    fn test_env_overrides() {
        let mut value = default_tree().unwrap();
        apply_env_overrides(
            &mut value,
            vec![
                ("PMORENDERER_CONFIG__RENDERER__TRACKS_MAX".to_string(), "7".to_string()),
                ("PMORENDERER_CONFIG__RENDERER__FRIENDLY_NAME".to_string(), "Salon".to_string()),
                ("OTHER__RENDERER__REPEAT".to_string(), "true".to_string()),
            ],
        );

        assert_eq!(
            lookup(&value, &["renderer", "tracks_max"]).unwrap(),
            Value::Number(Number::from(7))
        );
        assert_eq!(
            lookup(&value, &["renderer", "friendly_name"]).unwrap(),
            Value::String("Salon".to_string())
        );
        assert_eq!(
            lookup(&value, &["renderer", "repeat"]).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_device_udn_is_stable() {
        let dir = TempDir::new().unwrap();
        let config = load(&dir);
        let udn = config.get_device_udn("mediarenderer", "PMORenderer").unwrap();
        assert_eq!(
            config.get_device_udn("mediarenderer", "PMORenderer").unwrap(),
            udn
        );

        config
            .set_device_udn("mediarenderer", "PMORenderer", "uuid:abc".to_string())
            .unwrap();
        assert_eq!(
            config.get_device_udn("mediarenderer", "PMORenderer").unwrap(),
            "abc"
        );
    }

    #[test]
    fn test_missing_path() {
        let dir = TempDir::new().unwrap();
        let config = load(&dir);
        assert!(config.get_value(&["renderer", "nope"]).is_err());
    }
}
