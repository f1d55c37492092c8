//! Configuration de pmoremote
//!
//! La configuration est construite à partir :
//! - d'une configuration par défaut intégrée (`pmoremote.yaml`)
//! - d'un fichier `config.yaml` optionnel dans le répertoire de configuration
//! - de variables d'environnement `PMOREMOTE_CONFIG__SECTION__CLE=valeur`
//!
//! Les clés sont insensibles à la casse. Rien n'est réécrit sur disque.
//!
//! ```no_run
//! use pmoremote::RemoteConfig;
//!
//! let config = RemoteConfig::load(None)?;
//! println!("poll interval: {:?}", config.upload.poll_interval());
//! # Ok::<(), pmoremote::Error>(())
//! ```

use anyhow::{anyhow, Context};
use dirs::home_dir;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs, io};
use tracing::info;

const DEFAULT_CONFIG: &str = include_str!("pmoremote.yaml");

const ENV_CONFIG_DIR: &str = "PMOREMOTE_CONFIG";
const ENV_PREFIX: &str = "PMOREMOTE_CONFIG__";
const CONFIG_FILE: &str = "config.yaml";
const CONFIG_DIR_NAME: &str = ".pmoremote";

/// Paramètres de l'attente d'upload (et de chargement)
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct UploadConfig {
    pub poll_interval_ms: u64,
    pub default_timeout_secs: u64,
}

impl UploadConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.default_timeout_secs)
    }
}

/// Paramètres de diffusion des évènements
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct EventsConfig {
    pub capacity: usize,
}

/// Paramètres du logger
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LoggerConfig {
    pub min_level: String,
}

/// Configuration complète
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RemoteConfig {
    pub upload: UploadConfig,
    pub events: EventsConfig,
    pub logger: LoggerConfig,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        // La configuration intégrée est vérifiée par les tests
        Self::from_value(default_value()).unwrap_or(Self {
            upload: UploadConfig {
                poll_interval_ms: 50,
                default_timeout_secs: 10,
            },
            events: EventsConfig { capacity: 64 },
            logger: LoggerConfig {
                min_level: "info".to_string(),
            },
        })
    }
}

impl RemoteConfig {
    /// Charge la configuration depuis `directory`, ou le répertoire par défaut
    ///
    /// Le répertoire est cherché dans cet ordre :
    /// 1. `directory` s'il est fourni
    /// 2. la variable d'environnement `PMOREMOTE_CONFIG`
    /// 3. `.pmoremote` dans le répertoire courant
    /// 4. `.pmoremote` dans le répertoire personnel
    pub fn load(directory: Option<&Path>) -> crate::Result<Self> {
        let config_dir = find_config_dir(directory);
        info!(config_dir=%config_dir.display(), "Using config directory");
        Ok(Self::load_with_env(&config_dir, env::vars())?)
    }

    /// Construit une configuration à partir d'un document YAML partiel
    pub fn from_yaml_str(yaml: &str) -> crate::Result<Self> {
        let mut value = default_value();
        let external: Value = serde_yaml::from_str(yaml).context("invalid YAML")?;
        merge_yaml(&mut value, &lower_keys(external));
        Ok(Self::from_value(value)?)
    }

    fn load_with_env(
        config_dir: &Path,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> anyhow::Result<Self> {
        let mut value = default_value();

        let path = config_dir.join(CONFIG_FILE);
        match fs::read(&path) {
            Ok(data) => {
                info!(config_file=%path.display(), "Loaded config file");
                let external: Value = serde_yaml::from_slice(&data)
                    .with_context(|| format!("invalid YAML in {}", path.display()))?;
                merge_yaml(&mut value, &lower_keys(external));
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(config_file=%path.display(), "Config file not found, using default embedded config");
            }
            Err(e) => {
                return Err(e).with_context(|| format!("cannot read {}", path.display()));
            }
        }

        apply_env_overrides(&mut value, vars);
        Self::from_value(value)
    }

    fn from_value(value: Value) -> anyhow::Result<Self> {
        serde_yaml::from_value(value).map_err(|e| anyhow!("invalid configuration: {e}"))
    }
}

fn default_value() -> Value {
    serde_yaml::from_str(DEFAULT_CONFIG)
        .map(lower_keys)
        .unwrap_or(Value::Mapping(Mapping::new()))
}

fn find_config_dir(directory: Option<&Path>) -> PathBuf {
    if let Some(directory) = directory {
        return directory.to_path_buf();
    }

    if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
        info!(env_var = ENV_CONFIG_DIR, path=%env_path, "Trying to load config from env");
        return PathBuf::from(env_path);
    }

    if Path::new(CONFIG_DIR_NAME).exists() {
        return PathBuf::from(CONFIG_DIR_NAME);
    }

    if let Some(home) = home_dir() {
        let home_config = home.join(CONFIG_DIR_NAME);
        if home_config.exists() {
            return home_config;
        }
    }

    PathBuf::from(CONFIG_DIR_NAME)
}

fn apply_env_overrides(config: &mut Value, vars: impl IntoIterator<Item = (String, String)>) {
    for (key, value) in vars {
        let Some(path) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        let path: Vec<String> = path.split("__").map(str::to_lowercase).collect();
        let parsed = serde_yaml::from_str::<Value>(&value).unwrap_or(Value::String(value));
        set_value(config, &path, parsed);
    }
}

fn set_value(data: &mut Value, path: &[String], value: Value) {
    let Some((key, rest)) = path.split_first() else {
        *data = value;
        return;
    };

    if !data.is_mapping() {
        *data = Value::Mapping(Mapping::new());
    }

    if let Value::Mapping(map) = data {
        let entry = map
            .entry(Value::String(key.clone()))
            .or_insert(Value::Mapping(Mapping::new()));
        set_value(entry, rest, value);
    }
}

fn lower_keys(value: Value) -> Value {
    match value {
        Value::Mapping(map) => Value::Mapping(
            map.into_iter()
                .map(|(k, v)| match k {
                    Value::String(s) => (Value::String(s.to_lowercase()), lower_keys(v)),
                    other => (other, lower_keys(v)),
                })
                .collect(),
        ),
        Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(lower_keys).collect()),
        other => other,
    }
}

/// Fusionne récursivement `external` dans `default`
///
/// Les mappings sont fusionnés clé par clé, les scalaires et séquences sont
/// remplacés.
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(),
    }
}
