use log::LevelFilter;
use serde::Deserialize;
use std::{env, fs::read_to_string, path::Path};

/// The server version extracted from the Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable key to load the config from
const CONFIG_ENV_KEY: &str = "MW_CONFIG_JSON";

pub fn load_config() -> Option<Config> {
    // Attempt to load the config from the env
    if let Ok(env) = env::var(CONFIG_ENV_KEY) {
        let config: Config = match serde_json::from_str(&env) {
            Ok(value) => value,
            Err(err) => {
                eprintln!("Failed to load env config (Using default): {:?}", err);
                return None;
            }
        };
        return Some(config);
    }

    // Attempt to load the config from disk
    let file = Path::new("config.json");
    if !file.exists() {
        return None;
    }

    let data = match read_to_string(file) {
        Ok(value) => value,
        Err(err) => {
            eprintln!("Failed to load config file (Using defaults): {:?}", err);
            return None;
        }
    };

    let config: Config = match serde_json::from_str(&data) {
        Ok(value) => value,
        Err(err) => {
            eprintln!("Failed to load config file (Using default): {:?}", err);
            return None;
        }
    };

    Some(config)
}

#[derive(Deserialize)]
#[serde(default)]
pub struct Config {
    pub port: u16,
    pub logging: LevelFilter,
    pub superuser: SuperuserConfig,
    pub multidata: MultidataConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            logging: LevelFilter::Info,
            superuser: Default::default(),
            multidata: Default::default(),
        }
    }
}

/// A superuser identity bypasses every session allow-list (spec.md §4.7).
#[derive(Default, Deserialize)]
pub struct SuperuserConfig {
    pub external_identity_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(default)]
pub struct MultidataConfig {
    /// Maximum accepted size of the raw (compressed) upload body, in bytes.
    pub max_upload_bytes: usize,
}

impl Default for MultidataConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}
