use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use log::{debug, warn};
use once_cell::sync::Lazy;
use uuid::Uuid;

use crate::model::{CharEncoding, Scheme};
use crate::util::{Mapper, DEFAULT_NAMESPACE};

pub static DEFAULT_DATA_DIR: Lazy<PathBuf> = Lazy::new(|| PathBuf::from("data"));

pub const PROFILES_FILE: &str = "profiles.jsonl";
pub const PATCHES_FILE: &str = "patches.jsonl";
pub const INDEX_FILE: &str = "identity.idx.jsonl";

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub scheme: Scheme,
    pub encoding: CharEncoding,
    pub namespace: Uuid,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: DEFAULT_DATA_DIR.clone(),
            scheme: Scheme::default(),
            encoding: CharEncoding::default(),
            namespace: DEFAULT_NAMESPACE,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset or unparsable keys keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            data_dir: try_load(&lookup, "UDYOGA_DATA_DIR", defaults.data_dir),
            scheme: try_load(&lookup, "UDYOGA_ID_SCHEME", defaults.scheme),
            encoding: try_load(&lookup, "UDYOGA_ID_ENCODING", defaults.encoding),
            namespace: try_load(&lookup, "UDYOGA_ID_NAMESPACE", defaults.namespace),
        }
    }

    pub fn mapper(&self) -> Mapper {
        Mapper {
            scheme: self.scheme,
            encoding: self.encoding,
            namespace: self.namespace,
        }
    }

    pub fn profiles_path(&self) -> PathBuf {
        self.data_dir.join(PROFILES_FILE)
    }

    pub fn patches_path(&self) -> PathBuf {
        self.data_dir.join(PATCHES_FILE)
    }

    pub fn index_path(&self) -> PathBuf {
        self.data_dir.join(INDEX_FILE)
    }
}

fn try_load<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Debug,
    T::Err: Display,
{
    match lookup(key) {
        None => {
            debug!("{key} not set, using default: {default:?}");
            default
        }
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value '{raw}': {e}, using default: {default:?}");
            default
        }),
    }
}
