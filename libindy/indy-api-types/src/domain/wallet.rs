use std::{collections::HashMap, fmt};

use serde_json::value::Value;
use zeroize::Zeroize;

use crate::validation::Validatable;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    pub id: String,
    pub storage_type: Option<String>,
    pub storage_config: Option<Value>,
    pub cache: Option<CacheConfig>,
}

impl Validatable for Config {
    fn validate(&self) -> Result<(), String> {
        if self.id.is_empty() {
            return Err("Wallet id is empty".to_string());
        }

        if let Some(ref cache) = self.cache {
            cache.validate()?;
        }

        Ok(())
    }
}

/// Settings understood by the storage back ends. The default SQLite storage
/// only reads `path`; the rest are accepted for compatibility.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct StorageConfig {
    pub path: Option<String>,
    pub url: Option<String>,
    pub wallet_scheme: Option<String>,
    pub database_name: Option<String>,
    pub tls: Option<String>,
    pub max_connections: Option<u32>,
    pub min_idle_count: Option<u32>,
    pub connection_timeout: Option<u64>,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct Credentials {
    pub key: String,
    pub rekey: Option<String>,
    pub storage_credentials: Option<Value>,
    #[serde(default = "default_key_derivation_method")]
    pub key_derivation_method: KeyDerivationMethod,
    #[serde(default = "default_key_derivation_method")]
    pub rekey_derivation_method: KeyDerivationMethod,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &"***")
            .field("rekey", &self.rekey.as_ref().map(|_| "***"))
            .field("storage_credentials", &self.storage_credentials)
            .field("key_derivation_method", &self.key_derivation_method)
            .field("rekey_derivation_method", &self.rekey_derivation_method)
            .finish()
    }
}

impl Zeroize for Credentials {
    fn zeroize(&mut self) {
        self.key.zeroize();
        self.rekey.zeroize();
    }
}

impl Drop for Credentials {
    fn drop(&mut self) {
        self.zeroize();
    }
}

#[allow(non_camel_case_types)]
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum KeyDerivationMethod {
    RAW,
    ARGON2I_MOD,
    ARGON2I_INT,
}

pub fn default_key_derivation_method() -> KeyDerivationMethod {
    KeyDerivationMethod::ARGON2I_MOD
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExportConfig {
    pub key: String,
    pub path: String,
    #[serde(default = "default_key_derivation_method")]
    pub key_derivation_method: KeyDerivationMethod,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ImportConfig {
    pub key: String,
    pub path: String,
}

impl From<ExportConfig> for ImportConfig {
    fn from(config: ExportConfig) -> Self {
        ImportConfig {
            key: config.key.clone(),
            path: config.path.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct KeyConfig {
    pub seed: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Record {
    // Wallet record type
    #[serde(rename = "type")]
    pub type_: String,
    // Wallet record id
    pub id: String,
    // Wallet record value
    pub value: String,
    // Wallet record tags
    pub tags: HashMap<String, String>,
}

pub type Tags = HashMap<String, String>;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    #[serde(default = "default_cache_size")]
    pub size: usize,
    pub entities: Vec<String>,
    #[serde(default)]
    pub algorithm: CachingAlgorithm,
}

impl Validatable for CacheConfig {
    fn validate(&self) -> Result<(), String> {
        if self.size == 0 {
            return Err("Wallet cache size must be greater than 0".to_string());
        }

        Ok(())
    }
}

pub const DEFAULT_CACHE_SIZE: usize = 10;

fn default_cache_size() -> usize {
    DEFAULT_CACHE_SIZE
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachingAlgorithm {
    #[serde(rename = "lru")]
    #[default]
    LRU,
}
