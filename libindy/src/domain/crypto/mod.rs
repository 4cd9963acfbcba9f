pub mod combo_box;
pub mod did;
pub mod key;
pub mod pack;

#[derive(Debug, Serialize, Deserialize, Eq, PartialEq, Clone)]
pub enum CryptoTypes {
    #[serde(rename = "ed25519")]
    Ed25519,
}

pub const ED25519: &str = "ed25519";
pub const DEFAULT_CRYPTO_TYPE: &str = ED25519;
