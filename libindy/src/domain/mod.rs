pub mod anoncreds;
pub mod cache;
pub mod crypto;
pub mod ledger;
pub mod non_secrets;
pub mod pairwise;
pub mod pool;

use indy_api_types::validation::Validatable;

#[derive(Debug, Serialize, Deserialize)]
pub struct IndyConfig {
    pub crypto_thread_pool_size: Option<usize>,
    pub collect_backtrace: Option<bool>,
}

impl Validatable for IndyConfig {
    fn validate(&self) -> Result<(), String> {
        if self.crypto_thread_pool_size == Some(0) {
            return Err(String::from("`crypto_thread_pool_size` must be greater than 0"));
        }
        Ok(())
    }
}
