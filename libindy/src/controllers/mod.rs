mod anoncreds;
mod cache;
mod config;
mod crypto;
mod did;
mod ledger;
mod non_secrets;
mod pairwise;
mod pool;
mod wallet;

pub use anoncreds::ProverController;
pub use cache::CacheController;
pub use config::ConfigController;
pub use crypto::CryptoController;
pub use did::DidController;
pub use ledger::LedgerController;
pub use non_secrets::NonSecretsController;
pub use pairwise::PairwiseController;
pub use pool::PoolController;
pub use wallet::WalletController;

use indy_api_types::errors::prelude::*;
use indy_wallet::WalletRecord;
use serde::de::DeserializeOwned;

pub(crate) fn parse_record_value<T>(record: &WalletRecord) -> IndyResult<T>
where
    T: DeserializeOwned,
{
    let value = record.get_value().ok_or_else(|| {
        err_msg(
            IndyErrorKind::InvalidState,
            format!("No value for record {:?}", record.get_id()),
        )
    })?;

    serde_json::from_str(value).to_indy(
        IndyErrorKind::InvalidState,
        format!("Cannot deserialize record {:?}", record.get_id()),
    )
}
