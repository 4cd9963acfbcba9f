#[macro_use]
extern crate log;

#[macro_use]
extern crate serde_derive;

#[macro_use]
extern crate serde_json;

#[macro_use]
extern crate indy_utils;

pub use indy_api_types as types;
pub use indy_credx as credx;

#[macro_use]
mod utils;

pub mod controllers;
pub mod domain;
mod services;

use std::sync::Arc;

pub use domain::{
    anoncreds::{
        credential::{CredentialInfo, Filter},
        credential_definition::{CredentialDefinition, CredentialDefinitionId, CredentialDefinitionV1},
        revocation_registry_definition::RevocationRegistryId,
        schema::{Schema, SchemaId, SchemaV1},
    },
    cache::{GetCacheOptions, PurgeOptions},
    crypto::{
        did::{DidMethod, DidValue, DidWithMeta, MyDidInfo, TheirDidInfo},
        key::KeyInfo,
        pack::{UnpackMessage, JWE},
    },
    ledger::attrib::Endpoint,
    non_secrets::{SearchQuery, SearchRecords},
    pairwise::{Pairwise, PairwiseInfo},
    pool::{PoolConfig, PoolOpenConfig},
    IndyConfig,
};
pub use indy_api_types::{
    domain::wallet::{Config, Credentials, ExportConfig, ImportConfig, KeyConfig, Tags},
    errors::{IndyError, IndyErrorKind, IndyResult},
    PoolHandle, SearchHandle, WalletHandle, INVALID_POOL_HANDLE, INVALID_SEARCH_HANDLE,
    INVALID_WALLET_HANDLE,
};
pub use indy_utils::wql::Query;
pub use indy_wallet::{RecordOptions, SearchOptions, WalletRecord};
use lazy_static::lazy_static;
pub use utils::logger::LibindyDefaultLogger;

use crate::{
    controllers::{
        CacheController, ConfigController, CryptoController, DidController, LedgerController,
        NonSecretsController, PairwiseController, PoolController, ProverController,
        WalletController,
    },
    services::{CryptoService, LedgerService, PoolService, TcpNetworker, WalletService},
};

// Global (lazy inited) instance of Locator
lazy_static! {
    static ref LOCATOR: Locator = Locator::new();
}

pub struct Locator {
    pub config_controller: ConfigController,
    pub crypto_controller: CryptoController,
    pub did_controller: DidController,
    pub pairwise_controller: PairwiseController,
    pub wallet_controller: WalletController,
    pub non_secret_controller: NonSecretsController,
    pub prover_controller: ProverController,
    pub ledger_controller: Arc<LedgerController>,
    pub cache_controller: CacheController,
    pub pool_controller: PoolController,
}

impl Locator {
    pub fn instance() -> &'static Locator {
        &LOCATOR
    }

    fn new() -> Locator {
        info!("new >");

        let crypto_service = Arc::new(CryptoService::new());
        let wallet_service = Arc::new(WalletService::new());
        let ledger_service = Arc::new(LedgerService::new());
        let pool_service = Arc::new(PoolService::new(
            Arc::new(TcpNetworker::new()),
            indy_utils::environment::pool_home_path(),
        ));

        let config_controller = ConfigController::new();

        let crypto_controller =
            CryptoController::new(wallet_service.clone(), crypto_service.clone());

        let did_controller = DidController::new(
            wallet_service.clone(),
            crypto_service.clone(),
            ledger_service.clone(),
            pool_service.clone(),
        );

        let pairwise_controller = PairwiseController::new(wallet_service.clone());

        let wallet_controller =
            WalletController::new(wallet_service.clone(), crypto_service.clone());

        let non_secret_controller = NonSecretsController::new(wallet_service.clone());
        let prover_controller = ProverController::new(wallet_service.clone());

        let ledger_controller = Arc::new(LedgerController::new(
            pool_service.clone(),
            crypto_service,
            wallet_service.clone(),
            ledger_service.clone(),
        ));

        let cache_controller =
            CacheController::new(wallet_service, ledger_service, ledger_controller.clone());

        let pool_controller = PoolController::new(pool_service);

        let res = Locator {
            config_controller,
            crypto_controller,
            did_controller,
            pairwise_controller,
            wallet_controller,
            non_secret_controller,
            prover_controller,
            ledger_controller,
            cache_controller,
            pool_controller,
        };

        info!("new <");
        res
    }
}

impl Drop for Locator {
    fn drop(&mut self) {
        info!(target: "Locator", "drop <>");
    }
}
