#![allow(dead_code)]

use std::{
    env,
    sync::atomic::{AtomicUsize, Ordering},
};

use indy::{
    types::domain::wallet::KeyDerivationMethod, Config, Credentials, Locator, WalletHandle,
};
use lazy_static::lazy_static;
use tempfile::TempDir;

pub const SEED_MY1: &str = "00000000000000000000000000000My1";
pub const SEED_MY2: &str = "00000000000000000000000000000My2";
pub const DID_TRUSTEE: &str = "V4SGRU86Z58d6TV7PBUe6f";
pub const VERKEY_TRUSTEE: &str = "GJ1SzoWzavQYfNL9XkaJdrQejfztN4XqdsiV4ct3LXKL";
pub const SEED_TRUSTEE: &str = "000000000000000000000000Trustee1";

lazy_static! {
    static ref INDY_HOME: TempDir = {
        let dir = tempfile::tempdir().expect("can't create indy home");
        env::set_var("INDY_HOME", dir.path());
        dir
    };
}

static WALLET_SEQ: AtomicUsize = AtomicUsize::new(0);

/// Points INDY_HOME at a per-process temporary directory before the Locator is built.
pub fn locator() -> &'static Locator {
    lazy_static::initialize(&INDY_HOME);
    Locator::instance()
}

pub struct WalletSetup {
    pub name: String,
    pub config: Config,
    pub credentials: Credentials,
    pub wallet_handle: WalletHandle,
}

impl WalletSetup {
    pub async fn new() -> WalletSetup {
        let locator = locator();

        let name = format!(
            "wallet_{}_{}",
            std::process::id(),
            WALLET_SEQ.fetch_add(1, Ordering::SeqCst)
        );

        let config = Config {
            id: name.clone(),
            ..Config::default()
        };

        let credentials = raw_credentials(locator);

        locator
            .wallet_controller
            .create(config.clone(), credentials.clone())
            .await
            .unwrap();

        let wallet_handle = locator
            .wallet_controller
            .open(config.clone(), credentials.clone())
            .await
            .unwrap();

        WalletSetup {
            name,
            config,
            credentials,
            wallet_handle,
        }
    }

    pub async fn close(self) {
        let locator = locator();

        locator
            .wallet_controller
            .close(self.wallet_handle)
            .await
            .unwrap();

        locator
            .wallet_controller
            .delete(self.config.clone(), self.credentials.clone())
            .await
            .unwrap();
    }
}

pub fn raw_credentials(locator: &Locator) -> Credentials {
    Credentials {
        key: locator.wallet_controller.generate_wallet_key(None).unwrap(),
        rekey: None,
        storage_credentials: None,
        key_derivation_method: KeyDerivationMethod::RAW,
        rekey_derivation_method: KeyDerivationMethod::RAW,
    }
}
