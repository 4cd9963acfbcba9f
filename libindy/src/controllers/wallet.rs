use std::sync::Arc;

use indy_api_types::{
    domain::wallet::{Config, Credentials, ExportConfig, ImportConfig, KeyConfig},
    errors::prelude::*,
    WalletHandle,
};
use indy_utils::crypto::{
    base58::ToBase58,
    chacha20poly1305_ietf::{self, Key as MasterKey},
    randombytes,
};
use indy_wallet::{KeyDerivationData, WalletService};

use crate::{services::CryptoService, utils::check_validatable};

pub struct WalletController {
    wallet_service: Arc<WalletService>,
    crypto_service: Arc<CryptoService>,
}

impl WalletController {
    pub(crate) fn new(
        wallet_service: Arc<WalletService>,
        crypto_service: Arc<CryptoService>,
    ) -> WalletController {
        WalletController {
            wallet_service,
            crypto_service,
        }
    }

    /// Creates a new secure wallet with the given unique name.
    ///
    /// #Params
    /// config: Wallet configuration.
    /// {
    ///   "id": string, Identifier of the wallet.
    ///   "storage_type": optional<string>, Type of the wallet storage. Defaults to 'default'.
    ///   "storage_config": optional<object>, Storage configuration json. For the default storage
    ///                     `{"path": optional<string>}`, defaults to `$INDY_HOME/wallet`.
    /// }
    /// credentials: Wallet credentials.
    /// {
    ///   "key": string, Key or passphrase used for wallet key derivation.
    ///   "storage_credentials": optional<object>, ignored by the default storage.
    ///   "key_derivation_method": optional<string> ARGON2I_MOD (default), ARGON2I_INT or RAW.
    /// }
    ///
    /// #Errors
    /// Common*
    /// Wallet*
    pub async fn create(&self, config: Config, credentials: Credentials) -> IndyResult<()> {
        debug!(
            "create > config: {:?} credentials: {:?}",
            &config,
            secret!(&credentials)
        );

        check_validatable(&config, "wallet config")?;

        let key_data = KeyDerivationData::from_passphrase_with_new_salt(
            &credentials.key,
            &credentials.key_derivation_method,
        );

        let key = Self::_derive_key(&key_data).await?;

        let res = self
            .wallet_service
            .create_wallet(&config, &credentials, (&key_data, &key))
            .await;

        debug!("create < {:?}", res);
        res
    }

    /// Opens the wallet with specific name.
    ///
    /// Wallet with corresponded name must be previously created with `create`.
    /// It is impossible to open wallet with the same name more than once.
    ///
    /// `credentials.rekey` re-encrypts the wallet keys with a new master key
    /// before the handle is returned.
    ///
    /// #Returns
    /// Handle to opened wallet to use in methods that require wallet access.
    ///
    /// #Errors
    /// Common*
    /// Wallet*
    pub async fn open(&self, config: Config, credentials: Credentials) -> IndyResult<WalletHandle> {
        debug!(
            "open > config: {:?} credentials: {:?}",
            &config,
            secret!(&credentials)
        );

        check_validatable(&config, "wallet config")?;

        let (wallet_handle, key_derivation_data, rekey_data) = self
            .wallet_service
            .open_wallet_prepare(&config, &credentials)
            .await?;

        let keys = async {
            let key = Self::_derive_key(&key_derivation_data).await?;

            let rekey = match rekey_data {
                Some(rekey_data) => Some(Self::_derive_key(&rekey_data).await?),
                None => None,
            };

            IndyResult::Ok((key, rekey))
        }
        .await;

        let (key, rekey) = match keys {
            Ok(keys) => keys,
            Err(err) => {
                self.wallet_service.cancel_open(wallet_handle).await?;
                return Err(err);
            }
        };

        let res = self
            .wallet_service
            .open_wallet_continue(wallet_handle, (&key, rekey.as_ref()), config.cache)
            .await;

        debug!("open < res: {:?}", res);
        res
    }

    /// Closes opened wallet and frees allocated resources.
    pub async fn close(&self, wallet_handle: WalletHandle) -> IndyResult<()> {
        debug!("close > handle: {:?}", wallet_handle);

        self.wallet_service.close_wallet(wallet_handle).await?;

        debug!("close < res: ()");
        Ok(())
    }

    /// Deletes created wallet. The credentials must open the wallet and the
    /// wallet must not be open.
    pub async fn delete(&self, config: Config, credentials: Credentials) -> IndyResult<()> {
        debug!(
            "delete > config: {:?} credentials: {:?}",
            &config,
            secret!(&credentials)
        );

        check_validatable(&config, "wallet config")?;

        let (metadata, key_derivation_data) = self
            .wallet_service
            .delete_wallet_prepare(&config, &credentials)
            .await?;

        let key = Self::_derive_key(&key_derivation_data).await?;

        let res = self
            .wallet_service
            .delete_wallet_continue(&config, &credentials, &metadata, &key)
            .await;

        debug!("delete < {:?}", res);
        res
    }

    /// Exports opened wallet to the file at `export_config.path`, encrypted
    /// with a key derived from `export_config.key`.
    ///
    /// #Errors
    /// Common*
    /// Wallet*
    pub async fn export(
        &self,
        wallet_handle: WalletHandle,
        export_config: ExportConfig,
    ) -> IndyResult<()> {
        debug!(
            "export > handle: {:?} export_config: {:?}",
            wallet_handle,
            secret!(&export_config)
        );

        let key_data = KeyDerivationData::from_passphrase_with_new_salt(
            &export_config.key,
            &export_config.key_derivation_method,
        );

        let key = Self::_derive_key(&key_data).await?;

        let res = self
            .wallet_service
            .export_wallet(wallet_handle, &export_config, 0, (&key_data, &key))
            .await;

        debug!("export < {:?}", res);
        res
    }

    /// Creates a new secure wallet and fills it with the content of an export
    /// file. A failed import leaves no wallet behind.
    ///
    /// #Errors
    /// Common*
    /// Wallet*
    pub async fn import(
        &self,
        config: Config,
        credentials: Credentials,
        import_config: ImportConfig,
    ) -> IndyResult<()> {
        debug!(
            "import > config: {:?} credentials: {:?} import_config: {:?}",
            &config,
            secret!(&credentials),
            secret!(&import_config)
        );

        check_validatable(&config, "wallet config")?;

        let (wallet_handle, key_data, import_key_data) = self
            .wallet_service
            .import_wallet_prepare(&config, &credentials, &import_config)
            .await?;

        let keys = async {
            let import_key = Self::_derive_key(&import_key_data).await?;
            let key = Self::_derive_key(&key_data).await?;
            IndyResult::Ok((import_key, key))
        }
        .await;

        let (import_key, key) = match keys {
            Ok(keys) => keys,
            Err(err) => {
                self.wallet_service.cancel_import(wallet_handle)?;
                return Err(err);
            }
        };

        let res = self
            .wallet_service
            .import_wallet_continue(wallet_handle, &config, &credentials, (import_key, key))
            .await;

        debug!("import < {:?}", res);
        res
    }

    /// Generates a base58 wallet key usable with the RAW key derivation
    /// method. A seed makes the result deterministic.
    pub fn generate_wallet_key(&self, config: Option<KeyConfig>) -> IndyResult<String> {
        debug!("generate_wallet_key > config: {:?}", secret!(&config));

        let seed = config.as_ref().and_then(|config| config.seed.as_deref());

        let key = match self.crypto_service.convert_seed(seed)? {
            Some(seed) => {
                randombytes::randombytes_deterministic(chacha20poly1305_ietf::KEYBYTES, &seed.0)
            }
            None => randombytes::randombytes(chacha20poly1305_ietf::KEYBYTES),
        };

        let res = key.to_base58();

        debug!("generate_wallet_key < res: {:?}", secret!(&res));
        Ok(res)
    }

    async fn _derive_key(key_data: &KeyDerivationData) -> IndyResult<MasterKey> {
        let key_data = key_data.clone();

        tokio::task::spawn_blocking(move || key_data.calc_master_key())
            .await
            .to_indy(IndyErrorKind::InvalidState, "Key derivation task failed")?
    }
}

#[cfg(test)]
mod tests {
    use indy_api_types::domain::wallet::KeyDerivationMethod;

    use super::*;

    const RAW_KEY: &str = "6nxtSiXFvBd593Y2DCed2dYvRY1PGK9WMtxCBjLzKgbw";

    fn controller() -> (WalletController, Arc<WalletService>) {
        let wallet_service = Arc::new(WalletService::new());
        let controller =
            WalletController::new(wallet_service.clone(), Arc::new(CryptoService::new()));
        (controller, wallet_service)
    }

    fn config(dir: &tempfile::TempDir, id: &str) -> Config {
        Config {
            id: id.to_string(),
            storage_type: None,
            storage_config: Some(json!({ "path": dir.path() })),
            cache: None,
        }
    }

    fn raw_credentials(key: &str) -> Credentials {
        Credentials {
            key: key.to_string(),
            rekey: None,
            storage_credentials: None,
            key_derivation_method: KeyDerivationMethod::RAW,
            rekey_derivation_method: KeyDerivationMethod::RAW,
        }
    }

    #[tokio::test]
    async fn failed_open_releases_pending_storage() {
        let dir = tempfile::tempdir().unwrap();
        let (controller, wallet_service) = controller();
        let config = config(&dir, "failed_open");

        controller
            .create(config.clone(), raw_credentials(RAW_KEY))
            .await
            .unwrap();

        let mut credentials = raw_credentials(RAW_KEY);
        credentials.rekey = Some("0OIl-not-base58".to_string());

        let err = controller.open(config.clone(), credentials).await.unwrap_err();
        assert_eq!(err.kind(), IndyErrorKind::InvalidStructure);
        assert_eq!(wallet_service.get_pending_for_open_count().unwrap(), 0);

        let handle = controller
            .open(config.clone(), raw_credentials(RAW_KEY))
            .await
            .unwrap();
        controller.close(handle).await.unwrap();
        controller
            .delete(config, raw_credentials(RAW_KEY))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn failed_import_releases_pending_file() {
        let dir = tempfile::tempdir().unwrap();
        let (controller, wallet_service) = controller();
        let source = config(&dir, "import_source");

        controller
            .create(source.clone(), raw_credentials(RAW_KEY))
            .await
            .unwrap();

        let handle = controller
            .open(source.clone(), raw_credentials(RAW_KEY))
            .await
            .unwrap();

        let path = dir.path().join("export").to_string_lossy().into_owned();

        controller
            .export(
                handle,
                ExportConfig {
                    path: path.clone(),
                    key: RAW_KEY.to_string(),
                    key_derivation_method: KeyDerivationMethod::RAW,
                },
            )
            .await
            .unwrap();
        controller.close(handle).await.unwrap();

        let err = controller
            .import(
                config(&dir, "import_target"),
                raw_credentials("0OIl-not-base58"),
                ImportConfig {
                    path,
                    key: RAW_KEY.to_string(),
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), IndyErrorKind::InvalidStructure);
        assert_eq!(wallet_service.get_pending_for_import_count().unwrap(), 0);
    }
}
