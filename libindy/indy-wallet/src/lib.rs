use std::{
    collections::{HashMap, HashSet},
    fmt,
    fs::File,
    io::BufReader,
    sync::{Arc, Mutex},
};

use futures::lock::Mutex as AsyncMutex;
use indy_api_types::{
    domain::wallet::{CacheConfig, Config, Credentials, ExportConfig, ImportConfig, Tags},
    errors::prelude::*,
    SearchHandle, WalletHandle,
};
use indy_utils::{
    crypto::chacha20poly1305_ietf::{self, Key as MasterKey},
    secret,
    wql::Query,
};
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};
use serde_json::Value as SValue;

pub use crate::encryption::KeyDerivationData;
use crate::{
    cache::wallet_cache::WalletCache,
    export_import::{create_export_file, export_continue, finish_import, preparse_file_to_import},
    iterator::WalletIterator,
    storage::{default::SQLiteStorageType, WalletStorage, WalletStorageType},
    wallet::{Keys, Wallet},
};

mod cache;
mod encryption;
mod export_import;
mod iterator;
pub mod language;
mod query_encryption;
mod storage;
mod wallet;

type PendingOpen = (String, Box<dyn WalletStorage>, Metadata, Option<KeyDerivationData>);
type PendingImport = (
    BufReader<File>,
    chacha20poly1305_ietf::Nonce,
    usize,
    Vec<u8>,
    KeyDerivationData,
);

/// Registry of open wallets.
///
/// Key derivation is split out of every operation that needs a master key:
/// `*_prepare` returns the `KeyDerivationData`, the caller computes the key
/// off the async executor and hands it to `*_continue`.
pub struct WalletService {
    storage_types: Mutex<HashMap<String, Arc<dyn WalletStorageType>>>,
    wallets: Mutex<HashMap<WalletHandle, Arc<Wallet>>>,
    wallet_ids: Mutex<HashSet<String>>,
    pending_for_open: Mutex<HashMap<WalletHandle, PendingOpen>>,
    pending_for_import: Mutex<HashMap<WalletHandle, PendingImport>>,
    searches: Mutex<HashMap<SearchHandle, OpenSearch>>,
}

impl Default for WalletService {
    fn default() -> Self {
        Self::new()
    }
}

impl WalletService {
    pub const PREFIX: &'static str = "Indy";

    pub fn new() -> WalletService {
        let storage_types = {
            let default: Arc<dyn WalletStorageType> = Arc::new(SQLiteStorageType::new());
            Mutex::new(HashMap::from([("default".to_string(), default)]))
        };

        WalletService {
            storage_types,
            wallets: Mutex::new(HashMap::new()),
            wallet_ids: Mutex::new(HashSet::new()),
            pending_for_open: Mutex::new(HashMap::new()),
            pending_for_import: Mutex::new(HashMap::new()),
            searches: Mutex::new(HashMap::new()),
        }
    }

    pub async fn create_wallet(
        &self,
        config: &Config,
        credentials: &Credentials,
        key: (&KeyDerivationData, &MasterKey),
    ) -> IndyResult<()> {
        self._create_wallet(config, credentials, key).await?;
        Ok(())
    }

    async fn _create_wallet(
        &self,
        config: &Config,
        credentials: &Credentials,
        (key_data, master_key): (&KeyDerivationData, &MasterKey),
    ) -> IndyResult<Keys> {
        trace!(
            "create_wallet >>> config: {:?}, credentials: {:?}",
            config,
            secret!(credentials)
        );

        let keys = Keys::new();
        let metadata = self._prepare_metadata(master_key, key_data, &keys)?;

        let (storage_type, storage_config, storage_credentials) =
            self._get_config_and_cred_for_storage(config, credentials)?;

        storage_type
            .create_storage(
                &config.id,
                storage_config.as_deref(),
                storage_credentials.as_deref(),
                &metadata,
            )
            .await?;

        info!("Wallet {} created", config.id);
        Ok(keys)
    }

    pub async fn delete_wallet_prepare(
        &self,
        config: &Config,
        credentials: &Credentials,
    ) -> IndyResult<(Metadata, KeyDerivationData)> {
        trace!(
            "delete_wallet_prepare >>> config: {:?}, credentials: {:?}",
            config,
            secret!(credentials)
        );

        if self
            .wallet_ids
            .lock()?
            .contains(&WalletService::_get_wallet_id(config))
        {
            return Err(err_msg(
                IndyErrorKind::InvalidState,
                format!(
                    "Wallet has to be closed before deleting: {:?}",
                    WalletService::_get_wallet_id(config)
                ),
            ));
        }

        // check credentials and close connection before deleting wallet
        let (storage, metadata, key_derivation_data) = self
            ._open_storage_and_fetch_metadata(config, credentials)
            .await?;

        storage.close().await?;

        Ok((metadata, key_derivation_data))
    }

    pub async fn delete_wallet_continue(
        &self,
        config: &Config,
        credentials: &Credentials,
        metadata: &Metadata,
        master_key: &MasterKey,
    ) -> IndyResult<()> {
        trace!(
            "delete_wallet_continue >>> config: {:?}, credentials: {:?}",
            config,
            secret!(credentials)
        );

        self._restore_keys(metadata, master_key)?;

        let (storage_type, storage_config, storage_credentials) =
            self._get_config_and_cred_for_storage(config, credentials)?;

        storage_type
            .delete_storage(
                &config.id,
                storage_config.as_deref(),
                storage_credentials.as_deref(),
            )
            .await?;

        info!("Wallet {} deleted", config.id);
        trace!("delete_wallet_continue <<<");
        Ok(())
    }

    pub async fn open_wallet_prepare(
        &self,
        config: &Config,
        credentials: &Credentials,
    ) -> IndyResult<(WalletHandle, KeyDerivationData, Option<KeyDerivationData>)> {
        trace!(
            "open_wallet_prepare >>> config: {:?}, credentials: {:?}",
            config,
            secret!(&credentials)
        );

        self._is_id_from_config_not_used(config)?;

        let (storage, metadata, key_derivation_data) = self
            ._open_storage_and_fetch_metadata(config, credentials)
            .await?;

        let wallet_handle = indy_utils::next_wallet_handle();

        let rekey_data: Option<KeyDerivationData> = credentials.rekey.as_ref().map(|rekey| {
            KeyDerivationData::from_passphrase_with_new_salt(
                rekey,
                &credentials.rekey_derivation_method,
            )
        });

        self.pending_for_open.lock()?.insert(
            wallet_handle,
            (
                WalletService::_get_wallet_id(config),
                storage,
                metadata,
                rekey_data.clone(),
            ),
        );

        Ok((wallet_handle, key_derivation_data, rekey_data))
    }

    pub async fn open_wallet_continue(
        &self,
        wallet_handle: WalletHandle,
        master_key: (&MasterKey, Option<&MasterKey>),
        cache_config: Option<CacheConfig>,
    ) -> IndyResult<WalletHandle> {
        let (id, storage, metadata, rekey_data) = self
            .pending_for_open
            .lock()?
            .remove(&wallet_handle)
            .ok_or_else(|| err_msg(IndyErrorKind::InvalidState, "Open data not found"))?;

        let (master_key, rekey) = master_key;

        let keys = match self._restore_keys(&metadata, master_key) {
            Ok(keys) => keys,
            Err(err) => {
                storage.close().await?;
                return Err(err);
            }
        };

        if let (Some(rekey), Some(rekey_data)) = (rekey, rekey_data) {
            let metadata = self._prepare_metadata(rekey, &rekey_data, &keys)?;
            storage.set_storage_metadata(&metadata).await?;
            debug!("Master key of wallet {} rotated", id);
        }

        // the id may have been taken while the key was derived
        {
            let mut wallet_ids = self.wallet_ids.lock()?;
            if !wallet_ids.insert(id.clone()) {
                drop(wallet_ids);
                storage.close().await?;
                return Err(err_msg(
                    IndyErrorKind::WalletAlreadyOpened,
                    format!("Wallet {id} already opened"),
                ));
            }
        }

        let wallet = Wallet::new(
            id.clone(),
            storage,
            Arc::new(keys),
            WalletCache::new(cache_config),
        );

        self.wallets.lock()?.insert(wallet_handle, Arc::new(wallet));

        info!("Wallet {} opened with handle {:?}", id, wallet_handle);
        trace!("open_wallet_continue <<< res: {:?}", wallet_handle);

        Ok(wallet_handle)
    }

    /// Drops a prepared open that will not be continued and closes its storage.
    pub async fn cancel_open(&self, wallet_handle: WalletHandle) -> IndyResult<()> {
        let pending = self.pending_for_open.lock()?.remove(&wallet_handle);

        if let Some((id, storage, _, _)) = pending {
            storage.close().await?;
            debug!("Open of wallet {} cancelled", id);
        }

        Ok(())
    }

    async fn _open_storage_and_fetch_metadata(
        &self,
        config: &Config,
        credentials: &Credentials,
    ) -> IndyResult<(Box<dyn WalletStorage>, Metadata, KeyDerivationData)> {
        let storage = self._open_storage(config, credentials).await?;

        let metadata: Metadata = {
            let metadata = storage.get_storage_metadata().await?;

            serde_json::from_slice(&metadata)
                .to_indy(IndyErrorKind::InvalidState, "Cannot deserialize metadata")?
        };

        let key_derivation_data = KeyDerivationData::from_passphrase_and_metadata(
            &credentials.key,
            &metadata,
            &credentials.key_derivation_method,
        )?;

        Ok((storage, metadata, key_derivation_data))
    }

    pub async fn close_wallet(&self, handle: WalletHandle) -> IndyResult<()> {
        trace!("close_wallet >>> handle: {:?}", handle);

        let wallet = self.wallets.lock()?.remove(&handle);

        let wallet = if let Some(wallet) = wallet {
            wallet
        } else {
            return Err(err_msg(
                IndyErrorKind::InvalidWalletHandle,
                "Unknown wallet handle",
            ));
        };

        self.wallet_ids.lock()?.remove(wallet.get_id());
        self.searches
            .lock()?
            .retain(|_, search| search.wallet_handle != handle);
        wallet.close().await?;

        info!("Wallet {:?} closed", handle);
        trace!("close_wallet <<<");

        Ok(())
    }

    fn _map_wallet_storage_error(err: IndyError, type_: &str, name: &str) -> IndyError {
        match err.kind() {
            IndyErrorKind::WalletItemAlreadyExists => err_msg(
                IndyErrorKind::WalletItemAlreadyExists,
                format!("Wallet item already exists with type: {type_}, id: {name}"),
            ),
            IndyErrorKind::WalletItemNotFound => err_msg(
                IndyErrorKind::WalletItemNotFound,
                format!("Wallet item not found with type: {type_}, id: {name}"),
            ),
            _ => err,
        }
    }

    pub async fn add_record(
        &self,
        wallet_handle: WalletHandle,
        type_: &str,
        name: &str,
        value: &str,
        tags: &Tags,
    ) -> IndyResult<()> {
        let wallet = self.get_wallet(wallet_handle)?;
        wallet
            .add(type_, name, value, tags, true)
            .await
            .map_err(|err| WalletService::_map_wallet_storage_error(err, type_, name))
    }

    pub async fn add_indy_record<T>(
        &self,
        wallet_handle: WalletHandle,
        name: &str,
        value: &str,
        tags: &Tags,
    ) -> IndyResult<()>
    where
        T: Sized,
    {
        self.add_record(
            wallet_handle,
            &self.add_prefix(short_type_name::<T>()),
            name,
            value,
            tags,
        )
        .await?;

        Ok(())
    }

    pub async fn add_indy_object<T>(
        &self,
        wallet_handle: WalletHandle,
        name: &str,
        object: &T,
        tags: &Tags,
    ) -> IndyResult<String>
    where
        T: ::serde::Serialize + Sized,
    {
        let object_json = serde_json::to_string(object).to_indy(
            IndyErrorKind::InvalidState,
            format!("Cannot serialize {:?}", short_type_name::<T>()),
        )?;

        self.add_indy_record::<T>(wallet_handle, name, &object_json, tags)
            .await?;

        Ok(object_json)
    }

    pub async fn update_record_value(
        &self,
        wallet_handle: WalletHandle,
        type_: &str,
        name: &str,
        value: &str,
    ) -> IndyResult<()> {
        let wallet = self.get_wallet(wallet_handle)?;
        wallet
            .update(type_, name, value)
            .await
            .map_err(|err| WalletService::_map_wallet_storage_error(err, type_, name))
    }

    pub async fn update_indy_object<T>(
        &self,
        wallet_handle: WalletHandle,
        name: &str,
        object: &T,
    ) -> IndyResult<String>
    where
        T: ::serde::Serialize + Sized,
    {
        let type_ = short_type_name::<T>();

        let object_json = serde_json::to_string(object).to_indy(
            IndyErrorKind::InvalidState,
            format!("Cannot serialize {type_:?}"),
        )?;

        self.update_record_value(wallet_handle, &self.add_prefix(type_), name, &object_json)
            .await?;

        Ok(object_json)
    }

    pub async fn add_record_tags(
        &self,
        wallet_handle: WalletHandle,
        type_: &str,
        name: &str,
        tags: &Tags,
    ) -> IndyResult<()> {
        let wallet = self.get_wallet(wallet_handle)?;
        wallet
            .add_tags(type_, name, tags)
            .await
            .map_err(|err| WalletService::_map_wallet_storage_error(err, type_, name))
    }

    pub async fn update_record_tags(
        &self,
        wallet_handle: WalletHandle,
        type_: &str,
        name: &str,
        tags: &Tags,
    ) -> IndyResult<()> {
        let wallet = self.get_wallet(wallet_handle)?;
        wallet
            .update_tags(type_, name, tags)
            .await
            .map_err(|err| WalletService::_map_wallet_storage_error(err, type_, name))
    }

    pub async fn delete_record_tags(
        &self,
        wallet_handle: WalletHandle,
        type_: &str,
        name: &str,
        tag_names: &[&str],
    ) -> IndyResult<()> {
        let wallet = self.get_wallet(wallet_handle)?;
        wallet
            .delete_tags(type_, name, tag_names)
            .await
            .map_err(|err| WalletService::_map_wallet_storage_error(err, type_, name))
    }

    pub async fn delete_record(
        &self,
        wallet_handle: WalletHandle,
        type_: &str,
        name: &str,
    ) -> IndyResult<()> {
        let wallet = self.get_wallet(wallet_handle)?;
        wallet
            .delete(type_, name)
            .await
            .map_err(|err| WalletService::_map_wallet_storage_error(err, type_, name))
    }

    pub async fn delete_indy_record<T>(
        &self,
        wallet_handle: WalletHandle,
        name: &str,
    ) -> IndyResult<()>
    where
        T: Sized,
    {
        self.delete_record(
            wallet_handle,
            &self.add_prefix(short_type_name::<T>()),
            name,
        )
        .await
    }

    pub async fn get_record(
        &self,
        wallet_handle: WalletHandle,
        type_: &str,
        name: &str,
        options: &RecordOptions,
    ) -> IndyResult<WalletRecord> {
        let wallet = self.get_wallet(wallet_handle)?;
        wallet
            .get(type_, name, options)
            .await
            .map_err(|err| WalletService::_map_wallet_storage_error(err, type_, name))
    }

    pub async fn get_indy_record<T>(
        &self,
        wallet_handle: WalletHandle,
        name: &str,
        options: &RecordOptions,
    ) -> IndyResult<WalletRecord>
    where
        T: Sized,
    {
        self.get_record(
            wallet_handle,
            &self.add_prefix(short_type_name::<T>()),
            name,
            options,
        )
        .await
    }

    pub async fn get_indy_record_value<T>(
        &self,
        wallet_handle: WalletHandle,
        name: &str,
        options: &RecordOptions,
    ) -> IndyResult<String>
    where
        T: Sized,
    {
        let type_ = short_type_name::<T>();

        let record = self
            .get_record(wallet_handle, &self.add_prefix(type_), name, options)
            .await?;

        let record_value = record
            .get_value()
            .ok_or_else(|| {
                err_msg(
                    IndyErrorKind::InvalidState,
                    format!("{type_} not found for id: {name:?}"),
                )
            })?
            .to_string();

        Ok(record_value)
    }

    pub async fn get_indy_object<T>(
        &self,
        wallet_handle: WalletHandle,
        name: &str,
        options: &RecordOptions,
    ) -> IndyResult<T>
    where
        T: ::serde::de::DeserializeOwned + Sized,
    {
        let record_value = self
            .get_indy_record_value::<T>(wallet_handle, name, options)
            .await?;

        serde_json::from_str(&record_value).to_indy(
            IndyErrorKind::InvalidState,
            format!("Cannot deserialize {:?}", short_type_name::<T>()),
        )
    }

    pub async fn get_indy_opt_object<T>(
        &self,
        wallet_handle: WalletHandle,
        name: &str,
        options: &RecordOptions,
    ) -> IndyResult<Option<T>>
    where
        T: ::serde::de::DeserializeOwned + Sized,
    {
        match self
            .get_indy_object::<T>(wallet_handle, name, options)
            .await
        {
            Ok(res) => Ok(Some(res)),
            Err(ref err) if err.kind() == IndyErrorKind::WalletItemNotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub async fn search_records(
        &self,
        wallet_handle: WalletHandle,
        type_: &str,
        query: Query,
        options: &SearchOptions,
    ) -> IndyResult<WalletSearch> {
        let wallet = self.get_wallet(wallet_handle)?;

        Ok(WalletSearch {
            iter: wallet.search(type_, query, options).await?,
        })
    }

    pub async fn search_indy_records<T>(
        &self,
        wallet_handle: WalletHandle,
        query: Query,
        options: &SearchOptions,
    ) -> IndyResult<WalletSearch>
    where
        T: Sized,
    {
        self.search_records(
            wallet_handle,
            &self.add_prefix(short_type_name::<T>()),
            query,
            options,
        )
        .await
    }

    pub async fn upsert_indy_object<T>(
        &self,
        wallet_handle: WalletHandle,
        name: &str,
        object: &T,
    ) -> IndyResult<String>
    where
        T: ::serde::Serialize + Sized,
    {
        if self.record_exists::<T>(wallet_handle, name).await? {
            self.update_indy_object::<T>(wallet_handle, name, object)
                .await
        } else {
            self.add_indy_object::<T>(wallet_handle, name, object, &HashMap::new())
                .await
        }
    }

    pub async fn record_exists<T>(
        &self,
        wallet_handle: WalletHandle,
        name: &str,
    ) -> IndyResult<bool>
    where
        T: Sized,
    {
        match self
            .get_record(
                wallet_handle,
                &self.add_prefix(short_type_name::<T>()),
                name,
                &RecordOptions::id(),
            )
            .await
        {
            Ok(_) => Ok(true),
            Err(ref err) if err.kind() == IndyErrorKind::WalletItemNotFound => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Keeps `search` open under a new handle until it is closed or its
    /// wallet is.
    pub fn register_search(
        &self,
        wallet_handle: WalletHandle,
        scope: SearchScope,
        search: WalletSearch,
    ) -> IndyResult<SearchHandle> {
        self.check(wallet_handle)?;

        let search_handle = indy_utils::next_search_handle();

        self.searches.lock()?.insert(
            search_handle,
            OpenSearch {
                wallet_handle,
                scope,
                search: Arc::new(AsyncMutex::new(search)),
            },
        );

        Ok(search_handle)
    }

    pub fn get_search(
        &self,
        search_handle: SearchHandle,
        scope: SearchScope,
    ) -> IndyResult<Arc<AsyncMutex<WalletSearch>>> {
        self.searches
            .lock()?
            .get(&search_handle)
            .filter(|search| search.scope == scope)
            .map(|search| search.search.clone())
            .ok_or_else(|| _unknown_search(search_handle))
    }

    pub fn close_search(&self, search_handle: SearchHandle, scope: SearchScope) -> IndyResult<()> {
        let mut searches = self.searches.lock()?;

        match searches.get(&search_handle) {
            Some(search) if search.scope == scope => {
                searches.remove(&search_handle);
                Ok(())
            }
            _ => Err(_unknown_search(search_handle)),
        }
    }

    pub fn get_searches_count(&self) -> IndyResult<usize> {
        Ok(self.searches.lock()?.len())
    }

    pub fn check(&self, handle: WalletHandle) -> IndyResult<()> {
        self.get_wallet(handle)?;
        Ok(())
    }

    pub async fn export_wallet(
        &self,
        wallet_handle: WalletHandle,
        export_config: &ExportConfig,
        version: u32,
        key: (&KeyDerivationData, &MasterKey),
    ) -> IndyResult<()> {
        trace!(
            "export_wallet >>> wallet_handle: {:?}, export_config: {:?}, version: {:?}",
            wallet_handle,
            secret!(export_config),
            version
        );

        if version != 0 {
            return Err(err_msg(IndyErrorKind::InvalidState, "Unsupported version"));
        }

        let (key_data, key) = key;

        let wallet = self.get_wallet(wallet_handle)?;
        let export_file = create_export_file(&export_config.path)?;

        let res = export_continue(wallet, export_file, version, key.clone(), key_data).await;

        trace!("export_wallet <<<");
        res
    }

    pub async fn import_wallet_prepare(
        &self,
        config: &Config,
        credentials: &Credentials,
        import_config: &ImportConfig,
    ) -> IndyResult<(WalletHandle, KeyDerivationData, KeyDerivationData)> {
        trace!(
            "import_wallet_prepare >>> config: {:?}, credentials: {:?}, import_config: {:?}",
            config,
            secret!(credentials),
            secret!(import_config)
        );

        let exported_file_to_import = std::fs::OpenOptions::new()
            .read(true)
            .open(&import_config.path)?;

        let (reader, import_key_derivation_data, nonce, chunk_size, header_bytes) =
            preparse_file_to_import(exported_file_to_import, &import_config.key)?;

        let key_data = KeyDerivationData::from_passphrase_with_new_salt(
            &credentials.key,
            &credentials.key_derivation_method,
        );

        let wallet_handle = indy_utils::next_wallet_handle();

        self.pending_for_import.lock()?.insert(
            wallet_handle,
            (reader, nonce, chunk_size, header_bytes, key_data.clone()),
        );

        Ok((wallet_handle, key_data, import_key_derivation_data))
    }

    pub async fn import_wallet_continue(
        &self,
        wallet_handle: WalletHandle,
        config: &Config,
        credentials: &Credentials,
        key: (MasterKey, MasterKey),
    ) -> IndyResult<()> {
        let (reader, nonce, chunk_size, header_bytes, key_data) = self
            .pending_for_import
            .lock()?
            .remove(&wallet_handle)
            .ok_or_else(|| err_msg(IndyErrorKind::InvalidState, "Import data not found"))?;

        let (import_key, master_key) = key;

        self._is_id_from_config_not_used(config)?;

        let keys = self
            ._create_wallet(config, credentials, (&key_data, &master_key))
            .await?;

        let storage = self._open_storage(config, credentials).await?;
        let metadata = storage.get_storage_metadata().await?;

        let wallet = Wallet::new(
            WalletService::_get_wallet_id(config),
            storage,
            Arc::new(keys),
            WalletCache::new(None),
        );

        let res =
            finish_import(&wallet, reader, import_key, nonce, chunk_size, header_bytes).await;
        wallet.close().await?;

        if res.is_err() {
            let metadata: Metadata = serde_json::from_slice(&metadata)
                .to_indy(IndyErrorKind::InvalidState, "Cannot deserialize metadata")?;

            self.delete_wallet_continue(config, credentials, &metadata, &master_key)
                .await?;
        }

        trace!("import_wallet_continue <<<");
        res
    }

    /// Drops a prepared import that will not be continued.
    pub fn cancel_import(&self, wallet_handle: WalletHandle) -> IndyResult<()> {
        self.pending_for_import.lock()?.remove(&wallet_handle);
        Ok(())
    }

    pub fn get_wallets_count(&self) -> IndyResult<usize> {
        Ok(self.wallets.lock()?.len())
    }

    pub fn get_wallet_ids_count(&self) -> IndyResult<usize> {
        Ok(self.wallet_ids.lock()?.len())
    }

    pub fn get_pending_for_import_count(&self) -> IndyResult<usize> {
        Ok(self.pending_for_import.lock()?.len())
    }

    pub fn get_pending_for_open_count(&self) -> IndyResult<usize> {
        Ok(self.pending_for_open.lock()?.len())
    }

    /// `(size, capacity)` of the record cache of an open wallet.
    pub fn get_cache_stats(&self, wallet_handle: WalletHandle) -> IndyResult<(usize, usize)> {
        let wallet = self.get_wallet(wallet_handle)?;
        Ok((wallet.cache().get_size(), wallet.cache().get_capacity()))
    }

    fn _get_config_and_cred_for_storage(
        &self,
        config: &Config,
        credentials: &Credentials,
    ) -> IndyResult<(Arc<dyn WalletStorageType>, Option<String>, Option<String>)> {
        let storage_type = {
            let storage_type = config.storage_type.as_deref().unwrap_or("default");

            self.storage_types
                .lock()?
                .get(storage_type)
                .ok_or_else(|| {
                    err_msg(
                        IndyErrorKind::UnknownWalletStorageType,
                        format!("Unknown wallet storage type: {storage_type}"),
                    )
                })?
                .clone()
        };

        let storage_config = config.storage_config.as_ref().map(SValue::to_string);

        let storage_credentials = credentials
            .storage_credentials
            .as_ref()
            .map(SValue::to_string);

        Ok((storage_type, storage_config, storage_credentials))
    }

    fn _is_id_from_config_not_used(&self, config: &Config) -> IndyResult<()> {
        let id = WalletService::_get_wallet_id(config);
        if self.wallet_ids.lock()?.contains(&id) {
            return Err(err_msg(
                IndyErrorKind::WalletAlreadyOpened,
                format!("Wallet {id} already opened"),
            ));
        }

        Ok(())
    }

    fn _get_wallet_id(config: &Config) -> String {
        let wallet_path = config
            .storage_config
            .as_ref()
            .and_then(|storage_config| storage_config["path"].as_str())
            .unwrap_or("");

        format!("{}{}", config.id, wallet_path)
    }

    async fn _open_storage(
        &self,
        config: &Config,
        credentials: &Credentials,
    ) -> IndyResult<Box<dyn WalletStorage>> {
        let (storage_type, storage_config, storage_credentials) =
            self._get_config_and_cred_for_storage(config, credentials)?;

        let storage = storage_type
            .open_storage(
                &config.id,
                storage_config.as_deref(),
                storage_credentials.as_deref(),
            )
            .await?;

        Ok(storage)
    }

    fn _prepare_metadata(
        &self,
        master_key: &chacha20poly1305_ietf::Key,
        key_data: &KeyDerivationData,
        keys: &Keys,
    ) -> IndyResult<Vec<u8>> {
        let encrypted_keys = keys.serialize_encrypted(master_key)?;

        let metadata = match key_data {
            KeyDerivationData::Raw(_) => Metadata::MetadataRaw(MetadataRaw {
                keys: encrypted_keys,
            }),
            KeyDerivationData::Argon2iInt(_, salt) | KeyDerivationData::Argon2iMod(_, salt) => {
                Metadata::MetadataArgon(MetadataArgon {
                    keys: encrypted_keys,
                    master_key_salt: salt.as_bytes().to_vec(),
                })
            }
        };

        let res = serde_json::to_vec(&metadata).to_indy(
            IndyErrorKind::InvalidState,
            "Cannot serialize wallet metadata",
        )?;

        Ok(res)
    }

    fn _restore_keys(&self, metadata: &Metadata, master_key: &MasterKey) -> IndyResult<Keys> {
        Keys::deserialize_encrypted(metadata.get_keys(), master_key)
    }

    pub fn add_prefix(&self, type_: &str) -> String {
        format!("{}::{}", WalletService::PREFIX, type_)
    }

    fn get_wallet(&self, wallet_handle: WalletHandle) -> IndyResult<Arc<Wallet>> {
        let wallets = self.wallets.lock()?;
        match wallets.get(&wallet_handle) {
            Some(wallet) => Ok(wallet.clone()),
            None => Err(err_msg(
                IndyErrorKind::InvalidWalletHandle,
                "Unknown wallet handle",
            )),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(untagged)]
pub enum Metadata {
    MetadataArgon(MetadataArgon),
    MetadataRaw(MetadataRaw),
}

impl Metadata {
    pub fn get_keys(&self) -> &Vec<u8> {
        match *self {
            Metadata::MetadataArgon(ref metadata) => &metadata.keys,
            Metadata::MetadataRaw(ref metadata) => &metadata.keys,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MetadataArgon {
    pub keys: Vec<u8>,
    pub master_key_salt: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MetadataRaw {
    pub keys: Vec<u8>,
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WalletRecord {
    #[serde(rename = "type")]
    type_: Option<String>,
    id: String,
    value: Option<String>,
    tags: Option<Tags>,
}

impl fmt::Debug for WalletRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletRecord")
            .field("type_", &self.type_)
            .field("id", &self.id)
            .field("value", &self.value.as_ref().map(|_| "******"))
            .field("tags", &self.tags)
            .finish()
    }
}

impl Ord for WalletRecord {
    fn cmp(&self, other: &Self) -> ::std::cmp::Ordering {
        (&self.type_, &self.id).cmp(&(&other.type_, &other.id))
    }
}

impl PartialOrd for WalletRecord {
    fn partial_cmp(&self, other: &Self) -> Option<::std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl WalletRecord {
    pub fn new(
        name: String,
        type_: Option<String>,
        value: Option<String>,
        tags: Option<Tags>,
    ) -> WalletRecord {
        WalletRecord {
            id: name,
            type_,
            value,
            tags,
        }
    }

    pub fn get_id(&self) -> &str {
        self.id.as_str()
    }

    pub fn get_type(&self) -> Option<&str> {
        self.type_.as_deref()
    }

    pub fn get_value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn get_tags(&self) -> Option<&Tags> {
        self.tags.as_ref()
    }
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecordOptions {
    #[serde(default = "default_false")]
    pub retrieve_type: bool,
    #[serde(default = "default_true")]
    pub retrieve_value: bool,
    #[serde(default = "default_false")]
    pub retrieve_tags: bool,
}

impl RecordOptions {
    pub fn id() -> RecordOptions {
        RecordOptions {
            retrieve_type: false,
            retrieve_value: false,
            retrieve_tags: false,
        }
    }

    pub fn id_value() -> RecordOptions {
        RecordOptions {
            retrieve_type: false,
            retrieve_value: true,
            retrieve_tags: false,
        }
    }

    pub fn id_value_tags() -> RecordOptions {
        RecordOptions {
            retrieve_type: false,
            retrieve_value: true,
            retrieve_tags: true,
        }
    }

    pub fn full() -> RecordOptions {
        RecordOptions {
            retrieve_type: true,
            retrieve_value: true,
            retrieve_tags: true,
        }
    }
}

impl Default for RecordOptions {
    fn default() -> RecordOptions {
        RecordOptions {
            retrieve_type: false,
            retrieve_value: true,
            retrieve_tags: false,
        }
    }
}

pub struct WalletSearch {
    iter: WalletIterator,
}

/// API a search was opened through. Record and credential searches share
/// the handle sequence but each is only reachable through its own calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    Records,
    Credentials,
}

struct OpenSearch {
    wallet_handle: WalletHandle,
    scope: SearchScope,
    search: Arc<AsyncMutex<WalletSearch>>,
}

fn _unknown_search(search_handle: SearchHandle) -> IndyError {
    err_msg(
        IndyErrorKind::InvalidSearchHandle,
        format!("Unknown search handle {:?}", search_handle),
    )
}

impl WalletSearch {
    pub fn get_total_count(&self) -> IndyResult<Option<usize>> {
        self.iter.get_total_count()
    }

    pub async fn fetch_next_record(&mut self) -> IndyResult<Option<WalletRecord>> {
        self.iter.next().await
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    #[serde(default = "default_true")]
    pub retrieve_records: bool,
    #[serde(default = "default_false")]
    pub retrieve_total_count: bool,
    #[serde(default = "default_false")]
    pub retrieve_type: bool,
    #[serde(default = "default_true")]
    pub retrieve_value: bool,
    #[serde(default = "default_false")]
    pub retrieve_tags: bool,
}

impl SearchOptions {
    pub fn id_value() -> SearchOptions {
        SearchOptions {
            retrieve_records: true,
            retrieve_total_count: true,
            retrieve_type: true,
            retrieve_value: true,
            retrieve_tags: false,
        }
    }

    pub fn full() -> SearchOptions {
        SearchOptions {
            retrieve_records: true,
            retrieve_total_count: true,
            retrieve_type: true,
            retrieve_value: true,
            retrieve_tags: true,
        }
    }
}

impl Default for SearchOptions {
    fn default() -> SearchOptions {
        SearchOptions {
            retrieve_records: true,
            retrieve_total_count: false,
            retrieve_type: false,
            retrieve_value: true,
            retrieve_tags: false,
        }
    }
}

fn short_type_name<T>() -> &'static str {
    let type_name = std::any::type_name::<T>();
    type_name.rsplit("::").next().unwrap_or(type_name)
}

#[cfg(test)]
mod tests {
    use indy_api_types::domain::wallet::KeyDerivationMethod;
    use indy_utils::wql;
    use serde_json::json;

    use super::*;

    const RAW_KEY: &str = "6nxtSiXFvBd593Y2DCed2dYvRY1PGK9WMtxCBjLzKgbw";
    const OTHER_RAW_KEY: &str = "CwMHrEQJnwvuE8q9zbR49jyYtVxVBHNTjCPEPk1aV3cP";

    fn _config(dir: &tempfile::TempDir, id: &str) -> Config {
        Config {
            id: id.to_string(),
            storage_type: None,
            storage_config: Some(json!({ "path": dir.path() })),
            cache: None,
        }
    }

    fn _credentials(key: &str, method: KeyDerivationMethod) -> Credentials {
        Credentials {
            key: key.to_string(),
            rekey: None,
            storage_credentials: None,
            key_derivation_method: method,
            rekey_derivation_method: method,
        }
    }

    fn _raw_credentials() -> Credentials {
        _credentials(RAW_KEY, KeyDerivationMethod::RAW)
    }

    async fn _create(service: &WalletService, config: &Config, credentials: &Credentials) {
        let key_data = KeyDerivationData::from_passphrase_with_new_salt(
            &credentials.key,
            &credentials.key_derivation_method,
        );
        let master_key = key_data.calc_master_key().unwrap();
        service
            .create_wallet(config, credentials, (&key_data, &master_key))
            .await
            .unwrap();
    }

    async fn _open(
        service: &WalletService,
        config: &Config,
        credentials: &Credentials,
    ) -> IndyResult<WalletHandle> {
        let (handle, key_data, rekey_data) =
            service.open_wallet_prepare(config, credentials).await?;
        let master_key = key_data.calc_master_key()?;
        let rekey = rekey_data.map(|data| data.calc_master_key()).transpose()?;
        service
            .open_wallet_continue(handle, (&master_key, rekey.as_ref()), config.cache.clone())
            .await
    }

    async fn _delete(
        service: &WalletService,
        config: &Config,
        credentials: &Credentials,
    ) -> IndyResult<()> {
        let (metadata, key_data) = service.delete_wallet_prepare(config, credentials).await?;
        let master_key = key_data.calc_master_key()?;
        service
            .delete_wallet_continue(config, credentials, &metadata, &master_key)
            .await
    }

    fn _tags(pairs: &[(&str, &str)]) -> Tags {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn wallet_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let service = WalletService::new();
        let config = _config(&dir, "lifecycle");
        let credentials = _raw_credentials();

        _create(&service, &config, &credentials).await;

        let handle = _open(&service, &config, &credentials).await.unwrap();
        assert_eq!(service.get_wallets_count().unwrap(), 1);

        let err = _open(&service, &config, &credentials).await.unwrap_err();
        assert_eq!(err.kind(), IndyErrorKind::WalletAlreadyOpened);

        let err = _delete(&service, &config, &credentials).await.unwrap_err();
        assert_eq!(err.kind(), IndyErrorKind::InvalidState);

        service.close_wallet(handle).await.unwrap();
        assert_eq!(service.get_wallet_ids_count().unwrap(), 0);

        let err = service.close_wallet(handle).await.unwrap_err();
        assert_eq!(err.kind(), IndyErrorKind::InvalidWalletHandle);

        _delete(&service, &config, &credentials).await.unwrap();

        let err = _open(&service, &config, &credentials).await.unwrap_err();
        assert_eq!(err.kind(), IndyErrorKind::WalletNotFound);
    }

    #[tokio::test]
    async fn wrong_key_and_rekey() {
        let dir = tempfile::tempdir().unwrap();
        let service = WalletService::new();
        let config = _config(&dir, "rekey");

        _create(&service, &config, &_raw_credentials()).await;

        let err = _open(
            &service,
            &config,
            &_credentials(OTHER_RAW_KEY, KeyDerivationMethod::RAW),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), IndyErrorKind::WalletAccessFailed);
        assert_eq!(service.get_pending_for_open_count().unwrap(), 0);

        let mut credentials = _raw_credentials();
        credentials.rekey = Some("new pass".to_string());
        credentials.rekey_derivation_method = KeyDerivationMethod::ARGON2I_INT;

        let handle = _open(&service, &config, &credentials).await.unwrap();
        service
            .add_record(handle, "type", "id", "value", &Tags::new())
            .await
            .unwrap();
        service.close_wallet(handle).await.unwrap();

        let err = _open(&service, &config, &_raw_credentials())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), IndyErrorKind::WalletAccessFailed);

        let rekeyed = _credentials("new pass", KeyDerivationMethod::ARGON2I_INT);
        let handle = _open(&service, &config, &rekeyed).await.unwrap();
        let record = service
            .get_record(handle, "type", "id", &RecordOptions::default())
            .await
            .unwrap();
        assert_eq!(record.get_value(), Some("value"));
    }

    #[tokio::test]
    async fn records_and_tags() {
        let dir = tempfile::tempdir().unwrap();
        let service = WalletService::new();
        let config = _config(&dir, "records");
        let credentials = _raw_credentials();

        _create(&service, &config, &credentials).await;
        let handle = _open(&service, &config, &credentials).await.unwrap();

        service
            .add_record(
                handle,
                "type",
                "id1",
                "value1",
                &_tags(&[("enc", "a"), ("~plain", "1")]),
            )
            .await
            .unwrap();

        let err = service
            .add_record(handle, "type", "id1", "value1", &Tags::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), IndyErrorKind::WalletItemAlreadyExists);

        service
            .update_record_value(handle, "type", "id1", "value2")
            .await
            .unwrap();
        service
            .add_record_tags(handle, "type", "id1", &_tags(&[("~plain", "2"), ("x", "y")]))
            .await
            .unwrap();
        service
            .delete_record_tags(handle, "type", "id1", &["enc"])
            .await
            .unwrap();

        let record = service
            .get_record(handle, "type", "id1", &RecordOptions::full())
            .await
            .unwrap();
        assert_eq!(
            record,
            WalletRecord::new(
                "id1".to_string(),
                Some("type".to_string()),
                Some("value2".to_string()),
                Some(_tags(&[("~plain", "2"), ("x", "y")]))
            )
        );

        service
            .update_record_tags(handle, "type", "id1", &Tags::new())
            .await
            .unwrap();
        let record = service
            .get_record(handle, "type", "id1", &RecordOptions::id_value_tags())
            .await
            .unwrap();
        assert_eq!(record.get_tags(), Some(&Tags::new()));

        service.delete_record(handle, "type", "id1").await.unwrap();
        let err = service
            .get_record(handle, "type", "id1", &RecordOptions::id())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), IndyErrorKind::WalletItemNotFound);

        let err = service
            .update_record_value(handle, "type", "id1", "v")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), IndyErrorKind::WalletItemNotFound);
    }

    #[tokio::test]
    async fn search_with_wql() {
        let dir = tempfile::tempdir().unwrap();
        let service = WalletService::new();
        let config = _config(&dir, "search");
        let credentials = _raw_credentials();

        _create(&service, &config, &credentials).await;
        let handle = _open(&service, &config, &credentials).await.unwrap();

        for (id, color, age) in [("a", "red", "10"), ("b", "blue", "20"), ("c", "red", "30")] {
            service
                .add_record(handle, "person", id, id, &_tags(&[("color", color), ("~age", age)]))
                .await
                .unwrap();
        }
        service
            .add_record(handle, "other", "d", "d", &_tags(&[("color", "red")]))
            .await
            .unwrap();

        let count = |query: &'static str| {
            let service = &service;
            async move {
                let mut search = service
                    .search_records(
                        handle,
                        "person",
                        wql::parse_from_json(query).unwrap(),
                        &SearchOptions::full(),
                    )
                    .await
                    .unwrap();
                let total = search.get_total_count().unwrap().unwrap();

                let mut ids = Vec::new();
                while let Some(record) = search.fetch_next_record().await.unwrap() {
                    ids.push(record.get_id().to_string());
                }
                ids.sort();
                assert_eq!(ids.len(), total);
                ids
            }
        };

        assert_eq!(count("{}").await, vec!["a", "b", "c"]);
        assert_eq!(count(r#"{"color": "red"}"#).await, vec!["a", "c"]);
        assert_eq!(count(r#"{"~age": {"$gte": "20"}}"#).await, vec!["b", "c"]);
        assert_eq!(count(r#"{"~age": {"$like": "1%"}}"#).await, vec!["a"]);
        assert_eq!(
            count(r#"{"$not": {"color": {"$in": ["red", "green"]}}}"#).await,
            vec!["b"]
        );
        assert_eq!(
            count(r#"{"$or": [{"color": "blue"}, {"~age": "30"}]}"#).await,
            vec!["b", "c"]
        );
        assert!(count(r#"{"$or": []}"#).await.is_empty());

        let err = service
            .search_records(
                handle,
                "person",
                wql::parse_from_json(r#"{"color": {"$gt": "a"}}"#).unwrap(),
                &SearchOptions::default(),
            )
            .await
            .err()
            .unwrap();
        assert_eq!(err.kind(), IndyErrorKind::WalletQueryError);
    }

    #[tokio::test]
    async fn export_then_import() {
        let dir = tempfile::tempdir().unwrap();
        let service = WalletService::new();
        let config = _config(&dir, "export");
        let credentials = _raw_credentials();

        _create(&service, &config, &credentials).await;
        let handle = _open(&service, &config, &credentials).await.unwrap();

        for i in 0..50 {
            service
                .add_record(
                    handle,
                    "type",
                    &format!("id{i}"),
                    &"v".repeat(i * 10),
                    &_tags(&[("tag", "value"), ("~num", &i.to_string())]),
                )
                .await
                .unwrap();
        }

        let export_path = dir.path().join("export_file");
        let export_config = ExportConfig {
            key: "export key".to_string(),
            path: export_path.to_string_lossy().to_string(),
            key_derivation_method: KeyDerivationMethod::ARGON2I_INT,
        };

        let key_data = KeyDerivationData::from_passphrase_with_new_salt(
            &export_config.key,
            &export_config.key_derivation_method,
        );
        let export_key = key_data.calc_master_key().unwrap();
        service
            .export_wallet(handle, &export_config, 0, (&key_data, &export_key))
            .await
            .unwrap();

        let err = service
            .export_wallet(handle, &export_config, 0, (&key_data, &export_key))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), IndyErrorKind::IOError);

        let import_config = ImportConfig::from(export_config);

        // wrong export key leaves no wallet behind
        let imported = _config(&dir, "imported");
        let bad_import = ImportConfig {
            key: "wrong".to_string(),
            path: import_config.path.clone(),
        };
        let (import_handle, key_data, import_key_data) = service
            .import_wallet_prepare(&imported, &credentials, &bad_import)
            .await
            .unwrap();
        let err = service
            .import_wallet_continue(
                import_handle,
                &imported,
                &credentials,
                (
                    import_key_data.calc_master_key().unwrap(),
                    key_data.calc_master_key().unwrap(),
                ),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), IndyErrorKind::WalletAccessFailed);
        let err = _open(&service, &imported, &credentials).await.unwrap_err();
        assert_eq!(err.kind(), IndyErrorKind::WalletNotFound);

        let (import_handle, key_data, import_key_data) = service
            .import_wallet_prepare(&imported, &credentials, &import_config)
            .await
            .unwrap();
        service
            .import_wallet_continue(
                import_handle,
                &imported,
                &credentials,
                (
                    import_key_data.calc_master_key().unwrap(),
                    key_data.calc_master_key().unwrap(),
                ),
            )
            .await
            .unwrap();
        assert_eq!(service.get_pending_for_import_count().unwrap(), 0);

        let imported_handle = _open(&service, &imported, &credentials).await.unwrap();
        let mut search = service
            .search_records(
                imported_handle,
                "type",
                wql::parse_from_json(r#"{"~num": {"$lt": "2"}}"#).unwrap(),
                &SearchOptions::full(),
            )
            .await
            .unwrap();
        // string comparison: "0", "1", "10".."19"
        assert_eq!(search.get_total_count().unwrap(), Some(12));

        let record = search.fetch_next_record().await.unwrap().unwrap();
        let original = service
            .get_record(handle, "type", record.get_id(), &RecordOptions::full())
            .await
            .unwrap();
        assert_eq!(record, original);
    }

    #[tokio::test]
    async fn cache_is_used_for_configured_types() {
        let dir = tempfile::tempdir().unwrap();
        let service = WalletService::new();
        let mut config = _config(&dir, "cache");
        config.cache = Some(CacheConfig {
            size: 5,
            entities: vec!["Indy::Did".to_string()],
            algorithm: Default::default(),
        });
        let credentials = _raw_credentials();

        _create(&service, &config, &credentials).await;
        let handle = _open(&service, &config, &credentials).await.unwrap();

        service
            .add_record(handle, "Indy::Did", "did1", "v", &_tags(&[("a", "b")]))
            .await
            .unwrap();
        service
            .add_record(handle, "Indy::Key", "key1", "v", &Tags::new())
            .await
            .unwrap();
        assert_eq!(service.get_cache_stats(handle).unwrap(), (1, 5));

        service
            .update_record_value(handle, "Indy::Did", "did1", "v2")
            .await
            .unwrap();
        let record = service
            .get_record(handle, "Indy::Did", "did1", &RecordOptions::id_value_tags())
            .await
            .unwrap();
        assert_eq!(record.get_value(), Some("v2"));
        assert_eq!(record.get_tags(), Some(&_tags(&[("a", "b")])));

        service.delete_record(handle, "Indy::Did", "did1").await.unwrap();
        assert_eq!(service.get_cache_stats(handle).unwrap(), (0, 5));
    }

    #[test]
    fn options_parse_with_defaults() {
        let options: RecordOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, RecordOptions::default());

        let options: SearchOptions =
            serde_json::from_str(r#"{"retrieveTotalCount": true, "retrieveRecords": false}"#)
                .unwrap();
        assert!(options.retrieve_total_count);
        assert!(!options.retrieve_records);
        assert!(options.retrieve_value);
    }

    #[test]
    fn short_type_name_strips_path() {
        struct Did;
        assert_eq!(short_type_name::<Did>(), "Did");
    }

    #[tokio::test]
    async fn searches_are_scoped_and_dropped_with_their_wallet() {
        let dir = tempfile::tempdir().unwrap();
        let service = WalletService::new();
        let config = _config(&dir, "searches");
        let credentials = _raw_credentials();

        _create(&service, &config, &credentials).await;
        let handle = _open(&service, &config, &credentials).await.unwrap();

        let search = service
            .search_records(handle, "type", wql::Query::default(), &SearchOptions::default())
            .await
            .unwrap();
        let search_handle = service
            .register_search(handle, SearchScope::Records, search)
            .unwrap();
        assert_eq!(service.get_searches_count().unwrap(), 1);

        let err = service
            .get_search(search_handle, SearchScope::Credentials)
            .err()
            .unwrap();
        assert_eq!(err.kind(), IndyErrorKind::InvalidSearchHandle);
        assert!(service
            .get_search(search_handle, SearchScope::Records)
            .is_ok());

        service.close_wallet(handle).await.unwrap();
        assert_eq!(service.get_searches_count().unwrap(), 0);

        let err = service
            .close_search(search_handle, SearchScope::Records)
            .unwrap_err();
        assert_eq!(err.kind(), IndyErrorKind::InvalidSearchHandle);

        _delete(&service, &config, &credentials).await.unwrap();
    }
}
