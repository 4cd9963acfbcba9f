use std::{
    collections::HashMap,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use indy_api_types::{errors::prelude::*, PoolHandle, WalletHandle};
use indy_utils::wql::Query;
use indy_wallet::{RecordOptions, SearchOptions, WalletRecord, WalletService};

use crate::{
    controllers::LedgerController,
    domain::{
        anoncreds::{credential_definition::CredentialDefinitionId, schema::SchemaId},
        cache::{GetCacheOptions, PurgeOptions, CRED_DEF_CACHE, SCHEMA_CACHE, TIMESTAMP_TAG},
        crypto::did::DidValue,
    },
    services::LedgerService,
};

struct CacheLookup {
    fresh: Option<String>,
    exists: bool,
}

/// Wallet backed cache of schemas and credential definitions read from the ledger.
pub struct CacheController {
    wallet_service: Arc<WalletService>,
    ledger_service: Arc<LedgerService>,
    ledger_controller: Arc<LedgerController>,
}

impl CacheController {
    pub(crate) fn new(
        wallet_service: Arc<WalletService>,
        ledger_service: Arc<LedgerService>,
        ledger_controller: Arc<LedgerController>,
    ) -> CacheController {
        CacheController {
            wallet_service,
            ledger_service,
            ledger_controller,
        }
    }

    /// Gets schema json data for specified schema id.
    /// If data is present inside of cache, cached data is returned.
    /// Otherwise data is fetched from the ledger and stored inside of cache for future use.
    ///
    /// #Params
    /// pool_handle: pool handle (created by open_pool_ledger).
    /// wallet_handle: wallet handle (created by open_wallet).
    /// submitter_did: DID of the submitter stored in secured Wallet.
    /// id: identifier of schema.
    /// options:
    /// {
    ///    noCache: (bool, optional, false by default) Skip usage of cache,
    ///    noUpdate: (bool, optional, false by default) Use only cached data, do not try to update.
    ///    noStore: (bool, optional, false by default) Skip storing fresh data if updated,
    ///    minFresh: (int, optional, -1 by default) Return cached data if not older than this many seconds. -1 means do not check age.
    /// }
    ///
    /// #Returns
    /// Schema json:
    /// {
    ///     id: identifier of schema
    ///     attrNames: array of attribute name strings
    ///     name: Schema's name string
    ///     version: Schema's version string
    ///     ver: Version of the Schema json
    /// }
    ///
    /// #Errors
    /// Common*
    /// Wallet*
    /// Ledger*
    pub async fn get_schema(
        &self,
        pool_handle: PoolHandle,
        wallet_handle: WalletHandle,
        submitter_did: DidValue,
        id: SchemaId,
        options: GetCacheOptions,
    ) -> IndyResult<String> {
        debug!(
            "get_schema > pool_handle {:?} wallet_handle {:?} submitter_did {:?} id {:?} options {:?}",
            pool_handle, wallet_handle, submitter_did, id, options
        );

        id.validate()?;

        let cached = self
            ._get_cached(wallet_handle, SCHEMA_CACHE, &id.0, &options)
            .await?;

        if let Some(schema_json) = cached.fresh {
            debug!("get_schema < cached {:?}", schema_json);
            return Ok(schema_json);
        }

        let request = self
            .ledger_service
            .build_get_schema_request(Some(&submitter_did), &id)?;

        let response = self
            .ledger_controller
            .sign_and_submit_request(pool_handle, wallet_handle, submitter_did, request)
            .await?;

        let (_, res) = self.ledger_service.parse_get_schema_response(&response)?;

        self._store(wallet_handle, SCHEMA_CACHE, &id.0, &res, &options, cached.exists)
            .await?;

        debug!("get_schema < {:?}", res);
        Ok(res)
    }

    /// Gets credential definition json data for specified credential definition id.
    /// If data is present inside of cache, cached data is returned.
    /// Otherwise data is fetched from the ledger and stored inside of cache for future use.
    ///
    /// Options are the same as for get_schema.
    ///
    /// #Returns
    /// Credential Definition json.
    ///
    /// #Errors
    /// Common*
    /// Wallet*
    /// Ledger*
    pub async fn get_cred_def(
        &self,
        pool_handle: PoolHandle,
        wallet_handle: WalletHandle,
        submitter_did: DidValue,
        id: CredentialDefinitionId,
        options: GetCacheOptions,
    ) -> IndyResult<String> {
        debug!(
            "get_cred_def > pool_handle {:?} wallet_handle {:?} submitter_did {:?} id {:?} options {:?}",
            pool_handle, wallet_handle, submitter_did, id, options
        );

        id.validate()?;

        let cached = self
            ._get_cached(wallet_handle, CRED_DEF_CACHE, &id.0, &options)
            .await?;

        if let Some(cred_def_json) = cached.fresh {
            debug!("get_cred_def < cached {:?}", cred_def_json);
            return Ok(cred_def_json);
        }

        let request = self
            .ledger_service
            .build_get_cred_def_request(Some(&submitter_did), &id)?;

        let response = self
            .ledger_controller
            .sign_and_submit_request(pool_handle, wallet_handle, submitter_did, request)
            .await?;

        let (_, res) = self.ledger_service.parse_get_cred_def_response(&response)?;

        self._store(wallet_handle, CRED_DEF_CACHE, &id.0, &res, &options, cached.exists)
            .await?;

        debug!("get_cred_def < {:?}", res);
        Ok(res)
    }

    /// Purge schema cache.
    ///
    /// #Params
    /// wallet_handle: wallet handle (created by open_wallet).
    /// options:
    /// {
    ///   maxAge: (int, optional, -1 by default) Purge cached data if older than this many seconds. -1 means purge all.
    /// }
    pub async fn purge_schema_cache(
        &self,
        wallet_handle: WalletHandle,
        options: PurgeOptions,
    ) -> IndyResult<()> {
        debug!(
            "purge_schema_cache > wallet_handle {:?} options {:?}",
            wallet_handle, options
        );

        self._purge(wallet_handle, SCHEMA_CACHE, &options).await?;

        debug!("purge_schema_cache <");
        Ok(())
    }

    /// Purge credential definition cache.
    ///
    /// Options are the same as for purge_schema_cache.
    pub async fn purge_cred_def_cache(
        &self,
        wallet_handle: WalletHandle,
        options: PurgeOptions,
    ) -> IndyResult<()> {
        debug!(
            "purge_cred_def_cache > wallet_handle {:?} options {:?}",
            wallet_handle, options
        );

        self._purge(wallet_handle, CRED_DEF_CACHE, &options).await?;

        debug!("purge_cred_def_cache <");
        Ok(())
    }

    async fn _get_cached(
        &self,
        wallet_handle: WalletHandle,
        type_: &str,
        id: &str,
        options: &GetCacheOptions,
    ) -> IndyResult<CacheLookup> {
        let record = if options.no_cache.unwrap_or(false) {
            None
        } else {
            self._get_record(wallet_handle, type_, id).await?
        };

        let fresh = record
            .as_ref()
            .filter(|record| _is_fresh(record, options.min_fresh.unwrap_or(-1)))
            .and_then(|record| record.get_value())
            .map(String::from);

        if fresh.is_none() && options.no_update.unwrap_or(false) {
            return Err(err_msg(
                IndyErrorKind::LedgerItemNotFound,
                format!("Item {} not found in cache and updates are disabled", id),
            ));
        }

        Ok(CacheLookup {
            fresh,
            exists: record.is_some(),
        })
    }

    async fn _store(
        &self,
        wallet_handle: WalletHandle,
        type_: &str,
        id: &str,
        value: &str,
        options: &GetCacheOptions,
        exists: bool,
    ) -> IndyResult<()> {
        if options.no_store.unwrap_or(false) {
            return Ok(());
        }

        let mut tags = HashMap::new();
        tags.insert(TIMESTAMP_TAG.to_string(), _now().to_string());

        if exists {
            self.wallet_service
                .update_record_value(wallet_handle, type_, id, value)
                .await?;

            self.wallet_service
                .update_record_tags(wallet_handle, type_, id, &tags)
                .await
        } else {
            self.wallet_service
                .add_record(wallet_handle, type_, id, value, &tags)
                .await
        }
    }

    async fn _get_record(
        &self,
        wallet_handle: WalletHandle,
        type_: &str,
        id: &str,
    ) -> IndyResult<Option<WalletRecord>> {
        match self
            .wallet_service
            .get_record(wallet_handle, type_, id, &RecordOptions::id_value_tags())
            .await
        {
            Ok(record) => Ok(Some(record)),
            Err(err) if err.kind() == IndyErrorKind::WalletItemNotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn _purge(
        &self,
        wallet_handle: WalletHandle,
        type_: &str,
        options: &PurgeOptions,
    ) -> IndyResult<()> {
        let query = match options.max_age.unwrap_or(-1) {
            max_age if max_age < 0 => Query::default(),
            max_age => Query::Lt(
                TIMESTAMP_TAG.to_string(),
                (_now() - i64::from(max_age)).to_string(),
            ),
        };

        let options = SearchOptions {
            retrieve_records: true,
            retrieve_total_count: false,
            retrieve_type: false,
            retrieve_value: false,
            retrieve_tags: false,
        };

        let mut search = self
            .wallet_service
            .search_records(wallet_handle, type_, query, &options)
            .await?;

        let mut ids = Vec::new();

        while let Some(record) = search.fetch_next_record().await? {
            ids.push(record.get_id().to_string());
        }

        for id in ids.iter() {
            self.wallet_service
                .delete_record(wallet_handle, type_, id)
                .await?;
        }

        info!("_purge: {} {} records deleted", ids.len(), type_);
        Ok(())
    }
}

fn _now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn _is_fresh(record: &WalletRecord, min_fresh: i32) -> bool {
    if min_fresh < 0 {
        return true;
    }

    record
        .get_tags()
        .and_then(|tags| tags.get(TIMESTAMP_TAG))
        .and_then(|ts| ts.parse::<i64>().ok())
        .map_or(false, |ts| _now() - ts <= i64::from(min_fresh))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(timestamp: Option<i64>) -> WalletRecord {
        let tags = timestamp.map(|ts| {
            let mut tags = HashMap::new();
            tags.insert(TIMESTAMP_TAG.to_string(), ts.to_string());
            tags
        });

        WalletRecord::new(
            "id".to_string(),
            Some(SCHEMA_CACHE.to_string()),
            Some("{}".to_string()),
            tags,
        )
    }

    #[test]
    fn any_age_is_fresh_without_limit() {
        assert!(_is_fresh(&record(Some(0)), -1));
        assert!(_is_fresh(&record(None), -1));
    }

    #[test]
    fn stale_record_is_not_fresh() {
        assert!(!_is_fresh(&record(Some(_now() - 100)), 10));
        assert!(_is_fresh(&record(Some(_now() - 5)), 10));
    }

    #[test]
    fn record_without_timestamp_is_not_fresh_with_limit() {
        assert!(!_is_fresh(&record(None), 10));
    }
}
