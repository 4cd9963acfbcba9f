use std::{collections::HashMap, sync::Arc};

use indy_api_types::{errors::prelude::*, PoolHandle, WalletHandle};
use indy_utils::{
    crypto::base58::{FromBase58, ToBase58},
    wql::Query,
};
use indy_wallet::{RecordOptions, SearchOptions, WalletService};

use crate::{
    controllers::parse_record_value,
    domain::{
        crypto::{
            did::{
                Did, DidMetadata, DidMethod, DidValue, DidWithMeta, MyDidInfo, TemporaryDid,
                TheirDid, TheirDidInfo,
            },
            key::{Key, KeyInfo},
        },
        ledger::{
            attrib::{AttribData, Endpoint},
            nym::NymData,
        },
        pairwise::Pairwise,
    },
    services::{CryptoService, LedgerService, PoolService},
};

pub struct DidController {
    wallet_service: Arc<WalletService>,
    crypto_service: Arc<CryptoService>,
    ledger_service: Arc<LedgerService>,
    pool_service: Arc<PoolService>,
}

impl DidController {
    pub(crate) fn new(
        wallet_service: Arc<WalletService>,
        crypto_service: Arc<CryptoService>,
        ledger_service: Arc<LedgerService>,
        pool_service: Arc<PoolService>,
    ) -> DidController {
        DidController {
            wallet_service,
            crypto_service,
            ledger_service,
            pool_service,
        }
    }

    /// Creates keys (signing and encryption keys) for a new
    /// DID (owned by the caller of the library).
    /// Identity's DID must be either explicitly provided, or taken as the first 16 bit of verkey.
    /// Saves the Identity DID with keys in a secured Wallet, so that it can be used to sign
    /// and encrypt transactions.
    ///
    /// #Params
    /// wallet_handle: wallet handler (created by open_wallet).
    /// did_info: Identity information. Example:
    /// {
    ///     "did": string, (optional;
    ///             if not provided and cid param is false then the first 16 bit of the verkey will be used as a new DID;
    ///             if not provided and cid is true then the full verkey will be used as a new DID;
    ///             if provided, then keys will be replaced - key rotation use case)
    ///     "seed": string, (optional) Seed that allows deterministic did creation.
    ///     "crypto_type": string, (optional; if not set then ed25519 curve is used)
    ///     "cid": bool, (optional; if not set then false is used;)
    ///     "ledger_type": string, (optional) type of the ledger to create fully qualified did.
    ///     "method_name": string, (optional) method name to create fully qualified did.
    /// }
    ///
    /// #Returns
    /// did: DID generated and stored in the wallet
    /// verkey: The DIDs verification key
    ///
    /// #Errors
    /// Common*
    /// Wallet*
    /// Crypto*
    pub async fn create_and_store_my_did(
        &self,
        wallet_handle: WalletHandle,
        my_did_info: MyDidInfo,
    ) -> IndyResult<(String, String)> {
        debug!(
            "create_and_store_my_did > wallet_handle {:?} my_did_info {:?}",
            wallet_handle,
            secret!(&my_did_info)
        );

        let (did, key) = self.crypto_service.create_my_did(&my_did_info)?;

        if let Some(current_did) = self._wallet_get_opt_my_did(wallet_handle, &did.did).await? {
            if did.verkey == current_did.verkey {
                let res = (did.did.0, did.verkey);
                debug!("create_and_store_my_did < already exists {:?}", res);
                return Ok(res);
            }

            return Err(err_msg(
                IndyErrorKind::DIDAlreadyExists,
                format!(
                    "DID \"{}\" already exists but with different Verkey. You should specify \
                     Seed used for initial generation",
                    did.did.0
                ),
            ));
        }

        self.wallet_service
            .add_indy_object(wallet_handle, &did.did.0, &did, &HashMap::new())
            .await?;

        // The key may already be stored by `create_key` with the same seed.
        if !self
            .wallet_service
            .record_exists::<Key>(wallet_handle, &key.verkey)
            .await?
        {
            self.wallet_service
                .add_indy_object(wallet_handle, &key.verkey, &key, &HashMap::new())
                .await?;
        }

        let res = (did.did.0, did.verkey);
        debug!("create_and_store_my_did < {:?}", res);
        Ok(res)
    }

    /// Generated temporary keys (signing and encryption keys) for an existing
    /// DID (owned by the caller of the library).
    ///
    /// #Returns
    /// verkey: The DIDs temporary verification key
    ///
    /// #Errors
    /// Common*
    /// Wallet*
    /// Crypto*
    pub async fn replace_keys_start(
        &self,
        wallet_handle: WalletHandle,
        my_did: DidValue,
        key_info: KeyInfo,
    ) -> IndyResult<String> {
        debug!(
            "replace_keys_start > wallet_handle {:?} my_did {:?} key_info {:?}",
            wallet_handle,
            my_did,
            secret!(&key_info)
        );

        self.crypto_service.validate_did(&my_did)?;

        let my_did = self._wallet_get_my_did(wallet_handle, &my_did).await?;

        let temporary_key = self.crypto_service.create_key(&key_info)?;

        let my_temporary_did = TemporaryDid {
            did: my_did.did,
            verkey: temporary_key.verkey.clone(),
        };

        self.wallet_service
            .add_indy_object(
                wallet_handle,
                &temporary_key.verkey,
                &temporary_key,
                &HashMap::new(),
            )
            .await?;

        self.wallet_service
            .upsert_indy_object(wallet_handle, &my_temporary_did.did.0, &my_temporary_did)
            .await?;

        let res = my_temporary_did.verkey;
        debug!("replace_keys_start < {:?}", res);
        Ok(res)
    }

    /// Apply temporary keys as main for an existing DID (owned by the caller of the library).
    ///
    /// #Errors
    /// Common*
    /// Wallet*
    /// Crypto*
    pub async fn replace_keys_apply(
        &self,
        wallet_handle: WalletHandle,
        my_did: DidValue,
    ) -> IndyResult<()> {
        debug!(
            "replace_keys_apply > wallet_handle {:?} my_did {:?}",
            wallet_handle, my_did
        );

        self.crypto_service.validate_did(&my_did)?;

        let my_did = self._wallet_get_my_did(wallet_handle, &my_did).await?;

        let my_temporary_did: TemporaryDid = self
            .wallet_service
            .get_indy_object(wallet_handle, &my_did.did.0, &RecordOptions::id_value())
            .await?;

        let my_did = Did::from(my_temporary_did);

        self.wallet_service
            .update_indy_object(wallet_handle, &my_did.did.0, &my_did)
            .await?;

        self.wallet_service
            .delete_indy_record::<TemporaryDid>(wallet_handle, &my_did.did.0)
            .await?;

        debug!("replace_keys_apply < ()");
        Ok(())
    }

    /// Saves their DID for a pairwise connection in a secured Wallet,
    /// so that it can be used to verify transaction.
    /// Updates DID associated verkey in case DID already exists in the Wallet.
    ///
    /// #Params
    /// their_did_info:
    ///     {
    ///        "did": string, (required)
    ///        "verkey": string
    ///             - optional is case of adding a new DID, and DID is cryptonym: did == verkey,
    ///             - mandatory in case of updating an existing DID
    ///     }
    ///
    /// #Errors
    /// Common*
    /// Wallet*
    /// Crypto*
    pub async fn store_their_did(
        &self,
        wallet_handle: WalletHandle,
        their_did_info: TheirDidInfo,
    ) -> IndyResult<()> {
        debug!(
            "store_their_did > wallet_handle {:?} their_did_info {:?}",
            wallet_handle, their_did_info
        );

        let their_did = self.crypto_service.create_their_did(&their_did_info)?;

        self.wallet_service
            .upsert_indy_object(wallet_handle, &their_did.did.0, &their_did)
            .await?;

        debug!("store_their_did < ()");
        Ok(())
    }

    /// Retrieves the information about the giving DID in the wallet.
    ///
    /// #Returns
    /// did_with_meta: {
    ///   "did": string - DID stored in the wallet,
    ///   "verkey": string - The DIDs transport key (ver key, key id),
    ///   "tempVerkey": string - Temporary DIDs transport key, exist only during the rotation of the keys.
    ///   "metadata": string - The meta information stored with the DID
    /// }
    pub async fn get_my_did_with_meta(
        &self,
        wallet_handle: WalletHandle,
        my_did: DidValue,
    ) -> IndyResult<DidWithMeta> {
        debug!(
            "get_my_did_with_meta > wallet_handle {:?} my_did {:?}",
            wallet_handle, my_did
        );

        let did = self._wallet_get_my_did(wallet_handle, &my_did).await?;

        let metadata = self
            .wallet_service
            .get_indy_opt_object::<DidMetadata>(
                wallet_handle,
                &did.did.0,
                &RecordOptions::id_value(),
            )
            .await?;

        let temp_verkey = self
            .wallet_service
            .get_indy_opt_object::<TemporaryDid>(
                wallet_handle,
                &did.did.0,
                &RecordOptions::id_value(),
            )
            .await?;

        let res = DidWithMeta {
            did: did.did,
            verkey: did.verkey,
            temp_verkey: temp_verkey.map(|tv| tv.verkey),
            metadata: metadata.map(|m| m.value),
        };

        debug!("get_my_did_with_meta < {:?}", res);
        Ok(res)
    }

    /// Retrieves the information about all DIDs stored in the wallet.
    pub async fn list_my_dids_with_meta(
        &self,
        wallet_handle: WalletHandle,
    ) -> IndyResult<Vec<DidWithMeta>> {
        debug!("list_my_dids_with_meta > wallet_handle {:?}", wallet_handle);

        let mut did_search = self
            .wallet_service
            .search_indy_records::<Did>(wallet_handle, Query::default(), &SearchOptions::id_value())
            .await?;

        let mut metadata_search = self
            .wallet_service
            .search_indy_records::<DidMetadata>(
                wallet_handle,
                Query::default(),
                &SearchOptions::id_value(),
            )
            .await?;

        let mut temporarydid_search = self
            .wallet_service
            .search_indy_records::<TemporaryDid>(
                wallet_handle,
                Query::default(),
                &SearchOptions::id_value(),
            )
            .await?;

        let mut metadata_map: HashMap<String, String> = HashMap::new();
        let mut temporarydid_map: HashMap<String, String> = HashMap::new();

        while let Some(record) = metadata_search.fetch_next_record().await? {
            let metadata: DidMetadata = parse_record_value(&record)?;
            metadata_map.insert(record.get_id().to_string(), metadata.value);
        }

        while let Some(record) = temporarydid_search.fetch_next_record().await? {
            let did: TemporaryDid = parse_record_value(&record)?;
            temporarydid_map.insert(did.did.0, did.verkey);
        }

        let mut dids: Vec<DidWithMeta> = Vec::new();

        while let Some(record) = did_search.fetch_next_record().await? {
            let did: Did = parse_record_value(&record)?;

            let temp_verkey = temporarydid_map.remove(&did.did.0);
            let metadata = metadata_map.remove(&did.did.0);

            dids.push(DidWithMeta {
                did: did.did,
                verkey: did.verkey,
                temp_verkey,
                metadata,
            });
        }

        debug!("list_my_dids_with_meta < {:?}", dids);
        Ok(dids)
    }

    /// Returns ver key (key id) for the given DID.
    ///
    /// Looks data stored in the local wallet only and skips freshness
    /// checking. My DIDs are checked before their DIDs.
    ///
    /// #Errors
    /// Common*
    /// Wallet*
    /// Crypto*
    pub async fn key_for_local_did(
        &self,
        wallet_handle: WalletHandle,
        did: DidValue,
    ) -> IndyResult<String> {
        debug!(
            "key_for_local_did > wallet_handle {:?} did {:?}",
            wallet_handle, did
        );

        self.crypto_service.validate_did(&did)?;

        if let Some(my_did) = self._wallet_get_opt_my_did(wallet_handle, &did).await? {
            let res = my_did.verkey;
            debug!("key_for_local_did < my {:?}", res);
            return Ok(res);
        }

        let their_did = self._wallet_get_their_did(wallet_handle, &did).await?;

        let res = their_did.verkey;
        debug!("key_for_local_did < {:?}", res);
        Ok(res)
    }

    /// Returns ver key (key id) for the given DID.
    ///
    /// Checks the wallet first. Unknown DIDs are resolved with a GET_NYM
    /// request through the pool and the result is stored as their DID.
    ///
    /// #Errors
    /// Common*
    /// Wallet*
    /// Ledger*
    /// Crypto*
    pub async fn key_for_did(
        &self,
        pool_handle: PoolHandle,
        wallet_handle: WalletHandle,
        did: DidValue,
    ) -> IndyResult<String> {
        debug!(
            "key_for_did > pool_handle {:?} wallet_handle {:?} did {:?}",
            pool_handle, wallet_handle, did
        );

        self.crypto_service.validate_did(&did)?;

        if let Some(my_did) = self._wallet_get_opt_my_did(wallet_handle, &did).await? {
            let res = my_did.verkey;
            debug!("key_for_did < my {:?}", res);
            return Ok(res);
        }

        let their_did = self
            .wallet_service
            .get_indy_opt_object::<TheirDid>(wallet_handle, &did.0, &RecordOptions::id_value())
            .await?;

        let their_did = match their_did {
            Some(their_did) => their_did,
            None => {
                self._fetch_and_store_their_did(pool_handle, wallet_handle, &did)
                    .await?
            }
        };

        let res = their_did.verkey;
        debug!("key_for_did < {:?}", res);
        Ok(res)
    }

    /// Set/replaces endpoint information for the given DID.
    ///
    /// #Params
    /// did - The DID to resolve endpoint.
    /// address -  The DIDs endpoint address. indy-node and indy-plenum restrict this to ip_address:port
    /// transport_key - The DIDs transport key (ver key, key id).
    pub async fn set_endpoint_for_did(
        &self,
        wallet_handle: WalletHandle,
        did: DidValue,
        endpoint: Endpoint,
    ) -> IndyResult<()> {
        debug!(
            "set_endpoint_for_did > wallet_handle {:?} did {:?} endpoint {:?}",
            wallet_handle, did, endpoint
        );

        self.crypto_service.validate_did(&did)?;

        if let Some(ref transport_key) = endpoint.verkey {
            self.crypto_service.validate_key(transport_key)?;
        }

        self.wallet_service
            .upsert_indy_object(wallet_handle, &did.0, &endpoint)
            .await?;

        debug!("set_endpoint_for_did < ()");
        Ok(())
    }

    /// Returns endpoint information for the given DID.
    ///
    /// The wallet is checked first, then the `endpoint` ATTRIB on the
    /// ledger. An endpoint found on the ledger is stored in the wallet.
    ///
    /// #Returns
    /// - endpoint - The DIDs endpoint.
    /// - transport_vk - The DIDs transport key (ver key, key id).
    pub async fn get_endpoint_for_did(
        &self,
        wallet_handle: WalletHandle,
        pool_handle: PoolHandle,
        did: DidValue,
    ) -> IndyResult<(String, Option<String>)> {
        debug!(
            "get_endpoint_for_did > wallet_handle {:?} pool_handle {:?} did {:?}",
            wallet_handle, pool_handle, did
        );

        self.crypto_service.validate_did(&did)?;

        let endpoint = self
            .wallet_service
            .get_indy_opt_object::<Endpoint>(wallet_handle, &did.0, &RecordOptions::id_value())
            .await?;

        let endpoint = match endpoint {
            Some(endpoint) => endpoint,
            None => {
                self._fetch_and_store_endpoint(pool_handle, wallet_handle, &did)
                    .await?
            }
        };

        let res = (endpoint.ha, endpoint.verkey);
        debug!("get_endpoint_for_did < {:?}", res);
        Ok(res)
    }

    /// Saves/replaces the meta information for the giving DID in the wallet.
    pub async fn set_did_metadata(
        &self,
        wallet_handle: WalletHandle,
        did: DidValue,
        metadata: String,
    ) -> IndyResult<()> {
        debug!(
            "set_did_metadata > wallet_handle {:?} did {:?} metadata {:?}",
            wallet_handle, did, metadata
        );

        self.crypto_service.validate_did(&did)?;

        let metadata = DidMetadata { value: metadata };

        self.wallet_service
            .upsert_indy_object(wallet_handle, &did.0, &metadata)
            .await?;

        debug!("set_did_metadata < ()");
        Ok(())
    }

    /// Retrieves the meta information for the giving DID in the wallet.
    ///
    /// #Errors
    /// Common*
    /// Wallet*
    /// Crypto*
    pub async fn get_did_metadata(
        &self,
        wallet_handle: WalletHandle,
        did: DidValue,
    ) -> IndyResult<String> {
        debug!(
            "get_did_metadata > wallet_handle {:?} did {:?}",
            wallet_handle, did
        );

        self.crypto_service.validate_did(&did)?;

        let metadata = self
            .wallet_service
            .get_indy_object::<DidMetadata>(wallet_handle, &did.0, &RecordOptions::id_value())
            .await?;

        let res = metadata.value;
        debug!("get_did_metadata < {:?}", res);
        Ok(res)
    }

    /// Retrieves abbreviated verkey if it is possible otherwise return full verkey.
    ///
    /// #Params
    /// did: DID.
    /// full_verkey: The DIDs verification key,
    ///
    /// #Returns
    /// verkey: The DIDs verification key in either abbreviated or full form
    pub fn abbreviate_verkey(&self, did: DidValue, verkey: String) -> IndyResult<String> {
        debug!("abbreviate_verkey > did {:?} verkey {:?}", did, verkey);

        self.crypto_service.validate_did(&did)?;
        self.crypto_service.validate_key(&verkey)?;

        if !did.is_abbreviatable() || did.is_fully_qualified() {
            debug!("abbreviate_verkey < not abbreviatable {:?}", verkey);
            return Ok(verkey);
        }

        let did = did.to_unqualified().0.from_base58()?;
        let dverkey = verkey.from_base58()?;

        if dverkey.len() < 16 {
            return Ok(verkey);
        }

        let (first_part, second_part) = dverkey.split_at(16);

        let res = if first_part.eq(did.as_slice()) {
            format!("~{}", second_part.to_base58())
        } else {
            verkey
        };

        debug!("abbreviate_verkey < {:?}", res);
        Ok(res)
    }

    /// Update DID stored in the wallet to make fully qualified, or to do other DID maintenance.
    ///     - If the DID has no method, a method will be appended (prepend did:peer to a legacy did)
    ///     - If the DID has a method, a method will be updated (migrate did:peer to did:peer-new)
    ///
    /// The temporary DID, metadata, endpoint and pairwise records of the DID
    /// follow the new identifier.
    ///
    /// #Returns
    /// did: fully qualified form of did
    ///
    /// #Errors
    /// Common*
    /// Wallet*
    /// Crypto*
    pub async fn qualify_did(
        &self,
        wallet_handle: WalletHandle,
        did: DidValue,
        method: DidMethod,
    ) -> IndyResult<String> {
        debug!(
            "qualify_did > wallet_handle {:?} curr_did {:?} method {:?}",
            wallet_handle, did, method
        );

        self.crypto_service.validate_did(&did)?;

        let mut curr_did = self._wallet_get_my_did(wallet_handle, &did).await?;

        curr_did.did = DidValue::new(&did.to_short().0, None, Some(&method.0))?;

        if curr_did.did == did {
            debug!("qualify_did < unchanged {:?}", curr_did.did);
            return Ok(curr_did.did.0);
        }

        if self
            .wallet_service
            .record_exists::<Did>(wallet_handle, &curr_did.did.0)
            .await?
        {
            return Err(err_msg(
                IndyErrorKind::DIDAlreadyExists,
                format!("DID \"{}\" already exists in the wallet", curr_did.did.0),
            ));
        }

        // new records are written before the old ones go away
        self.wallet_service
            .add_indy_object(wallet_handle, &curr_did.did.0, &curr_did, &HashMap::new())
            .await?;

        self.wallet_service
            .delete_indy_record::<Did>(wallet_handle, &did.0)
            .await?;

        if let Some(mut temp_did) = self
            .wallet_service
            .get_indy_opt_object::<TemporaryDid>(wallet_handle, &did.0, &RecordOptions::id_value())
            .await?
        {
            temp_did.did = curr_did.did.clone();

            self.wallet_service
                .upsert_indy_object(wallet_handle, &curr_did.did.0, &temp_did)
                .await?;

            self.wallet_service
                .delete_indy_record::<TemporaryDid>(wallet_handle, &did.0)
                .await?;
        }

        self._update_dependent_entity_reference::<DidMetadata>(
            wallet_handle,
            &did.0,
            &curr_did.did.0,
        )
        .await?;

        self._update_dependent_entity_reference::<Endpoint>(wallet_handle, &did.0, &curr_did.did.0)
            .await?;

        let mut pairwise_search = self
            .wallet_service
            .search_indy_records::<Pairwise>(
                wallet_handle,
                Query::default(),
                &SearchOptions::id_value(),
            )
            .await?;

        let mut moved = Vec::new();

        while let Some(record) = pairwise_search.fetch_next_record().await? {
            let mut pairwise: Pairwise = parse_record_value(&record)?;

            if pairwise.my_did == did {
                pairwise.my_did = curr_did.did.clone();
                moved.push(pairwise);
            }
        }

        for pairwise in moved {
            self.wallet_service
                .update_indy_object(wallet_handle, &pairwise.their_did.0, &pairwise)
                .await?;
        }

        let res = curr_did.did.0;
        debug!("qualify_did < {:?}", res);
        Ok(res)
    }

    async fn _fetch_and_store_their_did(
        &self,
        pool_handle: PoolHandle,
        wallet_handle: WalletHandle,
        did: &DidValue,
    ) -> IndyResult<TheirDid> {
        trace!(
            "_fetch_and_store_their_did > pool_handle {:?} did {:?}",
            pool_handle,
            did
        );

        let request = self.ledger_service.build_get_nym_request(None, did)?;
        let response = self.pool_service.send_tx(pool_handle, &request).await?;
        let nym = self.ledger_service.parse_get_nym_response(&response)?;

        let nym: NymData = serde_json::from_str(&nym)
            .to_indy(IndyErrorKind::InvalidState, "Invalid NYM data")?;

        let their_did_info = TheirDidInfo::new(nym.did.qualify(did.get_method()), nym.verkey);

        let their_did = self.crypto_service.create_their_did(&their_did_info)?;

        self.wallet_service
            .upsert_indy_object(wallet_handle, &their_did.did.0, &their_did)
            .await?;

        trace!("_fetch_and_store_their_did < {:?}", their_did);
        Ok(their_did)
    }

    async fn _fetch_and_store_endpoint(
        &self,
        pool_handle: PoolHandle,
        wallet_handle: WalletHandle,
        did: &DidValue,
    ) -> IndyResult<Endpoint> {
        trace!(
            "_fetch_and_store_endpoint > pool_handle {:?} did {:?}",
            pool_handle,
            did
        );

        let request =
            self.ledger_service
                .build_get_attrib_request(None, did, Some("endpoint"), None, None)?;

        let response = self.pool_service.send_tx(pool_handle, &request).await?;
        let raw = self.ledger_service.parse_get_attrib_response(&response)?;

        let attrib_data: AttribData = serde_json::from_str(&raw)
            .to_indy(IndyErrorKind::InvalidState, "Invalid endpoint attribute json")?;

        let endpoint = attrib_data.endpoint;

        self.wallet_service
            .upsert_indy_object(wallet_handle, &did.0, &endpoint)
            .await?;

        trace!("_fetch_and_store_endpoint < {:?}", endpoint);
        Ok(endpoint)
    }

    async fn _update_dependent_entity_reference<T>(
        &self,
        wallet_handle: WalletHandle,
        id: &str,
        new_id: &str,
    ) -> IndyResult<()>
    where
        T: ::serde::Serialize + ::serde::de::DeserializeOwned + Sized,
    {
        if let Some(record) = self
            .wallet_service
            .get_indy_opt_object::<T>(wallet_handle, id, &RecordOptions::id_value())
            .await?
        {
            self.wallet_service
                .upsert_indy_object::<T>(wallet_handle, new_id, &record)
                .await?;

            self.wallet_service
                .delete_indy_record::<T>(wallet_handle, id)
                .await?;
        }

        Ok(())
    }

    async fn _wallet_get_my_did(
        &self,
        wallet_handle: WalletHandle,
        my_did: &DidValue,
    ) -> IndyResult<Did> {
        self.wallet_service
            .get_indy_object(wallet_handle, &my_did.0, &RecordOptions::id_value())
            .await
    }

    async fn _wallet_get_opt_my_did(
        &self,
        wallet_handle: WalletHandle,
        my_did: &DidValue,
    ) -> IndyResult<Option<Did>> {
        self.wallet_service
            .get_indy_opt_object(wallet_handle, &my_did.0, &RecordOptions::id_value())
            .await
    }

    async fn _wallet_get_their_did(
        &self,
        wallet_handle: WalletHandle,
        their_did: &DidValue,
    ) -> IndyResult<TheirDid> {
        self.wallet_service
            .get_indy_object(wallet_handle, &their_did.0, &RecordOptions::id_value())
            .await
    }
}
