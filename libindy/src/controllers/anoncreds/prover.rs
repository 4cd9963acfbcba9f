use std::{collections::HashMap, sync::Arc};

use indy_api_types::{errors::prelude::*, SearchHandle, WalletHandle};
use indy_credx::{
    self as credx,
    types::{
        Credential, CredentialDefinition, CredentialOffer, CredentialRequest,
        CredentialRequestMetadata, DidValue, MasterSecret as CredxMasterSecret,
        RevocationRegistryDefinition,
    },
    ursa::{bn::BigNumber, cl::MasterSecret as UrsaMasterSecret},
};
use indy_utils::wql::Query;
use indy_wallet::{RecordOptions, SearchOptions, SearchScope, WalletService};

use crate::{
    controllers::parse_record_value,
    domain::anoncreds::{
        credential::{build_credential_tags, CredentialInfo, Filter},
        master_secret::MasterSecret,
    },
    utils::qualifier,
};

pub struct ProverController {
    wallet_service: Arc<WalletService>,
}

impl ProverController {
    pub(crate) fn new(wallet_service: Arc<WalletService>) -> ProverController {
        ProverController { wallet_service }
    }

    /// Creates a master secret with a given id and stores it in the wallet.
    /// The id must be unique.
    ///
    /// #Params
    /// wallet_handle: wallet handle (created by open_wallet).
    /// master_secret_id: (optional, if not present random one will be generated) new master id
    ///
    /// #Returns
    /// out_master_secret_id: Id of generated master secret
    ///
    /// #Errors
    /// Anoncreds*
    /// Common*
    /// Wallet*
    pub async fn create_master_secret(
        &self,
        wallet_handle: WalletHandle,
        master_secret_id: Option<String>,
    ) -> IndyResult<String> {
        debug!(
            "create_master_secret > wallet_handle {:?} master_secret_id {:?}",
            wallet_handle, master_secret_id
        );

        let master_secret_id =
            master_secret_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        if self
            .wallet_service
            .record_exists::<MasterSecret>(wallet_handle, &master_secret_id)
            .await?
        {
            return Err(err_msg(
                IndyErrorKind::MasterSecretDuplicateName,
                format!("MasterSecret already exists {}", master_secret_id),
            ));
        }

        let secret = credx::prover::create_master_secret()?;

        let value = secret
            .value
            .value()
            .and_then(|value| value.to_dec())
            .map_err(|err| {
                err_msg(
                    IndyErrorKind::InvalidState,
                    format!("Cannot convert master secret to decimal: {:?}", err),
                )
            })?;

        self.wallet_service
            .add_indy_object(
                wallet_handle,
                &master_secret_id,
                &MasterSecret { value },
                &HashMap::new(),
            )
            .await?;

        debug!("create_master_secret < {:?}", master_secret_id);
        Ok(master_secret_id)
    }

    /// Creates a credential request for the given credential offer.
    ///
    /// The method creates a blinded master secret for a master secret identified by a provided name.
    /// The master secret identified by the name must be already stored in the secure wallet (see prover_create_master_secret)
    /// The blinded master secret is a part of the credential request.
    ///
    /// #Returns
    /// cred_req: Credential request
    /// cred_req_metadata: Credential request metadata that must be passed to `store_credential`
    ///
    /// #Errors
    /// Anoncreds*
    /// Common*
    /// Wallet*
    pub async fn create_credential_request(
        &self,
        wallet_handle: WalletHandle,
        prover_did: String,
        cred_offer: CredentialOffer,
        cred_def: CredentialDefinition,
        master_secret_id: String,
    ) -> IndyResult<(CredentialRequest, CredentialRequestMetadata)> {
        debug!(
            "create_credential_request > wallet_handle {:?} prover_did {:?} cred_offer {:?} \
             master_secret_id {:?}",
            wallet_handle, prover_did, cred_offer, master_secret_id
        );

        let master_secret = self
            ._wallet_get_master_secret(wallet_handle, &master_secret_id)
            .await?;

        let prover_did = DidValue::new(&qualifier::to_unqualified(&prover_did), None);

        let res = credx::prover::create_credential_request(
            &prover_did,
            &cred_def,
            &master_secret,
            &master_secret_id,
            &cred_offer,
        )?;

        debug!("create_credential_request < {:?}", res.1);
        Ok(res)
    }

    /// Check credential provided by Issuer for the given credential request,
    /// updates the credential by a master secret and stores in a secure wallet.
    ///
    /// The credential is tagged with `schema_id`, `schema_issuer_did`,
    /// `schema_name`, `schema_version`, `issuer_did`, `cred_def_id`,
    /// `rev_reg_id` and `attr::<name>::value` / `attr::<name>::marker` for
    /// every attribute. Attribute names are lowercased without spaces.
    ///
    /// #Returns
    /// out_cred_id: identifier by which credential is stored in the wallet
    ///
    /// #Errors
    /// Anoncreds*
    /// Common*
    /// Wallet*
    pub async fn store_credential(
        &self,
        wallet_handle: WalletHandle,
        cred_id: Option<String>,
        cred_req_metadata: CredentialRequestMetadata,
        mut credential: Credential,
        cred_def: CredentialDefinition,
        rev_reg_def: Option<RevocationRegistryDefinition>,
    ) -> IndyResult<String> {
        debug!(
            "store_credential > wallet_handle {:?} cred_id {:?} cred_req_metadata {:?} \
             rev_reg_def {:?}",
            wallet_handle, cred_id, cred_req_metadata, rev_reg_def
        );

        let master_secret = self
            ._wallet_get_master_secret(wallet_handle, &cred_req_metadata.master_secret_name)
            .await?;

        credx::prover::process_credential(
            &mut credential,
            &cred_req_metadata,
            &master_secret,
            &cred_def,
            rev_reg_def.as_ref(),
        )?;

        let raw_values: HashMap<&String, &String> = credential
            .values
            .0
            .iter()
            .map(|(name, value)| (name, &value.raw))
            .collect();

        let tags = build_credential_tags(
            &credential.schema_id.0,
            &credential.cred_def_id.0,
            credential.rev_reg_id.as_ref().map(|id| id.0.as_str()),
            raw_values.into_iter(),
        )?;

        let cred_id = cred_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        self.wallet_service
            .add_indy_object(wallet_handle, &cred_id, &credential, &tags)
            .await?;

        debug!("store_credential < {:?}", cred_id);
        Ok(cred_id)
    }

    /// Gets human readable credential by the given id.
    ///
    /// #Returns
    /// cred_info: {
    ///     "referent": string, // cred_id in the wallet
    ///     "attrs": {"key1":"raw_value1", "key2":"raw_value2"},
    ///     "schema_id": string,
    ///     "cred_def_id": string,
    ///     "rev_reg_id": Optional<string>,
    ///     "cred_rev_id": Optional<string>
    /// }
    pub async fn get_credential(
        &self,
        wallet_handle: WalletHandle,
        cred_id: String,
    ) -> IndyResult<CredentialInfo> {
        debug!(
            "get_credential > wallet_handle {:?} cred_id {:?}",
            wallet_handle, cred_id
        );

        let credential: Credential = self
            .wallet_service
            .get_indy_object(wallet_handle, &cred_id, &RecordOptions::id_value())
            .await?;

        let res = Self::_make_cred_info(&cred_id, &credential)?;

        debug!("get_credential < {:?}", res);
        Ok(res)
    }

    /// Gets human readable credentials according to the filter.
    /// If filter is NULL, then all credentials are returned.
    pub async fn get_credentials(
        &self,
        wallet_handle: WalletHandle,
        filter: Option<Filter>,
    ) -> IndyResult<Vec<CredentialInfo>> {
        debug!(
            "get_credentials > wallet_handle {:?} filter {:?}",
            wallet_handle, filter
        );

        let query = filter.unwrap_or_default().to_query();

        let mut search = self
            .wallet_service
            .search_indy_records::<Credential>(wallet_handle, query, &SearchOptions::id_value())
            .await?;

        let mut res = Vec::new();

        while let Some(record) = search.fetch_next_record().await? {
            let credential: Credential = parse_record_value(&record)?;
            res.push(Self::_make_cred_info(record.get_id(), &credential)?);
        }

        debug!("get_credentials < {:?}", res);
        Ok(res)
    }

    /// Search for credentials stored in wallet.
    /// Credentials can be filtered by tags created during saving of credential.
    ///
    /// Instead of immediately returning of fetched credentials
    /// this call returns search_handle that can be used later
    /// to fetch records by small batches (with fetch_credentials).
    ///
    /// #Returns
    /// search_handle: Search handle that can be used later to fetch records by small batches (with fetch_credentials)
    /// total_count: Total count of records
    pub async fn search_credentials(
        &self,
        wallet_handle: WalletHandle,
        query: Option<Query>,
    ) -> IndyResult<(SearchHandle, usize)> {
        debug!(
            "search_credentials > wallet_handle {:?} query {:?}",
            wallet_handle, query
        );

        let options = SearchOptions {
            retrieve_total_count: true,
            ..SearchOptions::id_value()
        };

        let search = self
            .wallet_service
            .search_indy_records::<Credential>(wallet_handle, query.unwrap_or_default(), &options)
            .await?;

        let total_count = search.get_total_count()?.unwrap_or(0);

        let search_handle =
            self.wallet_service
                .register_search(wallet_handle, SearchScope::Credentials, search)?;

        let res = (search_handle, total_count);
        debug!("search_credentials < {:?}", res);
        Ok(res)
    }

    /// Fetch next credentials for search. An exhausted search returns an
    /// empty list.
    pub async fn fetch_credentials(
        &self,
        search_handle: SearchHandle,
        count: usize,
    ) -> IndyResult<Vec<CredentialInfo>> {
        debug!(
            "fetch_credentials > search_handle {:?} count {:?}",
            search_handle, count
        );

        let search = self
            .wallet_service
            .get_search(search_handle, SearchScope::Credentials)?;

        let mut search = search.lock().await;

        let mut res = Vec::new();

        for _ in 0..count {
            match search.fetch_next_record().await? {
                Some(record) => {
                    let credential: Credential = parse_record_value(&record)?;
                    res.push(Self::_make_cred_info(record.get_id(), &credential)?);
                }
                None => break,
            }
        }

        debug!("fetch_credentials < {:?}", res);
        Ok(res)
    }

    /// Close credentials search (make search handle invalid)
    pub fn close_credentials_search(&self, search_handle: SearchHandle) -> IndyResult<()> {
        debug!("close_credentials_search > search_handle {:?}", search_handle);

        self.wallet_service
            .close_search(search_handle, SearchScope::Credentials)?;

        debug!("close_credentials_search < ()");
        Ok(())
    }

    /// Delete identified credential from wallet.
    pub async fn delete_credential(
        &self,
        wallet_handle: WalletHandle,
        cred_id: String,
    ) -> IndyResult<()> {
        debug!(
            "delete_credential > wallet_handle {:?} cred_id {:?}",
            wallet_handle, cred_id
        );

        if !self
            .wallet_service
            .record_exists::<Credential>(wallet_handle, &cred_id)
            .await?
        {
            return Err(err_msg(
                IndyErrorKind::WalletItemNotFound,
                "Credential not found",
            ));
        }

        self.wallet_service
            .delete_indy_record::<Credential>(wallet_handle, &cred_id)
            .await?;

        debug!("delete_credential < ()");
        Ok(())
    }

    /// Get unqualified form (short form without method) of a fully qualified entity like DID.
    ///
    /// This function should be used to the proper casting of fully qualified entity to unqualified form in the following cases:
    ///     Issuer, which works with fully qualified identifiers, creates a Credential Offer for Prover, which doesn't support fully qualified identifiers.
    ///     Verifier prepares a Proof Request based on fully qualified identifiers or Prover, which doesn't support fully qualified identifiers.
    ///     another case when casting to unqualified form needed
    ///
    /// Accepts a single identifier as well as a json document, in which
    /// every qualified identifier is replaced.
    pub fn to_unqualified(&self, entity: String) -> IndyResult<String> {
        debug!("to_unqualified > entity {:?}", entity);

        let res = qualifier::to_unqualified_deep(&entity);

        debug!("to_unqualified < {:?}", res);
        Ok(res)
    }

    async fn _wallet_get_master_secret(
        &self,
        wallet_handle: WalletHandle,
        master_secret_id: &str,
    ) -> IndyResult<CredxMasterSecret> {
        let master_secret: MasterSecret = self
            .wallet_service
            .get_indy_object(wallet_handle, master_secret_id, &RecordOptions::id_value())
            .await?;

        let value = BigNumber::from_dec(&master_secret.value).map_err(|err| {
            err_msg(
                IndyErrorKind::InvalidState,
                format!("Cannot restore master secret from decimal: {:?}", err),
            )
        })?;

        let value: UrsaMasterSecret = serde_json::from_value(json!({ "ms": value }))
            .to_indy(IndyErrorKind::InvalidState, "Cannot restore master secret")?;

        Ok(CredxMasterSecret { value })
    }

    fn _make_cred_info(cred_id: &str, credential: &Credential) -> IndyResult<CredentialInfo> {
        let signature = serde_json::to_value(&credential.signature)
            .to_indy(IndyErrorKind::InvalidState, "Cannot serialize credential signature")?;

        let cred_rev_id = signature
            .get("r_credential")
            .and_then(|r_credential| r_credential.get("i"))
            .and_then(|i| {
                i.as_str()
                    .map(String::from)
                    .or_else(|| i.as_i64().map(|i| i.to_string()))
            });

        let attrs = credential
            .values
            .0
            .iter()
            .map(|(name, value)| (name.to_string(), value.raw.to_string()))
            .collect();

        Ok(CredentialInfo {
            referent: cred_id.to_string(),
            attrs,
            schema_id: credential.schema_id.0.to_string(),
            cred_def_id: credential.cred_def_id.0.to_string(),
            rev_reg_id: credential.rev_reg_id.as_ref().map(|id| id.0.to_string()),
            cred_rev_id,
        })
    }
}
