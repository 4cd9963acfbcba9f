//! Ledger request construction, signing and submission.
//!
//! Builders return the request as a json string ready for `sign_request` or
//! `submit_request`. Submitter DIDs are optional for reads; the ledger
//! service falls back to a fixed default identifier when none is given.

use std::sync::Arc;

use indy_api_types::{errors::prelude::*, PoolHandle, WalletHandle};
use indy_utils::crypto::base58::ToBase58;
use indy_wallet::{RecordOptions, WalletService};
use serde_json::{self, Value};

use crate::{
    domain::{
        anoncreds::{
            credential_definition::{CredentialDefinition, CredentialDefinitionId},
            revocation_registry_definition::RevocationRegistryId,
            schema::{Schema, SchemaId},
        },
        crypto::{
            did::{Did, DidValue},
            key::Key,
        },
        ledger::request::Request,
    },
    services::{CryptoService, LedgerService, PoolService},
};

pub struct LedgerController {
    pool_service: Arc<PoolService>,
    crypto_service: Arc<CryptoService>,
    wallet_service: Arc<WalletService>,
    ledger_service: Arc<LedgerService>,
}

impl LedgerController {
    pub(crate) fn new(
        pool_service: Arc<PoolService>,
        crypto_service: Arc<CryptoService>,
        wallet_service: Arc<WalletService>,
        ledger_service: Arc<LedgerService>,
    ) -> LedgerController {
        LedgerController {
            pool_service,
            crypto_service,
            wallet_service,
            ledger_service,
        }
    }

    /// Signs `request_json` as `submitter_did` and sends it to the pool.
    ///
    /// #Returns
    /// The raw reply of the pool.
    ///
    /// #Errors
    /// Wallet* if the DID or its key is not in the wallet.
    /// Pool* and Ledger* from submission.
    pub async fn sign_and_submit_request(
        &self,
        pool_handle: PoolHandle,
        wallet_handle: WalletHandle,
        submitter_did: DidValue,
        request_json: String,
    ) -> IndyResult<String> {
        debug!(
            "sign_and_submit_request > pool_handle {:?} wallet_handle {:?} submitter_did {:?} request_json {:?}",
            pool_handle, wallet_handle, submitter_did, request_json
        );

        let signed = self
            ._sign_request(wallet_handle, &submitter_did, &request_json)
            .await?;

        let reply = self._submit_request(pool_handle, &signed).await?;

        debug!("sign_and_submit_request < {:?}", reply);
        Ok(reply)
    }

    /// Sends an already prepared request to the pool as is.
    pub async fn submit_request(
        &self,
        handle: PoolHandle,
        request_json: String,
    ) -> IndyResult<String> {
        debug!(
            "submit_request > handle {:?} request_json {:?}",
            handle, request_json
        );

        let reply = self._submit_request(handle, &request_json).await?;

        debug!("submit_request < {:?}", reply);
        Ok(reply)
    }

    /// Adds a `signature` made with the key of `submitter_did`.
    ///
    /// The request itself is not otherwise changed.
    pub async fn sign_request(
        &self,
        wallet_handle: WalletHandle,
        submitter_did: DidValue,
        request_json: String,
    ) -> IndyResult<String> {
        debug!(
            "sign_request > wallet_handle {:?} submitter_did {:?} request_json {:?}",
            wallet_handle, submitter_did, request_json
        );

        let signed = self
            ._sign_request(wallet_handle, &submitter_did, &request_json)
            .await?;

        debug!("sign_request < {:?}", signed);
        Ok(signed)
    }

    /// NYM write. `role` takes a role name, an empty string clears the
    /// current role and `None` leaves it untouched.
    pub fn build_nym_request(
        &self,
        submitter_did: DidValue,
        target_did: DidValue,
        verkey: Option<String>,
        alias: Option<String>,
        role: Option<String>,
    ) -> IndyResult<String> {
        debug!(
            "build_nym_request > submitter_did {:?} target_did {:?} verkey {:?} alias {:?} role {:?}",
            submitter_did, target_did, verkey, alias, role
        );

        self._validate_dids(&[&submitter_did, &target_did])?;

        if let Some(verkey) = verkey.as_deref() {
            self.crypto_service.validate_key(verkey)?;
        }

        let request = self.ledger_service.build_nym_request(
            &submitter_did,
            &target_did,
            verkey.as_deref(),
            alias.as_deref(),
            role.as_deref(),
        )?;

        debug!("build_nym_request < {:?}", request);
        Ok(request)
    }

    pub fn build_get_nym_request(
        &self,
        submitter_did: Option<DidValue>,
        target_did: DidValue,
    ) -> IndyResult<String> {
        debug!(
            "build_get_nym_request > submitter_did {:?} target_did {:?}",
            submitter_did, target_did
        );

        self._validate_opt_did(submitter_did.as_ref())?;
        self._validate_dids(&[&target_did])?;

        let request = self
            .ledger_service
            .build_get_nym_request(submitter_did.as_ref(), &target_did)?;

        debug!("build_get_nym_request < {:?}", request);
        Ok(request)
    }

    /// Extracts `{did, verkey, role}` from a GET_NYM reply.
    ///
    /// #Errors
    /// LedgerNotFound when the ledger has no such NYM.
    pub fn parse_get_nym_response(&self, get_nym_response: String) -> IndyResult<String> {
        debug!("parse_get_nym_response > {:?}", get_nym_response);

        let nym = self
            .ledger_service
            .parse_get_nym_response(&get_nym_response)?;

        debug!("parse_get_nym_response < {:?}", nym);
        Ok(nym)
    }

    /// ATTRIB write. Exactly one of `hash`, `raw` or `enc` carries the value.
    pub fn build_attrib_request(
        &self,
        submitter_did: DidValue,
        target_did: DidValue,
        hash: Option<String>,
        raw: Option<Value>,
        enc: Option<String>,
    ) -> IndyResult<String> {
        debug!(
            "build_attrib_request > submitter_did {:?} target_did {:?} hash {:?} raw {:?} enc {:?}",
            submitter_did, target_did, hash, raw, enc
        );

        self._validate_dids(&[&submitter_did, &target_did])?;

        let request = self.ledger_service.build_attrib_request(
            &submitter_did,
            &target_did,
            hash.as_deref(),
            raw.as_ref(),
            enc.as_deref(),
        )?;

        debug!("build_attrib_request < {:?}", request);
        Ok(request)
    }

    /// GET_ATTRIB read. `raw` is an attribute name, `hash` and `enc` select
    /// the stored value itself.
    pub fn build_get_attrib_request(
        &self,
        submitter_did: Option<DidValue>,
        target_did: DidValue,
        raw: Option<String>,
        hash: Option<String>,
        enc: Option<String>,
    ) -> IndyResult<String> {
        debug!(
            "build_get_attrib_request > submitter_did {:?} target_did {:?} raw {:?} hash {:?} enc {:?}",
            submitter_did, target_did, raw, hash, enc
        );

        self._validate_opt_did(submitter_did.as_ref())?;
        self._validate_dids(&[&target_did])?;

        let request = self.ledger_service.build_get_attrib_request(
            submitter_did.as_ref(),
            &target_did,
            raw.as_deref(),
            hash.as_deref(),
            enc.as_deref(),
        )?;

        debug!("build_get_attrib_request < {:?}", request);
        Ok(request)
    }

    pub fn parse_get_attrib_response(&self, get_attrib_response: String) -> IndyResult<String> {
        debug!("parse_get_attrib_response > {:?}", get_attrib_response);

        let attrib = self
            .ledger_service
            .parse_get_attrib_response(&get_attrib_response)?;

        debug!("parse_get_attrib_response < {:?}", attrib);
        Ok(attrib)
    }

    /// SCHEMA write.
    ///
    /// #Errors
    /// CommonInvalidStructure for a schema without attributes or with more
    /// than the ledger accepts.
    pub fn build_schema_request(
        &self,
        submitter_did: DidValue,
        schema: Schema,
    ) -> IndyResult<String> {
        debug!(
            "build_schema_request > submitter_did {:?} schema {:?}",
            submitter_did, schema
        );

        self._validate_dids(&[&submitter_did])?;

        let request = self
            .ledger_service
            .build_schema_request(&submitter_did, schema)?;

        debug!("build_schema_request < {:?}", request);
        Ok(request)
    }

    pub fn build_get_schema_request(
        &self,
        submitter_did: Option<DidValue>,
        id: SchemaId,
    ) -> IndyResult<String> {
        debug!(
            "build_get_schema_request > submitter_did {:?} id {:?}",
            submitter_did, id
        );

        self._validate_opt_did(submitter_did.as_ref())?;

        let request = self
            .ledger_service
            .build_get_schema_request(submitter_did.as_ref(), &id)?;

        debug!("build_get_schema_request < {:?}", request);
        Ok(request)
    }

    /// Turns a GET_SCHEMA reply into `(schema_id, schema_json)` usable by
    /// the prover calls.
    pub fn parse_get_schema_response(
        &self,
        get_schema_response: String,
    ) -> IndyResult<(String, String)> {
        debug!("parse_get_schema_response > {:?}", get_schema_response);

        let schema = self
            .ledger_service
            .parse_get_schema_response(&get_schema_response)?;

        debug!("parse_get_schema_response < {:?}", schema);
        Ok(schema)
    }

    /// CRED_DEF write.
    pub fn build_cred_def_request(
        &self,
        submitter_did: DidValue,
        cred_def: CredentialDefinition,
    ) -> IndyResult<String> {
        debug!(
            "build_cred_def_request > submitter_did {:?} cred_def {:?}",
            submitter_did, cred_def
        );

        self._validate_dids(&[&submitter_did])?;

        let request = self
            .ledger_service
            .build_cred_def_request(&submitter_did, cred_def)?;

        debug!("build_cred_def_request < {:?}", request);
        Ok(request)
    }

    pub fn build_get_cred_def_request(
        &self,
        submitter_did: Option<DidValue>,
        id: CredentialDefinitionId,
    ) -> IndyResult<String> {
        debug!(
            "build_get_cred_def_request > submitter_did {:?} id {:?}",
            submitter_did, id
        );

        self._validate_opt_did(submitter_did.as_ref())?;

        let request = self
            .ledger_service
            .build_get_cred_def_request(submitter_did.as_ref(), &id)?;

        debug!("build_get_cred_def_request < {:?}", request);
        Ok(request)
    }

    /// Turns a GET_CRED_DEF reply into `(cred_def_id, cred_def_json)`.
    pub fn parse_get_cred_def_response(
        &self,
        get_cred_def_response: String,
    ) -> IndyResult<(String, String)> {
        debug!("parse_get_cred_def_response > {:?}", get_cred_def_response);

        let cred_def = self
            .ledger_service
            .parse_get_cred_def_response(&get_cred_def_response)?;

        debug!("parse_get_cred_def_response < {:?}", cred_def);
        Ok(cred_def)
    }

    pub fn build_get_revoc_reg_def_request(
        &self,
        submitter_did: Option<DidValue>,
        id: RevocationRegistryId,
    ) -> IndyResult<String> {
        debug!(
            "build_get_revoc_reg_def_request > submitter_did {:?} id {:?}",
            submitter_did, id
        );

        self._validate_opt_did(submitter_did.as_ref())?;

        let request = self
            .ledger_service
            .build_get_revoc_reg_def_request(submitter_did.as_ref(), &id)?;

        debug!("build_get_revoc_reg_def_request < {:?}", request);
        Ok(request)
    }

    /// Turns a GET_REVOC_REG_DEF reply into `(rev_reg_def_id, rev_reg_def_json)`.
    pub fn parse_get_revoc_reg_def_response(
        &self,
        get_revoc_reg_def_response: String,
    ) -> IndyResult<(String, String)> {
        debug!("parse_get_revoc_reg_def_response > {:?}", get_revoc_reg_def_response);

        let rev_reg_def = self
            .ledger_service
            .parse_get_revoc_reg_def_response(&get_revoc_reg_def_response)?;

        debug!("parse_get_revoc_reg_def_response < {:?}", rev_reg_def);
        Ok(rev_reg_def)
    }

    /// GET_TXN read by sequence number. `ledger_type` is `DOMAIN` when absent
    /// and may also be `POOL`, `CONFIG` or a numeric ledger id.
    pub fn build_get_txn_request(
        &self,
        submitter_did: Option<DidValue>,
        ledger_type: Option<String>,
        seq_no: i32,
    ) -> IndyResult<String> {
        debug!(
            "build_get_txn_request > submitter_did {:?} ledger_type {:?} seq_no {:?}",
            submitter_did, ledger_type, seq_no
        );

        self._validate_opt_did(submitter_did.as_ref())?;

        let request = self.ledger_service.build_get_txn_request(
            submitter_did.as_ref(),
            ledger_type.as_deref(),
            seq_no,
        )?;

        debug!("build_get_txn_request < {:?}", request);
        Ok(request)
    }

    fn _validate_dids(&self, dids: &[&DidValue]) -> IndyResult<()> {
        dids.iter()
            .try_for_each(|did| self.crypto_service.validate_did(did))
    }

    fn _validate_opt_did(&self, did: Option<&DidValue>) -> IndyResult<()> {
        did.map_or(Ok(()), |did| self._validate_dids(&[did]))
    }

    async fn _signing_key(
        &self,
        wallet_handle: WalletHandle,
        submitter_did: &DidValue,
    ) -> IndyResult<Key> {
        let did: Did = self
            .wallet_service
            .get_indy_object(wallet_handle, &submitter_did.0, &RecordOptions::id_value())
            .await?;

        self.wallet_service
            .get_indy_object(wallet_handle, &did.verkey, &RecordOptions::id_value())
            .await
    }

    async fn _sign_request(
        &self,
        wallet_handle: WalletHandle,
        submitter_did: &DidValue,
        request_json: &str,
    ) -> IndyResult<String> {
        let key = self._signing_key(wallet_handle, submitter_did).await?;

        let (signature_input, mut request) =
            self.ledger_service.get_txn_bytes_to_sign(request_json)?;

        let signature = self.crypto_service.sign(&key, &signature_input)?;
        request["signature"] = Value::String(signature.to_base58());

        serde_json::to_string(&request)
            .to_indy(IndyErrorKind::InvalidState, "Can't serialize signed request")
    }

    async fn _submit_request(&self, handle: PoolHandle, request_json: &str) -> IndyResult<String> {
        serde_json::from_str::<Request<Value>>(request_json)
            .to_indy(IndyErrorKind::InvalidStructure, "Request is invalid json")?;

        self.pool_service.send_tx(handle, request_json).await
    }
}
