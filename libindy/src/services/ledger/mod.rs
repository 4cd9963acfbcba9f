use hex::ToHex;
use indy_api_types::errors::prelude::*;
use indy_utils::crypto::hash::sha256;
use serde_json::{self, Value};

use crate::domain::{
    anoncreds::{
        credential_definition::{CredentialDefinition, CredentialDefinitionId, CredentialDefinitionV1},
        revocation_registry_definition::RevocationRegistryId,
        schema::{Schema, SchemaId, SchemaV1},
    },
    crypto::did::{DidValue, ShortDidValue},
    ledger::{
        attrib::{AttribOperation, GetAttribOperation, GetAttribReplyResult},
        constants::{role_to_code, ATTRIB, DEFAULT_LIBINDY_DID, GET_ATTR},
        cred_def::{CredDefOperation, GetCredDefOperation, GetCredDefReplyResult},
        nym::{GetNymOperation, GetNymReplyResult, GetNymResultData, NymData, NymOperation},
        request::Request,
        response::parse_response,
        rev_reg_def::{GetRevRegDefOperation, GetRevocRegDefReplyResult},
        schema::{
            GetSchemaOperation, GetSchemaOperationData, GetSchemaReplyResult, SchemaOperation,
            SchemaOperationData,
        },
        txn::{GetTxnOperation, LedgerType},
    },
};

/// Builds ledger requests, parses ledger replies and computes the byte
/// string a request signature covers.
pub(crate) struct LedgerService {}

impl LedgerService {
    pub(crate) fn new() -> LedgerService {
        LedgerService {}
    }

    pub(crate) fn build_nym_request(
        &self,
        identifier: &DidValue,
        dest: &DidValue,
        verkey: Option<&str>,
        alias: Option<&str>,
        role: Option<&str>,
    ) -> IndyResult<String> {
        trace!(
            "build_nym_request >>> identifier: {:?}, dest: {:?}, verkey: {:?}, alias: {:?}, role: {:?}",
            identifier,
            dest,
            verkey,
            alias,
            role
        );

        let role = match role {
            Some(role) => {
                let code = role_to_code(role).ok_or_else(|| {
                    err_msg(
                        IndyErrorKind::InvalidStructure,
                        format!("Invalid role: {}", role),
                    )
                })?;

                Some(code.map_or(Value::Null, |code| Value::String(code.to_string())))
            }
            None => None,
        };

        let operation = NymOperation::new(
            dest.to_short(),
            verkey.map(String::from),
            alias.map(String::from),
            role,
        );

        let res = Request::build_request(Some(identifier.to_short()), operation)?;

        trace!("build_nym_request <<< res: {:?}", res);

        Ok(res)
    }

    pub(crate) fn build_get_nym_request(
        &self,
        identifier: Option<&DidValue>,
        dest: &DidValue,
    ) -> IndyResult<String> {
        trace!(
            "build_get_nym_request >>> identifier: {:?}, dest: {:?}",
            identifier,
            dest
        );

        let operation = GetNymOperation::new(dest.to_short());
        let res = Request::build_request(self._read_identifier(identifier), operation)?;

        trace!("build_get_nym_request <<< res: {:?}", res);

        Ok(res)
    }

    pub(crate) fn parse_get_nym_response(&self, get_nym_response: &str) -> IndyResult<String> {
        trace!(
            "parse_get_nym_response >>> get_nym_response: {:?}",
            get_nym_response
        );

        let reply: GetNymReplyResult = parse_response(get_nym_response)?.result();

        let data = reply.data.ok_or_else(|| {
            err_msg(IndyErrorKind::LedgerItemNotFound, "Nym not found")
        })?;

        let data: GetNymResultData = serde_json::from_str(&data).to_indy(
            IndyErrorKind::InvalidState,
            "Invalid nym data in GET_NYM response",
        )?;

        let nym = NymData {
            did: data.dest,
            verkey: data.verkey,
            role: data.role,
        };

        let res = serde_json::to_string(&nym)
            .to_indy(IndyErrorKind::InvalidState, "Cannot serialize NYM data")?;

        trace!("parse_get_nym_response <<< res: {:?}", res);

        Ok(res)
    }

    /// One of `hash`, `raw` or `enc` must be given.
    pub(crate) fn build_attrib_request(
        &self,
        identifier: &DidValue,
        dest: &DidValue,
        hash: Option<&str>,
        raw: Option<&Value>,
        enc: Option<&str>,
    ) -> IndyResult<String> {
        trace!(
            "build_attrib_request >>> identifier: {:?}, dest: {:?}, hash: {:?}, raw: {:?}, enc: {:?}",
            identifier,
            dest,
            hash,
            raw,
            enc
        );

        if hash.is_none() && raw.is_none() && enc.is_none() {
            return Err(err_msg(
                IndyErrorKind::InvalidStructure,
                "Either raw or hash or enc must be specified",
            ));
        }

        let raw = raw
            .map(serde_json::to_string)
            .transpose()
            .to_indy(IndyErrorKind::InvalidState, "Cannot serialize raw attribute")?;

        let operation = AttribOperation::new(
            dest.to_short(),
            hash.map(String::from),
            raw,
            enc.map(String::from),
        );

        let res = Request::build_request(Some(identifier.to_short()), operation)?;

        trace!("build_attrib_request <<< res: {:?}", res);

        Ok(res)
    }

    /// Exactly one of `raw`, `hash` or `enc` must be given.
    pub(crate) fn build_get_attrib_request(
        &self,
        identifier: Option<&DidValue>,
        dest: &DidValue,
        raw: Option<&str>,
        hash: Option<&str>,
        enc: Option<&str>,
    ) -> IndyResult<String> {
        trace!(
            "build_get_attrib_request >>> identifier: {:?}, dest: {:?}, raw: {:?}, hash: {:?}, enc: {:?}",
            identifier,
            dest,
            raw,
            hash,
            enc
        );

        let given = [raw, hash, enc].iter().filter(|field| field.is_some()).count();

        if given != 1 {
            return Err(err_msg(
                IndyErrorKind::InvalidStructure,
                "Exactly one of raw, hash or enc must be specified",
            ));
        }

        let operation = GetAttribOperation::new(dest.to_short(), raw, hash, enc);
        let res = Request::build_request(self._read_identifier(identifier), operation)?;

        trace!("build_get_attrib_request <<< res: {:?}", res);

        Ok(res)
    }

    /// Returns the raw attribute json stored on the ledger.
    pub(crate) fn parse_get_attrib_response(&self, get_attrib_response: &str) -> IndyResult<String> {
        trace!(
            "parse_get_attrib_response >>> get_attrib_response: {:?}",
            get_attrib_response
        );

        let reply: GetAttribReplyResult = parse_response(get_attrib_response)?.result();

        let res = reply.data.ok_or_else(|| {
            err_msg(IndyErrorKind::LedgerItemNotFound, "Attribute not found")
        })?;

        trace!("parse_get_attrib_response <<< res: {:?}", res);

        Ok(res)
    }

    pub(crate) fn build_schema_request(
        &self,
        identifier: &DidValue,
        schema: Schema,
    ) -> IndyResult<String> {
        trace!(
            "build_schema_request >>> identifier: {:?}, schema: {:?}",
            identifier,
            schema
        );

        let schema = SchemaV1::from(schema);
        schema.validate()?;

        let operation = SchemaOperation::new(SchemaOperationData::from(schema));
        let res = Request::build_request(Some(identifier.to_short()), operation)?;

        trace!("build_schema_request <<< res: {:?}", res);

        Ok(res)
    }

    pub(crate) fn build_get_schema_request(
        &self,
        identifier: Option<&DidValue>,
        id: &SchemaId,
    ) -> IndyResult<String> {
        trace!(
            "build_get_schema_request >>> identifier: {:?}, id: {:?}",
            identifier,
            id
        );

        let (dest, name, version) = id.parts().ok_or_else(|| {
            err_msg(
                IndyErrorKind::InvalidStructure,
                format!("Schema ID `{}` cannot be used to build request: invalid number of parts", id.0),
            )
        })?;

        let operation =
            GetSchemaOperation::new(dest.to_short(), GetSchemaOperationData::new(name, version));

        let res = Request::build_request(self._read_identifier(identifier), operation)?;

        trace!("build_get_schema_request <<< res: {:?}", res);

        Ok(res)
    }

    /// Returns `(schema_id, schema_json)`.
    pub(crate) fn parse_get_schema_response(
        &self,
        get_schema_response: &str,
    ) -> IndyResult<(String, String)> {
        trace!(
            "parse_get_schema_response >>> get_schema_response: {:?}",
            get_schema_response
        );

        let reply: GetSchemaReplyResult = parse_response(get_schema_response)?.result();

        let data = reply.data.ok_or_else(|| {
            err_msg(IndyErrorKind::LedgerItemNotFound, "Schema not found")
        })?;

        let attr_names = data.attr_names.ok_or_else(|| {
            err_msg(IndyErrorKind::LedgerItemNotFound, "Schema not found")
        })?;

        let id = SchemaId::new(&DidValue(reply.dest.0), &data.name, &data.version);

        let schema = Schema::SchemaV1(SchemaV1 {
            id: id.clone(),
            name: data.name,
            version: data.version,
            attr_names,
            seq_no: reply.seq_no,
        });

        let res = (id.0, self._serialize(&schema, "Schema")?);

        trace!("parse_get_schema_response <<< res: {:?}", res);

        Ok(res)
    }

    pub(crate) fn build_cred_def_request(
        &self,
        identifier: &DidValue,
        cred_def: CredentialDefinition,
    ) -> IndyResult<String> {
        trace!(
            "build_cred_def_request >>> identifier: {:?}, cred_def: {:?}",
            identifier,
            cred_def
        );

        let cred_def = CredentialDefinitionV1::from(cred_def);

        let schema_ref = cred_def.schema_id.0.parse::<i32>().to_indy(
            IndyErrorKind::InvalidStructure,
            "Schema Id must be the sequence number of the schema transaction",
        )?;

        let operation = CredDefOperation::new(schema_ref, cred_def);
        let res = Request::build_request(Some(identifier.to_short()), operation)?;

        trace!("build_cred_def_request <<< res: {:?}", res);

        Ok(res)
    }

    pub(crate) fn build_get_cred_def_request(
        &self,
        identifier: Option<&DidValue>,
        id: &CredentialDefinitionId,
    ) -> IndyResult<String> {
        trace!(
            "build_get_cred_def_request >>> identifier: {:?}, id: {:?}",
            identifier,
            id
        );

        let (origin, signature_type, schema_id, tag) = id.parts().ok_or_else(|| {
            err_msg(
                IndyErrorKind::InvalidStructure,
                format!("Credential Definition ID `{}` cannot be used to build request: invalid number of parts", id.0),
            )
        })?;

        let schema_ref = schema_id.0.parse::<i32>().to_indy(
            IndyErrorKind::InvalidStructure,
            "Schema ID is not a number",
        )?;

        let tag = if tag.is_empty() { None } else { Some(tag) };

        let operation =
            GetCredDefOperation::new(schema_ref, signature_type, origin.to_short(), tag);

        let res = Request::build_request(self._read_identifier(identifier), operation)?;

        trace!("build_get_cred_def_request <<< res: {:?}", res);

        Ok(res)
    }

    /// Returns `(cred_def_id, cred_def_json)`.
    pub(crate) fn parse_get_cred_def_response(
        &self,
        get_cred_def_response: &str,
    ) -> IndyResult<(String, String)> {
        trace!(
            "parse_get_cred_def_response >>> get_cred_def_response: {:?}",
            get_cred_def_response
        );

        let reply: GetCredDefReplyResult = parse_response(get_cred_def_response)?.result();

        let value = reply.data.ok_or_else(|| {
            err_msg(
                IndyErrorKind::LedgerItemNotFound,
                "Credential Definition not found",
            )
        })?;

        let schema_id = SchemaId(reply._ref.to_string());
        let tag = reply.tag.unwrap_or_default();

        let id = CredentialDefinitionId::new(
            &DidValue(reply.origin.0),
            &schema_id,
            &reply.signature_type,
            &tag,
        );

        let cred_def = CredentialDefinition::CredentialDefinitionV1(CredentialDefinitionV1 {
            id: id.clone(),
            schema_id,
            signature_type: reply.signature_type,
            tag,
            value,
        });

        let res = (id.0, self._serialize(&cred_def, "CredentialDefinition")?);

        trace!("parse_get_cred_def_response <<< res: {:?}", res);

        Ok(res)
    }

    pub(crate) fn build_get_revoc_reg_def_request(
        &self,
        identifier: Option<&DidValue>,
        id: &RevocationRegistryId,
    ) -> IndyResult<String> {
        trace!(
            "build_get_revoc_reg_def_request >>> identifier: {:?}, id: {:?}",
            identifier,
            id
        );

        id.validate()?;

        let operation = GetRevRegDefOperation::new(&id.to_unqualified());
        let res = Request::build_request(self._read_identifier(identifier), operation)?;

        trace!("build_get_revoc_reg_def_request <<< res: {:?}", res);

        Ok(res)
    }

    /// Returns `(rev_reg_def_id, rev_reg_def_json)`.
    pub(crate) fn parse_get_revoc_reg_def_response(
        &self,
        get_revoc_reg_def_response: &str,
    ) -> IndyResult<(String, String)> {
        trace!(
            "parse_get_revoc_reg_def_response >>> get_revoc_reg_def_response: {:?}",
            get_revoc_reg_def_response
        );

        let reply: GetRevocRegDefReplyResult =
            parse_response(get_revoc_reg_def_response)?.result();

        let mut data = match reply.data {
            Some(Value::Object(data)) => data,
            _ => {
                return Err(err_msg(
                    IndyErrorKind::LedgerItemNotFound,
                    "Revocation Registry Definition not found",
                ))
            }
        };

        let id = data
            .get("id")
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| {
                err_msg(
                    IndyErrorKind::InvalidStructure,
                    "Revocation Registry Definition has no id",
                )
            })?;

        data.insert("ver".to_string(), Value::String("1.0".to_string()));

        let res = (id, Value::Object(data).to_string());

        trace!("parse_get_revoc_reg_def_response <<< res: {:?}", res);

        Ok(res)
    }

    pub(crate) fn build_get_txn_request(
        &self,
        identifier: Option<&DidValue>,
        ledger_type: Option<&str>,
        seq_no: i32,
    ) -> IndyResult<String> {
        trace!(
            "build_get_txn_request >>> identifier: {:?}, ledger_type: {:?}, seq_no: {:?}",
            identifier,
            ledger_type,
            seq_no
        );

        if seq_no <= 0 {
            return Err(err_msg(
                IndyErrorKind::InvalidStructure,
                "Transaction sequence number must be greater than 0",
            ));
        }

        let ledger_id = LedgerType::parse_id(ledger_type)?;

        let operation = GetTxnOperation::new(seq_no, ledger_id);
        let res = Request::build_request(self._read_identifier(identifier), operation)?;

        trace!("build_get_txn_request <<< res: {:?}", res);

        Ok(res)
    }

    /// Returns the canonical bytes covered by the request signature along
    /// with the parsed request.
    pub(crate) fn get_txn_bytes_to_sign(&self, request: &str) -> IndyResult<(Vec<u8>, Value)> {
        trace!("get_txn_bytes_to_sign >>> request: {:?}", request);

        let request: Value = serde_json::from_str(request)
            .to_indy(IndyErrorKind::InvalidStructure, "Request is invalid json")?;

        if !request.is_object() {
            return Err(err_msg(
                IndyErrorKind::InvalidStructure,
                "Request is not an object",
            ));
        }

        let txn_type = request["operation"]["type"].as_str().map(String::from);
        let serialized = serialize_signature(&request, true, txn_type.as_deref());

        trace!("get_txn_bytes_to_sign <<< serialized: {:?}", serialized);

        Ok((serialized.into_bytes(), request))
    }

    /// Reads go out under the library's default DID when no submitter is set.
    fn _read_identifier(&self, identifier: Option<&DidValue>) -> Option<ShortDidValue> {
        Some(
            identifier
                .map(DidValue::to_short)
                .unwrap_or_else(|| ShortDidValue(DEFAULT_LIBINDY_DID.to_string())),
        )
    }

    fn _serialize<T: serde::Serialize>(&self, entity: &T, name: &str) -> IndyResult<String> {
        serde_json::to_string(entity).to_indy(
            IndyErrorKind::InvalidState,
            format!("Cannot serialize {}", name),
        )
    }
}

fn serialize_signature(value: &Value, is_top_level: bool, txn_type: Option<&str>) -> String {
    match value {
        Value::Bool(value) => (if *value { "True" } else { "False" }).to_string(),
        Value::Number(value) => value.to_string(),
        Value::String(value) => value.to_string(),
        Value::Array(values) => values
            .iter()
            .map(|value| serialize_signature(value, false, txn_type))
            .collect::<Vec<String>>()
            .join(","),
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            keys.into_iter()
                .filter(|key| {
                    !(is_top_level
                        && (*key == "signature" || *key == "signatures" || *key == "fees"))
                })
                .map(|key| {
                    let value = &map[key];
                    let hashed = matches!(txn_type, Some(ATTRIB) | Some(GET_ATTR))
                        && (key == "raw" || key == "hash" || key == "enc");

                    let value = match value.as_str() {
                        Some(value) if hashed => sha256(value.as_bytes()).encode_hex::<String>(),
                        _ => serialize_signature(value, false, txn_type),
                    };

                    format!("{}:{}", key, value)
                })
                .collect::<Vec<String>>()
                .join("|")
        }
        Value::Null => "None".to_string(),
    }
}
