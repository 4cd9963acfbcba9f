use serde_json::Value;

use super::{
    constants::{CRED_DEF, GET_CRED_DEF},
    response::ReplyType,
};
use crate::domain::{anoncreds::credential_definition::CredentialDefinitionV1, crypto::did::ShortDidValue};

#[derive(Serialize, Debug)]
pub struct CredDefOperation {
    #[serde(rename = "ref")]
    pub _ref: i32,
    pub data: Value,
    #[serde(rename = "type")]
    pub _type: String,
    pub signature_type: String,
    pub tag: String,
}

impl CredDefOperation {
    pub fn new(_ref: i32, data: CredentialDefinitionV1) -> CredDefOperation {
        CredDefOperation {
            _ref,
            signature_type: data.signature_type,
            data: data.value,
            tag: data.tag,
            _type: CRED_DEF.to_string(),
        }
    }
}

#[derive(Serialize, PartialEq, Debug)]
pub struct GetCredDefOperation {
    #[serde(rename = "type")]
    pub _type: String,
    #[serde(rename = "ref")]
    pub _ref: i32,
    pub signature_type: String,
    pub origin: ShortDidValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl GetCredDefOperation {
    pub fn new(
        _ref: i32,
        signature_type: String,
        origin: ShortDidValue,
        tag: Option<String>,
    ) -> GetCredDefOperation {
        GetCredDefOperation {
            _type: GET_CRED_DEF.to_string(),
            _ref,
            signature_type,
            origin,
            tag,
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GetCredDefReplyResult {
    #[serde(rename = "ref")]
    pub _ref: u64,
    pub seq_no: Option<u64>,
    pub signature_type: String,
    pub origin: ShortDidValue,
    pub tag: Option<String>,
    pub data: Option<Value>,
}

impl ReplyType for GetCredDefReplyResult {
    fn get_type<'a>() -> &'a str {
        GET_CRED_DEF
    }
}
