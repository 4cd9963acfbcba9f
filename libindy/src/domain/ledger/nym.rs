use serde_json::Value;

use super::{
    constants::{GET_NYM, NYM},
    response::ReplyType,
};
use crate::domain::crypto::did::ShortDidValue;

#[derive(Serialize, PartialEq, Debug)]
pub struct NymOperation {
    #[serde(rename = "type")]
    pub _type: String,
    pub dest: ShortDidValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verkey: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Value>,
}

impl NymOperation {
    pub fn new(
        dest: ShortDidValue,
        verkey: Option<String>,
        alias: Option<String>,
        role: Option<Value>,
    ) -> NymOperation {
        NymOperation {
            _type: NYM.to_string(),
            dest,
            verkey,
            alias,
            role,
        }
    }
}

#[derive(Serialize, PartialEq, Debug)]
pub struct GetNymOperation {
    #[serde(rename = "type")]
    pub _type: String,
    pub dest: ShortDidValue,
}

impl GetNymOperation {
    pub fn new(dest: ShortDidValue) -> GetNymOperation {
        GetNymOperation {
            _type: GET_NYM.to_string(),
            dest,
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GetNymReplyResult {
    pub seq_no: Option<u64>,
    pub data: Option<String>,
}

impl ReplyType for GetNymReplyResult {
    fn get_type<'a>() -> &'a str {
        GET_NYM
    }
}

#[derive(Deserialize, Eq, PartialEq, Debug)]
pub struct GetNymResultData {
    pub identifier: Option<ShortDidValue>,
    pub dest: ShortDidValue,
    pub role: Option<String>,
    pub verkey: Option<String>,
}

#[derive(Serialize, Deserialize, Eq, PartialEq, Debug)]
pub struct NymData {
    pub did: ShortDidValue,
    pub verkey: Option<String>,
    pub role: Option<String>,
}
