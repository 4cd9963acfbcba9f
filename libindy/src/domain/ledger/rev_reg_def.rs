use serde_json::Value;

use super::{constants::GET_REVOC_REG_DEF, response::ReplyType};
use crate::domain::anoncreds::revocation_registry_definition::RevocationRegistryId;

#[derive(Serialize, PartialEq, Debug)]
pub struct GetRevRegDefOperation {
    #[serde(rename = "type")]
    pub _type: String,
    pub id: RevocationRegistryId,
}

impl GetRevRegDefOperation {
    pub fn new(id: &RevocationRegistryId) -> GetRevRegDefOperation {
        GetRevRegDefOperation {
            _type: GET_REVOC_REG_DEF.to_string(),
            id: id.clone(),
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GetRevocRegDefReplyResult {
    pub seq_no: Option<u64>,
    pub data: Option<Value>,
}

impl ReplyType for GetRevocRegDefReplyResult {
    fn get_type<'a>() -> &'a str {
        GET_REVOC_REG_DEF
    }
}
