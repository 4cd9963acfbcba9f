use std::collections::HashSet;

use super::{
    constants::{GET_SCHEMA, SCHEMA},
    response::ReplyType,
};
use crate::domain::{anoncreds::schema::SchemaV1, crypto::did::ShortDidValue};

#[derive(Serialize, PartialEq, Debug, Deserialize)]
pub struct SchemaOperationData {
    pub name: String,
    pub version: String,
    pub attr_names: HashSet<String>,
}

impl SchemaOperationData {
    pub fn new(name: String, version: String, attr_names: HashSet<String>) -> SchemaOperationData {
        SchemaOperationData {
            name,
            version,
            attr_names,
        }
    }
}

#[derive(Serialize, PartialEq, Debug)]
pub struct SchemaOperation {
    #[serde(rename = "type")]
    pub _type: String,
    pub data: SchemaOperationData,
}

impl SchemaOperation {
    pub fn new(data: SchemaOperationData) -> SchemaOperation {
        SchemaOperation {
            data,
            _type: SCHEMA.to_string(),
        }
    }
}

impl From<SchemaV1> for SchemaOperationData {
    fn from(schema: SchemaV1) -> Self {
        SchemaOperationData::new(schema.name, schema.version, schema.attr_names)
    }
}

#[derive(Serialize, PartialEq, Debug)]
pub struct GetSchemaOperationData {
    pub name: String,
    pub version: String,
}

impl GetSchemaOperationData {
    pub fn new(name: String, version: String) -> GetSchemaOperationData {
        GetSchemaOperationData { name, version }
    }
}

#[derive(Serialize, PartialEq, Debug)]
pub struct GetSchemaOperation {
    #[serde(rename = "type")]
    pub _type: String,
    pub dest: ShortDidValue,
    pub data: GetSchemaOperationData,
}

impl GetSchemaOperation {
    pub fn new(dest: ShortDidValue, data: GetSchemaOperationData) -> GetSchemaOperation {
        GetSchemaOperation {
            _type: GET_SCHEMA.to_string(),
            dest,
            data,
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GetSchemaReplyResult {
    pub seq_no: Option<u32>,
    pub data: Option<GetSchemaResultData>,
    pub dest: ShortDidValue,
}

impl ReplyType for GetSchemaReplyResult {
    fn get_type<'a>() -> &'a str {
        GET_SCHEMA
    }
}

/// A missing schema comes back with `name` and `version` but no attributes.
#[derive(Deserialize, Debug)]
pub struct GetSchemaResultData {
    pub name: String,
    pub version: String,
    pub attr_names: Option<HashSet<String>>,
}
