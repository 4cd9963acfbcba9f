use std::collections::HashSet;

use indy_api_types::errors::prelude::*;

use crate::{
    domain::crypto::did::DidValue,
    utils::qualifier,
};

pub const SCHEMA_MARKER: &str = "2";
pub const MAX_ATTRIBUTES_COUNT: usize = 125;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SchemaV1 {
    pub id: SchemaId,
    pub name: String,
    pub version: String,
    pub attr_names: HashSet<String>,
    pub seq_no: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "ver")]
pub enum Schema {
    #[serde(rename = "1.0")]
    SchemaV1(SchemaV1),
}

impl From<Schema> for SchemaV1 {
    fn from(schema: Schema) -> Self {
        match schema {
            Schema::SchemaV1(schema) => schema,
        }
    }
}

impl SchemaV1 {
    pub fn validate(&self) -> IndyResult<()> {
        if self.attr_names.is_empty() {
            return Err(err_msg(
                IndyErrorKind::InvalidStructure,
                "Empty list of Schema attributes has been passed",
            ));
        }

        if self.attr_names.len() > MAX_ATTRIBUTES_COUNT {
            return Err(err_msg(
                IndyErrorKind::InvalidStructure,
                format!(
                    "The number of Schema attributes {} cannot be greater than {}",
                    self.attr_names.len(),
                    MAX_ATTRIBUTES_COUNT
                ),
            ));
        }

        Ok(())
    }
}

qualifiable_type!(SchemaId);

impl SchemaId {
    pub const PREFIX: &'static str = "schema";
    pub const DELIMITER: &'static str = ":";

    pub fn new(did: &DidValue, name: &str, version: &str) -> SchemaId {
        let id = format!(
            "{}{delim}{}{delim}{}{delim}{}",
            did.0,
            SCHEMA_MARKER,
            name,
            version,
            delim = Self::DELIMITER
        );
        match did.get_method() {
            Some(method) => SchemaId(id).set_method(&method),
            None => SchemaId(id),
        }
    }

    /// `(issuer_did, name, version)` of a legacy or qualified id. A bare
    /// sequence number yields `None`.
    pub fn parts(&self) -> Option<(DidValue, String, String)> {
        let unqualified = qualifier::to_unqualified_deep(&self.0);
        let parts: Vec<&str> = unqualified.split_terminator(Self::DELIMITER).collect();

        match parts.as_slice() {
            [did, marker, name, version] if *marker == SCHEMA_MARKER => Some((
                DidValue(did.to_string()),
                name.to_string(),
                version.to_string(),
            )),
            _ => None,
        }
    }

    pub fn to_unqualified(&self) -> SchemaId {
        SchemaId(qualifier::to_unqualified_deep(&self.0))
    }

    pub fn validate(&self) -> IndyResult<()> {
        if self.0.parse::<i32>().is_ok() || self.parts().is_some() {
            return Ok(());
        }

        Err(err_msg(
            IndyErrorKind::InvalidStructure,
            format!("SchemaId validation failed: {:?}, doesn't match pattern", self.0),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DID: &str = "NcYxiDXkpYi6ov5FcYDi1e";

    #[test]
    fn new_builds_legacy_and_qualified_ids() {
        assert_eq!(
            SchemaId::new(&DidValue(DID.to_string()), "gvt", "1.0").0,
            "NcYxiDXkpYi6ov5FcYDi1e:2:gvt:1.0"
        );
        assert_eq!(
            SchemaId::new(&DidValue::new(DID, None, Some("sov")).unwrap(), "gvt", "1.0").0,
            "schema:sov:did:sov:NcYxiDXkpYi6ov5FcYDi1e:2:gvt:1.0"
        );
    }

    #[test]
    fn parts_of_qualified_id() {
        let (did, name, version) = SchemaId(
            "schema:sov:did:sov:NcYxiDXkpYi6ov5FcYDi1e:2:gvt:1.0".to_string(),
        )
        .parts()
        .unwrap();

        assert_eq!(did.0, DID);
        assert_eq!(name, "gvt");
        assert_eq!(version, "1.0");
    }

    #[test]
    fn validate_accepts_seq_no_and_rejects_garbage() {
        assert!(SchemaId("1".to_string()).validate().is_ok());
        assert!(SchemaId("NcYxiDXkpYi6ov5FcYDi1e:2:gvt:1.0".to_string()).validate().is_ok());
        assert!(SchemaId("NcYxiDXkpYi6ov5FcYDi1e:3:gvt".to_string()).validate().is_err());
    }
}
