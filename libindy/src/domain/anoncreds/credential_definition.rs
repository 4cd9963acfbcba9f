use indy_api_types::errors::prelude::*;
use serde_json::Value;

use super::schema::SchemaId;
use crate::{domain::crypto::did::DidValue, utils::qualifier};

pub const CL_SIGNATURE_TYPE: &str = "CL";
pub const CRED_DEF_MARKER: &str = "3";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialDefinitionV1 {
    pub id: CredentialDefinitionId,
    pub schema_id: SchemaId,
    #[serde(rename = "type")]
    pub signature_type: String,
    pub tag: String,
    pub value: Value,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "ver")]
pub enum CredentialDefinition {
    #[serde(rename = "1.0")]
    CredentialDefinitionV1(CredentialDefinitionV1),
}

impl From<CredentialDefinition> for CredentialDefinitionV1 {
    fn from(cred_def: CredentialDefinition) -> Self {
        match cred_def {
            CredentialDefinition::CredentialDefinitionV1(cred_def) => cred_def,
        }
    }
}

qualifiable_type!(CredentialDefinitionId);

impl CredentialDefinitionId {
    pub const PREFIX: &'static str = "creddef";
    pub const DELIMITER: &'static str = ":";

    pub fn new(
        did: &DidValue,
        schema_id: &SchemaId,
        signature_type: &str,
        tag: &str,
    ) -> CredentialDefinitionId {
        let tag = if tag.is_empty() {
            String::new()
        } else {
            format!("{}{}", Self::DELIMITER, tag)
        };

        let id = format!(
            "{}{delim}{}{delim}{}{delim}{}{}",
            did.to_unqualified().0,
            CRED_DEF_MARKER,
            signature_type,
            schema_id.to_unqualified().0,
            tag,
            delim = Self::DELIMITER
        );

        match did.get_method() {
            Some(method) => CredentialDefinitionId(id).set_method(&method),
            None => CredentialDefinitionId(id),
        }
    }

    /// `(issuer_did, signature_type, schema_id, tag)`. The schema reference is
    /// either a sequence number or a full legacy schema id.
    pub fn parts(&self) -> Option<(DidValue, String, SchemaId, String)> {
        let unqualified = qualifier::to_unqualified_deep(&self.0);
        let parts: Vec<&str> = unqualified.split_terminator(Self::DELIMITER).collect();

        match parts.as_slice() {
            [did, marker, signature_type, schema_id] if *marker == CRED_DEF_MARKER => Some((
                DidValue(did.to_string()),
                signature_type.to_string(),
                SchemaId(schema_id.to_string()),
                String::new(),
            )),
            [did, marker, signature_type, schema_id, tag] if *marker == CRED_DEF_MARKER => Some((
                DidValue(did.to_string()),
                signature_type.to_string(),
                SchemaId(schema_id.to_string()),
                tag.to_string(),
            )),
            [did, marker, signature_type, schema @ ..]
                if *marker == CRED_DEF_MARKER && (schema.len() == 4 || schema.len() == 5) =>
            {
                let schema_id = SchemaId(schema[..4].join(Self::DELIMITER));
                schema_id.parts()?;
                Some((
                    DidValue(did.to_string()),
                    signature_type.to_string(),
                    schema_id,
                    schema.get(4).map(|tag| tag.to_string()).unwrap_or_default(),
                ))
            }
            _ => None,
        }
    }

    pub fn to_unqualified(&self) -> CredentialDefinitionId {
        CredentialDefinitionId(qualifier::to_unqualified_deep(&self.0))
    }

    pub fn validate(&self) -> IndyResult<()> {
        self.parts().map(|_| ()).ok_or_else(|| {
            err_msg(
                IndyErrorKind::InvalidStructure,
                format!(
                    "CredentialDefinitionId validation failed: {:?}, doesn't match pattern",
                    self.0
                ),
            )
        })
    }
}
