use std::collections::HashMap;

use indy_api_types::{domain::wallet::Tags, errors::prelude::*};
use indy_utils::wql::Query;

use super::{credential_definition::CredentialDefinitionId, schema::SchemaId};

/// Summary of a stored credential returned by prover lookups.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct CredentialInfo {
    pub referent: String,
    pub attrs: HashMap<String, String>,
    pub schema_id: String,
    pub cred_def_id: String,
    pub rev_reg_id: Option<String>,
    pub cred_rev_id: Option<String>,
}

/// Equality filter over the tags of stored credentials. Every given field
/// must match.
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq, Eq)]
pub struct Filter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_issuer_did: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer_did: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cred_def_id: Option<String>,
}

impl Filter {
    pub fn to_query(&self) -> Query {
        let fields = [
            ("schema_id", &self.schema_id),
            ("schema_issuer_did", &self.schema_issuer_did),
            ("schema_name", &self.schema_name),
            ("schema_version", &self.schema_version),
            ("issuer_did", &self.issuer_did),
            ("cred_def_id", &self.cred_def_id),
        ];

        Query::And(
            fields
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .as_ref()
                        .map(|value| Query::Eq(name.to_string(), value.to_string()))
                })
                .collect(),
        )
    }
}

pub fn attr_common_view(attr: &str) -> String {
    attr.replace(' ', "").to_lowercase()
}

/// Tags used to filter and search stored credentials.
pub fn build_credential_tags<'a>(
    schema_id: &str,
    cred_def_id: &str,
    rev_reg_id: Option<&str>,
    raw_values: impl Iterator<Item = (&'a String, &'a String)>,
) -> IndyResult<Tags> {
    let (schema_issuer_did, schema_name, schema_version) = SchemaId(schema_id.to_string())
        .parts()
        .ok_or_else(|| {
            err_msg(
                IndyErrorKind::InvalidStructure,
                format!("Invalid Schema ID `{}`: wrong number of parts", schema_id),
            )
        })?;

    let (issuer_did, _, _, _) = CredentialDefinitionId(cred_def_id.to_string())
        .parts()
        .ok_or_else(|| {
            err_msg(
                IndyErrorKind::InvalidStructure,
                format!("Invalid Credential Definition ID `{}`: wrong number of parts", cred_def_id),
            )
        })?;

    let mut tags = Tags::new();

    tags.insert("schema_id".to_string(), schema_id.to_string());
    tags.insert("schema_issuer_did".to_string(), schema_issuer_did.0);
    tags.insert("schema_name".to_string(), schema_name);
    tags.insert("schema_version".to_string(), schema_version);
    tags.insert("issuer_did".to_string(), issuer_did.0);
    tags.insert("cred_def_id".to_string(), cred_def_id.to_string());

    if let Some(rev_reg_id) = rev_reg_id {
        tags.insert("rev_reg_id".to_string(), rev_reg_id.to_string());
    }

    for (attr, raw) in raw_values {
        let attr = attr_common_view(attr);
        tags.insert(format!("attr::{}::marker", attr), "1".to_string());
        tags.insert(format!("attr::{}::value", attr), raw.clone());
    }

    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_cover_ids_and_normalised_attributes() {
        let values: HashMap<String, String> = [
            ("First Name".to_string(), "Alex".to_string()),
            ("age".to_string(), "28".to_string()),
        ]
        .into_iter()
        .collect();

        let tags = build_credential_tags(
            "NcYxiDXkpYi6ov5FcYDi1e:2:gvt:1.0",
            "VsKV7grR1BUE29mG2Fm2kX:3:CL:1:tag",
            None,
            values.iter(),
        )
        .unwrap();

        assert_eq!(tags["schema_issuer_did"], "NcYxiDXkpYi6ov5FcYDi1e");
        assert_eq!(tags["schema_name"], "gvt");
        assert_eq!(tags["schema_version"], "1.0");
        assert_eq!(tags["issuer_did"], "VsKV7grR1BUE29mG2Fm2kX");
        assert_eq!(tags["attr::firstname::value"], "Alex");
        assert_eq!(tags["attr::firstname::marker"], "1");
        assert_eq!(tags["attr::age::value"], "28");
        assert!(!tags.contains_key("rev_reg_id"));
    }

    #[test]
    fn filter_matches_given_fields_only() {
        let filter = Filter {
            schema_name: Some("gvt".to_string()),
            issuer_did: Some("VsKV7grR1BUE29mG2Fm2kX".to_string()),
            ..Filter::default()
        };

        assert_eq!(
            filter.to_query(),
            Query::And(vec![
                Query::Eq("schema_name".to_string(), "gvt".to_string()),
                Query::Eq("issuer_did".to_string(), "VsKV7grR1BUE29mG2Fm2kX".to_string()),
            ])
        );
        assert_eq!(Filter::default().to_query(), Query::And(vec![]));
    }

    #[test]
    fn malformed_schema_id_is_rejected() {
        let err = build_credential_tags(
            "gvt:1.0",
            "VsKV7grR1BUE29mG2Fm2kX:3:CL:1:tag",
            None,
            std::iter::empty(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), IndyErrorKind::InvalidStructure);
    }
}
