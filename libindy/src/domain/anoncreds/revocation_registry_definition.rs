use indy_api_types::errors::prelude::*;

use super::credential_definition::CredentialDefinitionId;
use crate::utils::qualifier;

pub const REV_REG_DEG_MARKER: &str = "4";

qualifiable_type!(RevocationRegistryId);

impl RevocationRegistryId {
    pub const PREFIX: &'static str = "revreg";
    pub const DELIMITER: &'static str = ":";

    /// `(issuer_did, cred_def_id, revocation_type, tag)`.
    pub fn parts(&self) -> Option<(String, CredentialDefinitionId, String, String)> {
        let unqualified = qualifier::to_unqualified_deep(&self.0);
        let parts: Vec<&str> = unqualified.split_terminator(Self::DELIMITER).collect();

        match parts.as_slice() {
            [did, marker, cred_def @ .., revocation_type, tag]
                if *marker == REV_REG_DEG_MARKER && cred_def.len() >= 4 =>
            {
                let cred_def_id = CredentialDefinitionId(cred_def.join(Self::DELIMITER));
                cred_def_id.parts()?;
                Some((
                    did.to_string(),
                    cred_def_id,
                    revocation_type.to_string(),
                    tag.to_string(),
                ))
            }
            _ => None,
        }
    }

    pub fn to_unqualified(&self) -> RevocationRegistryId {
        RevocationRegistryId(qualifier::to_unqualified_deep(&self.0))
    }

    pub fn validate(&self) -> IndyResult<()> {
        self.parts().map(|_| ()).ok_or_else(|| {
            err_msg(
                IndyErrorKind::InvalidStructure,
                format!(
                    "RevocationRegistryId validation failed: {:?}, doesn't match pattern",
                    self.0
                ),
            )
        })
    }
}
