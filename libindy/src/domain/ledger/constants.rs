pub const NODE: &str = "0";
pub const NYM: &str = "1";
pub const GET_TXN: &str = "3";
pub const ATTRIB: &str = "100";
pub const SCHEMA: &str = "101";
pub const CRED_DEF: &str = "102";
pub const GET_ATTR: &str = "104";
pub const GET_NYM: &str = "105";
pub const GET_SCHEMA: &str = "107";
pub const GET_CRED_DEF: &str = "108";
pub const REVOC_REG_DEF: &str = "113";
pub const GET_REVOC_REG_DEF: &str = "115";

pub const READ_REQUESTS: [&str; 6] = [
    GET_TXN,
    GET_ATTR,
    GET_NYM,
    GET_SCHEMA,
    GET_CRED_DEF,
    GET_REVOC_REG_DEF,
];

pub const TRUSTEE: &str = "0";
pub const STEWARD: &str = "2";
pub const ENDORSER: &str = "101";
pub const NETWORK_MONITOR: &str = "201";
pub const ROLE_REMOVE: &str = "";

pub const POOL_LEDGER_ID: i32 = 0;
pub const DOMAIN_LEDGER_ID: i32 = 1;
pub const CONFIG_LEDGER_ID: i32 = 2;

/// Submitter used for read requests built without an identifier.
pub const DEFAULT_LIBINDY_DID: &str = "LibindyDid111111111111";

pub const DEFAULT_PROTOCOL_VERSION: usize = 2;
pub const SUPPORTED_PROTOCOL_VERSIONS: [usize; 2] = [1, 2];

pub fn is_read_request(txn_type: &str) -> bool {
    READ_REQUESTS.contains(&txn_type)
}

/// Maps a role name (or its numeric code) to the code written to the ledger.
/// `Some("")` clears the role and becomes `null` on the wire.
pub fn role_to_code(role: &str) -> Option<Option<&'static str>> {
    match role {
        "TRUSTEE" | TRUSTEE => Some(Some(TRUSTEE)),
        "STEWARD" | STEWARD => Some(Some(STEWARD)),
        "TRUST_ANCHOR" | "ENDORSER" | ENDORSER => Some(Some(ENDORSER)),
        "NETWORK_MONITOR" | NETWORK_MONITOR => Some(Some(NETWORK_MONITOR)),
        ROLE_REMOVE => Some(None),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_names_and_codes_are_accepted() {
        assert_eq!(role_to_code("TRUSTEE"), Some(Some(TRUSTEE)));
        assert_eq!(role_to_code("TRUST_ANCHOR"), Some(Some(ENDORSER)));
        assert_eq!(role_to_code("101"), Some(Some(ENDORSER)));
        assert_eq!(role_to_code(""), Some(None));
        assert_eq!(role_to_code("KING"), None);
    }

    #[test]
    fn reads_are_recognised() {
        assert!(is_read_request(GET_NYM));
        assert!(!is_read_request(NYM));
    }
}
