use indy_api_types::errors::prelude::*;

use super::constants::{CONFIG_LEDGER_ID, DOMAIN_LEDGER_ID, GET_TXN, POOL_LEDGER_ID};

#[derive(Serialize, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GetTxnOperation {
    #[serde(rename = "type")]
    pub _type: String,
    pub data: i32,
    pub ledger_id: i32,
}

impl GetTxnOperation {
    pub fn new(data: i32, ledger_id: i32) -> GetTxnOperation {
        GetTxnOperation {
            _type: GET_TXN.to_string(),
            data,
            ledger_id,
        }
    }
}

#[derive(Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
pub enum LedgerType {
    POOL,
    DOMAIN,
    CONFIG,
}

impl LedgerType {
    pub fn to_id(&self) -> i32 {
        match *self {
            LedgerType::POOL => POOL_LEDGER_ID,
            LedgerType::DOMAIN => DOMAIN_LEDGER_ID,
            LedgerType::CONFIG => CONFIG_LEDGER_ID,
        }
    }

    /// Accepts a ledger name or a raw numeric ledger id.
    pub fn parse_id(ledger_type: Option<&str>) -> IndyResult<i32> {
        match ledger_type {
            None | Some("DOMAIN") => Ok(LedgerType::DOMAIN.to_id()),
            Some("POOL") => Ok(LedgerType::POOL.to_id()),
            Some("CONFIG") => Ok(LedgerType::CONFIG.to_id()),
            Some(other) => other.parse::<i32>().to_indy(
                IndyErrorKind::InvalidStructure,
                format!("Invalid Ledger type: {}", other),
            ),
        }
    }
}
