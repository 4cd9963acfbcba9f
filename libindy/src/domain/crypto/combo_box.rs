use indy_api_types::errors::prelude::*;

/// Payload of an authcrypted message before it is sealed to the recipient.
#[derive(Serialize, Deserialize, Debug)]
pub struct ComboBox {
    pub msg: String,
    pub sender: String,
    pub nonce: String,
}

impl ComboBox {
    pub fn to_msg_pack(&self) -> IndyResult<Vec<u8>> {
        rmp_serde::encode::to_vec_named(self)
            .to_indy(IndyErrorKind::InvalidState, "Can't serialize ComboBox")
    }

    pub fn from_msg_pack(bytes: &[u8]) -> IndyResult<ComboBox> {
        rmp_serde::decode::from_slice(bytes)
            .to_indy(IndyErrorKind::InvalidStructure, "Can't deserialize ComboBox")
    }
}
