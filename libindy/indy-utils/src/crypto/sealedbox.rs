use indy_api_types::errors::prelude::*;
use rand::rngs::OsRng;

use super::ed25519_box;

pub fn encrypt(public_key: &ed25519_box::PublicKey, doc: &[u8]) -> IndyResult<Vec<u8>> {
    crypto_box::PublicKey::from(public_key.0)
        .seal(&mut OsRng, doc)
        .to_indy(IndyErrorKind::InvalidState, "Unable to seal data")
}

pub fn decrypt(
    _public_key: &ed25519_box::PublicKey,
    secret_key: &ed25519_box::SecretKey,
    doc: &[u8],
) -> IndyResult<Vec<u8>> {
    crypto_box::SecretKey::from(secret_key.0)
        .unseal(doc)
        .to_indy(IndyErrorKind::InvalidStructure, "Unable to open sealed box")
}
