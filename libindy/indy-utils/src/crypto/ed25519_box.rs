use crypto_box::{
    aead::{generic_array::GenericArray, Aead},
    SalsaBox,
};
use indy_api_types::errors::prelude::*;

use super::randombytes::randombytes_array;

pub const PUBLICKEYBYTES: usize = 32;
pub const SECRETKEYBYTES: usize = 32;
pub const NONCEBYTES: usize = 24;

fixed_bytes!(PublicKey, PUBLICKEYBYTES);
fixed_bytes!(SecretKey, SECRETKEYBYTES);
fixed_bytes!(Nonce, NONCEBYTES);

fn salsa_box(secret_key: &SecretKey, public_key: &PublicKey) -> SalsaBox {
    SalsaBox::new(
        &crypto_box::PublicKey::from(public_key.0),
        &crypto_box::SecretKey::from(secret_key.0),
    )
}

pub fn gen_nonce() -> Nonce {
    Nonce(randombytes_array())
}

pub fn public_key_from_secret(secret_key: &SecretKey) -> PublicKey {
    PublicKey(*crypto_box::SecretKey::from(secret_key.0).public_key().as_bytes())
}

pub fn encrypt(
    secret_key: &SecretKey,
    public_key: &PublicKey,
    doc: &[u8],
    nonce: &Nonce,
) -> IndyResult<Vec<u8>> {
    salsa_box(secret_key, public_key)
        .encrypt(GenericArray::from_slice(&nonce.0), doc)
        .to_indy(IndyErrorKind::InvalidState, "Unable to encrypt data")
}

pub fn decrypt(
    secret_key: &SecretKey,
    public_key: &PublicKey,
    doc: &[u8],
    nonce: &Nonce,
) -> IndyResult<Vec<u8>> {
    salsa_box(secret_key, public_key)
        .decrypt(GenericArray::from_slice(&nonce.0), doc)
        .to_indy(IndyErrorKind::InvalidStructure, "Unable to decrypt data")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gen_keys() -> (PublicKey, SecretKey) {
        let sk = SecretKey(randombytes_array());
        (public_key_from_secret(&sk), sk)
    }

    #[test]
    fn encrypt_then_decrypt() {
        let (alice_pk, alice_sk) = gen_keys();
        let (bob_pk, bob_sk) = gen_keys();
        let nonce = gen_nonce();

        let encrypted = encrypt(&alice_sk, &bob_pk, b"hello", &nonce).unwrap();
        let decrypted = decrypt(&bob_sk, &alice_pk, &encrypted, &nonce).unwrap();

        assert_eq!(decrypted, b"hello");
    }

    #[test]
    fn decrypt_with_other_nonce_fails() {
        let (alice_pk, alice_sk) = gen_keys();
        let (bob_pk, bob_sk) = gen_keys();

        let encrypted = encrypt(&alice_sk, &bob_pk, b"hello", &gen_nonce()).unwrap();
        assert!(decrypt(&bob_sk, &alice_pk, &encrypted, &gen_nonce()).is_err());
    }
}
