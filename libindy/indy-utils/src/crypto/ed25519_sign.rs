use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use indy_api_types::errors::prelude::*;
use rand::rngs::OsRng;

use super::ed25519_box;

pub const SEEDBYTES: usize = 32;
pub const PUBLICKEYBYTES: usize = 32;
pub const SECRETKEYBYTES: usize = 64;
pub const SIGNATUREBYTES: usize = 64;

fixed_bytes!(Seed, SEEDBYTES);
fixed_bytes!(PublicKey, PUBLICKEYBYTES);
fixed_bytes!(SecretKey, SECRETKEYBYTES);
fixed_bytes!(Signature, SIGNATUREBYTES);

fn signing_key(secret_key: &SecretKey) -> IndyResult<SigningKey> {
    SigningKey::from_keypair_bytes(&secret_key.0)
        .to_indy(IndyErrorKind::InvalidStructure, "Invalid signing key")
}

fn verifying_key(public_key: &PublicKey) -> IndyResult<VerifyingKey> {
    VerifyingKey::from_bytes(&public_key.0)
        .to_indy(IndyErrorKind::InvalidStructure, "Invalid verification key")
}

/// Secret key layout is seed followed by the public key.
pub fn create_key_pair_for_signature(seed: Option<&Seed>) -> IndyResult<(PublicKey, SecretKey)> {
    let signing_key = match seed {
        Some(seed) => SigningKey::from_bytes(&seed.0),
        None => SigningKey::generate(&mut OsRng),
    };

    Ok((
        PublicKey(signing_key.verifying_key().to_bytes()),
        SecretKey(signing_key.to_keypair_bytes()),
    ))
}

pub fn sign(secret_key: &SecretKey, doc: &[u8]) -> IndyResult<Signature> {
    let signature = signing_key(secret_key)?.sign(doc);
    Ok(Signature(signature.to_bytes()))
}

pub fn verify(public_key: &PublicKey, doc: &[u8], signature: &Signature) -> IndyResult<bool> {
    let signature = ed25519_dalek::Signature::from_bytes(&signature.0);
    Ok(verifying_key(public_key)?.verify(doc, &signature).is_ok())
}

pub fn sk_to_curve25519(secret_key: &SecretKey) -> IndyResult<ed25519_box::SecretKey> {
    Ok(ed25519_box::SecretKey(
        signing_key(secret_key)?.to_scalar_bytes(),
    ))
}

pub fn vk_to_curve25519(public_key: &PublicKey) -> IndyResult<ed25519_box::PublicKey> {
    Ok(ed25519_box::PublicKey(
        verifying_key(public_key)?.to_montgomery().to_bytes(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_verify() {
        let (public_key, secret_key) = create_key_pair_for_signature(None).unwrap();
        let signature = sign(&secret_key, b"message").unwrap();

        assert!(verify(&public_key, b"message", &signature).unwrap());
        assert!(!verify(&public_key, b"other message", &signature).unwrap());
    }

    #[test]
    fn seed_gives_deterministic_keys() {
        let seed = Seed([1u8; SEEDBYTES]);

        let (pk1, _) = create_key_pair_for_signature(Some(&seed)).unwrap();
        let (pk2, _) = create_key_pair_for_signature(Some(&seed)).unwrap();
        assert_eq!(pk1, pk2);
    }

    #[test]
    fn curve25519_conversion_gives_matching_keys() {
        let (public_key, secret_key) = create_key_pair_for_signature(None).unwrap();

        let curve_pk = vk_to_curve25519(&public_key).unwrap();
        let curve_sk = sk_to_curve25519(&secret_key).unwrap();

        assert_eq!(curve_pk, ed25519_box::public_key_from_secret(&curve_sk));
    }
}
