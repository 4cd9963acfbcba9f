use chacha20poly1305::{
    aead::{Aead, AeadInPlace, KeyInit},
    ChaCha20Poly1305,
};
use indy_api_types::{domain::wallet::KeyDerivationMethod, errors::prelude::*};
use zeroize::Zeroize;

use super::{pwhash_argon2i13, randombytes::randombytes_array};

pub const KEYBYTES: usize = 32;
pub const NONCEBYTES: usize = 12;
pub const TAGBYTES: usize = 16;

fixed_bytes!(Key, KEYBYTES);
fixed_bytes!(Nonce, NONCEBYTES);
fixed_bytes!(Tag, TAGBYTES);

impl Nonce {
    /// Little endian increment, wrapping on overflow.
    pub fn increment(&mut self) {
        for byte in self.0.iter_mut() {
            let (value, overflow) = byte.overflowing_add(1);
            *byte = value;
            if !overflow {
                break;
            }
        }
    }
}

fn cipher(key: &Key) -> ChaCha20Poly1305 {
    ChaCha20Poly1305::new(chacha20poly1305::Key::from_slice(&key.0))
}

pub fn gen_key() -> Key {
    Key(randombytes_array())
}

pub fn derive_key(
    passphrase: &str,
    salt: &pwhash_argon2i13::Salt,
    key_derivation_method: &KeyDerivationMethod,
) -> IndyResult<Key> {
    let mut key_bytes = [0u8; KEYBYTES];

    pwhash_argon2i13::pwhash(
        &mut key_bytes,
        passphrase.as_bytes(),
        salt,
        key_derivation_method,
    )
    .map_err(|err| err.extend("Can't derive key"))?;

    let key = Key(key_bytes);
    key_bytes.zeroize();
    Ok(key)
}

pub fn gen_nonce() -> Nonce {
    Nonce(randombytes_array())
}

pub fn gen_nonce_and_encrypt(data: &[u8], key: &Key) -> IndyResult<(Vec<u8>, Nonce)> {
    let nonce = gen_nonce();
    let encrypted_data = encrypt(data, key, &nonce)?;
    Ok((encrypted_data, nonce))
}

pub fn gen_nonce_and_encrypt_detached(
    data: &[u8],
    aad: &[u8],
    key: &Key,
) -> IndyResult<(Vec<u8>, Nonce, Tag)> {
    let nonce = gen_nonce();
    let mut encrypted_data = data.to_vec();

    let tag = cipher(key)
        .encrypt_in_place_detached(
            chacha20poly1305::Nonce::from_slice(&nonce.0),
            aad,
            &mut encrypted_data,
        )
        .to_indy(IndyErrorKind::InvalidState, "Unable to encrypt data")?;

    Ok((encrypted_data, nonce, Tag::from_slice(tag.as_slice())?))
}

pub fn decrypt_detached(
    data: &[u8],
    key: &Key,
    nonce: &Nonce,
    tag: &Tag,
    ad: Option<&[u8]>,
) -> IndyResult<Vec<u8>> {
    let mut plain = data.to_vec();

    cipher(key)
        .decrypt_in_place_detached(
            chacha20poly1305::Nonce::from_slice(&nonce.0),
            ad.unwrap_or(&[]),
            &mut plain,
            chacha20poly1305::Tag::from_slice(&tag.0),
        )
        .to_indy(IndyErrorKind::InvalidStructure, "Unable to decrypt data")?;

    Ok(plain)
}

pub fn encrypt(data: &[u8], key: &Key, nonce: &Nonce) -> IndyResult<Vec<u8>> {
    cipher(key)
        .encrypt(chacha20poly1305::Nonce::from_slice(&nonce.0), data)
        .to_indy(IndyErrorKind::InvalidState, "Unable to encrypt data")
}

pub fn decrypt(data: &[u8], key: &Key, nonce: &Nonce) -> IndyResult<Vec<u8>> {
    cipher(key)
        .decrypt(chacha20poly1305::Nonce::from_slice(&nonce.0), data)
        .to_indy(IndyErrorKind::InvalidStructure, "Unable to decrypt data")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decrypt_with_wrong_key_fails() {
        let (encrypted, nonce) = gen_nonce_and_encrypt(b"1234", &gen_key()).unwrap();

        let err = decrypt(&encrypted, &gen_key(), &nonce).unwrap_err();
        assert_eq!(err.kind(), IndyErrorKind::InvalidStructure);
    }

    #[test]
    fn detached_encryption_checks_aad() {
        let key = gen_key();
        let (encrypted, nonce, tag) =
            gen_nonce_and_encrypt_detached(b"secret", b"header", &key).unwrap();

        assert_eq!(
            decrypt_detached(&encrypted, &key, &nonce, &tag, Some(b"header")).unwrap(),
            b"secret"
        );
        assert!(decrypt_detached(&encrypted, &key, &nonce, &tag, Some(b"other")).is_err());
    }

    #[test]
    fn nonce_increment_carries() {
        let mut nonce = Nonce([0xff, 0xff, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        nonce.increment();
        assert_eq!(nonce.0, [0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn derive_key_is_stable() {
        let salt = pwhash_argon2i13::gen_salt();

        let first = derive_key("key", &salt, &KeyDerivationMethod::ARGON2I_INT).unwrap();
        let second = derive_key("key", &salt, &KeyDerivationMethod::ARGON2I_INT).unwrap();
        assert_eq!(first, second);
    }
}
