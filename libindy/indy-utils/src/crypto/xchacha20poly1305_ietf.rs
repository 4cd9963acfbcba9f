use chacha20poly1305::{
    aead::{AeadInPlace, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use indy_api_types::errors::prelude::*;

use super::randombytes::randombytes_array;

pub const KEYBYTES: usize = 32;
pub const NONCEBYTES: usize = 24;
pub const TAGBYTES: usize = 16;

fixed_bytes!(Key, KEYBYTES);
fixed_bytes!(Nonce, NONCEBYTES);
fixed_bytes!(Tag, TAGBYTES);

fn cipher(key: &Key) -> XChaCha20Poly1305 {
    XChaCha20Poly1305::new(chacha20poly1305::Key::from_slice(&key.0))
}

pub fn gen_key() -> Key {
    Key(randombytes_array())
}

pub fn gen_nonce() -> Nonce {
    Nonce(randombytes_array())
}

pub fn encrypt_detached(
    data: &[u8],
    key: &Key,
    nonce: &Nonce,
    ad: Option<&[u8]>,
) -> IndyResult<(Vec<u8>, Tag)> {
    let mut encrypted = data.to_vec();

    let tag = cipher(key)
        .encrypt_in_place_detached(
            XNonce::from_slice(&nonce.0),
            ad.unwrap_or(&[]),
            &mut encrypted,
        )
        .to_indy(IndyErrorKind::InvalidState, "Unable to encrypt data")?;

    Ok((encrypted, Tag::from_slice(tag.as_slice())?))
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
            XNonce::from_slice(&nonce.0),
            ad.unwrap_or(&[]),
            &mut plain,
            chacha20poly1305::Tag::from_slice(&tag.0),
        )
        .to_indy(IndyErrorKind::InvalidStructure, "Unable to decrypt data")?;

    Ok(plain)
}
