use hmac::{Hmac, Mac};
use indy_api_types::errors::prelude::*;
use sha2::Sha256;

use super::randombytes::randombytes_array;

pub const KEYBYTES: usize = 32;
pub const TAGBYTES: usize = 32;

fixed_bytes!(Key, KEYBYTES);
fixed_bytes!(Tag, TAGBYTES);

type HmacSha256 = Hmac<Sha256>;

pub fn gen_key() -> Key {
    Key(randombytes_array())
}

pub fn authenticate(data: &[u8], key: &Key) -> IndyResult<Tag> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(&key.0)
        .to_indy(IndyErrorKind::InvalidState, "Invalid HMAC key")?;
    mac.update(data);

    Tag::from_slice(&mac.finalize().into_bytes())
}
