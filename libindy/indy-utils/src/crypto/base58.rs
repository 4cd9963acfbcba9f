use indy_api_types::errors::prelude::*;

pub trait ToBase58 {
    fn to_base58(&self) -> String;
}

pub trait FromBase58 {
    fn from_base58(&self) -> IndyResult<Vec<u8>>;
}

impl ToBase58 for [u8] {
    fn to_base58(&self) -> String {
        bs58::encode(self).into_string()
    }
}

impl ToBase58 for Vec<u8> {
    fn to_base58(&self) -> String {
        self.as_slice().to_base58()
    }
}

impl FromBase58 for str {
    fn from_base58(&self) -> IndyResult<Vec<u8>> {
        Ok(bs58::decode(self).into_vec()?)
    }
}

impl FromBase58 for String {
    fn from_base58(&self) -> IndyResult<Vec<u8>> {
        self.as_str().from_base58()
    }
}
