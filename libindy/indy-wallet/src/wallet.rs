use std::{collections::HashMap, sync::Arc};

use indy_api_types::errors::prelude::*;
use indy_utils::{
    crypto::{chacha20poly1305_ietf, hmacsha256},
    wql::Query,
};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::{
    cache::wallet_cache::WalletCache,
    encryption::*,
    iterator::WalletIterator,
    query_encryption::encrypt_query,
    storage,
    storage::StorageRecord,
    RecordOptions, SearchOptions, WalletRecord,
};

/// The seven item keys. Stored msgpack encoded and encrypted with the
/// master key in the storage metadata.
#[derive(Serialize, Deserialize)]
pub(super) struct Keys {
    pub type_key: chacha20poly1305_ietf::Key,
    pub name_key: chacha20poly1305_ietf::Key,
    pub value_key: chacha20poly1305_ietf::Key,
    pub item_hmac_key: hmacsha256::Key,
    pub tag_name_key: chacha20poly1305_ietf::Key,
    pub tag_value_key: chacha20poly1305_ietf::Key,
    pub tags_hmac_key: hmacsha256::Key,
}

impl Keys {
    pub fn new() -> Keys {
        Keys {
            type_key: chacha20poly1305_ietf::gen_key(),
            name_key: chacha20poly1305_ietf::gen_key(),
            value_key: chacha20poly1305_ietf::gen_key(),
            item_hmac_key: hmacsha256::gen_key(),
            tag_name_key: chacha20poly1305_ietf::gen_key(),
            tag_value_key: chacha20poly1305_ietf::gen_key(),
            tags_hmac_key: hmacsha256::gen_key(),
        }
    }

    pub fn serialize_encrypted(
        &self,
        master_key: &chacha20poly1305_ietf::Key,
    ) -> IndyResult<Vec<u8>> {
        let mut serialized = rmp_serde::to_vec(self)
            .to_indy(IndyErrorKind::InvalidState, "Unable to serialize keys")?;

        let encrypted = encrypt_as_not_searchable(&serialized, master_key);

        serialized.zeroize();
        encrypted
    }

    /// A wrong master key shows up here as `WalletAccessFailed`.
    pub fn deserialize_encrypted(
        bytes: &[u8],
        master_key: &chacha20poly1305_ietf::Key,
    ) -> IndyResult<Keys> {
        let mut decrypted = decrypt_merged(bytes, master_key).map_err(|err| {
            err.map(
                IndyErrorKind::WalletAccessFailed,
                "Invalid master key provided",
            )
        })?;

        let keys: Keys = rmp_serde::from_slice(&decrypted)
            .to_indy(IndyErrorKind::InvalidState, "Invalid bytes for Key")?;

        decrypted.zeroize();
        Ok(keys)
    }
}

/// Value encrypted with a fresh per-item key, plus that key wrapped with
/// the wallet `value_key`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedValue {
    pub data: Vec<u8>,
    pub key: Vec<u8>,
}

impl EncryptedValue {
    pub fn new(data: Vec<u8>, key: Vec<u8>) -> Self {
        Self { data, key }
    }

    pub fn encrypt(data: &str, key: &chacha20poly1305_ietf::Key) -> IndyResult<Self> {
        let value_key = chacha20poly1305_ietf::gen_key();
        Ok(EncryptedValue::new(
            encrypt_as_not_searchable(data.as_bytes(), &value_key)?,
            encrypt_as_not_searchable(value_key.as_bytes(), key)?,
        ))
    }

    pub fn decrypt(&self, key: &chacha20poly1305_ietf::Key) -> IndyResult<String> {
        let mut value_key_bytes = decrypt_merged(&self.key, key)?;

        let value_key = chacha20poly1305_ietf::Key::from_slice(&value_key_bytes)
            .map_err(|err| err.extend("Invalid value key"))?;

        value_key_bytes.zeroize();

        let res = String::from_utf8(decrypt_merged(&self.data, &value_key)?).to_indy(
            IndyErrorKind::WalletEncodingError,
            "Invalid UTF8 string inside of value",
        )?;

        Ok(res)
    }
}

pub(super) struct Wallet {
    id: String,
    storage: Box<dyn storage::WalletStorage>,
    keys: Arc<Keys>,
    cache: WalletCache,
}

impl Wallet {
    pub fn new(
        id: String,
        storage: Box<dyn storage::WalletStorage>,
        keys: Arc<Keys>,
        cache: WalletCache,
    ) -> Wallet {
        Wallet {
            id,
            storage,
            keys,
            cache,
        }
    }

    fn encrypt_type(&self, type_: &str) -> IndyResult<Vec<u8>> {
        encrypt_as_searchable(
            type_.as_bytes(),
            &self.keys.type_key,
            &self.keys.item_hmac_key,
        )
    }

    fn encrypt_name(&self, name: &str) -> IndyResult<Vec<u8>> {
        encrypt_as_searchable(
            name.as_bytes(),
            &self.keys.name_key,
            &self.keys.item_hmac_key,
        )
    }

    fn encrypt_tags(&self, tags: &HashMap<String, String>) -> IndyResult<Vec<storage::Tag>> {
        encrypt_tags(
            tags,
            &self.keys.tag_name_key,
            &self.keys.tag_value_key,
            &self.keys.tags_hmac_key,
        )
    }

    pub async fn add(
        &self,
        type_: &str,
        name: &str,
        value: &str,
        tags: &HashMap<String, String>,
        cache_record: bool,
    ) -> IndyResult<()> {
        let etype = self.encrypt_type(type_)?;
        let ename = self.encrypt_name(name)?;
        let evalue = EncryptedValue::encrypt(value, &self.keys.value_key)?;
        let etags = self.encrypt_tags(tags)?;

        self.storage.add(&etype, &ename, &evalue, &etags).await?;
        if cache_record {
            self.cache.add(type_, &etype, &ename, &evalue, &etags);
        }

        Ok(())
    }

    pub async fn add_tags(
        &self,
        type_: &str,
        name: &str,
        tags: &HashMap<String, String>,
    ) -> IndyResult<()> {
        let encrypted_type = self.encrypt_type(type_)?;
        let encrypted_name = self.encrypt_name(name)?;
        let encrypted_tags = self.encrypt_tags(tags)?;

        self.storage
            .add_tags(&encrypted_type, &encrypted_name, &encrypted_tags)
            .await?;
        self.cache
            .add_tags(type_, &encrypted_type, &encrypted_name, &encrypted_tags);

        Ok(())
    }

    pub async fn update_tags(
        &self,
        type_: &str,
        name: &str,
        tags: &HashMap<String, String>,
    ) -> IndyResult<()> {
        let encrypted_type = self.encrypt_type(type_)?;
        let encrypted_name = self.encrypt_name(name)?;
        let encrypted_tags = self.encrypt_tags(tags)?;

        self.storage
            .update_tags(&encrypted_type, &encrypted_name, &encrypted_tags)
            .await?;
        self.cache
            .update_tags(type_, &encrypted_type, &encrypted_name, &encrypted_tags);

        Ok(())
    }

    pub async fn delete_tags(&self, type_: &str, name: &str, tag_names: &[&str]) -> IndyResult<()> {
        let encrypted_type = self.encrypt_type(type_)?;
        let encrypted_name = self.encrypt_name(name)?;

        let encrypted_tag_names =
            encrypt_tag_names(tag_names, &self.keys.tag_name_key, &self.keys.tags_hmac_key)?;

        self.storage
            .delete_tags(&encrypted_type, &encrypted_name, &encrypted_tag_names[..])
            .await?;
        self.cache.delete_tags(
            type_,
            &encrypted_type,
            &encrypted_name,
            &encrypted_tag_names[..],
        );

        Ok(())
    }

    pub async fn update(&self, type_: &str, name: &str, new_value: &str) -> IndyResult<()> {
        let encrypted_type = self.encrypt_type(type_)?;
        let encrypted_name = self.encrypt_name(name)?;
        let encrypted_value = EncryptedValue::encrypt(new_value, &self.keys.value_key)?;

        self.storage
            .update(&encrypted_type, &encrypted_name, &encrypted_value)
            .await?;
        self.cache
            .update(type_, &encrypted_type, &encrypted_name, &encrypted_value);

        Ok(())
    }

    pub async fn get(
        &self,
        type_: &str,
        name: &str,
        options: &RecordOptions,
    ) -> IndyResult<WalletRecord> {
        let etype = self.encrypt_type(type_)?;
        let ename = self.encrypt_name(name)?;

        let result = if self.cache.is_type_cacheable(type_) {
            match self.cache.get(type_, &etype, &ename, options) {
                Some(result) => result,
                None => {
                    // not cached yet, fetch everything so the cache entry is complete
                    let full_options = RecordOptions {
                        retrieve_type: options.retrieve_type,
                        retrieve_value: true,
                        retrieve_tags: true,
                    };

                    let full_result = self.storage.get(&etype, &ename, &full_options).await?;

                    if let (Some(evalue), Some(etags)) = (&full_result.value, &full_result.tags) {
                        self.cache.add(type_, &etype, &ename, evalue, etags);
                    }

                    StorageRecord {
                        id: full_result.id,
                        type_: if options.retrieve_type {
                            Some(etype)
                        } else {
                            None
                        },
                        value: if options.retrieve_value {
                            full_result.value
                        } else {
                            None
                        },
                        tags: if options.retrieve_tags {
                            full_result.tags
                        } else {
                            None
                        },
                    }
                }
            }
        } else {
            self.storage.get(&etype, &ename, options).await?
        };

        let value = match result.value {
            None => None,
            Some(encrypted_value) => Some(encrypted_value.decrypt(&self.keys.value_key)?),
        };

        let tags = decrypt_tags(
            &result.tags,
            &self.keys.tag_name_key,
            &self.keys.tag_value_key,
        )?;

        Ok(WalletRecord::new(
            String::from(name),
            result.type_.map(|_| type_.to_string()),
            value,
            tags,
        ))
    }

    pub async fn delete(&self, type_: &str, name: &str) -> IndyResult<()> {
        let etype = self.encrypt_type(type_)?;
        let ename = self.encrypt_name(name)?;

        self.storage.delete(&etype, &ename).await?;
        self.cache.delete(type_, &etype, &ename);

        Ok(())
    }

    pub async fn search(
        &self,
        type_: &str,
        query: Query,
        options: &SearchOptions,
    ) -> IndyResult<WalletIterator> {
        let encrypted_query = encrypt_query(query, &self.keys)?;
        let encrypted_type_ = self.encrypt_type(type_)?;

        let storage_iterator = self
            .storage
            .search(&encrypted_type_, &encrypted_query, options)
            .await?;

        let wallet_iterator = WalletIterator::new(storage_iterator, Arc::clone(&self.keys));

        Ok(wallet_iterator)
    }

    pub async fn close(&self) -> IndyResult<()> {
        self.storage.close().await
    }

    pub async fn get_all(&self) -> IndyResult<WalletIterator> {
        let all_items = self.storage.get_all().await?;
        Ok(WalletIterator::new(all_items, self.keys.clone()))
    }

    pub fn get_id(&self) -> &str {
        &self.id
    }

    pub fn cache(&self) -> &WalletCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_survive_master_key_encryption() {
        let master_key = chacha20poly1305_ietf::gen_key();
        let keys = Keys::new();

        let encrypted = keys.serialize_encrypted(&master_key).unwrap();
        let decrypted = Keys::deserialize_encrypted(&encrypted, &master_key).unwrap();

        assert_eq!(decrypted.value_key, keys.value_key);
        assert_eq!(decrypted.tags_hmac_key, keys.tags_hmac_key);
    }

    #[test]
    fn wrong_master_key_is_access_failure() {
        let keys = Keys::new();
        let encrypted = keys
            .serialize_encrypted(&chacha20poly1305_ietf::gen_key())
            .unwrap();

        let err = Keys::deserialize_encrypted(&encrypted, &chacha20poly1305_ietf::gen_key())
            .err()
            .unwrap();
        assert_eq!(err.kind(), IndyErrorKind::WalletAccessFailed);
    }

    #[test]
    fn value_uses_fresh_item_key() {
        let key = chacha20poly1305_ietf::gen_key();

        let first = EncryptedValue::encrypt("value", &key).unwrap();
        let second = EncryptedValue::encrypt("value", &key).unwrap();

        assert_ne!(first.key, second.key);
        assert_eq!(first.decrypt(&key).unwrap(), "value");
        assert_eq!(second.decrypt(&key).unwrap(), "value");
    }
}
