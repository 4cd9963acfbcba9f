use async_trait::async_trait;
use indy_api_types::errors::prelude::*;

use crate::{language, wallet::EncryptedValue, RecordOptions, SearchOptions};

pub mod default;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tag {
    Encrypted(Vec<u8>, Vec<u8>),
    PlainText(Vec<u8>, String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TagName {
    OfEncrypted(Vec<u8>),
    OfPlain(Vec<u8>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageRecord {
    pub id: Vec<u8>,
    pub value: Option<EncryptedValue>,
    pub type_: Option<Vec<u8>>,
    pub tags: Option<Vec<Tag>>,
}

impl StorageRecord {
    pub fn new(
        id: Vec<u8>,
        value: Option<EncryptedValue>,
        type_: Option<Vec<u8>>,
        tags: Option<Vec<Tag>>,
    ) -> Self {
        Self {
            id,
            value,
            type_,
            tags,
        }
    }
}

#[async_trait]
pub trait StorageIterator: Send + Sync {
    async fn next(&mut self) -> IndyResult<Option<StorageRecord>>;
    fn get_total_count(&self) -> IndyResult<Option<usize>>;
}

/// Encrypted item store. Every argument except plaintext tag values is
/// already encrypted by the wallet.
#[async_trait]
pub trait WalletStorage: Send + Sync {
    async fn get(&self, type_: &[u8], id: &[u8], options: &RecordOptions)
        -> IndyResult<StorageRecord>;
    async fn add(
        &self,
        type_: &[u8],
        id: &[u8],
        value: &EncryptedValue,
        tags: &[Tag],
    ) -> IndyResult<()>;
    async fn update(&self, type_: &[u8], id: &[u8], value: &EncryptedValue) -> IndyResult<()>;
    async fn add_tags(&self, type_: &[u8], id: &[u8], tags: &[Tag]) -> IndyResult<()>;
    async fn update_tags(&self, type_: &[u8], id: &[u8], tags: &[Tag]) -> IndyResult<()>;
    async fn delete_tags(&self, type_: &[u8], id: &[u8], tag_names: &[TagName]) -> IndyResult<()>;
    async fn delete(&self, type_: &[u8], id: &[u8]) -> IndyResult<()>;
    async fn get_storage_metadata(&self) -> IndyResult<Vec<u8>>;
    async fn set_storage_metadata(&self, metadata: &[u8]) -> IndyResult<()>;
    async fn get_all(&self) -> IndyResult<Box<dyn StorageIterator>>;

    async fn search(
        &self,
        type_: &[u8],
        query: &language::Operator,
        options: &SearchOptions,
    ) -> IndyResult<Box<dyn StorageIterator>>;

    async fn close(&self) -> IndyResult<()>;
}

#[async_trait]
pub trait WalletStorageType: Send + Sync {
    async fn create_storage(
        &self,
        id: &str,
        config: Option<&str>,
        credentials: Option<&str>,
        metadata: &[u8],
    ) -> IndyResult<()>;

    async fn open_storage(
        &self,
        id: &str,
        config: Option<&str>,
        credentials: Option<&str>,
    ) -> IndyResult<Box<dyn WalletStorage>>;

    async fn delete_storage(
        &self,
        id: &str,
        config: Option<&str>,
        credentials: Option<&str>,
    ) -> IndyResult<()>;
}
