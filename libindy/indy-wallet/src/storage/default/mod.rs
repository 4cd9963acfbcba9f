use std::{
    collections::{HashMap, VecDeque},
    fs,
    path::PathBuf,
};

use async_trait::async_trait;
use indy_api_types::errors::prelude::*;
use indy_utils::environment;
use log::LevelFilter;
use serde::Deserialize;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    ConnectOptions, Connection, SqlitePool,
};

use crate::{
    language,
    storage::{StorageIterator, StorageRecord, Tag, TagName, WalletStorage, WalletStorageType},
    wallet::EncryptedValue,
    RecordOptions, SearchOptions,
};

mod query;

const _SQLITE_DB: &str = "sqlite.db";

const _CREATE_SCHEMA: [&str; 11] = [
    "CREATE TABLE metadata (
        id INTEGER NOT NULL,
        value NOT NULL,
        PRIMARY KEY(id)
    )",
    "CREATE TABLE items(
        id INTEGER NOT NULL,
        type NOT NULL,
        name NOT NULL,
        value NOT NULL,
        key NOT NULL,
        PRIMARY KEY(id)
    )",
    "CREATE UNIQUE INDEX ux_items_type_name ON items(type, name)",
    "CREATE TABLE tags_encrypted(
        name NOT NULL,
        value NOT NULL,
        item_id INTEGER NOT NULL,
        PRIMARY KEY(name, item_id),
        FOREIGN KEY(item_id)
            REFERENCES items(id)
            ON DELETE CASCADE
            ON UPDATE CASCADE
    )",
    "CREATE INDEX ix_tags_encrypted_name ON tags_encrypted(name)",
    "CREATE INDEX ix_tags_encrypted_value ON tags_encrypted(value)",
    "CREATE INDEX ix_tags_encrypted_item_id ON tags_encrypted(item_id)",
    "CREATE TABLE tags_plaintext(
        name NOT NULL,
        value NOT NULL,
        item_id INTEGER NOT NULL,
        PRIMARY KEY(name, item_id),
        FOREIGN KEY(item_id)
            REFERENCES items(id)
            ON DELETE CASCADE
            ON UPDATE CASCADE
    )",
    "CREATE INDEX ix_tags_plaintext_name ON tags_plaintext(name)",
    "CREATE INDEX ix_tags_plaintext_value ON tags_plaintext(value)",
    "CREATE INDEX ix_tags_plaintext_item_id ON tags_plaintext(item_id)",
];

struct SQLiteStorageIterator {
    records: Option<VecDeque<StorageRecord>>,
    total_count: Option<usize>,
}

impl SQLiteStorageIterator {
    fn new(
        records: Option<VecDeque<StorageRecord>>,
        total_count: Option<usize>,
    ) -> SQLiteStorageIterator {
        SQLiteStorageIterator {
            records,
            total_count,
        }
    }
}

#[async_trait]
impl StorageIterator for SQLiteStorageIterator {
    async fn next(&mut self) -> IndyResult<Option<StorageRecord>> {
        if let Some(ref mut records) = self.records {
            Ok(records.pop_front())
        } else {
            Ok(None)
        }
    }

    fn get_total_count(&self) -> IndyResult<Option<usize>> {
        Ok(self.total_count.to_owned())
    }
}

#[derive(Deserialize, Debug)]
struct Config {
    path: Option<String>,
}

#[derive(Debug)]
struct SQLiteStorage {
    pool: SqlitePool,
}

#[derive(Default)]
pub struct SQLiteStorageType {}

impl SQLiteStorageType {
    pub fn new() -> SQLiteStorageType {
        SQLiteStorageType {}
    }

    fn _parse_config(config: Option<&str>) -> IndyResult<Option<Config>> {
        config
            .map(serde_json::from_str::<Config>)
            .transpose()
            .to_indy(IndyErrorKind::InvalidStructure, "Malformed config json")
    }

    fn _db_path(id: &str, config: Option<&Config>) -> PathBuf {
        let mut path = match config {
            Some(Config {
                path: Some(ref path),
            }) => PathBuf::from(path),
            _ => environment::wallet_home_path(),
        };

        path.push(id);
        path.push(_SQLITE_DB);
        path
    }

    fn _db_dir(db_path: &std::path::Path) -> IndyResult<&std::path::Path> {
        db_path.parent().ok_or_else(|| {
            err_msg(
                IndyErrorKind::InvalidState,
                format!("Wallet database path has no parent: {db_path:?}"),
            )
        })
    }

    async fn _init_schema(db_path: &std::path::Path, metadata: &[u8]) -> IndyResult<()> {
        let mut conn = SqliteConnectOptions::default()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .log_statements(LevelFilter::Debug)
            .connect()
            .await?;

        let mut tx = conn.begin().await?;

        for statement in _CREATE_SCHEMA {
            sqlx::query(statement).execute(&mut *tx).await?;
        }

        sqlx::query("INSERT INTO metadata(value) VALUES (?1)")
            .bind(metadata)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        conn.close().await?;
        Ok(())
    }
}

fn _group_tags(tags: Vec<(i64, Tag)>) -> HashMap<i64, Vec<Tag>> {
    let mut mtags = HashMap::new();

    for (k, v) in tags {
        mtags.entry(k).or_insert_with(Vec::new).push(v)
    }

    mtags
}

#[async_trait]
impl WalletStorage for SQLiteStorage {
    /// Fetches an item with the parts requested by `options`.
    ///
    /// Fails with `WalletItemNotFound` when no item with this type and id exists.
    async fn get(
        &self,
        type_: &[u8],
        id: &[u8],
        options: &RecordOptions,
    ) -> IndyResult<StorageRecord> {
        let mut conn = self.pool.acquire().await?;

        let (item_id, value, key): (i64, Vec<u8>, Vec<u8>) =
            sqlx::query_as("SELECT id, value, key FROM items where type = ?1 AND name = ?2")
                .bind(type_)
                .bind(id)
                .fetch_one(&mut *conn)
                .await?;

        let value = if options.retrieve_value {
            Some(EncryptedValue::new(value, key))
        } else {
            None
        };

        let type_ = if options.retrieve_type {
            Some(type_.to_vec())
        } else {
            None
        };

        let tags = if options.retrieve_tags {
            let mut tags = Vec::new();

            tags.extend(
                sqlx::query_as::<_, (Vec<u8>, String)>(
                    "SELECT name, value from tags_plaintext where item_id = ?",
                )
                .bind(item_id)
                .fetch_all(&mut *conn)
                .await?
                .drain(..)
                .map(|r| Tag::PlainText(r.0, r.1)),
            );

            tags.extend(
                sqlx::query_as::<_, (Vec<u8>, Vec<u8>)>(
                    "SELECT name, value from tags_encrypted where item_id = ?",
                )
                .bind(item_id)
                .fetch_all(&mut *conn)
                .await?
                .drain(..)
                .map(|r| Tag::Encrypted(r.0, r.1)),
            );

            Some(tags)
        } else {
            None
        };

        Ok(StorageRecord::new(id.to_vec(), value, type_, tags))
    }

    /// Inserts an item and its tags in one transaction.
    ///
    /// Fails with `WalletItemAlreadyExists` when the (type, id) pair is taken.
    async fn add(
        &self,
        type_: &[u8],
        id: &[u8],
        value: &EncryptedValue,
        tags: &[Tag],
    ) -> IndyResult<()> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query("INSERT INTO items (type, name, value, key) VALUES (?1, ?2, ?3, ?4)")
            .bind(type_)
            .bind(id)
            .bind(&value.data)
            .bind(&value.key)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

        for tag in tags {
            match *tag {
                Tag::Encrypted(ref tag_name, ref tag_data) => {
                    sqlx::query(
                        "INSERT INTO tags_encrypted (item_id, name, value) VALUES (?1, ?2, ?3)",
                    )
                    .bind(id)
                    .bind(tag_name)
                    .bind(tag_data)
                    .execute(&mut *tx)
                    .await?
                }
                Tag::PlainText(ref tag_name, ref tag_data) => {
                    sqlx::query(
                        "INSERT INTO tags_plaintext (item_id, name, value) VALUES (?1, ?2, ?3)",
                    )
                    .bind(id)
                    .bind(tag_name)
                    .bind(tag_data)
                    .execute(&mut *tx)
                    .await?
                }
            };
        }

        tx.commit().await?;
        Ok(())
    }

    async fn update(&self, type_: &[u8], id: &[u8], value: &EncryptedValue) -> IndyResult<()> {
        let mut tx = self.pool.begin().await?;

        let row_updated =
            sqlx::query("UPDATE items SET value = ?1, key = ?2 WHERE type = ?3 AND name = ?4")
                .bind(&value.data)
                .bind(&value.key)
                .bind(type_)
                .bind(id)
                .execute(&mut *tx)
                .await?
                .rows_affected();

        match row_updated {
            1 => {
                tx.commit().await?;
                Ok(())
            }
            0 => Err(err_msg(
                IndyErrorKind::WalletItemNotFound,
                "Item to update not found",
            )),
            _ => Err(err_msg(
                IndyErrorKind::InvalidState,
                "More than one row update. Seems wallet structure is inconsistent",
            )),
        }
    }

    async fn add_tags(&self, type_: &[u8], id: &[u8], tags: &[Tag]) -> IndyResult<()> {
        let mut tx = self.pool.begin().await?;

        let (item_id,): (i64,) =
            sqlx::query_as("SELECT id FROM items WHERE type = ?1 AND name = ?2")
                .bind(type_)
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        for tag in tags {
            match *tag {
                Tag::Encrypted(ref tag_name, ref tag_data) => {
                    sqlx::query(
                        "INSERT OR REPLACE INTO tags_encrypted (item_id, name, value) VALUES (?1, \
                         ?2, ?3)",
                    )
                    .bind(item_id)
                    .bind(tag_name)
                    .bind(tag_data)
                    .execute(&mut *tx)
                    .await?
                }
                Tag::PlainText(ref tag_name, ref tag_data) => {
                    sqlx::query(
                        "INSERT OR REPLACE INTO tags_plaintext (item_id, name, value) VALUES (?1, \
                         ?2, ?3)",
                    )
                    .bind(item_id)
                    .bind(tag_name)
                    .bind(tag_data)
                    .execute(&mut *tx)
                    .await?
                }
            };
        }

        tx.commit().await?;
        Ok(())
    }

    async fn update_tags(&self, type_: &[u8], id: &[u8], tags: &[Tag]) -> IndyResult<()> {
        let mut tx = self.pool.begin().await?;

        let (item_id,): (i64,) =
            sqlx::query_as("SELECT id FROM items WHERE type = ?1 AND name = ?2")
                .bind(type_)
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        sqlx::query("DELETE FROM tags_encrypted WHERE item_id = ?1")
            .bind(item_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM tags_plaintext WHERE item_id = ?1")
            .bind(item_id)
            .execute(&mut *tx)
            .await?;

        for tag in tags {
            match *tag {
                Tag::Encrypted(ref tag_name, ref tag_data) => {
                    sqlx::query(
                        "INSERT INTO tags_encrypted (item_id, name, value) VALUES (?1, ?2, ?3)",
                    )
                    .bind(item_id)
                    .bind(tag_name)
                    .bind(tag_data)
                    .execute(&mut *tx)
                    .await?
                }
                Tag::PlainText(ref tag_name, ref tag_data) => {
                    sqlx::query(
                        "INSERT INTO tags_plaintext (item_id, name, value) VALUES (?1, ?2, ?3)",
                    )
                    .bind(item_id)
                    .bind(tag_name)
                    .bind(tag_data)
                    .execute(&mut *tx)
                    .await?
                }
            };
        }

        tx.commit().await?;

        Ok(())
    }

    async fn delete_tags(&self, type_: &[u8], id: &[u8], tag_names: &[TagName]) -> IndyResult<()> {
        let mut tx = self.pool.begin().await?;

        let (item_id,): (i64,) =
            sqlx::query_as("SELECT id FROM items WHERE type = ?1 AND name = ?2")
                .bind(type_)
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        for tag_name in tag_names {
            match *tag_name {
                TagName::OfEncrypted(ref tag_name) => {
                    sqlx::query("DELETE FROM tags_encrypted WHERE item_id = ?1 AND name = ?2")
                        .bind(item_id)
                        .bind(tag_name)
                        .execute(&mut *tx)
                        .await?
                }
                TagName::OfPlain(ref tag_name) => {
                    sqlx::query("DELETE FROM tags_plaintext WHERE item_id = ?1 AND name = ?2")
                        .bind(item_id)
                        .bind(tag_name)
                        .execute(&mut *tx)
                        .await?
                }
            };
        }

        tx.commit().await?;
        Ok(())
    }

    /// Deletes an item; its tags go with it through the cascading foreign keys.
    async fn delete(&self, type_: &[u8], id: &[u8]) -> IndyResult<()> {
        let mut tx = self.pool.begin().await?;

        let rows_affected = sqlx::query("DELETE FROM items where type = ?1 AND name = ?2")
            .bind(type_)
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        match rows_affected {
            1 => {
                tx.commit().await?;
                Ok(())
            }
            0 => Err(err_msg(
                IndyErrorKind::WalletItemNotFound,
                "Item to delete not found",
            )),
            _ => Err(err_msg(
                IndyErrorKind::InvalidState,
                "More than one row deleted. Seems wallet structure is inconsistent",
            )),
        }
    }

    async fn get_storage_metadata(&self) -> IndyResult<Vec<u8>> {
        let mut conn = self.pool.acquire().await?;

        let (metadata,): (Vec<u8>,) = sqlx::query_as::<_, (Vec<u8>,)>("SELECT value FROM metadata")
            .fetch_one(&mut *conn)
            .await?;

        Ok(metadata)
    }

    async fn set_storage_metadata(&self, metadata: &[u8]) -> IndyResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE metadata SET value = ?1")
            .bind(metadata)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get_all(&self) -> IndyResult<Box<dyn StorageIterator>> {
        let mut conn = self.pool.acquire().await?;
        let mut tags: Vec<(i64, Tag)> = Vec::new();

        tags.extend(
            sqlx::query_as::<_, (i64, Vec<u8>, String)>(
                "SELECT item_id, name, value from tags_plaintext",
            )
            .fetch_all(&mut *conn)
            .await?
            .drain(..)
            .map(|r| (r.0, Tag::PlainText(r.1, r.2))),
        );

        tags.extend(
            sqlx::query_as::<_, (i64, Vec<u8>, Vec<u8>)>(
                "SELECT item_id, name, value from tags_encrypted",
            )
            .fetch_all(&mut *conn)
            .await?
            .drain(..)
            .map(|r| (r.0, Tag::Encrypted(r.1, r.2))),
        );

        let mut mtags = _group_tags(tags);

        let records: VecDeque<_> = sqlx::query_as::<_, (i64, Vec<u8>, Vec<u8>, Vec<u8>, Vec<u8>)>(
            "SELECT id, name, value, key, type FROM items",
        )
        .fetch_all(&mut *conn)
        .await?
        .drain(..)
        .map(|r| {
            StorageRecord::new(
                r.1,
                Some(EncryptedValue::new(r.2, r.3)),
                Some(r.4),
                mtags.remove(&r.0).or_else(|| Some(Vec::new())),
            )
        })
        .collect();

        let total_count = records.len();

        Ok(Box::new(SQLiteStorageIterator::new(
            Some(records),
            Some(total_count),
        )))
    }

    async fn search(
        &self,
        type_: &[u8],
        query: &language::Operator,
        options: &SearchOptions,
    ) -> IndyResult<Box<dyn StorageIterator>> {
        let mut conn = self.pool.acquire().await?;

        let records = if options.retrieve_records {
            let (query, args) = query::wql_to_sql(type_, query, None)?;

            let mut query =
                sqlx::query_as::<sqlx::Sqlite, (i64, Vec<u8>, Vec<u8>, Vec<u8>, Vec<u8>)>(&query);

            for arg in args.iter() {
                query = match arg {
                    query::ToSQL::ByteSlice(a) => query.bind(*a),
                    query::ToSQL::CharSlice(a) => query.bind(*a),
                }
            }

            let mut records = query.fetch_all(&mut *conn).await?;

            let mut mtags = if options.retrieve_tags && !records.is_empty() {
                let mut tags: Vec<(i64, Tag)> = Vec::new();

                let in_bindings = std::iter::repeat("?")
                    .take(records.len())
                    .collect::<Vec<_>>()
                    .join(",");

                let query = format!(
                    r#"
                    SELECT item_id, name, value
                    FROM tags_plaintext
                    WHERE item_id IN ({in_bindings})
                    "#
                );

                let mut query = sqlx::query_as::<sqlx::Sqlite, (i64, Vec<u8>, String)>(&query);

                for record in records.iter() {
                    query = query.bind(record.0);
                }

                tags.extend(
                    query
                        .fetch_all(&mut *conn)
                        .await?
                        .drain(..)
                        .map(|r| (r.0, Tag::PlainText(r.1, r.2))),
                );

                let query = format!(
                    r#"
                    SELECT item_id, name, value
                    FROM tags_encrypted
                    WHERE item_id IN ({in_bindings})
                    "#
                );

                let mut query = sqlx::query_as::<sqlx::Sqlite, (i64, Vec<u8>, Vec<u8>)>(&query);

                for record in records.iter() {
                    query = query.bind(record.0);
                }

                tags.extend(
                    query
                        .fetch_all(&mut *conn)
                        .await?
                        .drain(..)
                        .map(|r| (r.0, Tag::Encrypted(r.1, r.2))),
                );

                _group_tags(tags)
            } else {
                HashMap::new()
            };

            let records = records
                .drain(..)
                .map(|r| {
                    StorageRecord::new(
                        r.1,
                        if options.retrieve_value {
                            Some(EncryptedValue::new(r.2, r.3))
                        } else {
                            None
                        },
                        if options.retrieve_type {
                            Some(r.4)
                        } else {
                            None
                        },
                        if options.retrieve_tags {
                            mtags.remove(&r.0).or_else(|| Some(Vec::new()))
                        } else {
                            None
                        },
                    )
                })
                .collect();

            Some(records)
        } else {
            None
        };

        let total_count = if options.retrieve_total_count {
            let (query, args) = query::wql_to_sql_count(type_, query)?;

            let mut query = sqlx::query_as::<sqlx::Sqlite, (i64,)>(&query);

            for arg in args.iter() {
                query = match arg {
                    query::ToSQL::ByteSlice(a) => query.bind(*a),
                    query::ToSQL::CharSlice(a) => query.bind(*a),
                }
            }

            let (total_count,) = query.fetch_one(&mut *conn).await?;
            Some(total_count as usize)
        } else {
            None
        };

        Ok(Box::new(SQLiteStorageIterator::new(records, total_count)))
    }

    async fn close(&self) -> IndyResult<()> {
        self.pool.close().await;
        Ok(())
    }
}

#[async_trait]
impl WalletStorageType for SQLiteStorageType {
    /// Removes the directory holding the wallet database.
    ///
    /// Fails with `WalletNotFound` when there is no database for `id`.
    async fn delete_storage(
        &self,
        id: &str,
        config: Option<&str>,
        _credentials: Option<&str>,
    ) -> IndyResult<()> {
        let config = SQLiteStorageType::_parse_config(config)?;
        let db_file_path = SQLiteStorageType::_db_path(id, config.as_ref());

        if !db_file_path.exists() {
            return Err(err_msg(
                IndyErrorKind::WalletNotFound,
                format!("Wallet storage file isn't found: {db_file_path:?}"),
            ));
        }

        fs::remove_dir_all(SQLiteStorageType::_db_dir(&db_file_path)?)?;
        Ok(())
    }

    /// Creates `<path>/<id>/sqlite.db` with an empty schema and stores `metadata`.
    ///
    /// Fails with `WalletAlreadyExists` when the database file is already there.
    async fn create_storage(
        &self,
        id: &str,
        config: Option<&str>,
        _credentials: Option<&str>,
        metadata: &[u8],
    ) -> IndyResult<()> {
        let config = SQLiteStorageType::_parse_config(config)?;
        let db_path = SQLiteStorageType::_db_path(id, config.as_ref());

        if db_path.exists() {
            return Err(err_msg(
                IndyErrorKind::WalletAlreadyExists,
                format!("Wallet database file already exists: {db_path:?}"),
            ));
        }

        fs::DirBuilder::new()
            .recursive(true)
            .create(SQLiteStorageType::_db_dir(&db_path)?)?;

        if let Err(err) = SQLiteStorageType::_init_schema(&db_path, metadata).await {
            // leaves no half initialized wallet behind
            let _ = fs::remove_dir_all(SQLiteStorageType::_db_dir(&db_path)?);
            return Err(err.extend("Unable to initialize wallet database"));
        }

        Ok(())
    }

    async fn open_storage(
        &self,
        id: &str,
        config: Option<&str>,
        _credentials: Option<&str>,
    ) -> IndyResult<Box<dyn WalletStorage>> {
        let config = SQLiteStorageType::_parse_config(config)?;
        let db_path = SQLiteStorageType::_db_path(id, config.as_ref());

        if !db_path.exists() {
            return Err(err_msg(
                IndyErrorKind::WalletNotFound,
                "No wallet database exists",
            ));
        }

        let connect_options = SqliteConnectOptions::new()
            .filename(db_path.as_path())
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .disable_statement_logging();

        Ok(Box::new(SQLiteStorage {
            pool: SqlitePoolOptions::default()
                .min_connections(1)
                .max_connections(1)
                .max_lifetime(None)
                .connect_with(connect_options)
                .await?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::language::{Operator, TargetValue};

    fn _config(dir: &tempfile::TempDir) -> String {
        json!({ "path": dir.path() }).to_string()
    }

    async fn _storage(dir: &tempfile::TempDir) -> Box<dyn WalletStorage> {
        let storage_type = SQLiteStorageType::new();
        let config = _config(dir);

        storage_type
            .create_storage("w1", Some(&config), None, &_metadata())
            .await
            .unwrap();

        storage_type
            .open_storage("w1", Some(&config), None)
            .await
            .unwrap()
    }

    fn _metadata() -> Vec<u8> {
        vec![1, 2, 3, 4, 5, 6, 7, 8]
    }

    fn _value() -> EncryptedValue {
        EncryptedValue::new(vec![1, 2, 3], vec![4, 5, 6])
    }

    fn _tags() -> Vec<Tag> {
        vec![
            Tag::Encrypted(vec![1], vec![2]),
            Tag::PlainText(vec![3], "plain".to_string()),
        ]
    }

    #[tokio::test]
    async fn create_twice_fails_and_delete_removes() {
        let dir = tempfile::tempdir().unwrap();
        let storage_type = SQLiteStorageType::new();
        let config = _config(&dir);

        storage_type
            .create_storage("w1", Some(&config), None, &_metadata())
            .await
            .unwrap();

        let err = storage_type
            .create_storage("w1", Some(&config), None, &_metadata())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), IndyErrorKind::WalletAlreadyExists);

        storage_type
            .delete_storage("w1", Some(&config), None)
            .await
            .unwrap();

        let err = storage_type
            .open_storage("w1", Some(&config), None)
            .await
            .err()
            .unwrap();
        assert_eq!(err.kind(), IndyErrorKind::WalletNotFound);
    }

    #[tokio::test]
    async fn metadata_is_stored_and_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let storage = _storage(&dir).await;

        assert_eq!(storage.get_storage_metadata().await.unwrap(), _metadata());

        storage.set_storage_metadata(&[9, 9]).await.unwrap();
        assert_eq!(storage.get_storage_metadata().await.unwrap(), vec![9, 9]);
    }

    #[tokio::test]
    async fn add_get_update_delete_item() {
        let dir = tempfile::tempdir().unwrap();
        let storage = _storage(&dir).await;

        storage.add(b"t", b"id", &_value(), &_tags()).await.unwrap();

        let err = storage
            .add(b"t", b"id", &_value(), &_tags())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), IndyErrorKind::WalletItemAlreadyExists);

        let record = storage
            .get(b"t", b"id", &RecordOptions::full())
            .await
            .unwrap();
        assert_eq!(record.value, Some(_value()));
        assert_eq!(record.type_, Some(b"t".to_vec()));
        assert_eq!(record.tags.map(|tags| tags.len()), Some(2));

        let new_value = EncryptedValue::new(vec![7], vec![8]);
        storage.update(b"t", b"id", &new_value).await.unwrap();
        let record = storage
            .get(b"t", b"id", &RecordOptions::id_value())
            .await
            .unwrap();
        assert_eq!(record.value, Some(new_value));
        assert_eq!(record.tags, None);

        storage.delete(b"t", b"id").await.unwrap();
        let err = storage
            .get(b"t", b"id", &RecordOptions::id())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), IndyErrorKind::WalletItemNotFound);

        let err = storage.delete(b"t", b"id").await.unwrap_err();
        assert_eq!(err.kind(), IndyErrorKind::WalletItemNotFound);
    }

    #[tokio::test]
    async fn tags_are_added_replaced_and_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let storage = _storage(&dir).await;

        storage.add(b"t", b"id", &_value(), &_tags()).await.unwrap();

        storage
            .add_tags(b"t", b"id", &[Tag::Encrypted(vec![1], vec![5])])
            .await
            .unwrap();
        let tags = storage
            .get(b"t", b"id", &RecordOptions::id_value_tags())
            .await
            .unwrap()
            .tags
            .unwrap();
        assert!(tags.contains(&Tag::Encrypted(vec![1], vec![5])));
        assert_eq!(tags.len(), 2);

        storage
            .delete_tags(b"t", b"id", &[TagName::OfPlain(vec![3])])
            .await
            .unwrap();
        let tags = storage
            .get(b"t", b"id", &RecordOptions::id_value_tags())
            .await
            .unwrap()
            .tags
            .unwrap();
        assert_eq!(tags, vec![Tag::Encrypted(vec![1], vec![5])]);

        storage
            .update_tags(b"t", b"id", &[Tag::PlainText(vec![4], "x".to_string())])
            .await
            .unwrap();
        let tags = storage
            .get(b"t", b"id", &RecordOptions::id_value_tags())
            .await
            .unwrap()
            .tags
            .unwrap();
        assert_eq!(tags, vec![Tag::PlainText(vec![4], "x".to_string())]);
    }

    #[tokio::test]
    async fn search_by_tags_and_count() {
        let dir = tempfile::tempdir().unwrap();
        let storage = _storage(&dir).await;

        storage.add(b"t", b"id1", &_value(), &_tags()).await.unwrap();
        storage
            .add(
                b"t",
                b"id2",
                &_value(),
                &[Tag::PlainText(vec![3], "other".to_string())],
            )
            .await
            .unwrap();
        storage.add(b"other", b"id3", &_value(), &_tags()).await.unwrap();

        let query = Operator::Eq(
            language::TagName::PlainTagName(vec![3]),
            TargetValue::Unencrypted("plain".to_string()),
        );
        let mut iterator = storage
            .search(b"t", &query, &SearchOptions::full())
            .await
            .unwrap();

        assert_eq!(iterator.get_total_count().unwrap(), Some(1));
        let record = iterator.next().await.unwrap().unwrap();
        assert_eq!(record.id, b"id1".to_vec());
        assert!(iterator.next().await.unwrap().is_none());

        let iterator = storage
            .search(b"t", &Operator::And(vec![]), &SearchOptions::full())
            .await
            .unwrap();
        assert_eq!(iterator.get_total_count().unwrap(), Some(2));

        let mut iterator = storage
            .search(b"t", &Operator::Or(vec![]), &SearchOptions::full())
            .await
            .unwrap();
        assert_eq!(iterator.get_total_count().unwrap(), Some(0));
        assert!(iterator.next().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn get_all_returns_every_item() {
        let dir = tempfile::tempdir().unwrap();
        let storage = _storage(&dir).await;

        storage.add(b"t1", b"id1", &_value(), &_tags()).await.unwrap();
        storage.add(b"t2", b"id2", &_value(), &[]).await.unwrap();

        let mut iterator = storage.get_all().await.unwrap();
        assert_eq!(iterator.get_total_count().unwrap(), Some(2));

        let mut seen = Vec::new();
        while let Some(record) = iterator.next().await.unwrap() {
            seen.push((record.type_.unwrap(), record.tags.unwrap().len()));
        }
        seen.sort();
        assert_eq!(seen, vec![(b"t1".to_vec(), 2), (b"t2".to_vec(), 0)]);
    }
}
