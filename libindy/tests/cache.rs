mod utils;

use std::time::{SystemTime, UNIX_EPOCH};

use indy::{
    DidValue, GetCacheOptions, IndyErrorKind, PurgeOptions, Query, SchemaId, SearchOptions,
    Tags, INVALID_POOL_HANDLE,
};
use utils::{locator, WalletSetup, DID_TRUSTEE};

const SCHEMA_ID: &str = "V4SGRU86Z58d6TV7PBUe6f:2:gvt:1.0";
const SCHEMA_JSON: &str = r#"{"ver":"1.0","id":"V4SGRU86Z58d6TV7PBUe6f:2:gvt:1.0","name":"gvt","version":"1.0","attrNames":["name"],"seqNo":1}"#;

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

async fn store_cached_schema(setup: &WalletSetup, timestamp: u64) {
    let mut tags = Tags::new();
    tags.insert("~timestamp".to_string(), timestamp.to_string());

    locator()
        .non_secret_controller
        .add_record(
            setup.wallet_handle,
            "cache_schema".to_string(),
            SCHEMA_ID.to_string(),
            SCHEMA_JSON.to_string(),
            Some(tags),
        )
        .await
        .unwrap();
}

async fn cached_count(setup: &WalletSetup) -> usize {
    let non_secrets = &locator().non_secret_controller;

    let search_handle = non_secrets
        .open_search(
            setup.wallet_handle,
            "cache_schema".to_string(),
            Query::default(),
            SearchOptions::id_value(),
        )
        .await
        .unwrap();

    let page = non_secrets
        .fetch_search_next_records(setup.wallet_handle, search_handle, 10)
        .await
        .unwrap();

    non_secrets.close_search(search_handle).await.unwrap();

    page.records.map(|records| records.len()).unwrap_or(0)
}

async fn get_schema(setup: &WalletSetup, options: GetCacheOptions) -> Result<String, indy::IndyError> {
    locator()
        .cache_controller
        .get_schema(
            INVALID_POOL_HANDLE,
            setup.wallet_handle,
            DidValue(DID_TRUSTEE.to_string()),
            SchemaId(SCHEMA_ID.to_string()),
            options,
        )
        .await
}

mod high_cases {
    use super::*;

    #[tokio::test]
    async fn get_schema_returns_cached_value() {
        let setup = WalletSetup::new().await;

        store_cached_schema(&setup, now()).await;

        let schema = get_schema(
            &setup,
            GetCacheOptions {
                no_update: Some(true),
                ..GetCacheOptions::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(schema, SCHEMA_JSON);

        setup.close().await;
    }

    #[tokio::test]
    async fn purge_schema_cache_respects_max_age() {
        let setup = WalletSetup::new().await;

        store_cached_schema(&setup, now() - 1000).await;

        locator()
            .cache_controller
            .purge_schema_cache(
                setup.wallet_handle,
                PurgeOptions {
                    max_age: Some(5000),
                },
            )
            .await
            .unwrap();

        assert_eq!(cached_count(&setup).await, 1);

        locator()
            .cache_controller
            .purge_schema_cache(
                setup.wallet_handle,
                PurgeOptions {
                    max_age: Some(100),
                },
            )
            .await
            .unwrap();

        assert_eq!(cached_count(&setup).await, 0);

        setup.close().await;
    }

    #[tokio::test]
    async fn purge_schema_cache_removes_everything_by_default() {
        let setup = WalletSetup::new().await;

        store_cached_schema(&setup, now()).await;

        locator()
            .cache_controller
            .purge_schema_cache(setup.wallet_handle, PurgeOptions::default())
            .await
            .unwrap();

        assert_eq!(cached_count(&setup).await, 0);

        setup.close().await;
    }
}

mod medium_cases {
    use super::*;

    #[tokio::test]
    async fn get_schema_fails_for_missing_entry_without_update() {
        let setup = WalletSetup::new().await;

        let err = get_schema(
            &setup,
            GetCacheOptions {
                no_update: Some(true),
                ..GetCacheOptions::default()
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), IndyErrorKind::LedgerItemNotFound);

        setup.close().await;
    }

    #[tokio::test]
    async fn get_schema_skips_stale_entry() {
        let setup = WalletSetup::new().await;

        store_cached_schema(&setup, now() - 1000).await;

        let err = get_schema(
            &setup,
            GetCacheOptions {
                no_update: Some(true),
                min_fresh: Some(10),
                ..GetCacheOptions::default()
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), IndyErrorKind::LedgerItemNotFound);

        setup.close().await;
    }

    #[tokio::test]
    async fn get_schema_with_no_cache_goes_to_ledger() {
        let setup = WalletSetup::new().await;

        store_cached_schema(&setup, now()).await;

        // Signing needs the submitter DID in the wallet, so the ledger path fails first there.
        let err = get_schema(
            &setup,
            GetCacheOptions {
                no_cache: Some(true),
                ..GetCacheOptions::default()
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), IndyErrorKind::WalletItemNotFound);

        setup.close().await;
    }

    #[tokio::test]
    async fn get_schema_fails_for_invalid_id() {
        let setup = WalletSetup::new().await;

        let err = locator()
            .cache_controller
            .get_schema(
                INVALID_POOL_HANDLE,
                setup.wallet_handle,
                DidValue(DID_TRUSTEE.to_string()),
                SchemaId("not-a-schema-id".to_string()),
                GetCacheOptions::default(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), IndyErrorKind::InvalidStructure);

        setup.close().await;
    }
}
