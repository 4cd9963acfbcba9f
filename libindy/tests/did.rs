mod utils;

use indy::{
    DidMethod, DidValue, Endpoint, IndyErrorKind, KeyInfo, MyDidInfo, TheirDidInfo,
    INVALID_POOL_HANDLE,
};
use utils::{
    locator, WalletSetup, DID_TRUSTEE, SEED_MY1, SEED_MY2, SEED_TRUSTEE, VERKEY_TRUSTEE,
};

const DID_MY1: &str = "VsKV7grR1BUE29mG2Fm2kX";
const VERKEY_MY1: &str = "GjZWsBLgZCR18aL468JAT7w9CZRiBnpxUPPgyQxh4voa";

fn seeded(seed: &str) -> MyDidInfo {
    MyDidInfo {
        seed: Some(seed.to_string()),
        ..MyDidInfo::default()
    }
}

mod high_cases {
    use super::*;

    #[tokio::test]
    async fn create_and_store_my_did_works_for_seed() {
        let setup = WalletSetup::new().await;

        let (did, verkey) = locator()
            .did_controller
            .create_and_store_my_did(setup.wallet_handle, seeded(SEED_MY1))
            .await
            .unwrap();

        assert_eq!(did, DID_MY1);
        assert_eq!(verkey, VERKEY_MY1);

        setup.close().await;
    }

    #[tokio::test]
    async fn create_and_store_my_did_is_idempotent_for_same_seed() {
        let setup = WalletSetup::new().await;
        let dids = &locator().did_controller;

        dids.create_and_store_my_did(setup.wallet_handle, seeded(SEED_MY1))
            .await
            .unwrap();

        let (did, verkey) = dids
            .create_and_store_my_did(setup.wallet_handle, seeded(SEED_MY1))
            .await
            .unwrap();

        assert_eq!(did, DID_MY1);
        assert_eq!(verkey, VERKEY_MY1);

        setup.close().await;
    }

    #[tokio::test]
    async fn create_and_store_my_did_fails_for_same_did_other_key() {
        let setup = WalletSetup::new().await;
        let dids = &locator().did_controller;

        dids.create_and_store_my_did(setup.wallet_handle, seeded(SEED_MY1))
            .await
            .unwrap();

        let err = dids
            .create_and_store_my_did(
                setup.wallet_handle,
                MyDidInfo {
                    did: Some(DidValue(DID_MY1.to_string())),
                    seed: Some(SEED_TRUSTEE.to_string()),
                    ..MyDidInfo::default()
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), IndyErrorKind::DIDAlreadyExists);

        setup.close().await;
    }

    #[tokio::test]
    async fn replace_keys_works() {
        let setup = WalletSetup::new().await;
        let dids = &locator().did_controller;

        let (did, verkey) = dids
            .create_and_store_my_did(setup.wallet_handle, MyDidInfo::default())
            .await
            .unwrap();

        let new_verkey = dids
            .replace_keys_start(
                setup.wallet_handle,
                DidValue(did.clone()),
                KeyInfo::default(),
            )
            .await
            .unwrap();

        assert_ne!(verkey, new_verkey);

        let with_meta = dids
            .get_my_did_with_meta(setup.wallet_handle, DidValue(did.clone()))
            .await
            .unwrap();

        assert_eq!(with_meta.verkey, verkey);
        assert_eq!(with_meta.temp_verkey, Some(new_verkey.clone()));

        dids.replace_keys_apply(setup.wallet_handle, DidValue(did.clone()))
            .await
            .unwrap();

        let current = dids
            .key_for_local_did(setup.wallet_handle, DidValue(did))
            .await
            .unwrap();

        assert_eq!(current, new_verkey);

        setup.close().await;
    }

    #[tokio::test]
    async fn store_their_did_and_key_for_local_did_works() {
        let setup = WalletSetup::new().await;
        let dids = &locator().did_controller;

        dids.store_their_did(
            setup.wallet_handle,
            TheirDidInfo::new(
                DidValue(DID_TRUSTEE.to_string()),
                Some(VERKEY_TRUSTEE.to_string()),
            ),
        )
        .await
        .unwrap();

        let verkey = dids
            .key_for_local_did(setup.wallet_handle, DidValue(DID_TRUSTEE.to_string()))
            .await
            .unwrap();

        assert_eq!(verkey, VERKEY_TRUSTEE);

        setup.close().await;
    }

    #[tokio::test]
    async fn key_for_did_uses_wallet_before_ledger() {
        let setup = WalletSetup::new().await;
        let dids = &locator().did_controller;

        dids.create_and_store_my_did(setup.wallet_handle, seeded(SEED_MY1))
            .await
            .unwrap();

        let verkey = dids
            .key_for_did(
                INVALID_POOL_HANDLE,
                setup.wallet_handle,
                DidValue(DID_MY1.to_string()),
            )
            .await
            .unwrap();

        assert_eq!(verkey, VERKEY_MY1);

        setup.close().await;
    }

    #[tokio::test]
    async fn endpoint_for_did_works() {
        let setup = WalletSetup::new().await;
        let dids = &locator().did_controller;

        dids.set_endpoint_for_did(
            setup.wallet_handle,
            DidValue(DID_TRUSTEE.to_string()),
            Endpoint::new(
                "10.0.0.2:9702".to_string(),
                Some(VERKEY_TRUSTEE.to_string()),
            ),
        )
        .await
        .unwrap();

        let (address, transport_key) = dids
            .get_endpoint_for_did(
                setup.wallet_handle,
                INVALID_POOL_HANDLE,
                DidValue(DID_TRUSTEE.to_string()),
            )
            .await
            .unwrap();

        assert_eq!(address, "10.0.0.2:9702");
        assert_eq!(transport_key, Some(VERKEY_TRUSTEE.to_string()));

        setup.close().await;
    }

    #[tokio::test]
    async fn did_metadata_works() {
        let setup = WalletSetup::new().await;
        let dids = &locator().did_controller;

        dids.create_and_store_my_did(setup.wallet_handle, seeded(SEED_MY1))
            .await
            .unwrap();

        dids.set_did_metadata(
            setup.wallet_handle,
            DidValue(DID_MY1.to_string()),
            "some metadata".to_string(),
        )
        .await
        .unwrap();

        let metadata = dids
            .get_did_metadata(setup.wallet_handle, DidValue(DID_MY1.to_string()))
            .await
            .unwrap();

        assert_eq!(metadata, "some metadata");

        let listed = dids
            .list_my_dids_with_meta(setup.wallet_handle)
            .await
            .unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].metadata, Some("some metadata".to_string()));

        setup.close().await;
    }

    #[test]
    fn abbreviate_verkey_works() {
        let abbreviated = locator()
            .did_controller
            .abbreviate_verkey(
                DidValue(DID_TRUSTEE.to_string()),
                VERKEY_TRUSTEE.to_string(),
            )
            .unwrap();

        assert!(abbreviated.starts_with('~'));
        assert!(abbreviated.len() < VERKEY_TRUSTEE.len());
    }

    #[tokio::test]
    async fn qualify_did_works() {
        let setup = WalletSetup::new().await;
        let dids = &locator().did_controller;

        dids.create_and_store_my_did(setup.wallet_handle, seeded(SEED_MY1))
            .await
            .unwrap();

        let qualified = dids
            .qualify_did(
                setup.wallet_handle,
                DidValue(DID_MY1.to_string()),
                DidMethod("peer".to_string()),
            )
            .await
            .unwrap();

        assert_eq!(qualified, format!("did:peer:{}", DID_MY1));

        let verkey = dids
            .key_for_local_did(setup.wallet_handle, DidValue(qualified))
            .await
            .unwrap();

        assert_eq!(verkey, VERKEY_MY1);

        let err = dids
            .key_for_local_did(setup.wallet_handle, DidValue(DID_MY1.to_string()))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), IndyErrorKind::WalletItemNotFound);

        setup.close().await;
    }
}

mod medium_cases {
    use super::*;

    #[tokio::test]
    async fn create_my_did_fails_for_short_seed() {
        let setup = WalletSetup::new().await;

        let err = locator()
            .did_controller
            .create_and_store_my_did(setup.wallet_handle, seeded("aaa"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), IndyErrorKind::InvalidStructure);

        setup.close().await;
    }

    #[tokio::test]
    async fn get_did_metadata_fails_for_unknown_did() {
        let setup = WalletSetup::new().await;

        let err = locator()
            .did_controller
            .get_did_metadata(setup.wallet_handle, DidValue(DID_MY1.to_string()))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), IndyErrorKind::WalletItemNotFound);

        setup.close().await;
    }

    #[tokio::test]
    async fn key_for_did_fails_for_unknown_did_and_closed_pool() {
        let setup = WalletSetup::new().await;

        let err = locator()
            .did_controller
            .key_for_did(
                INVALID_POOL_HANDLE,
                setup.wallet_handle,
                DidValue(DID_TRUSTEE.to_string()),
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), IndyErrorKind::InvalidPoolHandle);

        setup.close().await;
    }

    #[tokio::test]
    async fn qualify_did_keeps_did_when_target_exists() {
        let setup = WalletSetup::new().await;
        let dids = &locator().did_controller;

        dids.create_and_store_my_did(setup.wallet_handle, seeded(SEED_MY1))
            .await
            .unwrap();

        let target = format!("did:peer:{}", DID_MY1);

        dids.create_and_store_my_did(
            setup.wallet_handle,
            MyDidInfo {
                did: Some(DidValue(target.clone())),
                seed: Some(SEED_MY2.to_string()),
                ..MyDidInfo::default()
            },
        )
        .await
        .unwrap();

        let err = dids
            .qualify_did(
                setup.wallet_handle,
                DidValue(DID_MY1.to_string()),
                DidMethod("peer".to_string()),
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), IndyErrorKind::DIDAlreadyExists);

        let verkey = dids
            .key_for_local_did(setup.wallet_handle, DidValue(DID_MY1.to_string()))
            .await
            .unwrap();

        assert_eq!(verkey, VERKEY_MY1);

        let verkey = dids
            .key_for_local_did(setup.wallet_handle, DidValue(target))
            .await
            .unwrap();

        assert_ne!(verkey, VERKEY_MY1);

        setup.close().await;
    }
}
