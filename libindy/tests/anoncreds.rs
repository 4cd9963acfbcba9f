mod utils;

use indy::{Filter, IndyErrorKind, Query};
use utils::{locator, WalletSetup};

mod high_cases {
    use super::*;

    #[tokio::test]
    async fn create_master_secret_works() {
        let setup = WalletSetup::new().await;
        let prover = &locator().prover_controller;

        let id = prover
            .create_master_secret(setup.wallet_handle, Some("master_secret".to_string()))
            .await
            .unwrap();
        assert_eq!(id, "master_secret");

        let generated = prover
            .create_master_secret(setup.wallet_handle, None)
            .await
            .unwrap();
        assert!(!generated.is_empty());
        assert_ne!(generated, id);

        setup.close().await;
    }

    #[tokio::test]
    async fn get_credentials_is_empty_for_new_wallet() {
        let setup = WalletSetup::new().await;
        let prover = &locator().prover_controller;

        let credentials = prover
            .get_credentials(setup.wallet_handle, None)
            .await
            .unwrap();
        assert!(credentials.is_empty());

        let filter = Filter {
            schema_name: Some("gvt".to_string()),
            ..Filter::default()
        };

        let credentials = prover
            .get_credentials(setup.wallet_handle, Some(filter))
            .await
            .unwrap();
        assert!(credentials.is_empty());

        setup.close().await;
    }

    #[tokio::test]
    async fn search_credentials_works_for_empty_wallet() {
        let setup = WalletSetup::new().await;
        let prover = &locator().prover_controller;

        let query = Query::Eq("attr::name::value".to_string(), "Alex".to_string());

        let (search_handle, total_count) = prover
            .search_credentials(setup.wallet_handle, Some(query))
            .await
            .unwrap();
        assert_eq!(total_count, 0);

        let credentials = prover.fetch_credentials(search_handle, 10).await.unwrap();
        assert!(credentials.is_empty());

        prover.close_credentials_search(search_handle).unwrap();

        let err = prover
            .fetch_credentials(search_handle, 10)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), IndyErrorKind::InvalidSearchHandle);

        setup.close().await;
    }

    #[test]
    fn to_unqualified_works() {
        let prover = &locator().prover_controller;

        assert_eq!(
            prover
                .to_unqualified("did:sov:NcYxiDXkpYi6ov5FcYDi1e".to_string())
                .unwrap(),
            "NcYxiDXkpYi6ov5FcYDi1e"
        );
        assert_eq!(
            prover
                .to_unqualified(
                    "schema:sov:did:sov:NcYxiDXkpYi6ov5FcYDi1e:2:gvt:1.0".to_string()
                )
                .unwrap(),
            "NcYxiDXkpYi6ov5FcYDi1e:2:gvt:1.0"
        );
        assert_eq!(
            prover
                .to_unqualified("NcYxiDXkpYi6ov5FcYDi1e".to_string())
                .unwrap(),
            "NcYxiDXkpYi6ov5FcYDi1e"
        );
    }
}

mod medium_cases {
    use super::*;

    #[tokio::test]
    async fn create_master_secret_fails_for_duplicate_name() {
        let setup = WalletSetup::new().await;
        let prover = &locator().prover_controller;

        prover
            .create_master_secret(setup.wallet_handle, Some("master_secret".to_string()))
            .await
            .unwrap();

        let err = prover
            .create_master_secret(setup.wallet_handle, Some("master_secret".to_string()))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), IndyErrorKind::MasterSecretDuplicateName);

        setup.close().await;
    }

    #[tokio::test]
    async fn get_credential_fails_for_unknown_id() {
        let setup = WalletSetup::new().await;
        let prover = &locator().prover_controller;

        let err = prover
            .get_credential(setup.wallet_handle, "unknown".to_string())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), IndyErrorKind::WalletItemNotFound);

        let err = prover
            .delete_credential(setup.wallet_handle, "unknown".to_string())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), IndyErrorKind::WalletItemNotFound);

        setup.close().await;
    }
}
