mod utils;

use indy::{DidValue, IndyErrorKind, MyDidInfo, SchemaId, INVALID_POOL_HANDLE};
use indy_utils::crypto::base58::FromBase58;
use serde_json::{json, Value};
use utils::{locator, WalletSetup, DID_TRUSTEE, SEED_TRUSTEE, VERKEY_TRUSTEE};

const DEST: &str = "VsKV7grR1BUE29mG2Fm2kX";

fn trustee() -> DidValue {
    DidValue(DID_TRUSTEE.to_string())
}

fn dest() -> DidValue {
    DidValue(DEST.to_string())
}

async fn store_trustee(setup: &WalletSetup) {
    locator()
        .did_controller
        .create_and_store_my_did(
            setup.wallet_handle,
            MyDidInfo {
                seed: Some(SEED_TRUSTEE.to_string()),
                ..MyDidInfo::default()
            },
        )
        .await
        .unwrap();
}

mod high_cases {
    use super::*;

    #[tokio::test]
    async fn sign_request_adds_signature() {
        let setup = WalletSetup::new().await;
        let ledger = &locator().ledger_controller;

        store_trustee(&setup).await;

        let request = ledger
            .build_nym_request(trustee(), dest(), None, None, None)
            .unwrap();

        let signed = ledger
            .sign_request(setup.wallet_handle, trustee(), request)
            .await
            .unwrap();

        let signed: Value = serde_json::from_str(&signed).unwrap();
        let signature = signed["signature"].as_str().unwrap().from_base58().unwrap();

        assert_eq!(signature.len(), 64);
        assert_eq!(signed["identifier"], DID_TRUSTEE);

        setup.close().await;
    }

    #[tokio::test]
    async fn sign_request_signature_verifies_with_submitter_key() {
        let setup = WalletSetup::new().await;
        let locator = locator();

        store_trustee(&setup).await;

        let request = locator
            .ledger_controller
            .build_get_txn_request(Some(trustee()), None, 1)
            .unwrap();

        let signed = locator
            .ledger_controller
            .sign_request(setup.wallet_handle, trustee(), request.clone())
            .await
            .unwrap();

        let signed: Value = serde_json::from_str(&signed).unwrap();
        let signature = signed["signature"].as_str().unwrap().from_base58().unwrap();

        let request: Value = serde_json::from_str(&request).unwrap();
        let bytes = format!(
            "identifier:{}|operation:data:1|ledgerId:1|type:3|protocolVersion:{}|reqId:{}",
            DID_TRUSTEE, request["protocolVersion"], request["reqId"]
        );

        assert!(locator
            .crypto_controller
            .crypto_verify(VERKEY_TRUSTEE, bytes.as_bytes(), &signature)
            .await
            .unwrap());

        setup.close().await;
    }

    #[test]
    fn build_requests_work() {
        let ledger = &locator().ledger_controller;

        let nym: Value = serde_json::from_str(
            &ledger
                .build_nym_request(
                    trustee(),
                    dest(),
                    Some(VERKEY_TRUSTEE.to_string()),
                    None,
                    Some("ENDORSER".to_string()),
                )
                .unwrap(),
        )
        .unwrap();

        assert_eq!(nym["operation"]["type"], "1");
        assert_eq!(nym["operation"]["role"], "101");

        let get_attrib: Value = serde_json::from_str(
            &ledger
                .build_get_attrib_request(None, dest(), Some("endpoint".to_string()), None, None)
                .unwrap(),
        )
        .unwrap();

        assert_eq!(
            get_attrib["operation"],
            json!({"type": "104", "dest": DEST, "raw": "endpoint"})
        );

        let get_schema: Value = serde_json::from_str(
            &ledger
                .build_get_schema_request(
                    None,
                    SchemaId(format!("{}:2:gvt:1.0", DID_TRUSTEE)),
                )
                .unwrap(),
        )
        .unwrap();

        assert_eq!(get_schema["operation"]["type"], "107");
        assert_eq!(get_schema["operation"]["dest"], DID_TRUSTEE);
    }

    #[test]
    fn parse_get_schema_response_works() {
        let response = json!({
            "op": "REPLY",
            "result": {
                "type": "107",
                "dest": DID_TRUSTEE,
                "seqNo": 14,
                "txnTime": 1514214795,
                "data": {"name": "gvt", "version": "1.0", "attr_names": ["name", "age"]}
            }
        })
        .to_string();

        let (id, schema) = locator()
            .ledger_controller
            .parse_get_schema_response(response)
            .unwrap();

        assert_eq!(id, format!("{}:2:gvt:1.0", DID_TRUSTEE));

        let schema: Value = serde_json::from_str(&schema).unwrap();
        assert_eq!(schema["name"], "gvt");
        assert_eq!(schema["seqNo"], 14);
    }
}

mod medium_cases {
    use super::*;

    #[test]
    fn build_nym_request_fails_for_invalid_did() {
        let err = locator()
            .ledger_controller
            .build_nym_request(
                DidValue("invalid_base58_did".to_string()),
                dest(),
                None,
                None,
                None,
            )
            .unwrap_err();

        assert_eq!(err.kind(), IndyErrorKind::InvalidStructure);
    }

    #[test]
    fn read_requests_validate_submitter_and_target() {
        let ledger = &locator().ledger_controller;
        let invalid = || DidValue("invalid_base58_did".to_string());

        let err = ledger
            .build_get_attrib_request(Some(invalid()), dest(), Some("endpoint".to_string()), None, None)
            .unwrap_err();
        assert_eq!(err.kind(), IndyErrorKind::InvalidStructure);

        let err = ledger
            .build_get_nym_request(Some(trustee()), invalid())
            .unwrap_err();
        assert_eq!(err.kind(), IndyErrorKind::InvalidStructure);

        assert!(ledger.build_get_nym_request(None, dest()).is_ok());
    }

    #[tokio::test]
    async fn sign_request_fails_for_unknown_submitter() {
        let setup = WalletSetup::new().await;
        let ledger = &locator().ledger_controller;

        let request = ledger.build_get_nym_request(None, dest()).unwrap();

        let err = ledger
            .sign_request(setup.wallet_handle, trustee(), request)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), IndyErrorKind::WalletItemNotFound);

        setup.close().await;
    }

    #[tokio::test]
    async fn submit_request_fails_for_invalid_json() {
        let err = locator()
            .ledger_controller
            .submit_request(INVALID_POOL_HANDLE, "{not json".to_string())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), IndyErrorKind::InvalidStructure);
    }

    #[tokio::test]
    async fn sign_and_submit_request_fails_for_closed_pool() {
        let setup = WalletSetup::new().await;
        let ledger = &locator().ledger_controller;

        store_trustee(&setup).await;

        let request = ledger
            .build_nym_request(trustee(), dest(), None, None, None)
            .unwrap();

        let err = ledger
            .sign_and_submit_request(INVALID_POOL_HANDLE, setup.wallet_handle, trustee(), request)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), IndyErrorKind::InvalidPoolHandle);

        setup.close().await;
    }

    #[test]
    fn parse_get_nym_response_fails_for_missing_data() {
        let response = json!({
            "op": "REPLY",
            "result": {"type": "105", "dest": DEST, "seqNo": null, "txnTime": null, "data": null}
        })
        .to_string();

        let err = locator()
            .ledger_controller
            .parse_get_nym_response(response)
            .unwrap_err();

        assert_eq!(err.kind(), IndyErrorKind::LedgerItemNotFound);
    }
}
