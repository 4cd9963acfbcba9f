mod utils;

use indy::{IndyErrorKind, KeyInfo, UnpackMessage, INVALID_WALLET_HANDLE, JWE};
use utils::{locator, WalletSetup, SEED_MY1, SEED_MY2};

const MESSAGE: &[u8] = b"Hello World";

async fn create_key(setup: &WalletSetup, seed: &str) -> String {
    locator()
        .crypto_controller
        .create_key(
            setup.wallet_handle,
            &KeyInfo {
                seed: Some(seed.to_string()),
                crypto_type: None,
            },
        )
        .await
        .unwrap()
}

mod high_cases {
    use super::*;

    #[tokio::test]
    async fn create_key_works_for_seed() {
        let setup = WalletSetup::new().await;

        let verkey = create_key(&setup, SEED_MY1).await;
        assert_eq!(verkey, "GjZWsBLgZCR18aL468JAT7w9CZRiBnpxUPPgyQxh4voa");

        setup.close().await;
    }

    #[tokio::test]
    async fn sign_verify_works() {
        let setup = WalletSetup::new().await;
        let crypto = &locator().crypto_controller;

        let verkey = create_key(&setup, SEED_MY1).await;

        let signature = crypto
            .crypto_sign(setup.wallet_handle, &verkey, MESSAGE)
            .await
            .unwrap();

        assert!(crypto
            .crypto_verify(&verkey, MESSAGE, &signature)
            .await
            .unwrap());
        assert!(!crypto
            .crypto_verify(&verkey, b"Other message", &signature)
            .await
            .unwrap());

        setup.close().await;
    }

    #[tokio::test]
    async fn auth_crypt_decrypt_works() {
        let setup = WalletSetup::new().await;
        let crypto = &locator().crypto_controller;

        let sender_vk = create_key(&setup, SEED_MY1).await;
        let recipient_vk = create_key(&setup, SEED_MY2).await;

        let encrypted = crypto
            .auth_crypt(setup.wallet_handle, &sender_vk, &recipient_vk, MESSAGE)
            .await
            .unwrap();

        let (decrypted_sender, decrypted) = crypto
            .auth_decrypt(setup.wallet_handle, &recipient_vk, &encrypted)
            .await
            .unwrap();

        assert_eq!(decrypted_sender, sender_vk);
        assert_eq!(decrypted, MESSAGE);

        setup.close().await;
    }

    #[tokio::test]
    async fn anon_crypt_decrypt_works() {
        let setup = WalletSetup::new().await;
        let crypto = &locator().crypto_controller;

        let recipient_vk = create_key(&setup, SEED_MY2).await;

        let encrypted = crypto.anon_crypt(&recipient_vk, MESSAGE).unwrap();

        let decrypted = crypto
            .anon_decrypt(setup.wallet_handle, &recipient_vk, &encrypted)
            .await
            .unwrap();

        assert_eq!(decrypted, MESSAGE);

        setup.close().await;
    }

    #[tokio::test]
    async fn pack_unpack_works_for_authcrypt() {
        let setup = WalletSetup::new().await;
        let crypto = &locator().crypto_controller;

        let sender_vk = create_key(&setup, SEED_MY1).await;
        let recipient_vk = create_key(&setup, SEED_MY2).await;

        let packed = crypto
            .pack_message(
                setup.wallet_handle,
                MESSAGE.to_vec(),
                vec![recipient_vk.clone()],
                Some(sender_vk.clone()),
            )
            .await
            .unwrap();

        let jwe: JWE = serde_json::from_slice(&packed).unwrap();

        let unpacked = crypto
            .unpack_message(setup.wallet_handle, jwe)
            .await
            .unwrap();

        let unpacked: UnpackMessage = serde_json::from_slice(&unpacked).unwrap();

        assert_eq!(unpacked.message.as_bytes(), MESSAGE);
        assert_eq!(unpacked.recipient_verkey, recipient_vk);
        assert_eq!(unpacked.sender_verkey, Some(sender_vk));

        setup.close().await;
    }

    #[tokio::test]
    async fn pack_unpack_works_for_anoncrypt() {
        let setup = WalletSetup::new().await;
        let crypto = &locator().crypto_controller;

        let recipient_vk = create_key(&setup, SEED_MY2).await;

        let packed = crypto
            .pack_message(
                setup.wallet_handle,
                MESSAGE.to_vec(),
                vec![recipient_vk.clone()],
                None,
            )
            .await
            .unwrap();

        let jwe: JWE = serde_json::from_slice(&packed).unwrap();

        let unpacked = crypto
            .unpack_message(setup.wallet_handle, jwe)
            .await
            .unwrap();

        let unpacked: UnpackMessage = serde_json::from_slice(&unpacked).unwrap();

        assert_eq!(unpacked.message.as_bytes(), MESSAGE);
        assert_eq!(unpacked.sender_verkey, None);

        setup.close().await;
    }

    #[tokio::test]
    async fn key_metadata_works() {
        let setup = WalletSetup::new().await;
        let crypto = &locator().crypto_controller;

        let verkey = create_key(&setup, SEED_MY1).await;

        crypto
            .set_key_metadata(setup.wallet_handle, &verkey, "some metadata".to_string())
            .await
            .unwrap();

        crypto
            .set_key_metadata(setup.wallet_handle, &verkey, "new metadata".to_string())
            .await
            .unwrap();

        let metadata = crypto
            .get_key_metadata(setup.wallet_handle, &verkey)
            .await
            .unwrap();

        assert_eq!(metadata, "new metadata");

        setup.close().await;
    }
}

mod medium_cases {
    use super::*;

    #[tokio::test]
    async fn crypto_sign_fails_for_unknown_key() {
        let setup = WalletSetup::new().await;

        let err = locator()
            .crypto_controller
            .crypto_sign(
                setup.wallet_handle,
                "GjZWsBLgZCR18aL468JAT7w9CZRiBnpxUPPgyQxh4voa",
                MESSAGE,
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), IndyErrorKind::WalletItemNotFound);

        setup.close().await;
    }

    #[tokio::test]
    async fn pack_message_fails_for_empty_receivers() {
        let setup = WalletSetup::new().await;

        let err = locator()
            .crypto_controller
            .pack_message(setup.wallet_handle, MESSAGE.to_vec(), vec![], None)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), IndyErrorKind::InvalidStructure);

        setup.close().await;
    }

    #[tokio::test]
    async fn unpack_message_fails_without_recipient_key() {
        let setup = WalletSetup::new().await;
        let crypto = &locator().crypto_controller;

        let recipient_vk = create_key(&setup, SEED_MY2).await;

        let packed = crypto
            .pack_message(
                setup.wallet_handle,
                MESSAGE.to_vec(),
                vec![recipient_vk],
                None,
            )
            .await
            .unwrap();

        let other = WalletSetup::new().await;
        let jwe: JWE = serde_json::from_slice(&packed).unwrap();

        let err = crypto
            .unpack_message(other.wallet_handle, jwe)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), IndyErrorKind::WalletItemNotFound);

        other.close().await;
        setup.close().await;
    }

    #[tokio::test]
    async fn unpack_message_fails_for_invalid_wallet_handle() {
        let setup = WalletSetup::new().await;
        let crypto = &locator().crypto_controller;

        let recipient_vk = create_key(&setup, SEED_MY2).await;

        let packed = crypto
            .pack_message(
                setup.wallet_handle,
                MESSAGE.to_vec(),
                vec![recipient_vk],
                None,
            )
            .await
            .unwrap();

        let jwe: JWE = serde_json::from_slice(&packed).unwrap();

        let err = crypto
            .unpack_message(INVALID_WALLET_HANDLE, jwe)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), IndyErrorKind::InvalidWalletHandle);

        setup.close().await;
    }

    #[tokio::test]
    async fn get_key_metadata_fails_when_not_set() {
        let setup = WalletSetup::new().await;

        let verkey = create_key(&setup, SEED_MY1).await;

        let err = locator()
            .crypto_controller
            .get_key_metadata(setup.wallet_handle, &verkey)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), IndyErrorKind::WalletItemNotFound);

        setup.close().await;
    }
}
