use std::{collections::HashMap, sync::Arc};

use indy_api_types::{errors::prelude::*, WalletHandle};
use indy_utils::crypto::{base64, xchacha20poly1305_ietf};
use indy_wallet::{RecordOptions, WalletService};

use crate::{
    domain::crypto::{
        combo_box::ComboBox,
        key::{Key, KeyInfo, KeyMetadata},
        pack::*,
    },
    services::CryptoService,
};

pub struct CryptoController {
    wallet_service: Arc<WalletService>,
    crypto_service: Arc<CryptoService>,
}

impl CryptoController {
    pub(crate) fn new(
        wallet_service: Arc<WalletService>,
        crypto_service: Arc<CryptoService>,
    ) -> CryptoController {
        CryptoController {
            wallet_service,
            crypto_service,
        }
    }

    /// Creates keys pair and stores in the wallet.
    ///
    /// #Params
    /// wallet_handle: Wallet handle (created by open_wallet).
    /// key_info: Key information
    /// {
    ///     "seed": string, (optional) Seed that allows deterministic key creation
    ///                    (if not set random one will be created).
    ///                    Can be UTF-8, base64 or hex string.
    ///     "crypto_type": string, // Optional (if not set then ed25519 curve is used);
    ///               Currently only 'ed25519' value is supported for this field.
    /// }
    ///
    /// #Returns
    /// verkey: Ver key of generated key pair, also used as key identifier
    ///
    /// #Errors
    /// Common*
    /// Wallet*
    /// Crypto*
    pub async fn create_key(
        &self,
        wallet_handle: WalletHandle,
        key_info: &KeyInfo,
    ) -> IndyResult<String> {
        debug!(
            "create_key > wallet_handle {:?} key_info {:?}",
            wallet_handle,
            secret!(&key_info)
        );

        let key = self.crypto_service.create_key(key_info)?;

        self.wallet_service
            .add_indy_object(wallet_handle, &key.verkey, &key, &HashMap::new())
            .await?;

        let res = key.verkey.to_string();
        debug!("create_key < res {:?}", res);
        Ok(res)
    }

    /// Signs a message with a key stored in the wallet.
    ///
    /// #Params
    /// wallet_handle: wallet handler (created by open_wallet).
    /// signer_vk: id (verkey) of message signer. The key must be created by calling indy_create_key or indy_create_and_store_my_did
    /// msg_raw_data: a pointer to first byte of message to be signed
    ///
    /// #Returns
    /// a signature string
    ///
    /// #Errors
    /// Common*
    /// Wallet*
    /// Crypto*
    pub async fn crypto_sign(
        &self,
        wallet_handle: WalletHandle,
        my_vk: &str,
        msg: &[u8],
    ) -> IndyResult<Vec<u8>> {
        trace!(
            "crypto_sign > wallet_handle {:?} my_vk {:?} msg {:?}",
            wallet_handle,
            my_vk,
            msg
        );

        self.crypto_service.validate_key(my_vk)?;

        let key: Key = self
            .wallet_service
            .get_indy_object(wallet_handle, my_vk, &RecordOptions::id_value())
            .await?;

        let res = self.crypto_service.sign(&key, msg)?;

        trace!("crypto_sign < res {:?}", res);
        Ok(res)
    }

    /// Verify a signature with a verkey.
    ///
    /// #Params
    /// their_vk: verkey of the message signer, optionally `vk:crypto_type` formatted
    /// msg: message that has been signed
    /// signature: a signature to be verified
    ///
    /// #Returns
    /// valid: true - if signature is valid, false - otherwise
    ///
    /// #Errors
    /// Common*
    /// Wallet*
    /// Ledger*
    /// Crypto*
    pub async fn crypto_verify(
        &self,
        their_vk: &str,
        msg: &[u8],
        signature: &[u8],
    ) -> IndyResult<bool> {
        trace!(
            "crypto_verify > their_vk {:?} msg {:?} signature {:?}",
            their_vk,
            msg,
            signature
        );

        self.crypto_service.validate_key(their_vk)?;

        let res = self.crypto_service.verify(their_vk, msg, signature)?;

        trace!("crypto_verify < {:?}", res);
        Ok(res)
    }

    /// Encrypts a message by authenticated-encryption scheme.
    ///
    /// Sender can encrypt a confidential message specifically for Recipient, using Sender's public key.
    /// Using Recipient's public key, Sender can compute a shared secret key.
    /// Using Sender's public key and his secret key, Recipient can compute the exact same shared secret key.
    /// That shared secret key can be used to verify that the encrypted message was not tampered with,
    /// before eventually decrypting it.
    ///
    /// The sender verkey, crypto_box ciphertext and nonce are MessagePack
    /// encoded and sealed to the recipient.
    ///
    /// #Returns
    /// an encrypted message as a pointer to array of bytes.
    ///
    /// #Errors
    /// Common*
    /// Wallet*
    /// Ledger*
    /// Crypto*
    pub async fn auth_crypt(
        &self,
        wallet_handle: WalletHandle,
        my_vk: &str,
        their_vk: &str,
        msg: &[u8],
    ) -> IndyResult<Vec<u8>> {
        trace!(
            "auth_crypt > wallet_handle {:?} my_vk {:?} their_vk {:?} msg {:?}",
            wallet_handle,
            my_vk,
            their_vk,
            msg
        );

        self.crypto_service.validate_key(my_vk)?;
        self.crypto_service.validate_key(their_vk)?;

        let my_key: Key = self
            .wallet_service
            .get_indy_object(wallet_handle, my_vk, &RecordOptions::id_value())
            .await?;

        let (msg, nonce) = self.crypto_service.crypto_box(&my_key, their_vk, msg)?;

        let combo_box = ComboBox {
            msg: base64::encode(msg.as_slice()),
            sender: my_vk.to_string(),
            nonce: base64::encode(nonce.as_slice()),
        };

        let msg_pack = combo_box.to_msg_pack()?;

        let res = self.crypto_service.crypto_box_seal(their_vk, &msg_pack)?;

        trace!("auth_crypt < res {:?}", res);
        Ok(res)
    }

    /// Decrypt a message by authenticated-encryption scheme.
    ///
    /// #Returns
    /// sender verkey and decrypted message
    ///
    /// #Errors
    /// Common*
    /// Wallet*
    /// Crypto*
    pub async fn auth_decrypt(
        &self,
        wallet_handle: WalletHandle,
        my_vk: &str,
        msg: &[u8],
    ) -> IndyResult<(String, Vec<u8>)> {
        trace!(
            "auth_decrypt > wallet_handle {:?} my_vk {:?} msg {:?}",
            wallet_handle,
            my_vk,
            msg
        );

        self.crypto_service.validate_key(my_vk)?;

        let my_key: Key = self
            .wallet_service
            .get_indy_object(wallet_handle, my_vk, &RecordOptions::id_value())
            .await?;

        let decrypted_msg = self.crypto_service.crypto_box_seal_open(&my_key, msg)?;

        let parsed_msg = ComboBox::from_msg_pack(decrypted_msg.as_slice())?;

        let sender_vk = parsed_msg.sender;

        let msg = base64::decode(&parsed_msg.msg)
            .map_err(|err| err.extend("Can't decode internal msg field from base64"))?;

        let nonce = base64::decode(&parsed_msg.nonce)
            .map_err(|err| err.extend("Can't decode nonce from base64"))?;

        let decrypted_msg =
            self.crypto_service
                .crypto_box_open(&my_key, &sender_vk, &msg, &nonce)?;

        let res = (sender_vk, decrypted_msg);

        trace!("auth_decrypt < res {:?}", res);
        Ok(res)
    }

    /// Encrypts a message by anonymous-encryption scheme.
    ///
    /// Sealed boxes are designed to anonymously send messages to a Recipient given its public key.
    /// Only the Recipient can decrypt these messages, using its private key.
    /// While the Recipient can verify the integrity of the message, it cannot verify the identity of the Sender.
    pub fn anon_crypt(&self, their_vk: &str, msg: &[u8]) -> IndyResult<Vec<u8>> {
        trace!(
            "anon_crypt > their_vk {:?} msg {:?}",
            their_vk,
            msg
        );

        self.crypto_service.validate_key(their_vk)?;

        let res = self.crypto_service.crypto_box_seal(their_vk, msg)?;

        trace!("anon_crypt < res {:?}", res);
        Ok(res)
    }

    /// Decrypts a message by anonymous-encryption scheme.
    ///
    /// #Errors
    /// Common*
    /// Wallet*
    /// Crypto*
    pub async fn anon_decrypt(
        &self,
        wallet_handle: WalletHandle,
        my_vk: &str,
        encrypted_msg: &[u8],
    ) -> IndyResult<Vec<u8>> {
        trace!(
            "anon_decrypt > wallet_handle {:?} my_vk {:?} encrypted_msg {:?}",
            wallet_handle,
            my_vk,
            encrypted_msg
        );

        self.crypto_service.validate_key(my_vk)?;

        let my_key: Key = self
            .wallet_service
            .get_indy_object(wallet_handle, my_vk, &RecordOptions::id_value())
            .await
            .map_err(|err| err.extend("Can't find my_key"))?;

        let res = self
            .crypto_service
            .crypto_box_seal_open(&my_key, encrypted_msg)?;

        trace!("anon_decrypt < res {:?}", res);
        Ok(res)
    }

    /// Saves/replaces the meta information for the giving key in the wallet.
    pub async fn set_key_metadata(
        &self,
        wallet_handle: WalletHandle,
        verkey: &str,
        metadata: String,
    ) -> IndyResult<()> {
        debug!(
            "set_key_metadata > wallet_handle {:?} verkey {:?} metadata {:?}",
            wallet_handle, verkey, metadata
        );

        self.crypto_service.validate_key(verkey)?;

        let metadata = KeyMetadata { value: metadata };

        self.wallet_service
            .upsert_indy_object(wallet_handle, verkey, &metadata)
            .await?;

        debug!("set_key_metadata <<<");
        Ok(())
    }

    /// Retrieves the meta information for the giving key in the wallet.
    ///
    /// #Errors
    /// Common*
    /// Wallet*
    /// Crypto*
    pub async fn get_key_metadata(
        &self,
        wallet_handle: WalletHandle,
        verkey: &str,
    ) -> IndyResult<String> {
        debug!(
            "get_key_metadata > wallet_handle {:?} verkey {:?}",
            wallet_handle, verkey
        );

        self.crypto_service.validate_key(verkey)?;

        let metadata = self
            .wallet_service
            .get_indy_object::<KeyMetadata>(wallet_handle, verkey, &RecordOptions::id_value())
            .await?;

        let res = metadata.value;

        debug!("get_key_metadata < res {:?}", res);
        Ok(res)
    }

    /// Packs a message by encrypting the message and serializes it in a JWE-like format.
    ///
    /// With `sender_vk` every recipient gets the content key authcrypted and
    /// the sender verkey sealed to it. Without it the content key is sealed
    /// anonymously.
    ///
    /// #Returns
    /// a JWE using authcrypt alg is defined below:
    /// {
    ///     "protected": "b64URLencoded({
    ///        "enc": "xchachapoly1305_ietf",
    ///        "typ": "JWM/1.0",
    ///        "alg": "Authcrypt",
    ///        "recipients": [
    ///            {
    ///                "encrypted_key": base64URLencode(libsodium.crypto_box(my_key, their_vk, cek, cek_iv))
    ///                "header": {
    ///                     "kid": "base58encode(recipient_verkey)",
    ///                     "sender" : base64URLencode(libsodium.crypto_box_seal(their_vk, base58encode(sender_vk)),
    ///                     "iv" : base64URLencode(cek_iv)
    ///                }
    ///            },
    ///        ],
    ///     })",
    ///     "iv": <b64URLencode(iv)>,
    ///     "ciphertext": b64URLencode(encrypt_detached({'@type'...}, protected_value_encoded, iv, cek),
    ///     "tag": <b64URLencode(tag)>
    /// }
    ///
    /// #Errors
    /// Common*
    /// Wallet*
    /// Crypto*
    pub async fn pack_message(
        &self,
        wallet_handle: WalletHandle,
        message: Vec<u8>,
        receiver_list: Vec<String>,
        sender_vk: Option<String>,
    ) -> IndyResult<Vec<u8>> {
        trace!(
            "pack_message > wallet_handle {:?} message {:?} receiver_list {:?} sender_vk {:?}",
            wallet_handle,
            message,
            receiver_list,
            sender_vk
        );

        if receiver_list.is_empty() {
            return Err(err_msg(
                IndyErrorKind::InvalidStructure,
                "No receiver keys found",
            ));
        }

        for key in receiver_list.iter() {
            self.crypto_service.validate_key(key)?;
        }

        let cek = xchacha20poly1305_ietf::gen_key();

        let base64_protected = if let Some(sender_vk) = sender_vk {
            self.crypto_service.validate_key(&sender_vk)?;

            let my_key: Key = self
                .wallet_service
                .get_indy_object(wallet_handle, &sender_vk, &RecordOptions::id_value())
                .await?;

            self._prepare_protected_authcrypt(&cek, receiver_list, &my_key)?
        } else {
            self._prepare_protected_anoncrypt(&cek, receiver_list)?
        };

        let res = self._encrypt_ciphertext(message, base64_protected, &cek)?;

        trace!("pack_message < res {:?}", res);
        Ok(res)
    }

    fn _prepare_protected_anoncrypt(
        &self,
        cek: &xchacha20poly1305_ietf::Key,
        receiver_list: Vec<String>,
    ) -> IndyResult<String> {
        let mut encrypted_recipients_struct: Vec<Recipient> =
            Vec::with_capacity(receiver_list.len());

        for their_vk in receiver_list {
            let enc_cek = self.crypto_service.crypto_box_seal(&their_vk, &cek.0)?;

            encrypted_recipients_struct.push(Recipient {
                encrypted_key: base64::encode_urlsafe(enc_cek.as_slice()),
                header: Header {
                    kid: their_vk,
                    sender: None,
                    iv: None,
                },
            });
        }

        Self::_base64_encode_protected(encrypted_recipients_struct, false)
    }

    fn _prepare_protected_authcrypt(
        &self,
        cek: &xchacha20poly1305_ietf::Key,
        receiver_list: Vec<String>,
        sender_key: &Key,
    ) -> IndyResult<String> {
        let mut encrypted_recipients_struct: Vec<Recipient> = vec![];

        for their_vk in receiver_list {
            let (enc_cek, iv) = self
                .crypto_service
                .crypto_box(sender_key, &their_vk, &cek.0)?;

            let enc_sender = self
                .crypto_service
                .crypto_box_seal(&their_vk, sender_key.verkey.as_bytes())?;

            encrypted_recipients_struct.push(Recipient {
                encrypted_key: base64::encode_urlsafe(enc_cek.as_slice()),
                header: Header {
                    kid: their_vk,
                    sender: Some(base64::encode_urlsafe(enc_sender.as_slice())),
                    iv: Some(base64::encode_urlsafe(iv.as_slice())),
                },
            });
        }

        Self::_base64_encode_protected(encrypted_recipients_struct, true)
    }

    fn _base64_encode_protected(
        encrypted_recipients_struct: Vec<Recipient>,
        alg_is_authcrypt: bool,
    ) -> IndyResult<String> {
        let alg_val = if alg_is_authcrypt {
            String::from(PROTECTED_HEADER_ALG_AUTH)
        } else {
            String::from(PROTECTED_HEADER_ALG_ANON)
        };

        let protected_struct = Protected {
            enc: PROTECTED_HEADER_ENC.to_string(),
            typ: PROTECTED_HEADER_TYP.to_string(),
            alg: alg_val,
            recipients: encrypted_recipients_struct,
        };

        let protected_encoded = serde_json::to_string(&protected_struct).map_err(|err| {
            err_msg(
                IndyErrorKind::InvalidStructure,
                format!("Failed to serialize protected field {}", err),
            )
        })?;

        Ok(base64::encode_urlsafe(protected_encoded.as_bytes()))
    }

    fn _encrypt_ciphertext(
        &self,
        message: Vec<u8>,
        base64_protected: String,
        cek: &xchacha20poly1305_ietf::Key,
    ) -> IndyResult<Vec<u8>> {
        let (ciphertext, iv, tag) =
            self.crypto_service
                .encrypt_plaintext(&message, &base64_protected, cek)?;

        let jwe_struct = JWE {
            protected: base64_protected,
            iv,
            ciphertext,
            tag,
        };

        serde_json::to_vec(&jwe_struct).map_err(|err| {
            err_msg(
                IndyErrorKind::InvalidStructure,
                format!("Failed to serialize JWE {}", err),
            )
        })
    }

    /// Unpacks a JWE-like formatted message outputted by pack_message.
    ///
    /// #Returns
    /// a json of the unpacked message:
    /// {
    ///     "message": <decrypted message>,
    ///     "recipient_verkey": <recipient verkey used to decrypt>,
    ///     "sender_verkey": <sender verkey, only for authcrypt>
    /// }
    ///
    /// #Errors
    /// Common*
    /// Wallet*
    /// Crypto*
    pub async fn unpack_message(
        &self,
        wallet_handle: WalletHandle,
        jwe_struct: JWE,
    ) -> IndyResult<Vec<u8>> {
        trace!(
            "unpack_message > wallet_handle {:?} jwe_struct {:?}",
            wallet_handle,
            jwe_struct
        );

        let protected_decoded_vec = base64::decode_urlsafe(&jwe_struct.protected)?;

        let protected_decoded_str = String::from_utf8(protected_decoded_vec).map_err(|err| {
            err_msg(
                IndyErrorKind::InvalidStructure,
                format!("Failed to utf8 encode data {}", err),
            )
        })?;

        let protected_struct: Protected =
            serde_json::from_str(&protected_decoded_str).map_err(|err| {
                err_msg(
                    IndyErrorKind::InvalidStructure,
                    format!("Failed to deserialize protected data {}", err),
                )
            })?;

        let (recipient, is_auth_recipient) = self
            ._find_correct_recipient(protected_struct, wallet_handle)
            .await?;

        let (sender_verkey_option, cek) = if is_auth_recipient {
            self._unpack_cek_authcrypt(&recipient, wallet_handle).await?
        } else {
            self._unpack_cek_anoncrypt(&recipient, wallet_handle).await?
        };

        let message = self.crypto_service.decrypt_ciphertext(
            &jwe_struct.ciphertext,
            &jwe_struct.protected,
            &jwe_struct.iv,
            &jwe_struct.tag,
            &cek,
        )?;

        let res = UnpackMessage {
            message,
            sender_verkey: sender_verkey_option,
            recipient_verkey: recipient.header.kid,
        };

        let res = serde_json::to_vec(&res).map_err(|err| {
            err_msg(
                IndyErrorKind::InvalidStructure,
                format!("Failed to serialize message {}", err),
            )
        })?;

        trace!("unpack_message < res {:?}", res);
        Ok(res)
    }

    async fn _find_correct_recipient(
        &self,
        protected_struct: Protected,
        wallet_handle: WalletHandle,
    ) -> IndyResult<(Recipient, bool)> {
        let is_auth = protected_struct.alg == PROTECTED_HEADER_ALG_AUTH;

        for recipient in protected_struct.recipients {
            let my_key_res = self
                .wallet_service
                .get_indy_object::<Key>(
                    wallet_handle,
                    &recipient.header.kid,
                    &RecordOptions::id_value(),
                )
                .await;

            match my_key_res {
                Ok(_) => return Ok((recipient, is_auth)),
                Err(err) if err.kind() == IndyErrorKind::WalletItemNotFound => continue,
                Err(err) => return Err(err),
            }
        }

        Err(err_msg(
            IndyErrorKind::WalletItemNotFound,
            "No receiver keys found",
        ))
    }

    async fn _unpack_cek_authcrypt(
        &self,
        recipient: &Recipient,
        wallet_handle: WalletHandle,
    ) -> IndyResult<(Option<String>, xchacha20poly1305_ietf::Key)> {
        let encrypted_key_vec = base64::decode_urlsafe(&recipient.encrypted_key)?;

        let iv = recipient.header.iv.as_deref().ok_or_else(|| {
            err_msg(
                IndyErrorKind::InvalidStructure,
                "Authcrypt recipient header has no iv",
            )
        })?;

        let enc_sender_vk = recipient.header.sender.as_deref().ok_or_else(|| {
            err_msg(
                IndyErrorKind::InvalidStructure,
                "Authcrypt recipient header has no sender",
            )
        })?;

        let iv = base64::decode_urlsafe(iv)?;
        let enc_sender_vk = base64::decode_urlsafe(enc_sender_vk)?;

        let my_key: Key = self
            .wallet_service
            .get_indy_object(
                wallet_handle,
                &recipient.header.kid,
                &RecordOptions::id_value(),
            )
            .await?;

        let sender_vk_vec = self
            .crypto_service
            .crypto_box_seal_open(&my_key, enc_sender_vk.as_slice())?;

        let sender_vk = String::from_utf8(sender_vk_vec).map_err(|err| {
            err_msg(
                IndyErrorKind::InvalidStructure,
                format!("Failed to utf-8 encode sender_vk {}", err),
            )
        })?;

        let cek_vec = self.crypto_service.crypto_box_open(
            &my_key,
            &sender_vk,
            encrypted_key_vec.as_slice(),
            iv.as_slice(),
        )?;

        let cek = xchacha20poly1305_ietf::Key::from_slice(cek_vec.as_slice())?;

        Ok((Some(sender_vk), cek))
    }

    async fn _unpack_cek_anoncrypt(
        &self,
        recipient: &Recipient,
        wallet_handle: WalletHandle,
    ) -> IndyResult<(Option<String>, xchacha20poly1305_ietf::Key)> {
        let encrypted_key_vec = base64::decode_urlsafe(&recipient.encrypted_key)?;

        let my_key: Key = self
            .wallet_service
            .get_indy_object(
                wallet_handle,
                &recipient.header.kid,
                &RecordOptions::id_value(),
            )
            .await?;

        let cek_vec = self
            .crypto_service
            .crypto_box_seal_open(&my_key, encrypted_key_vec.as_slice())?;

        let cek = xchacha20poly1305_ietf::Key::from_slice(cek_vec.as_slice())?;

        Ok((None, cek))
    }
}
