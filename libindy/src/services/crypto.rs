use indy_api_types::errors::prelude::*;
use indy_utils::crypto::{
    base58::{FromBase58, ToBase58},
    base64, ed25519_box, ed25519_sign, sealedbox, xchacha20poly1305_ietf,
};

use crate::domain::crypto::{
    did::{Did, DidValue, MyDidInfo, TheirDid, TheirDidInfo},
    key::{Key, KeyInfo},
    DEFAULT_CRYPTO_TYPE, ED25519,
};

/// Key and DID derivation plus the box, seal and AEAD primitives behind
/// message encryption. Stateless; keys come from the wallet.
pub(crate) struct CryptoService {}

impl CryptoService {
    pub(crate) fn new() -> CryptoService {
        CryptoService {}
    }

    pub(crate) fn create_key(&self, key_info: &KeyInfo) -> IndyResult<Key> {
        trace!("create_key >>> key_info: {:?}", secret!(key_info));

        let crypto_type = self._crypto_type(key_info.crypto_type.as_deref())?;
        let seed = self.convert_seed(key_info.seed.as_deref())?;

        let (vk, sk) = ed25519_sign::create_key_pair_for_signature(seed.as_ref())?;
        let mut vk = vk.as_bytes().to_base58();
        let sk = sk.as_bytes().to_base58();

        if crypto_type != DEFAULT_CRYPTO_TYPE {
            // Use suffix with crypto type name to store crypto type inside of vk
            vk = format!("{}:{}", vk, crypto_type);
        }

        let key = Key::new(vk, sk);

        trace!("create_key <<< key: {:?}", key);

        Ok(key)
    }

    pub(crate) fn create_my_did(&self, my_did_info: &MyDidInfo) -> IndyResult<(Did, Key)> {
        trace!("create_my_did >>> my_did_info: {:?}", secret!(my_did_info));

        let crypto_type = self._crypto_type(my_did_info.crypto_type.as_deref())?;
        let seed = self.convert_seed(my_did_info.seed.as_deref())?;

        let (vk, sk) = ed25519_sign::create_key_pair_for_signature(seed.as_ref())?;

        let did = match my_did_info.did {
            Some(ref did) => {
                self.validate_did(did)?;
                did.to_short().0
            }
            None if my_did_info.cid == Some(true) => vk.as_bytes().to_base58(),
            None => vk.as_bytes()[0..16].to_vec().to_base58(),
        };

        let did = match my_did_info.did {
            Some(ref did) if did.is_fully_qualified() => did.clone(),
            _ => DidValue::new(
                &did,
                my_did_info.ledger_type.as_deref(),
                my_did_info.method_name.as_ref().map(|method| method.0.as_str()),
            )?,
        };

        let mut vk = vk.as_bytes().to_base58();
        let sk = sk.as_bytes().to_base58();

        if crypto_type != DEFAULT_CRYPTO_TYPE {
            vk = format!("{}:{}", vk, crypto_type);
        }

        let did = (Did::new(did, vk.clone()), Key::new(vk, sk));

        trace!("create_my_did <<< did: {:?}", did);

        Ok(did)
    }

    pub(crate) fn create_their_did(&self, their_did_info: &TheirDidInfo) -> IndyResult<TheirDid> {
        trace!("create_their_did >>> their_did_info: {:?}", their_did_info);

        self.validate_did(&their_did_info.did)?;

        let verkey = self.build_full_verkey(
            &their_did_info.did.to_unqualified().0,
            their_did_info.verkey.as_deref(),
        )?;

        self.validate_key(&verkey)?;

        let their_did = TheirDid {
            did: their_did_info.did.clone(),
            verkey,
        };

        trace!("create_their_did <<< their_did: {:?}", their_did);

        Ok(their_did)
    }

    /// Expands an abbreviated verkey (`~` + tail) with the DID bytes. A missing
    /// verkey means the DID itself is the full verkey.
    pub(crate) fn build_full_verkey(&self, dest: &str, verkey: Option<&str>) -> IndyResult<String> {
        let verkey = match verkey {
            Some(verkey) => verkey,
            None => return Ok(dest.to_string()),
        };

        let (verkey, crypto_type) = match verkey.split_once(':') {
            Some((verkey, crypto_type)) => (verkey, Some(crypto_type)),
            None => (verkey, None),
        };

        let verkey = match verkey.strip_prefix('~') {
            Some(tail) => {
                let mut full = dest.from_base58()?;
                full.extend(tail.from_base58()?);
                full.to_base58()
            }
            None => verkey.to_string(),
        };

        Ok(match crypto_type {
            Some(crypto_type) => format!("{}:{}", verkey, crypto_type),
            None => verkey,
        })
    }

    pub(crate) fn sign(&self, my_key: &Key, doc: &[u8]) -> IndyResult<Vec<u8>> {
        trace!("sign >>> my_key: {:?}, doc: {:?}", my_key, doc);

        let (_, crypto_type) = self._split_verkey(&my_key.verkey)?;
        self._crypto_type(crypto_type)?;

        let my_sk = ed25519_sign::SecretKey::from_slice(&my_key.signkey.from_base58()?)?;
        let signature = ed25519_sign::sign(&my_sk, doc)?.as_bytes().to_vec();

        trace!("sign <<< signature: {:?}", signature);

        Ok(signature)
    }

    pub(crate) fn verify(&self, their_vk: &str, msg: &[u8], signature: &[u8]) -> IndyResult<bool> {
        trace!(
            "verify >>> their_vk: {:?}, msg: {:?}, signature: {:?}",
            their_vk,
            msg,
            signature
        );

        let their_vk = self._public_key(their_vk)?;
        let signature = ed25519_sign::Signature::from_slice(signature)?;

        let valid = ed25519_sign::verify(&their_vk, msg, &signature)?;

        trace!("verify <<< valid: {:?}", valid);

        Ok(valid)
    }

    pub(crate) fn crypto_box(
        &self,
        my_key: &Key,
        their_vk: &str,
        doc: &[u8],
    ) -> IndyResult<(Vec<u8>, Vec<u8>)> {
        trace!(
            "crypto_box >>> my_key: {:?}, their_vk: {:?}, doc: {:?}",
            my_key,
            their_vk,
            doc
        );

        let my_sk = self._curve_secret_key(my_key)?;
        let their_pk = ed25519_sign::vk_to_curve25519(&self._public_key(their_vk)?)?;

        let nonce = ed25519_box::gen_nonce();
        let encrypted = ed25519_box::encrypt(&my_sk, &their_pk, doc, &nonce)?;

        let res = (encrypted, nonce.as_bytes().to_vec());

        trace!("crypto_box <<< res: {:?}", res);

        Ok(res)
    }

    pub(crate) fn crypto_box_open(
        &self,
        my_key: &Key,
        their_vk: &str,
        doc: &[u8],
        nonce: &[u8],
    ) -> IndyResult<Vec<u8>> {
        trace!(
            "crypto_box_open >>> my_key: {:?}, their_vk: {:?}, doc: {:?}, nonce: {:?}",
            my_key,
            their_vk,
            doc,
            nonce
        );

        let my_sk = self._curve_secret_key(my_key)?;
        let their_pk = ed25519_sign::vk_to_curve25519(&self._public_key(their_vk)?)?;
        let nonce = ed25519_box::Nonce::from_slice(nonce)?;

        let decrypted = ed25519_box::decrypt(&my_sk, &their_pk, doc, &nonce)?;

        trace!("crypto_box_open <<< decrypted: {:?}", decrypted);

        Ok(decrypted)
    }

    pub(crate) fn crypto_box_seal(&self, their_vk: &str, doc: &[u8]) -> IndyResult<Vec<u8>> {
        trace!("crypto_box_seal >>> their_vk: {:?}, doc: {:?}", their_vk, doc);

        let their_pk = ed25519_sign::vk_to_curve25519(&self._public_key(their_vk)?)?;
        let encrypted = sealedbox::encrypt(&their_pk, doc)?;

        trace!("crypto_box_seal <<< encrypted: {:?}", encrypted);

        Ok(encrypted)
    }

    pub(crate) fn crypto_box_seal_open(&self, my_key: &Key, doc: &[u8]) -> IndyResult<Vec<u8>> {
        trace!("crypto_box_seal_open >>> my_key: {:?}, doc: {:?}", my_key, doc);

        let my_pk = ed25519_sign::vk_to_curve25519(&self._public_key(&my_key.verkey)?)?;
        let my_sk = self._curve_secret_key(my_key)?;

        let decrypted = sealedbox::decrypt(&my_pk, &my_sk, doc)?;

        trace!("crypto_box_seal_open <<< decrypted: {:?}", decrypted);

        Ok(decrypted)
    }

    /// A seed is either exactly 32 bytes of text or a base64 encoded 32 bytes.
    pub(crate) fn convert_seed(&self, seed: Option<&str>) -> IndyResult<Option<ed25519_sign::Seed>> {
        trace!("convert_seed >>> seed: {:?}", secret!(seed));

        let seed = match seed {
            Some(seed) => seed,
            None => return Ok(None),
        };

        let bytes = if seed.as_bytes().len() == ed25519_sign::SEEDBYTES {
            seed.as_bytes().to_vec()
        } else if seed.ends_with('=') {
            base64::decode(seed).map_err(|err| {
                err.extend("Can't deserialize Seed from Base64 string")
            })?
        } else {
            return Err(err_msg(
                IndyErrorKind::InvalidStructure,
                "Trying to use invalid seed. It must be 32 bytes or a base64 encoded 32 bytes value",
            ));
        };

        let seed = ed25519_sign::Seed::from_slice(&bytes).map_err(|err| {
            err.extend("Invalid seed length")
        })?;

        trace!("convert_seed <<<");

        Ok(Some(seed))
    }

    pub(crate) fn validate_key(&self, vk: &str) -> IndyResult<()> {
        trace!("validate_key >>> vk: {:?}", vk);

        let (vk, crypto_type) = self._split_verkey(vk)?;
        self._crypto_type(crypto_type)?;

        let (vk, expected_len) = match vk.strip_prefix('~') {
            Some(tail) => (tail, 16),
            None => (vk, 32),
        };

        let vk = vk.from_base58()?;

        if vk.len() != expected_len {
            return Err(err_msg(
                IndyErrorKind::InvalidStructure,
                format!(
                    "Trying to use invalid verkey: it has {} bytes, expected {}",
                    vk.len(),
                    expected_len
                ),
            ));
        }

        trace!("validate_key <<<");

        Ok(())
    }

    pub(crate) fn validate_did(&self, did: &DidValue) -> IndyResult<()> {
        trace!("validate_did >>> did: {:?}", did);

        let did = did.to_unqualified().0.from_base58()?;

        if did.len() != 16 && did.len() != 32 {
            return Err(err_msg(
                IndyErrorKind::InvalidStructure,
                format!(
                    "Trying to use DID with unexpected length: {}. \
                    The 16- or 32-byte number upon which a DID is based should be 22/23 or 44/45 bytes when encoded as base58.",
                    did.len()
                ),
            ));
        }

        trace!("validate_did <<<");

        Ok(())
    }

    /// Encrypts with XChaCha20-Poly1305, `aad` as associated data. Returns
    /// base64url `(ciphertext, iv, tag)`.
    pub(crate) fn encrypt_plaintext(
        &self,
        plaintext: &[u8],
        aad: &str,
        cek: &xchacha20poly1305_ietf::Key,
    ) -> IndyResult<(String, String, String)> {
        let nonce = xchacha20poly1305_ietf::gen_nonce();

        let (ciphertext, tag) =
            xchacha20poly1305_ietf::encrypt_detached(plaintext, cek, &nonce, Some(aad.as_bytes()))?;

        Ok((
            base64::encode_urlsafe(&ciphertext),
            base64::encode_urlsafe(nonce.as_bytes()),
            base64::encode_urlsafe(tag.as_bytes()),
        ))
    }

    pub(crate) fn decrypt_ciphertext(
        &self,
        ciphertext: &str,
        aad: &str,
        iv: &str,
        tag: &str,
        cek: &xchacha20poly1305_ietf::Key,
    ) -> IndyResult<String> {
        let ciphertext = base64::decode_urlsafe(ciphertext)?;
        let nonce = xchacha20poly1305_ietf::Nonce::from_slice(&base64::decode_urlsafe(iv)?)?;
        let tag = xchacha20poly1305_ietf::Tag::from_slice(&base64::decode_urlsafe(tag)?)?;

        let plaintext = xchacha20poly1305_ietf::decrypt_detached(
            &ciphertext,
            cek,
            &nonce,
            &tag,
            Some(aad.as_bytes()),
        )?;

        String::from_utf8(plaintext).to_indy(
            IndyErrorKind::InvalidStructure,
            "Decrypted message is not valid utf-8",
        )
    }

    fn _crypto_type<'a>(&self, crypto_type: Option<&'a str>) -> IndyResult<&'a str> {
        match crypto_type {
            None => Ok(DEFAULT_CRYPTO_TYPE),
            Some(ED25519) => Ok(ED25519),
            Some(crypto_type) => Err(err_msg(
                IndyErrorKind::UnknownCrypto,
                format!("Unknown crypto type: {}", crypto_type),
            )),
        }
    }

    fn _split_verkey<'a>(&self, vk: &'a str) -> IndyResult<(&'a str, Option<&'a str>)> {
        Ok(match vk.split_once(':') {
            Some((vk, crypto_type)) => (vk, Some(crypto_type)),
            None => (vk, None),
        })
    }

    fn _public_key(&self, vk: &str) -> IndyResult<ed25519_sign::PublicKey> {
        let (vk, crypto_type) = self._split_verkey(vk)?;
        self._crypto_type(crypto_type)?;

        ed25519_sign::PublicKey::from_slice(&vk.from_base58()?)
    }

    fn _curve_secret_key(&self, key: &Key) -> IndyResult<ed25519_box::SecretKey> {
        let (_, crypto_type) = self._split_verkey(&key.verkey)?;
        self._crypto_type(crypto_type)?;

        let sk = ed25519_sign::SecretKey::from_slice(&key.signkey.from_base58()?)?;
        ed25519_sign::sk_to_curve25519(&sk)
    }
}
