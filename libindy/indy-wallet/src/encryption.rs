use std::{collections::HashMap, str};

use indy_api_types::{domain::wallet::KeyDerivationMethod, errors::prelude::*};
use indy_utils::crypto::{
    base58::FromBase58, chacha20poly1305_ietf, hmacsha256, pwhash_argon2i13,
};

use crate::{
    storage::{StorageRecord, Tag, TagName},
    wallet::Keys,
    Metadata, WalletRecord,
};

/// Everything needed to recompute a master key from the caller's passphrase.
#[derive(Debug, Clone)]
pub enum KeyDerivationData {
    Raw(String),
    Argon2iMod(String, pwhash_argon2i13::Salt),
    Argon2iInt(String, pwhash_argon2i13::Salt),
}

impl KeyDerivationData {
    pub fn from_passphrase_with_new_salt(
        passphrase: &str,
        derivation_method: &KeyDerivationMethod,
    ) -> Self {
        let salt = pwhash_argon2i13::gen_salt();
        let passphrase = passphrase.to_owned();

        match *derivation_method {
            KeyDerivationMethod::ARGON2I_INT => KeyDerivationData::Argon2iInt(passphrase, salt),
            KeyDerivationMethod::ARGON2I_MOD => KeyDerivationData::Argon2iMod(passphrase, salt),
            KeyDerivationMethod::RAW => KeyDerivationData::Raw(passphrase),
        }
    }

    pub(super) fn from_passphrase_and_metadata(
        passphrase: &str,
        metadata: &Metadata,
        derivation_method: &KeyDerivationMethod,
    ) -> IndyResult<Self> {
        let passphrase = passphrase.to_owned();

        let data = match (derivation_method, metadata) {
            (KeyDerivationMethod::RAW, &Metadata::MetadataRaw(_)) => {
                KeyDerivationData::Raw(passphrase)
            }
            (KeyDerivationMethod::ARGON2I_INT, Metadata::MetadataArgon(metadata)) => {
                let master_key_salt =
                    pwhash_argon2i13::Salt::from_slice(&metadata.master_key_salt[..])?;
                KeyDerivationData::Argon2iInt(passphrase, master_key_salt)
            }
            (KeyDerivationMethod::ARGON2I_MOD, Metadata::MetadataArgon(metadata)) => {
                let master_key_salt =
                    pwhash_argon2i13::Salt::from_slice(&metadata.master_key_salt[..])?;
                KeyDerivationData::Argon2iMod(passphrase, master_key_salt)
            }
            _ => {
                return Err(err_msg(
                    IndyErrorKind::WalletAccessFailed,
                    "Invalid combination of KeyDerivationMethod and Metadata",
                ))
            }
        };

        Ok(data)
    }

    pub fn salt(&self) -> Option<&pwhash_argon2i13::Salt> {
        match self {
            KeyDerivationData::Raw(_) => None,
            KeyDerivationData::Argon2iMod(_, salt) | KeyDerivationData::Argon2iInt(_, salt) => {
                Some(salt)
            }
        }
    }

    pub fn method(&self) -> KeyDerivationMethod {
        match self {
            KeyDerivationData::Raw(_) => KeyDerivationMethod::RAW,
            KeyDerivationData::Argon2iMod(_, _) => KeyDerivationMethod::ARGON2I_MOD,
            KeyDerivationData::Argon2iInt(_, _) => KeyDerivationMethod::ARGON2I_INT,
        }
    }

    /// CPU heavy for the Argon2i variants; run it off the async executor.
    pub fn calc_master_key(&self) -> IndyResult<chacha20poly1305_ietf::Key> {
        match self {
            KeyDerivationData::Raw(passphrase) => _raw_master_key(passphrase),
            KeyDerivationData::Argon2iInt(passphrase, salt) => {
                _derive_master_key(passphrase, salt, &KeyDerivationMethod::ARGON2I_INT)
            }
            KeyDerivationData::Argon2iMod(passphrase, salt) => {
                _derive_master_key(passphrase, salt, &KeyDerivationMethod::ARGON2I_MOD)
            }
        }
    }
}

fn _derive_master_key(
    passphrase: &str,
    salt: &pwhash_argon2i13::Salt,
    key_derivation_method: &KeyDerivationMethod,
) -> IndyResult<chacha20poly1305_ietf::Key> {
    let key = chacha20poly1305_ietf::derive_key(passphrase, salt, key_derivation_method)?;
    Ok(key)
}

fn _raw_master_key(passphrase: &str) -> IndyResult<chacha20poly1305_ietf::Key> {
    let key = passphrase.from_base58().map_err(|err| {
        err.map(
            IndyErrorKind::InvalidStructure,
            "Invalid RAW key: not a base58 string",
        )
    })?;

    chacha20poly1305_ietf::Key::from_slice(&key).map_err(|err| {
        err.map(
            IndyErrorKind::InvalidStructure,
            "Invalid RAW key: must decode to 32 bytes",
        )
    })
}

/// Deterministic encryption: the nonce is derived from an HMAC of the data,
/// so equal inputs give equal ciphertexts and can be matched by storage.
pub(super) fn encrypt_as_searchable(
    data: &[u8],
    key: &chacha20poly1305_ietf::Key,
    hmac_key: &hmacsha256::Key,
) -> IndyResult<Vec<u8>> {
    let tag = hmacsha256::authenticate(data, hmac_key)?;
    let nonce = chacha20poly1305_ietf::Nonce::from_slice(&tag.0[..chacha20poly1305_ietf::NONCEBYTES])?;
    let ct = chacha20poly1305_ietf::encrypt(data, key, &nonce)?;

    let mut result: Vec<u8> = Vec::with_capacity(nonce.0.len() + ct.len());
    result.extend_from_slice(&nonce.0);
    result.extend_from_slice(&ct);
    Ok(result)
}

pub(super) fn encrypt_as_not_searchable(
    data: &[u8],
    key: &chacha20poly1305_ietf::Key,
) -> IndyResult<Vec<u8>> {
    let (ct, nonce) = chacha20poly1305_ietf::gen_nonce_and_encrypt(data, key)?;

    let mut result: Vec<u8> = Vec::with_capacity(nonce.0.len() + ct.len());
    result.extend_from_slice(&nonce.0);
    result.extend_from_slice(&ct);
    Ok(result)
}

pub(super) fn decrypt_merged(
    joined_data: &[u8],
    key: &chacha20poly1305_ietf::Key,
) -> IndyResult<Vec<u8>> {
    if joined_data.len() < chacha20poly1305_ietf::NONCEBYTES {
        return Err(err_msg(
            IndyErrorKind::InvalidStructure,
            "Encrypted data is shorter than nonce",
        ));
    }

    let (nonce, data) = joined_data.split_at(chacha20poly1305_ietf::NONCEBYTES);
    let nonce = chacha20poly1305_ietf::Nonce::from_slice(nonce)?;
    chacha20poly1305_ietf::decrypt(data, key, &nonce)
}

/// Tag names starting with `~` keep their value in plaintext; the `~` itself
/// is not stored.
pub(super) fn encrypt_tags(
    tags: &HashMap<String, String>,
    tag_name_key: &chacha20poly1305_ietf::Key,
    tag_value_key: &chacha20poly1305_ietf::Key,
    tags_hmac_key: &hmacsha256::Key,
) -> IndyResult<Vec<Tag>> {
    tags.iter()
        .map(|(tag_name, tag_value)| {
            if let Some(plain_name) = tag_name.strip_prefix('~') {
                Ok(Tag::PlainText(
                    encrypt_as_searchable(plain_name.as_bytes(), tag_name_key, tags_hmac_key)?,
                    tag_value.to_string(),
                ))
            } else {
                Ok(Tag::Encrypted(
                    encrypt_as_searchable(tag_name.as_bytes(), tag_name_key, tags_hmac_key)?,
                    encrypt_as_searchable(tag_value.as_bytes(), tag_value_key, tags_hmac_key)?,
                ))
            }
        })
        .collect()
}

pub(super) fn encrypt_tag_names(
    tag_names: &[&str],
    tag_name_key: &chacha20poly1305_ietf::Key,
    tags_hmac_key: &hmacsha256::Key,
) -> IndyResult<Vec<TagName>> {
    tag_names
        .iter()
        .map(|tag_name| {
            if let Some(plain_name) = tag_name.strip_prefix('~') {
                Ok(TagName::OfPlain(encrypt_as_searchable(
                    plain_name.as_bytes(),
                    tag_name_key,
                    tags_hmac_key,
                )?))
            } else {
                Ok(TagName::OfEncrypted(encrypt_as_searchable(
                    tag_name.as_bytes(),
                    tag_name_key,
                    tags_hmac_key,
                )?))
            }
        })
        .collect()
}

fn _decrypt_utf8(
    data: &[u8],
    key: &chacha20poly1305_ietf::Key,
    what: &'static str,
) -> IndyResult<String> {
    let decrypted = decrypt_merged(data, key)?;
    String::from_utf8(decrypted).to_indy(
        IndyErrorKind::WalletEncodingError,
        format!("Invalid UTF8 in {what}"),
    )
}

pub(super) fn decrypt_tags(
    etags: &Option<Vec<Tag>>,
    tag_name_key: &chacha20poly1305_ietf::Key,
    tag_value_key: &chacha20poly1305_ietf::Key,
) -> IndyResult<Option<HashMap<String, String>>> {
    match etags {
        None => Ok(None),
        Some(etags) => {
            let mut tags: HashMap<String, String> = HashMap::new();

            for etag in etags {
                let (name, value) = match etag {
                    Tag::PlainText(ref ename, ref value) => {
                        let name = _decrypt_utf8(ename, tag_name_key, "tag name")?;
                        (format!("~{name}"), value.clone())
                    }
                    Tag::Encrypted(ref ename, ref evalue) => {
                        let name = _decrypt_utf8(ename, tag_name_key, "tag name")?;
                        let value = _decrypt_utf8(evalue, tag_value_key, "tag value")?;
                        (name, value)
                    }
                };
                tags.insert(name, value);
            }

            Ok(Some(tags))
        }
    }
}

pub(super) fn decrypt_storage_record(
    record: &StorageRecord,
    keys: &Keys,
) -> IndyResult<WalletRecord> {
    let decrypted_name = _decrypt_utf8(&record.id, &keys.name_key, "record id")?;

    let decrypted_value = match record.value {
        Some(ref value) => Some(value.decrypt(&keys.value_key)?),
        None => None,
    };

    let decrypted_type = match record.type_ {
        Some(ref type_) => Some(_decrypt_utf8(type_, &keys.type_key, "record type")?),
        None => None,
    };

    let decrypted_tags = decrypt_tags(&record.tags, &keys.tag_name_key, &keys.tag_value_key)?;

    Ok(WalletRecord::new(
        decrypted_name,
        decrypted_type,
        decrypted_value,
        decrypted_tags,
    ))
}
