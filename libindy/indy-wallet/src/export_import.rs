use std::{
    fs,
    io::{self, BufReader, BufWriter, Read, Write},
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use indy_api_types::{domain::wallet::Record, errors::prelude::*};
use indy_utils::crypto::{
    chacha20poly1305_ietf::{self, Key, Nonce},
    hash::{sha256, HASHBYTES},
    pwhash_argon2i13,
};
use serde::{Deserialize, Serialize};

use crate::{encryption::KeyDerivationData, wallet::Wallet};

const CHUNK_SIZE: usize = 1024;

// Upper bounds for the unauthenticated parts of an export file header.
const MAX_HEADER_LEN: usize = 4 * 1024;
const MAX_CHUNK_SIZE: usize = 1024 * 1024;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub(super) enum EncryptionMethod {
    // **ChaCha20-Poly1305-IETF** cypher in blocks per chunk_size bytes
    ChaCha20Poly1305IETF {
        // pwhash_argon2i13::Salt as bytes. Random salt used for deriving of key from passphrase
        salt: Vec<u8>,
        // chacha20poly1305_ietf::Nonce as bytes. Random start nonce. We increment nonce for each
        // chunk to be sure in export file consistency
        nonce: Vec<u8>,
        // size of encrypted chunk
        chunk_size: usize,
    },
    // **ChaCha20-Poly1305-IETF interactive key derivation** cypher in blocks per chunk_size bytes
    ChaCha20Poly1305IETFInteractive {
        salt: Vec<u8>,
        nonce: Vec<u8>,
        chunk_size: usize,
    },
    // **ChaCha20-Poly1305-IETF raw key** cypher in blocks per chunk_size bytes
    ChaCha20Poly1305IETFRaw {
        nonce: Vec<u8>,
        chunk_size: usize,
    },
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub(super) struct Header {
    // Method of encryption for encrypted stream
    pub encryption_method: EncryptionMethod,
    // Export time in seconds from UNIX Epoch
    pub time: u64,
    // Version of header
    pub version: u32,
}

/// Buffers plaintext and writes it as `ct || tag` chunks, incrementing the
/// nonce after every chunk.
struct ChunkedEncryptor<W: Write> {
    inner: W,
    key: Key,
    nonce: Nonce,
    chunk_size: usize,
    buffer: Vec<u8>,
}

impl<W: Write> ChunkedEncryptor<W> {
    fn new(inner: W, key: Key, nonce: Nonce, chunk_size: usize) -> Self {
        ChunkedEncryptor {
            inner,
            key,
            nonce,
            chunk_size,
            buffer: Vec::with_capacity(chunk_size),
        }
    }

    fn write_chunk(&mut self, chunk: &[u8]) -> IndyResult<()> {
        let encrypted = chacha20poly1305_ietf::encrypt(chunk, &self.key, &self.nonce)?;
        self.nonce.increment();
        self.inner.write_all(&encrypted)?;
        Ok(())
    }

    fn write_all(&mut self, mut data: &[u8]) -> IndyResult<()> {
        while !data.is_empty() {
            let free = self.chunk_size - self.buffer.len();
            let take = free.min(data.len());
            self.buffer.extend_from_slice(&data[..take]);
            data = &data[take..];

            if self.buffer.len() == self.chunk_size {
                let chunk = std::mem::take(&mut self.buffer);
                self.write_chunk(&chunk)?;
            }
        }
        Ok(())
    }

    fn finish(mut self) -> IndyResult<W> {
        if !self.buffer.is_empty() {
            let chunk = std::mem::take(&mut self.buffer);
            self.write_chunk(&chunk)?;
        }
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Reverse of `ChunkedEncryptor`. A chunk that fails authentication means the
/// export key is wrong or the file is damaged.
struct ChunkedDecryptor<R: Read> {
    inner: R,
    key: Key,
    nonce: Nonce,
    chunk_size: usize,
    buffer: Vec<u8>,
    position: usize,
}

impl<R: Read> ChunkedDecryptor<R> {
    fn new(inner: R, key: Key, nonce: Nonce, chunk_size: usize) -> Self {
        ChunkedDecryptor {
            inner,
            key,
            nonce,
            chunk_size,
            buffer: Vec::new(),
            position: 0,
        }
    }

    fn fill(&mut self) -> IndyResult<bool> {
        let encrypted_len = self
            .chunk_size
            .checked_add(chacha20poly1305_ietf::TAGBYTES)
            .ok_or_else(|| err_msg(IndyErrorKind::InvalidStructure, "Invalid chunk size"))?;

        let mut encrypted = vec![0u8; encrypted_len];
        let mut read = 0;

        while read < encrypted.len() {
            match self.inner.read(&mut encrypted[read..])? {
                0 => break,
                n => read += n,
            }
        }

        if read == 0 {
            return Ok(false);
        }

        self.buffer = chacha20poly1305_ietf::decrypt(&encrypted[..read], &self.key, &self.nonce)
            .map_err(|err| {
                err.map(
                    IndyErrorKind::WalletAccessFailed,
                    "Invalid export key or damaged export file",
                )
            })?;
        self.nonce.increment();
        self.position = 0;
        Ok(true)
    }

    fn read_exact(&mut self, out: &mut [u8]) -> IndyResult<()> {
        let mut written = 0;

        while written < out.len() {
            if self.position == self.buffer.len() && !self.fill()? {
                return Err(err_msg(
                    IndyErrorKind::InvalidStructure,
                    "Unexpected end of export file",
                ));
            }

            let available = self.buffer.len() - self.position;
            let take = available.min(out.len() - written);
            out[written..written + take]
                .copy_from_slice(&self.buffer[self.position..self.position + take]);
            self.position += take;
            written += take;
        }

        Ok(())
    }

    fn read_u32(&mut self) -> IndyResult<u32> {
        let mut bytes = [0u8; 4];
        self.read_exact(&mut bytes)?;
        Ok(u32::from_le_bytes(bytes))
    }
}

/// Writes every record of `wallet` to `writer`:
/// `u32 LE header length || header || encrypted(sha256(header) || (u32 LE len || record)* || 0u32)`.
pub(super) async fn export_continue<W: Write>(
    wallet: Arc<Wallet>,
    writer: W,
    version: u32,
    key: Key,
    key_data: &KeyDerivationData,
) -> IndyResult<()> {
    let nonce = chacha20poly1305_ietf::gen_nonce();
    let chunk_size = CHUNK_SIZE;

    let encryption_method = match key_data {
        KeyDerivationData::Argon2iMod(_, salt) => EncryptionMethod::ChaCha20Poly1305IETF {
            salt: salt.as_bytes().to_vec(),
            nonce: nonce.as_bytes().to_vec(),
            chunk_size,
        },
        KeyDerivationData::Argon2iInt(_, salt) => {
            EncryptionMethod::ChaCha20Poly1305IETFInteractive {
                salt: salt.as_bytes().to_vec(),
                nonce: nonce.as_bytes().to_vec(),
                chunk_size,
            }
        }
        KeyDerivationData::Raw(_) => EncryptionMethod::ChaCha20Poly1305IETFRaw {
            nonce: nonce.as_bytes().to_vec(),
            chunk_size,
        },
    };

    let header = Header {
        encryption_method,
        time: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .to_indy(IndyErrorKind::InvalidState, "System time is before UNIX epoch")?
            .as_secs(),
        version,
    };

    let header = rmp_serde::to_vec(&header).to_indy(
        IndyErrorKind::InvalidState,
        "Can't serialize wallet export file header",
    )?;

    let mut writer = BufWriter::new(writer);
    writer.write_u32::<LittleEndian>(header.len() as u32)?;
    writer.write_all(&header)?;

    let mut writer = ChunkedEncryptor::new(writer, key, nonce, chunk_size);
    writer.write_all(&sha256(&header))?;

    let mut records = wallet.get_all().await?;

    while let Some(record) = records.next().await? {
        let record = Record {
            type_: record.get_type().map(String::from).ok_or_else(|| {
                err_msg(
                    IndyErrorKind::InvalidState,
                    "No type fetched for exported record",
                )
            })?,
            id: record.get_id().to_string(),
            value: record.get_value().map(String::from).ok_or_else(|| {
                err_msg(
                    IndyErrorKind::InvalidState,
                    "No value fetched for exported record",
                )
            })?,
            tags: record.get_tags().cloned().unwrap_or_default(),
        };

        let record = rmp_serde::to_vec(&record)
            .to_indy(IndyErrorKind::InvalidState, "Can't serialize export record")?;

        writer.write_all(&(record.len() as u32).to_le_bytes())?;
        writer.write_all(&record)?;
    }

    writer.write_all(&0u32.to_le_bytes())?;
    writer.finish()?;

    Ok(())
}

/// Reads the plaintext header of an export file and returns everything needed
/// to derive the import key and decrypt the rest.
#[allow(clippy::type_complexity)]
pub(super) fn preparse_file_to_import<T>(
    reader: T,
    passphrase: &str,
) -> IndyResult<(BufReader<T>, KeyDerivationData, Nonce, usize, Vec<u8>)>
where
    T: Read,
{
    let mut reader = BufReader::new(reader);

    let header_len = reader.read_u32::<LittleEndian>().map_err(_map_io_err)? as usize;

    if header_len == 0 || header_len > MAX_HEADER_LEN {
        return Err(err_msg(
            IndyErrorKind::InvalidStructure,
            format!("Invalid header length {}", header_len),
        ));
    }

    let mut header_bytes = vec![0u8; header_len];
    reader.read_exact(&mut header_bytes).map_err(_map_io_err)?;

    let header: Header = rmp_serde::from_slice(&header_bytes)
        .to_indy(IndyErrorKind::InvalidStructure, "Header is malformed json")?;

    if header.version != 0 {
        return Err(err_msg(
            IndyErrorKind::InvalidStructure,
            "Unsupported version",
        ));
    }

    let passphrase = passphrase.to_string();

    let (import_key_derivation_data, nonce, chunk_size) = match header.encryption_method {
        EncryptionMethod::ChaCha20Poly1305IETF {
            salt,
            nonce,
            chunk_size,
        } => {
            let salt = pwhash_argon2i13::Salt::from_slice(&salt)?;
            let nonce = Nonce::from_slice(&nonce)?;
            (
                KeyDerivationData::Argon2iMod(passphrase, salt),
                nonce,
                chunk_size,
            )
        }
        EncryptionMethod::ChaCha20Poly1305IETFInteractive {
            salt,
            nonce,
            chunk_size,
        } => {
            let salt = pwhash_argon2i13::Salt::from_slice(&salt)?;
            let nonce = Nonce::from_slice(&nonce)?;
            (
                KeyDerivationData::Argon2iInt(passphrase, salt),
                nonce,
                chunk_size,
            )
        }
        EncryptionMethod::ChaCha20Poly1305IETFRaw { nonce, chunk_size } => {
            let nonce = Nonce::from_slice(&nonce)?;
            (KeyDerivationData::Raw(passphrase), nonce, chunk_size)
        }
    };

    if chunk_size == 0 || chunk_size > MAX_CHUNK_SIZE {
        return Err(err_msg(
            IndyErrorKind::InvalidStructure,
            format!("Invalid chunk size {} in header", chunk_size),
        ));
    }

    Ok((
        reader,
        import_key_derivation_data,
        nonce,
        chunk_size,
        header_bytes,
    ))
}

pub(super) async fn finish_import<T>(
    wallet: &Wallet,
    reader: BufReader<T>,
    key: Key,
    nonce: Nonce,
    chunk_size: usize,
    header_bytes: Vec<u8>,
) -> IndyResult<()>
where
    T: Read,
{
    let mut reader = ChunkedDecryptor::new(reader, key, nonce, chunk_size);

    let mut header_hash = vec![0u8; HASHBYTES];
    reader.read_exact(&mut header_hash)?;

    if sha256(&header_bytes) != header_hash {
        return Err(err_msg(
            IndyErrorKind::InvalidStructure,
            "Invalid header hash",
        ));
    }

    loop {
        let record_len = reader.read_u32()? as usize;

        if record_len == 0 {
            break;
        }

        let mut record = vec![0u8; record_len];
        reader.read_exact(&mut record)?;

        let record: Record = rmp_serde::from_slice(&record).to_indy(
            IndyErrorKind::InvalidStructure,
            "Record is malformed msgpack",
        )?;

        wallet
            .add(&record.type_, &record.id, &record.value, &record.tags, false)
            .await?;
    }

    Ok(())
}

fn _map_io_err(err: io::Error) -> IndyError {
    match err.kind() {
        io::ErrorKind::UnexpectedEof => err_msg(
            IndyErrorKind::InvalidStructure,
            "Unexpected end of export file",
        ),
        _ => err.into(),
    }
}

pub(super) fn create_export_file(path: &str) -> IndyResult<fs::File> {
    let path = std::path::PathBuf::from(path);

    if let Some(parent_path) = path.parent() {
        fs::DirBuilder::new().recursive(true).create(parent_path)?;
    }

    let file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)?;

    Ok(file)
}
