use std::{
    cell::RefCell,
    error::Error,
    fmt, io,
    sync::{Arc, PoisonError},
};

use log::error;
use thiserror::Error as ThisError;

#[cfg(feature = "casting_errors_anoncreds")]
use indy_credx::{Error as CredxError, ErrorKind as CredxErrorKind};

use crate::ErrorCode;

pub mod prelude {
    pub use super::{
        err_msg, get_current_error_json, set_current_error, IndyError, IndyErrorExt,
        IndyErrorKind, IndyResult, IndyResultExt,
    };
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, ThisError)]
pub enum IndyErrorKind {
    #[error("Library is in an unexpected state")]
    InvalidState,
    #[error("Malformed input")]
    InvalidStructure,
    #[error("Parameter {0} is invalid")]
    InvalidParam(u32),
    #[error("I/O failure")]
    IOError,

    #[error("Link secret name is already taken")]
    MasterSecretDuplicateName,
    #[error("Proof was not accepted")]
    ProofRejected,
    #[error("No free index left in revocation registry")]
    RevocationRegistryFull,
    #[error("Revocation index is not valid")]
    InvalidUserRevocId,
    #[error("Credential has been revoked")]
    CredentialRevoked,
    #[error("Credential definition is already stored")]
    CredDefAlreadyExists,

    #[error("Nodes did not agree on a reply")]
    NoConsensus,
    #[error("Ledger refused the transaction")]
    InvalidTransaction,
    #[error("Ledger has no such item")]
    LedgerItemNotFound,

    #[error("No pool ledger config with this name")]
    PoolNotCreated,
    #[error("Pool handle is unknown")]
    InvalidPoolHandle,
    #[error("Pool was shut down")]
    PoolTerminated,
    #[error("Pool did not answer in time")]
    PoolTimeout,
    #[error("Pool ledger config with this name is already stored")]
    PoolConfigAlreadyExists,
    #[error("Genesis transactions do not match the protocol version")]
    PoolIncompatibleProtocolVersion,

    #[error("Crypto type is not supported")]
    UnknownCrypto,

    #[error("Wallet handle is unknown")]
    InvalidWalletHandle,
    #[error("Wallet storage type is not registered")]
    UnknownWalletStorageType,
    #[error("Wallet storage type is registered twice")]
    WalletStorageTypeAlreadyRegistered,
    #[error("Wallet with this id is already stored")]
    WalletAlreadyExists,
    #[error("No wallet with this id")]
    WalletNotFound,
    #[error("Wallet is open already")]
    WalletAlreadyOpened,
    #[error("Wallet key does not match")]
    WalletAccessFailed,
    #[error("Wallet content could not be decoded")]
    WalletEncodingError,
    #[error("Wallet storage failure")]
    WalletStorageError,
    #[error("Wallet content could not be encrypted or decrypted")]
    WalletEncryptionError,
    #[error("No such wallet record")]
    WalletItemNotFound,
    #[error("Wallet record is already stored")]
    WalletItemAlreadyExists,
    #[error("Wallet query is malformed")]
    WalletQueryError,
    #[error("Search handle is unknown")]
    InvalidSearchHandle,

    #[error("DID is already stored")]
    DIDAlreadyExists,
}

/// Error kind plus the chain of context messages that led to it.
///
/// The message lives behind an `Arc` so one failure can be handed to every
/// caller waiting on the same pool reply.
#[derive(Debug, Clone, ThisError)]
pub struct IndyError {
    #[source]
    kind: IndyErrorKind,
    msg: Arc<String>,
}

impl fmt::Display for IndyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.msg.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.msg)
        }
    }
}

impl IndyError {
    pub fn from_msg<D>(kind: IndyErrorKind, msg: D) -> IndyError
    where
        D: fmt::Display + Send + Sync + 'static,
    {
        IndyError {
            kind,
            msg: Arc::new(msg.to_string()),
        }
    }

    pub fn kind(&self) -> IndyErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Keeps the kind and appends `msg` below the current message.
    pub fn extend<D>(self, msg: D) -> IndyError
    where
        D: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        let msg = chain(&self.msg, &msg);
        IndyError::from_msg(self.kind, msg)
    }

    /// Switches to `kind`, putting `msg` in front of the current message.
    pub fn map<D>(self, kind: IndyErrorKind, msg: D) -> IndyError
    where
        D: fmt::Display + Send + Sync + 'static,
    {
        let msg = chain(&msg, &self.msg);
        IndyError::from_msg(kind, msg)
    }
}

fn chain(outer: &dyn fmt::Display, inner: &dyn fmt::Display) -> String {
    format!("{outer}\n  Caused by: {inner}")
}

pub fn err_msg<D>(kind: IndyErrorKind, msg: D) -> IndyError
where
    D: fmt::Display + fmt::Debug + Send + Sync + 'static,
{
    IndyError::from_msg(kind, msg)
}

pub type IndyResult<T> = Result<T, IndyError>;

/// `to_indy` on any `Result` whose error can be displayed.
pub trait IndyResultExt<T, E> {
    fn to_indy<D>(self, kind: IndyErrorKind, msg: D) -> IndyResult<T>
    where
        D: fmt::Display + Send + Sync + 'static;
}

impl<T, E: fmt::Display> IndyResultExt<T, E> for Result<T, E> {
    fn to_indy<D>(self, kind: IndyErrorKind, msg: D) -> IndyResult<T>
    where
        D: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|err| err.to_indy(kind, msg))
    }
}

pub trait IndyErrorExt {
    fn to_indy<D>(self, kind: IndyErrorKind, msg: D) -> IndyError
    where
        D: fmt::Display + Send + Sync + 'static;
}

impl<E: fmt::Display> IndyErrorExt for E {
    fn to_indy<D>(self, kind: IndyErrorKind, msg: D) -> IndyError
    where
        D: fmt::Display + Send + Sync + 'static,
    {
        IndyError::from_msg(kind, chain(&msg, &self))
    }
}

impl From<IndyErrorKind> for IndyError {
    fn from(kind: IndyErrorKind) -> IndyError {
        IndyError::from_msg(kind, "")
    }
}

impl From<io::Error> for IndyError {
    fn from(err: io::Error) -> Self {
        IndyError::from_msg(IndyErrorKind::IOError, err)
    }
}

impl From<serde_json::Error> for IndyError {
    fn from(err: serde_json::Error) -> Self {
        err.to_indy(IndyErrorKind::InvalidStructure, "Invalid json")
    }
}

impl<T> From<PoisonError<T>> for IndyError {
    fn from(err: PoisonError<T>) -> Self {
        IndyError::from_msg(IndyErrorKind::InvalidState, err.to_string())
    }
}

impl From<log::SetLoggerError> for IndyError {
    fn from(err: log::SetLoggerError) -> IndyError {
        err.to_indy(IndyErrorKind::InvalidState, "Logger is already set")
    }
}

#[cfg(feature = "casting_errors_misc")]
impl From<bs58::decode::Error> for IndyError {
    fn from(err: bs58::decode::Error) -> Self {
        err.to_indy(IndyErrorKind::InvalidStructure, "Invalid base58 string")
    }
}

#[cfg(feature = "casting_errors_misc")]
impl From<base64::DecodeError> for IndyError {
    fn from(err: base64::DecodeError) -> Self {
        err.to_indy(IndyErrorKind::InvalidStructure, "Invalid base64 string")
    }
}

#[cfg(feature = "casting_errors_wallet")]
impl From<rmp_serde::encode::Error> for IndyError {
    fn from(err: rmp_serde::encode::Error) -> Self {
        err.to_indy(IndyErrorKind::InvalidState, "MessagePack encoding failed")
    }
}

#[cfg(feature = "casting_errors_wallet")]
impl From<rmp_serde::decode::Error> for IndyError {
    fn from(err: rmp_serde::decode::Error) -> Self {
        err.to_indy(IndyErrorKind::InvalidStructure, "MessagePack decoding failed")
    }
}

#[cfg(feature = "casting_errors_wallet")]
impl From<sqlx::Error> for IndyError {
    fn from(err: sqlx::Error) -> IndyError {
        // 2067 and 1555 are SQLITE_CONSTRAINT_UNIQUE and SQLITE_CONSTRAINT_PRIMARYKEY
        let unique_violation = matches!(
            &err,
            sqlx::Error::Database(db) if matches!(db.code().as_deref(), Some("2067" | "1555"))
        );

        let (kind, msg) = match &err {
            sqlx::Error::RowNotFound => (IndyErrorKind::WalletItemNotFound, "No such row"),
            sqlx::Error::Io(_) => (IndyErrorKind::IOError, "SQLite I/O failed"),
            _ if unique_violation => (
                IndyErrorKind::WalletItemAlreadyExists,
                "Row with this key is already stored",
            ),
            _ => (IndyErrorKind::InvalidState, "SQLite call failed"),
        };

        err.to_indy(kind, msg)
    }
}

#[cfg(feature = "casting_errors_anoncreds")]
impl From<CredxError> for IndyError {
    fn from(err: CredxError) -> Self {
        let kind = match err.kind() {
            CredxErrorKind::Input => IndyErrorKind::InvalidStructure,
            CredxErrorKind::IOError => IndyErrorKind::IOError,
            CredxErrorKind::InvalidState | CredxErrorKind::Unexpected => {
                IndyErrorKind::InvalidState
            }
            CredxErrorKind::CredentialRevoked => IndyErrorKind::CredentialRevoked,
            CredxErrorKind::InvalidUserRevocId => IndyErrorKind::InvalidUserRevocId,
            CredxErrorKind::ProofRejected => IndyErrorKind::ProofRejected,
            CredxErrorKind::RevocationRegistryFull => IndyErrorKind::RevocationRegistryFull,
        };

        err.to_indy(kind, "Credx call failed")
    }
}

/// `InvalidParam(n)` maps to the n-th entry.
const INVALID_PARAM_CODES: [ErrorCode; 14] = [
    ErrorCode::CommonInvalidParam1,
    ErrorCode::CommonInvalidParam2,
    ErrorCode::CommonInvalidParam3,
    ErrorCode::CommonInvalidParam4,
    ErrorCode::CommonInvalidParam5,
    ErrorCode::CommonInvalidParam6,
    ErrorCode::CommonInvalidParam7,
    ErrorCode::CommonInvalidParam8,
    ErrorCode::CommonInvalidParam9,
    ErrorCode::CommonInvalidParam10,
    ErrorCode::CommonInvalidParam11,
    ErrorCode::CommonInvalidParam12,
    ErrorCode::CommonInvalidParam13,
    ErrorCode::CommonInvalidParam14,
];

macro_rules! kind_codes {
    ($($kind:ident <=> $code:ident),+ $(,)?) => {
        fn kind_to_code(kind: IndyErrorKind) -> ErrorCode {
            match kind {
                IndyErrorKind::InvalidParam(n) => (n as usize)
                    .checked_sub(1)
                    .and_then(|idx| INVALID_PARAM_CODES.get(idx).copied())
                    .unwrap_or(ErrorCode::CommonInvalidState),
                $(IndyErrorKind::$kind => ErrorCode::$code,)+
            }
        }

        fn code_to_kind(code: ErrorCode) -> IndyErrorKind {
            if let Some(idx) = INVALID_PARAM_CODES.iter().position(|c| *c == code) {
                return IndyErrorKind::InvalidParam(idx as u32 + 1);
            }

            match code {
                $(ErrorCode::$code => IndyErrorKind::$kind,)+
                ErrorCode::AnoncredsAccumulatorIsFull => IndyErrorKind::RevocationRegistryFull,
                ErrorCode::WalletInputError => IndyErrorKind::WalletEncodingError,
                _ => IndyErrorKind::InvalidState,
            }
        }
    };
}

kind_codes! {
    InvalidState <=> CommonInvalidState,
    InvalidStructure <=> CommonInvalidStructure,
    IOError <=> CommonIOError,
    MasterSecretDuplicateName <=> AnoncredsMasterSecretDuplicateNameError,
    ProofRejected <=> AnoncredsProofRejected,
    RevocationRegistryFull <=> AnoncredsRevocationRegistryFullError,
    InvalidUserRevocId <=> AnoncredsInvalidUserRevocId,
    CredentialRevoked <=> AnoncredsCredentialRevoked,
    CredDefAlreadyExists <=> AnoncredsCredDefAlreadyExistsError,
    NoConsensus <=> LedgerNoConsensusError,
    InvalidTransaction <=> LedgerInvalidTransaction,
    LedgerItemNotFound <=> LedgerNotFound,
    PoolNotCreated <=> PoolLedgerNotCreatedError,
    InvalidPoolHandle <=> PoolLedgerInvalidPoolHandle,
    PoolTerminated <=> PoolLedgerTerminated,
    PoolTimeout <=> PoolLedgerTimeout,
    PoolConfigAlreadyExists <=> PoolLedgerConfigAlreadyExistsError,
    PoolIncompatibleProtocolVersion <=> PoolIncompatibleProtocolVersion,
    UnknownCrypto <=> UnknownCryptoTypeError,
    InvalidWalletHandle <=> WalletInvalidHandle,
    UnknownWalletStorageType <=> WalletUnknownTypeError,
    WalletStorageTypeAlreadyRegistered <=> WalletTypeAlreadyRegisteredError,
    WalletAlreadyExists <=> WalletAlreadyExistsError,
    WalletNotFound <=> WalletNotFoundError,
    WalletAlreadyOpened <=> WalletAlreadyOpenedError,
    WalletAccessFailed <=> WalletAccessFailed,
    WalletEncodingError <=> WalletDecodingError,
    WalletStorageError <=> WalletStorageError,
    WalletEncryptionError <=> WalletEncryptionError,
    WalletItemNotFound <=> WalletItemNotFound,
    WalletItemAlreadyExists <=> WalletItemAlreadyExists,
    WalletQueryError <=> WalletQueryError,
    InvalidSearchHandle <=> WalletInvalidSearchHandle,
    DIDAlreadyExists <=> DidAlreadyExistsError,
}

impl From<IndyErrorKind> for ErrorCode {
    fn from(kind: IndyErrorKind) -> ErrorCode {
        kind_to_code(kind)
    }
}

impl From<ErrorCode> for IndyErrorKind {
    fn from(code: ErrorCode) -> IndyErrorKind {
        code_to_kind(code)
    }
}

/// Records `err` as the current error of this thread.
impl From<IndyError> for ErrorCode {
    fn from(err: IndyError) -> ErrorCode {
        set_current_error(&err);
        err.kind().into()
    }
}

impl<T> From<IndyResult<T>> for ErrorCode {
    fn from(res: IndyResult<T>) -> ErrorCode {
        res.map_or_else(ErrorCode::from, |_| ErrorCode::Success)
    }
}

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

pub fn set_current_error(err: &IndyError) {
    let details = json!({
        "message": err.to_string(),
        "backtrace": err.source().map(|src| src.to_string()),
    })
    .to_string();

    if let Err(err) = LAST_ERROR.try_with(|last| last.replace(Some(details))) {
        error!("Can't record current error: {:?}", err);
    }
}

/// Last error recorded on this thread as
/// `{"message": str, "backtrace": Optional<str>}`.
///
/// Stays until the next error on the same thread replaces it.
pub fn get_current_error_json() -> Option<String> {
    match LAST_ERROR.try_with(|last| last.borrow().clone()) {
        Ok(details) => details,
        Err(err) => {
            error!("Can't read current error: {:?}", err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_indy_chains_messages() {
        let err: IndyResult<()> = Err(io::Error::new(io::ErrorKind::NotFound, "missing"))
            .to_indy(IndyErrorKind::IOError, "Can't read genesis");

        let err = err.unwrap_err();
        assert_eq!(err.kind(), IndyErrorKind::IOError);
        assert_eq!(err.message(), "Can't read genesis\n  Caused by: missing");
    }

    #[test]
    fn map_replaces_kind_and_keeps_cause() {
        let err = err_msg(IndyErrorKind::WalletItemNotFound, "no key")
            .map(IndyErrorKind::InvalidStructure, "Can't unpack");

        assert_eq!(err.kind(), IndyErrorKind::InvalidStructure);
        assert_eq!(err.message(), "Can't unpack\n  Caused by: no key");
    }

    #[test]
    fn every_kind_maps_to_an_error_code() {
        assert_eq!(
            ErrorCode::from(IndyErrorKind::WalletItemNotFound).code(),
            212
        );
        assert_eq!(ErrorCode::from(IndyErrorKind::NoConsensus).code(), 303);
        assert_eq!(ErrorCode::from(IndyErrorKind::DIDAlreadyExists).code(), 600);
        assert_eq!(
            ErrorCode::from(IndyErrorKind::InvalidSearchHandle).code(),
            215
        );
        assert_eq!(
            ErrorCode::from(IndyErrorKind::InvalidParam(99)),
            ErrorCode::CommonInvalidState
        );
        assert_eq!(
            ErrorCode::from(IndyErrorKind::InvalidParam(0)),
            ErrorCode::CommonInvalidState
        );
    }

    #[test]
    fn invalid_param_codes_round_trip() {
        assert_eq!(
            ErrorCode::from(IndyErrorKind::InvalidParam(13)),
            ErrorCode::CommonInvalidParam13
        );
        assert_eq!(
            IndyErrorKind::from(ErrorCode::CommonInvalidParam3),
            IndyErrorKind::InvalidParam(3)
        );
        assert_eq!(
            IndyErrorKind::from(ErrorCode::WalletInputError),
            IndyErrorKind::WalletEncodingError
        );
    }

    #[test]
    fn error_code_conversion_records_current_error() {
        let code: ErrorCode = err_msg(IndyErrorKind::WalletQueryError, "bad query").into();

        assert_eq!(code, ErrorCode::WalletQueryError);
        let json = get_current_error_json().unwrap();
        assert!(json.contains("bad query"));
    }

    #[test]
    fn poisoned_lock_is_invalid_state() {
        let lock = std::sync::Mutex::new(0);
        let _ = std::panic::catch_unwind(|| {
            let _guard = lock.lock().unwrap();
            panic!("poison");
        });

        let err: IndyError = lock.lock().unwrap_err().into();
        assert_eq!(err.kind(), IndyErrorKind::InvalidState);
    }
}
