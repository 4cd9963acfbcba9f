mod crypto;
mod ledger;
mod pool;

pub(crate) use crypto::CryptoService;
pub(crate) use indy_wallet::WalletService;
pub(crate) use ledger::LedgerService;
pub(crate) use pool::{Networker, PoolService, TcpNetworker};

#[cfg(test)]
pub(crate) use pool::MockNetworker;
