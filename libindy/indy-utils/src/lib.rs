#[macro_use]
extern crate serde_derive;

#[macro_use]
extern crate serde_json;

#[macro_use]
pub mod crypto;

pub mod environment;
pub mod sequence;
pub mod wql;

use indy_api_types::{PoolHandle, SearchHandle, WalletHandle};

pub fn next_wallet_handle() -> WalletHandle {
    WalletHandle(sequence::get_next_id())
}

pub fn next_pool_handle() -> PoolHandle {
    PoolHandle(sequence::get_next_id())
}

pub fn next_search_handle() -> SearchHandle {
    SearchHandle(sequence::get_next_id())
}

/// Masks secrets in release builds so they never reach the log.
#[cfg(debug_assertions)]
#[macro_export]
macro_rules! secret {
    ($val:expr) => {{
        $val
    }};
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! secret {
    ($val:expr) => {{
        "_"
    }};
}
