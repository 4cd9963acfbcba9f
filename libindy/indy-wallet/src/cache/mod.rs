pub mod cache;
pub mod lru;
pub mod wallet_cache;
