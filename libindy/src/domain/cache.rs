pub const SCHEMA_CACHE: &str = "cache_schema";
pub const CRED_DEF_CACHE: &str = "cache_cred_def";

/// Plain text tag holding the fetch time in seconds, so purges can use `$lt`.
pub const TIMESTAMP_TAG: &str = "~timestamp";

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GetCacheOptions {
    /// Skip usage of cache.
    pub no_cache: Option<bool>,
    /// Use only cached data, do not try to update.
    pub no_update: Option<bool>,
    /// Skip storing fresh data if updated.
    pub no_store: Option<bool>,
    /// Return cached data if not older than this many seconds. -1 means any age.
    pub min_fresh: Option<i32>,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PurgeOptions {
    /// Delete cache entries older than this many seconds. -1 means all.
    pub max_age: Option<i32>,
}
