mod consensus;
mod genesis;
mod networker;

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, RwLock},
};

use indy_api_types::{errors::prelude::*, PoolHandle};
use indy_utils::next_pool_handle;
use serde_json::Value;

pub(crate) use self::genesis::NodeInfo;
#[cfg(test)]
pub(crate) use self::networker::MockNetworker;
pub(crate) use self::networker::{Networker, TcpNetworker};
use crate::domain::{
    ledger::constants::is_read_request,
    pool::{PoolConfig, PoolOpenConfig},
};

const CONFIG_FILE: &str = "config.json";

struct Pool {
    name: String,
    genesis_path: PathBuf,
    config: PoolOpenConfig,
    nodes: RwLock<Vec<NodeInfo>>,
}

impl Pool {
    fn nodes(&self) -> IndyResult<Vec<NodeInfo>> {
        Ok(self.nodes.read()?.clone())
    }
}

/// Pool ledger configurations on disk plus the set of opened pools.
pub(crate) struct PoolService {
    networker: Arc<dyn Networker>,
    pool_home: PathBuf,
    pools: Mutex<HashMap<PoolHandle, Arc<Pool>>>,
}

impl PoolService {
    pub(crate) fn new(networker: Arc<dyn Networker>, pool_home: PathBuf) -> PoolService {
        PoolService {
            networker,
            pool_home,
            pools: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn create(&self, name: &str, config: Option<PoolConfig>) -> IndyResult<()> {
        trace!("create >>> name: {:?}, config: {:?}", name, config);

        let path = self._pool_path(name)?;

        if path.as_path().exists() {
            return Err(err_msg(
                IndyErrorKind::PoolConfigAlreadyExists,
                format!("Pool ledger config file with name \"{}\" already exists", name),
            ));
        }

        let config = config.unwrap_or_else(|| PoolConfig::default_for_name(name));

        let genesis = fs::read_to_string(&config.genesis_txn).to_indy(
            IndyErrorKind::IOError,
            format!("Can't read genesis transactions file {}", config.genesis_txn),
        )?;

        genesis::parse_nodes(&genesis)?;

        fs::create_dir_all(&path).to_indy(
            IndyErrorKind::IOError,
            "Can't create pool config directory",
        )?;

        let res = self._write_config(&path, name, &genesis);

        if res.is_err() {
            fs::remove_dir_all(&path).ok();
        }

        res?;

        info!("create: pool ledger config {} created", name);
        trace!("create <<<");

        Ok(())
    }

    pub(crate) async fn delete(&self, name: &str) -> IndyResult<()> {
        trace!("delete >>> name: {:?}", name);

        if self._is_opened(name)? {
            return Err(err_msg(
                IndyErrorKind::InvalidState,
                "Can't delete pool config - pool is open now",
            ));
        }

        let path = self._pool_path(name)?;

        tokio::fs::remove_dir_all(path)
            .await
            .to_indy(IndyErrorKind::IOError, "Can't delete pool config directory")?;

        info!("delete: pool ledger config {} deleted", name);
        trace!("delete <<<");

        Ok(())
    }

    pub(crate) fn list(&self) -> IndyResult<Vec<Value>> {
        trace!("list >>>");

        let mut pools = Vec::new();

        if let Ok(entries) = fs::read_dir(&self.pool_home) {
            for entry in entries {
                let entry = entry?;

                if entry.path().join(CONFIG_FILE).is_file() {
                    if let Some(name) = entry.file_name().to_str() {
                        pools.push(json!({ "pool": name }));
                    }
                }
            }
        }

        trace!("list <<< pools: {:?}", pools);

        Ok(pools)
    }

    pub(crate) async fn open(
        &self,
        name: &str,
        config: Option<PoolOpenConfig>,
    ) -> IndyResult<PoolHandle> {
        trace!("open >>> name: {:?}, config: {:?}", name, config);

        let config = config.unwrap_or_default();

        if self._is_opened(name)? {
            return Err(err_msg(
                IndyErrorKind::InvalidState,
                "Pool with the same name is already opened",
            ));
        }

        let path = self._pool_path(name)?;
        let config_path = path.join(CONFIG_FILE);

        if !config_path.exists() {
            return Err(err_msg(
                IndyErrorKind::PoolNotCreated,
                format!("Pool ledger config \"{}\" doesn't exist", name),
            ));
        }

        let pool_config = tokio::fs::read_to_string(&config_path)
            .await
            .to_indy(IndyErrorKind::IOError, "Can't read pool config")?;

        let pool_config: PoolConfig = serde_json::from_str(&pool_config)
            .to_indy(IndyErrorKind::InvalidState, "Invalid pool config stored")?;

        let genesis_path = PathBuf::from(pool_config.genesis_txn);
        let nodes = self._read_nodes(&genesis_path).await?;

        let pool = Arc::new(Pool {
            name: name.to_string(),
            genesis_path,
            config,
            nodes: RwLock::new(nodes),
        });

        let handle = next_pool_handle();

        {
            let mut pools = self.pools.lock()?;

            if pools.values().any(|opened| opened.name == name) {
                return Err(err_msg(
                    IndyErrorKind::InvalidState,
                    "Pool with the same name is already opened",
                ));
            }

            pools.insert(handle, pool);
        }

        info!("open: pool {} opened with handle {:?}", name, handle);
        trace!("open <<< handle: {:?}", handle);

        Ok(handle)
    }

    pub(crate) async fn close(&self, handle: PoolHandle) -> IndyResult<()> {
        trace!("close >>> handle: {:?}", handle);

        let pool = self.pools.lock()?.remove(&handle).ok_or_else(|| {
            err_msg(
                IndyErrorKind::InvalidPoolHandle,
                format!("No pool with requested handle {:?}", handle),
            )
        })?;

        info!("close: pool {} closed", pool.name);
        trace!("close <<<");

        Ok(())
    }

    /// Re-reads the stored genesis transactions and replaces the node set.
    pub(crate) async fn refresh(&self, handle: PoolHandle) -> IndyResult<()> {
        trace!("refresh >>> handle: {:?}", handle);

        let pool = self._get_pool(handle)?;
        let nodes = self._read_nodes(&pool.genesis_path).await?;

        *pool.nodes.write()? = nodes;

        trace!("refresh <<<");

        Ok(())
    }

    pub(crate) async fn send_tx(&self, handle: PoolHandle, request: &str) -> IndyResult<String> {
        trace!("send_tx >>> handle: {:?}, request: {:?}", handle, request);

        let pool = self._get_pool(handle)?;

        let parsed: Value = serde_json::from_str(request)
            .to_indy(IndyErrorKind::InvalidStructure, "Request is invalid json")?;

        let is_read = parsed["operation"]["type"]
            .as_str()
            .map_or(false, is_read_request);

        let nodes = pool.nodes()?;

        let res = consensus::send_request(
            self.networker.clone(),
            &nodes,
            &pool.config,
            request,
            is_read,
        )
        .await?;

        trace!("send_tx <<< res: {:?}", res);

        Ok(res)
    }

    fn _get_pool(&self, handle: PoolHandle) -> IndyResult<Arc<Pool>> {
        self.pools.lock()?.get(&handle).cloned().ok_or_else(|| {
            err_msg(
                IndyErrorKind::InvalidPoolHandle,
                format!("No pool with requested handle {:?}", handle),
            )
        })
    }

    fn _is_opened(&self, name: &str) -> IndyResult<bool> {
        Ok(self.pools.lock()?.values().any(|pool| pool.name == name))
    }

    fn _pool_path(&self, name: &str) -> IndyResult<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(err_msg(
                IndyErrorKind::InvalidStructure,
                format!("Invalid pool name: {:?}", name),
            ));
        }

        Ok(self.pool_home.join(name))
    }

    fn _write_config(&self, path: &Path, name: &str, genesis: &str) -> IndyResult<()> {
        let genesis_path = path.join(format!("{}.txn", name));

        fs::write(&genesis_path, genesis).to_indy(
            IndyErrorKind::IOError,
            "Can't write genesis transactions",
        )?;

        let config = PoolConfig {
            genesis_txn: genesis_path.to_string_lossy().into_owned(),
        };

        let config = serde_json::to_string(&config)
            .to_indy(IndyErrorKind::InvalidState, "Can't serialize pool config")?;

        fs::write(path.join(CONFIG_FILE), config)
            .to_indy(IndyErrorKind::IOError, "Can't write pool config")
    }

    async fn _read_nodes(&self, genesis_path: &Path) -> IndyResult<Vec<NodeInfo>> {
        let genesis = tokio::fs::read_to_string(genesis_path).await.to_indy(
            IndyErrorKind::IOError,
            "Can't read genesis transactions",
        )?;

        genesis::parse_nodes(&genesis)
    }
}
