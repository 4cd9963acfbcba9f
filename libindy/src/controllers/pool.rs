use std::sync::Arc;

use indy_api_types::{errors::prelude::*, PoolHandle};
use serde_json::Value;

use crate::{
    domain::{
        ledger::{constants::SUPPORTED_PROTOCOL_VERSIONS, request::ProtocolVersion},
        pool::{PoolConfig, PoolOpenConfig},
    },
    services::PoolService,
    utils::check_validatable,
};

pub struct PoolController {
    pool_service: Arc<PoolService>,
}

impl PoolController {
    pub(crate) fn new(pool_service: Arc<PoolService>) -> PoolController {
        PoolController { pool_service }
    }

    /// Creates a new local pool ledger configuration that can be used later to connect pool nodes.
    ///
    /// #Params
    /// name: Name of the pool ledger configuration.
    /// config (optional): Pool configuration. If None, then `<name>.txn` is used as the
    ///     path to the genesis transactions file.
    ///
    /// #Errors
    /// Common*
    /// Ledger*
    pub fn create_pool_ledger_config(
        &self,
        name: String,
        config: Option<PoolConfig>,
    ) -> IndyResult<()> {
        debug!(
            "create_pool_ledger_config > name {:?} config {:?}",
            name, config
        );

        if let Some(ref config) = config {
            check_validatable(config, "pool config")?;
        }

        self.pool_service.create(&name, config)?;

        debug!("create_pool_ledger_config <");
        Ok(())
    }

    /// Deletes created pool ledger configuration.
    ///
    /// Fails with `InvalidState` while the pool is opened.
    pub async fn delete_pool_ledger_config(&self, name: String) -> IndyResult<()> {
        debug!("delete_pool_ledger_config > name {:?}", name);

        self.pool_service.delete(&name).await?;

        debug!("delete_pool_ledger_config <");
        Ok(())
    }

    /// Lists names of created pool ledgers as `[{"pool": name}]`.
    pub fn list_pools(&self) -> IndyResult<Vec<Value>> {
        debug!("list_pools >");

        let res = self.pool_service.list()?;

        debug!("list_pools < {:?}", res);
        Ok(res)
    }

    /// Opens pool ledger and reads the node set from its genesis transactions.
    ///
    /// Pool ledger configuration with corresponded name must be previously created
    /// with create_pool_ledger_config method.
    /// It is impossible to open pool with the same name more than once.
    ///
    /// #Params
    /// name: Name of the pool ledger configuration.
    /// config (optional): Runtime pool configuration. If None, then default config will be used.
    /// {
    ///     "timeout": int (optional), timeout for network request (in sec).
    ///     "extended_timeout": int (optional), extended timeout for network request (in sec).
    ///     "preordered_nodes": array<string> -  (optional), names of nodes which will have a priority during request sending.
    ///     "number_read_nodes": int (optional) - the number of nodes to send read requests (2 by default)
    /// }
    ///
    /// #Returns
    /// Handle to opened pool to use in methods that require pool connection.
    ///
    /// #Errors
    /// Common*
    /// Ledger*
    pub async fn open_pool_ledger(
        &self,
        name: String,
        config: Option<PoolOpenConfig>,
    ) -> IndyResult<PoolHandle> {
        debug!("open_pool_ledger > name {:?} config {:?}", name, config);

        if let Some(ref config) = config {
            check_validatable(config, "pool open config")?;
        }

        let handle = self.pool_service.open(&name, config).await?;

        debug!("open_pool_ledger < {:?}", handle);
        Ok(handle)
    }

    /// Refreshes a local copy of a pool ledger and updates pool nodes connections.
    pub async fn refresh_pool_ledger(&self, handle: PoolHandle) -> IndyResult<()> {
        debug!("refresh_pool_ledger > handle {:?}", handle);

        self.pool_service.refresh(handle).await?;

        debug!("refresh_pool_ledger <");
        Ok(())
    }

    /// Closes opened pool ledger, opened nodes connections and frees allocated resources.
    pub async fn close_pool_ledger(&self, handle: PoolHandle) -> IndyResult<()> {
        debug!("close_pool_ledger > handle {:?}", handle);

        self.pool_service.close(handle).await?;

        debug!("close_pool_ledger <");
        Ok(())
    }

    /// Set PROTOCOL_VERSION to specific version.
    ///
    /// There is a global property PROTOCOL_VERSION that used in every request to the pool and
    /// specified version of Indy Node which Libindy works.
    ///
    /// By default PROTOCOL_VERSION=2.
    ///
    /// #Params
    /// version: Protocol version will be used:
    ///     1 - for Indy Node 1.3
    ///     2 - for Indy Node 1.4 and greater
    ///
    /// #Errors
    /// Common*
    /// Ledger*
    pub fn set_protocol_version(&self, version: usize) -> IndyResult<()> {
        debug!("set_protocol_version > version {:?}", version);

        if !SUPPORTED_PROTOCOL_VERSIONS.contains(&version) {
            return Err(err_msg(
                IndyErrorKind::PoolIncompatibleProtocolVersion,
                format!("Unsupported Protocol version: {}", version),
            ));
        }

        ProtocolVersion::set(version);

        debug!("set_protocol_version <");
        Ok(())
    }
}
