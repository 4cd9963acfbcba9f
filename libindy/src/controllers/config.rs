use indy_api_types::errors::prelude::*;

use crate::{domain::IndyConfig, utils::check_validatable};

pub struct ConfigController {}

impl ConfigController {
    pub(crate) fn new() -> ConfigController {
        ConfigController {}
    }

    /// Set libindy runtime configuration. Can be optionally called to change current params.
    ///
    /// #Params
    /// config: {
    ///     "crypto_thread_pool_size": Optional<int> - size of thread pool for the most expensive crypto operations. (4 by default)
    ///     "collect_backtrace": Optional<bool> - whether errors backtrace should be collected.
    ///         Capturing of backtrace can affect library performance.
    ///         NOTE: must be set before invocation of any other API functions.
    /// }
    ///
    /// #Errors
    /// Common*
    pub fn set_runtime_config(&self, config: IndyConfig) -> IndyResult<()> {
        trace!("set_runtime_config > {:?}", config);

        check_validatable(&config, "runtime config")?;

        // Crypto runs on the tokio worker threads, the size is only validated.
        if let Some(crypto_thread_pool_size) = config.crypto_thread_pool_size {
            warn!(
                "set_runtime_config ! unsupported opt crypto_thread_pool_size {}",
                crypto_thread_pool_size
            );
        }

        match config.collect_backtrace {
            Some(true) => std::env::set_var("RUST_BACKTRACE", "1"),
            Some(false) => std::env::set_var("RUST_BACKTRACE", "0"),
            _ => {}
        }

        trace!("set_runtime_config <");
        Ok(())
    }
}
