use std::{env, io::Write};

use env_logger::Builder as EnvLoggerBuilder;
use indy_api_types::errors::prelude::*;
use log::LevelFilter;

pub struct LibindyDefaultLogger;

impl LibindyDefaultLogger {
    /// Set default logger implementation.
    ///
    /// Uses `env_logger`. The filter comes from `pattern` or, when absent, from
    /// the `RUST_LOG` environment variable. Without either nothing is logged.
    ///
    /// Fails if a logger was already installed in this process.
    pub fn init(pattern: Option<String>) -> IndyResult<()> {
        let pattern = pattern.or_else(|| env::var("RUST_LOG").ok());

        EnvLoggerBuilder::new()
            .format(|buf, record| {
                writeln!(
                    buf,
                    "{:>5}|{:<30}|{:>35}:{:<4}| {}",
                    record.level(),
                    record.target(),
                    record.file().unwrap_or(""),
                    record.line().unwrap_or(0),
                    record.args()
                )
            })
            .filter(None, LevelFilter::Off)
            .parse_filters(pattern.as_deref().unwrap_or(""))
            .try_init()?;

        Ok(())
    }

    /// Set maximum log level.
    ///
    /// Accepts 0 (off) to 5 (trace); anything else is `InvalidStructure`.
    pub fn set_max_level(max_level: u32) -> IndyResult<LevelFilter> {
        let max_level_filter = Self::map_u32_lvl_to_filter(max_level)?;

        log::set_max_level(max_level_filter);

        Ok(max_level_filter)
    }

    fn map_u32_lvl_to_filter(max_level: u32) -> IndyResult<LevelFilter> {
        let max_level = match max_level {
            0 => LevelFilter::Off,
            1 => LevelFilter::Error,
            2 => LevelFilter::Warn,
            3 => LevelFilter::Info,
            4 => LevelFilter::Debug,
            5 => LevelFilter::Trace,
            _ => {
                return Err(err_msg(
                    IndyErrorKind::InvalidStructure,
                    format!("Unknown log level: {}", max_level),
                ))
            }
        };
        Ok(max_level)
    }
}
