#[macro_use]
pub mod qualifier;

pub mod logger;

use indy_api_types::{errors::prelude::*, validation::Validatable};

/// Rejects configuration that fails its own validation as `InvalidStructure`.
pub(crate) fn check_validatable<T: Validatable>(value: &T, name: &str) -> IndyResult<()> {
    value.validate().map_err(|err| {
        err_msg(
            IndyErrorKind::InvalidStructure,
            format!("Invalid {}: {}", name, err),
        )
    })
}
