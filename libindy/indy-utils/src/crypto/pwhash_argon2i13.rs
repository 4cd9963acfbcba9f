use argon2::{Algorithm, Argon2, Params, Version};
use indy_api_types::{domain::wallet::KeyDerivationMethod, errors::prelude::*};

use super::randombytes::randombytes_array;

pub const SALTBYTES: usize = 16;

// Moderate and interactive limits of argon2i13 as used by existing Indy wallets
const OPSLIMIT_MODERATE: u32 = 6;
const MEMLIMIT_MODERATE_KIB: u32 = 128 * 1024;
const OPSLIMIT_INTERACTIVE: u32 = 4;
const MEMLIMIT_INTERACTIVE_KIB: u32 = 32 * 1024;

fixed_bytes!(Salt, SALTBYTES);

pub fn gen_salt() -> Salt {
    Salt(randombytes_array())
}

pub fn pwhash<'a>(
    key: &'a mut [u8],
    passwd: &[u8],
    salt: &Salt,
    key_derivation_method: &KeyDerivationMethod,
) -> IndyResult<&'a [u8]> {
    let (opslimit, memlimit) = match key_derivation_method {
        KeyDerivationMethod::ARGON2I_MOD => (OPSLIMIT_MODERATE, MEMLIMIT_MODERATE_KIB),
        KeyDerivationMethod::ARGON2I_INT => (OPSLIMIT_INTERACTIVE, MEMLIMIT_INTERACTIVE_KIB),
        KeyDerivationMethod::RAW => {
            return Err(err_msg(
                IndyErrorKind::InvalidStructure,
                "RAW key derivation method is not acceptable for password hashing",
            ))
        }
    };

    let params = Params::new(memlimit, opslimit, 1, Some(key.len()))
        .to_indy(IndyErrorKind::InvalidState, "Invalid argon2i parameters")?;

    Argon2::new(Algorithm::Argon2i, Version::V0x13, params)
        .hash_password_into(passwd, &salt.0, key)
        .to_indy(IndyErrorKind::InvalidState, "Can't derive key")?;

    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pwhash_is_deterministic_for_salt() {
        let salt = gen_salt();
        let mut first = [0u8; 32];
        let mut second = [0u8; 32];

        pwhash(&mut first, b"passphrase", &salt, &KeyDerivationMethod::ARGON2I_INT).unwrap();
        pwhash(&mut second, b"passphrase", &salt, &KeyDerivationMethod::ARGON2I_INT).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn pwhash_rejects_raw() {
        let mut key = [0u8; 32];
        let err = pwhash(&mut key, b"passphrase", &gen_salt(), &KeyDerivationMethod::RAW)
            .unwrap_err();

        assert_eq!(err.kind(), IndyErrorKind::InvalidStructure);
    }
}
