use rand::{rngs::OsRng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

pub fn randombytes(size: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; size];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

pub fn randombytes_array<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Same seed always yields the same bytes.
pub fn randombytes_deterministic(size: usize, seed: &[u8; 32]) -> Vec<u8> {
    let mut rng = ChaCha20Rng::from_seed(*seed);
    let mut bytes = vec![0u8; size];
    rng.fill_bytes(&mut bytes);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_bytes_depend_only_on_seed() {
        let seed = [7u8; 32];

        assert_eq!(
            randombytes_deterministic(32, &seed),
            randombytes_deterministic(32, &seed)
        );
        assert_ne!(
            randombytes_deterministic(32, &seed),
            randombytes_deterministic(32, &[8u8; 32])
        );
    }

    #[test]
    fn random_bytes_have_requested_size() {
        assert_eq!(randombytes(17).len(), 17);
        assert_ne!(randombytes_array::<32>(), randombytes_array::<32>());
    }
}
