/// Fixed size byte container used for keys, nonces, tags and signatures.
///
/// Contents are wiped on drop. Serialized as a byte string, so MessagePack
/// writes it as `bin`.
macro_rules! fixed_bytes {
    ($name:ident, $len:expr) => {
        #[derive(Clone, PartialEq, Eq)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            pub const LEN: usize = $len;

            pub fn new(bytes: [u8; $len]) -> $name {
                $name(bytes)
            }

            pub fn from_slice(bytes: &[u8]) -> ::indy_api_types::errors::IndyResult<$name> {
                let array = <[u8; $len]>::try_from(bytes).map_err(|_| {
                    ::indy_api_types::errors::err_msg(
                        ::indy_api_types::errors::IndyErrorKind::InvalidStructure,
                        format!(
                            "Invalid length of {}: expected {}, got {}",
                            stringify!($name),
                            $len,
                            bytes.len()
                        ),
                    )
                })?;

                Ok($name(array))
            }

            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}(...)", stringify!($name))
            }
        }

        impl ::zeroize::Zeroize for $name {
            fn zeroize(&mut self) {
                self.0.zeroize();
            }
        }

        impl Drop for $name {
            fn drop(&mut self) {
                ::zeroize::Zeroize::zeroize(&mut self.0);
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: ::serde::Serializer,
            {
                serializer.serialize_bytes(&self.0)
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<$name, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                struct BytesVisitor;

                impl<'de> ::serde::de::Visitor<'de> for BytesVisitor {
                    type Value = $name;

                    fn expecting(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                        write!(f, "{} bytes", $len)
                    }

                    fn visit_bytes<E>(self, v: &[u8]) -> Result<$name, E>
                    where
                        E: ::serde::de::Error,
                    {
                        <[u8; $len]>::try_from(v)
                            .map($name)
                            .map_err(|_| E::invalid_length(v.len(), &self))
                    }

                    fn visit_seq<A>(self, mut seq: A) -> Result<$name, A::Error>
                    where
                        A: ::serde::de::SeqAccess<'de>,
                    {
                        let mut bytes = [0u8; $len];
                        for (i, byte) in bytes.iter_mut().enumerate() {
                            *byte = seq
                                .next_element()?
                                .ok_or_else(|| ::serde::de::Error::invalid_length(i, &self))?;
                        }
                        Ok($name(bytes))
                    }
                }

                deserializer.deserialize_bytes(BytesVisitor)
            }
        }
    };
}

pub mod base58;
pub mod base64;
pub mod chacha20poly1305_ietf;
pub mod ed25519_box;
pub mod ed25519_sign;
pub mod hash;
pub mod hmacsha256;
pub mod pwhash_argon2i13;
pub mod randombytes;
pub mod sealedbox;
pub mod xchacha20poly1305_ietf;
