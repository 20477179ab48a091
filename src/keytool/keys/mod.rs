pub mod key_pair;
pub mod key_reader;
pub mod key_writer;

pub use key_pair::*;
pub use key_reader::*;
pub use key_writer::*;

use std::fmt::{Debug, Formatter};
use num_traits::ToPrimitive;
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use crate::keytool::types::{Algorithm, HashAlg, KeyUsage, KeyUse};

/// Descriptor every key handle carries alongside its material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyAlgorithm {
    pub name: Algorithm,
    pub modulus_length: usize,
    pub public_exponent: u64,
    pub hash: HashAlg,
}

impl KeyAlgorithm {
    fn describe(key_use: KeyUse, hash: HashAlg, key: &impl PublicKeyParts) -> Self {
        Self {
            name: Algorithm::from(key_use),
            modulus_length: key.n().bits(),
            public_exponent: key.e().to_u64().unwrap_or(u64::MAX),
            hash,
        }
    }
}

/// Which usage a private `Write` key gets when imported from PEM.
///
/// `Verify` is the historical binding; it leaves imported private `Write`
/// keys unable to sign. `Sign` binds the usage a private signing key needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrivateWriteUsage {
    #[default]
    Verify,
    Sign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyOptions {
    /// Whether the private key may be exported. Once a private key is
    /// extractable its material can always leave the process. Public keys
    /// export either way.
    pub extractable: bool,
    pub private_write_usage: PrivateWriteUsage,
}

impl Default for KeyOptions {
    fn default() -> Self {
        Self { extractable: true, private_write_usage: PrivateWriteUsage::default() }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PublicKey {
    pub(crate) key: RsaPublicKey,
    pub(crate) algorithm: KeyAlgorithm,
    pub(crate) usages: Vec<KeyUsage>,
    pub(crate) extractable: bool,
}

#[derive(Clone, PartialEq)]
pub struct PrivateKey {
    pub(crate) key: RsaPrivateKey,
    pub(crate) algorithm: KeyAlgorithm,
    pub(crate) usages: Vec<KeyUsage>,
    pub(crate) extractable: bool,
}

macro_rules! key_accessors {
    ($t: ty, $inner: ty) => {
        impl $t {
            pub fn algorithm(&self) -> &KeyAlgorithm {
                &self.algorithm
            }

            pub fn key_use(&self) -> KeyUse {
                KeyUse::from(self.algorithm.name)
            }

            pub fn hash(&self) -> HashAlg {
                self.algorithm.hash
            }

            pub fn usages(&self) -> &[KeyUsage] {
                &self.usages
            }

            pub fn extractable(&self) -> bool {
                self.extractable
            }

            pub fn inner(&self) -> &$inner {
                &self.key
            }
        }
    };
}

key_accessors!(PublicKey, RsaPublicKey);
key_accessors!(PrivateKey, RsaPrivateKey);

impl PublicKey {
    pub(crate) fn new(key: RsaPublicKey, key_use: KeyUse, hash: HashAlg, usages: Vec<KeyUsage>, extractable: bool) -> Self {
        let algorithm = KeyAlgorithm::describe(key_use, hash, &key);
        Self { key, algorithm, usages, extractable }
    }
}

impl PrivateKey {
    pub(crate) fn new(key: RsaPrivateKey, key_use: KeyUse, hash: HashAlg, usages: Vec<KeyUsage>, extractable: bool) -> Self {
        let algorithm = KeyAlgorithm::describe(key_use, hash, &key);
        Self { key, algorithm, usages, extractable }
    }
}

impl Debug for PrivateKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("algorithm", &self.algorithm)
            .field("usages", &self.usages)
            .field("extractable", &self.extractable)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct KeyPair {
    pub public_key: PublicKey,
    pub private_key: PrivateKey,
}

/// A key as it comes back from storage, before anyone checked its shape.
#[derive(Clone, Debug, PartialEq)]
pub enum KeyData {
    Pair(KeyPair),
    Public(PublicKey),
    Private(PrivateKey),
}

/// Key argument of an operation: a live handle, or a PEM string that is
/// imported on the fly.
#[derive(Debug, Clone, Copy)]
pub enum KeySource<'a, K> {
    Handle(&'a K),
    Pem(&'a str),
}

impl<'a> From<&'a PublicKey> for KeySource<'a, PublicKey> {
    fn from(key: &'a PublicKey) -> Self {
        KeySource::Handle(key)
    }
}

impl<'a> From<&'a PrivateKey> for KeySource<'a, PrivateKey> {
    fn from(key: &'a PrivateKey) -> Self {
        KeySource::Handle(key)
    }
}

impl<'a, K> From<&'a str> for KeySource<'a, K> {
    fn from(pem: &'a str) -> Self {
        KeySource::Pem(pem)
    }
}

impl<'a, K> From<&'a String> for KeySource<'a, K> {
    fn from(pem: &'a String) -> Self {
        KeySource::Pem(pem.as_str())
    }
}
