use std::fs;
use std::io::ErrorKind;
use log::debug;
use crate::keytool::errors::Result;
use crate::keytool::keys::{import_private_key_with_options, import_public_key_with_options, public_path, KeyData, KeyOptions, KeyPair};
use crate::keytool::types::{HashAlg, KeyUse};

/// Loads key files written by [`KeyPair::save`]: the private key at `path`,
/// the public key at `path.pub`.
#[derive(Debug, Clone, Copy)]
pub struct KeyReader {
    pub hash: HashAlg,
    pub key_use: KeyUse,
    pub options: KeyOptions,
}

fn read_optional(path: &str) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(s) => Ok(Some(s)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("no key file at {}", path);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

impl KeyReader {
    pub fn new(hash: HashAlg, key_use: KeyUse, options: KeyOptions) -> Self {
        Self { hash, key_use, options }
    }

    /// `None` when neither file exists, otherwise whatever halves were found.
    pub async fn load(&self, path: &str) -> Result<Option<KeyData>> {
        let private = match read_optional(path)? {
            Some(pem) => Some(import_private_key_with_options(&pem, self.hash, self.key_use, self.options).await?),
            None => None,
        };
        let public = match read_optional(&public_path(path))? {
            Some(pem) => Some(import_public_key_with_options(&pem, self.hash, self.key_use, self.options).await?),
            None => None,
        };
        Ok(match (public, private) {
            (Some(public_key), Some(private_key)) => Some(KeyData::Pair(KeyPair { public_key, private_key })),
            (Some(public_key), None) => Some(KeyData::Public(public_key)),
            (None, Some(private_key)) => Some(KeyData::Private(private_key)),
            (None, None) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keytool::errors::{check_is_key, check_is_key_pair, Error};
    use crate::keytool::keys::generate_key_pair;
    use crate::keytool::types::RsaSize;

    #[tokio::test]
    async fn test_load_pair_and_halves() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key").to_string_lossy().to_string();
        let reader = KeyReader::new(HashAlg::Sha256, KeyUse::Exchange, KeyOptions::default());

        let missing = reader.load(&path).await.unwrap();
        assert!(missing.is_none());
        assert!(matches!(check_is_key_pair(missing), Err(Error::KeyDoesNotExist)));

        let pair = generate_key_pair(RsaSize::B1024, HashAlg::Sha256, KeyUse::Exchange).await.unwrap();
        pair.save(&path).await.unwrap();
        let loaded = check_is_key_pair(reader.load(&path).await.unwrap()).unwrap();
        assert_eq!(loaded.private_key.inner(), pair.private_key.inner());
        assert_eq!(loaded.public_key.inner(), pair.public_key.inner());
        assert!(matches!(check_is_key(Some(KeyData::Pair(loaded))), Err(Error::NotKey)));

        fs::remove_file(&path).unwrap();
        let public_only = reader.load(&path).await.unwrap();
        assert!(matches!(public_only, Some(KeyData::Public(_))));
        assert!(matches!(check_is_key_pair(public_only.clone()), Err(Error::NotKeyPair)));
        assert!(matches!(check_is_key(public_only), Ok(KeyData::Public(_))));
    }
}
