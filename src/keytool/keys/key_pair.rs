use chrono::Local;
use log::info;
use crate::keytool::codec::{armor, unarmor};
use crate::keytool::config::{PRIVATE_KEY_LABEL, PUBLIC_KEY_LABEL};
use crate::keytool::errors::{Error, Result};
use crate::keytool::keys::{KeyOptions, KeyPair, PrivateKey, PrivateWriteUsage, PublicKey};
use crate::keytool::platform;
use crate::keytool::types::{Algorithm, HashAlg, KeyUsage, KeyUse, RsaSize};

pub async fn generate_key_pair(size: RsaSize, hash: HashAlg, key_use: KeyUse) -> Result<KeyPair> {
    generate_key_pair_with_options(size, hash, key_use, KeyOptions::default()).await
}

/// Generates a pair with public exponent 65537. `Exchange` pairs get
/// `encrypt` / `decrypt`, `Write` pairs get `verify` / `sign`.
pub async fn generate_key_pair_with_options(size: RsaSize, hash: HashAlg, key_use: KeyUse, options: KeyOptions) -> Result<KeyPair> {
    let bits = size.bits();
    let start = Local::now().timestamp_millis();
    let private = platform::run(move || platform::generate(bits)).await?;
    let public = private.to_public_key();
    info!("Done {} bit {} key generation after {} ms", bits, Algorithm::from(key_use), Local::now().timestamp_millis() - start);
    let (public_usages, private_usages) = match key_use {
        KeyUse::Exchange => (vec![KeyUsage::Encrypt], vec![KeyUsage::Decrypt]),
        KeyUse::Write => (vec![KeyUsage::Verify], vec![KeyUsage::Sign]),
    };
    Ok(KeyPair {
        public_key: PublicKey::new(public, key_use, hash, public_usages, options.extractable),
        private_key: PrivateKey::new(private, key_use, hash, private_usages, options.extractable),
    })
}

/// Public keys export even when not extractable.
pub async fn export_public_key(key: &PublicKey) -> Result<String> {
    let material = key.inner().clone();
    let der = platform::run(move || platform::public_to_spki(&material)).await?;
    Ok(armor(&der, PUBLIC_KEY_LABEL))
}

pub async fn export_private_key(key: &PrivateKey) -> Result<String> {
    if !key.extractable() {
        return Err(Error::KeyNotExtractable);
    }
    let material = key.inner().clone();
    let der = platform::run(move || platform::private_to_pkcs8(&material)).await?;
    Ok(armor(&der, PRIVATE_KEY_LABEL))
}

pub async fn import_public_key(pem: &str, hash: HashAlg, key_use: KeyUse) -> Result<PublicKey> {
    import_public_key_with_options(pem, hash, key_use, KeyOptions::default()).await
}

pub async fn import_public_key_with_options(pem: &str, hash: HashAlg, key_use: KeyUse, options: KeyOptions) -> Result<PublicKey> {
    let der = unarmor(pem, PUBLIC_KEY_LABEL)?;
    let key = platform::run(move || platform::public_from_spki(&der)).await?;
    let usages = match key_use {
        KeyUse::Exchange => vec![KeyUsage::Encrypt],
        KeyUse::Write => vec![KeyUsage::Verify],
    };
    info!("imported {} public key ({})", Algorithm::from(key_use), hash);
    Ok(PublicKey::new(key, key_use, hash, usages, options.extractable))
}

pub async fn import_private_key(pem: &str, hash: HashAlg, key_use: KeyUse) -> Result<PrivateKey> {
    import_private_key_with_options(pem, hash, key_use, KeyOptions::default()).await
}

/// A private `Write` key is bound to `options.private_write_usage`, which
/// defaults to `verify`; see [`PrivateWriteUsage`].
pub async fn import_private_key_with_options(pem: &str, hash: HashAlg, key_use: KeyUse, options: KeyOptions) -> Result<PrivateKey> {
    let der = unarmor(pem, PRIVATE_KEY_LABEL)?;
    let key = platform::run(move || platform::private_from_pkcs8(&der)).await?;
    let usages = match (key_use, options.private_write_usage) {
        (KeyUse::Exchange, _) => vec![KeyUsage::Decrypt],
        (KeyUse::Write, PrivateWriteUsage::Verify) => vec![KeyUsage::Verify],
        (KeyUse::Write, PrivateWriteUsage::Sign) => vec![KeyUsage::Sign],
    };
    info!("imported {} private key ({})", Algorithm::from(key_use), hash);
    Ok(PrivateKey::new(key, key_use, hash, usages, options.extractable))
}
