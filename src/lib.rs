//! RSA key tool: RSA-OAEP exchange keys and RSA-PSS write keys, exported to
//! and imported from PEM (`PUBLIC KEY` as SPKI, `PRIVATE KEY` as PKCS8).
//!
//! ```rust,no_run
//! use rsa_keytool::keys::{export_public_key, generate_key_pair};
//! use rsa_keytool::operations::{decrypt, encrypt, OpOptions};
//! use rsa_keytool::types::{HashAlg, KeyUse, RsaSize};
//!
//! # async fn demo() -> rsa_keytool::errors::Result<()> {
//! let pair = generate_key_pair(RsaSize::B2048, HashAlg::Sha256, KeyUse::Exchange).await?;
//! let public_pem = export_public_key(&pair.public_key).await?;
//! let ciphertext = encrypt("hello", &public_pem, OpOptions::default()).await?;
//! let plain = decrypt(&ciphertext, &pair.private_key, HashAlg::Sha256).await?;
//! assert_eq!(plain, b"hello");
//! # Ok(())
//! # }
//! ```

pub mod keytool;

pub use crate::keytool::*;
