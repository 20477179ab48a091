use lazy_static::lazy_static;
use crate::keytool::types::{CharSize, HashAlg};
use crate::KeyTool;

pub const DEFAULT_CHAR_SIZE: CharSize = CharSize::B8;
pub const DEFAULT_HASH_ALG: HashAlg = HashAlg::Sha256;
/// PSS salt length in bytes.
pub const SALT_LENGTH: usize = 128;
pub const PUBLIC_EXPONENT: u32 = 0x010001;
pub const PUBLIC_KEY_LABEL: &str = "PUBLIC KEY";
pub const PRIVATE_KEY_LABEL: &str = "PRIVATE KEY";

lazy_static! {
    pub static ref CONFIG_DEF: KeyTool = KeyTool {
        mode: String::from("generate"),
        key: String::from("key"),
        input: String::from("stdin"),
        output: String::from("stdout"),
        signature: String::from(""),
        crypto: String::from("rsa"),
        size: 2048,
        hash: String::from(DEFAULT_HASH_ALG.as_str()),
        key_use: String::from("exchange"),
        char_size: 8,
        rounds: 16,
        silent: false,
        non_extractable: false,
        legacy_write_import: false,
        threads: num_cpus::get(),
    };
}
