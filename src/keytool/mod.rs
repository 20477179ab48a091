use std::fs::File;
use std::io::{self, Read, Write};
use std::str::FromStr;
use std::sync::Arc;
use std::thread;
use clap::Parser;
use crossbeam_channel::{bounded, Receiver, Sender};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, LevelFilter};
use tokio::runtime::Handle;

pub mod codec;
pub mod config;
pub mod errors;
pub mod keys;
pub mod operations;
pub mod platform;
pub mod types;

use codec::*;
use config::*;
use errors::*;
use keys::*;
use operations::*;
use types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Generate,
    Encrypt,
    Decrypt,
    Sign,
    Verify,
    Info,
    Test,
}

impl FromStr for RunMode {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "generate" => Ok(RunMode::Generate),
            "encrypt" => Ok(RunMode::Encrypt),
            "decrypt" => Ok(RunMode::Decrypt),
            "sign" => Ok(RunMode::Sign),
            "verify" => Ok(RunMode::Verify),
            "info" => Ok(RunMode::Info),
            "test" => Ok(RunMode::Test),
            _ => Err(Error::UnsupportedParameter(
                format!("run mode `{}', available: generate(default), encrypt, decrypt, sign, verify, info, test", s))),
        }
    }
}

#[macro_export]
macro_rules! keytool_t {
    ($CONFIG: expr, $NAME: ident) => {
#[derive(Debug, Clone, Parser)]
pub struct $NAME {
    #[clap(short, long, value_parser, default_value = $CONFIG.mode.as_str(), help = "Run mode: generate, encrypt, decrypt, sign, verify, info (reports keys as imported under --use) or test")]
    pub mode: String,
    #[clap(short, long, value_parser, default_value = $CONFIG.key.as_str(), help = "Key path, generate/detect `path' and `path.pub'")]
    pub key: String,
    #[clap(short, long, value_parser, default_value = $CONFIG.input.as_str(), help = "Input filename")]
    pub input: String,
    #[clap(short, long, value_parser, default_value = $CONFIG.output.as_str(), help = "Output filename")]
    pub output: String,
    #[clap(long, value_parser, default_value = $CONFIG.signature.as_str(), help = "Base64 signature file checked in verify mode")]
    pub signature: String,
    #[clap(long, value_parser, default_value = $CONFIG.crypto.as_str(), help = "Cryptosystem, only rsa is enabled")]
    pub crypto: String,
    #[clap(long, value_parser, default_value_t = $CONFIG.size, help = "RSA modulus bits: 1024, 2048 or 4096")]
    pub size: usize,
    #[clap(long, value_parser, default_value = $CONFIG.hash.as_str(), help = "Hash: SHA-1, SHA-256, SHA-384 or SHA-512")]
    pub hash: String,
    #[clap(short = 'u', long = "use", value_parser, default_value = $CONFIG.key_use.as_str(), help = "Key use: exchange (encrypt/decrypt) or write (sign/verify); info and test load key files under this use")]
    pub key_use: String,
    #[clap(long, value_parser, default_value_t = $CONFIG.char_size, help = "8: input is taken as raw bytes, 16: input is UTF-8 text sent as 16-bit characters")]
    pub char_size: u32,
    #[clap(short, long, value_parser, default_value_t = $CONFIG.rounds, help = "Round trips to run in test mode")]
    pub rounds: u32,
    #[clap(short, long, value_parser, default_value_t = $CONFIG.silent, help = "Disable log output")]
    pub silent: bool,
    #[clap(long, value_parser, default_value_t = $CONFIG.non_extractable, help = "Generate keys that refuse export")]
    pub non_extractable: bool,
    #[clap(long, value_parser, default_value_t = $CONFIG.legacy_write_import, help = "Bind `verify' instead of `sign' to imported private write keys")]
    pub legacy_write_import: bool,
    #[clap(short, long, value_parser, default_value_t = $CONFIG.threads, help = "Run test mode in <THREADS> threads")]
    pub threads: usize,
}
    };
}

keytool_t!(CONFIG_DEF, KeyTool);

/// Routes `log` output through env_logger. `RUST_LOG` wins unless `silent`.
pub fn init_logger(silent: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if silent {
        builder.filter_level(LevelFilter::Off);
    }
    let _ = builder.try_init();
}

/// Message read from `--input`. Raw bytes unless 16-bit characters were asked
/// for, in which case the input has to be UTF-8 text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Text(String),
    Bytes(Vec<u8>),
}

impl Input {
    pub fn new(buf: Vec<u8>, char_size: CharSize) -> Result<Self> {
        match char_size {
            CharSize::B8 => Ok(Input::Bytes(buf)),
            CharSize::B16 => String::from_utf8(buf)
                .map(Input::Text)
                .map_err(|e| Error::MalformedEncoding(e.to_string())),
        }
    }

    pub fn as_msg(&self) -> Msg<'_> {
        match self {
            Input::Text(text) => Msg::Text(text),
            Input::Bytes(bytes) => Msg::Bytes(bytes),
        }
    }
}

impl KeyTool {
    pub fn run_mode(&self) -> Result<RunMode> {
        self.mode.parse()
    }

    pub fn key_use(&self) -> Result<KeyUse> {
        check_valid_key_use(&self.key_use)
    }

    pub fn hash_alg(&self) -> Result<HashAlg> {
        self.hash.parse()
    }

    pub fn rsa_size(&self) -> Result<RsaSize> {
        RsaSize::try_from(self.size)
    }

    pub fn char_size(&self) -> Result<CharSize> {
        self.char_size.to_string().parse()
    }

    pub fn key_options(&self) -> KeyOptions {
        KeyOptions {
            extractable: !self.non_extractable,
            private_write_usage: match self.legacy_write_import {
                true => PrivateWriteUsage::Verify,
                false => PrivateWriteUsage::Sign,
            },
        }
    }

    pub fn op_options(&self) -> Result<OpOptions> {
        Ok(OpOptions { char_size: self.char_size()?, hash: self.hash_alg()?, key_options: self.key_options() })
    }

    pub fn reader(&self) -> Result<Box<dyn Read>> {
        Ok(match self.input.as_str() {
            "stdin" => Box::new(io::stdin()),
            f => Box::new(File::open(f)?),
        })
    }

    pub fn writer(&self) -> Result<Box<dyn Write>> {
        Ok(match self.output.as_str() {
            "stdout" => Box::new(io::stdout()),
            f => Box::new(File::create(f)?),
        })
    }

    fn read_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.reader()?.read_to_end(&mut buf)?;
        Ok(buf)
    }

    fn read_input(&self, char_size: CharSize) -> Result<Input> {
        Input::new(self.read_bytes()?, char_size)
    }

    fn write_output(&self, data: &[u8]) -> Result<()> {
        let mut writer = self.writer()?;
        writer.write_all(data)?;
        writer.flush()?;
        Ok(())
    }

    fn read_pem(path: &str) -> Result<String> {
        match std::fs::read_to_string(path) {
            Ok(pem) => Ok(pem),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(Error::KeyDoesNotExist),
            Err(e) => Err(e.into()),
        }
    }

    fn key_reader(&self) -> Result<KeyReader> {
        Ok(KeyReader::new(self.hash_alg()?, self.key_use()?, self.key_options()))
    }

    pub async fn run(&self) -> Result<()> {
        check_valid_crypto_system(self.crypto.parse()?)?;
        let mode = self.run_mode()?;
        let opts = self.op_options()?;
        debug!("run mode {:?} with {:?}", mode, opts);
        match mode {
            RunMode::Generate => {
                let pair = generate_key_pair_with_options(self.rsa_size()?, opts.hash, self.key_use()?, self.key_options()).await?;
                pair.save(&self.key).await?;
            }
            RunMode::Encrypt => {
                let input = self.read_input(opts.char_size)?;
                let pem = Self::read_pem(&public_path(&self.key))?;
                let ciphertext = encrypt(input.as_msg(), &pem, opts).await?;
                self.write_output(buffer_to_base64(&ciphertext).as_bytes())?;
            }
            RunMode::Decrypt => {
                let ciphertext = String::from_utf8(self.read_bytes()?)
                    .map_err(|e| Error::MalformedEncoding(e.to_string()))?;
                let pem = Self::read_pem(&self.key)?;
                let plain = decrypt_with_options(ciphertext.as_str(), &pem, opts).await?;
                match opts.char_size {
                    CharSize::B8 => self.write_output(&plain)?,
                    CharSize::B16 => self.write_output(buffer_to_text(&plain, CharSize::B16)?.as_bytes())?,
                }
            }
            RunMode::Sign => {
                let input = self.read_input(opts.char_size)?;
                let pem = Self::read_pem(&self.key)?;
                let signature = sign(input.as_msg(), &pem, opts).await?;
                self.write_output(buffer_to_base64(&signature).as_bytes())?;
            }
            RunMode::Verify => {
                let input = self.read_input(opts.char_size)?;
                let pem = Self::read_pem(&public_path(&self.key))?;
                let signature = std::fs::read_to_string(&self.signature)?;
                let valid = verify(input.as_msg(), signature.as_str(), &pem, opts).await?;
                self.write_output(valid.to_string().as_bytes())?;
            }
            RunMode::Info => {
                let key = self.key_reader()?.load(&self.key).await?;
                let lines = match check_is_key(key.clone()) {
                    Ok(KeyData::Public(k)) => vec![describe("public", k.algorithm(), k.usages())],
                    Ok(KeyData::Private(k)) => vec![describe("private", k.algorithm(), k.usages())],
                    _ => {
                        let pair = check_is_key_pair(key)?;
                        vec![
                            describe("public", pair.public_key.algorithm(), pair.public_key.usages()),
                            describe("private", pair.private_key.algorithm(), pair.private_key.usages()),
                        ]
                    }
                };
                self.write_output(lines.join("\n").as_bytes())?;
            }
            RunMode::Test => {
                let pair = check_is_key_pair(self.key_reader()?.load(&self.key).await?)?;
                info!("start testing key pair {}", self.key);
                let (rounds, threads, silent) = (self.rounds as usize, self.threads.max(1), self.silent);
                let handle = Handle::current();
                let passed = tokio::task::spawn_blocking(move || {
                    KeyTool::process(Arc::new(pair), opts, rounds, threads, silent, handle)
                }).await??;
                info!("Test pass, {} rounds", passed);
            }
        }
        Ok(())
    }

    fn test_message_len(pair: &KeyPair) -> usize {
        let algorithm = pair.public_key.algorithm();
        match algorithm.name {
            Algorithm::RsaOaep => (algorithm.modulus_length / 8).saturating_sub(2 * algorithm.hash.output_len() + 2),
            Algorithm::RsaPss => 64,
        }
    }

    /// Round trips `rounds` random messages through the pair on `threads`
    /// workers and returns how many passed.
    pub fn process(pair: Arc<KeyPair>, opts: OpOptions, rounds: usize, threads: usize, silent: bool, handle: Handle) -> Result<usize> {
        let len = KeyTool::test_message_len(&pair);
        let source_data = (0..rounds).map(|_| random_buf(len, None)).collect::<Result<Vec<_>>>()?;
        let (map_tx, map_rx): (Sender<(usize, Vec<u8>)>, Receiver<(usize, Vec<u8>)>) = bounded(threads);
        let (reduce_tx, reduce_rx) = bounded::<(usize, Result<bool>)>(threads);
        let pb = match silent {
            true => None,
            false => Some(ProgressBar::new(rounds as u64)),
        };
        if let Some(pb) = &pb {
            pb.set_style(ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"));
        }
        let handles = (0..threads).map(|_i| {
            let r = map_rx.clone();
            let s = reduce_tx.clone();
            let pair = pair.clone();
            let handle = handle.clone();
            thread::spawn(move || {
                while let Ok((index, source)) = r.recv() {
                    let res = handle.block_on(KeyTool::round_trip(&pair, &source, opts));
                    if s.send((index, res)).is_err() { break; }
                }
            })
        }).collect::<Vec<_>>();
        drop(map_rx);
        drop(reduce_tx);
        let feeder = thread::spawn(move || {
            for (i, source) in source_data.into_iter().enumerate() {
                if map_tx.send((i, source)).is_err() { break; }
            }
        });
        let mut failed = 0;
        let mut res_collect = Vec::with_capacity(rounds);
        for (index, res) in reduce_rx.iter() {
            match res {
                Ok(true) => {}
                Ok(false) => failed += 1,
                Err(e) => {
                    debug!("round {} failed: {}", index, e);
                    failed += 1;
                }
            }
            res_collect.push(index);
            if let Some(pb) = &pb {
                pb.inc(1);
            }
        }
        let _ = feeder.join();
        for handle in handles { let _ = handle.join(); }
        if let Some(pb) = &pb {
            pb.finish_with_message("Done");
        }
        if failed > 0 || res_collect.len() != rounds {
            return Err(Error::SelfTest { failed: failed + rounds - res_collect.len(), total: rounds });
        }
        Ok(rounds)
    }

    async fn round_trip(pair: &KeyPair, source: &[u8], opts: OpOptions) -> Result<bool> {
        match pair.public_key.key_use() {
            KeyUse::Exchange => {
                let ciphertext = encrypt(source, &pair.public_key, opts).await?;
                let plain = decrypt_with_options(&ciphertext, &pair.private_key, opts).await?;
                Ok(plain == source)
            }
            KeyUse::Write => {
                let signature = sign(source, &pair.private_key, opts).await?;
                verify(source, &signature, &pair.public_key, opts).await
            }
        }
    }
}

fn describe(half: &str, algorithm: &KeyAlgorithm, usages: &[KeyUsage]) -> String {
    let usages = usages.iter().map(|u| u.as_str()).collect::<Vec<_>>().join(",");
    format!("{} key: {} {} bits, e = {}, {}, usages: {}",
            half, algorithm.name, algorithm.modulus_length, algorithm.public_exponent, algorithm.hash, usages)
}
