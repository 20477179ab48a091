use rand::Rng;
use crate::keytool::errors::{Error, Result};
use crate::keytool::types::{CharSize, Msg};

pub fn buffer_to_base64(buf: &[u8]) -> String {
    base64::encode_config(buf, base64::STANDARD)
}

pub fn base64_to_buffer(s: &str) -> Result<Vec<u8>> {
    Ok(base64::decode_config(s, base64::STANDARD)?)
}

/// Serializes every UTF-16 code unit of `text` into `char_size` bits.
///
/// `CharSize::B8` keeps only the low byte of each unit, so anything above
/// U+00FF is lossy. `CharSize::B16` writes each unit in native byte order.
pub fn text_to_buffer(text: &str, char_size: CharSize) -> Vec<u8> {
    match char_size {
        CharSize::B8 => text.encode_utf16().map(|unit| unit as u8).collect(),
        CharSize::B16 => text.encode_utf16().flat_map(|unit| unit.to_ne_bytes()).collect(),
    }
}

/// Reads `buf` back as code units of `char_size` bits. Unpaired surrogates
/// become U+FFFD.
pub fn buffer_to_text(buf: &[u8], char_size: CharSize) -> Result<String> {
    let units: Vec<u16> = match char_size {
        CharSize::B8 => buf.iter().map(|b| *b as u16).collect(),
        CharSize::B16 => {
            if buf.len() % 2 != 0 {
                return Err(Error::MalformedEncoding(
                    format!("{} bytes is not a whole number of 16-bit characters", buf.len())));
            }
            buf.chunks_exact(2).map(|c| u16::from_ne_bytes([c[0], c[1]])).collect()
        }
    };
    Ok(String::from_utf16_lossy(&units))
}

pub fn normalize_unicode_to_buf(msg: Msg<'_>, char_size: CharSize) -> Vec<u8> {
    match msg {
        Msg::Text(text) => text_to_buffer(text, char_size),
        Msg::Bytes(bytes) => bytes.to_vec(),
    }
}

pub fn normalize_base64_to_buf(msg: Msg<'_>) -> Result<Vec<u8>> {
    match msg {
        Msg::Text(text) => base64_to_buffer(text.trim()),
        Msg::Bytes(bytes) => Ok(bytes.to_vec()),
    }
}

fn header(label: &str) -> String {
    format!("-----BEGIN {}-----", label)
}

fn footer(label: &str) -> String {
    format!("-----END {}-----", label)
}

pub fn armor(binary: &[u8], label: &str) -> String {
    format!("{}\n{}\n{}", header(label), buffer_to_base64(binary), footer(label))
}

/// Strips the `label` header and footer and decodes the body. Line breaks
/// inside the body are tolerated.
pub fn unarmor(pem: &str, label: &str) -> Result<Vec<u8>> {
    let malformed = || Error::MalformedPem { label: label.to_string() };
    let body = pem.trim()
        .strip_prefix(header(label).as_str()).ok_or_else(malformed)?
        .strip_suffix(footer(label).as_str()).ok_or_else(malformed)?;
    let body = body.chars().filter(|c| !c.is_ascii_whitespace()).collect::<String>();
    base64_to_buffer(&body)
}

/// `len` random bytes. With `max`, every byte is drawn from `0..max`, and
/// `max` has to lie strictly between 0 and 256.
pub fn random_buf(len: usize, max: Option<u16>) -> Result<Vec<u8>> {
    let mut rng = rand::thread_rng();
    match max {
        None => {
            let mut buf = vec![0u8; len];
            rng.fill(buf.as_mut_slice());
            Ok(buf)
        }
        Some(max) if max == 0 || max >= 256 => Err(Error::InvalidMaxValue),
        Some(max) => Ok((0..len).map(|_| rng.gen_range(0..max) as u8).collect()),
    }
}
