use std::fs::File;
use std::io::Write;
use log::info;
use crate::keytool::errors::Result;
use crate::keytool::keys::{export_private_key, export_public_key, KeyPair};

/// Writes PEM text to a sink, byte for byte: no trailing newline is added
/// after the footer.
pub struct KeyWriter {
    writer: Box<dyn Write>,
}

impl From<File> for KeyWriter {
    fn from(f: File) -> Self {
        Self { writer: Box::new(f) }
    }
}

impl KeyWriter {
    pub fn write_pem(&mut self, pem: &str) -> Result<()> {
        self.writer.write_all(pem.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }
}

pub fn public_path(path: &str) -> String {
    format!("{}.pub", path)
}

impl KeyPair {
    /// Saves the private key to `path` and the public key to `path.pub`.
    pub async fn save(&self, path: &str) -> Result<()> {
        let public = export_public_key(&self.public_key).await?;
        let private = export_private_key(&self.private_key).await?;
        let path_public = public_path(path);
        KeyWriter::from(File::create(&path_public)?).write_pem(&public)?;
        KeyWriter::from(File::create(path)?).write_pem(&private)?;
        info!("Generated key files: {}, {}", path, path_public);
        Ok(())
    }
}
