use std::error::Error;
use clap::Parser;
use log::debug;
use rsa_keytool::{init_logger, KeyTool};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let tool = KeyTool::parse();
    init_logger(tool.silent);
    debug!("Run args: {:?}", tool);
    tool.run().await?;
    Ok(())
}
