//! `wgconf genkey|pubkey|genpsk|keypair`

use anyhow::{Result, anyhow};
use tokio::io::AsyncReadExt;
use wgconf_core::Config;

use crate::error::CliError;
use crate::output::{OutputFormat, print_json};

fn no_key(subcommand: &str) -> anyhow::Error {
    CliError::external_tool(anyhow!("`wg {subcommand}` did not produce a key")).into()
}

/// Print a new private key.
pub async fn genkey(config: &Config) -> Result<()> {
    let key = config
        .wg_tools()
        .generate_private_key()
        .await?
        .ok_or_else(|| no_key("genkey"))?;
    println!("{key}");
    Ok(())
}

/// Read a private key from stdin and print its public key.
pub async fn pubkey(config: &Config) -> Result<()> {
    let mut input = String::new();
    tokio::io::stdin().read_to_string(&mut input).await?;
    let private_key = input.trim();
    if private_key.is_empty() {
        return Err(CliError::usage(anyhow!("expected a private key on stdin")).into());
    }

    let key = config
        .wg_tools()
        .public_key(Some(private_key))
        .await?
        .ok_or_else(|| no_key("pubkey"))?;
    println!("{key}");
    Ok(())
}

/// Print a new preshared key.
pub async fn genpsk(config: &Config) -> Result<()> {
    let key = config
        .wg_tools()
        .generate_preshared_key()
        .await?
        .ok_or_else(|| no_key("genpsk"))?;
    println!("{key}");
    Ok(())
}

/// Print a new private key and the public key derived from it.
pub async fn keypair(config: &Config, format: OutputFormat) -> Result<()> {
    let pair = config
        .wg_tools()
        .generate_keypair()
        .await?
        .ok_or_else(|| no_key("genkey"))?;

    match format {
        OutputFormat::Json => print_json(&pair)?,
        OutputFormat::Text => {
            println!("PrivateKey = {}", pair.private_key);
            println!("PublicKey = {}", pair.public_key);
        },
    }
    Ok(())
}
