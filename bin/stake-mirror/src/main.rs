//! The stake mirror copies the stakes of every completed source-chain epoch to the destination
//! chain, proving each one against the Merkle root the voting contract published for its epoch.

use std::{env, fs, path::Path};

use anyhow::Context;
use args::Command;
use clap::Parser;
use config::Config;
use constants::SERVICE_NAME;
use serde::de::DeserializeOwned;
use stake_mirror_common::{logging, logging::LoggerConfig};
use tokio::runtime;
use tracing::{debug, info, trace};

mod args;
mod config;
mod constants;
mod mode;

fn main() -> anyhow::Result<()> {
    // A missing `.env` is fine, the variables may come from the environment itself.
    let dotenv = dotenvy::dotenv().ok();

    let _logging = logging::init(LoggerConfig::with_base_name(SERVICE_NAME))?;
    debug!(?dotenv, "loaded environment");

    let cli = args::Cli::parse();
    let command = cli.command.unwrap_or(Command::Run);
    info!(%command, "starting stake mirror");

    let mut config = parse_toml::<Config>(&cli.config)?;
    config.apply_env_overrides(|name| env::var(name).ok())?;

    let runtime = runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("could not create runtime")?;

    runtime.block_on(async move {
        match command {
            Command::Run => mode::run::run(config).await,
            Command::Once => mode::once::once(config).await,
            Command::Status => mode::status::status(config).await,
            Command::SetState { index, force } => {
                mode::set_state::set_state(config, index, force).await
            }
        }
    })
}

/// Reads and parses a TOML file from the given path into the given type `T`.
fn parse_toml<T>(path: impl AsRef<Path>) -> anyhow::Result<T>
where
    T: std::fmt::Debug + DeserializeOwned,
{
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read TOML file {}", path.display()))?;
    trace!(?path, "read file");

    let parsed = toml::from_str::<T>(&contents)
        .with_context(|| format!("failed to parse TOML file {}", path.display()))?;
    debug!(?parsed, "parsed TOML file");

    Ok(parsed)
}
