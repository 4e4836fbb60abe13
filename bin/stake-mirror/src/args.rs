//! Parses command-line arguments for the stake mirror.

use std::{fmt, path::PathBuf};

use clap::{crate_version, Parser, Subcommand};
use stake_mirror_primitives::types::EpochIndex;

#[derive(Debug, Parser)]
#[clap(
    name = "stake-mirror",
    about = "Mirrors source-chain stakes to the destination chain, one epoch at a time",
    version = crate_version!()
)]
pub(crate) struct Cli {
    #[clap(
        long,
        short = 'c',
        help = "The file containing the configuration of the stake mirror",
        default_value = "config.toml"
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub(crate) enum Command {
    /// Mirror every completed epoch on a fixed interval until interrupted (default).
    Run,

    /// Mirror every completed epoch once and exit.
    Once,

    /// Print the stored job state.
    Status,

    /// Overwrite the next epoch to mirror.
    SetState {
        /// The next epoch to mirror.
        #[arg(long)]
        index: EpochIndex,

        /// Allow moving the state backwards.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Run => write!(f, "run"),
            Command::Once => write!(f, "once"),
            Command::Status => write!(f, "status"),
            Command::SetState { index, force } => write!(f, "set-state({index}, force={force})"),
        }
    }
}
