use std::path::PathBuf;

use crate::commands::Command;
use clap::Parser;
use secrecy::SecretString;

#[derive(Debug, Parser)]
#[clap(about = env!("CARGO_PKG_DESCRIPTION"))]
pub struct Options {
    #[command(flatten)]
    pub global: Global,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Parser)]
pub struct Global {
    /// The settings file holding Imgur API credentials (`client_id`,
    /// `client_secret` and optionally `access_token` or `refresh_token`).
    /// Read as TOML if the name ends in `.toml`, as JSON otherwise.
    #[clap(long, global(true), default_value = "settings.json")]
    pub settings: PathBuf,

    /// The Imgur client ID to use instead of the one in the settings file.
    /// With this set, a missing settings file is not an error.
    #[clap(
        long,
        global(true),
        env("IMGUR_CLIENT_ID"),
        hide_env_values(true)
    )]
    pub client_id: Option<SecretString>,

    /// Sets verbosity level. Can be specified multiple times to increase the verbosity
    /// of this program.
    #[clap(long = "verbose", short, global(true), action(clap::ArgAction::Count))]
    pub verbosity: u8,
}
