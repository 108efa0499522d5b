mod download;
mod list;

use anyhow::Result;
use clap::Subcommand;
use log::debug;
pub use download::*;
pub use list::*;

use crate::{
    imgur_api::{get_preferred_client, ImgurApiClient, ImgurCredentials},
    options::Global,
    settings,
};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Downloads every image of one or more Imgur albums (or single images)
    /// into numbered files, continuing the numbering of earlier downloads.
    Download(DownloadOptions),

    /// Lists the direct links of every image an album or image URL points
    /// at, without downloading anything.
    List(ListOptions),
}

/// Loads credentials and builds an authenticated API client. Any problem with
/// the settings file surfaces here, before a single request is made.
fn connect(global: &Global) -> Result<Box<dyn ImgurApiClient>> {
    let mut credentials = if global.client_id.is_some() && !global.settings.exists() {
        debug!(
            "no settings file at {}, using the client ID given on the command line",
            global.settings.display()
        );
        ImgurCredentials::default()
    } else {
        settings::load(&global.settings)?
    };

    if let Some(client_id) = &global.client_id {
        credentials.client_id = Some(client_id.clone());
    }

    get_preferred_client(credentials)
}
