//! Loading Imgur API credentials from a local settings file.
//!
//! The file is JSON unless its name ends in `.toml`:
//!
//! ```json
//! { "client_id": "...", "client_secret": "..." }
//! ```
//!
//! `access_token` and `refresh_token` may be given as well to make
//! authenticated requests.

use std::{io, path::Path, path::PathBuf};

use fs_err as fs;
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

use crate::imgur_api::ImgurCredentials;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not read the settings file")]
    Io {
        #[from]
        source: io::Error,
    },

    #[error("settings file {} is not valid JSON", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("settings file {} is not valid TOML", .path.display())]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// What the settings file holds, before secrets are wrapped up.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSettings {
    client_id: Option<String>,
    client_secret: Option<String>,
    access_token: Option<String>,
    refresh_token: Option<String>,
}

impl From<RawSettings> for ImgurCredentials {
    fn from(raw: RawSettings) -> Self {
        ImgurCredentials {
            client_id: secret(raw.client_id),
            client_secret: secret(raw.client_secret),
            access_token: secret(raw.access_token),
            refresh_token: secret(raw.refresh_token),
        }
    }
}

/// Blank values count as missing.
fn secret(value: Option<String>) -> Option<SecretString> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .map(SecretString::new)
}

pub fn load(path: &Path) -> Result<ImgurCredentials, SettingsError> {
    let contents = fs::read_to_string(path)?;

    let is_toml = path
        .extension()
        .map_or(false, |extension| extension.eq_ignore_ascii_case("toml"));

    let raw: RawSettings = if is_toml {
        toml::from_str(&contents).map_err(|source| SettingsError::Toml {
            path: path.to_owned(),
            source,
        })?
    } else {
        serde_json::from_str(&contents).map_err(|source| SettingsError::Json {
            path: path.to_owned(),
            source,
        })?
    };

    log::debug!("loaded credentials from {}", path.display());

    Ok(raw.into())
}
