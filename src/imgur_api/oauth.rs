//! Exchanging an OAuth refresh token for a short-lived access token.

use anyhow::{bail, Result};
use log::debug;
use reqwest::blocking::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::ImgurApiError;

const TOKEN_URL: &str = "https://api.imgur.com/oauth2/token";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    account_username: Option<String>,
    expires_in: Option<u64>,
}

pub fn refresh_access_token(
    client: &Client,
    client_id: &SecretString,
    client_secret: &SecretString,
    refresh_token: &SecretString,
) -> Result<SecretString> {
    let response = client
        .post(TOKEN_URL)
        .form(&[
            ("refresh_token", refresh_token.expose_secret().as_str()),
            ("client_id", client_id.expose_secret().as_str()),
            ("client_secret", client_secret.expose_secret().as_str()),
            ("grant_type", "refresh_token"),
        ])
        .send()
        .map_err(ImgurApiError::from)?;

    let status = response.status();
    let body = response.text().map_err(ImgurApiError::from)?;

    if !status.is_success() {
        bail!(ImgurApiError::Unauthorized { status, body });
    }

    let token: TokenResponse = match serde_json::from_str(&body) {
        Ok(token) => token,
        Err(source) => bail!(ImgurApiError::BadResponseJson { body, source }),
    };

    let Some(access_token) = token.access_token else {
        bail!(ImgurApiError::MissingAccessToken);
    };

    debug!(
        "refreshed access token for {} (expires in {}s)",
        token.account_username.as_deref().unwrap_or("<unknown account>"),
        token.expires_in.unwrap_or_default()
    );

    Ok(SecretString::new(access_token))
}
