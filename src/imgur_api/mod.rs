mod oauth;
mod rest;

use std::fmt;

use anyhow::{bail, Result};
use reqwest::StatusCode;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::album_ref::AlbumReference;

pub use self::rest::RestClient;

/// One image as described by the Imgur API. Only `id` and `link` are
/// guaranteed; everything else depends on what the API chose to return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    pub id: String,
    pub link: String,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub mime_type: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub size: Option<u64>,
    pub animated: Option<bool>,
}

impl ImageDescriptor {
    pub fn new(id: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            link: link.into(),
            title: None,
            description: None,
            mime_type: None,
            width: None,
            height: None,
            size: None,
            animated: None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ImgurCredentials {
    pub client_id: Option<SecretString>,
    pub client_secret: Option<SecretString>,
    pub access_token: Option<SecretString>,
    pub refresh_token: Option<SecretString>,
}

pub trait ImgurApiClient: fmt::Debug {
    /// Creates a client and checks that Imgur accepts its credentials.
    fn new(credentials: ImgurCredentials) -> Result<Self>
    where
        Self: Sized;

    fn album_images(&self, album_id: &str) -> Result<Vec<ImageDescriptor>>;

    fn image(&self, image_id: &str) -> Result<ImageDescriptor>;

    /// Lists every image a reference points at, in the order the API returns
    /// them. A single image is a list of one.
    fn images_for(&self, reference: &AlbumReference) -> Result<Vec<ImageDescriptor>> {
        match reference {
            AlbumReference::Album(id) => self.album_images(id),
            AlbumReference::Image(id) => Ok(vec![self.image(id)?]),
        }
    }
}

#[derive(Debug, Error)]
pub enum ImgurApiError {
    #[error("Imgur API HTTP error")]
    Http {
        #[from]
        source: reqwest::Error,
    },

    #[error("Imgur API error: {message}")]
    ApiError { message: String },

    #[error("Imgur API returned success, but had malformed JSON response: {body}")]
    BadResponseJson {
        body: String,
        source: serde_json::Error,
    },

    #[error("Imgur API returned HTTP {status} with body: {body}")]
    ResponseError { status: StatusCode, body: String },

    #[error("Imgur rejected the configured credentials (HTTP {status}): {body}")]
    Unauthorized { status: StatusCode, body: String },

    #[error("No Imgur client ID was given, either in the settings file or with --client-id")]
    MissingAuth,

    #[error("A client secret is required to exchange a refresh token for an access token")]
    RefreshNeedsSecret,

    #[error("Imgur's token endpoint did not return an access token")]
    MissingAccessToken,
}

pub fn get_preferred_client(credentials: ImgurCredentials) -> Result<Box<dyn ImgurApiClient>> {
    match &credentials {
        ImgurCredentials {
            client_id: None, ..
        } => bail!(ImgurApiError::MissingAuth),

        ImgurCredentials {
            access_token: None,
            refresh_token: Some(_),
            client_secret: None,
            ..
        } => bail!(ImgurApiError::RefreshNeedsSecret),

        _ => Ok(Box::new(RestClient::new(credentials)?)),
    }
}
