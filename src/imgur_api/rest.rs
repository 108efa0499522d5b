use std::fmt;

use anyhow::{bail, Result};
use log::{debug, trace};
use reqwest::{
    blocking::Client,
    header::{HeaderValue, AUTHORIZATION},
    StatusCode,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Deserialize};

use crate::USER_AGENT;

use super::{
    oauth::refresh_access_token, ImageDescriptor, ImgurApiClient, ImgurApiError, ImgurCredentials,
};

const API_BASE: &str = "https://api.imgur.com/3";

/// Every v3 endpoint wraps its payload like this.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
    success: Option<bool>,
    status: Option<u16>,
}

/// Remaining request quota, as reported by `/3/credits`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Credits {
    client_limit: Option<i64>,
    client_remaining: Option<i64>,
    user_limit: Option<i64>,
    user_remaining: Option<i64>,
}

pub struct RestClient {
    credentials: ImgurCredentials,
    authorization: HeaderValue,
    client: Client,
}

impl fmt::Debug for RestClient {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "ImgurApiClient")
    }
}

impl ImgurApiClient for RestClient {
    fn new(credentials: ImgurCredentials) -> Result<Self> {
        let Some(client_id) = credentials.client_id.as_ref() else {
            bail!(ImgurApiError::MissingAuth);
        };

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(ImgurApiError::from)?;

        let access_token = match (&credentials.access_token, &credentials.refresh_token) {
            (Some(token), _) => Some(token.clone()),
            (None, Some(refresh_token)) => {
                let Some(client_secret) = credentials.client_secret.as_ref() else {
                    bail!(ImgurApiError::RefreshNeedsSecret);
                };

                Some(refresh_access_token(
                    &client,
                    client_id,
                    client_secret,
                    refresh_token,
                )?)
            }
            (None, None) => {
                debug!("no OAuth tokens configured, using anonymous Client-ID access");
                None
            }
        };

        let authorization = authorization_header(client_id, access_token.as_ref())?;

        let rest = Self {
            credentials,
            authorization,
            client,
        };
        rest.check_credentials()?;

        Ok(rest)
    }

    fn album_images(&self, album_id: &str) -> Result<Vec<ImageDescriptor>> {
        let images: Vec<ImageDescriptor> =
            self.get_data(&format!("{}/album/{}/images", API_BASE, album_id))?;
        debug!("album {} has {} images", album_id, images.len());

        Ok(images)
    }

    fn image(&self, image_id: &str) -> Result<ImageDescriptor> {
        self.get_data(&format!("{}/image/{}", API_BASE, image_id))
    }
}

impl RestClient {
    /// Imgur has no dedicated "who am I" call for anonymous clients, so ask
    /// for the remaining quota instead. It fails the same way a real request
    /// would when the credentials are bad.
    fn check_credentials(&self) -> Result<()> {
        let credits: Credits = self.get_data(&format!("{}/credits", API_BASE))?;

        debug!(
            "authenticated as {} client, {}/{} client requests and {}/{} user requests remaining",
            if self.credentials.access_token.is_some() || self.credentials.refresh_token.is_some() {
                "an OAuth"
            } else {
                "an anonymous"
            },
            display_quota(credits.client_remaining),
            display_quota(credits.client_limit),
            display_quota(credits.user_remaining),
            display_quota(credits.user_limit),
        );

        Ok(())
    }

    fn get_data<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        trace!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, self.authorization.clone())
            .send()
            .map_err(ImgurApiError::from)?;

        let status = response.status();
        let body = response.text().map_err(ImgurApiError::from)?;

        Ok(parse_response(status, body)?)
    }
}

fn authorization_header(
    client_id: &SecretString,
    access_token: Option<&SecretString>,
) -> Result<HeaderValue> {
    let value = match access_token {
        Some(token) => format!("Bearer {}", token.expose_secret()),
        None => format!("Client-ID {}", client_id.expose_secret()),
    };

    let mut header = HeaderValue::from_str(&value)?;
    header.set_sensitive(true);

    Ok(header)
}

/// Turns a raw response into the payload it carries, or into the error it
/// describes.
fn parse_response<T: DeserializeOwned>(status: StatusCode, body: String) -> Result<T, ImgurApiError> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ImgurApiError::Unauthorized { status, body });
    }

    if !status.is_success() {
        return Err(ImgurApiError::ResponseError { status, body });
    }

    let envelope: Envelope<T> = match serde_json::from_str(&body) {
        Ok(envelope) => envelope,
        Err(source) => return Err(ImgurApiError::BadResponseJson { body, source }),
    };

    // Some errors are reported inside the envelope even though the HTTP
    // status was a success.
    if envelope.success == Some(false) {
        return Err(ImgurApiError::ApiError {
            message: format!(
                "request was not successful (status {})",
                envelope.status.unwrap_or_else(|| status.as_u16())
            ),
        });
    }

    Ok(envelope.data)
}

fn display_quota(value: Option<i64>) -> String {
    value.map_or_else(|| "?".to_owned(), |value| value.to_string())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unwraps_album_listing() {
        let body = r#"{
            "data": [
                {"id": "a1", "link": "https://i.imgur.com/a1.jpg", "type": "image/jpeg"},
                {"id": "b2", "link": "https://i.imgur.com/b2.png", "type": "image/png"}
            ],
            "success": true,
            "status": 200
        }"#;

        let images: Vec<ImageDescriptor> = parse_response(StatusCode::OK, body.to_owned()).unwrap();

        assert_eq!(images.len(), 2);
        assert_eq!(images[0].id, "a1");
        assert_eq!(images[1].link, "https://i.imgur.com/b2.png");
    }

    #[test]
    fn unwraps_credits() {
        let body = r#"{
            "data": {"UserLimit": 2000, "UserRemaining": 1999, "UserReset": 1700000000, "ClientLimit": 12500, "ClientRemaining": 12000},
            "success": true,
            "status": 200
        }"#;

        let credits: Credits = parse_response(StatusCode::OK, body.to_owned()).unwrap();

        assert_eq!(credits.client_remaining, Some(12000));
        assert_eq!(credits.user_limit, Some(2000));
    }

    #[test]
    fn rejected_credentials_are_unauthorized() {
        let body = r#"{"data": {"error": "Invalid client_id", "request": "/3/credits", "method": "GET"}, "success": false, "status": 403}"#;

        let err = parse_response::<Credits>(StatusCode::FORBIDDEN, body.to_owned()).unwrap_err();

        match err {
            ImgurApiError::Unauthorized { status, body } => {
                assert_eq!(status, StatusCode::FORBIDDEN);
                assert!(body.contains("Invalid client_id"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn missing_album_is_a_response_error() {
        let body = r#"{"data": {"error": "Unable to find an album with the id, nope", "request": "/3/album/nope/images", "method": "GET"}, "success": false, "status": 404}"#;

        let err = parse_response::<Vec<ImageDescriptor>>(StatusCode::NOT_FOUND, body.to_owned())
            .unwrap_err();

        assert!(matches!(
            err,
            ImgurApiError::ResponseError { status, .. } if status == StatusCode::NOT_FOUND
        ));
    }

    #[test]
    fn malformed_json_keeps_the_body() {
        let err = parse_response::<Vec<ImageDescriptor>>(StatusCode::OK, "<html>".to_owned())
            .unwrap_err();

        match err {
            ImgurApiError::BadResponseJson { body, .. } => assert_eq!(body, "<html>"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn unsuccessful_envelope_is_an_api_error() {
        let body = r#"{"data": [], "success": false, "status": 500}"#;

        let err = parse_response::<Vec<ImageDescriptor>>(StatusCode::OK, body.to_owned()).unwrap_err();

        match err {
            ImgurApiError::ApiError { message } => assert!(message.contains("500")),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn prefers_bearer_token_over_client_id() {
        let client_id = SecretString::new("client".to_owned());
        let token = SecretString::new("token".to_owned());

        let bearer = authorization_header(&client_id, Some(&token)).unwrap();
        assert_eq!(bearer.to_str().unwrap(), "Bearer token");
        assert!(bearer.is_sensitive());

        let anonymous = authorization_header(&client_id, None).unwrap();
        assert_eq!(anonymous.to_str().unwrap(), "Client-ID client");
    }
}
