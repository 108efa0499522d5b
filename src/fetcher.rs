//! Retrieving raw image bytes and working out what to call them.

use anyhow::Result;
use log::{trace, warn};
use reqwest::blocking::Client;
use thiserror::Error;

use crate::imgur_api::ImageDescriptor;
use crate::USER_AGENT;

/// Used when neither the link nor the mime type says what the file is.
const FALLBACK_EXTENSION: &str = "bin";

pub trait ImageFetcher {
    /// Returns the full body served at `url`.
    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to download {url}")]
    Transport {
        url: String,
        source: reqwest::Error,
    },
}

/// Fetches images with one plain GET each. The body is returned whatever the
/// status code, so an error page is saved like any other image.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self { client })
    }
}

impl ImageFetcher for HttpFetcher {
    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let transport = |source| FetchError::Transport {
            url: url.to_owned(),
            source,
        };

        let response = self.client.get(url).send().map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            warn!("{} answered with HTTP {}, saving the response body anyway", url, status);
        }

        let bytes = response.bytes().map_err(transport)?;
        trace!("fetched {} bytes from {}", bytes.len(), url);

        Ok(bytes.to_vec())
    }
}

/// The text after the last `.` of the file name in the image's link, e.g.
/// `jpg` for `https://i.imgur.com/abc.jpg`.
///
/// Links without an extension fall back to the subtype of the image's mime
/// type, then to `bin`.
pub fn extension(descriptor: &ImageDescriptor) -> String {
    let link = descriptor
        .link
        .split(|c: char| c == '?' || c == '#')
        .next()
        .unwrap_or_default();
    let file_name = link.rsplit('/').next().unwrap_or_default();

    if let Some((_, extension)) = file_name.rsplit_once('.') {
        if !extension.is_empty() {
            return extension.to_owned();
        }
    }

    let from_mime_type = descriptor
        .mime_type
        .as_deref()
        .and_then(|mime_type| mime_type.split_once('/'))
        .map(|(_, subtype)| subtype)
        .filter(|subtype| !subtype.is_empty());

    match from_mime_type {
        Some(subtype) => subtype.to_owned(),
        None => FALLBACK_EXTENSION.to_owned(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Answers a single request with `response` and returns the address to
    /// send it to.
    fn serve_once(response: &'static str) -> (String, thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();

            let mut request = Vec::new();
            let mut buffer = [0; 1024];
            while !request.windows(4).any(|window| window == b"\r\n\r\n") {
                let read = stream.read(&mut buffer).unwrap();
                if read == 0 {
                    break;
                }
                request.extend_from_slice(&buffer[..read]);
            }

            stream.write_all(response.as_bytes()).unwrap();
        });

        (format!("http://{}/abc.jpg", address), server)
    }

    fn local_fetcher() -> HttpFetcher {
        HttpFetcher {
            client: Client::builder().no_proxy().build().unwrap(),
        }
    }

    #[test]
    fn fetches_body_of_successful_response() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: image/jpeg\r\nContent-Length: 4\r\nConnection: close\r\n\r\n\u{1}\u{2}\u{3}\u{4}",
        );

        let bytes = local_fetcher().fetch_bytes(&url).unwrap();
        server.join().unwrap();

        assert_eq!(bytes, vec![1, 2, 3, 4]);
    }

    #[test]
    fn error_status_still_returns_the_body() {
        let (url, server) = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 9\r\nConnection: close\r\n\r\nnot found",
        );

        let bytes = local_fetcher().fetch_bytes(&url).unwrap();
        server.join().unwrap();

        assert_eq!(bytes, b"not found");
    }

    #[test]
    fn connection_failure_is_a_fetch_error() {
        let address = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let url = format!("http://{}/abc.jpg", address);

        let err = local_fetcher().fetch_bytes(&url).unwrap_err();

        match err.downcast_ref::<FetchError>() {
            Some(FetchError::Transport { url: failed, .. }) => assert_eq!(failed, &url),
            other => panic!("unexpected error {:?}", other),
        }
    }

    fn with_link(link: &str) -> ImageDescriptor {
        ImageDescriptor::new("id", link)
    }

    #[test]
    fn extension_after_last_dot() {
        assert_eq!(extension(&with_link("https://i.imgur.com/abc.jpg")), "jpg");
        assert_eq!(extension(&with_link("https://i.imgur.com/abc.png")), "png");
        assert_eq!(extension(&with_link("https://i.imgur.com/abc.tar.gz")), "gz");
    }

    #[test]
    fn extension_ignores_query_and_fragment() {
        assert_eq!(extension(&with_link("https://i.imgur.com/abc.gifv?x=1.2")), "gifv");
        assert_eq!(extension(&with_link("https://i.imgur.com/abc.mp4#t=1.5")), "mp4");
    }

    #[test]
    fn extension_ignores_dots_in_host() {
        let mut descriptor = with_link("https://i.imgur.com/abc");
        descriptor.mime_type = Some("image/webp".to_owned());

        assert_eq!(extension(&descriptor), "webp");
    }

    #[test]
    fn extension_falls_back_to_bin() {
        assert_eq!(extension(&with_link("https://i.imgur.com/abc")), "bin");
        assert_eq!(extension(&with_link("https://i.imgur.com/abc.")), "bin");
    }
}
