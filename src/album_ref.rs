//! Turns an Imgur URL into a typed reference to either an album or a single
//! image.
//!
//! Album URLs look like `https://imgur.com/a/<id>`, anything else is treated
//! as a single image whose identifier is the last path segment minus its
//! extension, e.g. `https://i.imgur.com/<id>.jpg`.

use std::fmt;
use std::str::FromStr;

use reqwest::Url;
use thiserror::Error;

/// The path segment that marks an album URL.
const ALBUM_SEGMENT: &str = "a";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlbumReference {
    Album(String),
    Image(String),
}

impl AlbumReference {
    pub fn identifier(&self) -> &str {
        match self {
            AlbumReference::Album(id) | AlbumReference::Image(id) => id,
        }
    }

    pub fn is_album(&self) -> bool {
        matches!(self, AlbumReference::Album(_))
    }
}

impl fmt::Display for AlbumReference {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        let kind = if self.is_album() { "album" } else { "image" };
        write!(formatter, "{} {}", kind, self.identifier())
    }
}

impl FromStr for AlbumReference {
    type Err = ReferenceParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        resolve(input)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReferenceParseError {
    #[error("'{input}' is not a valid URL: {reason}")]
    InvalidUrl { input: String, reason: String },

    #[error("URL '{input}' has no path to take an identifier from")]
    MissingPath { input: String },

    #[error("URL '{input}' does not end in an album or image identifier")]
    MissingIdentifier { input: String },
}

pub fn resolve(input: &str) -> Result<AlbumReference, ReferenceParseError> {
    let url = Url::parse(input.trim()).map_err(|err| ReferenceParseError::InvalidUrl {
        input: input.to_owned(),
        reason: err.to_string(),
    })?;

    let mut segments: Vec<&str> = match url.path_segments() {
        Some(segments) => segments.collect(),
        None => {
            return Err(ReferenceParseError::MissingPath {
                input: input.to_owned(),
            })
        }
    };

    // `https://imgur.com/a/abc/` splits into a trailing empty segment.
    while segments.last() == Some(&"") {
        segments.pop();
    }

    let (first, last) = match (segments.first(), segments.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => {
            return Err(ReferenceParseError::MissingPath {
                input: input.to_owned(),
            })
        }
    };

    let missing_identifier = || ReferenceParseError::MissingIdentifier {
        input: input.to_owned(),
    };

    if first == ALBUM_SEGMENT {
        if segments.len() < 2 {
            return Err(missing_identifier());
        }

        Ok(AlbumReference::Album(last.to_owned()))
    } else {
        let id = last.split('.').next().unwrap_or_default();
        if id.is_empty() {
            return Err(missing_identifier());
        }

        Ok(AlbumReference::Image(id.to_owned()))
    }
}
