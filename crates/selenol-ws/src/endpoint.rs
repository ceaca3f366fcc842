//! Declarative configuration for hub endpoints.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// WebSocket endpoint of a message hub.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub struct HubEndpoint {
    url: Url,
}

impl HubEndpoint {
    /// Returns the endpoint URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }
}

impl fmt::Display for HubEndpoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.url)
    }
}

impl FromStr for HubEndpoint {
    type Err = EndpointParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(input)?;
        if url.scheme() != "ws" {
            return Err(EndpointParseError::UnsupportedScheme(
                url.scheme().to_owned(),
            ));
        }
        if url.host_str().is_none() {
            return Err(EndpointParseError::MissingHost(input.to_owned()));
        }
        Ok(Self { url })
    }
}

impl TryFrom<String> for HubEndpoint {
    type Error = EndpointParseError;

    fn try_from(input: String) -> Result<Self, Self::Error> {
        input.parse()
    }
}

impl From<HubEndpoint> for String {
    fn from(endpoint: HubEndpoint) -> Self {
        endpoint.to_string()
    }
}

/// Errors encountered while parsing a [`HubEndpoint`] from text.
#[derive(Debug, Error)]
pub enum EndpointParseError {
    /// Scheme was not recognised; only plain `ws` transports are supported.
    #[error("unsupported hub scheme '{0}'")]
    UnsupportedScheme(String),
    /// Host name was missing.
    #[error("missing hub host in '{0}'")]
    MissingHost(String),
    /// URL failed to parse.
    #[error(transparent)]
    Url(#[from] url::ParseError),
}
