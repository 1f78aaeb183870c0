use std::fmt;

use rustls_pki_types::pem;
use tracing::{debug, warn};

use crate::kv_store;

#[derive(Debug, PartialEq)]
pub enum Error {
    Store(kv_store::Error),
    InvalidUrl(String),
    Http(String),
    Tls(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Store(err) => write!(f, "Store error: {err}"),
            Error::InvalidUrl(err) => write!(f, "Invalid URL: {err}"),
            Error::Http(err) => write!(f, "HTTP error: {err}"),
            Error::Tls(err) => write!(f, "TLS error: {err}"),
        }
    }
}

impl From<kv_store::Error> for Error {
    fn from(error: kv_store::Error) -> Self {
        Error::Store(error)
    }
}

impl From<http::uri::InvalidUri> for Error {
    fn from(error: http::uri::InvalidUri) -> Self {
        debug!("Invalid URI: {error}");
        Error::InvalidUrl(error.to_string())
    }
}

impl From<http::Error> for Error {
    fn from(error: http::Error) -> Self {
        debug!("Invalid HTTP request: {error}");
        Error::InvalidUrl(error.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(error: url::ParseError) -> Self {
        debug!("Invalid URL: {error}");
        Error::InvalidUrl(error.to_string())
    }
}

impl From<hyper::Error> for Error {
    fn from(error: hyper::Error) -> Self {
        warn!("HTTP transport error: {error}");
        Error::Http(error.to_string())
    }
}

impl From<rustls::Error> for Error {
    fn from(error: rustls::Error) -> Self {
        Error::Tls(error.to_string())
    }
}

impl From<pem::Error> for Error {
    fn from(error: pem::Error) -> Self {
        Error::Tls(error.to_string())
    }
}
