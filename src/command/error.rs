use crate::{configuration, document_store, kv_store, web};
use std::fmt;

#[derive(Debug)]
pub enum Error {
    Configuration(configuration::Error),
    KeyValueStore(kv_store::Error),
    DocumentStore(document_store::Error),
    Web(web::Error),
    InvalidArgument(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Configuration(err) => write!(f, "Configuration error: {err}"),
            Error::KeyValueStore(err) => write!(f, "Key-value store error: {err}"),
            Error::DocumentStore(err) => write!(f, "{err}"),
            Error::Web(err) => write!(f, "{err}"),
            Error::InvalidArgument(err) => write!(f, "Invalid argument: {err}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<configuration::Error> for Error {
    fn from(err: configuration::Error) -> Self {
        Error::Configuration(err)
    }
}

impl From<kv_store::Error> for Error {
    fn from(err: kv_store::Error) -> Self {
        Error::KeyValueStore(err)
    }
}

impl From<document_store::Error> for Error {
    fn from(err: document_store::Error) -> Self {
        Error::DocumentStore(err)
    }
}

impl From<web::Error> for Error {
    fn from(err: web::Error) -> Self {
        Error::Web(err)
    }
}
