use std::fmt;

use mongodb::error::ErrorKind;
use tracing::{debug, warn};

#[derive(Debug, PartialEq)]
pub enum Error {
    Unavailable(String),
    Backend(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Unavailable(err) => write!(f, "Document store unavailable: {err}"),
            Error::Backend(err) => write!(f, "Document store error: {err}"),
        }
    }
}

impl From<mongodb::error::Error> for Error {
    fn from(error: mongodb::error::Error) -> Self {
        if matches!(
            error.kind.as_ref(),
            ErrorKind::ServerSelection { .. } | ErrorKind::Io(_)
        ) {
            warn!("MongoDB connection error: {error}");
            Error::Unavailable(error.to_string())
        } else {
            debug!("MongoDB error: {error}");
            Error::Backend(error.to_string())
        }
    }
}
