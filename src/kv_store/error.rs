use std::fmt;

use redis::RedisError;
use tracing::{debug, warn};

#[derive(Debug, PartialEq)]
pub enum Error {
    Unavailable(String),
    Backend(String),
    Execution(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Unavailable(err) => write!(f, "Store unavailable: {err}"),
            Error::Backend(err) | Error::Execution(err) => write!(f, "{err}"),
        }
    }
}

impl From<RedisError> for Error {
    fn from(error: RedisError) -> Self {
        if error.is_io_error()
            || error.is_connection_refusal()
            || error.is_connection_dropped()
            || error.is_timeout()
        {
            warn!("Redis connection error: {error}");
            Error::Unavailable(error.to_string())
        } else {
            debug!("Redis backend error: {error}");
            Error::Backend(format!("Redis error: {error}"))
        }
    }
}
