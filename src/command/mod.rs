pub mod cache;
mod error;
pub mod page;
pub mod school;

pub use error::Error;
