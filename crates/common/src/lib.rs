//! Common types for the Weebly webhook client

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
