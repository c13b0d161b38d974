mod client;
mod error;
mod types;

pub use client::{BackendClient, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use types::{MediaAttachment, Post};

#[cfg(test)]
pub use types::Account;
