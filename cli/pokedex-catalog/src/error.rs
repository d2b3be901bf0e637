//! Error handling for catalog API operations.

use reqwest::StatusCode;
use thiserror::Error;

/// Common error type for catalog API operations.
///
/// Every operation boundary converts one of these into an outcome the caller
/// chose per-policy: page loads surface it, searches degrade to an empty
/// result, evolution resolution degrades to "no chain". Nothing is retried.
#[derive(Debug, Error)]
pub enum CatalogClientError {
    /// The request never produced a response (connection refused, DNS, ...).
    #[error("failed to reach catalog")]
    Transport(#[source] reqwest::Error),
    /// The catalog answered with a non-success status.
    #[error("catalog returned {status}")]
    Http { status: StatusCode },
    /// The response body did not match the expected shape.
    #[error("failed to decode catalog response")]
    Decode(#[source] reqwest::Error),
    /// A resource URL (configured base or one followed from a listing) did
    /// not parse.
    #[error("invalid catalog url")]
    InvalidUrl(#[source] url::ParseError),
    /// The underlying HTTP client could not be constructed.
    #[error("failed to build http client")]
    Build(#[source] reqwest::Error),
}

impl CatalogClientError {
    /// Whether this error is a 404 response.
    ///
    /// Search-by-id treats a 404 as "no match" rather than a fault.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogClientError::Http { status } if *status == StatusCode::NOT_FOUND)
    }
}
