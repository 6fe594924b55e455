use std::fmt;

/// Failure talking to the external catalog.
///
/// Never fatal for a run: the lookup cache logs it and records the
/// identifier as not found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Transport failure (DNS, refused, timeout).
    Network(String),
    /// Non-success HTTP status other than "not found".
    Http { status: u16, url: String },
    /// Response body did not have the expected shape.
    Parse(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "catalog network error: {msg}"),
            Self::Http { status, url } => write!(f, "catalog returned HTTP {status} for {url}"),
            Self::Parse(msg) => write!(f, "catalog response parse error: {msg}"),
        }
    }
}

impl std::error::Error for CatalogError {}
