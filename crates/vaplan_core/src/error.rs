use std::fmt;

/// Reasons a payload produced no rider catalog.
///
/// The pipeline never surfaces these: `extract_catalog` maps both to `None`
/// and the resolver falls back to built-in parameters. Callers that want to
/// report why the fallback engaged use `try_extract_catalog`.
#[derive(Debug)]
pub enum CatalogError {
    /// Payload is not valid JSON or does not have the expected shape
    Parse(serde_json::Error),
    /// Payload parsed but every rider is terminated (or there are none)
    Empty,
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Parse(e) => write!(f, "payload could not be parsed: {e}"),
            CatalogError::Empty => write!(f, "payload contains no active riders"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Parse(e) => Some(e),
            CatalogError::Empty => None,
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Parse(err)
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
