use std::fmt;
use std::error::Error as StdError;
use std::io;

/// Main error type for inventory loading
#[derive(Debug)]
pub enum InventoryError {
    /// Missing or malformed plugin options
    Config(String),

    /// Transport failures and non-success HTTP statuses
    Http(String),

    /// Response body was not a JSON array of objects
    Decode(String),

    /// Composed variable evaluation failures
    Template(String),

    /// Composed or keyed group failures
    Group(String),

    /// A single machine record could not be materialized
    Record(String),

    /// IO errors
    Io(io::Error),

    /// YAML parsing errors
    Yaml(serde_yaml::Error),

    /// JSON encoding errors
    Json(serde_json::Error),

    /// Other errors
    Other(String),
}

impl fmt::Display for InventoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InventoryError::Config(msg) => write!(f, "Configuration error: {}", msg),
            InventoryError::Http(msg) => write!(f, "HTTP error: {}", msg),
            InventoryError::Decode(msg) => write!(f, "Decode error: {}", msg),
            InventoryError::Template(msg) => write!(f, "Template error: {}", msg),
            InventoryError::Group(msg) => write!(f, "Group error: {}", msg),
            InventoryError::Record(msg) => write!(f, "Record error: {}", msg),
            InventoryError::Io(err) => write!(f, "IO error: {}", err),
            InventoryError::Yaml(err) => write!(f, "YAML error: {}", err),
            InventoryError::Json(err) => write!(f, "JSON error: {}", err),
            InventoryError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl StdError for InventoryError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            InventoryError::Io(err) => Some(err),
            InventoryError::Yaml(err) => Some(err),
            InventoryError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for InventoryError {
    fn from(err: io::Error) -> Self {
        InventoryError::Io(err)
    }
}

impl From<serde_yaml::Error> for InventoryError {
    fn from(err: serde_yaml::Error) -> Self {
        InventoryError::Yaml(err)
    }
}

impl From<serde_json::Error> for InventoryError {
    fn from(err: serde_json::Error) -> Self {
        InventoryError::Json(err)
    }
}

impl From<String> for InventoryError {
    fn from(err: String) -> Self {
        InventoryError::Other(err)
    }
}

impl From<&str> for InventoryError {
    fn from(err: &str) -> Self {
        InventoryError::Other(err.to_string())
    }
}

/// Result type alias for inventory operations
pub type Result<T> = std::result::Result<T, InventoryError>;

/// Helper trait to lift String errors from the util layer into InventoryError
pub trait ErrorContext<T> {
    fn context(self, context: &str) -> Result<T>;
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::result::Result<T, String> {
    fn context(self, context: &str) -> Result<T> {
        self.map_err(|e| InventoryError::Other(format!("{}: {}", context, e)))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| InventoryError::Other(format!("{}: {}", f(), e)))
    }
}
