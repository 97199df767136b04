//!
//! # Error Types
//!

/// # Context Enumeration
/// Provides error messages a rough sense of where in the cell hierarchy
/// things went wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorContext {
    /// Library-level operations
    Library,
    /// Cell, by name
    Cell(String),
    /// Instance, referencing cell by name
    Instance(String),
    /// Array of instances, referencing cell by name
    Array(String),
    /// Spatial units
    Units,
    /// Geometric element
    Geometry,
    /// Metadata sidecar handling
    Metadata,
    /// Unknown context
    Unknown,
}

/// # Phot21 Error Enumeration
#[derive(Debug)]
pub enum PhotError {
    /// Errors encountered importing GDS data
    Import {
        message: String,
        stack: Vec<ErrorContext>,
    },
    /// Errors encountered exporting to GDS
    Export {
        message: String,
        stack: Vec<ErrorContext>,
    },
    /// Boxed (External) Errors
    Boxed(Box<dyn std::error::Error + Send + Sync>),
    /// Uncategorized errors, with message
    Str(String),
}
impl std::fmt::Display for PhotError {
    /// Delegate to the (derived) [std::fmt::Debug] implementation
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
impl std::error::Error for PhotError {}
impl From<String> for PhotError {
    fn from(e: String) -> Self {
        Self::Str(e)
    }
}
impl From<&str> for PhotError {
    fn from(e: &str) -> Self {
        Self::Str(e.to_string())
    }
}
impl From<std::io::Error> for PhotError {
    fn from(e: std::io::Error) -> Self {
        Self::Boxed(Box::new(e))
    }
}
impl From<phot21gds::GdsError> for PhotError {
    fn from(e: phot21gds::GdsError) -> Self {
        Self::Boxed(Box::new(e))
    }
}
impl From<phot21utils::ser::Error> for PhotError {
    fn from(e: phot21utils::ser::Error) -> Self {
        Self::Boxed(Box::new(e))
    }
}
impl From<serde_json::Error> for PhotError {
    fn from(e: serde_json::Error) -> Self {
        Self::Boxed(Box::new(e))
    }
}
impl From<serde_yaml::Error> for PhotError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Boxed(Box::new(e))
    }
}
impl<T> From<std::sync::PoisonError<T>> for PhotError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        Self::Str("poisoned cell lock".into())
    }
}

/// # Phot21 Result Type-Alias
pub type PhotResult<T> = Result<T, PhotError>;

/// # Error-Generation Helper Trait
///
/// Implementers keep a context stack describing where in the cell hierarchy
/// they are working, and define `err` to wrap a message with that stack.
/// `fail` then short-circuits any `Result`-returning method.
pub trait HasErrors {
    /// Create an error with the current context
    fn err(&self, msg: impl Into<String>) -> PhotError;
    /// Return failure, i.e. `Err(self.err(msg))`
    fn fail<T>(&self, msg: impl Into<String>) -> PhotResult<T> {
        Err(self.err(msg))
    }
}
