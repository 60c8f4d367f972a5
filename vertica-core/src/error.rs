//! Types for working with errors produced by the driver.

use std::any::type_name;
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt::{self, Display};

/// A specialized `Result` type for this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

// Convenience type alias for usage within the crate.
pub type BoxDynError = Box<dyn StdError + 'static + Send + Sync>;

/// Represents all the ways a method can fail.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Error occurred while parsing connection options or establishing the connection.
    ///
    /// Not retryable without changing the configuration.
    #[error("error with configuration: {0}")]
    Configuration(#[source] BoxDynError),

    /// The driver rejected or failed a statement.
    #[error("{error}\nThe SQL being executed was: {sql}")]
    Query {
        sql: String,
        error: Box<dyn DatabaseError>,
    },

    /// Error returned by the driver outside of statement execution.
    // the driver error is reached through `as_database_error`, not `source()`
    #[error("error returned from database: {0}")]
    Database(Box<dyn DatabaseError>),

    /// A [`DataReader`](crate::DataReader) was rewound after it started reading.
    #[error("DataReader cannot rewind. It is a forward-only reader.")]
    ForwardOnly,

    /// A [`DataReader`](crate::DataReader) was read from after [`close`](crate::DataReader::close).
    #[error("DataReader is closed")]
    ReaderClosed,

    /// A command was executed or fetched from before any SQL was set.
    #[error("no SQL statement has been set on this command")]
    EmptyStatement,

    /// A statement could not be built from the given input.
    #[error("cannot build statement: {0}")]
    InvalidStatement(String),

    /// No column found for the given name.
    #[error("no column found for name: {0}")]
    ColumnNotFound(String),

    /// Column index was out of bounds.
    #[error("column index out of bounds: the len is {len}, but the index is {index}")]
    ColumnIndexOutOfBounds { index: usize, len: usize },

    /// Error occurred while decoding a value from a specific column.
    #[error("error occurred while decoding column {index}: {source}")]
    ColumnDecode {
        index: String,

        #[source]
        source: BoxDynError,
    },

    /// Error occurred while decoding a value.
    #[error("error occurred while decoding: {0}")]
    Decode(#[source] BoxDynError),

    /// The background thread that owns the driver connection has exited.
    #[error("attempted to communicate with a crashed background worker")]
    WorkerCrashed,

    #[error("error communicating with database: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    #[inline]
    pub(crate) fn config(err: impl StdError + Send + Sync + 'static) -> Self {
        Error::Configuration(err.into())
    }

    /// Wraps a driver error with the statement that caused it.
    pub(crate) fn query(sql: impl Into<String>, err: Error) -> Self {
        match err {
            Error::Database(error) => Error::Query {
                sql: sql.into(),
                error,
            },
            other => other,
        }
    }

    /// Returns the driver error behind this error, if any.
    pub fn as_database_error(&self) -> Option<&(dyn DatabaseError + 'static)> {
        match self {
            Error::Database(e) | Error::Query { error: e, .. } => Some(&**e),
            _ => None,
        }
    }

    /// Returns the SQL text of a failed statement.
    pub fn sql(&self) -> Option<&str> {
        match self {
            Error::Query { sql, .. } => Some(sql),
            _ => None,
        }
    }
}

pub(crate) fn mismatched_types<T>(type_name_of_column: &str) -> BoxDynError {
    format!(
        "mismatched types; Rust type `{}` is not compatible with SQL type `{}`",
        type_name::<T>(),
        type_name_of_column
    )
    .into()
}

/// An error that was returned by the database driver.
pub trait DatabaseError: 'static + Send + Sync + StdError {
    /// The primary, human-readable error message.
    fn message(&self) -> &str;

    /// The (SQLSTATE) code for the error.
    fn code(&self) -> Option<Cow<'_, str>> {
        None
    }

    #[doc(hidden)]
    fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static);

    #[doc(hidden)]
    fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static>;
}

impl dyn DatabaseError {
    /// Downcast a reference to this generic database error to a specific
    /// database error type.
    pub fn try_downcast_ref<E: DatabaseError>(&self) -> Option<&E> {
        self.as_error().downcast_ref()
    }
}

/// A driver error carried as plain text, used by drivers that only report a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverError {
    pub(crate) message: String,
    pub(crate) code: Option<String>,
}

impl DriverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{}: {}", code, self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl StdError for DriverError {}

impl DatabaseError for DriverError {
    fn message(&self) -> &str {
        &self.message
    }

    fn code(&self) -> Option<Cow<'_, str>> {
        self.code.as_deref().map(Cow::Borrowed)
    }

    fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self
    }

    fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
        self
    }
}

impl From<DriverError> for Error {
    fn from(error: DriverError) -> Self {
        Error::Database(Box::new(error))
    }
}
