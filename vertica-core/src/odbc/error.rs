use crate::error::DatabaseError;
use odbc_api::Error as OdbcApiError;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// An error reported by the ODBC driver manager or the Vertica ODBC driver.
#[derive(Debug)]
pub struct OdbcDatabaseError {
    message: String,
    source: OdbcApiError,
}

impl OdbcDatabaseError {
    pub fn odbc_error(&self) -> &OdbcApiError {
        &self.source
    }
}

impl From<OdbcApiError> for OdbcDatabaseError {
    fn from(source: OdbcApiError) -> Self {
        Self {
            message: source.to_string(),
            source,
        }
    }
}

impl Display for OdbcDatabaseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.message)
    }
}

impl std::error::Error for OdbcDatabaseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl DatabaseError for OdbcDatabaseError {
    fn message(&self) -> &str {
        &self.message
    }
    fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self
    }
    fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
        self
    }
}

impl From<OdbcApiError> for crate::error::Error {
    fn from(value: OdbcApiError) -> Self {
        crate::error::Error::Database(Box::new(OdbcDatabaseError::from(value)))
    }
}
