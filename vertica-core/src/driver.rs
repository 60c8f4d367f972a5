//! The boundary between the connection and whatever actually talks to the database.
//!
//! A [`Driver`] opens [`DriverConnection`]s; a connection executes plain SQL
//! text and hands back a [`ResultHandle`], a forward-only cursor that owns
//! everything it needs and stays valid until it is dropped.

use crate::column::VerticaColumn;
use crate::error::Error;
use crate::options::VerticaConnectOptions;
use crate::row::VerticaRow;
use std::fmt::Debug;

pub trait Driver: Send + Sync + Debug + 'static {
    /// Opens a new connection described by `options`.
    fn connect(&self, options: &VerticaConnectOptions) -> Result<Box<dyn DriverConnection>, Error>;
}

/// A single open connection to the database.
pub trait DriverConnection: Send + Debug {
    /// Executes `sql` and returns the cursor over its results.
    ///
    /// Statements that produce no result set (DDL, DML) return a handle with
    /// no columns and no rows.
    fn execute(&mut self, sql: &str) -> Result<Box<dyn ResultHandle>, Error>;

    /// The name of the database management system as reported by the driver.
    fn dbms_name(&mut self) -> Result<String, Error>;

    fn close(self: Box<Self>) -> Result<(), Error>;
}

/// The result of one execution.
pub trait ResultHandle: Send + Debug {
    /// Columns of the current result set; empty when the statement produced none.
    fn columns(&self) -> &[VerticaColumn];

    /// Fetches the next row of the current result set, `None` once exhausted.
    fn fetch_row(&mut self) -> Result<Option<VerticaRow>, Error>;

    /// Number of rows affected, when the driver reports it.
    fn row_count(&self) -> Option<u64>;

    /// Skips the rest of the current result set and moves to the next one.
    ///
    /// Returns `false` when there are no more result sets.
    fn next_result(&mut self) -> Result<bool, Error>;
}
