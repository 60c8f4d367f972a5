//! Transport over the system ODBC driver manager.

use crate::column::VerticaColumn;
use crate::driver::{Driver, DriverConnection, ResultHandle};
use crate::error::Error;
use crate::options::VerticaConnectOptions;
use crate::row::VerticaRow;
use std::sync::Arc;

mod error;
mod type_info;
mod worker;

pub use error::OdbcDatabaseError;

use worker::{ConnectionWorker, StreamItem, StreamResult};

/// Connects through the ODBC driver manager with the options' connection string.
#[derive(Debug, Clone, Copy, Default)]
pub struct OdbcDriver;

impl Driver for OdbcDriver {
    fn connect(&self, options: &VerticaConnectOptions) -> Result<Box<dyn DriverConnection>, Error> {
        let worker = ConnectionWorker::establish(options.full_connection_string().into_owned())?;
        Ok(Box::new(OdbcConnection { worker }))
    }
}

#[derive(Debug)]
struct OdbcConnection {
    worker: ConnectionWorker,
}

impl DriverConnection for OdbcConnection {
    fn execute(&mut self, sql: &str) -> Result<Box<dyn ResultHandle>, Error> {
        let rx = self.worker.execute_stream(sql)?;
        Ok(Box::new(OdbcResult::start(rx)?))
    }

    fn dbms_name(&mut self) -> Result<String, Error> {
        self.worker.get_dbms_name()
    }

    fn close(mut self: Box<Self>) -> Result<(), Error> {
        self.worker.shutdown()
    }
}

/// The receiving end of one execution stream.
#[derive(Debug)]
struct OdbcResult {
    rx: flume::Receiver<StreamResult>,
    columns: Arc<[VerticaColumn]>,
    rows_affected: Option<u64>,
    // an item read ahead while looking for the end of a result set
    peeked: Option<StreamItem>,
    set_exhausted: bool,
    done: bool,
}

impl OdbcResult {
    /// Waits for the statement to finish executing.
    fn start(rx: flume::Receiver<StreamResult>) -> Result<Self, Error> {
        let mut result = OdbcResult {
            rx,
            columns: Arc::from(Vec::new()),
            rows_affected: None,
            peeked: None,
            set_exhausted: false,
            done: false,
        };

        match result.next_item()? {
            Some(StreamItem::Columns(columns)) => result.columns = columns,
            Some(StreamItem::Done(rows_affected)) => result.finish(rows_affected),
            Some(row @ StreamItem::Row(_)) => result.peeked = Some(row),
            None => result.finish(None),
        }

        Ok(result)
    }

    fn next_item(&mut self) -> Result<Option<StreamItem>, Error> {
        if let Some(item) = self.peeked.take() {
            return Ok(Some(item));
        }
        if self.done {
            return Ok(None);
        }

        match self.rx.recv() {
            Ok(Ok(item)) => Ok(Some(item)),
            Ok(Err(e)) => {
                self.done = true;
                Err(e)
            }
            Err(_) => {
                self.done = true;
                Err(Error::WorkerCrashed)
            }
        }
    }

    fn finish(&mut self, rows_affected: Option<u64>) {
        self.rows_affected = rows_affected;
        self.set_exhausted = true;
        self.done = true;
    }
}

impl ResultHandle for OdbcResult {
    fn columns(&self) -> &[VerticaColumn] {
        &self.columns
    }

    fn fetch_row(&mut self) -> Result<Option<VerticaRow>, Error> {
        if self.set_exhausted {
            return Ok(None);
        }

        match self.next_item()? {
            Some(StreamItem::Row(row)) => Ok(Some(row)),
            Some(next_set @ StreamItem::Columns(_)) => {
                self.peeked = Some(next_set);
                self.set_exhausted = true;
                Ok(None)
            }
            Some(StreamItem::Done(rows_affected)) => {
                self.finish(rows_affected);
                Ok(None)
            }
            None => {
                self.set_exhausted = true;
                Ok(None)
            }
        }
    }

    fn row_count(&self) -> Option<u64> {
        self.rows_affected
    }

    fn next_result(&mut self) -> Result<bool, Error> {
        loop {
            match self.next_item()? {
                Some(StreamItem::Row(_)) => continue,
                Some(StreamItem::Columns(columns)) => {
                    self.columns = columns;
                    self.set_exhausted = false;
                    return Ok(true);
                }
                Some(StreamItem::Done(rows_affected)) => {
                    self.finish(rows_affected);
                    self.columns = Arc::from(Vec::new());
                    return Ok(false);
                }
                None => {
                    self.set_exhausted = true;
                    self.columns = Arc::from(Vec::new());
                    return Ok(false);
                }
            }
        }
    }
}
