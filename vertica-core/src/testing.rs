//! A scripted in-memory [`Driver`] for exercising SQL building and result
//! handling without a database.
//!
//! ```rust,ignore
//! use vertica_odbc_core::testing::{MockDriver, MockResponse, MockResultSet};
//!
//! let driver = MockDriver::new();
//! driver.respond(
//!     "SELECT 1",
//!     MockResponse::result_set(MockResultSet::new(&[("?column?", "int")]).row([Some("1")])),
//! );
//!
//! let mut conn = driver.options().connect()?;
//! let value = conn.exec("SELECT 1")?.scalar()?.unwrap();
//! assert_eq!(value.try_decode::<i64>()?, 1);
//! assert_eq!(driver.queries(), ["SELECT 1"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::column::VerticaColumn;
use crate::driver::{Driver, DriverConnection, ResultHandle};
use crate::error::{DriverError, Error};
use crate::options::VerticaConnectOptions;
use crate::row::VerticaRow;
use crate::type_info::VerticaTypeInfo;
use crate::value::VerticaValue;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One result set: its columns and the rows, as text cells.
#[derive(Debug, Clone)]
pub struct MockResultSet {
    columns: Arc<[VerticaColumn]>,
    rows: Vec<Vec<Option<String>>>,
    error: Option<DriverError>,
}

impl MockResultSet {
    /// Columns are given as `(name, type name)` pairs, e.g. `("id", "int")`.
    pub fn new(columns: &[(&str, &str)]) -> Self {
        let columns = columns
            .iter()
            .enumerate()
            .map(|(ordinal, (name, type_name))| {
                VerticaColumn::new(*name, VerticaTypeInfo::from_type_name(type_name), ordinal)
            })
            .collect::<Vec<_>>();

        Self {
            columns: columns.into(),
            rows: Vec::new(),
            error: None,
        }
    }

    pub fn row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        self.rows
            .push(cells.into_iter().map(|cell| cell.map(Into::into)).collect());
        self
    }

    /// Fails the fetch that follows the last row with `message`.
    pub fn fail(mut self, message: impl Into<String>) -> Self {
        self.error = Some(DriverError::new(message));
        self
    }

    fn into_rows(self) -> (Arc<[VerticaColumn]>, VecDeque<VerticaRow>, Option<DriverError>) {
        let columns = self.columns;
        let rows = self
            .rows
            .into_iter()
            .map(|cells| {
                let values = columns
                    .iter()
                    .zip(cells.into_iter().chain(std::iter::repeat(None)))
                    .map(|(column, cell)| match cell {
                        Some(text) => VerticaValue::from_text(column.type_info.clone(), text),
                        None => VerticaValue::null(column.type_info.clone()),
                    })
                    .collect();
                VerticaRow::new(Arc::clone(&columns), values)
            })
            .collect();
        (columns, rows, self.error)
    }
}

/// What the mock answers to one statement.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Results {
        sets: Vec<MockResultSet>,
        rows_affected: Option<u64>,
    },
    Error(DriverError),
}

impl MockResponse {
    /// A statement with no result set that touched `rows` rows.
    pub fn affected(rows: u64) -> Self {
        MockResponse::Results {
            sets: Vec::new(),
            rows_affected: Some(rows),
        }
    }

    pub fn result_set(set: MockResultSet) -> Self {
        MockResponse::Results {
            sets: vec![set],
            rows_affected: None,
        }
    }

    /// Appends another result set, as a multi-statement batch would produce.
    pub fn and_result_set(mut self, set: MockResultSet) -> Self {
        if let MockResponse::Results { sets, .. } = &mut self {
            sets.push(set);
        }
        self
    }

    pub fn error(message: impl Into<String>) -> Self {
        MockResponse::Error(DriverError::new(message))
    }
}

#[derive(Debug)]
struct MockState {
    responses: HashMap<String, MockResponse>,
    queries: Vec<String>,
    connect_error: Option<String>,
    close_error: Option<String>,
    dbms_name: String,
    connects: usize,
    closes: usize,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            responses: HashMap::new(),
            queries: Vec::new(),
            connect_error: None,
            close_error: None,
            dbms_name: "Vertica Database".to_owned(),
            connects: 0,
            closes: 0,
        }
    }
}

/// A driver that answers statements from a script and records what it was asked.
///
/// Statements without a scripted response succeed with no rows. Clones share
/// the script and the log.
#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    state: Arc<Mutex<MockState>>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Options that connect through this driver.
    pub fn options(&self) -> VerticaConnectOptions {
        VerticaConnectOptions::new()
            .dsn("mock")
            .driver(Arc::new(self.clone()))
    }

    /// Answers every execution of exactly `sql` with `response`.
    pub fn respond(&self, sql: impl Into<String>, response: MockResponse) -> &Self {
        self.lock().responses.insert(sql.into(), response);
        self
    }

    /// Makes every following connection attempt fail with `message`.
    pub fn fail_connect(&self, message: impl Into<String>) -> &Self {
        self.lock().connect_error = Some(message.into());
        self
    }

    pub fn allow_connect(&self) -> &Self {
        self.lock().connect_error = None;
        self
    }

    /// Makes closing a connection report `message` after releasing it.
    pub fn fail_close(&self, message: impl Into<String>) -> &Self {
        self.lock().close_error = Some(message.into());
        self
    }

    pub fn set_dbms_name(&self, name: impl Into<String>) -> &Self {
        self.lock().dbms_name = name.into();
        self
    }

    /// Every statement executed so far, in order.
    pub fn queries(&self) -> Vec<String> {
        self.lock().queries.clone()
    }

    /// How many times exactly `sql` was executed.
    pub fn count_queries(&self, sql: &str) -> usize {
        self.lock().queries.iter().filter(|q| *q == sql).count()
    }

    pub fn connects(&self) -> usize {
        self.lock().connects
    }

    pub fn closes(&self) -> usize {
        self.lock().closes
    }
}

impl Driver for MockDriver {
    fn connect(&self, _options: &VerticaConnectOptions) -> Result<Box<dyn DriverConnection>, Error> {
        let mut state = self.lock();
        if let Some(message) = &state.connect_error {
            return Err(DriverError::new(message.clone()).into());
        }
        state.connects += 1;

        Ok(Box::new(MockConnection {
            driver: self.clone(),
        }))
    }
}

#[derive(Debug)]
struct MockConnection {
    driver: MockDriver,
}

impl DriverConnection for MockConnection {
    fn execute(&mut self, sql: &str) -> Result<Box<dyn ResultHandle>, Error> {
        let response = {
            let mut state = self.driver.lock();
            state.queries.push(sql.to_owned());
            state.responses.get(sql).cloned()
        };

        match response {
            Some(MockResponse::Error(e)) => Err(e.into()),
            Some(MockResponse::Results {
                sets,
                rows_affected,
            }) => Ok(Box::new(MockResultHandle::new(sets, rows_affected))),
            None => Ok(Box::new(MockResultHandle::new(Vec::new(), Some(0)))),
        }
    }

    fn dbms_name(&mut self) -> Result<String, Error> {
        Ok(self.driver.lock().dbms_name.clone())
    }

    fn close(self: Box<Self>) -> Result<(), Error> {
        let mut state = self.driver.lock();
        state.closes += 1;
        match &state.close_error {
            Some(message) => Err(DriverError::new(message.clone()).into()),
            None => Ok(()),
        }
    }
}

#[derive(Debug)]
struct MockResultHandle {
    pending: VecDeque<MockResultSet>,
    columns: Arc<[VerticaColumn]>,
    rows: VecDeque<VerticaRow>,
    error: Option<DriverError>,
    rows_affected: Option<u64>,
}

impl MockResultHandle {
    fn new(sets: Vec<MockResultSet>, rows_affected: Option<u64>) -> Self {
        let mut handle = Self {
            pending: sets.into(),
            columns: Arc::from(Vec::new()),
            rows: VecDeque::new(),
            error: None,
            rows_affected,
        };
        handle.load_next();
        handle
    }

    fn load_next(&mut self) -> bool {
        match self.pending.pop_front() {
            Some(set) => {
                let (columns, rows, error) = set.into_rows();
                self.columns = columns;
                self.rows = rows;
                self.error = error;
                true
            }
            None => {
                self.columns = Arc::from(Vec::new());
                self.rows.clear();
                self.error = None;
                false
            }
        }
    }
}

impl ResultHandle for MockResultHandle {
    fn columns(&self) -> &[VerticaColumn] {
        &self.columns
    }

    fn fetch_row(&mut self) -> Result<Option<VerticaRow>, Error> {
        match self.rows.pop_front() {
            Some(row) => Ok(Some(row)),
            None => match self.error.take() {
                Some(e) => Err(e.into()),
                None => Ok(None),
            },
        }
    }

    fn row_count(&self) -> Option<u64> {
        self.rows_affected
    }

    fn next_result(&mut self) -> Result<bool, Error> {
        Ok(self.load_next())
    }
}
