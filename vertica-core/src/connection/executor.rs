use crate::connection::VerticaConnection;
use crate::driver::ResultHandle;
use crate::error::Error;
use crate::logger::QueryLogger;
use crate::row::VerticaRow;
use crate::value::VerticaValue;
use once_cell::sync::Lazy;
use regex::Regex;

// Vertica raises NOTICE 4185 for statements that succeed without touching
// anything, e.g. `DROP ... IF EXISTS` on a missing object.
static BENIGN_NOTICE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)NOTICE 4185").expect("valid notice regex"));

impl VerticaConnection {
    /// Executes `sql` and keeps its result for [`one`](Self::one),
    /// [`scalar`](Self::scalar) and [`all`](Self::all).
    ///
    /// The previous result is dropped first.
    pub fn exec(&mut self, sql: &str) -> Result<&mut Self, Error> {
        self.last_result = None;
        let handle = self.run(sql)?;
        self.last_result = Some(handle);
        self.last_sql.clear();
        self.last_sql.push_str(sql);
        Ok(self)
    }

    /// Executes a statement that produces no result set and returns the number
    /// of affected rows.
    ///
    /// A `NOTICE 4185` from the server is reported as success with zero rows.
    pub fn execute(&mut self, sql: &str) -> Result<u64, Error> {
        self.last_result = None;

        match self.run(sql) {
            Ok(handle) => Ok(handle.row_count().unwrap_or(0)),
            Err(e) if is_benign_notice(&e) => {
                log::debug!("ignoring notice for `{}`: {}", sql, e);
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }

    fn run(&mut self, sql: &str) -> Result<Box<dyn ResultHandle>, Error> {
        let mut logger = QueryLogger::new(sql, self.options.log_settings);

        let handle = self
            .driver_connection()?
            .execute(sql)
            .map_err(|e| Error::query(sql, e))?;

        logger.set_rows_affected(handle.row_count());
        Ok(handle)
    }

    /// The result of the last [`exec`](Self::exec), if it is still alive.
    pub fn last_result(&mut self) -> Option<&mut (dyn ResultHandle + 'static)> {
        self.last_result.as_deref_mut()
    }

    /// Fetches the next row of the last result.
    ///
    /// Driver failures while fetching carry the statement that produced the result.
    pub fn one(&mut self) -> Result<Option<VerticaRow>, Error> {
        match self.last_result.as_deref_mut() {
            Some(handle) => handle
                .fetch_row()
                .map_err(|e| Error::query(self.last_sql.as_str(), e)),
            None => Ok(None),
        }
    }

    /// Moves the last result to its next result set.
    pub(crate) fn next_result(&mut self) -> Result<bool, Error> {
        match self.last_result.as_deref_mut() {
            Some(handle) => handle
                .next_result()
                .map_err(|e| Error::query(self.last_sql.as_str(), e)),
            None => Ok(false),
        }
    }

    /// Fetches the next row of the last result and returns its first column.
    pub fn scalar(&mut self) -> Result<Option<VerticaValue>, Error> {
        Ok(self.one()?.and_then(VerticaRow::into_first))
    }

    /// Fetches every remaining row of the last result.
    pub fn all(&mut self) -> Result<Vec<VerticaRow>, Error> {
        let mut rows = Vec::new();
        while let Some(row) = self.one()? {
            rows.push(row);
        }
        Ok(rows)
    }
}

fn is_benign_notice(err: &Error) -> bool {
    match err.as_database_error() {
        Some(db) => BENIGN_NOTICE.is_match(db.message()) || BENIGN_NOTICE.is_match(&db.to_string()),
        None => false,
    }
}
