use crate::catalog::CatalogCache;
use crate::command::Command;
use crate::driver::{DriverConnection, ResultHandle};
use crate::error::Error;
use crate::options::VerticaConnectOptions;
use crate::query_builder::QueryBuilder;
use log::LevelFilter;
use std::borrow::Cow;
use std::fmt::{self, Debug, Formatter};
use std::str::FromStr;
use std::time::Duration;

mod executor;

#[derive(Clone, Copy, Debug)]
pub(crate) struct LogSettings {
    pub(crate) statements_level: LevelFilter,
    pub(crate) slow_statements_level: LevelFilter,
    pub(crate) slow_statements_duration: Duration,
}

impl Default for LogSettings {
    fn default() -> Self {
        LogSettings {
            statements_level: LevelFilter::Info,
            slow_statements_level: LevelFilter::Warn,
            slow_statements_duration: Duration::from_secs(1),
        }
    }
}

impl LogSettings {
    pub(crate) fn log_statements(&mut self, level: LevelFilter) {
        self.statements_level = level;
    }
    pub(crate) fn log_slow_statements(&mut self, level: LevelFilter, duration: Duration) {
        self.slow_statements_level = level;
        self.slow_statements_duration = duration;
    }
}

type AfterOpenHook = Box<dyn FnMut(&mut VerticaConnection) -> Result<(), Error> + Send>;

/// A connection to a Vertica database.
///
/// The connection is opened lazily by the first operation that needs it and
/// keeps at most one live result: every execution drops the previous one.
pub struct VerticaConnection {
    pub(crate) options: VerticaConnectOptions,
    pub(crate) conn: Option<Box<dyn DriverConnection>>,
    pub(crate) last_result: Option<Box<dyn ResultHandle>>,
    // statement that produced `last_result`
    pub(crate) last_sql: String,
    query_builder: QueryBuilder,
    table: Option<String>,
    database_name: Option<String>,
    after_open: Vec<AfterOpenHook>,
}

impl VerticaConnection {
    /// Creates an unopened connection.
    pub fn new(options: VerticaConnectOptions) -> Self {
        let query_builder = QueryBuilder::new(options.table_prefix.clone());

        Self {
            options,
            conn: None,
            last_result: None,
            last_sql: String::new(),
            query_builder,
            table: None,
            database_name: None,
            after_open: Vec::new(),
        }
    }

    /// Parses `url` and opens a connection.
    pub fn connect(url: &str) -> Result<Self, Error> {
        VerticaConnectOptions::from_str(url)?.connect()
    }

    pub fn options(&self) -> &VerticaConnectOptions {
        &self.options
    }

    /// Establishes the connection. Does nothing if it is already open.
    ///
    /// After-open hooks run on the fresh connection; if one fails the
    /// connection is closed again and the error returned.
    pub fn open(&mut self) -> Result<(), Error> {
        if self.conn.is_some() {
            return Ok(());
        }

        log::debug!("opening connection to vertica");

        let driver = self.options.resolve_driver()?;
        let conn = driver
            .connect(&self.options)
            .map_err(Self::into_configuration_error)?;
        self.conn = Some(conn);

        let mut hooks = std::mem::take(&mut self.after_open);
        let result = hooks.iter_mut().try_for_each(|hook| hook(self));
        hooks.append(&mut self.after_open);
        self.after_open = hooks;

        if let Err(e) = result {
            log::warn!("after-open hook failed: {}", e);
            if let Err(close_err) = self.close() {
                log::warn!("failed to close vertica connection: {}", close_err);
            }
            return Err(e);
        }

        Ok(())
    }

    pub(crate) fn into_configuration_error(err: Error) -> Error {
        match err {
            Error::Database(e) => Error::Configuration(e.into_error()),
            other => other,
        }
    }

    /// Releases the current result and the driver connection.
    pub fn close(&mut self) -> Result<(), Error> {
        self.last_result = None;

        match self.conn.take() {
            Some(conn) => {
                log::debug!("closing connection to vertica");
                conn.close()
            }
            None => Ok(()),
        }
    }

    /// Whether the connection is established, opening it if needed.
    pub fn is_active(&mut self) -> Result<bool, Error> {
        self.open()?;
        Ok(self.conn.is_some())
    }

    pub fn ping(&mut self) -> Result<(), Error> {
        self.execute("SELECT 1").map(|_| ())
    }

    /// Registers a hook that runs every time the connection is opened.
    pub fn on_open<F>(&mut self, hook: F) -> &mut Self
    where
        F: FnMut(&mut VerticaConnection) -> Result<(), Error> + Send + 'static,
    {
        self.after_open.push(Box::new(hook));
        self
    }

    pub(crate) fn driver_connection(
        &mut self,
    ) -> Result<&mut (dyn DriverConnection + 'static), Error> {
        self.open()?;
        match self.conn.as_deref_mut() {
            Some(conn) => Ok(conn),
            None => Err(Error::Configuration("connection is not open".into())),
        }
    }

    /// Name of the database management system reported by the driver.
    ///
    /// Drops the last result first: the driver cannot answer while a result
    /// is still streaming.
    pub fn dbms_name(&mut self) -> Result<String, Error> {
        self.last_result = None;
        self.driver_connection()?.dbms_name()
    }

    /// Name of the current database, looked up once per connection.
    pub fn database_name(&mut self) -> Result<Option<String>, Error> {
        if self.database_name.is_none() {
            self.database_name = self
                .exec("SELECT database_name FROM databases")?
                .scalar()?
                .and_then(|value| value.as_str().map(Cow::into_owned));
        }

        Ok(self.database_name.clone())
    }

    pub fn driver_name(&self) -> &'static str {
        "vertica"
    }

    /// Selects the table the catalog helpers of [`Command`] work on.
    pub fn set_table(&mut self, table: impl Into<String>) -> &mut Self {
        self.table = Some(table.into());
        self
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn table_prefix(&self) -> &str {
        self.query_builder.table_prefix()
    }

    pub fn catalog(&self) -> &CatalogCache {
        &self.options.catalog_cache
    }

    pub fn query_builder(&self) -> &QueryBuilder {
        &self.query_builder
    }

    /// Rewrites `{{table}}`, `{{%table}}` and `[[column]]` tokens in `sql`.
    pub fn quote_sql<'a>(&self, sql: &'a str) -> Cow<'a, str> {
        self.query_builder.quote_sql(sql)
    }

    /// Opens the connection and returns a command bound to it.
    pub fn create_command(&mut self, sql: Option<&str>) -> Result<Command<'_>, Error> {
        self.open()?;
        let mut command = Command::new(self);
        if let Some(sql) = sql {
            command.set_sql(sql);
        }
        Ok(command)
    }
}

impl Debug for VerticaConnection {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerticaConnection")
            .field("options", &self.options)
            .field("open", &self.conn.is_some())
            .field("last_result", &self.last_result)
            .field("table", &self.table)
            .field("after_open", &self.after_open.len())
            .finish()
    }
}

impl Drop for VerticaConnection {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("failed to close vertica connection: {}", e);
        }
    }
}
