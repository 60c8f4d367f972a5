use crate::connection::VerticaConnection;
use crate::driver::Driver;
use crate::error::Error;
use crate::options::VerticaConnectOptions;
use std::sync::Arc;

impl VerticaConnectOptions {
    /// Builds a connection from these options and opens it.
    pub fn connect(&self) -> Result<VerticaConnection, Error> {
        let mut conn = VerticaConnection::new(self.clone());
        conn.open()?;
        Ok(conn)
    }

    /// Opens and immediately closes a connection, reporting why it failed, if it did.
    pub fn check(&self) -> Result<(), Error> {
        let driver = self.resolve_driver()?;
        let conn = driver
            .connect(self)
            .map_err(VerticaConnection::into_configuration_error)?;
        conn.close()
    }

    pub(crate) fn resolve_driver(&self) -> Result<Arc<dyn Driver>, Error> {
        if let Some(driver) = &self.driver {
            return Ok(Arc::clone(driver));
        }

        #[cfg(feature = "odbc")]
        {
            Ok(Arc::new(crate::odbc::OdbcDriver))
        }

        #[cfg(not(feature = "odbc"))]
        {
            Err(Error::Configuration(
                "no driver configured; enable the `odbc` feature or set one with `VerticaConnectOptions::driver`"
                    .into(),
            ))
        }
    }
}
