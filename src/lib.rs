//! Vertica over ODBC.
//!
//! Statements are plain SQL text: values are embedded as quoted literals and
//! `{{table}}`, `{{%table}}` and `[[column]]` tokens are rewritten before
//! execution. Results are read forward-only.
//!
//! ```rust,no_run
//! use vertica_odbc::{Literal, VerticaConnectOptions};
//! use indexmap::IndexMap;
//!
//! let mut conn = VerticaConnectOptions::from_env()?.table_prefix("tbl_").connect()?;
//!
//! let mut columns = IndexMap::new();
//! columns.insert("name".to_owned(), Literal::from("O'Brien"));
//! conn.create_command(None)?.insert("tbl_users", &columns)?;
//!
//! let count = conn
//!     .create_command(Some("SELECT COUNT(*) FROM {{%users}}"))?
//!     .query_scalar()?;
//! # Ok::<(), vertica_odbc::Error>(())
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub use vertica_core::catalog::{self, CatalogCache};
pub use vertica_core::column::{self, ColumnIndex, VerticaColumn};
pub use vertica_core::driver;
pub use vertica_core::error::{self, Error, Result};
pub use vertica_core::query_builder::{self, ColumnDefinition, Condition, Literal, QueryBuilder};
pub use vertica_core::row::{self, VerticaRow};
pub use vertica_core::type_info::{self, DataKind, VerticaTypeInfo};
pub use vertica_core::value::{self, Decode, VerticaValue};
pub use vertica_core::{Command, DataReader, ReaderRows, VerticaConnectOptions, VerticaConnection};

#[cfg(feature = "odbc")]
#[cfg_attr(docsrs, doc(cfg(feature = "odbc")))]
pub use vertica_core::odbc;

#[cfg(feature = "testing")]
#[cfg_attr(docsrs, doc(cfg(feature = "testing")))]
pub use vertica_core::testing;
