//! Core of vertica-odbc.
//! Not intended to be used directly.
#![warn(future_incompatible, rust_2018_idioms)]
#![allow(clippy::type_complexity, clippy::should_implement_trait)]
#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod catalog;
pub mod column;
pub mod driver;
pub mod error;
pub mod query_builder;
pub mod row;
pub mod type_info;
pub mod value;

mod command;
mod connection;
mod data_reader;
mod logger;
mod options;

#[cfg(feature = "odbc")]
#[cfg_attr(docsrs, doc(cfg(feature = "odbc")))]
pub mod odbc;

#[cfg(any(test, feature = "testing"))]
#[cfg_attr(docsrs, doc(cfg(feature = "testing")))]
pub mod testing;

pub use catalog::CatalogCache;
pub use column::{ColumnIndex, VerticaColumn};
pub use command::Command;
pub use connection::VerticaConnection;
pub use data_reader::{DataReader, ReaderRows};
pub use error::{Error, Result};
pub use options::VerticaConnectOptions;
pub use query_builder::{ColumnDefinition, Condition, Literal, QueryBuilder};
pub use row::VerticaRow;
pub use type_info::{DataKind, VerticaTypeInfo};
pub use value::{Decode, VerticaValue};
