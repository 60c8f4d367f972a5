//! SQL text construction.
//!
//! Every value that ends up inside a statement goes through
//! [`QueryBuilder::preparation_value`]; statements are plain text because the
//! driver is never asked to bind parameters.

use crate::error::Error;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::fmt::{self, Display, Formatter, Write};

/// A typed value to be rendered as a SQL literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

macro_rules! impl_literal_from {
    ($variant:ident: $($ty:ty),*) => {
        $(
            impl From<$ty> for Literal {
                fn from(value: $ty) -> Self {
                    Literal::$variant(value.into())
                }
            }
        )*
    };
}

impl_literal_from!(Int: i8, i16, i32, i64, u8, u16, u32);
impl_literal_from!(Float: f32, f64);
impl_literal_from!(Bool: bool);
impl_literal_from!(Text: String, &str, &String, Cow<'_, str>);

impl<T: Into<Literal>> From<Option<T>> for Literal {
    fn from(value: Option<T>) -> Self {
        value.map_or(Literal::Null, Into::into)
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&QueryBuilder::preparation_value(self))
    }
}

/// One entry of a `CREATE TABLE` column list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnDefinition {
    /// Rendered as `<name> <type>`.
    Named { name: String, definition: String },
    /// A column or constraint clause inserted verbatim.
    Raw(String),
}

impl ColumnDefinition {
    pub fn named(name: impl Into<String>, definition: impl Into<String>) -> Self {
        ColumnDefinition::Named {
            name: name.into(),
            definition: definition.into(),
        }
    }

    pub fn raw(clause: impl Into<String>) -> Self {
        ColumnDefinition::Raw(clause.into())
    }
}

impl<N: Into<String>, D: Into<String>> From<(N, D)> for ColumnDefinition {
    fn from((name, definition): (N, D)) -> Self {
        ColumnDefinition::named(name, definition)
    }
}

impl From<&str> for ColumnDefinition {
    fn from(clause: &str) -> Self {
        ColumnDefinition::raw(clause)
    }
}

/// The `WHERE` part of a `DELETE` built from scratch.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `col = value` pairs joined with `AND`.
    Columns(IndexMap<String, Literal>),
    /// A condition inserted verbatim.
    Raw(String),
}

impl From<&str> for Condition {
    fn from(raw: &str) -> Self {
        Condition::Raw(raw.to_owned())
    }
}

impl From<String> for Condition {
    fn from(raw: String) -> Self {
        Condition::Raw(raw)
    }
}

impl From<IndexMap<String, Literal>> for Condition {
    fn from(columns: IndexMap<String, Literal>) -> Self {
        Condition::Columns(columns)
    }
}

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    // word characters are ASCII only
    Regex::new(r"\{\{(%?[0-9A-Za-z_\-\. ]+%?)\}\}|\[\[([0-9A-Za-z_\-\. ]+)\]\]")
        .expect("valid token regex")
});

/// Builds statement text and quotes embedded values and identifier tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryBuilder {
    table_prefix: String,
}

impl QueryBuilder {
    pub fn new(table_prefix: impl Into<String>) -> Self {
        Self {
            table_prefix: table_prefix.into(),
        }
    }

    pub fn table_prefix(&self) -> &str {
        &self.table_prefix
    }

    /// Renders a value as a literal that is safe to concatenate into statement text.
    ///
    /// Strings are single-quoted with embedded quotes doubled; numbers are
    /// written bare; `NULL`, `TRUE` and `FALSE` are keywords.
    pub fn preparation_value(value: &Literal) -> Cow<'static, str> {
        match value {
            Literal::Null => Cow::Borrowed("NULL"),
            Literal::Bool(true) => Cow::Borrowed("TRUE"),
            Literal::Bool(false) => Cow::Borrowed("FALSE"),
            Literal::Int(i) => Cow::Owned(i.to_string()),
            Literal::Float(f) if f.is_nan() => Cow::Borrowed("'NaN'::FLOAT"),
            Literal::Float(f) if f.is_infinite() && *f > 0.0 => Cow::Borrowed("'Infinity'::FLOAT"),
            Literal::Float(f) if f.is_infinite() => Cow::Borrowed("'-Infinity'::FLOAT"),
            Literal::Float(f) => Cow::Owned(f.to_string()),
            Literal::Text(s) => {
                let mut quoted = String::with_capacity(s.len() + 2);
                quoted.push('\'');
                for c in s.chars() {
                    if c == '\'' {
                        quoted.push('\'');
                    }
                    quoted.push(c);
                }
                quoted.push('\'');
                Cow::Owned(quoted)
            }
        }
    }

    /// Vertica identifiers are passed through unchanged, qualified names included.
    pub fn quote_table_name<'a>(&self, name: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(name)
    }

    pub fn quote_column_name<'a>(&self, name: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(name)
    }

    /// Rewrites `{{table}}`, `{{%table}}` and `[[column]]` tokens.
    ///
    /// A `%` at either end of a table token is replaced with the table prefix.
    /// Text outside of the two token forms is left untouched.
    pub fn quote_sql<'a>(&self, sql: &'a str) -> Cow<'a, str> {
        TOKEN_RE.replace_all(sql, |caps: &Captures<'_>| {
            if let Some(column) = caps.get(2) {
                self.quote_column_name(column.as_str()).into_owned()
            } else {
                self.quote_table_name(&caps[1])
                    .replace('%', &self.table_prefix)
            }
        })
    }

    /// `INSERT INTO table (c1, c2) VALUES (v1, v2)`
    pub fn insert(&self, table: &str, columns: &IndexMap<String, Literal>) -> Result<String, Error> {
        if columns.is_empty() {
            return Err(Error::InvalidStatement(format!(
                "INSERT INTO {} needs at least one column",
                table
            )));
        }

        let names = columns.keys().map(String::as_str).collect::<Vec<_>>();
        let values = columns
            .values()
            .map(Self::preparation_value)
            .collect::<Vec<_>>();

        Ok(format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            names.join(", "),
            values.join(", ")
        ))
    }

    /// `UPDATE table SET k=v, ... WHERE pk=value`; the primary key column is never assigned.
    pub fn update(
        &self,
        table: &str,
        pk_name: &str,
        pk_value: &Literal,
        attributes: &IndexMap<String, Literal>,
    ) -> Result<String, Error> {
        let set = attributes
            .iter()
            .filter(|(key, _)| key.as_str() != pk_name)
            .map(|(key, value)| format!("{}={}", key, Self::preparation_value(value)))
            .collect::<Vec<_>>();

        if set.is_empty() {
            return Err(Error::InvalidStatement(format!(
                "UPDATE {} has no columns to set besides {}",
                table, pk_name
            )));
        }

        Ok(format!(
            "UPDATE {} SET {} WHERE {}={}",
            table,
            set.join(", "),
            pk_name,
            Self::preparation_value(pk_value)
        ))
    }

    /// `DELETE FROM table WHERE ...`
    pub fn delete(&self, table: &str, condition: &Condition) -> Result<String, Error> {
        let condition = match condition {
            Condition::Columns(columns) => columns
                .iter()
                .map(|(key, value)| format!("{}={}", key, Self::preparation_value(value)))
                .collect::<Vec<_>>()
                .join(" AND "),
            Condition::Raw(raw) => raw.trim().to_owned(),
        };

        if condition.is_empty() {
            return Err(Error::InvalidStatement(format!(
                "DELETE FROM {} needs a condition",
                table
            )));
        }

        Ok(format!("DELETE FROM {} WHERE {}", table, condition))
    }

    /// Turns a `SELECT ... FROM ...` into `DELETE FROM ...`, keeping everything
    /// from the first `FROM` keyword onward.
    pub fn delete_from_select(&self, select: &str) -> Result<String, Error> {
        let from = find_keyword(select, "FROM").ok_or_else(|| {
            Error::InvalidStatement(format!("no FROM clause to delete from in: {}", select))
        })?;

        Ok(format!("DELETE {}", &select[from..]))
    }

    /// `CREATE TABLE table (\n\t...\n) options`
    pub fn create_table(
        &self,
        table: &str,
        columns: &[ColumnDefinition],
        options: Option<&str>,
    ) -> String {
        let mut sql = String::new();
        let _ = write!(sql, "CREATE TABLE {} (\n", table);

        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                sql.push_str(",\n");
            }
            match column {
                ColumnDefinition::Named { name, definition } => {
                    let _ = write!(sql, "\t{} {}", name, definition);
                }
                ColumnDefinition::Raw(clause) => {
                    let _ = write!(sql, "\t{}", clause);
                }
            }
        }
        sql.push_str("\n)");

        if let Some(options) = options {
            sql.push(' ');
            sql.push_str(options);
        }

        sql
    }

    pub fn drop_table(&self, table: &str) -> String {
        format!("DROP TABLE {}", table)
    }
}

/// Byte offset of the first whole-word, case-insensitive occurrence of `keyword`.
fn find_keyword(haystack: &str, keyword: &str) -> Option<usize> {
    let bytes = haystack.as_bytes();
    let is_word = |b: u8| b.is_ascii_alphanumeric() || b == b'_';

    (0..=bytes.len().checked_sub(keyword.len())?).find(|&i| {
        bytes[i..i + keyword.len()].eq_ignore_ascii_case(keyword.as_bytes())
            && (i == 0 || !is_word(bytes[i - 1]))
            && bytes.get(i + keyword.len()).map_or(true, |&b| !is_word(b))
    })
}
