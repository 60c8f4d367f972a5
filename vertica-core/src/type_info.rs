use std::borrow::Cow;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Coarse classification of a column type, enough to pick a decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    Integer,
    Float,
    Numeric,
    Boolean,
    Text,
    Binary,
    Date,
    Time,
    Timestamp,
    Unknown,
}

/// Type information for a result column, as reported by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerticaTypeInfo {
    pub(crate) name: Cow<'static, str>,
    pub(crate) kind: DataKind,
}

impl VerticaTypeInfo {
    pub const UNKNOWN: Self = Self::new_static("UNKNOWN", DataKind::Unknown);
    pub const INTEGER: Self = Self::new_static("INTEGER", DataKind::Integer);
    pub const VARCHAR: Self = Self::new_static("VARCHAR", DataKind::Text);
    pub const BOOLEAN: Self = Self::new_static("BOOLEAN", DataKind::Boolean);

    const fn new_static(name: &'static str, kind: DataKind) -> Self {
        Self {
            name: Cow::Borrowed(name),
            kind,
        }
    }

    pub fn new(name: impl Into<String>, kind: DataKind) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            kind,
        }
    }

    /// Classifies a Vertica type name such as `int`, `varchar(80)` or `timestamptz`.
    pub fn from_type_name(name: &str) -> Self {
        let base = name
            .split('(')
            .next()
            .unwrap_or(name)
            .trim()
            .to_ascii_lowercase();

        let kind = match base.as_str() {
            "int" | "integer" | "bigint" | "smallint" | "tinyint" | "int8" => DataKind::Integer,
            "float" | "float8" | "real" | "double precision" => DataKind::Float,
            "numeric" | "decimal" | "number" | "money" => DataKind::Numeric,
            "boolean" | "bool" | "bit" => DataKind::Boolean,
            "char" | "varchar" | "long varchar" | "uuid" | "text" => DataKind::Text,
            "binary" | "varbinary" | "long varbinary" | "bytea" | "raw" => DataKind::Binary,
            "date" => DataKind::Date,
            "time" | "timetz" => DataKind::Time,
            "timestamp" | "timestamptz" | "datetime" | "smalldatetime" => DataKind::Timestamp,
            _ => DataKind::Unknown,
        };

        Self::new(name, kind)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> DataKind {
        self.kind
    }

    pub fn is_integer(&self) -> bool {
        self.kind == DataKind::Integer
    }

    /// Whether the column can be read as text without loss.
    pub fn accepts_character_data(&self) -> bool {
        !matches!(self.kind, DataKind::Binary)
    }
}

impl Display for VerticaTypeInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}
