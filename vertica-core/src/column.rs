use crate::error::Error;
use crate::row::VerticaRow;
use crate::type_info::VerticaTypeInfo;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerticaColumn {
    pub(crate) name: String,
    pub(crate) type_info: VerticaTypeInfo,
    pub(crate) ordinal: usize,
}

impl VerticaColumn {
    pub fn new(name: impl Into<String>, type_info: VerticaTypeInfo, ordinal: usize) -> Self {
        Self {
            name: name.into(),
            type_info,
            ordinal,
        }
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_info(&self) -> &VerticaTypeInfo {
        &self.type_info
    }
}

/// A type that can be used to index into a [`VerticaRow`].
///
/// Implemented for `usize` (zero-based position) and `&str` (column name).
pub trait ColumnIndex: private_column_index::Sealed + std::fmt::Debug {
    fn index(&self, row: &VerticaRow) -> Result<usize, Error>;
}

impl ColumnIndex for usize {
    fn index(&self, row: &VerticaRow) -> Result<usize, Error> {
        let len = row.len();
        if *self >= len {
            return Err(Error::ColumnIndexOutOfBounds { index: *self, len });
        }
        Ok(*self)
    }
}

impl ColumnIndex for &'_ str {
    fn index(&self, row: &VerticaRow) -> Result<usize, Error> {
        let columns = row.columns();

        // exact match first
        if let Some(pos) = columns.iter().position(|col| col.name == *self) {
            return Ok(pos);
        }

        // Vertica folds unquoted identifiers, drivers disagree on the case they report
        columns
            .iter()
            .position(|col| col.name.eq_ignore_ascii_case(self))
            .ok_or_else(|| Error::ColumnNotFound((*self).into()))
    }
}

impl<I> ColumnIndex for &'_ I
where
    I: ColumnIndex + ?Sized,
{
    #[inline]
    fn index(&self, row: &VerticaRow) -> Result<usize, Error> {
        (**self).index(row)
    }
}

mod private_column_index {
    pub trait Sealed {}
    impl Sealed for usize {}
    impl Sealed for &'_ str {}
    impl<T> Sealed for &'_ T where T: Sealed + ?Sized {}
}
