use crate::column::{ColumnIndex, VerticaColumn};
use crate::error::Error;
use crate::value::{Decode, VerticaValue};
use std::sync::Arc;

/// A row of a result set: ordered `(column, value)` pairs with lookup by name.
///
/// Column metadata is shared between all rows of one result set.
#[derive(Debug, Clone, PartialEq)]
pub struct VerticaRow {
    pub(crate) columns: Arc<[VerticaColumn]>,
    pub(crate) values: Vec<VerticaValue>,
}

impl VerticaRow {
    pub fn new(columns: Arc<[VerticaColumn]>, values: Vec<VerticaValue>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    pub fn columns(&self) -> &[VerticaColumn] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn try_get_raw<I>(&self, index: I) -> Result<&VerticaValue, Error>
    where
        I: ColumnIndex,
    {
        let idx = index.index(self)?;
        Ok(&self.values[idx])
    }

    /// Decodes the value at `index`, which may be a position or a column name.
    pub fn try_get<T, I>(&self, index: I) -> Result<T, Error>
    where
        T: Decode,
        I: ColumnIndex,
    {
        let value = self.try_get_raw(&index)?;
        T::decode(value).map_err(|source| Error::ColumnDecode {
            index: format!("{:?}", index),
            source,
        })
    }

    /// Iterates `(column name, value)` pairs in result order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &VerticaValue)> + '_ {
        self.columns
            .iter()
            .map(|c| c.name.as_str())
            .zip(self.values.iter())
    }

    /// Consumes the row, returning the first value.
    pub(crate) fn into_first(self) -> Option<VerticaValue> {
        self.values.into_iter().next()
    }
}
