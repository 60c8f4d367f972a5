use crate::column::VerticaColumn;
use crate::connection::VerticaConnection;
use crate::error::Error;
use crate::row::VerticaRow;
use crate::value::VerticaValue;

#[derive(Debug)]
enum Position {
    NotStarted,
    Row(VerticaRow),
    Exhausted,
}

/// A forward-only cursor over the result of a [`Command`](crate::Command).
///
/// The cursor API mirrors an iterator protocol: [`rewind`](Self::rewind) once,
/// then [`next`](Self::next) until [`valid`](Self::valid) turns false.
/// [`advance`](Self::advance) folds both into one call. The `read*` methods
/// fetch directly and leave the cursor position alone.
#[derive(Debug)]
pub struct DataReader<'c> {
    conn: &'c mut VerticaConnection,
    closed: bool,
    position: Position,
    index: i64,
}

impl<'c> DataReader<'c> {
    pub(crate) fn new(conn: &'c mut VerticaConnection) -> Self {
        Self {
            conn,
            closed: false,
            position: Position::NotStarted,
            index: -1,
        }
    }

    fn fetch(&mut self) -> Result<Option<VerticaRow>, Error> {
        if self.closed {
            return Err(Error::ReaderClosed);
        }
        self.conn.one()
    }

    fn fetch_position(&mut self) -> Result<Position, Error> {
        Ok(match self.fetch()? {
            Some(row) => Position::Row(row),
            None => Position::Exhausted,
        })
    }

    /// Fetches the first row. Only legal before anything was read through the cursor.
    pub fn rewind(&mut self) -> Result<(), Error> {
        if self.index >= 0 {
            return Err(Error::ForwardOnly);
        }
        self.position = self.fetch_position()?;
        self.index = 0;
        Ok(())
    }

    /// Moves to the next row.
    pub fn next(&mut self) -> Result<(), Error> {
        self.position = self.fetch_position()?;
        self.index += 1;
        Ok(())
    }

    /// Rewinds on the first call and moves forward afterwards; returns [`valid`](Self::valid).
    pub fn advance(&mut self) -> Result<bool, Error> {
        if self.index < 0 {
            self.rewind()?;
        } else {
            self.next()?;
        }
        Ok(self.valid())
    }

    /// Whether the cursor is not past the last row.
    pub fn valid(&self) -> bool {
        !matches!(self.position, Position::Exhausted)
    }

    /// Index of the current row, `-1` before the first fetch.
    pub fn key(&self) -> i64 {
        self.index
    }

    pub fn current(&self) -> Option<&VerticaRow> {
        match &self.position {
            Position::Row(row) => Some(row),
            _ => None,
        }
    }

    /// Fetches the next row.
    pub fn read(&mut self) -> Result<Option<VerticaRow>, Error> {
        self.fetch()
    }

    /// Fetches the next row and returns the value at the zero-based `column`.
    pub fn read_column(&mut self, column: usize) -> Result<Option<VerticaValue>, Error> {
        match self.fetch()? {
            Some(row) => Ok(Some(row.try_get_raw(column)?.clone())),
            None => Ok(None),
        }
    }

    /// Fetches every remaining row.
    pub fn read_all(&mut self) -> Result<Vec<VerticaRow>, Error> {
        let mut rows = Vec::new();
        while let Some(row) = self.fetch()? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Iterates over the remaining rows.
    pub fn rows(&mut self) -> ReaderRows<'_, 'c> {
        ReaderRows { reader: self }
    }

    /// Moves to the next result set of a multi-statement batch and resets the cursor.
    pub fn next_result(&mut self) -> Result<bool, Error> {
        if self.closed {
            return Err(Error::ReaderClosed);
        }

        let moved = self.conn.next_result()?;

        if moved {
            self.index = -1;
            self.position = Position::NotStarted;
        }
        Ok(moved)
    }

    /// Closes the reader together with the connection it reads from.
    pub fn close(&mut self) -> Result<(), Error> {
        self.closed = true;
        self.position = Position::Exhausted;
        self.conn.close()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Rows affected as reported by the driver; most drivers report nothing for a `SELECT`.
    pub fn row_count(&self) -> Option<u64> {
        self.conn
            .last_result
            .as_ref()
            .and_then(|handle| handle.row_count())
    }

    /// Number of columns in the current result set, known even when it has no rows.
    pub fn column_count(&self) -> usize {
        self.columns().len()
    }

    pub fn columns(&self) -> &[VerticaColumn] {
        match &self.conn.last_result {
            Some(handle) => handle.columns(),
            None => &[],
        }
    }
}

/// Iterator returned by [`DataReader::rows`].
#[derive(Debug)]
pub struct ReaderRows<'r, 'c> {
    reader: &'r mut DataReader<'c>,
}

impl Iterator for ReaderRows<'_, '_> {
    type Item = Result<VerticaRow, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.fetch().transpose()
    }
}
