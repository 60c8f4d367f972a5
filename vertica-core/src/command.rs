use crate::connection::VerticaConnection;
use crate::data_reader::DataReader;
use crate::error::Error;
use crate::query_builder::{ColumnDefinition, Condition, Literal, QueryBuilder};
use crate::row::VerticaRow;
use crate::value::VerticaValue;
use indexmap::IndexMap;

/// A SQL statement bound to a connection.
///
/// Builders (`set_sql`, `delete`, `create_table`, `drop_table`) only store text;
/// the `query_*` family re-executes the stored text on every call.
/// `insert` and `update` build and execute in one step.
#[derive(Debug)]
pub struct Command<'c> {
    conn: &'c mut VerticaConnection,
    sql: String,
}

impl<'c> Command<'c> {
    pub fn new(conn: &'c mut VerticaConnection) -> Self {
        Self {
            conn,
            sql: String::new(),
        }
    }

    /// The stored statement text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn connection(&mut self) -> &mut VerticaConnection {
        self.conn
    }

    /// Stores `sql` with its table and column tokens rewritten.
    pub fn set_sql(&mut self, sql: &str) -> &mut Self {
        if sql != self.sql {
            self.sql = self.conn.quote_sql(sql).into_owned();
        }
        self
    }

    fn query_builder(&self) -> &QueryBuilder {
        self.conn.query_builder()
    }

    /// Inserts one row and returns the number of affected rows.
    pub fn insert(
        &mut self,
        table: &str,
        columns: &IndexMap<String, Literal>,
    ) -> Result<u64, Error> {
        self.sql = self.query_builder().insert(table, columns)?;
        self.conn.execute(&self.sql)
    }

    /// Updates the row whose `pk_name` equals `pk_value`.
    ///
    /// An entry for the primary key in `attributes` is ignored.
    pub fn update(
        &mut self,
        table: &str,
        pk_name: &str,
        pk_value: impl Into<Literal>,
        attributes: &IndexMap<String, Literal>,
    ) -> Result<u64, Error> {
        self.sql = self
            .query_builder()
            .update(table, pk_name, &pk_value.into(), attributes)?;
        self.conn.execute(&self.sql)
    }

    /// Builds a `DELETE` statement without executing it.
    ///
    /// With a table, rows matching `condition` are deleted. Without one, the
    /// stored `SELECT` is turned into a `DELETE` over the same `FROM` clause.
    pub fn delete(
        &mut self,
        table: Option<&str>,
        condition: impl Into<Condition>,
    ) -> Result<&mut Self, Error> {
        self.sql = match table.filter(|table| !table.is_empty()) {
            Some(table) => self.query_builder().delete(table, &condition.into())?,
            None => {
                let select = non_empty(&self.sql)?;
                self.query_builder().delete_from_select(select)?
            }
        };
        Ok(self)
    }

    pub fn create_table(
        &mut self,
        table: &str,
        columns: &[ColumnDefinition],
        options: Option<&str>,
    ) -> &mut Self {
        self.sql = self.query_builder().create_table(table, columns, options);
        self
    }

    pub fn drop_table(&mut self, table: &str) -> &mut Self {
        self.sql = self.query_builder().drop_table(table);
        self
    }

    /// Runs the stored statement for its side effects.
    pub fn execute(&mut self) -> Result<u64, Error> {
        log::trace!("SQL Query to execute: {}", self.sql);
        let sql = non_empty(&self.sql)?;
        self.conn.execute(sql)
    }

    fn exec(&mut self) -> Result<&mut VerticaConnection, Error> {
        log::trace!("SQL Query to execute: {}", self.sql);
        let sql = non_empty(&self.sql)?;
        self.conn.exec(sql)
    }

    pub fn query_one(&mut self) -> Result<Option<VerticaRow>, Error> {
        self.exec()?.one()
    }

    pub fn query_all(&mut self) -> Result<Vec<VerticaRow>, Error> {
        self.exec()?.all()
    }

    pub fn query_scalar(&mut self) -> Result<Option<VerticaValue>, Error> {
        self.exec()?.scalar()
    }

    pub fn search(&mut self) -> Result<Vec<VerticaRow>, Error> {
        self.query_all()
    }

    /// Executes the stored statement and returns a forward-only reader over its result.
    pub fn data_reader(&mut self) -> Result<DataReader<'_>, Error> {
        let conn = self.exec()?;
        Ok(DataReader::new(conn))
    }

    fn catalog_table(&self) -> Result<String, Error> {
        self.conn
            .table()
            .map(str::to_owned)
            .ok_or_else(|| Error::InvalidStatement("no table selected on the connection".into()))
    }

    fn columns_query(select: &str, table: &str) -> String {
        format!(
            "SELECT {} FROM COLUMNS WHERE table_name={}",
            select,
            QueryBuilder::preparation_value(&Literal::from(table))
        )
    }

    /// Column names of the selected table, cached per table.
    pub fn get_column(&mut self) -> Result<Vec<String>, Error> {
        let table = self.catalog_table()?;
        if let Some(columns) = self.conn.catalog().columns(&table) {
            return Ok(columns);
        }

        let columns = self
            .conn
            .exec(&Self::columns_query("column_name", &table))?
            .all()?
            .iter()
            .map(|row| row.try_get::<String, _>("column_name"))
            .collect::<Result<Vec<_>, _>>()?;

        self.conn.catalog().set_columns(&table, columns.clone());
        Ok(columns)
    }

    /// Every catalog row describing the selected table's columns. Not cached.
    pub fn get_column_data(&mut self) -> Result<Vec<VerticaRow>, Error> {
        let table = self.catalog_table()?;
        self.conn.exec(&Self::columns_query("*", &table))?.all()
    }

    /// Best guess at the primary key of the selected table, cached per table.
    ///
    /// An identity column wins; otherwise the first `int` column is used.
    pub fn get_pk(&mut self) -> Result<Option<String>, Error> {
        let table = self.catalog_table()?;
        if let Some(pk) = self.conn.catalog().primary_key(&table) {
            return Ok(pk);
        }

        let rows = self
            .conn
            .exec(&Self::columns_query(
                "is_identity, column_name, data_type",
                &table,
            ))?
            .all()?;

        let mut pk = None;
        for row in &rows {
            let name = row.try_get::<String, _>("column_name")?;

            if pk.is_none()
                && row
                    .try_get::<Option<String>, _>("data_type")?
                    .map_or(false, |data_type| data_type == "int")
            {
                pk = Some(name.clone());
            }

            if row.try_get_raw("is_identity")?.is_truthy() {
                pk = Some(name);
                break;
            }
        }

        self.conn.catalog().set_primary_key(&table, pk.clone());
        Ok(pk)
    }

    /// Every row of the `tables` system table.
    pub fn get_tables(&mut self) -> Result<Vec<VerticaRow>, Error> {
        self.conn.exec("SELECT * FROM tables")?.all()
    }
}

fn non_empty(sql: &str) -> Result<&str, Error> {
    if sql.trim().is_empty() {
        return Err(Error::EmptyStatement);
    }
    Ok(sql)
}
