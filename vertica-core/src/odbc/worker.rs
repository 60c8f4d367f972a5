use std::sync::Arc;
use std::thread;

use flume::TrySendError;
use odbc_api::handles::{AsStatementRef, Statement};
use odbc_api::{Cursor, CursorRow, ResultSetMetadata};

use crate::column::VerticaColumn;
use crate::error::Error;
use crate::odbc::type_info::type_info_from_data_type;
use crate::row::VerticaRow;
use crate::type_info::DataKind;
use crate::value::VerticaValue;

type RawConnection = odbc_api::Connection<'static>;

/// One message of an execution stream.
///
/// A stream is `Columns`, then that result set's `Row`s, repeated per result
/// set, and finally `Done`. A failure is sent as an `Err` and ends the stream.
#[derive(Debug)]
pub(crate) enum StreamItem {
    Columns(Arc<[VerticaColumn]>),
    Row(VerticaRow),
    Done(Option<u64>),
}

pub(crate) type StreamResult = Result<StreamItem, Error>;
type StreamSender = flume::Sender<StreamResult>;

/// Owns the ODBC connection on a dedicated thread.
///
/// Cursors borrow the connection they were opened on, so rows are produced on
/// the worker and sent back over a bounded channel. Dropping the receiving end
/// stops the stream at the next row.
#[derive(Debug)]
pub(crate) struct ConnectionWorker {
    command_tx: flume::Sender<Command>,
    join_handle: Option<thread::JoinHandle<()>>,
}

enum Command {
    Execute {
        sql: Box<str>,
        tx: StreamSender,
    },
    GetDbmsName {
        tx: flume::Sender<Result<String, Error>>,
    },
    Shutdown {
        tx: flume::Sender<()>,
    },
}

impl Drop for ConnectionWorker {
    fn drop(&mut self) {
        self.shutdown_sync();
    }
}

impl ConnectionWorker {
    pub(crate) fn establish(conn_str: String) -> Result<Self, Error> {
        let (command_tx, command_rx) = flume::bounded(64);
        let (conn_tx, conn_rx) = flume::bounded(1);
        let thread = thread::Builder::new()
            .name("vertica-odbc-conn".into())
            .spawn(move || worker_thread_main(conn_str, command_rx, conn_tx))?;

        conn_rx.recv().map_err(|_| Error::WorkerCrashed)??;
        Ok(ConnectionWorker {
            command_tx,
            join_handle: Some(thread),
        })
    }

    pub(crate) fn execute_stream(&mut self, sql: &str) -> Result<flume::Receiver<StreamResult>, Error> {
        let (tx, rx) = flume::bounded(64);
        self.command_tx
            .send(Command::Execute {
                sql: sql.into(),
                tx,
            })
            .map_err(|_| Error::WorkerCrashed)?;
        Ok(rx)
    }

    pub(crate) fn get_dbms_name(&mut self) -> Result<String, Error> {
        let (tx, rx) = flume::bounded(1);
        send_command_and_wait(&self.command_tx, Command::GetDbmsName { tx }, rx)?
    }

    pub(crate) fn shutdown(&mut self) -> Result<(), Error> {
        let (tx, rx) = flume::bounded(1);
        send_command_and_wait(&self.command_tx, Command::Shutdown { tx }, rx)?;
        self.join();
        Ok(())
    }

    pub(crate) fn shutdown_sync(&mut self) {
        if self.join_handle.is_none() {
            return;
        }

        let (mut tx, _rx) = flume::bounded(1);
        while let Err(TrySendError::Full(Command::Shutdown { tx: t })) =
            self.command_tx.try_send(Command::Shutdown { tx })
        {
            tx = t;
            log::warn!("odbc worker thread queue is full, retrying...");
            thread::sleep(std::time::Duration::from_millis(10));
        }
        self.join();
    }

    fn join(&mut self) {
        if let Some(join_handle) = self.join_handle.take() {
            if join_handle.join().is_err() {
                log::error!("odbc worker thread panicked while shutting down");
            }
        }
    }
}

fn send_command_and_wait<T>(
    command_tx: &flume::Sender<Command>,
    cmd: Command,
    rx: flume::Receiver<T>,
) -> Result<T, Error> {
    command_tx.send(cmd).map_err(|_| Error::WorkerCrashed)?;
    rx.recv().map_err(|_| Error::WorkerCrashed)
}

fn worker_thread_main(
    conn_str: String,
    command_rx: flume::Receiver<Command>,
    conn_tx: flume::Sender<Result<(), Error>>,
) {
    let conn = match establish_connection(&conn_str) {
        Ok(conn) => {
            let _ = conn_tx.send(Ok(()));
            conn
        }
        Err(e) => {
            let _ = conn_tx.send(Err(e));
            return;
        }
    };

    while let Ok(cmd) = command_rx.recv() {
        match cmd {
            Command::Execute { sql, tx } => {
                if let Err(e) = execute_sql(&conn, &sql, &tx) {
                    let _ = tx.send(Err(e));
                }
            }
            Command::GetDbmsName { tx } => {
                let _ = tx.send(conn.database_management_system_name().map_err(Error::from));
            }
            Command::Shutdown { tx } => {
                drop(conn);
                let _ = tx.send(());
                return;
            }
        }
    }
    // command channel disconnected, the connection is dropped with the thread
}

fn establish_connection(conn_str: &str) -> Result<RawConnection, Error> {
    let env = odbc_api::environment().map_err(|e| Error::Configuration(e.to_string().into()))?;

    env.connect_with_connection_string(conn_str, Default::default())
        .map_err(|e| Error::Configuration(e.to_string().into()))
}

fn execute_sql(conn: &RawConnection, sql: &str, tx: &StreamSender) -> Result<(), Error> {
    let mut preallocated = conn.preallocate()?;

    if let Some(cursor) = preallocated.execute(sql, ())? {
        if !stream_results(cursor, tx)? {
            return Ok(());
        }
    }

    let _ = tx.send(Ok(StreamItem::Done(extract_rows_affected(&mut preallocated))));
    Ok(())
}

fn extract_rows_affected<S: AsStatementRef>(stmt: &mut S) -> Option<u64> {
    let mut stmt_ref = stmt.as_stmt_ref();
    match stmt_ref.row_count().into_result(&stmt_ref) {
        // -1 when the driver does not know, e.g. after a SELECT
        Ok(count) => u64::try_from(count).ok(),
        Err(e) => {
            log::warn!("failed to get row count: {}", e);
            None
        }
    }
}

/// Streams every result set of `cursor`. Returns `false` once the receiver is gone.
fn stream_results<C>(mut cursor: C, tx: &StreamSender) -> Result<bool, Error>
where
    C: Cursor + ResultSetMetadata,
{
    loop {
        let columns = collect_columns(&mut cursor);
        if tx.send(Ok(StreamItem::Columns(Arc::clone(&columns)))).is_err() {
            return Ok(false);
        }

        while let Some(mut row) = cursor.next_row()? {
            let values = collect_row_values(&mut row, &columns)?;
            let row = VerticaRow::new(Arc::clone(&columns), values);

            if tx.send(Ok(StreamItem::Row(row))).is_err() {
                return Ok(false);
            }
        }

        match cursor.more_results()? {
            Some(next) => cursor = next,
            None => return Ok(true),
        }
    }
}

fn collect_columns<C>(cursor: &mut C) -> Arc<[VerticaColumn]>
where
    C: ResultSetMetadata,
{
    let count = cursor.num_result_cols().unwrap_or(0);

    (1..=count)
        .map(|i| create_column(cursor, i as u16))
        .collect::<Vec<_>>()
        .into()
}

fn create_column<C>(cursor: &mut C, index: u16) -> VerticaColumn
where
    C: ResultSetMetadata,
{
    let mut cd = odbc_api::ColumnDescription::default();
    let _ = cursor.describe_col(index, &mut cd);

    let name = cd
        .name_to_string()
        .unwrap_or_else(|_| format!("col{}", index - 1));

    VerticaColumn::new(
        name,
        type_info_from_data_type(cd.data_type),
        usize::from(index - 1),
    )
}

fn collect_row_values(
    row: &mut CursorRow<'_>,
    columns: &[VerticaColumn],
) -> Result<Vec<VerticaValue>, Error> {
    columns
        .iter()
        .enumerate()
        .map(|(i, column)| collect_column_value(row, (i + 1) as u16, column))
        .collect()
}

fn collect_column_value(
    row: &mut CursorRow<'_>,
    col_idx: u16,
    column: &VerticaColumn,
) -> Result<VerticaValue, Error> {
    let type_info = column.type_info().clone();

    let raw = if type_info.kind() == DataKind::Binary {
        try_get_binary(row, col_idx)?
    } else {
        // text first, some drivers refuse character conversion of exotic types
        match try_get_text(row, col_idx) {
            Ok(value) => value,
            Err(_) => try_get_binary(row, col_idx)?,
        }
    };

    Ok(match raw {
        Some(bytes) => VerticaValue::from_bytes(type_info, bytes),
        None => VerticaValue::null(type_info),
    })
}

fn try_get_text(row: &mut CursorRow<'_>, col_idx: u16) -> Result<Option<Vec<u8>>, odbc_api::Error> {
    let mut buf = Vec::new();
    match row.get_text(col_idx, &mut buf)? {
        true => Ok(Some(buf)),
        false => Ok(None),
    }
}

fn try_get_binary(
    row: &mut CursorRow<'_>,
    col_idx: u16,
) -> Result<Option<Vec<u8>>, odbc_api::Error> {
    let mut buf = Vec::new();
    match row.get_binary(col_idx, &mut buf)? {
        true => Ok(Some(buf)),
        false => Ok(None),
    }
}
