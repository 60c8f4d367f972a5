use vertica_core::testing::{MockDriver, MockResponse, MockResultSet};
use vertica_odbc::{Error, VerticaConnection};

const USERS: &str = "SELECT id, name FROM tbl_users ORDER BY id";

fn users() -> MockResultSet {
    MockResultSet::new(&[("id", "int"), ("name", "varchar(80)")])
        .row([Some("1"), Some("ann")])
        .row([Some("2"), Some("bob")])
        .row([Some("3"), None])
}

fn setup() -> (MockDriver, VerticaConnection) {
    let _ = env_logger::builder().is_test(true).try_init();

    let driver = MockDriver::new();
    driver.respond(USERS, MockResponse::result_set(users()));
    driver.respond(
        "SELECT 1 AS a; SELECT 'x' AS b, 'y' AS c",
        MockResponse::result_set(MockResultSet::new(&[("a", "int")]).row([Some("1")]))
            .and_result_set(MockResultSet::new(&[("b", "varchar"), ("c", "varchar")]).row([Some("x"), Some("y")])),
    );
    driver.respond(
        "SELECT id FROM tbl_users WHERE 1=0",
        MockResponse::result_set(MockResultSet::new(&[("id", "int"), ("name", "varchar(80)")])),
    );

    let conn = VerticaConnection::new(driver.options());
    (driver, conn)
}

#[test]
fn it_iterates_with_advance() -> anyhow::Result<()> {
    let (_driver, mut conn) = setup();
    let mut command = conn.create_command(Some(USERS))?;
    let mut reader = command.data_reader()?;

    let mut seen = Vec::new();
    while reader.advance()? {
        let row = reader.current().expect("a current row");
        seen.push((reader.key(), row.try_get::<i64, _>("id")?));
    }

    assert_eq!(seen, [(0, 1), (1, 2), (2, 3)]);
    assert!(!reader.valid());
    assert!(reader.current().is_none());

    Ok(())
}

#[test]
fn the_cursor_is_forward_only() -> anyhow::Result<()> {
    let (_driver, mut conn) = setup();
    let mut command = conn.create_command(Some(USERS))?;
    let mut reader = command.data_reader()?;

    assert_eq!(reader.key(), -1);
    assert!(reader.valid());

    reader.rewind()?;
    assert_eq!(reader.key(), 0);
    assert!(matches!(reader.rewind(), Err(Error::ForwardOnly)));

    reader.next()?;
    reader.next()?;
    assert_eq!(reader.key(), 2);
    assert!(reader.valid());
    assert_eq!(reader.current().map(|row| row.try_get::<Option<String>, _>("name")).transpose()?, Some(None));

    reader.next()?;
    assert_eq!(reader.key(), 3);
    assert!(!reader.valid());
    assert!(matches!(reader.rewind(), Err(Error::ForwardOnly)));

    Ok(())
}

#[test]
fn read_methods_fetch_directly() -> anyhow::Result<()> {
    let (_driver, mut conn) = setup();
    let mut command = conn.create_command(Some(USERS))?;
    let mut reader = command.data_reader()?;

    let first = reader.read()?.expect("first row");
    assert_eq!(first.try_get::<String, _>("name")?, "ann");

    let name = reader.read_column(1)?.expect("second row");
    assert_eq!(name.try_decode::<String>()?, "bob");

    let rest = reader.read_all()?;
    assert_eq!(rest.len(), 1);
    assert!(rest[0].try_get_raw("name")?.is_null());

    assert!(reader.read()?.is_none());
    assert!(reader.read_column(0)?.is_none());
    // reads leave the cursor alone
    assert_eq!(reader.key(), -1);

    Ok(())
}

#[test]
fn read_column_checks_bounds() -> anyhow::Result<()> {
    let (_driver, mut conn) = setup();
    let mut command = conn.create_command(Some(USERS))?;
    let mut reader = command.data_reader()?;

    assert!(matches!(
        reader.read_column(5),
        Err(Error::ColumnIndexOutOfBounds { index: 5, len: 2 })
    ));

    Ok(())
}

#[test]
fn rows_iterates_the_remainder() -> anyhow::Result<()> {
    let (_driver, mut conn) = setup();
    let mut command = conn.create_command(Some(USERS))?;
    let mut reader = command.data_reader()?;

    reader.read()?;
    let ids = reader
        .rows()
        .map(|row| row.and_then(|row| row.try_get::<i32, _>(0)))
        .collect::<Result<Vec<_>, _>>()?;
    assert_eq!(ids, [2, 3]);

    Ok(())
}

#[test]
fn it_walks_every_result_set() -> anyhow::Result<()> {
    let (_driver, mut conn) = setup();
    let mut command = conn.create_command(Some("SELECT 1 AS a; SELECT 'x' AS b, 'y' AS c"))?;
    let mut reader = command.data_reader()?;

    assert_eq!(reader.column_count(), 1);
    assert!(reader.advance()?);
    assert!(!reader.advance()?);
    assert_eq!(reader.key(), 1);

    assert!(reader.next_result()?);
    assert_eq!(reader.key(), -1);
    assert!(reader.valid());
    assert_eq!(reader.column_count(), 2);
    assert_eq!(reader.columns()[1].name(), "c");

    // a fresh set can be rewound again
    reader.rewind()?;
    assert_eq!(reader.current().map(|row| row.try_get::<String, _>("b")).transpose()?.as_deref(), Some("x"));

    assert!(!reader.next_result()?);
    assert_eq!(reader.column_count(), 0);

    Ok(())
}

#[test]
fn columns_are_known_without_rows() -> anyhow::Result<()> {
    let (_driver, mut conn) = setup();
    let mut command = conn.create_command(Some("SELECT id FROM tbl_users WHERE 1=0"))?;
    let mut reader = command.data_reader()?;

    assert_eq!(reader.column_count(), 2);
    assert_eq!(reader.row_count(), None);
    assert!(!reader.advance()?);
    assert_eq!(reader.key(), 0);

    Ok(())
}

#[test]
fn reader_fetch_errors_carry_the_statement() -> anyhow::Result<()> {
    let (driver, mut conn) = setup();
    let sql = "SELECT id FROM tbl_broken";
    driver.respond(
        sql,
        MockResponse::result_set(
            MockResultSet::new(&[("id", "int")])
                .row([Some("1")])
                .fail("ERROR 5861:  Error reading from the storage"),
        ),
    );

    let mut command = conn.create_command(Some(sql))?;
    let mut reader = command.data_reader()?;
    assert!(reader.advance()?);

    let err = reader.advance().unwrap_err();
    assert_eq!(err.sql(), Some(sql));

    Ok(())
}

#[test]
fn closing_the_reader_closes_the_connection() -> anyhow::Result<()> {
    let (driver, mut conn) = setup();

    {
        let mut command = conn.create_command(Some(USERS))?;
        let mut reader = command.data_reader()?;
        reader.advance()?;

        reader.close()?;
        assert!(reader.is_closed());
        assert!(!reader.valid());
        assert!(matches!(reader.read(), Err(Error::ReaderClosed)));
        assert!(matches!(reader.next(), Err(Error::ReaderClosed)));
        assert!(matches!(reader.read_all(), Err(Error::ReaderClosed)));
        assert!(matches!(reader.next_result(), Err(Error::ReaderClosed)));
        assert_eq!(reader.column_count(), 0);
    }
    assert_eq!(driver.closes(), 1);

    // the connection itself reopens on the next statement
    conn.ping()?;
    assert_eq!(driver.connects(), 2);

    Ok(())
}

#[test]
fn a_new_reader_starts_over() -> anyhow::Result<()> {
    let (driver, mut conn) = setup();
    let mut command = conn.create_command(Some(USERS))?;

    command.data_reader()?.read_all()?;
    let mut reader = command.data_reader()?;
    assert!(reader.advance()?);
    assert_eq!(reader.current().map(|row| row.try_get::<i64, _>("id")).transpose()?, Some(1));

    drop(reader);
    drop(command);
    assert_eq!(driver.count_queries(USERS), 2);

    Ok(())
}
