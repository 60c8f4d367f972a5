use indexmap::indexmap;
use vertica_core::testing::{MockDriver, MockResponse, MockResultSet};
use vertica_odbc::{ColumnDefinition, Error, Literal, VerticaConnectOptions, VerticaConnection};

fn setup() -> (MockDriver, VerticaConnection) {
    let _ = env_logger::builder().is_test(true).try_init();

    let driver = MockDriver::new();
    let conn = VerticaConnection::new(driver.options().table_prefix("tbl_"));
    (driver, conn)
}

fn columns_catalog() -> MockResultSet {
    MockResultSet::new(&[
        ("is_identity", "boolean"),
        ("column_name", "varchar(128)"),
        ("data_type", "varchar(128)"),
    ])
}

#[test]
fn it_turns_a_select_into_a_delete() -> anyhow::Result<()> {
    let (driver, mut conn) = setup();

    let mut command = conn.create_command(Some("SELECT * FROM {{%t}} WHERE x=1"))?;
    assert_eq!(command.sql(), "SELECT * FROM tbl_t WHERE x=1");

    command.delete(None, "")?;
    assert_eq!(command.sql(), "DELETE FROM tbl_t WHERE x=1");

    // building does not execute
    assert!(driver.queries().is_empty());

    command.execute()?;
    assert_eq!(driver.queries(), ["DELETE FROM tbl_t WHERE x=1"]);

    Ok(())
}

#[test]
fn delete_without_a_table_needs_a_stored_select() -> anyhow::Result<()> {
    let (_driver, mut conn) = setup();

    let mut command = conn.create_command(None)?;
    assert!(matches!(command.delete(None, ""), Err(Error::EmptyStatement)));

    command.set_sql("SELECT 1");
    assert!(matches!(
        command.delete(None, ""),
        Err(Error::InvalidStatement(_))
    ));

    command.delete(Some("users"), "age > 30")?;
    assert_eq!(command.sql(), "DELETE FROM users WHERE age > 30");

    command.delete(
        Some("users"),
        indexmap! { "name".to_owned() => Literal::from("x' OR '1'='1") },
    )?;
    assert_eq!(command.sql(), "DELETE FROM users WHERE name='x'' OR ''1''=''1'");

    Ok(())
}

#[test]
fn it_inserts_with_quoted_values() -> anyhow::Result<()> {
    let (driver, mut conn) = setup();
    let sql = "INSERT INTO users (name, age, bio) VALUES ('O''Brien', 42, NULL)";
    driver.respond(sql, MockResponse::affected(1));

    let affected = conn.create_command(None)?.insert(
        "users",
        &indexmap! {
            "name".to_owned() => Literal::from("O'Brien"),
            "age".to_owned() => Literal::from(42),
            "bio".to_owned() => Literal::Null,
        },
    )?;

    assert_eq!(affected, 1);
    assert_eq!(driver.queries(), [sql]);

    Ok(())
}

#[test]
fn it_updates_without_setting_the_primary_key() -> anyhow::Result<()> {
    let (driver, mut conn) = setup();

    let mut command = conn.create_command(None)?;
    command.update(
        "users",
        "id",
        7,
        &indexmap! {
            "id".to_owned() => Literal::from(7),
            "name".to_owned() => Literal::from("new"),
            "active".to_owned() => Literal::from(true),
        },
    )?;

    assert_eq!(
        command.sql(),
        "UPDATE users SET name='new', active=TRUE WHERE id=7"
    );
    assert_eq!(driver.queries(), [command.sql()]);

    Ok(())
}

#[test]
fn it_builds_and_runs_ddl() -> anyhow::Result<()> {
    let (driver, mut conn) = setup();

    let mut command = conn.create_command(None)?;
    command
        .create_table(
            "tbl_users",
            &[
                ColumnDefinition::named("id", "IDENTITY"),
                ColumnDefinition::named("name", "VARCHAR(80) NOT NULL"),
                ColumnDefinition::raw("PRIMARY KEY (id)"),
            ],
            None,
        )
        .execute()?;
    command.drop_table("tbl_users").execute()?;

    assert_eq!(
        driver.queries(),
        [
            "CREATE TABLE tbl_users (\n\tid IDENTITY,\n\tname VARCHAR(80) NOT NULL,\n\tPRIMARY KEY (id)\n)",
            "DROP TABLE tbl_users",
        ]
    );

    Ok(())
}

#[test]
fn queries_re_execute_the_stored_statement() -> anyhow::Result<()> {
    let (driver, mut conn) = setup();
    let sql = "SELECT id, name FROM tbl_users ORDER BY id";
    driver.respond(
        sql,
        MockResponse::result_set(
            MockResultSet::new(&[("id", "int"), ("name", "varchar(80)")])
                .row([Some("1"), Some("ann")])
                .row([Some("2"), None]),
        ),
    );

    let mut command = conn.create_command(Some("SELECT [[id]], [[name]] FROM {{%users}} ORDER BY id"))?;

    let first = command.query_one()?.expect("a row");
    assert_eq!(first.try_get::<i64, _>("id")?, 1);
    assert_eq!(first.try_get::<String, _>("NAME")?, "ann");

    let all = command.query_all()?;
    assert_eq!(all.len(), 2);
    assert_eq!(all[1].try_get::<Option<String>, _>(1)?, None);

    let scalar = command.query_scalar()?.expect("a value");
    assert_eq!(scalar.try_decode::<i32>()?, 1);

    assert_eq!(command.search()?.len(), 2);
    assert_eq!(driver.count_queries(sql), 4);

    Ok(())
}

#[test]
fn fetching_without_sql_is_a_usage_error() -> anyhow::Result<()> {
    let (driver, mut conn) = setup();

    let mut command = conn.create_command(None)?;
    assert!(matches!(command.query_all(), Err(Error::EmptyStatement)));
    assert!(matches!(command.query_one(), Err(Error::EmptyStatement)));
    assert!(matches!(command.execute(), Err(Error::EmptyStatement)));
    assert!(driver.queries().is_empty());

    Ok(())
}

#[test]
fn get_column_is_cached_per_table() -> anyhow::Result<()> {
    let (driver, mut conn) = setup();
    let sql = "SELECT column_name FROM COLUMNS WHERE table_name='tbl_users'";
    driver.respond(
        sql,
        MockResponse::result_set(
            MockResultSet::new(&[("column_name", "varchar(128)")])
                .row([Some("id")])
                .row([Some("name")]),
        ),
    );

    conn.set_table("tbl_users");
    let mut command = conn.create_command(None)?;

    assert_eq!(command.get_column()?, ["id", "name"]);
    assert_eq!(command.get_column()?, ["id", "name"]);
    assert_eq!(driver.count_queries(sql), 1);

    command.connection().catalog().invalidate("tbl_users");
    command.get_column()?;
    assert_eq!(driver.count_queries(sql), 2);

    Ok(())
}

#[test]
fn the_catalog_cache_is_shared_between_connections() -> anyhow::Result<()> {
    let driver = MockDriver::new();
    let sql = "SELECT column_name FROM COLUMNS WHERE table_name='t'";
    driver.respond(
        sql,
        MockResponse::result_set(MockResultSet::new(&[("column_name", "varchar")]).row([Some("a")])),
    );

    let options = driver.options();
    for _ in 0..2 {
        let mut conn = options.connect()?;
        conn.set_table("t");
        assert_eq!(conn.create_command(None)?.get_column()?, ["a"]);
    }
    assert_eq!(driver.count_queries(sql), 1);

    Ok(())
}

#[test]
fn get_column_data_is_not_cached() -> anyhow::Result<()> {
    let (driver, mut conn) = setup();
    let sql = "SELECT * FROM COLUMNS WHERE table_name='tbl_users'";

    conn.set_table("tbl_users");
    let mut command = conn.create_command(None)?;
    command.get_column_data()?;
    command.get_column_data()?;
    assert_eq!(driver.count_queries(sql), 2);

    Ok(())
}

#[test]
fn an_identity_column_wins_the_primary_key_guess() -> anyhow::Result<()> {
    let (driver, mut conn) = setup();
    driver.respond(
        "SELECT is_identity, column_name, data_type FROM COLUMNS WHERE table_name='a'",
        MockResponse::result_set(
            columns_catalog()
                .row([Some("f"), Some("a"), Some("int")])
                .row([Some("t"), Some("b"), Some("varchar")])
                .row([Some("t"), Some("c"), Some("int")]),
        ),
    );
    driver.respond(
        "SELECT is_identity, column_name, data_type FROM COLUMNS WHERE table_name='b'",
        MockResponse::result_set(
            columns_catalog()
                .row([Some("f"), Some("a"), Some("int")])
                .row([Some("f"), Some("c"), Some("int")]),
        ),
    );

    conn.set_table("a");
    assert_eq!(conn.create_command(None)?.get_pk()?.as_deref(), Some("b"));

    conn.set_table("b");
    assert_eq!(conn.create_command(None)?.get_pk()?.as_deref(), Some("a"));

    Ok(())
}

#[test]
fn a_table_without_a_key_is_cached_too() -> anyhow::Result<()> {
    let (driver, mut conn) = setup();
    let sql = "SELECT is_identity, column_name, data_type FROM COLUMNS WHERE table_name='logs'";
    driver.respond(
        sql,
        MockResponse::result_set(columns_catalog().row([Some("f"), Some("line"), Some("varchar(65000)")])),
    );

    conn.set_table("logs");
    let mut command = conn.create_command(None)?;
    assert_eq!(command.get_pk()?, None);
    assert_eq!(command.get_pk()?, None);
    assert_eq!(driver.count_queries(sql), 1);

    Ok(())
}

#[test]
fn catalog_helpers_need_a_table() -> anyhow::Result<()> {
    let (_driver, mut conn) = setup();

    let mut command = conn.create_command(None)?;
    assert!(matches!(command.get_pk(), Err(Error::InvalidStatement(_))));
    assert!(matches!(command.get_column(), Err(Error::InvalidStatement(_))));

    Ok(())
}

#[test]
fn it_lists_tables() -> anyhow::Result<()> {
    let (driver, mut conn) = setup();
    driver.respond(
        "SELECT * FROM tables",
        MockResponse::result_set(
            MockResultSet::new(&[("table_schema", "varchar"), ("table_name", "varchar")])
                .row([Some("public"), Some("tbl_users")]),
        ),
    );

    let tables = conn.create_command(None)?.get_tables()?;
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].try_get::<String, _>("table_name")?, "tbl_users");

    Ok(())
}

#[test]
fn set_sql_skips_identical_text() -> anyhow::Result<()> {
    let options = MockDriver::new().options().table_prefix("p_");
    let mut conn = VerticaConnection::new(options);

    let mut command = conn.create_command(None)?;
    command.set_sql("SELECT * FROM {{%t}}");
    command.set_sql("SELECT * FROM {{%t}}");
    assert_eq!(command.sql(), "SELECT * FROM p_t");

    // already quoted text is stored as is
    command.set_sql("SELECT * FROM p_t");
    assert_eq!(command.sql(), "SELECT * FROM p_t");

    Ok(())
}

#[test]
fn options_parse_into_a_working_connection() -> anyhow::Result<()> {
    let driver = MockDriver::new();
    let options: VerticaConnectOptions = "vertica://dbadmin@localhost:5433/docker?table_prefix=tbl_".parse()?;
    let mut conn = options.driver(std::sync::Arc::new(driver.clone())).connect()?;

    assert_eq!(conn.quote_sql("{{%users}}"), "tbl_users");
    conn.create_command(Some("SELECT * FROM {{%users}}"))?.query_all()?;
    assert_eq!(driver.queries(), ["SELECT * FROM tbl_users"]);

    Ok(())
}
