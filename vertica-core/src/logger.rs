use crate::connection::LogSettings;
use std::time::Instant;

pub(crate) struct QueryLogger<'q> {
    sql: &'q str,
    rows_affected: Option<u64>,
    start: Instant,
    settings: LogSettings,
}

impl<'q> QueryLogger<'q> {
    pub(crate) fn new(sql: &'q str, settings: LogSettings) -> Self {
        Self {
            sql,
            rows_affected: None,
            start: Instant::now(),
            settings,
        }
    }

    pub(crate) fn set_rows_affected(&mut self, rows_affected: Option<u64>) {
        self.rows_affected = rows_affected;
    }

    pub(crate) fn finish(&self) {
        let elapsed = self.start.elapsed();

        let lvl = if elapsed >= self.settings.slow_statements_duration {
            self.settings.slow_statements_level
        } else {
            self.settings.statements_level
        };

        if let Some(lvl) = lvl
            .to_level()
            .filter(|lvl| log::log_enabled!(target: "vertica_odbc::query", *lvl))
        {
            let summary = parse_query_summary(self.sql);

            let sql = if summary != self.sql {
                format!("\n\n{}\n", self.sql)
            } else {
                String::new()
            };

            let rows = match self.rows_affected {
                Some(n) => n.to_string(),
                None => "-".to_owned(),
            };

            log::logger().log(
                &log::Record::builder()
                    .args(format_args!(
                        "{}; rows affected: {}, elapsed: {:.3?}{}",
                        summary, rows, elapsed, sql
                    ))
                    .level(lvl)
                    .module_path_static(Some("vertica_odbc::query"))
                    .target("vertica_odbc::query")
                    .build(),
            );
        }
    }
}

impl<'q> Drop for QueryLogger<'q> {
    fn drop(&mut self) {
        self.finish();
    }
}

/// The first four words of `sql`, whitespace collapsed.
fn parse_query_summary(sql: &str) -> String {
    sql.split_whitespace()
        .take(4)
        .collect::<Vec<&str>>()
        .join(" ")
}
