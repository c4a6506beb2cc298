use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tablescrape_core::{DbKind, DbParams, SaveTarget};
use tablescrape_engine::FetchSettings;

/// Directory used when a table is saved without an explicit destination.
pub const DEFAULT_OUTPUT_DIR: &str = "csv";

/// Fetch HTML tables from a URL, preview them and save one.
#[derive(Debug, Parser)]
#[command(name = "tablescrape", version)]
pub struct Cli {
    /// Page to read tables from (http, https or file URL).
    pub url: String,

    /// Table to preview and save, counting from 1.
    #[arg(short, long)]
    pub table: Option<NonZeroUsize>,

    /// Save the table here; the extension picks CSV, xlsx or JSON.
    #[arg(short, long, conflicts_with = "db")]
    pub output: Option<PathBuf>,

    /// Overwrite an existing output file.
    #[arg(short, long)]
    pub force: bool,

    /// Save to a database instead of a file (sqlite, postgresql, mysql).
    #[arg(long)]
    pub db: Option<DbKind>,

    #[arg(long, requires = "db", default_value = "localhost")]
    pub db_host: String,

    #[arg(long, requires = "db")]
    pub db_port: Option<u16>,

    #[arg(long, requires = "db", default_value = "")]
    pub db_user: String,

    /// Database password. Unlike the other `--db-*` flags it does not
    /// require `--db`: a value taken from the environment counts as given,
    /// and an exported variable must not break file saves.
    #[arg(long, env = "TABLESCRAPE_DB_PASSWORD", hide_env_values = true, default_value = "")]
    pub db_password: String,

    #[arg(long, requires = "db", default_value = "")]
    pub db_name: String,

    #[arg(long, requires = "db", default_value = "scraped_table")]
    pub db_table: String,

    /// Seconds allowed for establishing a connection.
    #[arg(long, default_value_t = 10)]
    pub connect_timeout: u64,

    /// Seconds allowed for the whole request.
    #[arg(long, env = "TABLESCRAPE_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout: u64,

    /// Largest page accepted, in bytes.
    #[arg(long, env = "TABLESCRAPE_MAX_BYTES")]
    pub max_bytes: Option<u64>,

    /// Also write the log to ./tablescrape.log.
    #[arg(long)]
    pub log_file: bool,

    /// More log output (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn fetch_settings(&self) -> FetchSettings {
        let defaults = FetchSettings::default();
        FetchSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout),
            request_timeout: Duration::from_secs(self.timeout),
            max_bytes: self.max_bytes.unwrap_or(defaults.max_bytes),
            ..defaults
        }
    }

    /// Zero-based index of the table to select.
    pub fn table_index(&self) -> usize {
        self.table.map_or(0, |n| n.get() - 1)
    }

    /// Destination requested on the command line, if any. Asking for a
    /// table without naming a destination means `csv/table_N.csv`.
    pub fn save_target(&self) -> Option<SaveTarget> {
        if let Some(kind) = self.db {
            return Some(SaveTarget::Database {
                kind,
                params: DbParams {
                    host: self.db_host.clone(),
                    port: self.db_port,
                    user: self.db_user.clone(),
                    password: self.db_password.clone(),
                    database: self.db_name.clone(),
                    table_name: self.db_table.clone(),
                },
            });
        }
        if let Some(path) = &self.output {
            return Some(SaveTarget::File(path.clone()));
        }
        self.table.map(|n| {
            SaveTarget::File(PathBuf::from(DEFAULT_OUTPUT_DIR).join(format!("table_{n}.csv")))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("tablescrape").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn url_only_previews_without_saving() {
        let cli = parse(&["https://example.com"]);
        assert_eq!(cli.table_index(), 0);
        assert_eq!(cli.save_target(), None);
    }

    #[test]
    fn table_without_destination_uses_default_csv_path() {
        let cli = parse(&["https://example.com", "--table", "3"]);
        assert_eq!(cli.table_index(), 2);
        assert_eq!(
            cli.save_target(),
            Some(SaveTarget::File(PathBuf::from("csv").join("table_3.csv")))
        );
    }

    #[test]
    fn output_path_is_used_verbatim() {
        let cli = parse(&["https://example.com", "-o", "out.xyz"]);
        assert_eq!(cli.save_target(), Some(SaveTarget::File("out.xyz".into())));
    }

    #[test]
    fn database_arguments_build_target() {
        let cli = parse(&[
            "https://example.com",
            "--db",
            "postgres",
            "--db-port",
            "5432",
            "--db-table",
            "scores",
        ]);
        match cli.save_target() {
            Some(SaveTarget::Database { kind, params }) => {
                assert_eq!(kind, DbKind::PostgreSql);
                assert_eq!(params.port, Some(5432));
                assert_eq!(params.host, "localhost");
                assert_eq!(params.table_name, "scores");
            }
            other => panic!("unexpected target: {other:?}"),
        }
    }

    #[test]
    fn invalid_arguments_are_rejected() {
        let bad = |args: &[&str]| {
            Cli::try_parse_from(std::iter::once("tablescrape").chain(args.iter().copied())).is_err()
        };
        assert!(bad(&["https://example.com", "--table", "0"]));
        assert!(bad(&["https://example.com", "--db", "oracle"]));
        assert!(bad(&["https://example.com", "--db-host", "h"]));
        assert!(bad(&["https://example.com", "--db", "mysql", "-o", "x.csv"]));
    }

    #[test]
    fn password_alone_does_not_select_database() {
        let cli = parse(&["https://example.com", "--db-password", "pw", "-o", "out.csv"]);
        assert_eq!(cli.save_target(), Some(SaveTarget::File("out.csv".into())));
    }

    #[test]
    fn timeouts_flow_into_fetch_settings() {
        let cli = parse(&["https://example.com", "--timeout", "3", "--max-bytes", "100"]);
        let settings = cli.fetch_settings();
        assert_eq!(settings.request_timeout, Duration::from_secs(3));
        assert_eq!(settings.max_bytes, 100);
        assert_eq!(settings.redirect_limit, FetchSettings::default().redirect_limit);
    }
}
