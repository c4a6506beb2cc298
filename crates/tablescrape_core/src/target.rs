use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Database backends offered by the save dialog. None of them is wired up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DbKind {
    Sqlite,
    PostgreSql,
    MySql,
}

impl DbKind {
    pub const ALL: [DbKind; 3] = [DbKind::Sqlite, DbKind::PostgreSql, DbKind::MySql];
}

impl fmt::Display for DbKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DbKind::Sqlite => "SQLite",
            DbKind::PostgreSql => "PostgreSQL",
            DbKind::MySql => "MySQL",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown database type {0:?} (expected sqlite, postgresql or mysql)")]
pub struct UnknownDbKind(pub String);

impl FromStr for DbKind {
    type Err = UnknownDbKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(DbKind::Sqlite),
            "postgresql" | "postgres" => Ok(DbKind::PostgreSql),
            "mysql" => Ok(DbKind::MySql),
            _ => Err(UnknownDbKind(s.to_string())),
        }
    }
}

/// Connection parameters as typed by the user.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct DbParams {
    pub host: String,
    pub port: Option<u16>,
    pub user: String,
    pub password: String,
    pub database: String,
    pub table_name: String,
}

impl fmt::Debug for DbParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("table_name", &self.table_name)
            .finish()
    }
}

/// Where a selected table should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveTarget {
    File(PathBuf),
    Database { kind: DbKind, params: DbParams },
}

impl SaveTarget {
    /// Short human-readable destination for status messages.
    pub fn describe(&self) -> String {
        match self {
            SaveTarget::File(path) => path.display().to_string(),
            SaveTarget::Database { kind, params } => {
                format!("{kind} table {:?}", params.table_name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_kind_parses_case_insensitively() {
        assert_eq!("SQLite".parse::<DbKind>(), Ok(DbKind::Sqlite));
        assert_eq!("postgres".parse::<DbKind>(), Ok(DbKind::PostgreSql));
        assert_eq!(" MySQL ".parse::<DbKind>(), Ok(DbKind::MySql));
        assert!("oracle".parse::<DbKind>().is_err());
    }

    #[test]
    fn debug_hides_password() {
        let params = DbParams {
            password: "hunter2".into(),
            ..DbParams::default()
        };
        let rendered = format!("{params:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn describe_names_destination() {
        let target = SaveTarget::Database {
            kind: DbKind::MySql,
            params: DbParams {
                table_name: "scores".into(),
                ..DbParams::default()
            },
        };
        assert_eq!(target.describe(), "MySQL table \"scores\"");
    }
}
