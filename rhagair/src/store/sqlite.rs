//! A store backed by an SQLite database opened read-only.
use std::fs::File;
use std::path::Path;

use parking_lot::Mutex;
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags};
use smol_str::SmolStr;

use super::{FrequencyStore, NgramQuery, Row, StoreError, StoreMetadata};

#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
    metadata: Option<StoreMetadata>,
}

fn query_error(e: rusqlite::Error) -> StoreError {
    match e {
        rusqlite::Error::InvalidColumnType(..)
        | rusqlite::Error::FromSqlConversionFailure(..)
        | rusqlite::Error::IntegralValueOutOfRange(..)
        | rusqlite::Error::InvalidColumnIndex(..) => StoreError::ContractViolation(e.to_string()),
        e => StoreError::Unavailable(e.to_string()),
    }
}

/// `AND (column GLOB ? OR ...)`, or nothing when the query has no patterns.
fn glob_filter(column: &str, query: &NgramQuery, params: &mut Vec<Value>) -> String {
    if query.patterns.is_empty() {
        return String::new();
    }

    let clauses = query
        .patterns
        .iter()
        .map(|p| {
            params.push(Value::Text(p.clone()));
            format!("{} GLOB ?", column)
        })
        .collect::<Vec<_>>()
        .join(" OR ");

    format!(" AND ({})", clauses)
}

/// `ORDER BY` for exact-match-first, then score and wordform.
fn order_by(column: &str, score: &str, wordform: &str, query: &NgramQuery, params: &mut Vec<Value>) -> String {
    match query.exact.as_ref() {
        Some(exact) => {
            params.push(Value::Text(exact.to_string()));
            format!(" ORDER BY {} = ? DESC, {} DESC, {} ASC", column, score, wordform)
        }
        None => format!(" ORDER BY {} DESC, {} ASC", score, wordform),
    }
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<SqliteStore, StoreError> {
        if !path.is_file() {
            return Err(StoreError::not_found(path));
        }

        let io_error = |e: rusqlite::Error| StoreError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
        };

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(io_error)?;

        // Fail early on files that are not n-gram databases.
        conn.prepare("SELECT context, wordform, score FROM ngrams LIMIT 0")
            .map_err(io_error)?;

        let metadata = File::open(path.with_extension("json"))
            .ok()
            .and_then(|x| serde_json::from_reader(x).ok());

        Ok(SqliteStore {
            conn: Mutex::new(conn),
            metadata,
        })
    }

    fn rows(&self, sql: &str, params: Vec<Value>) -> Result<Vec<Row>, StoreError> {
        log::trace!("{} {:?}", sql, params);

        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(sql).map_err(query_error)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(params.iter()), |row| {
                Ok(Row {
                    wordform: SmolStr::from(row.get::<_, String>(0)?),
                    score: row.get(1)?,
                })
            })
            .map_err(query_error)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(query_error)
    }
}

impl FrequencyStore for SqliteStore {
    fn ngrams(&self, query: &NgramQuery) -> Result<Vec<Row>, StoreError> {
        let mut params = vec![Value::Text(query.context.to_string())];
        let mut sql = String::from("SELECT wordform, score FROM ngrams WHERE context = ?");
        sql.push_str(&glob_filter("wordform", query, &mut params));
        sql.push_str(&order_by("wordform", "score", "wordform", query, &mut params));
        sql.push_str(" LIMIT ?");
        params.push(Value::Integer(query.limit as i64));

        self.rows(&sql, params)
    }

    fn cross_wordforms(&self, query: &NgramQuery) -> Result<Vec<Row>, StoreError> {
        let mut params = vec![Value::Text(query.context.to_string())];
        let mut sql = String::from(
            "SELECT n.wordform, c.score + n.score AS total \
             FROM cross_wordforms AS c JOIN ngrams AS n ON n.wordform = c.wordform \
             WHERE n.context = ?",
        );
        sql.push_str(&glob_filter("c.cross_wordform", query, &mut params));
        sql.push_str(&order_by("c.cross_wordform", "total", "n.wordform", query, &mut params));
        sql.push_str(" LIMIT ?");
        params.push(Value::Integer(query.limit as i64));

        self.rows(&sql, params)
    }

    fn metadata(&self) -> Option<&StoreMetadata> {
        self.metadata.as_ref()
    }
}
