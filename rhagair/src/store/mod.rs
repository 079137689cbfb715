//! Read-only n-gram frequency stores.
//!
//! A store holds two tables:
//!
//! - `ngrams(context, wordform, score)`, where `context` is up to four
//!   preceding words joined by single spaces;
//! - `cross_wordforms(wordform, cross_wordform, score)`, mapping an
//!   alternate surface form (for example a mutated form) to a `wordform`
//!   found in `ngrams`.
//!
//! Stores are opened once and only read afterwards.
use std::path::Path;

use smol_str::SmolStr;

pub mod error;
pub mod glob;
pub mod meta;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod table;

pub use self::error::StoreError;
pub use self::meta::StoreMetadata;
#[cfg(feature = "sqlite")]
pub use self::sqlite::SqliteStore;
pub use self::table::TableStore;
use crate::types::Score;

/// One lookup against a store table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NgramQuery {
    /// Rows must have exactly this context.
    pub context: SmolStr,
    /// Glob patterns (see [`glob`]); a row is kept if any of them matches.
    /// An empty list keeps every row.
    pub patterns: Vec<String>,
    /// Rows whose matched form equals this are returned first.
    pub exact: Option<SmolStr>,
    /// Maximum number of rows returned.
    pub limit: usize,
}

impl NgramQuery {
    pub fn new(context: impl Into<SmolStr>, limit: usize) -> NgramQuery {
        NgramQuery {
            context: context.into(),
            patterns: vec![],
            exact: None,
            limit,
        }
    }

    #[inline]
    pub(crate) fn accepts(&self, form: &str) -> bool {
        self.patterns.is_empty() || self.patterns.iter().any(|p| glob::matches(p, form))
    }

    #[inline]
    pub(crate) fn is_exact(&self, form: &str) -> bool {
        self.exact.as_deref() == Some(form)
    }
}

/// A wordform with its score as returned by a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub wordform: SmolStr,
    pub score: Score,
}

/// The query contract every backing store fulfils.
///
/// Rows are ordered with the exact match first, then by score descending,
/// then by wordform ascending, and cut off at the query limit.
pub trait FrequencyStore: Send + Sync {
    /// Rows of `ngrams` for the query context whose wordform matches.
    fn ngrams(&self, query: &NgramQuery) -> Result<Vec<Row>, StoreError>;

    /// `ngrams` rows for the query context joined with `cross_wordforms` on
    /// wordform, keeping rows whose cross wordform matches. The score of a
    /// row is the mapping score plus the frequency score.
    fn cross_wordforms(&self, query: &NgramQuery) -> Result<Vec<Row>, StoreError>;

    fn metadata(&self) -> Option<&StoreMetadata> {
        None
    }
}

/// Opens the store at `path`.
///
/// A directory is read as a [`TableStore`]; a `.sqlite` or `.db` file is
/// opened with [`SqliteStore`] when the `sqlite` feature is enabled.
pub fn open(path: &Path) -> Result<Box<dyn FrequencyStore>, StoreError> {
    if path.is_dir() {
        return Ok(Box::new(TableStore::open(path)?));
    }

    if !path.exists() {
        return Err(StoreError::not_found(path));
    }

    match path.extension().and_then(|x| x.to_str()) {
        #[cfg(feature = "sqlite")]
        Some("sqlite") | Some("sqlite3") | Some("db") => Ok(Box::new(SqliteStore::open(path)?)),
        _ => Err(StoreError::Unsupported(path.to_path_buf())),
    }
}
