//! A store read from tab-separated files into memory.
//!
//! The store directory contains:
//!
//! - `ngrams.tsv`: `context<TAB>wordform<TAB>score`, one row per line;
//! - `cross_wordforms.tsv` (optional): `wordform<TAB>cross_wordform<TAB>score`;
//! - `meta.json` (optional): [`StoreMetadata`].
//!
//! Lines starting with `#` are comments.
use std::cmp::Reverse;
use std::fs::File;
use std::path::Path;

use hashbrown::HashMap;
use smol_str::SmolStr;

use super::{FrequencyStore, NgramQuery, Row, StoreError, StoreMetadata};
use crate::types::Score;

pub const NGRAMS_FILE: &str = "ngrams.tsv";
pub const CROSS_WORDFORMS_FILE: &str = "cross_wordforms.tsv";
pub const METADATA_FILE: &str = "meta.json";

#[derive(Debug, Clone)]
struct CrossForm {
    cross_wordform: SmolStr,
    score: Score,
}

#[derive(Debug, Default)]
pub struct TableStore {
    /// Rows per context, by score descending then wordform.
    ngrams: HashMap<SmolStr, Vec<Row>>,
    /// Alternate forms per canonical wordform.
    cross: HashMap<SmolStr, Vec<CrossForm>>,
    metadata: Option<StoreMetadata>,
}

fn read_rows(path: &Path) -> Result<Vec<(SmolStr, SmolStr, Score)>, StoreError> {
    let file = File::open(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut rdr = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(file);

    let mut rows = vec![];
    for (index, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| match e.into_kind() {
            csv::ErrorKind::Io(source) => StoreError::Io {
                path: path.to_path_buf(),
                source,
            },
            kind => StoreError::ContractViolation(format!(
                "{}: record {}: {:?}",
                path.display(),
                index + 1,
                kind
            )),
        })?;

        if record.len() != 3 {
            return Err(StoreError::ContractViolation(format!(
                "{}: record {}: expected 3 columns, found {}",
                path.display(),
                index + 1,
                record.len()
            )));
        }

        let score = record[2].trim().parse::<Score>().map_err(|_| {
            StoreError::ContractViolation(format!(
                "{}: record {}: score {:?} is not an integer",
                path.display(),
                index + 1,
                &record[2]
            ))
        })?;

        rows.push((SmolStr::new(&record[0]), SmolStr::new(&record[1]), score));
    }

    Ok(rows)
}

impl TableStore {
    /// Builds a store from `(context, wordform, score)` and
    /// `(wordform, cross_wordform, score)` rows.
    pub fn from_rows<N, C, S>(ngrams: N, cross_wordforms: C) -> TableStore
    where
        N: IntoIterator<Item = (S, S, Score)>,
        C: IntoIterator<Item = (S, S, Score)>,
        S: Into<SmolStr>,
    {
        let mut store = TableStore::default();

        for (context, wordform, score) in ngrams {
            store
                .ngrams
                .entry(context.into())
                .or_insert_with(Vec::new)
                .push(Row {
                    wordform: wordform.into(),
                    score,
                });
        }

        for rows in store.ngrams.values_mut() {
            rows.sort_by(|a, b| (Reverse(a.score), &a.wordform).cmp(&(Reverse(b.score), &b.wordform)));
        }

        for (wordform, cross_wordform, score) in cross_wordforms {
            store
                .cross
                .entry(wordform.into())
                .or_insert_with(Vec::new)
                .push(CrossForm {
                    cross_wordform: cross_wordform.into(),
                    score,
                });
        }

        store
    }

    /// Reads a store directory.
    pub fn open(dir: &Path) -> Result<TableStore, StoreError> {
        let ngrams = read_rows(&dir.join(NGRAMS_FILE))?;

        let cross_path = dir.join(CROSS_WORDFORMS_FILE);
        let cross = if cross_path.exists() {
            read_rows(&cross_path)?
        } else {
            vec![]
        };

        let metadata = File::open(dir.join(METADATA_FILE))
            .ok()
            .and_then(|x| serde_json::from_reader(x).ok());

        log::debug!(
            "Loaded {} n-grams and {} cross wordforms from {}",
            ngrams.len(),
            cross.len(),
            dir.display()
        );

        let mut store = TableStore::from_rows(ngrams, cross);
        store.metadata = metadata;
        Ok(store)
    }
}

/// Exact match first, then score descending, then wordform.
fn rank(query: &NgramQuery, mut hits: Vec<(bool, Row)>) -> Vec<Row> {
    hits.sort_by(|(a_exact, a), (b_exact, b)| {
        (Reverse(*a_exact), Reverse(a.score), &a.wordform).cmp(&(
            Reverse(*b_exact),
            Reverse(b.score),
            &b.wordform,
        ))
    });
    hits.into_iter().take(query.limit).map(|(_, row)| row).collect()
}

impl FrequencyStore for TableStore {
    fn ngrams(&self, query: &NgramQuery) -> Result<Vec<Row>, StoreError> {
        let rows = match self.ngrams.get(&query.context) {
            Some(rows) => rows,
            None => return Ok(vec![]),
        };

        let hits = rows
            .iter()
            .filter(|row| query.accepts(&row.wordform))
            .map(|row| (query.is_exact(&row.wordform), row.clone()))
            .collect();

        Ok(rank(query, hits))
    }

    fn cross_wordforms(&self, query: &NgramQuery) -> Result<Vec<Row>, StoreError> {
        let rows = match self.ngrams.get(&query.context) {
            Some(rows) => rows,
            None => return Ok(vec![]),
        };

        let hits = rows
            .iter()
            .flat_map(move |row| {
                self.cross
                    .get(&row.wordform)
                    .into_iter()
                    .flatten()
                    .filter(move |c| query.accepts(&c.cross_wordform))
                    .map(move |c| {
                        (
                            query.is_exact(&c.cross_wordform),
                            Row {
                                wordform: row.wordform.clone(),
                                score: c.score.saturating_add(row.score),
                            },
                        )
                    })
            })
            .collect();

        Ok(rank(query, hits))
    }

    fn metadata(&self) -> Option<&StoreMetadata> {
        self.metadata.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::glob;

    fn store() -> TableStore {
        TableStore::from_rows(
            vec![
                ("bore", "da", 90),
                ("bore", "dydd", 20),
                ("bore", "dda", 40),
                ("", "da", 500),
                ("", "ddoe", 300),
                ("", "dyma", 300),
            ],
            vec![("da", "dda", 15), ("dydd", "ddydd", 5)],
        )
    }

    fn words(rows: Vec<Row>) -> Vec<String> {
        rows.into_iter().map(|r| r.wordform.to_string()).collect()
    }

    #[test]
    fn ngrams_by_score() {
        let store = store();
        let rows = store.ngrams(&NgramQuery::new("", 10)).unwrap();
        assert_eq!(words(rows), vec!["da", "ddoe", "dyma"]);

        let rows = store.ngrams(&NgramQuery::new("", 1)).unwrap();
        assert_eq!(words(rows), vec!["da"]);

        assert!(store.ngrams(&NgramQuery::new("nos", 10)).unwrap().is_empty());
    }

    #[test]
    fn ngrams_exact_first() {
        let store = store();
        let mut query = NgramQuery::new("bore", 10);
        query.patterns = vec![glob::prefix("d")];
        query.exact = Some("dydd".into());
        assert_eq!(words(store.ngrams(&query).unwrap()), vec!["dydd", "da", "dda"]);

        query.patterns = vec![glob::prefix("dd")];
        assert_eq!(words(store.ngrams(&query).unwrap()), vec!["dda"]);
    }

    #[test]
    fn cross_scores_are_summed() {
        let store = store();
        let mut query = NgramQuery::new("bore", 10);
        query.patterns = vec![glob::prefix("dd")];
        let rows = store.cross_wordforms(&query).unwrap();
        assert_eq!(
            rows,
            vec![
                Row { wordform: "da".into(), score: 105 },
                Row { wordform: "dydd".into(), score: 25 },
            ]
        );
    }

    #[test]
    fn cross_scores_saturate() {
        let store = TableStore::from_rows(
            vec![("", "bore", 10)],
            vec![("bore", "fore", Score::MAX)],
        );
        let mut query = NgramQuery::new("", 5);
        query.patterns = vec![glob::prefix("fo")];
        assert_eq!(
            store.cross_wordforms(&query).unwrap(),
            vec![Row { wordform: "bore".into(), score: Score::MAX }]
        );
    }

    #[test]
    fn open_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(NGRAMS_FILE),
            "# context\twordform\tscore\nda iawn\tbore\t100\niawn\tbore\t50\n\tyn\t1000\n",
        )
        .unwrap();
        std::fs::write(dir.path().join(CROSS_WORDFORMS_FILE), "bore\tfore\t7\n").unwrap();
        std::fs::write(dir.path().join(METADATA_FILE), r#"{"locale": "cy"}"#).unwrap();

        let store = TableStore::open(dir.path()).unwrap();
        assert_eq!(store.metadata().map(|m| m.locale.as_str()), Some("cy"));
        assert_eq!(words(store.ngrams(&NgramQuery::new("da iawn", 5)).unwrap()), vec!["bore"]);
        assert_eq!(words(store.ngrams(&NgramQuery::new("", 5)).unwrap()), vec!["yn"]);

        let mut query = NgramQuery::new("iawn", 5);
        query.patterns = vec![glob::prefix("fo")];
        assert_eq!(
            store.cross_wordforms(&query).unwrap(),
            vec![Row { wordform: "bore".into(), score: 57 }]
        );
    }

    #[test]
    fn bad_score_is_contract_violation() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(NGRAMS_FILE), "da\tiawn\tlots\n").unwrap();
        assert!(matches!(
            TableStore::open(dir.path()),
            Err(StoreError::ContractViolation(_))
        ));
    }

    #[test]
    fn wrong_columns_is_contract_violation() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(NGRAMS_FILE), "da\tiawn\n").unwrap();
        assert!(matches!(
            TableStore::open(dir.path()),
            Err(StoreError::ContractViolation(_))
        ));
    }

    #[test]
    fn missing_ngrams_is_io() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(TableStore::open(dir.path()), Err(StoreError::Io { .. })));
    }
}
