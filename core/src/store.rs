//! Redb-backed corpus store.
//!
//! Records are stored bincode-encoded under the key `"<length:02>|<word>"`, so
//! a length constraint becomes a key-range scan and exact-length queries never
//! touch other lengths.
//!
//! A second table indexes every record under
//! `"<length:02>|<type_without_tone, tokens reversed>|<word>"`. A token-suffix
//! match on the tone-free field is then a prefix range, one per length, and
//! only the records in that range are decoded. The remaining predicates (tone
//! field, excluded word) are evaluated on the decoded records.
//!
//! Writes go through `insert_batch` (one write transaction per batch). Reads
//! open a fresh read transaction per query, so concurrent searches never block
//! each other.

use std::path::{Path, PathBuf};

use redb::{Database, ReadOnlyTable, ReadableTable, ReadableTableMetadata, TableDefinition};

use crate::corpus::{rank_and_cap, CorpusQuery, CorpusRepository, LengthConstraint, SignatureMatch};
use crate::error::RepositoryError;
use crate::signature::{split_tokens, WordSignature, SEPARATOR};

const WORDS: TableDefinition<&str, &[u8]> = TableDefinition::new("words");
const RHYMES: TableDefinition<&str, &str> = TableDefinition::new("rhymes");

type WordsTable = ReadOnlyTable<&'static str, &'static [u8]>;
type RhymesTable = ReadOnlyTable<&'static str, &'static str>;

/// Key of a record: zero-padded length, a separator, then the word.
fn record_key(length: usize, word: &str) -> String {
    format!("{:02}|{}", length, word)
}

fn length_prefix(length: usize) -> String {
    format!("{:02}|", length)
}

/// Tokens of a joined field, last first: `"11-2-13"` -> `"13-2-11"`.
fn reversed_tokens(joined: &str) -> String {
    let mut tokens = split_tokens(joined);
    tokens.reverse();
    let separator = SEPARATOR.to_string();
    tokens.join(separator.as_str())
}

/// Rhyme index key of a record.
fn rhyme_key(sig: &WordSignature) -> String {
    format!(
        "{:02}|{}|{}",
        sig.length,
        reversed_tokens(&sig.type_without_tone),
        sig.word
    )
}

/// Length of the longest stored word, 0 for an empty table.
fn longest_stored(words: &WordsTable) -> Result<usize, RepositoryError> {
    let Some((key, _)) = words.last()? else {
        return Ok(0);
    };
    let length = key
        .value()
        .split('|')
        .next()
        .and_then(|n| n.parse().ok())
        .unwrap_or(0);
    Ok(length)
}

pub struct RedbCorpus {
    db: Database,
    path: PathBuf,
}

impl RedbCorpus {
    /// Create or open a corpus database at `path`. A database written before
    /// the rhyme index existed gets its index built here.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| RepositoryError::Unavailable(e.to_string()))?;
            }
        }
        let db = Database::create(path.as_ref())?;

        // Make sure both tables exist so read transactions can open them.
        let txn = db.begin_write()?;
        {
            let words = txn.open_table(WORDS)?;
            let mut rhymes = txn.open_table(RHYMES)?;
            if rhymes.is_empty()? && !words.is_empty()? {
                tracing::info!(records = words.len()?, "building rhyme index");
                for item in words.iter()? {
                    let (_key, value) = item?;
                    let sig: WordSignature = bincode::deserialize(value.value())?;
                    rhymes.insert(rhyme_key(&sig).as_str(), sig.word.as_str())?;
                }
            }
        }
        txn.commit()?;

        Ok(Self {
            db,
            path: path.as_ref().to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert or replace a single record.
    pub fn insert(&self, sig: &WordSignature) -> Result<(), RepositoryError> {
        self.insert_batch(std::slice::from_ref(sig)).map(|_| ())
    }

    /// Insert or replace records in one write transaction.
    pub fn insert_batch(&self, records: &[WordSignature]) -> Result<usize, RepositoryError> {
        let txn = self.db.begin_write()?;
        {
            let mut words = txn.open_table(WORDS)?;
            let mut rhymes = txn.open_table(RHYMES)?;
            for sig in records {
                let bytes = bincode::serialize(sig)?;
                let key = record_key(sig.length, &sig.word);
                let previous = words
                    .insert(key.as_str(), bytes.as_slice())?
                    .map(|old| bincode::deserialize::<WordSignature>(old.value()))
                    .transpose()?;
                if let Some(old) = previous {
                    rhymes.remove(rhyme_key(&old).as_str())?;
                }
                rhymes.insert(rhyme_key(sig).as_str(), sig.word.as_str())?;
            }
        }
        txn.commit()?;
        Ok(records.len())
    }

    /// Number of stored records.
    pub fn len(&self) -> Result<u64, RepositoryError> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(WORDS)?;
        Ok(table.len()?)
    }

    pub fn is_empty(&self) -> Result<bool, RepositoryError> {
        Ok(self.len()? == 0)
    }

    /// Decode every record in the length range.
    fn scan(
        words: &WordsTable,
        length: LengthConstraint,
        mut visit: impl FnMut(WordSignature),
    ) -> Result<(), RepositoryError> {
        let start = length_prefix(length.min());
        let end = length.max().map(|max| length_prefix(max + 1));
        let range = match &end {
            Some(end) => words.range(start.as_str()..end.as_str())?,
            None => words.range(start.as_str()..)?,
        };
        for item in range {
            let (_key, value) = item?;
            visit(bincode::deserialize(value.value())?);
        }
        Ok(())
    }

    /// Decode the records whose tone-free field ends with the tokens of
    /// `suffix`, walking one index range per length.
    fn scan_suffix(
        words: &WordsTable,
        rhymes: &RhymesTable,
        suffix: &str,
        length: LengthConstraint,
        mut visit: impl FnMut(WordSignature),
    ) -> Result<(), RepositoryError> {
        let reversed = reversed_tokens(suffix);
        let last = match length.max() {
            Some(max) => max,
            None => longest_stored(words)?,
        };
        for len in length.min()..=last {
            let prefix = format!("{:02}|{}", len, reversed);
            for item in rhymes.range(prefix.as_str()..)? {
                let (key, word) = item?;
                let Some(rest) = key.value().strip_prefix(prefix.as_str()) else {
                    break;
                };
                // "13-1" is a key prefix of "13-11" but not a token prefix.
                if !(rest.starts_with('|') || rest.starts_with(SEPARATOR)) {
                    continue;
                }
                if let Some(value) = words.get(record_key(len, word.value()).as_str())? {
                    visit(bincode::deserialize(value.value())?);
                }
            }
        }
        Ok(())
    }
}

impl CorpusRepository for RedbCorpus {
    fn find(&self, query: &CorpusQuery) -> Result<Vec<WordSignature>, RepositoryError> {
        let txn = self.db.begin_read()?;
        let words = txn.open_table(WORDS)?;
        let mut matched = Vec::new();
        let keep = |sig: WordSignature| {
            if query.matches(&sig) {
                matched.push(sig);
            }
        };
        match &query.tone_free {
            SignatureMatch::TokenSuffix(suffix) => {
                let rhymes = txn.open_table(RHYMES)?;
                Self::scan_suffix(&words, &rhymes, suffix, query.length, keep)?
            }
            SignatureMatch::Any | SignatureMatch::EndsWith(_) => {
                Self::scan(&words, query.length, keep)?
            }
        }
        tracing::trace!(path = %self.path.display(), matched = matched.len(), "redb lookup");
        Ok(rank_and_cap(matched, query.limit))
    }

    fn get(&self, word: &str) -> Result<Option<WordSignature>, RepositoryError> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(WORDS)?;
        let key = record_key(word.chars().count(), word);
        match table.get(key.as_str())? {
            Some(value) => Ok(Some(bincode::deserialize(value.value())?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(word: &str, rate: u64, with_tone: &str, without_tone: &str) -> WordSignature {
        WordSignature {
            word: word.into(),
            length: word.chars().count(),
            rate,
            initial: String::new(),
            final_with_tone: String::new(),
            final_without_tone: String::new(),
            type_with_tone: with_tone.into(),
            type_without_tone: without_tone.into(),
        }
    }

    #[test]
    fn keys_sort_by_length_first() {
        assert!(record_key(2, "龘龘") < record_key(3, "一二三"));
        assert!(record_key(9, "x") < record_key(10, "x"));
        assert!(length_prefix(4) < record_key(4, "一"));
    }

    #[test]
    fn rhyme_keys_reverse_tokens() {
        assert_eq!(reversed_tokens("11-2-13"), "13-2-11");
        assert_eq!(reversed_tokens("13"), "13");
        assert_eq!(
            rhyme_key(&rec("演唱", 1, "11.3-13.4", "11-13")),
            "02|13-11|演唱"
        );
    }

    #[test]
    fn suffix_lookup_respects_token_boundaries() {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbCorpus::open(dir.path().join("corpus.redb")).unwrap();
        store
            .insert_batch(&[
                rec("发唱", 30, "1.1-13.4", "1-13"),
                rec("演唱", 20, "11.3-13.4", "11-13"),
                rec("大发唱", 10, "1.4-1.1-13.4", "1-1-13"),
                rec("一二三四五", 5, "5.1-5.4-11.1-7.4-1.1", "5-5-11-7-1"),
            ])
            .unwrap();

        let q = CorpusQuery::bucket("", "1-13", "", LengthConstraint::Exactly(2), 10);
        let words: Vec<_> = store.find(&q).unwrap().into_iter().map(|s| s.word).collect();
        assert_eq!(words, vec!["发唱"]);

        let q = CorpusQuery::bucket("", "1-13", "", LengthConstraint::AtLeast(2), 10);
        let words: Vec<_> = store.find(&q).unwrap().into_iter().map(|s| s.word).collect();
        assert_eq!(words, vec!["发唱", "大发唱"]);

        // Lengths past the longest stored word are empty, not an error.
        let q = CorpusQuery::bucket("", "13", "", LengthConstraint::AtLeast(7), 10);
        assert!(store.find(&q).unwrap().is_empty());
    }

    #[test]
    fn reinsert_with_new_signature_moves_index_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbCorpus::open(dir.path().join("c.redb")).unwrap();
        store.insert(&rec("演唱", 1, "11.3-13.4", "11-13")).unwrap();
        store.insert(&rec("演唱", 2, "2.3-13.4", "2-13")).unwrap();

        let q = CorpusQuery::bucket("", "13", "", LengthConstraint::Exactly(2), 10);
        let found = store.find(&q).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].type_without_tone, "2-13");

        let q = CorpusQuery::bucket("", "11-13", "", LengthConstraint::Exactly(2), 10);
        assert!(store.find(&q).unwrap().is_empty());
    }

    #[test]
    fn index_is_built_for_unindexed_databases() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.redb");
        {
            let store = RedbCorpus::open(&path).unwrap();
            let sig = rec("歌唱", 9, "2.1-13.4", "2-13");
            let bytes = bincode::serialize(&sig).unwrap();
            let txn = store.db.begin_write().unwrap();
            {
                let mut words = txn.open_table(WORDS).unwrap();
                words
                    .insert(record_key(2, "歌唱").as_str(), bytes.as_slice())
                    .unwrap();
            }
            txn.commit().unwrap();

            let q = CorpusQuery::bucket("", "13", "", LengthConstraint::Exactly(2), 10);
            assert!(store.find(&q).unwrap().is_empty());
        }
        let store = RedbCorpus::open(&path).unwrap();
        let q = CorpusQuery::bucket("", "13", "", LengthConstraint::Exactly(2), 10);
        let words: Vec<_> = store.find(&q).unwrap().into_iter().map(|s| s.word).collect();
        assert_eq!(words, vec!["歌唱"]);
    }

    #[test]
    fn insert_find_and_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbCorpus::open(dir.path().join("corpus.redb")).unwrap();
        store
            .insert_batch(&[
                rec("演唱", 8500, "11.3-13.4", "11-13"),
                rec("歌唱", 9100, "2.1-13.4", "2-13"),
                rec("合唱团", 700, "2.2-13.4-11.2", "2-13-11"),
                rec("放声歌唱", 300, "13.4-12.1-2.1-13.4", "13-12-2-13"),
            ])
            .unwrap();
        assert_eq!(store.len().unwrap(), 4);

        let q = CorpusQuery::bucket("演唱", "13", "", LengthConstraint::Exactly(2), 10);
        let words: Vec<_> = store.find(&q).unwrap().into_iter().map(|s| s.word).collect();
        assert_eq!(words, vec!["歌唱"]);

        let q = CorpusQuery::bucket("", "13", "13.4", LengthConstraint::AtLeast(2), 10);
        let words: Vec<_> = store.find(&q).unwrap().into_iter().map(|s| s.word).collect();
        assert_eq!(words, vec!["歌唱", "演唱", "放声歌唱"]);

        assert_eq!(store.get("合唱团").unwrap().map(|s| s.rate), Some(700));
        assert!(store.get("独唱").unwrap().is_none());
    }

    #[test]
    fn reinsert_updates_rate() {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbCorpus::open(dir.path().join("c.redb")).unwrap();
        store.insert(&rec("演唱", 1, "11.3-13.4", "11-13")).unwrap();
        store.insert(&rec("演唱", 42, "11.3-13.4", "11-13")).unwrap();
        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(store.get("演唱").unwrap().map(|s| s.rate), Some(42));
    }

    #[test]
    fn reopen_keeps_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("c.redb");
        {
            let store = RedbCorpus::open(&path).unwrap();
            store.insert(&rec("歌唱", 9, "2.1-13.4", "2-13")).unwrap();
        }
        let store = RedbCorpus::open(&path).unwrap();
        assert!(!store.is_empty().unwrap());
    }
}
