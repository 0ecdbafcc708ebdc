//! Corpus import from THUOCL-style word lists.
//!
//! Each line is `<word>\t<frequency>`. Words of 2 to 6 characters are
//! classified and written to the store in batches; an unparsable frequency
//! counts as 0 and re-imported words take the new frequency.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use librhyme_core::{utils, RedbCorpus, RhymeEngine, Transcriber, WordSignature};
use serde::Serialize;

pub const BATCH_SIZE: usize = 1000;
pub const MIN_LENGTH: usize = 2;
pub const MAX_LENGTH: usize = 6;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ImportStats {
    pub lines: usize,
    /// Entries outside the accepted length range.
    pub out_of_range: usize,
    /// Entries that could not be transcribed or classified.
    pub failed: usize,
    pub written: usize,
    pub missing_files: usize,
}

/// Parse one list line into (word, frequency).
pub fn parse_line(line: &str) -> Option<(String, u64)> {
    let mut parts = line.trim().split('\t');
    let word = utils::normalize(parts.next()?);
    let rate = parts.next()?.trim().parse().unwrap_or(0);
    if word.is_empty() {
        return None;
    }
    Some((word, rate))
}

struct Importer<'a, T> {
    engine: &'a RhymeEngine<T, RedbCorpus>,
    pending: Vec<WordSignature>,
    stats: ImportStats,
}

impl<'a, T: Transcriber> Importer<'a, T> {
    fn push(&mut self, word: &str, rate: u64) -> Result<()> {
        let length = word.chars().count();
        if !(MIN_LENGTH..=MAX_LENGTH).contains(&length) {
            self.stats.out_of_range += 1;
            return Ok(());
        }
        match self.engine.classify(word, rate) {
            Ok(sig) => self.pending.push(sig),
            Err(e) => {
                tracing::debug!(word, error = %e, "skipped");
                self.stats.failed += 1;
            }
        }
        if self.pending.len() >= BATCH_SIZE {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let n = self
            .engine
            .repository()
            .insert_batch(&self.pending)
            .context("writing batch")?;
        self.pending.clear();
        self.stats.written += n;
        tracing::info!(written = self.stats.written, "import progress");
        Ok(())
    }

    fn read<R: BufRead>(&mut self, reader: R) -> Result<()> {
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            self.stats.lines += 1;
            if let Some((word, rate)) = parse_line(&line) {
                self.push(&word, rate)?;
            }
        }
        Ok(())
    }
}

/// Import every readable file of `inputs`; missing files are skipped.
pub fn run<T: Transcriber>(
    engine: &RhymeEngine<T, RedbCorpus>,
    inputs: &[PathBuf],
) -> Result<ImportStats> {
    let mut importer = Importer {
        engine,
        pending: Vec::with_capacity(BATCH_SIZE),
        stats: ImportStats::default(),
    };
    for path in inputs {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "input not found, skipping");
            importer.stats.missing_files += 1;
            continue;
        }
        tracing::info!(path = %path.display(), "importing");
        let file = open(path)?;
        importer.read(BufReader::new(file))?;
    }
    importer.flush()?;
    Ok(importer.stats)
}

fn open(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("opening {}", path.display()))
}
