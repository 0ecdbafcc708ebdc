// Text and JSON output of the `rhyme` subcommands.

use anyhow::Result;
use librhyme_core::{
    Bucket, HeatLevel, RhymeError, SearchParameters, SearchResult, WordRate, WordSignature,
};
use serde::Serialize;

use crate::import::ImportStats;

#[derive(Debug, Serialize)]
pub struct Entry<'a> {
    pub word: &'a str,
    pub rate: u64,
    pub heat: HeatLevel,
    pub rhyme: &'a str,
}

impl<'a> From<&'a WordSignature> for Entry<'a> {
    fn from(sig: &'a WordSignature) -> Self {
        Entry {
            word: &sig.word,
            rate: sig.rate,
            heat: HeatLevel::of(sig.length, sig.rate),
            rhyme: &sig.type_with_tone,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Classified {
    pub word: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<WordSignature>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Classified {
    pub fn new(word: &str, result: Result<WordSignature, RhymeError>) -> Self {
        match result {
            Ok(sig) => Classified {
                word: word.to_string(),
                signature: Some(sig),
                error: None,
            },
            Err(e) => Classified {
                word: word.to_string(),
                signature: None,
                error: Some(e.to_string()),
            },
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn entries(sigs: &[WordSignature]) -> Vec<Entry<'_>> {
    sigs.iter().map(Entry::from).collect()
}

fn print_entries(sigs: &[WordSignature]) {
    for e in entries(sigs) {
        println!("  {}\t{}\t{}\t{}", e.word, e.rhyme, e.rate, e.heat);
    }
}

pub fn print_classified(items: &[Classified], json: bool) -> Result<()> {
    if json {
        return print_json(items);
    }
    for item in items {
        match (&item.signature, &item.error) {
            (Some(sig), _) => println!(
                "{}\t{}\t{}\t{}",
                sig.word, sig.final_with_tone, sig.type_with_tone, sig.type_without_tone
            ),
            (None, Some(err)) => println!("{}\terror: {}", item.word, err),
            (None, None) => {}
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct SearchReport<'a> {
    word: &'a str,
    rap_num: u8,
    tone_type: u8,
    ranked: Vec<Entry<'a>>,
    buckets: Vec<(String, Vec<Entry<'a>>)>,
    extensions: Vec<Entry<'a>>,
}

pub fn print_search(params: &SearchParameters, result: &SearchResult, json: bool) -> Result<()> {
    let ranked = result.ranked();
    if json {
        return print_json(&SearchReport {
            word: &params.word,
            rap_num: params.rap_num.into(),
            tone_type: params.tone_type.into(),
            ranked: entries(&ranked),
            buckets: Bucket::PRIORITY
                .iter()
                .map(|b| (b.to_string(), entries(result.buckets.get(*b))))
                .collect(),
            extensions: entries(&result.extensions),
        });
    }
    if result.is_empty() {
        println!("no rhymes for {}", params.word);
        return Ok(());
    }
    for bucket in Bucket::PRIORITY {
        let found = result.buckets.get(bucket);
        if found.is_empty() {
            continue;
        }
        println!("[{} chars] {}", bucket, found.len());
        print_entries(found);
    }
    if !result.extensions.is_empty() {
        println!("[extensions] {}", result.extensions.len());
        print_entries(&result.extensions);
    }
    println!("{} distinct endings", ranked.len());
    Ok(())
}

pub fn print_words(found: &[WordSignature], json: bool) -> Result<()> {
    if json {
        return print_json(&entries(found));
    }
    print_entries(found);
    Ok(())
}

pub fn print_import(stats: &ImportStats, json: bool) -> Result<()> {
    if json {
        return print_json(stats);
    }
    println!(
        "{} lines, {} written, {} out of range, {} failed, {} missing files",
        stats.lines, stats.written, stats.out_of_range, stats.failed, stats.missing_files
    );
    Ok(())
}

pub fn print_rates(rates: &[WordRate], json: bool) -> Result<()> {
    if json {
        return print_json(rates);
    }
    for r in rates {
        if r.found {
            println!("{}\t{}", r.word, r.rate);
        } else {
            println!("{}\t-", r.word);
        }
    }
    Ok(())
}
