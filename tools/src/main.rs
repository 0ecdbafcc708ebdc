mod import;
mod report;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use librhyme_core::{
    InMemoryCorpus, RapNum, RedbCorpus, RhymeConfig, RhymeEngine, SearchParameters, ToneType,
};
use librhyme_pinyin::ReadingTable;

#[derive(Parser, Debug)]
#[command(name = "rhyme")]
#[command(about = "Find Mandarin words that rhyme with a given word")]
struct Cli {
    /// Engine configuration (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Reading table (<hanzi>\t<syllables>); the embedded demo table if absent
    #[arg(long, global = true)]
    readings: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the rhyme signature of words
    Classify {
        #[arg(required = true)]
        words: Vec<String>,
    },
    /// Summary search over all length buckets
    Search {
        #[command(flatten)]
        query: QueryArgs,
        /// Report storage failures as empty results
        #[arg(long)]
        lenient: bool,
    },
    /// Search a single length bucket
    Bucket {
        #[command(flatten)]
        query: QueryArgs,
        /// Word length; 5 and up means "at least"
        #[arg(short, long, default_value_t = 2)]
        length: usize,
    },
    /// Import THUOCL-style word lists into a corpus database
    Import {
        #[arg(long)]
        db: PathBuf,
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Look up stored frequencies
    Rates {
        #[arg(long)]
        db: PathBuf,
        #[arg(required = true)]
        words: Vec<String>,
    },
}

#[derive(Args, Debug)]
struct QueryArgs {
    /// Corpus database
    #[arg(long)]
    db: PathBuf,
    word: String,
    /// Trailing characters that must rhyme (1-4)
    #[arg(short, long, default_value = "1")]
    rap_num: RapNum,
    /// 0: any tone, 1: last character's tone, 2: all rhyming characters' tones
    #[arg(short, long, default_value = "0")]
    tone_type: ToneType,
}

impl QueryArgs {
    fn params(&self) -> SearchParameters {
        SearchParameters::new(self.word.as_str(), self.rap_num, self.tone_type)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => RhymeConfig::load_toml(path)
            .map_err(|e| anyhow::anyhow!("loading config {}: {}", path.display(), e))?,
        None => RhymeConfig::default(),
    };
    let table = match &cli.readings {
        Some(path) => ReadingTable::load(path)
            .with_context(|| format!("loading readings {}", path.display()))?,
        None => {
            tracing::info!("using embedded demo reading table");
            ReadingTable::load_demo().context("loading demo readings")?
        }
    };

    match cli.command {
        Command::Classify { words } => {
            // Classification needs no corpus; an empty in-memory one will do.
            let engine = RhymeEngine::new(table, InMemoryCorpus::new(), config);
            let mut out = Vec::with_capacity(words.len());
            for word in &words {
                out.push(report::Classified::new(word, engine.classify(word, 0)));
            }
            report::print_classified(&out, cli.json)?;
        }
        Command::Search { query, lenient } => {
            let engine = RhymeEngine::new(table, open_db(&query.db)?, config);
            let params = query.params();
            let result = if lenient {
                engine.search_lenient(&params)?
            } else {
                engine.search(&params)?
            };
            report::print_search(&params, &result, cli.json)?;
        }
        Command::Bucket { query, length } => {
            let engine = RhymeEngine::new(table, open_db(&query.db)?, config);
            let found = engine.search_bucket(&query.params(), length)?;
            report::print_words(&found, cli.json)?;
        }
        Command::Import { db, inputs } => {
            let engine = RhymeEngine::new(table, open_db(&db)?, config);
            let stats = import::run(&engine, &inputs)?;
            report::print_import(&stats, cli.json)?;
        }
        Command::Rates { db, words } => {
            let engine = RhymeEngine::new(table, open_db(&db)?, config);
            let rates = engine.word_rates(&words)?;
            report::print_rates(&rates, cli.json)?;
        }
    }
    Ok(())
}

fn open_db(path: &Path) -> Result<RedbCorpus> {
    RedbCorpus::open(path).with_context(|| format!("opening corpus {}", path.display()))
}
