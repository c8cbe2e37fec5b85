// src/cli.rs
use std::{path::PathBuf, time::{SystemTime, UNIX_EPOCH}};

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Result, eyre};
use tracing::{debug, info};

use crate::{
    collector::Collector,
    config::{Config, options::split_list},
    delim::Delim,
    enrich::{self, AboutPageLookup, DomainLookup, EnrichSpec, FieldLookup},
    file::resolve_out_path,
    progress::Progress,
    session::{CookieJar, SessionContext, RestoreOutcome, SessionStore},
    source::CsvSource,
};

#[derive(Debug, Parser)]
#[command(name = "listing_collect", version, about = "Incremental, deduplicating CSV collector for scraped listings")]
pub struct Cli {
    /// More log output (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Append logs to this file instead of stderr.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Merge an input CSV into the deduplicated output store.
    Collect(CollectArgs),
    /// Write a copy of a CSV with one derived column added.
    Enrich(EnrichArgs),
    /// Inspect (and optionally prune) a saved cookie file.
    Session(SessionArgs),
}

#[derive(Debug, Args)]
pub struct CollectArgs {
    /// Input file [env: INPUT_CSV]
    #[arg(short, long)]
    pub input: Option<PathBuf>,
    /// Output file or directory [env: OUTPUT_CSV]
    #[arg(short, long)]
    pub output: Option<String>,
    /// Comma-separated identity key fields [env: KEY_FIELDS]
    #[arg(long)]
    pub key: Option<String>,
    /// Comma-separated output header for a new store [env: SCHEMA]
    #[arg(long)]
    pub schema: Option<String>,
    /// Output format: csv | tsv [env: OUTPUT_FORMAT]
    #[arg(long)]
    pub format: Option<String>,
    /// Input format: csv | tsv
    #[arg(long, default_value = "csv")]
    pub input_format: String,
    #[arg(long)]
    pub batch_size: Option<usize>,
    /// 1-based first input row [env: START_ROW]
    #[arg(long)]
    pub start_row: Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Derive {
    /// Network location of a URL column.
    Domain,
    /// `<company page>/about` from a company page column.
    AboutUrl,
}

impl Derive {
    fn default_column(self) -> &'static str {
        match self {
            Derive::Domain => "domain",
            Derive::AboutUrl => "about_page_link",
        }
    }
}

#[derive(Debug, Args)]
pub struct EnrichArgs {
    #[arg(short, long)]
    pub input: Option<PathBuf>,
    #[arg(short, long)]
    pub output: String,
    #[arg(long, value_enum)]
    pub derive: Derive,
    /// Source column.
    #[arg(long)]
    pub from: String,
    /// New column name (defaults per derivation).
    #[arg(long)]
    pub column: Option<String>,
    /// Insert the new column after this one instead of appending it.
    #[arg(long)]
    pub after: Option<String>,
    #[arg(long)]
    pub start_row: Option<usize>,
    /// Comma-separated values to treat as "not found".
    #[arg(long)]
    pub reject: Option<String>,
    #[arg(long, default_value = "csv")]
    pub format: String,
}

#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Cookie file [env: SESSION_STORE]
    #[arg(long)]
    pub store: Option<PathBuf>,
    /// Drop expired cookies and write the file back.
    #[arg(long)]
    pub purge: bool,
}

/// Progress lines through the log.
#[derive(Default)]
struct LogProgress {
    rows: usize,
}

impl Progress for LogProgress {
    fn log(&mut self, msg: &str) { info!("{msg}"); }

    fn batch_done(&mut self, batch: usize, fetched: usize, written: usize) {
        debug!(batch, fetched, written, "Batch done");
    }

    fn item_done(&mut self, row: usize) {
        self.rows += 1;
        if self.rows % 50 == 0 {
            info!(row, "Rows processed: {}", self.rows);
        }
    }
}

pub fn run(cli: Cli) -> Result<()> {
    crate::log::init(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Command::Collect(args) => collect(args),
        Command::Enrich(args) => enrich(args),
        Command::Session(args) => session(args),
    }
}

fn parse_delim(v: &str) -> Result<Delim> {
    Delim::parse(v).ok_or_else(|| eyre!("Unknown format: {v}"))
}

fn collect(args: CollectArgs) -> Result<()> {
    let mut cfg = Config::from_env()?;

    if let Some(f) = &args.format {
        cfg.format = parse_delim(f)?;
    }
    if let Some(o) = &args.output {
        cfg.output_target = Some(o.clone());
    }
    cfg.resolve_output()?;
    if let Some(i) = args.input { cfg.input_path = Some(i); }
    if let Some(k) = &args.key { cfg.key_fields = split_list(k); }
    if let Some(s) = &args.schema { cfg.schema = split_list(s); }
    if let Some(n) = args.batch_size { cfg.batch_size = n; }
    if let Some(n) = args.start_row { cfg.start_row = n; }
    cfg.validate()?;

    let input = cfg
        .input_path
        .clone()
        .ok_or_else(|| eyre!("No input file: pass --input or set INPUT_CSV"))?;
    cfg.log_summary();

    let mut collector = Collector::open(&cfg)?;
    let source = CsvSource::open(&input, parse_delim(&args.input_format)?, cfg.batch_size, cfg.start_row)?;
    let mut progress = LogProgress::default();
    let summary = collector.run(source, Some(&mut progress))?;

    println!(
        "Wrote {} new row(s) to {} ({} duplicate(s) skipped, {} known key(s))",
        summary.written,
        cfg.output_path.display(),
        summary.duplicates,
        collector.index().len()
    );
    Ok(())
}

fn enrich(args: EnrichArgs) -> Result<()> {
    let cfg = Config::from_env()?;
    let input = args
        .input
        .or(cfg.input_path)
        .ok_or_else(|| eyre!("No input file: pass --input or set INPUT_CSV"))?;
    let delim = parse_delim(&args.format)?;
    let output = resolve_out_path(&args.output, &format!("enriched.{}", delim.ext()))?;

    let column = args.column.unwrap_or_else(|| s!(args.derive.default_column()));
    let mut spec = EnrichSpec::new(args.from, column)
        .start_row(args.start_row.unwrap_or(cfg.start_row));
    if let Some(a) = args.after { spec = spec.after(a); }
    if let Some(r) = &args.reject { spec = spec.reject(split_list(r)); }

    let mut lookup: Box<dyn FieldLookup> = match args.derive {
        Derive::Domain => Box::new(DomainLookup),
        Derive::AboutUrl => Box::new(AboutPageLookup),
    };
    let mut progress = LogProgress::default();
    let summary = enrich::enrich(&input, &output, delim, &spec, lookup.as_mut(), Some(&mut progress))?;

    println!(
        "Wrote {} row(s) to {} ({} filled, {} without `{}`, {} failed)",
        summary.rows,
        output.display(),
        summary.filled,
        summary.skipped,
        spec.source_field,
        summary.failed
    );
    Ok(())
}

fn session(args: SessionArgs) -> Result<()> {
    let cfg = Config::from_env()?;
    let store = SessionStore::new(args.store.unwrap_or(cfg.session_store_path));
    let mut jar = CookieJar::new();

    match store.restore(&mut jar) {
        RestoreOutcome::Restored(_) => {}
        other => {
            println!("{}: no usable session ({other:?})", store.path().display());
            return Ok(());
        }
    }

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs_f64();
    let expired = jar.cookies().iter().filter(|c| c.is_expired(now)).count();
    println!(
        "{}: {} cookie(s), {} expired",
        store.path().display(),
        jar.len(),
        expired
    );

    if args.purge && expired > 0 {
        jar.purge_expired(now);
        store.persist(&jar)?;
        println!("Removed {expired} expired cookie(s)");
    }
    Ok(())
}
