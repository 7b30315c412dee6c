//! A binary for annotating alignment hit tables with GenBank features.
//!
//! ```shell
//! cargo run --release --bin=annohit --features=binaries -- annotate hits.tsv
//! ```
//!
//! Three subcommands are provided:
//!
//! * `annotate` annotates a tab-separated hit table and writes the result.
//! * `fetch` warms the local cache for a list of accessions (or for every
//!   subject of a hit table).
//! * `upstream` computes the region upstream of a feature.

use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use annohit::cache;
use annohit::engine;
use annohit::fetch;
use annohit::locate;
use annohit::resolve;
use annohit::table;
use annohit::upstream;
use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use clap_verbosity_flag::Verbosity;
use tracing::error;
use tracing::info;
use tracing::warn;
use tracing_log::AsTrace as _;
use tracing_subscriber::EnvFilter;

////////////////////////////////////////////////////////////////////////////////////////
// Shared arguments
////////////////////////////////////////////////////////////////////////////////////////

/// Arguments for resolving accessions.
#[derive(clap::Args)]
struct ResolveArgs {
    /// The directory holding cached GenBank records.
    #[arg(long, env = "ANNOHIT_CACHE_DIR", default_value = cache::DEFAULT_ROOT)]
    cache_dir: PathBuf,

    /// Never write fetched records to the cache.
    #[arg(long)]
    no_cache: bool,

    /// Resolve accessions from the cache only.
    #[arg(long)]
    local_only: bool,

    /// An NCBI API key.
    #[arg(long, env = "NCBI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// A contact email reported to NCBI.
    #[arg(long, env = "NCBI_EMAIL")]
    email: Option<String>,

    /// The E-utilities base URL.
    #[arg(long, default_value = fetch::DEFAULT_BASE_URL)]
    base_url: String,

    /// The timeout of a single fetch, in seconds.
    #[arg(long, default_value_t = fetch::DEFAULT_TIMEOUT.as_secs())]
    timeout: u64,
}

impl ResolveArgs {
    /// Builds a resolver backed by the on-disk cache.
    fn resolver(&self) -> Result<resolve::Resolver> {
        let fetcher = fetch::Builder::default()
            .base_url(self.base_url.clone())
            .timeout(Duration::from_secs(self.timeout))
            .api_key(self.api_key.clone())
            .email(self.email.clone())
            .try_build()
            .context("building the fetcher")?;

        info!("cache directory: {}", self.cache_dir.display());

        Ok(resolve::Resolver::new(
            cache::Disk::new(self.cache_dir.clone()),
            fetcher,
            resolve::Options {
                cache: !self.no_cache,
                local_only: self.local_only,
            },
        ))
    }
}

/// How the features of a record are scanned.
#[derive(Clone, Copy, ValueEnum)]
enum Policy {
    /// The first feature of an included type decides.
    FirstCandidate,

    /// The first feature of an included type covering the hit wins.
    FirstContaining,
}

impl From<Policy> for locate::ScanPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::FirstCandidate => locate::ScanPolicy::FirstCandidate,
            Policy::FirstContaining => locate::ScanPolicy::FirstContaining,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////
// Annotate
////////////////////////////////////////////////////////////////////////////////////////

/// Annotates a hit table.
#[derive(clap::Args)]
struct AnnotateArgs {
    /// The tab-separated hit table (optionally gzip compressed).
    input: PathBuf,

    /// Where to write the annotated table (defaults to stdout).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Whether the first non-comment line of the table holds column names.
    #[arg(long)]
    header: bool,

    /// Column names used when the table matches no known schema.
    #[arg(long, value_delimiter = ',')]
    columns: Option<Vec<String>>,

    /// The number of workers (capped by the available cores).
    #[arg(short = 'j', long)]
    workers: Option<usize>,

    /// Also annotate the query of each hit from its `accession:start-end`
    /// header.
    #[arg(long)]
    update_query: bool,

    /// The feature types to consider.
    #[arg(long = "feature-type", default_value = locate::DEFAULT_FEATURE_TYPE)]
    feature_types: Vec<String>,

    /// How the features of a record are scanned.
    #[arg(long, value_enum, default_value_t = Policy::FirstCandidate)]
    scan_policy: Policy,

    /// Keep annotating the remaining chunks when a chunk fails and write the
    /// rows that succeeded.
    #[arg(long)]
    keep_going: bool,

    #[command(flatten)]
    resolve: ResolveArgs,
}

fn annotate(args: AnnotateArgs) -> Result<()> {
    let raw = table::Reader::from_path(&args.input, args.header)
        .and_then(|reader| reader.read())
        .with_context(|| format!("reading {}", args.input.display()))?;

    info!("read {} rows from {}", raw.records().len(), args.input.display());

    let options = engine::Options {
        workers: args.workers,
        update_query: args.update_query,
        locate: locate::Options {
            included_types: args.feature_types,
            policy: args.scan_policy.into(),
        },
        columns: args.columns,
        failure_policy: if args.keep_going {
            engine::FailurePolicy::Continue
        } else {
            engine::FailurePolicy::Abort
        },
    };

    let engine = engine::Engine::new(args.resolve.resolver()?, options);
    info!("annotating with {} workers", engine.workers());

    let report = engine.annotate(raw).context("annotating the table")?;

    let failed = report.failures().len();
    let annotated = if args.keep_going {
        for failure in report.failures() {
            error!(
                "chunk {} (rows {}..{}) failed: {}",
                failure.chunk, failure.rows.start, failure.rows.end, failure.error
            );
        }

        report.into_parts().0
    } else {
        report.into_table().context("annotating the table")?
    };

    info!("kept {} rows", annotated.len());

    let output: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };

    let mut writer = table::Writer::new(output);
    writer
        .write_table(&annotated)
        .and_then(|_| writer.flush())
        .context("writing the annotated table")?;

    if failed > 0 {
        bail!("{} chunks failed", failed);
    }

    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////
// Fetch
////////////////////////////////////////////////////////////////////////////////////////

/// Warms the local cache.
#[derive(clap::Args)]
struct FetchArgs {
    /// The accessions to fetch.
    accessions: Vec<String>,

    /// A hit table whose subject accessions are also fetched.
    #[arg(long)]
    table: Option<PathBuf>,

    /// Whether the first non-comment line of the table holds column names.
    #[arg(long)]
    header: bool,

    #[command(flatten)]
    resolve: ResolveArgs,
}

fn fetch(args: FetchArgs) -> Result<()> {
    let mut accessions = args.accessions;

    if let Some(path) = &args.table {
        let raw = table::Reader::from_path(path, args.header)
            .and_then(|reader| reader.read())
            .with_context(|| format!("reading {}", path.display()))?;
        let table = table::normalize(raw, None)
            .with_context(|| format!("normalizing {}", path.display()))?;

        accessions.extend(table.rows().iter().map(|row| row.saccver().to_string()));
    }

    if accessions.is_empty() {
        warn!("no accessions to fetch");
        return Ok(());
    }

    let resolver = args.resolve.resolver()?;
    let resolved = resolver
        .prefetch(accessions.iter().map(String::as_str))
        .context("fetching records")?;

    info!("resolved {} accessions", resolved);

    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////
// Upstream
////////////////////////////////////////////////////////////////////////////////////////

/// Computes the region upstream of a feature.
#[derive(clap::Args)]
struct UpstreamArgs {
    /// The strand of the feature (`1` or `-1`).
    #[arg(long, allow_hyphen_values = true)]
    strand: i64,

    /// The start of the feature.
    #[arg(long)]
    start: i64,

    /// The stop of the feature.
    #[arg(long)]
    stop: i64,

    /// The length of the upstream region.
    #[arg(long, default_value_t = upstream::DEFAULT_LENGTH)]
    length: i64,

    /// Leave the first codon of the feature out of the region.
    #[arg(long)]
    exclude_first_codon: bool,
}

fn upstream(args: UpstreamArgs) -> Result<()> {
    let options = upstream::Options {
        length: args.length,
        include_first_codon: !args.exclude_first_codon,
    };

    let (start, end) = upstream::region(args.strand, args.start, args.stop, &options)
        .context("computing the upstream region")?;

    println!("{}\t{}", start, end);

    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////
// Main
////////////////////////////////////////////////////////////////////////////////////////

/// Annotates alignment hit tables with GenBank features.
#[derive(Parser)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbose: Verbosity,
}

/// The subcommands.
#[derive(Subcommand)]
enum Command {
    /// Annotates a hit table.
    Annotate(AnnotateArgs),

    /// Fetches records into the local cache.
    Fetch(FetchArgs),

    /// Computes the region upstream of a feature.
    Upstream(UpstreamArgs),
}

fn main() -> Result<()> {
    let args = Args::parse();

    match std::env::var("RUST_LOG") {
        Ok(_) => tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init(),
        Err(_) => tracing_subscriber::fmt()
            .with_max_level(args.verbose.log_level_filter().as_trace())
            .with_writer(std::io::stderr)
            .init(),
    };

    match args.command {
        Command::Annotate(args) => annotate(args),
        Command::Fetch(args) => fetch(args),
        Command::Upstream(args) => upstream(args),
    }
}
