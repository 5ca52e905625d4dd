use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{Level, event};

use region_kit::{
    AnnotationOptions, RegionSpecifier, TranscriptDb,
    batch::{Outcome, evaluate_batch},
    read_transcript_ids, tracing_kit,
};

/// Calculate the limits of a region for the given transcripts.
///
/// Prints one `<id>: [<start>, <end>)` line per transcript, 0-based and half-open.
#[derive(Parser, Debug)]
#[command(name = "region")]
#[command(author, version, about)]
struct Cli {
    /// Region of the transcript, e.g. `cds`, `*cds-50:cds*+50`, `10:3utr*-10`
    region: String,

    /// Transcript ID
    transcript: Option<String>,

    /// A file with whitespace-separated transcript IDs
    #[arg(short = 't', long = "tr-ids", value_name = "FILE")]
    tr_ids: Option<PathBuf>,

    /// Prepared CDS annotation file (plain or .gz)
    #[arg(short, long, value_name = "FILE")]
    cds: PathBuf,

    /// Use the flag column of the CDS file, keeping only records flagged `*`
    #[arg(short, long)]
    flag: bool,

    /// Do not clamp the returned limits to 0 - transcript length
    #[arg(short, long)]
    no_enforce: bool,

    /// Read the two CDS columns as the bounds of a custom box, for `custom` regions
    #[arg(short = 'b', long)]
    custom_box: bool,

    /// Keep CDS lengths that are not a multiple of 3 as they are
    #[arg(long)]
    no_codon_clip: bool,

    /// Worker threads, 0 for one per core
    #[arg(short = 'j', long, default_value_t = 0)]
    threads: usize,

    /// More logging: -v for debug, -vv for trace. RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Also log to a daily rolling file with this prefix, under $TMPDIR
    #[arg(long, value_name = "PREFIX")]
    log_file_prefix: Option<String>,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = tracing_kit::level_from_verbosity(cli.verbose);
    match &cli.log_file_prefix {
        Some(prefix) => {
            let log_dir = tracing_kit::setup_logging_to_stderr_and_rolling_file(prefix, level)?;
            event!(Level::DEBUG, "log dir = {}", log_dir.display());
        }
        None => tracing_kit::setup_logging_stderr_only(level)?,
    }

    let spec = RegionSpecifier::parse(&cli.region).context("Invalid region")?;
    event!(Level::DEBUG, "region {} parsed into {:?}", spec, spec.clauses());

    let mut ids = read_transcript_ids(cli.tr_ids.as_ref())?.unwrap_or_default();
    if let Some(tr) = cli.transcript {
        ids.push(tr);
    }
    if ids.is_empty() {
        bail!("No TR-IDs were given to extract the region from");
    }

    let opts = AnnotationOptions {
        use_flag: cli.flag,
        // box bounds are taken as given
        clip_to_codons: !cli.no_codon_clip && !cli.custom_box,
        ..Default::default()
    };
    let mut db = TranscriptDb::from_path(&cli.cds, &opts)?;
    if cli.custom_box {
        db = db.as_custom_boxes();
    }

    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()?;
    }

    let enforce = !cli.no_enforce;
    let mut failed = 0usize;
    let mut out = BufWriter::new(io::stdout().lock());
    let mut err_out = io::stderr().lock();

    for res in evaluate_batch(&spec, &db, &ids, enforce) {
        match res.outcome {
            Outcome::Found(Ok(limits)) => writeln!(out, "{}: {}", res.id, limits)?,
            Outcome::Found(Err(err)) => {
                failed += 1;
                writeln!(err_out, "Could not extract limits for {}: {}", res.id, err)?;
                event!(Level::DEBUG, "{}: {:?}", res.id, err);
            }
            Outcome::Missing => {
                writeln!(err_out, "Could not find '{}' in DB", res.id)?;
                event!(Level::DEBUG, "{} is not in {}", res.id, cli.cds.display());
            }
        }
    }
    out.flush()?;

    if failed > 0 {
        event!(Level::ERROR, "{} of {} transcripts failed", failed, ids.len());
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
