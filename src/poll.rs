use log::{debug, error, info, warn};

use poll_tally::builder::Builder;
use poll_tally::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::io::Read;

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::SubmitArgs;
use crate::poll::config_reader::*;
use crate::poll::io_file::FileBackend;
use crate::poll::io_kv::KvBackend;

pub mod config_reader;
mod io_common;
pub mod io_file;
pub mod io_kv;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StoreError {
    #[snafu(display("Invalid vote data: {source}"))]
    InvalidBallot { source: PollErrors },
    #[snafu(display("Could not parse the vote payload"))]
    ParsingPayload { source: serde_json::Error },
    #[snafu(display("Could not read the vote payload"))]
    ReadingPayload { source: std::io::Error },

    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },

    #[snafu(display("Could not create the data directory {path}"))]
    CreatingDataDir {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Could not read the votes from {path}"))]
    ReadingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Could not write the votes to {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("The stored votes are not valid"))]
    DecodingSnapshot { source: serde_json::Error },
    #[snafu(display("Could not serialize the votes"))]
    EncodingSnapshot { source: serde_json::Error },

    #[snafu(display("The key-value store is not usable: {reason}"))]
    KvConfig { reason: String },
    #[snafu(display("Could not reach the key-value store: {message}"))]
    KvTransport { message: String },
    #[snafu(display("The key-value store answered with status {code}: {message}"))]
    KvStatus { code: u16, message: String },
    #[snafu(display("Could not read the answer of the key-value store"))]
    KvReplyRead { source: std::io::Error },
    #[snafu(display("The key-value store refused the command: {message}"))]
    KvRejected { message: String },
    #[snafu(display("Unexpected answer from the key-value store: {message}"))]
    KvUnexpected { message: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// How a failure should be reported to the caller.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ErrorKind {
    /// The input was refused. Retrying the same input will not help.
    InvalidBallot,
    /// A valid request could not be stored or read back.
    Persistence,
    Other,
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::InvalidBallot { .. } | StoreError::ParsingPayload { .. } => {
                ErrorKind::InvalidBallot
            }
            StoreError::ReadingPayload { .. }
            | StoreError::OpeningJson { .. }
            | StoreError::ParsingJson { .. }
            | StoreError::Whatever { .. } => ErrorKind::Other,
            _ => ErrorKind::Persistence,
        }
    }
}

/// A place where the whole set of ballots is kept.
///
/// Implementations read and write the full snapshot at once. A failed `save`
/// must leave the previous snapshot in place.
pub trait BallotBackend {
    /// A short name for logging.
    fn name(&self) -> &'static str;
    /// All the stored ballots, in stored order. An empty store is not an error.
    fn load(&self) -> StoreResult<Vec<Ballot>>;
    /// Replaces the stored snapshot.
    fn save(&self, ballots: &[Ballot]) -> StoreResult<()>;
}

/// Chooses where the ballots live.
///
/// The key-value store is used when it is configured and its client can be
/// built. In every other case, the ballots go to the local file.
pub fn select_backend(config: &StoreConfig) -> Box<dyn BallotBackend> {
    match &config.kv {
        Some(kv) => match KvBackend::new(kv) {
            Ok(backend) => {
                info!("select_backend: using the key-value store under key {:?}", kv.key);
                return Box::new(backend);
            }
            Err(e) => {
                warn!("select_backend: key-value store not available, using file storage: {}", e);
            }
        },
        None => {
            debug!("select_backend: no key-value credentials in the environment");
        }
    }
    let backend = FileBackend::new(config.data_file.clone());
    info!(
        "select_backend: using file storage at {}",
        backend.path().display()
    );
    Box::new(backend)
}

/// The result of a successful submission.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct UpsertOutcome {
    /// Number of ballots in the poll after the submission.
    pub total: usize,
    /// True if the ballot replaced an earlier one from the same voter.
    pub replaced: bool,
}

/// The ballots of the poll, kept in one backend.
///
/// Every call reads the backend again: nothing is cached between calls.
///
/// A submission reads the whole snapshot, updates it and writes it back
/// without any lock. Two concurrent submissions can therefore overwrite each
/// other and one of them is lost. This is accepted for a small poll.
pub struct RecordStore {
    backend: Box<dyn BallotBackend>,
}

impl RecordStore {
    pub fn new(backend: Box<dyn BallotBackend>) -> RecordStore {
        RecordStore { backend }
    }

    pub fn open(config: &StoreConfig) -> RecordStore {
        RecordStore::new(select_backend(config))
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// All the ballots, in stored order.
    ///
    /// A read failure is logged and reported as an empty poll.
    pub fn read_all(&self) -> Vec<Ballot> {
        match self.backend.load() {
            Ok(ballots) => {
                debug!(
                    "read_all: {} ballots from the {} backend",
                    ballots.len(),
                    self.backend.name()
                );
                ballots
            }
            Err(e) => {
                error!(
                    "read_all: could not read from the {} backend, reporting an empty poll: {}",
                    self.backend.name(),
                    e
                );
                Vec::new()
            }
        }
    }

    /// Adds a ballot, or replaces the ballot of the same voter (ignoring case) in place.
    ///
    /// Nothing is written if the ballot is not valid or if the current
    /// snapshot cannot be read.
    pub fn upsert(&self, ballot: Ballot) -> StoreResult<UpsertOutcome> {
        ballot.validate().context(InvalidBallotSnafu {})?;
        let mut ballots = self.backend.load()?;
        let replaced = upsert_into(&mut ballots, ballot);
        self.backend.save(&ballots)?;
        info!(
            "upsert: {} ballots stored in the {} backend",
            ballots.len(),
            self.backend.name()
        );
        Ok(UpsertOutcome {
            total: ballots.len(),
            replaced,
        })
    }

    pub fn tally(&self) -> TallyReport {
        tally(&self.read_all())
    }
}

fn upsert_into(ballots: &mut Vec<Ballot>, ballot: Ballot) -> bool {
    match ballots.iter().position(|b| b.same_voter(&ballot)) {
        Some(idx) => {
            warn!(
                "upsert: {:?} replaces the earlier ballot of {:?}",
                ballot.name, ballots[idx].name
            );
            ballots[idx] = ballot;
            true
        }
        None => {
            ballots.push(ballot);
            false
        }
    }
}

// ********* Callers **********

/// Reads a raw vote payload from a file, or from the standard input for `-`.
pub fn read_ballot_payload(path: &str) -> StoreResult<Ballot> {
    let contents = if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context(ReadingPayloadSnafu {})?;
        buf
    } else {
        fs::read_to_string(path).context(ReadingPayloadSnafu {})?
    };
    debug!("read_ballot_payload: {:?}", contents);
    serde_json::from_str(&contents).context(ParsingPayloadSnafu {})
}

pub fn ballot_from_args(args: &SubmitArgs) -> StoreResult<Ballot> {
    if let Some(p) = &args.input {
        return read_ballot_payload(p);
    }
    Builder::new(args.name.as_deref().unwrap_or(""))
        .weekends(&args.weekends)
        .can_drive(args.can_drive)
        .has_ikon_pass(args.ikon_pass)
        .willing_to_pitch_jet(args.pitch_jet)
        .build()
        .context(InvalidBallotSnafu {})
}

pub fn run_submit(store: &RecordStore, ballot: Ballot) -> StoreResult<UpsertOutcome> {
    let name = ballot.name.clone();
    let outcome = store.upsert(ballot)?;
    if outcome.replaced {
        println!("Vote recorded successfully (replaced the earlier vote of {})", name);
    } else {
        println!("Vote recorded successfully");
    }
    println!("totalVotes: {}", outcome.total);
    Ok(outcome)
}

pub fn run_list(store: &RecordStore) {
    let ballots = store.read_all();
    for b in ballots.iter() {
        println!(
            "{}: {} | drive: {} | ikon: {} | jet: {}",
            b.name,
            b.selected_weekends.join(", "),
            answer_text(b.can_drive),
            answer_text(b.has_ikon_pass),
            answer_text(b.willing_to_pitch_jet)
        );
    }
    println!("{} ballots", ballots.len());
}

pub fn run_results(
    store: &RecordStore,
    as_json: bool,
    out_path: Option<String>,
    check_summary_path: Option<String>,
) -> StoreResult<()> {
    let report = store.tally();
    let result_js = report_to_json(&report)?;
    let pretty_js_stats =
        serde_json::to_string_pretty(&result_js).context(EncodingSnapshotSnafu {})?;

    if let Some(p) = out_path {
        info!("run_results: writing the summary to {}", p);
        fs::write(&p, &pretty_js_stats).context(WritingFileSnafu { path: p.clone() })?;
    }

    if as_json {
        println!("{}", pretty_js_stats);
    } else {
        print!("{}", render_text(&report));
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = check_summary_path {
        let summary_ref = read_summary(&summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(EncodingSnapshotSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            whatever!("Difference detected between the computed results and the reference summary")
        }
    }
    Ok(())
}

/// The results document read by the dashboard.
pub fn report_to_json(report: &TallyReport) -> StoreResult<JSValue> {
    let mut weekend_stats: JSMap<String, JSValue> = JSMap::new();
    for (name, stats) in report.option_stats.iter() {
        weekend_stats.insert(
            name.clone(),
            json!({
                "count": stats.count,
                "voters": stats.voters,
                "percentage": stats.percentage
            }),
        );
    }

    let mut js: JSMap<String, JSValue> = JSMap::new();
    js.insert(
        "votes".to_string(),
        serde_json::to_value(&report.ballots).context(EncodingSnapshotSnafu {})?,
    );
    js.insert("weekendStats".to_string(), JSValue::Object(weekend_stats));
    for attribute in Attribute::ALL {
        let s = report.attribute_stats(attribute);
        js.insert(
            attribute.stats_key().to_string(),
            json!({"yes": s.yes, "no": s.no, "total": s.total}),
        );
    }
    Ok(JSValue::Object(js))
}

/// A plain-text rendition of the dashboard, weekends by decreasing count.
pub fn render_text(report: &TallyReport) -> String {
    let mut out = format!("WEEKEND RESULTS ({} votes)\n", report.total_ballots());
    for (name, stats) in report.ranked_options() {
        let noun = if stats.count == 1 { "vote" } else { "votes" };
        out.push_str(&format!(
            "  {:<20} {:>3} {:<5} {:>3}%  {}\n",
            name,
            stats.count,
            noun,
            stats.percentage,
            stats.voters.join(", ")
        ));
    }
    out.push('\n');
    for attribute in Attribute::ALL {
        let s = report.attribute_stats(attribute);
        let share = match s.yes_percentage() {
            Some(p) => format!("{}%", p),
            None => "no answers".to_string(),
        };
        out.push_str(&format!(
            "{}: {} / {} ({})\n",
            attribute.label(),
            s.yes,
            s.total,
            share
        ));
    }
    out
}

fn answer_text(answer: Option<bool>) -> &'static str {
    match answer {
        Some(true) => "yes",
        Some(false) => "no",
        None => "-",
    }
}
