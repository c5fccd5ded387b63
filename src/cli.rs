//
// cli.rs
// bids-batch
//
// Defines the CLI surface with Clap and dispatches user-selected commands to
// the corresponding modules.
//

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::convert::{self, DEFAULT_CONVERTER};
use crate::identity;
use crate::models::{PlannedSlot, RosterEntry};
use crate::plan::{self, PlanContext};
use crate::roster::{self, RosterColumns};
use crate::runlog::RunLog;
use crate::{check, copy_source};

/// Top-level CLI definition: one verb per module.
#[derive(Parser)]
#[command(name = "bids-batch")]
#[command(about = "Batch DICOM-to-BIDS conversion and roster utilities", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Roster location and column naming, shared by every roster-driven verb.
///
/// Column defaults mirror the study spreadsheet and are matched exactly,
/// including non-Latin characters.
#[derive(Args, Clone)]
pub struct RosterOpts {
    /// CSV export of the clinical roster (title row first, headers on row 2)
    #[arg(long)]
    pub roster: PathBuf,
    /// Header of the follow-up-performed flag column
    #[arg(long, default_value = "FUP MR měření B provedeno (ano/ne)")]
    pub flag_column: String,
    /// Header of the session 1 code column
    #[arg(long, default_value = "MR B1")]
    pub session1_column: String,
    /// Header of the session 2 code column
    #[arg(long, default_value = "MR B2")]
    pub session2_column: String,
    /// Literal flag value that includes a row
    #[arg(long, default_value = roster::DEFAULT_AFFIRMATIVE)]
    pub affirmative: String,
}

impl RosterOpts {
    fn columns(&self) -> RosterColumns {
        RosterColumns {
            flag: self.flag_column.clone(),
            session1: self.session1_column.clone(),
            session2: self.session2_column.clone(),
        }
    }

    fn load(&self) -> Result<Vec<RosterEntry>> {
        roster::load_roster(&self.roster, &self.columns(), &self.affirmative)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert every pending roster session from DICOM to BIDS
    Convert {
        #[command(flatten)]
        roster: RosterOpts,
        /// Directory with the sub-<code> DICOM source folders
        #[arg(long)]
        path_in: PathBuf,
        /// BIDS output root
        #[arg(long)]
        path_out: PathBuf,
        /// Converter configuration file, passed through unchanged
        #[arg(long)]
        config: PathBuf,
        /// External converter binary
        #[arg(long, default_value = DEFAULT_CONVERTER)]
        converter: String,
    },
    /// Plan the conversion batch without invoking the converter
    Plan {
        #[command(flatten)]
        roster: RosterOpts,
        #[arg(long)]
        path_in: PathBuf,
        #[arg(long)]
        path_out: PathBuf,
        #[arg(long)]
        config: PathBuf,
        /// Emit the planned slots as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check that a code-pair table is consistent with the clinical roster
    CheckRoster {
        #[command(flatten)]
        roster: RosterOpts,
        /// Two-column table of session code pairs (headers on row 1)
        #[arg(long)]
        pair_table: PathBuf,
    },
    /// Assemble sourcedata/ by copying sub-<code> directories from archives
    CopySource {
        #[command(flatten)]
        roster: RosterOpts,
        /// Archive directories to search, in order of preference
        #[arg(long = "archive", required = true)]
        archives: Vec<PathBuf>,
        /// Destination sourcedata directory
        #[arg(long)]
        dest: PathBuf,
    },
    /// Parse a BIDS path into participant and session tokens
    Parse { path: String },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            roster,
            path_in,
            path_out,
            config,
            converter,
        } => run_convert(&roster, path_in, path_out, config, &converter)?,
        Commands::Plan {
            roster,
            path_in,
            path_out,
            config,
            json,
        } => run_plan(&roster, path_in, path_out, config, json)?,
        Commands::CheckRoster { roster, pair_table } => run_check(&roster, &pair_table)?,
        Commands::CopySource {
            roster,
            archives,
            dest,
        } => run_copy_source(&roster, &archives, &dest)?,
        Commands::Parse { path } => run_parse(&path)?,
    }

    Ok(())
}

fn run_convert(
    roster: &RosterOpts,
    path_in: PathBuf,
    path_out: PathBuf,
    config: PathBuf,
    converter: &str,
) -> Result<()> {
    // Structural checks come first so nothing is touched on a doomed run:
    // a missing converter or roster column aborts before the log is rotated.
    convert::ensure_converter_available(converter)?;
    let entries = roster.load()?;

    let ctx = PlanContext {
        path_in,
        path_out: path_out.clone(),
        config,
    };
    let mut log = RunLog::create(path_out.join("dcm2bids.log"))?;
    let summary = convert::run_batch(&entries, &ctx, converter, &mut log)?;

    // Individual job failures are in the log; the batch itself completed.
    println!(
        "Done: {} executed, {} skipped, {} missing source, {} failed (log: {})",
        summary.executed,
        summary.skipped,
        summary.missing_source,
        summary.failed,
        log.path().display()
    );
    Ok(())
}

fn run_plan(
    roster: &RosterOpts,
    path_in: PathBuf,
    path_out: PathBuf,
    config: PathBuf,
    json: bool,
) -> Result<()> {
    let entries = roster.load()?;
    let ctx = PlanContext {
        path_in,
        path_out,
        config,
    };
    let slots = plan::plan_roster(&entries, &ctx);

    if json {
        println!("{}", serde_json::to_string_pretty(&slots)?);
        return Ok(());
    }

    for slot in &slots {
        match slot {
            PlannedSlot::Convert(job) => {
                println!("convert   {} {}", job.participant, job.session);
            }
            PlannedSlot::AlreadyConverted {
                participant,
                session,
            } => {
                println!("skip      {participant} {session} (already exists)");
            }
            PlannedSlot::MissingSource {
                participant,
                session,
                source_dir,
            } => {
                println!(
                    "missing   {participant} {session} (no {})",
                    source_dir.display()
                );
            }
        }
    }
    println!("{} slots planned", slots.len());
    Ok(())
}

fn run_check(roster: &RosterOpts, pair_table: &Path) -> Result<()> {
    let report = check::cross_check(
        &roster.roster,
        pair_table,
        &roster.columns(),
        &roster.affirmative,
    )?;

    for (code1, code2) in &report.mismatches {
        println!("{code1} and {code2} are not in the clinical roster");
    }
    println!(
        "Checked {} pairs, {} mismatches",
        report.checked,
        report.mismatches.len()
    );
    Ok(())
}

fn run_copy_source(roster: &RosterOpts, archives: &[PathBuf], dest: &Path) -> Result<()> {
    let entries = roster.load()?;
    let mut log = RunLog::create(dest.join("copy_source_data.log"))?;
    let report = copy_source::assemble_sourcedata(&entries, archives, dest, &mut log)?;

    println!(
        "Done: {} copied, {} already present, {} missing (log: {})",
        report.copied.len(),
        report.already_present.len(),
        report.missing.len(),
        log.path().display()
    );
    Ok(())
}

fn run_parse(path: &str) -> Result<()> {
    let (participant, session) = identity::fetch_participant_and_session(path);
    println!("Participant: {}", or_none(&participant));
    println!("Session:     {}", or_none(&session));

    // Only label the slot when both tokens are present; an unmatched token is
    // a data-quality error and must surface, not default.
    if !participant.is_empty() && !session.is_empty() {
        let label = identity::session_label(&participant, &session)?;
        println!("Label:       {label}");
    }
    Ok(())
}

fn or_none(token: &str) -> &str {
    if token.is_empty() {
        "<none>"
    } else {
        token
    }
}
