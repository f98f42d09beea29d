//! Administrative CLI over a ledger snapshot file.
//!
//! Loads the snapshot named by `--state`, runs one command against it, and
//! writes the file back only when the command mutated something and
//! `--dry-run` was not given. Validation runs on every load, so a corrupted
//! or hand-edited file is rejected before any sweep touches it.

use agency_ledger_core::{
    compute_balance, expire_old_points, reset_for_new_cycle, scholarship_progress,
    update_statuses, LedgerState, ResetOptions, StateSnapshot,
};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process;

/// Agency ledger administration
#[derive(Parser)]
#[command(
    name = "agency-ledger",
    version,
    about = "Agency commission, payout, and scholarship ledger administration"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the ledger snapshot file
    #[arg(long, global = true, default_value = "ledger.json")]
    state: PathBuf,

    /// Run as of this date instead of today (YYYY-MM-DD)
    #[arg(long, global = true)]
    as_of: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Update cycle statuses and expire overdue points
    Sweep {
        /// Report what would change without writing the snapshot back
        #[arg(long)]
        dry_run: bool,
    },
    /// Annual reset: expire leftover points and unused awards
    ResetCycle {
        /// Report what would change without writing the snapshot back
        #[arg(long)]
        dry_run: bool,
        /// Bypass the December 1 calendar gate
        #[arg(long)]
        force: bool,
    },
    /// Print an agent's available and pending balances
    Balance { agent_id: String },
    /// Print an agent's scholarship progress per university and degree
    Progress { agent_id: String },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("{}: {}", "error".red().bold(), e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(&cli.state)
        .map_err(|e| format!("cannot read {}: {}", cli.state.display(), e))?;
    let mut state = StateSnapshot::from_json(&json)?.into_state()?;

    let today = cli.as_of.unwrap_or_else(|| Local::now().date_naive());
    let now = today.and_hms_opt(0, 0, 0).expect("midnight is always valid");

    match &cli.command {
        Commands::Sweep { dry_run } => {
            let sweep = update_statuses(&mut state, today);
            let expired = expire_old_points(&mut state, now);

            println!(
                "cycles: {} activated, {} closed",
                sweep.activated.to_string().green(),
                sweep.closed.to_string().yellow()
            );
            println!("points expired: {}", expired.to_string().yellow());

            let changed = sweep.activated + sweep.closed > 0 || expired > 0;
            save_unless_dry_run(cli, &state, changed, *dry_run)?;
        }
        Commands::ResetCycle { dry_run, force } => {
            let reset = reset_for_new_cycle(
                &mut state,
                today,
                ResetOptions {
                    // The library's own dry-run already skips the writes;
                    // piggyback on it so reporting matches a real run.
                    dry_run: *dry_run,
                    force: *force,
                },
            )?;

            println!(
                "points expired: {}",
                reset.points_expired.to_string().yellow()
            );
            println!(
                "awards expired: {}",
                reset.awards_expired.to_string().yellow()
            );

            let changed = reset.applied && (reset.points_expired + reset.awards_expired > 0);
            save_unless_dry_run(cli, &state, changed, *dry_run)?;
        }
        Commands::Balance { agent_id } => {
            let balance = compute_balance(&state, agent_id);
            println!(
                "available: {}",
                format_cents(balance.available).green().bold()
            );
            println!("pending:   {}", format_cents(balance.pending).yellow());
        }
        Commands::Progress { agent_id } => {
            let rows = scholarship_progress(&state, agent_id);
            if rows.is_empty() {
                println!("no scholarship activity for {}", agent_id);
                return Ok(());
            }
            println!(
                "{:<16} {:<12} {:>7} {:>10} {:>7} {:>7}",
                "university".bold(),
                "degree".bold(),
                "points".bold(),
                "progress".bold(),
                "avail".bold(),
                "total".bold()
            );
            for row in rows {
                println!(
                    "{:<16} {:<12} {:>3} / {:>2} {:>9.1}% {:>7} {:>7}",
                    row.university_id,
                    row.degree_id,
                    row.active_points,
                    row.threshold,
                    row.percent,
                    row.available_awards,
                    row.total_awards
                );
            }
        }
    }

    Ok(())
}

fn save_unless_dry_run(
    cli: &Cli,
    state: &LedgerState,
    changed: bool,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if dry_run {
        println!("{}", "dry run, snapshot not written".dimmed());
        return Ok(());
    }
    if !changed {
        println!("{}", "no changes".dimmed());
        return Ok(());
    }
    let json = StateSnapshot::from(state).to_json()?;
    std::fs::write(&cli.state, json)
        .map_err(|e| format!("cannot write {}: {}", cli.state.display(), e))?;
    println!("snapshot written to {}", cli.state.display());
    Ok(())
}

/// Format i64 cents as a dollar string.
fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.abs();
    format!("{}${}.{:02}", sign, abs / 100, abs % 100)
}
