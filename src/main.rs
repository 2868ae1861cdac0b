use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::fs;
use std::time::Instant;

use mdfence::canon::Canonicalizer;
use mdfence::config::{self, Config};
use mdfence::dedupe::{DedupeMode, dedupe_content};
use mdfence::exit_codes::exit;
use mdfence::files::find_markdown_files;
use mdfence::sqlfmt::format_sql_content;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Quiet mode
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Show detailed output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Command to run
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Remove duplicate fenced code blocks from Markdown files
    Dedupe {
        /// Files or directories to process.
        /// If omitted, the configured root directory is scanned.
        #[arg(required = false)]
        paths: Vec<String>,

        /// Remove duplicates anywhere in a file, not only adjacent ones
        #[arg(long)]
        aggressive: bool,

        /// Report whether changes would be made without writing anything
        #[arg(long)]
        check: bool,
    },

    /// Reformat SQL fenced code blocks in Markdown files
    FmtSql {
        /// Files or directories to process.
        /// If omitted, the configured root directory is scanned.
        #[arg(required = false)]
        paths: Vec<String>,

        /// Report whether changes would be made without writing anything
        #[arg(long)]
        check: bool,
    },

    /// Initialize a new configuration file
    Init,
}

/// Per-run accounting for the summary line.
#[derive(Default)]
struct RunStats {
    files_processed: usize,
    files_changed: usize,
    fences_affected: usize,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Commands::Init = cli.command {
        match config::create_default_config(config::DEFAULT_CONFIG_FILE) {
            Ok(()) => {
                if !cli.quiet {
                    println!("Created default configuration file: {}", config::DEFAULT_CONFIG_FILE);
                }
                return;
            }
            Err(e) => {
                eprintln!("{}: {}", "Error".red().bold(), e);
                exit::tool_error();
            }
        }
    }

    let config = match config::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            exit::tool_error();
        }
    };

    let result = match &cli.command {
        Commands::Dedupe {
            paths,
            aggressive,
            check,
        } => run_dedupe(&cli, &config, paths, *aggressive, *check),
        Commands::FmtSql { paths, check } => run_fmt_sql(&cli, &config, paths, *check),
        Commands::Init => return, // handled above
    };

    if let Err(e) = result {
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        exit::tool_error();
    }
}

fn run_dedupe(cli: &Cli, config: &Config, paths: &[String], aggressive: bool, check: bool) -> Result<()> {
    let file_paths = find_markdown_files(paths, config)?;
    if file_paths.is_empty() {
        if !cli.quiet {
            println!("No markdown files found to process.");
        }
        return Ok(());
    }

    let mode = if aggressive {
        DedupeMode::Aggressive
    } else {
        DedupeMode::Adjacent
    };
    let canon = Canonicalizer::new(&config.tools);

    let start_time = Instant::now();
    let mut stats = RunStats::default();

    for file_path in &file_paths {
        if cli.verbose && !cli.quiet {
            println!("Processing file: {file_path}");
        }

        let content = fs::read_to_string(file_path).with_context(|| format!("failed to read {file_path}"))?;
        let outcome = dedupe_content(&content, mode, &canon);
        stats.files_processed += 1;

        if outcome.changed {
            stats.files_changed += 1;
            stats.fences_affected += outcome.dropped;

            if !cli.quiet {
                let verb = if check { "would remove" } else { "removed" };
                let fence_text = if outcome.dropped == 1 { "fence" } else { "fences" };
                println!(
                    "{}: {} {} duplicate {}",
                    file_path.blue().underline(),
                    verb,
                    outcome.dropped,
                    fence_text
                );
            }

            if !check {
                fs::write(file_path, &outcome.text).with_context(|| format!("failed to write {file_path}"))?;
            }
        }
    }

    let duration_ms = elapsed_ms(start_time);

    if check && stats.files_changed > 0 {
        eprintln!("Duplicate code fences detected (would be removed).");
        exit::changes_needed();
    }

    if !cli.quiet {
        print_summary(&stats, "duplicate", "Removed", duration_ms);
    }

    Ok(())
}

fn run_fmt_sql(cli: &Cli, config: &Config, paths: &[String], check: bool) -> Result<()> {
    let file_paths = find_markdown_files(paths, config)?;
    if file_paths.is_empty() {
        if !cli.quiet {
            println!("No markdown files found to process.");
        }
        return Ok(());
    }

    let start_time = Instant::now();
    let mut stats = RunStats::default();

    for file_path in &file_paths {
        if cli.verbose && !cli.quiet {
            println!("Processing file: {file_path}");
        }

        let content = fs::read_to_string(file_path).with_context(|| format!("failed to read {file_path}"))?;
        let outcome = format_sql_content(&content);
        stats.files_processed += 1;

        if outcome.changed {
            stats.files_changed += 1;
            stats.fences_affected += outcome.reformatted;

            if !cli.quiet {
                let verb = if check { "would reformat" } else { "reformatted" };
                let fence_text = if outcome.reformatted == 1 { "fence" } else { "fences" };
                println!(
                    "{}: {} {} SQL {}",
                    file_path.blue().underline(),
                    verb,
                    outcome.reformatted,
                    fence_text
                );
            }

            if !check {
                fs::write(file_path, &outcome.text).with_context(|| format!("failed to write {file_path}"))?;
            }
        }
    }

    let duration_ms = elapsed_ms(start_time);

    if check && stats.files_changed > 0 {
        eprintln!("SQL fences need formatting.");
        exit::changes_needed();
    }

    if !cli.quiet {
        print_summary(&stats, "SQL", "Reformatted", duration_ms);
    }

    Ok(())
}

// Print the results summary for a completed run
fn print_summary(stats: &RunStats, fence_kind: &str, verb: &str, duration_ms: u64) {
    let file_text = if stats.files_processed == 1 { "file" } else { "files" };

    if stats.files_changed > 0 {
        let fence_text = if stats.fences_affected == 1 { "fence" } else { "fences" };
        println!(
            "\n{} {} {} {} {} in {}/{} {} ({}ms)",
            "Fixed:".green().bold(),
            verb,
            stats.fences_affected,
            fence_kind,
            fence_text,
            stats.files_changed,
            stats.files_processed,
            file_text,
            duration_ms
        );
    } else {
        println!(
            "\n{} No {} fences to fix in {} {} ({}ms)",
            "Success:".green().bold(),
            fence_kind,
            stats.files_processed,
            file_text,
            duration_ms
        );
    }
}

fn elapsed_ms(start_time: Instant) -> u64 {
    let duration = start_time.elapsed();
    duration.as_secs() * 1000 + u64::from(duration.subsec_millis())
}
