mod output;
mod session;

use std::io::Write;
use std::time::Instant;

use anyhow::{Context, Result};
use inwatch_cli::{ColorMode, OutputFormat};
use session::Session;

fn main() -> Result<()> {
    let program_start = Instant::now();

    // ========================================================================
    // Parse Command-Line Arguments
    // ========================================================================

    let args = inwatch_cli::parse_args();
    init_logging(args.debug);

    // ========================================================================
    // Determine Color Output Settings
    // ========================================================================

    let use_colors = match args.color {
        ColorMode::Auto => atty::is(atty::Stream::Stdout),
        ColorMode::Always => true,
        ColorMode::Never => false,
    };
    colored::control::set_override(use_colors);

    // ========================================================================
    // Open Channel & Register Watches
    // ========================================================================

    let mut session = Session::open(args.init_flags(), args.buffer_size)?;
    let mask = args.watch_mask();
    for path in &args.paths {
        session.watch(path, mask)?;
    }

    // ========================================================================
    // Read & Print Events
    // ========================================================================

    let stdout = std::io::stdout();
    let total = session.run(args.count, |record| {
        let line = match args.format {
            OutputFormat::Text => record.to_text(use_colors),
            OutputFormat::Json => record.to_json().context("Failed to serialize event")?,
        };
        let mut out = stdout.lock();
        writeln!(out, "{line}")?;
        out.flush()?;
        Ok(())
    })?;

    // ========================================================================
    // Debug Output (Final Summary)
    // ========================================================================

    if args.debug {
        print_debug_summary(&session.stats, total, program_start.elapsed());
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise `--debug` selects debug, else warnings only.
fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();
}

/// Print formatted debug summary
fn print_debug_summary(stats: &session::SessionStats, total: usize, elapsed: std::time::Duration) {
    eprintln!("\n{}", "=".repeat(50));
    eprintln!("{:^50}", "SESSION SUMMARY");
    eprintln!("{}", "=".repeat(50));

    eprintln!("{:<30} {}", "Events Printed:", total);
    eprintln!("{:<30} {}", "Reads:", stats.reads);
    eprintln!("{:<30} {}", "Empty Non-Blocking Reads:", stats.would_block);
    eprintln!("{:<30} {}", "Interrupted Reads:", stats.interrupted);
    eprintln!("{:<30} {:.3}s", "Total Time:", elapsed.as_secs_f64());

    eprintln!("{}", "=".repeat(50));
}
