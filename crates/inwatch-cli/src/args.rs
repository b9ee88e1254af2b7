use std::path::PathBuf;

use clap::Parser;
use inwatch_channel::{DEFAULT_READ_BUFFER, InitFlags, WatchMask};

use crate::error::{Error, Result};

// ============================================================================
// Output Format Options
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(Error::UnknownFormat(other.to_string())),
        }
    }
}

// ============================================================================
// Color Mode Options
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

impl std::str::FromStr for ColorMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorMode::Auto),
            "always" => Ok(ColorMode::Always),
            "never" => Ok(ColorMode::Never),
            other => Err(Error::UnknownColorMode(other.to_string())),
        }
    }
}

// ============================================================================
// Event Selection
// ============================================================================

/// Comma-separated event names, e.g. `create,delete,moved_to` or `all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventSelection(pub WatchMask);

impl std::str::FromStr for EventSelection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut mask = WatchMask::empty();

        for name in s.split(',').map(str::trim).filter(|name| !name.is_empty()) {
            let upper = match name.to_uppercase() {
                all if all == "ALL" => "ALL_EVENTS".to_string(),
                other => other,
            };
            let flag = WatchMask::from_name(&upper).ok_or_else(|| Error::UnknownEvent(name.to_string()))?;
            if !WatchMask::ALL_EVENTS.contains(flag) {
                return Err(Error::NotAnEvent(name.to_string()));
            }
            mask |= flag;
        }

        if mask.is_empty() {
            return Err(Error::EmptyEventList);
        }
        Ok(EventSelection(mask))
    }
}

/// inwatch - print filesystem events for a set of paths
///
/// Opens one inotify channel, registers every path with the same event mask
/// and prints each decoded event until interrupted.
#[derive(Parser, Debug)]
#[command(name = "inwatch")]
#[command(about = "Watch paths for filesystem events through inotify")]
pub struct Args {
    // ========================================================================
    // Watch Options
    // ========================================================================

    /// Files or directories to watch
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Events to report: comma-separated names (create, delete, moved_from, ...) or all
    #[arg(short, long, default_value = "all")]
    pub events: EventSelection,

    /// Drop each watch after its first event
    #[arg(long)]
    pub oneshot: bool,

    /// Refuse paths that are not directories
    #[arg(long)]
    pub only_dir: bool,

    /// Watch symbolic links themselves instead of their targets
    #[arg(long)]
    pub no_follow: bool,

    /// Ignore children after they are unlinked from a watched directory
    #[arg(long)]
    pub excl_unlink: bool,

    // ========================================================================
    // Reading Options
    // ========================================================================

    /// Open the channel non-blocking and poll
    #[arg(short, long)]
    pub nonblock: bool,

    /// Exit after this many events
    #[arg(short, long)]
    pub count: Option<usize>,

    /// Bytes requested per read (raised to one maximal record if smaller)
    #[arg(long, default_value_t = DEFAULT_READ_BUFFER)]
    pub buffer_size: usize,

    // ========================================================================
    // Output & Display Options
    // ========================================================================

    /// Output format: text or json
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Color output: auto, always, never
    #[arg(long, default_value = "auto")]
    pub color: ColorMode,

    // ========================================================================
    // Debugging & Diagnostics
    // ========================================================================

    /// Log channel activity (overridden by RUST_LOG)
    #[arg(long)]
    pub debug: bool,
}

pub fn parse_args() -> Args {
    Args::parse()
}

impl Args {
    /// Event selection combined with the watch option flags.
    pub fn watch_mask(&self) -> WatchMask {
        let mut mask = self.events.0;
        mask.set(WatchMask::ONESHOT, self.oneshot);
        mask.set(WatchMask::ONLYDIR, self.only_dir);
        mask.set(WatchMask::DONT_FOLLOW, self.no_follow);
        mask.set(WatchMask::EXCL_UNLINK, self.excl_unlink);
        mask
    }

    pub fn init_flags(&self) -> InitFlags {
        let mut flags = InitFlags::CLOSE_ON_EXEC;
        flags.set(InitFlags::NONBLOCKING, self.nonblock);
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_selection_parses_names_and_aggregates() {
        let selection: EventSelection = "create, Delete,move".parse().unwrap();
        assert_eq!(selection.0, WatchMask::CREATE | WatchMask::DELETE | WatchMask::MOVE);

        let all: EventSelection = "all".parse().unwrap();
        assert_eq!(all.0, WatchMask::ALL_EVENTS);
    }

    #[test]
    fn test_event_selection_rejects_bad_input() {
        assert!(matches!("bogus".parse::<EventSelection>(), Err(Error::UnknownEvent(_))));
        assert!(matches!("oneshot".parse::<EventSelection>(), Err(Error::NotAnEvent(_))));
        assert!(matches!(" , ".parse::<EventSelection>(), Err(Error::EmptyEventList)));
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["inwatch", "/tmp"]).unwrap();
        assert_eq!(args.paths, vec![PathBuf::from("/tmp")]);
        assert_eq!(args.watch_mask(), WatchMask::ALL_EVENTS);
        assert_eq!(args.init_flags(), InitFlags::CLOSE_ON_EXEC);
        assert_eq!(args.format, OutputFormat::Text);
        assert_eq!(args.buffer_size, DEFAULT_READ_BUFFER);
        assert!(args.count.is_none());
    }

    #[test]
    fn test_watch_options_and_nonblock() {
        let args = Args::try_parse_from([
            "inwatch", "-e", "create", "--oneshot", "--only-dir", "-n", "-c", "3", "--format", "json", "/a", "/b",
        ])
        .unwrap();

        assert_eq!(args.paths.len(), 2);
        assert_eq!(args.watch_mask(), WatchMask::CREATE | WatchMask::ONESHOT | WatchMask::ONLYDIR);
        assert!(args.init_flags().contains(InitFlags::NONBLOCKING));
        assert_eq!(args.count, Some(3));
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_paths_are_required() {
        assert!(Args::try_parse_from(["inwatch"]).is_err());
    }
}
