// Do not make this public... We re-export as aliases to crate named err/res
mod args;
mod error;

pub use args::{Args, ColorMode, EventSelection, OutputFormat, parse_args};

pub use crate::error::{Error as CliError, Result as CliResult};
