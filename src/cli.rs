//! Command line interface.

use crate::config::loader::DEFAULT_SETTINGS_FILE;
use crate::error::AppError;
use clap::{App, Arg, ArgMatches};
use std::path::PathBuf;

pub mod id {
    pub const ARG_SETTINGS_FILE: &str = "SETTINGS_FILE";
    pub const ARG_CLEAN: &str = "clean";
    pub const ARG_VERBOSE: &str = "verbose";
}

pub fn cli() -> App<'static, 'static> {
    App::new("toolchain-bootstrap")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Downloads and builds a binutils + GCC cross toolchain (and NASM on Windows).")
        .arg(
            Arg::with_name(id::ARG_SETTINGS_FILE)
                .index(1)
                .help("Settings file (.toml, .json, .yml or .yaml)")
                .default_value(DEFAULT_SETTINGS_FILE),
        )
        .arg(
            Arg::with_name(id::ARG_CLEAN)
                .long("clean")
                .help("Remove the intermediate source and build directories, then exit"),
        )
        .arg(
            Arg::with_name(id::ARG_VERBOSE)
                .long("verbose")
                .short("v")
                .help("Echo configure and make output to the console"),
        )
}

/// What the user asked for on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOptions {
    pub settings_file: PathBuf,
    pub clean: bool,
    pub verbose: bool,
}

impl<'a> TryFrom<&'a ArgMatches<'a>> for CliOptions {
    type Error = AppError;

    fn try_from(matches: &'a ArgMatches<'a>) -> Result<Self, Self::Error> {
        let settings_file = matches
            .value_of(id::ARG_SETTINGS_FILE)
            .map(PathBuf::from)
            .ok_or_else(|| AppError::InvalidInput("no settings file given".to_string()))?;

        Ok(CliOptions {
            settings_file,
            clean: matches.is_present(id::ARG_CLEAN),
            verbose: matches.is_present(id::ARG_VERBOSE),
        })
    }
}
