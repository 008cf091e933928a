//! Command-line configuration.
//!
//! `plc [--check] [--tokens] [--ast] <file>`

use std::path::PathBuf;

use thiserror::Error;

pub const USAGE: &str = "usage: plc [--check] [--tokens] [--ast] <file>";

/// How far through the pipeline a run goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Analyze, then interpret `main`
    Run,
    /// Stop after analysis
    Check,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub file: PathBuf,
    pub mode: Mode,
    /// Print every token before parsing
    pub dump_tokens: bool,
    /// Print the parsed tree before analysis
    pub dump_ast: bool,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no input file given")]
    MissingFile,
    #[error("unknown option {0:?}")]
    UnknownOption(String),
    #[error("unexpected argument {0:?}, only one input file is supported")]
    ExtraArgument(String),
}

impl Config {
    /// Parses the arguments following the program name.
    pub fn from_args<I, S>(args: I) -> Result<Config, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut file = None;
        let mut mode = Mode::Run;
        let mut dump_tokens = false;
        let mut dump_ast = false;

        for arg in args {
            let arg = arg.into();
            match arg.as_str() {
                "--check" => mode = Mode::Check,
                "--tokens" => dump_tokens = true,
                "--ast" => dump_ast = true,
                option if option.starts_with("--") => {
                    return Err(ConfigError::UnknownOption(arg));
                }
                _ if file.is_some() => return Err(ConfigError::ExtraArgument(arg)),
                _ => file = Some(PathBuf::from(arg)),
            }
        }

        Ok(Config {
            file: file.ok_or(ConfigError::MissingFile)?,
            mode,
            dump_tokens,
            dump_ast,
        })
    }
}
