//! Hand-rolled argument parsing for the two binaries.
//!
//! Arguments arrive as [`OsString`] so that input which is not UTF-8 reaches
//! the hash as the raw bytes the user typed.

use std::{ffi::OsString, path::PathBuf};

use collections::DictConfig;

use crate::HarnessError;

pub const WORD_DICT_USAGE: &str = "\
usage: word_dict <filename> [--size <size>] [--load <load_factor>] [--dump]
	This program will read lines one at a time from a file
	It will add each line as the keys and values of a new dictionary,
	print some statistics, the contents of the dictionary, and free it.
	With --dump, freed and removed values go to freed_words.txt and
	unloaded_words.txt.";

pub const DJB_HASH_USAGE: &str = "\
usage: djb_hash <string> [modulus]
       djb_hash [-m modulus] < lines";

/// Options of the `word_dict` harness
#[derive(Debug, Clone, PartialEq)]
pub struct WordDictArgs {
    pub filename: PathBuf,
    pub config: DictConfig,
    /// Write freed and removed values to side files
    pub dump: bool,
}

impl WordDictArgs {
    /// Parses everything after the program name.
    ///
    /// `--size`, `--load` and `--dump` may appear anywhere; any other argument
    /// is the filename, the last one winning.
    pub fn parse<I, T>(args: I) -> Result<Self, HarnessError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut config = DictConfig::default();
        let mut filename = None;
        let mut dump = false;
        let mut args = args.into_iter().map(Into::into);

        while let Some(arg) = args.next() {
            if arg == "--size" {
                config.initial_capacity = parse_value("--size", args.next())?;
            } else if arg == "--load" {
                config.load_factor = parse_value("--load", args.next())?;
            } else if arg == "--dump" {
                dump = true;
            } else {
                filename = Some(PathBuf::from(arg));
            }
        }

        let filename = filename.ok_or_else(|| HarnessError::Usage("missing filename".into()))?;
        config.validate()?;

        Ok(Self { filename, config, dump })
    }
}

/// What `djb_hash` was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashCommand {
    /// Hash a single argument, taken as its raw bytes
    One { input: Vec<u8>, modulus: Option<u64> },
    /// Hash every line of stdin
    Lines { modulus: Option<u64> },
}

impl HashCommand {
    pub fn parse<I, T>(args: I) -> Result<Self, HarnessError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        match args.as_slice() {
            [] => Ok(Self::Lines { modulus: None }),
            [flag, m] if flag == "-m" => Ok(Self::Lines {
                modulus: Some(parse_modulus(m)?),
            }),
            [input] => Ok(Self::One {
                input: input.as_encoded_bytes().to_vec(),
                modulus: None,
            }),
            [input, m] => Ok(Self::One {
                input: input.as_encoded_bytes().to_vec(),
                modulus: Some(parse_modulus(m)?),
            }),
            _ => Err(HarnessError::Usage("too many arguments".into())),
        }
    }
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: Option<OsString>) -> Result<T, HarnessError> {
    let value = value.ok_or_else(|| HarnessError::Usage(format!("{flag} needs a value")))?;
    value
        .to_str()
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| HarnessError::Usage(format!("invalid value '{}' for {flag}", value.to_string_lossy())))
}

fn parse_modulus(m: &OsString) -> Result<u64, HarnessError> {
    match m.to_str().map(str::parse::<i64>) {
        Some(Ok(n)) if n > 0 => Ok(n as u64),
        _ => Err(HarnessError::Usage(format!(
            "Error: invalid modulus {}",
            m.to_string_lossy()
        ))),
    }
}
