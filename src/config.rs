use anyhow::Result;
use clap::ValueEnum;
use std::path::PathBuf;

const DATA_FILE_NAME: &str = "transactions.json";

/// What to do when the persisted transactions can't be parsed at startup.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CorruptStatePolicy {
    /// Refuse to start, leaving the file untouched.
    #[default]
    Abort,
    /// Move the file aside to `<file>.corrupt` and start with no transactions.
    StartEmpty,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data_file: PathBuf,
    pub on_corrupt: CorruptStatePolicy,
}

impl Config {
    pub fn new(data_file: Option<PathBuf>, on_corrupt: CorruptStatePolicy) -> Result<Config> {
        let data_file = match data_file {
            Some(path) => path,
            None => thrifty_data_dir()?.join(DATA_FILE_NAME),
        };
        Ok(Config {
            data_file,
            on_corrupt,
        })
    }
}

#[cfg(not(debug_assertions))]
fn thrifty_data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .ok_or(anyhow::anyhow!("can't determine data dir"))
        .map(|d| d.join("Thrifty"))
}

#[cfg(debug_assertions)]
fn thrifty_data_dir() -> Result<PathBuf> {
    use std::env;
    Ok(env::temp_dir().join("Thrifty"))
}

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn explicit_data_file_wins() {
        let config = Config::new(Some(PathBuf::from("/x/y.json")), CorruptStatePolicy::Abort)
            .unwrap();
        assert_eq!(config.data_file, PathBuf::from("/x/y.json"));
    }

    #[test]
    fn default_data_file() {
        let config = Config::new(None, CorruptStatePolicy::default()).unwrap();
        assert!(config.data_file.ends_with("Thrifty/transactions.json"));
        assert_eq!(config.on_corrupt, CorruptStatePolicy::Abort);
    }

    #[test]
    fn policy_names() {
        assert_eq!(
            CorruptStatePolicy::from_str("start-empty", true).unwrap(),
            CorruptStatePolicy::StartEmpty
        );
        assert_eq!(
            CorruptStatePolicy::from_str("abort", true).unwrap(),
            CorruptStatePolicy::Abort
        );
    }
}
