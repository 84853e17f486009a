use std::path::PathBuf;
use serde::Deserialize;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "Wavspool")]
#[command(about = "Spool a chunked WAV capture to disk and emit a correctly framed file")]
#[command(author, version, long_about = None)]
pub struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replay a WAV file through a capture session chunk by chunk
    Capture {
        /// Size of every chunk, the first one carries the header
        #[arg(short = 's', long, default_value_t = 8044)]
        chunk_size: usize,

        /// The file to replay
        file: PathBuf,
    },

    /// Rewrite the length fields of an accumulated raw capture
    Fix {
        src: PathBuf,
        dst: PathBuf,
    },

    /// Print the header of a WAV file
    Inspect {
        file: PathBuf,
    },
}

pub const DEFAULT_CONFIG: &str = r#"
    spool_dir = "./tmp"
    save_dir = "./saved_wavs"
"#;

// Configuration, handed around explicitly, never global
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    // Raw chunks accumulate here, one file per session
    pub spool_dir: PathBuf,

    // Finalized artifacts
    pub save_dir: PathBuf,
}

impl Config {
    pub fn load(path: Option<&PathBuf>) -> Result<Config, Box<dyn std::error::Error>> {
        let config: Config = match path {
            None => toml::from_str(DEFAULT_CONFIG)?,
            Some(p) => toml::from_str(&std::fs::read_to_string(p)?)?,
        };
        Ok(config)
    }
}

#[cfg(test)]
mod test_config {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::load(None).unwrap();

        assert_eq!(config.spool_dir, PathBuf::from("./tmp"));
        assert_eq!(config.save_dir, PathBuf::from("./saved_wavs"));
    }

    #[test]
    fn config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wavspool.toml");
        std::fs::write(&path, "spool_dir = \"/var/spool/wav\"\nsave_dir = \"/srv/wav\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(config.spool_dir, PathBuf::from("/var/spool/wav"));
        assert_eq!(config.save_dir, PathBuf::from("/srv/wav"));
    }

    #[test]
    fn config_missing_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wavspool.toml");
        std::fs::write(&path, "spool_dir = \"/tmp\"\n").unwrap();

        assert!(Config::load(Some(&path)).is_err());
    }
}
