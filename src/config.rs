use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Carbon emissions estimator and report generator", long_about = None)]
pub struct Cli {
    /// Activity CSV loaded by menu option [1]
    #[arg(long, default_value = "activities.csv")]
    pub data: PathBuf,

    /// Bundled sample dataset loaded by menu option [2]
    #[arg(long, default_value = "data/sample_activities.csv")]
    pub sample: PathBuf,

    /// Storage file holding saved calculations
    #[arg(long, default_value = "carbon_storage.json")]
    pub storage: PathBuf,

    /// Directory the report CSV/JSON files are written to
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_path: PathBuf,
    pub sample_path: PathBuf,
    pub storage_path: PathBuf,
    pub out_dir: PathBuf,
    pub log_level: &'static str,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        let log_level = match cli.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        Self {
            data_path: cli.data,
            sample_path: cli.sample,
            storage_path: cli.storage,
            out_dir: cli.out_dir,
            log_level,
        }
    }
}
