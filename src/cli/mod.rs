mod report;

pub use report::write_report;

use std::io::{self, Write};
use std::path::PathBuf;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};

use crate::config::{Config, ConfigOverrides, RunSettings};
use crate::services::{Pipeline, UnknownEndDatePolicy};

/// Subscription ledger aggregation and lookup
#[derive(Parser)]
#[command(name = "subtrack")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// User identifier to look up (exact match)
    user: Option<String>,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    options: RunOptions,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the query API over HTTP
    Serve {
        /// Address to bind (default from config, else 127.0.0.1:8000)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Launch the interactive dashboard
    Dashboard,
}

/// Options shared by every mode
#[derive(Args, Debug, Default)]
struct RunOptions {
    /// Data file (.json or .js) or directory of data files
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Config file (default: ~/.subtrack/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Reference date for due classification (YYYY-MM-DD or RFC 3339)
    #[arg(long, global = true)]
    today: Option<String>,

    /// Year assumed for month-day end dates such as 1月14日
    #[arg(long, global = true)]
    reference_year: Option<i32>,

    /// Size of the top-user ranking
    #[arg(long, global = true)]
    top: Option<usize>,

    /// Classification of records without a usable end date
    #[arg(long, global = true, value_enum)]
    unknown_end_date: Option<UnknownEndDatePolicy>,
}

impl RunOptions {
    /// Load the config file and apply command-line overrides.
    /// The clock is read here, once, and only if no reference date is set.
    fn settings(&self, bind: Option<String>) -> anyhow::Result<RunSettings> {
        let config = Config::load(self.config.as_deref())?;
        let overrides = ConfigOverrides {
            data_path: self.data.clone(),
            reference_date: self.today.clone(),
            reference_year: self.reference_year,
            top_n: self.top,
            unknown_end_date: self.unknown_end_date,
            bind_addr: bind,
        };
        Ok(config.resolve(overrides, Utc::now())?)
    }
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            None => {
                let settings = self.options.settings(None)?;
                let query = Pipeline::new(&settings).run(&settings.data_path)?;
                let stdout = io::stdout();
                let mut out = stdout.lock();
                write_report(&mut out, &query, self.user.as_deref(), self.json)?;
                out.flush()?;
                Ok(())
            }
            Some(Commands::Serve { bind }) => {
                let settings = self.options.settings(bind)?;
                let query = Pipeline::new(&settings).run(&settings.data_path)?;
                crate::server::run(&settings.bind_addr, query)
            }
            Some(Commands::Dashboard) => {
                let settings = self.options.settings(None)?;
                crate::tui::run(settings)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::try_parse_from(["subtrack"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.user.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn test_cli_parse_user_lookup() {
        let cli = Cli::try_parse_from(["subtrack", "13392776413"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.user.as_deref(), Some("13392776413"));
    }

    #[test]
    fn test_cli_parse_json_with_options() {
        let cli = Cli::try_parse_from([
            "subtrack",
            "--json",
            "--data",
            "feeds/data.js",
            "--today",
            "2026-02-17",
            "--top",
            "20",
            "--unknown-end-date",
            "due",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.options.data, Some(PathBuf::from("feeds/data.js")));
        assert_eq!(cli.options.today.as_deref(), Some("2026-02-17"));
        assert_eq!(cli.options.top, Some(20));
        assert_eq!(
            cli.options.unknown_end_date,
            Some(UnknownEndDatePolicy::Due)
        );
    }

    #[test]
    fn test_cli_parse_serve() {
        let cli = Cli::try_parse_from(["subtrack", "serve", "--bind", "0.0.0.0:9000"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Serve { bind: Some(ref b) }) if b == "0.0.0.0:9000"
        ));
    }

    #[test]
    fn test_cli_parse_global_options_after_subcommand() {
        let cli = Cli::try_parse_from(["subtrack", "dashboard", "--data", "data.js"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Dashboard)));
        assert_eq!(cli.options.data, Some(PathBuf::from("data.js")));
    }

    #[test]
    fn test_cli_rejects_bad_policy() {
        assert!(Cli::try_parse_from(["subtrack", "--unknown-end-date", "maybe"]).is_err());
    }

    #[test]
    fn test_settings_from_flags() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(&config_path, r#"{"top_n": 20}"#).unwrap();

        let options = RunOptions {
            config: Some(config_path),
            today: Some("2026-02-17".into()),
            ..RunOptions::default()
        };
        let settings = options.settings(None).unwrap();
        assert_eq!(settings.top_n, 20);
        assert_eq!(settings.reference_year, 2026);
    }
}
