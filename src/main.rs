use clap::{Parser, Subcommand};
use pipeline::{Phase, Pipeline};
use reality_gap_core::{
    ConfigError, CoreError, ErrorReporter, Secrets, StudyConfig, DEFAULT_SECRETS_FILE,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "reality_gap=info,reality_gap_core=info,pipeline=info,\
fred_client=info,census_client=info,reddit_client=info,sentiment_engine=info,dataset=info,\
gap_analysis=info,reporting=info";

/// Compares official labor statistics with job-distress signals from Reddit.
#[derive(Debug, Parser)]
#[command(name = "reality-gap", version, about)]
struct Cli {
    /// Study settings (TOML); `reality-gap.toml` is used when present
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// API credentials (JSON); environment variables of the same names win
    #[arg(long, global = true, default_value = DEFAULT_SECRETS_FILE)]
    secrets: PathBuf,

    /// Overrides the data directory from the settings
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum Command {
    /// Download the FRED unemployment baseline
    Official,
    /// Download the ACS degree-field and industry tables
    Census,
    /// Harvest and score Reddit posts, with subscriber counts
    Reddit,
    /// Build features, correlations and charts from the saved files
    Analyze,
    /// Run every phase in order
    All,
}

impl Command {
    fn phases(self) -> Vec<Phase> {
        match self {
            Command::Official => vec![Phase::Official],
            Command::Census => vec![Phase::Census],
            Command::Reddit => vec![Phase::Reddit],
            Command::Analyze => vec![Phase::Analyze],
            Command::All => Phase::ALL.to_vec(),
        }
    }
}

fn load_settings(cli: &Cli, phases: &[Phase]) -> Result<(StudyConfig, Secrets), ConfigError> {
    let mut config = StudyConfig::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.data_dir {
        config = config.with_data_dir(dir);
    }
    // Offline phases run without credentials
    let secrets = if phases.iter().any(Phase::needs_network) {
        Secrets::load(&cli.secrets)?
    } else {
        Secrets::default()
    };
    Ok((config, secrets))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let reporter = ErrorReporter::new();
    let phases = cli.command.phases();

    let (config, secrets) = match load_settings(&cli, &phases) {
        Ok(settings) => settings,
        Err(e) => {
            reporter.report_error(&CoreError::from(e));
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        "Reality gap study {} to {}, running {} phase(s)",
        config.window.start,
        config.window.end,
        phases.len()
    );

    let pipeline = Pipeline::new(config, secrets);
    match pipeline.run_all(&phases).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            reporter.report_error(&e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("reality-gap").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_all_runs_every_phase() {
        assert_eq!(cli(&["all"]).command.phases(), Phase::ALL.to_vec());
        assert_eq!(cli(&["census"]).command.phases(), vec![Phase::Census]);
    }

    #[test]
    fn test_analyze_ignores_unreadable_secrets() {
        let dir = tempfile::tempdir().unwrap();
        let secrets = dir.path().join("secrets.json");
        std::fs::write(&secrets, "not json").unwrap();
        let secrets = secrets.to_str().unwrap();

        let analyze = cli(&["--secrets", secrets, "--data-dir", "out", "analyze"]);
        let (config, loaded) = load_settings(&analyze, &analyze.command.phases()).unwrap();
        assert_eq!(loaded, Secrets::default());
        assert_eq!(config.data_dir, PathBuf::from("out"));

        let official = cli(&["--secrets", secrets, "official"]);
        assert!(matches!(
            load_settings(&official, &official.command.phases()),
            Err(ConfigError::InvalidFormat { .. })
        ));
    }
}
