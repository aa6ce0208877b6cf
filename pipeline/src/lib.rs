//! The four phases of a study run. Each phase reads the files written by the
//! phases before it and writes its own under the data directory.

pub mod analyze;
pub mod census;
pub mod official;
pub mod reddit;

#[cfg(test)]
mod tests;

pub use analyze::{run_analyze, AnalysisSummary};
pub use census::run_census;
pub use official::run_official;
pub use reddit::{run_reddit, CheckpointProgress, RedditSummary};

use dataset::DataPaths;
use reality_gap_core::{CoreError, Secrets, StudyConfig};
use std::fmt;
use std::time::Instant;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Official,
    Census,
    Reddit,
    Analyze,
}

impl Phase {
    /// Execution order when every phase runs.
    pub const ALL: [Phase; 4] = [Phase::Official, Phase::Census, Phase::Reddit, Phase::Analyze];

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Official => "official",
            Phase::Census => "census",
            Phase::Reddit => "reddit",
            Phase::Analyze => "analyze",
        }
    }

    /// Phases that call a remote API.
    pub fn needs_network(&self) -> bool {
        !matches!(self, Phase::Analyze)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub struct Pipeline {
    config: StudyConfig,
    secrets: Secrets,
    paths: DataPaths,
}

impl Pipeline {
    pub fn new(config: StudyConfig, secrets: Secrets) -> Self {
        let paths = DataPaths::new(config.data_dir.clone());
        Self {
            config,
            secrets,
            paths,
        }
    }

    pub fn config(&self) -> &StudyConfig {
        &self.config
    }

    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }

    /// Runs one phase inside its own span.
    pub async fn run(&self, phase: Phase) -> Result<(), CoreError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("phase", phase = phase.name(), run_id = %run_id);

        async {
            let started = Instant::now();
            info!("Starting {} phase, data dir {}", phase, self.paths.root().display());
            self.paths.ensure_dirs()?;

            match phase {
                Phase::Official => {
                    run_official(&self.config, &self.secrets, &self.paths).await?;
                }
                Phase::Census => {
                    run_census(&self.config, &self.secrets, &self.paths).await?;
                }
                Phase::Reddit => {
                    run_reddit(&self.config, &self.secrets, &self.paths).await?;
                }
                Phase::Analyze => {
                    run_analyze(&self.config, &self.paths)?;
                }
            }

            info!("{} phase finished in {:.1?}", phase, started.elapsed());
            Ok::<(), CoreError>(())
        }
        .instrument(span)
        .await
    }

    /// Runs the given phases in order, stopping at the first failure.
    pub async fn run_all(&self, phases: &[Phase]) -> Result<(), CoreError> {
        for phase in phases {
            self.run(*phase).await?;
        }
        Ok(())
    }
}
