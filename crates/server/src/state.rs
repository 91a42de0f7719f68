use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use mediaforge_core::{Config, MediaToolkit};

use crate::api::WsBroadcaster;

/// Lifecycle of a background compression job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum JobState {
    Running,
    Completed { output_size_bytes: u64 },
    Failed { error: String },
}

/// A compression job started through the API.
#[derive(Debug, Clone, Serialize)]
pub struct CompressionJob {
    pub job_id: String,
    pub chat_id: String,
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(flatten)]
    pub state: JobState,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Shared application state
pub struct AppState {
    config: Config,
    toolkit: Arc<dyn MediaToolkit>,
    ws_broadcaster: WsBroadcaster,
    jobs: RwLock<HashMap<String, CompressionJob>>,
}

impl AppState {
    pub fn new(
        config: Config,
        toolkit: Arc<dyn MediaToolkit>,
        ws_broadcaster: WsBroadcaster,
    ) -> Self {
        Self {
            config,
            toolkit,
            ws_broadcaster,
            jobs: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn toolkit(&self) -> &Arc<dyn MediaToolkit> {
        &self.toolkit
    }

    pub fn ws_broadcaster(&self) -> &WsBroadcaster {
        &self.ws_broadcaster
    }

    /// Registers a new running job, dropping finished jobs past retention.
    pub async fn insert_job(&self, job: CompressionJob) {
        let cutoff = i64::try_from(self.config.server.job_retention_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|retention| Utc::now().checked_sub_signed(retention))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, j| j.finished_at.is_none_or(|at| at > cutoff));
        let pruned = before - jobs.len();
        if pruned > 0 {
            debug!(pruned, "Pruned finished compression jobs");
        }
        jobs.insert(job.job_id.clone(), job);
    }

    /// Marks a job as finished with the given state.
    pub async fn finish_job(&self, job_id: &str, state: JobState) {
        if let Some(job) = self.jobs.write().await.get_mut(job_id) {
            job.state = state;
            job.finished_at = Some(Utc::now());
        }
    }

    pub async fn job(&self, job_id: &str) -> Option<CompressionJob> {
        self.jobs.read().await.get(job_id).cloned()
    }

    /// Number of jobs still running.
    pub async fn running_jobs(&self) -> usize {
        self.jobs
            .read()
            .await
            .values()
            .filter(|j| j.state == JobState::Running)
            .count()
    }
}
