use std::collections::HashSet;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::client::Job;
use crate::error::{Error, Result};

/// Upper bound on delete rounds in all mode.
pub const DEFAULT_MAX_PASSES: u64 = 100;

/// The two queue operations deletion needs.
#[async_trait(?Send)]
pub trait JobQueue {
    async fn list_jobs(&mut self) -> Result<Vec<Job>>;
    async fn delete_job(&mut self, id: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteMode {
    /// Keep listing and deleting until the queue is empty.
    All,
    /// Delete only the given job ids.
    Ids(Vec<String>),
}

impl DeleteMode {
    /// `--all` takes precedence over explicit ids.
    pub fn from_args(all: bool, ids: Vec<String>) -> Self {
        if all {
            if !ids.is_empty() {
                warn!(?ids, "ignoring job ids because --all was given");
            }
            Self::All
        } else {
            Self::Ids(ids)
        }
    }

    pub fn ensure_supported(&self) -> Result<()> {
        match self {
            Self::All => Ok(()),
            Self::Ids(_) => Err(Error::NotImplemented("deleting specific job ids")),
        }
    }
}

pub struct JobDeleter<'a, Q: ?Sized> {
    queue: &'a mut Q,
    max_passes: u64,
}

impl<'a, Q: JobQueue + ?Sized> JobDeleter<'a, Q> {
    pub fn new(queue: &'a mut Q) -> Self {
        Self {
            queue,
            max_passes: DEFAULT_MAX_PASSES,
        }
    }

    /// At most `max_passes` batches are deleted; one more listing then has to
    /// come back empty.
    pub fn max_passes(mut self, max_passes: u64) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// Returns the number of jobs deleted.
    pub async fn run(&mut self, mode: &DeleteMode) -> Result<usize> {
        mode.ensure_supported()?;
        self.delete_all().await
    }

    async fn delete_all(&mut self) -> Result<usize> {
        let mut deleted = HashSet::new();

        for pass in 1..=self.max_passes.saturating_add(1) {
            let jobs = self
                .queue
                .list_jobs()
                .await
                .map_err(|e| Error::ListJobs(Box::new(e)))?;
            if jobs.is_empty() {
                return Ok(deleted.len());
            }
            if pass > self.max_passes {
                break;
            }
            debug!(pass, count = jobs.len(), "listed jobs");

            for job in jobs {
                if deleted.contains(&job.id) {
                    debug!(id = %job.id, "job already deleted, skipping");
                    continue;
                }
                info!(
                    "Deleting job {}{}",
                    job.id,
                    job.title.as_deref().map(|t| format!(" ({t})")).unwrap_or_default()
                );
                self.queue
                    .delete_job(&job.id)
                    .await
                    .map_err(|e| Error::DeleteJob {
                        id: job.id.clone(),
                        source: Box::new(e),
                    })?;
                deleted.insert(job.id);
            }
        }

        Err(Error::PassLimit(self.max_passes))
    }
}
