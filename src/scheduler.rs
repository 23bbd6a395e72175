// Named periodic background jobs.
//
// The reminder evaluation itself is a pure function of "today"; this module
// only supplies the trigger. One named job runs its ticks sequentially on a
// single spawned task, which is what makes runs non-overlapping — there is
// no cross-run locking to get wrong.
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// What to do when a job name is already registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistingJobPolicy {
    /// Keep the running job; the new registration is dropped.
    Keep,
    /// Cancel the running job and start the new one.
    Replace,
}

#[derive(Default)]
pub struct JobScheduler {
    jobs: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl JobScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `job` to run once now and then every `period`.
    ///
    /// Returns false when an existing registration under the same name was
    /// kept. A failing run is logged and the next period is unaffected; no
    /// failure state is persisted and nothing backs off.
    ///
    /// Must be called from within a tokio runtime.
    pub fn register<F>(
        &self,
        name: &str,
        period: Duration,
        policy: ExistingJobPolicy,
        job: F,
    ) -> bool
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let mut jobs = self.jobs.lock().unwrap();

        if let Some(handle) = jobs.get(name) {
            match policy {
                ExistingJobPolicy::Keep if !handle.is_finished() => return false,
                _ => handle.abort(),
            }
        }

        let job = Arc::new(job);
        let job_name = name.to_string();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let job = Arc::clone(&job);
                let name = job_name.clone();
                // Jobs do blocking file IO; keep them off the async workers.
                match tokio::task::spawn_blocking(move || job()).await {
                    Ok(Ok(())) => log::debug!("Scheduled job '{}' completed", name),
                    Ok(Err(e)) => log::warn!("Scheduled job '{}' failed: {:#}", name, e),
                    Err(e) => log::error!("Scheduled job '{}' panicked: {}", name, e),
                }
            }
        });
        jobs.insert(name.to_string(), handle);
        true
    }

    /// Cancels a named job. Returns whether one was registered.
    pub fn cancel(&self, name: &str) -> bool {
        match self.jobs.lock().unwrap().remove(name) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.jobs.lock().unwrap().contains_key(name)
    }

    /// Aborts every registered job.
    pub fn shutdown(&self) {
        let mut jobs = self.jobs.lock().unwrap();
        for (_, handle) in jobs.drain() {
            handle.abort();
        }
    }
}

impl Drop for JobScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}
