//! Supervised background workflows, at most one per environment.
//!
//! Each workflow runs in its own task wrapped by a watcher task. The watcher
//! turns errors and panics into `[FATAL]` status lines so nothing escapes
//! into the runtime.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use bottler_core::{ProvisionError, ProvisionResult, StatusTracker};
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Tracks the in-flight workflow of every environment.
pub struct WorkflowSupervisor {
    tasks: Mutex<HashMap<String, JoinHandle<()>>>,
    tracker: Arc<StatusTracker>,
}

impl WorkflowSupervisor {
    pub fn new(tracker: Arc<StatusTracker>) -> Self {
        Self {
            tasks: Mutex::new(HashMap::new()),
            tracker,
        }
    }

    /// Start `workflow` for `environment`.
    ///
    /// Fails with `AlreadyRunning` while a previous workflow for the same
    /// environment is unfinished; nothing is spawned in that case.
    pub fn spawn<F>(&self, environment: &str, workflow: &'static str, body: F) -> ProvisionResult<()>
    where
        F: Future<Output = ProvisionResult<()>> + Send + 'static,
    {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.retain(|_, handle| !handle.is_finished());
        if tasks.contains_key(environment) {
            return Err(ProvisionError::AlreadyRunning(environment.to_string()));
        }

        let tracker = Arc::clone(&self.tracker);
        let env = environment.to_string();
        let handle = tokio::spawn(async move {
            let outcome = tokio::spawn(body).await;
            match outcome {
                Ok(Ok(())) => debug!(environment = %env, workflow, "Workflow finished"),
                Ok(Err(e)) => {
                    error!(environment = %env, workflow, error = %e, "Workflow failed");
                    tracker.log(&env, format!("[FATAL] {workflow}: {e}"));
                }
                Err(join) if join.is_panic() => {
                    error!(environment = %env, workflow, "Workflow panicked");
                    tracker.log(&env, format!("[FATAL] {workflow}: workflow panicked"));
                }
                Err(_) => tracker.log(&env, format!("[FATAL] {workflow}: workflow cancelled")),
            }
        });
        tasks.insert(environment.to_string(), handle);
        Ok(())
    }

    /// True while a workflow for `environment` has not finished.
    pub fn is_active(&self, environment: &str) -> bool {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(environment)
            .is_some_and(|h| !h.is_finished())
    }

    /// Wait for the current workflow of `environment`, if any.
    pub async fn wait(&self, environment: &str) {
        let handle = self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(environment);
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::oneshot;

    fn always() -> bool {
        true
    }

    const fn done() -> ProvisionResult<()> {
        Ok(())
    }

    #[tokio::test]
    async fn test_single_flight_per_environment() {
        let tracker = Arc::new(StatusTracker::new());
        let sup = WorkflowSupervisor::new(Arc::clone(&tracker));
        let (tx, rx) = oneshot::channel::<()>();

        sup.spawn("game", "full_install", async move {
            let _ = rx.await;
            done()
        })
        .unwrap();
        assert!(sup.is_active("game"));

        let err = sup.spawn("game", "folder_import", async { done() }).unwrap_err();
        assert!(matches!(err, ProvisionError::AlreadyRunning(_)));
        // other environments are independent
        sup.spawn("other", "folder_import", async { done() }).unwrap();

        tx.send(()).unwrap();
        sup.wait("game").await;
        assert!(!sup.is_active("game"));
        sup.spawn("game", "finalize", async { done() }).unwrap();
    }

    #[tokio::test]
    async fn test_error_becomes_fatal_line() {
        let tracker = Arc::new(StatusTracker::new());
        let sup = WorkflowSupervisor::new(Arc::clone(&tracker));
        sup.spawn("game", "full_install", async {
            Err::<(), _>(ProvisionError::NotFound("/x/game.exe".to_string()))
        })
        .unwrap();
        sup.wait("game").await;
        let log = tracker.record("game").log;
        assert!(log.last().unwrap().ends_with("[FATAL] full_install: Not found: /x/game.exe"));
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let tracker = Arc::new(StatusTracker::new());
        let sup = WorkflowSupervisor::new(Arc::clone(&tracker));
        sup.spawn("game", "finalize", async {
            tokio::time::sleep(Duration::from_millis(1)).await;
            if always() {
                panic!("boom");
            }
            done()
        })
        .unwrap();
        sup.wait("game").await;
        assert!(tracker.record("game").log.last().unwrap().contains("[FATAL] finalize: workflow panicked"));
    }
}
