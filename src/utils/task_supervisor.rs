use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Task Supervisor - Tracks the background tasks of one pipeline
///
/// ## Purpose
/// Owns the join handles of every spawned loop so the owner can wait for
/// all of them before releasing shared resources (e.g. closing output channels).
/// A task that panicked is logged, never propagated.
///
/// ## Usage
/// ```rust,ignore
/// let mut supervisor = TaskSupervisor::new();
///
/// supervisor.spawn("ingestion:binance", async move {
///     // task logic
/// });
///
/// // after cancellation
/// supervisor.join_all().await;
/// ```
pub struct TaskSupervisor {
    tasks: Vec<(String, JoinHandle<()>)>,
}

impl TaskSupervisor {
    pub fn new() -> Self {
        TaskSupervisor {
            tasks: Vec::new(),
        }
    }

    /// Spawn a new background task and register it
    pub fn spawn<F>(&mut self, name: impl Into<String>, future: F) -> &mut Self
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let handle = tokio::spawn(future);

        info!("Spawned background task: {}", name);
        self.tasks.push((name, handle));
        self
    }

    /// Get count of registered tasks
    pub fn active_task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Wait for every registered task to finish
    pub async fn join_all(&mut self) {
        let (names, handles): (Vec<_>, Vec<_>) = self.tasks.drain(..).unzip();

        for (name, result) in names.into_iter().zip(join_all(handles).await) {
            match result {
                Ok(()) => info!("Task {} completed", name),
                Err(e) => error!("Task {} failed: {:?}", name, e),
            }
        }
    }
}

impl Default for TaskSupervisor {
    fn default() -> Self {
        Self::new()
    }
}
