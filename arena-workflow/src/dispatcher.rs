use arena_core::{
    BatchId, BatchRequest, BatchRun, Combination, CombinationOutcome, DispatchSettings,
    ProviderAdapter, ResultRecord,
};
use arena_providers::AdapterRegistry;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock, Semaphore};
use tokio::time::Instant;

const PROGRESS_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    Started,
    Completed,
    Failed,
}

/// Lifecycle event for one combination of a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinationProgress {
    pub batch_id: BatchId,
    pub index: usize,
    pub total: usize,
    pub combination: Combination,
    pub status: ProgressStatus,
    pub latency_ms: Option<u64>,
    pub message: Option<String>,
}

/// Fans a batch out over the registered adapters.
///
/// Every combination runs as its own tokio task. Outcomes come back in
/// combination order regardless of completion order, and a failing
/// combination never affects the others.
pub struct Dispatcher {
    registry: Arc<AdapterRegistry>,
    max_concurrency: Option<usize>,
    progress_tx: Arc<RwLock<Option<broadcast::Sender<CombinationProgress>>>>,
}

impl Dispatcher {
    pub fn new(registry: Arc<AdapterRegistry>, settings: &DispatchSettings) -> Self {
        Self {
            registry,
            max_concurrency: settings.max_concurrency,
            progress_tx: Arc::new(RwLock::new(None)),
        }
    }

    /// Bound the number of combinations in flight at once.
    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = Some(limit.max(1));
        self
    }

    pub fn registry(&self) -> &Arc<AdapterRegistry> {
        &self.registry
    }

    /// Enable progress tracking
    pub async fn enable_progress_tracking(&self) -> broadcast::Receiver<CombinationProgress> {
        let (tx, rx) = broadcast::channel(PROGRESS_CHANNEL_CAPACITY);
        *self.progress_tx.write().await = Some(tx);
        rx
    }

    /// Run every framework × model combination of the request.
    pub async fn run_batch(&self, request: &BatchRequest) -> BatchRun {
        let batch_id = BatchId::new();
        let started_at = Utc::now();
        let combinations = request.combinations();
        let total = combinations.len();

        tracing::info!(
            batch_id = %batch_id,
            combinations = total,
            max_concurrency = ?self.max_concurrency,
            "Starting batch"
        );

        let task: Arc<str> = Arc::from(request.task.as_str());
        let semaphore = self.max_concurrency.map(|limit| Arc::new(Semaphore::new(limit)));
        let progress = self.progress_tx.read().await.clone();

        let mut handles = Vec::with_capacity(total);
        for (index, combination) in combinations.iter().enumerate() {
            let adapter = self.registry.get(&combination.framework);
            let combination = combination.clone();
            let task = Arc::clone(&task);
            let semaphore = semaphore.clone();
            let progress = progress.clone();

            let handle = tokio::spawn(async move {
                // The semaphore is never closed, so a failed acquire cannot happen.
                let _permit = match semaphore {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };

                report(&progress, CombinationProgress {
                    batch_id,
                    index,
                    total,
                    combination: combination.clone(),
                    status: ProgressStatus::Started,
                    latency_ms: None,
                    message: None,
                });

                let start = Instant::now();
                let record = match adapter {
                    Some(adapter) => adapter.execute(&task, &combination.model).await,
                    None => ResultRecord::unavailable(format!(
                        "framework '{}' is not registered",
                        combination.framework
                    )),
                };
                let latency_ms = elapsed_ms(start);

                report(&progress, CombinationProgress {
                    batch_id,
                    index,
                    total,
                    combination,
                    status: if record.is_error() {
                        ProgressStatus::Failed
                    } else {
                        ProgressStatus::Completed
                    },
                    latency_ms: Some(latency_ms),
                    message: record.error.clone(),
                });

                (latency_ms, record)
            });

            handles.push(handle);
        }

        let mut outcomes = Vec::with_capacity(total);
        for (index, (combination, handle)) in combinations.into_iter().zip(handles).enumerate() {
            let (latency_ms, record) = match handle.await {
                Ok(settled) => settled,
                Err(e) => {
                    let message = format!("adapter task failed: {}", e);
                    tracing::warn!(
                        batch_id = %batch_id,
                        index,
                        combination = %combination,
                        "Combination aborted: {}",
                        e
                    );
                    report(&progress, CombinationProgress {
                        batch_id,
                        index,
                        total,
                        combination: combination.clone(),
                        status: ProgressStatus::Failed,
                        latency_ms: None,
                        message: Some(message.clone()),
                    });
                    (0, ResultRecord::unavailable(message))
                }
            };

            tracing::debug!(
                batch_id = %batch_id,
                index,
                combination = %combination,
                latency_ms,
                source = ?record.source,
                failed = record.is_error(),
                "Combination settled"
            );

            outcomes.push(CombinationOutcome {
                index,
                combination,
                latency_ms,
                record,
            });
        }

        let run = BatchRun {
            id: batch_id,
            task: request.task.clone(),
            started_at,
            completed_at: Utc::now(),
            outcomes,
        };

        tracing::info!(
            batch_id = %batch_id,
            combinations = total,
            failed = run.failed_count(),
            "Batch completed"
        );

        run
    }
}

fn report(
    progress: &Option<broadcast::Sender<CombinationProgress>>,
    event: CombinationProgress,
) {
    if let Some(tx) = progress {
        // No receivers is fine; observers are optional.
        let _ = tx.send(event);
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("max_concurrency", &self.max_concurrency)
            .finish_non_exhaustive()
    }
}
