//! Serialized write queue
//!
//! Spreadsheet imports and reporting syncs rewrite whole tables. They are
//! funneled through one worker so that at most one of them touches the
//! database at a time and they apply in the order they were submitted.
//!
//! Every job reports its own outcome back to its submitter. A job that
//! fails or panics never stops the queue.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;

use crate::error::{AppError, Result};

type Job = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Default number of jobs that may wait before `submit` applies backpressure
pub const DEFAULT_CAPACITY: usize = 256;

/// Cloneable handle to the single write worker
#[derive(Clone)]
pub struct WriteQueue {
    sender: Arc<Mutex<Option<mpsc::Sender<Job>>>>,
    worker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl WriteQueue {
    /// Start the worker. Must be called inside a tokio runtime.
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let worker = tokio::spawn(run_worker(receiver));

        Self {
            sender: Arc::new(Mutex::new(Some(sender))),
            worker: Arc::new(Mutex::new(Some(worker))),
        }
    }

    /// Queue a job and wait for its result.
    ///
    /// The job starts only after every previously submitted job settled.
    pub async fn submit<F, Fut, T>(&self, label: &'static str, job: F) -> Result<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let sender = self
            .sender
            .lock()
            .await
            .clone()
            .ok_or_else(shut_down_error)?;

        let (result_tx, result_rx) = oneshot::channel();
        let wrapped: Job = Box::pin(async move {
            tracing::debug!(job = label, "Write job started");
            let outcome = job().await;
            if let Err(e) = &outcome {
                tracing::warn!(job = label, error = %e, "Write job failed");
            }
            // The submitter may have gone away; the job still ran.
            let _ = result_tx.send(outcome);
        });

        sender.send(wrapped).await.map_err(|_| shut_down_error())?;
        drop(sender);

        result_rx
            .await
            .map_err(|_| AppError::Internal(format!("Write job '{}' aborted", label)))?
    }

    /// Stop accepting jobs, run everything already queued and wait for the worker
    pub async fn shutdown(&self) {
        self.sender.lock().await.take();

        let worker = self.worker.lock().await.take();
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                tracing::error!(error = %e, "Write queue worker ended abnormally");
            }
            tracing::info!("Write queue drained");
        }
    }

    pub async fn is_shut_down(&self) -> bool {
        self.sender.lock().await.is_none()
    }
}

async fn run_worker(mut receiver: mpsc::Receiver<Job>) {
    while let Some(job) = receiver.recv().await {
        // Each job runs on its own task so a panic stays contained
        if let Err(e) = tokio::spawn(job).await {
            tracing::error!(error = %e, "Write job panicked");
        }
    }
}

fn shut_down_error() -> AppError {
    AppError::ServiceUnavailable("Write queue is shut down".to_string())
}
