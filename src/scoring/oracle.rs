use anyhow::{anyhow, Result};
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;

use super::semantic::{EmbeddingOracle, SimilarityOracle};
use crate::error::SkipReason;
use crate::settings::Ml;
use crate::utils::{log_ml_error, log_ml_model_loaded, log_ml_ready, log_ml_step};

pub enum OracleRequest {
    Similarity {
        left: String,
        right: String,
        started_tx: oneshot::Sender<()>,
        response_tx: oneshot::Sender<Result<f32, String>>,
    },
}

/// Cheap, cloneable handle to the similarity oracle. The oracle itself is
/// loaded once and lives on its own worker thread.
#[derive(Clone)]
pub struct OracleHandle {
    request_tx: mpsc::Sender<OracleRequest>,
    timeout: Duration,
}

impl OracleHandle {
    /// Loads the configured sentence-embedding model and waits until it is
    /// ready to answer.
    pub async fn spawn(ml: &Ml) -> Result<Self> {
        let model = ml.model;
        Self::spawn_with(Duration::from_secs(ml.timeout_secs), move || {
            log_ml_step(&format!("Loading sentence embeddings model ({model})..."));
            let start = Instant::now();
            let oracle = EmbeddingOracle::load(model)?;
            log_ml_model_loaded(&model.to_string(), start.elapsed().as_secs_f32());
            Ok(oracle)
        })
        .await
    }

    /// Runs `load` on a fresh worker thread and serves requests from the
    /// oracle it returns. Fails if loading fails.
    pub async fn spawn_with<O, F>(timeout: Duration, load: F) -> Result<Self>
    where
        O: SimilarityOracle + 'static,
        F: FnOnce() -> Result<O> + Send + 'static,
    {
        let (request_tx, request_rx) = mpsc::channel::<OracleRequest>();
        let (ready_tx, ready_rx) = oneshot::channel::<Result<(), String>>();

        thread::spawn(move || match load() {
            Ok(oracle) => {
                let _ = ready_tx.send(Ok(()));
                run_oracle_worker(oracle, request_rx);
            }
            Err(e) => {
                let _ = ready_tx.send(Err(e.to_string()));
            }
        });

        match ready_rx.await {
            Ok(Ok(())) => {
                log_ml_ready();
                Ok(Self {
                    request_tx,
                    timeout,
                })
            }
            Ok(Err(msg)) => Err(anyhow!("Failed to load similarity model: {msg}")),
            Err(_) => Err(anyhow!("Similarity worker exited during start-up")),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn similarity(&self, left: String, right: String) -> Result<f32, SkipReason> {
        let (started_tx, started_rx) = oneshot::channel();
        let (response_tx, response_rx) = oneshot::channel();

        if self
            .request_tx
            .send(OracleRequest::Similarity {
                left,
                right,
                started_tx,
                response_tx,
            })
            .is_err()
        {
            log_ml_error("Worker channel closed");
            return Err(SkipReason::OracleFailure("worker channel closed".into()));
        }

        // The timeout covers the computation only, not time spent queued
        // behind an earlier request that is still running.
        if started_rx.await.is_err() {
            return Err(SkipReason::OracleFailure("worker dropped the request".into()));
        }

        match tokio::time::timeout(self.timeout, response_rx).await {
            Err(_) => Err(SkipReason::OracleTimeout),
            Ok(Err(_)) => Err(SkipReason::OracleFailure("worker dropped the request".into())),
            Ok(Ok(Err(msg))) => Err(SkipReason::OracleFailure(msg)),
            Ok(Ok(Ok(score))) if score.is_finite() && (0.0..=100.0).contains(&score) => Ok(score),
            Ok(Ok(Ok(score))) => Err(SkipReason::OracleFailure(format!(
                "score {score} outside 0-100"
            ))),
        }
    }
}

fn run_oracle_worker<O: SimilarityOracle>(mut oracle: O, request_rx: mpsc::Receiver<OracleRequest>) {
    for request in request_rx {
        let OracleRequest::Similarity {
            left,
            right,
            started_tx,
            response_tx,
        } = request;

        if response_tx.is_closed() || started_tx.send(()).is_err() {
            continue;
        }

        let result = panic::catch_unwind(AssertUnwindSafe(|| oracle.similarity(&left, &right)))
            .unwrap_or_else(|_| Err(anyhow!("similarity computation panicked")))
            .map_err(|e| e.to_string());

        let _ = response_tx.send(result);
    }
}
