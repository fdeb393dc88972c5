//! Background task management for the scheduler.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::{Result, RuntimeError};
use crate::scheduler::Scheduler;

/// Owns the scheduler task and its shutdown signal.
pub struct Runtime {
    /// The scheduler driven by the background task.
    scheduler: Arc<Scheduler>,
    /// Handle to the scheduler task.
    handle: Option<JoinHandle<()>>,
    /// Shutdown signal sender.
    shutdown_tx: watch::Sender<bool>,
    /// Shutdown signal receiver (cloned into the task).
    shutdown_rx: watch::Receiver<bool>,
    /// Whether the runtime has been started.
    started: bool,
}

impl Runtime {
    pub fn new(scheduler: Arc<Scheduler>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Self {
            scheduler,
            handle: None,
            shutdown_tx,
            shutdown_rx,
            started: false,
        }
    }

    /// Seed the watermark and start ticking.
    pub async fn start(&mut self) -> Result<()> {
        if self.started {
            return Err(RuntimeError::AlreadyStarted);
        }

        info!("starting runtime");

        self.scheduler.seed_from_store().await?;

        let scheduler = Arc::clone(&self.scheduler);
        let shutdown_rx = self.shutdown_rx.clone();
        self.handle = Some(tokio::spawn(scheduler.run(shutdown_rx)));
        self.started = true;

        debug!("runtime started");

        Ok(())
    }

    /// Stop the scheduler and wait for its loop to exit.
    ///
    /// Ticks already in progress are left to finish on their own.
    pub async fn shutdown(&mut self) -> Result<()> {
        if !self.started {
            return Err(RuntimeError::NotStarted);
        }

        info!("shutting down runtime");

        self.shutdown_tx.send(true).map_err(|e| {
            RuntimeError::Shutdown(format!("failed to send shutdown signal: {}", e))
        })?;

        if let Some(handle) = self.handle.take() {
            debug!("waiting for scheduler to stop");
            handle.await.map_err(|e| {
                RuntimeError::Shutdown(format!("scheduler task panicked: {}", e))
            })?;
        }

        self.started = false;

        info!("runtime stopped");

        Ok(())
    }

    pub fn is_started(&self) -> bool {
        self.started
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        if self.started {
            let _ = self.shutdown_tx.send(true);
        }
    }
}
