// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::application::use_cases::analysis_use_case::AnalysisController;
use crate::utils::errors::{AnalysisError, WorkerError};
use crate::workers::worker::Worker;

/// 流水线触发工作器
///
/// 消费观察器发出的信号，每个信号执行一次观察器周期。
/// 周期与用户分析共用流水线运行锁，不会并发执行。
pub struct TriggerWorker {
    controller: Arc<AnalysisController>,
    triggers: Mutex<mpsc::Receiver<()>>,
    shutdown: CancellationToken,
}

impl TriggerWorker {
    pub fn new(
        controller: Arc<AnalysisController>,
        triggers: mpsc::Receiver<()>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            controller,
            triggers: Mutex::new(triggers),
            shutdown,
        }
    }
}

#[async_trait]
impl Worker for TriggerWorker {
    async fn run(&self) -> Result<(), WorkerError> {
        let mut triggers = self
            .triggers
            .try_lock()
            .map_err(|_| WorkerError::InternalError("trigger worker already running".into()))?;

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                signal = triggers.recv() => {
                    if signal.is_none() {
                        debug!("Trigger channel closed");
                        break;
                    }
                }
            }

            let cancel = self.shutdown.child_token();
            match self.controller.run_watcher_cycle(&cancel).await {
                Ok(report) => info!(
                    "Watcher cycle annotated {} of {} comments",
                    report.annotated, report.extracted
                ),
                Err(AnalysisError::EmptyInput) => debug!("No new comments to rate"),
                Err(AnalysisError::Canceled) => debug!("Watcher cycle canceled"),
                Err(e) => warn!("Watcher cycle failed: {}", e),
            }
        }

        info!("Trigger worker stopped");
        Ok(())
    }

    fn name(&self) -> &str {
        "trigger"
    }
}
