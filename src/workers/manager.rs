// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::use_cases::analysis_use_case::AnalysisController;
use crate::domain::models::analysis::WatcherState;
use crate::workers::trigger_worker::TriggerWorker;
use crate::workers::watcher::Watcher;
use crate::workers::worker::Worker;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// 工作管理器
///
/// 持有所有后台工作器的句柄和共享的关闭令牌
pub struct WorkerManager {
    shutdown: CancellationToken,
    handles: Vec<(String, JoinHandle<()>)>,
}

impl WorkerManager {
    pub fn new(shutdown: CancellationToken) -> Self {
        Self {
            shutdown,
            handles: Vec::new(),
        }
    }

    /// 在独立任务中运行一个工作器
    pub fn spawn<W: Worker + 'static>(&mut self, worker: W) {
        let name = worker.name().to_string();
        let task_name = name.clone();
        let handle = tokio::spawn(async move {
            if let Err(e) = worker.run().await {
                error!("Worker {} exited with error: {}", task_name, e);
            }
        });
        self.handles.push((name, handle));
    }

    /// 启动观察器及其触发工作器
    ///
    /// # 返回值
    ///
    /// 返回观察器状态的接收端，同时关联到控制器
    pub fn start_watcher(
        &mut self,
        controller: Arc<AnalysisController>,
    ) -> watch::Receiver<WatcherState> {
        let (tx, rx) = mpsc::channel(1);
        let document = controller.pipeline().document().clone();

        let (watcher, state) = Watcher::new(document, tx, self.shutdown.clone());
        controller.attach_watcher(state.clone());
        let trigger = TriggerWorker::new(controller, rx, self.shutdown.clone());

        self.spawn(watcher);
        self.spawn(trigger);
        state
    }

    /// 关闭所有工作器并等待其退出
    pub async fn shutdown(self) {
        info!("Shutting down workers...");
        self.shutdown.cancel();

        for (name, handle) in self.handles {
            if let Err(e) = handle.await {
                error!("Worker {} panicked: {}", name, e);
            }
        }

        info!("Workers shut down successfully");
    }
}
