// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::models::analysis::WatcherState;
use crate::engines::traits::{CommentDocument, DocumentEvent};
use crate::utils::errors::WorkerError;
use crate::workers::worker::Worker;

/// 评论容器观察器
///
/// 订阅页面事件：评论容器出现时进入 Active，之后每次结构变化都向
/// 触发通道发送一个信号。通道容量为 1，信号在满时直接丢弃，
/// 因此一串连续变化只会合并成一次流水线周期。
pub struct Watcher {
    document: Arc<dyn CommentDocument>,
    triggers: mpsc::Sender<()>,
    state: watch::Sender<WatcherState>,
    shutdown: CancellationToken,
}

impl Watcher {
    pub fn new(
        document: Arc<dyn CommentDocument>,
        triggers: mpsc::Sender<()>,
        shutdown: CancellationToken,
    ) -> (Self, watch::Receiver<WatcherState>) {
        let (state, rx) = watch::channel(WatcherState::Idle);
        (
            Self {
                document,
                triggers,
                state,
                shutdown,
            },
            rx,
        )
    }

    fn current(&self) -> WatcherState {
        *self.state.borrow()
    }

    fn set_state(&self, next: WatcherState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            debug!("Watcher state {:?} -> {:?}", previous, next);
        }
    }

    fn fire(&self) {
        match self.triggers.try_send(()) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(())) => debug!("Trigger coalesced"),
            Err(mpsc::error::TrySendError::Closed(())) => debug!("Trigger channel closed"),
        }
    }

    fn activate(&self) {
        info!("Comment container present, watching for changes");
        self.set_state(WatcherState::Active);
        self.fire();
    }

    fn on_event(&self, event: DocumentEvent) {
        match self.current() {
            WatcherState::WaitingForContainer => self.activate(),
            WatcherState::Active => {
                debug!("Document event {:?}", event);
                self.fire();
            }
            WatcherState::Idle | WatcherState::Disconnected => {}
        }
    }
}

#[async_trait]
impl Worker for Watcher {
    async fn run(&self) -> Result<(), WorkerError> {
        // Subscribe before checking so an appearance between the two is not lost.
        let mut events = match self.document.subscribe().await {
            Ok(events) => events,
            Err(e) => {
                self.set_state(WatcherState::Disconnected);
                return Err(e.into());
            }
        };
        self.set_state(WatcherState::WaitingForContainer);

        match self.document.container_present().await {
            Ok(true) => self.activate(),
            Ok(false) => info!("Waiting for comment container"),
            Err(e) => warn!("Container check failed, waiting for events: {}", e),
        }

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                event = events.next() => match event {
                    Some(event) => self.on_event(event),
                    None => {
                        warn!("Document event stream ended");
                        break;
                    }
                },
            }
        }

        self.set_state(WatcherState::Disconnected);
        info!("Watcher disconnected");
        Ok(())
    }

    fn name(&self) -> &str {
        "watcher"
    }
}
