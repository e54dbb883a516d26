// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{build_controller, received_batches, start_rater};
use commentrs::domain::models::analysis::WatcherState;
use commentrs::engines::memory_document::MemoryDocument;
use commentrs::workers::manager::WorkerManager;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

async fn wait_for(state: &mut watch::Receiver<WatcherState>, wanted: WatcherState) {
    tokio::time::timeout(Duration::from_secs(5), state.wait_for(|s| *s == wanted))
        .await
        .expect("watcher state not reached")
        .expect("watcher dropped");
}

async fn wait_for_badges(document: &MemoryDocument, wanted: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while document.total_badges() < wanted {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("badges not written");
}

#[tokio::test]
async fn watcher_rates_comments_as_they_arrive() {
    let rater = start_rater().await;
    let document = Arc::new(MemoryDocument::new());
    let controller = build_controller(document.clone(), &rater.uri());

    let mut manager = WorkerManager::new(CancellationToken::new());
    let mut state = manager.start_watcher(controller.clone());
    wait_for(&mut state, WatcherState::WaitingForContainer).await;

    document.push_comments(["first comment"]);
    document.show_container();
    wait_for(&mut state, WatcherState::Active).await;
    wait_for_badges(&document, 1).await;

    document.push_comments(["second one here"]);
    wait_for_badges(&document, 2).await;

    // Badge writes mutate the container too; let those triggers drain.
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(document.total_badges(), 2);
    assert_eq!(document.summary().unwrap().count, 1);

    let batches = received_batches(&rater).await;
    assert_eq!(batches[0], vec!["first comment".to_string()]);
    assert_eq!(batches[1], vec!["second one here".to_string()]);
    assert_eq!(batches.len(), 2);

    manager.shutdown().await;
    assert_eq!(*state.borrow(), WatcherState::Disconnected);
}

#[tokio::test]
async fn missing_container_keeps_watcher_waiting() {
    let rater = start_rater().await;
    let document = Arc::new(MemoryDocument::new());
    let controller = build_controller(document.clone(), &rater.uri());

    let mut manager = WorkerManager::new(CancellationToken::new());
    let mut state = manager.start_watcher(controller.clone());
    wait_for(&mut state, WatcherState::WaitingForContainer).await;

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(*state.borrow(), WatcherState::WaitingForContainer);
    assert!(received_batches(&rater).await.is_empty());
    assert_eq!(
        controller.status().watcher,
        Some(WatcherState::WaitingForContainer)
    );

    manager.shutdown().await;
}
