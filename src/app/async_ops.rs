//! Async operations for the TUI
//!
//! Uses channels to communicate between the sync TUI loop and the worker
//! that plays the part of the remote API.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::demo::DemoSource;
use crate::feed::{FeedPage, LoadRequest, PendingMutation};

/// Simulated round-trip latency
const LATENCY: Duration = Duration::from_millis(150);

/// Commands sent from the TUI to the async worker
#[derive(Debug, Clone)]
pub enum AsyncCommand {
    /// Fetch a feed page
    LoadPage { request: LoadRequest },
    /// Persist an optimistic mutation
    Mutate { mutation: PendingMutation },
    /// Shutdown the worker
    Shutdown,
}

/// Results sent back from the async worker to the TUI
#[derive(Debug)]
pub enum AsyncResult {
    /// A page arrived
    PageLoaded { request: LoadRequest, page: FeedPage },
    /// A page request failed
    LoadFailed {
        request: LoadRequest,
        message: String,
    },
    /// Mutation accepted
    MutationConfirmed { mutation: PendingMutation },
    /// Mutation rejected; the TUI rolls it back
    MutationFailed {
        mutation: PendingMutation,
        message: String,
    },
}

/// Channel handles for communicating with the async worker
pub struct AsyncHandle {
    /// Send commands to the worker
    pub cmd_tx: mpsc::Sender<AsyncCommand>,
    /// Receive results from the worker
    pub result_rx: mpsc::Receiver<AsyncResult>,
}

/// Spawn the async worker and return handles
pub fn spawn_worker(source: DemoSource) -> AsyncHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<AsyncCommand>(32);
    let (result_tx, result_rx) = mpsc::channel::<AsyncResult>(32);
    let source = Arc::new(source);

    tokio::spawn(async move {
        while let Some(cmd) = cmd_rx.recv().await {
            match cmd {
                AsyncCommand::Shutdown => break,
                AsyncCommand::LoadPage { request } => {
                    let source = Arc::clone(&source);
                    let result_tx = result_tx.clone();
                    tokio::spawn(async move {
                        handle_load(&result_tx, &source, request).await;
                    });
                }
                AsyncCommand::Mutate { mutation } => {
                    let source = Arc::clone(&source);
                    let result_tx = result_tx.clone();
                    tokio::spawn(async move {
                        handle_mutation(&result_tx, &source, mutation).await;
                    });
                }
            }
        }
        tracing::debug!("async worker stopped");
    });

    AsyncHandle { cmd_tx, result_rx }
}

async fn handle_load(
    result_tx: &mpsc::Sender<AsyncResult>,
    source: &DemoSource,
    request: LoadRequest,
) {
    tokio::time::sleep(LATENCY).await;
    let result = match source.fetch(&request) {
        Ok(page) => AsyncResult::PageLoaded { request, page },
        Err(e) => AsyncResult::LoadFailed {
            request,
            message: e.to_string(),
        },
    };
    let _ = result_tx.send(result).await;
}

async fn handle_mutation(
    result_tx: &mpsc::Sender<AsyncResult>,
    source: &DemoSource,
    mutation: PendingMutation,
) {
    tokio::time::sleep(LATENCY).await;
    let result = match source.submit(&mutation) {
        Ok(()) => AsyncResult::MutationConfirmed { mutation },
        Err(e) => AsyncResult::MutationFailed {
            mutation,
            message: e.to_string(),
        },
    };
    let _ = result_tx.send(result).await;
}
