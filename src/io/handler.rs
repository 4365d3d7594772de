use std::sync::Arc;

use log::{debug, error, info};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::{ActionResult, IoEvent, Operation, Outcome};
use crate::container_management::ContainerBackend;

/// Runs backend operations off the render loop.
///
/// Every operation gets its own task; nothing is pooled or queued and nothing
/// is cancelled. The result goes back through the one-shot slot the UI
/// created, and the UI alone decides whether it still matters.
pub struct IoAsyncHandler {
    backend: Arc<dyn ContainerBackend>,
}

impl IoAsyncHandler {
    pub fn new(backend: Arc<dyn ContainerBackend>) -> Self {
        Self { backend }
    }

    pub fn handle_io_event(&self, io_event: IoEvent) -> JoinHandle<()> {
        match io_event {
            IoEvent::Perform { operation, reply } => self.spawn_operation(operation, reply),
        }
    }

    fn spawn_operation(
        &self,
        operation: Operation,
        reply: oneshot::Sender<ActionResult>,
    ) -> JoinHandle<()> {
        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move {
            // Table loads happen on every rebuild; keep them out of the info log.
            if operation.is_listing() {
                debug!("Start {}", operation);
            } else {
                info!("Start {}", operation);
            }
            let result = perform(backend.as_ref(), &operation).await;
            match &result {
                Ok(_) => debug!("Finished {}", operation),
                Err(e) => error!("Failed to {}: {}", operation, e),
            }
            if reply.send(result).is_err() {
                info!("Nobody is waiting for the result of {} anymore", operation);
            }
        })
    }
}

/// Spawns the loop feeding dispatched events to a handler and returns its inbox.
pub fn spawn_handler(backend: Arc<dyn ContainerBackend>) -> mpsc::Sender<IoEvent> {
    let (io_tx, mut io_rx) = mpsc::channel::<IoEvent>(100);
    tokio::spawn(async move {
        let handler = IoAsyncHandler::new(backend);
        while let Some(io_event) = io_rx.recv().await {
            handler.handle_io_event(io_event);
        }
    });
    io_tx
}

pub async fn perform(backend: &dyn ContainerBackend, operation: &Operation) -> ActionResult {
    match operation {
        Operation::List => backend.list(true).await.map(Outcome::Containers),
        Operation::FilterByName(name) => backend
            .filter_by_name(name)
            .await
            .map(Outcome::Containers),
        Operation::FilterByStatus(status) => backend
            .filter_by_status(status)
            .await
            .map(Outcome::Containers),
        Operation::Start(id) => backend.start(id).await.map(|_| Outcome::Done),
        Operation::Stop(id) => backend.stop(id).await.map(|_| Outcome::Done),
        Operation::Restart(id) => backend.restart(id).await.map(|_| Outcome::Done),
        Operation::Pause(id) => backend.pause(id).await.map(|_| Outcome::Done),
        Operation::Unpause(id) => backend.unpause(id).await.map(|_| Outcome::Done),
        Operation::Remove(id) => backend.remove(id).await.map(|_| Outcome::Done),
        Operation::Exec { id, argv } => backend.exec(id, argv).await.map(|_| Outcome::Done),
        Operation::ShowLogs(id) => backend.stream_logs(id).await.map(|_| Outcome::Done),
        Operation::NetworkInfo(id) => backend.network_info(id).await.map(Outcome::Networks),
    }
}
