use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use log::trace;
use tokio::sync::mpsc;

use crate::error::{Error, Result};

/// One queued background action: an application callback or other work that
/// must observe the connection's event order.
pub(crate) struct Operation {
    func: Box<dyn (FnOnce() -> Pin<Box<dyn Future<Output = ()> + Send + 'static>>) + Send + Sync>,
    name: &'static str,
}

impl Operation {
    pub(crate) fn new(
        func: impl (FnOnce() -> Pin<Box<dyn Future<Output = ()> + Send + 'static>>)
            + Send
            + Sync
            + 'static,
        name: &'static str,
    ) -> Self {
        Operation {
            func: Box::new(func),
            name,
        }
    }
}

/// The serialized queue of background actions.
///
/// A single worker task drains the queue and runs each action to completion
/// before the next, so application callbacks are observed in the order their
/// triggering events arrived. The queue is unbounded: enqueueing from the
/// network manager's context never blocks behind a slow callback.
pub(crate) struct Operations {
    ops_tx: Mutex<Option<mpsc::UnboundedSender<Operation>>>,
}

impl Operations {
    /// Starts the worker on the current tokio runtime.
    pub(crate) fn new() -> Self {
        let (ops_tx, mut ops_rx) = mpsc::unbounded_channel::<Operation>();

        tokio::spawn(async move {
            while let Some(op) = ops_rx.recv().await {
                trace!("running op: {}", op.name);
                (op.func)().await;
            }
        });

        Operations {
            ops_tx: Mutex::new(Some(ops_tx)),
        }
    }

    /// Enqueues an action for the worker. Fails once the queue is closed.
    pub(crate) fn enqueue(&self, op: Operation) -> Result<()> {
        let ops_tx = self.ops_tx.lock().unwrap();
        match &*ops_tx {
            Some(tx) => tx.send(op).map_err(|_| Error::ErrConnectionClosed),
            None => Err(Error::ErrConnectionClosed),
        }
    }

    /// Closes the queue. In-flight work drains; later enqueues fail.
    pub(crate) fn close(&self) {
        let mut ops_tx = self.ops_tx.lock().unwrap();
        ops_tx.take();
    }
}
