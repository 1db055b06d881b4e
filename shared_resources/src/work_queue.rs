//! Per-link FIFO work queue drained by one dedicated worker thread.

use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, error, warn};

use crate::error::{HandlerError, WorkQueueError};
use crate::links::Subsystem;
use crate::message::Message;

/// Consumer side of a [`MessageWorkQueue`]. Called from the worker thread only,
/// one message at a time and in enqueue order.
pub trait MessageHandler: Send + 'static {
    fn handle_message(&mut self, message: Message) -> Result<(), HandlerError>;
}

impl<F> MessageHandler for F
where
    F: FnMut(Message) -> Result<(), HandlerError> + Send + 'static,
{
    fn handle_message(&mut self, message: Message) -> Result<(), HandlerError> {
        self(message)
    }
}

pub struct MessageWorkQueue {
    name: String,
    tx: Option<Sender<Message>>,
    worker: Option<JoinHandle<()>>,
}

impl MessageWorkQueue {
    pub fn spawn<H: MessageHandler>(name: impl Into<String>, mut handler: H) -> io::Result<Self> {
        let name = name.into();
        let (tx, rx) = unbounded::<Message>();

        let worker_name = name.clone();
        let worker = thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                for message in rx.iter() {
                    let kind = message.kind();
                    let outcome =
                        panic::catch_unwind(AssertUnwindSafe(|| handler.handle_message(message)));
                    match outcome {
                        Ok(Ok(())) => {}
                        Ok(Err(e @ HandlerError::UnexpectedMessage { .. })) => {
                            warn!("[{}] dropped message: {}", worker_name, e)
                        }
                        Ok(Err(e)) => error!("[{}] failed to handle {}: {}", worker_name, kind, e),
                        Err(payload) => error!(
                            "[{}] handler panicked on {}: {}",
                            worker_name,
                            kind,
                            panic_message(&*payload)
                        ),
                    }
                }
                debug!("[{}] work queue drained, worker exiting", worker_name);
            })?;

        Ok(MessageWorkQueue {
            name,
            tx: Some(tx),
            worker: Some(worker),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn enqueue_message(&self, message: Message) -> Result<(), WorkQueueError> {
        match &self.tx {
            Some(tx) => tx
                .send(message)
                .map_err(|_| WorkQueueError::Closed(self.name.clone())),
            None => Err(WorkQueueError::Closed(self.name.clone())),
        }
    }

    /// A producer handle onto the tail of the queue.
    pub fn sender(&self) -> Option<Sender<Message>> {
        self.tx.clone()
    }

    /// Spawn the forwarder moving everything received from `inbound` onto
    /// this queue. The forwarder exits when either side closes.
    pub fn listen(&self, from: Subsystem, inbound: Receiver<Message>) -> io::Result<JoinHandle<()>> {
        let tx = self.tx.clone();
        let name = self.name.clone();
        thread::Builder::new()
            .name(format!("{}-from-{}", name, from))
            .spawn(move || {
                let Some(tx) = tx else { return };
                for message in inbound.iter() {
                    if tx.send(message).is_err() {
                        warn!("[{}] queue closed, stop forwarding from {}", name, from);
                        return;
                    }
                }
                debug!("[{}] link from {} closed", name, from);
            })
    }

    /// Close the queue and wait for the worker to finish what is already queued.
    /// Producers obtained through [`sender`](Self::sender) keep the worker
    /// alive until they are dropped too.
    pub fn shutdown(mut self) {
        self.close_and_join();
    }

    fn close_and_join(&mut self) {
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("[{}] worker thread panicked", self.name);
            }
        }
    }
}

impl Drop for MessageWorkQueue {
    fn drop(&mut self) {
        // Detach instead of joining: forwarders may still hold senders.
        self.tx.take();
        self.worker.take();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
