//! Pub/sub socket: bind, subscriber fan-out, bounded-grace shutdown.
//!
//! One TCP listener per publisher; subscribers connect and receive
//! every message put on the queue from then on, best-effort. A
//! subscriber whose connection fails is dropped from the fan-out set;
//! the stream itself keeps going.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::SinkExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::codec::FramedWrite;
use tracing::{debug, error, info, warn};

use crate::codec::{PubCodec, PublishMessage};
use crate::error::PublisherError;
use crate::metrics::PublisherMetrics;
use crate::queue::SendQueue;

/// Bounded wait for in-flight sends to drain on shutdown.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// A bound publish socket with its worker task.
pub struct PubSocket {
    queue: Arc<SendQueue>,
    metrics: Arc<PublisherMetrics>,
    shutdown_tx: watch::Sender<bool>,
    worker: JoinHandle<()>,
    local_addr: SocketAddr,
}

impl PubSocket {
    /// Bind the pub/sub endpoint on the given TCP port.
    ///
    /// Port 0 binds an ephemeral port (tests); read it back with
    /// [`PubSocket::local_addr`].
    ///
    /// # Errors
    /// Returns `PublisherError::Bind` when the port cannot be bound.
    pub async fn bind(port: u16) -> Result<Self, PublisherError> {
        let listener = TcpListener::bind(("0.0.0.0", port))
            .await
            .map_err(|e| PublisherError::bind(port, e.to_string()))?;
        let local_addr = listener.local_addr()?;

        let queue = Arc::new(SendQueue::default());
        let metrics = Arc::new(PublisherMetrics::new());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let worker = tokio::spawn(socket_worker(
            listener,
            Arc::clone(&queue),
            Arc::clone(&metrics),
            shutdown_rx,
        ));

        info!(%local_addr, "publish socket bound");

        Ok(Self {
            queue,
            metrics,
            shutdown_tx,
            worker,
            local_addr,
        })
    }

    /// Bound address (useful when port 0 was requested).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Enqueue a message (non-blocking, drop-oldest once full).
    pub fn send(&self, message: PublishMessage) {
        if let Some(dropped) = self.queue.push(message) {
            self.metrics.inc_dropped_count();
            debug!(
                topic = %dropped.topic,
                "outbound queue full, oldest message dropped"
            );
        }
        self.metrics.set_queue_len(self.queue.len());
    }

    /// Whether the worker has terminated (transport context gone).
    pub fn is_terminated(&self) -> bool {
        self.worker.is_finished()
    }

    /// Shared metrics.
    pub fn metrics(&self) -> &Arc<PublisherMetrics> {
        &self.metrics
    }

    /// Stop the worker, waiting at most [`SHUTDOWN_GRACE`] for queued
    /// messages to drain before forcibly releasing the transport.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);

        let mut worker = self.worker;
        match tokio::time::timeout(SHUTDOWN_GRACE, &mut worker).await {
            Ok(Ok(())) => debug!("publish socket shut down"),
            Ok(Err(e)) => error!(error = ?e, "publish worker panicked"),
            Err(_) => {
                warn!("shutdown grace period expired, aborting publish worker");
                worker.abort();
            }
        }
    }
}

/// Worker: accepts subscribers and drains the outbound queue.
async fn socket_worker(
    listener: TcpListener,
    queue: Arc<SendQueue>,
    metrics: Arc<PublisherMetrics>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut subscribers: Vec<(SocketAddr, FramedWrite<TcpStream, PubCodec>)> = Vec::new();

    debug!("publish worker started");

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => break,

            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    let _ = stream.set_nodelay(true);
                    subscribers.push((peer, FramedWrite::new(stream, PubCodec)));
                    metrics.set_subscriber_count(subscribers.len());
                    info!(%peer, subscribers = subscribers.len(), "subscriber connected");
                }
                Err(e) => warn!(error = %e, "subscriber accept failed"),
            },

            message = queue.recv() => {
                broadcast(&mut subscribers, &metrics, &message).await;
                metrics.set_queue_len(queue.len());
            }
        }
    }

    // Drain what is still queued; the caller bounds this with the
    // shutdown grace period.
    while let Some(message) = queue.pop() {
        broadcast(&mut subscribers, &metrics, &message).await;
    }
    for (peer, mut sink) in subscribers {
        if let Err(e) = sink.flush().await {
            debug!(%peer, error = %e, "final flush failed");
        }
    }

    debug!("publish worker stopped");
}

/// Send one message to every subscriber, dropping the ones that fail.
async fn broadcast(
    subscribers: &mut Vec<(SocketAddr, FramedWrite<TcpStream, PubCodec>)>,
    metrics: &PublisherMetrics,
    message: &PublishMessage,
) {
    let mut i = 0;
    while i < subscribers.len() {
        let (peer, sink) = &mut subscribers[i];
        match sink.send(message.clone()).await {
            Ok(()) => i += 1,
            Err(e) => {
                let peer = *peer;
                metrics.inc_send_failures();
                subscribers.swap_remove(i);
                metrics.set_subscriber_count(subscribers.len());
                warn!(%peer, error = %e, "subscriber send failed, dropping subscriber");
            }
        }
    }
    metrics.inc_sent_count();
}
