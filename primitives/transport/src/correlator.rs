//! Request/response correlation over a duplex channel.
//!
//! A connection owns one [`Correlator`]. The send path registers the
//! request id before the request hits the wire and then waits on the
//! returned [`PendingResponse`]; the receive loop hands every incoming
//! message to [`Correlator::dispatch`], which either completes the
//! matching waiter or reports the message as unsolicited.
//!
//! ```
//! use std::sync::Arc;
//!
//! use serde_json::json;
//! use tokio_util::sync::CancellationToken;
//! use transport::{Correlator, Dispatch, Message};
//!
//! # tokio_test_runtime(async {
//! let correlator = Arc::new(Correlator::new());
//! let request = Message::new("ping", json!({}), "daemon", "doc");
//! let pending = correlator.register(&request.request_id)?;
//!
//! let response = Message::response_to(&request, json!({"success": true}));
//! assert!(matches!(correlator.dispatch(response), Dispatch::Resolved));
//!
//! let answer = pending.wait(&CancellationToken::new()).await?;
//! assert!(answer.is_successful_response());
//! # Ok::<(), transport::TransportError>(())
//! # }).expect("doc example");
//! # fn tokio_test_runtime<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().expect("runtime").block_on(f)
//! # }
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::{Message, Result, TransportError};

/// Outcome of handing an incoming message to the correlator.
#[derive(Debug)]
pub enum Dispatch {
    /// The message answered an outstanding request and was delivered.
    Resolved,
    /// Nobody was waiting for this request id; treat it as a broadcast.
    Unsolicited(Message),
}

#[derive(Default)]
struct State {
    pending: HashMap<String, oneshot::Sender<Message>>,
    closed: bool,
}

/// Pending-request table for a single connection.
#[derive(Default)]
pub struct Correlator {
    state: Mutex<State>,
}

impl std::fmt::Debug for Correlator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("Correlator")
            .field("pending", &state.pending.len())
            .field("closed", &state.closed)
            .finish()
    }
}

impl Correlator {
    /// Creates an open, empty correlator.
    pub fn new() -> Self { Self::default() }

    fn lock(&self) -> MutexGuard<'_, State> {
        // a panic while holding the lock leaves the map itself consistent
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registers interest in the response to `request_id`.
    ///
    /// # Errors
    /// - [`TransportError::DuplicateRequestId`] if the id is already pending
    /// - [`TransportError::ConnectionClosed`] after [`Correlator::close`]
    pub fn register(self: &Arc<Self>, request_id: &str) -> Result<PendingResponse> {
        let mut state = self.lock();
        if state.closed {
            return Err(TransportError::ConnectionClosed);
        }
        if state.pending.contains_key(request_id) {
            return Err(TransportError::DuplicateRequestId(request_id.to_string()));
        }
        let (tx, rx) = oneshot::channel();
        state.pending.insert(request_id.to_string(), tx);
        tracing::trace!(request_id, pending = state.pending.len(), "registered request");

        Ok(PendingResponse {
            request_id: request_id.to_string(),
            rx,
            correlator: Arc::clone(self),
        })
    }

    /// Routes an incoming message to its waiter, if any.
    pub fn dispatch(&self, message: Message) -> Dispatch {
        let waiter = self.lock().pending.remove(&message.request_id);
        match waiter {
            // the waiter may have given up between lookup and send; the
            // response is then dropped like any other late answer
            Some(tx) => {
                let _ = tx.send(message);
                Dispatch::Resolved
            }
            None => Dispatch::Unsolicited(message),
        }
    }

    /// Removes a registration without completing it.
    ///
    /// Returns `true` if the id was still pending.
    pub fn cancel(&self, request_id: &str) -> bool {
        self.lock().pending.remove(request_id).is_some()
    }

    /// Closes the correlator; every outstanding waiter fails with
    /// [`TransportError::ConnectionClosed`] and further registrations are refused.
    pub fn close(&self) {
        let drained: Vec<_> = {
            let mut state = self.lock();
            state.closed = true;
            state.pending.drain().collect()
        };
        if !drained.is_empty() {
            tracing::debug!(count = drained.len(), "failing outstanding requests");
        }
    }

    /// Whether [`Correlator::close`] has been called.
    pub fn is_closed(&self) -> bool { self.lock().closed }

    /// Number of requests currently waiting for a response.
    pub fn pending_count(&self) -> usize { self.lock().pending.len() }
}

/// A registered request awaiting its response.
///
/// Dropping this value withdraws the registration, so abandoning a request
/// (cancellation, timeout, a failed write, or simply dropping the future)
/// never leaves a stale entry behind.
#[derive(Debug)]
pub struct PendingResponse {
    request_id: String,
    rx: oneshot::Receiver<Message>,
    correlator: Arc<Correlator>,
}

impl PendingResponse {
    /// The request id this registration waits on.
    pub fn request_id(&self) -> &str { &self.request_id }

    /// Waits for the response or for `cancel` to fire, whichever comes first.
    ///
    /// # Errors
    /// - [`TransportError::Cancelled`] when the token fires first
    /// - [`TransportError::ConnectionClosed`] when the correlator is closed
    pub async fn wait(mut self, cancel: &CancellationToken) -> Result<Message> {
        tokio::select! {
            biased;
            response = &mut self.rx => response.map_err(|_| TransportError::ConnectionClosed),
            _ = cancel.cancelled() => {
                tracing::debug!(request_id = %self.request_id, "request cancelled");
                Err(TransportError::Cancelled)
            }
        }
    }
}

impl Drop for PendingResponse {
    fn drop(&mut self) { self.correlator.cancel(&self.request_id); }
}
