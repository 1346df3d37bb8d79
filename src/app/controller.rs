//! Console controller - drives one send from editor text to settled state
//!
//! Each send is tagged with a sequence number when it is issued. A result is
//! applied only if its number is still the latest issued, so a slow earlier
//! send can never overwrite a newer one. Subscribers receive every applied
//! transition in order.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;
use tokio::sync::mpsc;

use crate::app::state::{ConsoleState, SendOutcome};
use crate::error::ConsoleError;
use crate::models::{OperationDescriptor, SecurityScheme};
use crate::network::{RequestExecutor, Transport};
use crate::request::{build_request, parse_body_text, RequestContext, RequestSpec};

/// Per-controller request shaping that does not change between sends
#[derive(Clone, Debug, Default)]
pub struct ConsoleOptions {
    pub additional_headers: IndexMap<String, String>,
    pub security_schemes: Vec<SecurityScheme>,
}

/// Caller-provided input for one send
#[derive(Clone, Copy, Debug)]
pub struct SendInput<'a> {
    pub operation: &'a OperationDescriptor,
    /// Current editor text; ignored when the operation declares no body
    pub body_text: Option<&'a str>,
    pub server_index: usize,
}

impl<'a> SendInput<'a> {
    pub fn new(operation: &'a OperationDescriptor) -> Self {
        SendInput {
            operation,
            body_text: None,
            server_index: 0,
        }
    }

    pub fn body(mut self, text: &'a str) -> Self {
        self.body_text = Some(text);
        self
    }

    pub fn server(mut self, index: usize) -> Self {
        self.server_index = index;
        self
    }
}

struct Shared {
    state: ConsoleState,
    latest_seq: u64,
    subscribers: Vec<mpsc::UnboundedSender<ConsoleState>>,
}

impl Shared {
    fn transition(&mut self, state: ConsoleState) {
        self.state = state;
        let snapshot = &self.state;
        self.subscribers.retain(|tx| tx.send(snapshot.clone()).is_ok());
    }
}

pub struct ConsoleController<T: Transport> {
    executor: RequestExecutor<T>,
    options: ConsoleOptions,
    shared: Mutex<Shared>,
}

impl<T: Transport> ConsoleController<T> {
    pub fn new(executor: RequestExecutor<T>, options: ConsoleOptions) -> Self {
        ConsoleController {
            executor,
            options,
            shared: Mutex::new(Shared {
                state: ConsoleState::Idle,
                latest_seq: 0,
                subscribers: Vec::new(),
            }),
        }
    }

    pub fn executor(&self) -> &RequestExecutor<T> {
        &self.executor
    }

    pub fn options(&self) -> &ConsoleOptions {
        &self.options
    }

    /// Snapshot of the current state
    pub fn state(&self) -> ConsoleState {
        self.lock().state.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.lock().state.is_busy()
    }

    /// Receive every state transition from now on, starting with the
    /// current state.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<ConsoleState> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut shared = self.lock();
        if tx.send(shared.state.clone()).is_ok() {
            shared.subscribers.push(tx);
        }
        rx
    }

    /// Issue a send.
    ///
    /// The sequence number is taken and the state moves to `Sending` before
    /// this returns. Body and path errors settle immediately without any I/O.
    /// The returned future performs the call; it resolves to the outcome if
    /// it was applied, or `None` if a newer send was issued meanwhile.
    /// Dropping the future before it resolves settles the send as
    /// `ConsoleError::Cancelled`.
    pub fn send<'a>(
        &'a self,
        input: SendInput<'a>,
    ) -> impl Future<Output = Option<SendOutcome>> + Send + 'a {
        let seq = self.begin();
        let prepared = self.prepare(&input).map_err(|e| {
            tracing::warn!(seq, error = %e, "Request rejected before send");
            self.settle(seq, SendOutcome::Failure(e))
        });
        let mut guard = SettleOnDrop {
            controller: self,
            seq,
            armed: prepared.is_ok(),
        };

        async move {
            let spec = match prepared {
                Ok(spec) => spec,
                Err(applied) => return applied,
            };

            tracing::info!(seq, method = %spec.method, url = %spec.url, "Executing request");
            let outcome = match self.executor.send(&spec).await {
                Ok(record) => {
                    tracing::info!(seq, status = record.status, elapsed_ms = record.elapsed_ms, "Request completed");
                    SendOutcome::Success(record)
                }
                Err(e) => {
                    tracing::warn!(seq, error = %e, "Request failed");
                    SendOutcome::Failure(e.into())
                }
            };
            guard.armed = false;
            self.settle(seq, outcome)
        }
    }

    /// Resolve the request for `input` without sending it
    pub fn prepare(&self, input: &SendInput<'_>) -> Result<RequestSpec, ConsoleError> {
        let body = match &input.operation.body {
            Some(_) => parse_body_text(input.body_text.unwrap_or_default())?,
            None => None,
        };
        let ctx = RequestContext {
            server_index: input.server_index,
            additional_headers: &self.options.additional_headers,
            security_schemes: &self.options.security_schemes,
        };
        build_request(input.operation, body.as_ref(), ctx)
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) -> u64 {
        let mut shared = self.lock();
        shared.latest_seq += 1;
        let seq = shared.latest_seq;
        shared.transition(ConsoleState::Sending { seq });
        seq
    }

    fn settle(&self, seq: u64, outcome: SendOutcome) -> Option<SendOutcome> {
        let mut shared = self.lock();
        if seq != shared.latest_seq {
            tracing::debug!(seq, latest = shared.latest_seq, "Discarding superseded result");
            return None;
        }
        shared.transition(ConsoleState::Settled {
            seq,
            outcome: outcome.clone(),
        });
        Some(outcome)
    }
}

/// Settles an in-flight send as cancelled if its future is dropped first
struct SettleOnDrop<'a, T: Transport> {
    controller: &'a ConsoleController<T>,
    seq: u64,
    armed: bool,
}

impl<T: Transport> Drop for SettleOnDrop<'_, T> {
    fn drop(&mut self) {
        if self.armed {
            tracing::info!(seq = self.seq, "Request cancelled");
            self.controller
                .settle(self.seq, SendOutcome::Failure(ConsoleError::Cancelled));
        }
    }
}
