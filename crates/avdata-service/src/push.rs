//! Pushes towards the management side and requests for its session.
//!
//! Applications push resource trees or time-series batches; they wait in a
//! bounded queue until the management side pulls them. Each push may carry
//! an acknowledgement callback that runs once the push is delivered, or
//! with [`PushStatus::Failed`] if the service stops first.

use std::collections::{HashSet, VecDeque};

use avdata_core::{AvDataError, Result};
use avdata_protocol::PushMessage;

/// Outcome reported to a push acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushStatus {
    /// The management side pulled the data.
    Success,
    /// The data was discarded before delivery.
    Failed,
}

/// Callback run once a push is delivered or discarded.
pub type PushAck = Box<dyn FnOnce(PushStatus) + Send>;

pub(crate) struct PendingPush {
    pub(crate) message: PushMessage,
    pub(crate) ack: PushAck,
}

pub(crate) struct PushQueue {
    pending: VecDeque<PendingPush>,
    capacity: usize,
}

impl PushQueue {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            pending: VecDeque::new(),
            capacity,
        }
    }

    /// Queue a push. A full queue refuses it with `Overflow`.
    pub(crate) fn enqueue(&mut self, message: PushMessage, ack: PushAck) -> Result<()> {
        if self.pending.len() >= self.capacity {
            return Err(AvDataError::Overflow {
                len: self.pending.len() + 1,
                capacity: self.capacity,
            });
        }
        self.pending.push_back(PendingPush { message, ack });
        Ok(())
    }

    /// Remove every queued push, oldest first.
    pub(crate) fn drain(&mut self) -> Vec<PendingPush> {
        self.pending.drain(..).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }
}

impl Drop for PushQueue {
    fn drop(&mut self) {
        for push in self.pending.drain(..) {
            (push.ack)(PushStatus::Failed);
        }
    }
}

/// Reference to an outstanding management session request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionRequestRef(u64);

/// Outstanding session requests. The management session is wanted while
/// at least one request is held.
#[derive(Default)]
pub(crate) struct SessionRequests {
    next_id: u64,
    held: HashSet<SessionRequestRef>,
}

impl SessionRequests {
    pub(crate) fn request(&mut self) -> SessionRequestRef {
        self.next_id += 1;
        let request = SessionRequestRef(self.next_id);
        self.held.insert(request);
        request
    }

    /// Returns false for a reference that is not held.
    pub(crate) fn release(&mut self, request: SessionRequestRef) -> bool {
        self.held.remove(&request)
    }

    pub(crate) fn is_requested(&self) -> bool {
        !self.held.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.held.len()
    }
}
