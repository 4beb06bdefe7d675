//! Sinks that carry action batches to a renderer.

use crate::action::Action;
use crossbeam::channel::{Receiver, Sender, unbounded};
use log::debug;
use serde::{Deserialize, Serialize};

/// Actions collected during one render tick, in arrival order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub actions: Vec<Action>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Publishes batches to a remote renderer. There is no acknowledgment.
pub trait Transport: Send + Sync {
    fn publish(&self, batch: Batch);
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullTransport;

impl Transport for NullTransport {
    fn publish(&self, _batch: Batch) {}
}

/// Forwards batches into a channel, mostly for observing output in tests.
#[derive(Clone, Debug)]
pub struct ChannelTransport {
    tx: Sender<Batch>,
}

impl ChannelTransport {
    pub fn new() -> (Self, Receiver<Batch>) {
        let (tx, rx) = unbounded();
        (Self { tx }, rx)
    }
}

impl Transport for ChannelTransport {
    fn publish(&self, batch: Batch) {
        if self.tx.send(batch).is_err() {
            debug!("ChannelTransport: receiver gone, dropping batch");
        }
    }
}
