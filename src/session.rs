//! Shared context handed to every turtle: the screen, id allocation and the
//! registry of live pacers that [`Session::done`] shuts down.

use crate::action::TurtleId;
use crate::config::PacingMode;
use crate::error::Result;
use crate::pacer::Pacer;
use crate::screen::Screen;
use crate::turtle::Turtle;
use log::*;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

struct SessionInner {
    screen: Arc<Screen>,
    next_id: AtomicU64,
    live: Mutex<BTreeMap<TurtleId, Arc<Pacer>>>,
}

/// Cheap to clone; all clones share one registry.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    /// Starts a session on `screen`. Turtle ids begin at 1.
    pub fn new(screen: Arc<Screen>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                screen,
                next_id: AtomicU64::new(1),
                live: Mutex::new(BTreeMap::new()),
            }),
        }
    }

    /// The screen every turtle of this session draws on.
    pub fn screen(&self) -> &Arc<Screen> {
        &self.inner.screen
    }

    /// Pacing mode currently in force on the shared screen.
    pub fn mode(&self) -> PacingMode {
        self.inner.screen.mode()
    }

    /// Creates a turtle at the home position, drawing on this session's screen.
    pub fn turtle(&self) -> Result<Turtle> {
        Turtle::new(self)
    }

    pub(crate) fn allocate_id(&self) -> TurtleId {
        TurtleId(self.inner.next_id.fetch_add(1, Ordering::Relaxed))
    }

    pub(crate) fn register(&self, pacer: Arc<Pacer>) {
        self.inner.live.lock().insert(pacer.id(), pacer);
    }

    pub(crate) fn forget(&self, id: TurtleId) {
        self.inner.live.lock().remove(&id);
    }

    /// Ids of turtles whose pacers are still running.
    pub fn live_turtles(&self) -> Vec<TurtleId> {
        self.inner.live.lock().keys().copied().collect()
    }

    /// Stops every live turtle, waits until each has delivered its queue,
    /// then publishes the remaining actions.
    pub fn done(&self) {
        let pacers: Vec<_> = std::mem::take(&mut *self.inner.live.lock())
            .into_values()
            .collect();
        info!("Session: stopping {} turtles", pacers.len());
        for pacer in &pacers {
            pacer.stop();
        }
        self.inner.screen.flush();
    }
}
