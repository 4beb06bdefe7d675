//! Per-turtle action queue and the consumer thread that paces delivery.
//!
//! Commands push actions into an unbounded channel and return at once. A
//! dedicated thread pops them in order, sleeps in proportion to the motion
//! distance and the turtle speed, then hands each action to the [`Screen`].

use crate::action::{Action, TurtleId};
use crate::config::PacingMode;
use crate::error::{Result, TurtleError};
use crate::screen::{Pacing, Screen};
use crossbeam::channel::{Receiver, Sender, unbounded};
use log::*;
use parking_lot::Mutex;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Speed level for animated motion.
///
/// Numeric levels run 1 (slowest) to 10; 0 is an alias for "no delay".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Speed {
    Level(i32),
    Fastest,
    Fast,
    Normal,
    Slow,
    Slowest,
}

impl Speed {
    /// Resolves to the stored level in `0..=10`.
    pub fn level(self) -> u8 {
        match self {
            Speed::Level(0) => 0,
            Speed::Level(n) => n.clamp(1, 10) as u8,
            Speed::Fastest | Speed::Fast => 10,
            Speed::Normal => 6,
            Speed::Slow => 3,
            Speed::Slowest => 1,
        }
    }
}

impl From<i32> for Speed {
    fn from(level: i32) -> Self {
        Speed::Level(level)
    }
}

impl FromStr for Speed {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fastest" => Ok(Speed::Fastest),
            "fast" => Ok(Speed::Fast),
            "normal" => Ok(Speed::Normal),
            "slow" => Ok(Speed::Slow),
            "slowest" => Ok(Speed::Slowest),
            other => other
                .parse::<i32>()
                .map(Speed::Level)
                .map_err(|_| format!("unknown speed {s:?}")),
        }
    }
}

/// How long to hold an action before forwarding it.
///
/// The step count `distance * factor / (3 * 1.1^speed * speed)` grows
/// sharply at low speeds and flattens toward one step at high speeds.
pub fn pacing_delay(distance: f64, speed: u8, pacing: &Pacing) -> Duration {
    if pacing.mode == PacingMode::Instant {
        return Duration::ZERO;
    }
    if speed == 0 || speed >= 10 {
        return pacing.fastest;
    }
    let s = speed as f64;
    let steps = (distance.abs() * pacing.delay_factor / (3.0 * 1.1f64.powf(s) * s)).max(1.0);
    pacing.step.mul_f64(steps)
}

enum Envelope {
    Action(Box<Action>),
    Stop,
}

/// Handle to one turtle's outbox and its consumer thread.
pub struct Pacer {
    id: TurtleId,
    tx: Sender<Envelope>,
    stopped: AtomicBool,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Pacer {
    pub fn spawn(id: TurtleId, screen: Arc<Screen>) -> Result<Arc<Self>> {
        let (tx, rx) = unbounded();
        let handle = thread::Builder::new()
            .name(format!("pacer-{}", id.0))
            .spawn(move || run(id, rx, screen))
            .map_err(TurtleError::Spawn)?;
        Ok(Arc::new(Self {
            id,
            tx,
            stopped: AtomicBool::new(false),
            handle: Mutex::new(Some(handle)),
        }))
    }

    pub fn id(&self) -> TurtleId {
        self.id
    }

    /// Enqueues an action without blocking. Returns `false` when the pacer
    /// has been stopped and the action was discarded.
    pub fn push(&self, action: Action) -> bool {
        if self.is_stopped() {
            debug!("{}: dropping {:?} issued after stop", self.id, action.kind);
            return false;
        }
        self.tx.send(Envelope::Action(Box::new(action))).is_ok()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Signals the consumer to exit once everything queued so far has been
    /// delivered, and waits for it. Safe to call more than once.
    pub fn stop(&self) {
        if !self.stopped.swap(true, Ordering::AcqRel) {
            let _ = self.tx.send(Envelope::Stop);
        }
        let handle = self.handle.lock().take();
        if let Some(handle) = handle
            && let Err(e) = handle.join()
        {
            error!("{}: pacer thread panicked: {:?}", self.id, e);
        }
    }
}

impl Drop for Pacer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(id: TurtleId, rx: Receiver<Envelope>, screen: Arc<Screen>) {
    debug!("{}: pacer started", id);
    while let Ok(Envelope::Action(action)) = rx.recv() {
        if action.needs_delay {
            let delay = pacing_delay(action.distance, action.speed, &screen.pacing());
            if !delay.is_zero() {
                thread::sleep(delay);
            }
        }
        trace!("{}: delivering {:?}", id, action.kind);
        screen.add_action(*action);
    }
    debug!("{}: pacer drained, exiting", id);
}
