//! The screen: collects actions from every turtle and publishes them in
//! batches on a fixed render tick.
//!
//! All data touched by more than one thread (pending actions, the registry
//! of turtle snapshots, screen settings and the resource cache) lives behind
//! a single [`parking_lot::Mutex`]. The lock is held only to copy or swap
//! data, never while sleeping, loading files or publishing.

use crate::action::{Action, ActionKind, TurtleId};
use crate::color::{ColorMode, ColorSpec, build_color};
use crate::config::{PacingMode, ScreenConfig};
use crate::error::{Result, TurtleError};
use crate::geometry::Canvas;
use crate::resource::{FsLoader, Resource, ResourceLoader};
use crate::transport::{Batch, Transport};
use crossbeam::channel::{self, Sender, select};
use log::*;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

struct ScreenState {
    canvas: Canvas,
    background: String,
    bgpic: Option<String>,
    colormode: ColorMode,
    mode: PacingMode,
    delay_factor: f64,
    pending: Vec<Action>,
    turtles: BTreeMap<TurtleId, Action>,
    resources: HashMap<String, Arc<Resource>>,
}

/// State shared between the screen handle and its tick thread.
struct Shared {
    state: Mutex<ScreenState>,
    /// Serializes flushes so batches reach the transport in swap order.
    /// Pacers never take it.
    publish: Mutex<()>,
    transport: Arc<dyn Transport>,
}

impl Shared {
    fn flush(&self) -> usize {
        let _publishing = self.publish.lock();
        let actions = std::mem::take(&mut self.state.lock().pending);
        if actions.is_empty() {
            return 0;
        }
        let count = actions.len();
        trace!("Screen: publishing batch of {} actions", count);
        self.transport.publish(Batch { actions });
        count
    }
}

struct TickLoop {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

/// Everything a renderer attaching late needs to catch up.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScreenSnapshot {
    pub width: f64,
    pub height: f64,
    pub background: String,
    pub bgpic: Option<String>,
    /// Latest known state of every turtle as an `UPDATE_STATE`, ordered by id.
    pub turtles: Vec<Action>,
}

/// Pacing parameters read by pacer threads before each delay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pacing {
    pub mode: PacingMode,
    pub delay_factor: f64,
    pub step: Duration,
    pub fastest: Duration,
}

/// Render-side aggregator shared by all turtles drawing on it.
pub struct Screen {
    config: ScreenConfig,
    shared: Arc<Shared>,
    loader: Arc<dyn ResourceLoader>,
    ticker: Mutex<Option<TickLoop>>,
}

impl Screen {
    /// Creates a screen that loads media from the working directory.
    pub fn new(config: ScreenConfig, transport: Arc<dyn Transport>) -> Result<Arc<Self>> {
        Self::with_loader(config, transport, Arc::new(FsLoader::new()))
    }

    /// Creates a screen and starts its render tick thread.
    pub fn with_loader(
        config: ScreenConfig,
        transport: Arc<dyn Transport>,
        loader: Arc<dyn ResourceLoader>,
    ) -> Result<Arc<Self>> {
        let background = build_color(ColorMode::Unit, &ColorSpec::from(config.background.as_str()))?;
        let shared = Arc::new(Shared {
            state: Mutex::new(ScreenState {
                canvas: Canvas::new(config.width, config.height),
                background,
                bgpic: None,
                colormode: ColorMode::Unit,
                mode: config.mode,
                delay_factor: config.delay_factor,
                pending: Vec::new(),
                turtles: BTreeMap::new(),
                resources: HashMap::new(),
            }),
            publish: Mutex::new(()),
            transport,
        });
        let ticker = spawn_tick_loop(shared.clone(), config.tick_interval())?;
        Ok(Arc::new(Self {
            config,
            shared,
            loader,
            ticker: Mutex::new(Some(ticker)),
        }))
    }

    /// Configuration the screen was created with.
    pub fn config(&self) -> &ScreenConfig {
        &self.config
    }

    /// Queues an action for the next render tick. Safe to call from any thread.
    ///
    /// Every action also refreshes the registry entry of its turtle, so a
    /// snapshot reflects motion as well as explicit state updates.
    pub fn add_action(&self, action: Action) {
        let mut state = self.shared.state.lock();
        if action.kind == ActionKind::UpdateState {
            state.turtles.insert(action.id, action.clone());
        } else if let Some(entry) = state.turtles.get_mut(&action.id) {
            refresh_entry(entry, &action);
        }
        state.pending.push(action);
    }

    /// Publishes whatever is pending right now. Returns the batch size.
    pub fn flush(&self) -> usize {
        self.shared.flush()
    }

    /// Number of actions waiting for the next tick.
    pub fn pending_len(&self) -> usize {
        self.shared.state.lock().pending.len()
    }

    /// Copies out the state a late-joining renderer needs.
    pub fn snapshot(&self) -> ScreenSnapshot {
        let state = self.shared.state.lock();
        ScreenSnapshot {
            width: state.canvas.width,
            height: state.canvas.height,
            background: state.background.clone(),
            bgpic: state.bgpic.clone(),
            turtles: state.turtles.values().cloned().collect(),
        }
    }

    pub fn canvas(&self) -> Canvas {
        self.shared.state.lock().canvas
    }

    /// Resizes the canvas. Turtles pick up the new size on their next action.
    pub fn setup(&self, width: u32, height: u32) {
        self.shared.state.lock().canvas = Canvas::new(width, height);
    }

    /// Sets the background, resolved in the current color mode.
    pub fn bgcolor(&self, color: impl Into<ColorSpec>) -> Result<()> {
        let mode = self.colormode();
        let color = build_color(mode, &color.into())?;
        self.shared.state.lock().background = color;
        Ok(())
    }

    pub fn background(&self) -> String {
        self.shared.state.lock().background.clone()
    }

    /// Sets a background picture, loading it through the resource cache.
    pub fn bgpic(&self, name: &str) -> Result<()> {
        self.load(name, false)?;
        self.shared.state.lock().bgpic = Some(name.to_string());
        Ok(())
    }

    pub fn colormode(&self) -> ColorMode {
        self.shared.state.lock().colormode
    }

    pub fn set_colormode(&self, mode: ColorMode) {
        self.shared.state.lock().colormode = mode;
    }

    /// Sets the global delay factor applied to every paced motion.
    pub fn delay(&self, factor: f64) {
        self.shared.state.lock().delay_factor = factor.max(0.0);
    }

    pub fn delay_factor(&self) -> f64 {
        self.shared.state.lock().delay_factor
    }

    /// Current pacing mode. Starts from the config and can change at runtime.
    pub fn mode(&self) -> PacingMode {
        self.shared.state.lock().mode
    }

    /// Switches pacing for every turtle. Actions already queued pick up the
    /// new mode when their pacer reaches them.
    pub fn set_mode(&self, mode: PacingMode) {
        debug!("Screen: pacing mode set to {:?}", mode);
        self.shared.state.lock().mode = mode;
    }

    /// Classic `tracer(n)`: `0` turns animation off, anything else back on.
    pub fn tracer(&self, n: u32) {
        self.set_mode(if n == 0 {
            PacingMode::Instant
        } else {
            PacingMode::Animated
        });
    }

    /// Pacing parameters as they stand right now.
    pub fn pacing(&self) -> Pacing {
        let (mode, delay_factor) = {
            let state = self.shared.state.lock();
            (state.mode, state.delay_factor)
        };
        Pacing {
            mode,
            delay_factor,
            step: Duration::from_secs_f64(self.config.step_secs.max(0.0)),
            fastest: self.config.fastest_delay(),
        }
    }

    /// Loads a resource once per key. `reload` forces a fresh read.
    pub fn load(&self, name: &str, reload: bool) -> Result<Arc<Resource>> {
        if !reload && let Some(cached) = self.shared.state.lock().resources.get(name) {
            return Ok(cached.clone());
        }
        let resource = Arc::new(self.loader.load(name)?);
        self.shared
            .state
            .lock()
            .resources
            .insert(name.to_string(), resource.clone());
        Ok(resource)
    }

    /// Stops the tick loop after publishing anything still pending.
    pub fn stop(&self) {
        let Some(ticker) = self.ticker.lock().take() else {
            return;
        };
        drop(ticker.stop_tx);
        if let Err(e) = ticker.handle.join() {
            error!("Screen tick thread panicked: {:?}", e);
        }
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        debug!("Screen dropped");
        self.stop();
    }
}

/// Copies the visible state carried by `action` onto a registry entry. The
/// entry stays an `UPDATE_STATE` with no motion attached.
fn refresh_entry(entry: &mut Action, action: &Action) {
    entry.position = action.position;
    entry.heading = action.heading;
    entry.pen = action.pen;
    entry.fillcolor.clone_from(&action.fillcolor);
    entry.stretch = action.stretch;
    entry.outline = action.outline;
    entry.shape.clone_from(&action.shape);
    entry.visible = action.visible;
    entry.fill = action.fill;
    entry.speed = action.speed;
    // Dots carry their own color and diameter; sounds carry their own media.
    if action.kind != ActionKind::DrawDot {
        entry.color.clone_from(&action.color);
        entry.size = action.size;
    }
    if action.kind != ActionKind::Sound {
        entry.media.clone_from(&action.media);
    }
}

fn spawn_tick_loop(shared: Arc<Shared>, interval: Duration) -> Result<TickLoop> {
    let (stop_tx, stop_rx) = channel::bounded::<()>(0);
    let handle = thread::Builder::new()
        .name("screen-tick".to_string())
        .spawn(move || {
            info!("Screen: tick loop started ({:?} per frame)", interval);
            let ticker = channel::tick(interval);
            loop {
                select! {
                    recv(stop_rx) -> _ => break,
                    recv(ticker) -> _ => {
                        shared.flush();
                    }
                }
            }
            shared.flush();
            debug!("Screen: tick loop exiting");
        })
        .map_err(TurtleError::Spawn)?;
    Ok(TickLoop { stop_tx, handle })
}
