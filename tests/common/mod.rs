#![allow(dead_code)]

use canvas_turtle::{
    Action, ActionKind, Batch, ChannelTransport, MediaKind, Resource, ResourceLoader, Result,
    Screen, ScreenConfig, Session, TurtleError, TurtleId,
};
use crossbeam::channel::Receiver;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const EPS: f64 = 1e-9;

pub struct Harness {
    pub session: Session,
    pub batches: Receiver<Batch>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(ScreenConfig::instant())
    }

    pub fn with_config(config: ScreenConfig) -> Self {
        let (transport, batches) = ChannelTransport::new();
        let screen = Screen::new(config, Arc::new(transport)).unwrap();
        Self {
            session: Session::new(screen),
            batches,
        }
    }

    pub fn with_loader(loader: Arc<dyn ResourceLoader>) -> Self {
        let (transport, batches) = ChannelTransport::new();
        let screen = Screen::with_loader(ScreenConfig::instant(), Arc::new(transport), loader).unwrap();
        Self {
            session: Session::new(screen),
            batches,
        }
    }

    /// Shuts everything down and returns every published action in order.
    pub fn finish(&self) -> Vec<Action> {
        self.session.done();
        self.session.screen().stop();
        self.batches.try_iter().flat_map(|b| b.actions).collect()
    }
}

pub fn of_turtle(actions: &[Action], id: TurtleId) -> Vec<Action> {
    actions.iter().filter(|a| a.id == id).cloned().collect()
}

pub fn of_kind(actions: &[Action], kind: ActionKind) -> Vec<Action> {
    actions.iter().filter(|a| a.kind == kind).cloned().collect()
}

/// Serves fake media and counts how often each load hits it.
#[derive(Default)]
pub struct CountingLoader {
    pub loads: AtomicUsize,
}

impl CountingLoader {
    pub fn count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl ResourceLoader for CountingLoader {
    fn load(&self, name: &str) -> Result<Resource> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let (kind, ext) = canvas_turtle::classify(&PathBuf::from(name))?;
        if name.starts_with("missing") {
            return Err(TurtleError::ResourceUnavailable {
                path: PathBuf::from(name),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
            });
        }
        Ok(Resource {
            name: name.to_string(),
            kind,
            ext,
            buffer: match kind {
                MediaKind::Audio => b"RIFF".to_vec(),
                _ => b"\x89PNG".to_vec(),
            },
        })
    }
}
