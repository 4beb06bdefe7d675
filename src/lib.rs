//! # canvas-turtle
//!
//! A turtle graphics engine that translates drawing commands into a stream
//! of render [`Action`]s.
//!
//! Commands mutate a turtle's pose and pen, then enqueue an action. A pacer
//! thread per turtle delivers queued actions to the shared [`Screen`] at a
//! speed-dependent pace, and the screen publishes them in batches on a fixed
//! render tick to whatever [`Transport`] feeds the renderer.

pub mod action;
pub mod color;
pub mod config;
pub mod error;
pub mod geometry;
pub mod interpreter;
pub mod pacer;
pub mod resource;
pub mod screen;
pub mod session;
pub mod transport;
pub mod turtle;

pub use action::*;
pub use color::*;
pub use config::*;
pub use error::*;
pub use geometry::{Canvas, Pose};
pub use interpreter::*;
pub use pacer::*;
pub use resource::*;
pub use screen::*;
pub use session::*;
pub use transport::*;
pub use turtle::*;
