//! Turtle state and the commands that drive it.
//!
//! Every command that changes the pose or a visible style updates the state
//! first, then builds an [`Action`] from the new state and pushes it to the
//! turtle's pacer. Commands never wait for rendering.

use crate::action::{Action, ActionKind, Align, Font, MediaRef, TurtleId};
use crate::color::{ColorMode, ColorSpec, ColorValue, build_color, decode_color};
use crate::error::{Result, TurtleError};
use crate::geometry::{self, Pose};
use crate::pacer::{Pacer, Speed};
use crate::resource::MediaKind;
use crate::screen::Screen;
use crate::session::Session;
use glam::DVec2;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shapes the renderer draws natively. Any other name is a media resource.
pub const BUILTIN_SHAPES: [&str; 5] = ["circle", "default", "square", "triangle", "turtle"];

/// Pen configuration. Colors are always stored in resolved string form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PenState {
    pub down: bool,
    pub color: String,
    pub fillcolor: String,
    pub size: f64,
    /// Shape stretch as `(width, length)`.
    pub stretch: (f64, f64),
    pub outline: f64,
}

impl Default for PenState {
    fn default() -> Self {
        Self {
            down: true,
            color: "black".to_string(),
            fillcolor: "black".to_string(),
            size: 1.0,
            stretch: (1.0, 1.0),
            outline: 1.0,
        }
    }
}

/// Presentation of the turtle itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Style {
    /// Stored speed level, `0..=10`.
    pub speed: u8,
    pub shape: String,
    /// Set when `shape` names a media resource rather than a builtin.
    pub shape_media: Option<MediaRef>,
    pub visible: bool,
    pub filling: bool,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            speed: 3,
            shape: "default".to_string(),
            shape_media: None,
            visible: true,
            filling: false,
        }
    }
}

/// Complete mutable state of one turtle.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TurtleState {
    pub pose: Pose,
    pub pen: PenState,
    pub style: Style,
}

/// Options for [`Turtle::goto_with`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GotoOptions {
    /// Whether the pacer should animate the move.
    pub need_delay: bool,
}

impl Default for GotoOptions {
    fn default() -> Self {
        Self { need_delay: true }
    }
}

/// Approximate advance of one character, as a fraction of the font size.
/// The renderer owns real text metrics; this only positions the pen.
pub const TEXT_ADVANCE: f64 = 0.6;

/// Options for [`Turtle::write`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Move the pen to the end of the text after writing.
    pub move_pen: bool,
    pub align: Align,
    pub font: Font,
}

/// A drawing agent bound to a [`Session`].
///
/// ```
/// use canvas_turtle::{NullTransport, Screen, ScreenConfig, Session};
/// use std::sync::Arc;
///
/// let screen = Screen::new(ScreenConfig::instant(), Arc::new(NullTransport)).unwrap();
/// let session = Session::new(screen);
/// let mut t = session.turtle().unwrap();
/// t.forward(100.0);
/// t.left(90.0);
/// t.forward(50.0);
/// assert!((t.pos() - glam::DVec2::new(100.0, 50.0)).length() < 1e-9);
/// session.done();
/// ```
pub struct Turtle {
    id: TurtleId,
    session: Session,
    screen: Arc<Screen>,
    pacer: Arc<Pacer>,
    state: TurtleState,
    /// Canvas-space position, refreshed on every pose change.
    canvas_pos: DVec2,
    stamps: usize,
}

impl Turtle {
    /// Creates a turtle in the home state and announces it to the screen.
    pub fn new(session: &Session) -> Result<Self> {
        let id = session.allocate_id();
        let screen = session.screen().clone();
        let pacer = Pacer::spawn(id, screen.clone())?;
        session.register(pacer.clone());

        let mut turtle = Self {
            id,
            session: session.clone(),
            screen,
            pacer,
            state: TurtleState::default(),
            canvas_pos: DVec2::ZERO,
            stamps: 0,
        };
        turtle.set_pose(Pose::default());
        turtle.update_state();
        Ok(turtle)
    }

    /// Session-unique id carried by every action of this turtle.
    pub fn id(&self) -> TurtleId {
        self.id
    }

    /// Full local state, including changes made after `done()`.
    pub fn state(&self) -> &TurtleState {
        &self.state
    }

    /// The screen this turtle draws on.
    pub fn screen(&self) -> &Arc<Screen> {
        &self.screen
    }

    // --- Motion ---

    /// Moves along the heading, drawing when the pen is down. Negative
    /// distances move backward.
    pub fn forward(&mut self, distance: f64) {
        let pose = geometry::forward(self.state.pose, distance);
        self.set_pose(pose);
        let mut action = self.action(self.stroke_kind());
        action.distance = distance.abs();
        action.needs_delay = true;
        self.send(action);
    }

    /// Moves against the heading. Same as `forward(-distance)`.
    pub fn backward(&mut self, distance: f64) {
        self.forward(-distance);
    }

    /// Turns counter-clockwise by `angle` degrees.
    pub fn left(&mut self, angle: f64) {
        self.rotate(angle);
    }

    /// Turns clockwise by `angle` degrees.
    pub fn right(&mut self, angle: f64) {
        self.rotate(-angle);
    }

    fn rotate(&mut self, delta: f64) {
        let pose = geometry::turn(self.state.pose, delta);
        self.set_pose(pose);
        let mut action = self.action(ActionKind::UpdateState);
        action.needs_delay = true;
        self.send(action);
    }

    /// Points the turtle at an absolute heading in degrees.
    pub fn setheading(&mut self, angle: f64) {
        let pose = Pose {
            heading: geometry::normalize_heading(angle),
            ..self.state.pose
        };
        self.set_pose(pose);
        self.update_state();
    }

    /// Moves to `(x, y)` in logical coordinates, animated.
    pub fn goto(&mut self, x: f64, y: f64) {
        self.goto_with(x, y, GotoOptions::default());
    }

    /// Moves to `(x, y)`, drawing when the pen is down.
    pub fn goto_with(&mut self, x: f64, y: f64, options: GotoOptions) {
        let target = DVec2::new(x, y);
        let distance = geometry::distance(self.state.pose.position, target);
        self.set_pose(Pose {
            position: target,
            ..self.state.pose
        });
        let mut action = self.action(self.stroke_kind());
        action.distance = distance;
        action.needs_delay = options.need_delay;
        self.send(action);
    }

    /// Jumps to `(x, y)` without drawing, whatever the pen state.
    pub fn teleport(&mut self, x: f64, y: f64) {
        let target = DVec2::new(x, y);
        let distance = geometry::distance(self.state.pose.position, target);
        self.set_pose(Pose {
            position: target,
            ..self.state.pose
        });
        let mut action = self.action(ActionKind::MoveAbsolute);
        action.distance = distance;
        self.send(action);
    }

    /// Moves horizontally to `x`.
    pub fn setx(&mut self, x: f64) {
        self.goto(x, self.state.pose.position.y);
    }

    /// Moves vertically to `y`.
    pub fn sety(&mut self, y: f64) {
        self.goto(self.state.pose.position.x, y);
    }

    /// Returns to the origin facing east, drawing when the pen is down.
    pub fn home(&mut self) {
        let distance = self.state.pose.position.length();
        self.set_pose(Pose::default());
        let mut action = self.action(self.stroke_kind());
        action.distance = distance;
        action.needs_delay = true;
        self.send(action);
    }

    /// Draws an arc of `extent` degrees. A positive radius curves left.
    ///
    /// Sweeps beyond a half turn are split so each emitted action covers at
    /// most 180 degrees.
    ///
    /// A non-finite radius or extent is ignored with a warning.
    pub fn circle(&mut self, radius: f64, extent: f64) {
        if !radius.is_finite() || !extent.is_finite() {
            warn!("{}: ignoring circle({}, {})", self.id, radius, extent);
            return;
        }
        for piece in geometry::decompose_extent(extent) {
            let step = geometry::arc(self.state.pose, radius, piece);
            self.set_pose(step.pose);
            let kind = if self.state.pen.down {
                ActionKind::Circle
            } else {
                ActionKind::MoveAbsolute
            };
            let mut action = self.action(kind);
            action.distance = step.length;
            action.radius = radius.abs();
            action.clockwise = step.clockwise;
            action.large_arc = step.large_arc;
            action.needs_delay = true;
            self.send(action);
        }
    }

    /// Full circle shorthand.
    pub fn circle_full(&mut self, radius: f64) {
        self.circle(radius, 360.0);
    }

    // --- Marks ---

    /// Draws a dot. The diameter defaults to `max(pensize + 4, 2 * pensize)`.
    /// A given color applies to this dot only.
    pub fn dot(&mut self, size: Option<f64>, color: Option<ColorSpec>) -> Result<()> {
        let pensize = self.state.pen.size;
        let size = size.unwrap_or((pensize + 4.0).max(2.0 * pensize));
        // Resolve before touching anything so a bad color leaves no trace.
        let color = match color {
            Some(spec) => Some(build_color(self.screen.colormode(), &spec)?),
            None => None,
        };
        let mut action = self.action(ActionKind::DrawDot);
        if let Some(color) = color {
            action.color = color;
        }
        action.size = size;
        action.radius = size / 2.0;
        self.send(action);
        Ok(())
    }

    /// Leaves an imprint of the turtle shape. Returns the stamp number.
    pub fn stamp(&mut self) -> usize {
        self.stamps += 1;
        let action = self.action(ActionKind::Stamp);
        self.send(action);
        self.stamps
    }

    /// Writes `text` at the current position.
    ///
    /// With `move_pen` set the turtle then moves horizontally to the end of
    /// the text, drawing an underline when the pen is down. The text width is
    /// estimated from [`TEXT_ADVANCE`] and the alignment.
    pub fn write(&mut self, text: impl Into<String>, options: WriteOptions) {
        let text = text.into();
        let width = text.chars().count() as f64 * options.font.size as f64 * TEXT_ADVANCE;
        let end = match options.align {
            Align::Left => width,
            Align::Center => width / 2.0,
            Align::Right => 0.0,
        };
        let mut action = self.action(ActionKind::WriteText);
        action.text = Some(text);
        action.font = Some(options.font);
        action.align = Some(options.align);
        self.send(action);
        if options.move_pen && end > 0.0 {
            self.setx(self.xcor() + end);
        }
    }

    /// Erases this turtle's drawings. The turtle itself does not move.
    pub fn clear(&mut self) {
        let action = self.action(ActionKind::Clear);
        self.send(action);
    }

    /// Clears this turtle's drawings and restores every default.
    pub fn reset(&mut self) {
        self.clear();
        self.state = TurtleState::default();
        self.set_pose(Pose::default());
        self.update_state();
    }

    /// Starts collecting the outline of a shape to fill.
    pub fn begin_fill(&mut self) {
        self.state.style.filling = true;
        let action = self.action(ActionKind::BeginFill);
        self.send(action);
    }

    /// Fills the shape drawn since [`Turtle::begin_fill`].
    pub fn end_fill(&mut self) {
        self.state.style.filling = false;
        let action = self.action(ActionKind::EndFill);
        self.send(action);
    }

    /// True between `begin_fill` and `end_fill`.
    pub fn filling(&self) -> bool {
        self.state.style.filling
    }

    // --- Pen ---

    /// Stops drawing. Takes effect on the next action.
    pub fn penup(&mut self) {
        self.state.pen.down = false;
    }

    /// Resumes drawing. Takes effect on the next action.
    pub fn pendown(&mut self) {
        self.state.pen.down = true;
    }

    pub fn isdown(&self) -> bool {
        self.state.pen.down
    }

    /// Current pen width.
    pub fn pensize(&self) -> f64 {
        self.state.pen.size
    }

    /// Sets the pen width. Negative sizes are clamped to zero.
    pub fn set_pensize(&mut self, size: f64) {
        self.state.pen.size = size.max(0.0);
        self.update_state();
    }

    /// Pen color, decoded for the active color mode.
    pub fn pencolor(&self) -> ColorValue {
        decode_color(self.screen.colormode(), &self.state.pen.color)
    }

    /// Sets the pen color. The color is resolved before anything changes.
    pub fn set_pencolor(&mut self, color: impl Into<ColorSpec>) -> Result<()> {
        self.state.pen.color = build_color(self.screen.colormode(), &color.into())?;
        self.update_state();
        Ok(())
    }

    /// Fill color, decoded for the active color mode.
    pub fn fillcolor(&self) -> ColorValue {
        decode_color(self.screen.colormode(), &self.state.pen.fillcolor)
    }

    /// Sets the fill color.
    pub fn set_fillcolor(&mut self, color: impl Into<ColorSpec>) -> Result<()> {
        self.state.pen.fillcolor = build_color(self.screen.colormode(), &color.into())?;
        self.update_state();
        Ok(())
    }

    /// Sets pen and fill color together. Nothing changes if either is invalid.
    pub fn set_color(&mut self, pen: impl Into<ColorSpec>, fill: impl Into<ColorSpec>) -> Result<()> {
        let mode = self.screen.colormode();
        let pen = build_color(mode, &pen.into())?;
        let fill = build_color(mode, &fill.into())?;
        self.state.pen.color = pen;
        self.state.pen.fillcolor = fill;
        self.update_state();
        Ok(())
    }

    /// The screen's color mode.
    pub fn colormode(&self) -> ColorMode {
        self.screen.colormode()
    }

    /// Switches the color mode for every turtle on the screen.
    pub fn set_colormode(&self, mode: ColorMode) {
        self.screen.set_colormode(mode);
    }

    /// Sets the screen background.
    pub fn bgcolor(&self, color: impl Into<ColorSpec>) -> Result<()> {
        self.screen.bgcolor(color)
    }

    // --- Appearance ---

    /// Stored speed level, `0..=10`.
    pub fn speed(&self) -> u8 {
        self.state.style.speed
    }

    /// Sets the speed from a level or a name. Applies from the next action.
    pub fn set_speed(&mut self, speed: impl Into<Speed>) {
        self.state.style.speed = speed.into().level();
    }

    /// Name of the current shape, builtin or resource.
    pub fn shape(&self) -> &str {
        &self.state.style.shape
    }

    /// Switches to a builtin shape, or loads `name` as an image resource.
    pub fn set_shape(&mut self, name: &str, reload: bool) -> Result<()> {
        if BUILTIN_SHAPES.contains(&name) {
            self.state.style.shape_media = None;
        } else {
            let resource = self.screen.load(name, reload)?;
            self.state.style.shape_media = Some(MediaRef {
                name: resource.name.clone(),
                kind: resource.kind,
                ext: resource.ext.clone(),
            });
        }
        self.state.style.shape = name.to_string();
        self.update_state();
        Ok(())
    }

    /// Returns `(stretch_wid, stretch_len, outline)`.
    pub fn shapesize(&self) -> (f64, f64, f64) {
        let (wid, len) = self.state.pen.stretch;
        (wid, len, self.state.pen.outline)
    }

    /// Stretches the turtle shape. A missing length copies the width.
    pub fn set_shapesize(
        &mut self,
        stretch_wid: Option<f64>,
        stretch_len: Option<f64>,
        outline: Option<f64>,
    ) -> Result<()> {
        let (cur_wid, cur_len) = self.state.pen.stretch;
        let (wid, len) = match (stretch_wid, stretch_len) {
            (Some(w), None) => (w, w),
            (w, l) => (w.unwrap_or(cur_wid), l.unwrap_or(cur_len)),
        };
        if wid == 0.0 || len == 0.0 {
            return Err(TurtleError::ZeroStretch);
        }
        self.state.pen.stretch = (wid, len);
        if let Some(outline) = outline {
            self.state.pen.outline = outline;
        }
        self.update_state();
        Ok(())
    }

    pub fn showturtle(&mut self) {
        self.state.style.visible = true;
        self.update_state();
    }

    pub fn hideturtle(&mut self) {
        self.state.style.visible = false;
        self.update_state();
    }

    pub fn isvisible(&self) -> bool {
        self.state.style.visible
    }

    /// Plays a sound resource on the renderer.
    pub fn play(&mut self, name: &str, reload: bool) -> Result<()> {
        let resource = self.screen.load(name, reload)?;
        if resource.kind != MediaKind::Audio {
            return Err(TurtleError::NotAudio(name.to_string()));
        }
        let mut action = self.action(ActionKind::Sound);
        action.media = Some(MediaRef {
            name: resource.name.clone(),
            kind: resource.kind,
            ext: resource.ext.clone(),
        });
        self.send(action);
        Ok(())
    }

    // --- Queries ---

    /// Position in logical coordinates.
    pub fn pos(&self) -> DVec2 {
        self.state.pose.position
    }

    /// Alias of [`Turtle::pos`].
    pub fn position(&self) -> DVec2 {
        self.pos()
    }

    pub fn xcor(&self) -> f64 {
        self.state.pose.position.x
    }

    pub fn ycor(&self) -> f64 {
        self.state.pose.position.y
    }

    /// Heading in degrees, counter-clockwise from east, in `[0, 360)`.
    pub fn heading(&self) -> f64 {
        self.state.pose.heading
    }

    /// Canvas-space position as last sent to the renderer.
    pub fn canvas_pos(&self) -> DVec2 {
        self.canvas_pos
    }

    /// Bearing from the turtle to `(x, y)`.
    pub fn towards(&self, x: f64, y: f64) -> f64 {
        geometry::towards(self.state.pose, DVec2::new(x, y))
    }

    /// Distance from the turtle to `(x, y)`.
    pub fn distance(&self, x: f64, y: f64) -> f64 {
        geometry::distance(self.state.pose.position, DVec2::new(x, y))
    }

    // --- Lifecycle ---

    /// Sends a final `DONE`, waits for the queue to drain and stops the pacer.
    /// Later commands still update local state but are not delivered.
    pub fn done(&mut self) {
        if self.pacer.is_stopped() {
            return;
        }
        let action = self.action(ActionKind::Done);
        self.send(action);
        self.pacer.stop();
        self.session.forget(self.id);
    }

    // --- Internals ---

    fn set_pose(&mut self, pose: Pose) {
        self.state.pose = pose;
        self.canvas_pos = self.screen.canvas().to_canvas(pose.position);
    }

    fn stroke_kind(&self) -> ActionKind {
        if self.state.pen.down {
            ActionKind::LineAbsolute
        } else {
            ActionKind::MoveAbsolute
        }
    }

    fn update_state(&mut self) {
        let action = self.action(ActionKind::UpdateState);
        self.send(action);
    }

    /// Snapshot of the current state as an action of the given kind, with
    /// no motion attached.
    fn action(&self, kind: ActionKind) -> Action {
        let TurtleState { pose, pen, style } = &self.state;
        Action {
            id: self.id,
            kind,
            position: self.canvas_pos,
            heading: pose.heading,
            pen: pen.down,
            color: pen.color.clone(),
            fillcolor: pen.fillcolor.clone(),
            size: pen.size,
            stretch: pen.stretch,
            outline: pen.outline,
            shape: style.shape.clone(),
            visible: style.visible,
            fill: style.filling,
            speed: style.speed,
            distance: 0.0,
            radius: 0.0,
            clockwise: false,
            large_arc: false,
            media: style.shape_media.clone(),
            text: None,
            font: None,
            align: None,
            needs_delay: false,
        }
    }

    fn send(&self, action: Action) {
        if !self.pacer.push(action) {
            debug!("{}: command after done() ignored", self.id);
        }
    }
}

impl Drop for Turtle {
    fn drop(&mut self) {
        self.pacer.stop();
        self.session.forget(self.id);
    }
}
