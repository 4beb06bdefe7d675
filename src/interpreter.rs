//! Name-based dispatch of turtle commands.
//!
//! The entry point is [`CommandInterpreter`]. Register name-to-operation
//! mappings via [`CommandInterpreter::set_op`] or
//! [`CommandInterpreter::populate_standard_names`] (which also installs the
//! classic short aliases such as `fd` and `rt`), then feed it [`Call`]s,
//! typically produced by [`parse_script`].

use crate::color::{ColorMode, ColorSpec};
use crate::error::{Result, TurtleError};
use crate::pacer::Speed;
use crate::turtle::{Turtle, WriteOptions};
use std::collections::HashMap;

/// Operations a script can invoke.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurtleOp {
    // --- Motion ---
    Forward,
    Backward,
    Left,
    Right,
    Goto,
    Teleport,
    SetX,
    SetY,
    SetHeading,
    Home,
    /// Params: `(radius, extent = 360)`.
    Circle,

    // --- Marks ---
    /// Params: `(size?, color?)`.
    Dot,
    Stamp,
    Write,
    Clear,
    Reset,
    BeginFill,
    EndFill,

    // --- Pen & appearance ---
    PenUp,
    PenDown,
    PenSize,
    PenColor,
    FillColor,
    /// Params: one color for both, or `(pen, fill)`.
    Color,
    /// Params: `(1 | 255)`.
    ColorMode,
    Speed,
    Shape,
    /// Params: `(stretch_wid?, stretch_len?, outline?)`.
    ShapeSize,
    ShowTurtle,
    HideTurtle,

    // --- Screen & lifecycle ---
    BgColor,
    /// Params: `(n)`; `0` disables animation.
    Tracer,
    /// Params: `(name)`.
    Play,
    Done,

    /// No-op; the name has no registered meaning.
    Ignore,
}

/// One argument of a [`Call`].
#[derive(Clone, Debug, PartialEq)]
pub enum Arg {
    Number(f64),
    Text(String),
}

/// A single command invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct Call {
    pub name: String,
    pub args: Vec<Arg>,
    /// 1-based source line, for error messages.
    pub line: usize,
}

impl Call {
    pub fn new(name: impl Into<String>, args: Vec<Arg>) -> Self {
        Self {
            name: name.into(),
            args,
            line: 0,
        }
    }
}

/// Defaults used when a call omits a parameter.
#[derive(Clone, Debug)]
pub struct ScriptConfig {
    pub default_distance: f64,
    pub default_angle: f64,
    pub default_radius: f64,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            default_distance: 10.0,
            default_angle: 90.0,
            default_radius: 50.0,
        }
    }
}

/// Resolves command names to operations and applies them to a turtle.
pub struct CommandInterpreter {
    op_map: HashMap<String, TurtleOp>,
    config: ScriptConfig,
}

impl CommandInterpreter {
    /// Creates an interpreter with an empty name map.
    pub fn new(config: ScriptConfig) -> Self {
        Self {
            op_map: HashMap::new(),
            config,
        }
    }

    /// Interpreter with every standard name and alias registered.
    pub fn standard() -> Self {
        let mut interpreter = Self::new(ScriptConfig::default());
        interpreter.populate_standard_names();
        interpreter
    }

    pub fn set_op(&mut self, name: impl Into<String>, op: TurtleOp) {
        self.op_map.insert(name.into(), op);
    }

    /// Looks up a name. Unregistered names resolve to [`TurtleOp::Ignore`].
    pub fn resolve(&self, name: &str) -> TurtleOp {
        self.op_map.get(name).copied().unwrap_or(TurtleOp::Ignore)
    }

    /// Registers the canonical command names and their classic aliases.
    pub fn populate_standard_names(&mut self) {
        let mappings = [
            // Motion
            ("forward", TurtleOp::Forward),
            ("fd", TurtleOp::Forward),
            ("backward", TurtleOp::Backward),
            ("bk", TurtleOp::Backward),
            ("back", TurtleOp::Backward),
            ("left", TurtleOp::Left),
            ("lt", TurtleOp::Left),
            ("right", TurtleOp::Right),
            ("rt", TurtleOp::Right),
            ("goto", TurtleOp::Goto),
            ("setpos", TurtleOp::Goto),
            ("setposition", TurtleOp::Goto),
            ("teleport", TurtleOp::Teleport),
            ("setx", TurtleOp::SetX),
            ("sety", TurtleOp::SetY),
            ("setheading", TurtleOp::SetHeading),
            ("seth", TurtleOp::SetHeading),
            ("home", TurtleOp::Home),
            ("circle", TurtleOp::Circle),
            // Marks
            ("dot", TurtleOp::Dot),
            ("stamp", TurtleOp::Stamp),
            ("write", TurtleOp::Write),
            ("clear", TurtleOp::Clear),
            ("reset", TurtleOp::Reset),
            ("begin_fill", TurtleOp::BeginFill),
            ("end_fill", TurtleOp::EndFill),
            // Pen
            ("penup", TurtleOp::PenUp),
            ("pu", TurtleOp::PenUp),
            ("up", TurtleOp::PenUp),
            ("pendown", TurtleOp::PenDown),
            ("pd", TurtleOp::PenDown),
            ("down", TurtleOp::PenDown),
            ("pensize", TurtleOp::PenSize),
            ("width", TurtleOp::PenSize),
            ("pencolor", TurtleOp::PenColor),
            ("fillcolor", TurtleOp::FillColor),
            ("color", TurtleOp::Color),
            ("colormode", TurtleOp::ColorMode),
            ("speed", TurtleOp::Speed),
            ("shape", TurtleOp::Shape),
            ("shapesize", TurtleOp::ShapeSize),
            ("turtlesize", TurtleOp::ShapeSize),
            ("showturtle", TurtleOp::ShowTurtle),
            ("st", TurtleOp::ShowTurtle),
            ("hideturtle", TurtleOp::HideTurtle),
            ("ht", TurtleOp::HideTurtle),
            // Screen & lifecycle
            ("bgcolor", TurtleOp::BgColor),
            ("tracer", TurtleOp::Tracer),
            ("play", TurtleOp::Play),
            ("done", TurtleOp::Done),
            ("mainloop", TurtleOp::Done),
        ];

        for (name, op) in mappings {
            self.set_op(name, op);
        }
    }

    /// Applies every call in order, stopping at the first failure.
    pub fn run(&self, turtle: &mut Turtle, calls: &[Call]) -> Result<()> {
        calls.iter().try_for_each(|call| self.apply(turtle, call))
    }

    /// Applies a single call.
    pub fn apply(&self, turtle: &mut Turtle, call: &Call) -> Result<()> {
        let fail = |message: String| TurtleError::Script {
            line: call.line,
            message,
        };
        // Param helpers
        let num = |idx: usize, def: f64| -> Result<f64> {
            match call.args.get(idx) {
                None => Ok(def),
                Some(Arg::Number(n)) => Ok(*n),
                Some(Arg::Text(t)) => Err(fail(format!(
                    "{}: expected a number, found {t:?}",
                    call.name
                ))),
            }
        };
        let text = |idx: usize| -> Result<String> {
            match call.args.get(idx) {
                Some(Arg::Text(t)) => Ok(t.clone()),
                Some(Arg::Number(n)) => Ok(n.to_string()),
                None => Err(fail(format!("{}: missing argument {}", call.name, idx + 1))),
            }
        };
        let cfg = &self.config;

        match self.resolve(&call.name) {
            // --- MOTION ---
            TurtleOp::Forward => turtle.forward(num(0, cfg.default_distance)?),
            TurtleOp::Backward => turtle.backward(num(0, cfg.default_distance)?),
            TurtleOp::Left => turtle.left(num(0, cfg.default_angle)?),
            TurtleOp::Right => turtle.right(num(0, cfg.default_angle)?),
            TurtleOp::Goto => turtle.goto(num(0, 0.0)?, num(1, 0.0)?),
            TurtleOp::Teleport => turtle.teleport(num(0, 0.0)?, num(1, 0.0)?),
            TurtleOp::SetX => turtle.setx(num(0, 0.0)?),
            TurtleOp::SetY => turtle.sety(num(0, 0.0)?),
            TurtleOp::SetHeading => turtle.setheading(num(0, 0.0)?),
            TurtleOp::Home => turtle.home(),
            TurtleOp::Circle => turtle.circle(num(0, cfg.default_radius)?, num(1, 360.0)?),

            // --- MARKS ---
            TurtleOp::Dot => {
                let size = match call.args.first() {
                    Some(Arg::Number(n)) => Some(*n),
                    _ => None,
                };
                let color = call.args.iter().find_map(|a| match a {
                    Arg::Text(t) => Some(ColorSpec::from(t.as_str())),
                    Arg::Number(_) => None,
                });
                turtle.dot(size, color)?;
            }
            TurtleOp::Stamp => {
                turtle.stamp();
            }
            TurtleOp::Write => {
                let words: Vec<String> = (0..call.args.len()).map(&text).collect::<Result<_>>()?;
                turtle.write(words.join(" "), WriteOptions::default());
            }
            TurtleOp::Clear => turtle.clear(),
            TurtleOp::Reset => turtle.reset(),
            TurtleOp::BeginFill => turtle.begin_fill(),
            TurtleOp::EndFill => turtle.end_fill(),

            // --- PEN ---
            TurtleOp::PenUp => turtle.penup(),
            TurtleOp::PenDown => turtle.pendown(),
            TurtleOp::PenSize => turtle.set_pensize(num(0, 1.0)?),
            TurtleOp::PenColor => turtle.set_pencolor(color_arg(call).map_err(fail)?)?,
            TurtleOp::FillColor => turtle.set_fillcolor(color_arg(call).map_err(fail)?)?,
            TurtleOp::Color => {
                let (pen, fill) = color_pair(call).map_err(fail)?;
                turtle.set_color(pen, fill)?;
            }
            TurtleOp::ColorMode => {
                let mode = match num(0, 1.0)? {
                    n if n == 1.0 => ColorMode::Unit,
                    n if n == 255.0 => ColorMode::Byte,
                    n => return Err(fail(format!("colormode: expected 1 or 255, found {n}"))),
                };
                turtle.set_colormode(mode);
            }
            TurtleOp::Speed => {
                let speed = match call.args.first() {
                    Some(Arg::Number(n)) => Speed::Level(*n as i32),
                    Some(Arg::Text(t)) => t.parse::<Speed>().map_err(fail)?,
                    None => return Err(fail("speed: missing argument 1".to_string())),
                };
                turtle.set_speed(speed);
            }
            TurtleOp::Shape => turtle.set_shape(&text(0)?, false)?,
            TurtleOp::ShapeSize => {
                let opt = |idx: usize| -> Result<Option<f64>> {
                    match call.args.get(idx) {
                        None => Ok(None),
                        Some(_) => num(idx, 0.0).map(Some),
                    }
                };
                turtle.set_shapesize(opt(0)?, opt(1)?, opt(2)?)?;
            }
            TurtleOp::ShowTurtle => turtle.showturtle(),
            TurtleOp::HideTurtle => turtle.hideturtle(),

            // --- SCREEN & LIFECYCLE ---
            TurtleOp::BgColor => turtle.bgcolor(color_arg(call).map_err(fail)?)?,
            TurtleOp::Tracer => turtle.screen().tracer(num(0, 1.0)?.max(0.0) as u32),
            TurtleOp::Play => turtle.play(&text(0)?, false)?,
            TurtleOp::Done => turtle.done(),

            TurtleOp::Ignore => {}
        }
        Ok(())
    }
}

/// A color is either one word or three numeric components.
fn color_arg(call: &Call) -> std::result::Result<ColorSpec, String> {
    match call.args.as_slice() {
        [Arg::Text(name)] => Ok(ColorSpec::from(name.as_str())),
        [Arg::Number(r), Arg::Number(g), Arg::Number(b)] => Ok(ColorSpec::Rgb(*r, *g, *b)),
        _ => Err(format!("{}: expected a color name or r g b", call.name)),
    }
}

/// `color` takes one color for both pen and fill, or two colors.
fn color_pair(call: &Call) -> std::result::Result<(ColorSpec, ColorSpec), String> {
    match call.args.as_slice() {
        [Arg::Text(both)] => Ok((both.as_str().into(), both.as_str().into())),
        [Arg::Text(pen), Arg::Text(fill)] => Ok((pen.as_str().into(), fill.as_str().into())),
        [Arg::Number(r), Arg::Number(g), Arg::Number(b)] => {
            Ok((ColorSpec::Rgb(*r, *g, *b), ColorSpec::Rgb(*r, *g, *b)))
        }
        [
            Arg::Number(r1),
            Arg::Number(g1),
            Arg::Number(b1),
            Arg::Number(r2),
            Arg::Number(g2),
            Arg::Number(b2),
        ] => Ok((ColorSpec::Rgb(*r1, *g1, *b1), ColorSpec::Rgb(*r2, *g2, *b2))),
        _ => Err(format!("{}: expected one or two colors", call.name)),
    }
}

/// Parses a small command language: one call per statement, statements
/// separated by newlines or `;`, arguments separated by whitespace or
/// commas. `//` starts a comment. Quoted arguments may contain spaces.
///
/// ```
/// use canvas_turtle::{Arg, parse_script};
///
/// let calls = parse_script("fd 100; rt 90\ndot 20 \"dark red\"").unwrap();
/// assert_eq!(calls.len(), 3);
/// assert_eq!(calls[2].args[1], Arg::Text("dark red".to_string()));
/// ```
pub fn parse_script(source: &str) -> Result<Vec<Call>> {
    let mut calls = Vec::new();
    for (idx, raw) in source.lines().enumerate() {
        let line = idx + 1;
        let code = raw.split("//").next().unwrap_or_default();
        for statement in code.split(';') {
            let mut tokens = tokenize(statement, line)?.into_iter();
            let Some(name) = tokens.next() else {
                continue;
            };
            let name = match name {
                Token::Bare(name) => name,
                Token::Quoted(_) => {
                    return Err(TurtleError::Script {
                        line,
                        message: "statement must start with a command name".to_string(),
                    });
                }
            };
            let args = tokens
                .map(|t| match t {
                    Token::Bare(word) => match word.parse::<f64>() {
                        Ok(n) => Arg::Number(n),
                        Err(_) => Arg::Text(word),
                    },
                    Token::Quoted(s) => Arg::Text(s),
                })
                .collect();
            calls.push(Call { name, args, line });
        }
    }
    Ok(calls)
}

enum Token {
    Bare(String),
    Quoted(String),
}

fn tokenize(statement: &str, line: usize) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = statement.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() || c == ',' {
            chars.next();
        } else if c == '"' {
            chars.next();
            let mut quoted = String::new();
            loop {
                match chars.next() {
                    Some('"') => break,
                    Some(ch) => quoted.push(ch),
                    None => {
                        return Err(TurtleError::Script {
                            line,
                            message: "unterminated string".to_string(),
                        });
                    }
                }
            }
            tokens.push(Token::Quoted(quoted));
        } else {
            let mut word = String::new();
            while let Some(&ch) = chars.peek() {
                if ch.is_whitespace() || ch == ',' || ch == '"' {
                    break;
                }
                word.push(ch);
                chars.next();
            }
            tokens.push(Token::Bare(word));
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_to_canonical_ops() {
        let interpreter = CommandInterpreter::standard();
        assert_eq!(interpreter.resolve("fd"), TurtleOp::Forward);
        assert_eq!(interpreter.resolve("back"), TurtleOp::Backward);
        assert_eq!(interpreter.resolve("seth"), TurtleOp::SetHeading);
        assert_eq!(interpreter.resolve("width"), TurtleOp::PenSize);
        assert_eq!(interpreter.resolve("st"), TurtleOp::ShowTurtle);
        assert_eq!(interpreter.resolve("turtlesize"), TurtleOp::ShapeSize);
        assert_eq!(interpreter.resolve("mainloop"), TurtleOp::Done);
        assert_eq!(interpreter.resolve("moonwalk"), TurtleOp::Ignore);
    }

    #[test]
    fn custom_names_override() {
        let mut interpreter = CommandInterpreter::new(ScriptConfig::default());
        interpreter.set_op("avance", TurtleOp::Forward);
        assert_eq!(interpreter.resolve("avance"), TurtleOp::Forward);
        assert_eq!(interpreter.resolve("fd"), TurtleOp::Ignore);
    }

    #[test]
    fn parses_statements_and_comments() {
        let calls = parse_script("fd 100; rt 90 // turn\n\ngoto -10, 20\npencolor #FF0000").unwrap();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[0], Call { name: "fd".into(), args: vec![Arg::Number(100.0)], line: 1 });
        assert_eq!(calls[2].args, vec![Arg::Number(-10.0), Arg::Number(20.0)]);
        assert_eq!(calls[2].line, 3);
        assert_eq!(calls[3].args, vec![Arg::Text("#FF0000".into())]);
    }

    #[test]
    fn unterminated_string_is_reported_with_line() {
        let err = parse_script("fd 1\nwrite \"oops").unwrap_err();
        assert!(matches!(err, TurtleError::Script { line: 2, .. }));
    }
}
