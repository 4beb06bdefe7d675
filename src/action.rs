//! The action record: the one stable boundary between the turtle engine and
//! whatever renders it.

use crate::resource::MediaKind;
use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a turtle within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurtleId(pub u64);

impl fmt::Display for TurtleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "turtle-{}", self.0)
    }
}

/// Kind of state change an [`Action`] describes.
///
/// Tags follow SVG path command letters where one exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    #[serde(rename = "M")]
    MoveAbsolute,
    #[serde(rename = "m")]
    MoveRelative,
    #[serde(rename = "L")]
    LineAbsolute,
    #[serde(rename = "D")]
    DrawDot,
    #[serde(rename = "W")]
    WriteText,
    #[serde(rename = "C")]
    Circle,
    #[serde(rename = "S")]
    Sound,
    #[serde(rename = "CLR")]
    Clear,
    #[serde(rename = "UPDATE_STATE")]
    UpdateState,
    #[serde(rename = "STAMP")]
    Stamp,
    #[serde(rename = "BEGIN_FILL")]
    BeginFill,
    #[serde(rename = "END_FILL")]
    EndFill,
    #[serde(rename = "DONE")]
    Done,
}

impl ActionKind {
    pub fn tag(self) -> &'static str {
        match self {
            ActionKind::MoveAbsolute => "M",
            ActionKind::MoveRelative => "m",
            ActionKind::LineAbsolute => "L",
            ActionKind::DrawDot => "D",
            ActionKind::WriteText => "W",
            ActionKind::Circle => "C",
            ActionKind::Sound => "S",
            ActionKind::Clear => "CLR",
            ActionKind::UpdateState => "UPDATE_STATE",
            ActionKind::Stamp => "STAMP",
            ActionKind::BeginFill => "BEGIN_FILL",
            ActionKind::EndFill => "END_FILL",
            ActionKind::Done => "DONE",
        }
    }
}

/// Horizontal anchoring of written text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Font triple as `(family, size, style)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    pub size: u32,
    pub style: String,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: "Arial".to_string(),
            size: 8,
            style: "normal".to_string(),
        }
    }
}

impl Font {
    pub fn new(family: impl Into<String>, size: u32, style: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            size,
            style: style.into(),
        }
    }
}

/// Reference to a loaded media resource. The payload itself stays with the
/// screen's resource cache.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub ext: String,
}

/// Immutable record of one state change of one turtle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub id: TurtleId,
    #[serde(rename = "type")]
    pub kind: ActionKind,
    /// Position after the change, in canvas space.
    pub position: DVec2,
    /// Heading in degrees, counter-clockwise from east.
    pub heading: f64,
    pub pen: bool,
    pub color: String,
    pub fillcolor: String,
    /// Pen width, or the dot diameter for [`ActionKind::DrawDot`].
    pub size: f64,
    /// Shape stretch as `(width, length)`.
    pub stretch: (f64, f64),
    pub outline: f64,
    pub shape: String,
    pub visible: bool,
    pub fill: bool,
    pub speed: u8,
    /// Magnitude of the motion just performed; never negative.
    pub distance: f64,
    pub radius: f64,
    pub clockwise: bool,
    pub large_arc: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,
    pub needs_delay: bool,
}

impl Action {
    /// Flattens the action into a plain key-value record for a renderer.
    pub fn to_record(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Action {
        Action {
            id: TurtleId(7),
            kind: ActionKind::LineAbsolute,
            position: DVec2::new(410.0, 250.0),
            heading: 0.0,
            pen: true,
            color: "black".to_string(),
            fillcolor: "black".to_string(),
            size: 1.0,
            stretch: (1.0, 1.0),
            outline: 1.0,
            shape: "default".to_string(),
            visible: true,
            fill: false,
            speed: 3,
            distance: 10.0,
            radius: 0.0,
            clockwise: false,
            large_arc: false,
            media: None,
            text: None,
            font: None,
            align: None,
            needs_delay: true,
        }
    }

    #[test]
    fn record_uses_wire_names() {
        let record = sample().to_record();
        assert_eq!(record["type"], "L");
        assert_eq!(record["id"], 7);
        assert_eq!(record["position"], serde_json::json!([410.0, 250.0]));
        assert_eq!(record["largeArc"], false);
        assert_eq!(record["needsDelay"], true);
        assert!(record.get("text").is_none());
    }

    #[test]
    fn text_fields_appear_when_present() {
        let mut action = sample();
        action.kind = ActionKind::WriteText;
        action.text = Some("hi".to_string());
        action.font = Some(Font::default());
        action.align = Some(Align::Center);
        let record = action.to_record();
        assert_eq!(record["type"], "W");
        assert_eq!(record["align"], "center");
        assert_eq!(record["font"]["family"], "Arial");
    }

    #[test]
    fn tags_match_serde_names() {
        for kind in [ActionKind::Clear, ActionKind::UpdateState, ActionKind::EndFill] {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, kind.tag());
        }
    }
}
