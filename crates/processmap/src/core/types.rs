//! Core types for diagram processing
//!
//! Closed vocabularies shared by the model and the codec: notations, element
//! kinds, the shape families recognised in draw.io styles, and connection
//! anchors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::DiagramError;

/// Supported diagram families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Notation {
    /// Value-added chain diagram
    #[default]
    Vad,
    /// Event-driven process chain
    Epc,
    /// Organizational chart
    Org,
    /// Basic process notation
    Bpmn,
}

impl Notation {
    /// All notations in catalogue order
    pub const ALL: [Notation; 4] = [Notation::Vad, Notation::Epc, Notation::Org, Notation::Bpmn];

    /// Short tag used in files and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Notation::Vad => "vad",
            Notation::Epc => "epc",
            Notation::Org => "org",
            Notation::Bpmn => "bpmn",
        }
    }
}

impl FromStr for Notation {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vad" => Ok(Notation::Vad),
            "epc" => Ok(Notation::Epc),
            "org" => Ok(Notation::Org),
            "bpmn" => Ok(Notation::Bpmn),
            _ => Err(DiagramError::unknown_notation(s)),
        }
    }
}

impl fmt::Display for Notation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic tag of a diagram element
///
/// Tags outside the known vocabulary are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ElementKind {
    BaseVad,
    DetailVad,
    ExternVad,
    Event,
    Function,
    Connector,
    OrgUnit,
    Person,
    Position,
    Department,
    Note,
    Task,
    Gateway,
    /// VAD sequence arrow
    HasNext,
    Connection,
    #[default]
    Shape,
    Other(String),
}

impl ElementKind {
    pub fn as_str(&self) -> &str {
        match self {
            ElementKind::BaseVad => "baseVAD",
            ElementKind::DetailVad => "detailVAD",
            ElementKind::ExternVad => "externVAD",
            ElementKind::Event => "event",
            ElementKind::Function => "function",
            ElementKind::Connector => "connector",
            ElementKind::OrgUnit => "orgUnit",
            ElementKind::Person => "person",
            ElementKind::Position => "position",
            ElementKind::Department => "department",
            ElementKind::Note => "note",
            ElementKind::Task => "task",
            ElementKind::Gateway => "gateway",
            ElementKind::HasNext => "hasNext",
            ElementKind::Connection => "connection",
            ElementKind::Shape => "shape",
            ElementKind::Other(tag) => tag,
        }
    }

    /// Parse a tag; unknown tags become `Other`
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "baseVAD" => ElementKind::BaseVad,
            "detailVAD" => ElementKind::DetailVad,
            "externVAD" => ElementKind::ExternVad,
            "event" => ElementKind::Event,
            "function" => ElementKind::Function,
            "connector" => ElementKind::Connector,
            "orgUnit" => ElementKind::OrgUnit,
            "person" => ElementKind::Person,
            "position" => ElementKind::Position,
            "department" => ElementKind::Department,
            "note" => ElementKind::Note,
            "task" => ElementKind::Task,
            "gateway" => ElementKind::Gateway,
            "hasNext" => ElementKind::HasNext,
            "connection" => ElementKind::Connection,
            "shape" | "" => ElementKind::Shape,
            other => ElementKind::Other(other.to_string()),
        }
    }

    /// Edge kinds
    pub fn is_connection(&self) -> bool {
        matches!(self, ElementKind::HasNext | ElementKind::Connection)
    }

    /// The three value-chain process subtypes
    pub fn is_vad_process(&self) -> bool {
        matches!(
            self,
            ElementKind::BaseVad | ElementKind::DetailVad | ElementKind::ExternVad
        )
    }
}

impl From<String> for ElementKind {
    fn from(tag: String) -> Self {
        ElementKind::from_tag(&tag)
    }
}

impl From<&str> for ElementKind {
    fn from(tag: &str) -> Self {
        ElementKind::from_tag(tag)
    }
}

impl From<ElementKind> for String {
    fn from(kind: ElementKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape family recognised from a draw.io style string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum ShapeKind {
    /// Value-chain chevron (`mxgraph.arrows2.arrow`)
    Chevron,
    Hexagon,
    Rhombus,
    Ellipse,
    Note,
    #[default]
    Rectangle,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeKind::Chevron => write!(f, "chevron"),
            ShapeKind::Hexagon => write!(f, "hexagon"),
            ShapeKind::Rhombus => write!(f, "rhombus"),
            ShapeKind::Ellipse => write!(f, "ellipse"),
            ShapeKind::Note => write!(f, "note"),
            ShapeKind::Rectangle => write!(f, "rectangle"),
        }
    }
}

/// Side of a shape a connection attaches to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Top,
    Right,
    Bottom,
    Left,
}

impl Anchor {
    /// Relative draw.io constraint (`exitX/exitY` or `entryX/entryY`)
    pub fn constraint(&self) -> (f64, f64) {
        match self {
            Anchor::Top => (0.5, 0.0),
            Anchor::Right => (1.0, 0.5),
            Anchor::Bottom => (0.5, 1.0),
            Anchor::Left => (0.0, 0.5),
        }
    }

    /// Map a relative constraint back to a side, if it is one of the four midpoints
    pub fn from_constraint(x: f64, y: f64) -> Option<Self> {
        [Anchor::Top, Anchor::Right, Anchor::Bottom, Anchor::Left]
            .into_iter()
            .find(|anchor| anchor.constraint() == (x, y))
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anchor::Top => write!(f, "top"),
            Anchor::Right => write!(f, "right"),
            Anchor::Bottom => write!(f, "bottom"),
            Anchor::Left => write!(f, "left"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notation_parsing() {
        assert_eq!("vad".parse::<Notation>().unwrap(), Notation::Vad);
        assert_eq!("EPC".parse::<Notation>().unwrap(), Notation::Epc);
        assert_eq!(" org ".parse::<Notation>().unwrap(), Notation::Org);
        assert_eq!("bpmn".parse::<Notation>().unwrap(), Notation::Bpmn);
        assert!(matches!(
            "uml".parse::<Notation>(),
            Err(DiagramError::UnknownNotation { .. })
        ));
    }

    #[test]
    fn test_notation_display_and_serde() {
        assert_eq!(Notation::Epc.to_string(), "epc");
        assert_eq!(serde_json::to_string(&Notation::Bpmn).unwrap(), "\"bpmn\"");
        assert_eq!(Notation::default(), Notation::Vad);
    }

    #[test]
    fn test_element_kind_tags() {
        for tag in [
            "baseVAD",
            "detailVAD",
            "externVAD",
            "event",
            "function",
            "connector",
            "orgUnit",
            "person",
            "position",
            "department",
            "note",
            "task",
            "gateway",
            "hasNext",
            "connection",
            "shape",
        ] {
            let kind = ElementKind::from_tag(tag);
            assert!(!matches!(kind, ElementKind::Other(_)), "{tag} not known");
            assert_eq!(kind.as_str(), tag);
        }
        assert_eq!(
            ElementKind::from_tag("swimlane"),
            ElementKind::Other("swimlane".to_string())
        );
    }

    #[test]
    fn test_element_kind_serde_uses_tags() {
        let json = serde_json::to_string(&ElementKind::BaseVad).unwrap();
        assert_eq!(json, "\"baseVAD\"");
        let kind: ElementKind = serde_json::from_str("\"custom\"").unwrap();
        assert_eq!(kind, ElementKind::Other("custom".to_string()));
    }

    #[test]
    fn test_element_kind_predicates() {
        assert!(ElementKind::HasNext.is_connection());
        assert!(ElementKind::Connection.is_connection());
        assert!(!ElementKind::Event.is_connection());
        assert!(ElementKind::DetailVad.is_vad_process());
        assert!(!ElementKind::Function.is_vad_process());
    }

    #[test]
    fn test_anchor_constraints() {
        for anchor in [Anchor::Top, Anchor::Right, Anchor::Bottom, Anchor::Left] {
            let (x, y) = anchor.constraint();
            assert_eq!(Anchor::from_constraint(x, y), Some(anchor));
        }
        assert_eq!(Anchor::from_constraint(0.25, 0.0), None);
    }

    #[test]
    fn test_shape_kind_display() {
        assert_eq!(ShapeKind::Chevron.to_string(), "chevron");
        assert_eq!(ShapeKind::default(), ShapeKind::Rectangle);
    }
}
