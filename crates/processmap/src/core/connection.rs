//! Connections between elements
//!
//! Edges are stored as `Connection` records next to the diagram's top-level
//! elements and refer to their endpoints by element id.

use serde::{Deserialize, Serialize};

use super::{Anchor, DiagramError};

/// Stroke and arrowhead of a connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionStyle {
    pub stroke_color: String,
    pub stroke_width: f64,
    pub dashed: bool,
    pub has_arrow: bool,
}

impl Default for ConnectionStyle {
    fn default() -> Self {
        Self {
            stroke_color: "#000000".to_string(),
            stroke_width: 1.0,
            dashed: false,
            has_arrow: true,
        }
    }
}

/// Directed link from one element to another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    pub source_point: Anchor,
    pub target_point: Anchor,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub style: ConnectionStyle,
}

impl Connection {
    /// Create a right-to-left connection with the default style
    ///
    /// Self-loops and empty ids are rejected.
    pub fn new(
        id: impl Into<String>,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
    ) -> Result<Self, DiagramError> {
        let connection = Self {
            id: id.into(),
            source_id: source_id.into(),
            target_id: target_id.into(),
            source_point: Anchor::Right,
            target_point: Anchor::Left,
            label: String::new(),
            style: ConnectionStyle::default(),
        };
        connection.ensure_well_formed()?;
        Ok(connection)
    }

    pub fn with_anchors(mut self, source_point: Anchor, target_point: Anchor) -> Self {
        self.source_point = source_point;
        self.target_point = target_point;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_style(mut self, style: ConnectionStyle) -> Self {
        self.style = style;
        self
    }

    /// Non-empty ids and distinct endpoints
    pub fn ensure_well_formed(&self) -> Result<(), DiagramError> {
        if self.id.trim().is_empty() {
            return Err(DiagramError::invalid_argument("connection id must not be empty"));
        }
        if self.source_id.is_empty() || self.target_id.is_empty() {
            return Err(DiagramError::invalid_argument(format!(
                "connection {} needs both a source and a target",
                self.id
            )));
        }
        if self.source_id == self.target_id {
            return Err(DiagramError::invalid_argument(format!(
                "connection {} would connect {} to itself",
                self.id, self.source_id
            )));
        }
        Ok(())
    }

    /// Whether this connection touches the given element
    pub fn involves(&self, element_id: &str) -> bool {
        self.source_id == element_id || self.target_id == element_id
    }
}
