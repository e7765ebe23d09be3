//! processmap - business-process diagrams and the draw.io format
//!
//! A library holding the diagram model (value chains, event-driven process
//! chains, org charts and BPMN) and a codec to and from draw.io XML.
//!
//! # Quick Start
//!
//! ```rust
//! use processmap::{decode, encode};
//!
//! let xml = r#"<mxfile><diagram id="d1" name="Sales"><mxGraphModel><root>
//!   <mxCell id="0"/><mxCell id="1" parent="0"/>
//!   <mxCell id="p1" value="Sell" style="shape=mxgraph.arrows2.arrow;fillColor=#B9E0A5" parent="1" vertex="1">
//!     <mxGeometry x="10" y="20" width="100" height="60" as="geometry"/>
//!   </mxCell>
//! </root></mxGraphModel></diagram></mxfile>"#;
//!
//! let diagram = decode(xml).unwrap();
//! assert_eq!(diagram.elements().len(), 1);
//!
//! let again = encode(&diagram).unwrap();
//! assert!(again.contains(r#"id="p1""#));
//! ```
//!
//! # Advanced Usage
//!
//! For more control, use the individual components:
//!
//! ```rust
//! use processmap::prelude::*;
//!
//! let config = NotationConfig::default();
//! let mut diagram = Diagram::create_new(Notation::Epc);
//! let event = config.create_element(Notation::Epc, "event").unwrap();
//! let function = config.create_element(Notation::Epc, "function").unwrap();
//! let link = Connection::new("c1", &event.id, &function.id).unwrap();
//! diagram.add_element(event).unwrap();
//! diagram.add_element(function).unwrap();
//! diagram.add_connection(link).unwrap();
//! assert!(diagram.validate().is_valid);
//!
//! let xml = DrawioRenderer::new().render(&diagram).unwrap();
//! let mut decoded = Diagram::new("", "", None);
//! DrawioParser::new().parse(&xml, &mut decoded).unwrap();
//! assert_eq!(decoded.notation, Some(Notation::Epc));
//! assert_eq!(decoded.connections().len(), 1);
//! ```

pub mod core;
pub mod plugins;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use core::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        Anchor, Connection, ConnectionStyle, Database, Detector, Diagram, DiagramElement,
        DiagramError, DiagramRepository, ElementKind, Model, ModelRepository, Notation, Parser,
        Point, Renderer, Size, Style, ValidationReport,
    };
    pub use crate::plugins::drawio::{DrawioParser, DrawioRenderer};
    pub use crate::plugins::notation::NotationConfig;
    pub use crate::plugins::orchestrator::Orchestrator;
}

/// Decode a draw.io document into a diagram
///
/// The notation is inferred from the cell styles.
///
/// # Example
/// ```rust
/// let err = processmap::decode("<html/>").unwrap_err();
/// assert!(err.is_malformed_input());
/// ```
pub fn decode(xml: &str) -> Result<Diagram, DiagramError> {
    plugins::drawio::DrawioParser::new().decode(xml)
}

/// Encode a diagram as a draw.io document
pub fn encode(diagram: &Diagram) -> Result<String, DiagramError> {
    plugins::drawio::DrawioRenderer::new().encode(diagram)
}

/// Notation of a draw.io document, judged with the built-in detectors
pub fn detect_notation(xml: &str) -> Result<Notation, DiagramError> {
    plugins::orchestrator::Orchestrator::with_default_detectors().detect_notation(xml)
}
