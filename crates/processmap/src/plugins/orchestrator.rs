//! Plugin orchestrator for the interchange pipeline
//!
//! The orchestrator runs the pieces in order:
//! Detector (notation) → Parser (draw.io XML → Diagram) → Renderer (Diagram → XML)

use anyhow::Result;
use tracing::{debug, info, span, trace, Level};

use crate::core::{Detector, Diagram, DiagramError, Notation, Parser, Renderer};
use crate::plugins::drawio::cell::scan_document;
use crate::plugins::drawio::{DrawioParser, DrawioRenderer};
use crate::plugins::notation::{default_detectors, first_match};

/// Plugin orchestrator that coordinates the interchange pipeline
///
/// Detectors are consulted in registration order; the first that fires
/// decides the notation.
pub struct Orchestrator {
    detectors: Vec<Box<dyn Detector>>,
    parser: DrawioParser,
    renderer: DrawioRenderer,
}

impl Orchestrator {
    /// Create an orchestrator without detectors
    pub fn new() -> Self {
        Self {
            detectors: Vec::new(),
            parser: DrawioParser::new(),
            renderer: DrawioRenderer::new(),
        }
    }

    /// Create an orchestrator with the built-in notation detectors
    pub fn with_default_detectors() -> Self {
        let mut orchestrator = Self::new();
        for detector in default_detectors() {
            orchestrator.register_detector(detector);
        }
        orchestrator
    }

    /// Register a detector after the ones already present
    pub fn register_detector(&mut self, detector: Box<dyn Detector>) {
        trace!(notation = %detector.notation(), "Registering detector");
        self.detectors.push(detector);
    }

    /// Notations of the registered detectors, in priority order
    pub fn get_detectors(&self) -> Vec<Notation> {
        self.detectors.iter().map(|d| d.notation()).collect()
    }

    /// Notation of a draw.io document
    pub fn detect_notation(&self, xml: &str) -> Result<Notation, DiagramError> {
        let detect_span = span!(Level::INFO, "detect_notation", input_len = xml.len());
        let _enter = detect_span.enter();

        let scan = scan_document(xml)?;
        let notation = first_match(&self.detectors, &scan.styles());
        debug!(%notation, cell_count = scan.cells.len(), "Detected notation");
        Ok(notation)
    }

    /// Decode a draw.io document
    ///
    /// The decoded diagram carries the notation chosen by this orchestrator's
    /// detectors.
    pub fn import(&self, xml: &str) -> Result<Diagram> {
        let import_span = span!(Level::INFO, "import_diagram", input_len = xml.len());
        let _enter = import_span.enter();

        if !self.parser.can_parse(xml) {
            return Err(DiagramError::malformed_input("input is not a draw.io document").into());
        }

        let notation = self.detect_notation(xml)?;
        let mut diagram = Diagram::new(String::new(), String::new(), None);
        self.parser.parse(xml, &mut diagram)?;
        diagram.notation = Some(notation);

        info!(diagram_id = %diagram.id, %notation, "Import completed");
        Ok(diagram)
    }

    /// Encode a diagram as a draw.io document
    pub fn export(&self, diagram: &Diagram) -> Result<String> {
        let export_span = span!(Level::INFO, "export_diagram", diagram_id = %diagram.id);
        let _enter = export_span.enter();

        let xml = self.renderer.render(diagram)?;
        info!(output_len = xml.len(), "Export completed");
        Ok(xml)
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::with_default_detectors()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DiagramElement, ElementKind};
    use crate::plugins::notation::{EpcDetector, OrgDetector};

    const ORG_AND_EPC: &str = r#"<mxfile><diagram id="d" name="Mixed"><mxGraphModel><root>
        <mxCell id="0"/><mxCell id="1" parent="0"/>
        <mxCell id="a" value="Clerk" style="ellipse;fillColor=#f8cecc" parent="1" vertex="1"><mxGeometry x="0" y="0" width="100" height="60" as="geometry"/></mxCell>
        <mxCell id="b" value="Order received" style="shape=hexagon;fillColor=#ffe6cc" parent="1" vertex="1"><mxGeometry x="200" y="0" width="120" height="60" as="geometry"/></mxCell>
        </root></mxGraphModel></diagram></mxfile>"#;

    #[test]
    fn test_orchestrator_creation() {
        let orchestrator = Orchestrator::new();
        assert!(orchestrator.get_detectors().is_empty());
        assert_eq!(
            Orchestrator::default().get_detectors(),
            vec![Notation::Vad, Notation::Epc, Notation::Org]
        );
    }

    #[test]
    fn test_detection_follows_registration_order() {
        let mut orchestrator = Orchestrator::new();
        orchestrator.register_detector(Box::new(OrgDetector::new()));
        orchestrator.register_detector(Box::new(EpcDetector::new()));
        assert_eq!(orchestrator.detect_notation(ORG_AND_EPC).unwrap(), Notation::Org);

        let orchestrator = Orchestrator::with_default_detectors();
        assert_eq!(orchestrator.detect_notation(ORG_AND_EPC).unwrap(), Notation::Epc);
    }

    #[test]
    fn test_no_detectors_means_vad() {
        let orchestrator = Orchestrator::new();
        assert_eq!(orchestrator.detect_notation(ORG_AND_EPC).unwrap(), Notation::Vad);
    }

    #[test]
    fn test_detect_rejects_non_documents() {
        let orchestrator = Orchestrator::default();
        let err = orchestrator.detect_notation("<html/>").unwrap_err();
        assert!(err.is_malformed_input());
    }

    #[test]
    fn test_import_uses_registered_detectors() {
        let mut orchestrator = Orchestrator::new();
        orchestrator.register_detector(Box::new(OrgDetector::new()));
        let diagram = orchestrator.import(ORG_AND_EPC).unwrap();
        assert_eq!(diagram.notation, Some(Notation::Org));
        assert_eq!(diagram.elements().len(), 2);
    }

    #[test]
    fn test_import_rejects_plain_text() {
        let orchestrator = Orchestrator::default();
        let err = orchestrator.import("graph TD; A-->B").unwrap_err();
        assert!(err.to_string().contains("Malformed input"));
    }

    #[test]
    fn test_export_then_import() {
        let orchestrator = Orchestrator::default();
        let mut diagram = Diagram::new("d1", "Flow", Some(Notation::Vad));
        diagram
            .add_element(DiagramElement::new("p", ElementKind::BaseVad, "Sell"))
            .unwrap();
        let xml = orchestrator.export(&diagram).unwrap();
        let back = orchestrator.import(&xml).unwrap();
        assert_eq!(back.id, "d1");
        assert_eq!(back.elements().len(), 1);
    }
}
