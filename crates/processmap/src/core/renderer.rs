//! Core renderer trait for document encoding

use anyhow::Result;

use super::Database;

/// Core trait for document renderers
///
/// Rendering is a pure function of the database: the same content always
/// produces the same output.
pub trait Renderer<D: Database>: Send + Sync {
    type Output;

    fn render(&self, database: &D) -> Result<Self::Output>;

    fn name(&self) -> &'static str;

    fn version(&self) -> &'static str;

    fn format(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Diagram, DiagramElement, ElementKind, Notation};
    use crate::plugins::drawio::DrawioRenderer;

    #[test]
    fn test_renderer_identity() {
        let renderer = DrawioRenderer::new();
        assert_eq!(renderer.name(), "drawio");
        assert_eq!(renderer.version(), "0.1.0");
        assert_eq!(renderer.format(), "xml");
    }

    #[test]
    fn test_render_is_deterministic() {
        let renderer = DrawioRenderer::new();
        let mut diagram = Diagram::new("d1", "Order", Some(Notation::Epc));
        diagram
            .add_node(DiagramElement::new("a", ElementKind::Event, "Order received"))
            .unwrap();

        let first = renderer.render(&diagram).unwrap();
        let second = renderer.render(&diagram).unwrap();
        assert_eq!(first, second);
        assert!(first.contains("Order received"));
    }
}
