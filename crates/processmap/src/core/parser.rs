//! Core parser trait for document decoding

use anyhow::Result;

use super::Database;

/// Core trait for document parsers
///
/// A parser reads a complete document and fills the database with what it
/// finds. Document-level failures are errors; problems with single records
/// are skipped and logged.
pub trait Parser<D: Database>: Send + Sync {
    fn parse(&self, input: &str, database: &mut D) -> Result<()>;

    fn name(&self) -> &'static str;

    fn version(&self) -> &'static str;

    /// Cheap check that the input looks like this parser's format
    fn can_parse(&self, input: &str) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Diagram, Notation};
    use crate::plugins::drawio::DrawioParser;

    #[test]
    fn test_parser_identity() {
        let parser = DrawioParser::new();
        assert_eq!(parser.name(), "drawio");
        assert_eq!(parser.version(), "0.1.0");
    }

    #[test]
    fn test_parser_can_parse() {
        let parser = DrawioParser::new();
        assert!(parser.can_parse("<mxfile><diagram id=\"d\"/></mxfile>"));
        assert!(!parser.can_parse("graph TD; A-->B"));
    }

    #[test]
    fn test_parse_into_database() {
        let parser = DrawioParser::new();
        let mut diagram = Diagram::new("d", "scratch", Some(Notation::Epc));
        let xml = r#"<mxfile><diagram id="d1" name="x"><mxGraphModel><root>
            <mxCell id="0"/><mxCell id="1" parent="0"/>
            <mxCell id="a" value="A" style="shape=hexagon" parent="1" vertex="1">
              <mxGeometry x="1" y="2" width="3" height="4" as="geometry"/>
            </mxCell>
        </root></mxGraphModel></diagram></mxfile>"#;
        parser.parse(xml, &mut diagram).unwrap();
        assert_eq!(diagram.node_count(), 1);
        assert_eq!(diagram.edge_count(), 0);
    }
}
