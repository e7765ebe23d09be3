//! draw.io XML encoder
//!
//! Output layout: `mxfile > diagram > mxGraphModel > root`, with the two
//! sentinel cells first, then one cell per element (children flattened after
//! their parent, nesting expressed by `parent`), then one edge cell per
//! resolvable connection. The graph model attributes are constant.
//!
//! Elements with properties are wrapped the way draw.io stores custom data:
//! `<UserObject label=".." role=".." id=".."><mxCell .../></UserObject>`.
//! Non-string property values are written as their JSON text.

use anyhow::Result;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use serde_json::Value;
use tracing::{debug, span, trace, warn, Level};

use crate::core::style::format_number;
use crate::core::{Connection, Diagram, DiagramElement, DiagramError, Renderer};

/// Canvas settings written on every `mxGraphModel`
pub const GRAPH_MODEL_ATTRIBUTES: [(&str, &str); 13] = [
    ("dx", "800"),
    ("dy", "800"),
    ("grid", "1"),
    ("gridSize", "10"),
    ("guides", "1"),
    ("tooltips", "1"),
    ("connect", "1"),
    ("arrows", "1"),
    ("fold", "1"),
    ("page", "1"),
    ("pageScale", "1"),
    ("pageWidth", "850"),
    ("pageHeight", "1100"),
];

/// Encoder from a [`Diagram`] to draw.io XML
#[derive(Debug, Default, Clone, Copy)]
pub struct DrawioRenderer;

type XmlWriter = Writer<Vec<u8>>;

fn write(writer: &mut XmlWriter, event: Event<'_>) -> Result<(), DiagramError> {
    writer
        .write_event(event)
        .map_err(|e| DiagramError::render_error(e.to_string()))
}

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

/// Whether a property key can be written as a `UserObject` attribute
fn is_attribute_name(key: &str) -> bool {
    let mut chars = key.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    valid_start
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && key != "id"
        && key != "label"
}

fn property_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Properties of an element that go on its `UserObject` wrapper
fn wrapper_attributes(element: &DiagramElement) -> Vec<(&str, String)> {
    element
        .properties
        .iter()
        .filter_map(|(key, value)| {
            if is_attribute_name(key) {
                Some((key.as_str(), property_text(value)))
            } else {
                warn!(element_id = %element.id, key = %key, "Property cannot be written as an attribute, leaving it out");
                None
            }
        })
        .collect()
}

/// Wire style of an edge cell
pub fn connection_wire_style(connection: &Connection) -> String {
    let (exit_x, exit_y) = connection.source_point.constraint();
    let (entry_x, entry_y) = connection.target_point.constraint();
    let mut style = format!(
        "endArrow={};html=1;strokeColor={};strokeWidth={};exitX={};exitY={};entryX={};entryY={}",
        if connection.style.has_arrow { "classic" } else { "none" },
        connection.style.stroke_color,
        format_number(connection.style.stroke_width),
        format_number(exit_x),
        format_number(exit_y),
        format_number(entry_x),
        format_number(entry_y),
    );
    if connection.style.dashed {
        style.push_str(";dashed=1");
    }
    style
}

impl DrawioRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Encode a diagram; the same diagram always yields the same text
    pub fn encode(&self, diagram: &Diagram) -> Result<String, DiagramError> {
        let encode_span = span!(Level::INFO, "encode_drawio", diagram_id = %diagram.id);
        let _enter = encode_span.enter();

        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        write(&mut writer, Event::Start(BytesStart::new("mxfile")))?;

        let mut diagram_node = BytesStart::new("diagram");
        diagram_node.push_attribute(("id", diagram.id.as_str()));
        diagram_node.push_attribute(("name", diagram.name.as_str()));
        write(&mut writer, Event::Start(diagram_node))?;

        let mut graph_model = BytesStart::new("mxGraphModel");
        for attr in GRAPH_MODEL_ATTRIBUTES {
            graph_model.push_attribute(attr);
        }
        write(&mut writer, Event::Start(graph_model))?;
        write(&mut writer, Event::Start(BytesStart::new("root")))?;

        let mut sentinel = BytesStart::new("mxCell");
        sentinel.push_attribute(("id", "0"));
        write(&mut writer, Event::Empty(sentinel))?;
        let mut layer = BytesStart::new("mxCell");
        layer.push_attribute(("id", "1"));
        layer.push_attribute(("parent", "0"));
        write(&mut writer, Event::Empty(layer))?;

        let elements = diagram.all_elements();
        for element in &elements {
            self.write_element(&mut writer, element)?;
        }

        let connections = diagram.resolved_connections();
        let skipped = diagram.connections().len() - connections.len();
        if skipped > 0 {
            debug!(skipped, "Leaving out connections with missing endpoints");
        }
        for connection in &connections {
            self.write_connection(&mut writer, connection)?;
        }

        write(&mut writer, Event::End(BytesEnd::new("root")))?;
        write(&mut writer, Event::End(BytesEnd::new("mxGraphModel")))?;
        write(&mut writer, Event::End(BytesEnd::new("diagram")))?;
        write(&mut writer, Event::End(BytesEnd::new("mxfile")))?;

        let xml = String::from_utf8(writer.into_inner())
            .map_err(|e| DiagramError::render_error(e.to_string()))?;
        debug!(
            element_count = elements.len(),
            connection_count = connections.len(),
            output_len = xml.len(),
            "Encoded diagram"
        );
        Ok(xml)
    }

    fn write_element(
        &self,
        writer: &mut XmlWriter,
        element: &DiagramElement,
    ) -> Result<(), DiagramError> {
        trace!(element_id = %element.id, "Writing element cell");
        let style = element.style.to_wire_style();
        let attributes = wrapper_attributes(element);
        let wrapped = !attributes.is_empty();

        let mut cell = BytesStart::new("mxCell");
        if wrapped {
            let mut wrapper = BytesStart::new("UserObject");
            wrapper.push_attribute(("label", element.name.as_str()));
            for (key, value) in &attributes {
                wrapper.push_attribute((*key, value.as_str()));
            }
            wrapper.push_attribute(("id", element.id.as_str()));
            write(writer, Event::Start(wrapper))?;
        } else {
            cell.push_attribute(("id", element.id.as_str()));
            cell.push_attribute(("value", element.name.as_str()));
        }
        cell.push_attribute(("style", style.as_str()));
        cell.push_attribute(("parent", element.parent_id.as_deref().unwrap_or("1")));
        cell.push_attribute(("vertex", flag(element.is_shape())));
        cell.push_attribute(("edge", flag(element.is_connection())));
        write(writer, Event::Start(cell))?;

        let x = format_number(element.position.x);
        let y = format_number(element.position.y);
        let width = format_number(element.size.width);
        let height = format_number(element.size.height);
        let mut geometry = BytesStart::new("mxGeometry");
        geometry.push_attribute(("x", x.as_str()));
        geometry.push_attribute(("y", y.as_str()));
        geometry.push_attribute(("width", width.as_str()));
        geometry.push_attribute(("height", height.as_str()));
        geometry.push_attribute(("as", "geometry"));
        write(writer, Event::Empty(geometry))?;

        write(writer, Event::End(BytesEnd::new("mxCell")))?;
        if wrapped {
            write(writer, Event::End(BytesEnd::new("UserObject")))?;
        }
        Ok(())
    }

    fn write_connection(
        &self,
        writer: &mut XmlWriter,
        connection: &Connection,
    ) -> Result<(), DiagramError> {
        trace!(connection_id = %connection.id, "Writing edge cell");
        let style = connection_wire_style(connection);
        let mut cell = BytesStart::new("mxCell");
        cell.push_attribute(("id", connection.id.as_str()));
        cell.push_attribute(("value", connection.label.as_str()));
        cell.push_attribute(("style", style.as_str()));
        cell.push_attribute(("parent", "1"));
        cell.push_attribute(("vertex", "0"));
        cell.push_attribute(("edge", "1"));
        cell.push_attribute(("source", connection.source_id.as_str()));
        cell.push_attribute(("target", connection.target_id.as_str()));
        write(writer, Event::Start(cell))?;

        let mut geometry = BytesStart::new("mxGeometry");
        geometry.push_attribute(("relative", "1"));
        geometry.push_attribute(("as", "geometry"));
        write(writer, Event::Empty(geometry))?;

        write(writer, Event::End(BytesEnd::new("mxCell")))
    }
}

impl Renderer<Diagram> for DrawioRenderer {
    type Output = String;

    fn render(&self, database: &Diagram) -> Result<Self::Output> {
        Ok(self.encode(database)?)
    }

    fn name(&self) -> &'static str {
        "drawio"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn format(&self) -> &'static str {
        "xml"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Anchor, ConnectionStyle, ElementKind, Notation, Point, Size, Style};
    use crate::plugins::drawio::cell::scan_document;

    fn sample() -> Diagram {
        let mut diagram = Diagram::new("d1", "Sales & Ops", Some(Notation::Vad));
        let mut parent = DiagramElement::new("a", ElementKind::BaseVad, "Sell <fast>")
            .with_position(Point::new(10.0, 20.5))
            .with_size(Size::new(100.0, 60.0))
            .with_style(Style::new().with_fill_color("#B9E0A5"));
        parent
            .add_child(DiagramElement::new("b", ElementKind::Note, "Remark"))
            .unwrap();
        diagram.add_element(parent).unwrap();
        diagram
            .add_element(DiagramElement::new("c", ElementKind::DetailVad, "Ship"))
            .unwrap();
        diagram
            .add_connection(Connection::new("e1", "a", "c").unwrap().with_label("next"))
            .unwrap();
        diagram
            .add_connection(Connection::new("e2", "a", "ghost").unwrap())
            .unwrap();
        diagram
    }

    #[test]
    fn test_document_layout() {
        let xml = DrawioRenderer::new().encode(&sample()).unwrap();
        assert!(xml.starts_with("<mxfile>"));
        assert!(xml.contains(r#"<diagram id="d1" name="Sales &amp; Ops">"#));
        assert!(xml.contains(
            r#"<mxGraphModel dx="800" dy="800" grid="1" gridSize="10" guides="1" tooltips="1" connect="1" arrows="1" fold="1" page="1" pageScale="1" pageWidth="850" pageHeight="1100">"#
        ));
        assert!(xml.contains(r#"<mxCell id="0"/>"#));
        assert!(xml.contains(r#"<mxCell id="1" parent="0"/>"#));
    }

    #[test]
    fn test_cells_are_flat_and_ordered() {
        let xml = DrawioRenderer::new().encode(&sample()).unwrap();
        let scan = scan_document(&xml).unwrap();
        let ids: Vec<&str> = scan.cells.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["0", "1", "a", "b", "c", "e1"]);

        let a = &scan.cells[2];
        assert_eq!(a.value, "Sell <fast>");
        assert_eq!(a.parent.as_deref(), Some("1"));
        assert!(a.vertex);
        assert!(!a.edge);
        assert!(a.style.starts_with("shape=rectangle;fillColor=#B9E0A5"));
        let geometry = a.geometry.as_ref().unwrap();
        assert_eq!(geometry.y, Some(20.5));

        assert_eq!(scan.cells[3].parent.as_deref(), Some("a"));
    }

    #[test]
    fn test_numbers_are_plain() {
        let xml = DrawioRenderer::new().encode(&sample()).unwrap();
        assert!(xml.contains(r#"x="10" y="20.5" width="100" height="60""#));
    }

    #[test]
    fn test_connection_cells() {
        let xml = DrawioRenderer::new().encode(&sample()).unwrap();
        let scan = scan_document(&xml).unwrap();
        let edge = scan.cells.iter().find(|c| c.id == "e1").unwrap();
        assert!(edge.edge);
        assert!(!edge.vertex);
        assert_eq!(edge.value, "next");
        assert_eq!(edge.source.as_deref(), Some("a"));
        assert_eq!(edge.target.as_deref(), Some("c"));
        assert!(edge.geometry.as_ref().unwrap().relative);
        assert!(!xml.contains("ghost"));
    }

    #[test]
    fn test_connection_wire_style() {
        let connection = Connection::new("e", "a", "b")
            .unwrap()
            .with_anchors(Anchor::Bottom, Anchor::Top)
            .with_style(ConnectionStyle {
                dashed: true,
                has_arrow: false,
                ..ConnectionStyle::default()
            });
        assert_eq!(
            connection_wire_style(&connection),
            "endArrow=none;html=1;strokeColor=#000000;strokeWidth=1;exitX=0.5;exitY=1;entryX=0.5;entryY=0;dashed=1"
        );
    }

    #[test]
    fn test_properties_are_wrapped_in_user_object() {
        let mut diagram = Diagram::new("d", "D", Some(Notation::Vad));
        diagram
            .add_element(
                DiagramElement::new("p1", ElementKind::BaseVad, "Sell")
                    .with_property("role", "Clerk")
                    .with_property("weight", 3)
                    .with_property("bad key", "x")
                    .with_property("id", "spoofed"),
            )
            .unwrap();
        diagram
            .add_element(DiagramElement::new("p2", ElementKind::BaseVad, "Ship"))
            .unwrap();
        let xml = DrawioRenderer::new().encode(&diagram).unwrap();
        assert!(xml.contains(r#"<UserObject label="Sell" role="Clerk" weight="3" id="p1">"#));
        assert!(xml.contains("</UserObject>"));
        assert!(!xml.contains("bad key"));
        assert!(!xml.contains("spoofed"));

        let scan = scan_document(&xml).unwrap();
        let p1 = scan.cells.iter().find(|c| c.id == "p1").unwrap();
        assert_eq!(p1.value, "Sell");
        assert_eq!(p1.properties.get("role").map(String::as_str), Some("Clerk"));
        let p2 = scan.cells.iter().find(|c| c.id == "p2").unwrap();
        assert!(p2.properties.is_empty());
        assert_eq!(p2.value, "Ship");
    }

    #[test]
    fn test_connection_kind_elements_are_edge_cells() {
        let mut diagram = Diagram::new("d", "D", Some(Notation::Vad));
        diagram
            .add_element(DiagramElement::new("x", ElementKind::HasNext, ""))
            .unwrap();
        let xml = DrawioRenderer::new().encode(&diagram).unwrap();
        assert!(xml.contains(r#"vertex="0" edge="1""#));
    }
}
