//! Cell discovery
//!
//! First pass of decoding: walk the XML once and collect every `mxCell` of the
//! first `<diagram>` as a flat [`RawCell`] record, without resolving any
//! reference. Well-formedness problems fail the whole scan; odd attribute
//! values are kept as-is and judged later.

use std::collections::BTreeMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, trace};

use crate::core::DiagramError;

/// Ids of the two structural cells every document starts with
pub const SENTINEL_IDS: [&str; 2] = ["0", "1"];

/// Whether an id is one of the structural sentinels
pub fn is_sentinel(id: &str) -> bool {
    SENTINEL_IDS.contains(&id)
}

/// `mxGeometry` attributes as found; absent or unparsable values are `None`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawGeometry {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    /// Positioned relative to an edge (label placement)
    pub relative: bool,
}

/// One `mxCell` as it appears in the document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawCell {
    pub id: String,
    pub value: String,
    pub style: String,
    pub parent: Option<String>,
    pub source: Option<String>,
    pub target: Option<String>,
    pub vertex: bool,
    pub edge: bool,
    pub geometry: Option<RawGeometry>,
    /// Attributes of the enclosing `UserObject` other than `id` and `label`
    pub properties: BTreeMap<String, String>,
}

/// Result of scanning a document
#[derive(Debug, Clone, Default)]
pub struct DocumentScan {
    pub diagram_id: Option<String>,
    pub diagram_name: Option<String>,
    /// Cells of the first diagram in document order, sentinels included
    pub cells: Vec<RawCell>,
    /// Number of `<diagram>` elements seen
    pub diagram_count: usize,
    /// The first diagram carried text instead of a graph model
    pub has_text_payload: bool,
}

impl DocumentScan {
    /// Styles of every non-sentinel cell
    pub fn styles(&self) -> Vec<String> {
        self.cells
            .iter()
            .filter(|c| !is_sentinel(&c.id))
            .map(|c| c.style.clone())
            .collect()
    }
}

/// Wrapper element draw.io uses for cells with custom properties
#[derive(Debug, Default)]
struct Wrapper {
    id: Option<String>,
    label: Option<String>,
    properties: BTreeMap<String, String>,
}

fn malformed<E: std::fmt::Display>(reader: &Reader<&[u8]>, err: E) -> DiagramError {
    DiagramError::malformed_input(format!(
        "not well-formed XML near byte {}: {}",
        reader.buffer_position(),
        err
    ))
}

fn element_name(e: &BytesStart<'_>) -> Result<String, DiagramError> {
    std::str::from_utf8(e.name().as_ref())
        .map(str::to_string)
        .map_err(|err| DiagramError::malformed_input(format!("invalid element name: {}", err)))
}

fn attrs_to_map(e: &BytesStart<'_>) -> Result<BTreeMap<String, String>, DiagramError> {
    let mut out = BTreeMap::new();
    for attr in e.attributes() {
        let attr = attr
            .map_err(|err| DiagramError::malformed_input(format!("invalid attribute: {}", err)))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|err| DiagramError::malformed_input(format!("invalid attribute name: {}", err)))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|err| DiagramError::malformed_input(format!("invalid value for {}: {}", key, err)))?
            .into_owned();
        out.insert(key, value);
    }
    Ok(out)
}

fn parse_flag(v: Option<&String>) -> bool {
    matches!(v.map(String::as_str), Some("1" | "true" | "TRUE" | "True"))
}

fn parse_f64_opt(v: Option<&String>) -> Option<f64> {
    v?.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn is_wrapper(name: &str) -> bool {
    name.eq_ignore_ascii_case("UserObject") || name == "object"
}

fn cell_from_attrs(attrs: &BTreeMap<String, String>, wrapper: Option<&Wrapper>) -> RawCell {
    let id = attrs
        .get("id")
        .cloned()
        .or_else(|| wrapper.and_then(|w| w.id.clone()))
        .unwrap_or_default();
    let value = attrs
        .get("value")
        .cloned()
        .or_else(|| wrapper.and_then(|w| w.label.clone()))
        .unwrap_or_default();
    RawCell {
        id,
        value,
        style: attrs.get("style").cloned().unwrap_or_default(),
        parent: attrs.get("parent").cloned(),
        source: attrs.get("source").cloned(),
        target: attrs.get("target").cloned(),
        vertex: parse_flag(attrs.get("vertex")),
        edge: parse_flag(attrs.get("edge")),
        geometry: None,
        properties: wrapper.map(|w| w.properties.clone()).unwrap_or_default(),
    }
}

fn geometry_from_attrs(attrs: &BTreeMap<String, String>) -> RawGeometry {
    RawGeometry {
        x: parse_f64_opt(attrs.get("x")),
        y: parse_f64_opt(attrs.get("y")),
        width: parse_f64_opt(attrs.get("width")),
        height: parse_f64_opt(attrs.get("height")),
        relative: parse_flag(attrs.get("relative")),
    }
}

/// Collect the cells of the first diagram in `xml`
///
/// Fails with `MalformedInput` when the text is not well-formed XML or has no
/// `<diagram>` element.
pub fn scan_document(xml: &str) -> Result<DocumentScan, DiagramError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut scan = DocumentScan::default();

    let mut depth: usize = 0;
    let mut in_first_diagram = false;
    let mut in_graph_model = false;
    let mut current_cell: Option<usize> = None;
    let mut wrapper: Option<Wrapper> = None;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| malformed(&reader, e))?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_start = matches!(event, Event::Start(_));
                if is_start {
                    depth += 1;
                }
                let name = element_name(e)?;
                match name.as_str() {
                    "diagram" => {
                        scan.diagram_count += 1;
                        if scan.diagram_count == 1 {
                            let attrs = attrs_to_map(e)?;
                            scan.diagram_id = attrs.get("id").cloned();
                            scan.diagram_name = attrs.get("name").cloned();
                            in_first_diagram = is_start;
                        } else {
                            debug!(index = scan.diagram_count, "Ignoring additional diagram page");
                        }
                    }
                    "mxGraphModel" if in_first_diagram => in_graph_model = is_start,
                    n if is_wrapper(n) && in_first_diagram && is_start => {
                        let mut attrs = attrs_to_map(e)?;
                        wrapper = Some(Wrapper {
                            id: attrs.remove("id"),
                            label: attrs.remove("label"),
                            properties: attrs,
                        });
                    }
                    "mxCell" if in_first_diagram => {
                        let attrs = attrs_to_map(e)?;
                        let cell = cell_from_attrs(&attrs, wrapper.as_ref());
                        trace!(cell_id = %cell.id, vertex = cell.vertex, edge = cell.edge, "Discovered cell");
                        scan.cells.push(cell);
                        current_cell = is_start.then(|| scan.cells.len() - 1);
                    }
                    "mxGeometry" if in_first_diagram => {
                        if let Some(index) = current_cell {
                            let attrs = attrs_to_map(e)?;
                            if scan.cells[index].geometry.is_none() {
                                scan.cells[index].geometry = Some(geometry_from_attrs(&attrs));
                            }
                        }
                    }
                    _ => {}
                }
            }
            Event::End(ref e) => {
                depth = depth.saturating_sub(1);
                match e.name().as_ref() {
                    b"diagram" => in_first_diagram = false,
                    b"mxGraphModel" => in_graph_model = false,
                    b"mxCell" => current_cell = None,
                    name if std::str::from_utf8(name).is_ok_and(is_wrapper) => wrapper = None,
                    _ => {}
                }
            }
            Event::Text(ref t) => {
                if in_first_diagram && !in_graph_model && t.iter().any(|b| !b.is_ascii_whitespace())
                {
                    scan.has_text_payload = true;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if depth != 0 {
        return Err(DiagramError::malformed_input(format!(
            "document ended with {} unclosed element(s)",
            depth
        )));
    }
    if scan.diagram_count == 0 {
        return Err(DiagramError::malformed_input("no <diagram> element found"));
    }
    if scan.has_text_payload && scan.cells.is_empty() {
        return Err(DiagramError::malformed_input(
            "diagram content is compressed; save it uncompressed to open it",
        ));
    }

    debug!(cell_count = scan.cells.len(), "Scanned document");
    Ok(scan)
}
