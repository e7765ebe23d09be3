//! draw.io XML decoder
//!
//! Decoding runs in two passes over the cells found by
//! [`scan_document`](super::cell::scan_document):
//!
//! 1. Discovery: every non-sentinel cell becomes an arena entry (a shape, an
//!    edge, or an edge label), keyed by id. Missing geometry is default-filled.
//!    An edge cell without both endpoints is kept as a connection-kind shape.
//! 2. Resolution: parent ids become ownership edges, edges become
//!    [`Connection`]s and labels are folded into their edge.
//!
//! The decoder is lenient per cell and strict per document: a bad cell is
//! skipped with a warning, a bad document is a `MalformedInput` error.

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use tracing::{debug, info, span, trace, warn, Level};

use super::cell::{is_sentinel, scan_document, RawCell};
use super::inference::{connection_style, infer_element_kind, is_edge_style};
use crate::core::{
    generate_id, Connection, Diagram, DiagramElement, DiagramError, Parser, Point, Size, Style,
};
use crate::plugins::notation::infer_notation;

/// Name given to documents whose diagram has no name
pub const UNTITLED_DIAGRAM: &str = "Untitled Diagram";

const DEFAULT_X: f64 = 0.0;
const DEFAULT_Y: f64 = 0.0;
const DEFAULT_WIDTH: f64 = 100.0;
const DEFAULT_HEIGHT: f64 = 60.0;

/// What a discovered cell turned out to be
enum Slot {
    Shape {
        element: Option<DiagramElement>,
        parent: Option<String>,
    },
    Edge(RawCell),
    Label {
        edge_id: String,
        text: String,
    },
}

/// Decoder from draw.io XML to a [`Diagram`]
#[derive(Debug, Default, Clone, Copy)]
pub struct DrawioParser;

impl DrawioParser {
    pub fn new() -> Self {
        Self
    }

    /// Decode a complete document
    pub fn decode(&self, xml: &str) -> Result<Diagram, DiagramError> {
        let decode_span = span!(Level::INFO, "decode_drawio", input_len = xml.len());
        let _enter = decode_span.enter();

        let scan = scan_document(xml)?;

        let notation = infer_notation(&scan.styles());
        debug!(%notation, "Inferred notation");

        let id = scan
            .diagram_id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| generate_id("diagram"));
        let name = scan
            .diagram_name
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| UNTITLED_DIAGRAM.to_string());
        let mut diagram = Diagram::new(id, name, Some(notation));

        // Pass 1: discovery
        let edge_ids: HashSet<&str> = scan
            .cells
            .iter()
            .filter(|c| connects(c))
            .map(|c| c.id.as_str())
            .collect();

        let mut slots: Vec<Slot> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for cell in &scan.cells {
            if is_sentinel(&cell.id) {
                continue;
            }
            if cell.id.is_empty() {
                warn!("Skipping cell without an id");
                continue;
            }
            if index.contains_key(&cell.id) {
                warn!(cell_id = %cell.id, "Skipping cell with duplicate id");
                continue;
            }
            index.insert(cell.id.clone(), slots.len());
            slots.push(discover(cell, &edge_ids));
        }

        // Pass 2: parents
        let parents = resolve_parents(&slots, &index);
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); slots.len()];
        let mut roots = Vec::new();
        for (i, parent) in parents.iter().enumerate() {
            if !matches!(slots[i], Slot::Shape { .. }) {
                continue;
            }
            match parent {
                Some(p) => children[*p].push(i),
                None => roots.push(i),
            }
        }
        for root in roots {
            if let Some(element) = assemble(root, &mut slots, &children) {
                if let Err(e) = diagram.add_element(element) {
                    warn!(error = %e, "Dropping element");
                }
            }
        }

        // Pass 2: edges and their labels
        let mut labels: HashMap<&str, &str> = HashMap::new();
        for slot in &slots {
            if let Slot::Label { edge_id, text } = slot {
                if !text.is_empty() {
                    labels.entry(edge_id.as_str()).or_insert(text.as_str());
                }
            }
        }
        let edges: Vec<Connection> = slots
            .iter()
            .filter_map(|slot| match slot {
                Slot::Edge(cell) => build_connection(cell, &diagram, &labels),
                _ => None,
            })
            .collect();
        for connection in edges {
            if let Err(e) = diagram.add_connection(connection) {
                warn!(error = %e, "Dropping connection");
            }
        }

        info!(
            diagram_id = %diagram.id,
            element_count = diagram.all_elements().len(),
            connection_count = diagram.connections().len(),
            "Decoded diagram"
        );
        Ok(diagram)
    }
}

/// An edge cell with both endpoints set
fn connects(cell: &RawCell) -> bool {
    is_edge_style(cell.edge, &cell.style) && cell.source.is_some() && cell.target.is_some()
}

fn discover(cell: &RawCell, edge_ids: &HashSet<&str>) -> Slot {
    if connects(cell) {
        return Slot::Edge(cell.clone());
    }
    if is_edge_style(cell.edge, &cell.style) {
        debug!(cell_id = %cell.id, "Edge without both endpoints, keeping it as an element");
    }

    let relative = cell.geometry.as_ref().is_some_and(|g| g.relative);
    if let Some(parent) = cell.parent.as_deref() {
        if relative && edge_ids.contains(parent) {
            trace!(cell_id = %cell.id, edge_id = parent, "Edge label cell");
            return Slot::Label {
                edge_id: parent.to_string(),
                text: cell.value.clone(),
            };
        }
    }

    let geometry = cell.geometry.clone().unwrap_or_else(|| {
        debug!(cell_id = %cell.id, "Cell has no geometry, using defaults");
        Default::default()
    });
    let width = geometry.width.filter(|w| *w >= 0.0).unwrap_or(DEFAULT_WIDTH);
    let height = geometry.height.filter(|h| *h >= 0.0).unwrap_or(DEFAULT_HEIGHT);

    let mut element = DiagramElement::new(
        cell.id.clone(),
        infer_element_kind(&cell.style, cell.edge),
        cell.value.clone(),
    )
    .with_position(Point::new(
        geometry.x.unwrap_or(DEFAULT_X),
        geometry.y.unwrap_or(DEFAULT_Y),
    ))
    .with_size(Size::new(width, height))
    .with_style(Style::from_wire_style(&cell.style));
    element.xml_style = Some(cell.style.clone());
    for (key, value) in &cell.properties {
        element.set_property(key.clone(), value.clone());
    }

    Slot::Shape {
        element: Some(element),
        parent: cell.parent.clone(),
    }
}

/// Effective parent slot of every shape; `None` means top level
///
/// Sentinel, missing and non-shape parents all mean top level. A cell that
/// would end up as its own ancestor is cut loose at that point.
fn resolve_parents(slots: &[Slot], index: &HashMap<String, usize>) -> Vec<Option<usize>> {
    let mut parents: Vec<Option<usize>> = slots
        .iter()
        .map(|slot| {
            let Slot::Shape { parent, .. } = slot else {
                return None;
            };
            let parent = parent.as_deref()?;
            if is_sentinel(parent) {
                return None;
            }
            match index.get(parent) {
                Some(&p) if matches!(slots[p], Slot::Shape { .. }) => Some(p),
                _ => {
                    debug!(parent_id = parent, "Unresolved parent, treating cell as top-level");
                    None
                }
            }
        })
        .collect();

    for i in 0..parents.len() {
        let mut seen = HashSet::new();
        let mut cursor = parents[i];
        while let Some(p) = cursor {
            if p == i {
                warn!(slot = i, "Parent cycle, treating cell as top-level");
                parents[i] = None;
                break;
            }
            if !seen.insert(p) {
                break;
            }
            cursor = parents[p];
        }
    }
    parents
}

/// Move a shape and its descendants out of the arena as one tree
fn assemble(at: usize, slots: &mut [Slot], children: &[Vec<usize>]) -> Option<DiagramElement> {
    let mut element = match &mut slots[at] {
        Slot::Shape { element, .. } => element.take()?,
        _ => return None,
    };
    for &child_at in &children[at] {
        if let Some(child) = assemble(child_at, slots, children) {
            if let Err(e) = element.add_child(child) {
                warn!(parent_id = %element.id, error = %e, "Dropping child element");
            }
        }
    }
    Some(element)
}

fn build_connection(
    cell: &RawCell,
    diagram: &Diagram,
    labels: &HashMap<&str, &str>,
) -> Option<Connection> {
    let (Some(source), Some(target)) = (cell.source.as_deref(), cell.target.as_deref()) else {
        debug!(edge_id = %cell.id, "Edge without both endpoints, skipping");
        return None;
    };
    if diagram.find_in_tree(source).is_none() || diagram.find_in_tree(target).is_none() {
        warn!(edge_id = %cell.id, source, target, "Edge references a missing element, skipping");
        return None;
    }

    let (style, source_point, target_point) = connection_style(&cell.style);
    let label = if cell.value.is_empty() {
        labels.get(cell.id.as_str()).copied().unwrap_or_default()
    } else {
        cell.value.as_str()
    };

    match Connection::new(cell.id.clone(), source, target) {
        Ok(connection) => Some(
            connection
                .with_anchors(source_point, target_point)
                .with_label(label)
                .with_style(style),
        ),
        Err(e) => {
            warn!(edge_id = %cell.id, error = %e, "Skipping edge");
            None
        }
    }
}

impl Parser<Diagram> for DrawioParser {
    /// Replace the database contents with the decoded document
    fn parse(&self, input: &str, database: &mut Diagram) -> Result<()> {
        *database = self.decode(input)?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "drawio"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn can_parse(&self, input: &str) -> bool {
        let trimmed = input.trim_start();
        trimmed.starts_with('<')
            && (trimmed.contains("<mxfile") || trimmed.contains("<diagram"))
    }
}
