//! The diagram aggregate root
//!
//! A `Diagram` owns its top-level elements (which own their children) and a
//! flat list of connections. Every structural mutation goes through it and
//! bumps `modified_at`.
//!
//! Validity is checked on demand with [`Diagram::validate`]; a diagram may be
//! invalid while it is being edited.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::trace;

use super::{Connection, Database, DiagramElement, DiagramError, ElementKind, Notation};

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate `<prefix>_<unix millis>_<9 base36 chars>`
pub fn generate_id(prefix: &str) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..9)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect();
    format!("{}_{}_{}", prefix, Utc::now().timestamp_millis(), suffix)
}

/// Outcome of [`Diagram::validate`]
///
/// Only `errors` affect `is_valid`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn from_findings(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

/// A business-process diagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagram {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub notation: Option<Notation>,
    elements: Vec<DiagramElement>,
    #[serde(default)]
    connections: Vec<Connection>,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
    #[serde(default)]
    metadata: Map<String, Value>,
}

impl Diagram {
    pub fn new(id: impl Into<String>, name: impl Into<String>, notation: Option<Notation>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            notation,
            elements: Vec::new(),
            connections: Vec::new(),
            created_at: now,
            modified_at: now,
            metadata: Map::new(),
        }
    }

    /// Empty diagram with a fresh id and a name derived from the notation
    pub fn create_new(notation: Notation) -> Self {
        let name = format!("New {} Diagram", notation.as_str().to_uppercase());
        Self::new(generate_id("diagram"), name, Some(notation))
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }

    /// Top-level elements in document order
    pub fn elements(&self) -> &[DiagramElement] {
        &self.elements
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    pub fn touch(&mut self) {
        self.modified_at = Utc::now().max(self.created_at);
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.metadata.insert(key.into(), value.into());
        self.touch();
    }

    pub fn get_metadata(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// Append a top-level element
    ///
    /// Rejects malformed elements and ids already used anywhere in the tree.
    pub fn add_element(&mut self, mut element: DiagramElement) -> Result<(), DiagramError> {
        element.ensure_well_formed()?;
        if let Some(duplicate) = element
            .iter_tree()
            .into_iter()
            .find(|e| self.find_in_tree(&e.id).is_some())
        {
            return Err(DiagramError::invalid_argument(format!(
                "diagram {} already contains an element with id {}",
                self.id, duplicate.id
            )));
        }
        element.parent_id = None;
        trace!(element_id = %element.id, kind = %element.kind, "Adding element");
        self.elements.push(element);
        self.touch();
        Ok(())
    }

    /// Remove a top-level element by id
    ///
    /// Nested elements are not searched and connections are left in place.
    pub fn remove_element(&mut self, id: &str) -> bool {
        let before = self.elements.len();
        self.elements.retain(|e| e.id != id);
        let removed = self.elements.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    /// Top-level lookup; children are not searched
    pub fn find_element(&self, id: &str) -> Option<&DiagramElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn find_element_mut(&mut self, id: &str) -> Option<&mut DiagramElement> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    /// Lookup through the whole element tree
    pub fn find_in_tree(&self, id: &str) -> Option<&DiagramElement> {
        self.elements.iter().find_map(|e| e.find_descendant(id))
    }

    /// Top-level elements of one kind
    pub fn elements_by_kind(&self, kind: &ElementKind) -> Vec<&DiagramElement> {
        self.elements.iter().filter(|e| &e.kind == kind).collect()
    }

    /// Every element, parents before their children
    pub fn all_elements(&self) -> Vec<&DiagramElement> {
        self.elements.iter().flat_map(|e| e.iter_tree()).collect()
    }

    /// Append a connection
    ///
    /// Endpoints need not exist yet; connection ids must be unique.
    pub fn add_connection(&mut self, connection: Connection) -> Result<(), DiagramError> {
        connection.ensure_well_formed()?;
        if self.connections.iter().any(|c| c.id == connection.id) {
            return Err(DiagramError::invalid_argument(format!(
                "diagram {} already contains a connection with id {}",
                self.id, connection.id
            )));
        }
        self.connections.push(connection);
        self.touch();
        Ok(())
    }

    pub fn remove_connection(&mut self, id: &str) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| c.id != id);
        let removed = self.connections.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    /// Connections whose source and target both exist in the element tree
    pub fn resolved_connections(&self) -> Vec<&Connection> {
        self.connections
            .iter()
            .filter(|c| {
                self.find_in_tree(&c.source_id).is_some()
                    && self.find_in_tree(&c.target_id).is_some()
            })
            .collect()
    }

    /// Structural checks plus notation-specific warnings
    pub fn validate(&self) -> ValidationReport {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if self.name.trim().is_empty() {
            errors.push("Diagram name is required".to_string());
        }

        match self.notation {
            None => errors.push("Diagram type is required".to_string()),
            Some(Notation::Vad) => {
                for process in self.elements.iter().filter(|e| e.kind.is_vad_process()) {
                    let has_role = process
                        .property_str("role")
                        .is_some_and(|role| !role.trim().is_empty());
                    if !has_role {
                        warnings.push(format!(
                            "Process \"{}\" has no executor role assigned",
                            process.name
                        ));
                    }
                }
            }
            Some(Notation::Epc) => {
                let events = self.elements_by_kind(&ElementKind::Event).len();
                let functions = self.elements_by_kind(&ElementKind::Function).len();
                if events == 0 && functions > 0 {
                    warnings.push("EPC should have at least one event".to_string());
                }
                if functions == 0 && events > 0 {
                    warnings.push("EPC should have at least one function".to_string());
                }
            }
            Some(Notation::Org) | Some(Notation::Bpmn) => {}
        }

        ValidationReport::from_findings(errors, warnings)
    }

    pub fn to_json(&self) -> Result<String, DiagramError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Inverse of [`to_json`](Self::to_json); child back-references are rebuilt
    pub fn from_json(json: &str) -> Result<Self, DiagramError> {
        let mut diagram: Diagram = serde_json::from_str(json)?;
        diagram.restore_parent_ids();
        Ok(diagram)
    }

    /// Clear top-level back-references and rebuild the nested ones
    pub(crate) fn restore_parent_ids(&mut self) {
        for element in &mut self.elements {
            element.parent_id = None;
            element.restore_parent_ids();
        }
    }
}

impl Database for Diagram {
    type Node = DiagramElement;
    type Edge = Connection;

    fn add_node(&mut self, node: Self::Node) -> anyhow::Result<()> {
        Ok(self.add_element(node)?)
    }

    fn add_edge(&mut self, edge: Self::Edge) -> anyhow::Result<()> {
        Ok(self.add_connection(edge)?)
    }

    fn get_node(&self, id: &str) -> Option<&Self::Node> {
        self.find_element(id)
    }

    fn nodes(&self) -> impl Iterator<Item = &Self::Node> {
        self.elements.iter()
    }

    fn edges(&self) -> impl Iterator<Item = &Self::Edge> {
        self.connections.iter()
    }

    fn clear(&mut self) {
        self.elements.clear();
        self.connections.clear();
        self.touch();
    }

    fn node_count(&self) -> usize {
        self.elements.len()
    }

    fn edge_count(&self) -> usize {
        self.connections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Point, Size};

    fn process(id: &str, kind: ElementKind) -> DiagramElement {
        DiagramElement::new(id, kind, format!("Process {}", id))
    }

    #[test]
    fn test_create_new() {
        let diagram = Diagram::create_new(Notation::Epc);
        assert_eq!(diagram.name, "New EPC Diagram");
        assert_eq!(diagram.notation, Some(Notation::Epc));
        assert!(diagram.elements().is_empty());

        let parts: Vec<&str> = diagram.id.splitn(3, '_').collect();
        assert_eq!(parts[0], "diagram");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert!(diagram.modified_at() >= diagram.created_at());
    }

    #[test]
    fn test_generated_ids_differ() {
        assert_ne!(generate_id("element"), generate_id("element"));
    }

    #[test]
    fn test_add_element_touches_and_rejects_duplicates() {
        let mut diagram = Diagram::new("d1", "Test", Some(Notation::Vad));
        let created = diagram.modified_at();

        let mut parent = process("a", ElementKind::BaseVad);
        parent.add_child(process("b", ElementKind::DetailVad)).unwrap();
        diagram.add_element(parent).unwrap();
        assert!(diagram.modified_at() >= created);

        let err = diagram
            .add_element(process("b", ElementKind::Function))
            .unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(diagram.add_element(process("", ElementKind::Function)).is_err());
        assert_eq!(diagram.elements().len(), 1);
    }

    #[test]
    fn test_lookups_are_top_level_only() {
        let mut diagram = Diagram::new("d1", "Test", Some(Notation::Epc));
        let mut parent = process("a", ElementKind::Function);
        parent.add_child(process("b", ElementKind::Event)).unwrap();
        diagram.add_element(parent).unwrap();

        assert!(diagram.find_element("a").is_some());
        assert!(diagram.find_element("b").is_none());
        assert!(diagram.find_in_tree("b").is_some());
        assert!(diagram.elements_by_kind(&ElementKind::Event).is_empty());
        assert_eq!(diagram.all_elements().len(), 2);

        assert!(!diagram.remove_element("b"));
        assert!(diagram.remove_element("a"));
        assert!(diagram.elements().is_empty());
    }

    #[test]
    fn test_connections_tolerate_dangling_endpoints() {
        let mut diagram = Diagram::new("d1", "Test", Some(Notation::Vad));
        diagram.add_element(process("a", ElementKind::BaseVad)).unwrap();
        diagram.add_element(process("b", ElementKind::BaseVad)).unwrap();
        diagram
            .add_connection(Connection::new("c1", "a", "b").unwrap())
            .unwrap();
        diagram
            .add_connection(Connection::new("c2", "a", "ghost").unwrap())
            .unwrap();
        assert!(diagram
            .add_connection(Connection::new("c1", "b", "a").unwrap())
            .is_err());

        let resolved: Vec<&str> = diagram
            .resolved_connections()
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(resolved, vec!["c1"]);

        // Removing an endpoint leaves the record but hides it
        assert!(diagram.remove_element("b"));
        assert_eq!(diagram.connections().len(), 2);
        assert!(diagram.resolved_connections().is_empty());
    }

    #[test]
    fn test_validate_base_rules() {
        let diagram = Diagram::new("d1", "  ", None);
        let report = diagram.validate();
        assert!(!report.is_valid);
        assert_eq!(report.errors.len(), 2);
    }

    #[test]
    fn test_validate_vad_role_warning() {
        let mut diagram = Diagram::new("d1", "Test", Some(Notation::Vad));
        diagram
            .add_element(process("a", ElementKind::BaseVad).with_property("role", "  "))
            .unwrap();
        diagram
            .add_element(process("b", ElementKind::ExternVad).with_property("role", "Sales"))
            .unwrap();
        diagram.add_element(process("n", ElementKind::Note)).unwrap();

        let report = diagram.validate();
        assert!(report.is_valid);
        assert_eq!(
            report.warnings,
            vec!["Process \"Process a\" has no executor role assigned".to_string()]
        );
    }

    #[test]
    fn test_validate_epc_presence_check() {
        let mut diagram = Diagram::new("d1", "Test", Some(Notation::Epc));
        assert!(diagram.validate().warnings.is_empty());

        diagram.add_element(process("f", ElementKind::Function)).unwrap();
        let report = diagram.validate();
        assert!(report.is_valid);
        assert_eq!(report.warnings, vec!["EPC should have at least one event".to_string()]);

        diagram.add_element(process("e", ElementKind::Event)).unwrap();
        assert!(diagram.validate().warnings.is_empty());

        assert!(diagram.remove_element("f"));
        assert_eq!(
            diagram.validate().warnings,
            vec!["EPC should have at least one function".to_string()]
        );
    }

    #[test]
    fn test_metadata_touches() {
        let mut diagram = Diagram::new("d1", "Test", Some(Notation::Org));
        let before = diagram.modified_at();
        diagram.set_metadata("author", "ops");
        assert_eq!(diagram.get_metadata("author"), Some(&Value::from("ops")));
        assert!(diagram.modified_at() >= before);
    }

    #[test]
    fn test_json_round_trip() {
        let mut diagram = Diagram::new("d1", "Test", Some(Notation::Vad));
        let mut parent = process("a", ElementKind::BaseVad)
            .with_position(Point::new(10.0, 20.0))
            .with_size(Size::new(120.0, 80.0));
        parent.add_child(process("b", ElementKind::Note)).unwrap();
        diagram.add_element(parent).unwrap();
        diagram
            .add_connection(Connection::new("c1", "a", "b").unwrap())
            .unwrap();
        diagram.set_metadata("version", 2);

        let json = diagram.to_json().unwrap();
        assert!(json.contains("\"type\": \"vad\""));
        assert!(json.contains("\"createdAt\""));
        let restored = Diagram::from_json(&json).unwrap();
        assert_eq!(restored, diagram);
    }

    #[test]
    fn test_database_trait() {
        let mut diagram = Diagram::new("d1", "Test", Some(Notation::Vad));
        diagram.add_node(process("a", ElementKind::BaseVad)).unwrap();
        diagram.add_node(process("b", ElementKind::BaseVad)).unwrap();
        diagram
            .add_edge(Connection::new("c1", "a", "b").unwrap())
            .unwrap();
        assert_eq!(diagram.node_count(), 2);
        assert_eq!(diagram.edge_count(), 1);
        assert!(diagram.get_node("a").is_some());
        assert!(diagram.add_node(process("a", ElementKind::BaseVad)).is_err());

        diagram.clear();
        assert_eq!(diagram.node_count(), 0);
        assert_eq!(diagram.edge_count(), 0);
    }
}
