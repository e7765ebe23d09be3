//! Models: named collections of diagrams
//!
//! A `Model` groups the diagrams of one project and owns them outright.
//! Like [`Diagram`], every structural mutation bumps `modified_at`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::trace;

use super::{generate_id, Diagram, DiagramError};

/// Name given by [`Model::create_new`] when none is supplied
pub const DEFAULT_MODEL_NAME: &str = "New Model";

/// A project holding related diagrams
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: String,
    pub name: String,
    #[serde(default)]
    diagrams: Vec<Diagram>,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
    #[serde(default)]
    metadata: Map<String, Value>,
}

impl Model {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            diagrams: Vec::new(),
            created_at: now,
            modified_at: now,
            metadata: Map::new(),
        }
    }

    /// Empty model with a fresh `model_<millis>_<suffix>` id
    pub fn create_new(name: Option<&str>) -> Self {
        let name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(DEFAULT_MODEL_NAME);
        Self::new(generate_id("model"), name)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }

    /// Diagrams in the order they were added
    pub fn diagrams(&self) -> &[Diagram] {
        &self.diagrams
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

    /// Append a diagram; its id must be non-empty and unused in this model
    pub fn add_diagram(&mut self, diagram: Diagram) -> Result<(), DiagramError> {
        if diagram.id.trim().is_empty() {
            return Err(DiagramError::invalid_argument("Invalid diagram: id must not be empty"));
        }
        if self.find_diagram(&diagram.id).is_some() {
            return Err(DiagramError::invalid_argument(format!(
                "Invalid diagram: model {} already contains {}",
                self.id, diagram.id
            )));
        }
        trace!(model_id = %self.id, diagram_id = %diagram.id, "Adding diagram");
        self.diagrams.push(diagram);
        self.touch();
        Ok(())
    }

    /// Whether a diagram was removed
    pub fn remove_diagram(&mut self, id: &str) -> bool {
        let before = self.diagrams.len();
        self.diagrams.retain(|d| d.id != id);
        let removed = self.diagrams.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    pub fn find_diagram(&self, id: &str) -> Option<&Diagram> {
        self.diagrams.iter().find(|d| d.id == id)
    }

    pub fn find_diagram_mut(&mut self, id: &str) -> Option<&mut Diagram> {
        self.diagrams.iter_mut().find(|d| d.id == id)
    }

    pub fn to_json(&self) -> Result<String, DiagramError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Inverse of [`to_json`](Self::to_json)
    pub fn from_json(json: &str) -> Result<Self, DiagramError> {
        let mut model: Model = serde_json::from_str(json)?;
        for diagram in &mut model.diagrams {
            diagram.restore_parent_ids();
        }
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DiagramElement, ElementKind, Notation};

    fn diagram(id: &str) -> Diagram {
        Diagram::new(id, format!("Diagram {}", id), Some(Notation::Vad))
    }

    #[test]
    fn test_create_new() {
        let model = Model::create_new(None);
        assert_eq!(model.name, DEFAULT_MODEL_NAME);
        assert!(model.diagrams().is_empty());

        let parts: Vec<&str> = model.id.splitn(3, '_').collect();
        assert_eq!(parts[0], "model");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 9);

        assert_eq!(Model::create_new(Some("Sales")).name, "Sales");
        assert_eq!(Model::create_new(Some("  ")).name, DEFAULT_MODEL_NAME);
    }

    #[test]
    fn test_add_find_remove() {
        let mut model = Model::new("m1", "Project");
        let created = model.modified_at();
        model.add_diagram(diagram("a")).unwrap();
        model.add_diagram(diagram("b")).unwrap();
        assert!(model.modified_at() >= created);

        assert_eq!(model.find_diagram("b").map(|d| d.name.as_str()), Some("Diagram b"));
        assert!(model.find_diagram("c").is_none());

        model.find_diagram_mut("a").unwrap().rename("Renamed");
        assert_eq!(model.diagrams()[0].name, "Renamed");

        assert!(model.remove_diagram("a"));
        assert!(!model.remove_diagram("a"));
        let ids: Vec<&str> = model.diagrams().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[test]
    fn test_add_rejects_bad_diagrams() {
        let mut model = Model::new("m1", "Project");
        model.add_diagram(diagram("a")).unwrap();
        assert!(model.add_diagram(diagram("a")).unwrap_err().is_invalid_argument());
        assert!(model.add_diagram(diagram(" ")).unwrap_err().is_invalid_argument());
        assert_eq!(model.diagrams().len(), 1);
    }

    #[test]
    fn test_json_round_trip() {
        let mut inner = diagram("a");
        let mut parent = DiagramElement::new("p", ElementKind::BaseVad, "Sell");
        parent
            .add_child(DiagramElement::new("n", ElementKind::Note, "Remark"))
            .unwrap();
        inner.add_element(parent).unwrap();

        let mut model = Model::new("m1", "Project");
        model.add_diagram(inner).unwrap();
        model.set_metadata("owner", "ops");

        let json = model.to_json().unwrap();
        assert!(json.contains("\"diagrams\""));
        assert!(json.contains("\"modifiedAt\""));
        let restored = Model::from_json(&json).unwrap();
        assert_eq!(restored, model);
        let child = &restored.find_diagram("a").unwrap().elements()[0].children[0];
        assert_eq!(child.parent_id.as_deref(), Some("p"));
    }
}
