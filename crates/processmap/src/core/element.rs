//! Diagram elements
//!
//! A `DiagramElement` owns its children outright. `parent_id` is only a
//! back-reference by id and always names the element whose `children` list
//! holds it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::style::has_arrow_end;
use super::{DiagramError, ElementKind, Point, Size, Style};

/// A shape (or legacy edge) on a diagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramElement {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: Point,
    #[serde(default)]
    pub size: Size,
    #[serde(default)]
    pub style: Style,
    /// Untouched style string from the source document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xml_style: Option<String>,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub children: Vec<DiagramElement>,
    #[serde(default)]
    pub parent_id: Option<String>,
}

impl DiagramElement {
    /// Create an element at the origin with the default size and style
    pub fn new(id: impl Into<String>, kind: impl Into<ElementKind>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            name: name.into(),
            position: Point::default(),
            size: Size::default(),
            style: Style::default(),
            xml_style: None,
            properties: Map::new(),
            children: Vec::new(),
            parent_id: None,
        }
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_property(key, value);
        self
    }

    /// Check the element can be stored in a diagram
    ///
    /// The id must be non-empty, the position finite and the size finite and
    /// non-negative.
    pub fn ensure_well_formed(&self) -> Result<(), DiagramError> {
        if self.id.trim().is_empty() {
            return Err(DiagramError::invalid_argument("element id must not be empty"));
        }
        if !self.position.is_finite() {
            return Err(DiagramError::invalid_argument(format!(
                "element {} has a non-finite position",
                self.id
            )));
        }
        if !self.size.is_valid() {
            return Err(DiagramError::invalid_argument(format!(
                "element {} has an invalid size {}x{}",
                self.id, self.size.width, self.size.height
            )));
        }
        Ok(())
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn get_property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// String property, if present and a string
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }

    /// Append a child, setting its back-reference to this element
    pub fn add_child(&mut self, mut child: DiagramElement) -> Result<(), DiagramError> {
        child.ensure_well_formed()?;
        if child.id == self.id {
            return Err(DiagramError::invalid_argument(format!(
                "element {} cannot contain itself",
                self.id
            )));
        }
        child.parent_id = Some(self.id.clone());
        self.children.push(child);
        Ok(())
    }

    /// Remove the first direct child with the given id
    ///
    /// Grandchildren are not searched.
    pub fn remove_child(&mut self, id: &str) -> bool {
        match self.children.iter().position(|c| c.id == id) {
            Some(index) => {
                self.children.remove(index);
                true
            }
            None => false,
        }
    }

    /// Find an element by id in this subtree, including this element
    pub fn find_descendant(&self, id: &str) -> Option<&DiagramElement> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_descendant(id))
    }

    /// This element followed by all descendants, depth first
    pub fn iter_tree(&self) -> Vec<&DiagramElement> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.iter_tree());
        }
        out
    }

    pub fn move_to(&mut self, position: Point) -> Result<(), DiagramError> {
        if !position.is_finite() {
            return Err(DiagramError::invalid_argument(format!(
                "cannot move {} to non-finite position ({}, {})",
                self.id, position.x, position.y
            )));
        }
        self.position = position;
        Ok(())
    }

    pub fn resize(&mut self, size: Size) -> Result<(), DiagramError> {
        if !size.is_valid() {
            return Err(DiagramError::invalid_argument(format!(
                "cannot resize {} to {}x{}",
                self.id, size.width, size.height
            )));
        }
        self.size = size;
        Ok(())
    }

    pub fn update_style(&mut self, style: Style) -> Result<(), DiagramError> {
        let numbers_ok = style.stroke_width.is_finite()
            && style.stroke_width >= 0.0
            && style.font_size.is_finite()
            && style.font_size >= 0.0;
        if !numbers_ok {
            return Err(DiagramError::invalid_argument(format!(
                "style for {} has an invalid stroke width or font size",
                self.id
            )));
        }
        self.style = style;
        Ok(())
    }

    /// Edge kinds, or a source style ending in an arrow
    pub fn is_connection(&self) -> bool {
        self.kind.is_connection() || self.xml_style.as_deref().is_some_and(has_arrow_end)
    }

    pub fn is_shape(&self) -> bool {
        !self.is_connection()
    }

    pub fn to_json(&self) -> Result<String, DiagramError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Inverse of [`to_json`](Self::to_json); child back-references are rebuilt
    pub fn from_json(json: &str) -> Result<Self, DiagramError> {
        let mut element: DiagramElement = serde_json::from_str(json)?;
        element.restore_parent_ids();
        Ok(element)
    }

    /// Point every child's `parent_id` at its owner, recursively
    pub fn restore_parent_ids(&mut self) {
        for child in &mut self.children {
            child.parent_id = Some(self.id.clone());
            child.restore_parent_ids();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(id: &str) -> DiagramElement {
        DiagramElement::new(id, ElementKind::Function, id.to_uppercase())
    }

    #[test]
    fn test_new_defaults() {
        let e = element("a");
        assert_eq!(e.position, Point::new(0.0, 0.0));
        assert_eq!(e.size, Size::new(100.0, 60.0));
        assert!(e.children.is_empty());
        assert!(e.parent_id.is_none());
        assert!(e.is_shape());
    }

    #[test]
    fn test_properties_last_write_wins() {
        let mut e = element("a");
        e.set_property("role", "Clerk");
        e.set_property("role", "Manager");
        assert_eq!(e.property_str("role"), Some("Manager"));
        assert!(e.get_property("comment").is_none());
    }

    #[test]
    fn test_add_child_sets_parent() {
        let mut parent = element("a");
        parent.add_child(element("b")).unwrap();
        assert_eq!(parent.children[0].parent_id.as_deref(), Some("a"));
    }

    #[test]
    fn test_add_child_rejects_malformed() {
        let mut parent = element("a");
        let err = parent.add_child(element("")).unwrap_err();
        assert!(err.is_invalid_argument());
        let err = parent
            .add_child(element("b").with_size(Size::new(-5.0, 10.0)))
            .unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(parent.add_child(element("a")).is_err());
        assert!(parent.children.is_empty());
    }

    #[test]
    fn test_remove_child_is_shallow() {
        let mut parent = element("a");
        let mut child = element("b");
        child.add_child(element("c")).unwrap();
        parent.add_child(child).unwrap();

        assert!(!parent.remove_child("c"));
        assert!(parent.find_descendant("c").is_some());
        assert!(parent.remove_child("b"));
        assert!(!parent.remove_child("b"));
        assert!(parent.children.is_empty());
    }

    #[test]
    fn test_setters_validate() {
        let mut e = element("a");
        e.move_to(Point::new(5.0, 6.0)).unwrap();
        assert_eq!(e.position, Point::new(5.0, 6.0));
        assert!(e.move_to(Point::new(f64::INFINITY, 0.0)).is_err());
        assert_eq!(e.position, Point::new(5.0, 6.0));

        e.resize(Size::new(10.0, 0.0)).unwrap();
        assert!(e.resize(Size::new(10.0, -1.0)).is_err());
        assert_eq!(e.size, Size::new(10.0, 0.0));

        let bad = Style {
            stroke_width: -1.0,
            ..Style::default()
        };
        assert!(e.update_style(bad).is_err());
        e.update_style(Style::new().with_fill_color("#ffe6cc")).unwrap();
        assert_eq!(e.style.fill_color, "#ffe6cc");
    }

    #[test]
    fn test_is_connection_from_kind_or_raw_style() {
        let edge = DiagramElement::new("e", ElementKind::HasNext, "");
        assert!(edge.is_connection());

        let mut arrow = element("x");
        arrow.xml_style = Some("endArrow=classic;html=1".to_string());
        assert!(arrow.is_connection());
        assert!(!arrow.is_shape());
    }

    #[test]
    fn test_iter_tree_order() {
        let mut a = element("a");
        let mut b = element("b");
        b.add_child(element("c")).unwrap();
        a.add_child(b).unwrap();
        a.add_child(element("d")).unwrap();
        let ids: Vec<&str> = a.iter_tree().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_json_round_trip_restores_parents() {
        let mut a = element("a").with_property("comment", "top");
        let mut b = element("b");
        b.add_child(element("c")).unwrap();
        a.add_child(b).unwrap();

        let json = a.to_json().unwrap();
        assert!(json.contains("\"type\": \"function\""));
        let mut value: Value = serde_json::from_str(&json).unwrap();
        value["children"][0]["children"][0]["parentId"] = Value::Null;

        let restored = DiagramElement::from_json(&value.to_string()).unwrap();
        assert_eq!(restored, a);
        assert_eq!(restored.children[0].children[0].parent_id.as_deref(), Some("b"));
    }
}
