//! Notation catalogue
//!
//! Which notations are offered, the stencils each one provides and the
//! defaults a new element takes from its stencil. The catalogue is a plain
//! value handed to whoever needs it; the draw.io codec never reads it.
//!
//! Deployments can adjust the built-in catalogue with a TOML file:
//!
//! ```toml
//! [notations.bpmn]
//! enabled = false
//!
//! [notations.vad.shapes.baseProcess]
//! kind = "baseVAD"
//! shape = "mxgraph.arrows2.arrow"
//! fill_color = "#C5E8B0"
//! stroke_color = "#82b366"
//! label = "Core process"
//! ```
//!
//! A stencil given in the file replaces the built-in stencil of the same key
//! as a whole; omitted stencil fields take generic defaults.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{
    generate_id, DiagramElement, DiagramError, ElementKind, Notation, Point, Size, Style,
    ValidationReport,
};

/// Default name of an element whose stencil has no label
pub const DEFAULT_ELEMENT_NAME: &str = "New Element";

/// Where new elements are placed
pub const NEW_ELEMENT_POSITION: Point = Point { x: 100.0, y: 100.0 };

/// One palette entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeConfig {
    pub kind: ElementKind,
    pub shape: String,
    pub fill_color: String,
    pub stroke_color: String,
    pub default_width: f64,
    pub default_height: f64,
    pub label: String,
    /// Extra wire-style text, e.g. `endArrow=classic` for connection stencils
    pub style: String,
}

impl Default for ShapeConfig {
    fn default() -> Self {
        Self {
            kind: ElementKind::Shape,
            shape: "rectangle".to_string(),
            fill_color: "#ffffff".to_string(),
            stroke_color: "#000000".to_string(),
            default_width: 100.0,
            default_height: 60.0,
            label: String::new(),
            style: String::new(),
        }
    }
}

impl ShapeConfig {
    fn new(
        kind: ElementKind,
        shape: &str,
        fill_color: &str,
        stroke_color: &str,
        (default_width, default_height): (f64, f64),
        label: &str,
    ) -> Self {
        Self {
            kind,
            shape: shape.to_string(),
            fill_color: fill_color.to_string(),
            stroke_color: stroke_color.to_string(),
            default_width,
            default_height,
            label: label.to_string(),
            style: String::new(),
        }
    }
}

/// Catalogue entry of one notation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotationSettings {
    pub notation: Notation,
    pub enabled: bool,
    pub name: String,
    pub description: String,
    pub shapes: BTreeMap<String, ShapeConfig>,
}

impl NotationSettings {
    fn new(notation: Notation, name: &str, description: &str) -> Self {
        Self {
            notation,
            enabled: true,
            name: name.to_string(),
            description: description.to_string(),
            shapes: BTreeMap::new(),
        }
    }

    fn with_shape(mut self, key: &str, shape: ShapeConfig) -> Self {
        self.shapes.insert(key.to_string(), shape);
        self
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct NotationOverride {
    enabled: Option<bool>,
    name: Option<String>,
    description: Option<String>,
    #[serde(default)]
    shapes: BTreeMap<String, ShapeConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    notations: HashMap<String, NotationOverride>,
}

/// The notation catalogue
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotationConfig {
    notations: Vec<NotationSettings>,
}

impl Default for NotationConfig {
    fn default() -> Self {
        use ElementKind as K;

        let mut sequence = ShapeConfig::new(
            K::HasNext,
            "",
            "",
            "#000000",
            (100.0, 60.0),
            "Sequence",
        );
        sequence.style = "endArrow=classic".to_string();

        let vad = NotationSettings::new(
            Notation::Vad,
            "VAD - Value Added Diagram",
            "Value-added chain of business processes",
        )
        .with_shape(
            "baseProcess",
            ShapeConfig::new(K::BaseVad, "mxgraph.arrows2.arrow", "#B9E0A5", "#82b366", (100.0, 60.0), "Base process"),
        )
        .with_shape(
            "detailProcess",
            ShapeConfig::new(K::DetailVad, "mxgraph.arrows2.arrow", "#B9E0A6", "#82b366", (100.0, 60.0), "Detailed process"),
        )
        .with_shape(
            "externalProcess",
            ShapeConfig::new(K::ExternVad, "mxgraph.arrows2.arrow", "#D4E1F5", "#6c8ebf", (100.0, 60.0), "External process"),
        )
        .with_shape(
            "note",
            ShapeConfig::new(K::Note, "note", "#fff2cc", "#d6b656", (680.0, 100.0), "Note"),
        )
        .with_shape("sequence", sequence);

        let epc = NotationSettings::new(
            Notation::Epc,
            "EPC - Event-driven Process Chain",
            "Event-driven process chain",
        )
        .with_shape(
            "event",
            ShapeConfig::new(K::Event, "hexagon", "#ffe6cc", "#d79b00", (120.0, 60.0), "Event"),
        )
        .with_shape(
            "function",
            ShapeConfig::new(K::Function, "rectangle", "#d5e8d4", "#82b366", (120.0, 60.0), "Function"),
        )
        .with_shape(
            "connector",
            ShapeConfig::new(K::Connector, "rhombus", "#fff2cc", "#d6b656", (40.0, 40.0), "Connector"),
        )
        .with_shape(
            "organizationalUnit",
            ShapeConfig::new(K::OrgUnit, "ellipse", "#e1d5e7", "#9673a6", (100.0, 60.0), "Organizational unit"),
        );

        let org = NotationSettings::new(
            Notation::Org,
            "Organizational Chart",
            "Organizational structure",
        )
        .with_shape(
            "position",
            ShapeConfig::new(K::Position, "rectangle", "#dae8fc", "#6c8ebf", (120.0, 60.0), "Position"),
        )
        .with_shape(
            "department",
            ShapeConfig::new(K::Department, "rectangle", "#d5e8d4", "#82b366", (140.0, 80.0), "Department"),
        )
        .with_shape(
            "person",
            ShapeConfig::new(K::Person, "ellipse", "#f8cecc", "#b85450", (100.0, 60.0), "Employee"),
        );

        let bpmn = NotationSettings::new(Notation::Bpmn, "BPMN", "Business Process Model and Notation")
            .with_shape(
                "task",
                ShapeConfig::new(K::Task, "rectangle", "#dae8fc", "#6c8ebf", (100.0, 60.0), "Task"),
            )
            .with_shape(
                "gateway",
                ShapeConfig::new(K::Gateway, "rhombus", "#fff2cc", "#d6b656", (50.0, 50.0), "Gateway"),
            )
            .with_shape(
                "event",
                ShapeConfig::new(K::Event, "ellipse", "#f8cecc", "#b85450", (40.0, 40.0), "Event"),
            );

        Self {
            notations: vec![vad, epc, org, bpmn],
        }
    }
}

impl NotationConfig {
    /// Built-in catalogue adjusted by a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, DiagramError> {
        let file: ConfigFile =
            toml::from_str(text).map_err(|e| DiagramError::config_error(e.to_string()))?;

        let mut config = Self::default();
        for (key, update) in file.notations {
            let notation: Notation = key
                .parse()
                .map_err(|_| DiagramError::config_error(format!("unknown notation '{}'", key)))?;
            let Some(settings) = config.notations.iter_mut().find(|s| s.notation == notation)
            else {
                continue;
            };
            if let Some(enabled) = update.enabled {
                settings.enabled = enabled;
            }
            if let Some(name) = update.name {
                settings.name = name;
            }
            if let Some(description) = update.description {
                settings.description = description;
            }
            for (stencil, shape) in update.shapes {
                debug!(%notation, stencil = %stencil, "Overriding stencil");
                settings.shapes.insert(stencil, shape);
            }
        }
        Ok(config)
    }

    /// Read [`from_toml_str`](Self::from_toml_str) input from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DiagramError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn settings(&self, notation: Notation) -> Option<&NotationSettings> {
        self.notations.iter().find(|s| s.notation == notation)
    }

    pub fn is_enabled(&self, notation: Notation) -> bool {
        self.settings(notation).is_some_and(|s| s.enabled)
    }

    /// Enabled notations in catalogue order
    pub fn available_notations(&self) -> Vec<&NotationSettings> {
        self.notations.iter().filter(|s| s.enabled).collect()
    }

    /// Stencils of an enabled notation; empty when disabled
    pub fn stencils(&self, notation: Notation) -> Vec<(&str, &ShapeConfig)> {
        match self.settings(notation) {
            Some(settings) if settings.enabled => settings
                .shapes
                .iter()
                .map(|(key, shape)| (key.as_str(), shape))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// New element from a stencil, placed at (100, 100) with a fresh id
    pub fn create_element(
        &self,
        notation: Notation,
        stencil: &str,
    ) -> Result<DiagramElement, DiagramError> {
        let settings = self
            .settings(notation)
            .filter(|s| s.enabled)
            .ok_or_else(|| DiagramError::unknown_notation(notation.as_str()))?;
        let shape = settings
            .shapes
            .get(stencil)
            .ok_or_else(|| DiagramError::unknown_stencil(notation.as_str(), stencil))?;

        let width = if shape.default_width > 0.0 { shape.default_width } else { 100.0 };
        let height = if shape.default_height > 0.0 { shape.default_height } else { 60.0 };
        let name = if shape.label.is_empty() {
            DEFAULT_ELEMENT_NAME
        } else {
            shape.label.as_str()
        };
        let defaults = Style::default();
        let style = Style::new()
            .with_fill_color(non_empty_or(&shape.fill_color, &defaults.fill_color))
            .with_stroke_color(non_empty_or(&shape.stroke_color, &defaults.stroke_color))
            .with_shape(non_empty_or(&shape.shape, &defaults.shape))
            .with_extra(shape.style.clone());

        let element = DiagramElement::new(generate_id("element"), shape.kind.clone(), name)
            .with_position(NEW_ELEMENT_POSITION)
            .with_size(Size::try_new(width, height)?)
            .with_style(style);
        debug!(%notation, stencil, element_id = %element.id, "Created element");
        Ok(element)
    }

    /// Notation rules for a single element
    pub fn validate_element(&self, element: &DiagramElement, notation: Notation) -> ValidationReport {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        match notation {
            Notation::Vad if element.kind.is_vad_process() => {
                let has_role = element
                    .property_str("role")
                    .is_some_and(|role| !role.trim().is_empty());
                if !has_role {
                    warnings.push("Process should have an executor role".to_string());
                }
            }
            Notation::Epc if element.kind == ElementKind::Event && element.name.is_empty() => {
                errors.push("Event must have a name".to_string());
            }
            _ => {}
        }

        ValidationReport::from_findings(errors, warnings)
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}
