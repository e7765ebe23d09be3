//! Presentation style and the draw.io wire-style string
//!
//! A wire style is a `;`-separated list of `key=value` pairs, for example
//! `shape=hexagon;fillColor=#ffe6cc;strokeColor=#d79b00`. Segments without
//! `=` are bare tokens; draw.io uses a leading bare token as the shape name
//! (`ellipse;whiteSpace=wrap`).
//!
//! [`Style::from_wire_style`] keeps only the recognised keys, so converting a
//! wire style into a `Style` and back drops everything else. Elements decoded
//! from XML keep the untouched string alongside the structured style.

use serde::{Deserialize, Serialize};

/// Keys understood by [`Style`]
pub const STYLE_KEYS: [&str; 7] = [
    "shape",
    "fillColor",
    "strokeColor",
    "strokeWidth",
    "fontSize",
    "fontFamily",
    "fontColor",
];

/// Visual attributes of an element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Style {
    pub fill_color: String,
    pub stroke_color: String,
    pub stroke_width: f64,
    pub shape: String,
    pub font_size: f64,
    pub font_family: String,
    pub font_color: String,
    /// Extra wire-style text appended verbatim after the known keys
    pub style: String,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill_color: "#ffffff".to_string(),
            stroke_color: "#000000".to_string(),
            stroke_width: 1.0,
            shape: "rectangle".to_string(),
            font_size: 12.0,
            font_family: "Arial".to_string(),
            font_color: "#000000".to_string(),
            style: String::new(),
        }
    }
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fill_color(mut self, color: impl Into<String>) -> Self {
        self.fill_color = color.into();
        self
    }

    pub fn with_stroke_color(mut self, color: impl Into<String>) -> Self {
        self.stroke_color = color.into();
        self
    }

    pub fn with_shape(mut self, shape: impl Into<String>) -> Self {
        self.shape = shape.into();
        self
    }

    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.style = extra.into();
        self
    }

    /// Serialize to a wire style
    ///
    /// Order is fixed: shape, fillColor, strokeColor, strokeWidth, fontSize,
    /// fontFamily, fontColor, then the extra text. Empty strings and zero
    /// numbers are omitted.
    pub fn to_wire_style(&self) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(8);

        let text_fields = [
            ("shape", &self.shape),
            ("fillColor", &self.fill_color),
            ("strokeColor", &self.stroke_color),
        ];
        for (key, value) in text_fields {
            if !value.is_empty() {
                parts.push(format!("{}={}", key, value));
            }
        }
        if self.stroke_width != 0.0 {
            parts.push(format!("strokeWidth={}", format_number(self.stroke_width)));
        }
        if self.font_size != 0.0 {
            parts.push(format!("fontSize={}", format_number(self.font_size)));
        }
        if !self.font_family.is_empty() {
            parts.push(format!("fontFamily={}", self.font_family));
        }
        if !self.font_color.is_empty() {
            parts.push(format!("fontColor={}", self.font_color));
        }

        let extra = self.style.trim_matches(';');
        if !extra.is_empty() {
            parts.push(extra.to_string());
        }

        parts.join(";")
    }

    /// Parse a wire style, keeping only the recognised keys
    ///
    /// Absent keys keep their defaults. A leading bare token is taken as the
    /// shape when no `shape=` key is present. Numbers that fail to parse keep
    /// their defaults.
    pub fn from_wire_style(text: &str) -> Self {
        let mut style = Self::default();
        let mut explicit_shape = false;
        let mut bare_shape: Option<&str> = None;

        for (index, (key, value)) in style_pairs(text).into_iter().enumerate() {
            match key {
                "shape" => {
                    style.shape = value.to_string();
                    explicit_shape = true;
                }
                "fillColor" => style.fill_color = value.to_string(),
                "strokeColor" => style.stroke_color = value.to_string(),
                "strokeWidth" => {
                    if let Some(width) = parse_number(value) {
                        style.stroke_width = width;
                    }
                }
                "fontSize" => {
                    if let Some(size) = parse_number(value) {
                        style.font_size = size;
                    }
                }
                "fontFamily" => style.font_family = value.to_string(),
                "fontColor" => style.font_color = value.to_string(),
                bare if index == 0 && value.is_empty() && !text.contains(&format!("{}=", bare)) => {
                    bare_shape = Some(bare);
                }
                _ => {}
            }
        }

        if let (false, Some(shape)) = (explicit_shape, bare_shape) {
            style.shape = shape.to_string();
        }

        style
    }
}

/// Split a wire style into `(key, value)` pairs
///
/// Each segment is split on its first `=`. Bare tokens yield an empty value.
/// Empty segments are dropped. Keys and values are trimmed.
pub fn style_pairs(text: &str) -> Vec<(&str, &str)> {
    text.split(';')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| match segment.split_once('=') {
            Some((key, value)) => (key.trim(), value.trim()),
            None => (segment, ""),
        })
        .collect()
}

/// Value of the first `key=value` pair with the given key
pub fn style_value<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    text.split(';').find_map(|segment| {
        let (k, v) = segment.split_once('=')?;
        (k.trim() == key).then(|| v.trim())
    })
}

/// Whether the style declares an `endArrow` key, whatever its value
pub fn has_arrow_end(text: &str) -> bool {
    style_value(text, "endArrow").is_some()
}

/// Format a number the way draw.io writes attributes: `10`, not `10.0`
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        // Avoid "-0"
        return "0".to_string();
    }
    value.to_string()
}

fn parse_number(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}
