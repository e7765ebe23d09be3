//! Type inference from draw.io style strings
//!
//! draw.io cells carry no semantic type, only a style. These functions map a
//! raw style to a shape family and an element kind. Checks run in a fixed
//! order and the first match wins; changing the order changes results.

use crate::core::style::{has_arrow_end, style_value};
use crate::core::{Anchor, ConnectionStyle, ElementKind, ShapeKind};

/// Fill of a base value-chain process
pub const BASE_VAD_FILL: &str = "#B9E0A5";
/// Fill of a detail value-chain process (one digit away from the base fill)
pub const DETAIL_VAD_FILL: &str = "#B9E0A6";
/// Fill of an external value-chain process
pub const EXTERN_VAD_FILL: &str = "#D4E1F5";
/// Fill of an EPC event
pub const EPC_EVENT_FILL: &str = "#ffe6cc";
/// Fill of an EPC organizational unit
pub const ORG_UNIT_FILL: &str = "#e1d5e7";

/// Stencil name of the value-chain chevron
pub const CHEVRON_SHAPE: &str = "mxgraph.arrows2.arrow";

/// Shape family of a style, first match wins:
/// chevron, hexagon, rhombus, ellipse, note, otherwise rectangle
pub fn style_to_shape_kind(style: &str) -> ShapeKind {
    if style.contains(CHEVRON_SHAPE) {
        ShapeKind::Chevron
    } else if style.contains("hexagon") {
        ShapeKind::Hexagon
    } else if style.contains("rhombus") {
        ShapeKind::Rhombus
    } else if style.contains("ellipse") {
        ShapeKind::Ellipse
    } else if style.contains("note") {
        ShapeKind::Note
    } else {
        ShapeKind::Rectangle
    }
}

/// `fillColor` of a style, if any
pub fn fill_color(style: &str) -> Option<&str> {
    style_value(style, "fillColor")
}

fn fill_is(style: &str, color: &str) -> bool {
    fill_color(style).is_some_and(|fill| fill.eq_ignore_ascii_case(color))
}

/// Value-chain process subtype for a fill colour
///
/// Colours must match exactly (ASCII case aside).
pub fn vad_kind_for_fill(style: &str) -> Option<ElementKind> {
    if fill_is(style, BASE_VAD_FILL) {
        Some(ElementKind::BaseVad)
    } else if fill_is(style, DETAIL_VAD_FILL) {
        Some(ElementKind::DetailVad)
    } else if fill_is(style, EXTERN_VAD_FILL) {
        Some(ElementKind::ExternVad)
    } else {
        None
    }
}

/// Whether the fill is one of the three value-chain process colours
pub fn has_vad_fill(style: &str) -> bool {
    vad_kind_for_fill(style).is_some()
}

/// Whether the fill is the EPC event colour
pub fn has_event_fill(style: &str) -> bool {
    fill_is(style, EPC_EVENT_FILL)
}

/// An edge flag or an `endArrow` key makes a cell an edge
pub fn is_edge_style(edge_flag: bool, style: &str) -> bool {
    edge_flag || has_arrow_end(style)
}

/// Semantic kind of a cell
pub fn infer_element_kind(style: &str, edge_flag: bool) -> ElementKind {
    if is_edge_style(edge_flag, style) {
        return ElementKind::HasNext;
    }

    match style_to_shape_kind(style) {
        ShapeKind::Chevron => vad_kind_for_fill(style).unwrap_or(ElementKind::BaseVad),
        ShapeKind::Hexagon => ElementKind::Event,
        ShapeKind::Rhombus => ElementKind::Connector,
        ShapeKind::Ellipse => {
            if fill_is(style, ORG_UNIT_FILL) {
                ElementKind::OrgUnit
            } else {
                ElementKind::Person
            }
        }
        ShapeKind::Note => vad_kind_for_fill(style).unwrap_or(ElementKind::Note),
        ShapeKind::Rectangle => vad_kind_for_fill(style).unwrap_or_else(|| {
            if style.contains("rectangle") {
                ElementKind::Function
            } else {
                ElementKind::Shape
            }
        }),
    }
}

/// Connection style and anchors of an edge cell
///
/// Exit/entry constraints that are not one of the four side midpoints fall
/// back to right (source) and left (target).
pub fn connection_style(style: &str) -> (ConnectionStyle, Anchor, Anchor) {
    let defaults = ConnectionStyle::default();
    let connection_style = ConnectionStyle {
        stroke_color: style_value(style, "strokeColor")
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .unwrap_or(defaults.stroke_color),
        stroke_width: style_value(style, "strokeWidth")
            .and_then(|w| w.parse::<f64>().ok())
            .filter(|w| w.is_finite() && *w >= 0.0)
            .unwrap_or(defaults.stroke_width),
        dashed: style_value(style, "dashed") == Some("1"),
        has_arrow: style_value(style, "endArrow") != Some("none"),
    };

    let source = anchor_from(style, "exitX", "exitY").unwrap_or(Anchor::Right);
    let target = anchor_from(style, "entryX", "entryY").unwrap_or(Anchor::Left);
    (connection_style, source, target)
}

fn anchor_from(style: &str, x_key: &str, y_key: &str) -> Option<Anchor> {
    let x = style_value(style, x_key)?.parse::<f64>().ok()?;
    let y = style_value(style, y_key)?.parse::<f64>().ok()?;
    Anchor::from_constraint(x, y)
}
