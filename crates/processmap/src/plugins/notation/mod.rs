//! Notation plugin
//!
//! Detection of a document's notation from its cell styles, and the
//! catalogue of notations with their stencils.

pub mod config;
pub mod detector;

pub use config::{NotationConfig, NotationSettings, ShapeConfig};
pub use detector::{
    default_detectors, first_match, infer_notation, EpcDetector, OrgDetector, VadDetector,
};
