//! Notation detectors
//!
//! Each detector fires when at least one cell style carries its notation's
//! marker. They are consulted in a fixed priority order (value chain, event
//! chain, org chart) and the first that fires decides; with no match the
//! notation is the value chain.

use tracing::trace;

use crate::core::{Detector, Notation};
use crate::plugins::drawio::inference::{has_event_fill, has_vad_fill};

fn share(styles: &[String], marks: impl Fn(&str) -> bool) -> f64 {
    if styles.is_empty() {
        return 0.0;
    }
    let hits = styles.iter().filter(|s| marks(s.as_str())).count();
    hits as f64 / styles.len() as f64
}

/// Value-chain processes: one of the three process fill colours
#[derive(Debug, Default, Clone, Copy)]
pub struct VadDetector;

impl VadDetector {
    pub fn new() -> Self {
        Self
    }

    fn marks(style: &str) -> bool {
        has_vad_fill(style)
    }
}

impl Detector for VadDetector {
    fn detect(&self, styles: &[String]) -> bool {
        styles.iter().any(|s| Self::marks(s))
    }

    fn confidence(&self, styles: &[String]) -> f64 {
        share(styles, Self::marks)
    }

    fn notation(&self) -> Notation {
        Notation::Vad
    }

    fn patterns(&self) -> Vec<&'static str> {
        vec!["fillColor=#B9E0A5", "fillColor=#B9E0A6", "fillColor=#D4E1F5"]
    }
}

/// Event-driven process chains: a hexagon with the event fill
#[derive(Debug, Default, Clone, Copy)]
pub struct EpcDetector;

impl EpcDetector {
    pub fn new() -> Self {
        Self
    }

    fn marks(style: &str) -> bool {
        style.contains("hexagon") && has_event_fill(style)
    }
}

impl Detector for EpcDetector {
    fn detect(&self, styles: &[String]) -> bool {
        styles.iter().any(|s| Self::marks(s))
    }

    fn confidence(&self, styles: &[String]) -> f64 {
        share(styles, Self::marks)
    }

    fn notation(&self) -> Notation {
        Notation::Epc
    }

    fn patterns(&self) -> Vec<&'static str> {
        vec!["hexagon", "fillColor=#ffe6cc"]
    }
}

/// Org charts: an ellipse not marked as BPMN
#[derive(Debug, Default, Clone, Copy)]
pub struct OrgDetector;

impl OrgDetector {
    pub fn new() -> Self {
        Self
    }

    fn marks(style: &str) -> bool {
        style.contains("ellipse") && !style.contains("BPMN")
    }
}

impl Detector for OrgDetector {
    fn detect(&self, styles: &[String]) -> bool {
        styles.iter().any(|s| Self::marks(s))
    }

    fn confidence(&self, styles: &[String]) -> f64 {
        share(styles, Self::marks)
    }

    fn notation(&self) -> Notation {
        Notation::Org
    }

    fn patterns(&self) -> Vec<&'static str> {
        vec!["ellipse"]
    }
}

/// Built-in detectors in priority order
pub fn default_detectors() -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(VadDetector::new()),
        Box::new(EpcDetector::new()),
        Box::new(OrgDetector::new()),
    ]
}

/// First notation whose detector fires, in the given order; value chain otherwise
pub fn first_match(detectors: &[Box<dyn Detector>], styles: &[String]) -> Notation {
    for detector in detectors {
        trace!(
            notation = %detector.notation(),
            confidence = detector.confidence(styles),
            "Checking detector"
        );
        if detector.detect(styles) {
            return detector.notation();
        }
    }
    Notation::Vad
}

/// Notation of a document, judged from its cell styles with the built-in detectors
pub fn infer_notation(styles: &[String]) -> Notation {
    first_match(&default_detectors(), styles)
}
