//! Core detector trait for notation identification
//!
//! Detectors look at the raw style strings of a document's cells and decide
//! whether they belong to a notation. They never see the configuration and
//! never parse XML themselves.

use super::Notation;

/// Core trait for notation detectors
///
/// # Example
/// ```
/// use processmap::core::{Detector, Notation};
/// use processmap::plugins::notation::EpcDetector;
///
/// let detector = EpcDetector::new();
/// let styles = vec!["shape=hexagon;fillColor=#ffe6cc".to_string()];
/// assert!(detector.detect(&styles));
/// assert_eq!(detector.notation(), Notation::Epc);
/// ```
pub trait Detector: Send + Sync {
    /// Whether any of the cell styles marks this notation
    fn detect(&self, styles: &[String]) -> bool;

    /// Share of cell styles carrying this notation's markers (0.0 to 1.0)
    fn confidence(&self, styles: &[String]) -> f64;

    /// The notation this detector recognises
    fn notation(&self) -> Notation;

    /// Key markers this detector looks for
    fn patterns(&self) -> Vec<&'static str>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::notation::{OrgDetector, VadDetector};

    #[test]
    fn test_detector_trait_objects() {
        let detectors: Vec<Box<dyn Detector>> =
            vec![Box::new(VadDetector::new()), Box::new(OrgDetector::new())];
        let notations: Vec<Notation> = detectors.iter().map(|d| d.notation()).collect();
        assert_eq!(notations, vec![Notation::Vad, Notation::Org]);
    }

    #[test]
    fn test_confidence_is_a_share() {
        let detector = VadDetector::new();
        let styles = vec![
            "fillColor=#B9E0A5".to_string(),
            "fillColor=#ffffff".to_string(),
        ];
        assert!(detector.detect(&styles));
        assert_eq!(detector.confidence(&styles), 0.5);
        assert_eq!(detector.confidence(&[]), 0.0);
    }
}
