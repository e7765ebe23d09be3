//! Tests for core error types

use processmap::core::DiagramError;

#[test]
fn test_invalid_argument() {
    let error = DiagramError::invalid_argument("width must be finite");
    let error_msg = format!("{}", error);
    assert!(error_msg.contains("Invalid argument"));
    assert!(error_msg.contains("width must be finite"));
    assert!(error.is_invalid_argument());
    assert!(!error.is_malformed_input());
}

#[test]
fn test_malformed_input() {
    let error = DiagramError::malformed_input("no <diagram> element found");
    assert_eq!(
        error.to_string(),
        "Malformed input: no <diagram> element found"
    );
    assert!(error.is_malformed_input());
}

#[test]
fn test_unknown_notation() {
    let error = DiagramError::unknown_notation("uml");
    let error_msg = format!("{}", error);
    assert!(error_msg.contains("Unknown notation"));
    assert!(error_msg.contains("uml"));
}

#[test]
fn test_unknown_stencil() {
    let error = DiagramError::unknown_stencil("epc", "swimlane");
    assert_eq!(
        error.to_string(),
        "Unknown stencil 'swimlane' for notation epc"
    );
}

#[test]
fn test_render_error() {
    let error = DiagramError::render_error("Render failed");
    let error_msg = format!("{}", error);
    assert!(error_msg.contains("Render error"));
    assert!(error_msg.contains("Render failed"));
}

#[test]
fn test_config_error() {
    let error = DiagramError::config_error("expected a table");
    assert_eq!(error.to_string(), "Configuration error: expected a table");
}

#[test]
fn test_serialization_error() {
    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let error: DiagramError = json_err.into();
    assert!(format!("{}", error).contains("Serialization error"));
}

#[test]
fn test_io_error() {
    use std::io;
    let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
    let error: DiagramError = io_err.into();
    let error_msg = format!("{}", error);
    assert!(error_msg.contains("IO error"));
    assert!(error_msg.contains("File not found"));
}
