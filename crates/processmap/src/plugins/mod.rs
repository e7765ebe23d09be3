//! Plugin implementations
//!
//! The draw.io codec, the notation catalogue and detectors, and the layers
//! that wire them to storage.

pub mod drawio;
pub mod notation;
pub mod orchestrator;
pub mod service;

pub use drawio::*;
pub use notation::*;
pub use orchestrator::*;
pub use service::*;
