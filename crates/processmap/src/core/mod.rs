//! Core abstractions for diagram processing
//!
//! The entity model (diagram, element, connection and their value objects),
//! the traits that plugins implement, and the shared error, logging and
//! storage pieces.

mod connection;
mod database;
mod detector;
mod diagram;
mod element;
mod error;
mod geometry;
mod model;
pub mod logging;
mod parser;
mod renderer;
pub mod repository;
pub mod style;
mod types;

pub use connection::*;
pub use database::*;
pub use detector::*;
pub use diagram::*;
pub use element::*;
pub use error::*;
pub use geometry::*;
pub use model::*;
pub use logging::*;
pub use parser::*;
pub use renderer::*;
pub use repository::*;
pub use style::Style;
pub use types::*;
