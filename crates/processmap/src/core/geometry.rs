//! Geometry value objects
//!
//! `Point` and `Size` are plain values with exact field equality. Their JSON
//! form is lossless.

use serde::{Deserialize, Serialize};

use super::DiagramError;

/// A position on the drawing surface
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Width and height of a shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Build a size, rejecting negative or non-finite dimensions
    pub fn try_new(width: f64, height: f64) -> Result<Self, DiagramError> {
        let size = Self::new(width, height);
        if size.is_valid() {
            Ok(size)
        } else {
            Err(DiagramError::invalid_argument(format!(
                "size must be finite and non-negative, got {}x{}",
                width, height
            )))
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Finite and non-negative in both dimensions
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width >= 0.0 && self.height >= 0.0
    }
}

impl Default for Size {
    /// The draw.io default cell size
    fn default() -> Self {
        Self::new(100.0, 60.0)
    }
}
