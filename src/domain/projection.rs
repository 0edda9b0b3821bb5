//! Mapping from layout units to screen coordinates.

use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, LayoutResult};
use crate::domain::layout::NodeLayout;

/// A point in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

/// Affine transform from `(x, depth)` to screen space: scale by cell size,
/// add a margin, and optionally grow downwards by flipping y.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenTransform {
    pub cell_width: f64,
    pub cell_height: f64,
    pub margin_x: f64,
    pub margin_y: f64,
    /// Negate depth so deeper levels sit lower in a y-up coordinate system
    pub flip_y: bool,
}

impl Default for ScreenTransform {
    fn default() -> Self {
        Self {
            cell_width: 30.0,
            cell_height: 30.0,
            margin_x: 50.0,
            margin_y: 40.0,
            flip_y: true,
        }
    }
}

impl ScreenTransform {
    pub fn validate(&self) -> LayoutResult<()> {
        let fields = [
            ("cell_width", self.cell_width),
            ("cell_height", self.cell_height),
            ("margin_x", self.margin_x),
            ("margin_y", self.margin_y),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(DomainError::InvalidConfig(format!(
                "{name} must be finite, got {value}"
            )));
        }
        if let Some((name, value)) = fields[..2].iter().find(|(_, v)| *v <= 0.0) {
            return Err(DomainError::InvalidConfig(format!(
                "{name} must be positive, got {value}"
            )));
        }
        Ok(())
    }

    pub fn project(&self, node: &NodeLayout) -> ScreenPoint {
        let depth = node.y as f64;
        let depth = if self.flip_y { -depth } else { depth };
        ScreenPoint {
            x: node.x * self.cell_width + self.margin_x,
            y: depth * self.cell_height + self.margin_y,
        }
    }
}
