use serde::{Deserialize, Serialize};

use crate::types::*;

/// Tuning constants for node placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Grid cell size and occupancy threshold for free placement.
    pub node_spacing: f64,
    /// First ring radius tried around a parent node.
    pub radial_distance: f64,
    /// Amount added to the ring radius after every fully occupied ring.
    pub radial_step: f64,
    /// Occupancy threshold used by radial placement.
    pub radial_threshold: f64,
    /// Rings tried before radial placement gives up and falls through to free
    /// placement. `None` keeps expanding until a ring has room.
    pub max_radial_expansions: Option<usize>,
    pub default_node_size: Size,
    /// Screen-space margin kept clear along the viewport border.
    pub viewport_margin: f64,
    /// Width of the random jitter applied inside a grid cell, as a fraction of the cell.
    pub grid_jitter: f64,
    /// Grids with more cells than this are sampled instead of enumerated.
    pub grid_cell_limit: usize,
    pub random_attempts: usize,
    pub spiral_angle_step: f64,
    pub forced_attempts: usize,
    /// Fraction of the visible extent sampled by forced placement.
    pub forced_extent: f64,
    /// Fraction of `node_spacing` used as the relaxed forced-placement threshold.
    pub forced_threshold_factor: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_spacing: 200.0,
            radial_distance: 200.0,
            radial_step: 50.0,
            radial_threshold: 100.0,
            max_radial_expansions: Some(64),
            default_node_size: DEFAULT_NODE_SIZE,
            viewport_margin: 150.0,
            grid_jitter: 0.3,
            grid_cell_limit: 1024,
            random_attempts: 100,
            spiral_angle_step: 30.0,
            forced_attempts: 20,
            forced_extent: 0.8,
            forced_threshold_factor: 0.5,
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> Result<(), LayoutError> {
        positive("node_spacing", self.node_spacing)?;
        positive("radial_distance", self.radial_distance)?;
        positive("radial_step", self.radial_step)?;
        positive("radial_threshold", self.radial_threshold)?;
        positive("default_node_size.width", self.default_node_size.width)?;
        positive("default_node_size.height", self.default_node_size.height)?;
        positive("spiral_angle_step", self.spiral_angle_step)?;
        if !(self.viewport_margin.is_finite() && self.viewport_margin >= 0.0) {
            return Err(LayoutError::InvalidSetting {
                name: "viewport_margin",
                reason: format!("must be non-negative, got {}", self.viewport_margin),
            });
        }
        fraction("grid_jitter", self.grid_jitter)?;
        fraction("forced_extent", self.forced_extent)?;
        fraction("forced_threshold_factor", self.forced_threshold_factor)?;
        Ok(())
    }

    pub fn forced_threshold(&self) -> f64 {
        self.node_spacing * self.forced_threshold_factor
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), LayoutError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LayoutError::InvalidSetting {
            name,
            reason: format!("must be a positive number, got {value}"),
        })
    }
}

fn fraction(name: &'static str, value: f64) -> Result<(), LayoutError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(LayoutError::InvalidSetting {
            name,
            reason: format!("must be in (0, 1], got {value}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(LayoutConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_spacing() {
        let config = LayoutConfig {
            node_spacing: 0.0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            LayoutError::InvalidSetting {
                name: "node_spacing",
                ..
            }
        ));
    }

    #[test]
    fn rejects_out_of_range_fractions() {
        let config = LayoutConfig {
            forced_extent: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = LayoutConfig {
            grid_jitter: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn forced_threshold_is_half_spacing() {
        assert_eq!(LayoutConfig::default().forced_threshold(), 100.0);
    }
}
