use derive_setters::Setters;

use crate::error::EnvError;

/// Immutable description of a grid: its extent, the penalty cuboid and the
/// per-component action bounds.
///
/// ```
/// let config = reach::GridConfig::default()
///     .grid_size(10)
///     .block_low(3.0)
///     .block_high(6.0);
/// assert!(config.validate().is_ok());
/// ```
#[must_use]
#[derive(Setters, Debug, Clone, Copy, PartialEq)]
pub struct GridConfig {
    pub grid_size: u32,
    pub block_low: f32,
    pub block_high: f32,
    pub action_low: f32,
    pub action_high: f32,

    /// Absolute tolerance used when comparing a position against the goal
    /// corner. `0.0` means exact equality.
    pub goal_tolerance: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            grid_size: 4,
            block_low: 1.0,
            block_high: 2.0,
            action_low: -1.0,
            action_high: 1.0,
            goal_tolerance: 0.0,
        }
    }
}

impl GridConfig {
    /// Largest coordinate reachable on every axis.
    #[must_use]
    pub fn max_coord(&self) -> f32 {
        self.grid_size.saturating_sub(1) as f32
    }

    pub fn validate(&self) -> Result<(), EnvError> {
        let invalid = |msg: String| Err(EnvError::InvalidConfig(msg));

        if self.grid_size == 0 {
            return invalid("grid_size must be positive".to_owned());
        }
        if !(self.block_low.is_finite() && self.block_high.is_finite()) {
            return invalid("block bounds must be finite".to_owned());
        }
        if self.block_low > self.block_high {
            return invalid(format!(
                "block_low ({}) exceeds block_high ({})",
                self.block_low, self.block_high
            ));
        }
        if self.block_high > self.max_coord() {
            return invalid(format!(
                "block_high ({}) exceeds grid_size - 1 ({})",
                self.block_high,
                self.max_coord()
            ));
        }
        if !(self.action_low.is_finite() && self.action_high.is_finite())
            || self.action_low > self.action_high
        {
            return invalid(format!(
                "action bounds [{}, {}] are not a finite interval",
                self.action_low, self.action_high
            ));
        }
        if !self.goal_tolerance.is_finite() || self.goal_tolerance < 0.0 {
            return invalid(format!(
                "goal_tolerance ({}) must be finite and non-negative",
                self.goal_tolerance
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_small_grid() {
        let config = GridConfig::default();
        assert_eq!(config.grid_size, 4);
        assert!((config.max_coord() - 3.0).abs() < f32::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_inverted_block() {
        let config = GridConfig::default().block_low(2.0).block_high(1.0);
        assert!(matches!(config.validate(), Err(EnvError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_block_outside_grid() {
        let config = GridConfig::default().grid_size(4).block_high(3.5);
        assert!(matches!(config.validate(), Err(EnvError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_empty_grid_and_bad_tolerance() {
        assert!(GridConfig::default().grid_size(0).validate().is_err());
        assert!(GridConfig::default().goal_tolerance(-0.1).validate().is_err());
        assert!(GridConfig::default()
            .action_low(1.0)
            .action_high(-1.0)
            .validate()
            .is_err());
    }
}
