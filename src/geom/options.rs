//! Tube parameters and their validation.

use serde::Deserialize;

use super::Tolerance;

/// Smallest cross-section that still encloses a volume.
pub const MIN_EDGES: usize = 3;

/// Upper bound on rings emitted for a single 180° turn.
pub const MAX_TURN_STEPS: usize = 256;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TubeError {
    #[error("radius must be finite and > 0, got {0}")]
    InvalidRadius(f64),
    #[error("tube needs at least {min} edges, got {actual}")]
    NotEnoughEdges { min: usize, actual: usize },
    #[error("max turn steps must be <= {max}, got {actual}")]
    TooManyTurnSteps { max: usize, actual: usize },
    #[error("turn trigger factor must be finite and >= 0, got {0}")]
    InvalidTurnTrigger(f64),
    #[error("tolerance must be finite and >= 0, got {0}")]
    InvalidTolerance(f64),
}

/// Options for controlling tube mesh generation.
///
/// Deserializes from a partial camelCase object (`{ radius, maxTurnSteps }`);
/// missing fields take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TubeOptions {
    /// Radius of the swept circle.
    pub radius: f64,
    /// Number of vertices around each ring.
    pub edges: usize,
    /// Ring count used for a full 180° turn. Smaller turns get proportionally fewer.
    pub max_turn_steps: usize,
    /// A corner is smoothed only when the incoming segment is longer than
    /// `turn_trigger_factor * radius`.
    pub turn_trigger_factor: f64,
    /// Distance under which two consecutive points count as the same point.
    pub tolerance: f64,
}

impl Default for TubeOptions {
    fn default() -> Self {
        Self {
            radius: 1.0,
            edges: 12,
            max_turn_steps: 4,
            turn_trigger_factor: 2.0,
            tolerance: Tolerance::DEFAULT.eps,
        }
    }
}

impl TubeOptions {
    #[must_use]
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    #[must_use]
    pub fn with_edges(mut self, edges: usize) -> Self {
        self.edges = edges;
        self
    }

    #[must_use]
    pub fn with_max_turn_steps(mut self, max_turn_steps: usize) -> Self {
        self.max_turn_steps = max_turn_steps;
        self
    }

    #[must_use]
    pub fn with_turn_trigger_factor(mut self, factor: f64) -> Self {
        self.turn_trigger_factor = factor;
        self
    }

    #[must_use]
    pub fn tolerance(&self) -> Tolerance {
        Tolerance::new(self.tolerance)
    }

    /// Distance an incoming segment must exceed before its corner is smoothed.
    #[must_use]
    pub fn turn_trigger_distance(&self) -> f64 {
        self.turn_trigger_factor * self.radius
    }

    pub fn validate(&self) -> Result<(), TubeError> {
        validate_radius(self.radius)?;
        validate_edges(self.edges)?;
        validate_max_turn_steps(self.max_turn_steps)?;
        if !self.turn_trigger_factor.is_finite() || self.turn_trigger_factor < 0.0 {
            return Err(TubeError::InvalidTurnTrigger(self.turn_trigger_factor));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(TubeError::InvalidTolerance(self.tolerance));
        }
        Ok(())
    }
}

pub(crate) fn validate_radius(radius: f64) -> Result<(), TubeError> {
    if radius.is_finite() && radius > 0.0 {
        Ok(())
    } else {
        Err(TubeError::InvalidRadius(radius))
    }
}

pub(crate) fn validate_edges(edges: usize) -> Result<(), TubeError> {
    if edges < MIN_EDGES {
        return Err(TubeError::NotEnoughEdges {
            min: MIN_EDGES,
            actual: edges,
        });
    }
    Ok(())
}

pub(crate) fn validate_max_turn_steps(max_turn_steps: usize) -> Result<(), TubeError> {
    if max_turn_steps > MAX_TURN_STEPS {
        return Err(TubeError::TooManyTurnSteps {
            max: MAX_TURN_STEPS,
            actual: max_turn_steps,
        });
    }
    Ok(())
}
