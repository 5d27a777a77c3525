//! One-dimensional fitness landscapes and the snapshot types shared by the
//! optimizers that climb them.

use std::f64::consts::PI;
use std::fmt;

use stepviz_core::ConfigError;

/// Search interval shared by every objective.
pub const DOMAIN: (f64, f64) = (0.0, 10.0);

/// A function to maximize over [`DOMAIN`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Objective {
    /// Single peak of 25 at x = 5.
    #[default]
    Quadratic,
    /// Two peaks of 25 inside the domain.
    Sine,
    /// Many local optima around a falling trend.
    Rastrigin,
}

impl Objective {
    pub const ALL: [Objective; 3] = [Self::Quadratic, Self::Sine, Self::Rastrigin];

    pub fn eval(self, x: f64) -> f64 {
        match self {
            Self::Quadratic => -(x - 5.0).powi(2) + 25.0,
            Self::Sine => 10.0 * x.sin() + 15.0,
            Self::Rastrigin => 20.0 - (x * x - 10.0 * (2.0 * PI * x).cos()),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Quadratic => "quadratic",
            Self::Sine => "sine",
            Self::Rastrigin => "rastrigin",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.name() == name)
    }

    pub fn sample(self, x: f64) -> Sample {
        Sample { x, y: self.eval(x) }
    }

    /// `n` evenly spaced samples across the domain, for plotting.
    pub fn curve(self, n: usize) -> Vec<Sample> {
        let (lo, hi) = DOMAIN;
        let last = n.saturating_sub(1).max(1) as f64;
        (0..n)
            .map(|i| self.sample(lo + (hi - lo) * i as f64 / last))
            .collect()
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub(crate) fn in_domain(x: f64) -> bool {
    x >= DOMAIN.0 && x <= DOMAIN.1
}

pub(crate) fn clamp_domain(x: f64) -> f64 {
    x.clamp(DOMAIN.0, DOMAIN.1)
}

pub(crate) fn require(ok: bool, name: &'static str, reason: &str) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::parameter(name, reason))
    }
}

/// A point on an objective curve.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sample {
    pub x: f64,
    pub y: f64,
}

/// Why an optimizer stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopReason {
    /// No neighbor improved, or the population collapsed onto one point.
    Converged,
    /// The iteration budget ran out.
    BudgetExhausted,
}

/// Best point found by a finished optimizer.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Optimum {
    pub best: Sample,
    pub iterations: usize,
    pub stop: StopReason,
}

/// State of a single-point optimizer: where it is and where it has been.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurveSnapshot {
    pub objective: Objective,
    pub current: Sample,
    pub best: Sample,
    /// Every position the optimizer moved to, oldest first.
    pub trail: Vec<Sample>,
    pub iteration: usize,
}

/// State of a population-based optimizer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PopulationSnapshot {
    pub objective: Objective,
    pub members: Vec<Sample>,
    pub best: Sample,
    /// Best objective value after each completed iteration.
    pub best_history: Vec<f64>,
    pub iteration: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_values() {
        assert_eq!(Objective::Quadratic.eval(5.0), 25.0);
        assert_eq!(Objective::Quadratic.eval(0.0), 0.0);
        assert!((Objective::Sine.eval(PI / 2.0) - 25.0).abs() < 1e-9);
        assert!((Objective::Rastrigin.eval(0.0) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn curve_spans_domain() {
        let c = Objective::Sine.curve(11);
        assert_eq!(c.len(), 11);
        assert_eq!(c[0].x, 0.0);
        assert_eq!(c[10].x, 10.0);
        assert!(Objective::Sine.curve(0).is_empty());
        assert_eq!(Objective::Sine.curve(1)[0].x, 0.0);
    }

    #[test]
    fn names_round_trip() {
        for o in Objective::ALL {
            assert_eq!(Objective::from_name(o.name()), Some(o));
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn objective_serializes_lowercase() {
        let s = serde_json::to_string(&Objective::Rastrigin).unwrap();
        assert_eq!(s, "\"rastrigin\"");
    }
}
